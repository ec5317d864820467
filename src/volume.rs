//! Loading a nifti file into a dense volume ready for previewing.

use std::path::Path;

use nalgebra::{Matrix3, Matrix4};
use ndarray::prelude::*;
use ndarray::{Array3, Ix3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::error::{PreviewError, Result};

/// A dense 3D volume plus the header fields the preview needs.
///
/// 4D images are reduced to their first time point at load time. NaN voxels
/// are replaced by 0 so that display normalization and the reported value
/// range are well defined.
#[derive(Debug)]
pub struct Volume {
    pub data: Array3<f64>,
    /// Physical voxel spacing (sX, sY, sZ) from pixdim, as stored.
    pub spacing: [f64; 3],
    /// Header datatype, e.g. "float32".
    pub datatype: String,
    /// Number of volumes, straight from the 4th header dim field.
    pub volumes: u16,
    pub qform: Matrix4<f64>,
    pub sform: Matrix4<f64>,
}

impl Volume {
    pub fn new(
        mut data: Array3<f64>,
        spacing: [f64; 3],
        datatype: String,
        volumes: u16,
        qform: Matrix4<f64>,
        sform: Matrix4<f64>,
    ) -> Self {
        // NaN would poison min/max and the grayscale mapping
        data.mapv_inplace(|v| if v.is_nan() { 0.0 } else { v });
        Self {
            data,
            spacing,
            datatype,
            volumes,
            qform,
            sform,
        }
    }

    /// Read a `.nii` / `.nii.gz` file into a preview-ready volume.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PreviewError::InputNotFound(path.display().to_string()));
        }
        let obj = ReaderOptions::new().read_file(path)?;
        let header = obj.header().clone();
        let datatype = format!("{:?}", header.data_type()?).to_lowercase();

        let img = obj.into_volume().into_ndarray::<f64>()?;
        let rank = img.ndim();
        let img = match rank {
            3 => img,
            // only the first time point is previewed
            4 => {
                if img.shape()[3] == 0 {
                    return Err(PreviewError::InvalidGeometry(
                        "4D image with no volumes".into(),
                    ));
                }
                img.index_axis_move(Axis(3), 0)
            }
            _ => return Err(PreviewError::UnsupportedRank(rank)),
        };
        let data = img
            .into_dimensionality::<Ix3>()
            .map_err(|e| PreviewError::InvalidGeometry(e.to_string()))?;
        log::debug!("loaded volume of shape {:?}", data.shape());

        let spacing = [
            header.pixdim[1] as f64,
            header.pixdim[2] as f64,
            header.pixdim[3] as f64,
        ];
        Ok(Self::new(
            data,
            spacing,
            datatype,
            header.dim[4],
            qform_affine(&header),
            sform_affine(&header),
        ))
    }

    /// Axis lengths (lX, lY, lZ).
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Min and max over the displayed (already NaN-zeroed) data.
    pub fn value_range(&self) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in self.data.iter() {
            min = min.min(v);
            max = max.max(v);
        }
        if min > max {
            (0.0, 0.0)
        } else {
            (min, max)
        }
    }
}

/// Build the qform affine from the header quaternion, per the nifti-1
/// reference method: rotation from (b,c,d) with a = sqrt(1-b^2-c^2-d^2),
/// columns scaled by pixdim and qfac (pixdim[0]) flipping the third column.
pub fn qform_affine(header: &NiftiHeader) -> Matrix4<f64> {
    let b = header.quatern_b as f64;
    let c = header.quatern_c as f64;
    let d = header.quatern_d as f64;
    let a = (1.0 - b * b - c * c - d * d).max(0.0).sqrt();
    let qfac = if (header.pixdim[0] as f64) < 0.0 {
        -1.0
    } else {
        1.0
    };
    let (sx, sy, sz) = (
        header.pixdim[1] as f64,
        header.pixdim[2] as f64,
        header.pixdim[3] as f64,
    );
    let r = Matrix3::new(
        a * a + b * b - c * c - d * d,
        2.0 * (b * c - a * d),
        2.0 * (b * d + a * c),
        2.0 * (b * c + a * d),
        a * a + c * c - b * b - d * d,
        2.0 * (c * d - a * b),
        2.0 * (b * d - a * c),
        2.0 * (c * d + a * b),
        a * a + d * d - b * b - c * c,
    );
    let mut m = Matrix4::identity();
    for i in 0..3 {
        m[(i, 0)] = r[(i, 0)] * sx;
        m[(i, 1)] = r[(i, 1)] * sy;
        m[(i, 2)] = r[(i, 2)] * sz * qfac;
    }
    m[(0, 3)] = header.quatern_x as f64;
    m[(1, 3)] = header.quatern_y as f64;
    m[(2, 3)] = header.quatern_z as f64;
    m
}

/// Build the sform affine from the srow header rows.
pub fn sform_affine(header: &NiftiHeader) -> Matrix4<f64> {
    let mut m = Matrix4::identity();
    for (i, row) in [header.srow_x, header.srow_y, header.srow_z]
        .iter()
        .enumerate()
    {
        for j in 0..4 {
            m[(i, j)] = row[j] as f64;
        }
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn nan_voxels_are_zeroed() {
        let mut data = Array3::<f64>::zeros((2, 2, 2));
        data[[0, 0, 0]] = f64::NAN;
        data[[1, 1, 1]] = 7.5;
        let vol = Volume::new(
            data,
            [1.0, 1.0, 1.0],
            "float64".into(),
            1,
            Matrix4::identity(),
            Matrix4::identity(),
        );
        assert_eq!(vol.data[[0, 0, 0]], 0.0);
        assert_eq!(vol.value_range(), (0.0, 7.5));
    }

    #[test]
    fn qform_identity_quaternion_is_scaled_identity() {
        let header = NiftiHeader {
            pixdim: [1.0, 2.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0],
            ..Default::default()
        };
        let q = qform_affine(&header);
        assert_relative_eq!(q[(0, 0)], 2.0);
        assert_relative_eq!(q[(1, 1)], 2.0);
        assert_relative_eq!(q[(2, 2)], 3.0);
    }

    #[test]
    fn qform_z_flip_quaternion_negates_first_diagonal() {
        // 180 degree rotation about z: (b,c,d) = (0,0,1)
        let header = NiftiHeader {
            pixdim: [1.0, 1.5, 1.5, 2.0, 0.0, 0.0, 0.0, 0.0],
            quatern_d: 1.0,
            ..Default::default()
        };
        let q = qform_affine(&header);
        assert_relative_eq!(q[(0, 0)], -1.5);
        assert_relative_eq!(q[(1, 1)], -1.5);
        assert_relative_eq!(q[(2, 2)], 2.0);
    }

    #[test]
    fn sform_rows_come_from_srow() {
        let header = NiftiHeader {
            srow_x: [-2.0, 0.0, 0.0, 10.0],
            srow_y: [0.0, 2.0, 0.0, -20.0],
            srow_z: [0.0, 0.0, 3.0, 0.0],
            ..Default::default()
        };
        let s = sform_affine(&header);
        assert_relative_eq!(s[(0, 0)], -2.0);
        assert_relative_eq!(s[(0, 3)], 10.0);
        assert_relative_eq!(s[(1, 3)], -20.0);
        assert_relative_eq!(s[(3, 3)], 1.0);
    }
}
