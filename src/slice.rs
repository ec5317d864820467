//! Extracting the three orthogonal display slices from a volume.

use ndarray::prelude::*;
use ndarray::Array2;

use crate::error::{PreviewError, Result};
use crate::volume::Volume;

/// Crosshair position, one voxel index per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceIndex {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

/// The three display-ready (already rotated) orthogonal slices.
#[derive(Debug)]
pub struct SlicePlanes {
    /// Fixed Y, rows = Z (superior up), cols = X.
    pub coronal: Array2<f64>,
    /// Fixed X, rows = Z, cols = Y.
    pub sagittal: Array2<f64>,
    /// Fixed Z, rows = Y, cols = X.
    pub axial: Array2<f64>,
    pub crosshair: SliceIndex,
}

/// Rotate a slice 90 degrees counterclockwise for display, so the last
/// volume axis (superior for typical nifti orientations) runs up the panel.
pub fn rot90(a: ArrayView2<f64>) -> Array2<f64> {
    let (rows, cols) = a.dim();
    Array2::from_shape_fn((cols, rows), |(i, j)| a[(j, cols - 1 - i)])
}

fn derive_index(len: usize, requested: usize) -> usize {
    // requested is already checked against the smallest axis, the center
    // fallback is for defense only
    if len > requested {
        len - 1 - requested
    } else {
        len / 2
    }
}

/// Compute the coronal/sagittal/axial slices and the crosshair position.
///
/// Without a requested slice each axis uses its geometric center. With one,
/// the index on an axis of length `len` is `len - 1 - requested` (the usual
/// radiological counting direction), validated against the smallest axis.
pub fn extract(volume: &Volume, requested: Option<usize>) -> Result<SlicePlanes> {
    let (lx, ly, lz) = volume.shape();
    if lx == 0 || ly == 0 || lz == 0 {
        return Err(PreviewError::InvalidGeometry(format!(
            "volume has a zero-length axis: {} x {} x {}",
            lx, ly, lz
        )));
    }

    let crosshair = match requested {
        None => SliceIndex {
            x: lx / 2,
            y: ly / 2,
            z: lz / 2,
        },
        Some(s) => {
            let max = lx.min(ly).min(lz) - 1;
            if s > max {
                return Err(PreviewError::OutOfBounds { requested: s, max });
            }
            SliceIndex {
                x: derive_index(lx, s),
                y: derive_index(ly, s),
                z: derive_index(lz, s),
            }
        }
    };
    log::debug!("crosshair at {:?}", crosshair);

    Ok(SlicePlanes {
        coronal: rot90(volume.data.index_axis(Axis(1), crosshair.y)),
        sagittal: rot90(volume.data.index_axis(Axis(0), crosshair.x)),
        axial: rot90(volume.data.index_axis(Axis(2), crosshair.z)),
        crosshair,
    })
}
