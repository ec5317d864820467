//! End-to-end scenarios over a synthetic nifti volume.

use std::path::{Path, PathBuf};

use ndarray::Array3;
use nifti::writer::WriterOptions;
use nifti::NiftiHeader;

use niiview::error::PreviewError;
use niiview::slice::{self, SliceIndex};
use niiview::{meta, orient, sixel, Style, Volume};

/// 64 x 64 x 40 volume, spacing (2, 2, 3) mm, negative qform x (via a 180
/// degree quaternion about z), zeroed sform, one NaN voxel.
fn write_test_volume(dir: &Path) -> PathBuf {
    let mut data = Array3::<f32>::zeros((64, 64, 40));
    data[[1, 2, 3]] = 255.0;
    data[[0, 0, 0]] = f32::NAN;
    let header = NiftiHeader {
        pixdim: [1.0, 2.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0],
        quatern_d: 1.0,
        sform_code: 0,
        srow_x: [0.0; 4],
        srow_y: [0.0; 4],
        srow_z: [0.0; 4],
        ..Default::default()
    };
    let path = dir.join("test.nii");
    WriterOptions::new(&path)
        .reference_header(&header)
        .write_nifti(&data)
        .unwrap();
    path
}

#[test]
fn center_crosshair_and_orientation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_test_volume(dir.path());

    let vol = Volume::open(&path).unwrap();
    assert_eq!(vol.shape(), (64, 64, 40));
    assert_eq!(vol.spacing, [2.0, 2.0, 3.0]);
    assert!(vol.qform[(0, 0)] < 0.0);
    assert_eq!(vol.sform[(0, 0)], 0.0);

    let planes = slice::extract(&vol, None).unwrap();
    assert_eq!(planes.crosshair, SliceIndex { x: 32, y: 32, z: 20 });
    assert_eq!(orient::resolve(&vol.qform, &vol.sform), ("R", "L"));
}

#[test]
fn metadata_reflects_header_and_nan_zeroed_range() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_test_volume(dir.path());

    let vol = Volume::open(&path).unwrap();
    let text = meta::format_metadata(&vol);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Dimensions: 64 x 64 x 40");
    assert_eq!(lines[1], "Spacing: 2.0 x 2.0 x 3.0 mm");
    assert_eq!(lines[3], "Data type: float32");
    assert_eq!(lines[4], "Range: 0.0 - 255.0");
}

#[test]
fn requested_slice_maps_through_inversion() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_test_volume(dir.path());

    let vol = Volume::open(&path).unwrap();
    let planes = slice::extract(&vol, Some(10)).unwrap();
    assert_eq!(planes.crosshair, SliceIndex { x: 53, y: 53, z: 29 });
}

#[test]
fn out_of_range_slice_names_the_valid_range() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_test_volume(dir.path());

    let vol = Volume::open(&path).unwrap();
    let err = slice::extract(&vol, Some(100)).unwrap_err();
    assert!(matches!(
        err,
        PreviewError::OutOfBounds { requested: 100, max: 39 }
    ));
    assert!(err.to_string().contains("[0, 39]"), "{err}");
}

#[test]
fn volume_preview_composes_and_encodes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_test_volume(dir.path());

    let style = Style::new(50);
    let canvas = niiview::preview(&path, style.dpi, None).unwrap();
    assert_eq!(canvas.dimensions(), style.canvas_size());

    let bytes = sixel::encode(&canvas).unwrap();
    assert!(bytes.starts_with(b"\x1bP"));
    assert!(bytes.ends_with(b"\x1b\\"));
    assert!(bytes.iter().all(u8::is_ascii));
}

#[test]
fn flat_raster_preview_uses_native_color() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dot.png");
    image::RgbaImage::from_pixel(10, 10, image::Rgba([0, 200, 50, 255]))
        .save(&path)
        .unwrap();

    let canvas = niiview::preview(&path, 20, None).unwrap();
    assert_eq!(canvas.dimensions(), (100, 80));
    // square input letterboxed into the 5:4 canvas, center keeps its color
    assert_eq!(*canvas.get_pixel(50, 40), image::Rgba([0, 200, 50, 255]));
}
