//! # niiview
//!
//! Quick terminal previews of nifti volumes and png/jpeg images.
//!
//! A nifti file is reduced to its three middle orthogonal slices (or the
//! slices at a requested index), composed with crosshairs, orientation
//! labels and the header metadata into a single dark-background canvas,
//! and written to the terminal as a sixel escape sequence. Flat raster
//! images skip the slicing and fill the canvas in native color.
//!
//! The canvas can also be kept in memory for further processing:
//!
//! ```no_run
//! let canvas = niiview::preview("brain.nii.gz", niiview::DEFAULT_DPI, None)?;
//! canvas.save("preview.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::Path;

use image::RgbaImage;

pub mod error;
pub mod font;
pub mod meta;
pub mod orient;
pub mod output;
pub mod render;
pub mod sixel;
pub mod slice;
pub mod volume;

pub use error::{PreviewError, Result};
pub use output::OutputSink;
pub use render::Style;
pub use slice::{SliceIndex, SlicePlanes};
pub use volume::Volume;

/// Library-level default plotting resolution.
pub const DEFAULT_DPI: u32 = 150;

/// Volumetric inputs are picked by suffix, everything else is treated as a
/// flat raster image.
pub fn is_nifti_file<P: AsRef<Path>>(path: P) -> bool {
    let name = path
        .as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    name.ends_with(".nii") || name.ends_with(".nii.gz")
}

/// Compose the preview canvas for a nifti or raster file.
///
/// `slice_index` selects a single slice for volumetric inputs; `None`
/// shows the middle of each axis.
pub fn preview<P: AsRef<Path>>(
    path: P,
    dpi: u32,
    slice_index: Option<usize>,
) -> Result<RgbaImage> {
    let path = path.as_ref();
    let style = Style::new(dpi);
    if is_nifti_file(path) {
        let vol = Volume::open(path)?;
        let planes = slice::extract(&vol, slice_index)?;
        let labels = orient::resolve(&vol.qform, &vol.sform);
        render::compose(&vol, &planes, labels, &style)
    } else {
        if !path.exists() {
            return Err(PreviewError::InputNotFound(path.display().to_string()));
        }
        let img = image::open(path)?;
        render::compose_flat(&img, &style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nifti_suffix_detection_is_case_insensitive() {
        assert!(is_nifti_file("brain.nii"));
        assert!(is_nifti_file("brain.nii.gz"));
        assert!(is_nifti_file("BRAIN.NII.GZ"));
        assert!(!is_nifti_file("brain.png"));
        assert!(!is_nifti_file("brain.nii.zip"));
    }

    #[test]
    fn missing_input_is_reported_before_decoding() {
        let err = preview("no-such-file.png", DEFAULT_DPI, None).unwrap_err();
        assert!(matches!(err, PreviewError::InputNotFound(_)));
        let err = preview("no-such-file.nii", DEFAULT_DPI, None).unwrap_err();
        assert!(matches!(err, PreviewError::InputNotFound(_)));
    }
}
