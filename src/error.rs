//! Error types for niiview.

use thiserror::Error;

/// Result type alias for preview operations.
pub type Result<T> = std::result::Result<T, PreviewError>;

/// Everything that can go wrong between reading a file and writing
/// image bytes to the terminal.
#[derive(Error, Debug)]
pub enum PreviewError {
    /// Input path does not exist or cannot be read.
    #[error("input file not found: {0}")]
    InputNotFound(String),

    /// Volume rank outside {3, 4}.
    #[error("unsupported volume rank {0}, expected a 3D or 4D image")]
    UnsupportedRank(usize),

    /// Requested slice index outside the smallest axis.
    #[error("slice {requested} is out of bounds, valid range is [0, {max}]")]
    OutOfBounds { requested: usize, max: usize },

    /// Degenerate (zero-sized) slice, nothing to render.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A required terminal-display capability is missing.
    #[error("{0}")]
    CapabilityUnavailable(String),

    /// A display helper subprocess could not be run or exited nonzero.
    #[error("external command `{command}` failed: {reason}")]
    ExternalProcess { command: String, reason: String },

    /// Error from the nifti reader.
    #[error("nifti error: {0}")]
    Nifti(#[from] nifti::error::NiftiError),

    /// Error from raster image decoding/encoding.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error while writing to the terminal or a pipe.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
