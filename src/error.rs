use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the drawing model, export pipeline and session.
///
/// Every variant is recoverable: callers report it to the user and carry on with
/// the canvas exactly as it was before the failed call.
#[derive(Debug, Error)]
pub enum DrawingError {
    #[error("Invalid color format: {0:?}")]
    InvalidColorFormat(String),

    #[error("Invalid brush size: {0}")]
    InvalidBrushSize(f32),

    #[error("Cannot capture an empty view ({width}x{height})")]
    EmptyBounds { width: u32, height: u32 },

    #[error("I/O failure on {}: {source}", path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("An export is already in progress")]
    ExportInFlight,

    #[error("Export worker stopped before reporting a result")]
    ExportAborted,
}

impl DrawingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoFailure {
            path: path.into(),
            source,
        }
    }
}

/// Result type for drawing operations
pub type DrawingResult<T> = Result<T, DrawingError>;
