use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while running a sketch session.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SketchError {
    /// The frame source stopped delivering frames. Ends the session.
    #[error("frame source failed: {0}")]
    FrameSource(String),

    #[error("display failed: {0}")]
    Display(String),

    #[error("failed to save drawing to {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("landmark replay line {line}: {message}")]
    Replay { line: usize, message: String },

    #[error("raster is {actual_width}x{actual_height}, expected {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
