//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Numeric degeneracies (flat images, collapsed ranges, tiny samples) are not
//! errors: they are absorbed by the pipeline and reported through
//! `RangeStatus`. Only configuration, shape and I/O problems surface here.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("JPEG encoding error: {0}")]
    Jpeg(#[from] jpeg_encoder::EncodingError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Invalid configuration: {param}={value}")]
    InvalidConfiguration { param: &'static str, value: String },

    #[error("Shape mismatch: {reason}")]
    ShapeMismatch { reason: String },

    #[error("Invalid frame buffer table entry at line {line}: {reason}")]
    FrameBufferConfig { line: usize, reason: String },

    #[error("Unknown frame buffer: {name}")]
    UnknownFrameBuffer { name: String },

    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),
}

impl Error {
    pub(crate) fn invalid<V: std::fmt::Display>(param: &'static str, value: V) -> Self {
        Error::InvalidConfiguration {
            param,
            value: value.to_string(),
        }
    }

    pub(crate) fn shape<S: Into<String>>(reason: S) -> Self {
        Error::ShapeMismatch {
            reason: reason.into(),
        }
    }
}
