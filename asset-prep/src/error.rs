//! Error handling for pipeline operations

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding, normalizing, or exporting assets
#[derive(Error, Debug)]
pub enum Error {
    /// Asset decode failed; no partial scene is mounted
    #[error("Decode failed: {message}")]
    DecodeFailed { message: String },

    /// Export/serialization failed
    #[error("Export failed: {message}")]
    ExportFailed { message: String },

    /// Invalid parameters or configuration
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// Unsupported asset container format
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    IoError { message: String },

    /// Scene data is structurally invalid
    #[error("Invalid scene: {message}")]
    InvalidScene { message: String },

    /// Thumbnail render/readback failed
    #[error("Capture failed: {message}")]
    CaptureFailed { message: String },

    /// Generic error with custom message
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a new decode error
    pub fn decode_failed<S: Into<String>>(message: S) -> Self {
        Self::DecodeFailed {
            message: message.into(),
        }
    }

    /// Create a new export error
    pub fn export_failed<S: Into<String>>(message: S) -> Self {
        Self::ExportFailed {
            message: message.into(),
        }
    }

    /// Create a new invalid parameter error
    pub fn invalid_parameter<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(format: S) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Create a new I/O error
    pub fn io_error<S: Into<String>>(message: S) -> Self {
        Self::IoError {
            message: message.into(),
        }
    }

    /// Create a new invalid scene error
    pub fn invalid_scene<S: Into<String>>(message: S) -> Self {
        Self::InvalidScene {
            message: message.into(),
        }
    }

    /// Create a new capture error
    pub fn capture_failed<S: Into<String>>(message: S) -> Self {
        Self::CaptureFailed {
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}
