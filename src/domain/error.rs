use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetadataError {
    NotFound(String),
    PermissionDenied(String),
    UnsupportedFormat(String),
    DecodeFailure(String),
    Corrupt(String),
    TooLarge(String),
    InvalidConfig(String),
    IoError(String),
}

impl MetadataError {
    /// Stable upper-snake code reported to tool callers
    pub fn code(&self) -> &'static str {
        match self {
            MetadataError::NotFound(_) => "NOT_FOUND",
            MetadataError::PermissionDenied(_) => "PERMISSION_DENIED",
            MetadataError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            MetadataError::DecodeFailure(_) => "DECODE_FAILURE",
            MetadataError::Corrupt(_) => "CORRUPT",
            MetadataError::TooLarge(_) => "TOO_LARGE",
            MetadataError::InvalidConfig(_) => "INVALID_CONFIG",
            MetadataError::IoError(_) => "IO_ERROR",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            MetadataError::NotFound(msg)
            | MetadataError::PermissionDenied(msg)
            | MetadataError::UnsupportedFormat(msg)
            | MetadataError::DecodeFailure(msg)
            | MetadataError::Corrupt(msg)
            | MetadataError::TooLarge(msg)
            | MetadataError::InvalidConfig(msg)
            | MetadataError::IoError(msg) => msg,
        }
    }

    /// Map an I/O failure on `path` onto the error taxonomy, keeping the path in the message
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        let msg = format!("{}: {}", path.display(), err);
        match err.kind() {
            io::ErrorKind::NotFound => MetadataError::NotFound(msg),
            io::ErrorKind::PermissionDenied => MetadataError::PermissionDenied(msg),
            _ => MetadataError::IoError(msg),
        }
    }
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataError::NotFound(msg) => write!(f, "Not found: {}", msg),
            MetadataError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            MetadataError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
            MetadataError::DecodeFailure(msg) => write!(f, "Decode failure: {}", msg),
            MetadataError::Corrupt(msg) => write!(f, "Corrupt file: {}", msg),
            MetadataError::TooLarge(msg) => write!(f, "File too large: {}", msg),
            MetadataError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            MetadataError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for MetadataError {}

impl From<io::Error> for MetadataError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => MetadataError::NotFound(err.to_string()),
            io::ErrorKind::PermissionDenied => MetadataError::PermissionDenied(err.to_string()),
            _ => MetadataError::IoError(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, MetadataError>;
