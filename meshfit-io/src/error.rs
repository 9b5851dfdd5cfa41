//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Unsupported file format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Write error: {message}")]
    WriteError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IoError> for meshfit_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io(e) => meshfit_core::Error::Io(e),
            IoError::UnsupportedFormat { format } => meshfit_core::Error::UnsupportedFormat(format),
            other => meshfit_core::Error::InvalidData(other.to_string()),
        }
    }
}

/// Open `path` for reading, reporting a missing file by name.
pub(crate) fn open(path: &std::path::Path) -> Result<std::fs::File, IoError> {
    std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => IoError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => IoError::Io(e),
    })
}
