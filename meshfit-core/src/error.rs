//! Error types for meshfit

use thiserror::Error;

/// Main error type for meshfit operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Face {face} references vertex {vertex}, but the mesh has {vertex_count} vertices")]
    InvalidVertexIndex {
        face: usize,
        vertex: usize,
        vertex_count: usize,
    },

    #[error("Mesh has no faces")]
    EmptyMesh,

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

/// Result type alias for meshfit operations
pub type Result<T> = std::result::Result<T, Error>;
