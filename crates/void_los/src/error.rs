//! Error types for geometry loading and configuration

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while setting up the line-of-sight index
///
/// Queries never fail; only configuration and mesh loading report errors.
#[derive(Debug, Error)]
pub enum LosError {
    /// File could not be read
    #[error("I/O error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Mesh file contents are malformed
    #[error("Malformed mesh {path:?} at line {line}: {message}")]
    MeshParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// TOML could not be deserialized
    #[error("TOML parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration parsed but is not usable
    #[error("Invalid LOS configuration: {0}")]
    InvalidConfig(String),
}

impl LosError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for LOS setup operations
pub type Result<T> = std::result::Result<T, LosError>;
