//! Errors surfaced by the command-line tools.

use std::path::PathBuf;

use colony_core::error::ColonyError;
use colony_core::fleet::DispatchError;
use colony_core::production::ConstructionError;
use thiserror::Error;

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

/// Anything a `colony` subcommand can fail with.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Reading or writing a file failed.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Engine, data or store failure.
    #[error(transparent)]
    Colony(#[from] ColonyError),

    /// An order was rejected.
    #[error("order rejected: {0}")]
    Construction(#[from] ConstructionError),

    /// A fleet was rejected.
    #[error("dispatch rejected: {0}")]
    Dispatch(#[from] DispatchError),

    /// Command-line input that could not be understood.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ToolError {
    /// Wrap an I/O failure on `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
