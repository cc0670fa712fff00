//! Error types for the colony engine.
//!
//! Routine command rejections have their own enums
//! ([`ConstructionError`](crate::production::ConstructionError),
//! [`DispatchError`](crate::fleet::DispatchError)); [`ColonyError`] covers
//! data, persistence and serialization failures around the simulation.

use thiserror::Error;

/// Result type alias using [`ColonyError`].
pub type Result<T> = std::result::Result<T, ColonyError>;

/// Top-level error type for the engine and its stores.
#[derive(Debug, Error)]
pub enum ColonyError {
    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path (or other origin) of the data that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Static data loaded but failed validation.
    #[error("Invalid static data: {}", .0.join("; "))]
    InvalidData(Vec<String>),

    /// Colony snapshot could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// A colony store failed to read or write.
    #[error("Storage failure for '{player}': {message}")]
    Storage {
        /// Player whose colony was being accessed.
        player: String,
        /// Error message.
        message: String,
    },

    /// Invalid colony state.
    #[error("Invalid colony state: {0}")]
    InvalidState(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_data_lists_every_issue() {
        let err = ColonyError::InvalidData(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Invalid static data: a; b");
    }

    #[test]
    fn test_storage_message() {
        let err = ColonyError::Storage {
            player: "alice".into(),
            message: "disk full".into(),
        };
        assert!(err.to_string().contains("alice"));
        assert!(err.to_string().contains("disk full"));
    }
}
