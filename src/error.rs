//! Error types for the armlab library.

use thiserror::Error;

/// Result type alias for armlab operations.
pub type Result<T> = std::result::Result<T, ArmlabError>;

/// Errors that can occur while configuring or running experiments.
#[derive(Error, Debug)]
pub enum ArmlabError {
    /// Invalid parameter value or malformed parameter range.
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// A parameter name was not registered with the sweeper.
    #[error("unknown parameter: {name}")]
    UnknownParameter { name: String },

    /// Coordinate ascent ran out of passes before a pass left every default unchanged.
    #[error("parameter search did not converge after {passes} passes")]
    NotConverged { passes: usize },

    /// Filesystem error while persisting results or charts.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error while persisting results or charts.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
