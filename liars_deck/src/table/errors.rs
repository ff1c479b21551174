//! Table error types.

use thiserror::Error;

use crate::game::MatchError;

/// Errors surfaced through a [`TableHandle`](super::TableHandle)
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TableError {
    /// The match rejected the operation
    #[error(transparent)]
    Match(#[from] MatchError),

    /// The table actor has shut down
    #[error("table is closed")]
    Closed,

    /// Configuration rejected before the table opened
    #[error("invalid table configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;
