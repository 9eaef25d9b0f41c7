//! Errors for out-of-range coordinate conversions.

use thiserror::Error;

/// Errors raised when converting raw values into board coordinates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("square index out of range: {0} (expected 0-63)")]
    SquareOutOfRange(u8),

    #[error("file index out of range: {0} (expected 0-7)")]
    FileOutOfRange(u8),

    #[error("rank index out of range: {0} (expected 0-7)")]
    RankOutOfRange(u8),

    #[error("invalid square notation: '{0}'")]
    InvalidSquare(String),
}
