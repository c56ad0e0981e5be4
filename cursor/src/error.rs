//! Error types for cursor reads.

use std::fmt;

/// Result type for cursor reads.
pub type CursorResult<T> = Result<T, CursorError>;

/// Errors that can occur while reading from a [`crate::ByteCursor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    /// A fixed-width or exact-length read ran past the end of the buffer.
    ///
    /// This is the distinguished end-of-data signal: the body-stream reader
    /// treats it as clean termination when it occurs on an operation
    /// boundary, and as a truncation error everywhere else.
    EndOfData {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// A length-prefixed string was not valid UTF-8.
    InvalidString {
        /// Cursor position (relative to the base offset) of the string body.
        position: usize,
    },
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfData {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bytes but only {available} bytes available"
                )
            }
            Self::InvalidString { position } => {
                write!(f, "string at position {position} is not valid UTF-8")
            }
        }
    }
}

impl std::error::Error for CursorError {}
