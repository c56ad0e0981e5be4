//! Error types for header decoding.

use std::fmt;

use cursor::CursorError;

/// Result type for header decoding.
pub type HeaderResult<T> = Result<T, HeaderError>;

/// Errors that can occur while decoding the uncompressed header block.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderError {
    /// The save version predates the supported layout.
    UnsupportedVersion { version: f32 },

    /// A read ran past the end of the header block, or a string field was
    /// not valid UTF-8.
    Cursor(CursorError),
}

impl From<CursorError> for HeaderError {
    fn from(err: CursorError) -> Self {
        Self::Cursor(err)
    }
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { version } => {
                write!(f, "unsupported save version {version}")
            }
            Self::Cursor(err) => write!(f, "header read failed: {err}"),
        }
    }
}

impl std::error::Error for HeaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cursor(err) => Some(err),
            Self::UnsupportedVersion { .. } => None,
        }
    }
}
