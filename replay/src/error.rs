use std::fmt;
use std::io;

use body::BodyError;
use header::HeaderError;

/// Errors opening or slicing a recorded-game file.
#[derive(Debug)]
pub enum ReplayError {
    /// The file is smaller than its own header-length field claims.
    BadFraming { header_len: usize, file_len: usize },
    /// The deflate stream in the header block is corrupt.
    Inflate(io::Error),
    /// The inflated header block failed to decode.
    Header(HeaderError),
    /// The operation stream failed to decode.
    Body(BodyError),
    /// Reading the file from disk failed.
    Io(io::Error),
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadFraming {
                header_len,
                file_len,
            } => write!(
                f,
                "header length {header_len} exceeds file length {file_len}"
            ),
            Self::Inflate(err) => write!(f, "header block failed to inflate: {err}"),
            Self::Header(err) => write!(f, "header decode failed: {err}"),
            Self::Body(err) => write!(f, "body decode failed: {err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BadFraming { .. } => None,
            Self::Inflate(err) | Self::Io(err) => Some(err),
            Self::Header(err) => Some(err),
            Self::Body(err) => Some(err),
        }
    }
}

impl From<HeaderError> for ReplayError {
    fn from(err: HeaderError) -> Self {
        Self::Header(err)
    }
}

impl From<BodyError> for ReplayError {
    fn from(err: BodyError) -> Self {
        Self::Body(err)
    }
}

pub type ReplayResult<T> = Result<T, ReplayError>;
