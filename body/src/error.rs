//! Error types for body-stream decoding.

use std::fmt;

use cursor::CursorError;

/// Result type for body-stream decoding.
pub type BodyResult<T> = Result<T, BodyError>;

/// Fatal decode errors for the body stream.
///
/// None of these are locally recoverable: the stream position is unreliable
/// after any of them, so the whole decode run aborts. Clean end of stream is
/// not an error; it is signalled by `Ok(None)` from
/// [`crate::OperationReader::next_operation`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BodyError {
    /// The operation discriminant was not one of the known values (1, 2, 4).
    UnknownOperation { op_type: u32, offset: usize },

    /// The stream ended in the middle of an operation record.
    ///
    /// End of data is only valid on an operation boundary, before the
    /// discriminant of the next record.
    TruncatedOperation { offset: usize },

    /// A chat-family record led with a value that is neither the game-start
    /// sentinel (`0x1F4`) nor the chat sentinel (`0xFFFFFFFF`).
    BadChatSentinel { found: u32, offset: usize },

    /// A command payload ended before its declared fixed layout.
    TruncatedPayload {
        command_type: u8,
        /// Stream offset of the operation the payload came from.
        offset: usize,
        requested: usize,
        available: usize,
    },

    /// A GARRISON cancel selected something other than exactly one object.
    CancelSelection { selected: usize },

    /// A cursor error that occurred outside a command payload.
    Cursor(CursorError),
}

impl BodyError {
    /// Attaches command context to an error raised inside a payload decoder.
    #[must_use]
    pub(crate) fn in_command(self, command_type: u8, offset: usize) -> Self {
        match self {
            Self::Cursor(CursorError::EndOfData {
                requested,
                available,
            }) => Self::TruncatedPayload {
                command_type,
                offset,
                requested,
                available,
            },
            other => other,
        }
    }
}

impl From<CursorError> for BodyError {
    fn from(err: CursorError) -> Self {
        Self::Cursor(err)
    }
}

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOperation { op_type, offset } => {
                write!(f, "unknown operation type {op_type} at offset {offset}")
            }
            Self::TruncatedOperation { offset } => {
                write!(f, "stream ended inside the operation at offset {offset}")
            }
            Self::BadChatSentinel { found, offset } => {
                write!(
                    f,
                    "unexpected chat sentinel {found:#x} at offset {offset}"
                )
            }
            Self::TruncatedPayload {
                command_type,
                offset,
                requested,
                available,
            } => {
                write!(
                    f,
                    "command {command_type:#04x} at offset {offset} is truncated: \
                     needed {requested} bytes, had {available}"
                )
            }
            Self::CancelSelection { selected } => {
                write!(
                    f,
                    "garrison cancel selects {selected} objects, expected exactly 1"
                )
            }
            Self::Cursor(err) => write!(f, "cursor error: {err}"),
        }
    }
}

impl std::error::Error for BodyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cursor(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_operation() {
        let err = BodyError::UnknownOperation {
            op_type: 7,
            offset: 128,
        };
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains("128"));
    }

    #[test]
    fn display_bad_chat_sentinel() {
        let err = BodyError::BadChatSentinel {
            found: 0xABCD,
            offset: 4,
        };
        assert!(err.to_string().contains("0xabcd"));
    }

    #[test]
    fn in_command_upgrades_end_of_data() {
        let err = BodyError::from(CursorError::EndOfData {
            requested: 4,
            available: 1,
        });
        let err = err.in_command(0x75, 200);
        assert_eq!(
            err,
            BodyError::TruncatedPayload {
                command_type: 0x75,
                offset: 200,
                requested: 4,
                available: 1,
            }
        );
    }

    #[test]
    fn in_command_leaves_other_errors_alone() {
        let err = BodyError::CancelSelection { selected: 3 };
        assert_eq!(
            err.clone().in_command(0x75, 0),
            BodyError::CancelSelection { selected: 3 }
        );
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<BodyError>();
    }
}
