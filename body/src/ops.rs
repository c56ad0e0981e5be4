//! Operation-level decoding of the body stream.
//!
//! The body is a flat sequence of discriminated records. Each iteration of
//! [`OperationReader`] reads one `u32` discriminant and then the record it
//! introduces: `1` is a command, `2` is a sync, `4` is the chat family
//! (which also carries game-start markers). Anything else is fatal.

use cursor::{ByteCursor, CursorError};

use crate::error::{BodyError, BodyResult};

/// Sentinel in a chat-family record marking a game start instead of a chat.
const GAME_START_SENTINEL: u32 = 0x1F4;
/// Sentinel in a chat-family record introducing a chat message.
const CHAT_SENTINEL: u32 = 0xFFFF_FFFF;

/// A player-issued command record.
///
/// The payload's first byte duplicates `command_type`; it is kept in place so
/// the raw bytes stay byte-for-byte what the file carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    pub command_type: u8,
    pub payload: Vec<u8>,
    /// Trailing word after the payload. Meaning unknown, preserved verbatim.
    pub trailing: u32,
}

/// A periodic sync record carrying the elapsed-time delta since the previous
/// sync.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncRecord {
    pub time_delta: i32,
    pub view_x: f32,
    pub view_y: f32,
    pub player_index: u32,
}

/// A chat message record. The message bytes are not assumed to be UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRecord {
    pub message: Vec<u8>,
}

/// One discriminated record from the body stream.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOperation {
    Command(CommandRecord),
    Sync(SyncRecord),
    Chat(ChatRecord),
    GameStart,
}

/// Single-pass reader over the operations stored in a body buffer.
///
/// The sequence is lazy and non-restartable unless [`rewind`](Self::rewind)
/// is called to re-seek to offset 0.
#[derive(Debug)]
pub struct OperationReader<'a> {
    cursor: ByteCursor<'a>,
}

impl<'a> OperationReader<'a> {
    /// Creates a reader positioned at the start of `body`.
    #[must_use]
    pub const fn new(body: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::new(body),
        }
    }

    /// Returns the stream offset of the next operation to read.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.cursor.tell()
    }

    /// Re-seeks to offset 0 so the stream can be walked again.
    pub fn rewind(&mut self) {
        self.cursor.seek(0);
    }

    /// Reads the next operation, or `Ok(None)` at a clean end of stream.
    ///
    /// End of data is clean only when it occurs on the discriminant read;
    /// running out of bytes inside a record is
    /// [`BodyError::TruncatedOperation`].
    pub fn next_operation(&mut self) -> BodyResult<Option<RawOperation>> {
        let offset = self.cursor.tell();
        let op_type = match self.cursor.read_u32() {
            Ok(value) => value,
            Err(CursorError::EndOfData { .. }) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let operation = match op_type {
            1 => read_command(&mut self.cursor),
            2 => read_sync(&mut self.cursor),
            4 => read_chat_or_start(&mut self.cursor, offset),
            other => Err(BodyError::UnknownOperation {
                op_type: other,
                offset,
            }),
        };

        operation
            .map(Some)
            .map_err(|err| match err {
                BodyError::Cursor(CursorError::EndOfData { .. }) => {
                    BodyError::TruncatedOperation { offset }
                }
                other => other,
            })
    }
}

fn read_command(cursor: &mut ByteCursor<'_>) -> BodyResult<RawOperation> {
    let length = cursor.read_u32()?;
    let payload = cursor.read(length as usize)?.to_vec();
    let trailing = cursor.read_u32()?;
    // The command type is the first payload byte, read through a fresh
    // cursor so the payload itself stays untouched.
    let command_type = ByteCursor::new(&payload).read_u8()?;
    Ok(RawOperation::Command(CommandRecord {
        command_type,
        payload,
        trailing,
    }))
}

fn read_sync(cursor: &mut ByteCursor<'_>) -> BodyResult<RawOperation> {
    let time_delta = cursor.read_s32()?;
    // A zero in this word means a 28-byte block follows before the view
    // coordinates. Version-dependent, meaning unknown.
    let lookahead = cursor.read_u32()?;
    if lookahead == 0 {
        cursor.read(28)?;
    }
    let view_x = cursor.read_f32()?;
    let view_y = cursor.read_f32()?;
    let player_index = cursor.read_u32()?;
    Ok(RawOperation::Sync(SyncRecord {
        time_delta,
        view_x,
        view_y,
        player_index,
    }))
}

fn read_chat_or_start(cursor: &mut ByteCursor<'_>, offset: usize) -> BodyResult<RawOperation> {
    let sentinel = cursor.read_u32()?;
    if sentinel == GAME_START_SENTINEL {
        cursor.read(20)?; // unknown block, no payload captured
        return Ok(RawOperation::GameStart);
    }
    if sentinel != CHAT_SENTINEL {
        return Err(BodyError::BadChatSentinel {
            found: sentinel,
            offset,
        });
    }
    let length = cursor.read_u32()?;
    let message = cursor.read(length as usize)?.to_vec();
    Ok(RawOperation::Chat(ChatRecord { message }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_command(out: &mut Vec<u8>, payload: &[u8], trailing: u32) {
        out.extend_from_slice(&1u32.to_le_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        out.extend_from_slice(&trailing.to_le_bytes());
    }

    fn push_sync(out: &mut Vec<u8>, time_delta: i32) {
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&time_delta.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes()); // non-zero: no pad block
        out.extend_from_slice(&3.0f32.to_le_bytes());
        out.extend_from_slice(&4.0f32.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());
    }

    #[test]
    fn empty_body_terminates_cleanly() {
        let mut reader = OperationReader::new(&[]);
        assert_eq!(reader.next_operation().unwrap(), None);
    }

    #[test]
    fn reads_command_record() {
        let mut data = Vec::new();
        push_command(&mut data, &[0x81, 0xAA, 0xBB], 7);
        let mut reader = OperationReader::new(&data);
        let op = reader.next_operation().unwrap().unwrap();
        let RawOperation::Command(record) = op else {
            panic!("expected command, got {op:?}");
        };
        assert_eq!(record.command_type, 0x81);
        assert_eq!(record.payload, vec![0x81, 0xAA, 0xBB]);
        assert_eq!(record.trailing, 7);
        assert_eq!(reader.next_operation().unwrap(), None);
    }

    #[test]
    fn reads_sync_record() {
        let mut data = Vec::new();
        push_sync(&mut data, -250);
        let mut reader = OperationReader::new(&data);
        let op = reader.next_operation().unwrap().unwrap();
        let RawOperation::Sync(sync) = op else {
            panic!("expected sync, got {op:?}");
        };
        assert_eq!(sync.time_delta, -250);
        assert_eq!(sync.player_index, 1);
    }

    #[test]
    fn sync_with_zero_lookahead_skips_pad_block() {
        let mut data = Vec::new();
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&100i32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 28]);
        data.extend_from_slice(&1.0f32.to_le_bytes());
        data.extend_from_slice(&2.0f32.to_le_bytes());
        data.extend_from_slice(&5u32.to_le_bytes());
        let mut reader = OperationReader::new(&data);
        let op = reader.next_operation().unwrap().unwrap();
        let RawOperation::Sync(sync) = op else {
            panic!("expected sync, got {op:?}");
        };
        assert_eq!(sync.time_delta, 100);
        assert_eq!(sync.player_index, 5);
        assert_eq!(reader.next_operation().unwrap(), None);
    }

    #[test]
    fn reads_chat_record() {
        let mut data = Vec::new();
        data.extend_from_slice(&4u32.to_le_bytes());
        data.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(b"gg");
        let mut reader = OperationReader::new(&data);
        let op = reader.next_operation().unwrap().unwrap();
        assert_eq!(
            op,
            RawOperation::Chat(ChatRecord {
                message: b"gg".to_vec()
            })
        );
    }

    #[test]
    fn reads_game_start_record() {
        let mut data = Vec::new();
        data.extend_from_slice(&4u32.to_le_bytes());
        data.extend_from_slice(&0x1F4u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 20]);
        let mut reader = OperationReader::new(&data);
        assert_eq!(
            reader.next_operation().unwrap(),
            Some(RawOperation::GameStart)
        );
        assert_eq!(reader.next_operation().unwrap(), None);
    }

    #[test]
    fn bad_chat_sentinel_is_fatal() {
        let mut data = Vec::new();
        push_sync(&mut data, 1);
        let chat_offset = data.len();
        data.extend_from_slice(&4u32.to_le_bytes());
        data.extend_from_slice(&0x1234u32.to_le_bytes());
        let mut reader = OperationReader::new(&data);
        reader.next_operation().unwrap();
        let err = reader.next_operation().unwrap_err();
        assert_eq!(
            err,
            BodyError::BadChatSentinel {
                found: 0x1234,
                offset: chat_offset,
            }
        );
    }

    #[test]
    fn unknown_operation_type_is_fatal() {
        let mut data = Vec::new();
        data.extend_from_slice(&9u32.to_le_bytes());
        let mut reader = OperationReader::new(&data);
        let err = reader.next_operation().unwrap_err();
        assert_eq!(
            err,
            BodyError::UnknownOperation {
                op_type: 9,
                offset: 0,
            }
        );
    }

    #[test]
    fn truncated_record_is_fatal_not_clean_eof() {
        let mut data = Vec::new();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&100u32.to_le_bytes()); // declares 100 payload bytes
        data.extend_from_slice(&[0u8; 10]);
        let mut reader = OperationReader::new(&data);
        let err = reader.next_operation().unwrap_err();
        assert_eq!(err, BodyError::TruncatedOperation { offset: 0 });
    }

    #[test]
    fn empty_command_payload_is_truncated() {
        let mut data = Vec::new();
        push_command(&mut data, &[], 0);
        let mut reader = OperationReader::new(&data);
        let err = reader.next_operation().unwrap_err();
        assert_eq!(err, BodyError::TruncatedOperation { offset: 0 });
    }

    #[test]
    fn rewind_restarts_the_stream() {
        let mut data = Vec::new();
        push_sync(&mut data, 42);
        let mut reader = OperationReader::new(&data);
        assert!(reader.next_operation().unwrap().is_some());
        assert_eq!(reader.next_operation().unwrap(), None);
        reader.rewind();
        assert_eq!(reader.offset(), 0);
        assert!(reader.next_operation().unwrap().is_some());
    }
}
