//! The on-disk container: a length-prefixed deflate-compressed header
//! block followed by the uncompressed operation stream.

use std::fs;
use std::io::Read;
use std::path::Path;

use body::TimestampedCommand;
use cursor::ByteCursor;
use flate2::read::DeflateDecoder;
use header::{read_version, GameHeader};
use tracing::debug;

use crate::error::{ReplayError, ReplayResult};

/// Bytes of framing before the compressed header block starts: the
/// header-length word and one word of unknown purpose.
const FRAMING_LEN: usize = 8;

/// A loaded recorded-game file.
///
/// Holds the raw bytes; the header is inflated and decoded on demand,
/// while the body is a plain slice starting right after the compressed
/// block.
pub struct RecordedGame {
    data: Vec<u8>,
    header_len: usize,
}

impl RecordedGame {
    /// Wraps an in-memory file, validating the framing lengths.
    pub fn new(data: Vec<u8>) -> ReplayResult<Self> {
        let mut cursor = ByteCursor::new(&data);
        let header_len = cursor
            .read_u32()
            .map_err(|_| ReplayError::BadFraming {
                header_len: FRAMING_LEN,
                file_len: data.len(),
            })? as usize;
        if header_len < FRAMING_LEN || header_len > data.len() {
            return Err(ReplayError::BadFraming {
                header_len,
                file_len: data.len(),
            });
        }
        debug!(header_len, file_len = data.len(), "opened recorded game");
        Ok(Self { data, header_len })
    }

    /// Reads and wraps a file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> ReplayResult<Self> {
        let data = fs::read(path).map_err(ReplayError::Io)?;
        Self::new(data)
    }

    /// Inflates the header block to its raw bytes.
    pub fn header_bytes(&self) -> ReplayResult<Vec<u8>> {
        let compressed = &self.data[FRAMING_LEN..self.header_len];
        let mut inflated = Vec::new();
        DeflateDecoder::new(compressed)
            .read_to_end(&mut inflated)
            .map_err(ReplayError::Inflate)?;
        debug!(inflated_len = inflated.len(), "inflated header block");
        Ok(inflated)
    }

    /// Inflates and decodes the header.
    pub fn header(&self) -> ReplayResult<GameHeader> {
        let bytes = self.header_bytes()?;
        let mut cursor = ByteCursor::new(&bytes);
        Ok(GameHeader::decode(&mut cursor)?)
    }

    /// Reads the version tag and subversion without a full header decode.
    pub fn version(&self) -> ReplayResult<(String, f32)> {
        let bytes = self.header_bytes()?;
        let mut cursor = ByteCursor::new(&bytes);
        let version = read_version(&mut cursor)
            .map_err(ReplayError::Header)?;
        Ok(version)
    }

    /// The uncompressed operation stream.
    #[must_use]
    pub fn body_bytes(&self) -> &[u8] {
        &self.data[self.header_len..]
    }

    /// Decodes the operation stream into timestamped, attributed commands.
    pub fn commands(&self) -> ReplayResult<Vec<TimestampedCommand>> {
        Ok(body::timestamped_commands(self.body_bytes())?)
    }
}
