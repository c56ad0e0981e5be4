//! Loading of recorded-game files.
//!
//! A file is a 4-byte header length, 4 bytes of unknown framing, a raw
//! deflate stream holding the header block, and then the uncompressed
//! operation stream. [`RecordedGame`] does the splitting and inflation
//! and hands the two halves to the `header` and `body` crates.

mod error;
mod game;

pub use error::{ReplayError, ReplayResult};
pub use game::RecordedGame;
