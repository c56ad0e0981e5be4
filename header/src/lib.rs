//! Decoding of the inflated header block of a recorded game.
//!
//! The header carries the lobby configuration and the fixed eight player
//! slots. Only the fields useful for reporting are surfaced; alignment
//! words and unidentified fields are consumed in place.

mod decode;
mod error;

pub use decode::{read_version, GameHeader, PlayerSlot};
pub use error::{HeaderError, HeaderResult};
