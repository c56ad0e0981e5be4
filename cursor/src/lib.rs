//! Positioned little-endian byte reading for recorded-game decoding.
//!
//! This crate provides [`ByteCursor`], the reader shared by every decoder in
//! the workspace: fixed-width little-endian reads, exact-length byte reads,
//! and the length-prefixed string encoding used by replay headers.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads are bounds-checked.
//! - **No domain knowledge** - This crate knows nothing about operations,
//!   commands, or game state.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!   Running out of bytes is a distinguished condition
//!   ([`CursorError::EndOfData`]) because it is how stream iteration ends.
//!
//! # Example
//!
//! ```
//! use cursor::ByteCursor;
//!
//! let data = [0x2A, 0x00, 0x00, 0x00];
//! let mut cursor = ByteCursor::new(&data);
//! assert_eq!(cursor.read_u32().unwrap(), 42);
//! assert!(cursor.is_empty());
//! ```

mod error;
mod reader;

pub use error::{CursorError, CursorResult};
pub use reader::{ByteCursor, STRING_TAG};
