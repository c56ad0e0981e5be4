//! Body-stream decoding for recorded games.
//!
//! The body of a recorded game is a flat binary log of operations: player
//! commands, time syncs, chat, and a game-start marker. This crate walks
//! that log in a single forward pass and produces the ordered sequence of
//! [`TimestampedCommand`] the reporting layer consumes.
//!
//! Two facts are not explicit in any single record and have to be inferred
//! across the whole stream:
//!
//! - **Elapsed time**: only syncs carry time deltas; commands are stamped
//!   with the running total at the point they appear.
//! - **Object ownership**: many commands act on objects whose owner is
//!   revealed only by a *later* record (training a unit names the
//!   building's owner; an earlier garrison into that building did not).
//!   [`GameContext`] accumulates ownership facts and queues the lookups
//!   that cannot be answered yet; the queue is resolved exactly once after
//!   the stream ends.
//!
//! # Design Principles
//!
//! - **Single pass, stream order** - Attribute decoders run synchronously
//!   as each command is read, so context mutations happen in stream order.
//! - **Graceful unknowns** - Unrecognized command types decode to a
//!   generic, attribute-less command; unknown layout fields are skipped
//!   with explicit byte counts, never guessed.
//! - **Fatal means fatal** - Malformed framing aborts the run with offset
//!   and command context; nothing is silently resynchronized.

mod command;
mod commands;
mod context;
mod driver;
mod error;
mod ops;
mod registry;

pub use command::{AttrValue, Attributes, TimestampedCommand};
pub use commands::{GarrisonKind, MultipurposeAction, ResourceKind, StanceKind};
pub use context::{GameContext, GameObject, LookupKey, ObjectKind};
pub use driver::timestamped_commands;
pub use error::{BodyError, BodyResult};
pub use ops::{ChatRecord, CommandRecord, OperationReader, RawOperation, SyncRecord};
pub use registry::{command_name, display_command_name};
