//! The decode loop: operations in, timestamped commands out.

use crate::command::{Attributes, TimestampedCommand};
use crate::context::GameContext;
use crate::error::BodyResult;
use crate::ops::{OperationReader, RawOperation};
use crate::registry;

/// Decodes a body buffer into the ordered command sequence.
///
/// Syncs advance the running timestamp; commands are stamped with the
/// timestamp of the most recent sync strictly preceding them (several
/// commands can share one). Chat and game-start records only keep the
/// cursor aligned and are not emitted. After the stream is exhausted the
/// deferred ownership lookups are resolved once and applied in enqueue
/// order.
///
/// Timestamps are reporting-grade approximations of game time, not
/// simulation-exact values.
pub fn timestamped_commands(body: &[u8]) -> BodyResult<Vec<TimestampedCommand>> {
    let mut reader = OperationReader::new(body);
    let mut context = GameContext::new();
    let mut commands = Vec::new();

    loop {
        let offset = reader.offset();
        let Some(operation) = reader.next_operation()? else {
            break;
        };
        match operation {
            RawOperation::Sync(sync) => context.advance_time(sync.time_delta),
            RawOperation::Command(record) => {
                let index = commands.len();
                let attributes = match registry::decoder_for(record.command_type) {
                    Some(decoder) => decoder(&record.payload, &mut context, index)
                        .map_err(|err| err.in_command(record.command_type, offset))?,
                    None => Attributes::new(),
                };
                commands.push(TimestampedCommand {
                    command_type: record.command_type,
                    payload: record.payload,
                    timestamp: context.timestamp,
                    attributes,
                });
            }
            RawOperation::Chat(_) | RawOperation::GameStart => {}
        }
    }

    for (index, player_id) in context.resolve_deferred() {
        commands[index].set_player_id(player_id);
    }
    Ok(commands)
}
