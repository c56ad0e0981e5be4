//! Command-type registry: numeric type byte → name and decoder.

use crate::command::Attributes;
use crate::commands;
use crate::context::GameContext;
use crate::error::BodyResult;

/// An attribute decoder for one command type.
///
/// Takes the raw payload, the shared decode context, and the index the
/// command will occupy in the output sequence (the target for deferred
/// ownership lookups).
pub(crate) type DecoderFn = fn(&[u8], &mut GameContext, usize) -> BodyResult<Attributes>;

/// Returns the registered name for a command-type byte.
#[must_use]
pub fn command_name(command_type: u8) -> Option<&'static str> {
    Some(match command_type {
        0x00 => "ATTACK",
        0x01 => "STOP",
        0x02 => "AI_PRIMARY",
        0x03 => "MOVE",
        0x0A => "AI_MOVE",
        0x0B => "RESIGN",
        0x10 => "WAYPOINT",
        0x12 => "STANCE",
        0x13 => "GUARD",
        0x14 => "FOLLOW",
        0x15 => "PATROL",
        0x17 => "FORMATION",
        0x1B => "SAVEEXIT",
        0x1F => "AI_COORD",
        0x64 => "AI_TRAIN",
        0x65 => "RESEARCH",
        0x66 => "BUILD",
        0x67 => "MULTIPURPOSE",
        0x69 => "WALL",
        0x6A => "DELETE",
        0x6B => "ATTACKGROUND",
        0x6C => "TRIBUTE",
        0x6E => "REPAIR",
        0x6F => "UNGARRISON",
        0x72 => "GATE",
        0x73 => "FLAIR",
        0x75 => "GARRISON",
        0x77 => "TRAIN",
        0x78 => "RALLY",
        0x7A => "SELL",
        0x7B => "BUY",
        0x7E => "DROPRELIC",
        0x7F => "TOWNBELL",
        0x80 => "BACKTOWORK",
        0x81 => "TRAIN2",
        0xFF => "POSTGAME",
        _ => return None,
    })
}

/// Returns the registered name, or `UNKNOWN <hex>` for unregistered types.
#[must_use]
pub fn display_command_name(command_type: u8) -> String {
    command_name(command_type)
        .map_or_else(|| format!("UNKNOWN {command_type:02x}"), str::to_owned)
}

/// Returns the attribute decoder for a command type, where one exists.
///
/// Types with a name but no decoder (resigns, AI bookkeeping, postgame)
/// produce commands with an empty attribute mapping.
pub(crate) fn decoder_for(command_type: u8) -> Option<DecoderFn> {
    Some(match command_type {
        0x00 => commands::decode_attack,
        0x01 => commands::decode_stop,
        0x03 => commands::decode_move,
        0x10 => commands::decode_waypoint,
        0x12 => commands::decode_stance,
        0x13 => commands::decode_guard,
        0x65 => commands::decode_research,
        0x66 => commands::decode_build,
        0x67 => commands::decode_multipurpose,
        0x69 => commands::decode_wall,
        0x6A => commands::decode_delete,
        0x75 => commands::decode_garrison,
        0x78 => commands::decode_rally,
        0x7A => commands::decode_sell,
        0x7B => commands::decode_buy,
        0x7F => commands::decode_townbell,
        0x80 => commands::decode_backtowork,
        0x81 => commands::decode_train2,
        _ => return None,
    })
}
