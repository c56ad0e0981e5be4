//! Per-command-type payload layouts.
//!
//! Every decoder gets a fresh [`ByteCursor`] over the command's raw payload,
//! skips the leading command-id byte (and whatever alignment padding the
//! layout carries), and extracts its typed fields. Decoders that read a
//! selection block share [`read_selection`], which honors the `0xFF`
//! reuse-the-cache sentinel. The layouts are empirically reverse-engineered;
//! unknown fields are skipped with their exact byte counts and never
//! interpreted.

use cursor::ByteCursor;

use crate::command::{AttrValue, Attributes};
use crate::context::{GameContext, LookupKey};
use crate::error::{BodyError, BodyResult};

/// Building type recorded for the market a buy/sell goes through.
const MARKET_BUILDING_TYPE: u32 = 84;

/// Selection-count sentinel meaning "reuse the cached selection".
const REUSE_SELECTION: u32 = 0xFF;

/// Resource kinds traded at a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Food,
    Wood,
    Stone,
}

impl ResourceKind {
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Food),
            1 => Some(Self::Wood),
            2 => Some(Self::Stone),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Wood => "Wood",
            Self::Stone => "Stone",
        }
    }
}

/// The sub-kinds of the garrison command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GarrisonKind {
    /// Pack a trebuchet.
    Pack,
    /// Unpack a trebuchet.
    Unpack,
    /// Cancel a unit in a training queue.
    Cancel,
    /// Garrison units in a building or boat.
    Garrison,
}

impl GarrisonKind {
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::Pack),
            2 => Some(Self::Unpack),
            4 => Some(Self::Cancel),
            5 => Some(Self::Garrison),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pack => "PACK",
            Self::Unpack => "UNPACK",
            Self::Cancel => "CANCEL",
            Self::Garrison => "GARRISON",
        }
    }
}

/// Unit stances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StanceKind {
    Aggressive,
    Defensive,
    StandGround,
    Passive,
}

impl StanceKind {
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Aggressive),
            1 => Some(Self::Defensive),
            2 => Some(Self::StandGround),
            3 => Some(Self::Passive),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Aggressive => "Aggressive",
            Self::Defensive => "Defensive",
            Self::StandGround => "Stand Ground",
            Self::Passive => "Passive",
        }
    }
}

/// Actions multiplexed into the multipurpose command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultipurposeAction {
    Diplomacy,
    ChangeSpeed,
    CheatResponse,
    AlliedVictory,
    Cheat,
    ResearchTreason,
    AiPolicy,
}

impl MultipurposeAction {
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Diplomacy),
            1 => Some(Self::ChangeSpeed),
            4 => Some(Self::CheatResponse),
            5 => Some(Self::AlliedVictory),
            6 => Some(Self::Cheat),
            10 => Some(Self::ResearchTreason),
            11 => Some(Self::AiPolicy),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Diplomacy => "Diplomacy",
            Self::ChangeSpeed => "Change Game Speed",
            Self::CheatResponse => "Cheat Response",
            Self::AlliedVictory => "Allied Victory",
            Self::Cheat => "Cheat",
            Self::ResearchTreason => "Research Treason",
            Self::AiPolicy => "AI policy",
        }
    }
}

fn unknown_label<T, F>(kind: Option<T>, label: F) -> &'static str
where
    F: Fn(T) -> &'static str,
{
    kind.map_or("UNKNOWN", label)
}

/// Reads a selection block: `count` object ids, or the cached selection
/// when `count` is the `0xFF` sentinel.
///
/// An explicit list overwrites the cache; the sentinel consumes no payload
/// bytes and leaves the cache untouched.
fn read_selection(
    cursor: &mut ByteCursor<'_>,
    context: &mut GameContext,
    count: u32,
) -> BodyResult<Vec<u32>> {
    if count == REUSE_SELECTION {
        return Ok(context.cached_selection().to_vec());
    }
    // Capacity is capped by the bytes actually present so a corrupt count
    // fails on the read, not on the allocation.
    let mut ids = Vec::with_capacity((count as usize).min(cursor.remaining() / 4));
    for _ in 0..count {
        ids.push(cursor.read_u32()?);
    }
    context.cache_selection(&ids);
    Ok(ids)
}

fn mark_selection_owned(context: &mut GameContext, ids: &[u32], player_id: u8) {
    for id in ids {
        context.create_unit(*id, None, Some(u32::from(player_id)));
    }
}

/// ATTACK is the generic right-click action, not just attacks.
pub(crate) fn decode_attack(
    payload: &[u8],
    context: &mut GameContext,
    _index: usize,
) -> BodyResult<Attributes> {
    let mut cursor = ByteCursor::new(payload);
    cursor.read_u8()?; // command id
    let player_id = cursor.read_u8()?;
    cursor.read_u16()?;
    let target_id = cursor.read_u32()?;
    let count = cursor.read_u32()?;
    let x = cursor.read_f32()?;
    let y = cursor.read_f32()?;
    let selected = read_selection(&mut cursor, context, count)?;
    mark_selection_owned(context, &selected, player_id);

    let mut attrs = Attributes::new();
    attrs.set("player_id", AttrValue::U32(u32::from(player_id)));
    attrs.set("target_id", AttrValue::U32(target_id));
    attrs.set("x_coord", AttrValue::F32(x));
    attrs.set("y_coord", AttrValue::F32(y));
    attrs.set("selected_ids", AttrValue::Ids(selected));
    Ok(attrs)
}

pub(crate) fn decode_move(
    payload: &[u8],
    context: &mut GameContext,
    _index: usize,
) -> BodyResult<Attributes> {
    let mut cursor = ByteCursor::new(payload);
    cursor.read_u8()?; // command id
    let player_id = cursor.read_u8()?;
    cursor.read_u16()?;
    cursor.read_u32()?;
    let count = cursor.read_u32()?;
    let x = cursor.read_f32()?;
    let y = cursor.read_f32()?;
    let selected = read_selection(&mut cursor, context, count)?;
    mark_selection_owned(context, &selected, player_id);

    let mut attrs = Attributes::new();
    attrs.set("player_id", AttrValue::U32(u32::from(player_id)));
    attrs.set("x_coord", AttrValue::F32(x));
    attrs.set("y_coord", AttrValue::F32(y));
    attrs.set("selected_ids", AttrValue::Ids(selected));
    Ok(attrs)
}

pub(crate) fn decode_stop(
    payload: &[u8],
    context: &mut GameContext,
    index: usize,
) -> BodyResult<Attributes> {
    let mut cursor = ByteCursor::new(payload);
    cursor.read_u8()?; // command id
    let count = cursor.read_u8()?;
    let selected = read_selection(&mut cursor, context, u32::from(count))?;

    let mut attrs = Attributes::new();
    if let Some(player_id) =
        context.lookup_or_defer(LookupKey::Selection(selected.clone()), index)
    {
        attrs.set("player_id", AttrValue::U32(player_id));
    }
    attrs.set("selected_ids", AttrValue::Ids(selected));
    Ok(attrs)
}

pub(crate) fn decode_waypoint(
    payload: &[u8],
    context: &mut GameContext,
    _index: usize,
) -> BodyResult<Attributes> {
    let mut cursor = ByteCursor::new(payload);
    cursor.read_u8()?; // command id
    let player_id = cursor.read_u8()?;
    let count = cursor.read_u8()?;
    let x = cursor.read_u8()?;
    let y = cursor.read_u8()?;
    let selected = read_selection(&mut cursor, context, u32::from(count))?;
    mark_selection_owned(context, &selected, player_id);

    let mut attrs = Attributes::new();
    attrs.set("player_id", AttrValue::U32(u32::from(player_id)));
    attrs.set("x_coord", AttrValue::U8(x));
    attrs.set("y_coord", AttrValue::U8(y));
    attrs.set("selected_ids", AttrValue::Ids(selected));
    Ok(attrs)
}

pub(crate) fn decode_stance(
    payload: &[u8],
    context: &mut GameContext,
    index: usize,
) -> BodyResult<Attributes> {
    let mut cursor = ByteCursor::new(payload);
    cursor.read_u8()?; // command id
    let count = cursor.read_u8()?;
    let stance_id = cursor.read_u8()?;
    let selected = read_selection(&mut cursor, context, u32::from(count))?;

    let mut attrs = Attributes::new();
    attrs.set("stance_id", AttrValue::U8(stance_id));
    attrs.set(
        "stance",
        AttrValue::Label(unknown_label(
            StanceKind::from_raw(stance_id),
            StanceKind::label,
        )),
    );
    if let Some(player_id) =
        context.lookup_or_defer(LookupKey::Selection(selected.clone()), index)
    {
        attrs.set("player_id", AttrValue::U32(player_id));
    }
    attrs.set("selected_ids", AttrValue::Ids(selected));
    Ok(attrs)
}

pub(crate) fn decode_guard(
    payload: &[u8],
    context: &mut GameContext,
    index: usize,
) -> BodyResult<Attributes> {
    let mut cursor = ByteCursor::new(payload);
    cursor.read_u8()?; // command id
    let count = cursor.read_u8()?;
    cursor.read_u16()?;
    let guarded_id = cursor.read_u32()?;
    let selected = read_selection(&mut cursor, context, u32::from(count))?;

    let mut attrs = Attributes::new();
    attrs.set("guarded_id", AttrValue::U32(guarded_id));
    // Two chances to learn the owner: the guarded object, then the
    // selection. Whichever resolves last wins, immediately or deferred.
    if let Some(player_id) = context.lookup_or_defer(LookupKey::Object(guarded_id), index) {
        attrs.set("player_id", AttrValue::U32(player_id));
    }
    if let Some(player_id) =
        context.lookup_or_defer(LookupKey::Selection(selected.clone()), index)
    {
        attrs.set("player_id", AttrValue::U32(player_id));
    }
    attrs.set("selected_ids", AttrValue::Ids(selected));
    Ok(attrs)
}

pub(crate) fn decode_research(
    payload: &[u8],
    _context: &mut GameContext,
    _index: usize,
) -> BodyResult<Attributes> {
    let mut cursor = ByteCursor::new(payload);
    cursor.read_u32()?; // command id + pad
    let building_id = cursor.read_u32()?;
    let player_id = cursor.read_u8()?;
    cursor.read_u8()?;
    let technology_id = cursor.read_u16()?;

    let mut attrs = Attributes::new();
    attrs.set("building_id", AttrValue::U32(building_id));
    attrs.set("player_id", AttrValue::U32(u32::from(player_id)));
    attrs.set("technology_id", AttrValue::U16(technology_id));
    Ok(attrs)
}

pub(crate) fn decode_build(
    payload: &[u8],
    context: &mut GameContext,
    _index: usize,
) -> BodyResult<Attributes> {
    let mut cursor = ByteCursor::new(payload);
    cursor.read_u8()?; // command id
    let count = cursor.read_u8()?;
    let player_id = cursor.read_u8()?;
    cursor.read_u8()?;
    let x = cursor.read_f32()?;
    let y = cursor.read_f32()?;
    let building_type_id = cursor.read_u16()?;
    cursor.read_u16()?; // padding
    cursor.read_u32()?; // unknown
    cursor.read_u32()?; // sprite id
    let selected = read_selection(&mut cursor, context, u32::from(count))?;
    // The building's own id is not known at build time, so nothing can be
    // recorded in the object table here.

    let mut attrs = Attributes::new();
    attrs.set("player_id", AttrValue::U32(u32::from(player_id)));
    attrs.set("x_coord", AttrValue::F32(x));
    attrs.set("y_coord", AttrValue::F32(y));
    attrs.set("building_type_id", AttrValue::U16(building_type_id));
    attrs.set("selected_ids", AttrValue::Ids(selected));
    Ok(attrs)
}

pub(crate) fn decode_multipurpose(
    payload: &[u8],
    _context: &mut GameContext,
    _index: usize,
) -> BodyResult<Attributes> {
    let mut cursor = ByteCursor::new(payload);
    cursor.read_u8()?; // command id
    let action_type_id = cursor.read_u8()?;
    let action = MultipurposeAction::from_raw(action_type_id);

    let mut attrs = Attributes::new();
    attrs.set("action_type_id", AttrValue::U8(action_type_id));
    attrs.set(
        "action_type",
        AttrValue::Label(unknown_label(action, MultipurposeAction::label)),
    );
    // In a cheat response this byte is not a player id.
    let byte = cursor.read_u8()?;
    if action == Some(MultipurposeAction::CheatResponse) {
        attrs.set("cheat_response_value", AttrValue::U8(byte));
    } else {
        attrs.set("player_id", AttrValue::U32(u32::from(byte)));
    }
    cursor.read_u8()?;
    let option1 = cursor.read_u8()?;
    cursor.read(3)?;
    let option2 = cursor.read_f32()?;
    let diplomatic_stance = cursor.read_u8()?;

    attrs.set("option1", AttrValue::U8(option1));
    attrs.set("option2", AttrValue::F32(option2));
    attrs.set("diplomatic_stance", AttrValue::U8(diplomatic_stance));
    Ok(attrs)
}

pub(crate) fn decode_wall(
    payload: &[u8],
    context: &mut GameContext,
    _index: usize,
) -> BodyResult<Attributes> {
    let mut cursor = ByteCursor::new(payload);
    cursor.read_u8()?; // command id
    let count = cursor.read_u8()?;
    let player_id = cursor.read_u8()?;
    let start_x = cursor.read_u8()?;
    let start_y = cursor.read_u8()?;
    let end_x = cursor.read_u8()?;
    let end_y = cursor.read_u8()?;
    cursor.read_u8()?; // pad
    let building_type = cursor.read_u32()?;
    cursor.read_u32()?; // const
    let selected = read_selection(&mut cursor, context, u32::from(count))?;
    mark_selection_owned(context, &selected, player_id);

    let mut attrs = Attributes::new();
    attrs.set("player_id", AttrValue::U32(u32::from(player_id)));
    attrs.set("start_x_coord", AttrValue::U8(start_x));
    attrs.set("start_y_coord", AttrValue::U8(start_y));
    attrs.set("end_x_coord", AttrValue::U8(end_x));
    attrs.set("end_y_coord", AttrValue::U8(end_y));
    attrs.set("building_type", AttrValue::U32(building_type));
    attrs.set("selected_ids", AttrValue::Ids(selected));
    Ok(attrs)
}

pub(crate) fn decode_delete(
    payload: &[u8],
    _context: &mut GameContext,
    _index: usize,
) -> BodyResult<Attributes> {
    let mut cursor = ByteCursor::new(payload);
    cursor.read_u32()?; // command id + pad
    let object_id = cursor.read_u32()?;
    let player_id = cursor.read_u8()?;

    let mut attrs = Attributes::new();
    attrs.set("object_id", AttrValue::U32(object_id));
    attrs.set("player_id", AttrValue::U32(u32::from(player_id)));
    Ok(attrs)
}

pub(crate) fn decode_garrison(
    payload: &[u8],
    context: &mut GameContext,
    index: usize,
) -> BodyResult<Attributes> {
    let mut cursor = ByteCursor::new(payload);
    cursor.read_u8()?; // command id
    let count = cursor.read_u8()?;
    cursor.read_u16()?;
    let building_id = cursor.read_u32()?;
    let garrison_type_id = cursor.read_u8()?;
    let kind = GarrisonKind::from_raw(garrison_type_id);
    // Believed to be the queue position being cancelled; only meaningful
    // for CANCEL.
    let position = cursor.read_u8()?;
    cursor.read_u16()?;
    let x = cursor.read_f32()?;
    let y = cursor.read_f32()?;
    cursor.read_u32()?; // always FFs
    let selected = read_selection(&mut cursor, context, u32::from(count))?;

    if kind == Some(GarrisonKind::Cancel) && selected.len() != 1 {
        return Err(BodyError::CancelSelection {
            selected: selected.len(),
        });
    }

    let mut attrs = Attributes::new();
    attrs.set("building_id", AttrValue::U32(building_id));
    attrs.set("garrison_type_id", AttrValue::U8(garrison_type_id));
    attrs.set(
        "garrison_type",
        AttrValue::Label(unknown_label(kind, GarrisonKind::label)),
    );
    attrs.set("position", AttrValue::U8(position));
    attrs.set("x_coord", AttrValue::F32(x));
    attrs.set("y_coord", AttrValue::F32(y));
    // The owner is inferred from the selected units, not the target
    // building: garrisons routinely target another player's building.
    if let Some(player_id) =
        context.lookup_or_defer(LookupKey::Selection(selected.clone()), index)
    {
        attrs.set("player_id", AttrValue::U32(player_id));
    }
    attrs.set("selected_ids", AttrValue::Ids(selected));
    Ok(attrs)
}

pub(crate) fn decode_rally(
    payload: &[u8],
    context: &mut GameContext,
    index: usize,
) -> BodyResult<Attributes> {
    let mut cursor = ByteCursor::new(payload);
    cursor.read_u8()?; // command id
    let count = cursor.read_u8()?;
    cursor.read_u16()?;
    let target_id = cursor.read_u32()?;
    let target_unit_id = cursor.read_u32()?;
    let x = cursor.read_f32()?;
    let y = cursor.read_f32()?;
    let selected = read_selection(&mut cursor, context, u32::from(count))?;

    let mut attrs = Attributes::new();
    attrs.set("target_id", AttrValue::U32(target_id));
    attrs.set("target_unit_id", AttrValue::U32(target_unit_id));
    attrs.set("x_coord", AttrValue::F32(x));
    attrs.set("y_coord", AttrValue::F32(y));
    if let Some(player_id) =
        context.lookup_or_defer(LookupKey::Selection(selected.clone()), index)
    {
        attrs.set("player_id", AttrValue::U32(player_id));
    }
    attrs.set("selected_ids", AttrValue::Ids(selected));
    Ok(attrs)
}

fn decode_market_exchange(payload: &[u8], context: &mut GameContext) -> BodyResult<Attributes> {
    let mut cursor = ByteCursor::new(payload);
    cursor.read_u8()?; // command id
    let player_id = cursor.read_u8()?;
    let resource_type_id = cursor.read_u8()?;
    let amount = cursor.read_u8()?;
    let building_id = cursor.read_u32()?;
    // The exchange happens at a market owned by the player.
    context.create_building(building_id, MARKET_BUILDING_TYPE, u32::from(player_id));

    let mut attrs = Attributes::new();
    attrs.set("player_id", AttrValue::U32(u32::from(player_id)));
    attrs.set("resource_type_id", AttrValue::U8(resource_type_id));
    attrs.set(
        "resource_type",
        AttrValue::Label(unknown_label(
            ResourceKind::from_raw(resource_type_id),
            ResourceKind::label,
        )),
    );
    attrs.set("amount", AttrValue::U8(amount));
    attrs.set("building_id", AttrValue::U32(building_id));
    Ok(attrs)
}

pub(crate) fn decode_buy(
    payload: &[u8],
    context: &mut GameContext,
    _index: usize,
) -> BodyResult<Attributes> {
    decode_market_exchange(payload, context)
}

pub(crate) fn decode_sell(
    payload: &[u8],
    context: &mut GameContext,
    _index: usize,
) -> BodyResult<Attributes> {
    decode_market_exchange(payload, context)
}

pub(crate) fn decode_townbell(
    payload: &[u8],
    context: &mut GameContext,
    index: usize,
) -> BodyResult<Attributes> {
    let mut cursor = ByteCursor::new(payload);
    cursor.read_u8()?; // command id
    cursor.read(3)?; // pad
    let building_id = cursor.read_u32()?;
    let active = cursor.read_u8()?;

    let mut attrs = Attributes::new();
    attrs.set("building_id", AttrValue::U32(building_id));
    attrs.set("active", AttrValue::U8(active));
    if let Some(player_id) = context.lookup_or_defer(LookupKey::Object(building_id), index) {
        attrs.set("player_id", AttrValue::U32(player_id));
    }
    Ok(attrs)
}

pub(crate) fn decode_backtowork(
    payload: &[u8],
    context: &mut GameContext,
    index: usize,
) -> BodyResult<Attributes> {
    let mut cursor = ByteCursor::new(payload);
    cursor.read_u8()?; // command id
    cursor.read(3)?; // pad
    let building_id = cursor.read_u32()?;

    let mut attrs = Attributes::new();
    attrs.set("building_id", AttrValue::U32(building_id));
    if let Some(player_id) = context.lookup_or_defer(LookupKey::Object(building_id), index) {
        attrs.set("player_id", AttrValue::U32(player_id));
    }
    Ok(attrs)
}

pub(crate) fn decode_train2(
    payload: &[u8],
    context: &mut GameContext,
    _index: usize,
) -> BodyResult<Attributes> {
    let mut cursor = ByteCursor::new(payload);
    cursor.read_u8()?; // command id
    let player_id = cursor.read_u8()?;
    let building_type = cursor.read_u16()?;
    let unknown1 = cursor.read_u16()?;
    let unit_type = cursor.read_u16()?;
    let count = cursor.read_u16()?;
    let building_id = cursor.read_u16()?;
    let unknown2 = cursor.read_u16()?;
    // Training reveals both the building's type and its owner.
    context.create_building(
        u32::from(building_id),
        u32::from(building_type),
        u32::from(player_id),
    );

    let mut attrs = Attributes::new();
    attrs.set("player_id", AttrValue::U32(u32::from(player_id)));
    attrs.set("building_type", AttrValue::U16(building_type));
    attrs.set("unknown1", AttrValue::U16(unknown1));
    attrs.set("unit_type", AttrValue::U16(unit_type));
    attrs.set("count", AttrValue::U16(count));
    attrs.set("building_id", AttrValue::U16(building_id));
    attrs.set("unknown2", AttrValue::U16(unknown2));
    Ok(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ObjectKind;

    fn selection_bytes(ids: &[u32]) -> Vec<u8> {
        let mut out = Vec::new();
        for id in ids {
            out.extend_from_slice(&id.to_le_bytes());
        }
        out
    }

    fn attack_payload(player_id: u8, target_id: u32, ids: &[u32]) -> Vec<u8> {
        let mut payload = vec![0x00, player_id, 0, 0];
        payload.extend_from_slice(&target_id.to_le_bytes());
        payload.extend_from_slice(&(ids.len() as u32).to_le_bytes());
        payload.extend_from_slice(&10.5f32.to_le_bytes());
        payload.extend_from_slice(&20.5f32.to_le_bytes());
        payload.extend_from_slice(&selection_bytes(ids));
        payload
    }

    #[test]
    fn attack_decodes_and_marks_ownership() {
        let mut context = GameContext::new();
        let payload = attack_payload(2, 600, &[10, 11]);
        let attrs = decode_attack(&payload, &mut context, 0).unwrap();

        assert_eq!(attrs.get_u32("player_id"), Some(2));
        assert_eq!(attrs.get_u32("target_id"), Some(600));
        assert_eq!(attrs.get_ids("selected_ids"), Some(&[10, 11][..]));
        assert_eq!(
            attrs.keys(),
            vec!["player_id", "selected_ids", "target_id", "x_coord", "y_coord"]
        );

        for id in [10, 11] {
            let object = context.object(id).unwrap();
            assert_eq!(object.kind, ObjectKind::Unit);
            assert_eq!(object.player_id, Some(2));
            assert_eq!(object.object_type_id, None);
        }
        assert_eq!(context.cached_selection(), &[10, 11]);
    }

    #[test]
    fn selection_sentinel_reuses_cache_without_consuming_bytes() {
        let mut context = GameContext::new();
        context.cache_selection(&[7, 8, 9]);

        // STOP with the 0xFF sentinel and no selection bytes at all.
        let payload = vec![0x01, 0xFF];
        let attrs = decode_stop(&payload, &mut context, 0).unwrap();
        assert_eq!(attrs.get_ids("selected_ids"), Some(&[7, 8, 9][..]));
        assert_eq!(context.cached_selection(), &[7, 8, 9]);
    }

    #[test]
    fn explicit_selection_overwrites_cache() {
        let mut context = GameContext::new();
        context.cache_selection(&[1]);
        let mut payload = vec![0x01, 2];
        payload.extend_from_slice(&selection_bytes(&[5, 6]));
        let attrs = decode_stop(&payload, &mut context, 0).unwrap();
        assert_eq!(attrs.get_ids("selected_ids"), Some(&[5, 6][..]));
        assert_eq!(context.cached_selection(), &[5, 6]);
    }

    #[test]
    fn buy_registers_market_first_writer_wins() {
        let mut context = GameContext::new();
        let mut payload = vec![0x7B, 1, 2, 50];
        payload.extend_from_slice(&777u32.to_le_bytes());
        let attrs = decode_buy(&payload, &mut context, 0).unwrap();

        assert_eq!(attrs.get_label("resource_type"), Some("Stone"));
        assert_eq!(attrs.get_u32("amount"), Some(50));
        let market = context.object(777).unwrap();
        assert_eq!(market.object_type_id, Some(MARKET_BUILDING_TYPE));
        assert_eq!(market.player_id, Some(1));

        // A later sell through the same market does not rewrite it.
        let mut payload = vec![0x7A, 2, 0, 10];
        payload.extend_from_slice(&777u32.to_le_bytes());
        decode_sell(&payload, &mut context, 1).unwrap();
        assert_eq!(context.object(777).unwrap().player_id, Some(1));
    }

    #[test]
    fn train2_reveals_building_owner() {
        let mut context = GameContext::new();
        let payload: Vec<u8> = {
            let mut p = vec![0x81, 2];
            p.extend_from_slice(&12u16.to_le_bytes()); // building type
            p.extend_from_slice(&0u16.to_le_bytes());
            p.extend_from_slice(&38u16.to_le_bytes()); // unit type
            p.extend_from_slice(&5u16.to_le_bytes()); // count
            p.extend_from_slice(&321u16.to_le_bytes()); // building id
            p.extend_from_slice(&0u16.to_le_bytes());
            p
        };
        let attrs = decode_train2(&payload, &mut context, 0).unwrap();
        assert_eq!(attrs.get_u32("unit_type"), Some(38));
        assert_eq!(attrs.get_u32("count"), Some(5));
        let building = context.object(321).unwrap();
        assert_eq!(building.kind, ObjectKind::Building);
        assert_eq!(building.object_type_id, Some(12));
        assert_eq!(building.player_id, Some(2));
    }

    fn garrison_payload(kind: u8, ids: &[u32]) -> Vec<u8> {
        let mut payload = vec![0x75, ids.len() as u8, 0, 0];
        payload.extend_from_slice(&444u32.to_le_bytes());
        payload.push(kind);
        payload.push(0); // position
        payload.extend_from_slice(&[0, 0]);
        payload.extend_from_slice(&1.0f32.to_le_bytes());
        payload.extend_from_slice(&2.0f32.to_le_bytes());
        payload.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
        payload.extend_from_slice(&selection_bytes(ids));
        payload
    }

    #[test]
    fn garrison_defers_owner_from_selection() {
        let mut context = GameContext::new();
        let attrs = decode_garrison(&garrison_payload(5, &[30, 31]), &mut context, 4).unwrap();
        assert_eq!(attrs.get_label("garrison_type"), Some("GARRISON"));
        assert_eq!(attrs.get_u32("player_id"), None);
        assert_eq!(context.deferred_len(), 1);
    }

    #[test]
    fn garrison_cancel_requires_exactly_one_selected() {
        let mut context = GameContext::new();
        let err = decode_garrison(&garrison_payload(4, &[30, 31]), &mut context, 0).unwrap_err();
        assert_eq!(err, BodyError::CancelSelection { selected: 2 });

        let attrs = decode_garrison(&garrison_payload(4, &[30]), &mut context, 0).unwrap();
        assert_eq!(attrs.get_label("garrison_type"), Some("CANCEL"));
    }

    #[test]
    fn guard_prefers_latest_resolution() {
        let mut context = GameContext::new();
        context.create_unit(5, None, Some(1));
        context.create_unit(6, None, Some(3));
        let mut payload = vec![0x13, 1, 0, 0];
        payload.extend_from_slice(&5u32.to_le_bytes()); // guarded id
        payload.extend_from_slice(&selection_bytes(&[6]));
        let attrs = decode_guard(&payload, &mut context, 0).unwrap();
        // Both lookups resolve immediately; the selection's answer lands last.
        assert_eq!(attrs.get_u32("player_id"), Some(3));
    }

    #[test]
    fn multipurpose_cheat_response_has_no_player_id() {
        let mut context = GameContext::new();
        let mut payload = vec![0x67, 4, 77, 0, 1];
        payload.extend_from_slice(&[0, 0, 0]);
        payload.extend_from_slice(&0.0f32.to_le_bytes());
        payload.push(2);
        let attrs = decode_multipurpose(&payload, &mut context, 0).unwrap();
        assert_eq!(attrs.get_label("action_type"), Some("Cheat Response"));
        assert_eq!(attrs.get_u32("cheat_response_value"), Some(77));
        assert_eq!(attrs.get_u32("player_id"), None);
    }

    #[test]
    fn multipurpose_diplomacy_has_player_id() {
        let mut context = GameContext::new();
        let mut payload = vec![0x67, 0, 2, 0, 1];
        payload.extend_from_slice(&[0, 0, 0]);
        payload.extend_from_slice(&1.5f32.to_le_bytes());
        payload.push(1);
        let attrs = decode_multipurpose(&payload, &mut context, 0).unwrap();
        assert_eq!(attrs.get_label("action_type"), Some("Diplomacy"));
        assert_eq!(attrs.get_u32("player_id"), Some(2));
        assert_eq!(attrs.get("cheat_response_value"), None);
    }

    #[test]
    fn truncated_payload_is_an_error() {
        let mut context = GameContext::new();
        let payload = vec![0x00, 2, 0]; // attack cut short
        let err = decode_attack(&payload, &mut context, 0).unwrap_err();
        assert!(matches!(err, BodyError::Cursor(_)));
    }

    #[test]
    fn enum_labels_fall_back_to_unknown() {
        assert_eq!(ResourceKind::from_raw(9), None);
        assert_eq!(GarrisonKind::from_raw(3), None);
        assert_eq!(StanceKind::from_raw(4), None);
        assert_eq!(MultipurposeAction::from_raw(2), None);
        assert_eq!(
            unknown_label(MultipurposeAction::from_raw(2), MultipurposeAction::label),
            "UNKNOWN"
        );
    }
}
