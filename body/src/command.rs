//! Timestamped commands and their decoded attributes.

use std::collections::BTreeMap;

use crate::registry;

/// A single decoded attribute value.
///
/// Commands are heterogeneous, so attributes are kept as a tagged value in a
/// uniform map rather than one struct per command type. Each decoder writes a
/// fixed key set for its type; tests enumerate those sets.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum AttrValue {
    U8(u8),
    U16(u16),
    U32(u32),
    F32(f32),
    /// A human-readable label for an enumerated field.
    Label(&'static str),
    /// A list of object ids (a selection).
    Ids(Vec<u32>),
}

impl AttrValue {
    /// Returns the value as a `u32` if it is any unsigned integer variant.
    #[must_use]
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U8(v) => Some(u32::from(*v)),
            Self::U16(v) => Some(u32::from(*v)),
            Self::U32(v) => Some(*v),
            _ => None,
        }
    }
}

/// The name → value attribute mapping produced by a command decoder.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Attributes(BTreeMap<&'static str, AttrValue>);

impl Attributes {
    /// Creates an empty attribute mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing any previous value.
    pub fn set(&mut self, key: &'static str, value: AttrValue) {
        self.0.insert(key, value);
    }

    /// Returns the raw value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    /// Returns `key` as a `u32` if present and numeric.
    #[must_use]
    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.get(key).and_then(AttrValue::as_u32)
    }

    /// Returns `key` as a label if present.
    #[must_use]
    pub fn get_label(&self, key: &str) -> Option<&'static str> {
        match self.get(key) {
            Some(AttrValue::Label(label)) => Some(label),
            _ => None,
        }
    }

    /// Returns `key` as an id list if present.
    #[must_use]
    pub fn get_ids(&self, key: &str) -> Option<&[u32]> {
        match self.get(key) {
            Some(AttrValue::Ids(ids)) => Some(ids),
            _ => None,
        }
    }

    /// Returns `true` if no attributes were decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of decoded attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &AttrValue)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    /// The sorted key set, for validating a decoder's output shape.
    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        self.0.keys().copied().collect()
    }
}

/// A command wrapped with the timestamp accumulated from preceding syncs.
///
/// The attribute decoder runs synchronously during construction, so any
/// context mutation it performs happens in stream order. Commands whose
/// owner is only learned later get their `player_id` attribute filled in by
/// the deferred-resolution pass after the whole body is consumed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TimestampedCommand {
    pub command_type: u8,
    /// The raw payload, first byte included.
    pub payload: Vec<u8>,
    /// Milliseconds of accumulated sync deltas at the time this command
    /// appeared in the stream.
    pub timestamp: i64,
    pub attributes: Attributes,
}

impl TimestampedCommand {
    /// Human-readable command name, `UNKNOWN <hex>` for unregistered types.
    #[must_use]
    pub fn command_name(&self) -> String {
        registry::display_command_name(self.command_type)
    }

    /// The issuing player, when the decoder knew or later learned it.
    #[must_use]
    pub fn player_id(&self) -> Option<u32> {
        self.attributes.get_u32("player_id")
    }

    pub(crate) fn set_player_id(&mut self, player_id: u32) {
        self.attributes.set("player_id", AttrValue::U32(player_id));
    }
}
