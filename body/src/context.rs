//! Run-scoped decode state and the ownership-resolution protocol.
//!
//! Object ownership is rarely stated by the command that needs it. A
//! garrison command lists the units being garrisoned but not their owner;
//! a later train command reveals who owns the building those units came
//! from. [`GameContext`] accumulates ownership facts as the stream is
//! walked and queues the lookups that cannot be answered yet; the queue is
//! replayed exactly once against the final table when the stream ends.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Whether an object entry was learned from a unit or a building fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Unit,
    Building,
}

/// An object the stream has told us something about. Entries are never
/// removed during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameObject {
    pub object_id: u32,
    pub kind: ObjectKind,
    pub object_type_id: Option<u32>,
    pub player_id: Option<u32>,
}

/// What a deferred lookup resolves against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    /// A single building or unit id.
    Object(u32),
    /// A selection; the first id with a known owner wins.
    Selection(Vec<u32>),
}

/// A postponed ownership query, retried once at end of stream.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DeferredLookup {
    key: LookupKey,
    /// Index of the command whose `player_id` attribute the answer feeds.
    command_index: usize,
}

/// Mutable state shared by all command decoders for one decode run.
///
/// The context is created once per run, mutated monotonically (the
/// timestamp accumulates, the object table only grows or merges, the
/// deferred queue only grows until resolution), and discarded afterwards.
#[derive(Debug, Default)]
pub struct GameContext {
    /// Accumulated sync deltas, in milliseconds. Deltas are applied signed
    /// and unclamped, as the format produces them.
    pub timestamp: i64,
    objects: HashMap<u32, GameObject>,
    last_selected: Vec<u32>,
    deferred: Vec<DeferredLookup>,
}

impl GameContext {
    /// Creates a fresh context for a decode run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the running timestamp by a sync delta.
    pub fn advance_time(&mut self, delta: i32) {
        self.timestamp += i64::from(delta);
    }

    /// Records a building fact, first-writer-wins.
    ///
    /// Train and market commands reveal the type and owner of the building
    /// they act on. A later sighting of the same building never overwrites
    /// the first.
    pub fn create_building(&mut self, building_id: u32, building_type: u32, player_id: u32) {
        self.objects
            .entry(building_id)
            .or_insert_with(|| GameObject {
                object_id: building_id,
                kind: ObjectKind::Building,
                object_type_id: Some(building_type),
                player_id: Some(player_id),
            });
    }

    /// Records or merges a unit fact.
    ///
    /// Units accumulate: a later sighting fills in whichever of type and
    /// owner it knows, field by field, leaving the rest alone.
    pub fn create_unit(&mut self, unit_id: u32, unit_type_id: Option<u32>, player_id: Option<u32>) {
        match self.objects.entry(unit_id) {
            Entry::Vacant(slot) => {
                slot.insert(GameObject {
                    object_id: unit_id,
                    kind: ObjectKind::Unit,
                    object_type_id: unit_type_id,
                    player_id,
                });
            }
            Entry::Occupied(mut slot) => {
                let object = slot.get_mut();
                if unit_type_id.is_some() {
                    object.object_type_id = unit_type_id;
                }
                if player_id.is_some() {
                    object.player_id = player_id;
                }
            }
        }
    }

    /// Direct ownership lookup for a single object.
    #[must_use]
    pub fn lookup(&self, object_id: u32) -> Option<u32> {
        self.objects.get(&object_id).and_then(|o| o.player_id)
    }

    /// First resolvable owner scanning `object_ids` in order.
    #[must_use]
    pub fn lookup_many(&self, object_ids: &[u32]) -> Option<u32> {
        object_ids.iter().find_map(|id| self.lookup(*id))
    }

    /// Answers an ownership query now if possible, otherwise queues it.
    ///
    /// When the owner is already known it is returned and the caller sets
    /// the attribute immediately. Otherwise a [`LookupKey`] is queued
    /// against `command_index` and retried once by
    /// [`resolve_deferred`](Self::resolve_deferred).
    pub fn lookup_or_defer(&mut self, key: LookupKey, command_index: usize) -> Option<u32> {
        let player_id = match &key {
            LookupKey::Object(id) => self.lookup(*id),
            LookupKey::Selection(ids) => self.lookup_many(ids),
        };
        if player_id.is_none() {
            self.deferred.push(DeferredLookup { key, command_index });
        }
        player_id
    }

    /// Retries every queued lookup once, in enqueue order, against the
    /// final table.
    ///
    /// Returns `(command_index, player_id)` pairs for the lookups that now
    /// resolve; lookups that still find no owner are dropped, leaving the
    /// affected command unattributed. Nothing is ever re-queued.
    pub fn resolve_deferred(&mut self) -> Vec<(usize, u32)> {
        let deferred = std::mem::take(&mut self.deferred);
        let mut resolved = Vec::with_capacity(deferred.len());
        for lookup in deferred {
            let player_id = match &lookup.key {
                LookupKey::Object(id) => self.lookup(*id),
                LookupKey::Selection(ids) => self.lookup_many(ids),
            };
            if let Some(player_id) = player_id {
                resolved.push((lookup.command_index, player_id));
            }
        }
        resolved
    }

    /// The selection list cached from the last explicit selection read.
    #[must_use]
    pub fn cached_selection(&self) -> &[u32] {
        &self.last_selected
    }

    /// Overwrites the selection cache.
    pub fn cache_selection(&mut self, ids: &[u32]) {
        self.last_selected = ids.to_vec();
    }

    /// The object table entry for `object_id`, if one was ever learned.
    #[must_use]
    pub fn object(&self, object_id: u32) -> Option<&GameObject> {
        self.objects.get(&object_id)
    }

    /// Number of queued, not-yet-resolved lookups.
    #[must_use]
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }
}
