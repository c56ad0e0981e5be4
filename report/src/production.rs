//! Unit production totals reconstructed from training commands.

use std::collections::{BTreeMap, HashSet};

use body::TimestampedCommand;
use serde::Serialize;
use tracing::warn;

use crate::rate::BIN_MS;

/// Command type that queues units at a building.
const TRAIN2: u8 = 0x81;
/// Command type whose CANCEL action removes a queued unit.
const GARRISON: u8 = 0x75;

/// One surviving train order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductionEntry {
    pub player_id: Option<u32>,
    pub building_id: u32,
    pub unit_type: u32,
    /// Units this order still accounts for, after cancellations.
    pub delta: u64,
    pub timestamp: i64,
}

/// Cumulative unit counts sampled once per minute of the game clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductionSeries {
    /// Sample times in milliseconds, one per element of every counts vector.
    pub time: Vec<i64>,
    /// Counts keyed by player id `1..=num_players`, then unit type. Each
    /// vector holds the units ordered up to and including the sample time.
    pub players: BTreeMap<u32, BTreeMap<u32, Vec<u64>>>,
}

/// Training orders with cancellations subtracted.
///
/// The reconstruction is necessarily approximate: the stream says which
/// building a cancel targets but not which queue slot, so a cancel
/// decrements the most recent surviving order at that building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitProduction {
    pub entries: Vec<ProductionEntry>,
    pub series: ProductionSeries,
}

impl UnitProduction {
    /// Replays train and cancel commands in stream order.
    #[must_use]
    pub fn build(commands: &[TimestampedCommand], num_players: u32) -> Self {
        let mut entries: Vec<ProductionEntry> = Vec::new();
        // The stream repeats some cancels verbatim on the same tick and the
        // game ignores the duplicates.
        let mut seen_cancels: HashSet<(u32, i64)> = HashSet::new();

        for command in commands {
            match command.command_type {
                TRAIN2 => {
                    let (Some(building_id), Some(unit_type)) = (
                        command.attributes.get_u32("building_id"),
                        command.attributes.get_u32("unit_type"),
                    ) else {
                        continue;
                    };
                    entries.push(ProductionEntry {
                        player_id: command.player_id(),
                        building_id,
                        unit_type,
                        delta: u64::from(command.attributes.get_u32("count").unwrap_or(1)),
                        timestamp: command.timestamp,
                    });
                }
                GARRISON => {
                    if command.attributes.get_label("garrison_type") != Some("CANCEL") {
                        continue;
                    }
                    let Some(target) = command.attributes.get_u32("building_id") else {
                        continue;
                    };
                    if !seen_cancels.insert((target, command.timestamp)) {
                        continue;
                    }
                    let Some(&building_id) = command
                        .attributes
                        .get_ids("selected_ids")
                        .and_then(<[u32]>::first)
                    else {
                        continue;
                    };
                    let cancelled = entries
                        .iter()
                        .rposition(|entry| entry.building_id == building_id);
                    match cancelled {
                        Some(index) if entries[index].delta > 1 => {
                            entries[index].delta -= 1;
                        }
                        Some(index) => {
                            entries.remove(index);
                        }
                        None => {
                            warn!(building_id, "cancel without a matching train order");
                        }
                    }
                }
                _ => {}
            }
        }

        let series = Self::series(&entries, commands, num_players);
        Self { entries, series }
    }

    /// Samples the surviving orders once per minute, from the first command
    /// timestamp rounded to the nearest whole minute up to the last.
    fn series(
        entries: &[ProductionEntry],
        commands: &[TimestampedCommand],
        num_players: u32,
    ) -> ProductionSeries {
        let (Some(first), Some(last)) = (commands.first(), commands.last()) else {
            return ProductionSeries {
                time: Vec::new(),
                players: BTreeMap::new(),
            };
        };

        let mut time = Vec::new();
        let mut cursor = (first.timestamp + BIN_MS / 2).div_euclid(BIN_MS) * BIN_MS;
        while cursor < last.timestamp {
            time.push(cursor);
            cursor += BIN_MS;
        }

        let mut players = BTreeMap::new();
        for player_id in 1..=num_players {
            let log: Vec<&ProductionEntry> = entries
                .iter()
                .filter(|entry| entry.player_id == Some(player_id))
                .collect();
            let mut counts: BTreeMap<u32, Vec<u64>> = log
                .iter()
                .map(|entry| (entry.unit_type, Vec::with_capacity(time.len())))
                .collect();
            let mut running: BTreeMap<u32, u64> = BTreeMap::new();
            let mut index = 0;
            for &sample_ms in &time {
                while index < log.len() && log[index].timestamp <= sample_ms {
                    *running.entry(log[index].unit_type).or_default() += log[index].delta;
                    index += 1;
                }
                for (unit_type, samples) in &mut counts {
                    samples.push(running.get(unit_type).copied().unwrap_or(0));
                }
            }
            players.insert(player_id, counts);
        }

        ProductionSeries { time, players }
    }

    /// Unit counts keyed by player then unit type. Unattributed orders are
    /// keyed under player 0.
    #[must_use]
    pub fn totals(&self) -> BTreeMap<u32, BTreeMap<u32, u64>> {
        let mut totals: BTreeMap<u32, BTreeMap<u32, u64>> = BTreeMap::new();
        for entry in &self.entries {
            *totals
                .entry(entry.player_id.unwrap_or(0))
                .or_default()
                .entry(entry.unit_type)
                .or_default() += entry.delta;
        }
        totals
    }
}
