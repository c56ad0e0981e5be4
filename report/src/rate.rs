//! Actions-rate series, binned over the game clock.

use std::collections::BTreeMap;

use body::TimestampedCommand;
use serde::Serialize;

/// Width of one rate bin in game-clock milliseconds.
pub const BIN_MS: i64 = 60_000;

/// One bin of a player's series: command rates normalized to per-minute,
/// keyed by command name plus a `"Total"` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSample {
    /// Bin start on the game clock, in milliseconds.
    pub start_ms: i64,
    pub per_minute: BTreeMap<String, f64>,
}

/// Per-player command-rate series and whole-game averages.
///
/// Bins start at the first command's timestamp and cover the stream up to
/// the last. Every sample carries a rate for every command name seen
/// anywhere in the stream, so the series are directly comparable across
/// players.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionsRate {
    /// Keyed by player id `1..=num_players`.
    pub series: BTreeMap<u32, Vec<RateSample>>,
    /// Whole-game attributed commands per second, keyed by player id.
    pub average: BTreeMap<u32, f64>,
}

impl ActionsRate {
    /// Bins `commands` by timestamp. Unattributed commands are excluded
    /// from every player's series and average.
    #[must_use]
    pub fn build(commands: &[TimestampedCommand], num_players: u32) -> Self {
        let mut series = BTreeMap::new();
        let mut average = BTreeMap::new();
        let (Some(first), Some(last)) = (commands.first(), commands.last()) else {
            return Self { series, average };
        };
        let start_time = first.timestamp;
        let end_time = last.timestamp;

        let mut names: Vec<String> = commands
            .iter()
            .map(TimestampedCommand::command_name)
            .collect();
        names.sort_unstable();
        names.dedup();

        for player_id in 1..=num_players {
            series.insert(player_id, player_series(commands, player_id, &names, start_time, end_time));
            let count = commands
                .iter()
                .filter(|c| c.player_id() == Some(player_id))
                .count();
            let duration_ms = end_time - start_time;
            let per_second = if duration_ms > 0 {
                count as f64 * 1000.0 / duration_ms as f64
            } else {
                0.0
            };
            average.insert(player_id, per_second);
        }

        Self { series, average }
    }
}

fn player_series(
    commands: &[TimestampedCommand],
    player_id: u32,
    names: &[String],
    start_time: i64,
    end_time: i64,
) -> Vec<RateSample> {
    let mut samples = Vec::new();
    let mut cursor = 0;
    let mut bin_start = start_time;
    while bin_start < end_time {
        let mut counts: BTreeMap<String, u64> =
            names.iter().map(|name| (name.clone(), 0)).collect();
        let mut total = 0u64;
        while cursor < commands.len() && commands[cursor].timestamp < bin_start + BIN_MS {
            let command = &commands[cursor];
            cursor += 1;
            if command.player_id() != Some(player_id) {
                continue;
            }
            total += 1;
            if let Some(count) = counts.get_mut(&command.command_name()) {
                *count += 1;
            }
        }

        let normalize = |count: u64| count as f64 * 60_000.0 / BIN_MS as f64;
        let mut per_minute: BTreeMap<String, f64> = counts
            .into_iter()
            .map(|(name, count)| (name, normalize(count)))
            .collect();
        per_minute.insert("Total".to_owned(), normalize(total));
        samples.push(RateSample {
            start_ms: bin_start,
            per_minute,
        });
        bin_start += BIN_MS;
    }
    samples
}
