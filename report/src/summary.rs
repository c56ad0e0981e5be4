//! Per-player command counts, one column per observed command name.

use std::collections::BTreeMap;

use body::TimestampedCommand;
use serde::Serialize;

/// One table row: a player and their count for each column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRow {
    pub player_id: u32,
    pub counts: Vec<u64>,
}

/// Commands tallied per player, with columns sorted by command name.
///
/// Commands whose player was never learned land in the `unassigned` row
/// instead of being dropped, so the column totals still account for every
/// command in the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSummary {
    /// Column labels, lexicographically sorted.
    pub command_names: Vec<String>,
    /// One row per player slot `1..=num_players`.
    pub rows: Vec<PlayerRow>,
    /// Counts for commands with no attributed player, same column order.
    pub unassigned: Vec<u64>,
}

impl CommandSummary {
    /// Tallies `commands` into a table with `num_players` rows.
    #[must_use]
    pub fn build(commands: &[TimestampedCommand], num_players: u32) -> Self {
        let mut command_names: Vec<String> = commands
            .iter()
            .map(TimestampedCommand::command_name)
            .collect();
        command_names.sort_unstable();
        command_names.dedup();

        let column: BTreeMap<&str, usize> = command_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut rows: Vec<PlayerRow> = (1..=num_players)
            .map(|player_id| PlayerRow {
                player_id,
                counts: vec![0; command_names.len()],
            })
            .collect();
        let mut unassigned = vec![0; command_names.len()];

        for command in commands {
            let col = column[command.command_name().as_str()];
            match command.player_id() {
                Some(player_id) if player_id >= 1 && player_id <= num_players => {
                    rows[(player_id - 1) as usize].counts[col] += 1;
                }
                _ => unassigned[col] += 1,
            }
        }

        Self {
            command_names,
            rows,
            unassigned,
        }
    }

    /// Header row for tabular rendering: `Player` plus the column names.
    #[must_use]
    pub fn headers(&self) -> Vec<String> {
        let mut headers = Vec::with_capacity(self.command_names.len() + 1);
        headers.push("Player".to_owned());
        headers.extend(self.command_names.iter().cloned());
        headers
    }
}
