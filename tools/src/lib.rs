//! Rendering helpers for the `rdec` command line.
//!
//! The binary keeps argument handling and IO in `main.rs`; everything that
//! turns decoded data into text lives here so it can be tested without a
//! real replay file on disk.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use header::PlayerSlot;
use report::CommandSummary;

/// Writes a JSON document to `out`, or to stdout when no path was given.
pub fn emit_json(json: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("write {}", path.display()))
        }
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

/// Renders rows as a fixed-width text table with a header line.
///
/// Every row must have the same arity as `headers`.
#[must_use]
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(String::len).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let render_row = |cells: &[String]| {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{cell:width$}", width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_owned()
    };

    let mut out = String::new();
    out.push_str(&render_row(headers));
    out.push('\n');
    out.push_str(&"-".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1)));
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out
}

/// Builds the command-summary rows, labelling each row with the player's
/// lobby name where the header knows it.
#[must_use]
pub fn summary_rows(summary: &CommandSummary, players: &[PlayerSlot]) -> Vec<Vec<String>> {
    let name_for = |player_id: u32| {
        players
            .iter()
            .find(|slot| slot.player_index == player_id)
            .map_or_else(|| format!("Player {player_id}"), |slot| slot.name.clone())
    };

    let mut rows: Vec<Vec<String>> = summary
        .rows
        .iter()
        .map(|row| {
            let mut cells = Vec::with_capacity(row.counts.len() + 1);
            cells.push(name_for(row.player_id));
            cells.extend(row.counts.iter().map(u64::to_string));
            cells
        })
        .collect();

    if summary.unassigned.iter().any(|count| *count > 0) {
        let mut cells = Vec::with_capacity(summary.unassigned.len() + 1);
        cells.push("(unassigned)".to_owned());
        cells.extend(summary.unassigned.iter().map(u64::to_string));
        rows.push(cells);
    }
    rows
}

#[cfg(test)]
mod tests {
    use body::{AttrValue, Attributes, TimestampedCommand};

    use super::*;

    fn command(command_type: u8, player_id: u32) -> TimestampedCommand {
        let mut attributes = Attributes::new();
        attributes.set("player_id", AttrValue::U32(player_id));
        TimestampedCommand {
            command_type,
            payload: vec![command_type],
            timestamp: 0,
            attributes,
        }
    }

    fn slot(player_index: u32, name: &str) -> PlayerSlot {
        PlayerSlot {
            data_crc: 0,
            mp_version: 5,
            team: 1,
            civ: 18,
            ai_base_name: String::new(),
            ai_civ_name_idx: 0,
            unknown_name: None,
            name: name.to_owned(),
            humanity: 2,
            steam_id: 0,
            player_index,
            scenario_index: 0,
        }
    }

    #[test]
    fn emit_json_writes_to_a_file_when_given_a_path() {
        let path = std::env::temp_dir().join("rdec-emit-json-test.json");
        emit_json(r#"{"ok":true}"#, Some(&path)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"ok":true}"#);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn table_columns_are_aligned() {
        let headers = vec!["Player".to_owned(), "ATTACK".to_owned()];
        let rows = vec![
            vec!["Squisher".to_owned(), "79".to_owned()],
            vec!["p2".to_owned(), "5".to_owned()],
        ];
        let table = render_table(&headers, &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Player    ATTACK");
        assert_eq!(lines[2], "Squisher  79");
        assert_eq!(lines[3], "p2        5");
    }

    #[test]
    fn rows_use_lobby_names() {
        let commands = vec![command(0x00, 1), command(0x03, 2)];
        let summary = CommandSummary::build(&commands, 2);
        let players = vec![slot(1, "Squisher"), slot(2, "punkkiri")];
        let rows = summary_rows(&summary, &players);
        assert_eq!(rows[0], vec!["Squisher", "1", "0"]);
        assert_eq!(rows[1], vec!["punkkiri", "0", "1"]);
    }

    #[test]
    fn unassigned_row_appears_only_when_needed() {
        let attributed = vec![command(0x00, 1)];
        let summary = CommandSummary::build(&attributed, 1);
        assert_eq!(summary_rows(&summary, &[]).len(), 1);

        let stray = TimestampedCommand {
            command_type: 0x00,
            payload: vec![0x00],
            timestamp: 0,
            attributes: Attributes::new(),
        };
        let summary = CommandSummary::build(&[command(0x00, 1), stray], 1);
        let rows = summary_rows(&summary, &[]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["(unassigned)", "1"]);
    }

    #[test]
    fn missing_slot_falls_back_to_numbered_label() {
        let summary = CommandSummary::build(&[command(0x00, 2)], 2);
        let rows = summary_rows(&summary, &[slot(1, "Squisher")]);
        assert_eq!(rows[1][0], "Player 2");
    }
}
