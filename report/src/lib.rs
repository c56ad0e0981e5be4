//! Reports derived from a decoded command stream.
//!
//! Each report is a pure fold over `&[TimestampedCommand]`; nothing here
//! touches the wire format. [`Report::build`] bundles all of them for
//! one-shot JSON output.

mod production;
mod rate;
mod summary;

use body::TimestampedCommand;
use serde::Serialize;

pub use production::{ProductionEntry, ProductionSeries, UnitProduction};
pub use rate::{ActionsRate, RateSample, BIN_MS};
pub use summary::{CommandSummary, PlayerRow};

/// Everything the CLI prints, in one serializable bundle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub command_summary: CommandSummary,
    pub actions_rate: ActionsRate,
    pub unit_production: UnitProduction,
}

impl Report {
    #[must_use]
    pub fn build(commands: &[TimestampedCommand], num_players: u32) -> Self {
        Self {
            command_summary: CommandSummary::build(commands, num_players),
            actions_rate: ActionsRate::build(commands, num_players),
            unit_production: UnitProduction::build(commands, num_players),
        }
    }
}
