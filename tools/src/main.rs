use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rdec_tools::{emit_json, render_table, summary_rows};
use replay::RecordedGame;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rdec", version, about = "recorded-game inspection and reporting")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the save version of a recorded game.
    Version {
        /// Path to the recorded game.
        replay: PathBuf,
    },
    /// Decode the header and emit it as JSON.
    Header {
        /// Path to the recorded game.
        replay: PathBuf,
        /// Write the JSON here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print per-player command counts as a table.
    Summary {
        /// Path to the recorded game.
        replay: PathBuf,
    },
    /// Build the full report bundle and emit it as JSON.
    Report {
        /// Path to the recorded game.
        replay: PathBuf,
        /// Write the JSON here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write the inflated header block to a file, for format archaeology.
    HeaderRaw {
        /// Path to the recorded game.
        replay: PathBuf,
        /// Destination for the raw bytes.
        out: PathBuf,
    },
    /// Write the operation stream to a file, for format archaeology.
    BodyRaw {
        /// Path to the recorded game.
        replay: PathBuf,
        /// Destination for the raw bytes.
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Version { replay } => {
            let game = open(&replay)?;
            let (tag, sub_version) = game.version().context("read version")?;
            let header = game.header().context("decode header")?;
            println!("{tag} (sub {sub_version}, save {})", header.save_version);
        }
        Command::Header { replay, out } => {
            let header = open(&replay)?.header().context("decode header")?;
            let json = serde_json::to_string_pretty(&header).context("serialize header")?;
            emit_json(&json, out.as_deref())?;
        }
        Command::Summary { replay } => {
            let game = open(&replay)?;
            let header = game.header().context("decode header")?;
            let commands = game.commands().context("decode body")?;
            let summary = report::CommandSummary::build(&commands, header.num_players);
            let rows = summary_rows(&summary, &header.players);
            print!("{}", render_table(&summary.headers(), &rows));
        }
        Command::Report { replay, out } => {
            let game = open(&replay)?;
            let header = game.header().context("decode header")?;
            let commands = game.commands().context("decode body")?;
            let bundle = report::Report::build(&commands, header.num_players);
            let json = serde_json::to_string_pretty(&bundle).context("serialize report")?;
            emit_json(&json, out.as_deref())?;
        }
        Command::HeaderRaw { replay, out } => {
            let bytes = open(&replay)?.header_bytes().context("inflate header")?;
            fs::write(&out, bytes).with_context(|| format!("write {}", out.display()))?;
        }
        Command::BodyRaw { replay, out } => {
            let game = open(&replay)?;
            fs::write(&out, game.body_bytes())
                .with_context(|| format!("write {}", out.display()))?;
        }
    }
    Ok(())
}

fn open(path: &PathBuf) -> Result<RecordedGame> {
    RecordedGame::open(path).with_context(|| format!("open replay {}", path.display()))
}
