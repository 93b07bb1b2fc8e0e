//! saavy-units - inspect and tidy unit documents
//!
//! Run with: cargo run --bin saavy-units -- check score.json

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser)]
#[command(name = "saavy-units", version, about = "Check, summarize and format vocal unit documents")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate documents and report every structural issue
    Check {
        /// Documents to check ('-' reads stdin)
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Also report advisory timing findings
        #[arg(long)]
        lint: bool,

        /// Slack in seconds for lint time comparisons
        #[arg(long, value_name = "SECS", default_value_t = 1e-9)]
        tolerance: f64,
    },
    /// Print one summary line per unit
    Info {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// How many tatums make one beat, for note durations
        #[arg(long, value_name = "N", default_value_t = 4)]
        tatums_per_beat: u32,
    },
    /// Re-encode a document as pretty JSON
    ///
    /// Unknown fields on segments are kept. Unknown fields on the root,
    /// units, tracks and notes are dropped, with a warning per field.
    Fmt {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Rewrite the file in place instead of printing
        #[arg(short, long)]
        write: bool,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Check {
            files,
            lint,
            tolerance,
        } => {
            if !commands::check(&files, lint, tolerance)? {
                std::process::exit(1);
            }
        }
        Command::Info {
            file,
            tatums_per_beat,
        } => commands::info(&file, tatums_per_beat)?,
        Command::Fmt { file, write } => commands::fmt(&file, write)?,
    }

    Ok(())
}
