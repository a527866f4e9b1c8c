use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "irriops", version, about = "Irrigation scheduling dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// CSV dataset to load at startup
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Treatment to select at startup (t1-t4 or a treatment label)
    #[arg(short, long)]
    pub treatment: Option<String>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Re-run interactive setup
    Init,
    /// Validate a dataset against a treatment's required columns
    Check {
        /// CSV dataset to validate
        #[arg(short, long)]
        input: PathBuf,

        /// Treatment to validate against (t1-t4 or a treatment label)
        #[arg(short, long)]
        treatment: String,
    },
    /// Compute a schedule without the TUI
    Evaluate {
        /// CSV dataset to evaluate
        #[arg(short, long)]
        input: PathBuf,

        /// Treatment to apply (t1-t4 or a treatment label)
        #[arg(short, long)]
        treatment: String,

        /// Output file (defaults to <treatment>_schedule.csv in the export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the schedule as JSON to stdout instead of writing CSV
        #[arg(long)]
        json: bool,
    },
}
