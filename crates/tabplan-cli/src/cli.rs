use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tabplan", about = "Run tabular data-transformation plans", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON configuration file (falls back to $TABPLAN_CONFIG)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `tabplan_eval=debug` (overrides RUST_LOG)
    #[arg(long = "log-level", global = true, value_name = "FILTER")]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a plan and print the result envelope
    Run {
        /// Plan document (JSON)
        plan: PathBuf,

        /// Directory relative CSV paths resolve against
        #[arg(long, value_name = "DIR")]
        base_dir: Option<PathBuf>,

        /// Write a text report (plan, transcript, result) to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        /// Pretty-print the result envelope
        #[arg(long)]
        pretty: bool,

        /// Echo the run transcript to stderr
        #[arg(long)]
        transcript: bool,

        /// Tables with more rows than this are truncated by display steps
        #[arg(long, value_name = "ROWS")]
        preview_threshold: Option<usize>,

        /// Rows shown for a truncated table
        #[arg(long, value_name = "ROWS")]
        preview_rows: Option<usize>,

        /// Relative tolerance for float equality in filters
        #[arg(long, value_name = "TOL")]
        float_tolerance: Option<f64>,
    },

    /// Print the header columns of a CSV file as a JSON array
    Columns {
        /// CSV file
        csv: PathBuf,
    },

    /// Parse a plan and list its steps without running it
    Check {
        /// Plan document (JSON)
        plan: PathBuf,
    },
}
