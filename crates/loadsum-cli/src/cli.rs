use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "loadsum",
    version,
    about = "Summarize k6 run summaries and container resource dumps"
)]
pub struct Cli {
    /// Log filter in `tracing` env-filter syntax (e.g. `debug`, `loadsum_core=trace`)
    #[arg(long, global = true, env = "LOADSUM_LOG", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize k6 JSON summaries into one CSV table sorted by label and total
    Summarize {
        /// Summary files named `<label>_<total>_<YYYY-MM-DD-HH-MM-SS>.json`
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write the CSV here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Build the markdown/JSON comparison report from a results directory
    Report {
        /// Directory holding summary.csv, summary_cpu.txt and summary_pids.txt
        results_dir: PathBuf,

        /// Where to write report.md and report.json (defaults to the results directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Scenario labels in presentation order
        #[arg(long, env = "LOADSUM_LABELS", value_delimiter = ',')]
        labels: Vec<String>,

        /// Request-volume tiers in presentation order
        #[arg(long, env = "LOADSUM_TIERS", value_delimiter = ',')]
        tiers: Vec<u64>,
    },
}
