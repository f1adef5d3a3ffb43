use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use loadsum_core::report::markdown::render_markdown;
use loadsum_core::report::{build_report, export_json, ReportConfig, ResultsDir};
use loadsum_core::runs::export::write_csv;
use loadsum_core::runs::io::load_run_records;

use crate::cli::{Cli, Command};

pub const REPORT_MARKDOWN_FILE: &str = "report.md";
pub const REPORT_JSON_FILE: &str = "report.json";

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Summarize { files, output } => summarize(&files, output.as_deref()),
        Command::Report {
            results_dir,
            out_dir,
            labels,
            tiers,
        } => {
            let mut config = ReportConfig::default();
            if !labels.is_empty() {
                config.labels = labels;
            }
            if !tiers.is_empty() {
                config.tiers = tiers;
            }
            let out_dir = out_dir.unwrap_or_else(|| results_dir.clone());
            report(&results_dir, &out_dir, &config)
        }
    }
}

fn summarize(files: &[PathBuf], output: Option<&Path>) -> Result<()> {
    let records = load_run_records(files).context("read run summaries")?;

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("create {}", path.display()))?;
            write_csv(&records, BufWriter::new(file))
                .with_context(|| format!("write {}", path.display()))?;
            tracing::info!(path = %path.display(), rows = records.len(), "wrote run table");
        }
        None => {
            let stdout = std::io::stdout();
            write_csv(&records, stdout.lock()).context("write CSV to stdout")?;
        }
    }
    Ok(())
}

fn report(results_dir: &Path, out_dir: &Path, config: &ReportConfig) -> Result<()> {
    let input = ResultsDir::load(results_dir)
        .with_context(|| format!("load results from {}", results_dir.display()))?;
    let report = build_report(&input, config);

    let markdown = render_markdown(&report);
    let json = export_json(&report).context("serialize report")?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create {}", out_dir.display()))?;
    write_file(&out_dir.join(REPORT_MARKDOWN_FILE), markdown.as_bytes())?;
    write_file(&out_dir.join(REPORT_JSON_FILE), json.as_bytes())?;

    println!(
        "report: {} runs, {} scenarios from {} -> {}",
        report.runs.len(),
        report.resources.len(),
        input.root.display(),
        out_dir.join(REPORT_MARKDOWN_FILE).display()
    );
    Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
