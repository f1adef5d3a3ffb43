//! Container resource dumps (`summary_cpu.txt`, `summary_pids.txt`).
//!
//! Each dump is a sequence of sections:
//!
//! ```text
//! == traefik-100-20250101-000000
//! traefik-1 avg_cpu=12.5% samples=10
//! app-1 avg_cpu=40.0% samples=10
//! ```
//!
//! A section header names the scenario verbatim; data lines carry one
//! container's averaged value for a single metric.

pub mod classify;

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::LoadsumError;

const SECTION_MARKER: &str = "==";

static SAMPLE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?P<name>.+?)\s+avg_(?P<metric>[A-Za-z0-9_]+)=(?P<value>[-+]?\d+(?:\.\d+)?)(?P<unit>[^\s\d.]*)\s+samples=(?P<samples>\d+)\s*$",
    )
    .expect("sample line pattern is valid")
});

// ---------------------------------------------------------------------------
// ResourceMetric
// ---------------------------------------------------------------------------

/// The resource dumps produced by the capture script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceMetric {
    /// Container CPU usage, in percent of one core.
    Cpu,
    /// Number of processes/threads inside the container.
    Pids,
}

impl ResourceMetric {
    pub const ALL: [ResourceMetric; 2] = [ResourceMetric::Cpu, ResourceMetric::Pids];

    /// Key used in `avg_<key>=` on data lines.
    pub fn key(self) -> &'static str {
        match self {
            ResourceMetric::Cpu => "cpu",
            ResourceMetric::Pids => "pids",
        }
    }

    /// File name of the dump inside a results directory.
    pub fn file_name(self) -> &'static str {
        match self {
            ResourceMetric::Cpu => "summary_cpu.txt",
            ResourceMetric::Pids => "summary_pids.txt",
        }
    }
}

// ---------------------------------------------------------------------------
// Parsed data
// ---------------------------------------------------------------------------

/// One container's value on a data line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResourceSample {
    /// Raw container/process name as written in the dump.
    pub identity: String,
    pub value: f64,
    /// Number of raw observations the capture script averaged.
    pub samples: u64,
}

/// All matching samples of one section, in line order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScenarioBlock {
    pub scenario: String,
    pub samples: Vec<ResourceSample>,
}

impl ScenarioBlock {
    /// `(identity, value)` pairs in line order.
    pub fn pairs(&self) -> Vec<(&str, f64)> {
        self.samples
            .iter()
            .map(|s| (s.identity.as_str(), s.value))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a single data line for `metric`. Returns `None` for anything else.
pub fn parse_sample_line(line: &str, metric: &str) -> Option<ResourceSample> {
    let caps = SAMPLE_LINE_RE.captures(line)?;
    if &caps["metric"] != metric {
        return None;
    }
    Some(ResourceSample {
        identity: caps["name"].trim().to_string(),
        value: caps["value"].parse().ok()?,
        samples: caps["samples"].parse().ok()?,
    })
}

/// Split a dump into scenario sections and keep the samples for `metric`.
///
/// Lines before the first section header, and lines that do not carry
/// `avg_<metric>=`, are ignored. Sections left without samples are omitted.
/// A repeated section name starts a separate entry; the two are never merged.
pub fn parse_blocks(text: &str, metric: &str) -> Vec<ScenarioBlock> {
    let mut blocks: Vec<ScenarioBlock> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for line in text.lines() {
        if let Some(rest) = line.trim_start().strip_prefix(SECTION_MARKER) {
            let scenario = rest.trim().to_string();
            if !seen.insert(scenario.clone()) {
                tracing::warn!(%scenario, metric, "duplicate scenario section; keeping both entries");
            }
            blocks.push(ScenarioBlock {
                scenario,
                samples: Vec::new(),
            });
            continue;
        }

        if let (Some(sample), Some(block)) = (parse_sample_line(line, metric), blocks.last_mut()) {
            block.samples.push(sample);
        }
    }

    blocks.retain(|b| !b.samples.is_empty());
    blocks
}

/// Read and parse one resource dump from disk.
pub fn read_blocks(
    path: impl AsRef<Path>,
    metric: ResourceMetric,
) -> Result<Vec<ScenarioBlock>, LoadsumError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(LoadsumError::MissingInput(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    let blocks = parse_blocks(&text, metric.key());
    tracing::info!(
        path = %path.display(),
        scenarios = blocks.len(),
        metric = metric.key(),
        "parsed resource dump"
    );
    Ok(blocks)
}
