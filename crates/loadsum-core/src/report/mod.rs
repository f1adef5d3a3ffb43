pub mod markdown;
pub mod order;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LoadsumError;
use crate::resources::classify::{aggregate_blocks, RoleAverages, ScenarioBucketAverages};
use crate::resources::{read_blocks, ResourceMetric, ScenarioBlock};
use crate::runs::export::read_csv;
use crate::runs::filename::ScenarioTag;
use crate::runs::{sort_records, RunRecord};

use order::order_scenarios;

/// Combined run table inside a results directory.
pub const RUN_TABLE_FILE: &str = "summary.csv";

// ---------------------------------------------------------------------------
// ReportConfig
// ---------------------------------------------------------------------------

/// Which scenarios a report covers, and in what order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReportConfig {
    /// Routing modes, in presentation order.
    pub labels: Vec<String>,
    /// Request-volume tiers, in presentation order.
    pub tiers: Vec<u64>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            labels: vec!["direct".to_string(), "traefik".to_string()],
            tiers: vec![100, 1000, 5000, 10000, 50000, 100000],
        }
    }
}

// ---------------------------------------------------------------------------
// ResultsDir
// ---------------------------------------------------------------------------

/// Everything read from a benchmark results directory.
#[derive(Debug, Clone)]
pub struct ResultsDir {
    pub root: PathBuf,
    pub runs: Vec<RunRecord>,
    pub cpu: Vec<ScenarioBlock>,
    pub pids: Vec<ScenarioBlock>,
    /// Tags of `*-docker-stats.csv` captures, sorted.
    pub capture_tags: Vec<ScenarioTag>,
}

impl ResultsDir {
    /// Load a results directory.
    ///
    /// `summary.csv`, `summary_cpu.txt` and `summary_pids.txt` are required;
    /// all three are checked before anything is parsed.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, LoadsumError> {
        let root = root.as_ref().to_path_buf();
        let run_table = root.join(RUN_TABLE_FILE);
        let required = [
            run_table.clone(),
            root.join(ResourceMetric::Cpu.file_name()),
            root.join(ResourceMetric::Pids.file_name()),
        ];
        if let Some(missing) = required.iter().find(|p| !p.is_file()) {
            return Err(LoadsumError::MissingInput(missing.clone()));
        }

        let mut runs = read_csv(std::fs::File::open(&run_table)?)?;
        sort_records(&mut runs);
        let cpu = read_blocks(root.join(ResourceMetric::Cpu.file_name()), ResourceMetric::Cpu)?;
        let pids = read_blocks(root.join(ResourceMetric::Pids.file_name()), ResourceMetric::Pids)?;
        let capture_tags = scan_capture_tags(&root)?;

        Ok(Self {
            root,
            runs,
            cpu,
            pids,
            capture_tags,
        })
    }

    /// Every scenario tag seen in the directory, de-duplicated, oldest first.
    ///
    /// Tags whose timestamp cannot be read sort after all dated ones; ties
    /// fall back to the tag text.
    pub fn observed_tags(&self) -> Vec<String> {
        let mut unique: BTreeSet<String> = BTreeSet::new();
        unique.extend(self.cpu.iter().map(|b| b.scenario.clone()));
        unique.extend(self.pids.iter().map(|b| b.scenario.clone()));
        unique.extend(self.capture_tags.iter().map(ToString::to_string));

        let mut tags: Vec<String> = unique.into_iter().collect();
        tags.sort_by_cached_key(|tag| {
            let started = ScenarioTag::parse(tag).and_then(|t| t.started_at());
            (started.is_none(), started)
        });
        tags
    }
}

fn scan_capture_tags(root: &Path) -> Result<Vec<ScenarioTag>, LoadsumError> {
    let mut tags = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let path = entry?.path();
        if let Some(tag) = ScenarioTag::from_docker_stats_path(&path) {
            tags.push(tag);
        }
    }
    tags.sort();
    Ok(tags)
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Side-by-side runs of the configured labels at one request volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TierComparison {
    pub total: u64,
    /// At most one run per label, in label order.
    pub runs: Vec<RunRecord>,
}

/// Role averages of one ordered scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScenarioResources {
    pub scenario: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<ScenarioTag>,
    pub cpu: RoleAverages,
    pub pids: RoleAverages,
}

/// Structured input for the report renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Report {
    pub config: ReportConfig,
    pub runs: Vec<RunRecord>,
    pub comparisons: Vec<TierComparison>,
    pub resources: Vec<ScenarioResources>,
}

/// Assemble the report from a loaded results directory.
pub fn build_report(input: &ResultsDir, config: &ReportConfig) -> Report {
    let comparisons = compare_tiers(&input.runs, config);

    let observed = input.observed_tags();
    let ordered = order_scenarios(&config.labels, &config.tiers, &observed);
    if ordered.len() < observed.len() {
        tracing::debug!(
            observed = observed.len(),
            ordered = ordered.len(),
            "some scenarios are outside the configured labels/tiers or repeat a tier"
        );
    }

    let cpu = aggregate_blocks(&input.cpu, ResourceMetric::Cpu);
    let pids = aggregate_blocks(&input.pids, ResourceMetric::Pids);
    let resources = ordered
        .into_iter()
        .map(|scenario| ScenarioResources {
            tag: ScenarioTag::parse(&scenario),
            cpu: buckets_for(&cpu, &scenario),
            pids: buckets_for(&pids, &scenario),
            scenario,
        })
        .collect();

    Report {
        config: config.clone(),
        runs: input.runs.clone(),
        comparisons,
        resources,
    }
}

/// For each configured tier, the first run of every configured label at that
/// total. Tiers without any run are left out.
pub fn compare_tiers(runs: &[RunRecord], config: &ReportConfig) -> Vec<TierComparison> {
    config
        .tiers
        .iter()
        .filter_map(|&tier| {
            let picked: Vec<RunRecord> = config
                .labels
                .iter()
                .filter_map(|label| {
                    runs.iter()
                        .find(|r| r.label == *label && r.total == Some(tier))
                        .cloned()
                })
                .collect();
            (!picked.is_empty()).then_some(TierComparison {
                total: tier,
                runs: picked,
            })
        })
        .collect()
}

/// First section for `scenario`; a repeated section is never consulted.
fn buckets_for(averages: &[ScenarioBucketAverages], scenario: &str) -> RoleAverages {
    averages
        .iter()
        .find(|a| a.scenario_tag == scenario)
        .map(|a| a.buckets.clone())
        .unwrap_or_default()
}

/// Serialize a report as pretty-printed JSON.
pub fn export_json(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
