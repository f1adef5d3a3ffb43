//! Filename conventions used by the benchmark harness.
//!
//! Run summaries are written as `<label>_<total>_<YYYY-MM-DD-HH-MM-SS>.json`;
//! resource captures use dash-separated scenario tags such as
//! `traefik-100-20250101-000000-docker-stats.csv`.

use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Label used when a file name does not follow the run-summary convention.
pub const UNKNOWN_LABEL: &str = "unknown";

const RUN_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";
const COMPACT_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";
const DOCKER_STATS_SUFFIX: &str = "-docker-stats.csv";

static RUN_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/([a-zA-Z]+)_(\d+)_(\d{4}-\d{2}-\d{2}-\d{2}-\d{2}-\d{2})\.json$")
        .expect("run file pattern is valid")
});

static SCENARIO_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z]+)-(\d+)-(.+)$").expect("scenario tag pattern is valid")
});

// ---------------------------------------------------------------------------
// RunTag
// ---------------------------------------------------------------------------

/// Identifying metadata recovered from a run-summary path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunTag {
    pub label: String,
    /// `None` when the name did not match; distinct from a run of zero requests.
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<NaiveDateTime>,
}

impl RunTag {
    pub fn unknown() -> Self {
        Self {
            label: UNKNOWN_LABEL.to_string(),
            total: None,
            started_at: None,
        }
    }
}

/// Extract `(label, total)` from a run-summary path.
///
/// The pattern is anchored on a leading `/`, so a bare file name without any
/// directory component is reported as unknown. Never fails.
pub fn tag_from_path(path: impl AsRef<Path>) -> RunTag {
    let path = path.as_ref().to_string_lossy();
    let Some(caps) = RUN_FILE_RE.captures(&path) else {
        return RunTag::unknown();
    };

    let Ok(total) = caps[2].parse::<u64>() else {
        return RunTag::unknown();
    };

    RunTag {
        label: caps[1].to_string(),
        total: Some(total),
        started_at: NaiveDateTime::parse_from_str(&caps[3], RUN_TIMESTAMP_FORMAT).ok(),
    }
}

// ---------------------------------------------------------------------------
// ScenarioTag
// ---------------------------------------------------------------------------

/// A `<label>-<total>-<timestamp...>` scenario identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScenarioTag {
    pub label: String,
    pub total: u64,
    /// Everything after the second dash, kept verbatim.
    pub timestamp: String,
}

impl ScenarioTag {
    pub fn parse(tag: &str) -> Option<Self> {
        let caps = SCENARIO_TAG_RE.captures(tag.trim())?;
        Some(Self {
            label: caps[1].to_string(),
            total: caps[2].parse().ok()?,
            timestamp: caps[3].to_string(),
        })
    }

    /// Recover the scenario tag from a `*-docker-stats.csv` capture file.
    pub fn from_docker_stats_path(path: impl AsRef<Path>) -> Option<Self> {
        let name = path.as_ref().file_name()?.to_str()?;
        let stem = name.strip_suffix(DOCKER_STATS_SUFFIX)?;
        Self::parse(stem)
    }

    /// Start time of the capture when the timestamp is in a known layout.
    pub fn started_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, COMPACT_TIMESTAMP_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(&self.timestamp, RUN_TIMESTAMP_FORMAT))
            .ok()
    }
}

impl std::fmt::Display for ScenarioTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.label, self.total, self.timestamp)
    }
}
