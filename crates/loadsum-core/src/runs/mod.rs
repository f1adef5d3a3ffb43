pub mod export;
pub mod filename;
pub mod io;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use filename::RunTag;

/// Duration every benchmark run is assumed to last, in seconds.
///
/// Throughput is derived from this constant rather than from the summary, so
/// it must match the `DURATION_S` the load script was launched with.
pub const RUN_DURATION_SECS: f64 = 300.0;

// ---------------------------------------------------------------------------
// RunRecord
// ---------------------------------------------------------------------------

/// Normalized metrics for a single load-test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunRecord {
    pub label: String,
    /// Target request volume from the file name; `None` when unknown.
    pub total: Option<u64>,
    /// Total number of HTTP requests issued (`http_reqs.count`).
    pub request_count: u64,
    /// 95th percentile request duration (ms).
    pub p95_ms: f64,
    /// 99th percentile request duration (ms).
    pub p99_ms: f64,
    /// Mean request duration (ms).
    pub avg_ms: f64,
    /// `request_count / RUN_DURATION_SECS`, rounded to 2 decimals.
    pub requests_per_second: f64,
    /// Failed-request rate as a percentage, rounded to 3 decimals.
    pub error_rate_percent: f64,
    pub status_2xx: u64,
    pub status_3xx: u64,
    pub status_4xx: u64,
    pub status_5xx: u64,
}

impl RunRecord {
    /// Build a record from a parsed k6 summary.
    ///
    /// Absent metrics default to zero. A zero percentile therefore cannot be
    /// told apart from a percentile that was never exported.
    pub fn from_summary(summary: &Value, tag: &RunTag) -> Self {
        let request_count = metric_count(summary, "http_reqs");
        let p95 = metric_percentile(summary, "http_req_duration", "p(95)").unwrap_or(0.0);
        let p99 = metric_percentile(summary, "http_req_duration", "p(99)").unwrap_or(0.0);
        let avg = metric_field(summary, "http_req_duration", "avg").unwrap_or(0.0);
        let failed_rate = metric_field(summary, "http_req_failed", "rate").unwrap_or(0.0);

        Self {
            label: tag.label.clone(),
            total: tag.total,
            request_count,
            p95_ms: round_to(p95, 2),
            p99_ms: round_to(p99, 2),
            avg_ms: round_to(avg, 2),
            requests_per_second: round_to(request_count as f64 / RUN_DURATION_SECS, 2),
            error_rate_percent: round_to(failed_rate * 100.0, 3),
            status_2xx: metric_count(summary, "code_2xx"),
            status_3xx: metric_count(summary, "code_3xx"),
            status_4xx: metric_count(summary, "code_4xx"),
            status_5xx: metric_count(summary, "code_5xx"),
        }
    }

    /// Ordering used for every tabular output: label, then total with unknown
    /// totals after all numeric ones.
    pub fn sort_key_cmp(&self, other: &Self) -> Ordering {
        self.label
            .cmp(&other.label)
            .then_with(|| match (self.total, other.total) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    }
}

/// Sort records in place by `(label, total)`. Stable, so runs sharing a key keep
/// their input order.
pub fn sort_records(records: &mut [RunRecord]) {
    records.sort_by(RunRecord::sort_key_cmp);
}

// ---------------------------------------------------------------------------
// Summary lookup helpers
// ---------------------------------------------------------------------------

/// Walk `keys` through nested JSON objects, returning `None` at the first gap.
pub fn lookup<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(value, |node, key| node.as_object()?.get(*key))
}

fn metric_field(summary: &Value, metric: &str, key: &str) -> Option<f64> {
    lookup(summary, &["metrics", metric, key])?.as_f64()
}

fn metric_percentile(summary: &Value, metric: &str, percentile: &str) -> Option<f64> {
    lookup(summary, &["metrics", metric, "percentiles", percentile])?.as_f64()
}

fn metric_count(summary: &Value, metric: &str) -> u64 {
    metric_field(summary, metric, "count")
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v.trunc() as u64)
        .unwrap_or(0)
}

/// Round on the exact decimal expansion of `value`, ties to even, so a
/// stored `83.28499..` gives `83.28`.
pub(crate) fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
