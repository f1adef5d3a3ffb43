use std::fmt::Write as _;

use crate::resources::classify::{Role, RoleAverages};
use crate::runs::RunRecord;

use super::Report;

// ---------------------------------------------------------------------------
// Markdown export
// ---------------------------------------------------------------------------

/// Render a report as a standalone markdown document.
///
/// Sections: per-run table, per-tier comparison, then CPU and process counts
/// per container role. Roles without data show `-`.
pub fn render_markdown(report: &Report) -> String {
    let mut out = String::new();

    out.push_str("# Load test report\n\n");
    let _ = writeln!(
        out,
        "Scenarios: {} | Tiers: {}\n",
        report.config.labels.join(", "),
        report
            .config
            .tiers
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    // --- runs ---
    out.push_str("## Runs\n\n");
    if report.runs.is_empty() {
        out.push_str("_No runs found._\n\n");
    } else {
        out.push_str(
            "| Label | Total | Requests | p95 (ms) | p99 (ms) | Avg (ms) | RPS | Errors (%) | 2xx | 3xx | 4xx | 5xx |\n",
        );
        out.push_str("|---|---:|---:|---:|---:|---:|---:|---:|---:|---:|---:|---:|\n");
        for r in &report.runs {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {:.2} | {:.2} | {:.2} | {:.2} | {:.3} | {} | {} | {} | {} |",
                md_escape(&r.label),
                fmt_total(r),
                r.request_count,
                r.p95_ms,
                r.p99_ms,
                r.avg_ms,
                r.requests_per_second,
                r.error_rate_percent,
                r.status_2xx,
                r.status_3xx,
                r.status_4xx,
                r.status_5xx,
            );
        }
        out.push('\n');
    }

    // --- comparisons ---
    out.push_str("## Latency by tier\n\n");
    if report.comparisons.is_empty() {
        out.push_str("_No runs match the configured tiers._\n\n");
    } else {
        out.push_str("| Total | Label | p95 (ms) | p99 (ms) | Avg (ms) | RPS | Errors (%) |\n");
        out.push_str("|---:|---|---:|---:|---:|---:|---:|\n");
        for cmp in &report.comparisons {
            for r in &cmp.runs {
                let _ = writeln!(
                    out,
                    "| {} | {} | {:.2} | {:.2} | {:.2} | {:.2} | {:.3} |",
                    cmp.total,
                    md_escape(&r.label),
                    r.p95_ms,
                    r.p99_ms,
                    r.avg_ms,
                    r.requests_per_second,
                    r.error_rate_percent,
                );
            }
        }
        out.push('\n');
    }

    // --- resources ---
    let cpu: Vec<_> = report.resources.iter().map(|s| (s.scenario.as_str(), &s.cpu)).collect();
    let pids: Vec<_> = report.resources.iter().map(|s| (s.scenario.as_str(), &s.pids)).collect();
    push_role_table(&mut out, "Container CPU (%)", &cpu);
    push_role_table(&mut out, "Container processes", &pids);

    out
}

fn push_role_table(out: &mut String, title: &str, rows: &[(&str, &RoleAverages)]) {
    let _ = writeln!(out, "## {title}\n");
    if rows.is_empty() {
        out.push_str("_No resource samples found._\n\n");
        return;
    }
    out.push_str("| Scenario |");
    for role in Role::ALL {
        let _ = write!(out, " {role} |");
    }
    out.push_str("\n|---|");
    for _ in Role::ALL {
        out.push_str("---:|");
    }
    out.push('\n');
    for (scenario, buckets) in rows {
        let _ = write!(out, "| {} |", md_escape(scenario));
        for role in Role::ALL {
            match buckets.get(&role) {
                Some(v) => {
                    let _ = write!(out, " {v:.2} |");
                }
                None => out.push_str(" - |"),
            }
        }
        out.push('\n');
    }
    out.push('\n');
}

fn fmt_total(r: &RunRecord) -> String {
    r.total.map(|t| t.to_string()).unwrap_or_default()
}

/// Escape characters that would break a table cell.
fn md_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ReportConfig, ScenarioResources, TierComparison};
    use crate::runs::filename::RunTag;

    fn make_run(label: &str, total: Option<u64>) -> RunRecord {
        let summary = serde_json::json!({
            "metrics": {
                "http_reqs": { "count": 1500 },
                "http_req_duration": { "avg": 5.0, "percentiles": { "p(95)": 9.5, "p(99)": 12.0 } }
            }
        });
        RunRecord::from_summary(
            &summary,
            &RunTag {
                label: label.to_string(),
                total,
                started_at: None,
            },
        )
    }

    fn make_report() -> Report {
        let direct = make_run("direct", Some(100));
        let traefik = make_run("traefik", Some(100));
        Report {
            config: ReportConfig::default(),
            runs: vec![direct.clone(), traefik.clone(), make_run("unknown", None)],
            comparisons: vec![TierComparison {
                total: 100,
                runs: vec![direct, traefik],
            }],
            resources: vec![ScenarioResources {
                scenario: "traefik-100-20250101-000000".to_string(),
                tag: None,
                cpu: [(Role::Proxy, 12.5), (Role::App, 30.0)].into_iter().collect(),
                pids: RoleAverages::new(),
            }],
        }
    }

    #[test]
    fn render_markdown_has_all_sections() {
        let md = render_markdown(&make_report());
        assert!(md.starts_with("# Load test report"));
        assert!(md.contains("## Runs"));
        assert!(md.contains("## Latency by tier"));
        assert!(md.contains("## Container CPU (%)"));
        assert!(md.contains("## Container processes"));
    }

    #[test]
    fn render_markdown_run_rows() {
        let md = render_markdown(&make_report());
        assert!(md.contains("| direct | 100 | 1500 | 9.50 | 12.00 | 5.00 | 5.00 | 0.000 | 0 | 0 | 0 | 0 |"));
        assert!(md.contains("| unknown |  | 1500 |"));
        assert!(md.contains("| 100 | traefik | 9.50 | 12.00 | 5.00 | 5.00 | 0.000 |"));
    }

    #[test]
    fn render_markdown_missing_roles_show_dash() {
        let md = render_markdown(&make_report());
        assert!(md.contains("| Scenario | proxy | app | cache |"));
        assert!(md.contains("| traefik-100-20250101-000000 | 12.50 | 30.00 | - |"));
        assert!(md.contains("| traefik-100-20250101-000000 | - | - | - |"));
    }

    #[test]
    fn render_markdown_empty_report() {
        let report = Report {
            config: ReportConfig::default(),
            runs: Vec::new(),
            comparisons: Vec::new(),
            resources: Vec::new(),
        };
        let md = render_markdown(&report);
        assert!(md.contains("_No runs found._"));
        assert!(md.contains("_No runs match the configured tiers._"));
        assert!(md.contains("_No resource samples found._"));
    }

    #[test]
    fn md_escape_pipes() {
        assert_eq!(md_escape("a|b"), "a\\|b");
        assert_eq!(md_escape("plain"), "plain");
    }
}
