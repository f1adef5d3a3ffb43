//! Maps free-text container names onto the logical roles of the benchmark
//! stack and averages values per role.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use super::{ResourceMetric, ScenarioBlock};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Logical container role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Proxy,
    App,
    Cache,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Proxy, Role::App, Role::Cache];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Proxy => "proxy",
            Role::App => "app",
            Role::Cache => "cache",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name patterns per role, matched case-insensitively anywhere in the name.
///
/// Add new known containers here. A name may match more than one role.
pub const ROLE_PATTERNS: &[(Role, &[&str])] = &[
    (Role::Proxy, &["traefik"]),
    (Role::App, &["-app", r"app-\d+"]),
    (Role::Cache, &["redis"]),
];

static ROLE_MATCHERS: LazyLock<Vec<(Role, Vec<Regex>)>> = LazyLock::new(|| {
    ROLE_PATTERNS
        .iter()
        .map(|(role, patterns)| {
            let compiled = patterns
                .iter()
                .filter_map(|p| match RegexBuilder::new(p).case_insensitive(true).build() {
                    Ok(re) => Some(re),
                    Err(e) => {
                        tracing::error!(pattern = *p, error = %e, "invalid role pattern");
                        None
                    }
                })
                .collect();
            (*role, compiled)
        })
        .collect()
});

/// Every role whose patterns match `identity`, in table order.
pub fn classify(identity: &str) -> Vec<Role> {
    ROLE_MATCHERS
        .iter()
        .filter(|(_, patterns)| patterns.iter().any(|re| re.is_match(identity)))
        .map(|(role, _)| *role)
        .collect()
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Mean value per role. Roles with no matching sample are absent.
pub type RoleAverages = BTreeMap<Role, f64>;

/// Average `(identity, value)` pairs per role.
///
/// A pair contributes to every role it matches; unmatched names are ignored.
pub fn aggregate<'a, I>(pairs: I) -> RoleAverages
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut sums: BTreeMap<Role, (f64, u32)> = BTreeMap::new();
    for (identity, value) in pairs {
        for role in classify(identity) {
            let entry = sums.entry(role).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(role, (sum, n))| (role, sum / f64::from(n)))
        .collect()
}

/// Role averages of one scenario section for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScenarioBucketAverages {
    pub scenario_tag: String,
    pub metric: ResourceMetric,
    pub buckets: RoleAverages,
}

/// Aggregate every parsed section, keeping section order.
pub fn aggregate_blocks(blocks: &[ScenarioBlock], metric: ResourceMetric) -> Vec<ScenarioBucketAverages> {
    blocks
        .iter()
        .map(|block| ScenarioBucketAverages {
            scenario_tag: block.scenario.clone(),
            metric,
            buckets: aggregate(block.pairs()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::parse_blocks;

    #[test]
    fn classify_known_names() {
        assert_eq!(classify("traefik-1"), vec![Role::Proxy]);
        assert_eq!(classify("bench-traefik-1"), vec![Role::Proxy]);
        assert_eq!(classify("app-1"), vec![Role::App]);
        assert_eq!(classify("app-12"), vec![Role::App]);
        assert_eq!(classify("bench-app"), vec![Role::App]);
        assert_eq!(classify("redis-1"), vec![Role::Cache]);
    }

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(classify("TRAEFIK-1"), vec![Role::Proxy]);
        assert_eq!(classify("Bench-App-2"), vec![Role::App]);
        assert_eq!(classify("Redis"), vec![Role::Cache]);
    }

    #[test]
    fn classify_unmatched_names() {
        assert!(classify("postgres-1").is_empty());
        assert!(classify("apple").is_empty());
        assert!(classify("").is_empty());
    }

    #[test]
    fn classify_overlapping_name_matches_every_role() {
        assert_eq!(classify("redis-app-1"), vec![Role::App, Role::Cache]);
    }

    #[test]
    fn aggregate_averages_per_role_and_omits_empty_roles() {
        let averages = aggregate([("traefik-1", 12.5), ("app-1", 40.0), ("app-2", 20.0)]);
        let expected: RoleAverages = [(Role::Proxy, 12.5), (Role::App, 30.0)].into_iter().collect();
        assert_eq!(averages, expected);
        assert!(!averages.contains_key(&Role::Cache));
    }

    #[test]
    fn aggregate_overlapping_name_counts_in_both_roles() {
        let averages = aggregate([("redis-app-1", 10.0), ("redis-1", 20.0), ("app-2", 30.0)]);
        assert_eq!(averages.get(&Role::Cache), Some(&15.0));
        assert_eq!(averages.get(&Role::App), Some(&20.0));
        assert!(averages.get(&Role::Proxy).is_none());
    }

    #[test]
    fn aggregate_ignores_unmatched_and_empty_input() {
        assert!(aggregate([("postgres-1", 99.0)]).is_empty());
        assert!(aggregate(Vec::<(&str, f64)>::new()).is_empty());
    }

    #[test]
    fn role_averages_serialize_with_role_names() {
        let averages = aggregate([("traefik-1", 12.5), ("app-1", 40.0)]);
        let json = serde_json::to_string(&averages).expect("serialize should succeed");
        assert_eq!(json, r#"{"proxy":12.5,"app":40.0}"#);
    }

    #[test]
    fn aggregate_blocks_keeps_section_order() {
        let text = "\
== traefik-100-1
traefik-1 avg_cpu=10% samples=1
app-1 avg_cpu=50% samples=1
== direct-100-1
app-1 avg_cpu=30% samples=1
redis-1 avg_cpu=2% samples=1
";
        let blocks = parse_blocks(text, "cpu");
        let aggs = aggregate_blocks(&blocks, ResourceMetric::Cpu);
        assert_eq!(aggs.len(), 2);
        assert_eq!(aggs[0].scenario_tag, "traefik-100-1");
        assert_eq!(aggs[0].buckets.get(&Role::Proxy), Some(&10.0));
        assert_eq!(aggs[1].scenario_tag, "direct-100-1");
        assert_eq!(aggs[1].buckets.get(&Role::Cache), Some(&2.0));
        assert!(aggs[1].buckets.get(&Role::Proxy).is_none());
        assert_eq!(aggs[1].metric, ResourceMetric::Cpu);
    }
}
