/// Arrange observed scenario tags for presentation.
///
/// Walks `labels` × `tiers` in nested order and, for each pair, picks the
/// first tag in `observed` starting with `<label>-<tier>-`. Pairs without a
/// match are skipped. Later tags sharing the prefix are not returned.
pub fn order_scenarios<L, T>(labels: &[L], tiers: &[u64], observed: &[T]) -> Vec<String>
where
    L: AsRef<str>,
    T: AsRef<str>,
{
    let mut ordered = Vec::new();
    for label in labels {
        let label = label.as_ref();
        for tier in tiers {
            let prefix = format!("{label}-{tier}-");
            let mut matches = observed
                .iter()
                .map(|tag| -> &str { tag.as_ref() })
                .filter(|tag| tag.starts_with(&prefix));
            let Some(first) = matches.next() else {
                continue;
            };
            let skipped = matches.count();
            if skipped > 0 {
                tracing::debug!(%prefix, selected = first, skipped, "multiple runs for scenario; using the first");
            }
            ordered.push(first.to_string());
        }
    }
    ordered
}
