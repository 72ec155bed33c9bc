use std::collections::HashMap;

/// True when a header may be forwarded to remote clusters: the name starts
/// with `x`/`X` (case-insensitive), or is exactly `Cookie`.
pub fn is_forwardable(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.eq_ignore_ascii_case(&'x')) || name == "Cookie"
}

/// Filters an inbound header set down to the forwardable subset. Pure;
/// output order is irrelevant.
pub fn select_forwardable(pairs: &[(String, String)]) -> HashMap<String, String> {
    pairs
        .iter()
        .filter(|(name, _)| is_forwardable(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}
