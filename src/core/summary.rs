use crate::domain::model::Record;
use std::collections::HashMap;

/// Counts records per value of `field`, most frequent first and ties by name.
/// Missing or blank values are counted as `Unknown`.
pub fn count_by(records: &[Record], field: &str) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records {
        let key = record
            .get_str(field)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or("Unknown");
        *counts.entry(key.to_string()).or_default() += 1;
    }

    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}
