use std::collections::BTreeMap;

pub const DOCUMENTS_FETCHED: &str = "documents_fetched";
pub const ALTERATION_DOCUMENTS_FAILED: &str = "alteration_documents_failed";
pub const ALTERATIONS_APPLIED: &str = "alterations_applied";
pub const MARKERS_LOADED: &str = "markers_loaded";
pub const MARKERS_SKIPPED: &str = "markers_skipped";
pub const SHAPES_BUILT: &str = "shapes_built";
pub const WORLD_LOADS: &str = "world_loads";
pub const WORLD_LOAD_FAILURES: &str = "world_load_failures";

/// Deterministic load counters.
///
/// Sorted maps keep snapshots in a stable order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadMetrics {
    counters: BTreeMap<String, u64>,
}

impl LoadMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn inc_counter(&mut self, name: impl Into<String>, by: u64) {
        *self.counters.entry(name.into()).or_insert(0) += by;
    }

    pub fn snapshot(&self) -> Vec<(String, u64)> {
        self.counters.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::LoadMetrics;

    #[test]
    fn counters_accumulate() {
        let mut m = LoadMetrics::new();
        m.inc_counter("a", 1);
        m.inc_counter("a", 2);
        assert_eq!(m.counter("a"), 3);
        assert_eq!(m.counter("missing"), 0);
    }

    #[test]
    fn snapshot_is_stably_sorted() {
        let mut m = LoadMetrics::new();
        m.inc_counter("b", 1);
        m.inc_counter("a", 4);
        assert_eq!(
            m.snapshot(),
            vec![("a".to_string(), 4), ("b".to_string(), 1)]
        );
        assert!(LoadMetrics::new().snapshot().is_empty());
    }
}
