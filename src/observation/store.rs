use super::Sample;
use dashmap::DashMap;

/// Default retention window: 24 hours.
pub const DEFAULT_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// Append-only, time-windowed sample log per entity.
///
/// One store exists per domain (wifi, Bluetooth). Pruning is lazy: it runs
/// on every write and read for a key, against the caller-supplied "now".
pub struct ObservationStore {
    logs: DashMap<String, Vec<Sample>>,
    window_ms: i64,
}

impl ObservationStore {
    pub fn new(window_ms: i64) -> Self {
        Self {
            logs: DashMap::new(),
            window_ms,
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Oldest timestamp still inside the window at `now_ms`.
    pub fn cutoff(&self, now_ms: i64) -> i64 {
        now_ms - self.window_ms
    }

    /// Record a sample for `entity_key`.
    ///
    /// Samples without finite coordinates are ignored. A sample with the same
    /// `(agent_id, observed_at_ms)` as one already logged replaces it, so
    /// re-ingesting a payload never duplicates entries.
    pub fn record(&self, entity_key: &str, sample: Sample, now_ms: i64) {
        if !sample.has_finite_position() {
            return;
        }

        let cutoff = self.cutoff(now_ms);
        let mut log = self.logs.entry(entity_key.to_string()).or_default();

        match log
            .iter_mut()
            .find(|s| s.agent_id == sample.agent_id && s.observed_at_ms == sample.observed_at_ms)
        {
            Some(existing) => *existing = sample,
            None => log.push(sample),
        }

        log.retain(|s| s.observed_at_ms >= cutoff);
    }

    /// Samples for `entity_key` still inside the window at `now_ms`.
    pub fn samples_for(&self, entity_key: &str, now_ms: i64) -> Vec<Sample> {
        let cutoff = self.cutoff(now_ms);
        match self.logs.get_mut(entity_key) {
            Some(mut log) => {
                log.retain(|s| s.observed_at_ms >= cutoff && s.has_finite_position());
                log.clone()
            }
            None => Vec::new(),
        }
    }

    /// Number of entities with a log (including logs pruned to empty).
    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}

impl Default for ObservationStore {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MS)
    }
}
