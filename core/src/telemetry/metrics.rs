use serde::Serialize;
use std::sync::Mutex;

/// Link counters, shareable through `Arc` with whoever reports on the link.
pub struct LinkMetrics {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub frames_emitted: usize,
    pub frames_decoded: usize,
    pub commands_applied: usize,
    pub commands_ignored: usize,
    pub frames_discarded: usize,
    pub overflows: usize,
}

impl LinkMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    fn update(&self, apply: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
        }
    }

    pub fn record_emitted(&self) {
        self.update(|m| m.frames_emitted += 1);
    }

    pub fn record_decoded(&self) {
        self.update(|m| m.frames_decoded += 1);
    }

    pub fn record_command(&self, applied: bool) {
        self.update(|m| {
            if applied {
                m.commands_applied += 1;
            } else {
                m.commands_ignored += 1;
            }
        });
    }

    pub fn record_discarded(&self) {
        self.update(|m| m.frames_discarded += 1);
    }

    pub fn record_overflow(&self) {
        self.update(|m| m.overflows += 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for LinkMetrics {
    fn default() -> Self {
        Self::new()
    }
}
