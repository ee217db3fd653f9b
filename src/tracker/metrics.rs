use crate::registry::UpdateOutcome;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for the tracker loop, shared between the loop and its handles
#[derive(Clone, Debug, Default)]
pub struct TrackerMetrics {
    /// Samples that created or moved an entity
    samples_applied: Arc<AtomicU64>,

    /// Samples below the movement threshold
    samples_unchanged: Arc<AtomicU64>,

    /// New ids refused at capacity
    samples_rejected: Arc<AtomicU64>,

    /// Empty ids or non-finite coordinates
    samples_invalid: Arc<AtomicU64>,

    frames_published: Arc<AtomicU64>,
    entities_pruned: Arc<AtomicU64>,
}

impl TrackerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_outcome(&self, outcome: UpdateOutcome) {
        let counter = match outcome {
            UpdateOutcome::Created | UpdateOutcome::Moved(_) => &self.samples_applied,
            UpdateOutcome::Unchanged => &self.samples_unchanged,
            UpdateOutcome::Rejected => &self.samples_rejected,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid(&self) {
        self.samples_invalid.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame(&self) {
        self.frames_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pruned(&self, count: usize) {
        self.entities_pruned.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            samples_applied: self.samples_applied.load(Ordering::Relaxed),
            samples_unchanged: self.samples_unchanged.load(Ordering::Relaxed),
            samples_rejected: self.samples_rejected.load(Ordering::Relaxed),
            samples_invalid: self.samples_invalid.load(Ordering::Relaxed),
            frames_published: self.frames_published.load(Ordering::Relaxed),
            entities_pruned: self.entities_pruned.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub samples_applied: u64,
    pub samples_unchanged: u64,
    pub samples_rejected: u64,
    pub samples_invalid: u64,
    pub frames_published: u64,
    pub entities_pruned: u64,
}
