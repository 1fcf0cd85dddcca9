use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Point-in-time view of job counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub in_flight: usize,
    /// Fraction of finished work in `[0, 100]`.
    pub percent: f64,
    /// Estimated remaining runtime in milliseconds, when enough samples exist.
    pub eta_ms: Option<u64>,
}

/// Lock-free per-job progress counters.
///
/// Counters are updated from concurrently completing nodes; the snapshot is
/// not a consistent cut across all fields, which is acceptable for display.
#[derive(Debug)]
pub struct ProgressTracker {
    total: usize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
    in_flight: AtomicUsize,
    elapsed_ms: AtomicU64,
    samples: AtomicU64,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            elapsed_ms: AtomicU64::new(0),
            samples: AtomicU64::new(0),
        }
    }

    pub fn started(&self) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful node and the time it took.
    pub fn completed(&self, took: Duration) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
        self.completed.fetch_add(1, Ordering::Relaxed);
        self.record_sample(took);
    }

    /// Record a failed node and the time it took.
    pub fn failed(&self, took: Duration) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.record_sample(took);
    }

    /// Record a node that never ran. Skipped nodes stay out of the percent
    /// figure (only completed and failed nodes advance it) but do shrink the
    /// remaining count the ETA is projected over.
    pub fn skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    fn record_sample(&self, took: Duration) {
        self.elapsed_ms
            .fetch_add(took.as_millis() as u64, Ordering::Relaxed);
        self.samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let completed = self.completed.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let skipped = self.skipped.load(Ordering::Relaxed);
        let in_flight = self.in_flight.load(Ordering::Relaxed);
        let finished = completed + failed + skipped;

        let percent = if self.total == 0 {
            100.0
        } else {
            ((completed + failed) as f64 / self.total as f64) * 100.0
        };

        // ETA is a rolling average of observed node durations projected over
        // the remaining count. With concurrent layers it overestimates, which
        // beats promising too little.
        let samples = self.samples.load(Ordering::Relaxed);
        let eta_ms = if samples == 0 || finished >= self.total {
            None
        } else {
            let avg = self.elapsed_ms.load(Ordering::Relaxed) / samples;
            Some(avg * (self.total - finished) as u64)
        };

        ProgressSnapshot {
            total: self.total,
            completed,
            failed,
            skipped,
            in_flight,
            percent,
            eta_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_counts_failures_as_finished() {
        let t = ProgressTracker::new(4);
        t.started();
        t.completed(Duration::from_millis(100));
        t.started();
        t.failed(Duration::from_millis(300));
        let snap = t.snapshot();
        assert_eq!(snap.completed, 1);
        assert_eq!(snap.failed, 1);
        assert!((snap.percent - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn eta_projects_average_duration() {
        let t = ProgressTracker::new(4);
        t.started();
        t.completed(Duration::from_millis(200));
        t.started();
        t.completed(Duration::from_millis(400));
        assert_eq!(t.snapshot().eta_ms, Some(600));
    }

    #[test]
    fn eta_absent_without_samples() {
        let t = ProgressTracker::new(2);
        assert_eq!(t.snapshot().eta_ms, None);
    }

    #[test]
    fn empty_job_is_fully_done() {
        let t = ProgressTracker::new(0);
        assert!((t.snapshot().percent - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn skipped_nodes_do_not_advance_percent() {
        let t = ProgressTracker::new(4);
        t.started();
        t.completed(Duration::from_millis(100));
        t.skipped();
        t.skipped();
        let snap = t.snapshot();
        assert_eq!(snap.skipped, 2);
        assert!((snap.percent - 25.0).abs() < f64::EPSILON);
        // One node remains; the ETA projects over it alone.
        assert_eq!(snap.eta_ms, Some(100));
    }
}
