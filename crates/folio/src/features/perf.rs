//! Page load timing and long-task reporting.

use tracing::{info, warn};

/// Counts tasks that block the main thread for too long
#[derive(Debug, Clone, PartialEq)]
pub struct LongTaskMonitor {
    threshold_ms: f64,
    reported: usize,
    worst_ms: f64,
}

impl LongTaskMonitor {
    /// Report tasks longer than `threshold_ms`
    #[must_use]
    pub const fn new(threshold_ms: f64) -> Self {
        Self {
            threshold_ms,
            reported: 0,
            worst_ms: 0.0,
        }
    }

    /// Record a task duration; returns whether it was reported
    pub fn record(&mut self, duration_ms: f64) -> bool {
        if duration_ms.is_nan() || duration_ms <= self.threshold_ms {
            return false;
        }
        self.reported += 1;
        self.worst_ms = self.worst_ms.max(duration_ms);
        warn!(duration_ms, threshold_ms = self.threshold_ms, "long task detected");
        true
    }

    /// Number of reported tasks
    #[must_use]
    pub const fn reported(&self) -> usize {
        self.reported
    }

    /// Longest reported task, 0 when none
    #[must_use]
    pub const fn worst_ms(&self) -> f64 {
        self.worst_ms
    }
}

/// Log the time from navigation start to the load event
pub fn log_page_load(load_ms: f64) {
    if load_ms.is_finite() && load_ms >= 0.0 {
        info!(load_ms = load_ms.round(), "page load time");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_exclusive() {
        let mut monitor = LongTaskMonitor::new(50.0);
        assert!(!monitor.record(50.0));
        assert!(monitor.record(50.5));
        assert_eq!(monitor.reported(), 1);
    }

    #[test]
    fn test_worst() {
        let mut monitor = LongTaskMonitor::new(50.0);
        monitor.record(80.0);
        monitor.record(120.0);
        monitor.record(60.0);
        assert_eq!(monitor.reported(), 3);
        assert_eq!(monitor.worst_ms(), 120.0);
    }

    #[test]
    fn test_nan_ignored() {
        let mut monitor = LongTaskMonitor::new(50.0);
        assert!(!monitor.record(f64::NAN));
        assert_eq!(monitor.reported(), 0);
    }
}
