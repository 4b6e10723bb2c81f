//! Visibility-triggered one-shot animations.
//!
//! Targets are registered with a visibility threshold and an action. When an
//! observation tick reports a target at or above its threshold, the action
//! fires once and the target leaves the watch set for good.
//!
//! ```text
//! scan(doc) ──► register(target, threshold, action)
//!                        │
//! IntersectionEntry ────►│ observe(tick)
//!                        ▼
//!                 action(target) ──► unwatch
//!                        │
//! frame(now) ───────────►│ counter runs
//! ```

mod action;
mod animator;
mod scan;

pub use action::{CounterRun, RevealAction};
pub use animator::RevealAnimator;
pub use scan::{scan, MarkerRule, Scan, ScannedTarget};

use crate::geometry::RootMargin;
use crate::result::{FolioError, FolioResult};
use serde::{Deserialize, Serialize};

/// Slack allowed when comparing a reported ratio against a threshold
pub const RATIO_TOLERANCE: f64 = 1e-6;

/// Observation options for one registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchOptions {
    /// Minimum visible-area ratio, in [0, 1]
    pub threshold: f64,
    /// CSS root margin applied by the host observer
    pub root_margin: Option<String>,
}

impl WatchOptions {
    /// Options with a threshold and no root margin
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self {
            threshold,
            root_margin: None,
        }
    }

    /// Set the root margin
    #[must_use]
    pub fn with_root_margin(mut self, margin: &str) -> Self {
        self.root_margin = Some(margin.to_string());
        self
    }

    /// Whether the threshold is a usable ratio
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.threshold)
    }

    /// Check the threshold and root margin
    pub fn validate(&self) -> FolioResult<()> {
        if !self.is_valid() {
            return Err(FolioError::InvalidThreshold {
                threshold: self.threshold,
            });
        }
        if let Some(margin) = &self.root_margin {
            RootMargin::parse(margin)?;
        }
        Ok(())
    }
}

impl From<f64> for WatchOptions {
    fn from(threshold: f64) -> Self {
        Self::new(threshold)
    }
}

/// One visibility observation for one target
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry<N> {
    /// Observed element
    pub target: N,
    /// Visible-area ratio in [0, 1]
    pub ratio: f64,
    /// Whether the element touches the viewport at all
    pub is_intersecting: bool,
}

impl<N> IntersectionEntry<N> {
    /// Entry for a target at `ratio`; any positive ratio intersects
    #[must_use]
    pub fn new(target: N, ratio: f64) -> Self {
        Self {
            target,
            ratio,
            is_intersecting: ratio > 0.0,
        }
    }

    /// Entry for a target outside the viewport
    #[must_use]
    pub fn leaving(target: N) -> Self {
        Self {
            target,
            ratio: 0.0,
            is_intersecting: false,
        }
    }

    /// Whether this entry crosses `threshold` in the entering direction.
    ///
    /// Ratios within [`RATIO_TOLERANCE`] below the threshold count, since
    /// hosts round the ratio they report on the crossing itself.
    #[must_use]
    pub fn qualifies(&self, threshold: f64) -> bool {
        self.is_intersecting && self.ratio + RATIO_TOLERANCE >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_options_from_threshold() {
        let options = WatchOptions::from(0.5);
        assert_eq!(options.threshold, 0.5);
        assert!(options.root_margin.is_none());
        assert!(options.is_valid());
    }

    #[test]
    fn test_watch_options_invalid() {
        assert!(!WatchOptions::new(1.5).is_valid());
        assert!(!WatchOptions::new(-0.1).is_valid());
        assert!(!WatchOptions::new(f64::NAN).is_valid());
    }

    #[test]
    fn test_watch_options_validate() {
        assert!(WatchOptions::new(0.1)
            .with_root_margin("0px 0px -50px 0px")
            .validate()
            .is_ok());
        assert!(matches!(
            WatchOptions::new(2.0).validate(),
            Err(FolioError::InvalidThreshold { .. })
        ));
        assert!(WatchOptions::new(0.1)
            .with_root_margin("lots")
            .validate()
            .is_err());
    }

    #[test]
    fn test_entry_qualifies() {
        assert!(IntersectionEntry::new(1, 0.5).qualifies(0.5));
        assert!(!IntersectionEntry::new(1, 0.4).qualifies(0.5));
        assert!(!IntersectionEntry::leaving(1).qualifies(0.0));
    }

    #[test]
    fn test_entry_qualifies_just_below_threshold() {
        assert!(IntersectionEntry::new(1, 0.499_999_5).qualifies(0.5));
        assert!(IntersectionEntry::new(1, 0.999_999_9).qualifies(1.0));
        assert!(!IntersectionEntry::new(1, 0.49).qualifies(0.5));
    }

    #[test]
    fn test_zero_threshold_needs_intersection() {
        let touching = IntersectionEntry {
            target: 1,
            ratio: 0.0,
            is_intersecting: true,
        };
        assert!(touching.qualifies(0.0));
    }
}
