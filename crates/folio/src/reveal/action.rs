//! One-shot reveal actions.

use crate::dom::Document;
use crate::result::{FolioError, FolioResult};
use serde::{Deserialize, Serialize};

/// What happens to a target when it first becomes visible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RevealAction {
    /// Count the displayed integer up from 0 to `goal` over `duration_ms`
    Counter {
        /// Final displayed value
        goal: u64,
        /// Animation length in milliseconds
        duration_ms: f64,
    },
    /// Set the fill width to `percent` in one step
    Progress {
        /// Fill proportion, 0-100
        percent: f64,
    },
    /// Add a marker class
    Reveal {
        /// Class to add
        class: String,
    },
    /// Swap a deferred image source in
    LazyImage {
        /// Image URL
        src: String,
    },
}

impl RevealAction {
    /// Counter action
    #[must_use]
    pub const fn counter(goal: u64, duration_ms: f64) -> Self {
        Self::Counter { goal, duration_ms }
    }

    /// Progress-bar action; `percent` must be within 0-100
    pub fn progress(percent: f64) -> FolioResult<Self> {
        if (0.0..=100.0).contains(&percent) {
            Ok(Self::Progress { percent })
        } else {
            Err(FolioError::invalid_attribute(
                "data-progress",
                percent.to_string(),
            ))
        }
    }

    /// Marker-class action
    #[must_use]
    pub fn reveal(class: &str) -> Self {
        Self::Reveal {
            class: class.to_string(),
        }
    }

    /// Lazy image action
    #[must_use]
    pub fn lazy_image(src: &str) -> Self {
        Self::LazyImage {
            src: src.to_string(),
        }
    }

    /// Short name for logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Counter { .. } => "counter",
            Self::Progress { .. } => "progress",
            Self::Reveal { .. } => "reveal",
            Self::LazyImage { .. } => "lazy_image",
        }
    }

    /// Apply the action to `target`.
    ///
    /// Counters only write their starting value here; the returned run carries
    /// the rest of the animation and must be driven with frame timestamps.
    pub(crate) fn apply<D: Document>(
        &self,
        doc: &mut D,
        target: &D::Node,
        now_ms: f64,
    ) -> Option<CounterRun<D::Node>> {
        match self {
            Self::Counter { goal, duration_ms } => {
                let run = CounterRun::new(target.clone(), *goal, *duration_ms, now_ms);
                doc.set_text(target, "0");
                Some(run)
            }
            Self::Progress { percent } => {
                doc.set_style(target, "width", &format!("{percent}%"));
                None
            }
            Self::Reveal { class } => {
                doc.add_class(target, class);
                None
            }
            Self::LazyImage { src } => {
                doc.set_attribute(target, "src", src);
                doc.remove_attribute(target, "data-src");
                None
            }
        }
    }
}

/// An in-flight counter animation.
///
/// The displayed value is derived from elapsed time rather than accumulated
/// per frame, so dropped or uneven frames never change where it ends.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterRun<N> {
    target: N,
    goal: u64,
    duration_ms: f64,
    started_ms: f64,
    shown: u64,
}

impl<N> CounterRun<N> {
    /// Start a run at `started_ms`
    #[must_use]
    pub fn new(target: N, goal: u64, duration_ms: f64, started_ms: f64) -> Self {
        Self {
            target,
            goal,
            duration_ms,
            started_ms,
            shown: 0,
        }
    }

    /// Animated element
    #[must_use]
    pub fn target(&self) -> &N {
        &self.target
    }

    /// Final value
    #[must_use]
    pub fn goal(&self) -> u64 {
        self.goal
    }

    /// Last displayed value
    #[must_use]
    pub fn shown(&self) -> u64 {
        self.shown
    }

    /// Linear value at `now_ms`, floored; exactly `goal` once the duration has elapsed
    #[must_use]
    pub fn value_at(&self, now_ms: f64) -> u64 {
        if self.is_finished_at(now_ms) {
            return self.goal;
        }
        let elapsed = (now_ms - self.started_ms).max(0.0);
        let value = (self.goal as f64 * elapsed / self.duration_ms).floor() as u64;
        value.min(self.goal)
    }

    /// Whether the run has reached its end at `now_ms`
    #[must_use]
    pub fn is_finished_at(&self, now_ms: f64) -> bool {
        self.duration_ms.is_nan()
            || self.duration_ms <= 0.0
            || now_ms - self.started_ms >= self.duration_ms
    }

    /// Advance to `now_ms`, returning the value to display. Never goes backwards.
    pub fn advance(&mut self, now_ms: f64) -> u64 {
        self.shown = self.value_at(now_ms).max(self.shown);
        self.shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{DomElement, MockDom};

    fn single(element: DomElement) -> (MockDom, crate::dom::NodeId) {
        let dom = MockDom::with_body(vec![element.with_id("t")]);
        let node = dom.get_by_id("t").unwrap();
        (dom, node)
    }

    // ===== RevealAction tests =====

    #[test]
    fn test_progress_range() {
        assert!(RevealAction::progress(0.0).is_ok());
        assert!(RevealAction::progress(100.0).is_ok());
        assert!(RevealAction::progress(100.5).is_err());
        assert!(RevealAction::progress(-1.0).is_err());
        assert!(RevealAction::progress(f64::NAN).is_err());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(RevealAction::counter(1, 1.0).kind(), "counter");
        assert_eq!(RevealAction::reveal("visible").kind(), "reveal");
        assert_eq!(RevealAction::lazy_image("/a.png").kind(), "lazy_image");
    }

    #[test]
    fn test_apply_progress_sets_width() {
        let (mut dom, node) = single(DomElement::new("div"));
        let action = RevealAction::progress(75.0).unwrap();
        assert!(action.apply(&mut dom, &node, 0.0).is_none());
        assert_eq!(dom.style(&node, "width").as_deref(), Some("75%"));
    }

    #[test]
    fn test_apply_fractional_progress() {
        let (mut dom, node) = single(DomElement::new("div"));
        RevealAction::progress(62.5).unwrap().apply(&mut dom, &node, 0.0);
        assert_eq!(dom.style(&node, "width").as_deref(), Some("62.5%"));
    }

    #[test]
    fn test_apply_reveal_adds_class() {
        let (mut dom, node) = single(DomElement::new("section"));
        RevealAction::reveal("visible").apply(&mut dom, &node, 0.0);
        assert!(dom.has_class(&node, "visible"));
    }

    #[test]
    fn test_apply_lazy_image_swaps_source() {
        let (mut dom, node) = single(DomElement::new("img").with_attr("data-src", "/p.png"));
        RevealAction::lazy_image("/p.png").apply(&mut dom, &node, 0.0);
        assert_eq!(dom.attribute(&node, "src").as_deref(), Some("/p.png"));
        assert!(dom.attribute(&node, "data-src").is_none());
    }

    #[test]
    fn test_apply_counter_starts_at_zero() {
        let (mut dom, node) = single(DomElement::new("span").with_text("250"));
        let run = RevealAction::counter(250, 2000.0).apply(&mut dom, &node, 10.0);
        assert_eq!(dom.text(&node), "0");
        assert_eq!(run.unwrap().goal(), 250);
    }

    #[test]
    fn test_serde_tagged() {
        let json = serde_json::to_string(&RevealAction::reveal("visible")).unwrap();
        assert_eq!(json, r#"{"kind":"reveal","class":"visible"}"#);
    }

    // ===== CounterRun tests =====

    #[test]
    fn test_counter_linear_midpoint() {
        let run = CounterRun::new((), 250, 2000.0, 0.0);
        assert_eq!(run.value_at(0.0), 0);
        assert_eq!(run.value_at(1000.0), 125);
        assert_eq!(run.value_at(1999.0), 249);
        assert_eq!(run.value_at(2000.0), 250);
        assert_eq!(run.value_at(5000.0), 250);
    }

    #[test]
    fn test_counter_floor_truncates() {
        let run = CounterRun::new((), 8, 2000.0, 0.0);
        // 8 * 300 / 2000 = 1.2
        assert_eq!(run.value_at(300.0), 1);
    }

    #[test]
    fn test_counter_never_goes_backwards() {
        let mut run = CounterRun::new((), 100, 1000.0, 0.0);
        assert_eq!(run.advance(500.0), 50);
        assert_eq!(run.advance(400.0), 50);
        assert_eq!(run.advance(1000.0), 100);
    }

    #[test]
    fn test_counter_zero_duration_snaps() {
        let run = CounterRun::new((), 42, 0.0, 0.0);
        assert!(run.is_finished_at(0.0));
        assert_eq!(run.value_at(0.0), 42);
    }

    #[test]
    fn test_counter_clock_before_start() {
        let run = CounterRun::new((), 42, 1000.0, 500.0);
        assert_eq!(run.value_at(100.0), 0);
    }
}
