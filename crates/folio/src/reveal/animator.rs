//! The watch set and its firing rules.

use super::action::{CounterRun, RevealAction};
use super::{IntersectionEntry, WatchOptions};
use crate::dom::Document;
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct Registration<N> {
    target: N,
    options: WatchOptions,
    action: RevealAction,
}

/// Watches registered targets and fires each one's action exactly once.
///
/// Registration order is firing order within a tick, so a static scan in
/// document order gives reproducible ticks.
#[derive(Debug, Clone)]
pub struct RevealAnimator<N> {
    watch: Vec<Registration<N>>,
    fired: Vec<N>,
    counters: Vec<CounterRun<N>>,
}

impl<N> Default for RevealAnimator<N> {
    fn default() -> Self {
        Self {
            watch: Vec::new(),
            fired: Vec::new(),
            counters: Vec::new(),
        }
    }
}

impl<N: Clone + PartialEq + fmt::Debug> RevealAnimator<N> {
    /// Create an empty animator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `target` to the watch set.
    ///
    /// Returns `false` (and changes nothing) when the target is already
    /// watched, has already fired, is not renderable, or the options are
    /// invalid (threshold outside [0, 1], unparsable root margin).
    pub fn register<D>(
        &mut self,
        doc: &D,
        target: N,
        options: impl Into<WatchOptions>,
        action: RevealAction,
    ) -> bool
    where
        D: Document<Node = N>,
    {
        let options = options.into();
        if let Err(err) = options.validate() {
            warn!(node = ?target, error = %err, "rejecting reveal target");
            return false;
        }
        if self.is_watching(&target) || self.fired.contains(&target) {
            debug!(node = ?target, "reveal target already registered");
            return false;
        }
        if !doc.is_renderable(&target) {
            debug!(node = ?target, "reveal target is not renderable");
            return false;
        }
        debug!(
            node = ?target,
            kind = action.kind(),
            threshold = options.threshold,
            "watching reveal target"
        );
        self.watch.push(Registration {
            target,
            options,
            action,
        });
        true
    }

    /// Whether `target` is still waiting to fire
    #[must_use]
    pub fn is_watching(&self, target: &N) -> bool {
        self.watch.iter().any(|r| &r.target == target)
    }

    /// Whether `target` has fired
    #[must_use]
    pub fn has_fired(&self, target: &N) -> bool {
        self.fired.contains(target)
    }

    /// Number of targets still waiting
    #[must_use]
    pub fn len(&self) -> usize {
        self.watch.len()
    }

    /// Whether nothing is waiting
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.watch.is_empty()
    }

    /// Number of targets that have fired
    #[must_use]
    pub fn fired_count(&self) -> usize {
        self.fired.len()
    }

    /// Counter animations still running
    #[must_use]
    pub fn active_counters(&self) -> usize {
        self.counters.len()
    }

    /// Pending targets with their options, in registration order
    pub fn watched(&self) -> impl Iterator<Item = (&N, &WatchOptions)> + '_ {
        self.watch.iter().map(|r| (&r.target, &r.options))
    }

    /// Process one observation tick.
    ///
    /// Every pending target with a qualifying entry fires, in registration
    /// order. Returns the targets fired on this tick so the host can stop
    /// observing them.
    pub fn observe<D>(
        &mut self,
        doc: &mut D,
        entries: &[IntersectionEntry<N>],
        now_ms: f64,
    ) -> Vec<N>
    where
        D: Document<Node = N>,
    {
        let due: Vec<N> = self
            .watch
            .iter()
            .filter(|r| {
                entries
                    .iter()
                    .any(|e| e.target == r.target && e.qualifies(r.options.threshold))
            })
            .map(|r| r.target.clone())
            .collect();

        due.into_iter()
            .filter(|target| self.fire_target(doc, target, now_ms))
            .collect()
    }

    /// Fire one target now if it is still pending.
    ///
    /// Returns `false` without touching the document for targets that are
    /// not watched (including ones that already fired).
    pub fn fire_target<D>(&mut self, doc: &mut D, target: &N, now_ms: f64) -> bool
    where
        D: Document<Node = N>,
    {
        let Some(index) = self.watch.iter().position(|r| &r.target == target) else {
            return false;
        };
        let registration = self.watch.remove(index);
        self.fired.push(registration.target.clone());
        debug!(
            node = ?registration.target,
            kind = registration.action.kind(),
            "reveal fired"
        );
        if let Some(run) = registration.action.apply(doc, &registration.target, now_ms) {
            self.counters.push(run);
        }
        true
    }

    /// Fire every pending target, in registration order.
    ///
    /// This is the fallback for hosts without an intersection primitive:
    /// content must never stay hidden.
    pub fn fire_all<D>(&mut self, doc: &mut D, now_ms: f64) -> Vec<N>
    where
        D: Document<Node = N>,
    {
        let pending: Vec<N> = self.watch.iter().map(|r| r.target.clone()).collect();
        pending
            .into_iter()
            .filter(|target| self.fire_target(doc, target, now_ms))
            .collect()
    }

    /// Advance running counters to `now_ms`. Returns how many are still running.
    pub fn on_frame<D>(&mut self, doc: &mut D, now_ms: f64) -> usize
    where
        D: Document<Node = N>,
    {
        self.counters.retain_mut(|run| {
            let value = run.advance(now_ms);
            doc.set_text(run.target(), &value.to_string());
            !run.is_finished_at(now_ms)
        });
        self.counters.len()
    }

    /// Reset to an empty animator: pending targets, running counters and
    /// the fired record are all dropped
    pub fn clear(&mut self) {
        self.watch.clear();
        self.counters.clear();
        self.fired.clear();
    }
}
