//! Deterministic task scheduling over simulated time.
//!
//! Deferred work (typing steps, filter fades, loader removal) is queued here
//! as plain data instead of ambient timers. The host moves time forward and
//! drains due tasks, so tests advance the clock exactly like a fake clock.

use std::cell::Cell;
use std::rc::Rc;

/// Shared flag that stops a scheduled task from dispatching
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Rc<Cell<bool>>);

impl CancellationToken {
    /// Create a live token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the task; idempotent
    pub fn cancel(&self) {
        self.0.set(true);
    }

    /// Whether the task was cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug)]
struct Scheduled<T> {
    due_ms: f64,
    seq: u64,
    token: CancellationToken,
    task: T,
}

/// Queue of tasks keyed by due time
#[derive(Debug)]
pub struct Scheduler<T> {
    now_ms: f64,
    next_seq: u64,
    queue: Vec<Scheduled<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl<T> Scheduler<T> {
    /// Create a scheduler whose clock reads `now_ms`
    #[must_use]
    pub fn new(now_ms: f64) -> Self {
        Self {
            now_ms,
            next_seq: 0,
            queue: Vec::new(),
        }
    }

    /// Current simulated time
    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Queue `task` to run `delay_ms` from now. Negative delays run immediately.
    pub fn schedule(&mut self, delay_ms: f64, task: T) -> CancellationToken {
        let token = CancellationToken::new();
        let delay = if delay_ms.is_finite() { delay_ms.max(0.0) } else { 0.0 };
        self.queue.push(Scheduled {
            due_ms: self.now_ms + delay,
            seq: self.next_seq,
            token: token.clone(),
            task,
        });
        self.next_seq += 1;
        token
    }

    /// Take the earliest task due at or before `now_ms`.
    ///
    /// The clock moves to the task's due time, so tasks it schedules are
    /// timed from when it was meant to run. Ties dispatch in scheduling order.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<T> {
        self.queue.retain(|s| !s.token.is_cancelled());
        let index = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due_ms <= now_ms)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)))
            .map(|(i, _)| i)?;
        let scheduled = self.queue.remove(index);
        self.now_ms = self.now_ms.max(scheduled.due_ms);
        Some(scheduled.task)
    }

    /// Move the clock to `now_ms` without dispatching. Time never goes back.
    pub fn advance_to(&mut self, now_ms: f64) {
        if now_ms > self.now_ms {
            self.now_ms = now_ms;
        }
    }

    /// Pending (non-cancelled) tasks
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue
            .iter()
            .filter(|s| !s.token.is_cancelled())
            .count()
    }

    /// Earliest due time among pending tasks
    #[must_use]
    pub fn next_due(&self) -> Option<f64> {
        self.queue
            .iter()
            .filter(|s| !s.token.is_cancelled())
            .map(|s| s.due_ms)
            .min_by(f64::total_cmp)
    }

    /// Cancel every pending task
    pub fn cancel_all(&mut self) {
        for scheduled in self.queue.drain(..) {
            scheduled.token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(scheduler: &mut Scheduler<&'static str>, now_ms: f64) -> Vec<&'static str> {
        let mut out = Vec::new();
        while let Some(task) = scheduler.pop_due(now_ms) {
            out.push(task);
        }
        scheduler.advance_to(now_ms);
        out
    }

    #[test]
    fn test_token_cancel() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_due_order() {
        let mut scheduler = Scheduler::new(0.0);
        scheduler.schedule(300.0, "late");
        scheduler.schedule(10.0, "early");
        scheduler.schedule(10.0, "early-second");
        assert_eq!(drain(&mut scheduler, 1000.0), vec!["early", "early-second", "late"]);
    }

    #[test]
    fn test_not_due_yet() {
        let mut scheduler = Scheduler::new(0.0);
        scheduler.schedule(100.0, "later");
        assert!(drain(&mut scheduler, 99.0).is_empty());
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(drain(&mut scheduler, 100.0), vec!["later"]);
    }

    #[test]
    fn test_cancelled_never_dispatch() {
        let mut scheduler = Scheduler::new(0.0);
        let token = scheduler.schedule(10.0, "cancelled");
        scheduler.schedule(20.0, "kept");
        token.cancel();
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(drain(&mut scheduler, 100.0), vec!["kept"]);
    }

    #[test]
    fn test_clock_follows_dispatch() {
        let mut scheduler = Scheduler::new(0.0);
        scheduler.schedule(50.0, "a");
        assert_eq!(scheduler.pop_due(500.0), Some("a"));
        assert_eq!(scheduler.now_ms(), 50.0);
        // Follow-up scheduled from the task's own due time
        scheduler.schedule(50.0, "b");
        assert_eq!(scheduler.next_due(), Some(100.0));
    }

    #[test]
    fn test_advance_never_rewinds() {
        let mut scheduler: Scheduler<()> = Scheduler::new(100.0);
        scheduler.advance_to(50.0);
        assert_eq!(scheduler.now_ms(), 100.0);
    }

    #[test]
    fn test_negative_delay_runs_now() {
        let mut scheduler = Scheduler::new(10.0);
        scheduler.schedule(-5.0, "now");
        assert_eq!(scheduler.next_due(), Some(10.0));
    }

    #[test]
    fn test_cancel_all() {
        let mut scheduler = Scheduler::new(0.0);
        let token = scheduler.schedule(1.0, "x");
        scheduler.schedule(2.0, "y");
        scheduler.cancel_all();
        assert!(token.is_cancelled());
        assert_eq!(scheduler.pending(), 0);
        assert!(drain(&mut scheduler, 10.0).is_empty());
    }
}
