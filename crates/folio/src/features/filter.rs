//! Project filtering by category.

use crate::config::FilterConfig;
use crate::dom::Document;
use crate::scheduler::CancellationToken;
use crate::selector::Selector;
use std::fmt;
use tracing::{debug, warn};

/// Filter value that matches every card
pub const FILTER_ALL: &str = "all";

/// Deferred half of a card transition
#[derive(Debug, Clone, PartialEq)]
pub enum FilterStep<N> {
    /// Fade a shown card in
    Reveal(N),
    /// Take a hidden card out of the layout
    Collapse(N),
}

/// Filter buttons and the cards they control
#[derive(Debug)]
pub struct ProjectFilter<N> {
    buttons: Vec<N>,
    cards: Vec<N>,
    pending: Vec<(N, CancellationToken)>,
    config: FilterConfig,
}

impl<N: Clone + PartialEq + fmt::Debug> ProjectFilter<N> {
    /// Find `.filter-btn` buttons and `.project-card` cards
    pub fn discover<D: Document<Node = N>>(doc: &D, config: &FilterConfig) -> Self {
        Self {
            buttons: doc.query_all(&Selector::class("filter-btn")),
            cards: doc.query_all(&Selector::class("project-card")),
            pending: Vec::new(),
            config: config.clone(),
        }
    }

    /// Filter buttons, in document order
    #[must_use]
    pub fn buttons(&self) -> &[N] {
        &self.buttons
    }

    /// Project cards, in document order
    #[must_use]
    pub fn cards(&self) -> &[N] {
        &self.cards
    }

    /// Whether there is anything to filter
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    /// Select `button`'s filter.
    ///
    /// Cards switch immediately to their start state and `schedule` is asked
    /// to run the second half later. Pending second halves from an earlier
    /// selection are cancelled first. Returns `false` for unknown buttons or
    /// buttons without `data-filter`.
    pub fn select<D, S>(&mut self, doc: &mut D, button: &N, mut schedule: S) -> bool
    where
        D: Document<Node = N>,
        S: FnMut(f64, FilterStep<N>) -> CancellationToken,
    {
        if !self.buttons.contains(button) {
            return false;
        }
        let Some(filter) = doc.attribute(button, "data-filter") else {
            warn!(node = ?button, "filter button has no data-filter");
            return false;
        };

        for other in &self.buttons {
            doc.remove_class(other, &self.config.active_class);
        }
        doc.add_class(button, &self.config.active_class);

        for (_, token) in self.pending.drain(..) {
            token.cancel();
        }

        let hidden_scale = format!("scale({})", self.config.hidden_scale);
        for card in &self.cards {
            let category = doc.attribute(card, "data-category");
            let token = if filter == FILTER_ALL || category.as_deref() == Some(filter.as_str()) {
                doc.set_style(card, "display", "block");
                schedule(self.config.show_delay_ms, FilterStep::Reveal(card.clone()))
            } else {
                doc.set_style(card, "opacity", "0");
                doc.set_style(card, "transform", &hidden_scale);
                schedule(self.config.hide_delay_ms, FilterStep::Collapse(card.clone()))
            };
            self.pending.push((card.clone(), token));
        }
        debug!(filter = %filter, cards = self.cards.len(), "project filter selected");
        true
    }

    /// Run the deferred half of a card transition
    pub fn apply<D: Document<Node = N>>(&mut self, doc: &mut D, step: &FilterStep<N>) {
        let card = match step {
            FilterStep::Reveal(card) => {
                doc.set_style(card, "opacity", "1");
                doc.set_style(card, "transform", "scale(1)");
                card
            }
            FilterStep::Collapse(card) => {
                doc.set_style(card, "display", "none");
                card
            }
        };
        self.pending.retain(|(pending, _)| pending != card);
    }

    /// Cancel every pending deferred step
    pub fn cancel_pending(&mut self) {
        for (_, token) in self.pending.drain(..) {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MockDom, NodeId};
    use crate::scheduler::Scheduler;

    fn setup() -> (MockDom, ProjectFilter<NodeId>, Scheduler<FilterStep<NodeId>>) {
        let dom = MockDom::portfolio();
        let filter = ProjectFilter::discover(&dom, &FilterConfig::default());
        (dom, filter, Scheduler::new(0.0))
    }

    fn run_until(
        dom: &mut MockDom,
        filter: &mut ProjectFilter<NodeId>,
        scheduler: &mut Scheduler<FilterStep<NodeId>>,
        now_ms: f64,
    ) {
        while let Some(step) = scheduler.pop_due(now_ms) {
            filter.apply(dom, &step);
        }
        scheduler.advance_to(now_ms);
    }

    #[test]
    fn test_discover() {
        let (_, filter, _) = setup();
        assert_eq!(filter.buttons().len(), 3);
        assert_eq!(filter.cards().len(), 3);
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_select_moves_active_class() {
        let (mut dom, mut filter, mut scheduler) = setup();
        let all = dom.get_by_id("filter-all").unwrap();
        let web = dom.get_by_id("filter-web").unwrap();
        assert!(filter.select(&mut dom, &web, |d, s| scheduler.schedule(d, s)));
        assert!(dom.has_class(&web, "active"));
        assert!(!dom.has_class(&all, "active"));
    }

    #[test]
    fn test_select_hides_and_shows() {
        let (mut dom, mut filter, mut scheduler) = setup();
        let web = dom.get_by_id("filter-web").unwrap();
        let mobile_card = dom.get_by_id("card-1").unwrap();
        let web_card = dom.get_by_id("card-2").unwrap();

        filter.select(&mut dom, &web, |d, s| scheduler.schedule(d, s));
        assert_eq!(dom.style(&web_card, "display").as_deref(), Some("block"));
        assert_eq!(dom.style(&mobile_card, "opacity").as_deref(), Some("0"));
        assert_eq!(dom.style(&mobile_card, "transform").as_deref(), Some("scale(0.8)"));
        assert_eq!(dom.style(&mobile_card, "display"), None);

        run_until(&mut dom, &mut filter, &mut scheduler, 10.0);
        assert_eq!(dom.style(&web_card, "opacity").as_deref(), Some("1"));
        assert_eq!(dom.style(&web_card, "transform").as_deref(), Some("scale(1)"));
        assert_eq!(dom.style(&mobile_card, "display"), None);

        run_until(&mut dom, &mut filter, &mut scheduler, 300.0);
        assert_eq!(dom.style(&mobile_card, "display").as_deref(), Some("none"));
    }

    #[test]
    fn test_reselect_cancels_stale_collapse() {
        let (mut dom, mut filter, mut scheduler) = setup();
        let web = dom.get_by_id("filter-web").unwrap();
        let all = dom.get_by_id("filter-all").unwrap();
        let mobile_card = dom.get_by_id("card-1").unwrap();

        filter.select(&mut dom, &web, |d, s| scheduler.schedule(d, s));
        run_until(&mut dom, &mut filter, &mut scheduler, 100.0);
        filter.select(&mut dom, &all, |d, s| scheduler.schedule(d, s));
        run_until(&mut dom, &mut filter, &mut scheduler, 1000.0);

        assert_eq!(dom.style(&mobile_card, "display").as_deref(), Some("block"));
        assert_eq!(dom.style(&mobile_card, "opacity").as_deref(), Some("1"));
    }

    #[test]
    fn test_unknown_button_ignored() {
        let (mut dom, mut filter, mut scheduler) = setup();
        let card = dom.get_by_id("card-1").unwrap();
        assert!(!filter.select(&mut dom, &card, |d, s| scheduler.schedule(d, s)));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_cancel_pending() {
        let (mut dom, mut filter, mut scheduler) = setup();
        let web = dom.get_by_id("filter-web").unwrap();
        filter.select(&mut dom, &web, |d, s| scheduler.schedule(d, s));
        filter.cancel_pending();
        assert_eq!(scheduler.pending(), 0);
    }
}
