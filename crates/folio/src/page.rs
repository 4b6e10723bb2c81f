//! Page runtime: mounts every feature on a document and routes host events.
//!
//! The host (a browser binding or a test) owns the event sources. It hands
//! the document to [`Page::init`], forwards intersection entries, scroll
//! offsets, key presses and frame times, and finally calls
//! [`Page::dispose`] to get the document back.

use crate::config::SiteConfig;
use crate::dom::Document;
use crate::features::a11y;
use crate::features::filter::{FilterStep, ProjectFilter};
use crate::features::perf::{self, LongTaskMonitor};
use crate::features::scroll::ScrollEffects;
use crate::features::stagger::apply_stagger;
use crate::features::theme::{apply_theme, Theme};
use crate::features::typing::TypingEffect;
use crate::reveal::{scan, IntersectionEntry, RevealAction, RevealAnimator, WatchOptions};
use crate::scheduler::Scheduler;
use crate::selector::Selector;
use tracing::{debug, info, warn};

/// Where the skip link points
pub const MAIN_CONTENT_HREF: &str = "#home";

/// Upper bound on scheduler dispatches in one [`Page::tick`]
pub const MAX_TASKS_PER_TICK: usize = 256;

/// What the host can offer at mount time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostEnv {
    /// The host has an intersection observation primitive
    pub intersection_observer: bool,
    /// Theme saved by an earlier visit
    pub saved_theme: Option<String>,
    /// Host clock at mount
    pub now_ms: f64,
}

impl HostEnv {
    /// Host with an intersection primitive and nothing saved
    #[must_use]
    pub fn new() -> Self {
        Self {
            intersection_observer: true,
            ..Self::default()
        }
    }

    /// Host without an intersection primitive
    #[must_use]
    pub fn without_observer() -> Self {
        Self::default()
    }

    /// Set the saved theme
    #[must_use]
    pub fn with_saved_theme(mut self, theme: &str) -> Self {
        self.saved_theme = Some(theme.to_string());
        self
    }

    /// Set the mount time
    #[must_use]
    pub const fn at(mut self, now_ms: f64) -> Self {
        self.now_ms = now_ms;
        self
    }
}

/// Initialization steps, recorded in the order they completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep {
    /// Reveal targets scanned and registered
    Reveal,
    /// Every reveal target fired because the host cannot observe
    RevealFallback,
    /// Theme attribute set
    Theme,
    /// Typing animation started
    Typing,
    /// Project filter discovered
    Filter,
    /// Scroll effects discovered
    Scroll,
    /// Skip link, focusable cards and labels in place
    Accessibility,
    /// Transition delays applied
    Stagger,
}

/// Deferred work queued on the page scheduler
#[derive(Debug, Clone, PartialEq)]
pub enum PageTask<N> {
    /// Next typing step
    Type,
    /// Second half of a card transition
    Filter(FilterStep<N>),
    /// Remove the faded loader
    RemoveLoader(N),
}

#[derive(Debug)]
struct Typing<N> {
    node: N,
    effect: TypingEffect,
}

/// A mounted page
#[derive(Debug)]
pub struct Page<D: Document> {
    doc: D,
    config: SiteConfig,
    animator: RevealAnimator<D::Node>,
    scheduler: Scheduler<PageTask<D::Node>>,
    typing: Option<Typing<D::Node>>,
    filter: ProjectFilter<D::Node>,
    scroll: ScrollEffects<D::Node>,
    skip_link: Option<D::Node>,
    cards: Vec<D::Node>,
    long_tasks: LongTaskMonitor,
    theme: Theme,
    steps: Vec<InitStep>,
    loaded: bool,
    load_ms: Option<f64>,
}

impl<D: Document> Page<D> {
    /// Mount every feature on `doc`.
    ///
    /// Reveal targets are registered first. When the host has no
    /// intersection primitive they all fire before any other step runs.
    pub fn init(mut doc: D, config: SiteConfig, env: &HostEnv) -> Self {
        let mut steps = Vec::new();
        let now_ms = env.now_ms;

        let mut animator = RevealAnimator::new();
        let found = scan(&doc, &config.reveal);
        let registered = found
            .targets
            .into_iter()
            .filter(|t| {
                animator.register(&doc, t.target.clone(), t.options.clone(), t.action.clone())
            })
            .count();
        debug!(registered, rejected = found.rejected.len(), "reveal targets registered");
        steps.push(InitStep::Reveal);

        if !env.intersection_observer {
            let fired = animator.fire_all(&mut doc, now_ms);
            info!(fired = fired.len(), "no intersection observer, revealing everything");
            steps.push(InitStep::RevealFallback);
        }

        let theme = apply_theme(
            &mut doc,
            env.saved_theme.as_deref(),
            config.theme.default_theme,
        );
        steps.push(InitStep::Theme);

        let mut scheduler = Scheduler::new(now_ms);
        let typing = start_typing(&mut doc, &config, &mut scheduler);
        if typing.is_some() {
            steps.push(InitStep::Typing);
        }

        let filter = ProjectFilter::discover(&doc, &config.filter);
        if !filter.is_empty() {
            steps.push(InitStep::Filter);
        }

        let scroll = ScrollEffects::discover(&doc, &config.scroll);
        if !scroll.is_empty() {
            steps.push(InitStep::Scroll);
        }

        let skip_link = a11y::insert_skip_link(&mut doc, MAIN_CONTENT_HREF);
        let cards = a11y::make_cards_focusable(&mut doc);
        a11y::label_social_links(&mut doc);
        steps.push(InitStep::Accessibility);

        apply_stagger(&mut doc, &config.stagger);
        steps.push(InitStep::Stagger);

        info!(steps = steps.len(), watching = animator.len(), "page initialized");
        let long_tasks = LongTaskMonitor::new(config.load.long_task_threshold_ms);
        Self {
            doc,
            config,
            animator,
            scheduler,
            typing,
            filter,
            scroll,
            skip_link,
            cards,
            long_tasks,
            theme,
            steps,
            loaded: false,
            load_ms: None,
        }
    }

    // ===== Accessors =====

    /// The mounted document
    pub fn document(&self) -> &D {
        &self.doc
    }

    /// Mutable access to the mounted document
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    /// Active configuration
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// The reveal watch set
    pub fn animator(&self) -> &RevealAnimator<D::Node> {
        &self.animator
    }

    /// Steps completed by [`Page::init`], in order
    pub fn init_steps(&self) -> &[InitStep] {
        &self.steps
    }

    /// Theme applied at mount
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Inserted skip link, if the host could create it
    pub fn skip_link(&self) -> Option<&D::Node> {
        self.skip_link.as_ref()
    }

    /// Filter buttons to listen on
    pub fn filter_buttons(&self) -> &[D::Node] {
        self.filter.buttons()
    }

    /// Back-to-top button to listen on
    pub fn back_to_top(&self) -> Option<&D::Node> {
        self.scroll.back_to_top()
    }

    /// Keyboard-focusable project cards
    pub fn cards(&self) -> &[D::Node] {
        &self.cards
    }

    /// Tasks waiting on the scheduler
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    /// Whether no task is queued and no counter is running
    pub fn is_idle(&self) -> bool {
        self.scheduler.pending() == 0 && self.animator.active_counters() == 0
    }

    /// Page load time logged by performance monitoring
    pub fn page_load_ms(&self) -> Option<f64> {
        self.load_ms
    }

    /// Long tasks reported so far
    pub fn long_tasks(&self) -> &LongTaskMonitor {
        &self.long_tasks
    }

    // ===== Events =====

    /// Watch an extra target after mount
    pub fn register(
        &mut self,
        target: D::Node,
        options: impl Into<WatchOptions>,
        action: RevealAction,
    ) -> bool {
        self.animator.register(&self.doc, target, options, action)
    }

    /// Forward one batch of intersection entries. Returns the targets fired.
    pub fn observe(
        &mut self,
        entries: &[IntersectionEntry<D::Node>],
        now_ms: f64,
    ) -> Vec<D::Node> {
        self.animator.observe(&mut self.doc, entries, now_ms)
    }

    /// Dispatch due tasks and advance counters. Returns the tasks dispatched.
    ///
    /// At most [`MAX_TASKS_PER_TICK`] tasks run per call; the rest stay
    /// due for the next tick.
    pub fn tick(&mut self, now_ms: f64) -> usize {
        let mut dispatched = 0;
        while dispatched < MAX_TASKS_PER_TICK {
            let Some(task) = self.scheduler.pop_due(now_ms) else {
                break;
            };
            self.dispatch(task);
            dispatched += 1;
        }
        if dispatched == MAX_TASKS_PER_TICK {
            warn!(dispatched, "task budget exhausted, deferring the rest to the next tick");
        }
        self.scheduler.advance_to(now_ms);
        self.animator.on_frame(&mut self.doc, now_ms);
        dispatched
    }

    /// Apply scroll effects for a new offset
    pub fn on_scroll(&mut self, scroll_y: f64) {
        self.scroll.on_scroll(&mut self.doc, scroll_y);
    }

    /// Back-to-top button clicked. Returns the offset to scroll to.
    pub fn on_back_to_top(&self) -> Option<f64> {
        self.scroll.back_to_top().map(|_| 0.0)
    }

    /// Select a filter button. Returns `false` for unknown buttons.
    pub fn select_filter(&mut self, button: &D::Node) -> bool {
        let scheduler = &mut self.scheduler;
        self.filter.select(&mut self.doc, button, |delay, step| {
            scheduler.schedule(delay, PageTask::Filter(step))
        })
    }

    /// Whether `key` on `card` should activate it
    pub fn on_card_key(&self, card: &D::Node, key: &str) -> bool {
        a11y::is_activation_key(key) && self.cards.contains(card)
    }

    /// Skip link gained or lost focus
    pub fn on_skip_link_focus(&mut self, focused: bool) {
        if let Some(link) = &self.skip_link {
            a11y::set_skip_link_focus(&mut self.doc, link, focused);
        }
    }

    /// Window finished loading.
    ///
    /// Fades the loader and schedules its removal, marks `body` as loaded
    /// and, with performance monitoring on, logs `load_ms` when the host
    /// measured it. Later calls are ignored.
    pub fn on_load(&mut self, load_ms: Option<f64>) {
        if self.loaded {
            return;
        }
        self.loaded = true;
        if let Some(loader) = self.doc.query_first(&Selector::class("loader")) {
            self.doc.set_style(&loader, "opacity", "0");
            self.scheduler
                .schedule(self.config.load.loader_fade_ms, PageTask::RemoveLoader(loader));
        }
        if let Some(body) = self.doc.body() {
            self.doc.add_class(&body, &self.config.load.loaded_class);
        }
        if !self.config.load.performance_monitoring {
            return;
        }
        if let Some(ms) = load_ms {
            perf::log_page_load(ms);
            self.load_ms = Some(ms);
        }
    }

    /// Report a task duration. Ignored unless performance monitoring is on.
    pub fn record_long_task(&mut self, duration_ms: f64) -> bool {
        self.config.load.performance_monitoring && self.long_tasks.record(duration_ms)
    }

    /// Cancel scheduled work, drop the watch set and hand the document back
    pub fn dispose(mut self) -> D {
        self.scheduler.cancel_all();
        self.filter.cancel_pending();
        self.animator.clear();
        self.typing = None;
        debug!("page disposed");
        self.doc
    }

    fn dispatch(&mut self, task: PageTask<D::Node>) {
        match task {
            PageTask::Type => {
                if let Some(typing) = &mut self.typing {
                    let frame = typing.effect.step();
                    self.doc.set_text(&typing.node, &frame.text);
                    self.scheduler.schedule(frame.next_delay_ms, PageTask::Type);
                }
            }
            PageTask::Filter(step) => self.filter.apply(&mut self.doc, &step),
            PageTask::RemoveLoader(loader) => self.doc.remove(&loader),
        }
    }
}

fn start_typing<D: Document>(
    doc: &mut D,
    config: &SiteConfig,
    scheduler: &mut Scheduler<PageTask<D::Node>>,
) -> Option<Typing<D::Node>> {
    let node = doc.query_first(&Selector::class("typing-text"))?;
    let phrases = match doc.attribute(&node, "data-phrases") {
        Some(raw) => TypingEffect::parse_phrases(&raw),
        None => config.typing.phrases.clone(),
    };
    if phrases.is_empty() {
        debug!("no typing phrases, typing disabled");
        return None;
    }
    let mut effect = match TypingEffect::new(phrases, &config.typing) {
        Ok(effect) => effect,
        Err(err) => {
            warn!(error = %err, "typing disabled");
            return None;
        }
    };
    let frame = effect.step();
    doc.set_text(&node, &frame.text);
    scheduler.schedule(frame.next_delay_ms, PageTask::Type);
    Some(Typing { node, effect })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MockDom, NodeId};
    use crate::geometry::Viewport;

    fn mount(env: &HostEnv) -> Page<MockDom> {
        Page::init(MockDom::portfolio(), SiteConfig::default(), env)
    }

    fn id(page: &Page<MockDom>, id: &str) -> NodeId {
        page.document().get_by_id(id).unwrap()
    }

    // ===== Init tests =====

    #[test]
    fn test_init_steps_in_order() {
        let page = mount(&HostEnv::new());
        assert_eq!(
            page.init_steps(),
            &[
                InitStep::Reveal,
                InitStep::Theme,
                InitStep::Typing,
                InitStep::Filter,
                InitStep::Scroll,
                InitStep::Accessibility,
                InitStep::Stagger,
            ]
        );
        assert_eq!(page.animator().len(), 7);
    }

    #[test]
    fn test_fallback_runs_before_everything_else() {
        let page = mount(&HostEnv::without_observer());
        assert_eq!(
            &page.init_steps()[..3],
            &[InitStep::Reveal, InitStep::RevealFallback, InitStep::Theme]
        );
        assert!(page.animator().is_empty());
        assert_eq!(page.animator().fired_count(), 7);

        let projects = id(&page, "projects");
        assert!(page.document().has_class(&projects, "visible"));
        let bar = id(&page, "bar-rust");
        assert_eq!(page.document().style(&bar, "width").as_deref(), Some("75%"));
    }

    #[test]
    fn test_theme_from_saved_value() {
        let page = mount(&HostEnv::new().with_saved_theme("light"));
        assert_eq!(page.theme(), Theme::Light);
        let page = mount(&HostEnv::new().with_saved_theme("purple"));
        assert_eq!(page.theme(), Theme::Dark);
    }

    #[test]
    fn test_accessibility_applied() {
        let page = mount(&HostEnv::new());
        let link = page.skip_link().unwrap();
        let body = page.document().body().unwrap();
        assert_eq!(page.document().children(body)[0], *link);
        assert_eq!(page.cards().len(), 3);
        let github = id(&page, "social-github");
        assert!(page.document().attribute(&github, "aria-label").is_some());
    }

    #[test]
    fn test_empty_document_skips_optional_steps() {
        let page = Page::init(MockDom::new(), SiteConfig::default(), &HostEnv::new());
        assert_eq!(
            page.init_steps(),
            &[InitStep::Reveal, InitStep::Theme, InitStep::Accessibility, InitStep::Stagger]
        );
    }

    // ===== Event tests =====

    #[test]
    fn test_observe_fires_visible_targets() {
        let mut page = mount(&HostEnv::new());
        let viewport = Viewport::default().scrolled_to(800.0);
        let entries = page
            .document()
            .intersections(&viewport, page.animator().watched());
        let fired = page.observe(&entries, 0.0);
        assert!(fired.contains(&id(&page, "stat-projects")));
        assert!(fired.contains(&id(&page, "about")));
        assert!(!fired.contains(&id(&page, "bar-rust")));
    }

    #[test]
    fn test_typing_runs_on_tick() {
        let mut page = mount(&HostEnv::new());
        let text = page.document().query_first(&Selector::class("typing-text")).unwrap();
        assert_eq!(page.document().text(&text), "R");
        page.tick(150.0);
        assert_eq!(page.document().text(&text), "Ru");
        page.tick(450.0);
        assert_eq!(page.document().text(&text), "Rust");
    }

    #[test]
    fn test_select_filter_through_page() {
        let mut page = mount(&HostEnv::new());
        let web = id(&page, "filter-web");
        let card = id(&page, "card-1");
        assert!(page.select_filter(&web));
        page.tick(300.0);
        assert_eq!(page.document().style(&card, "display").as_deref(), Some("none"));
    }

    #[test]
    fn test_back_to_top_scrolls_home() {
        let page = mount(&HostEnv::new());
        assert_eq!(page.back_to_top(), Some(&id(&page, "backToTop")));
        assert_eq!(page.on_back_to_top(), Some(0.0));

        let bare = Page::init(MockDom::new(), SiteConfig::default(), &HostEnv::new());
        assert_eq!(bare.on_back_to_top(), None);
    }

    #[test]
    fn test_card_key() {
        let page = mount(&HostEnv::new());
        let card = id(&page, "card-2");
        let button = id(&page, "filter-web");
        assert!(page.on_card_key(&card, "Enter"));
        assert!(page.on_card_key(&card, " "));
        assert!(!page.on_card_key(&card, "a"));
        assert!(!page.on_card_key(&button, "Enter"));
    }

    #[test]
    fn test_skip_link_focus() {
        let mut page = mount(&HostEnv::new());
        page.on_skip_link_focus(true);
        let link = *page.skip_link().unwrap();
        assert_eq!(page.document().style(&link, "top").as_deref(), Some("0"));
    }

    #[test]
    fn test_on_load_removes_loader() {
        let mut page = mount(&HostEnv::new());
        let loader = page.document().query_first(&Selector::class("loader")).unwrap();
        page.on_load(Some(420.0));
        assert_eq!(page.document().style(&loader, "opacity").as_deref(), Some("0"));
        let body = page.document().body().unwrap();
        assert!(page.document().has_class(&body, "loaded"));

        page.tick(299.0);
        assert!(page.document().is_renderable(&loader));
        page.tick(300.0);
        assert!(!page.document().is_renderable(&loader));
    }

    #[test]
    fn test_load_time_needs_monitoring() {
        let mut page = mount(&HostEnv::new());
        page.on_load(Some(420.0));
        assert_eq!(page.page_load_ms(), None);

        let config = SiteConfig::default().with_performance_monitoring(true);
        let mut page = Page::init(MockDom::portfolio(), config, &HostEnv::new());
        page.on_load(Some(420.0));
        assert_eq!(page.page_load_ms(), Some(420.0));
        page.on_load(Some(900.0));
        assert_eq!(page.page_load_ms(), Some(420.0));
    }

    #[test]
    fn test_zero_typing_delays_do_not_stall_tick() {
        let mut config = SiteConfig::default();
        config.typing.type_delay_ms = 0.0;
        config.typing.delete_delay_ms = 0.0;
        config.typing.hold_delay_ms = 0.0;
        let mut page = Page::init(MockDom::portfolio(), config, &HostEnv::new());
        assert_eq!(page.tick(1.0), MAX_TASKS_PER_TICK);
        assert_eq!(page.tick(2.0), MAX_TASKS_PER_TICK);
        assert_eq!(page.pending_tasks(), 1);
    }

    #[test]
    fn test_long_tasks_need_monitoring() {
        let mut page = mount(&HostEnv::new());
        assert!(!page.record_long_task(120.0));

        let config = SiteConfig::default().with_performance_monitoring(true);
        let mut page = Page::init(MockDom::portfolio(), config, &HostEnv::new());
        assert!(page.record_long_task(120.0));
        assert!(!page.record_long_task(20.0));
        assert_eq!(page.long_tasks().reported(), 1);
    }

    #[test]
    fn test_idle_once_work_drains() {
        let mut page = Page::init(MockDom::new(), SiteConfig::default(), &HostEnv::new());
        assert!(page.is_idle());

        let mut page = mount(&HostEnv::without_observer());
        assert!(!page.is_idle());
        page.tick(2000.0);
        // typing keeps one step queued
        assert_eq!(page.pending_tasks(), 1);
        assert_eq!(page.animator().active_counters(), 0);
    }

    #[test]
    fn test_dispose_cancels_everything() {
        let mut page = mount(&HostEnv::new());
        page.on_load(None);
        assert!(page.pending_tasks() > 0);
        let dom = page.dispose();
        let loader = dom.query_first(&Selector::class("loader")).unwrap();
        assert!(dom.is_renderable(&loader));
    }
}
