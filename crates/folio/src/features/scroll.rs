//! Scroll-driven effects: back-to-top visibility and hero parallax.

use crate::config::ScrollConfig;
use crate::dom::Document;
use crate::selector::Selector;

/// Selector for the parallax decorations, in speed order
#[must_use]
pub fn parallax_selector() -> Selector {
    Selector::Any(vec![
        Selector::class("gradient-orb"),
        Selector::class("phone-mockup"),
        Selector::class("floating-icons"),
    ])
}

/// Elements that react to the scroll position
#[derive(Debug, Clone)]
pub struct ScrollEffects<N> {
    back_to_top: Option<N>,
    parallax: Vec<N>,
    config: ScrollConfig,
}

impl<N: Clone> ScrollEffects<N> {
    /// Find `#backToTop` and the parallax decorations
    pub fn discover<D: Document<Node = N>>(doc: &D, config: &ScrollConfig) -> Self {
        Self {
            back_to_top: doc.query_first(&Selector::id("backToTop")),
            parallax: doc.query_all(&parallax_selector()),
            config: config.clone(),
        }
    }

    /// Whether any element reacts to scrolling
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.back_to_top.is_none() && self.parallax.is_empty()
    }

    /// The back-to-top button, if the page has one
    #[must_use]
    pub fn back_to_top(&self) -> Option<&N> {
        self.back_to_top.as_ref()
    }

    /// Parallax decorations, in document order
    #[must_use]
    pub fn parallax(&self) -> &[N] {
        &self.parallax
    }

    /// Vertical offset of the `index`th decoration at `scroll_y`
    #[must_use]
    pub fn parallax_offset(&self, index: usize, scroll_y: f64) -> f64 {
        let step = self.config.parallax_speed_step;
        let speed = self.config.parallax_base_speed + index as f64 * step;
        -(scroll_y * speed)
    }

    /// Apply the effects for a scroll offset
    pub fn on_scroll<D: Document<Node = N>>(&self, doc: &mut D, scroll_y: f64) {
        if let Some(button) = &self.back_to_top {
            doc.toggle_class(
                button,
                &self.config.visible_class,
                scroll_y > self.config.back_to_top_offset,
            );
        }
        for (index, node) in self.parallax.iter().enumerate() {
            let offset = self.parallax_offset(index, scroll_y);
            doc.set_style(node, "transform", &format!("translateY({offset}px)"));
        }
    }
}
