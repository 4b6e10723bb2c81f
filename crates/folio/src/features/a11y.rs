//! Accessibility helpers: skip link, keyboard-focusable cards and labelled
//! social links.

use crate::dom::Document;
use crate::selector::Selector;
use tracing::debug;

/// Class of the inserted skip link
pub const SKIP_LINK_CLASS: &str = "skip-link";

/// Visible text of the skip link
pub const SKIP_LINK_TEXT: &str = "Skip to main content";

const SKIP_LINK_HIDDEN_TOP: &str = "-40px";
const SKIP_LINK_FOCUSED_TOP: &str = "0";

/// Insert a skip link to `href` as the first child of `body`.
///
/// Does nothing if a skip link already exists or the host cannot create
/// elements.
pub fn insert_skip_link<D: Document>(doc: &mut D, href: &str) -> Option<D::Node> {
    let skip_links = Selector::tag("a").and(Selector::class(SKIP_LINK_CLASS));
    if let Some(existing) = doc.query_first(&skip_links) {
        return Some(existing);
    }
    let body = doc.body()?;
    let link = doc.create_element("a")?;
    doc.set_attribute(&link, "href", href);
    doc.add_class(&link, SKIP_LINK_CLASS);
    doc.set_text(&link, SKIP_LINK_TEXT);
    for (property, value) in [
        ("position", "absolute"),
        ("top", SKIP_LINK_HIDDEN_TOP),
        ("left", "0"),
        ("background", "var(--primary-color)"),
        ("color", "white"),
        ("padding", "8px"),
        ("text-decoration", "none"),
        ("z-index", "10001"),
    ] {
        doc.set_style(&link, property, value);
    }
    doc.prepend_child(&body, &link);
    Some(link)
}

/// Move the skip link on or off screen as it gains or loses focus
pub fn set_skip_link_focus<D: Document>(doc: &mut D, link: &D::Node, focused: bool) {
    let top = if focused {
        SKIP_LINK_FOCUSED_TOP
    } else {
        SKIP_LINK_HIDDEN_TOP
    };
    doc.set_style(link, "top", top);
}

/// Put every `.project-card` in the tab order
pub fn make_cards_focusable<D: Document>(doc: &mut D) -> Vec<D::Node> {
    let cards = doc.query_all(&Selector::class("project-card"));
    for card in &cards {
        doc.set_attribute(card, "tabindex", "0");
    }
    cards
}

/// Keys that activate a focused card
#[must_use]
pub fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " ")
}

/// Platform name from an icon's class list (`fab fa-github` → `github`)
#[must_use]
pub fn platform_from_icon(classes: &[String]) -> Option<String> {
    let class = classes.get(1)?;
    let platform = class.split('-').nth(1)?;
    (!platform.is_empty()).then(|| platform.to_string())
}

/// Label each `.social-link` after the platform of its `<i>` icon.
///
/// Returns the number of labelled links. Links without an icon are left alone.
pub fn label_social_links<D: Document>(doc: &mut D) -> usize {
    let icon = Selector::tag("i");
    let mut labelled = 0;
    for link in doc.query_all(&Selector::class("social-link")) {
        let Some(platform) = doc
            .query_within(&link, &icon)
            .first()
            .and_then(|i| platform_from_icon(&doc.classes(i)))
        else {
            continue;
        };
        doc.set_attribute(&link, "aria-label", &format!("Visit {platform} profile"));
        labelled += 1;
    }
    debug!(labelled, "social links labelled");
    labelled
}
