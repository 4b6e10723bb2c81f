use crate::config::StaggerGroup;
use crate::dom::Document;
use crate::selector::Selector;
use tracing::warn;

/// Give the items of each group increasing `transition-delay`s.
///
/// Returns the number of elements updated.
pub fn apply_stagger<D: Document>(doc: &mut D, groups: &[StaggerGroup]) -> usize {
    let mut updated = 0;
    for group in groups {
        let Some(selector) = Selector::parse_chain(&group.selector) else {
            warn!(selector = %group.selector, "skipping stagger group");
            continue;
        };
        for (index, node) in doc.query_all(&selector).iter().enumerate() {
            let delay = index as f64 * group.delay_ms;
            doc.set_style(node, "transition-delay", &format!("{delay}ms"));
            updated += 1;
        }
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::dom::MockDom;

    #[test]
    fn test_default_groups_on_portfolio() {
        let mut dom = MockDom::portfolio();
        let updated = apply_stagger(&mut dom, &SiteConfig::default().stagger);
        // 2 skill categories, 3 project cards, 2 testimonials
        assert_eq!(updated, 7);

        let card = dom.get_by_id("card-3").unwrap();
        assert_eq!(dom.style(&card, "transition-delay").as_deref(), Some("200ms"));
        let first = dom.get_by_id("card-1").unwrap();
        assert_eq!(dom.style(&first, "transition-delay").as_deref(), Some("0ms"));
    }

    #[test]
    fn test_testimonial_step() {
        let mut dom = MockDom::portfolio();
        apply_stagger(&mut dom, &SiteConfig::default().stagger);
        let cards = dom.query_all(&Selector::class("testimonial-card"));
        assert_eq!(dom.style(&cards[1], "transition-delay").as_deref(), Some("150ms"));
    }

    #[test]
    fn test_bad_selector_skipped() {
        let mut dom = MockDom::portfolio();
        let groups = vec![StaggerGroup::new("", 10.0)];
        assert_eq!(apply_stagger(&mut dom, &groups), 0);
    }
}
