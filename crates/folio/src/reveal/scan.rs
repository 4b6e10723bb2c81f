//! Static discovery of reveal targets.

use super::action::RevealAction;
use super::WatchOptions;
use crate::config::RevealConfig;
use crate::dom::Document;
use crate::result::{FolioError, FolioResult};
use crate::selector::Selector;
use tracing::warn;

/// Marker conventions, in priority order when one element carries several
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerRule {
    /// `[data-count]`
    Counter,
    /// `.skill-progress` with `data-progress`
    Progress,
    /// `[data-reveal]`
    Reveal,
    /// `[data-scroll-animate]`
    ScrollAnimate,
    /// `img[data-src]`
    LazyImage,
}

impl MarkerRule {
    /// All rules in priority order
    pub const ALL: [Self; 5] = [
        Self::Counter,
        Self::Progress,
        Self::Reveal,
        Self::ScrollAnimate,
        Self::LazyImage,
    ];

    /// Selector finding candidate elements
    #[must_use]
    pub fn selector(self) -> Selector {
        match self {
            Self::Counter => Selector::attr("data-count"),
            Self::Progress => Selector::class("skill-progress"),
            Self::Reveal => Selector::attr("data-reveal"),
            Self::ScrollAnimate => Selector::attr("data-scroll-animate"),
            Self::LazyImage => Selector::tag("img").and(Selector::attr("data-src")),
        }
    }

    /// Observation options for this rule
    #[must_use]
    pub fn options(self, config: &RevealConfig) -> WatchOptions {
        match self {
            Self::Counter => WatchOptions::new(config.counter_threshold),
            Self::Progress => WatchOptions::new(config.progress_threshold),
            Self::Reveal => WatchOptions::new(config.reveal_threshold),
            Self::ScrollAnimate => WatchOptions {
                threshold: config.scroll_animate_threshold,
                root_margin: config.scroll_animate_root_margin.clone(),
            },
            Self::LazyImage => WatchOptions::new(config.lazy_image_threshold),
        }
    }

    /// Build the action for `node` from its marker attributes
    pub fn action<D: Document>(
        self,
        doc: &D,
        node: &D::Node,
        config: &RevealConfig,
    ) -> FolioResult<RevealAction> {
        match self {
            Self::Counter => {
                let raw = required(doc, node, "data-count")?;
                let goal = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| FolioError::invalid_attribute("data-count", &raw))?;
                Ok(RevealAction::counter(goal, config.counter_duration_ms))
            }
            Self::Progress => {
                let raw = required(doc, node, "data-progress")?;
                let percent = raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| FolioError::invalid_attribute("data-progress", &raw))?;
                RevealAction::progress(percent)
            }
            Self::Reveal => Ok(RevealAction::reveal(&config.reveal_class)),
            Self::ScrollAnimate => Ok(RevealAction::reveal(&config.scroll_animate_class)),
            Self::LazyImage => {
                let src = required(doc, node, "data-src")?;
                if src.trim().is_empty() {
                    return Err(FolioError::invalid_attribute("data-src", src));
                }
                Ok(RevealAction::lazy_image(src.trim()))
            }
        }
    }
}

fn required<D: Document>(doc: &D, node: &D::Node, attribute: &str) -> FolioResult<String> {
    doc.attribute(node, attribute)
        .ok_or_else(|| FolioError::missing_attribute(attribute))
}

/// A target ready for registration
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedTarget<N> {
    /// Element
    pub target: N,
    /// Marker that matched
    pub rule: MarkerRule,
    /// Observation options
    pub options: WatchOptions,
    /// Action to fire
    pub action: RevealAction,
}

/// Result of scanning a document
#[derive(Debug)]
pub struct Scan<N> {
    /// Valid targets, in document order
    pub targets: Vec<ScannedTarget<N>>,
    /// Marked elements whose attributes were unusable
    pub rejected: Vec<(N, FolioError)>,
}

/// Find every marked element in document order.
///
/// An element carrying several markers is claimed by the first rule in
/// [`MarkerRule::ALL`]. Elements with unusable marker attributes are skipped
/// with a warning and reported in [`Scan::rejected`].
pub fn scan<D: Document>(doc: &D, config: &RevealConfig) -> Scan<D::Node> {
    let per_rule: Vec<(MarkerRule, Vec<D::Node>)> = MarkerRule::ALL
        .iter()
        .map(|rule| (*rule, doc.query_all(&rule.selector())))
        .collect();
    let all = Selector::Any(MarkerRule::ALL.iter().map(|r| r.selector()).collect());

    let mut result = Scan {
        targets: Vec::new(),
        rejected: Vec::new(),
    };
    for node in doc.query_all(&all) {
        let Some(rule) = per_rule
            .iter()
            .find(|(_, nodes)| nodes.contains(&node))
            .map(|(rule, _)| *rule)
        else {
            continue;
        };
        match rule.action(doc, &node, config) {
            Ok(action) => result.targets.push(ScannedTarget {
                target: node,
                rule,
                options: rule.options(config),
                action,
            }),
            Err(err) => {
                warn!(node = ?node, rule = ?rule, error = %err, "skipping reveal target");
                result.rejected.push((node, err));
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{DomElement, MockDom};

    #[test]
    fn test_scan_portfolio_document_order() {
        let dom = MockDom::portfolio();
        let scan = scan(&dom, &RevealConfig::default());
        let rules: Vec<MarkerRule> = scan.targets.iter().map(|t| t.rule).collect();
        assert_eq!(
            rules,
            vec![
                MarkerRule::ScrollAnimate,
                MarkerRule::Counter,
                MarkerRule::Counter,
                MarkerRule::Progress,
                MarkerRule::Progress,
                MarkerRule::Reveal,
                MarkerRule::LazyImage,
            ]
        );
        assert!(scan.rejected.is_empty());
    }

    #[test]
    fn test_scan_builds_actions() {
        let dom = MockDom::portfolio();
        let scan = scan(&dom, &RevealConfig::default());
        let counter = &scan.targets[1];
        assert_eq!(counter.action, RevealAction::counter(250, 2000.0));
        assert_eq!(counter.options.threshold, 0.5);
        let scroll = &scan.targets[0];
        assert_eq!(scroll.action, RevealAction::reveal("animate-in"));
        assert_eq!(scroll.options.root_margin.as_deref(), Some("0px 0px -50px 0px"));
        let lazy = scan.targets.last().unwrap();
        assert_eq!(lazy.action, RevealAction::lazy_image("/img/project-1.png"));
        assert_eq!(lazy.options.threshold, 0.0);
    }

    #[test]
    fn test_scan_rejects_invalid_targets() {
        let dom = MockDom::with_body(vec![
            DomElement::new("span").with_id("bad").with_attr("data-count", "lots"),
            DomElement::new("div").with_id("nobar").with_class("skill-progress"),
            DomElement::new("div")
                .with_id("overfull")
                .with_class("skill-progress")
                .with_attr("data-progress", "140"),
            DomElement::new("span").with_id("good").with_attr("data-count", " 12 "),
        ]);
        let scan = scan(&dom, &RevealConfig::default());
        assert_eq!(scan.targets.len(), 1);
        assert_eq!(scan.targets[0].action, RevealAction::counter(12, 2000.0));
        assert_eq!(scan.rejected.len(), 3);
        assert!(matches!(scan.rejected[0].1, FolioError::InvalidAttribute { .. }));
        assert!(matches!(scan.rejected[1].1, FolioError::MissingAttribute { .. }));
    }

    #[test]
    fn test_scan_first_rule_wins() {
        let dom = MockDom::with_body(vec![DomElement::new("section")
            .with_attr("data-reveal", "")
            .with_attr("data-scroll-animate", "")]);
        let scan = scan(&dom, &RevealConfig::default());
        assert_eq!(scan.targets.len(), 1);
        assert_eq!(scan.targets[0].rule, MarkerRule::Reveal);
    }

    #[test]
    fn test_lazy_rule_requires_img() {
        let dom = MockDom::with_body(vec![DomElement::new("div").with_attr("data-src", "/x.png")]);
        assert!(scan(&dom, &RevealConfig::default()).targets.is_empty());
    }

    #[test]
    fn test_custom_reveal_class() {
        let dom = MockDom::with_body(vec![DomElement::new("div").with_attr("data-reveal", "")]);
        let config = RevealConfig {
            reveal_class: "shown".to_string(),
            ..RevealConfig::default()
        };
        let scan = scan(&dom, &config);
        assert_eq!(scan.targets[0].action, RevealAction::reveal("shown"));
    }
}
