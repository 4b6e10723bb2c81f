//! Structured element selectors.
//!
//! A [`Selector`] is evaluated directly by [`crate::dom::MockDom`] and rendered
//! to a CSS selector string for the browser's `querySelectorAll`.

use std::fmt;

/// A structured selector covering the subset of CSS the page scripts use
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    /// `[attribute]`
    Attr(String),
    /// `tag`
    Tag(String),
    /// Compound selector: every part must match the same element
    All(Vec<Selector>),
    /// `ancestor target`
    Descendant {
        /// Selector some ancestor must match
        ancestor: Box<Selector>,
        /// Selector the element itself must match
        target: Box<Selector>,
    },
    /// Selector group (`a, b`)
    Any(Vec<Selector>),
}

impl Selector {
    /// `#id`
    #[must_use]
    pub fn id(id: &str) -> Self {
        Self::Id(id.to_string())
    }

    /// `.class`
    #[must_use]
    pub fn class(class: &str) -> Self {
        Self::Class(class.to_string())
    }

    /// `[attribute]`
    #[must_use]
    pub fn attr(name: &str) -> Self {
        Self::Attr(name.to_string())
    }

    /// `tag`
    #[must_use]
    pub fn tag(tag: &str) -> Self {
        Self::Tag(tag.to_string())
    }

    /// Compound with another simple selector (`img` + `[data-src]` = `img[data-src]`)
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::All(mut parts) => {
                parts.push(other);
                Self::All(parts)
            }
            first => Self::All(vec![first, other]),
        }
    }

    /// Restrict to elements nested inside an element matching `ancestor`
    #[must_use]
    pub fn within(self, ancestor: Self) -> Self {
        Self::Descendant {
            ancestor: Box::new(ancestor),
            target: Box::new(self),
        }
    }

    /// Parse a space-separated chain of simple class selectors, e.g.
    /// `".skills-grid .skill-category"`.
    ///
    /// Only `.class`, `#id`, `[attr]` and bare tags are understood; compound
    /// segments such as `img[data-src]` are split at the bracket.
    #[must_use]
    pub fn parse_chain(chain: &str) -> Option<Self> {
        let mut result: Option<Self> = None;
        for segment in chain.split_whitespace() {
            let simple = parse_compound(segment)?;
            result = Some(match result {
                None => simple,
                Some(ancestor) => simple.within(ancestor),
            });
        }
        result
    }

    /// Render as a CSS selector string
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Id(id) => format!("#{id}"),
            Self::Class(class) => format!(".{class}"),
            Self::Attr(name) => format!("[{name}]"),
            Self::Tag(tag) => tag.clone(),
            Self::All(parts) => parts.iter().map(Self::to_css).collect(),
            Self::Descendant { ancestor, target } => {
                format!("{} {}", ancestor.to_css(), target.to_css())
            }
            Self::Any(group) => group
                .iter()
                .map(Self::to_css)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

fn parse_compound(segment: &str) -> Option<Selector> {
    let mut parts = Vec::new();
    let mut rest = segment;
    while !rest.is_empty() {
        let (part, tail) = if let Some(body) = rest.strip_prefix('[') {
            let end = body.find(']')?;
            (Selector::attr(&body[..end]), &body[end + 1..])
        } else {
            let marker = rest.chars().next()?;
            let body = if marker == '.' || marker == '#' {
                &rest[1..]
            } else {
                rest
            };
            let end = body.find(['.', '#', '[']).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return None;
            }
            let part = match marker {
                '.' => Selector::class(name),
                '#' => Selector::id(name),
                _ => Selector::tag(name),
            };
            (part, &body[end..])
        };
        parts.push(part);
        rest = tail;
    }
    match parts.len() {
        0 => None,
        1 => parts.pop(),
        _ => Some(Selector::All(parts)),
    }
}
