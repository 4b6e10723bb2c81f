//! Folio: scroll-driven presentation runtime for a single-page portfolio.
//!
//! Elements carry marker attributes (`data-count`, `data-progress`,
//! `data-reveal`, `data-scroll-animate`, `data-src`). When they scroll into
//! view, the reveal engine fires each one's action exactly once: a counter
//! animates up to its goal, a skill bar fills, a section fades in, an image
//! loads. Around it sit the smaller page features: typing text, project
//! filtering, scroll effects, staggered transitions, accessibility fixes
//! and theme bootstrap.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  entries / scroll / keys / frames  ┌──────────────┐
//! │ Host         │───────────────────────────────────►│ Page<D>      │
//! │ (browser or  │                                    │  ├ reveal    │
//! │  test)       │◄───────────────────────────────────│  ├ scheduler │
//! └──────────────┘     mutations via Document trait   │  └ features  │
//!                                                     └──────────────┘
//! ```
//!
//! Everything mutates the page through [`Document`], so the whole runtime
//! runs against [`MockDom`] in native tests. Time is a parameter: deferred
//! work goes through [`Scheduler`] and counters are driven by frame times.
//!
//! # Example
//!
//! ```
//! use folio::prelude::*;
//!
//! let mut page = Page::init(MockDom::portfolio(), SiteConfig::default(), &HostEnv::new());
//! let viewport = Viewport::default().scrolled_to(800.0);
//! let entries = page.document().intersections(&viewport, page.animator().watched());
//! let fired = page.observe(&entries, 0.0);
//! assert!(!fired.is_empty());
//!
//! page.tick(2000.0);
//! let counter = page.document().get_by_id("stat-projects").unwrap();
//! assert_eq!(page.document().text(&counter), "250");
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod config;
pub mod dom;
pub mod features;
pub mod geometry;
pub mod page;
mod result;
pub mod reveal;
pub mod scheduler;
pub mod selector;

pub use config::SiteConfig;
pub use dom::{Document, DomElement, MockDom, NodeId};
pub use geometry::{Rect, RootMargin, Viewport};
pub use page::{HostEnv, InitStep, Page, PageTask};
pub use result::{FolioError, FolioResult};
pub use reveal::{IntersectionEntry, RevealAction, RevealAnimator, WatchOptions};
pub use scheduler::{CancellationToken, Scheduler};
pub use selector::Selector;

/// Common imports
pub mod prelude {
    pub use super::config::*;
    pub use super::dom::*;
    pub use super::features::*;
    pub use super::geometry::*;
    pub use super::page::*;
    pub use super::result::*;
    pub use super::reveal::*;
    pub use super::scheduler::*;
    pub use super::selector::*;
}
