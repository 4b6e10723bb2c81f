//! Page enhancements that run alongside the reveal engine.

pub mod a11y;
pub mod filter;
pub mod perf;
pub mod scroll;
pub mod stagger;
pub mod theme;
pub mod typing;

pub use filter::{FilterStep, ProjectFilter};
pub use perf::LongTaskMonitor;
pub use scroll::ScrollEffects;
pub use stagger::apply_stagger;
pub use theme::Theme;
pub use typing::{TypingEffect, TypingFrame};
