//! Page configuration.
//!
//! Every threshold, delay and duration the page scripts use lives here with
//! the value the site shipped with as its default. A page can override any
//! subset through embedded JSON.

use crate::features::theme::Theme;
use crate::geometry::RootMargin;
use crate::result::{FolioError, FolioResult};
use crate::selector::Selector;
use serde::{Deserialize, Serialize};

/// Reveal marker thresholds and behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Visible ratio that starts a `[data-count]` counter
    pub counter_threshold: f64,
    /// Counter animation length
    pub counter_duration_ms: f64,
    /// Visible ratio that fills a `.skill-progress` bar
    pub progress_threshold: f64,
    /// Visible ratio that reveals a `[data-reveal]` element
    pub reveal_threshold: f64,
    /// Class added to `[data-reveal]` elements
    pub reveal_class: String,
    /// Visible ratio that reveals a `[data-scroll-animate]` element
    pub scroll_animate_threshold: f64,
    /// Class added to `[data-scroll-animate]` elements
    pub scroll_animate_class: String,
    /// Root margin for `[data-scroll-animate]` observation
    pub scroll_animate_root_margin: Option<String>,
    /// Visible ratio that loads an `img[data-src]`
    pub lazy_image_threshold: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            counter_threshold: 0.5,
            counter_duration_ms: 2000.0,
            progress_threshold: 0.5,
            reveal_threshold: 0.1,
            reveal_class: "visible".to_string(),
            scroll_animate_threshold: 0.1,
            scroll_animate_class: "animate-in".to_string(),
            scroll_animate_root_margin: Some("0px 0px -50px 0px".to_string()),
            lazy_image_threshold: 0.0,
        }
    }
}

/// Typing animation timing and fallback phrases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    /// Phrases used when the element carries no `data-phrases`
    pub phrases: Vec<String>,
    /// Delay after typing a character
    pub type_delay_ms: f64,
    /// Delay after deleting a character
    pub delete_delay_ms: f64,
    /// Pause once a phrase is complete
    pub hold_delay_ms: f64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            phrases: vec![
                "Software Engineer".to_string(),
                "Mobile Developer".to_string(),
                "Open Source Contributor".to_string(),
            ],
            type_delay_ms: 150.0,
            delete_delay_ms: 50.0,
            hold_delay_ms: 2000.0,
        }
    }
}

/// Project filter timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Delay before a shown card fades in
    pub show_delay_ms: f64,
    /// Delay before a hidden card leaves the layout
    pub hide_delay_ms: f64,
    /// Class marking the selected button
    pub active_class: String,
    /// Scale applied to cards while they fade out
    pub hidden_scale: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            show_delay_ms: 10.0,
            hide_delay_ms: 300.0,
            active_class: "active".to_string(),
            hidden_scale: 0.8,
        }
    }
}

/// Scroll-driven effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Scroll offset beyond which the back-to-top button shows
    pub back_to_top_offset: f64,
    /// Class that shows the back-to-top button
    pub visible_class: String,
    /// Parallax speed of the first decoration
    pub parallax_base_speed: f64,
    /// Extra parallax speed per following decoration
    pub parallax_speed_step: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            back_to_top_offset: 500.0,
            visible_class: "visible".to_string(),
            parallax_base_speed: 0.5,
            parallax_speed_step: 0.1,
        }
    }
}

/// Items under `selector` get increasing transition delays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaggerGroup {
    /// Descendant chain such as `.skills-grid .skill-category`
    pub selector: String,
    /// Delay step per item
    pub delay_ms: f64,
}

impl StaggerGroup {
    /// Create a group
    #[must_use]
    pub fn new(selector: &str, delay_ms: f64) -> Self {
        Self {
            selector: selector.to_string(),
            delay_ms,
        }
    }
}

/// Theme bootstrap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Theme used when nothing is saved
    pub default_theme: Theme,
    /// Storage key holding the saved theme
    pub storage_key: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            default_theme: Theme::Dark,
            storage_key: "theme".to_string(),
        }
    }
}

/// Window-load handling and performance logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Loader fade-out before removal
    pub loader_fade_ms: f64,
    /// Class added to `body` once loaded
    pub loaded_class: String,
    /// Tasks longer than this are reported
    pub long_task_threshold_ms: f64,
    /// Report load time and long tasks
    pub performance_monitoring: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            loader_fade_ms: 300.0,
            loaded_class: "loaded".to_string(),
            long_task_threshold_ms: 50.0,
            performance_monitoring: false,
        }
    }
}

/// Complete page configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Reveal markers
    pub reveal: RevealConfig,
    /// Typing animation
    pub typing: TypingConfig,
    /// Project filter
    pub filter: FilterConfig,
    /// Scroll effects
    pub scroll: ScrollConfig,
    /// Staggered transition groups
    pub stagger: Vec<StaggerGroup>,
    /// Theme bootstrap
    pub theme: ThemeConfig,
    /// Load handling
    pub load: LoadConfig,
    /// `tracing` filter directive for the browser console
    pub log_level: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            reveal: RevealConfig::default(),
            typing: TypingConfig::default(),
            filter: FilterConfig::default(),
            scroll: ScrollConfig::default(),
            stagger: vec![
                StaggerGroup::new(".skills-grid .skill-category", 100.0),
                StaggerGroup::new(".projects-grid .project-card", 100.0),
                StaggerGroup::new(".testimonials-slider .testimonial-card", 150.0),
            ],
            theme: ThemeConfig::default(),
            load: LoadConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl SiteConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse JSON overrides on top of the defaults, then validate
    pub fn from_json(json: &str) -> FolioResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the typing phrases
    #[must_use]
    pub fn with_phrases(mut self, phrases: &[&str]) -> Self {
        self.typing.phrases = phrases.iter().map(|p| (*p).to_string()).collect();
        self
    }

    /// Enable or disable performance monitoring
    #[must_use]
    pub const fn with_performance_monitoring(mut self, enabled: bool) -> Self {
        self.load.performance_monitoring = enabled;
        self
    }

    /// Set the log filter directive
    #[must_use]
    pub fn with_log_level(mut self, level: &str) -> Self {
        self.log_level = level.to_string();
        self
    }

    /// Check every value is usable
    pub fn validate(&self) -> FolioResult<()> {
        let reveal = &self.reveal;
        for (name, threshold) in [
            ("reveal.counter_threshold", reveal.counter_threshold),
            ("reveal.progress_threshold", reveal.progress_threshold),
            ("reveal.reveal_threshold", reveal.reveal_threshold),
            ("reveal.scroll_animate_threshold", reveal.scroll_animate_threshold),
            ("reveal.lazy_image_threshold", reveal.lazy_image_threshold),
        ] {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(FolioError::config(format!(
                    "{name} must be within [0, 1], got {threshold}"
                )));
            }
        }
        if let Some(margin) = &reveal.scroll_animate_root_margin {
            RootMargin::parse(margin)?;
        }

        for (name, delay) in [
            ("reveal.counter_duration_ms", reveal.counter_duration_ms),
            ("filter.show_delay_ms", self.filter.show_delay_ms),
            ("filter.hide_delay_ms", self.filter.hide_delay_ms),
            ("load.loader_fade_ms", self.load.loader_fade_ms),
            ("load.long_task_threshold_ms", self.load.long_task_threshold_ms),
        ] {
            if !delay.is_finite() || delay < 0.0 {
                return Err(FolioError::config(format!(
                    "{name} must be a non-negative number of milliseconds, got {delay}"
                )));
            }
        }

        let typing = &self.typing;
        for (name, delay) in [
            ("typing.type_delay_ms", typing.type_delay_ms),
            ("typing.delete_delay_ms", typing.delete_delay_ms),
            ("typing.hold_delay_ms", typing.hold_delay_ms),
        ] {
            if !delay.is_finite() || delay <= 0.0 {
                return Err(FolioError::config(format!(
                    "{name} must be a positive number of milliseconds, got {delay}"
                )));
            }
        }

        if self.typing.phrases.iter().any(String::is_empty) {
            return Err(FolioError::config("typing.phrases must not contain empty phrases"));
        }

        for group in &self.stagger {
            if Selector::parse_chain(&group.selector).is_none() {
                return Err(FolioError::config(format!(
                    "stagger selector `{}` is not understood",
                    group.selector
                )));
            }
            if !group.delay_ms.is_finite() || group.delay_ms < 0.0 {
                return Err(FolioError::config(format!(
                    "stagger delay for `{}` must be non-negative",
                    group.selector
                )));
            }
        }

        if self.log_level.trim().is_empty() {
            return Err(FolioError::config("log_level must not be empty"));
        }
        Ok(())
    }
}
