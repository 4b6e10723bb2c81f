//! Colour theme bootstrap.

use crate::dom::Document;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Attribute on the root element selecting the stylesheet theme
pub const THEME_ATTRIBUTE: &str = "data-theme";

/// Site colour theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark palette
    #[default]
    Dark,
    /// Light palette
    Light,
}

impl Theme {
    /// Attribute value for this theme
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// Resolve a saved value, falling back to `default` when absent or unknown
    #[must_use]
    pub fn resolve(saved: Option<&str>, default: Self) -> Self {
        saved.and_then(|s| s.parse().ok()).unwrap_or(default)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => Err(format!("unknown theme `{other}`")),
        }
    }
}

/// Set `data-theme` on the root element. Returns the theme applied.
pub fn apply_theme<D: Document>(doc: &mut D, saved: Option<&str>, default: Theme) -> Theme {
    let theme = match saved.map(str::parse::<Theme>) {
        Some(Ok(theme)) => theme,
        Some(Err(err)) => {
            warn!(error = %err, fallback = %default, "ignoring saved theme");
            default
        }
        None => default,
    };
    if let Some(root) = doc.root() {
        doc.set_attribute(&root, THEME_ATTRIBUTE, theme.as_str());
    }
    debug!(%theme, "theme applied");
    theme
}
