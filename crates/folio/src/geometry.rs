//! Viewport intersection geometry.
//!
//! Used by the mock document to compute the visible-area ratios a browser's
//! intersection observer would report while a test scrolls the page.

use crate::result::{FolioError, FolioResult};
use serde::{Deserialize, Serialize};

/// Element bounding box in document coordinates (pixels)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub left: f64,
    /// Top edge
    pub top: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a new rect
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Area in square pixels
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}

/// Root margin applied to the viewport before intersecting, CSS order
/// (top, right, bottom, left). Negative values shrink the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RootMargin {
    /// Top margin
    pub top: f64,
    /// Right margin
    pub right: f64,
    /// Bottom margin
    pub bottom: f64,
    /// Left margin
    pub left: f64,
}

impl RootMargin {
    /// Parse a CSS margin string such as `"0px 0px -50px 0px"`.
    ///
    /// Accepts one to four pixel lengths with the usual CSS shorthand
    /// expansion. Percentages are not supported.
    pub fn parse(margin: &str) -> FolioResult<Self> {
        let values = margin
            .split_whitespace()
            .map(|part| {
                let number = part.strip_suffix("px").unwrap_or(part);
                number
                    .parse::<f64>()
                    .map_err(|_| FolioError::config(format!("invalid root margin `{margin}`")))
            })
            .collect::<FolioResult<Vec<f64>>>()?;

        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            _ => {
                return Err(FolioError::config(format!(
                    "invalid root margin `{margin}`"
                )))
            }
        };

        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

/// The visible scrolling region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Vertical scroll offset
    pub scroll_y: f64,
    /// Viewport width
    pub width: f64,
    /// Viewport height
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll_y: 0.0,
            width: 1280.0,
            height: 800.0,
        }
    }
}

impl Viewport {
    /// Create a viewport of the given size at the top of the page
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            scroll_y: 0.0,
            width,
            height,
        }
    }

    /// Same viewport scrolled to `scroll_y`
    #[must_use]
    pub const fn scrolled_to(mut self, scroll_y: f64) -> Self {
        self.scroll_y = scroll_y;
        self
    }

    /// Root rectangle after applying a root margin
    #[must_use]
    pub fn root_rect(&self, margin: &RootMargin) -> Rect {
        let top = self.scroll_y - margin.top;
        let left = -margin.left;
        Rect::new(
            left,
            top,
            self.width + margin.left + margin.right,
            self.height + margin.top + margin.bottom,
        )
    }

    /// Whether `rect` touches the (margin-adjusted) viewport. Edge-adjacent
    /// boxes count as intersecting.
    #[must_use]
    pub fn intersects(&self, rect: &Rect, margin: &RootMargin) -> bool {
        let root = self.root_rect(margin);
        rect.left <= root.right()
            && rect.right() >= root.left
            && rect.top <= root.bottom()
            && rect.bottom() >= root.top
    }

    /// Fraction of `rect`'s area inside the (margin-adjusted) viewport.
    ///
    /// Zero-area boxes report `1.0` when they intersect, like the browser.
    #[must_use]
    pub fn visible_ratio(&self, rect: &Rect, margin: &RootMargin) -> f64 {
        if !self.intersects(rect, margin) {
            return 0.0;
        }
        let area = rect.area();
        if area == 0.0 {
            return 1.0;
        }
        let root = self.root_rect(margin);
        let overlap_w = rect.right().min(root.right()) - rect.left.max(root.left);
        let overlap_h = rect.bottom().min(root.bottom()) - rect.top.max(root.top);
        ((overlap_w.max(0.0) * overlap_h.max(0.0)) / area).clamp(0.0, 1.0)
    }
}
