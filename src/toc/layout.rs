//! Page geometry as seen by the scroll tracker.
//!
//! The browser host answers these queries from live layout; tests and the
//! `trace` command use [`StaticLayout`].

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Vertical extent of a box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub top: f64,
    pub bottom: f64,
}

impl Span {
    pub const fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Which presentation a list query is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Sidebar,
    Drawer,
}

/// A list item inside its scrollable list container.
///
/// `viewport` and `item` share one coordinate space (client rects).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListGeometry {
    pub viewport: Span,
    pub item: Span,
    pub scroll_top: f64,
    pub scroll_height: f64,
}

impl ListGeometry {
    /// Item not fully inside the visible part of the list.
    pub fn is_clipped(&self) -> bool {
        self.item.top < self.viewport.top || self.item.bottom > self.viewport.bottom
    }

    /// Scroll offset placing the item in the vertical middle of the list.
    pub fn centered_scroll_top(&self) -> f64 {
        let item_top = self.item.top - self.viewport.top + self.scroll_top;
        let target = item_top - self.viewport.height() / 2.0 + self.item.height() / 2.0;
        let max = (self.scroll_height - self.viewport.height()).max(0.0);
        target.clamp(0.0, max)
    }
}

/// Geometry queries answered by the host page.
pub trait Layout {
    /// Current vertical scroll offset of the document.
    fn scroll_y(&self) -> f64;

    fn viewport_height(&self) -> f64;

    /// Article body bounds in document coordinates.
    fn article(&self) -> Option<Span>;

    /// Document offset of the heading with `id`.
    fn heading_top(&self, id: &str) -> Option<f64>;

    /// Geometry of entry `index` inside one of the lists.
    fn list_item(&self, list: ListKind, index: usize) -> Option<ListGeometry>;
}

// ============================================================================
// Static Layout
// ============================================================================

/// Uniform-height list container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListMetrics {
    pub viewport_height: f64,
    pub item_height: f64,
    #[serde(default)]
    pub scroll_top: f64,
    pub item_count: usize,
}

impl ListMetrics {
    fn geometry(&self, index: usize) -> Option<ListGeometry> {
        if index >= self.item_count {
            return None;
        }
        let top = index as f64 * self.item_height - self.scroll_top;
        Some(ListGeometry {
            viewport: Span::new(0.0, self.viewport_height),
            item: Span::new(top, top + self.item_height),
            scroll_top: self.scroll_top,
            scroll_height: self.item_count as f64 * self.item_height,
        })
    }
}

/// A frozen layout snapshot.
///
/// # Example
/// ```json
/// {
///   "scroll_y": 0,
///   "viewport_height": 800,
///   "article": { "top": 1000, "bottom": 5000 },
///   "headings": { "intro": 1200, "usage": 2400 },
///   "sidebar": { "viewport_height": 300, "item_height": 32, "item_count": 2 }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticLayout {
    #[serde(default)]
    pub scroll_y: f64,
    pub viewport_height: f64,
    #[serde(default)]
    pub article: Option<Span>,
    #[serde(default)]
    pub headings: FxHashMap<String, f64>,
    #[serde(default)]
    pub sidebar: Option<ListMetrics>,
    #[serde(default)]
    pub drawer: Option<ListMetrics>,
}

impl StaticLayout {
    pub fn new(viewport_height: f64, article: Span) -> Self {
        Self {
            viewport_height,
            article: Some(article),
            ..Self::default()
        }
    }

    pub fn with_heading(mut self, id: &str, top: f64) -> Self {
        self.headings.insert(id.to_owned(), top);
        self
    }

    pub fn with_list(mut self, list: ListKind, metrics: ListMetrics) -> Self {
        match list {
            ListKind::Sidebar => self.sidebar = Some(metrics),
            ListKind::Drawer => self.drawer = Some(metrics),
        }
        self
    }
}

impl Layout for StaticLayout {
    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn article(&self) -> Option<Span> {
        self.article
    }

    fn heading_top(&self, id: &str) -> Option<f64> {
        self.headings.get(id).copied()
    }

    fn list_item(&self, list: ListKind, index: usize) -> Option<ListGeometry> {
        match list {
            ListKind::Sidebar => self.sidebar.as_ref()?.geometry(index),
            ListKind::Drawer => self.drawer.as_ref()?.geometry(index),
        }
    }
}
