//! Scroll tracker: scroll-spy, visibility window and reading progress.
//!
//! [`measure`] reads the layout into a [`Reading`] without touching any view.
//! [`apply`] writes a reading to both presentations, comparing first, so an
//! unchanged reading costs no mutation.

use crate::config::ScrollConfig;
use crate::toc::Effect;
use crate::toc::entry::Outline;
use crate::toc::layout::{Layout, ListKind, Span};
use crate::toc::view::{DrawerView, Presentation, SidebarView};

// ============================================================================
// Formulas
// ============================================================================

/// Index of the last heading whose top, minus `clearance`, has been scrolled
/// past. Headings without a measured offset never qualify.
pub fn active_index(offsets: &[Option<f64>], scroll_y: f64, clearance: f64) -> Option<usize> {
    offsets
        .iter()
        .rposition(|top| top.is_some_and(|top| scroll_y >= top - clearance))
}

/// Scroll range during which the TOC is shown.
///
/// Starts `lead_in` before the article top and ends once the article bottom
/// is less than one viewport plus `trail_out` away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityWindow {
    pub start: f64,
    pub end: f64,
}

impl VisibilityWindow {
    pub fn new(article: Span, viewport_height: f64, lead_in: f64, trail_out: f64) -> Self {
        Self {
            start: article.top - lead_in,
            end: article.bottom - viewport_height + trail_out,
        }
    }

    pub fn contains(&self, scroll_y: f64) -> bool {
        scroll_y >= self.start && scroll_y < self.end
    }
}

/// Position of the viewport midpoint between article top and bottom, in `[0, 1]`.
pub fn progress(article: Span, scroll_y: f64, viewport_height: f64) -> f64 {
    let height = article.height();
    if height <= 0.0 {
        return 0.0;
    }
    let midpoint = scroll_y + viewport_height / 2.0;
    ((midpoint - article.top) / height).clamp(0.0, 1.0)
}

/// Ring stroke offset for a progress ratio.
pub fn dash_offset(circumference: f64, progress: f64) -> f64 {
    circumference * (1.0 - progress.clamp(0.0, 1.0))
}

// ============================================================================
// State
// ============================================================================

/// Page-scoped TOC state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TocState {
    pub drawer_open: bool,
    pub active: Option<usize>,
    pub visible: bool,
    pub article: Option<Span>,
    pub progress: f64,
}

/// One measurement of the layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub scroll_y: f64,
    pub active: Option<usize>,
    pub visible: bool,
    pub article: Option<Span>,
    pub progress: f64,
}

/// Read scroll position, article bounds and heading offsets.
pub fn measure(outline: &Outline, layout: &dyn Layout, config: &ScrollConfig) -> Reading {
    let scroll_y = layout.scroll_y();
    let viewport_height = layout.viewport_height();
    let article = layout.article();

    let offsets: Vec<_> = outline
        .iter()
        .map(|entry| layout.heading_top(&entry.id))
        .collect();

    let (visible, progress) = match article {
        Some(span) => (
            VisibilityWindow::new(span, viewport_height, config.lead_in, config.trail_out)
                .contains(scroll_y),
            progress(span, scroll_y, viewport_height),
        ),
        None => (false, 0.0),
    };

    Reading {
        scroll_y,
        active: active_index(&offsets, scroll_y, config.clearance),
        visible,
        article,
        progress,
    }
}

/// Write a reading to state and both views.
///
/// Reveals the sidebar's active link when it has just changed and is
/// clipped by its own list viewport.
pub fn apply(
    reading: &Reading,
    state: &mut TocState,
    sidebar: &mut SidebarView,
    drawer: &mut DrawerView,
    layout: &dyn Layout,
) -> Vec<Effect> {
    let mut effects = Vec::new();
    state.article = reading.article;

    state.visible = reading.visible;
    sidebar.set_visible(reading.visible);
    drawer.set_visible(reading.visible);

    state.progress = reading.progress;
    drawer.set_progress(reading.progress);

    let active_changed = state.active != reading.active;
    state.active = reading.active;
    sidebar.set_active(reading.active);
    drawer.set_active(reading.active);

    if active_changed
        && let Some(index) = reading.active
        && layout
            .list_item(ListKind::Sidebar, index)
            .is_some_and(|item| item.is_clipped())
    {
        effects.push(Effect::RevealLink {
            list: ListKind::Sidebar,
            index,
        });
    }

    effects
}
