//! Responsive table of contents.
//!
//! # Pipeline
//!
//! ```text
//! page ─► scan ─► extract ─► Outline ─┬─► SidebarView ─┐
//!                                     └─► DrawerView  ─┴─► Toc ◄─ scroll / timer / frame / UiEvent
//!                                                               │
//!                                                               └─► Vec<Effect> for the host
//! ```
//!
//! The host owns the browser: it answers [`Layout`] queries, forwards events
//! and performs the returned [`Effect`]s. Class and style state stays inside
//! the views, where it can be inspected and rendered.

pub mod dom;
pub mod drawer;
pub mod entry;
pub mod extract;
pub mod layout;
pub mod scan;
pub mod schedule;
pub mod slug;
pub mod tracker;
pub mod view;

pub use drawer::{DrawerController, DrawerState, SwipeOutcome};
pub use entry::{HeadingEntry, HeadingLevel, Outline};
pub use extract::{Extraction, extract};
pub use layout::{Layout, ListKind, Span, StaticLayout};
pub use schedule::{Clock, ManualClock};
pub use tracker::TocState;
pub use view::{DrawerView, Presentation, SidebarView};

use crate::config::{LabelsConfig, ScrollConfig, TocbarConfig};
use anyhow::Result;
use compact_str::CompactString;
use scan::ScanError;
use schedule::{Admission, FrameGate, Throttle, TimerQueue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracker::Reading;

// ============================================================================
// Host Interface
// ============================================================================

/// Work the host performs on browser APIs it owns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    /// Smooth window scroll to a document offset.
    ScrollWindow { top: f64 },
    /// Record an in-page navigation without reloading.
    PushHistory { href: CompactString },
    /// Bring a link into view inside its own list (nearest edge).
    RevealLink { list: ListKind, index: usize },
    /// Smooth scroll of a list container.
    ScrollList { list: ListKind, top: f64 },
    /// Toggle a class on `<body>`.
    BodyClass { class: &'static str, on: bool },
    /// Call [`Toc::on_frame`] on the next animation frame.
    RequestFrame,
    /// Call [`Toc::on_timer`] once `at` has been reached.
    ArmTimer {
        #[serde(with = "millis")]
        at: Duration,
    },
}

/// User interaction forwarded by the host.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    TriggerClick,
    OverlayClick,
    CloseClick,
    KeyDown { key: String },
    LinkClick { list: ListKind, index: usize },
    /// Touch on the drawer handle.
    TouchStart { y: f64 },
    TouchMove { y: f64 },
    TouchEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    TrailingUpdate,
    CenterDrawer,
}

// ============================================================================
// Component
// ============================================================================

/// One mounted table of contents, scoped to a page view.
pub struct Toc<C: Clock> {
    outline: Outline,
    labels: LabelsConfig,
    scroll: ScrollConfig,
    settle: Duration,
    clock: C,

    state: TocState,
    sidebar: SidebarView,
    drawer_view: DrawerView,
    controller: DrawerController,

    throttle: Throttle,
    frame: FrameGate,
    timers: TimerQueue<Task>,
    pending: Option<Reading>,
}

impl<C: Clock> Toc<C> {
    /// Build both presentations for an extracted outline.
    pub fn mount(outline: Outline, labels: LabelsConfig, config: &TocbarConfig, clock: C) -> Self {
        Self {
            sidebar: SidebarView::new(&outline, &labels),
            drawer_view: DrawerView::new(&outline, &labels, &config.drawer),
            controller: DrawerController::new(config.drawer.swipe_threshold),
            throttle: Throttle::new(config.scroll.throttle()),
            settle: config.drawer.settle(),
            scroll: config.scroll.clone(),
            state: TocState::default(),
            frame: FrameGate::default(),
            timers: TimerQueue::new(),
            pending: None,
            outline,
            labels,
            clock,
        }
    }

    /// Extract and mount from a rendered page. `Ok(None)` when not applicable.
    pub fn mount_page(html: &str, config: &TocbarConfig, clock: C) -> Result<Option<Self>, ScanError> {
        Ok(extract(html, config)?
            .map(|extraction| Self::mount(extraction.outline, extraction.labels, config, clock)))
    }

    /// Initial pass, applied synchronously.
    pub fn attach(&mut self, layout: &dyn Layout) -> Vec<Effect> {
        self.throttle.mark_run(self.clock.now());
        let reading = tracker::measure(&self.outline, layout, &self.scroll);
        let mut effects = vec![Effect::BodyClass {
            class: view::class::HAS_TOC,
            on: true,
        }];
        effects.extend(self.apply(&reading, layout));
        effects
    }

    // ------------------------------------------------------------------------
    // Scroll path
    // ------------------------------------------------------------------------

    /// `scroll` or `resize`.
    pub fn on_scroll(&mut self, layout: &dyn Layout) -> Vec<Effect> {
        match self.throttle.admit(self.clock.now()) {
            Admission::Run => self.update(layout),
            Admission::Deferred { at } => {
                self.timers.schedule(at, Task::TrailingUpdate);
                vec![Effect::ArmTimer { at }]
            }
            Admission::Coalesced => Vec::new(),
        }
    }

    /// Run every timer task that is due.
    pub fn on_timer(&mut self, layout: &dyn Layout) -> Vec<Effect> {
        let now = self.clock.now();
        let mut effects = Vec::new();
        for task in self.timers.drain_due(now) {
            match task {
                Task::TrailingUpdate => {
                    if self.throttle.fire(now) {
                        effects.extend(self.update(layout));
                    }
                }
                Task::CenterDrawer => effects.extend(self.center_drawer(layout)),
            }
        }
        effects
    }

    /// Apply the reading queued since the last frame.
    pub fn on_frame(&mut self, layout: &dyn Layout) -> Vec<Effect> {
        self.frame.complete();
        match self.pending.take() {
            Some(reading) => self.apply(&reading, layout),
            None => Vec::new(),
        }
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    fn update(&mut self, layout: &dyn Layout) -> Vec<Effect> {
        self.pending = Some(tracker::measure(&self.outline, layout, &self.scroll));
        if self.frame.request() {
            vec![Effect::RequestFrame]
        } else {
            Vec::new()
        }
    }

    fn apply(&mut self, reading: &Reading, layout: &dyn Layout) -> Vec<Effect> {
        tracker::apply(
            reading,
            &mut self.state,
            &mut self.sidebar,
            &mut self.drawer_view,
            layout,
        )
    }

    // ------------------------------------------------------------------------
    // Interaction path
    // ------------------------------------------------------------------------

    pub fn handle(&mut self, event: UiEvent, layout: &dyn Layout) -> Vec<Effect> {
        match event {
            UiEvent::TriggerClick => self.open_drawer(),
            UiEvent::OverlayClick | UiEvent::CloseClick => self.close_drawer(),
            UiEvent::KeyDown { key } if key == "Escape" => self.close_drawer(),
            UiEvent::KeyDown { .. } => Vec::new(),
            UiEvent::LinkClick { list, index } => {
                let mut effects = self.navigate(index, layout);
                if !effects.is_empty() && list == ListKind::Drawer {
                    effects.extend(self.close_drawer());
                }
                effects
            }
            UiEvent::TouchStart { y } => {
                self.controller.touch_start(y);
                Vec::new()
            }
            UiEvent::TouchMove { y } => {
                if let Some(offset) = self.controller.touch_move(y) {
                    self.drawer_view.set_drag(Some(offset));
                }
                Vec::new()
            }
            UiEvent::TouchEnd => match self.controller.touch_end() {
                Some(SwipeOutcome::Dismiss) => self.finish_close(),
                Some(SwipeOutcome::SnapBack) => {
                    self.drawer_view.set_drag(None);
                    Vec::new()
                }
                None => Vec::new(),
            },
        }
    }

    fn open_drawer(&mut self) -> Vec<Effect> {
        if !self.controller.open() {
            return Vec::new();
        }
        self.state.drawer_open = true;
        self.drawer_view.set_open(true);
        self.drawer_view
            .sync_active_from(self.sidebar.active_href());

        let at = self.clock.now() + self.settle;
        self.timers.schedule(at, Task::CenterDrawer);
        vec![
            Effect::BodyClass {
                class: view::class::TOC_OPEN,
                on: true,
            },
            Effect::ArmTimer { at },
        ]
    }

    fn close_drawer(&mut self) -> Vec<Effect> {
        if self.controller.close() {
            self.finish_close()
        } else {
            Vec::new()
        }
    }

    /// Bring the views in line with a controller that just closed.
    fn finish_close(&mut self) -> Vec<Effect> {
        self.state.drawer_open = false;
        self.drawer_view.set_open(false);
        self.drawer_view.set_drag(None);
        self.timers.cancel(|task| *task == Task::CenterDrawer);
        vec![Effect::BodyClass {
            class: view::class::TOC_OPEN,
            on: false,
        }]
    }

    fn center_drawer(&self, layout: &dyn Layout) -> Option<Effect> {
        if !self.controller.is_open() {
            return None;
        }
        let index = self.drawer_view.active_index()?;
        let item = layout.list_item(ListKind::Drawer, index)?;
        Some(Effect::ScrollList {
            list: ListKind::Drawer,
            top: item.centered_scroll_top(),
        })
    }

    /// Nothing happens when the target heading is not on the page.
    fn navigate(&self, index: usize, layout: &dyn Layout) -> Vec<Effect> {
        let Some(entry) = self.outline.get(index) else {
            return Vec::new();
        };
        let Some(top) = layout.heading_top(&entry.id) else {
            return Vec::new();
        };
        vec![
            Effect::ScrollWindow {
                top: (top - self.scroll.clearance).max(0.0),
            },
            Effect::PushHistory { href: entry.href() },
        ]
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn labels(&self) -> &LabelsConfig {
        &self.labels
    }

    pub fn state(&self) -> &TocState {
        &self.state
    }

    pub fn sidebar(&self) -> &SidebarView {
        &self.sidebar
    }

    pub fn drawer(&self) -> &DrawerView {
        &self.drawer_view
    }

    /// Effective class/attribute/style changes across both views.
    pub fn mutations(&self) -> usize {
        self.sidebar.mutations() + self.drawer_view.mutations()
    }

    /// Injectable markup for the current view state.
    pub fn render_markup(&self) -> Result<String> {
        view::render_markup(&self.sidebar, &self.drawer_view)
    }
}

/// Serialize a [`Duration`] as whole milliseconds.
mod millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::layout::ListMetrics;
    use std::rc::Rc;

    const PAGE: &str = r#"<html><body><article>
        <div class="post-content">
            <h2>Intro</h2><p>a</p>
            <h2>Setup</h2><p>b</p>
            <h3>Usage</h3><p>c</p>
        </div></article></body></html>"#;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn layout() -> StaticLayout {
        StaticLayout::new(800.0, Span::new(1000.0, 5000.0))
            .with_heading("intro", 1100.0)
            .with_heading("setup", 2000.0)
            .with_heading("usage", 3000.0)
            .with_list(
                ListKind::Drawer,
                ListMetrics {
                    viewport_height: 60.0,
                    item_height: 30.0,
                    scroll_top: 0.0,
                    item_count: 3,
                },
            )
    }

    fn mounted() -> (Toc<Rc<ManualClock>>, Rc<ManualClock>, StaticLayout) {
        let clock = Rc::new(ManualClock::new());
        let toc = Toc::mount_page(PAGE, &TocbarConfig::default(), Rc::clone(&clock))
            .unwrap()
            .unwrap();
        (toc, clock, layout())
    }

    #[test]
    fn test_threshold_one_heading_builds_nothing() {
        let html = r#"<body><div class="post-content"><h2>Only</h2></div></body>"#;
        let toc = Toc::mount_page(html, &TocbarConfig::default(), ManualClock::new()).unwrap();
        assert!(toc.is_none());
    }

    #[test]
    fn test_threshold_two_headings_builds_both_views() {
        let html = r#"<body><div class="post-content"><h2>A</h2><h2>B</h2></div></body>"#;
        let toc = Toc::mount_page(html, &TocbarConfig::default(), ManualClock::new())
            .unwrap()
            .unwrap();
        assert_eq!(toc.sidebar().links().len(), 2);
        assert_eq!(toc.drawer().links().len(), 2);

        let markup = toc.render_markup().unwrap();
        assert!(markup.contains("toc-sidebar"));
        assert!(markup.contains("toc-mobile-trigger"));
        assert!(markup.contains("toc-mobile-drawer"));
    }

    #[test]
    fn test_attach_runs_initial_pass() {
        let (mut toc, _, mut layout) = mounted();
        layout.scroll_y = 2100.0;

        let effects = toc.attach(&layout);
        assert_eq!(
            effects,
            vec![Effect::BodyClass {
                class: "has-toc",
                on: true
            }]
        );
        assert!(toc.state().visible);
        assert_eq!(toc.state().active, Some(1));
    }

    #[test]
    fn test_scroll_defers_writes_to_frame() {
        let (mut toc, clock, mut layout) = mounted();
        toc.attach(&layout);

        clock.set(ms(200));
        layout.scroll_y = 2100.0;
        assert_eq!(toc.on_scroll(&layout), vec![Effect::RequestFrame]);
        assert_eq!(toc.state().active, None);

        toc.on_frame(&layout);
        assert_eq!(toc.state().active, Some(1));
    }

    #[test]
    fn test_scroll_burst_yields_one_trailing_update() {
        let (mut toc, clock, mut layout) = mounted();
        toc.attach(&layout);

        clock.set(ms(30));
        layout.scroll_y = 1500.0;
        assert_eq!(toc.on_scroll(&layout), vec![Effect::ArmTimer { at: ms(100) }]);
        clock.set(ms(60));
        layout.scroll_y = 3000.0;
        assert!(toc.on_scroll(&layout).is_empty());
        assert_eq!(toc.next_deadline(), Some(ms(100)));

        clock.set(ms(100));
        assert_eq!(toc.on_timer(&layout), vec![Effect::RequestFrame]);
        toc.on_frame(&layout);
        // The trailing run reads the latest position
        assert_eq!(toc.state().active, Some(2));
        assert_eq!(toc.next_deadline(), None);
    }

    #[test]
    fn test_unchanged_scroll_adds_no_mutations() {
        let (mut toc, clock, mut layout) = mounted();
        layout.scroll_y = 2500.0;
        toc.attach(&layout);
        let before = toc.mutations();

        clock.set(ms(500));
        toc.on_scroll(&layout);
        assert!(toc.on_frame(&layout).is_empty());
        assert_eq!(toc.mutations(), before);
    }

    #[test]
    fn test_trigger_opens_and_syncs_drawer() {
        let (mut toc, clock, mut layout) = mounted();
        layout.scroll_y = 3000.0;
        toc.attach(&layout);
        clock.set(ms(1000));

        let effects = toc.handle(UiEvent::TriggerClick, &layout);
        assert_eq!(
            effects,
            vec![
                Effect::BodyClass {
                    class: "toc-open",
                    on: true
                },
                Effect::ArmTimer { at: ms(1250) },
            ]
        );
        assert!(toc.state().drawer_open);
        assert!(toc.drawer().is_open());
        assert_eq!(toc.drawer().active_href(), Some("#usage"));

        clock.set(ms(1250));
        assert_eq!(
            toc.on_timer(&layout),
            vec![Effect::ScrollList {
                list: ListKind::Drawer,
                top: 30.0
            }]
        );
    }

    #[test]
    fn test_close_paths() {
        let events = [
            UiEvent::OverlayClick,
            UiEvent::CloseClick,
            UiEvent::KeyDown {
                key: "Escape".into(),
            },
        ];
        for event in events {
            let (mut toc, _, layout) = mounted();
            toc.handle(UiEvent::TriggerClick, &layout);
            let effects = toc.handle(event, &layout);
            assert_eq!(
                effects,
                vec![Effect::BodyClass {
                    class: "toc-open",
                    on: false
                }]
            );
            assert!(!toc.drawer().is_open());
            assert_eq!(toc.next_deadline(), None);
        }
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let (mut toc, _, layout) = mounted();
        toc.handle(UiEvent::TriggerClick, &layout);
        let effects = toc.handle(UiEvent::KeyDown { key: "Enter".into() }, &layout);
        assert!(effects.is_empty());
        assert!(toc.drawer().is_open());
    }

    #[test]
    fn test_sidebar_link_click_scrolls_and_records_history() {
        let (mut toc, _, layout) = mounted();
        let effects = toc.handle(
            UiEvent::LinkClick {
                list: ListKind::Sidebar,
                index: 1,
            },
            &layout,
        );
        assert_eq!(
            effects,
            vec![
                Effect::ScrollWindow { top: 1900.0 },
                Effect::PushHistory {
                    href: "#setup".into()
                },
            ]
        );
    }

    #[test]
    fn test_link_click_without_target_does_nothing() {
        let (mut toc, _, _) = mounted();
        let bare = StaticLayout::new(800.0, Span::new(1000.0, 5000.0));
        let sidebar = toc.handle(
            UiEvent::LinkClick {
                list: ListKind::Sidebar,
                index: 1,
            },
            &bare,
        );
        assert!(sidebar.is_empty());

        toc.handle(UiEvent::TriggerClick, &bare);
        let drawer = toc.handle(
            UiEvent::LinkClick {
                list: ListKind::Drawer,
                index: 0,
            },
            &bare,
        );
        assert!(drawer.is_empty());
        assert!(toc.state().drawer_open);
    }

    #[test]
    fn test_drawer_link_click_also_closes() {
        let (mut toc, _, layout) = mounted();
        toc.handle(UiEvent::TriggerClick, &layout);
        let effects = toc.handle(
            UiEvent::LinkClick {
                list: ListKind::Drawer,
                index: 0,
            },
            &layout,
        );
        assert_eq!(effects.len(), 3);
        assert_eq!(effects[0], Effect::ScrollWindow { top: 1000.0 });
        assert!(!toc.drawer().is_open());
    }

    #[test]
    fn test_swipe_threshold() {
        let (mut toc, _, layout) = mounted();
        toc.handle(UiEvent::TriggerClick, &layout);

        toc.handle(UiEvent::TouchStart { y: 500.0 }, &layout);
        toc.handle(UiEvent::TouchMove { y: 580.0 }, &layout);
        assert_eq!(
            toc.drawer().drawer().style("transform"),
            Some("translateY(80px)")
        );
        toc.handle(UiEvent::TouchEnd, &layout);
        assert!(toc.drawer().is_open());
        assert_eq!(toc.drawer().drawer().style("transform"), None);

        toc.handle(UiEvent::TouchStart { y: 500.0 }, &layout);
        toc.handle(UiEvent::TouchMove { y: 620.0 }, &layout);
        let effects = toc.handle(UiEvent::TouchEnd, &layout);
        assert!(!toc.drawer().is_open());
        assert!(!toc.state().drawer_open);
        assert_eq!(
            effects,
            vec![Effect::BodyClass {
                class: "toc-open",
                on: false
            }]
        );
    }

    #[test]
    fn test_effect_and_event_wire_format() {
        let json = serde_json::to_string(&Effect::RevealLink {
            list: ListKind::Sidebar,
            index: 2,
        })
        .unwrap();
        assert_eq!(json, r#"{"effect":"reveal_link","list":"sidebar","index":2}"#);

        let json = serde_json::to_string(&Effect::ArmTimer { at: ms(1250) }).unwrap();
        assert_eq!(json, r#"{"effect":"arm_timer","at":1250}"#);

        let event: UiEvent =
            serde_json::from_str(r#"{"type":"link_click","list":"drawer","index":1}"#).unwrap();
        assert_eq!(
            event,
            UiEvent::LinkClick {
                list: ListKind::Drawer,
                index: 1
            }
        );
    }
}
