//! Scroll script replay for the `trace` command.
//!
//! A script is a [`StaticLayout`] plus timed steps. Each step may move the
//! page, resize the viewport and deliver one [`UiEvent`]. The replay honours
//! the component's contract the way a browser host would: due timers fire
//! before the step, and a requested frame runs right after the call that
//! asked for it.
//!
//! # Example
//! ```json
//! {
//!   "layout": { "viewport_height": 800, "article": { "top": 1000, "bottom": 5000 },
//!               "headings": { "intro": 1100, "usage": 2400 } },
//!   "steps": [
//!     { "at": 0, "scroll": 950 },
//!     { "at": 40, "scroll": 2400 },
//!     { "at": 300, "event": { "type": "trigger_click" } }
//!   ]
//! }
//! ```

use crate::config::TocbarConfig;
use crate::toc::{Clock, Effect, Layout, ManualClock, StaticLayout, Toc, UiEvent};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{rc::Rc, time::Duration};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraceScript {
    pub layout: StaticLayout,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    /// Milliseconds since mount.
    pub at: u64,
    #[serde(default)]
    pub scroll: Option<f64>,
    #[serde(default)]
    pub viewport_height: Option<f64>,
    #[serde(default)]
    pub event: Option<UiEvent>,
}

/// Component state after one step.
#[derive(Debug, Clone, Serialize)]
pub struct TraceRecord {
    pub at: u64,
    pub scroll_y: f64,
    pub active: Option<usize>,
    pub visible: bool,
    pub progress: f64,
    pub drawer_open: bool,
    pub mutations: usize,
    pub effects: Vec<Effect>,
}

/// Replay `script` against `html`. `Ok(None)` when the page has no TOC.
pub fn run_trace(
    html: &str,
    config: &TocbarConfig,
    script: TraceScript,
) -> Result<Option<Vec<TraceRecord>>> {
    let clock = Rc::new(ManualClock::new());
    let Some(mut toc) = Toc::mount_page(html, config, Rc::clone(&clock))? else {
        return Ok(None);
    };
    let TraceScript { mut layout, steps } = script;

    let mut records = Vec::with_capacity(steps.len() + 1);
    let effects = toc.attach(&layout);
    records.push(record(&toc, &layout, 0, effects));

    for step in steps {
        let now = Duration::from_millis(step.at);
        let mut effects = Vec::new();

        // Timers due before this step
        while let Some(deadline) = toc.next_deadline().filter(|deadline| *deadline <= now) {
            clock.set(deadline.max(clock.now()));
            let fired = toc.on_timer(&layout);
            run_frames(&mut toc, &layout, fired, &mut effects);
        }
        clock.set(now.max(clock.now()));

        let moved = step.scroll.is_some_and(|y| y != layout.scroll_y)
            || step
                .viewport_height
                .is_some_and(|h| h != layout.viewport_height);
        if let Some(scroll) = step.scroll {
            layout.scroll_y = scroll;
        }
        if let Some(height) = step.viewport_height {
            layout.viewport_height = height;
        }
        if moved {
            let scrolled = toc.on_scroll(&layout);
            run_frames(&mut toc, &layout, scrolled, &mut effects);
        }

        if let Some(event) = step.event {
            let handled = toc.handle(event, &layout);
            run_frames(&mut toc, &layout, handled, &mut effects);
        }

        records.push(record(&toc, &layout, step.at, effects));
    }

    Ok(Some(records))
}

/// Collect `produced`, servicing a requested frame immediately.
fn run_frames(
    toc: &mut Toc<Rc<ManualClock>>,
    layout: &StaticLayout,
    produced: Vec<Effect>,
    effects: &mut Vec<Effect>,
) {
    let wants_frame = produced.contains(&Effect::RequestFrame);
    effects.extend(produced);
    if wants_frame {
        let painted = toc.on_frame(layout);
        effects.extend(painted);
    }
}

fn record(
    toc: &Toc<Rc<ManualClock>>,
    layout: &StaticLayout,
    at: u64,
    effects: Vec<Effect>,
) -> TraceRecord {
    let state = toc.state();
    TraceRecord {
        at,
        scroll_y: layout.scroll_y(),
        active: state.active,
        visible: state.visible,
        progress: state.progress,
        drawer_open: state.drawer_open,
        mutations: toc.mutations(),
        effects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<body><div class="post-content">
        <h2>Intro</h2><h2>Usage</h2><h3>Flags</h3></div></body>"#;

    fn script(steps: &str) -> TraceScript {
        serde_json::from_str(&format!(
            r#"{{
                "layout": {{
                    "viewport_height": 800,
                    "article": {{ "top": 1000, "bottom": 5000 }},
                    "headings": {{ "intro": 1100, "usage": 2400, "flags": 3200 }},
                    "drawer": {{ "viewport_height": 60, "item_height": 30, "item_count": 3 }}
                }},
                "steps": {steps}
            }}"#
        ))
        .unwrap()
    }

    fn trace(steps: &str) -> Vec<TraceRecord> {
        run_trace(PAGE, &TocbarConfig::default(), script(steps))
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_trace_initial_record() {
        let records = trace("[]");
        assert_eq!(records.len(), 1);
        assert!(!records[0].visible);
        assert_eq!(records[0].active, None);
    }

    #[test]
    fn test_trace_scroll_and_trailing_update() {
        let records = trace(
            r#"[
                { "at": 200, "scroll": 950 },
                { "at": 240, "scroll": 2400 },
                { "at": 400 }
            ]"#,
        );

        assert!(records[1].visible);
        assert_eq!(records[1].active, None);
        // Throttled: only the timer is armed
        assert_eq!(records[2].active, None);
        assert!(matches!(records[2].effects[..], [Effect::ArmTimer { .. }]));
        // Trailing run fired at 300 before the step at 400
        assert_eq!(records[3].active, Some(1));
    }

    #[test]
    fn test_trace_drawer_flow() {
        let records = trace(
            r#"[
                { "at": 200, "scroll": 3200 },
                { "at": 300, "event": { "type": "trigger_click" } },
                { "at": 600 },
                { "at": 700, "event": { "type": "key_down", "key": "Escape" } }
            ]"#,
        );

        assert_eq!(records[1].active, Some(2));
        assert!(records[2].drawer_open);
        assert_eq!(
            records[3].effects,
            vec![Effect::ScrollList {
                list: crate::toc::ListKind::Drawer,
                top: 30.0
            }]
        );
        assert!(!records[4].drawer_open);
    }

    #[test]
    fn test_trace_not_applicable() {
        let html = r#"<div class="post-content"><h2>Alone</h2></div>"#;
        let result = run_trace(html, &TocbarConfig::default(), script("[]")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_trace_record_serializes() {
        let records = trace(r#"[{ "at": 200, "scroll": 950 }]"#);
        let json = serde_json::to_string(&records[1]).unwrap();
        assert!(json.starts_with(r#"{"at":200,"scroll_y":950.0,"#));
        assert!(json.contains(r#""effects":[{"effect":"request_frame"}]"#));
    }
}
