//! Drawer controller: open/closed state and the dismiss gesture.

/// Open/closed state of the mobile drawer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DrawerState {
    #[default]
    Closed,
    Open,
}

/// How a finished drag resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    /// Dragged beyond the threshold: close the drawer.
    Dismiss,
    /// Too short: return to the resting position, state unchanged.
    SnapBack,
}

/// Downward drag on the drawer handle.
#[derive(Debug, Clone, Copy)]
pub struct SwipeGesture {
    threshold: f64,
    start: Option<f64>,
    offset: f64,
}

impl SwipeGesture {
    pub const fn new(threshold: f64) -> Self {
        Self {
            threshold,
            start: None,
            offset: 0.0,
        }
    }

    pub fn start(&mut self, y: f64) {
        self.start = Some(y);
        self.offset = 0.0;
    }

    /// Track the finger. Returns the downward offset to render, upward
    /// movement pinned at zero.
    pub fn update(&mut self, y: f64) -> Option<f64> {
        let start = self.start?;
        self.offset = (y - start).max(0.0);
        Some(self.offset)
    }

    pub fn finish(&mut self) -> Option<SwipeOutcome> {
        self.start.take()?;
        let offset = std::mem::take(&mut self.offset);
        Some(if offset > self.threshold {
            SwipeOutcome::Dismiss
        } else {
            SwipeOutcome::SnapBack
        })
    }

    pub const fn is_dragging(&self) -> bool {
        self.start.is_some()
    }
}

/// Owns the drawer state. Transitions report whether they changed anything.
#[derive(Debug, Clone, Copy)]
pub struct DrawerController {
    state: DrawerState,
    swipe: SwipeGesture,
}

impl DrawerController {
    pub const fn new(swipe_threshold: f64) -> Self {
        Self {
            state: DrawerState::Closed,
            swipe: SwipeGesture::new(swipe_threshold),
        }
    }

    pub const fn state(&self) -> DrawerState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DrawerState::Open
    }

    pub fn open(&mut self) -> bool {
        self.transition(DrawerState::Open)
    }

    pub fn close(&mut self) -> bool {
        self.swipe.start = None;
        self.transition(DrawerState::Closed)
    }

    fn transition(&mut self, next: DrawerState) -> bool {
        std::mem::replace(&mut self.state, next) != next
    }

    /// Gestures only start on an open drawer.
    pub fn touch_start(&mut self, y: f64) -> bool {
        if self.is_open() {
            self.swipe.start(y);
        }
        self.swipe.is_dragging()
    }

    pub fn touch_move(&mut self, y: f64) -> Option<f64> {
        self.swipe.update(y)
    }

    /// Closes the drawer on [`SwipeOutcome::Dismiss`].
    pub fn touch_end(&mut self) -> Option<SwipeOutcome> {
        let outcome = self.swipe.finish()?;
        if outcome == SwipeOutcome::Dismiss {
            self.close();
        }
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(controller: &mut DrawerController, distance: f64) -> Option<SwipeOutcome> {
        controller.touch_start(400.0);
        controller.touch_move(400.0 + distance / 2.0);
        controller.touch_move(400.0 + distance);
        controller.touch_end()
    }

    #[test]
    fn test_open_close_transitions() {
        let mut controller = DrawerController::new(100.0);
        assert_eq!(controller.state(), DrawerState::Closed);
        assert!(controller.open());
        assert!(!controller.open());
        assert!(controller.is_open());
        assert!(controller.close());
        assert!(!controller.close());
    }

    #[test]
    fn test_short_swipe_snaps_back() {
        let mut controller = DrawerController::new(100.0);
        controller.open();
        assert_eq!(drag(&mut controller, 80.0), Some(SwipeOutcome::SnapBack));
        assert!(controller.is_open());
    }

    #[test]
    fn test_long_swipe_dismisses() {
        let mut controller = DrawerController::new(100.0);
        controller.open();
        assert_eq!(drag(&mut controller, 120.0), Some(SwipeOutcome::Dismiss));
        assert!(!controller.is_open());
    }

    #[test]
    fn test_swipe_at_threshold_snaps_back() {
        let mut controller = DrawerController::new(100.0);
        controller.open();
        assert_eq!(drag(&mut controller, 100.0), Some(SwipeOutcome::SnapBack));
    }

    #[test]
    fn test_upward_drag_pins_at_zero() {
        let mut gesture = SwipeGesture::new(100.0);
        gesture.start(300.0);
        assert_eq!(gesture.update(250.0), Some(0.0));
        assert_eq!(gesture.update(330.0), Some(30.0));
        assert_eq!(gesture.finish(), Some(SwipeOutcome::SnapBack));
        assert_eq!(gesture.finish(), None);
    }

    #[test]
    fn test_gesture_ignored_while_closed() {
        let mut controller = DrawerController::new(100.0);
        assert!(!controller.touch_start(100.0));
        assert_eq!(controller.touch_move(400.0), None);
        assert_eq!(controller.touch_end(), None);
        assert!(!controller.is_open());
    }

    #[test]
    fn test_close_abandons_drag() {
        let mut controller = DrawerController::new(100.0);
        controller.open();
        controller.touch_start(0.0);
        controller.close();
        assert_eq!(controller.touch_end(), None);
    }
}
