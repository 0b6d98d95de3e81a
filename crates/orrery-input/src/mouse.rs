//! Cursor tracking and left-click detection.
//!
//! A click is a left press followed by a release within a drag tolerance of
//! where it went down. The release position is what gets picked.

use glam::Vec2;
use winit::event::{ElementState, MouseButton};

/// Turns press/release pairs into clicks.
#[derive(Debug, Clone, Copy)]
pub struct ClickTracker {
    /// Max cursor travel between press and release, in physical pixels.
    pub drag_tolerance: f32,
    pressed_at: Option<Vec2>,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(4.0)
    }
}

impl ClickTracker {
    pub fn new(drag_tolerance: f32) -> Self {
        Self {
            drag_tolerance,
            pressed_at: None,
        }
    }

    pub fn press(&mut self, position: Vec2) {
        self.pressed_at = Some(position);
    }

    /// Release at `position`; `Some(position)` if it completes a click.
    pub fn release(&mut self, position: Vec2) -> Option<Vec2> {
        let start = self.pressed_at.take()?;
        (start.distance(position) <= self.drag_tolerance).then_some(position)
    }

    /// Forget a pending press (cursor left the window).
    pub fn cancel(&mut self) {
        self.pressed_at = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pressed_at.is_some()
    }
}

/// Cursor position and the clicks completed this frame.
#[derive(Debug, Clone, Default)]
pub struct MouseState {
    position: Vec2,
    cursor_in_window: bool,
    tracker: ClickTracker,
    clicks: Vec<Vec2>,
}

impl MouseState {
    #[must_use]
    pub fn new(drag_tolerance: f32) -> Self {
        Self {
            tracker: ClickTracker::new(drag_tolerance),
            ..Self::default()
        }
    }

    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        self.position = Vec2::new(x as f32, y as f32);
    }

    /// Only the left button picks.
    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => self.tracker.press(self.position),
            ElementState::Released => {
                if let Some(at) = self.tracker.release(self.position) {
                    self.clicks.push(at);
                } else {
                    tracing::trace!(position = ?self.position, "Drag released, not a click");
                }
            }
        }
    }

    pub fn on_cursor_entered(&mut self) {
        self.cursor_in_window = true;
    }

    pub fn on_cursor_left(&mut self) {
        self.cursor_in_window = false;
        self.tracker.cancel();
    }

    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[must_use]
    pub fn is_cursor_in_window(&self) -> bool {
        self.cursor_in_window
    }

    /// Clicks completed since the last clear, oldest first.
    pub fn clicks(&self) -> &[Vec2] {
        &self.clicks
    }

    pub fn clear_transients(&mut self) {
        self.clicks.clear();
    }
}
