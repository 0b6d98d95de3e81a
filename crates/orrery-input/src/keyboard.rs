//! Frame-coherent keyboard state.
//!
//! Keys are tracked by physical code so the digit-row speed presets sit in the
//! same place on every layout.

use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::PhysicalKey;

/// The parts of a [`KeyEvent`] the tracker needs; constructible in tests.
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    pub key: PhysicalKey,
    pub state: ElementState,
    pub repeat: bool,
}

impl From<&KeyEvent> for RawKeyEvent {
    fn from(event: &KeyEvent) -> Self {
        Self {
            key: event.physical_key,
            state: event.state,
            repeat: event.repeat,
        }
    }
}

/// Held keys plus the keys that went down this frame, in press order.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<PhysicalKey>,
    pressed_this_frame: Vec<PhysicalKey>,
}

impl KeyboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_event(&mut self, event: &KeyEvent) {
        self.process_raw(RawKeyEvent::from(event));
    }

    /// Auto-repeat is ignored so a held Space toggles pause once.
    pub fn process_raw(&mut self, event: RawKeyEvent) {
        if event.repeat {
            return;
        }
        match event.state {
            ElementState::Pressed => {
                if self.held.insert(event.key) {
                    self.pressed_this_frame.push(event.key);
                }
            }
            ElementState::Released => {
                self.held.remove(&event.key);
            }
        }
    }

    #[must_use]
    pub fn is_pressed(&self, key: PhysicalKey) -> bool {
        self.held.contains(&key)
    }

    #[must_use]
    pub fn just_pressed(&self, key: PhysicalKey) -> bool {
        self.pressed_this_frame.contains(&key)
    }

    /// Keys that went down since the last [`clear_transients`](Self::clear_transients).
    pub fn pressed_this_frame(&self) -> &[PhysicalKey] {
        &self.pressed_this_frame
    }

    /// Drop every held key, e.g. when the window loses focus and releases
    /// will never arrive.
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn clear_transients(&mut self) {
        self.pressed_this_frame.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::KeyCode;

    fn raw(code: KeyCode, state: ElementState, repeat: bool) -> RawKeyEvent {
        RawKeyEvent {
            key: PhysicalKey::Code(code),
            state,
            repeat,
        }
    }

    #[test]
    fn test_press_is_reported_once_per_frame() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::Space, ElementState::Pressed, false));
        let space = PhysicalKey::Code(KeyCode::Space);
        assert!(kb.is_pressed(space));
        assert!(kb.just_pressed(space));
        kb.clear_transients();
        assert!(!kb.just_pressed(space));
        assert!(kb.is_pressed(space));
    }

    #[test]
    fn test_repeat_does_not_retrigger() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::Space, ElementState::Pressed, false));
        kb.clear_transients();
        kb.process_raw(raw(KeyCode::Space, ElementState::Pressed, true));
        assert!(kb.pressed_this_frame().is_empty());
    }

    #[test]
    fn test_press_order_is_kept() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::Digit3, ElementState::Pressed, false));
        kb.process_raw(raw(KeyCode::KeyQ, ElementState::Pressed, false));
        assert_eq!(
            kb.pressed_this_frame(),
            &[
                PhysicalKey::Code(KeyCode::Digit3),
                PhysicalKey::Code(KeyCode::KeyQ)
            ]
        );
    }

    #[test]
    fn test_release_and_repress_in_one_frame() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::Escape, ElementState::Pressed, false));
        kb.process_raw(raw(KeyCode::Escape, ElementState::Released, false));
        assert!(!kb.is_pressed(PhysicalKey::Code(KeyCode::Escape)));
        assert!(kb.just_pressed(PhysicalKey::Code(KeyCode::Escape)));
    }

    #[test]
    fn test_release_all_forgets_held_keys() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyQ, ElementState::Pressed, false));
        kb.release_all();
        assert!(!kb.is_pressed(PhysicalKey::Code(KeyCode::KeyQ)));
        kb.clear_transients();
        kb.process_raw(raw(KeyCode::KeyQ, ElementState::Pressed, false));
        assert!(kb.just_pressed(PhysicalKey::Code(KeyCode::KeyQ)));
    }
}
