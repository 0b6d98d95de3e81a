//! Key bindings for the control surface and the per-frame input bundle.

use glam::Vec2;
use winit::event::{ElementState, KeyEvent, MouseButton};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::keyboard::{KeyboardState, RawKeyEvent};
use crate::mouse::MouseState;

/// A user command, decoupled from the key that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePause,
    /// 0-based preset slot.
    SpeedPreset(usize),
    ToggleQuality,
    ClearSelection,
}

/// Fixed bindings: Space, 1–4, Q, Escape.
pub fn command_for_key(key: PhysicalKey) -> Option<Command> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    Some(match code {
        KeyCode::Space => Command::TogglePause,
        KeyCode::Digit1 | KeyCode::Numpad1 => Command::SpeedPreset(0),
        KeyCode::Digit2 | KeyCode::Numpad2 => Command::SpeedPreset(1),
        KeyCode::Digit3 | KeyCode::Numpad3 => Command::SpeedPreset(2),
        KeyCode::Digit4 | KeyCode::Numpad4 => Command::SpeedPreset(3),
        KeyCode::KeyQ => Command::ToggleQuality,
        KeyCode::Escape => Command::ClearSelection,
        _ => return None,
    })
}

/// Keyboard and mouse state for one window.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub keyboard: KeyboardState,
    pub mouse: MouseState,
}

impl InputState {
    pub fn new(drag_tolerance: f32) -> Self {
        Self {
            keyboard: KeyboardState::new(),
            mouse: MouseState::new(drag_tolerance),
        }
    }

    pub fn on_key(&mut self, event: &KeyEvent) {
        self.keyboard.process_event(event);
    }

    pub fn on_raw_key(&mut self, event: RawKeyEvent) {
        self.keyboard.process_raw(event);
    }

    pub fn on_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        self.mouse.on_button(button, state);
    }

    /// Commands from keys pressed this frame, in press order.
    pub fn commands(&self) -> Vec<Command> {
        self.keyboard
            .pressed_this_frame()
            .iter()
            .filter_map(|&key| command_for_key(key))
            .collect()
    }

    pub fn clicks(&self) -> &[Vec2] {
        self.mouse.clicks()
    }

    /// Call once the frame has consumed commands and clicks.
    pub fn end_frame(&mut self) {
        self.keyboard.clear_transients();
        self.mouse.clear_transients();
    }
}
