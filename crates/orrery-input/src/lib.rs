//! Input for the orrery: frame-coherent keyboard and mouse state, click
//! detection with a drag tolerance, and the key bindings for the control
//! surface.

pub mod commands;
pub mod keyboard;
pub mod mouse;

pub use commands::{Command, InputState, command_for_key};
pub use keyboard::{KeyboardState, RawKeyEvent};
pub use mouse::{ClickTracker, MouseState};
