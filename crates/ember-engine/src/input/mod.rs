//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The runtime translates platform events into `InputEvent`s and ages the
//! state once per frame.

pub(crate) mod platform;
mod state;
mod types;

pub use state::{InputState, TEXT_CAPACITY};
pub use types::{InputEvent, Key, KeyState, Modifiers, MouseButton};
