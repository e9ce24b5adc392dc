use std::fmt;

/// Keyboard key identifier.
///
/// The runtime maps physical key codes into these variants where possible.
/// Unsupported keys become `Key::Unknown(u32)` with a stable platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    // Common control keys
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Shift,
    Control,
    Alt,
    Meta,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Digits
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Function keys
    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    /// Platform-dependent key not yet represented here.
    Unknown(u32),
}

/// Per-key (or per-button) state across frames.
///
/// `Pressed` and `Released` last exactly one frame: [`aged`](Self::aged) turns
/// them into `Held` and `Idle` respectively.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum KeyState {
    #[default]
    Idle,
    /// Went down this frame.
    Pressed,
    /// Down since an earlier frame.
    Held,
    /// Went up this frame.
    Released,
}

impl KeyState {
    #[inline]
    pub fn is_down(self) -> bool {
        matches!(self, KeyState::Pressed | KeyState::Held)
    }

    /// State after one frame boundary.
    #[inline]
    pub fn aged(self) -> Self {
        match self {
            KeyState::Pressed => KeyState::Held,
            KeyState::Released => KeyState::Idle,
            other => other,
        }
    }
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Modifier keys state.
///
/// Stored as booleans rather than bitflags to keep it explicit.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Platform-agnostic input events.
///
/// The runtime translates window system events into these.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    ModifiersChanged(Modifiers),

    Key {
        key: Key,
        pressed: bool,
        /// True when the event is an auto-repeat.
        repeat: bool,
    },

    /// Pointer position in logical pixels.
    PointerMoved { x: f32, y: f32 },
    PointerButton { button: MouseButton, pressed: bool },

    /// Committed text.
    Text(String),

    /// Pointer left the window surface.
    PointerLeft,

    /// Window focus change.
    Focused(bool),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aging_settles_in_two_steps() {
        assert_eq!(KeyState::Pressed.aged(), KeyState::Held);
        assert_eq!(KeyState::Held.aged(), KeyState::Held);
        assert_eq!(KeyState::Released.aged(), KeyState::Idle);
        assert_eq!(KeyState::Idle.aged(), KeyState::Idle);
    }

    #[test]
    fn only_pressed_and_held_are_down() {
        assert!(KeyState::Pressed.is_down());
        assert!(KeyState::Held.is_down());
        assert!(!KeyState::Released.is_down());
        assert!(!KeyState::Idle.is_down());
    }
}
