use std::collections::HashMap;
use std::collections::VecDeque;

use super::types::{InputEvent, Key, KeyState, Modifiers, MouseButton};

/// Committed characters kept between two [`InputState::take_text`] calls.
pub const TEXT_CAPACITY: usize = 254;

/// Current input state for a single window.
///
/// Events are applied as they arrive; [`age_frame`](Self::age_frame) is called
/// once per presented frame so that `Pressed`/`Released` last a single frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current modifier state.
    pub modifiers: Modifiers,

    /// Whether the window is focused.
    pub focused: bool,

    /// Pointer position in logical pixels.
    pub pointer_pos: Option<(f32, f32)>,

    /// Non-idle keys only.
    keys: HashMap<Key, KeyState>,
    buttons: HashMap<MouseButton, KeyState>,

    text: VecDeque<char>,
}

impl InputState {
    /// Applies a platform-agnostic input event.
    pub fn apply_event(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = m;
            }

            InputEvent::Focused(f) => {
                self.focused = f;
                if !f {
                    // Release everything held; no release event arrives once focus is gone.
                    release_all(&mut self.keys);
                    release_all(&mut self.buttons);
                }
            }

            InputEvent::PointerMoved { x, y } => {
                self.pointer_pos = Some((x, y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key { repeat: true, .. } => {}

            InputEvent::Key { key, pressed, .. } => {
                transition(&mut self.keys, key, pressed);
            }

            InputEvent::PointerButton { button, pressed } => {
                transition(&mut self.buttons, button, pressed);
            }

            InputEvent::Text(text) => {
                for c in text.chars().filter(char::is_ascii) {
                    self.push_char(c);
                }
            }
        }
    }

    /// Frame boundary: `Pressed -> Held`, `Released -> Idle`.
    pub fn age_frame(&mut self) {
        age(&mut self.keys);
        age(&mut self.buttons);
    }

    pub fn key_state(&self, key: Key) -> KeyState {
        self.keys.get(&key).copied().unwrap_or_default()
    }

    /// Pressed this frame or held since an earlier one.
    pub fn key_down(&self, key: Key) -> bool {
        self.key_state(key).is_down()
    }

    /// Went down this frame.
    pub fn key_pressed(&self, key: Key) -> bool {
        self.key_state(key) == KeyState::Pressed
    }

    /// Went up this frame.
    pub fn key_released(&self, key: Key) -> bool {
        self.key_state(key) == KeyState::Released
    }

    pub fn button_state(&self, button: MouseButton) -> KeyState {
        self.buttons.get(&button).copied().unwrap_or_default()
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.button_state(button).is_down()
    }

    /// Text typed since the last call, oldest first. Clears the buffer.
    pub fn take_text(&mut self) -> String {
        self.text.drain(..).collect()
    }

    pub fn pending_text_len(&self) -> usize {
        self.text.len()
    }

    fn push_char(&mut self, c: char) {
        if self.text.len() == TEXT_CAPACITY {
            self.text.pop_front();
        }
        self.text.push_back(c);
    }
}

fn transition<K: std::hash::Hash + Eq>(map: &mut HashMap<K, KeyState>, id: K, pressed: bool) {
    let next = if pressed {
        KeyState::Pressed
    } else {
        KeyState::Released
    };
    map.insert(id, next);
}

fn age<K>(map: &mut HashMap<K, KeyState>) {
    map.retain(|_, state| {
        *state = state.aged();
        *state != KeyState::Idle
    });
}

fn release_all<K>(map: &mut HashMap<K, KeyState>) {
    for state in map.values_mut() {
        if state.is_down() {
            *state = KeyState::Released;
        }
    }
}
