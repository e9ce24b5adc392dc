//! Platform event translation.

mod winit;

pub(crate) use self::winit::{committed_text, translate_window_event};
