//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and wires them to the GL context and
//! device.

mod runtime;

pub use runtime::{Runtime, WindowConfig};
