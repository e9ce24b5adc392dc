//! Ember engine crate.
//!
//! A small OpenGL 3.3 runtime: window and input handling, shader programs with
//! cached uniform locations, textures, cameras and deduplicated indexed meshes.
//! Resource types talk to the GPU only through [`device::Device`].

pub mod device;
pub mod window;
pub mod input;
pub mod core;

pub mod logging;
pub mod camera;
pub mod color;
pub mod mesh;
pub mod shader;
pub mod texture;
pub mod transform;

mod error;

pub use error::{Error, Result};
