//! Shader programs and their uniform-location cache.

mod cache;
mod program;

pub use crate::device::UniformValue;
pub use cache::UniformCache;
pub use program::ShaderProgram;
