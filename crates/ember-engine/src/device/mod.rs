//! Device capability + the OpenGL implementation of it.
//!
//! This module is responsible for:
//! - the `Device` trait consumed by meshes, shaders, textures and cameras
//! - creating the glutin context/surface for a window
//! - `GlDevice`, the glow-backed device
//!
//! The core never issues GL calls directly; it only talks to `Device`.

mod context;
mod gl;
mod init;
#[cfg(test)]
pub(crate) mod mock;

use std::fmt;

use glam::{Mat4, Vec2, Vec3};

use crate::color::GlColor;

pub use context::GlContext;
pub use gl::GlDevice;
pub use init::GlInit;

/// Shader stage kind.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl StageKind {
    /// File extension used for the stage's source file.
    pub fn extension(&self) -> &'static str {
        match self {
            StageKind::Vertex => "vert",
            StageKind::Fragment => "frag",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Vertex => f.write_str("vertex"),
            StageKind::Fragment => f.write_str("fragment"),
        }
    }
}

/// Binding target of a buffer upload.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// One float attribute inside an interleaved vertex.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    pub location: u32,
    /// Number of `f32` components.
    pub components: i32,
    /// Byte offset inside the vertex.
    pub offset: i32,
}

/// Interleaved vertex layout.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexLayout {
    pub stride: i32,
    pub attributes: &'static [VertexAttribute],
}

/// Value written to a uniform location.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2(Vec2),
    Vec3(Vec3),
    Mat4(Mat4),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextureFormat {
    Rgba8,
    Depth24Stencil8,
}

/// Sampling setup applied at texture creation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Sampling {
    /// Repeat wrap, nearest-mipmap-linear min, nearest mag, mipmaps generated.
    Pixelated,
    /// Clamp to edge, linear filtering, no mipmaps. Used for render targets.
    Target,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub sampling: Sampling,
}

/// Graphics device capability.
///
/// Implementations assume their context is current on the calling thread.
/// Allocation failures are reported as diagnostic strings; the core wraps them
/// into [`crate::Error`].
pub trait Device {
    type Buffer: Copy + fmt::Debug;
    type VertexArray: Copy + fmt::Debug;
    type Stage: Copy + fmt::Debug;
    type Program: Copy + fmt::Debug;
    type Location: Clone + fmt::Debug;
    type Texture: Copy + fmt::Debug;
    type Framebuffer: Copy + fmt::Debug;

    fn create_buffer(&mut self) -> Result<Self::Buffer, String>;
    /// Replaces the whole content of `buffer`. Fails when the device cannot
    /// store `data`; the previous content is then undefined.
    fn upload_buffer(&mut self, buffer: Self::Buffer, kind: BufferKind, data: &[u8]) -> Result<(), String>;
    fn delete_buffer(&mut self, buffer: Self::Buffer);

    /// Creates a vertex array binding `vertices`/`indices` with `layout`.
    fn create_vertex_array(
        &mut self,
        vertices: Self::Buffer,
        indices: Self::Buffer,
        layout: &VertexLayout,
    ) -> Result<Self::VertexArray, String>;
    fn delete_vertex_array(&mut self, vertex_array: Self::VertexArray);

    /// Compiles one stage. On failure the stage object is already released and
    /// the compiler log is returned.
    fn compile_stage(&mut self, kind: StageKind, source: &str) -> Result<Self::Stage, String>;
    fn delete_stage(&mut self, stage: Self::Stage);

    /// Links two stages. On failure the program object is already released and
    /// the linker log is returned; the stages stay owned by the caller.
    fn link_program(
        &mut self,
        vertex: Self::Stage,
        fragment: Self::Stage,
    ) -> Result<Self::Program, String>;
    fn delete_program(&mut self, program: Self::Program);
    fn use_program(&mut self, program: Option<Self::Program>);

    /// Returns `None` when the program has no active uniform called `name`.
    fn uniform_location(&mut self, program: Self::Program, name: &str) -> Option<Self::Location>;
    fn set_uniform(&mut self, location: &Self::Location, value: UniformValue);

    fn create_texture(
        &mut self,
        desc: &TextureDesc,
        pixels: Option<&[u8]>,
    ) -> Result<Self::Texture, String>;
    fn delete_texture(&mut self, texture: Self::Texture);
    fn bind_texture(&mut self, unit: u32, texture: Option<Self::Texture>);

    fn create_framebuffer(
        &mut self,
        color: Self::Texture,
        depth_stencil: Self::Texture,
    ) -> Result<Self::Framebuffer, String>;
    fn delete_framebuffer(&mut self, framebuffer: Self::Framebuffer);
    /// `None` binds the window's default framebuffer.
    fn bind_framebuffer(&mut self, framebuffer: Option<Self::Framebuffer>);
    /// Copies the color of `framebuffer` onto the default framebuffer.
    fn blit_framebuffer(
        &mut self,
        framebuffer: Self::Framebuffer,
        source: (u32, u32),
        destination: (u32, u32),
    );

    fn set_viewport(&mut self, width: u32, height: u32);
    /// Clears color and depth of the bound framebuffer.
    fn clear(&mut self, color: GlColor);
    /// Draws `index_count` indices as triangles.
    fn draw_indexed(&mut self, vertex_array: Self::VertexArray, index_count: u32);
}
