//! Recording `Device` used by unit tests.

use std::collections::{HashMap, HashSet};

use crate::color::GlColor;

use super::{BufferKind, Device, StageKind, TextureDesc, UniformValue, VertexLayout};

#[derive(Debug, Default)]
pub(crate) struct MockDevice {
    next_id: u32,

    pub buffers: HashSet<u32>,
    pub vertex_arrays: HashSet<u32>,
    pub stages: HashSet<u32>,
    pub programs: HashSet<u32>,
    pub textures: HashSet<u32>,
    pub framebuffers: HashSet<u32>,

    /// Last upload per buffer.
    pub uploads: HashMap<u32, (BufferKind, Vec<u8>)>,
    pub upload_count: usize,

    /// Uniform names every program reports as absent.
    pub missing_uniforms: HashSet<String>,
    uniform_slots: HashMap<String, i32>,
    pub location_queries: Vec<String>,
    pub uniform_sets: Vec<(i32, UniformValue)>,

    pub bound_program: Option<u32>,
    pub bound_textures: HashMap<u32, Option<u32>>,
    pub bound_framebuffer: Option<u32>,
    pub draws: Vec<(u32, u32)>,
    pub clears: Vec<GlColor>,
    pub blits: Vec<(u32, (u32, u32), (u32, u32))>,

    pub fail_stage: Option<StageKind>,
    pub fail_link: bool,
    pub fail_alloc: bool,
    pub fail_upload: bool,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_uniform(mut self, name: &str) -> Self {
        self.missing_uniforms.insert(name.to_string());
        self
    }

    /// Total number of live device objects of any kind.
    pub fn live_objects(&self) -> usize {
        self.buffers.len()
            + self.vertex_arrays.len()
            + self.stages.len()
            + self.programs.len()
            + self.textures.len()
            + self.framebuffers.len()
    }

    pub fn location_of(&self, name: &str) -> Option<i32> {
        self.uniform_slots.get(name).copied()
    }

    fn alloc(&mut self) -> Result<u32, String> {
        if self.fail_alloc {
            return Err("out of memory".to_string());
        }
        self.next_id += 1;
        Ok(self.next_id)
    }
}

impl Device for MockDevice {
    type Buffer = u32;
    type VertexArray = u32;
    type Stage = u32;
    type Program = u32;
    type Location = i32;
    type Texture = u32;
    type Framebuffer = u32;

    fn create_buffer(&mut self) -> Result<u32, String> {
        let id = self.alloc()?;
        self.buffers.insert(id);
        Ok(id)
    }

    fn upload_buffer(&mut self, buffer: u32, kind: BufferKind, data: &[u8]) -> Result<(), String> {
        assert!(self.buffers.contains(&buffer), "upload to dead buffer {buffer}");
        if self.fail_upload {
            return Err("out of memory".to_string());
        }
        self.uploads.insert(buffer, (kind, data.to_vec()));
        self.upload_count += 1;
        Ok(())
    }

    fn delete_buffer(&mut self, buffer: u32) {
        self.buffers.remove(&buffer);
        self.uploads.remove(&buffer);
    }

    fn create_vertex_array(
        &mut self,
        vertices: u32,
        indices: u32,
        _layout: &VertexLayout,
    ) -> Result<u32, String> {
        assert!(self.buffers.contains(&vertices) && self.buffers.contains(&indices));
        let id = self.alloc()?;
        self.vertex_arrays.insert(id);
        Ok(id)
    }

    fn delete_vertex_array(&mut self, vertex_array: u32) {
        self.vertex_arrays.remove(&vertex_array);
    }

    fn compile_stage(&mut self, kind: StageKind, source: &str) -> Result<u32, String> {
        if self.fail_stage == Some(kind) || source.trim().is_empty() {
            return Err(format!("0:1(1): error: bad {kind} source"));
        }
        let id = self.alloc()?;
        self.stages.insert(id);
        Ok(id)
    }

    fn delete_stage(&mut self, stage: u32) {
        self.stages.remove(&stage);
    }

    fn link_program(&mut self, vertex: u32, fragment: u32) -> Result<u32, String> {
        assert!(self.stages.contains(&vertex) && self.stages.contains(&fragment));
        if self.fail_link {
            return Err("error: unresolved varying".to_string());
        }
        let id = self.alloc()?;
        self.programs.insert(id);
        Ok(id)
    }

    fn delete_program(&mut self, program: u32) {
        self.programs.remove(&program);
        if self.bound_program == Some(program) {
            self.bound_program = None;
        }
    }

    fn use_program(&mut self, program: Option<u32>) {
        self.bound_program = program;
    }

    fn uniform_location(&mut self, program: u32, name: &str) -> Option<i32> {
        self.location_queries.push(name.to_string());
        if !self.programs.contains(&program) || self.missing_uniforms.contains(name) {
            return None;
        }
        let next = self.uniform_slots.len() as i32;
        Some(*self.uniform_slots.entry(name.to_string()).or_insert(next))
    }

    fn set_uniform(&mut self, location: &i32, value: UniformValue) {
        self.uniform_sets.push((*location, value));
    }

    fn create_texture(&mut self, _desc: &TextureDesc, _pixels: Option<&[u8]>) -> Result<u32, String> {
        let id = self.alloc()?;
        self.textures.insert(id);
        Ok(id)
    }

    fn delete_texture(&mut self, texture: u32) {
        self.textures.remove(&texture);
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<u32>) {
        self.bound_textures.insert(unit, texture);
    }

    fn create_framebuffer(&mut self, color: u32, depth_stencil: u32) -> Result<u32, String> {
        assert!(self.textures.contains(&color) && self.textures.contains(&depth_stencil));
        let id = self.alloc()?;
        self.framebuffers.insert(id);
        Ok(id)
    }

    fn delete_framebuffer(&mut self, framebuffer: u32) {
        self.framebuffers.remove(&framebuffer);
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<u32>) {
        self.bound_framebuffer = framebuffer;
    }

    fn blit_framebuffer(&mut self, framebuffer: u32, source: (u32, u32), destination: (u32, u32)) {
        self.blits.push((framebuffer, source, destination));
    }

    fn set_viewport(&mut self, _width: u32, _height: u32) {}

    fn clear(&mut self, color: GlColor) {
        self.clears.push(color);
    }

    fn draw_indexed(&mut self, vertex_array: u32, index_count: u32) {
        self.draws.push((vertex_array, index_count));
    }
}
