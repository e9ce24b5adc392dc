use glow::{HasContext, PixelUnpackData};

use crate::color::GlColor;

use super::{
    BufferKind, Device, GlInit, Sampling, StageKind, TextureDesc, TextureFormat, UniformValue,
    VertexLayout,
};

/// `Device` backed by a `glow` function table.
///
/// Every call requires the context the table was loaded from to be current on
/// the calling thread. The window runtime guarantees this for frame callbacks.
pub struct GlDevice {
    gl: glow::Context,
}

impl GlDevice {
    /// Wraps a loaded GL function table and applies the global state in `init`.
    pub fn new(mut gl: glow::Context, init: &GlInit) -> Self {
        // SAFETY: the caller hands over a table whose context is current.
        unsafe {
            log::info!(
                "OpenGL: {} / {} / {}",
                gl.get_parameter_string(glow::VENDOR),
                gl.get_parameter_string(glow::RENDERER),
                gl.get_parameter_string(glow::VERSION),
            );

            if init.debug && gl.supports_debug() {
                gl.enable(glow::DEBUG_OUTPUT);
                gl.enable(glow::DEBUG_OUTPUT_SYNCHRONOUS);
                gl.debug_message_callback(|source, kind, id, severity, message| {
                    log::debug!(
                        "[OpenGL] (source {source}) (type {kind}) (id {id}) (severity {severity}) {message}"
                    );
                });
            }

            if init.depth_test {
                gl.enable(glow::DEPTH_TEST);
            }
        }

        Self { gl }
    }

    /// Drains the GL error queue into the log. Returns how many errors were pending.
    pub fn log_errors(&self) -> usize {
        let mut count = 0;
        loop {
            // SAFETY: context current (type invariant).
            let err = unsafe { self.gl.get_error() };
            if err == glow::NO_ERROR {
                break;
            }
            log::warn!("OpenGL error: 0x{err:04x}");
            count += 1;
        }
        count
    }

    /// Raw function table, for calls the `Device` trait does not cover.
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }
}

// Index data goes through the copy-write target so uploads never touch the
// element binding of whichever vertex array is bound.
fn buffer_target(kind: BufferKind) -> u32 {
    match kind {
        BufferKind::Vertex => glow::ARRAY_BUFFER,
        BufferKind::Index => glow::COPY_WRITE_BUFFER,
    }
}

impl Device for GlDevice {
    type Buffer = glow::Buffer;
    type VertexArray = glow::VertexArray;
    type Stage = glow::Shader;
    type Program = glow::Program;
    type Location = glow::UniformLocation;
    type Texture = glow::Texture;
    type Framebuffer = glow::Framebuffer;

    fn create_buffer(&mut self) -> Result<Self::Buffer, String> {
        unsafe { self.gl.create_buffer() }
    }

    fn upload_buffer(
        &mut self,
        buffer: Self::Buffer,
        kind: BufferKind,
        data: &[u8],
    ) -> Result<(), String> {
        let target = buffer_target(kind);
        // Pending errors belong to earlier calls.
        self.log_errors();
        let err = unsafe {
            self.gl.bind_buffer(target, Some(buffer));
            self.gl.buffer_data_u8_slice(target, data, glow::DYNAMIC_DRAW);
            let err = self.gl.get_error();
            self.gl.bind_buffer(target, None);
            err
        };

        match err {
            glow::NO_ERROR => Ok(()),
            glow::OUT_OF_MEMORY => Err(format!("out of memory uploading {} bytes", data.len())),
            other => Err(format!("buffer upload failed (0x{other:04x})")),
        }
    }

    fn delete_buffer(&mut self, buffer: Self::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) }
    }

    fn create_vertex_array(
        &mut self,
        vertices: Self::Buffer,
        indices: Self::Buffer,
        layout: &VertexLayout,
    ) -> Result<Self::VertexArray, String> {
        unsafe {
            let vao = self.gl.create_vertex_array()?;
            self.gl.bind_vertex_array(Some(vao));
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(vertices));
            self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(indices));

            for attr in layout.attributes {
                self.gl.enable_vertex_attrib_array(attr.location);
                self.gl.vertex_attrib_pointer_f32(
                    attr.location,
                    attr.components,
                    glow::FLOAT,
                    false,
                    layout.stride,
                    attr.offset,
                );
            }

            self.gl.bind_vertex_array(None);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
            self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);
            Ok(vao)
        }
    }

    fn delete_vertex_array(&mut self, vertex_array: Self::VertexArray) {
        unsafe { self.gl.delete_vertex_array(vertex_array) }
    }

    fn compile_stage(&mut self, kind: StageKind, source: &str) -> Result<Self::Stage, String> {
        let ty = match kind {
            StageKind::Vertex => glow::VERTEX_SHADER,
            StageKind::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe {
            let shader = self.gl.create_shader(ty)?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(log);
            }
            Ok(shader)
        }
    }

    fn delete_stage(&mut self, stage: Self::Stage) {
        unsafe { self.gl.delete_shader(stage) }
    }

    fn link_program(
        &mut self,
        vertex: Self::Stage,
        fragment: Self::Stage,
    ) -> Result<Self::Program, String> {
        unsafe {
            let program = self.gl.create_program()?;
            self.gl.attach_shader(program, vertex);
            self.gl.attach_shader(program, fragment);
            self.gl.link_program(program);
            if !self.gl.get_program_link_status(program) {
                let log = self.gl.get_program_info_log(program);
                self.gl.detach_shader(program, vertex);
                self.gl.detach_shader(program, fragment);
                self.gl.delete_program(program);
                return Err(log);
            }
            Ok(program)
        }
    }

    fn delete_program(&mut self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn use_program(&mut self, program: Option<Self::Program>) {
        unsafe { self.gl.use_program(program) }
    }

    fn uniform_location(&mut self, program: Self::Program, name: &str) -> Option<Self::Location> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn set_uniform(&mut self, location: &Self::Location, value: UniformValue) {
        let loc = Some(location);
        unsafe {
            match value {
                UniformValue::Float(v) => self.gl.uniform_1_f32(loc, v),
                UniformValue::Int(v) => self.gl.uniform_1_i32(loc, v),
                UniformValue::Vec2(v) => self.gl.uniform_2_f32(loc, v.x, v.y),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32(loc, v.x, v.y, v.z),
                UniformValue::Mat4(m) => {
                    self.gl
                        .uniform_matrix_4_f32_slice(loc, false, &m.to_cols_array())
                }
            }
        }
    }

    fn create_texture(
        &mut self,
        desc: &TextureDesc,
        pixels: Option<&[u8]>,
    ) -> Result<Self::Texture, String> {
        let (internal, format, ty) = match desc.format {
            TextureFormat::Rgba8 => (glow::RGBA8, glow::RGBA, glow::UNSIGNED_BYTE),
            TextureFormat::Depth24Stencil8 => (
                glow::DEPTH24_STENCIL8,
                glow::DEPTH_STENCIL,
                glow::UNSIGNED_INT_24_8,
            ),
        };
        let (wrap, min, mag, mipmaps) = match desc.sampling {
            Sampling::Pixelated => (
                glow::REPEAT,
                glow::NEAREST_MIPMAP_LINEAR,
                glow::NEAREST,
                true,
            ),
            Sampling::Target => (glow::CLAMP_TO_EDGE, glow::LINEAR, glow::LINEAR, false),
        };

        unsafe {
            let texture = self.gl.create_texture()?;
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, wrap as i32);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, wrap as i32);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, min as i32);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, mag as i32);
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal as i32,
                desc.width as i32,
                desc.height as i32,
                0,
                format,
                ty,
                PixelUnpackData::Slice(pixels),
            );
            if mipmaps {
                self.gl.generate_mipmap(glow::TEXTURE_2D);
            }
            self.gl.bind_texture(glow::TEXTURE_2D, None);
            Ok(texture)
        }
    }

    fn delete_texture(&mut self, texture: Self::Texture) {
        unsafe { self.gl.delete_texture(texture) }
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<Self::Texture>) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, texture);
        }
    }

    fn create_framebuffer(
        &mut self,
        color: Self::Texture,
        depth_stencil: Self::Texture,
    ) -> Result<Self::Framebuffer, String> {
        unsafe {
            let fb = self.gl.create_framebuffer()?;
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fb));
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(color),
                0,
            );
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::DEPTH_STENCIL_ATTACHMENT,
                glow::TEXTURE_2D,
                Some(depth_stencil),
                0,
            );
            let status = self.gl.check_framebuffer_status(glow::FRAMEBUFFER);
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);

            if status != glow::FRAMEBUFFER_COMPLETE {
                self.gl.delete_framebuffer(fb);
                return Err(format!("framebuffer incomplete (status 0x{status:04x})"));
            }
            Ok(fb)
        }
    }

    fn delete_framebuffer(&mut self, framebuffer: Self::Framebuffer) {
        unsafe { self.gl.delete_framebuffer(framebuffer) }
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<Self::Framebuffer>) {
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, framebuffer) }
    }

    fn blit_framebuffer(
        &mut self,
        framebuffer: Self::Framebuffer,
        source: (u32, u32),
        destination: (u32, u32),
    ) {
        unsafe {
            self.gl
                .bind_framebuffer(glow::READ_FRAMEBUFFER, Some(framebuffer));
            self.gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, None);
            self.gl.blit_framebuffer(
                0,
                0,
                source.0 as i32,
                source.1 as i32,
                0,
                0,
                destination.0 as i32,
                destination.1 as i32,
                glow::COLOR_BUFFER_BIT,
                glow::LINEAR,
            );
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        unsafe { self.gl.viewport(0, 0, width as i32, height as i32) }
    }

    fn clear(&mut self, color: GlColor) {
        unsafe {
            self.gl.clear_color(color.r, color.g, color.b, color.a);
            self.gl
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    fn draw_indexed(&mut self, vertex_array: Self::VertexArray, index_count: u32) {
        unsafe {
            self.gl.bind_vertex_array(Some(vertex_array));
            self.gl.draw_elements(
                glow::TRIANGLES,
                index_count as i32,
                glow::UNSIGNED_INT,
                0,
            );
        }
    }
}
