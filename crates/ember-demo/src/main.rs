use std::path::Path;

use anyhow::Result;
use glam::{Vec2, Vec3};
use winit::dpi::{LogicalSize, PhysicalSize};

use ember_engine::camera::Camera;
use ember_engine::color::{GlColor, Rgba};
use ember_engine::core::{App, AppControl, FrameCtx};
use ember_engine::device::GlDevice;
use ember_engine::input::Key;
use ember_engine::logging::{LoggingConfig, init_logging};
use ember_engine::mesh::{Mesh, Vertex};
use ember_engine::shader::ShaderProgram;
use ember_engine::texture::Texture;
use ember_engine::transform::Transform;
use ember_engine::window::{Runtime, WindowConfig};

const MOVE_SPEED: f32 = 0.05;
const TURN_SPEED: f32 = 0.02;
const SPIN_SPEED: f32 = 0.01;

struct Scene {
    program: ShaderProgram<GlDevice>,
    mesh: Mesh<GlDevice>,
    texture: Texture<GlDevice>,
    camera: Camera<GlDevice>,
}

#[derive(Default)]
struct Demo {
    scene: Option<Scene>,
    cube: Transform,
    typed: String,
}

impl App for Demo {
    fn on_start(&mut self, device: &mut GlDevice, size: PhysicalSize<u32>) -> Result<()> {
        let base = Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders/basic");
        let program = ShaderProgram::load(device, &base)?;

        let mut mesh = Mesh::new(device)?;
        mesh.append_batch(device, cube_vertices())?;
        log::info!(
            "cube: {} indices over {} unique vertices",
            mesh.index_len(),
            mesh.unique_len()
        );

        let texture = Texture::from_rgba(device, 8, 8, &checkerboard(8))?;

        let mut camera = Camera::perspective(60.0, aspect(size), 0.1, 100.0);
        camera.transform.position = Vec3::new(0.0, 0.0, 4.0);
        camera.attach_target(device, size.width.max(1), size.height.max(1))?;

        self.scene = Some(Scene {
            program,
            mesh,
            texture,
            camera,
        });
        Ok(())
    }

    fn on_resize(&mut self, device: &mut GlDevice, size: PhysicalSize<u32>) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        scene.camera.set_aspect(aspect(size));
        if let Err(e) = scene.camera.resize_target(device, size.width, size.height) {
            log::error!("failed to resize render target: {e}");
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        if ctx.input.key_pressed(Key::Escape) {
            return AppControl::Exit;
        }

        let text = ctx.input.take_text();
        if !text.is_empty() {
            self.typed.push_str(&text);
            ctx.window.set_title(&format!("ember - {}", self.typed));
        }
        if ctx.input.key_pressed(Key::F1) {
            ctx.window.set_size(1280.0, 720.0);
        }

        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Continue;
        };

        steer(&mut scene.camera, ctx);
        self.cube.rotation += Vec3::new(SPIN_SPEED * 0.5, SPIN_SPEED, 0.0);

        if let Err(e) = ctx.render_to(&scene.camera) {
            log::error!("cannot bind camera target: {e}");
            return AppControl::Exit;
        }

        let drawn = scene.mesh.draw(
            ctx.device,
            &mut scene.program,
            &scene.camera,
            &self.cube,
            Some(&scene.texture),
        );
        if let Err(e) = drawn {
            log::error!("draw failed: {e}");
            return AppControl::Exit;
        }

        AppControl::Continue
    }

    fn on_exit(&mut self, device: &mut GlDevice) {
        if let Some(mut scene) = self.scene.take() {
            scene.mesh.destroy(device);
            scene.program.destroy(device);
            scene.texture.destroy(device);
            scene.camera.destroy(device);
        }
    }
}

fn steer(camera: &mut Camera<GlDevice>, ctx: &FrameCtx<'_>) {
    let input = &*ctx.input;
    let forward = camera.forward();
    let right = camera.right();
    let t = &mut camera.transform;

    if input.key_down(Key::W) {
        t.position -= forward * MOVE_SPEED;
    }
    if input.key_down(Key::S) {
        t.position += forward * MOVE_SPEED;
    }
    if input.key_down(Key::A) {
        t.position -= right * MOVE_SPEED;
    }
    if input.key_down(Key::D) {
        t.position += right * MOVE_SPEED;
    }
    if input.key_down(Key::ArrowLeft) {
        t.rotation.y -= TURN_SPEED;
    }
    if input.key_down(Key::ArrowRight) {
        t.rotation.y += TURN_SPEED;
    }
}

fn aspect(size: PhysicalSize<u32>) -> f32 {
    size.width.max(1) as f32 / size.height.max(1) as f32
}

/// Six faces, two triangles each. Shared corners within a face deduplicate,
/// so 36 appends leave 24 unique vertices.
fn cube_vertices() -> Vec<Vertex> {
    let faces: [(Vec3, Vec3, Vec3, Rgba); 6] = [
        (Vec3::Z, Vec3::X, Vec3::Y, Rgba::new(255, 120, 120, 255)),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y, Rgba::new(120, 255, 120, 255)),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y, Rgba::new(120, 120, 255, 255)),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y, Rgba::new(255, 255, 120, 255)),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z, Rgba::new(255, 120, 255, 255)),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z, Rgba::new(120, 255, 255, 255)),
    ];

    let mut out = Vec::with_capacity(36);
    for (normal, u, v, color) in faces {
        let corner = |s: f32, t: f32| {
            let position = (normal + u * (s * 2.0 - 1.0) + v * (t * 2.0 - 1.0)) * 0.5;
            Vertex::new(position, Vec2::new(s, t), color)
        };
        let (a, b, c, d) = (corner(0.0, 0.0), corner(1.0, 0.0), corner(1.0, 1.0), corner(0.0, 1.0));
        out.extend([a, b, c, a, c, d]);
    }
    out
}

fn checkerboard(cells: u32) -> Vec<u8> {
    (0..cells * cells)
        .flat_map(|i| {
            let light = (i % cells + i / cells) % 2 == 0;
            let c = if light { Rgba::WHITE } else { Rgba::new(90, 90, 90, 255) };
            [c.r, c.g, c.b, c.a]
        })
        .collect()
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = WindowConfig {
        title: "ember".to_string(),
        size: LogicalSize::new(960.0, 640.0),
        clear_color: GlColor::new(0.1, 0.1, 0.12, 1.0),
        ..WindowConfig::default()
    };

    Runtime::run(config, Demo::default())
}
