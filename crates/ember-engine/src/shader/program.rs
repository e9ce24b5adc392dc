use std::fs;
use std::path::{Path, PathBuf};

use glam::{Mat4, Vec2, Vec3};

use crate::device::{Device, StageKind, UniformValue};
use crate::error::{Error, Result};

use super::cache::UniformCache;

struct Linked<D: Device> {
    vertex: D::Stage,
    fragment: D::Stage,
    program: D::Program,
}

/// A linked vertex + fragment program and its uniform cache.
///
/// The stages stay attached for the program's lifetime and are released
/// together with it in [`destroy`](Self::destroy).
pub struct ShaderProgram<D: Device> {
    label: String,
    linked: Option<Linked<D>>,
    uniforms: UniformCache<D::Location>,
}

impl<D: Device> ShaderProgram<D> {
    /// Compiles and links `vertex_src` + `fragment_src`.
    ///
    /// Either both stages compile and the program links, or every object
    /// created along the way is released again and the error is returned.
    pub fn from_sources(
        device: &mut D,
        label: impl Into<String>,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Self> {
        let label = label.into();

        let vertex = compile(device, &label, StageKind::Vertex, vertex_src)?;
        let fragment = match compile(device, &label, StageKind::Fragment, fragment_src) {
            Ok(stage) => stage,
            Err(e) => {
                device.delete_stage(vertex);
                return Err(e);
            }
        };

        let program = match device.link_program(vertex, fragment) {
            Ok(program) => program,
            Err(log) => {
                device.delete_stage(vertex);
                device.delete_stage(fragment);
                log::error!("program `{label}` failed to link:\n{log}");
                return Err(Error::Link { label, log });
            }
        };

        log::debug!("program `{label}` linked");
        Ok(Self {
            label,
            linked: Some(Linked {
                vertex,
                fragment,
                program,
            }),
            uniforms: UniformCache::new(),
        })
    }

    /// Loads `<base>.vert` and `<base>.frag` and builds the program from them.
    pub fn load(device: &mut D, base: impl AsRef<Path>) -> Result<Self> {
        let base = base.as_ref();
        let vertex_src = read_stage(base, StageKind::Vertex)?;
        let fragment_src = read_stage(base, StageKind::Fragment)?;
        Self::from_sources(device, base.display().to_string(), &vertex_src, &fragment_src)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_destroyed(&self) -> bool {
        self.linked.is_none()
    }

    pub fn handle(&self) -> Option<D::Program> {
        self.linked.as_ref().map(|l| l.program)
    }

    pub fn uniforms(&self) -> &UniformCache<D::Location> {
        &self.uniforms
    }

    /// Makes this the active program.
    pub fn bind(&self, device: &mut D) -> Result<()> {
        let program = self.program()?;
        device.use_program(Some(program));
        Ok(())
    }

    /// Resolves `name` through the cache.
    pub fn location(&mut self, device: &mut D, name: &str) -> Result<D::Location> {
        let program = self.program()?;
        self.uniforms.resolve(device, program, name)
    }

    /// Sets a uniform on the currently bound program.
    pub fn set(&mut self, device: &mut D, name: &str, value: UniformValue) -> Result<()> {
        let location = self.location(device, name)?;
        device.set_uniform(&location, value);
        Ok(())
    }

    pub fn set_float(&mut self, device: &mut D, name: &str, value: f32) -> Result<()> {
        self.set(device, name, UniformValue::Float(value))
    }

    pub fn set_int(&mut self, device: &mut D, name: &str, value: i32) -> Result<()> {
        self.set(device, name, UniformValue::Int(value))
    }

    pub fn set_vec2(&mut self, device: &mut D, name: &str, value: Vec2) -> Result<()> {
        self.set(device, name, UniformValue::Vec2(value))
    }

    pub fn set_vec3(&mut self, device: &mut D, name: &str, value: Vec3) -> Result<()> {
        self.set(device, name, UniformValue::Vec3(value))
    }

    pub fn set_mat4(&mut self, device: &mut D, name: &str, value: Mat4) -> Result<()> {
        self.set(device, name, UniformValue::Mat4(value))
    }

    /// Releases both stages and the program. Safe to call more than once.
    pub fn destroy(&mut self, device: &mut D) {
        self.uniforms.invalidate();
        let Some(linked) = self.linked.take() else {
            return;
        };
        device.delete_stage(linked.vertex);
        device.delete_stage(linked.fragment);
        device.delete_program(linked.program);
        log::debug!("program `{}` destroyed", self.label);
    }

    fn program(&self) -> Result<D::Program> {
        self.handle().ok_or(Error::ResourceReleased("shader program"))
    }
}

impl<D: Device> Drop for ShaderProgram<D> {
    fn drop(&mut self) {
        if self.linked.is_some() {
            log::warn!("program `{}` dropped without destroy; GL objects leaked", self.label);
        }
    }
}

fn compile<D: Device>(device: &mut D, label: &str, stage: StageKind, source: &str) -> Result<D::Stage> {
    device.compile_stage(stage, source).map_err(|log| {
        log::error!("{stage} stage of `{label}` failed to compile:\n{log}");
        Error::Compile {
            stage,
            label: label.to_string(),
            log,
        }
    })
}

fn read_stage(base: &Path, stage: StageKind) -> Result<String> {
    let mut path = PathBuf::from(base.as_os_str());
    path.as_mut_os_string().push(".");
    path.as_mut_os_string().push(stage.extension());
    fs::read_to_string(&path).map_err(|source| Error::ShaderSource { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockDevice;

    const VS: &str = "#version 330 core\nvoid main() { gl_Position = vec4(0.0); }";
    const FS: &str = "#version 330 core\nout vec4 o; void main() { o = vec4(1.0); }";

    #[test]
    fn builds_and_destroys_cleanly() {
        let mut dev = MockDevice::new();
        let mut program = ShaderProgram::from_sources(&mut dev, "basic", VS, FS).unwrap();
        assert_eq!(dev.stages.len(), 2);
        assert_eq!(dev.programs.len(), 1);
        assert_eq!(program.label(), "basic");

        program.destroy(&mut dev);
        assert_eq!(dev.live_objects(), 0);
        assert!(program.is_destroyed());
    }

    #[test]
    fn vertex_compile_failure_leaves_nothing_behind() {
        let mut dev = MockDevice::new();
        dev.fail_stage = Some(StageKind::Vertex);

        let err = ShaderProgram::from_sources(&mut dev, "broken", VS, FS).err().unwrap();
        assert!(matches!(err, Error::Compile { stage: StageKind::Vertex, .. }));
        assert_eq!(dev.live_objects(), 0);
    }

    #[test]
    fn fragment_compile_failure_releases_vertex_stage() {
        let mut dev = MockDevice::new();
        dev.fail_stage = Some(StageKind::Fragment);

        let err = ShaderProgram::from_sources(&mut dev, "broken", VS, FS).err().unwrap();
        match err {
            Error::Compile { stage, label, log } => {
                assert_eq!(stage, StageKind::Fragment);
                assert_eq!(label, "broken");
                assert!(!log.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(dev.live_objects(), 0);
    }

    #[test]
    fn link_failure_releases_both_stages() {
        let mut dev = MockDevice::new();
        dev.fail_link = true;

        let err = ShaderProgram::from_sources(&mut dev, "broken", VS, FS).err().unwrap();
        assert!(matches!(err, Error::Link { .. }));
        assert_eq!(dev.live_objects(), 0);
    }

    #[test]
    fn setters_go_through_the_cache() {
        let mut dev = MockDevice::new();
        let mut program = ShaderProgram::from_sources(&mut dev, "basic", VS, FS).unwrap();
        program.bind(&mut dev).unwrap();

        program.set_float(&mut dev, "u_time", 1.5).unwrap();
        program.set_float(&mut dev, "u_time", 2.5).unwrap();
        program.set_vec2(&mut dev, "u_offset", Vec2::ONE).unwrap();

        assert_eq!(dev.location_queries, vec!["u_time", "u_offset"]);
        let time = dev.location_of("u_time").unwrap();
        assert_eq!(
            dev.uniform_sets,
            vec![
                (time, UniformValue::Float(1.5)),
                (time, UniformValue::Float(2.5)),
                (dev.location_of("u_offset").unwrap(), UniformValue::Vec2(Vec2::ONE)),
            ]
        );
        program.destroy(&mut dev);
    }

    #[test]
    fn missing_uniform_sets_nothing() {
        let mut dev = MockDevice::new().without_uniform("u_gone");
        let mut program = ShaderProgram::from_sources(&mut dev, "basic", VS, FS).unwrap();

        let err = program.set_int(&mut dev, "u_gone", 3).unwrap_err();
        assert!(matches!(err, Error::UniformNotFound { ref name } if name == "u_gone"));
        assert!(dev.uniform_sets.is_empty());
        program.destroy(&mut dev);
    }

    #[test]
    fn destroy_is_idempotent_and_clears_cache() {
        let mut dev = MockDevice::new();
        let mut program = ShaderProgram::from_sources(&mut dev, "basic", VS, FS).unwrap();
        program.set_mat4(&mut dev, "m_model", Mat4::IDENTITY).unwrap();
        assert_eq!(program.uniforms().len(), 1);

        program.destroy(&mut dev);
        program.destroy(&mut dev);

        assert!(program.uniforms().is_empty());
        assert_eq!(dev.live_objects(), 0);
        assert!(matches!(program.bind(&mut dev), Err(Error::ResourceReleased(_))));
        assert!(program.set_vec3(&mut dev, "m_model", Vec3::ZERO).is_err());
    }

    #[test]
    fn load_reports_missing_source_path() {
        let mut dev = MockDevice::new();
        let base = std::env::temp_dir().join("ember-no-such-shader");

        let err = ShaderProgram::load(&mut dev, &base).err().unwrap();
        match err {
            Error::ShaderSource { path, .. } => {
                assert_eq!(path.extension().and_then(|e| e.to_str()), Some("vert"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(dev.live_objects(), 0);
    }

    #[test]
    fn load_reads_both_stage_files() {
        let dir = std::env::temp_dir().join(format!("ember-shader-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let base = dir.join("flat");
        fs::write(dir.join("flat.vert"), VS).unwrap();
        fs::write(dir.join("flat.frag"), FS).unwrap();

        let mut dev = MockDevice::new();
        let mut program = ShaderProgram::load(&mut dev, &base).unwrap();
        assert!(program.label().ends_with("flat"));
        assert_eq!(dev.programs.len(), 1);

        program.destroy(&mut dev);
        fs::remove_dir_all(&dir).unwrap();
    }
}
