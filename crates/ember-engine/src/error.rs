use std::path::PathBuf;

use crate::device::StageKind;

/// Errors produced by the engine core.
///
/// Every failure is returned as a value; callers decide what is fatal.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A shader stage failed to compile.
    #[error("failed to compile {stage} shader '{label}': {log}")]
    Compile {
        stage: StageKind,
        label: String,
        log: String,
    },

    /// Both stages compiled but the program failed to link.
    #[error("failed to link shader '{label}': {log}")]
    Link { label: String, log: String },

    /// The active program has no uniform with this name.
    #[error("uniform not found: `{name}`")]
    UniformNotFound { name: String },

    /// The device refused to allocate a resource.
    #[error("device resource failure: {0}")]
    DeviceResource(String),

    /// The resource was already destroyed.
    #[error("{0} has been released")]
    ResourceReleased(&'static str),

    #[error("failed to read shader source '{}'", path.display())]
    ShaderSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load image '{}'", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
