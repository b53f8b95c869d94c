use std::path::PathBuf;

use thiserror::Error;

use crate::handles::ShaderKind;

#[derive(Debug, Error)]
pub enum GlError {
    #[error("failed to read shader source {path}: {source}")]
    ShaderLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to compile {kind} shader:\n{log}")]
    ShaderCompile { kind: ShaderKind, log: String },

    #[error("failed to link program:\n{log}")]
    ProgramLink { log: String },

    #[error("failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image of {width}x{height} exceeds GL_MAX_TEXTURE_SIZE ({max})")]
    ImageTooLarge { width: u32, height: u32, max: u32 },

    #[error("driver could not create {kind} object: {message}")]
    ObjectCreation { kind: &'static str, message: String },

    #[error("failed to start source watcher: {0}")]
    Watcher(#[source] std::io::Error),
}

impl GlError {
    pub(crate) fn creation(kind: &'static str) -> impl FnOnce(String) -> Self {
        move |message| Self::ObjectCreation { kind, message }
    }
}

pub type Result<T, E = GlError> = std::result::Result<T, E>;
