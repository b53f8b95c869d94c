//! Shader compilation and program linking.
//!
//! `compile_shader` turns one stage's source into a shader object,
//! `load_shader` reads that source from disk first, and `create_program`
//! compiles both stages from their files and links them. Every failure comes
//! back as a [`GlError`]; nothing here aborts the process, since the same path
//! runs again from hot-reload inside a live render loop.
use std::fs;
use std::path::Path;

use crate::backend::GlBackend;
use crate::error::{GlError, Result};
use crate::handles::{ProgramId, ShaderId, ShaderKind};

/// Compiles `source` as a single `kind` stage.
///
/// On failure the shader object is deleted and the driver's info log is
/// returned verbatim in [`GlError::ShaderCompile`].
pub fn compile_shader(gl: &impl GlBackend, source: &str, kind: ShaderKind) -> Result<ShaderId> {
    let shader = gl
        .create_shader(kind)
        .map_err(GlError::creation("shader"))?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if !gl.shader_compile_status(shader) {
        let log = gl.shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(GlError::ShaderCompile { kind, log });
    }

    tracing::trace!(%shader, %kind, "compiled shader");
    Ok(shader)
}

/// Reads a whole shader file and compiles it.
pub fn load_shader(gl: &impl GlBackend, path: &Path, kind: ShaderKind) -> Result<ShaderId> {
    let source = fs::read_to_string(path).map_err(|source| GlError::ShaderLoad {
        path: path.to_path_buf(),
        source,
    })?;
    compile_shader(gl, &source, kind)
}

/// Compiles the vertex and fragment files and links them into a program.
///
/// Both stage objects are released whether or not linking succeeds; a
/// successful call leaves exactly one new live object, the returned program.
pub fn create_program(
    gl: &impl GlBackend,
    vertex_path: &Path,
    fragment_path: &Path,
) -> Result<ProgramId> {
    let vertex = load_shader(gl, vertex_path, ShaderKind::Vertex)?;
    let fragment = match load_shader(gl, fragment_path, ShaderKind::Fragment) {
        Ok(fragment) => fragment,
        Err(err) => {
            gl.delete_shader(vertex);
            return Err(err);
        }
    };

    let linked = link_program(gl, vertex, fragment);
    gl.delete_shader(vertex);
    gl.delete_shader(fragment);

    let program = linked?;
    tracing::debug!(
        %program,
        vertex = %vertex_path.display(),
        fragment = %fragment_path.display(),
        "linked program"
    );
    Ok(program)
}

fn link_program(gl: &impl GlBackend, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId> {
    let program = gl
        .create_program()
        .map_err(GlError::creation("program"))?;
    gl.attach_shader(program, vertex);
    gl.attach_shader(program, fragment);
    gl.link_program(program);

    if !gl.program_link_status(program) {
        let log = gl.program_info_log(program);
        gl.delete_program(program);
        return Err(GlError::ProgramLink { log });
    }

    gl.detach_shader(program, vertex);
    gl.detach_shader(program, fragment);
    Ok(program)
}

/// Binds `program` for subsequent draw calls.
pub fn use_program(gl: &impl GlBackend, program: ProgramId) {
    gl.use_program(Some(program));
}

/// Driver version string, e.g. `"3.3.0 NVIDIA 550.54"`.
pub fn version_string(gl: &impl GlBackend) -> String {
    gl.version()
}
