//! The graphics context every helper in this crate talks to.
//!
//! OpenGL keeps its state in an implicit, thread-bound "current context". This
//! crate makes that context an explicit value: every helper takes
//! `&impl GlBackend`, so the caller always names which context a call targets
//! and no helper reaches for process-wide state behind its back.
//!
//! - `glow` (feature `glow`): the real driver through `glow::Context`.
//! - [`crate::recording::RecordingGl`]: a headless spy used by the tests.

#[cfg(feature = "glow")]
mod native;

use crate::handles::{
    BufferId, BufferTarget, BufferUsage, ProgramId, ShaderId, ShaderKind, TextureId,
    TextureParameter, UniformLocation, VertexArrayId,
};

/// Thin, safe facade over the GL entry points this crate consumes.
///
/// Object creation reports the driver's message on failure; everything else is
/// fire-and-forget, matching how GL itself behaves without `glGetError`.
pub trait GlBackend {
    fn version(&self) -> String;

    fn create_shader(&self, kind: ShaderKind) -> Result<ShaderId, String>;
    fn shader_source(&self, shader: ShaderId, source: &str);
    fn compile_shader(&self, shader: ShaderId);
    fn shader_compile_status(&self, shader: ShaderId) -> bool;
    fn shader_info_log(&self, shader: ShaderId) -> String;
    fn delete_shader(&self, shader: ShaderId);

    fn create_program(&self) -> Result<ProgramId, String>;
    fn attach_shader(&self, program: ProgramId, shader: ShaderId);
    fn detach_shader(&self, program: ProgramId, shader: ShaderId);
    fn link_program(&self, program: ProgramId);
    fn program_link_status(&self, program: ProgramId) -> bool;
    fn program_info_log(&self, program: ProgramId) -> String;
    fn use_program(&self, program: Option<ProgramId>);
    fn delete_program(&self, program: ProgramId);

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    fn uniform_1_f32(&self, location: UniformLocation, value: f32);

    fn create_buffer(&self) -> Result<BufferId, String>;
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>);
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    fn delete_buffer(&self, buffer: BufferId);

    fn create_vertex_array(&self) -> Result<VertexArrayId, String>;
    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>);
    fn delete_vertex_array(&self, vertex_array: VertexArrayId);

    /// `GL_MAX_TEXTURE_SIZE`: the largest width or height a 2D texture may have.
    fn max_texture_size(&self) -> u32;
    fn create_texture(&self) -> Result<TextureId, String>;
    fn bind_texture_2d(&self, texture: Option<TextureId>);
    fn tex_parameter_2d(&self, parameter: TextureParameter);
    /// Uploads level `level` of the bound 2D texture as RGBA / unsigned byte.
    fn tex_image_2d_rgba8(&self, level: i32, width: u32, height: u32, pixels: &[u8]);
    fn generate_mipmap_2d(&self);
    fn delete_texture(&self, texture: TextureId);
}
