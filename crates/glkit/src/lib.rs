//! Small conveniences over an OpenGL 3.3 core context.
//!
//! The crate covers the handful of chores every hand-rolled GL renderer
//! repeats: compiling and linking GLSL, allocating and filling buffers,
//! loading PNGs into textures, and relinking a program when its source files
//! change on disk. The overall flow for a typical frame loop is:
//!
//! ```text
//!   Shader::new(gl, vert, frag) ──▶ create_program ──▶ compile_shader ×2
//!          │
//!   loop { shader.check_for_changes(gl)   // stat ×2, relink on change
//!          shader.use_program(gl)
//!          bind_vertex_array(gl, vao) ... draw ... }
//! ```
//!
//! All helpers take the context explicitly as `&impl GlBackend`. With the
//! default `glow` feature a `glow::Context` is a backend; [`RecordingGl`]
//! stands in for one in tests. Everything here must run on the thread that
//! owns the context; [`SourceWatcher`] is the one piece that runs elsewhere,
//! and it only ever stats files.

mod backend;
mod buffers;
mod compile;
mod error;
mod handles;
pub mod recording;
mod shader;
mod texture;
mod watch;

pub use backend::GlBackend;
pub use buffers::{
    bind_buffer, bind_vertex_array, buffer_data_f32, buffer_data_u32, delete_buffer,
    delete_vertex_array, gen_bind_buffer, gen_bind_vertex_array, gen_element_buffer,
    unbind_vertex_array,
};
pub use compile::{compile_shader, create_program, load_shader, use_program, version_string};
pub use error::{GlError, Result};
pub use handles::{
    BufferId, BufferTarget, BufferUsage, ProgramId, ShaderId, ShaderKind, TextureFilter,
    TextureId, TextureParameter, TextureWrap, UniformLocation, VertexArrayId,
};
pub use kitconfig::{ConfigError, KitConfig, TextureSettings};
pub use recording::RecordingGl;
pub use shader::{ReloadOutcome, ReloadSettings, Shader};
pub use texture::{
    bind_texture, decode_png, delete_texture, gen_bind_texture, load_texture, load_texture_with,
    pack_rgba, AlphaPacking, PackedImage,
};
pub use watch::{FsProbe, ModificationProbe, SourceChanged, SourceWatcher};
