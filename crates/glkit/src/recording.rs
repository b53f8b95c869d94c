//! A headless [`GlBackend`] that records calls instead of issuing them.
//!
//! `RecordingGl` hands out sequential object names, remembers which objects
//! are still alive, and keeps an ordered log of every call as a [`GlCall`].
//! Its "compiler" rejects a stage with no `main` entry point or with
//! unbalanced brackets, which is enough to drive success and failure paths
//! without a driver. Link failures are scripted with [`RecordingGl::fail_next_link`].
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroU32;

use crate::backend::GlBackend;
use crate::handles::{
    BufferId, BufferTarget, BufferUsage, ProgramId, ShaderId, ShaderKind, TextureId,
    TextureParameter, UniformLocation, VertexArrayId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateShader(ShaderId, ShaderKind),
    ShaderSource(ShaderId, String),
    CompileShader(ShaderId),
    DeleteShader(ShaderId),
    CreateProgram(ProgramId),
    AttachShader(ProgramId, ShaderId),
    DetachShader(ProgramId, ShaderId),
    LinkProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    DeleteProgram(ProgramId),
    Uniform1f(UniformLocation, f32),
    CreateBuffer(BufferId),
    BindBuffer(BufferTarget, Option<BufferId>),
    BufferData {
        target: BufferTarget,
        bytes: Vec<u8>,
        usage: BufferUsage,
    },
    DeleteBuffer(BufferId),
    CreateVertexArray(VertexArrayId),
    BindVertexArray(Option<VertexArrayId>),
    DeleteVertexArray(VertexArrayId),
    CreateTexture(TextureId),
    BindTexture2d(Option<TextureId>),
    TexParameter2d(TextureParameter),
    TexImage2dRgba8 {
        level: i32,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    },
    GenerateMipmap2d,
    DeleteTexture(TextureId),
}

#[derive(Debug, Default)]
struct ShaderState {
    source: String,
    compiled: Option<Result<(), String>>,
}

#[derive(Debug, Default)]
struct ProgramState {
    link_log: Option<String>,
    linked: bool,
}

#[derive(Debug, Default)]
pub struct RecordingGl {
    next_name: Cell<u32>,
    calls: RefCell<Vec<GlCall>>,
    shaders: RefCell<BTreeMap<ShaderId, ShaderState>>,
    programs: RefCell<BTreeMap<ProgramId, ProgramState>>,
    buffers: RefCell<BTreeSet<BufferId>>,
    vertex_arrays: RefCell<BTreeSet<VertexArrayId>>,
    textures: RefCell<BTreeSet<TextureId>>,
    pending_link_failure: RefCell<Option<String>>,
    max_texture_size: Cell<Option<u32>>,
    uniforms: RefCell<Vec<String>>,
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `link_program` report failure with `log`.
    pub fn fail_next_link(&self, log: impl Into<String>) {
        *self.pending_link_failure.borrow_mut() = Some(log.into());
    }

    /// Overrides the reported `GL_MAX_TEXTURE_SIZE`.
    pub fn set_max_texture_size(&self, max: u32) {
        self.max_texture_size.set(Some(max));
    }

    /// Declares uniform names that `uniform_location` will resolve.
    pub fn declare_uniform(&self, name: impl Into<String>) {
        self.uniforms.borrow_mut().push(name.into());
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn live_shaders(&self) -> usize {
        self.shaders.borrow().len()
    }

    pub fn live_programs(&self) -> Vec<ProgramId> {
        self.programs.borrow().keys().copied().collect()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.borrow().len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.vertex_arrays.borrow().len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.borrow().len()
    }

    /// Number of `glLinkProgram` calls seen so far.
    pub fn link_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, GlCall::LinkProgram(_)))
            .count()
    }

    fn record(&self, call: GlCall) {
        self.calls.borrow_mut().push(call);
    }

    fn next_name(&self) -> NonZeroU32 {
        let next = self.next_name.get() + 1;
        self.next_name.set(next);
        NonZeroU32::new(next).unwrap_or(NonZeroU32::MIN)
    }
}

/// What a current desktop driver typically reports.
const DEFAULT_MAX_TEXTURE_SIZE: u32 = 16384;

/// Minimal stand-in for a GLSL front end.
fn check_source(kind: ShaderKind, source: &str) -> Result<(), String> {
    if !source.contains("main") {
        return Err(format!("0:1(1): error: {kind} shader lacks `main'"));
    }

    let mut depth = [0i32; 2];
    for (line_no, line) in source.lines().enumerate() {
        for ch in line.chars() {
            let slot = match ch {
                '{' | '}' => 0,
                '(' | ')' => 1,
                _ => continue,
            };
            depth[slot] += if ch == '{' || ch == '(' { 1 } else { -1 };
            if depth[slot] < 0 {
                return Err(format!(
                    "0:{}(1): error: syntax error, unexpected '{ch}'",
                    line_no + 1
                ));
            }
        }
    }
    if depth != [0, 0] {
        return Err("0:1(1): error: syntax error, unexpected end of file".to_string());
    }
    Ok(())
}

impl GlBackend for RecordingGl {
    fn version(&self) -> String {
        "3.3.0 recording".to_string()
    }

    fn create_shader(&self, kind: ShaderKind) -> Result<ShaderId, String> {
        let shader = ShaderId::new(self.next_name());
        self.shaders
            .borrow_mut()
            .insert(shader, ShaderState::default());
        self.record(GlCall::CreateShader(shader, kind));
        Ok(shader)
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        if let Some(state) = self.shaders.borrow_mut().get_mut(&shader) {
            state.source = source.to_string();
        }
        self.record(GlCall::ShaderSource(shader, source.to_string()));
    }

    fn compile_shader(&self, shader: ShaderId) {
        let kind = self.calls.borrow().iter().find_map(|call| match call {
            GlCall::CreateShader(id, kind) if *id == shader => Some(*kind),
            _ => None,
        });
        if let (Some(kind), Some(state)) = (kind, self.shaders.borrow_mut().get_mut(&shader)) {
            state.compiled = Some(check_source(kind, &state.source));
        }
        self.record(GlCall::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        matches!(
            self.shaders.borrow().get(&shader).and_then(|s| s.compiled.as_ref()),
            Some(Ok(()))
        )
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        match self.shaders.borrow().get(&shader).and_then(|s| s.compiled.as_ref()) {
            Some(Err(log)) => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_shader(&self, shader: ShaderId) {
        self.shaders.borrow_mut().remove(&shader);
        self.record(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<ProgramId, String> {
        let program = ProgramId::new(self.next_name());
        self.programs
            .borrow_mut()
            .insert(program, ProgramState::default());
        self.record(GlCall::CreateProgram(program));
        Ok(program)
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        self.record(GlCall::AttachShader(program, shader));
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) {
        self.record(GlCall::DetachShader(program, shader));
    }

    fn link_program(&self, program: ProgramId) {
        let failure = self.pending_link_failure.borrow_mut().take();
        if let Some(state) = self.programs.borrow_mut().get_mut(&program) {
            state.linked = failure.is_none();
            state.link_log = failure;
        }
        self.record(GlCall::LinkProgram(program));
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        self.programs
            .borrow()
            .get(&program)
            .is_some_and(|state| state.linked)
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        self.programs
            .borrow()
            .get(&program)
            .and_then(|state| state.link_log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<ProgramId>) {
        self.record(GlCall::UseProgram(program));
    }

    fn delete_program(&self, program: ProgramId) {
        self.programs.borrow_mut().remove(&program);
        self.record(GlCall::DeleteProgram(program));
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        if !self.programs.borrow().contains_key(&program) {
            return None;
        }
        self.uniforms
            .borrow()
            .iter()
            .position(|declared| declared == name)
            .map(|index| UniformLocation(index as u32))
    }

    fn uniform_1_f32(&self, location: UniformLocation, value: f32) {
        self.record(GlCall::Uniform1f(location, value));
    }

    fn create_buffer(&self) -> Result<BufferId, String> {
        let buffer = BufferId::new(self.next_name());
        self.buffers.borrow_mut().insert(buffer);
        self.record(GlCall::CreateBuffer(buffer));
        Ok(buffer)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        self.record(GlCall::BindBuffer(target, buffer));
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        self.record(GlCall::BufferData {
            target,
            bytes: data.to_vec(),
            usage,
        });
    }

    fn delete_buffer(&self, buffer: BufferId) {
        self.buffers.borrow_mut().remove(&buffer);
        self.record(GlCall::DeleteBuffer(buffer));
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, String> {
        let vertex_array = VertexArrayId::new(self.next_name());
        self.vertex_arrays.borrow_mut().insert(vertex_array);
        self.record(GlCall::CreateVertexArray(vertex_array));
        Ok(vertex_array)
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>) {
        self.record(GlCall::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        self.vertex_arrays.borrow_mut().remove(&vertex_array);
        self.record(GlCall::DeleteVertexArray(vertex_array));
    }

    fn max_texture_size(&self) -> u32 {
        self.max_texture_size.get().unwrap_or(DEFAULT_MAX_TEXTURE_SIZE)
    }

    fn create_texture(&self) -> Result<TextureId, String> {
        let texture = TextureId::new(self.next_name());
        self.textures.borrow_mut().insert(texture);
        self.record(GlCall::CreateTexture(texture));
        Ok(texture)
    }

    fn bind_texture_2d(&self, texture: Option<TextureId>) {
        self.record(GlCall::BindTexture2d(texture));
    }

    fn tex_parameter_2d(&self, parameter: TextureParameter) {
        self.record(GlCall::TexParameter2d(parameter));
    }

    fn tex_image_2d_rgba8(&self, level: i32, width: u32, height: u32, pixels: &[u8]) {
        self.record(GlCall::TexImage2dRgba8 {
            level,
            width,
            height,
            pixels: pixels.to_vec(),
        });
    }

    fn generate_mipmap_2d(&self) {
        self.record(GlCall::GenerateMipmap2d);
    }

    fn delete_texture(&self, texture: TextureId) {
        self.textures.borrow_mut().remove(&texture);
        self.record(GlCall::DeleteTexture(texture));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiler_accepts_balanced_main() {
        assert!(check_source(ShaderKind::Vertex, "void main() { }").is_ok());
    }

    #[test]
    fn compiler_rejects_missing_entry_point() {
        let log = check_source(ShaderKind::Fragment, "void helper() {}").unwrap_err();
        assert!(log.contains("main"));
    }

    #[test]
    fn compiler_points_at_stray_brace() {
        let log = check_source(ShaderKind::Fragment, "void main() {\n}\n}").unwrap_err();
        assert!(log.starts_with("0:3(1)"), "log was {log:?}");
    }

    #[test]
    fn names_are_unique_across_kinds() {
        let gl = RecordingGl::new();
        let shader = gl.create_shader(ShaderKind::Vertex).unwrap();
        let buffer = gl.create_buffer().unwrap();
        assert_ne!(shader.raw(), buffer.raw());
    }
}
