//! `GlBackend` for a current `glow::Context`.
//!
//! # Safety
//!
//! `glow` marks every entry point `unsafe` because a context must be current
//! on the calling thread. Implementing `GlBackend` for the context means the
//! caller vouches for that once, when it hands the context to this crate, and
//! keeps it on the thread that made it current.
use glow::HasContext;

use super::GlBackend;
use crate::handles::{
    BufferId, BufferTarget, BufferUsage, ProgramId, ShaderId, ShaderKind, TextureId,
    TextureParameter, UniformLocation, VertexArrayId,
};

fn native_shader(id: ShaderId) -> glow::NativeShader {
    glow::NativeShader(id.get())
}

fn native_program(id: ProgramId) -> glow::NativeProgram {
    glow::NativeProgram(id.get())
}

fn native_buffer(id: BufferId) -> glow::NativeBuffer {
    glow::NativeBuffer(id.get())
}

fn native_vertex_array(id: VertexArrayId) -> glow::NativeVertexArray {
    glow::NativeVertexArray(id.get())
}

fn native_texture(id: TextureId) -> glow::NativeTexture {
    glow::NativeTexture(id.get())
}

impl GlBackend for glow::Context {
    fn version(&self) -> String {
        unsafe { self.get_parameter_string(glow::VERSION) }
    }

    fn create_shader(&self, kind: ShaderKind) -> Result<ShaderId, String> {
        unsafe { HasContext::create_shader(self, kind.to_gl()) }.map(|s| ShaderId::new(s.0))
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        unsafe { HasContext::shader_source(self, native_shader(shader), source) }
    }

    fn compile_shader(&self, shader: ShaderId) {
        unsafe { HasContext::compile_shader(self, native_shader(shader)) }
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        unsafe { self.get_shader_compile_status(native_shader(shader)) }
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        unsafe { self.get_shader_info_log(native_shader(shader)) }
    }

    fn delete_shader(&self, shader: ShaderId) {
        unsafe { HasContext::delete_shader(self, native_shader(shader)) }
    }

    fn create_program(&self) -> Result<ProgramId, String> {
        unsafe { HasContext::create_program(self) }.map(|p| ProgramId::new(p.0))
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe { HasContext::attach_shader(self, native_program(program), native_shader(shader)) }
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe { HasContext::detach_shader(self, native_program(program), native_shader(shader)) }
    }

    fn link_program(&self, program: ProgramId) {
        unsafe { HasContext::link_program(self, native_program(program)) }
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        unsafe { self.get_program_link_status(native_program(program)) }
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        unsafe { self.get_program_info_log(native_program(program)) }
    }

    fn use_program(&self, program: Option<ProgramId>) {
        unsafe { HasContext::use_program(self, program.map(native_program)) }
    }

    fn delete_program(&self, program: ProgramId) {
        unsafe { HasContext::delete_program(self, native_program(program)) }
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        unsafe { self.get_uniform_location(native_program(program), name) }
            .map(|location| UniformLocation(location.0))
    }

    fn uniform_1_f32(&self, location: UniformLocation, value: f32) {
        let location = glow::NativeUniformLocation(location.0);
        unsafe { HasContext::uniform_1_f32(self, Some(&location), value) }
    }

    fn create_buffer(&self) -> Result<BufferId, String> {
        unsafe { HasContext::create_buffer(self) }.map(|b| BufferId::new(b.0))
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        unsafe { HasContext::bind_buffer(self, target.to_gl(), buffer.map(native_buffer)) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe { self.buffer_data_u8_slice(target.to_gl(), data, usage.to_gl()) }
    }

    fn delete_buffer(&self, buffer: BufferId) {
        unsafe { HasContext::delete_buffer(self, native_buffer(buffer)) }
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, String> {
        unsafe { HasContext::create_vertex_array(self) }.map(|v| VertexArrayId::new(v.0))
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>) {
        unsafe { HasContext::bind_vertex_array(self, vertex_array.map(native_vertex_array)) }
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        unsafe { HasContext::delete_vertex_array(self, native_vertex_array(vertex_array)) }
    }

    fn max_texture_size(&self) -> u32 {
        let max = unsafe { self.get_parameter_i32(glow::MAX_TEXTURE_SIZE) };
        u32::try_from(max).unwrap_or(0)
    }

    fn create_texture(&self) -> Result<TextureId, String> {
        unsafe { HasContext::create_texture(self) }.map(|t| TextureId::new(t.0))
    }

    fn bind_texture_2d(&self, texture: Option<TextureId>) {
        unsafe { self.bind_texture(glow::TEXTURE_2D, texture.map(native_texture)) }
    }

    fn tex_parameter_2d(&self, parameter: TextureParameter) {
        let (pname, param) = parameter.to_gl();
        unsafe { self.tex_parameter_i32(glow::TEXTURE_2D, pname, param) }
    }

    fn tex_image_2d_rgba8(&self, level: i32, width: u32, height: u32, pixels: &[u8]) {
        unsafe {
            self.tex_image_2d(
                glow::TEXTURE_2D,
                level,
                glow::RGBA as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(pixels),
            )
        }
    }

    fn generate_mipmap_2d(&self) {
        unsafe { self.generate_mipmap(glow::TEXTURE_2D) }
    }

    fn delete_texture(&self, texture: TextureId) {
        unsafe { HasContext::delete_texture(self, native_texture(texture)) }
    }
}
