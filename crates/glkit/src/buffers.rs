//! Buffer and vertex array helpers.
//!
//! These are stateless wrappers: each one allocates, binds or uploads against
//! whatever the context currently has bound and reports nothing back beyond
//! the new object name. The driver's error queue is not consulted.
use crate::backend::GlBackend;
use crate::error::{GlError, Result};
use crate::handles::{BufferId, BufferTarget, BufferUsage, VertexArrayId};

/// Allocates a buffer and binds it to `target`.
pub fn gen_bind_buffer(gl: &impl GlBackend, target: BufferTarget) -> Result<BufferId> {
    let buffer = gl.create_buffer().map_err(GlError::creation("buffer"))?;
    gl.bind_buffer(target, Some(buffer));
    Ok(buffer)
}

/// Allocates a buffer intended for index data without binding it.
///
/// Element buffers are usually bound after the vertex array they belong to,
/// so binding here would attach it to the wrong VAO.
pub fn gen_element_buffer(gl: &impl GlBackend) -> Result<BufferId> {
    gl.create_buffer().map_err(GlError::creation("buffer"))
}

pub fn bind_buffer(gl: &impl GlBackend, target: BufferTarget, buffer: BufferId) {
    gl.bind_buffer(target, Some(buffer));
}

/// Allocates a vertex array object and binds it.
pub fn gen_bind_vertex_array(gl: &impl GlBackend) -> Result<VertexArrayId> {
    let vertex_array = gl
        .create_vertex_array()
        .map_err(GlError::creation("vertex array"))?;
    gl.bind_vertex_array(Some(vertex_array));
    Ok(vertex_array)
}

pub fn bind_vertex_array(gl: &impl GlBackend, vertex_array: VertexArrayId) {
    gl.bind_vertex_array(Some(vertex_array));
}

pub fn unbind_vertex_array(gl: &impl GlBackend) {
    gl.bind_vertex_array(None);
}

/// Uploads `data` to the buffer currently bound at `target`.
pub fn buffer_data_f32(gl: &impl GlBackend, target: BufferTarget, data: &[f32], usage: BufferUsage) {
    gl.buffer_data(target, bytemuck::cast_slice(data), usage);
}

/// Uploads `data` to the buffer currently bound at `target`.
pub fn buffer_data_u32(gl: &impl GlBackend, target: BufferTarget, data: &[u32], usage: BufferUsage) {
    gl.buffer_data(target, bytemuck::cast_slice(data), usage);
}

pub fn delete_buffer(gl: &impl GlBackend, buffer: BufferId) {
    gl.delete_buffer(buffer);
}

pub fn delete_vertex_array(gl: &impl GlBackend, vertex_array: VertexArrayId) {
    gl.delete_vertex_array(vertex_array);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{GlCall, RecordingGl};

    #[test]
    fn quad_setup_binds_in_order() {
        let gl = RecordingGl::new();

        let vao = gen_bind_vertex_array(&gl).unwrap();
        let vbo = gen_bind_buffer(&gl, BufferTarget::Array).unwrap();
        buffer_data_f32(
            &gl,
            BufferTarget::Array,
            &[0.5, 0.5, 0.0, -0.5, 0.5, 0.0],
            BufferUsage::StaticDraw,
        );
        let ebo = gen_element_buffer(&gl).unwrap();
        bind_buffer(&gl, BufferTarget::ElementArray, ebo);
        buffer_data_u32(&gl, BufferTarget::ElementArray, &[0, 1, 3], BufferUsage::StaticDraw);
        unbind_vertex_array(&gl);

        let calls = gl.calls();
        assert_eq!(calls[0], GlCall::CreateVertexArray(vao));
        assert_eq!(calls[1], GlCall::BindVertexArray(Some(vao)));
        assert_eq!(calls[2], GlCall::CreateBuffer(vbo));
        assert_eq!(calls[3], GlCall::BindBuffer(BufferTarget::Array, Some(vbo)));
        assert!(matches!(
            &calls[4],
            GlCall::BufferData { target: BufferTarget::Array, bytes, usage: BufferUsage::StaticDraw }
                if bytes.len() == 6 * 4
        ));
        assert_eq!(calls[5], GlCall::CreateBuffer(ebo));
        assert_eq!(calls[6], GlCall::BindBuffer(BufferTarget::ElementArray, Some(ebo)));
        assert_eq!(calls.last(), Some(&GlCall::BindVertexArray(None)));
    }

    #[test]
    fn index_upload_is_native_endian_u32() {
        let gl = RecordingGl::new();
        buffer_data_u32(&gl, BufferTarget::ElementArray, &[1, 2], BufferUsage::StreamDraw);

        let expected: Vec<u8> = [1u32, 2]
            .iter()
            .flat_map(|value| value.to_ne_bytes())
            .collect();
        assert_eq!(
            gl.calls(),
            vec![GlCall::BufferData {
                target: BufferTarget::ElementArray,
                bytes: expected,
                usage: BufferUsage::StreamDraw,
            }]
        );
    }

    #[test]
    fn deleting_releases_objects() {
        let gl = RecordingGl::new();
        let vao = gen_bind_vertex_array(&gl).unwrap();
        let vbo = gen_bind_buffer(&gl, BufferTarget::Array).unwrap();

        delete_buffer(&gl, vbo);
        delete_vertex_array(&gl, vao);

        assert_eq!(gl.live_buffers(), 0);
        assert_eq!(gl.live_vertex_arrays(), 0);
    }
}
