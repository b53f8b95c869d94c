//! PNG decoding and 2D texture upload.
//!
//! Images are decoded with `image`, widened to 16 bits per channel and then
//! narrowed back to bytes with an integer division by 256. That is not the
//! exact inverse of the 8 -> 16 bit widening (which multiplies by 257), but
//! it maps every 8-bit source value back to itself and is the rounding
//! existing content was authored against.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::{DynamicImage, ImageError, ImageFormat};
pub use kitconfig::AlphaPacking;

use crate::backend::GlBackend;
use crate::error::{GlError, Result};
use crate::handles::{TextureFilter, TextureId, TextureParameter, TextureWrap};

const BYTES_PER_PIXEL: usize = 4;

/// Decoded pixels ready for `glTexImage2D` with `GL_RGBA` / `GL_UNSIGNED_BYTE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Flattens `image` into row-major RGBA bytes.
///
/// With [`AlphaPacking::Legacy`] the buffer is still `width * height * 4`
/// bytes long, but every pixel is written three bytes after the previous one:
/// each alpha byte except the last is replaced by the following red byte and
/// the tail of the buffer stays zeroed.
pub fn pack_rgba(image: &DynamicImage, packing: AlphaPacking) -> Vec<u8> {
    let rgba = image.to_rgba16();
    let mut pixels = vec![0u8; rgba.width() as usize * rgba.height() as usize * BYTES_PER_PIXEL];
    let stride = match packing {
        AlphaPacking::Fixed => BYTES_PER_PIXEL,
        AlphaPacking::Legacy => BYTES_PER_PIXEL - 1,
    };

    let mut index = 0;
    for pixel in rgba.pixels() {
        for (offset, channel) in pixel.0.iter().enumerate() {
            pixels[index + offset] = (channel / 256) as u8;
        }
        index += stride;
    }
    pixels
}

/// Reads a PNG file and packs it with [`pack_rgba`].
pub fn decode_png(path: &Path, packing: AlphaPacking) -> Result<PackedImage> {
    let decode_error = |source| GlError::ImageDecode {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(|err| decode_error(ImageError::IoError(err)))?;
    let image = image::load(BufReader::new(file), ImageFormat::Png).map_err(decode_error)?;

    Ok(PackedImage {
        width: image.width(),
        height: image.height(),
        pixels: pack_rgba(&image, packing),
    })
}

/// Allocates a 2D texture and binds it.
pub fn gen_bind_texture(gl: &impl GlBackend) -> Result<TextureId> {
    let texture = gl.create_texture().map_err(GlError::creation("texture"))?;
    gl.bind_texture_2d(Some(texture));
    Ok(texture)
}

pub fn bind_texture(gl: &impl GlBackend, texture: TextureId) {
    gl.bind_texture_2d(Some(texture));
}

pub fn delete_texture(gl: &impl GlBackend, texture: TextureId) {
    gl.delete_texture(texture);
}

/// Loads a PNG into a new repeat-wrapped, linearly filtered, mipmapped texture.
pub fn load_texture(gl: &impl GlBackend, path: &Path) -> Result<TextureId> {
    load_texture_with(gl, path, AlphaPacking::default())
}

/// [`load_texture`] with an explicit pixel packing mode.
///
/// The file is decoded and checked against `GL_MAX_TEXTURE_SIZE` before any
/// GL object is created, so a bad path or an oversized image leaves the
/// context untouched. The texture stays bound on return.
pub fn load_texture_with(
    gl: &impl GlBackend,
    path: &Path,
    packing: AlphaPacking,
) -> Result<TextureId> {
    let image = decode_png(path, packing)?;
    let max = gl.max_texture_size();
    if image.width > max || image.height > max {
        return Err(GlError::ImageTooLarge {
            width: image.width,
            height: image.height,
            max,
        });
    }

    let texture = gen_bind_texture(gl)?;
    gl.tex_parameter_2d(TextureParameter::WrapS(TextureWrap::Repeat));
    gl.tex_parameter_2d(TextureParameter::WrapT(TextureWrap::Repeat));
    gl.tex_parameter_2d(TextureParameter::MinFilter(TextureFilter::Linear));
    gl.tex_parameter_2d(TextureParameter::MagFilter(TextureFilter::Linear));
    gl.tex_image_2d_rgba8(0, image.width, image.height, &image.pixels);
    gl.generate_mipmap_2d();

    tracing::debug!(
        %texture,
        path = %path.display(),
        width = image.width,
        height = image.height,
        ?packing,
        "uploaded texture"
    );
    Ok(texture)
}
