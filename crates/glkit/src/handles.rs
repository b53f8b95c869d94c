//! Typed GL object names and the enums that select binding targets.
//!
//! Every object kind gets its own newtype so a texture name can never be handed
//! to `bind_buffer`. Names are non-zero; "unbind" is spelled `None`.
use std::fmt;
use std::num::NonZeroU32;

macro_rules! gl_name {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(NonZeroU32);

        impl $name {
            pub const fn new(raw: NonZeroU32) -> Self {
                Self(raw)
            }

            /// Returns `None` for the reserved zero name.
            pub fn from_raw(raw: u32) -> Option<Self> {
                NonZeroU32::new(raw).map(Self)
            }

            pub const fn get(self) -> NonZeroU32 {
                self.0
            }

            pub const fn raw(self) -> u32 {
                self.0.get()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

gl_name!(
    /// A compiled but unlinked shader stage.
    ShaderId
);
gl_name!(
    /// A linked vertex + fragment program.
    ProgramId
);
gl_name!(BufferId);
gl_name!(VertexArrayId);
gl_name!(TextureId);

/// Location of a uniform inside a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

pub(crate) mod consts {
    pub const FRAGMENT_SHADER: u32 = 0x8B30;
    pub const VERTEX_SHADER: u32 = 0x8B31;
    pub const ARRAY_BUFFER: u32 = 0x8892;
    pub const ELEMENT_ARRAY_BUFFER: u32 = 0x8893;
    pub const STREAM_DRAW: u32 = 0x88E0;
    pub const STATIC_DRAW: u32 = 0x88E4;
    pub const DYNAMIC_DRAW: u32 = 0x88E8;
    pub const TEXTURE_MAG_FILTER: u32 = 0x2800;
    pub const TEXTURE_MIN_FILTER: u32 = 0x2801;
    pub const TEXTURE_WRAP_S: u32 = 0x2802;
    pub const TEXTURE_WRAP_T: u32 = 0x2803;
    pub const LINEAR: u32 = 0x2601;
    pub const REPEAT: u32 = 0x2901;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    pub const fn to_gl(self) -> u32 {
        match self {
            Self::Vertex => consts::VERTEX_SHADER,
            Self::Fragment => consts::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data.
    Array,
    /// Index data.
    ElementArray,
}

impl BufferTarget {
    pub const fn to_gl(self) -> u32 {
        match self {
            Self::Array => consts::ARRAY_BUFFER,
            Self::ElementArray => consts::ELEMENT_ARRAY_BUFFER,
        }
    }
}

/// Upload frequency hint passed through to `glBufferData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    StaticDraw,
    DynamicDraw,
    StreamDraw,
}

impl BufferUsage {
    pub const fn to_gl(self) -> u32 {
        match self {
            Self::StaticDraw => consts::STATIC_DRAW,
            Self::DynamicDraw => consts::DYNAMIC_DRAW,
            Self::StreamDraw => consts::STREAM_DRAW,
        }
    }
}

/// The subset of `glTexParameteri` state this crate touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureParameter {
    WrapS(TextureWrap),
    WrapT(TextureWrap),
    MinFilter(TextureFilter),
    MagFilter(TextureFilter),
}

impl TextureParameter {
    /// `(pname, param)` as handed to `glTexParameteri`.
    pub const fn to_gl(self) -> (u32, i32) {
        match self {
            Self::WrapS(wrap) => (consts::TEXTURE_WRAP_S, wrap.to_gl()),
            Self::WrapT(wrap) => (consts::TEXTURE_WRAP_T, wrap.to_gl()),
            Self::MinFilter(filter) => (consts::TEXTURE_MIN_FILTER, filter.to_gl()),
            Self::MagFilter(filter) => (consts::TEXTURE_MAG_FILTER, filter.to_gl()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    Repeat,
}

impl TextureWrap {
    pub const fn to_gl(self) -> i32 {
        match self {
            Self::Repeat => consts::REPEAT as i32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    Linear,
}

impl TextureFilter {
    pub const fn to_gl(self) -> i32 {
        match self {
            Self::Linear => consts::LINEAR as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_a_name() {
        assert!(ProgramId::from_raw(0).is_none());
        assert_eq!(ProgramId::from_raw(7).map(ProgramId::raw), Some(7));
    }

    #[test]
    fn texture_parameters_map_to_gl_pairs() {
        assert_eq!(
            TextureParameter::WrapS(TextureWrap::Repeat).to_gl(),
            (0x2802, 0x2901)
        );
        assert_eq!(
            TextureParameter::MagFilter(TextureFilter::Linear).to_gl(),
            (0x2800, 0x2601)
        );
    }

    #[test]
    fn shader_kinds_map_to_stage_enums() {
        assert_eq!(ShaderKind::Vertex.to_gl(), 0x8B31);
        assert_eq!(ShaderKind::Fragment.to_gl(), 0x8B30);
        assert_eq!(ShaderKind::Fragment.to_string(), "fragment");
    }
}
