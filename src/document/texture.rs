//! Texture, sampler and image metadata.

/// Raw glTF sampler enum values (OpenGL constants).
pub mod gl {
    pub const NEAREST: u32 = 9728;
    pub const LINEAR: u32 = 9729;
    pub const NEAREST_MIPMAP_NEAREST: u32 = 9984;
    pub const LINEAR_MIPMAP_NEAREST: u32 = 9985;
    pub const NEAREST_MIPMAP_LINEAR: u32 = 9986;
    pub const LINEAR_MIPMAP_LINEAR: u32 = 9987;

    pub const REPEAT: u32 = 10497;
    pub const CLAMP_TO_EDGE: u32 = 33071;
    pub const MIRRORED_REPEAT: u32 = 33648;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagFilter {
    Nearest,
    Linear,
}

impl MagFilter {
    #[must_use]
    pub fn from_gl(value: u32) -> Option<Self> {
        match value {
            gl::NEAREST => Some(Self::Nearest),
            gl::LINEAR => Some(Self::Linear),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl MinFilter {
    #[must_use]
    pub fn from_gl(value: u32) -> Option<Self> {
        match value {
            gl::NEAREST => Some(Self::Nearest),
            gl::LINEAR => Some(Self::Linear),
            gl::NEAREST_MIPMAP_NEAREST => Some(Self::NearestMipmapNearest),
            gl::LINEAR_MIPMAP_NEAREST => Some(Self::LinearMipmapNearest),
            gl::NEAREST_MIPMAP_LINEAR => Some(Self::NearestMipmapLinear),
            gl::LINEAR_MIPMAP_LINEAR => Some(Self::LinearMipmapLinear),
            _ => None,
        }
    }

    /// Texel lookup within a mip level is nearest-neighbour.
    #[must_use]
    pub fn is_nearest(self) -> bool {
        matches!(
            self,
            Self::Nearest | Self::NearestMipmapNearest | Self::NearestMipmapLinear
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrappingMode {
    ClampToEdge,
    MirroredRepeat,
    #[default]
    Repeat,
}

impl WrappingMode {
    #[must_use]
    pub fn from_gl(value: u32) -> Option<Self> {
        match value {
            gl::CLAMP_TO_EDGE => Some(Self::ClampToEdge),
            gl::MIRRORED_REPEAT => Some(Self::MirroredRepeat),
            gl::REPEAT => Some(Self::Repeat),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sampler {
    pub mag_filter: Option<MagFilter>,
    pub min_filter: Option<MinFilter>,
    pub wrap_s: WrappingMode,
    pub wrap_t: WrappingMode,
}

#[derive(Debug, Clone, Default)]
pub struct Image {
    pub name: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Texture {
    pub source: usize,
    pub sampler: Option<usize>,
}
