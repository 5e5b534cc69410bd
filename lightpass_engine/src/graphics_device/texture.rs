/// Texture formats, targets and sampling state

/// GPU-side storage format of a texture or renderbuffer
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InternalFormat {
    R8,
    R16,
    R16F,
    R32F,
    RGB8,
    RGB16,
    RGB16F,
    RGB32F,
    RGBA8,
    RGBA16,
    RGBA16F,
    RGBA32F,
    /// sRGB-encoded color, decoded to linear on sampling
    SRGB8,
    /// sRGB-encoded color with linear alpha
    SRGB8_ALPHA8,
    DEPTH_COMPONENT24,
    DEPTH_COMPONENT32F,
    DEPTH24_STENCIL8,
}

impl InternalFormat {
    /// Client-side layout and scalar type used when allocating storage
    /// without data (render target attachments)
    pub fn upload_layout(&self) -> (PixelLayout, PixelType) {
        use InternalFormat::*;
        match self {
            R8 => (PixelLayout::Red, PixelType::UnsignedByte),
            R16 => (PixelLayout::Red, PixelType::UnsignedShort),
            R16F | R32F => (PixelLayout::Red, PixelType::Float),
            RGB8 | SRGB8 => (PixelLayout::Rgb, PixelType::UnsignedByte),
            RGB16 => (PixelLayout::Rgb, PixelType::UnsignedShort),
            RGB16F | RGB32F => (PixelLayout::Rgb, PixelType::Float),
            RGBA8 | SRGB8_ALPHA8 => (PixelLayout::Rgba, PixelType::UnsignedByte),
            RGBA16 => (PixelLayout::Rgba, PixelType::UnsignedShort),
            RGBA16F | RGBA32F => (PixelLayout::Rgba, PixelType::Float),
            DEPTH_COMPONENT24 | DEPTH_COMPONENT32F => (PixelLayout::Depth, PixelType::Float),
            DEPTH24_STENCIL8 => (PixelLayout::DepthStencil, PixelType::UnsignedInt24_8),
        }
    }

    /// True for depth and depth/stencil formats
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            InternalFormat::DEPTH_COMPONENT24
                | InternalFormat::DEPTH_COMPONENT32F
                | InternalFormat::DEPTH24_STENCIL8
        )
    }

    /// True when sampling applies the sRGB transfer curve
    pub fn is_srgb(&self) -> bool {
        matches!(self, InternalFormat::SRGB8 | InternalFormat::SRGB8_ALPHA8)
    }

    /// True for floating point color formats (HDR capable)
    pub fn is_float(&self) -> bool {
        !self.is_depth() && self.upload_layout().1 == PixelType::Float
    }
}

/// Channel layout of client pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    Red,
    Rgb,
    Rgba,
    Depth,
    DepthStencil,
}

impl PixelLayout {
    /// Layout matching a decoded image's channel count
    pub fn from_channels(channels: u32) -> Option<PixelLayout> {
        match channels {
            1 => Some(PixelLayout::Red),
            3 => Some(PixelLayout::Rgb),
            4 => Some(PixelLayout::Rgba),
            _ => None,
        }
    }

    pub fn channels(&self) -> u32 {
        match self {
            PixelLayout::Red | PixelLayout::Depth => 1,
            PixelLayout::DepthStencil => 2,
            PixelLayout::Rgb => 3,
            PixelLayout::Rgba => 4,
        }
    }
}

/// Scalar type of client pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelType {
    UnsignedByte,
    UnsignedShort,
    UnsignedInt24_8,
    Float,
}

/// Description of a 2-D image upload (or storage allocation when no data is given)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexImageDesc {
    pub internal_format: InternalFormat,
    pub layout: PixelLayout,
    pub pixel_type: PixelType,
    pub width: u32,
    pub height: u32,
}

impl TexImageDesc {
    /// Storage-only description for a render target attachment
    pub fn storage(internal_format: InternalFormat, width: u32, height: u32) -> Self {
        let (layout, pixel_type) = internal_format.upload_layout();
        Self { internal_format, layout, pixel_type, width, height }
    }
}

/// Texture binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Texture2D,
    CubeMap,
    Texture2DMultisample,
}

/// Cubemap faces in upload order (+X, -X, +Y, -Y, +Z, -Z)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Offset from the first face target
    pub fn index(&self) -> u32 {
        match self {
            CubeFace::PositiveX => 0,
            CubeFace::NegativeX => 1,
            CubeFace::PositiveY => 2,
            CubeFace::NegativeY => 3,
            CubeFace::PositiveZ => 4,
            CubeFace::NegativeZ => 5,
        }
    }
}

/// Image slot written by a 2-D upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageTarget {
    Texture2D,
    CubeFace(CubeFace),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
    /// Trilinear, requires mipmaps
    LinearMipmapLinear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureWrap {
    Repeat,
    ClampToEdge,
    ClampToBorder,
}

/// Sampling state applied to the texture bound at a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerDesc {
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    /// Applied to every coordinate (S, T and R for cubemaps)
    pub wrap: TextureWrap,
    /// Only meaningful with `TextureWrap::ClampToBorder`
    pub border_color: Option<[f32; 4]>,
}

impl SamplerDesc {
    /// Repeat + trilinear, for decoded images with mipmaps
    pub fn image() -> Self {
        Self {
            min_filter: TextureFilter::LinearMipmapLinear,
            mag_filter: TextureFilter::Linear,
            wrap: TextureWrap::Repeat,
            border_color: None,
        }
    }

    /// Clamp + linear, for render target attachments and cubemaps
    pub fn attachment() -> Self {
        Self {
            min_filter: TextureFilter::Linear,
            mag_filter: TextureFilter::Linear,
            wrap: TextureWrap::ClampToEdge,
            border_color: None,
        }
    }

    /// Nearest filtering with the given wrap mode
    pub fn nearest(wrap: TextureWrap) -> Self {
        Self {
            min_filter: TextureFilter::Nearest,
            mag_filter: TextureFilter::Nearest,
            wrap,
            border_color: None,
        }
    }
}
