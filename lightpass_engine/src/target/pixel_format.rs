/// Render target attachment formats
///
/// An attachment is requested as channel count + bit depth + scalar type
/// and resolved to exactly one [`InternalFormat`]. Only the pairs
/// (8, normalized), (16, normalized), (16, float) and (32, float) exist;
/// everything else is rejected when the target is built.

use std::fmt;

use crate::error::{Error, Result};
use crate::graphics_device::InternalFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channels {
    Red,
    Rgb,
    Rgba,
}

/// How stored values are interpreted when sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// Unsigned integer mapped to [0, 1]
    Normalized,
    Float,
}

/// Requested storage of one color attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentFormat {
    pub channels: Channels,
    pub bits: u32,
    pub scalar: Scalar,
}

impl AttachmentFormat {
    pub const fn new(channels: Channels, bits: u32, scalar: Scalar) -> Self {
        Self { channels, bits, scalar }
    }

    /// 8-bit normalized
    pub const fn unorm8(channels: Channels) -> Self {
        Self::new(channels, 8, Scalar::Normalized)
    }

    /// 16-bit half float
    pub const fn half(channels: Channels) -> Self {
        Self::new(channels, 16, Scalar::Float)
    }

    /// 32-bit float
    pub const fn full(channels: Channels) -> Self {
        Self::new(channels, 32, Scalar::Float)
    }

    /// Concrete GPU format of this request
    ///
    /// # Errors
    ///
    /// `Error::PixelFormat` naming the request when the bit depth and
    /// scalar type do not form a supported pair.
    pub fn resolve(&self) -> Result<InternalFormat> {
        use Channels::*;
        use InternalFormat::*;
        use Scalar::*;

        let format = match (self.channels, self.bits, self.scalar) {
            (Red, 8, Normalized) => R8,
            (Red, 16, Normalized) => R16,
            (Red, 16, Float) => R16F,
            (Red, 32, Float) => R32F,
            (Rgb, 8, Normalized) => RGB8,
            (Rgb, 16, Normalized) => RGB16,
            (Rgb, 16, Float) => RGB16F,
            (Rgb, 32, Float) => RGB32F,
            (Rgba, 8, Normalized) => RGBA8,
            (Rgba, 16, Normalized) => RGBA16,
            (Rgba, 16, Float) => RGBA16F,
            (Rgba, 32, Float) => RGBA32F,
            _ => crate::engine_bail!(
                "lightpass::PixelFormat",
                Error::PixelFormat,
                "{} is not a supported attachment format",
                self
            ),
        };
        Ok(format)
    }
}

impl fmt::Display for AttachmentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channels = match self.channels {
            Channels::Red => "R",
            Channels::Rgb => "RGB",
            Channels::Rgba => "RGBA",
        };
        let scalar = match self.scalar {
            Scalar::Normalized => "unorm",
            Scalar::Float => "float",
        };
        write!(f, "{}{} {}", channels, self.bits, scalar)
    }
}

#[cfg(test)]
#[path = "pixel_format_tests.rs"]
mod tests;
