//! Error types for the lightpass pipeline
//!
//! Every resource-creation failure (shader, texture, framebuffer, shadow map,
//! model import, pixel format) surfaces as one of these variants, with a
//! message naming the failing resource.

use std::fmt;

/// Result type for lightpass operations
pub type Result<T> = std::result::Result<T, Error>;

/// lightpass errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Shader source could not be read, compiled or linked
    Shader(String),

    /// Image could not be decoded or has an unsupported layout
    Texture(String),

    /// Framebuffer is incomplete
    Framebuffer(String),

    /// Shadow map target could not be created
    Shadow(String),

    /// 3-D asset import failed
    Model(String),

    /// Requested attachment format has no GPU counterpart
    PixelFormat(String),

    /// Invalid resource or capacity exceeded
    InvalidResource(String),

    /// Backend-specific error (driver, context)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Shader(msg) => write!(f, "Shader error: {}", msg),
            Error::Texture(msg) => write!(f, "Texture error: {}", msg),
            Error::Framebuffer(msg) => write!(f, "Framebuffer error: {}", msg),
            Error::Shadow(msg) => write!(f, "Shadow error: {}", msg),
            Error::Model(msg) => write!(f, "Model error: {}", msg),
            Error::PixelFormat(msg) => write!(f, "Unsupported pixel format: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
        }
    }
}

impl std::error::Error for Error {}

/// Log an error and build it, without returning
///
/// ```ignore
/// let err = engine_err!("lightpass::Textures", Error::Texture, "Failed to load texture from {}", path);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $variant:path, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $variant(message)
    }};
}

/// Log an error and return it from the current function
///
/// ```ignore
/// engine_bail!("lightpass::FrameBuffer", Error::Framebuffer, "Framebuffer is not complete");
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $variant:path, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $variant, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
