/// Conversions from engine enums to OpenGL constants
///
/// Pure functions, usable without a GL context.

use lightpass_engine::lightpass::device::{
    Attachment, BlitFilter, BufferTarget, BufferUsage, Capability, ClearFlags, DepthFunc,
    DrawBuffer, FramebufferBinding, ImageTarget, InternalFormat, PixelLayout, PixelType,
    TextureFilter, TextureTarget, TextureWrap,
};

pub fn internal_format(format: InternalFormat) -> u32 {
    match format {
        InternalFormat::R8 => glow::R8,
        InternalFormat::R16 => glow::R16,
        InternalFormat::R16F => glow::R16F,
        InternalFormat::R32F => glow::R32F,
        InternalFormat::RGB8 => glow::RGB8,
        InternalFormat::RGB16 => glow::RGB16,
        InternalFormat::RGB16F => glow::RGB16F,
        InternalFormat::RGB32F => glow::RGB32F,
        InternalFormat::RGBA8 => glow::RGBA8,
        InternalFormat::RGBA16 => glow::RGBA16,
        InternalFormat::RGBA16F => glow::RGBA16F,
        InternalFormat::RGBA32F => glow::RGBA32F,
        InternalFormat::SRGB8 => glow::SRGB8,
        InternalFormat::SRGB8_ALPHA8 => glow::SRGB8_ALPHA8,
        InternalFormat::DEPTH_COMPONENT24 => glow::DEPTH_COMPONENT24,
        InternalFormat::DEPTH_COMPONENT32F => glow::DEPTH_COMPONENT32F,
        InternalFormat::DEPTH24_STENCIL8 => glow::DEPTH24_STENCIL8,
    }
}

pub fn pixel_layout(layout: PixelLayout) -> u32 {
    match layout {
        PixelLayout::Red => glow::RED,
        PixelLayout::Rgb => glow::RGB,
        PixelLayout::Rgba => glow::RGBA,
        PixelLayout::Depth => glow::DEPTH_COMPONENT,
        PixelLayout::DepthStencil => glow::DEPTH_STENCIL,
    }
}

pub fn pixel_type(ty: PixelType) -> u32 {
    match ty {
        PixelType::UnsignedByte => glow::UNSIGNED_BYTE,
        PixelType::UnsignedShort => glow::UNSIGNED_SHORT,
        PixelType::UnsignedInt24_8 => glow::UNSIGNED_INT_24_8,
        PixelType::Float => glow::FLOAT,
    }
}

pub fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Vertex => glow::ARRAY_BUFFER,
        BufferTarget::Index => glow::ELEMENT_ARRAY_BUFFER,
        BufferTarget::Uniform => glow::UNIFORM_BUFFER,
    }
}

pub fn buffer_usage(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::StaticDraw => glow::STATIC_DRAW,
        BufferUsage::DynamicDraw => glow::DYNAMIC_DRAW,
    }
}

pub fn texture_target(target: TextureTarget) -> u32 {
    match target {
        TextureTarget::Texture2D => glow::TEXTURE_2D,
        TextureTarget::CubeMap => glow::TEXTURE_CUBE_MAP,
        TextureTarget::Texture2DMultisample => glow::TEXTURE_2D_MULTISAMPLE,
    }
}

pub fn image_target(target: ImageTarget) -> u32 {
    match target {
        ImageTarget::Texture2D => glow::TEXTURE_2D,
        ImageTarget::CubeFace(face) => glow::TEXTURE_CUBE_MAP_POSITIVE_X + face.index(),
    }
}

pub fn texture_filter(filter: TextureFilter) -> u32 {
    match filter {
        TextureFilter::Nearest => glow::NEAREST,
        TextureFilter::Linear => glow::LINEAR,
        TextureFilter::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
    }
}

pub fn texture_wrap(wrap: TextureWrap) -> u32 {
    match wrap {
        TextureWrap::Repeat => glow::REPEAT,
        TextureWrap::ClampToEdge => glow::CLAMP_TO_EDGE,
        TextureWrap::ClampToBorder => glow::CLAMP_TO_BORDER,
    }
}

pub fn framebuffer_binding(binding: FramebufferBinding) -> u32 {
    match binding {
        FramebufferBinding::Both => glow::FRAMEBUFFER,
        FramebufferBinding::Read => glow::READ_FRAMEBUFFER,
        FramebufferBinding::Draw => glow::DRAW_FRAMEBUFFER,
    }
}

pub fn attachment(attachment: Attachment) -> u32 {
    match attachment {
        Attachment::Color(i) => glow::COLOR_ATTACHMENT0 + i,
        Attachment::Depth => glow::DEPTH_ATTACHMENT,
        Attachment::DepthStencil => glow::DEPTH_STENCIL_ATTACHMENT,
    }
}

pub fn draw_buffer(buffer: DrawBuffer) -> u32 {
    match buffer {
        DrawBuffer::None => glow::NONE,
        DrawBuffer::Color(i) => glow::COLOR_ATTACHMENT0 + i,
    }
}

pub fn clear_mask(flags: ClearFlags) -> u32 {
    let mut mask = 0;
    if flags.contains(ClearFlags::COLOR) {
        mask |= glow::COLOR_BUFFER_BIT;
    }
    if flags.contains(ClearFlags::DEPTH) {
        mask |= glow::DEPTH_BUFFER_BIT;
    }
    if flags.contains(ClearFlags::STENCIL) {
        mask |= glow::STENCIL_BUFFER_BIT;
    }
    mask
}

pub fn blit_filter(filter: BlitFilter) -> u32 {
    match filter {
        BlitFilter::Nearest => glow::NEAREST,
        BlitFilter::Linear => glow::LINEAR,
    }
}

pub fn capability(capability: Capability) -> u32 {
    match capability {
        Capability::DepthTest => glow::DEPTH_TEST,
        Capability::CullFace => glow::CULL_FACE,
    }
}

pub fn depth_func(func: DepthFunc) -> u32 {
    match func {
        DepthFunc::Less => glow::LESS,
        DepthFunc::LessEqual => glow::LEQUAL,
    }
}

/// Readable reason of a `glCheckFramebufferStatus` result
pub fn framebuffer_status_reason(status: u32) -> &'static str {
    match status {
        glow::FRAMEBUFFER_COMPLETE => "complete",
        glow::FRAMEBUFFER_UNDEFINED => "undefined",
        glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => "incomplete attachment",
        glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => "missing attachment",
        glow::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => "incomplete draw buffer",
        glow::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => "incomplete read buffer",
        glow::FRAMEBUFFER_UNSUPPORTED => "unsupported",
        glow::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => "incomplete multisample",
        glow::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS => "incomplete layer targets",
        _ => "unknown status",
    }
}

#[cfg(test)]
#[path = "gl_format_tests.rs"]
mod tests;
