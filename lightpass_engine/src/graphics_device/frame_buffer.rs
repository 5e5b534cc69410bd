/// Framebuffer attachment points, clear masks and blit parameters

use bitflags::bitflags;

/// Which framebuffer binding point a bind call targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferBinding {
    /// Both read and draw
    Both,
    Read,
    Draw,
}

/// Attachment point inside a framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attachment {
    Color(u32),
    Depth,
    DepthStencil,
}

/// Entry of a draw/read buffer selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawBuffer {
    /// No color output
    None,
    Color(u32),
}

/// Result of a completeness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramebufferStatus {
    Complete,
    /// Incomplete, with the driver's reason
    Incomplete(String),
}

bitflags! {
    /// Buffers affected by a clear or blit
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlitFilter {
    Nearest,
    Linear,
}

/// Source/destination rectangle of a blit, as (x0, y0, x1, y1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BlitRect {
    /// Rectangle covering a whole `width`×`height` surface
    pub fn full(width: u32, height: u32) -> Self {
        Self { x0: 0, y0: 0, x1: width as i32, y1: height as i32 }
    }
}
