//! Render target module
//!
//! Off-screen framebuffers with configurable color attachments, their
//! multisample variant, and the attachment format table.

mod frame_buffer;
mod pixel_format;

pub use frame_buffer::{
    DepthAttachment, FrameBuffer, FramebufferDesc, SampleMode, TargetContents, TargetWriting,
    NUM_AA_SAMPLES,
};
pub use pixel_format::{AttachmentFormat, Channels, Scalar};
