/// FrameBuffer - off-screen render target, single-sample or multisample
///
/// A target owns N color attachments of the formats given in its
/// [`FramebufferDesc`], an optional depth (or depth/stencil) renderbuffer,
/// a screen quad and the shader that composites the attachments. The
/// color attachments are registered as `texture_screen1..N`.
///
/// Writing and reading are separate typed stages:
///
/// ```ignore
/// let writing = gbuffer.bind_framebuffer();   // render into the target
/// draw_geometry();
/// let contents = writing.finish();            // resolve, back to the screen
/// contents.draw_scene();                      // sample the attachments
/// ```
///
/// A multisample target renders into multisample attachments and
/// [`TargetWriting::finish`] blits every one of them into the single-sample
/// sibling before a [`TargetContents`] can exist, so no shader ever samples
/// an unresolved attachment.

use std::rc::Rc;

use crate::context::RenderContext;
use crate::error::{Error, Result};
use crate::graphics_device::{
    Attachment, BlitFilter, BlitRect, Capability, ClearFlags, DrawBuffer, FramebufferBinding,
    FramebufferId, FramebufferStatus, GraphicsDevice, ImageTarget, InternalFormat, RenderbufferId,
    SamplerDesc, TexImageDesc, TextureId, TextureTarget,
};
use crate::resource::geometry::{QUAD_ATTRIBS, QUAD_VERTICES};
use crate::resource::object::GpuObject;
use crate::resource::shader::Shader;
use crate::resource::textures::{TextureType, Textures};
use crate::target::pixel_format::{AttachmentFormat, Channels};

/// Samples per pixel of multisample targets unless configured otherwise
pub const NUM_AA_SAMPLES: u32 = 8;

// ============================================================================
// Description
// ============================================================================

/// Depth storage of a render target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthAttachment {
    None,
    #[default]
    Depth,
    DepthStencil,
}

impl DepthAttachment {
    fn storage(&self) -> Option<(InternalFormat, Attachment)> {
        match self {
            DepthAttachment::None => None,
            DepthAttachment::Depth => Some((InternalFormat::DEPTH_COMPONENT24, Attachment::Depth)),
            DepthAttachment::DepthStencil => {
                Some((InternalFormat::DEPTH24_STENCIL8, Attachment::DepthStencil))
            }
        }
    }
}

/// Shape of a render target
#[derive(Debug, Clone, PartialEq)]
pub struct FramebufferDesc {
    pub width: u32,
    pub height: u32,
    /// One entry per color attachment, in attachment order
    pub color: Vec<AttachmentFormat>,
    pub depth: DepthAttachment,
    /// `Some(n)` renders into `n`-sample attachments resolved on finish
    pub samples: Option<u32>,
}

impl FramebufferDesc {
    /// One RGBA8 attachment with depth
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            color: vec![AttachmentFormat::unorm8(Channels::Rgba)],
            depth: DepthAttachment::Depth,
            samples: None,
        }
    }

    pub fn with_colors(mut self, formats: impl IntoIterator<Item = AttachmentFormat>) -> Self {
        self.color = formats.into_iter().collect();
        self
    }

    pub fn with_depth(mut self, depth: DepthAttachment) -> Self {
        self.depth = depth;
        self
    }

    pub fn multisampled(mut self, samples: u32) -> Self {
        self.samples = Some(samples);
        self
    }
}

/// Sampling variant of a built target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleMode {
    Single,
    Multi { samples: u32 },
}

// ============================================================================
// Attachment set
// ============================================================================

/// One framebuffer object with the attachments it owns
struct AttachmentSet {
    device: Rc<dyn GraphicsDevice>,
    framebuffer: FramebufferId,
    colors: Vec<TextureId>,
    depth: Option<RenderbufferId>,
}

impl AttachmentSet {
    /// Create and attach everything, then check completeness
    ///
    /// Objects created before a failure are released when the partially
    /// built set drops.
    fn build(
        device: &Rc<dyn GraphicsDevice>,
        width: u32,
        height: u32,
        formats: &[InternalFormat],
        depth: DepthAttachment,
        samples: Option<u32>,
    ) -> Result<Self> {
        let framebuffer = device.create_framebuffer()?;
        let mut set = Self {
            device: device.clone(),
            framebuffer,
            colors: Vec::with_capacity(formats.len()),
            depth: None,
        };

        device.bind_framebuffer(FramebufferBinding::Both, Some(framebuffer));

        let texture_target = match samples {
            Some(_) => TextureTarget::Texture2DMultisample,
            None => TextureTarget::Texture2D,
        };
        for (i, format) in formats.iter().enumerate() {
            let texture = device.create_texture()?;
            set.colors.push(texture);

            device.bind_texture(texture_target, Some(texture));
            match samples {
                Some(samples) => device.tex_image_2d_multisample(samples, *format, width, height),
                None => {
                    let desc = TexImageDesc::storage(*format, width, height);
                    device.tex_image_2d(ImageTarget::Texture2D, &desc, None);
                    device.set_sampler(TextureTarget::Texture2D, &SamplerDesc::attachment());
                }
            }
            device.framebuffer_texture_2d(Attachment::Color(i as u32), texture_target, texture);
        }
        device.bind_texture(texture_target, None);

        if let Some((format, attachment)) = depth.storage() {
            let renderbuffer = device.create_renderbuffer()?;
            set.depth = Some(renderbuffer);
            device.renderbuffer_storage(renderbuffer, samples, format, width, height);
            device.framebuffer_renderbuffer(attachment, renderbuffer);
        }

        let status = device.check_framebuffer_status();
        device.bind_framebuffer(FramebufferBinding::Both, None);

        if let FramebufferStatus::Incomplete(reason) = status {
            let kind = if samples.is_some() { "Multisample framebuffer" } else { "Framebuffer" };
            crate::engine_bail!(
                "lightpass::FrameBuffer",
                Error::Framebuffer,
                "{} not complete ({})",
                kind,
                reason
            );
        }
        Ok(set)
    }
}

impl Drop for AttachmentSet {
    fn drop(&mut self) {
        self.device.delete_framebuffer(self.framebuffer);
        for texture in &self.colors {
            self.device.delete_texture(*texture);
        }
        if let Some(renderbuffer) = self.depth {
            self.device.delete_renderbuffer(renderbuffer);
        }
    }
}

enum Variant {
    Single,
    /// Multisample attachments rendered into, resolved into the sampled set
    Multi { samples: u32, multisample: AttachmentSet },
}

// ============================================================================
// FrameBuffer
// ============================================================================

pub struct FrameBuffer {
    device: Rc<dyn GraphicsDevice>,
    /// Single-sample attachments read by shaders
    sampled: AttachmentSet,
    variant: Variant,
    textures: Textures,
    quad: GpuObject,
    shader: Rc<Shader>,
    width: u32,
    height: u32,
}

impl FrameBuffer {
    /// Build a target from `desc`, composited with `shader`
    ///
    /// # Errors
    ///
    /// - `Error::PixelFormat` for an unsupported attachment format
    /// - `Error::Framebuffer` for an empty or zero-sized description, or
    ///   when the driver reports the framebuffer incomplete
    pub fn new(ctx: &RenderContext, desc: &FramebufferDesc, shader: Rc<Shader>) -> Result<Self> {
        if desc.width == 0 || desc.height == 0 {
            crate::engine_bail!(
                "lightpass::FrameBuffer",
                Error::Framebuffer,
                "Framebuffer size {}x{} is empty",
                desc.width,
                desc.height
            );
        }
        if desc.color.is_empty() {
            crate::engine_bail!(
                "lightpass::FrameBuffer",
                Error::Framebuffer,
                "Framebuffer needs at least one color attachment"
            );
        }
        if desc.samples == Some(0) {
            crate::engine_bail!(
                "lightpass::FrameBuffer",
                Error::Framebuffer,
                "Multisample framebuffer needs at least one sample"
            );
        }

        let formats = desc
            .color
            .iter()
            .map(AttachmentFormat::resolve)
            .collect::<Result<Vec<_>>>()?;

        let device = ctx.device().clone();
        let (sampled, variant) = match desc.samples {
            None => {
                let sampled =
                    AttachmentSet::build(&device, desc.width, desc.height, &formats, desc.depth, None)?;
                (sampled, Variant::Single)
            }
            Some(samples) => {
                let sampled = AttachmentSet::build(
                    &device,
                    desc.width,
                    desc.height,
                    &formats,
                    DepthAttachment::None,
                    None,
                )?;
                let multisample = AttachmentSet::build(
                    &device,
                    desc.width,
                    desc.height,
                    &formats,
                    desc.depth,
                    Some(samples),
                )?;
                (sampled, Variant::Multi { samples, multisample })
            }
        };

        let mut textures = Textures::new(ctx);
        for texture in &sampled.colors {
            textures.add_texture(TextureType::Screen, *texture);
        }

        let mut quad = GpuObject::new(ctx)?;
        {
            let mut setup = quad.start_setup();
            setup.add_vertices(&QUAD_VERTICES)?;
            setup.add_vertex_attribs(&QUAD_ATTRIBS);
            setup.finalize();
        }

        crate::engine_info!(
            "lightpass::FrameBuffer",
            "Render target {}x{} with {} color attachment(s){}",
            desc.width,
            desc.height,
            formats.len(),
            match desc.samples {
                Some(samples) => format!(", {}x multisampled", samples),
                None => String::new(),
            }
        );

        Ok(Self {
            device,
            sampled,
            variant,
            textures,
            quad,
            shader,
            width: desc.width,
            height: desc.height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn shader(&self) -> &Rc<Shader> {
        &self.shader
    }

    /// Resolved color attachments as `texture_screen1..N`
    pub fn textures(&self) -> &Textures {
        &self.textures
    }

    pub fn color_count(&self) -> usize {
        self.sampled.colors.len()
    }

    pub fn sample_mode(&self) -> SampleMode {
        match &self.variant {
            Variant::Single => SampleMode::Single,
            Variant::Multi { samples, .. } => SampleMode::Multi { samples: *samples },
        }
    }

    /// Framebuffer that draws land in, and that holds the depth renderbuffer
    fn render_framebuffer(&self) -> FramebufferId {
        match &self.variant {
            Variant::Single => self.sampled.framebuffer,
            Variant::Multi { multisample, .. } => multisample.framebuffer,
        }
    }

    /// Activate the target for writing
    ///
    /// Clears color and depth and enables depth testing. With more than
    /// one color attachment every attachment is declared as a draw buffer.
    pub fn bind_framebuffer(&self) -> TargetWriting<'_> {
        let device = &self.device;
        device.bind_framebuffer(FramebufferBinding::Both, Some(self.render_framebuffer()));
        device.clear(ClearFlags::COLOR | ClearFlags::DEPTH);
        device.enable(Capability::DepthTest);

        let count = self.color_count();
        if count > 1 {
            let buffers: Vec<DrawBuffer> = (0..count as u32).map(DrawBuffer::Color).collect();
            device.draw_buffers(&buffers);
        }
        TargetWriting { target: self }
    }

    /// Id of resolved color attachment `index`, for wiring the target as
    /// an input of later passes at construction time
    pub fn attachment_id(&self, index: usize) -> Option<TextureId> {
        self.sampled.colors.get(index).copied()
    }

    fn resolve(&self) {
        let Variant::Multi { multisample, .. } = &self.variant else {
            return;
        };
        let device = &self.device;
        let rect = BlitRect::full(self.width, self.height);
        device.bind_framebuffer(FramebufferBinding::Read, Some(multisample.framebuffer));
        device.bind_framebuffer(FramebufferBinding::Draw, Some(self.sampled.framebuffer));
        for i in 0..self.color_count() as u32 {
            device.read_buffer(DrawBuffer::Color(i));
            device.draw_buffers(&[DrawBuffer::Color(i)]);
            device.blit_framebuffer(rect, rect, ClearFlags::COLOR, BlitFilter::Nearest);
        }
    }
}

// ============================================================================
// Stage tokens
// ============================================================================

/// The target is bound for writing
#[must_use = "a target bound for writing must be finished before its contents are read"]
pub struct TargetWriting<'a> {
    target: &'a FrameBuffer,
}

impl<'a> TargetWriting<'a> {
    pub fn target(&self) -> &'a FrameBuffer {
        self.target
    }

    /// Draw the target's screen quad into the target itself
    ///
    /// Used by full-screen passes whose output is this target (blur,
    /// occlusion). Depth testing is disabled for the draw.
    pub fn draw_with(&self, shader: &Shader, textures: Option<&Textures>, flags: &[&str]) {
        self.target.device.disable(Capability::DepthTest);
        self.target.quad.draw(shader, textures, flags);
    }

    /// Stop writing: resolve multisample attachments, then restore the
    /// default framebuffer and clear its color
    pub fn finish(self) -> TargetContents<'a> {
        let contents = self.finish_pass();
        let device = &contents.target.device;
        device.bind_framebuffer(FramebufferBinding::Both, None);
        device.clear(ClearFlags::COLOR);
        contents
    }

    /// Stop writing in the middle of a pass chain: resolve multisample
    /// attachments but leave the binding and the window untouched, for
    /// the next pass to bind its own target
    pub fn finish_pass(self) -> TargetContents<'a> {
        self.target.resolve();
        TargetContents { target: self.target }
    }
}

/// The target's attachments hold finished, resolved images
#[derive(Clone, Copy)]
pub struct TargetContents<'a> {
    target: &'a FrameBuffer,
}

impl<'a> TargetContents<'a> {
    pub fn target(&self) -> &'a FrameBuffer {
        self.target
    }

    /// Resolved color attachment `index`
    pub fn color_texture(&self, index: usize) -> Option<TextureId> {
        self.target.attachment_id(index)
    }

    pub fn textures(&self) -> &'a Textures {
        &self.target.textures
    }

    /// Composite the attachments with the target's own shader
    pub fn draw_scene(&self) {
        self.draw_with(&self.target.shader, Some(&self.target.textures), &[]);
    }

    /// Draw the target's screen quad with any shader and inputs
    pub fn draw_with(&self, shader: &Shader, textures: Option<&Textures>, flags: &[&str]) {
        self.target.device.disable(Capability::DepthTest);
        self.target.quad.draw(shader, textures, flags);
    }

    /// Copy the depth attachment into the framebuffer currently bound for
    /// drawing, which stays bound afterwards
    pub fn blit_depth(&self) {
        let device = &self.target.device;
        let rect = BlitRect::full(self.target.width, self.target.height);

        device.enable(Capability::DepthTest);
        let current = device.current_draw_framebuffer();
        device.bind_framebuffer(FramebufferBinding::Read, Some(self.target.render_framebuffer()));
        device.bind_framebuffer(FramebufferBinding::Draw, current);
        device.blit_framebuffer(rect, rect, ClearFlags::DEPTH, BlitFilter::Nearest);
        device.bind_framebuffer(FramebufferBinding::Both, current);
    }
}

#[cfg(test)]
#[path = "frame_buffer_tests.rs"]
mod tests;
