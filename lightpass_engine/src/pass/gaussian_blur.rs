/// GaussianBlur - HDR accumulation target plus separable bloom blur
///
/// The scene is rendered into a two-attachment HDR target: attachment 0
/// holds the lit color, attachment 1 the part of it bright enough to
/// bloom. The bright mask is then blurred by ping-ponging between two
/// single-attachment targets, alternating horizontal and vertical passes,
/// and finally added back onto the base color by the composite shader,
/// the only place where HDR values are tone-mapped.
///
/// ```ignore
/// let writing = bloom.bind_framebuffer();
/// draw_lit_scene();
/// writing.finish().blur_scene();
/// ```

use std::rc::Rc;

use crate::context::RenderContext;
use crate::error::{Error, Result};
use crate::graphics_device::TextureId;
use crate::resource::shader::Shader;
use crate::resource::textures::{TextureType, Textures};
use crate::target::{
    AttachmentFormat, Channels, DepthAttachment, FrameBuffer, FramebufferDesc, TargetContents,
    TargetWriting,
};

/// One-sided 9-tap gaussian weights, center tap first
pub const GAUSSIAN_WEIGHTS: [f32; 5] = [0.227_027, 0.194_594_6, 0.121_621_6, 0.054_054, 0.016_216];

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomConfig {
    pub width: u32,
    pub height: u32,
    /// Number of separable blur passes
    pub passes: u32,
    /// Tone mapping exposure of the composite
    pub exposure: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self { width: 800, height: 600, passes: 10, exposure: 1.0 }
    }
}

// ============================================================================
// Pass schedule
// ============================================================================

/// Input of one blur pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurSource {
    /// Bright mask of the HDR target (attachment 1)
    BrightMask,
    /// Output of the ping-pong target with this index
    PingPong(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurPass {
    pub source: BlurSource,
    /// Ping-pong target written
    pub target: usize,
    pub horizontal: bool,
}

/// Pass `i` writes ping-pong `i % 2`, starting horizontally from the
/// bright mask and reading the previous pass afterwards
pub fn blur_schedule(passes: u32) -> Vec<BlurPass> {
    (0..passes as usize)
        .map(|i| BlurPass {
            source: if i == 0 { BlurSource::BrightMask } else { BlurSource::PingPong((i - 1) % 2) },
            target: i % 2,
            horizontal: i % 2 == 0,
        })
        .collect()
}

// ============================================================================
// Kernel
// ============================================================================

/// The separable kernel used by the blur shader, with a CPU reference
/// implementation operating on single-channel images
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianKernel {
    weights: [f32; 5],
}

impl Default for GaussianKernel {
    fn default() -> Self {
        Self { weights: GAUSSIAN_WEIGHTS }
    }
}

impl GaussianKernel {
    pub fn weights(&self) -> &[f32; 5] {
        &self.weights
    }

    /// One directional pass with clamp-to-edge sampling
    pub fn convolve(&self, image: &[f32], width: usize, height: usize, horizontal: bool) -> Vec<f32> {
        assert_eq!(image.len(), width * height, "image size does not match {}x{}", width, height);
        let sample = |x: isize, y: isize| {
            let x = x.clamp(0, width as isize - 1) as usize;
            let y = y.clamp(0, height as isize - 1) as usize;
            image[y * width + x]
        };

        let mut out = vec![0.0; image.len()];
        for y in 0..height as isize {
            for x in 0..width as isize {
                let mut sum = sample(x, y) * self.weights[0];
                for (i, weight) in self.weights.iter().enumerate().skip(1) {
                    let i = i as isize;
                    let (dx, dy) = if horizontal { (i, 0) } else { (0, i) };
                    sum += (sample(x + dx, y + dy) + sample(x - dx, y - dy)) * weight;
                }
                out[y as usize * width + x as usize] = sum;
            }
        }
        out
    }

    /// Run `schedule` on a bright mask and return the last pass output
    pub fn blur_image(&self, bright: &[f32], width: usize, height: usize, schedule: &[BlurPass]) -> Vec<f32> {
        let mut ping_pong = [bright.to_vec(), bright.to_vec()];
        let mut last = bright.to_vec();
        for pass in schedule {
            let input = match pass.source {
                BlurSource::BrightMask => bright,
                BlurSource::PingPong(i) => ping_pong[i].as_slice(),
            };
            let output = self.convolve(input, width, height, pass.horizontal);
            last.clone_from(&output);
            ping_pong[pass.target] = output;
        }
        last
    }
}

// ============================================================================
// GaussianBlur
// ============================================================================

pub struct GaussianBlur {
    hdr: FrameBuffer,
    ping_pong: [FrameBuffer; 2],
    blur_shader: Rc<Shader>,
    composite_shader: Rc<Shader>,
    schedule: Vec<BlurPass>,
    kernel: GaussianKernel,
    exposure: f32,
    /// Sampled input of each pass, by source
    bright_input: Textures,
    ping_pong_inputs: [Textures; 2],
    /// Base color plus final blur output
    composite_inputs: Textures,
}

impl GaussianBlur {
    /// # Errors
    ///
    /// `Error::InvalidResource` when `config.passes` is zero, or the
    /// errors of [`FrameBuffer::new`].
    pub fn new(
        ctx: &RenderContext,
        config: &BloomConfig,
        blur_shader: Rc<Shader>,
        composite_shader: Rc<Shader>,
    ) -> Result<Self> {
        if config.passes == 0 {
            crate::engine_bail!(
                "lightpass::GaussianBlur",
                Error::InvalidResource,
                "Bloom needs at least one blur pass"
            );
        }

        let hdr_format = AttachmentFormat::half(Channels::Rgba);
        let hdr = FrameBuffer::new(
            ctx,
            &FramebufferDesc::new(config.width, config.height).with_colors([hdr_format, hdr_format]),
            composite_shader.clone(),
        )?;
        let ping_pong_desc = FramebufferDesc::new(config.width, config.height)
            .with_colors([hdr_format])
            .with_depth(DepthAttachment::None);
        let ping_pong = [
            FrameBuffer::new(ctx, &ping_pong_desc, blur_shader.clone())?,
            FrameBuffer::new(ctx, &ping_pong_desc, blur_shader.clone())?,
        ];

        let schedule = blur_schedule(config.passes);
        let output = schedule.last().map_or(0, |pass| pass.target);

        let input = |ty: TextureType, id: Option<TextureId>| {
            let mut textures = Textures::new(ctx);
            if let Some(id) = id {
                textures.add_texture(ty, id);
            }
            textures
        };
        let bright_input = input(TextureType::Screen, hdr.attachment_id(1));
        let ping_pong_inputs = [
            input(TextureType::Screen, ping_pong[0].attachment_id(0)),
            input(TextureType::Screen, ping_pong[1].attachment_id(0)),
        ];
        let mut composite_inputs = input(TextureType::Screen, hdr.attachment_id(0));
        if let Some(id) = ping_pong[output].attachment_id(0) {
            composite_inputs.add_texture(TextureType::Bloom, id);
        }

        crate::engine_info!(
            "lightpass::GaussianBlur",
            "Bloom {}x{}, {} blur passes",
            config.width,
            config.height,
            config.passes
        );

        Ok(Self {
            hdr,
            ping_pong,
            blur_shader,
            composite_shader,
            schedule,
            kernel: GaussianKernel::default(),
            exposure: config.exposure,
            bright_input,
            ping_pong_inputs,
            composite_inputs,
        })
    }

    pub fn hdr_target(&self) -> &FrameBuffer {
        &self.hdr
    }

    pub fn ping_pong_target(&self, index: usize) -> &FrameBuffer {
        &self.ping_pong[index]
    }

    pub fn schedule(&self) -> &[BlurPass] {
        &self.schedule
    }

    pub fn kernel(&self) -> &GaussianKernel {
        &self.kernel
    }

    pub fn exposure(&self) -> f32 {
        self.exposure
    }

    pub fn set_exposure(&mut self, exposure: f32) {
        self.exposure = exposure;
    }

    /// Start rendering the lit scene into the HDR target
    pub fn bind_framebuffer(&self) -> BloomWriting<'_> {
        BloomWriting { bloom: self, writing: self.hdr.bind_framebuffer() }
    }

    fn source_input(&self, source: BlurSource) -> &Textures {
        match source {
            BlurSource::BrightMask => &self.bright_input,
            BlurSource::PingPong(i) => &self.ping_pong_inputs[i],
        }
    }
}

// ============================================================================
// Stage tokens
// ============================================================================

/// The HDR target is bound for writing
#[must_use = "the HDR target must be finished before it can be blurred"]
pub struct BloomWriting<'a> {
    bloom: &'a GaussianBlur,
    writing: TargetWriting<'a>,
}

impl<'a> BloomWriting<'a> {
    pub fn writing(&self) -> &TargetWriting<'a> {
        &self.writing
    }

    /// The lit scene is complete
    pub fn finish(self) -> BloomScene<'a> {
        BloomScene { bloom: self.bloom, contents: self.writing.finish() }
    }
}

/// Rendered HDR scene, not yet blurred
#[derive(Clone, Copy)]
pub struct BloomScene<'a> {
    bloom: &'a GaussianBlur,
    contents: TargetContents<'a>,
}

impl<'a> BloomScene<'a> {
    pub fn contents(&self) -> TargetContents<'a> {
        self.contents
    }

    /// Run the separable blur passes over the bright mask
    pub fn blur(&self) -> BlurredScene<'a> {
        let bloom = self.bloom;
        let shader = &bloom.blur_shader;
        shader.use_program();
        shader.set_float_array("weight", bloom.kernel.weights());

        let last = bloom.schedule.len().saturating_sub(1);
        for (i, pass) in bloom.schedule.iter().enumerate() {
            let writing = bloom.ping_pong[pass.target].bind_framebuffer();
            let flags: &[&str] = if pass.horizontal { &["horizontal"] } else { &[] };
            writing.draw_with(shader, Some(bloom.source_input(pass.source)), flags);
            if i == last {
                let _ = writing.finish();
            } else {
                let _ = writing.finish_pass();
            }
        }

        crate::engine_trace!("lightpass::GaussianBlur", "{} blur passes done", bloom.schedule.len());
        BlurredScene { bloom, contents: self.contents }
    }

    /// Blur, then composite base color and bloom to the default framebuffer
    pub fn blur_scene(&self) {
        self.blur().draw_scene();
    }
}

/// Blurred bright mask, ready to be composited
#[derive(Clone, Copy)]
pub struct BlurredScene<'a> {
    bloom: &'a GaussianBlur,
    contents: TargetContents<'a>,
}

impl BlurredScene<'_> {
    /// Final blur output texture
    pub fn bloom_texture(&self) -> Option<TextureId> {
        self.bloom.composite_inputs.id(1)
    }

    /// Add the bloom onto the base color and tone-map to the screen
    pub fn draw_scene(&self) {
        let bloom = self.bloom;
        let shader = &bloom.composite_shader;
        shader.use_program();
        shader.set_float("exposure", bloom.exposure);
        self.contents.draw_with(shader, Some(&bloom.composite_inputs), &[]);
    }
}

#[cfg(test)]
#[path = "gaussian_blur_tests.rs"]
mod tests;
