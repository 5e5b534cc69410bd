/// Ssao - screen-space ambient occlusion from the G-buffer
///
/// Renders a single-channel occlusion factor into its own target. The
/// occlusion shader reads view-space position and normal from the
/// G-buffer, a 64-sample hemisphere kernel from uniform binding 6 and a
/// tiled 4×4 rotation noise texture. The lighting pass then samples the
/// result on texture unit 29.

use std::rc::Rc;

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use crate::context::bindings::{SSAO_KERNEL_BINDING, SSAO_NOISE_UNIT, SSAO_UNIT};
use crate::context::{BlockLayout, FieldKind, RenderContext, UniformBlock};
use crate::error::Result;
use crate::graphics_device::{
    GraphicsDevice, ImageTarget, InternalFormat, PixelLayout, PixelType, SamplerDesc, TexImageDesc,
    TextureId, TextureTarget, TextureWrap,
};
use crate::resource::shader::Shader;
use crate::resource::textures::{TextureType, Textures};
use crate::target::{
    AttachmentFormat, Channels, DepthAttachment, FrameBuffer, FramebufferDesc, TargetContents,
    TargetWriting,
};

pub const SSAO_KERNEL_SIZE: usize = 64;

/// Side of the square noise tile
pub const SSAO_NOISE_SIZE: u32 = 4;

/// Seed of the kernel and noise generator
pub const SSAO_SEED: u64 = 0x55A0;

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Hemisphere samples around +Z, denser near the origin
pub fn generate_kernel(rng: &mut impl Rng) -> Vec<Vec3> {
    (0..SSAO_KERNEL_SIZE)
        .map(|i| {
            let direction = Vec3::new(
                rng.random::<f32>() * 2.0 - 1.0,
                rng.random::<f32>() * 2.0 - 1.0,
                rng.random::<f32>(),
            )
            .normalize_or_zero();
            let t = i as f32 / SSAO_KERNEL_SIZE as f32;
            direction * rng.random::<f32>() * lerp(0.1, 1.0, t * t)
        })
        .collect()
}

/// Random rotations in the tangent plane (z = 0)
pub fn generate_noise(rng: &mut impl Rng) -> Vec<Vec3> {
    (0..SSAO_NOISE_SIZE * SSAO_NOISE_SIZE)
        .map(|_| Vec3::new(rng.random::<f32>() * 2.0 - 1.0, rng.random::<f32>() * 2.0 - 1.0, 0.0))
        .collect()
}

pub struct Ssao {
    device: Rc<dyn GraphicsDevice>,
    target: FrameBuffer,
    kernel: UniformBlock,
    noise: Textures,
    dims: Vec2,
}

impl Ssao {
    pub fn new(ctx: &RenderContext, width: u32, height: u32, shader: Rc<Shader>) -> Result<Self> {
        let target = FrameBuffer::new(
            ctx,
            &FramebufferDesc::new(width, height)
                .with_colors([AttachmentFormat::unorm8(Channels::Red)])
                .with_depth(DepthAttachment::None),
            shader,
        )?;

        let mut rng = Xoshiro256StarStar::seed_from_u64(SSAO_SEED);
        let samples = generate_kernel(&mut rng);
        let rotations = generate_noise(&mut rng);

        let kernel = UniformBlock::new(ctx.device().clone(), SSAO_KERNEL_BINDING, Self::kernel_layout())?;
        kernel.set_vec3_array("samples", &samples);

        let device = ctx.device().clone();
        let noise_texture = device.create_texture()?;
        let mut noise = Textures::new(ctx);
        noise.adopt_texture(TextureType::Noise, noise_texture);

        device.bind_texture(TextureTarget::Texture2D, Some(noise_texture));
        device.tex_image_2d(
            ImageTarget::Texture2D,
            &TexImageDesc {
                internal_format: InternalFormat::RGB16F,
                layout: PixelLayout::Rgb,
                pixel_type: PixelType::Float,
                width: SSAO_NOISE_SIZE,
                height: SSAO_NOISE_SIZE,
            },
            Some(bytemuck::cast_slice(&rotations)),
        );
        device.set_sampler(TextureTarget::Texture2D, &SamplerDesc::nearest(TextureWrap::Repeat));
        device.bind_texture(TextureTarget::Texture2D, None);

        crate::engine_info!(
            "lightpass::Ssao",
            "Ambient occlusion {}x{}, {} kernel samples",
            width,
            height,
            SSAO_KERNEL_SIZE
        );

        Ok(Self {
            device,
            target,
            kernel,
            noise,
            dims: Vec2::new(width as f32, height as f32),
        })
    }

    /// `vec3 samples[64];` with a vec4 stride
    pub fn kernel_layout() -> BlockLayout {
        BlockLayout::builder().array("samples", FieldKind::Vec3, SSAO_KERNEL_SIZE).build()
    }

    pub fn target(&self) -> &FrameBuffer {
        &self.target
    }

    pub fn kernel(&self) -> &UniformBlock {
        &self.kernel
    }

    /// The noise tile, as `texture_noise1`
    pub fn noise(&self) -> &Textures {
        &self.noise
    }

    pub fn noise_texture(&self) -> Option<TextureId> {
        self.noise.id(0)
    }

    pub fn bind_framebuffer(&self) -> SsaoWriting<'_> {
        SsaoWriting { ssao: self, writing: self.target.bind_framebuffer() }
    }
}

/// The occlusion target is bound for writing
#[must_use = "the occlusion target must be rendered before it can be sampled"]
pub struct SsaoWriting<'a> {
    ssao: &'a Ssao,
    writing: TargetWriting<'a>,
}

impl<'a> SsaoWriting<'a> {
    /// Draw the occlusion factor and return to the default framebuffer
    ///
    /// Only the G-buffer entries at `units` are bound (typically position
    /// and normal), on the same units they have in the full set.
    pub fn render(self, gbuffer: &Textures, units: &[usize]) -> SsaoResult<'a> {
        let ssao = self.ssao;
        let shader = ssao.target.shader();
        shader.use_program();
        gbuffer.use_textures_subset(shader, units);
        shader.set_vec2("dims", ssao.dims);

        ssao.device.active_texture(SSAO_NOISE_UNIT);
        shader.set_int("noise", SSAO_NOISE_UNIT as i32);
        ssao.device.bind_texture(TextureTarget::Texture2D, ssao.noise_texture());

        self.writing.draw_with(shader, None, &[]);
        SsaoResult { ssao, contents: self.writing.finish() }
    }
}

/// Rendered occlusion factor
#[derive(Clone, Copy)]
pub struct SsaoResult<'a> {
    ssao: &'a Ssao,
    contents: TargetContents<'a>,
}

impl SsaoResult<'_> {
    pub fn occlusion_texture(&self) -> Option<TextureId> {
        self.contents.color_texture(0)
    }

    /// Expose the occlusion factor to `shader` as `ssao` on unit 29
    pub fn use_ssao(&self, shader: &Shader) {
        shader.use_program();
        self.ssao.device.active_texture(SSAO_UNIT);
        shader.set_int("ssao", SSAO_UNIT as i32);
        self.ssao.device.bind_texture(TextureTarget::Texture2D, self.occlusion_texture());
    }
}

#[cfg(test)]
#[path = "ssao_tests.rs"]
mod tests;
