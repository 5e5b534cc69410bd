/// ShadowPass - depth-only render of the scene from a light
///
/// Two variants share one type: a directional light renders into a 2-D
/// depth texture through one orthographic light-space matrix, a point
/// light renders into a depth cubemap through six 90° perspective
/// matrices (one per face, usually expanded by a geometry shader).
///
/// The light transform is uploaded once at construction, to binding 8
/// (directional) or 9 (point). Each frame goes through two typed stages:
///
/// ```ignore
/// let depth = shadow.bind_depth_map();          // casters write depth
/// draw_casters(&depth_shader);
/// let map = depth.finish();                     // depth map complete
/// map.bind_shadow_map("shadow_map", &[&lit]);   // lit shaders sample it
/// ```

use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::context::bindings::{DIRECTIONAL_SHADOW_BINDING, POINT_SHADOW_BINDING, SHADOW_MAP_UNIT};
use crate::context::{BlockLayout, FieldKind, RenderContext, UniformBlock};
use crate::error::{Error, Result};
use crate::graphics_device::{
    Attachment, Capability, ClearFlags, CubeFace, DrawBuffer, FramebufferBinding, FramebufferId,
    FramebufferStatus, GraphicsDevice, ImageTarget, InternalFormat, SamplerDesc, TexImageDesc,
    TextureFilter, TextureId, TextureTarget, TextureWrap,
};
use crate::resource::shader::Shader;

/// Look direction and up vector of each cubemap face, in face order
pub const CUBE_FACE_LOOKATS: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Y),
    (Vec3::NEG_X, Vec3::NEG_Y),
    (Vec3::Y, Vec3::Z),
    (Vec3::NEG_Y, Vec3::NEG_Z),
    (Vec3::Z, Vec3::NEG_Y),
    (Vec3::NEG_Z, Vec3::NEG_Y),
];

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowConfig {
    /// Depth map size in texels
    pub width: u32,
    pub height: u32,
    pub near: f32,
    pub far: f32,
    /// Half size of the directional orthographic volume
    pub extent: f32,
}

impl ShadowConfig {
    pub fn directional() -> Self {
        Self { width: 1024, height: 1024, near: 1.0, far: 10.0, extent: 10.0 }
    }

    pub fn point() -> Self {
        Self { far: 25.0, ..Self::directional() }
    }

    /// Distance from the origin to a directional light's eye, halfway
    /// through the depth range
    pub fn light_distance(&self) -> f32 {
        (self.near + self.far) * 0.5
    }
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self::directional()
    }
}

/// Light geometry of a shadow pass
#[derive(Debug, Clone, PartialEq)]
pub enum ShadowKind {
    Directional {
        direction: Vec3,
        light_space: Mat4,
    },
    Point {
        position: Vec3,
        far_plane: f32,
        matrices: [Mat4; 6],
    },
}

impl ShadowKind {
    /// Texture target of the depth map
    pub fn texture_target(&self) -> TextureTarget {
        match self {
            ShadowKind::Directional { .. } => TextureTarget::Texture2D,
            ShadowKind::Point { .. } => TextureTarget::CubeMap,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ShadowKind::Directional { .. } => "directional",
            ShadowKind::Point { .. } => "point",
        }
    }
}

// ============================================================================
// Light transforms
// ============================================================================

/// `ortho(-e, e, -e, e, near, far) * look_at(eye, origin, up)` with the
/// eye at [`ShadowConfig::light_distance`] against `direction`
///
/// Only the orientation of `direction` matters. Up is +Y, or +Z when the
/// light points along the Y axis.
pub fn directional_light_space(config: &ShadowConfig, direction: Vec3) -> Mat4 {
    let e = config.extent;
    let projection = Mat4::orthographic_rh_gl(-e, e, -e, e, config.near, config.far);
    let direction = direction.normalize_or_zero();
    let up = if direction.cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let eye = -direction * config.light_distance();
    projection * Mat4::look_at_rh(eye, Vec3::ZERO, up)
}

/// Six face view-projections of a point light, in [`CubeFace::ALL`] order
pub fn point_light_matrices(config: &ShadowConfig, position: Vec3) -> [Mat4; 6] {
    let aspect = config.width as f32 / config.height as f32;
    let projection =
        Mat4::perspective_rh_gl(90f32.to_radians(), aspect, config.near, config.far);
    CUBE_FACE_LOOKATS.map(|(direction, up)| {
        projection * Mat4::look_at_rh(position, position + direction, up)
    })
}

/// Shadow map coordinates of a world point: texture uv in xy, depth in z,
/// all in [0, 1] inside the light volume
pub fn project_to_shadow_map(light_space: &Mat4, point: Vec3) -> Vec3 {
    let ndc = light_space.project_point3(point);
    ndc * 0.5 + Vec3::splat(0.5)
}

// ============================================================================
// Depth target
// ============================================================================

/// Framebuffer plus depth texture, released together
struct DepthTarget {
    device: Rc<dyn GraphicsDevice>,
    framebuffer: FramebufferId,
    depth_map: TextureId,
}

impl DepthTarget {
    fn new(device: &Rc<dyn GraphicsDevice>) -> Result<Self> {
        let framebuffer = device.create_framebuffer()?;
        let depth_map = match device.create_texture() {
            Ok(texture) => texture,
            Err(e) => {
                device.delete_framebuffer(framebuffer);
                return Err(e);
            }
        };
        Ok(Self { device: device.clone(), framebuffer, depth_map })
    }
}

impl Drop for DepthTarget {
    fn drop(&mut self) {
        self.device.delete_texture(self.depth_map);
        self.device.delete_framebuffer(self.framebuffer);
    }
}

// ============================================================================
// ShadowPass
// ============================================================================

pub struct ShadowPass {
    device: Rc<dyn GraphicsDevice>,
    target: DepthTarget,
    block: UniformBlock,
    kind: ShadowKind,
    config: ShadowConfig,
    window_width: u32,
    window_height: u32,
}

impl ShadowPass {
    /// Shadow of a light shining along `direction` onto the origin
    pub fn directional(ctx: &RenderContext, config: &ShadowConfig, direction: Vec3) -> Result<Self> {
        let light_space = directional_light_space(config, direction);
        Self::build(ctx, config, ShadowKind::Directional { direction, light_space })
    }

    /// Omnidirectional shadow of a light at `position`
    pub fn point(ctx: &RenderContext, config: &ShadowConfig, position: Vec3) -> Result<Self> {
        let matrices = point_light_matrices(config, position);
        Self::build(
            ctx,
            config,
            ShadowKind::Point { position, far_plane: config.far, matrices },
        )
    }

    /// `mat4 light_space;`
    pub fn directional_layout() -> BlockLayout {
        BlockLayout::builder().mat4("light_space").build()
    }

    /// `mat4 shadow_matrices[6]; vec3 light_position; float far_plane;`
    pub fn point_layout() -> BlockLayout {
        BlockLayout::builder()
            .array("shadow_matrices", FieldKind::Mat4, 6)
            .vec3("light_position")
            .float("far_plane")
            .build()
    }

    fn build(ctx: &RenderContext, config: &ShadowConfig, kind: ShadowKind) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            crate::engine_bail!(
                "lightpass::ShadowPass",
                Error::Shadow,
                "Shadow map size {}x{} is empty",
                config.width,
                config.height
            );
        }

        let device = ctx.device().clone();
        let target = DepthTarget::new(&device)?;
        let desc = TexImageDesc::storage(InternalFormat::DEPTH_COMPONENT24, config.width, config.height);
        let texture_target = kind.texture_target();

        device.bind_texture(texture_target, Some(target.depth_map));
        match &kind {
            ShadowKind::Directional { .. } => {
                device.tex_image_2d(ImageTarget::Texture2D, &desc, None);
                device.set_sampler(
                    TextureTarget::Texture2D,
                    &SamplerDesc {
                        min_filter: TextureFilter::Nearest,
                        mag_filter: TextureFilter::Nearest,
                        wrap: TextureWrap::ClampToBorder,
                        border_color: Some([1.0; 4]),
                    },
                );
            }
            ShadowKind::Point { .. } => {
                for face in CubeFace::ALL {
                    device.tex_image_2d(ImageTarget::CubeFace(face), &desc, None);
                }
                device.set_sampler(TextureTarget::CubeMap, &SamplerDesc::nearest(TextureWrap::ClampToEdge));
            }
        }

        device.bind_framebuffer(FramebufferBinding::Both, Some(target.framebuffer));
        match &kind {
            ShadowKind::Directional { .. } => {
                device.framebuffer_texture_2d(Attachment::Depth, TextureTarget::Texture2D, target.depth_map)
            }
            ShadowKind::Point { .. } => device.framebuffer_texture(Attachment::Depth, target.depth_map),
        }
        device.draw_buffers(&[DrawBuffer::None]);
        device.read_buffer(DrawBuffer::None);

        let status = device.check_framebuffer_status();
        device.bind_framebuffer(FramebufferBinding::Both, None);
        device.bind_texture(texture_target, None);

        if let FramebufferStatus::Incomplete(reason) = status {
            crate::engine_bail!(
                "lightpass::ShadowPass",
                Error::Shadow,
                "Failed to generate {} shadow framebuffer ({})",
                kind.label(),
                reason
            );
        }

        let block = match &kind {
            ShadowKind::Directional { light_space, .. } => {
                let block = UniformBlock::new(device.clone(), DIRECTIONAL_SHADOW_BINDING, Self::directional_layout())?;
                block.set_mat4("light_space", light_space);
                block
            }
            ShadowKind::Point { position, far_plane, matrices } => {
                let block = UniformBlock::new(device.clone(), POINT_SHADOW_BINDING, Self::point_layout())?;
                block.set_mat4_array("shadow_matrices", matrices);
                block.set_vec3("light_position", *position);
                block.set_float("far_plane", *far_plane);
                block
            }
        };

        crate::engine_info!(
            "lightpass::ShadowPass",
            "{} shadow map {}x{}",
            kind.label(),
            config.width,
            config.height
        );

        let (window_width, window_height) = ctx.window_size();
        Ok(Self {
            device,
            target,
            block,
            kind,
            config: *config,
            window_width,
            window_height,
        })
    }

    pub fn kind(&self) -> &ShadowKind {
        &self.kind
    }

    pub fn config(&self) -> &ShadowConfig {
        &self.config
    }

    pub fn depth_map(&self) -> TextureId {
        self.target.depth_map
    }

    /// Uniform block holding the light transform
    pub fn block(&self) -> &UniformBlock {
        &self.block
    }

    /// Window size restored when the map is bound for reading
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    /// Start the depth-only pass: map-sized viewport, depth target bound
    /// and cleared to the far plane
    pub fn bind_depth_map(&self) -> DepthPass<'_> {
        let device = &self.device;
        device.viewport(0, 0, self.config.width, self.config.height);
        device.bind_framebuffer(FramebufferBinding::Both, Some(self.target.framebuffer));
        device.clear(ClearFlags::DEPTH);
        device.enable(Capability::DepthTest);
        DepthPass { pass: self }
    }
}

// ============================================================================
// Stage tokens
// ============================================================================

/// The depth map is being rendered
#[must_use = "a depth pass must be finished before its shadow map can be bound"]
pub struct DepthPass<'a> {
    pass: &'a ShadowPass,
}

impl<'a> DepthPass<'a> {
    pub fn pass(&self) -> &'a ShadowPass {
        self.pass
    }

    /// Every shadow caster has been drawn
    pub fn finish(self) -> ShadowMap<'a> {
        ShadowMap { pass: self.pass }
    }
}

/// A completed depth map, ready to be sampled
#[derive(Clone, Copy)]
pub struct ShadowMap<'a> {
    pass: &'a ShadowPass,
}

impl<'a> ShadowMap<'a> {
    pub fn pass(&self) -> &'a ShadowPass {
        self.pass
    }

    pub fn depth_map(&self) -> TextureId {
        self.pass.target.depth_map
    }

    /// Return to the window and expose the depth map to `shaders`
    ///
    /// Restores the default framebuffer and window viewport, clears color
    /// and depth, then for each shader binds the map on texture unit 31
    /// and points the sampler uniform `uniform` at it.
    pub fn bind_shadow_map(&self, uniform: &str, shaders: &[&Shader]) {
        let pass = self.pass;
        let device = &pass.device;
        device.bind_framebuffer(FramebufferBinding::Both, None);
        device.viewport(0, 0, pass.window_width, pass.window_height);
        device.clear(ClearFlags::COLOR | ClearFlags::DEPTH);

        for shader in shaders {
            shader.use_program();
            device.active_texture(SHADOW_MAP_UNIT);
            shader.set_int(uniform, SHADOW_MAP_UNIT as i32);
            device.bind_texture(pass.kind.texture_target(), Some(pass.target.depth_map));
        }
    }
}

#[cfg(test)]
#[path = "shadow_tests.rs"]
mod tests;
