/// Display - the deferred scene and its fixed per-frame pass order
///
/// Owns every pipeline component of the demo scene (instanced cubes, a
/// large inverted box, an imported model, a skybox and two point lights)
/// and renders one frame as:
///
/// 1. camera view-projection upload
/// 2. point shadow depth pass (model and cubes)
/// 3. shadow map bound to the deferred lighting shader
/// 4. light block update
/// 5. G-buffer pass, then optional ambient occlusion
/// 6. deferred lighting into the HDR bloom target, G-buffer depth blitted
/// 7. light markers, then the skybox at the far plane
/// 8. blur and composite to the screen

use std::path::{Path, PathBuf};
use std::rc::Rc;

use glam::Vec3;

use crate::camera::Camera;
use crate::context::{RenderContext, Transform};
use crate::error::{Error, Result};
use crate::graphics_device::{DepthFunc, GraphicsDevice};
use crate::pass::{BloomConfig, GaussianBlur, ShadowConfig, ShadowPass, Ssao};
use crate::resource::geometry::{generate_cube_vertices, SKYBOX_ATTRIBS, SKYBOX_VERTICES, VERTEX_ATTRIBS};
use crate::resource::model::{Model, ModelImporter};
use crate::resource::object::GpuObject;
use crate::resource::shader::Shader;
use crate::resource::textures::{TextureType, Textures};
use crate::scene::lights::{Lights, PointLight};
use crate::target::{AttachmentFormat, Channels, FrameBuffer, FramebufferDesc};

// ============================================================================
// Files
// ============================================================================

/// Vertex, fragment and optional geometry stage of one program, relative
/// to the shader root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramFiles {
    pub vertex: &'static str,
    pub fragment: &'static str,
    pub geometry: Option<&'static str>,
}

impl ProgramFiles {
    const fn new(vertex: &'static str, fragment: &'static str) -> Self {
        Self { vertex, fragment, geometry: None }
    }

    /// Every stage file of the program
    pub fn files(&self) -> impl Iterator<Item = &'static str> {
        [Some(self.vertex), Some(self.fragment), self.geometry].into_iter().flatten()
    }
}

pub const LIGHT_PROGRAM: ProgramFiles = ProgramFiles::new("object/light.vert", "object/light.frag");
pub const SKYBOX_PROGRAM: ProgramFiles = ProgramFiles::new("object/skybox.vert", "object/skybox.frag");
pub const POINT_DEPTH_PROGRAM: ProgramFiles = ProgramFiles {
    vertex: "shadow/point_depth.vert",
    fragment: "shadow/point_depth.frag",
    geometry: Some("shadow/point_depth.geom"),
};
pub const GBUFFER_PROGRAM: ProgramFiles = ProgramFiles::new("processing/gbuffer.vert", "processing/gbuffer.frag");
pub const DEFERRED_PROGRAM: ProgramFiles = ProgramFiles::new("processing/deferred.vert", "processing/deferred.frag");
pub const SSAO_PROGRAM: ProgramFiles = ProgramFiles::new("processing/ssao.vert", "processing/ssao.frag");
pub const BLUR_PROGRAM: ProgramFiles = ProgramFiles::new("processing/blur.vert", "processing/blur.frag");
pub const COMPOSITE_PROGRAM: ProgramFiles = ProgramFiles::new("processing/fb.vert", "processing/fb.frag");

/// Every program the display compiles
pub const PROGRAMS: [ProgramFiles; 8] = [
    LIGHT_PROGRAM,
    SKYBOX_PROGRAM,
    POINT_DEPTH_PROGRAM,
    GBUFFER_PROGRAM,
    DEFERRED_PROGRAM,
    SSAO_PROGRAM,
    BLUR_PROGRAM,
    COMPOSITE_PROGRAM,
];

/// Textures of the inverted box, relative to the asset root
pub const BOX_TEXTURES: [(&str, TextureType); 3] = [
    ("bricks/bricks2.jpg", TextureType::Diffuse),
    ("bricks/bricks2_normal.jpg", TextureType::Normal),
    ("bricks/bricks2_disp.jpg", TextureType::Height),
];

/// Textures of the small cubes, relative to the asset root
pub const CUBE_TEXTURES: [(&str, TextureType); 3] = [
    ("box/wood.png", TextureType::Diffuse),
    ("box/toy_box_normal.png", TextureType::Normal),
    ("box/toy_box_disp.png", TextureType::Height),
];

/// Skybox faces in +X, -X, +Y, -Y, +Z, -Z order, relative to the asset root
pub const SKYBOX_FACES: [&str; 6] = [
    "space/right.jpg",
    "space/left.jpg",
    "space/top.jpg",
    "space/bottom.jpg",
    "space/front.jpg",
    "space/back.jpg",
];

/// G-buffer attachments: position, normal, albedo + specular, tangent-space
/// view position, fragment position, light-space data
pub const GBUFFER_FORMATS: [AttachmentFormat; 6] = [
    AttachmentFormat::half(Channels::Rgb),
    AttachmentFormat::half(Channels::Rgba),
    AttachmentFormat::unorm8(Channels::Rgba),
    AttachmentFormat::half(Channels::Rgb),
    AttachmentFormat::half(Channels::Rgb),
    AttachmentFormat::half(Channels::Rgb),
];

/// G-buffer entries sampled by the occlusion pass (position and normal)
pub const SSAO_GBUFFER_UNITS: [usize; 2] = [0, 1];

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    /// Root of every texture and model path
    pub asset_root: PathBuf,
    /// Root of every shader path
    pub shader_root: PathBuf,
    /// Model file relative to the asset root
    pub model: PathBuf,
    /// Render the point shadow of the first point light
    pub shadows: bool,
    pub ssao: bool,
    pub point_lights: Vec<PointLight>,
    /// One instanced cube per position
    pub cube_positions: Vec<Vec3>,
    pub shadow: ShadowConfig,
    pub bloom_passes: u32,
    pub exposure: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let light = PointLight {
            position: Vec3::new(0.0, 3.0, 2.0),
            ambient: Vec3::splat(0.05),
            diffuse: Vec3::splat(5.0),
            specular: Vec3::splat(3.0),
            attenuation: Vec3::new(1.0, 0.045, 0.016),
        };
        Self {
            width: 800,
            height: 600,
            asset_root: PathBuf::from("assets"),
            shader_root: PathBuf::from("shaders"),
            model: PathBuf::from("nanosuit/nanosuit.gltf"),
            shadows: true,
            ssao: true,
            point_lights: vec![
                light,
                PointLight {
                    position: Vec3::new(-2.0, 3.0, 2.0),
                    diffuse: Vec3::new(0.0, 0.0, 5.0),
                    specular: Vec3::new(1.0, 1.0, 3.0),
                    ..light
                },
            ],
            cube_positions: vec![
                Vec3::new(0.0, -2.0, 0.0),
                Vec3::new(2.0, 4.0, 2.0),
                Vec3::new(-1.0, 0.0, -1.0),
                Vec3::new(2.0, 0.0, 0.0),
            ],
            shadow: ShadowConfig::point(),
            bloom_passes: BloomConfig::default().passes,
            exposure: BloomConfig::default().exposure,
        }
    }
}

// ============================================================================
// Display
// ============================================================================

struct Programs {
    light: Rc<Shader>,
    skybox: Rc<Shader>,
    point_depth: Rc<Shader>,
    gbuffer: Rc<Shader>,
    deferred: Rc<Shader>,
    ssao: Rc<Shader>,
    blur: Rc<Shader>,
    composite: Rc<Shader>,
}

impl Programs {
    fn load(ctx: &RenderContext, root: &Path) -> Result<Self> {
        let load = |files: &ProgramFiles| -> Result<Rc<Shader>> {
            let geometry = files.geometry.map(|file| root.join(file));
            Shader::from_files(
                ctx,
                root.join(files.vertex),
                root.join(files.fragment),
                geometry.as_deref(),
            )
            .map(Rc::new)
        };
        Ok(Self {
            light: load(&LIGHT_PROGRAM)?,
            skybox: load(&SKYBOX_PROGRAM)?,
            point_depth: load(&POINT_DEPTH_PROGRAM)?,
            gbuffer: load(&GBUFFER_PROGRAM)?,
            deferred: load(&DEFERRED_PROGRAM)?,
            ssao: load(&SSAO_PROGRAM)?,
            blur: load(&BLUR_PROGRAM)?,
            composite: load(&COMPOSITE_PROGRAM)?,
        })
    }
}

pub struct Display {
    device: Rc<dyn GraphicsDevice>,
    programs: Programs,
    cube: GpuObject,
    skybox: GpuObject,
    box_textures: Textures,
    cube_textures: Textures,
    skybox_textures: Textures,
    model: Model,
    cube_transforms: Vec<Transform>,
    point_shadow: Option<ShadowPass>,
    gbuffer: FrameBuffer,
    ssao: Option<Ssao>,
    bloom: GaussianBlur,
    lights: Lights,
}

impl Display {
    /// Load every program, texture and model and build the render targets
    ///
    /// # Errors
    ///
    /// The first error of any component. `Error::Shadow` when shadows are
    /// enabled without a point light to cast them.
    pub fn new(ctx: &RenderContext, config: &DisplayConfig, importer: &dyn ModelImporter) -> Result<Self> {
        let programs = Programs::load(ctx, &config.shader_root)?;
        let assets = &config.asset_root;

        let mut cube = GpuObject::new(ctx)?;
        {
            let mut setup = cube.start_setup();
            setup.add_vertices(&generate_cube_vertices())?;
            setup.add_vertex_attribs(&VERTEX_ATTRIBS);
            setup.finalize();
        }
        let mut skybox = GpuObject::new(ctx)?;
        {
            let mut setup = skybox.start_setup();
            setup.add_vertices(&SKYBOX_VERTICES)?;
            setup.add_vertex_attribs(&SKYBOX_ATTRIBS);
            setup.finalize();
        }

        let mut box_textures = Textures::new(ctx);
        for (file, ty) in BOX_TEXTURES {
            box_textures.load_texture_from_image(assets.join(file), ty)?;
        }
        let mut cube_textures = Textures::new(ctx);
        for (file, ty) in CUBE_TEXTURES {
            cube_textures.load_texture_from_image(assets.join(file), ty)?;
        }
        let mut skybox_textures = Textures::new(ctx);
        skybox_textures.load_cubemap(SKYBOX_FACES.map(|face| assets.join(face)))?;

        let model = Model::load(ctx, importer, assets.join(&config.model))?;

        let point_shadow = if config.shadows {
            let Some(light) = config.point_lights.first() else {
                crate::engine_bail!(
                    "lightpass::Display",
                    Error::Shadow,
                    "Shadows are enabled but no point light casts them"
                );
            };
            Some(ShadowPass::point(ctx, &config.shadow, light.position)?)
        } else {
            None
        };

        let gbuffer = FrameBuffer::new(
            ctx,
            &FramebufferDesc::new(config.width, config.height).with_colors(GBUFFER_FORMATS),
            programs.deferred.clone(),
        )?;

        let ssao = if config.ssao {
            Some(Ssao::new(ctx, config.width, config.height, programs.ssao.clone())?)
        } else {
            None
        };

        let bloom = GaussianBlur::new(
            ctx,
            &BloomConfig {
                width: config.width,
                height: config.height,
                passes: config.bloom_passes,
                exposure: config.exposure,
            },
            programs.blur.clone(),
            programs.composite.clone(),
        )?;

        let mut lights = Lights::new(ctx)?;
        for light in &config.point_lights {
            lights.add_point_light(*light)?;
        }

        let cube_transforms = config.cube_positions.iter().copied().map(Transform::from_translation).collect();

        crate::engine_info!(
            "lightpass::Display",
            "Scene ready ({}x{}, shadows {}, ssao {})",
            config.width,
            config.height,
            config.shadows,
            config.ssao
        );

        Ok(Self {
            device: ctx.device().clone(),
            programs,
            cube,
            skybox,
            box_textures,
            cube_textures,
            skybox_textures,
            model,
            cube_transforms,
            point_shadow,
            gbuffer,
            ssao,
            bloom,
            lights,
        })
    }

    pub fn lights(&self) -> &Lights {
        &self.lights
    }

    pub fn gbuffer(&self) -> &FrameBuffer {
        &self.gbuffer
    }

    pub fn bloom(&self) -> &GaussianBlur {
        &self.bloom
    }

    pub fn point_shadow(&self) -> Option<&ShadowPass> {
        self.point_shadow.as_ref()
    }

    pub fn ssao(&self) -> Option<&Ssao> {
        self.ssao.as_ref()
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Render one frame seen from `camera`, `time` seconds into the run
    pub fn draw(&self, ctx: &RenderContext, camera: &Camera, time: f32) -> Result<()> {
        ctx.set_world_space_transform(camera.projection_matrix(), camera.view_matrix());

        if let Some(shadow) = &self.point_shadow {
            let depth = shadow.bind_depth_map();
            self.draw_model(ctx, &self.programs.point_depth, time)?;
            self.draw_cubes(ctx, &self.programs.point_depth)?;
            depth.finish().bind_shadow_map("shadow_map", &[&*self.programs.deferred]);
        }

        self.lights.update(camera.position());

        let writing = self.gbuffer.bind_framebuffer();
        self.draw_cubes(ctx, &self.programs.gbuffer)?;
        self.draw_box(ctx, &self.programs.gbuffer)?;
        self.draw_model(ctx, &self.programs.gbuffer, time)?;
        let gbuffer = writing.finish();

        if let Some(ssao) = &self.ssao {
            ssao.bind_framebuffer()
                .render(gbuffer.textures(), &SSAO_GBUFFER_UNITS)
                .use_ssao(&self.programs.deferred);
        }

        let hdr = self.bloom.bind_framebuffer();
        gbuffer.draw_scene();
        gbuffer.blit_depth();

        self.lights.draw_markers(ctx, &self.programs.light)?;
        self.draw_skybox(ctx, camera);

        hdr.finish().blur_scene();
        Ok(())
    }

    fn draw_cubes(&self, ctx: &RenderContext, shader: &Shader) -> Result<()> {
        if self.cube_transforms.is_empty() {
            return Ok(());
        }
        ctx.set_model_transforms(&self.cube_transforms)?;
        self.cube.draw_instanced(
            shader,
            self.cube_transforms.len() as u32,
            Some(&self.cube_textures),
            &[],
        );
        Ok(())
    }

    fn draw_box(&self, ctx: &RenderContext, shader: &Shader) -> Result<()> {
        ctx.set_model_transforms(&[Transform::default().with_uniform_scale(15.0)])?;
        self.cube.draw(shader, Some(&self.box_textures), &["reverse_normal"]);
        Ok(())
    }

    fn draw_model(&self, ctx: &RenderContext, shader: &Shader, time: f32) -> Result<()> {
        let transform = Transform::from_translation(Vec3::new(0.0, -0.5, 0.0))
            .with_rotation(Vec3::Y, -time)
            .with_uniform_scale(0.2);
        ctx.set_model_transforms(&[transform])?;
        self.model.draw(shader, &["gamma"]);
        Ok(())
    }

    /// Skybox at the far plane, translation stripped from the view
    fn draw_skybox(&self, ctx: &RenderContext, camera: &Camera) {
        self.device.depth_func(DepthFunc::LessEqual);
        ctx.set_world_space_transform(camera.projection_matrix(), &camera.skybox_view());
        self.skybox.draw(&self.programs.skybox, Some(&self.skybox_textures), &[]);
        self.device.depth_func(DepthFunc::Less);
    }
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
