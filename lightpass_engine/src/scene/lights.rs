/// Lights - light data shared with every lit shader through binding 1
///
/// Block layout (std140):
///
/// ```text
/// vec3 view_position;           //   0
/// int  num_dir_lights;          //  12
/// DirLight   dir_lights[5];     //  16, stride 64
/// PointLight point_lights[5];   // 336, stride 80
/// int  num_point_lights;        // 736
/// ```
///
/// Adding a light writes only that light's struct and the matching count.
/// Point lights can be visualized as small cubes with one instanced draw.

use glam::Vec3;

use crate::context::bindings::LIGHTS_BINDING;
use crate::context::{BlockLayout, RenderContext, Transform, UniformBlock};
use crate::error::{Error, Result};
use crate::resource::geometry::{CUBE_ATTRIBS, CUBE_INDICES, CUBE_VERTICES};
use crate::resource::object::GpuObject;
use crate::resource::shader::Shader;

pub const MAX_DIR_LIGHTS: usize = 5;
pub const MAX_POINT_LIGHTS: usize = 5;

/// Scale of the cube drawn at each point light
pub const MARKER_SCALE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirLight {
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    /// Constant, linear and quadratic attenuation terms
    pub attenuation: Vec3,
}

pub struct Lights {
    block: UniformBlock,
    marker: GpuObject,
    dir_lights: Vec<DirLight>,
    point_lights: Vec<PointLight>,
}

impl Lights {
    pub fn new(ctx: &RenderContext) -> Result<Self> {
        let block = UniformBlock::new(ctx.device().clone(), LIGHTS_BINDING, Self::layout())?;
        block.set_int("num_dir_lights", 0);
        block.set_int("num_point_lights", 0);

        let mut marker = GpuObject::new(ctx)?;
        {
            let mut setup = marker.start_setup();
            setup.add_vertices(&CUBE_VERTICES)?;
            setup.add_indices(&CUBE_INDICES)?;
            setup.add_vertex_attribs(&CUBE_ATTRIBS);
            setup.finalize();
        }

        Ok(Self { block, marker, dir_lights: Vec::new(), point_lights: Vec::new() })
    }

    pub fn layout() -> BlockLayout {
        BlockLayout::builder()
            .vec3("view_position")
            .int("num_dir_lights")
            .struct_array("dir_lights", MAX_DIR_LIGHTS, |b| {
                b.vec3("direction").vec3("ambient").vec3("diffuse").vec3("specular")
            })
            .struct_array("point_lights", MAX_POINT_LIGHTS, |b| {
                b.vec3("position")
                    .vec3("ambient")
                    .vec3("diffuse")
                    .vec3("specular")
                    .vec3("attenuation")
            })
            .int("num_point_lights")
            .build()
    }

    pub fn block(&self) -> &UniformBlock {
        &self.block
    }

    pub fn dir_lights(&self) -> &[DirLight] {
        &self.dir_lights
    }

    pub fn point_lights(&self) -> &[PointLight] {
        &self.point_lights
    }

    /// # Errors
    ///
    /// `Error::InvalidResource` when [`MAX_DIR_LIGHTS`] lights are already set.
    pub fn add_dir_light(&mut self, light: DirLight) -> Result<()> {
        let i = self.dir_lights.len();
        if i == MAX_DIR_LIGHTS {
            crate::engine_bail!(
                "lightpass::Lights",
                Error::InvalidResource,
                "Directional light capacity exceeded ({})",
                MAX_DIR_LIGHTS
            );
        }

        let block = &self.block;
        block.set_vec3(&format!("dir_lights[{}].direction", i), light.direction);
        block.set_vec3(&format!("dir_lights[{}].ambient", i), light.ambient);
        block.set_vec3(&format!("dir_lights[{}].diffuse", i), light.diffuse);
        block.set_vec3(&format!("dir_lights[{}].specular", i), light.specular);
        block.set_int("num_dir_lights", i as i32 + 1);

        self.dir_lights.push(light);
        Ok(())
    }

    /// # Errors
    ///
    /// `Error::InvalidResource` when [`MAX_POINT_LIGHTS`] lights are already set.
    pub fn add_point_light(&mut self, light: PointLight) -> Result<()> {
        let i = self.point_lights.len();
        if i == MAX_POINT_LIGHTS {
            crate::engine_bail!(
                "lightpass::Lights",
                Error::InvalidResource,
                "Point light capacity exceeded ({})",
                MAX_POINT_LIGHTS
            );
        }

        let block = &self.block;
        block.set_vec3(&format!("point_lights[{}].position", i), light.position);
        block.set_vec3(&format!("point_lights[{}].ambient", i), light.ambient);
        block.set_vec3(&format!("point_lights[{}].diffuse", i), light.diffuse);
        block.set_vec3(&format!("point_lights[{}].specular", i), light.specular);
        block.set_vec3(&format!("point_lights[{}].attenuation", i), light.attenuation);
        block.set_int("num_point_lights", i as i32 + 1);

        self.point_lights.push(light);
        Ok(())
    }

    pub fn point_light_position(&self, index: usize) -> Option<Vec3> {
        self.point_lights.get(index).map(|light| light.position)
    }

    /// Upload the eye position used by specular terms
    pub fn update(&self, camera_position: Vec3) {
        self.block.set_vec3("view_position", camera_position);
    }

    /// Draw a small cube at every point light, in one instanced draw
    pub fn draw_markers(&self, ctx: &RenderContext, shader: &Shader) -> Result<()> {
        if self.point_lights.is_empty() {
            return Ok(());
        }
        let transforms: Vec<Transform> = self
            .point_lights
            .iter()
            .map(|light| Transform::from_translation(light.position).with_uniform_scale(MARKER_SCALE))
            .collect();
        ctx.set_model_transforms(&transforms)?;
        self.marker.draw_instanced(shader, transforms.len() as u32, None, &[]);
        Ok(())
    }
}

#[cfg(test)]
#[path = "lights_tests.rs"]
mod tests;
