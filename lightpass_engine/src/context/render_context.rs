/// RenderContext - explicit owner of the state shared by every pass
///
/// Holds the device, the image decoder, the window size and the two
/// uniform blocks every object draw reads: the per-object transform block
/// (binding 0) and the per-instance model matrices (binding 2).

use std::rc::Rc;

use glam::Mat4;
use rayon::prelude::*;

use crate::context::bindings::{INSTANCES_BINDING, TRANSFORM_BINDING};
use crate::context::block_layout::{BlockLayout, FieldKind};
use crate::context::transform::Transform;
use crate::context::uniform_block::UniformBlock;
use crate::error::{Error, Result};
use crate::graphics_device::GraphicsDevice;
use crate::resource::image_decoder::{ImageCrateDecoder, ImageDecoder};

/// Capacity of the instance block (`mat4 models[MAX_INSTANCES]`)
pub const MAX_INSTANCES: usize = 128;

/// Above this many instances, model matrices are computed on the rayon pool
pub const PARALLEL_THRESHOLD: usize = 32;

/// Shared GPU state passed by reference to every component
pub struct RenderContext {
    device: Rc<dyn GraphicsDevice>,
    decoder: Rc<dyn ImageDecoder>,
    window_width: u32,
    window_height: u32,
    transforms: UniformBlock,
    instances: UniformBlock,
}

impl RenderContext {
    /// Context decoding images with the `image` crate
    pub fn new(device: Rc<dyn GraphicsDevice>, window_width: u32, window_height: u32) -> Result<Self> {
        Self::with_decoder(device, Rc::new(ImageCrateDecoder), window_width, window_height)
    }

    pub fn with_decoder(
        device: Rc<dyn GraphicsDevice>,
        decoder: Rc<dyn ImageDecoder>,
        window_width: u32,
        window_height: u32,
    ) -> Result<Self> {
        let transforms = UniformBlock::new(device.clone(), TRANSFORM_BINDING, Self::transform_layout())?;
        let instances = UniformBlock::new(device.clone(), INSTANCES_BINDING, Self::instance_layout())?;

        crate::engine_info!(
            "lightpass::RenderContext",
            "Render context created ({}x{})",
            window_width,
            window_height
        );

        Ok(Self { device, decoder, window_width, window_height, transforms, instances })
    }

    /// `mat4 view_projection; mat4 model;` (128 bytes)
    pub fn transform_layout() -> BlockLayout {
        BlockLayout::builder().mat4("view_projection").mat4("model").build()
    }

    /// `mat4 models[MAX_INSTANCES];`
    pub fn instance_layout() -> BlockLayout {
        BlockLayout::builder().array("models", FieldKind::Mat4, MAX_INSTANCES).build()
    }

    pub fn device(&self) -> &Rc<dyn GraphicsDevice> {
        &self.device
    }

    pub fn decoder(&self) -> &Rc<dyn ImageDecoder> {
        &self.decoder
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    /// Record a new window size (targets are not resized)
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    pub fn transforms(&self) -> &UniformBlock {
        &self.transforms
    }

    pub fn instances(&self) -> &UniformBlock {
        &self.instances
    }

    /// Upload `projection * view`
    pub fn set_world_space_transform(&self, projection: &Mat4, view: &Mat4) {
        self.transforms.set_mat4("view_projection", &(*projection * *view));
    }

    /// Upload the model matrix of the next single draw
    pub fn set_model_transform(&self, transform: &Transform) {
        self.transforms.set_mat4("model", &transform.matrix());
    }

    /// Upload one model matrix per instance of the next instanced draw
    ///
    /// The first matrix also lands in the single-draw model slot.
    ///
    /// # Errors
    ///
    /// `Error::InvalidResource` when more than [`MAX_INSTANCES`] transforms are given.
    pub fn set_model_transforms(&self, transforms: &[Transform]) -> Result<()> {
        if transforms.len() > MAX_INSTANCES {
            crate::engine_bail!(
                "lightpass::RenderContext",
                Error::InvalidResource,
                "{} instances exceed the instance block capacity of {}",
                transforms.len(),
                MAX_INSTANCES
            );
        }

        let matrices: Vec<Mat4> = if transforms.len() > PARALLEL_THRESHOLD {
            transforms.par_iter().map(Transform::matrix).collect()
        } else {
            transforms.iter().map(Transform::matrix).collect()
        };

        if let Some(first) = matrices.first() {
            self.transforms.set_mat4("model", first);
            self.instances.set_mat4_array("models", &matrices);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "render_context_tests.rs"]
mod tests;
