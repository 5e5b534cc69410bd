/// GpuObject - vertex buffer, optional index buffer and attribute layout
///
/// Lifecycle: created empty, set up exactly once through
/// [`GpuObject::start_setup`], then drawn any number of times. GPU handles
/// are released on drop.
///
/// ```ignore
/// let mut cube = GpuObject::new(&ctx)?;
/// let mut setup = cube.start_setup();
/// setup.add_vertices(&CUBE_VERTICES)?;
/// setup.add_indices(&CUBE_INDICES)?;
/// setup.add_vertex_attribs(&[3, 3, 2]);
/// setup.finalize();
/// cube.draw(&shader, Some(&textures), &["reverse_normal"]);
/// ```

use std::mem::size_of;
use std::rc::Rc;

use bytemuck::Pod;

use crate::context::RenderContext;
use crate::error::Result;
use crate::graphics_device::{BufferId, BufferTarget, BufferUsage, GraphicsDevice, VertexArrayId};
use crate::resource::shader::Shader;
use crate::resource::textures::Textures;

// ============================================================================
// Vertex layout
// ============================================================================

/// One float attribute of an interleaved vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader attribute slot
    pub index: u32,
    /// Number of floats
    pub size: i32,
    /// Byte offset inside the vertex
    pub offset: i32,
}

/// Tightly packed float attributes, in slot order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    pub stride: i32,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Layout from attribute widths (in floats), offsets accumulated left to right
    pub fn from_sizes(sizes: &[i32]) -> Self {
        let float_size = size_of::<f32>() as i32;
        let mut offset = 0;
        let attributes = sizes
            .iter()
            .enumerate()
            .map(|(index, &size)| {
                let attribute = VertexAttribute { index: index as u32, size, offset };
                offset += size * float_size;
                attribute
            })
            .collect();
        Self { stride: offset, attributes }
    }
}

// ============================================================================
// GpuObject
// ============================================================================

pub struct GpuObject {
    device: Rc<dyn GraphicsDevice>,
    vertex_array: VertexArrayId,
    vertex_buffer: Option<BufferId>,
    index_buffer: Option<BufferId>,
    vertex_bytes: usize,
    num_vertices: i32,
    num_indices: i32,
    layout: Option<VertexLayout>,
}

impl GpuObject {
    pub fn new(ctx: &RenderContext) -> Result<Self> {
        let device = ctx.device().clone();
        let vertex_array = device.create_vertex_array()?;
        Ok(Self {
            device,
            vertex_array,
            vertex_buffer: None,
            index_buffer: None,
            vertex_bytes: 0,
            num_vertices: 0,
            num_indices: 0,
            layout: None,
        })
    }

    /// Bind the object for setup; unbound again when the returned guard
    /// is finalized or dropped
    pub fn start_setup(&mut self) -> ObjectSetup<'_> {
        assert!(self.layout.is_none(), "GpuObject is already set up");
        self.device.bind_vertex_array(Some(self.vertex_array));
        ObjectSetup { object: self }
    }

    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }

    pub fn num_vertices(&self) -> i32 {
        self.num_vertices
    }

    pub fn num_indices(&self) -> i32 {
        self.num_indices
    }

    pub fn layout(&self) -> Option<&VertexLayout> {
        self.layout.as_ref()
    }

    pub fn draw(&self, shader: &Shader, textures: Option<&Textures>, flags: &[&str]) {
        self.draw_instanced(shader, 1, textures, flags);
    }

    /// Draw `instances` copies; `flags` are set to 1 for this draw only
    pub fn draw_instanced(&self, shader: &Shader, instances: u32, textures: Option<&Textures>, flags: &[&str]) {
        assert!(self.layout.is_some(), "GpuObject drawn before its vertex attributes were declared");

        shader.use_program();
        if let Some(textures) = textures {
            textures.use_textures(shader);
        }

        let _flags = FlagGuard::set(shader, flags);

        self.device.bind_vertex_array(Some(self.vertex_array));
        if self.is_indexed() {
            self.device.draw_elements_instanced(self.num_indices, instances as i32);
        } else {
            self.device.draw_arrays_instanced(0, self.num_vertices, instances as i32);
        }
        self.device.bind_vertex_array(None);
    }
}

impl Drop for GpuObject {
    fn drop(&mut self) {
        self.device.delete_vertex_array(self.vertex_array);
        if let Some(buffer) = self.vertex_buffer.take() {
            self.device.delete_buffer(buffer);
        }
        if let Some(buffer) = self.index_buffer.take() {
            self.device.delete_buffer(buffer);
        }
    }
}

// ============================================================================
// Setup scope
// ============================================================================

/// Setup scope of a [`GpuObject`]; unbinds VAO and buffers when it ends
pub struct ObjectSetup<'a> {
    object: &'a mut GpuObject,
}

impl ObjectSetup<'_> {
    /// Upload interleaved vertex data (once)
    pub fn add_vertices<T: Pod>(&mut self, vertices: &[T]) -> Result<()> {
        assert!(self.object.vertex_buffer.is_none(), "vertex data uploaded twice");
        let device = &self.object.device;
        let buffer = device.create_buffer()?;
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        device.bind_buffer(BufferTarget::Vertex, Some(buffer));
        device.buffer_data(BufferTarget::Vertex, bytes, BufferUsage::StaticDraw);

        self.object.vertex_buffer = Some(buffer);
        self.object.vertex_bytes = bytes.len();
        Ok(())
    }

    /// Upload 32-bit indices; later draws become indexed
    pub fn add_indices(&mut self, indices: &[u32]) -> Result<()> {
        assert!(self.object.index_buffer.is_none(), "index data uploaded twice");
        let device = &self.object.device;
        let buffer = device.create_buffer()?;
        device.bind_buffer(BufferTarget::Index, Some(buffer));
        device.buffer_data(BufferTarget::Index, bytemuck::cast_slice(indices), BufferUsage::StaticDraw);

        self.object.index_buffer = Some(buffer);
        self.object.num_indices = indices.len() as i32;
        Ok(())
    }

    /// Declare the attribute layout; must follow the vertex upload and
    /// happen exactly once
    pub fn add_vertex_attribs(&mut self, sizes: &[i32]) {
        assert!(self.object.layout.is_none(), "vertex attributes declared twice");
        assert!(
            self.object.vertex_buffer.is_some(),
            "vertex attributes declared before vertex data was uploaded"
        );

        let layout = VertexLayout::from_sizes(sizes);
        for attribute in &layout.attributes {
            self.object.device.vertex_attrib_pointer_f32(
                attribute.index,
                attribute.size,
                layout.stride,
                attribute.offset,
            );
            self.object.device.enable_vertex_attrib_array(attribute.index);
        }

        if layout.stride > 0 {
            self.object.num_vertices = (self.object.vertex_bytes / layout.stride as usize) as i32;
        }
        self.object.layout = Some(layout);
    }

    /// End the setup scope
    pub fn finalize(self) {}
}

impl Drop for ObjectSetup<'_> {
    fn drop(&mut self) {
        let device = &self.object.device;
        device.bind_vertex_array(None);
        device.bind_buffer(BufferTarget::Vertex, None);
        device.bind_buffer(BufferTarget::Index, None);
    }
}

// ============================================================================
// Shader flags
// ============================================================================

/// Sets boolean shader flags to 1 and back to 0 when dropped
pub(crate) struct FlagGuard<'a> {
    shader: &'a Shader,
    flags: &'a [&'a str],
}

impl<'a> FlagGuard<'a> {
    pub(crate) fn set(shader: &'a Shader, flags: &'a [&'a str]) -> Self {
        for flag in flags {
            shader.set_int(flag, 1);
        }
        Self { shader, flags }
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        for flag in self.flags {
            self.shader.set_int(flag, 0);
        }
    }
}

#[cfg(test)]
#[path = "object_tests.rs"]
mod tests;
