/// Uniform buffer bound to a fixed binding point, written field by field

use std::rc::Rc;

use glam::{Mat4, Vec3, Vec4};

use crate::context::block_layout::BlockLayout;
use crate::error::Result;
use crate::graphics_device::{BufferId, BufferTarget, BufferUsage, GraphicsDevice};

/// GPU uniform buffer with a std140 layout
///
/// Every setter uploads only the bytes of the addressed field. Unknown
/// field names are programming errors and panic.
pub struct UniformBlock {
    device: Rc<dyn GraphicsDevice>,
    buffer: BufferId,
    binding: u32,
    layout: BlockLayout,
}

impl UniformBlock {
    /// Allocate a zeroed buffer of `layout.size()` bytes and attach it to `binding`
    pub fn new(device: Rc<dyn GraphicsDevice>, binding: u32, layout: BlockLayout) -> Result<Self> {
        let buffer = device.create_buffer()?;
        device.bind_buffer(BufferTarget::Uniform, Some(buffer));
        device.buffer_data_size(BufferTarget::Uniform, layout.size(), BufferUsage::DynamicDraw);
        device.bind_buffer(BufferTarget::Uniform, None);
        device.bind_buffer_base(binding, buffer);

        crate::engine_debug!(
            "lightpass::UniformBlock",
            "Uniform block at binding {} ({} bytes)",
            binding,
            layout.size()
        );

        Ok(Self { device, buffer, binding, layout })
    }

    pub fn binding(&self) -> u32 {
        self.binding
    }

    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    /// Write raw bytes at the start of `field`
    pub fn write(&self, field: &str, bytes: &[u8]) {
        let entry = self.layout.expect_field(field);
        assert!(
            bytes.len() <= entry.span(),
            "{} bytes do not fit uniform field '{}' ({} bytes)",
            bytes.len(),
            field,
            entry.span()
        );
        self.device.bind_buffer(BufferTarget::Uniform, Some(self.buffer));
        self.device.buffer_sub_data(BufferTarget::Uniform, entry.offset, bytes);
        self.device.bind_buffer(BufferTarget::Uniform, None);
    }

    pub fn set_mat4(&self, field: &str, value: &Mat4) {
        self.write(field, bytemuck::bytes_of(value));
    }

    pub fn set_vec3(&self, field: &str, value: Vec3) {
        self.write(field, bytemuck::bytes_of(&value));
    }

    pub fn set_vec4(&self, field: &str, value: Vec4) {
        self.write(field, bytemuck::bytes_of(&value));
    }

    pub fn set_float(&self, field: &str, value: f32) {
        self.write(field, bytemuck::bytes_of(&value));
    }

    pub fn set_int(&self, field: &str, value: i32) {
        self.write(field, bytemuck::bytes_of(&value));
    }

    /// Write consecutive matrices starting at element 0 of `field`
    pub fn set_mat4_array(&self, field: &str, values: &[Mat4]) {
        self.write(field, bytemuck::cast_slice(values));
    }

    /// Write consecutive vectors starting at element 0 of `field`, padded to vec4
    pub fn set_vec3_array(&self, field: &str, values: &[Vec3]) {
        let padded: Vec<Vec4> = values.iter().map(|v| v.extend(0.0)).collect();
        let bytes: &[u8] = bytemuck::cast_slice(&padded);
        // the trailing pad of the last element is outside the field span
        let used = bytes.len().saturating_sub(4);
        self.write(field, &bytes[..used]);
    }
}

impl Drop for UniformBlock {
    fn drop(&mut self) {
        self.device.delete_buffer(self.buffer);
    }
}
