/// GraphicsDevice trait - immediate-mode GPU command interface

use slotmap::new_key_type;

use crate::error::Result;
use crate::graphics_device::{
    Attachment, BlitFilter, BlitRect, BufferTarget, BufferUsage, ClearFlags, DrawBuffer,
    FramebufferBinding, FramebufferStatus, ImageTarget, InternalFormat, SamplerDesc,
    TexImageDesc, TextureTarget,
};

// ============================================================================
// Handles
// ============================================================================

new_key_type! {
    /// Vertex, index or uniform buffer
    pub struct BufferId;
    /// Vertex attribute layout object
    pub struct VertexArrayId;
    /// 2-D, cubemap or multisample texture
    pub struct TextureId;
    /// Framebuffer object (the default framebuffer is `None`)
    pub struct FramebufferId;
    /// Renderbuffer storage
    pub struct RenderbufferId;
    /// Linked shader program
    pub struct ProgramId;
    /// Resolved uniform slot of a program
    pub struct UniformLocation;
}

// ============================================================================
// Common types
// ============================================================================

/// Fixed-function capabilities toggled by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    DepthTest,
    CullFace,
}

/// Depth comparison function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFunc {
    Less,
    LessEqual,
}

/// Sources of one shader program
#[derive(Debug, Clone, Copy)]
pub struct ShaderSources<'a> {
    /// Human-readable name used in error messages (usually the file names)
    pub name: &'a str,
    pub vertex: &'a str,
    pub fragment: &'a str,
    pub geometry: Option<&'a str>,
}

// ============================================================================
// GraphicsDevice trait
// ============================================================================

/// Immediate-mode GPU command surface
///
/// Every component of the pipeline issues its GPU work through this trait.
/// All methods take `&self`: a device wraps a single-threaded graphics
/// context and is shared between components as `Rc<dyn GraphicsDevice>`.
///
/// Object creation returns a handle owned by the caller, who must release
/// it with the matching `delete_*` call. Binding `None` restores the
/// default object (framebuffer 0, no buffer, no program).
pub trait GraphicsDevice {
    // ===== BUFFERS =====

    fn create_buffer(&self) -> Result<BufferId>;
    fn delete_buffer(&self, buffer: BufferId);
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>);

    /// Replace the whole store of the buffer bound at `target`
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);

    /// Allocate `size` zeroed bytes for the buffer bound at `target`
    fn buffer_data_size(&self, target: BufferTarget, size: usize, usage: BufferUsage);

    /// Overwrite `data.len()` bytes at `offset` of the buffer bound at `target`
    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]);

    /// Attach a uniform buffer to an indexed binding point
    fn bind_buffer_base(&self, binding: u32, buffer: BufferId);

    // ===== VERTEX ARRAYS & DRAWING =====

    fn create_vertex_array(&self) -> Result<VertexArrayId>;
    fn delete_vertex_array(&self, vertex_array: VertexArrayId);
    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>);
    fn enable_vertex_attrib_array(&self, index: u32);

    /// Declare a float attribute read from the bound vertex buffer
    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32);

    /// Non-indexed triangle list draw
    fn draw_arrays_instanced(&self, first: i32, count: i32, instances: i32);

    /// Indexed triangle list draw with 32-bit indices
    fn draw_elements_instanced(&self, count: i32, instances: i32);

    // ===== TEXTURES =====

    fn create_texture(&self) -> Result<TextureId>;
    fn delete_texture(&self, texture: TextureId);

    /// Select texture unit `unit` for subsequent texture binds
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, target: TextureTarget, texture: Option<TextureId>);

    /// Upload (or allocate, when `pixels` is `None`) one image of the bound texture
    fn tex_image_2d(&self, target: ImageTarget, desc: &TexImageDesc, pixels: Option<&[u8]>);

    /// Allocate storage for the bound multisample texture
    fn tex_image_2d_multisample(&self, samples: u32, format: InternalFormat, width: u32, height: u32);

    fn generate_mipmap(&self, target: TextureTarget);
    fn set_sampler(&self, target: TextureTarget, sampler: &SamplerDesc);

    // ===== RENDERBUFFERS =====

    fn create_renderbuffer(&self) -> Result<RenderbufferId>;
    fn delete_renderbuffer(&self, renderbuffer: RenderbufferId);

    /// Bind and allocate storage, multisampled when `samples` is set
    fn renderbuffer_storage(
        &self,
        renderbuffer: RenderbufferId,
        samples: Option<u32>,
        format: InternalFormat,
        width: u32,
        height: u32,
    );

    // ===== FRAMEBUFFERS =====

    fn create_framebuffer(&self) -> Result<FramebufferId>;
    fn delete_framebuffer(&self, framebuffer: FramebufferId);
    fn bind_framebuffer(&self, binding: FramebufferBinding, framebuffer: Option<FramebufferId>);

    /// Framebuffer currently bound for drawing (`None` = default)
    fn current_draw_framebuffer(&self) -> Option<FramebufferId>;

    /// Attach a 2-D (or multisample) texture to the bound framebuffer
    fn framebuffer_texture_2d(&self, attachment: Attachment, target: TextureTarget, texture: TextureId);

    /// Attach every layer of a layered texture (cubemap) to the bound framebuffer
    fn framebuffer_texture(&self, attachment: Attachment, texture: TextureId);

    fn framebuffer_renderbuffer(&self, attachment: Attachment, renderbuffer: RenderbufferId);
    fn check_framebuffer_status(&self) -> FramebufferStatus;

    /// Select the color outputs of the bound draw framebuffer
    fn draw_buffers(&self, buffers: &[DrawBuffer]);

    /// Select the color source of the bound read framebuffer
    fn read_buffer(&self, buffer: DrawBuffer);

    /// Copy from the bound read framebuffer into the bound draw framebuffer
    fn blit_framebuffer(&self, src: BlitRect, dst: BlitRect, mask: ClearFlags, filter: BlitFilter);

    // ===== FIXED-FUNCTION STATE =====

    fn viewport(&self, x: i32, y: i32, width: u32, height: u32);
    fn clear_color(&self, color: [f32; 4]);
    fn clear(&self, mask: ClearFlags);
    fn enable(&self, capability: Capability);
    fn disable(&self, capability: Capability);
    fn depth_func(&self, func: DepthFunc);

    // ===== PROGRAMS & UNIFORMS =====

    /// Compile and link a program
    ///
    /// # Errors
    ///
    /// `Error::Shader` carrying the driver log when a stage fails to
    /// compile or the program fails to link.
    fn create_program(&self, sources: &ShaderSources<'_>) -> Result<ProgramId>;
    fn delete_program(&self, program: ProgramId);
    fn use_program(&self, program: Option<ProgramId>);

    /// Resolve a uniform name, `None` when the program has no such active uniform
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    fn uniform_1_i32(&self, location: UniformLocation, value: i32);
    fn uniform_1_f32(&self, location: UniformLocation, value: f32);
    fn uniform_2_f32(&self, location: UniformLocation, x: f32, y: f32);
    fn uniform_3_f32(&self, location: UniformLocation, x: f32, y: f32, z: f32);
    fn uniform_1_f32_slice(&self, location: UniformLocation, values: &[f32]);
}
