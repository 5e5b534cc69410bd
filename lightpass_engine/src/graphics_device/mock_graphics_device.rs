/// Mock graphics device for unit tests (no GPU required)
///
/// Records every call as a [`DeviceCommand`] and tracks the observable GL
/// state (bindings, live objects, buffer contents, uniforms) so that tests
/// can assert both ordering and end state.

use std::cell::RefCell;

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::graphics_device::{
    Attachment, BlitFilter, BlitRect, BufferId, BufferTarget, BufferUsage, Capability, ClearFlags,
    DepthFunc, DrawBuffer, FramebufferBinding, FramebufferId, FramebufferStatus, GraphicsDevice,
    ImageTarget, InternalFormat, ProgramId, RenderbufferId, SamplerDesc, ShaderSources,
    TexImageDesc, TextureId, TextureTarget, UniformLocation, VertexArrayId,
};

// ============================================================================
// Recorded commands
// ============================================================================

/// Value written to a uniform
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    FloatArray(Vec<f32>),
}

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    CreateBuffer(BufferId),
    DeleteBuffer(BufferId),
    BindBuffer(BufferTarget, Option<BufferId>),
    BufferData { target: BufferTarget, buffer: Option<BufferId>, len: usize },
    BufferSubData { target: BufferTarget, buffer: Option<BufferId>, offset: usize, len: usize },
    BindBufferBase { binding: u32, buffer: BufferId },
    CreateVertexArray(VertexArrayId),
    DeleteVertexArray(VertexArrayId),
    BindVertexArray(Option<VertexArrayId>),
    EnableVertexAttribArray(u32),
    VertexAttribPointer { index: u32, size: i32, stride: i32, offset: i32 },
    DrawArrays { first: i32, count: i32, instances: i32 },
    DrawElements { count: i32, instances: i32 },
    CreateTexture(TextureId),
    DeleteTexture(TextureId),
    ActiveTexture(u32),
    BindTexture(TextureTarget, Option<TextureId>),
    TexImage2D { target: ImageTarget, desc: TexImageDesc, has_data: bool },
    TexImage2DMultisample { samples: u32, format: InternalFormat },
    GenerateMipmap(TextureTarget),
    SetSampler(TextureTarget, SamplerDesc),
    CreateRenderbuffer(RenderbufferId),
    DeleteRenderbuffer(RenderbufferId),
    RenderbufferStorage { renderbuffer: RenderbufferId, samples: Option<u32>, format: InternalFormat },
    CreateFramebuffer(FramebufferId),
    DeleteFramebuffer(FramebufferId),
    BindFramebuffer(FramebufferBinding, Option<FramebufferId>),
    FramebufferTexture2D { attachment: Attachment, target: TextureTarget, texture: TextureId },
    FramebufferTexture { attachment: Attachment, texture: TextureId },
    FramebufferRenderbuffer { attachment: Attachment, renderbuffer: RenderbufferId },
    CheckFramebufferStatus,
    DrawBuffers(Vec<DrawBuffer>),
    ReadBuffer(DrawBuffer),
    BlitFramebuffer {
        read: Option<FramebufferId>,
        draw: Option<FramebufferId>,
        mask: ClearFlags,
        filter: BlitFilter,
    },
    Viewport { x: i32, y: i32, width: u32, height: u32 },
    ClearColor([f32; 4]),
    Clear(ClearFlags),
    Enable(Capability),
    Disable(Capability),
    DepthFunc(DepthFunc),
    CreateProgram { program: ProgramId, name: String },
    DeleteProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    SetUniform { program: ProgramId, name: String, value: UniformValue },
}

// ============================================================================
// Tracked state
// ============================================================================

#[derive(Debug, Default)]
struct MockFramebuffer {
    attachments: FxHashMap<Attachment, AttachedObject>,
    draw_buffers: Vec<DrawBuffer>,
    read_buffer: Option<DrawBuffer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttachedObject {
    Texture(TextureId),
    Renderbuffer(RenderbufferId),
}

#[derive(Debug, Default)]
struct MockState {
    commands: Vec<DeviceCommand>,

    buffers: SlotMap<BufferId, Vec<u8>>,
    bound_buffers: FxHashMap<BufferTarget, BufferId>,
    uniform_bindings: FxHashMap<u32, BufferId>,

    vertex_arrays: SlotMap<VertexArrayId, ()>,
    bound_vertex_array: Option<VertexArrayId>,

    textures: SlotMap<TextureId, Option<TextureTarget>>,
    active_unit: u32,
    unit_bindings: FxHashMap<u32, (TextureTarget, Option<TextureId>)>,

    renderbuffers: SlotMap<RenderbufferId, ()>,

    framebuffers: SlotMap<FramebufferId, MockFramebuffer>,
    bound_draw: Option<FramebufferId>,
    bound_read: Option<FramebufferId>,

    programs: SlotMap<ProgramId, String>,
    current_program: Option<ProgramId>,
    locations: SlotMap<UniformLocation, (ProgramId, String)>,
    location_cache: FxHashMap<(ProgramId, String), UniformLocation>,
    uniforms: FxHashMap<(ProgramId, String), UniformValue>,

    capabilities: FxHashSet<Capability>,
    depth_func: Option<DepthFunc>,
    viewport: Option<(i32, i32, u32, u32)>,

    failing_programs: FxHashSet<String>,
    force_incomplete: bool,
}

/// Recording graphics device
#[derive(Debug, Default)]
pub struct MockGraphicsDevice {
    state: RefCell<MockState>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== FAILURE INJECTION =====

    /// Make `create_program` fail for sources whose name contains `name`
    pub fn fail_program(&self, name: &str) {
        self.state.borrow_mut().failing_programs.insert(name.to_string());
    }

    /// Make every completeness check report an incomplete framebuffer
    pub fn set_framebuffer_incomplete(&self, incomplete: bool) {
        self.state.borrow_mut().force_incomplete = incomplete;
    }

    // ===== COMMAND LOG =====

    pub fn commands(&self) -> Vec<DeviceCommand> {
        self.state.borrow().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.state.borrow_mut().commands.clear();
    }

    pub fn count_commands(&self, predicate: impl Fn(&DeviceCommand) -> bool) -> usize {
        self.state.borrow().commands.iter().filter(|c| predicate(c)).count()
    }

    /// Index of the first command matching `predicate`
    pub fn position(&self, predicate: impl Fn(&DeviceCommand) -> bool) -> Option<usize> {
        self.state.borrow().commands.iter().position(|c| predicate(c))
    }

    /// Index of the last command matching `predicate`
    pub fn last_position(&self, predicate: impl Fn(&DeviceCommand) -> bool) -> Option<usize> {
        self.state.borrow().commands.iter().rposition(|c| predicate(c))
    }

    // ===== STATE QUERIES =====

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    pub fn is_texture_alive(&self, texture: TextureId) -> bool {
        self.state.borrow().textures.contains_key(texture)
    }

    pub fn live_renderbuffers(&self) -> usize {
        self.state.borrow().renderbuffers.len()
    }

    pub fn live_framebuffers(&self) -> usize {
        self.state.borrow().framebuffers.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn bound_vertex_array(&self) -> Option<VertexArrayId> {
        self.state.borrow().bound_vertex_array
    }

    pub fn bound_buffer(&self, target: BufferTarget) -> Option<BufferId> {
        self.state.borrow().bound_buffers.get(&target).copied()
    }

    pub fn buffer_contents(&self, buffer: BufferId) -> Vec<u8> {
        self.state.borrow().buffers.get(buffer).cloned().unwrap_or_default()
    }

    /// Uniform buffer attached to an indexed binding point
    pub fn uniform_buffer_at(&self, binding: u32) -> Option<BufferId> {
        self.state.borrow().uniform_bindings.get(&binding).copied()
    }

    /// Draw buffers declared for `framebuffer` (empty when never declared)
    pub fn draw_buffers_of(&self, framebuffer: FramebufferId) -> Vec<DrawBuffer> {
        self.state
            .borrow()
            .framebuffers
            .get(framebuffer)
            .map(|fb| fb.draw_buffers.clone())
            .unwrap_or_default()
    }

    pub fn read_buffer_of(&self, framebuffer: FramebufferId) -> Option<DrawBuffer> {
        self.state.borrow().framebuffers.get(framebuffer).and_then(|fb| fb.read_buffer)
    }

    /// Number of attachments of `framebuffer`
    pub fn attachment_count(&self, framebuffer: FramebufferId) -> usize {
        self.state
            .borrow()
            .framebuffers
            .get(framebuffer)
            .map(|fb| fb.attachments.len())
            .unwrap_or(0)
    }

    /// Texture attached at `attachment`, if any
    pub fn attached_texture(&self, framebuffer: FramebufferId, attachment: Attachment) -> Option<TextureId> {
        let state = self.state.borrow();
        match state.framebuffers.get(framebuffer)?.attachments.get(&attachment)? {
            AttachedObject::Texture(texture) => Some(*texture),
            AttachedObject::Renderbuffer(_) => None,
        }
    }

    pub fn has_renderbuffer_attachment(&self, framebuffer: FramebufferId, attachment: Attachment) -> bool {
        let state = self.state.borrow();
        matches!(
            state.framebuffers.get(framebuffer).and_then(|fb| fb.attachments.get(&attachment)),
            Some(AttachedObject::Renderbuffer(_))
        )
    }

    pub fn bound_draw_framebuffer(&self) -> Option<FramebufferId> {
        self.state.borrow().bound_draw
    }

    pub fn bound_read_framebuffer(&self) -> Option<FramebufferId> {
        self.state.borrow().bound_read
    }

    /// Texture bound on `unit` with its target
    pub fn texture_on_unit(&self, unit: u32) -> Option<(TextureTarget, Option<TextureId>)> {
        self.state.borrow().unit_bindings.get(&unit).copied()
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.state.borrow().current_program
    }

    /// Last value written to `name` on `program`
    pub fn uniform(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        self.state.borrow().uniforms.get(&(program, name.to_string())).cloned()
    }

    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.state.borrow().capabilities.contains(&capability)
    }

    pub fn current_depth_func(&self) -> Option<DepthFunc> {
        self.state.borrow().depth_func
    }

    pub fn current_viewport(&self) -> Option<(i32, i32, u32, u32)> {
        self.state.borrow().viewport
    }

    fn record(&self, command: DeviceCommand) {
        self.state.borrow_mut().commands.push(command);
    }

    fn set_uniform(&self, location: UniformLocation, value: UniformValue) {
        let state = &mut *self.state.borrow_mut();
        let Some((program, name)) = state.locations.get(location).cloned() else {
            return;
        };
        state.uniforms.insert((program, name.clone()), value.clone());
        state.commands.push(DeviceCommand::SetUniform { program, name, value });
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    // ===== BUFFERS =====

    fn create_buffer(&self) -> Result<BufferId> {
        let id = self.state.borrow_mut().buffers.insert(Vec::new());
        self.record(DeviceCommand::CreateBuffer(id));
        Ok(id)
    }

    fn delete_buffer(&self, buffer: BufferId) {
        let state = &mut *self.state.borrow_mut();
        state.buffers.remove(buffer);
        state.bound_buffers.retain(|_, b| *b != buffer);
        state.uniform_bindings.retain(|_, b| *b != buffer);
        state.commands.push(DeviceCommand::DeleteBuffer(buffer));
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        let state = &mut *self.state.borrow_mut();
        match buffer {
            Some(id) => state.bound_buffers.insert(target, id),
            None => state.bound_buffers.remove(&target),
        };
        state.commands.push(DeviceCommand::BindBuffer(target, buffer));
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], _usage: BufferUsage) {
        let state = &mut *self.state.borrow_mut();
        let buffer = state.bound_buffers.get(&target).copied();
        if let Some(store) = buffer.and_then(|id| state.buffers.get_mut(id)) {
            *store = data.to_vec();
        }
        state.commands.push(DeviceCommand::BufferData { target, buffer, len: data.len() });
    }

    fn buffer_data_size(&self, target: BufferTarget, size: usize, _usage: BufferUsage) {
        let state = &mut *self.state.borrow_mut();
        let buffer = state.bound_buffers.get(&target).copied();
        if let Some(store) = buffer.and_then(|id| state.buffers.get_mut(id)) {
            *store = vec![0; size];
        }
        state.commands.push(DeviceCommand::BufferData { target, buffer, len: size });
    }

    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]) {
        let state = &mut *self.state.borrow_mut();
        let buffer = state.bound_buffers.get(&target).copied();
        if let Some(store) = buffer.and_then(|id| state.buffers.get_mut(id)) {
            let end = offset + data.len();
            assert!(end <= store.len(), "buffer_sub_data out of bounds: {}..{} of {}", offset, end, store.len());
            store[offset..end].copy_from_slice(data);
        }
        state.commands.push(DeviceCommand::BufferSubData { target, buffer, offset, len: data.len() });
    }

    fn bind_buffer_base(&self, binding: u32, buffer: BufferId) {
        let state = &mut *self.state.borrow_mut();
        state.uniform_bindings.insert(binding, buffer);
        state.commands.push(DeviceCommand::BindBufferBase { binding, buffer });
    }

    // ===== VERTEX ARRAYS & DRAWING =====

    fn create_vertex_array(&self) -> Result<VertexArrayId> {
        let id = self.state.borrow_mut().vertex_arrays.insert(());
        self.record(DeviceCommand::CreateVertexArray(id));
        Ok(id)
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        self.state.borrow_mut().vertex_arrays.remove(vertex_array);
        self.record(DeviceCommand::DeleteVertexArray(vertex_array));
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>) {
        self.state.borrow_mut().bound_vertex_array = vertex_array;
        self.record(DeviceCommand::BindVertexArray(vertex_array));
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(DeviceCommand::EnableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        self.record(DeviceCommand::VertexAttribPointer { index, size, stride, offset });
    }

    fn draw_arrays_instanced(&self, first: i32, count: i32, instances: i32) {
        self.record(DeviceCommand::DrawArrays { first, count, instances });
    }

    fn draw_elements_instanced(&self, count: i32, instances: i32) {
        self.record(DeviceCommand::DrawElements { count, instances });
    }

    // ===== TEXTURES =====

    fn create_texture(&self) -> Result<TextureId> {
        let id = self.state.borrow_mut().textures.insert(None);
        self.record(DeviceCommand::CreateTexture(id));
        Ok(id)
    }

    fn delete_texture(&self, texture: TextureId) {
        let state = &mut *self.state.borrow_mut();
        assert!(state.textures.remove(texture).is_some(), "texture deleted twice");
        state.commands.push(DeviceCommand::DeleteTexture(texture));
    }

    fn active_texture(&self, unit: u32) {
        self.state.borrow_mut().active_unit = unit;
        self.record(DeviceCommand::ActiveTexture(unit));
    }

    fn bind_texture(&self, target: TextureTarget, texture: Option<TextureId>) {
        let state = &mut *self.state.borrow_mut();
        let unit = state.active_unit;
        state.unit_bindings.insert(unit, (target, texture));
        if let Some(slot) = texture.and_then(|id| state.textures.get_mut(id)) {
            *slot = Some(target);
        }
        state.commands.push(DeviceCommand::BindTexture(target, texture));
    }

    fn tex_image_2d(&self, target: ImageTarget, desc: &TexImageDesc, pixels: Option<&[u8]>) {
        self.record(DeviceCommand::TexImage2D { target, desc: *desc, has_data: pixels.is_some() });
    }

    fn tex_image_2d_multisample(&self, samples: u32, format: InternalFormat, _width: u32, _height: u32) {
        self.record(DeviceCommand::TexImage2DMultisample { samples, format });
    }

    fn generate_mipmap(&self, target: TextureTarget) {
        self.record(DeviceCommand::GenerateMipmap(target));
    }

    fn set_sampler(&self, target: TextureTarget, sampler: &SamplerDesc) {
        self.record(DeviceCommand::SetSampler(target, *sampler));
    }

    // ===== RENDERBUFFERS =====

    fn create_renderbuffer(&self) -> Result<RenderbufferId> {
        let id = self.state.borrow_mut().renderbuffers.insert(());
        self.record(DeviceCommand::CreateRenderbuffer(id));
        Ok(id)
    }

    fn delete_renderbuffer(&self, renderbuffer: RenderbufferId) {
        self.state.borrow_mut().renderbuffers.remove(renderbuffer);
        self.record(DeviceCommand::DeleteRenderbuffer(renderbuffer));
    }

    fn renderbuffer_storage(
        &self,
        renderbuffer: RenderbufferId,
        samples: Option<u32>,
        format: InternalFormat,
        _width: u32,
        _height: u32,
    ) {
        self.record(DeviceCommand::RenderbufferStorage { renderbuffer, samples, format });
    }

    // ===== FRAMEBUFFERS =====

    fn create_framebuffer(&self) -> Result<FramebufferId> {
        let id = self.state.borrow_mut().framebuffers.insert(MockFramebuffer::default());
        self.record(DeviceCommand::CreateFramebuffer(id));
        Ok(id)
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        let state = &mut *self.state.borrow_mut();
        state.framebuffers.remove(framebuffer);
        if state.bound_draw == Some(framebuffer) {
            state.bound_draw = None;
        }
        if state.bound_read == Some(framebuffer) {
            state.bound_read = None;
        }
        state.commands.push(DeviceCommand::DeleteFramebuffer(framebuffer));
    }

    fn bind_framebuffer(&self, binding: FramebufferBinding, framebuffer: Option<FramebufferId>) {
        let state = &mut *self.state.borrow_mut();
        match binding {
            FramebufferBinding::Both => {
                state.bound_draw = framebuffer;
                state.bound_read = framebuffer;
            }
            FramebufferBinding::Draw => state.bound_draw = framebuffer,
            FramebufferBinding::Read => state.bound_read = framebuffer,
        }
        state.commands.push(DeviceCommand::BindFramebuffer(binding, framebuffer));
    }

    fn current_draw_framebuffer(&self) -> Option<FramebufferId> {
        self.state.borrow().bound_draw
    }

    fn framebuffer_texture_2d(&self, attachment: Attachment, target: TextureTarget, texture: TextureId) {
        let state = &mut *self.state.borrow_mut();
        if let Some(fb) = state.bound_draw.and_then(|id| state.framebuffers.get_mut(id)) {
            fb.attachments.insert(attachment, AttachedObject::Texture(texture));
        }
        state.commands.push(DeviceCommand::FramebufferTexture2D { attachment, target, texture });
    }

    fn framebuffer_texture(&self, attachment: Attachment, texture: TextureId) {
        let state = &mut *self.state.borrow_mut();
        if let Some(fb) = state.bound_draw.and_then(|id| state.framebuffers.get_mut(id)) {
            fb.attachments.insert(attachment, AttachedObject::Texture(texture));
        }
        state.commands.push(DeviceCommand::FramebufferTexture { attachment, texture });
    }

    fn framebuffer_renderbuffer(&self, attachment: Attachment, renderbuffer: RenderbufferId) {
        let state = &mut *self.state.borrow_mut();
        if let Some(fb) = state.bound_draw.and_then(|id| state.framebuffers.get_mut(id)) {
            fb.attachments.insert(attachment, AttachedObject::Renderbuffer(renderbuffer));
        }
        state.commands.push(DeviceCommand::FramebufferRenderbuffer { attachment, renderbuffer });
    }

    fn check_framebuffer_status(&self) -> FramebufferStatus {
        let state = &mut *self.state.borrow_mut();
        state.commands.push(DeviceCommand::CheckFramebufferStatus);
        if state.force_incomplete {
            return FramebufferStatus::Incomplete("FRAMEBUFFER_INCOMPLETE_ATTACHMENT".to_string());
        }
        match state.bound_draw.and_then(|id| state.framebuffers.get(id)) {
            Some(fb) if !fb.attachments.is_empty() => FramebufferStatus::Complete,
            Some(_) => FramebufferStatus::Incomplete("FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT".to_string()),
            None => FramebufferStatus::Complete,
        }
    }

    fn draw_buffers(&self, buffers: &[DrawBuffer]) {
        let state = &mut *self.state.borrow_mut();
        if let Some(fb) = state.bound_draw.and_then(|id| state.framebuffers.get_mut(id)) {
            fb.draw_buffers = buffers.to_vec();
        }
        state.commands.push(DeviceCommand::DrawBuffers(buffers.to_vec()));
    }

    fn read_buffer(&self, buffer: DrawBuffer) {
        let state = &mut *self.state.borrow_mut();
        if let Some(fb) = state.bound_read.and_then(|id| state.framebuffers.get_mut(id)) {
            fb.read_buffer = Some(buffer);
        }
        state.commands.push(DeviceCommand::ReadBuffer(buffer));
    }

    fn blit_framebuffer(&self, _src: BlitRect, _dst: BlitRect, mask: ClearFlags, filter: BlitFilter) {
        let state = &mut *self.state.borrow_mut();
        let (read, draw) = (state.bound_read, state.bound_draw);
        state.commands.push(DeviceCommand::BlitFramebuffer { read, draw, mask, filter });
    }

    // ===== FIXED-FUNCTION STATE =====

    fn viewport(&self, x: i32, y: i32, width: u32, height: u32) {
        self.state.borrow_mut().viewport = Some((x, y, width, height));
        self.record(DeviceCommand::Viewport { x, y, width, height });
    }

    fn clear_color(&self, color: [f32; 4]) {
        self.record(DeviceCommand::ClearColor(color));
    }

    fn clear(&self, mask: ClearFlags) {
        self.record(DeviceCommand::Clear(mask));
    }

    fn enable(&self, capability: Capability) {
        self.state.borrow_mut().capabilities.insert(capability);
        self.record(DeviceCommand::Enable(capability));
    }

    fn disable(&self, capability: Capability) {
        self.state.borrow_mut().capabilities.remove(&capability);
        self.record(DeviceCommand::Disable(capability));
    }

    fn depth_func(&self, func: DepthFunc) {
        self.state.borrow_mut().depth_func = Some(func);
        self.record(DeviceCommand::DepthFunc(func));
    }

    // ===== PROGRAMS & UNIFORMS =====

    fn create_program(&self, sources: &ShaderSources<'_>) -> Result<ProgramId> {
        let state = &mut *self.state.borrow_mut();
        if state.failing_programs.iter().any(|name| sources.name.contains(name.as_str())) {
            return Err(Error::Shader(format!("{}: 0:1(1): error: syntax error", sources.name)));
        }
        if sources.vertex.trim().is_empty() || sources.fragment.trim().is_empty() {
            return Err(Error::Shader(format!("{}: empty shader source", sources.name)));
        }
        let program = state.programs.insert(sources.name.to_string());
        state.commands.push(DeviceCommand::CreateProgram { program, name: sources.name.to_string() });
        Ok(program)
    }

    fn delete_program(&self, program: ProgramId) {
        self.state.borrow_mut().programs.remove(program);
        self.record(DeviceCommand::DeleteProgram(program));
    }

    fn use_program(&self, program: Option<ProgramId>) {
        self.state.borrow_mut().current_program = program;
        self.record(DeviceCommand::UseProgram(program));
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let state = &mut *self.state.borrow_mut();
        if !state.programs.contains_key(program) {
            return None;
        }
        let key = (program, name.to_string());
        if let Some(location) = state.location_cache.get(&key) {
            return Some(*location);
        }
        let location = state.locations.insert(key.clone());
        state.location_cache.insert(key, location);
        Some(location)
    }

    fn uniform_1_i32(&self, location: UniformLocation, value: i32) {
        self.set_uniform(location, UniformValue::Int(value));
    }

    fn uniform_1_f32(&self, location: UniformLocation, value: f32) {
        self.set_uniform(location, UniformValue::Float(value));
    }

    fn uniform_2_f32(&self, location: UniformLocation, x: f32, y: f32) {
        self.set_uniform(location, UniformValue::Vec2([x, y]));
    }

    fn uniform_3_f32(&self, location: UniformLocation, x: f32, y: f32, z: f32) {
        self.set_uniform(location, UniformValue::Vec3([x, y, z]));
    }

    fn uniform_1_f32_slice(&self, location: UniformLocation, values: &[f32]) {
        self.set_uniform(location, UniformValue::FloatArray(values.to_vec()));
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
