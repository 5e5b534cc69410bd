/// GlDevice - GraphicsDevice implementation over an OpenGL 3.3+ context (glow)
///
/// Engine handles are slotmap keys mapped to the glow objects they stand
/// for. Calls naming an unknown handle (already deleted, or from another
/// device) are logged and skipped.

use std::cell::{Cell, RefCell};

use glow::HasContext;
use rustc_hash::FxHashMap;
use slotmap::{Key, SlotMap};

use lightpass_engine::lightpass::device::{
    Attachment, BlitFilter, BlitRect, BufferId, BufferTarget, BufferUsage, Capability,
    ClearFlags, DepthFunc, DrawBuffer, FramebufferBinding, FramebufferId, FramebufferStatus,
    GraphicsDevice, ImageTarget, InternalFormat, ProgramId, RenderbufferId, SamplerDesc,
    ShaderSources, TexImageDesc, TextureId, TextureTarget, TextureWrap, UniformLocation,
    VertexArrayId,
};
use lightpass_engine::lightpass::{Error, Result};
use lightpass_engine::{engine_bail, engine_debug, engine_err, engine_info, engine_warn};

use crate::gl_format;

const SOURCE: &str = "lightpass::GlDevice";

// ============================================================================
// Configuration
// ============================================================================

/// Options applied when wrapping a context
#[derive(Debug, Clone)]
pub struct GlConfig {
    /// Route KHR_debug messages to the engine logger (needs the `gl-debug` feature)
    pub enable_debug_output: bool,
}

impl Default for GlConfig {
    fn default() -> Self {
        Self {
            enable_debug_output: cfg!(debug_assertions),
        }
    }
}

// ============================================================================
// Object tables
// ============================================================================

#[derive(Default)]
struct GlObjects {
    buffers: SlotMap<BufferId, glow::Buffer>,
    vertex_arrays: SlotMap<VertexArrayId, glow::VertexArray>,
    textures: SlotMap<TextureId, glow::Texture>,
    framebuffers: SlotMap<FramebufferId, glow::Framebuffer>,
    renderbuffers: SlotMap<RenderbufferId, glow::Renderbuffer>,
    programs: SlotMap<ProgramId, glow::Program>,
    locations: SlotMap<UniformLocation, glow::UniformLocation>,
    /// Resolved names per program, including misses
    location_cache: FxHashMap<(ProgramId, String), Option<UniformLocation>>,
}

fn resolve<K: Key, V: Copy>(table: &SlotMap<K, V>, key: K, kind: &str) -> Option<V> {
    let object = table.get(key).copied();
    if object.is_none() {
        engine_warn!(SOURCE, "Unknown {} handle {:?}, call skipped", kind, key);
    }
    object
}

// ============================================================================
// GlDevice
// ============================================================================

pub struct GlDevice {
    gl: glow::Context,
    objects: RefCell<GlObjects>,
    draw_framebuffer: Cell<Option<FramebufferId>>,
}

impl GlDevice {
    /// Wrap a current OpenGL context
    ///
    /// The context must stay current on this thread for the device's lifetime.
    pub fn new(mut gl: glow::Context, config: GlConfig) -> Result<Self> {
        let version = gl.version();
        if version.major < 3 || (version.major == 3 && version.minor < 3) {
            engine_bail!(
                SOURCE,
                Error::BackendError,
                "OpenGL 3.3 or newer required, context is {}.{}",
                version.major,
                version.minor
            );
        }

        unsafe {
            engine_info!(
                SOURCE,
                "OpenGL {} on {}",
                gl.get_parameter_string(glow::VERSION),
                gl.get_parameter_string(glow::RENDERER)
            );
            gl.enable(glow::TEXTURE_CUBE_MAP_SEAMLESS);
        }

        if config.enable_debug_output {
            Self::install_debug_output(&mut gl);
        }

        Ok(Self {
            gl,
            objects: RefCell::new(GlObjects::default()),
            draw_framebuffer: Cell::new(None),
        })
    }

    #[cfg(feature = "gl-debug")]
    fn install_debug_output(gl: &mut glow::Context) {
        if crate::gl_debug::install(gl) {
            engine_debug!(SOURCE, "KHR_debug output enabled");
        } else {
            engine_warn!(SOURCE, "Debug output requested but the context lacks KHR_debug");
        }
    }

    #[cfg(not(feature = "gl-debug"))]
    fn install_debug_output(_gl: &mut glow::Context) {
        engine_warn!(SOURCE, "Debug output requested but the gl-debug feature is off");
    }

    /// Underlying glow context, for interop with windowing code
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    fn compile_stage(&self, kind: u32, stage: &str, sources: &ShaderSources<'_>, code: &str) -> Result<glow::Shader> {
        let gl = &self.gl;
        unsafe {
            let shader = gl.create_shader(kind).map_err(|e| {
                engine_err!(SOURCE, Error::BackendError, "Failed to create {} shader: {}", stage, e)
            })?;
            gl.shader_source(shader, code);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                engine_bail!(
                    SOURCE,
                    Error::Shader,
                    "{} shader of {} failed to compile:\n{}",
                    stage,
                    sources.name,
                    log
                );
            }
            Ok(shader)
        }
    }

    fn forget_locations(objects: &mut GlObjects, program: ProgramId) {
        let GlObjects { locations, location_cache, .. } = objects;
        location_cache.retain(|(owner, _), location| {
            if *owner != program {
                return true;
            }
            if let Some(location) = location {
                locations.remove(*location);
            }
            false
        });
    }

    fn location(&self, location: UniformLocation) -> Option<glow::UniformLocation> {
        let objects = self.objects.borrow();
        let found = objects.locations.get(location).cloned();
        if found.is_none() {
            engine_warn!(SOURCE, "Unknown uniform location {:?}, call skipped", location);
        }
        found
    }
}

impl Drop for GlDevice {
    fn drop(&mut self) {
        let objects = self.objects.get_mut();
        let leaked = objects.buffers.len()
            + objects.vertex_arrays.len()
            + objects.textures.len()
            + objects.framebuffers.len()
            + objects.renderbuffers.len()
            + objects.programs.len();
        if leaked > 0 {
            engine_warn!(SOURCE, "{} GPU objects still alive at device drop", leaked);
        }
    }
}

impl GraphicsDevice for GlDevice {
    // ===== BUFFERS =====

    fn create_buffer(&self) -> Result<BufferId> {
        let buffer = unsafe { self.gl.create_buffer() }
            .map_err(|e| engine_err!(SOURCE, Error::BackendError, "Failed to create buffer: {}", e))?;
        Ok(self.objects.borrow_mut().buffers.insert(buffer))
    }

    fn delete_buffer(&self, buffer: BufferId) {
        if let Some(buffer) = self.objects.borrow_mut().buffers.remove(buffer) {
            unsafe { self.gl.delete_buffer(buffer) };
        }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        let object = match buffer {
            Some(id) => match resolve(&self.objects.borrow().buffers, id, "buffer") {
                Some(object) => Some(object),
                None => return,
            },
            None => None,
        };
        unsafe { self.gl.bind_buffer(gl_format::buffer_target(target), object) };
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe {
            self.gl.buffer_data_u8_slice(
                gl_format::buffer_target(target),
                data,
                gl_format::buffer_usage(usage),
            )
        };
    }

    fn buffer_data_size(&self, target: BufferTarget, size: usize, usage: BufferUsage) {
        self.buffer_data(target, &vec![0u8; size], usage);
    }

    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_sub_data_u8_slice(gl_format::buffer_target(target), offset as i32, data)
        };
    }

    fn bind_buffer_base(&self, binding: u32, buffer: BufferId) {
        if let Some(object) = resolve(&self.objects.borrow().buffers, buffer, "buffer") {
            unsafe { self.gl.bind_buffer_base(glow::UNIFORM_BUFFER, binding, Some(object)) };
        }
    }

    // ===== VERTEX ARRAYS & DRAWING =====

    fn create_vertex_array(&self) -> Result<VertexArrayId> {
        let vertex_array = unsafe { self.gl.create_vertex_array() }.map_err(|e| {
            engine_err!(SOURCE, Error::BackendError, "Failed to create vertex array: {}", e)
        })?;
        Ok(self.objects.borrow_mut().vertex_arrays.insert(vertex_array))
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        if let Some(vertex_array) = self.objects.borrow_mut().vertex_arrays.remove(vertex_array) {
            unsafe { self.gl.delete_vertex_array(vertex_array) };
        }
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>) {
        let object = match vertex_array {
            Some(id) => match resolve(&self.objects.borrow().vertex_arrays, id, "vertex array") {
                Some(object) => Some(object),
                None => return,
            },
            None => None,
        };
        unsafe { self.gl.bind_vertex_array(object) };
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) };
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, size, glow::FLOAT, false, stride, offset)
        };
    }

    fn draw_arrays_instanced(&self, first: i32, count: i32, instances: i32) {
        unsafe { self.gl.draw_arrays_instanced(glow::TRIANGLES, first, count, instances) };
    }

    fn draw_elements_instanced(&self, count: i32, instances: i32) {
        unsafe {
            self.gl
                .draw_elements_instanced(glow::TRIANGLES, count, glow::UNSIGNED_INT, 0, instances)
        };
    }

    // ===== TEXTURES =====

    fn create_texture(&self) -> Result<TextureId> {
        let texture = unsafe { self.gl.create_texture() }
            .map_err(|e| engine_err!(SOURCE, Error::BackendError, "Failed to create texture: {}", e))?;
        Ok(self.objects.borrow_mut().textures.insert(texture))
    }

    fn delete_texture(&self, texture: TextureId) {
        if let Some(texture) = self.objects.borrow_mut().textures.remove(texture) {
            unsafe { self.gl.delete_texture(texture) };
        }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) };
    }

    fn bind_texture(&self, target: TextureTarget, texture: Option<TextureId>) {
        let object = match texture {
            Some(id) => match resolve(&self.objects.borrow().textures, id, "texture") {
                Some(object) => Some(object),
                None => return,
            },
            None => None,
        };
        unsafe { self.gl.bind_texture(gl_format::texture_target(target), object) };
    }

    fn tex_image_2d(&self, target: ImageTarget, desc: &TexImageDesc, pixels: Option<&[u8]>) {
        unsafe {
            // Tightly packed rows (3-channel images are not 4-byte aligned)
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_image_2d(
                gl_format::image_target(target),
                0,
                gl_format::internal_format(desc.internal_format) as i32,
                desc.width as i32,
                desc.height as i32,
                0,
                gl_format::pixel_layout(desc.layout),
                gl_format::pixel_type(desc.pixel_type),
                pixels,
            );
        }
    }

    fn tex_image_2d_multisample(&self, samples: u32, format: InternalFormat, width: u32, height: u32) {
        unsafe {
            self.gl.tex_image_2d_multisample(
                glow::TEXTURE_2D_MULTISAMPLE,
                samples as i32,
                gl_format::internal_format(format) as i32,
                width as i32,
                height as i32,
                true,
            );
        }
    }

    fn generate_mipmap(&self, target: TextureTarget) {
        unsafe { self.gl.generate_mipmap(gl_format::texture_target(target)) };
    }

    fn set_sampler(&self, target: TextureTarget, sampler: &SamplerDesc) {
        // Multisample textures have no sampler state
        if target == TextureTarget::Texture2DMultisample {
            return;
        }

        let gl_target = gl_format::texture_target(target);
        let wrap = gl_format::texture_wrap(sampler.wrap) as i32;
        unsafe {
            let gl = &self.gl;
            gl.tex_parameter_i32(
                gl_target,
                glow::TEXTURE_MIN_FILTER,
                gl_format::texture_filter(sampler.min_filter) as i32,
            );
            gl.tex_parameter_i32(
                gl_target,
                glow::TEXTURE_MAG_FILTER,
                gl_format::texture_filter(sampler.mag_filter) as i32,
            );
            gl.tex_parameter_i32(gl_target, glow::TEXTURE_WRAP_S, wrap);
            gl.tex_parameter_i32(gl_target, glow::TEXTURE_WRAP_T, wrap);
            if target == TextureTarget::CubeMap {
                gl.tex_parameter_i32(gl_target, glow::TEXTURE_WRAP_R, wrap);
            }
            if let (TextureWrap::ClampToBorder, Some(color)) = (sampler.wrap, sampler.border_color) {
                gl.tex_parameter_f32_slice(gl_target, glow::TEXTURE_BORDER_COLOR, &color);
            }
        }
    }

    // ===== RENDERBUFFERS =====

    fn create_renderbuffer(&self) -> Result<RenderbufferId> {
        let renderbuffer = unsafe { self.gl.create_renderbuffer() }.map_err(|e| {
            engine_err!(SOURCE, Error::BackendError, "Failed to create renderbuffer: {}", e)
        })?;
        Ok(self.objects.borrow_mut().renderbuffers.insert(renderbuffer))
    }

    fn delete_renderbuffer(&self, renderbuffer: RenderbufferId) {
        if let Some(renderbuffer) = self.objects.borrow_mut().renderbuffers.remove(renderbuffer) {
            unsafe { self.gl.delete_renderbuffer(renderbuffer) };
        }
    }

    fn renderbuffer_storage(
        &self,
        renderbuffer: RenderbufferId,
        samples: Option<u32>,
        format: InternalFormat,
        width: u32,
        height: u32,
    ) {
        let Some(object) = resolve(&self.objects.borrow().renderbuffers, renderbuffer, "renderbuffer")
        else {
            return;
        };
        let gl_format = gl_format::internal_format(format);
        unsafe {
            let gl = &self.gl;
            gl.bind_renderbuffer(glow::RENDERBUFFER, Some(object));
            match samples {
                Some(samples) => gl.renderbuffer_storage_multisample(
                    glow::RENDERBUFFER,
                    samples as i32,
                    gl_format,
                    width as i32,
                    height as i32,
                ),
                None => gl.renderbuffer_storage(glow::RENDERBUFFER, gl_format, width as i32, height as i32),
            }
            gl.bind_renderbuffer(glow::RENDERBUFFER, None);
        }
    }

    // ===== FRAMEBUFFERS =====

    fn create_framebuffer(&self) -> Result<FramebufferId> {
        let framebuffer = unsafe { self.gl.create_framebuffer() }.map_err(|e| {
            engine_err!(SOURCE, Error::BackendError, "Failed to create framebuffer: {}", e)
        })?;
        Ok(self.objects.borrow_mut().framebuffers.insert(framebuffer))
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        if self.draw_framebuffer.get() == Some(framebuffer) {
            self.draw_framebuffer.set(None);
        }
        if let Some(framebuffer) = self.objects.borrow_mut().framebuffers.remove(framebuffer) {
            unsafe { self.gl.delete_framebuffer(framebuffer) };
        }
    }

    fn bind_framebuffer(&self, binding: FramebufferBinding, framebuffer: Option<FramebufferId>) {
        let object = match framebuffer {
            Some(id) => match resolve(&self.objects.borrow().framebuffers, id, "framebuffer") {
                Some(object) => Some(object),
                None => return,
            },
            None => None,
        };
        if binding != FramebufferBinding::Read {
            self.draw_framebuffer.set(framebuffer);
        }
        unsafe { self.gl.bind_framebuffer(gl_format::framebuffer_binding(binding), object) };
    }

    fn current_draw_framebuffer(&self) -> Option<FramebufferId> {
        self.draw_framebuffer.get()
    }

    fn framebuffer_texture_2d(&self, attachment: Attachment, target: TextureTarget, texture: TextureId) {
        if let Some(object) = resolve(&self.objects.borrow().textures, texture, "texture") {
            unsafe {
                self.gl.framebuffer_texture_2d(
                    glow::FRAMEBUFFER,
                    gl_format::attachment(attachment),
                    gl_format::texture_target(target),
                    Some(object),
                    0,
                );
            }
        }
    }

    fn framebuffer_texture(&self, attachment: Attachment, texture: TextureId) {
        if let Some(object) = resolve(&self.objects.borrow().textures, texture, "texture") {
            unsafe {
                self.gl.framebuffer_texture(
                    glow::FRAMEBUFFER,
                    gl_format::attachment(attachment),
                    Some(object),
                    0,
                );
            }
        }
    }

    fn framebuffer_renderbuffer(&self, attachment: Attachment, renderbuffer: RenderbufferId) {
        if let Some(object) = resolve(&self.objects.borrow().renderbuffers, renderbuffer, "renderbuffer") {
            unsafe {
                self.gl.framebuffer_renderbuffer(
                    glow::FRAMEBUFFER,
                    gl_format::attachment(attachment),
                    glow::RENDERBUFFER,
                    Some(object),
                );
            }
        }
    }

    fn check_framebuffer_status(&self) -> FramebufferStatus {
        let status = unsafe { self.gl.check_framebuffer_status(glow::FRAMEBUFFER) };
        if status == glow::FRAMEBUFFER_COMPLETE {
            FramebufferStatus::Complete
        } else {
            FramebufferStatus::Incomplete(gl_format::framebuffer_status_reason(status).to_string())
        }
    }

    fn draw_buffers(&self, buffers: &[DrawBuffer]) {
        let buffers: Vec<u32> = buffers.iter().map(|b| gl_format::draw_buffer(*b)).collect();
        unsafe { self.gl.draw_buffers(&buffers) };
    }

    fn read_buffer(&self, buffer: DrawBuffer) {
        unsafe { self.gl.read_buffer(gl_format::draw_buffer(buffer)) };
    }

    fn blit_framebuffer(&self, src: BlitRect, dst: BlitRect, mask: ClearFlags, filter: BlitFilter) {
        unsafe {
            self.gl.blit_framebuffer(
                src.x0,
                src.y0,
                src.x1,
                src.y1,
                dst.x0,
                dst.y0,
                dst.x1,
                dst.y1,
                gl_format::clear_mask(mask),
                gl_format::blit_filter(filter),
            );
        }
    }

    // ===== FIXED-FUNCTION STATE =====

    fn viewport(&self, x: i32, y: i32, width: u32, height: u32) {
        unsafe { self.gl.viewport(x, y, width as i32, height as i32) };
    }

    fn clear_color(&self, color: [f32; 4]) {
        unsafe { self.gl.clear_color(color[0], color[1], color[2], color[3]) };
    }

    fn clear(&self, mask: ClearFlags) {
        unsafe { self.gl.clear(gl_format::clear_mask(mask)) };
    }

    fn enable(&self, capability: Capability) {
        unsafe { self.gl.enable(gl_format::capability(capability)) };
    }

    fn disable(&self, capability: Capability) {
        unsafe { self.gl.disable(gl_format::capability(capability)) };
    }

    fn depth_func(&self, func: DepthFunc) {
        unsafe { self.gl.depth_func(gl_format::depth_func(func)) };
    }

    // ===== PROGRAMS & UNIFORMS =====

    fn create_program(&self, sources: &ShaderSources<'_>) -> Result<ProgramId> {
        let mut stages = vec![(glow::VERTEX_SHADER, "Vertex", sources.vertex)];
        if let Some(geometry) = sources.geometry {
            stages.push((glow::GEOMETRY_SHADER, "Geometry", geometry));
        }
        stages.push((glow::FRAGMENT_SHADER, "Fragment", sources.fragment));

        let gl = &self.gl;
        let mut shaders = Vec::with_capacity(stages.len());
        for (kind, stage, code) in stages {
            match self.compile_stage(kind, stage, sources, code) {
                Ok(shader) => shaders.push(shader),
                Err(e) => {
                    for shader in shaders {
                        unsafe { gl.delete_shader(shader) };
                    }
                    return Err(e);
                }
            }
        }

        unsafe {
            let program = match gl.create_program() {
                Ok(program) => program,
                Err(e) => {
                    for shader in shaders {
                        gl.delete_shader(shader);
                    }
                    engine_bail!(SOURCE, Error::BackendError, "Failed to create program: {}", e);
                }
            };
            for &shader in &shaders {
                gl.attach_shader(program, shader);
            }
            gl.link_program(program);
            for shader in shaders {
                gl.detach_shader(program, shader);
                gl.delete_shader(shader);
            }

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                engine_bail!(SOURCE, Error::Shader, "Program {} failed to link:\n{}", sources.name, log);
            }

            engine_debug!(SOURCE, "Linked program {}", sources.name);
            Ok(self.objects.borrow_mut().programs.insert(program))
        }
    }

    fn delete_program(&self, program: ProgramId) {
        let mut objects = self.objects.borrow_mut();
        Self::forget_locations(&mut objects, program);
        if let Some(program) = objects.programs.remove(program) {
            unsafe { self.gl.delete_program(program) };
        }
    }

    fn use_program(&self, program: Option<ProgramId>) {
        let object = match program {
            Some(id) => match resolve(&self.objects.borrow().programs, id, "program") {
                Some(object) => Some(object),
                None => return,
            },
            None => None,
        };
        unsafe { self.gl.use_program(object) };
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let mut objects = self.objects.borrow_mut();
        if let Some(cached) = objects.location_cache.get(&(program, name.to_string())) {
            return *cached;
        }

        let object = resolve(&objects.programs, program, "program")?;
        let location = unsafe { self.gl.get_uniform_location(object, name) }
            .map(|location| objects.locations.insert(location));
        objects.location_cache.insert((program, name.to_string()), location);
        location
    }

    fn uniform_1_i32(&self, location: UniformLocation, value: i32) {
        if let Some(location) = self.location(location) {
            unsafe { self.gl.uniform_1_i32(Some(&location), value) };
        }
    }

    fn uniform_1_f32(&self, location: UniformLocation, value: f32) {
        if let Some(location) = self.location(location) {
            unsafe { self.gl.uniform_1_f32(Some(&location), value) };
        }
    }

    fn uniform_2_f32(&self, location: UniformLocation, x: f32, y: f32) {
        if let Some(location) = self.location(location) {
            unsafe { self.gl.uniform_2_f32(Some(&location), x, y) };
        }
    }

    fn uniform_3_f32(&self, location: UniformLocation, x: f32, y: f32, z: f32) {
        if let Some(location) = self.location(location) {
            unsafe { self.gl.uniform_3_f32(Some(&location), x, y, z) };
        }
    }

    fn uniform_1_f32_slice(&self, location: UniformLocation, values: &[f32]) {
        if let Some(location) = self.location(location) {
            unsafe { self.gl.uniform_1_f32_slice(Some(&location), values) };
        }
    }
}
