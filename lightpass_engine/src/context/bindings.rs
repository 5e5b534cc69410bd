//! Fixed binding points and texture units shared between CPU and shaders
//!
//! Shaders declare their uniform blocks with `layout(std140, binding = N)`
//! and their samplers on the units below; these numbers must not change.

/// `mat4 view_projection; mat4 model;`
pub const TRANSFORM_BINDING: u32 = 0;

/// Directional and point light arrays plus the camera position
pub const LIGHTS_BINDING: u32 = 1;

/// `mat4 models[MAX_INSTANCES]` for instanced draws
pub const INSTANCES_BINDING: u32 = 2;

/// Hemisphere kernel of the ambient occlusion pass
pub const SSAO_KERNEL_BINDING: u32 = 6;

/// Light-space matrix of the directional shadow pass
pub const DIRECTIONAL_SHADOW_BINDING: u32 = 8;

/// Cube-face matrices, light position and far plane of the point shadow pass
pub const POINT_SHADOW_BINDING: u32 = 9;

/// Tiled rotation noise of the ambient occlusion pass
pub const SSAO_NOISE_UNIT: u32 = 28;

/// Ambient occlusion result read by the lighting pass
pub const SSAO_UNIT: u32 = 29;

/// Depth map read by lit shaders
pub const SHADOW_MAP_UNIT: u32 = 31;
