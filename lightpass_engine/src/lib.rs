/*!
# Lightpass Engine

Multi-pass OpenGL rendering pipeline: GPU meshes, texture sets, off-screen
render targets, directional and point shadow maps, ambient occlusion,
Gaussian bloom and a deferred scene that ties them together.

Every GPU call goes through the [`GraphicsDevice`](graphics_device::GraphicsDevice)
trait. The OpenGL implementation lives in the `lightpass_engine_renderer_gl`
crate; unit tests run against a recording mock device.

## Architecture

- **RenderContext**: device handle, window size and the shared transform blocks
- **GpuObject / Model**: vertex data and imported multi-mesh assets
- **Textures**: sampler sets bound to consecutive texture units
- **FrameBuffer**: single and multisample render targets
- **ShadowPass / GaussianBlur / Ssao**: passes built on render targets
- **Lights / Display**: light block and the per-frame pass order

Passes are sequenced by stage tokens: a target's contents can only be
read from the value returned when its writing stage finishes.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod context;
pub mod resource;
pub mod target;
pub mod pass;
pub mod camera;
pub mod scene;

#[cfg(test)]
mod test_support;

// Main lightpass namespace module
pub mod lightpass {
    // Error types
    pub use crate::error::{Error, Result};

    // Logger plumbing
    pub use crate::engine::Engine;

    // Logging sub-module (types only, macros are exported at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    pub mod device {
        pub use crate::graphics_device::*;
    }

    pub mod render {
        pub use crate::context::*;
        pub use crate::target::*;
        pub use crate::pass::*;
    }

    pub mod resource {
        pub use crate::resource::*;
    }

    pub mod scene {
        pub use crate::camera::Camera;
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
