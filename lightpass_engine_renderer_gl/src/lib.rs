/*!
# Lightpass Engine - OpenGL Backend

OpenGL 3.3 core implementation of the lightpass `GraphicsDevice` trait,
built on glow.

The caller creates the window and the GL context, then hands the
`glow::Context` to [`GlDevice::new`]. The device must only be used on the
thread where the context is current.

```no_run
use std::rc::Rc;
use lightpass_engine::lightpass::render::RenderContext;
use lightpass_engine_renderer_gl::{GlConfig, GlDevice};

# fn run(gl: glow::Context) -> lightpass_engine::lightpass::Result<()> {
let device = Rc::new(GlDevice::new(gl, GlConfig::default())?);
let ctx = RenderContext::new(device, 800, 600)?;
# Ok(())
# }
```
*/

mod gl_device;
pub mod gl_format;

#[cfg(feature = "gl-debug")]
mod gl_debug;

pub use gl_device::{GlConfig, GlDevice};

#[cfg(feature = "gl-debug")]
pub use gl_debug::{get_debug_stats, print_debug_stats_report, DebugStats};
