/// Shader program wrapper
///
/// A compiled program with named uniform slots. Slots are resolved once
/// per name and cached; names the program does not use resolve to nothing
/// and their setters are no-ops.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use glam::{Vec2, Vec3};
use rustc_hash::FxHashMap;

use crate::context::RenderContext;
use crate::error::{Error, Result};
use crate::graphics_device::{GraphicsDevice, ProgramId, ShaderSources, UniformLocation};

pub struct Shader {
    device: Rc<dyn GraphicsDevice>,
    program: ProgramId,
    name: String,
    locations: RefCell<FxHashMap<String, Option<UniformLocation>>>,
}

impl Shader {
    /// Read, compile and link vertex + fragment (+ optional geometry) sources
    ///
    /// # Errors
    ///
    /// `Error::Shader` naming the file when a source cannot be read, or
    /// carrying the driver log when compilation or linking fails.
    pub fn from_files(
        ctx: &RenderContext,
        vertex: impl AsRef<Path>,
        fragment: impl AsRef<Path>,
        geometry: Option<&Path>,
    ) -> Result<Self> {
        let vertex_src = read_source(vertex.as_ref())?;
        let fragment_src = read_source(fragment.as_ref())?;
        let geometry_src = geometry.map(read_source).transpose()?;

        let name = match geometry {
            Some(geometry) => format!(
                "{} + {} + {}",
                vertex.as_ref().display(),
                geometry.display(),
                fragment.as_ref().display()
            ),
            None => format!("{} + {}", vertex.as_ref().display(), fragment.as_ref().display()),
        };

        Self::from_sources(ctx, &name, &vertex_src, &fragment_src, geometry_src.as_deref())
    }

    /// Compile and link in-memory sources
    pub fn from_sources(
        ctx: &RenderContext,
        name: &str,
        vertex: &str,
        fragment: &str,
        geometry: Option<&str>,
    ) -> Result<Self> {
        let device = ctx.device().clone();
        let sources = ShaderSources { name, vertex, fragment, geometry };
        let program = device.create_program(&sources).map_err(|e| {
            crate::engine_error!("lightpass::Shader", "Failed to build program {}: {}", name, e);
            e
        })?;

        crate::engine_debug!("lightpass::Shader", "Program {} linked", name);

        Ok(Self {
            device,
            program,
            name: name.to_string(),
            locations: RefCell::new(FxHashMap::default()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    /// Activate the program
    pub fn use_program(&self) {
        self.device.use_program(Some(self.program));
    }

    /// Resolve `name` to a uniform slot, `None` when the program does not use it
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        if let Some(location) = self.locations.borrow().get(name) {
            return *location;
        }
        let location = self.device.uniform_location(self.program, name);
        self.locations.borrow_mut().insert(name.to_string(), location);
        location
    }

    pub fn set_int(&self, name: &str, value: i32) {
        if let Some(location) = self.uniform_location(name) {
            self.device.uniform_1_i32(location, value);
        }
    }

    pub fn set_bool(&self, name: &str, value: bool) {
        self.set_int(name, i32::from(value));
    }

    pub fn set_float(&self, name: &str, value: f32) {
        if let Some(location) = self.uniform_location(name) {
            self.device.uniform_1_f32(location, value);
        }
    }

    pub fn set_vec2(&self, name: &str, value: Vec2) {
        if let Some(location) = self.uniform_location(name) {
            self.device.uniform_2_f32(location, value.x, value.y);
        }
    }

    pub fn set_vec3(&self, name: &str, value: Vec3) {
        if let Some(location) = self.uniform_location(name) {
            self.device.uniform_3_f32(location, value.x, value.y, value.z);
        }
    }

    pub fn set_float_array(&self, name: &str, values: &[f32]) {
        if let Some(location) = self.uniform_location(name) {
            self.device.uniform_1_f32_slice(location, values);
        }
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        self.device.delete_program(self.program);
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        crate::engine_err!(
            "lightpass::Shader",
            Error::Shader,
            "Failed to read shader source {}: {}",
            path.display(),
            e
        )
    })
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
