//! Shared fixtures for unit tests: mock device, in-memory images, shaders

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rustc_hash::FxHashMap;

use crate::context::RenderContext;
use crate::error::{Error, Result};
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::graphics_device::GraphicsDevice;
use crate::resource::image_decoder::{DecodedImage, ImageDecoder};
use crate::resource::shader::Shader;

/// Decoder serving registered in-memory images and counting decodes
#[derive(Default)]
pub struct MockImageDecoder {
    images: RefCell<FxHashMap<PathBuf, DecodedImage>>,
    decodes: RefCell<usize>,
}

impl MockImageDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a `size`×`size` image with `channels` channels at `path`
    pub fn insert(&self, path: &str, size: u32, channels: u32) {
        let pixels = vec![128u8; (size * size * channels) as usize];
        self.images.borrow_mut().insert(
            PathBuf::from(path),
            DecodedImage { width: size, height: size, channels, pixels },
        );
    }

    pub fn decode_count(&self) -> usize {
        *self.decodes.borrow()
    }
}

impl ImageDecoder for MockImageDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage> {
        *self.decodes.borrow_mut() += 1;
        self.images
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::Texture(format!("No such file or directory: {}", path.display())))
    }
}

/// Mock device, in-memory decoder and an 800x600 context wired to both
pub struct Fixture {
    pub device: Rc<MockGraphicsDevice>,
    pub decoder: Rc<MockImageDecoder>,
    pub ctx: RenderContext,
}

impl Fixture {
    pub fn new() -> Self {
        let device = Rc::new(MockGraphicsDevice::new());
        let decoder = Rc::new(MockImageDecoder::new());
        let dyn_device: Rc<dyn GraphicsDevice> = device.clone();
        let dyn_decoder: Rc<dyn ImageDecoder> = decoder.clone();
        let ctx = RenderContext::with_decoder(dyn_device, dyn_decoder, 800, 600)
            .expect("mock context creation cannot fail");
        Self { device, decoder, ctx }
    }

    /// Shader compiled from dummy sources
    pub fn shader(&self, name: &str) -> Rc<Shader> {
        Rc::new(
            Shader::from_sources(&self.ctx, name, "void main() {}", "void main() {}", None)
                .expect("mock shader compilation cannot fail"),
        )
    }
}

static SHADER_TREES: AtomicUsize = AtomicUsize::new(0);

fn scratch_dir(kind: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "lightpass_{}_{}_{}",
        kind,
        std::process::id(),
        SHADER_TREES.fetch_add(1, Ordering::Relaxed)
    ))
}

/// Fresh directory under the system temp dir holding a dummy source for
/// each of `files`
pub fn shader_tree<'a>(files: impl IntoIterator<Item = &'a str>) -> PathBuf {
    let root = scratch_dir("shaders");
    for file in files {
        let path = root.join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("shader tree directory");
        }
        fs::write(&path, "void main() {}").expect("shader tree file");
    }
    root
}

/// Write `contents` to `file` inside a fresh temp directory
pub fn scratch_file(file: &str, contents: &[u8]) -> PathBuf {
    let dir = scratch_dir("assets");
    fs::create_dir_all(&dir).expect("scratch directory");
    let path = dir.join(file);
    fs::write(&path, contents).expect("scratch file");
    path
}
