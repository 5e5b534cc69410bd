/// Textures - ordered set of typed GPU textures bound per draw call
///
/// Entry `i` binds to texture unit `i`. Sampler uniforms are named after
/// the entry's type with a per-type counter starting at 1, so two diffuse
/// maps followed by a normal map bind as `texture_diffuse1`,
/// `texture_diffuse2`, `texture_normal1` on units 0, 1, 2.
///
/// Entries are either owned (deleted when the set drops) or borrowed
/// (registered from elsewhere, e.g. a render target attachment, and never
/// deleted here).

use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::context::RenderContext;
use crate::error::{Error, Result};
use crate::graphics_device::{
    CubeFace, GraphicsDevice, ImageTarget, InternalFormat, PixelLayout, PixelType, SamplerDesc,
    TexImageDesc, TextureId, TextureTarget,
};
use crate::resource::image_decoder::{DecodedImage, ImageDecoder};
use crate::resource::shader::Shader;

// ============================================================================
// Texture types
// ============================================================================

/// Semantic type of a texture, which selects its sampler uniform prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    Diffuse,
    Specular,
    Normal,
    Height,
    Reflection,
    Cubemap,
    /// Render target attachment
    Screen,
    /// Blurred bright pass
    Bloom,
    /// Ambient occlusion rotation noise
    Noise,
}

impl TextureType {
    /// Sampler uniform prefix (`texture_diffuse`, ...)
    pub fn prefix(&self) -> &'static str {
        match self {
            TextureType::Diffuse => "texture_diffuse",
            TextureType::Specular => "texture_specular",
            TextureType::Normal => "texture_normal",
            TextureType::Height => "texture_height",
            TextureType::Reflection => "texture_reflection",
            TextureType::Cubemap => "texture_cubemap",
            TextureType::Screen => "texture_screen",
            TextureType::Bloom => "texture_bloom",
            TextureType::Noise => "texture_noise",
        }
    }

    /// Linear data (no sRGB decoding on sampling)
    pub fn is_linear(&self) -> bool {
        matches!(self, TextureType::Normal | TextureType::Height)
    }
}

impl fmt::Display for TextureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for TextureType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let ty = match s {
            "texture_diffuse" => TextureType::Diffuse,
            "texture_specular" => TextureType::Specular,
            "texture_normal" => TextureType::Normal,
            "texture_height" => TextureType::Height,
            "texture_reflection" => TextureType::Reflection,
            "texture_cubemap" => TextureType::Cubemap,
            "texture_screen" => TextureType::Screen,
            "texture_bloom" => TextureType::Bloom,
            "texture_noise" => TextureType::Noise,
            other => {
                crate::engine_bail!(
                    "lightpass::Textures",
                    Error::InvalidResource,
                    "Unknown texture type '{}'",
                    other
                );
            }
        };
        Ok(ty)
    }
}

// ============================================================================
// Entries
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    Texture2D,
    CubeMap,
}

impl TextureKind {
    pub fn target(&self) -> TextureTarget {
        match self {
            TextureKind::Texture2D => TextureTarget::Texture2D,
            TextureKind::CubeMap => TextureTarget::CubeMap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Deleted when the set drops
    Owned,
    /// Owned elsewhere
    Borrowed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureEntry {
    pub id: TextureId,
    pub kind: TextureKind,
    pub ty: TextureType,
    /// Source file, for dedup
    pub path: Option<PathBuf>,
    pub ownership: Ownership,
}

// ============================================================================
// Textures
// ============================================================================

pub struct Textures {
    device: Rc<dyn GraphicsDevice>,
    decoder: Rc<dyn ImageDecoder>,
    entries: Vec<TextureEntry>,
}

impl Textures {
    pub fn new(ctx: &RenderContext) -> Self {
        Self {
            device: ctx.device().clone(),
            decoder: ctx.decoder().clone(),
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TextureEntry] {
        &self.entries
    }

    pub fn id(&self, index: usize) -> Option<TextureId> {
        self.entries.get(index).map(|e| e.id)
    }

    /// Number of distinct GPU textures referenced
    pub fn distinct_count(&self) -> usize {
        self.entries.iter().map(|e| e.id).collect::<FxHashSet<_>>().len()
    }

    /// Decode an image file and add it as a mipmapped 2-D texture
    ///
    /// A path already present in the set is not decoded again: a new
    /// entry referencing the existing texture is added instead.
    ///
    /// # Errors
    ///
    /// `Error::Texture` naming the path when decoding fails or the image
    /// has a channel count other than 1, 3 or 4.
    pub fn load_texture_from_image(&mut self, path: impl AsRef<Path>, ty: TextureType) -> Result<TextureId> {
        let path = path.as_ref();

        if let Some(existing) = self.entries.iter().find(|e| e.path.as_deref() == Some(path)).cloned() {
            let id = existing.id;
            self.entries.push(existing);
            return Ok(id);
        }

        let image = self.decode(path, "texture")?;
        let id = self.upload_image(&image, ty, &path.display().to_string())?;
        self.entries.push(TextureEntry {
            id,
            kind: TextureKind::Texture2D,
            ty,
            path: Some(path.to_path_buf()),
            ownership: Ownership::Owned,
        });
        Ok(id)
    }

    /// Add already decoded pixels as a mipmapped 2-D texture
    ///
    /// `label` names the image in logs and errors. No dedup is done.
    ///
    /// # Errors
    ///
    /// `Error::Texture` when the image has a channel count other than 1, 3 or 4.
    pub fn load_texture_from_pixels(&mut self, image: &DecodedImage, ty: TextureType, label: &str) -> Result<TextureId> {
        let id = self.upload_image(image, ty, label)?;
        self.entries.push(TextureEntry {
            id,
            kind: TextureKind::Texture2D,
            ty,
            path: None,
            ownership: Ownership::Owned,
        });
        Ok(id)
    }

    fn upload_image(&self, image: &DecodedImage, ty: TextureType, label: &str) -> Result<TextureId> {
        let layout = self.layout_of(image, label)?;
        let internal_format = if ty.is_linear() {
            InternalFormat::RGBA8
        } else {
            InternalFormat::SRGB8_ALPHA8
        };

        let id = self.device.create_texture()?;
        let desc = TexImageDesc {
            internal_format,
            layout,
            pixel_type: PixelType::UnsignedByte,
            width: image.width,
            height: image.height,
        };
        self.device.bind_texture(TextureTarget::Texture2D, Some(id));
        self.device.tex_image_2d(ImageTarget::Texture2D, &desc, Some(&image.pixels));
        self.device.generate_mipmap(TextureTarget::Texture2D);
        self.device.set_sampler(TextureTarget::Texture2D, &SamplerDesc::image());
        self.device.bind_texture(TextureTarget::Texture2D, None);

        crate::engine_debug!(
            "lightpass::Textures",
            "Loaded {} ({}x{}, {} channels) as {}",
            label,
            image.width,
            image.height,
            image.channels,
            ty
        );
        Ok(id)
    }

    /// Load six faces (+X, -X, +Y, -Y, +Z, -Z) into one cubemap entry
    ///
    /// Every face is decoded before any GPU object is created, so a
    /// failing face leaves the set unchanged.
    pub fn load_cubemap(&mut self, faces: [impl AsRef<Path>; 6]) -> Result<TextureId> {
        let mut images = Vec::with_capacity(6);
        for face in &faces {
            let path = face.as_ref();
            let image = self.decode(path, "cubemap texture")?;
            let layout = self.layout_of(&image, &path.display().to_string())?;
            images.push((image, layout));
        }

        let id = self.device.create_texture()?;
        self.device.bind_texture(TextureTarget::CubeMap, Some(id));
        for (face, (image, layout)) in CubeFace::ALL.iter().zip(&images) {
            let internal_format = if *layout == PixelLayout::Rgba {
                InternalFormat::SRGB8_ALPHA8
            } else {
                InternalFormat::SRGB8
            };
            let desc = TexImageDesc {
                internal_format,
                layout: *layout,
                pixel_type: PixelType::UnsignedByte,
                width: image.width,
                height: image.height,
            };
            self.device.tex_image_2d(ImageTarget::CubeFace(*face), &desc, Some(&image.pixels));
        }
        self.device.set_sampler(TextureTarget::CubeMap, &SamplerDesc::attachment());
        self.device.bind_texture(TextureTarget::CubeMap, None);

        crate::engine_debug!("lightpass::Textures", "Loaded cubemap from {}", faces[0].as_ref().display());

        self.entries.push(TextureEntry {
            id,
            kind: TextureKind::CubeMap,
            ty: TextureType::Cubemap,
            path: None,
            ownership: Ownership::Owned,
        });
        Ok(id)
    }

    /// Register a 2-D texture owned elsewhere
    pub fn add_texture(&mut self, ty: TextureType, id: TextureId) {
        let kind = if ty == TextureType::Cubemap {
            TextureKind::CubeMap
        } else {
            TextureKind::Texture2D
        };
        self.entries.push(TextureEntry { id, kind, ty, path: None, ownership: Ownership::Borrowed });
    }

    /// Register a 2-D texture created elsewhere and take ownership of it
    pub fn adopt_texture(&mut self, ty: TextureType, id: TextureId) {
        self.entries.push(TextureEntry {
            id,
            kind: TextureKind::Texture2D,
            ty,
            path: None,
            ownership: Ownership::Owned,
        });
    }

    /// Take over every entry of `other`, ownership included
    pub fn append(&mut self, mut other: Textures) {
        self.entries.append(&mut other.entries);
    }

    /// Reference every entry of `other` without taking ownership
    pub fn append_borrowed(&mut self, other: &Textures) {
        self.entries.extend(other.entries.iter().map(|e| TextureEntry {
            ownership: Ownership::Borrowed,
            ..e.clone()
        }));
    }

    /// Bind every entry to its unit and set the matching sampler uniforms
    pub fn use_textures(&self, shader: &Shader) {
        self.bind_units(shader, |_| true);
    }

    /// Bind only the entries at `indices` (units and uniform names stay
    /// those of the full set)
    pub fn use_textures_subset(&self, shader: &Shader, indices: &[usize]) {
        self.bind_units(shader, |i| indices.contains(&i));
    }

    /// Sampler uniform name of every entry, in unit order
    pub fn sampler_names(&self) -> Vec<String> {
        let mut counters: FxHashMap<TextureType, u32> = FxHashMap::default();
        self.entries
            .iter()
            .map(|entry| {
                let n = counters.entry(entry.ty).or_insert(0);
                *n += 1;
                format!("{}{}", entry.ty.prefix(), n)
            })
            .collect()
    }

    fn bind_units(&self, shader: &Shader, selected: impl Fn(usize) -> bool) {
        for (unit, (entry, name)) in self.entries.iter().zip(self.sampler_names()).enumerate() {
            if !selected(unit) {
                continue;
            }
            self.device.active_texture(unit as u32);
            shader.set_int(&name, unit as i32);
            self.device.bind_texture(entry.kind.target(), Some(entry.id));
        }
    }

    fn decode(&self, path: &Path, what: &str) -> Result<DecodedImage> {
        self.decoder.decode(path).map_err(|e| {
            crate::engine_err!(
                "lightpass::Textures",
                Error::Texture,
                "Failed to load {} from {} ({})",
                what,
                path.display(),
                e
            )
        })
    }

    fn layout_of(&self, image: &DecodedImage, source: &str) -> Result<PixelLayout> {
        match PixelLayout::from_channels(image.channels) {
            Some(layout) => Ok(layout),
            None => crate::engine_bail!(
                "lightpass::Textures",
                Error::Texture,
                "Invalid image type from {} ({} channels)",
                source,
                image.channels
            ),
        }
    }
}

impl Drop for Textures {
    fn drop(&mut self) {
        let mut deleted = FxHashSet::default();
        for entry in &self.entries {
            if entry.ownership == Ownership::Owned && deleted.insert(entry.id) {
                self.device.delete_texture(entry.id);
            }
        }
    }
}

#[cfg(test)]
#[path = "textures_tests.rs"]
mod tests;
