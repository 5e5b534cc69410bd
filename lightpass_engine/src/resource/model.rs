/// Model - imported multi-mesh asset
///
/// An importer turns a file into sub-meshes (tangent-space vertices,
/// indices and texture file references). Each sub-mesh becomes one
/// [`GpuObject`] with its own [`Textures`] set, loaded relative to the
/// model's directory. Drawing enables back-face culling for the duration
/// of the model.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use glam::Vec3;

use crate::context::RenderContext;
use crate::error::{Error, Result};
use crate::graphics_device::{Capability, GraphicsDevice};
use crate::resource::geometry::{Vertex, VERTEX_ATTRIBS};
use crate::resource::image_decoder::DecodedImage;
use crate::resource::object::GpuObject;
use crate::resource::shader::Shader;
use crate::resource::textures::{TextureType, Textures};

// ============================================================================
// Import
// ============================================================================

/// Origin of a sub-mesh texture
#[derive(Debug, Clone, PartialEq)]
pub enum TextureSource {
    /// File relative to the model's directory
    File(PathBuf),
    /// Image stored inside the asset and already decoded by the importer
    Embedded { name: String, image: DecodedImage },
}

/// One sub-mesh as returned by an importer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub textures: Vec<(TextureType, TextureSource)>,
}

/// Reads a 3-D asset file into sub-meshes
pub trait ModelImporter {
    /// # Errors
    ///
    /// `Error::Model` naming the path when the file cannot be read or parsed.
    fn import(&self, path: &Path) -> Result<Vec<ImportedMesh>>;
}

/// glTF 2.0 importer (`.gltf` with external buffers, or `.glb`)
///
/// Every primitive becomes one sub-mesh. Material textures map to
/// sampler types as: base color → diffuse, metallic-roughness →
/// specular, normal → normal, occlusion → reflection. Images referenced
/// by a relative URI are returned as files; `data:` URIs and images
/// stored in buffer views come back as the pixels decoded by `gltf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfImporter;

impl ModelImporter for GltfImporter {
    fn import(&self, path: &Path) -> Result<Vec<ImportedMesh>> {
        let (document, buffers, images) = gltf::import(path).map_err(|e| {
            crate::engine_err!(
                "lightpass::Model",
                Error::Model,
                "Failed to import {} ({})",
                path.display(),
                e
            )
        })?;

        let mut meshes = Vec::new();
        for mesh in document.meshes() {
            for primitive in mesh.primitives() {
                let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

                let Some(positions) = reader.read_positions() else {
                    crate::engine_warn!(
                        "lightpass::Model",
                        "Skipping primitive without positions in {}",
                        path.display()
                    );
                    continue;
                };
                let positions: Vec<[f32; 3]> = positions.collect();
                let count = positions.len();

                let normals: Vec<[f32; 3]> = match reader.read_normals() {
                    Some(iter) => iter.collect(),
                    None => vec![[0.0; 3]; count],
                };
                let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
                    Some(iter) => iter.into_f32().collect(),
                    None => vec![[0.0; 2]; count],
                };
                let tangents: Vec<[f32; 4]> = match reader.read_tangents() {
                    Some(iter) => iter.collect(),
                    None => vec![[0.0; 4]; count],
                };

                let vertices = (0..count)
                    .map(|i| {
                        let normal = normals.get(i).copied().unwrap_or_default();
                        let tangent = tangents.get(i).copied().unwrap_or_default();
                        let tangent_xyz = Vec3::new(tangent[0], tangent[1], tangent[2]);
                        let bitangent = Vec3::from(normal).cross(tangent_xyz) * tangent[3];
                        Vertex {
                            position: positions[i],
                            normal,
                            uv: uvs.get(i).copied().unwrap_or_default(),
                            tangent: tangent_xyz.to_array(),
                            bitangent: bitangent.to_array(),
                        }
                    })
                    .collect();

                let indices = match reader.read_indices() {
                    Some(indices) => indices.into_u32().collect(),
                    None => (0..count as u32).collect(),
                };

                let material = primitive.material();
                let pbr = material.pbr_metallic_roughness();
                let sources = [
                    (TextureType::Diffuse, pbr.base_color_texture().map(|info| info.texture())),
                    (TextureType::Specular, pbr.metallic_roughness_texture().map(|info| info.texture())),
                    (TextureType::Normal, material.normal_texture().map(|info| info.texture())),
                    (TextureType::Reflection, material.occlusion_texture().map(|info| info.texture())),
                ];
                let textures = sources
                    .into_iter()
                    .filter_map(|(ty, texture)| Some((ty, texture_source(&texture?, &images, path)?)))
                    .collect();

                meshes.push(ImportedMesh { vertices, indices, textures });
            }
        }

        crate::engine_debug!(
            "lightpass::Model",
            "Imported {} sub-mesh(es) from {}",
            meshes.len(),
            path.display()
        );
        Ok(meshes)
    }
}

fn texture_source(texture: &gltf::Texture<'_>, images: &[gltf::image::Data], path: &Path) -> Option<TextureSource> {
    let image = texture.source();
    if let gltf::image::Source::Uri { uri, .. } = image.source() {
        if !uri.starts_with("data:") {
            return Some(TextureSource::File(PathBuf::from(percent_decode(uri))));
        }
    }

    let name = match image.name() {
        Some(name) => name.to_string(),
        None => format!("{}#image{}", path.display(), image.index()),
    };
    match images.get(image.index()).and_then(decoded_pixels) {
        Some(decoded) => Some(TextureSource::Embedded { name, image: decoded }),
        None => {
            crate::engine_warn!("lightpass::Model", "Skipping embedded image {} (no 8-bit conversion)", name);
            None
        }
    }
}

/// Convert `gltf` image data to 8-bit samples, keeping the channel count
fn decoded_pixels(data: &gltf::image::Data) -> Option<DecodedImage> {
    use gltf::image::Format;

    let (channels, sample_size) = match data.format {
        Format::R8 => (1, 1),
        Format::R8G8 => (2, 1),
        Format::R8G8B8 => (3, 1),
        Format::R8G8B8A8 => (4, 1),
        Format::R16 => (1, 2),
        Format::R16G16 => (2, 2),
        Format::R16G16B16 => (3, 2),
        Format::R16G16B16A16 => (4, 2),
        Format::R32G32B32FLOAT => (3, 4),
        Format::R32G32B32A32FLOAT => (4, 4),
        #[allow(unreachable_patterns)]
        _ => return None,
    };

    let pixels = match sample_size {
        1 => data.pixels.clone(),
        2 => data
            .pixels
            .chunks_exact(2)
            .map(|s| (u16::from_ne_bytes([s[0], s[1]]) >> 8) as u8)
            .collect(),
        _ => data
            .pixels
            .chunks_exact(4)
            .map(|s| (f32::from_ne_bytes([s[0], s[1], s[2], s[3]]).clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect(),
    };

    Some(DecodedImage { width: data.width, height: data.height, channels, pixels })
}

/// Decode `%XX` escapes of a relative URI
fn percent_decode(uri: &str) -> String {
    let bytes = uri.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = match bytes.get(i + 1..i + 3) {
            Some([hi, lo]) if bytes[i] == b'%' && hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                std::str::from_utf8(&[*hi, *lo]).ok().and_then(|hex| u8::from_str_radix(hex, 16).ok())
            }
            _ => None,
        };
        match escaped {
            Some(byte) => {
                out.push(byte);
                i += 3;
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

// ============================================================================
// Model
// ============================================================================

struct Mesh {
    object: GpuObject,
    textures: Textures,
}

pub struct Model {
    meshes: Vec<Mesh>,
    directory: PathBuf,
    device: Rc<dyn GraphicsDevice>,
}

impl Model {
    /// Import `path` and upload every sub-mesh
    ///
    /// # Errors
    ///
    /// `Error::Model` when the importer fails or returns no mesh, and
    /// `Error::Texture` when a referenced texture cannot be loaded.
    pub fn load(ctx: &RenderContext, importer: &dyn ModelImporter, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let imported = importer.import(path)?;
        if imported.is_empty() {
            crate::engine_bail!("lightpass::Model", Error::Model, "{} contains no mesh", path.display());
        }

        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut meshes = Vec::with_capacity(imported.len());
        for sub_mesh in &imported {
            let mut textures = Textures::new(ctx);
            for (ty, source) in &sub_mesh.textures {
                match source {
                    TextureSource::File(file) => textures.load_texture_from_image(directory.join(file), *ty)?,
                    TextureSource::Embedded { name, image } => textures.load_texture_from_pixels(image, *ty, name)?,
                };
            }

            let mut object = GpuObject::new(ctx)?;
            {
                let mut setup = object.start_setup();
                setup.add_vertices(&sub_mesh.vertices)?;
                setup.add_indices(&sub_mesh.indices)?;
                setup.add_vertex_attribs(&VERTEX_ATTRIBS);
                setup.finalize();
            }
            meshes.push(Mesh { object, textures });
        }

        crate::engine_info!(
            "lightpass::Model",
            "Loaded {} ({} mesh(es))",
            path.display(),
            meshes.len()
        );

        Ok(Self { meshes, directory, device: ctx.device().clone() })
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Textures of sub-mesh `index`
    pub fn textures(&self, index: usize) -> Option<&Textures> {
        self.meshes.get(index).map(|mesh| &mesh.textures)
    }

    /// Directory texture paths are resolved against
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn draw(&self, shader: &Shader, flags: &[&str]) {
        self.draw_instanced(shader, 1, flags);
    }

    /// Draw every sub-mesh `instances` times with face culling enabled
    pub fn draw_instanced(&self, shader: &Shader, instances: u32, flags: &[&str]) {
        self.device.enable(Capability::CullFace);
        for mesh in &self.meshes {
            mesh.object.draw_instanced(shader, instances, Some(&mesh.textures), flags);
        }
        self.device.disable(Capability::CullFace);
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
