/// Unit tests for Model

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::graphics_device::mock_graphics_device::{DeviceCommand, UniformValue};
use crate::graphics_device::Capability;
use crate::resource::geometry::Vertex;
use crate::resource::model::*;
use crate::resource::textures::TextureType;
use crate::resource::image_decoder::DecodedImage;
use crate::test_support::{scratch_file, Fixture};

/// Importer returning canned meshes, or failing like a broken file
struct CannedImporter {
    meshes: Option<Vec<ImportedMesh>>,
}

impl ModelImporter for CannedImporter {
    fn import(&self, path: &Path) -> Result<Vec<ImportedMesh>> {
        match &self.meshes {
            Some(meshes) => Ok(meshes.clone()),
            None => Err(Error::Model(format!("Failed to import {}", path.display()))),
        }
    }
}

fn triangle(files: Vec<(TextureType, PathBuf)>) -> ImportedMesh {
    let vertex = |x: f32, y: f32| Vertex {
        position: [x, y, 0.0],
        normal: [0.0, 0.0, 1.0],
        uv: [x, y],
        tangent: [1.0, 0.0, 0.0],
        bitangent: [0.0, 1.0, 0.0],
    };
    ImportedMesh {
        vertices: vec![vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(0.0, 1.0)],
        indices: vec![0, 1, 2],
        textures: files.into_iter().map(|(ty, file)| (ty, TextureSource::File(file))).collect(),
    }
}

#[test]
fn test_load_builds_one_object_per_sub_mesh() {
    let fx = Fixture::new();
    fx.decoder.insert("assets/backpack/diffuse.jpg", 4, 3);
    fx.decoder.insert("assets/backpack/normal.png", 4, 3);
    let importer = CannedImporter {
        meshes: Some(vec![
            triangle(vec![
                (TextureType::Diffuse, PathBuf::from("diffuse.jpg")),
                (TextureType::Normal, PathBuf::from("normal.png")),
            ]),
            triangle(vec![(TextureType::Diffuse, PathBuf::from("diffuse.jpg"))]),
        ]),
    };

    let model = Model::load(&fx.ctx, &importer, "assets/backpack/backpack.gltf").unwrap();

    assert_eq!(model.mesh_count(), 2);
    assert_eq!(model.directory(), Path::new("assets/backpack"));
    assert_eq!(
        model.textures(0).unwrap().sampler_names(),
        vec!["texture_diffuse1", "texture_normal1"]
    );
    assert_eq!(fx.device.live_vertex_arrays(), 2);
    assert_eq!(
        fx.device.count_commands(|c| matches!(c, DeviceCommand::VertexAttribPointer { stride: 56, .. })),
        10
    );
}

#[test]
fn test_draw_culls_faces_only_while_drawing() {
    let fx = Fixture::new();
    let importer = CannedImporter { meshes: Some(vec![triangle(Vec::new()), triangle(Vec::new())]) };
    let model = Model::load(&fx.ctx, &importer, "model.gltf").unwrap();
    let shader = fx.shader("model");
    fx.device.clear_commands();

    model.draw_instanced(&shader, 3, &["gamma"]);

    let commands = fx.device.commands();
    assert_eq!(commands.first(), Some(&DeviceCommand::Enable(Capability::CullFace)));
    assert_eq!(commands.last(), Some(&DeviceCommand::Disable(Capability::CullFace)));
    assert_eq!(
        fx.device.count_commands(|c| *c == DeviceCommand::DrawElements { count: 3, instances: 3 }),
        2
    );
    assert!(!fx.device.is_enabled(Capability::CullFace));
    assert_eq!(fx.device.uniform(shader.program(), "gamma"), Some(UniformValue::Int(0)));
}

#[test]
fn test_import_failure_is_a_model_error() {
    let fx = Fixture::new();
    let importer = CannedImporter { meshes: None };
    assert!(matches!(
        Model::load(&fx.ctx, &importer, "missing.gltf"),
        Err(Error::Model(_))
    ));
}

#[test]
fn test_empty_import_is_rejected() {
    let fx = Fixture::new();
    let importer = CannedImporter { meshes: Some(Vec::new()) };
    match Model::load(&fx.ctx, &importer, "empty.gltf") {
        Err(Error::Model(msg)) => assert!(msg.contains("empty.gltf")),
        Err(other) => panic!("unexpected error {:?}", other),
        Ok(_) => panic!("model without meshes accepted"),
    }
}

#[test]
fn test_missing_texture_aborts_load_and_releases_objects() {
    let fx = Fixture::new();
    fx.decoder.insert("dir/ok.png", 2, 4);
    let importer = CannedImporter {
        meshes: Some(vec![
            triangle(vec![(TextureType::Diffuse, PathBuf::from("ok.png"))]),
            triangle(vec![(TextureType::Diffuse, PathBuf::from("missing.png"))]),
        ]),
    };

    let result = Model::load(&fx.ctx, &importer, "dir/model.gltf");

    assert!(matches!(result, Err(Error::Texture(_))));
    assert_eq!(fx.device.live_textures(), 0);
    assert_eq!(fx.device.live_vertex_arrays(), 0);
}

#[test]
fn test_gltf_importer_reports_missing_file() {
    let result = GltfImporter.import(Path::new("does/not/exist.gltf"));
    match result {
        Err(Error::Model(msg)) => assert!(msg.contains("does/not/exist.gltf")),
        other => panic!("unexpected result {:?}", other.map(|m| m.len())),
    }
}

// ============================================================================
// glTF import
// ============================================================================

/// Three positions: (0,0,0), (1,0,0), (0,1,0)
const TRIANGLE_BUFFER: &str = "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA";

/// 1x1 RGBA PNG holding (0, 255, 0, 127)
const GREEN_PIXEL_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

fn triangle_gltf(image_uri: &str) -> String {
    format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "buffers": [{{ "byteLength": 36, "uri": "{buffer}" }}],
  "bufferViews": [{{ "buffer": 0, "byteLength": 36 }}],
  "accessors": [{{
    "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
    "min": [0, 0, 0], "max": [1, 1, 0]
  }}],
  "images": [{{ "uri": "{image}" }}],
  "textures": [{{ "source": 0 }}],
  "materials": [{{ "pbrMetallicRoughness": {{ "baseColorTexture": {{ "index": 0 }} }} }}],
  "meshes": [{{ "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "material": 0 }}] }}]
}}"#,
        buffer = TRIANGLE_BUFFER,
        image = image_uri
    )
}

#[test]
fn test_gltf_embedded_image_is_returned_decoded() {
    let path = scratch_file("embedded.gltf", triangle_gltf(GREEN_PIXEL_PNG).as_bytes());

    let meshes = GltfImporter.import(&path).unwrap();

    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].vertices.len(), 3);
    assert_eq!(meshes[0].indices, vec![0, 1, 2]);
    match &meshes[0].textures[..] {
        [(TextureType::Diffuse, TextureSource::Embedded { image, .. })] => assert_eq!(
            image,
            &DecodedImage { width: 1, height: 1, channels: 4, pixels: vec![0, 255, 0, 127] }
        ),
        other => panic!("unexpected textures {:?}", other),
    }
}

#[test]
fn test_gltf_embedded_image_loads_without_touching_files() {
    let fx = Fixture::new();
    let path = scratch_file("embedded.gltf", triangle_gltf(GREEN_PIXEL_PNG).as_bytes());

    let model = Model::load(&fx.ctx, &GltfImporter, &path).unwrap();

    assert_eq!(model.textures(0).unwrap().sampler_names(), vec!["texture_diffuse1"]);
    assert_eq!(fx.device.live_textures(), 1);
    assert_eq!(
        fx.device.count_commands(|c| matches!(c, DeviceCommand::TexImage2D { has_data: true, .. })),
        1
    );
}

#[test]
fn test_gltf_relative_uri_is_percent_decoded() {
    let path = scratch_file("spaced.gltf", triangle_gltf("my%20diffuse.png").as_bytes());
    let image = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 0, 255]));
    image.save(path.with_file_name("my diffuse.png")).unwrap();
    image.save_with_format(path.with_file_name("my%20diffuse.png"), image::ImageFormat::Png).unwrap();

    let meshes = GltfImporter.import(&path).unwrap();

    assert_eq!(
        meshes[0].textures,
        vec![(TextureType::Diffuse, TextureSource::File(PathBuf::from("my diffuse.png")))]
    );
}

#[test]
fn test_percent_decode_keeps_malformed_escapes() {
    assert_eq!(super::percent_decode("a%20b%2Fc.png"), "a b/c.png");
    assert_eq!(super::percent_decode("100%.png"), "100%.png");
    assert_eq!(super::percent_decode("x%zz%4"), "x%zz%4");
}
