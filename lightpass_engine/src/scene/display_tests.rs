/// Unit tests for Display

use std::path::{Path, PathBuf};

use glam::{Mat4, Vec3};

use crate::camera::Camera;
use crate::error::{Error, Result};
use crate::graphics_device::mock_graphics_device::DeviceCommand;
use crate::graphics_device::{BufferTarget, ClearFlags, DepthFunc};
use crate::resource::geometry::Vertex;
use crate::resource::model::{ImportedMesh, ModelImporter};
use crate::scene::display::*;
use crate::test_support::{shader_tree, Fixture};

struct SingleTriangle;

impl ModelImporter for SingleTriangle {
    fn import(&self, _path: &Path) -> Result<Vec<ImportedMesh>> {
        let vertex = |x: f32| Vertex { position: [x, 0.0, 0.0], ..Vertex::default() };
        Ok(vec![ImportedMesh {
            vertices: vec![vertex(0.0), vertex(1.0), vertex(2.0)],
            indices: vec![0, 1, 2],
            textures: Vec::new(),
        }])
    }
}

fn scene_fixture() -> (Fixture, DisplayConfig) {
    let fx = Fixture::new();
    for (file, _) in BOX_TEXTURES.iter().chain(CUBE_TEXTURES.iter()) {
        fx.decoder.insert(&format!("assets/{}", file), 4, 3);
    }
    for face in SKYBOX_FACES {
        fx.decoder.insert(&format!("assets/{}", face), 4, 3);
    }
    let config = DisplayConfig {
        shader_root: shader_tree(PROGRAMS.iter().flat_map(ProgramFiles::files)),
        asset_root: PathBuf::from("assets"),
        ..DisplayConfig::default()
    };
    (fx, config)
}

fn camera() -> Camera {
    Camera::looking_at(Vec3::new(0.0, 1.0, 6.0), Vec3::ZERO, 45f32.to_radians(), 800.0 / 600.0, 0.1, 100.0)
}

#[test]
fn test_new_builds_every_component() {
    let (fx, config) = scene_fixture();
    let display = Display::new(&fx.ctx, &config, &SingleTriangle).unwrap();

    assert_eq!(fx.device.live_programs(), PROGRAMS.len());
    assert_eq!(display.gbuffer().color_count(), 6);
    assert_eq!(display.lights().point_lights().len(), 2);
    assert_eq!(display.model().mesh_count(), 1);
    assert_eq!(
        display.point_shadow().map(|shadow| shadow.config().far),
        Some(25.0)
    );
    assert!(display.ssao().is_some());
}

#[test]
fn test_frame_follows_pass_order() {
    let (fx, config) = scene_fixture();
    let display = Display::new(&fx.ctx, &config, &SingleTriangle).unwrap();
    let lights_buffer = display.lights().block().buffer();
    fx.device.clear_commands();

    display.draw(&fx.ctx, &camera(), 0.5).unwrap();

    let device = &fx.device;
    let at = |what: &str, found: Option<usize>| found.unwrap_or_else(|| panic!("{} not issued", what));
    let uniform = |name: &'static str| {
        move |c: &DeviceCommand| matches!(c, DeviceCommand::SetUniform { name: n, .. } if n == name)
    };

    let depth_pass = at(
        "depth pass",
        device.position(|c| matches!(c, DeviceCommand::Viewport { width: 1024, height: 1024, .. })),
    );
    let first_draw = at(
        "draw",
        device.position(|c| matches!(c, DeviceCommand::DrawElements { .. } | DeviceCommand::DrawArrays { .. })),
    );
    let shadow_bound = at("shadow map", device.position(uniform("shadow_map")));
    let lights_update = at(
        "lights update",
        device.position(|c| {
            *c == DeviceCommand::BufferSubData {
                target: BufferTarget::Uniform,
                buffer: Some(lights_buffer),
                offset: 0,
                len: 12,
            }
        }),
    );
    let gbuffer_bound = at(
        "g-buffer",
        device.position(|c| matches!(c, DeviceCommand::DrawBuffers(buffers) if buffers.len() == 6)),
    );
    let occlusion = at("occlusion", device.position(uniform("dims")));
    let hdr_bound = at(
        "hdr target",
        device.position(|c| matches!(c, DeviceCommand::DrawBuffers(buffers) if buffers.len() == 2)),
    );
    let depth_blit = at(
        "depth blit",
        device.position(|c| matches!(c, DeviceCommand::BlitFramebuffer { mask, .. } if *mask == ClearFlags::DEPTH)),
    );
    let skybox_start = at(
        "relaxed depth test",
        device.position(|c| *c == DeviceCommand::DepthFunc(DepthFunc::LessEqual)),
    );
    let skybox_end = at(
        "restored depth test",
        device.last_position(|c| *c == DeviceCommand::DepthFunc(DepthFunc::Less)),
    );
    let blur = at("blur", device.position(uniform("weight")));
    let composite = at("composite", device.position(uniform("exposure")));

    assert!(depth_pass < first_draw && first_draw < shadow_bound);
    assert!(shadow_bound < lights_update);
    assert!(lights_update < gbuffer_bound);
    assert!(gbuffer_bound < occlusion);
    assert!(occlusion < hdr_bound);
    assert!(hdr_bound < depth_blit);
    assert!(depth_blit < skybox_start && skybox_start < skybox_end);
    assert!(skybox_end < blur && blur < composite);
    assert_eq!(device.current_depth_func(), Some(DepthFunc::Less));
    assert_eq!(device.bound_draw_framebuffer(), None);
}

#[test]
fn test_lights_receive_camera_position() {
    let (fx, config) = scene_fixture();
    let display = Display::new(&fx.ctx, &config, &SingleTriangle).unwrap();

    display.draw(&fx.ctx, &camera(), 0.0).unwrap();

    let bytes = fx.device.buffer_contents(display.lights().block().buffer());
    let position: [f32; 3] = bytemuck::pod_read_unaligned(&bytes[0..12]);
    assert_eq!(position, [0.0, 1.0, 6.0]);
}

#[test]
fn test_skybox_leaves_rotation_only_view() {
    let (fx, config) = scene_fixture();
    let display = Display::new(&fx.ctx, &config, &SingleTriangle).unwrap();
    let camera = camera();

    display.draw(&fx.ctx, &camera, 1.0).unwrap();

    let bytes = fx.device.buffer_contents(fx.ctx.transforms().buffer());
    let cols: [f32; 16] = bytemuck::pod_read_unaligned(&bytes[0..64]);
    let expected = *camera.projection_matrix() * camera.skybox_view();
    assert!(Mat4::from_cols_array(&cols).abs_diff_eq(expected, 1e-6));
}

#[test]
fn test_disabled_features_skip_their_passes() {
    let (fx, mut config) = scene_fixture();
    config.shadows = false;
    config.ssao = false;
    let display = Display::new(&fx.ctx, &config, &SingleTriangle).unwrap();
    fx.device.clear_commands();

    display.draw(&fx.ctx, &camera(), 0.0).unwrap();

    assert!(display.point_shadow().is_none());
    assert_eq!(
        fx.device.count_commands(|c| matches!(c, DeviceCommand::Viewport { width: 1024, .. })),
        0
    );
    assert_eq!(
        fx.device.count_commands(|c| matches!(c, DeviceCommand::SetUniform { name, .. } if name == "dims")),
        0
    );
    assert!(fx.device.count_commands(|c| matches!(c, DeviceCommand::SetUniform { name, .. } if name == "exposure")) > 0);
}

#[test]
fn test_shadows_need_a_point_light() {
    let (fx, mut config) = scene_fixture();
    config.point_lights.clear();
    assert!(matches!(
        Display::new(&fx.ctx, &config, &SingleTriangle),
        Err(Error::Shadow(_))
    ));
}

#[test]
fn test_missing_shader_is_reported() {
    let (fx, mut config) = scene_fixture();
    config.shader_root = shader_tree(LIGHT_PROGRAM.files());
    match Display::new(&fx.ctx, &config, &SingleTriangle) {
        Err(Error::Shader(msg)) => assert!(msg.contains("skybox.vert")),
        Err(other) => panic!("unexpected error {:?}", other),
        Ok(_) => panic!("display built without its shaders"),
    }
    assert_eq!(fx.device.live_programs(), 0);
}

#[test]
fn test_missing_texture_releases_everything() {
    let fx = Fixture::new();
    let config = DisplayConfig {
        shader_root: shader_tree(PROGRAMS.iter().flat_map(ProgramFiles::files)),
        ..DisplayConfig::default()
    };

    assert!(matches!(
        Display::new(&fx.ctx, &config, &SingleTriangle),
        Err(Error::Texture(_))
    ));
    assert_eq!(fx.device.live_programs(), 0);
    assert_eq!(fx.device.live_textures(), 0);
}
