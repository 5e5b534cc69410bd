/// Unit tests for GpuObject

use crate::graphics_device::mock_graphics_device::{DeviceCommand, UniformValue};
use crate::graphics_device::BufferTarget;
use crate::resource::object::{GpuObject, VertexAttribute, VertexLayout};
use crate::test_support::Fixture;

fn triangle(fx: &Fixture, indexed: bool) -> GpuObject {
    let vertices: [f32; 24] = [
        0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0,
        1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0,
        0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0,
    ];
    let mut object = GpuObject::new(&fx.ctx).unwrap();
    let mut setup = object.start_setup();
    setup.add_vertices(&vertices).unwrap();
    if indexed {
        setup.add_indices(&[0, 1, 2]).unwrap();
    }
    setup.add_vertex_attribs(&[3, 3, 2]);
    setup.finalize();
    object
}

#[test]
fn test_vertex_layout_stride_and_offsets() {
    let layout = VertexLayout::from_sizes(&[3, 3, 2]);
    assert_eq!(layout.stride, 32);
    let offsets: Vec<i32> = layout.attributes.iter().map(|a| a.offset).collect();
    assert_eq!(offsets, vec![0, 12, 24]);
    assert_eq!(
        layout.attributes[2],
        VertexAttribute { index: 2, size: 2, offset: 24 }
    );
}

#[test]
fn test_vertex_layout_for_tangent_space_vertices() {
    let layout = VertexLayout::from_sizes(&[3, 3, 2, 3, 3]);
    assert_eq!(layout.stride, 56);
    assert_eq!(layout.attributes[4].offset, 44);
}

#[test]
fn test_setup_declares_attributes_and_unbinds() {
    let fx = Fixture::new();
    let object = triangle(&fx, false);

    assert_eq!(object.num_vertices(), 3);
    assert!(!object.is_indexed());
    assert_eq!(
        fx.device.count_commands(|c| matches!(c, DeviceCommand::VertexAttribPointer { stride: 32, .. })),
        3
    );
    assert_eq!(fx.device.bound_vertex_array(), None);
    assert_eq!(fx.device.bound_buffer(BufferTarget::Vertex), None);
    assert_eq!(fx.device.bound_buffer(BufferTarget::Index), None);
}

#[test]
fn test_non_indexed_draw_uses_draw_arrays() {
    let fx = Fixture::new();
    let object = triangle(&fx, false);
    let shader = fx.shader("flat");

    object.draw_instanced(&shader, 4, None, &[]);

    assert!(fx.device.commands().contains(&DeviceCommand::DrawArrays { first: 0, count: 3, instances: 4 }));
}

#[test]
fn test_indexed_draw_uses_draw_elements() {
    let fx = Fixture::new();
    let object = triangle(&fx, true);
    let shader = fx.shader("flat");

    object.draw(&shader, None, &[]);

    assert!(object.is_indexed());
    assert!(fx.device.commands().contains(&DeviceCommand::DrawElements { count: 3, instances: 1 }));
}

#[test]
fn test_flags_are_set_for_the_draw_and_reset_after() {
    let fx = Fixture::new();
    let object = triangle(&fx, false);
    let shader = fx.shader("lit");

    object.draw(&shader, None, &["reverse_normal", "gamma"]);

    let program = shader.program();
    let draw = fx.device.position(|c| matches!(c, DeviceCommand::DrawArrays { .. })).unwrap();
    let set = fx
        .device
        .position(|c| matches!(c, DeviceCommand::SetUniform { name, value: UniformValue::Int(1), .. } if name == "gamma"))
        .unwrap();
    let reset = fx
        .device
        .position(|c| matches!(c, DeviceCommand::SetUniform { name, value: UniformValue::Int(0), .. } if name == "gamma"))
        .unwrap();
    assert!(set < draw && draw < reset);
    assert_eq!(fx.device.uniform(program, "reverse_normal"), Some(UniformValue::Int(0)));
}

#[test]
#[should_panic(expected = "declared before vertex data")]
fn test_attribs_before_vertices_panics() {
    let fx = Fixture::new();
    let mut object = GpuObject::new(&fx.ctx).unwrap();
    let mut setup = object.start_setup();
    setup.add_vertex_attribs(&[3]);
}

#[test]
#[should_panic(expected = "declared twice")]
fn test_attribs_declared_twice_panics() {
    let fx = Fixture::new();
    let mut object = GpuObject::new(&fx.ctx).unwrap();
    let mut setup = object.start_setup();
    setup.add_vertices(&[0.0f32; 9]).unwrap();
    setup.add_vertex_attribs(&[3]);
    setup.add_vertex_attribs(&[3]);
}

#[test]
#[should_panic(expected = "drawn before")]
fn test_draw_without_setup_panics() {
    let fx = Fixture::new();
    let object = GpuObject::new(&fx.ctx).unwrap();
    let shader = fx.shader("flat");
    object.draw(&shader, None, &[]);
}

#[test]
fn test_drop_releases_buffers() {
    let fx = Fixture::new();
    let baseline_buffers = fx.device.live_buffers();
    let object = triangle(&fx, true);
    assert_eq!(fx.device.live_buffers(), baseline_buffers + 2);
    assert_eq!(fx.device.live_vertex_arrays(), 1);

    drop(object);
    assert_eq!(fx.device.live_buffers(), baseline_buffers);
    assert_eq!(fx.device.live_vertex_arrays(), 0);
}
