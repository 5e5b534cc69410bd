//! Built-in geometry: unit cube, skybox cube and screen quad

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Attribute widths of [`Vertex`]: position, normal, uv, tangent, bitangent
pub const VERTEX_ATTRIBS: [i32; 5] = [3, 3, 2, 3, 3];

/// Attribute widths of [`CUBE_VERTICES`]: position, normal, uv
pub const CUBE_ATTRIBS: [i32; 3] = [3, 3, 2];

/// Attribute widths of [`QUAD_VERTICES`]: position, uv
pub const QUAD_ATTRIBS: [i32; 2] = [2, 2];

/// Attribute widths of [`SKYBOX_VERTICES`]: position
pub const SKYBOX_ATTRIBS: [i32; 1] = [3];

/// Tangent-space vertex shared by the cube and imported meshes
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

/// Unit cube, four vertices per face (position, normal, uv)
#[rustfmt::skip]
pub const CUBE_VERTICES: [f32; 192] = [
    -0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 0.0,
     0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 0.0,
     0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 1.0,
    -0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 1.0,

    -0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 0.0,
     0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 0.0,
     0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 1.0,
    -0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 1.0,

    -0.5,  0.5,  0.5, -1.0,  0.0,  0.0,  0.0, 1.0,
    -0.5,  0.5, -0.5, -1.0,  0.0,  0.0,  1.0, 1.0,
    -0.5, -0.5, -0.5, -1.0,  0.0,  0.0,  1.0, 0.0,
    -0.5, -0.5,  0.5, -1.0,  0.0,  0.0,  0.0, 0.0,

     0.5,  0.5,  0.5,  1.0,  0.0,  0.0,  0.0, 1.0,
     0.5,  0.5, -0.5,  1.0,  0.0,  0.0,  1.0, 1.0,
     0.5, -0.5, -0.5,  1.0,  0.0,  0.0,  1.0, 0.0,
     0.5, -0.5,  0.5,  1.0,  0.0,  0.0,  0.0, 0.0,

    -0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  0.0, 1.0,
     0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  1.0, 1.0,
     0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  1.0, 0.0,
    -0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  0.0, 0.0,

    -0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  0.0, 1.0,
     0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  1.0, 1.0,
     0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  1.0, 0.0,
    -0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  0.0, 0.0,
];

/// Two triangles per cube face
#[rustfmt::skip]
pub const CUBE_INDICES: [u32; 36] = [
    0, 1, 2, 2, 3, 0,
    4, 5, 6, 6, 7, 4,
    8, 9, 10, 10, 11, 8,
    12, 13, 14, 14, 15, 12,
    16, 17, 18, 18, 19, 16,
    20, 21, 22, 22, 23, 20,
];

/// Inward-facing skybox cube, 36 positions
#[rustfmt::skip]
pub const SKYBOX_VERTICES: [f32; 108] = [
    -1.0,  1.0, -1.0,  -1.0, -1.0, -1.0,   1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,   1.0,  1.0, -1.0,  -1.0,  1.0, -1.0,

    -1.0, -1.0,  1.0,  -1.0, -1.0, -1.0,  -1.0,  1.0, -1.0,
    -1.0,  1.0, -1.0,  -1.0,  1.0,  1.0,  -1.0, -1.0,  1.0,

     1.0, -1.0, -1.0,   1.0, -1.0,  1.0,   1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,   1.0,  1.0, -1.0,   1.0, -1.0, -1.0,

    -1.0, -1.0,  1.0,  -1.0,  1.0,  1.0,   1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,   1.0, -1.0,  1.0,  -1.0, -1.0,  1.0,

    -1.0,  1.0, -1.0,   1.0,  1.0, -1.0,   1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,  -1.0,  1.0,  1.0,  -1.0,  1.0, -1.0,

    -1.0, -1.0, -1.0,  -1.0, -1.0,  1.0,   1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,  -1.0, -1.0,  1.0,   1.0, -1.0,  1.0,
];

/// Full-screen quad in NDC (position, uv)
#[rustfmt::skip]
pub const QUAD_VERTICES: [f32; 24] = [
    -1.0,  1.0,  0.0, 1.0,
    -1.0, -1.0,  0.0, 0.0,
     1.0, -1.0,  1.0, 0.0,

    -1.0,  1.0,  0.0, 1.0,
     1.0, -1.0,  1.0, 0.0,
     1.0,  1.0,  1.0, 1.0,
];

/// Expand [`CUBE_VERTICES`] into 36 tangent-space vertices
///
/// Each face is split into triangles (0, 1, 2) and (0, 2, 3); each
/// triangle gets its own tangent and bitangent.
pub fn generate_cube_vertices() -> Vec<Vertex> {
    let corner = |face: usize, i: usize| {
        let base = (face * 4 + i) * 8;
        let v = &CUBE_VERTICES[base..base + 8];
        (
            Vec3::new(v[0], v[1], v[2]),
            Vec3::new(v[3], v[4], v[5]),
            Vec2::new(v[6], v[7]),
        )
    };

    let mut out = Vec::with_capacity(36);
    for face in 0..6 {
        for triangle in [[0, 1, 2], [0, 2, 3]] {
            let corners = triangle.map(|i| corner(face, i));
            let (tangent, bitangent) = tangent_basis(
                [corners[0].0, corners[1].0, corners[2].0],
                [corners[0].2, corners[1].2, corners[2].2],
            );
            for (position, normal, uv) in corners {
                out.push(Vertex {
                    position: position.to_array(),
                    normal: normal.to_array(),
                    uv: uv.to_array(),
                    tangent: tangent.to_array(),
                    bitangent: bitangent.to_array(),
                });
            }
        }
    }
    out
}

/// Tangent and bitangent of a triangle from its positions and uvs
pub fn tangent_basis(positions: [Vec3; 3], uvs: [Vec2; 3]) -> (Vec3, Vec3) {
    let edge1 = positions[1] - positions[0];
    let edge2 = positions[2] - positions[0];
    let duv1 = uvs[1] - uvs[0];
    let duv2 = uvs[2] - uvs[0];

    let det = duv1.x * duv2.y - duv2.x * duv1.y;
    if det.abs() < f32::EPSILON {
        return (Vec3::X, Vec3::Y);
    }
    let f = 1.0 / det;

    let tangent = f * (duv2.y * edge1 - duv1.y * edge2);
    let bitangent = f * (-duv2.x * edge1 + duv1.x * edge2);
    (tangent.normalize(), bitangent.normalize())
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
