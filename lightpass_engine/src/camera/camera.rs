/// Camera - passive view, projection and eye position.
///
/// The Camera computes nothing beyond the combinations the passes need.
/// The caller is responsible for keeping the three fields consistent.

use glam::{Mat3, Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    view_matrix: Mat4,
    projection_matrix: Mat4,
    position: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec3::ZERO)
    }
}

impl Camera {
    pub fn new(view: Mat4, projection: Mat4, position: Vec3) -> Self {
        Self { view_matrix: view, projection_matrix: projection, position }
    }

    /// Camera at `position` looking at `target`, with a perspective
    /// projection (`fov_y` in radians, OpenGL depth range)
    pub fn looking_at(position: Vec3, target: Vec3, fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(
            Mat4::look_at_rh(position, target, Vec3::Y),
            Mat4::perspective_rh_gl(fov_y, aspect, near, far),
            position,
        )
    }

    // ===== GETTERS =====

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Eye position in world space (specular terms)
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Combined view-projection matrix (projection * view)
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// View with the translation removed, for drawing the skybox
    pub fn skybox_view(&self) -> Mat4 {
        Mat4::from_mat3(Mat3::from_mat4(self.view_matrix))
    }

    // ===== SETTERS =====

    pub fn set_view(&mut self, matrix: Mat4) {
        self.view_matrix = matrix;
    }

    pub fn set_projection(&mut self, matrix: Mat4) {
        self.projection_matrix = matrix;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
