/// Object placement recomputed per draw call

use glam::{Mat4, Vec3};

/// Scale, rotation about an axis and translation of one draw
///
/// Composed as `translation * rotation * scale`, so the object is scaled
/// first, then rotated, then moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: Vec3,
    pub rotation_axis: Vec3,
    /// Radians
    pub rotation_angle: f32,
    pub translation: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            rotation_axis: Vec3::Y,
            rotation_angle: 0.0,
            translation: Vec3::ZERO,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::default() }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_uniform_scale(self, scale: f32) -> Self {
        self.with_scale(Vec3::splat(scale))
    }

    pub fn with_rotation(mut self, axis: Vec3, angle: f32) -> Self {
        self.rotation_axis = axis;
        self.rotation_angle = angle;
        self
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    /// Model matrix
    pub fn matrix(&self) -> Mat4 {
        let axis = self.rotation_axis.normalize_or_zero();
        let rotation = if axis == Vec3::ZERO || self.rotation_angle == 0.0 {
            Mat4::IDENTITY
        } else {
            Mat4::from_axis_angle(axis, self.rotation_angle)
        };
        Mat4::from_translation(self.translation) * rotation * Mat4::from_scale(self.scale)
    }
}
