use bevy::prelude::*;
use constants::coordinate_system::{SCENE_UP, VR_UP, lower_by_height_offset};

/// User placement inside the scene. Maps VR space into scene space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationNode {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for NavigationNode {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl NavigationNode {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, position) = matrix.to_scale_rotation_translation();
        Self {
            position,
            rotation: rotation.normalize(),
            scale,
        }
    }

    /// Uniform scale factor; the x component is authoritative.
    pub fn uniform_scale(&self) -> f32 {
        self.scale.x
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vec3::splat(scale);
    }

    pub fn to_scene(&self, vr: Vec3) -> Vec3 {
        self.matrix().transform_point3(vr)
    }

    pub fn to_vr(&self, scene: Vec3) -> Vec3 {
        self.matrix().inverse().transform_point3(scene)
    }

    /// `to_scene` lowered by the height calibration offset.
    pub fn to_scene_calibrated(&self, vr: Vec3) -> Vec3 {
        lower_by_height_offset(self.to_scene(vr), self.uniform_scale())
    }

    /// Yaw around the tracking volume's up axis, applied in VR space.
    pub fn yaw_local(&mut self, angle: f32) {
        self.rotation = (self.rotation * Quat::from_axis_angle(VR_UP, angle)).normalize();
    }

    /// Place the node at `position`, turned so its local +Z faces `target`.
    pub fn look_at(&mut self, target: Vec3) {
        let away = self.position - target;
        if away.length_squared() <= f32::EPSILON {
            return;
        }
        self.rotation = Transform::from_translation(self.position)
            .looking_to(away, SCENE_UP)
            .rotation;
    }

    pub fn to_transform(&self) -> Transform {
        Transform {
            translation: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }
}
