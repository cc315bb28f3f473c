use bevy::math::Vec3;

/// Up axis of the tracking volume (VR space is Y-up).
pub const VR_UP: Vec3 = Vec3::Y;

/// Up axis of the point cloud scene (scene space is Z-up).
pub const SCENE_UP: Vec3 = Vec3::Z;

/// Controllers and the headset point along their local -Z.
pub const POSE_FORWARD: Vec3 = Vec3::NEG_Z;

/// Vertical calibration applied when a VR-space point is placed into the scene.
/// Multiplied by the navigation scale and subtracted from scene Z.
pub const SCENE_HEIGHT_OFFSET: f32 = 0.8;

/// Apply the calibration offset to a scene-space position.
pub fn lower_by_height_offset(scene_position: Vec3, scale: f32) -> Vec3 {
    scene_position - SCENE_UP * (SCENE_HEIGHT_OFFSET * scale)
}
