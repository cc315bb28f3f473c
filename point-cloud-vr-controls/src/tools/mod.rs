//! Interactive VR tools: squeeze ray, point/line/area measurement and the
//! controller menu.
//!
//! Each tool keeps its bookkeeping in plain state owned by `VrControls` and
//! has a render system that mirrors that state into scene entities:
//!
//! ```text
//! squeeze start ──> RayPointer armed ──> update_ray_render (line + endpoint)
//! trigger while squeezing ──> MeasurementTool::add_point ──> update_measure_render
//! primary trigger ──> MenuState::toggle ──> update_menu_render
//! MenuButtonPressed ──> MenuActions ──> one-shot system (e.g. delete_measurements)
//! ```

/// Point, line and polygon area measurement with derived labels.
pub mod measure;

/// In-world button panel attached to the primary controller.
pub mod menu;

/// Squeeze-armed pointer ray with joystick controlled length.
pub mod ray;

use bevy::prelude::*;
use constants::render_settings::MIN_DRAWN_SEGMENT;

/// Transform that stretches a unit X-length cuboid from `start` to `end`.
pub fn segment_transform(start: Vec3, end: Vec3) -> Option<Transform> {
    let dir = end - start;
    let length = dir.length();
    if length < MIN_DRAWN_SEGMENT {
        return None;
    }
    let rotation = Quat::from_rotation_arc(Vec3::X, dir / length);
    Some(
        Transform::from_translation((start + end) * 0.5)
            .with_rotation(rotation)
            .with_scale(Vec3::new(length, 1.0, 1.0)),
    )
}

/// Text sprite payload. Drawn by the host's label renderer.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct LabelSprite {
    pub text: String,
}

impl LabelSprite {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
