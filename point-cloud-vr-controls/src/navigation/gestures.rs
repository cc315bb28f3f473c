//! Pure mappings from gamepad readings to navigation deltas.

use bevy::prelude::*;

use super::node::NavigationNode;
use crate::input::controller::ControllerState;
use crate::settings::VrControlsSettings;
use crate::viewer::ViewerState;

/// Squared response curve with sign kept: fine near center, fast at the extremes.
pub fn thumbstick_response(deflection: f32) -> f32 {
    deflection.signum() * (2.0 * deflection).powi(2)
}

/// Speed multiplier derived from the largest loaded point cloud.
pub fn extent_multiplier(viewer: &ViewerState, settings: &VrControlsSettings) -> f32 {
    viewer.max_point_cloud_diagonal().sqrt() / 2.0 * settings.extent_size_multiplier
}

/// Scene-space movement requested by the controller's thumbstick.
///
/// Returns `None` when there is no controller or it has no gamepad; callers
/// treat that as no movement this frame.
pub fn compute_move(
    node: &NavigationNode,
    controller: Option<&ControllerState>,
    viewer: &ViewerState,
    settings: &VrControlsSettings,
) -> Option<Vec3> {
    let Some(controller) = controller else {
        debug!("compute_move called without a controller");
        return None;
    };
    let Some(deflection) = controller.move_axis() else {
        debug!("{:?} controller has no gamepad", controller.hand);
        return None;
    };

    let response = thumbstick_response(deflection);
    let move_speed = viewer.move_speed() * settings.move_speed_multiplier;
    let amount = extent_multiplier(viewer, settings) * response * move_speed.max(0.0).sqrt()
        / node.uniform_scale();

    let step = controller.pose.forward() * amount;
    let from = node.to_scene(controller.pose.position);
    let to = node.to_scene(controller.pose.position + step);
    Some(to - from)
}

/// Yaw rate (radians per second) requested by the controller's thumbstick.
pub fn compute_rotation(
    controller: Option<&ControllerState>,
    settings: &VrControlsSettings,
) -> Option<f32> {
    let Some(controller) = controller else {
        debug!("compute_rotation called without a controller");
        return None;
    };
    let deflection = controller.turn_axis()?;
    Some(deflection * settings.rotation_speed)
}
