use bevy::prelude::*;

use super::controller::{ControllerHand, Pose};
use crate::navigation::controls::VrControls;
use crate::viewer::ViewerState;

/// Entity carrying the headset pose. Its local `Transform` is in VR space.
#[derive(Component, Debug, Default)]
pub struct VrHeadset;

/// Tracked controller; the XR backend writes its local `Transform`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct XrController {
    pub hand: ControllerHand,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct XrControllerGrip {
    pub hand: ControllerHand,
}

/// Latest gamepad axes reported for a controller.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct XrGamepad {
    pub axes: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrInputKind {
    Connected { has_gamepad: bool },
    Disconnected,
    SelectStart,
    SelectEnd,
    SqueezeStart,
    SqueezeEnd,
}

/// Controller event forwarded from the XR backend.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct XrInputEvent {
    pub hand: ControllerHand,
    pub kind: XrInputKind,
}

impl XrInputEvent {
    pub fn new(hand: ControllerHand, kind: XrInputKind) -> Self {
        Self { hand, kind }
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrSessionEvent {
    Started,
    Ended,
}

/// Copy headset and controller poses plus gamepad axes into `VrControls`.
pub fn sync_tracked_poses(
    mut controls: ResMut<VrControls>,
    headset: Query<&Transform, With<VrHeadset>>,
    controllers: Query<(&XrController, &Transform, Option<&XrGamepad>)>,
) {
    if let Ok(transform) = headset.single() {
        controls.set_head_pose(Pose::from(transform));
    }

    for (controller, transform, gamepad) in &controllers {
        controls.set_controller_pose(controller.hand, Pose::from(transform));
        if let Some(gamepad) = gamepad {
            controls.set_gamepad_axes(controller.hand, &gamepad.axes);
        }
    }
}

pub fn process_xr_input_events(
    mut events: EventReader<XrInputEvent>,
    mut controls: ResMut<VrControls>,
    mut viewer: ResMut<ViewerState>,
) {
    for event in events.read() {
        let hand = event.hand;
        match event.kind {
            XrInputKind::Connected { has_gamepad } => controls.connect(hand, has_gamepad),
            XrInputKind::Disconnected => controls.disconnect(hand, &mut viewer),
            XrInputKind::SelectStart => controls.on_trigger_start(hand, &mut viewer),
            XrInputKind::SelectEnd => controls.on_trigger_end(hand, &mut viewer),
            XrInputKind::SqueezeStart => controls.on_squeeze_start(hand),
            XrInputKind::SqueezeEnd => controls.on_squeeze_end(hand),
        }
    }
}

pub fn process_session_events(
    mut events: EventReader<XrSessionEvent>,
    mut controls: ResMut<VrControls>,
    mut viewer: ResMut<ViewerState>,
) {
    for event in events.read() {
        match event {
            XrSessionEvent::Started => controls.on_session_start(),
            XrSessionEvent::Ended => controls.on_session_end(&mut viewer),
        }
    }
}
