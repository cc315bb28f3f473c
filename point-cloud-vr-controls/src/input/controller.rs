use bevy::prelude::*;
use constants::coordinate_system::POSE_FORWARD;

use crate::settings::AxisMapping;

/// Which physical controller an input belongs to.
/// The primary controller is XR controller index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerHand {
    Primary,
    Secondary,
}

impl ControllerHand {
    pub const ALL: [ControllerHand; 2] = [ControllerHand::Primary, ControllerHand::Secondary];

    pub fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
        }
    }
}

/// Position and orientation in VR space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Unit vector the pose is pointing along.
    pub fn forward(&self) -> Vec3 {
        (self.rotation * POSE_FORWARD).normalize_or_zero()
    }
}

impl From<&Transform> for Pose {
    fn from(transform: &Transform) -> Self {
        Self::new(transform.translation, transform.rotation)
    }
}

/// Analog readings of a gamepad. Index meaning depends on the hardware.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamepadAxes {
    pub axes: Vec<f32>,
}

impl GamepadAxes {
    pub fn new(axes: impl Into<Vec<f32>>) -> Self {
        Self { axes: axes.into() }
    }

    /// Value at `index`, zero when the pad does not report that axis.
    pub fn axis(&self, index: usize) -> f32 {
        self.axes.get(index).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }
}

/// Input source attached to a controller once it reports `connected`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSource {
    pub gamepad: Option<GamepadAxes>,
}

/// Per-controller tracking and input state.
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub hand: ControllerHand,
    pub pose: Pose,
    /// Snapshot of `pose` taken at the last mode transition.
    pub start: Pose,
    pub input_source: Option<InputSource>,
    pub axis_mapping: AxisMapping,
}

impl ControllerState {
    pub fn new(hand: ControllerHand, axis_mapping: AxisMapping) -> Self {
        Self {
            hand,
            pose: Pose::default(),
            start: Pose::default(),
            input_source: None,
            axis_mapping,
        }
    }

    /// Gamepad of the connected input source, if both exist.
    pub fn gamepad(&self) -> Option<&GamepadAxes> {
        self.input_source.as_ref()?.gamepad.as_ref()
    }

    pub fn capture_start(&mut self) {
        self.start = self.pose;
    }

    /// Forward/back deflection. Touchpad pads report 2 axes, thumbstick pads 4.
    pub fn move_axis(&self) -> Option<f32> {
        let pad = self.gamepad()?;
        let value = match pad.len() {
            n if n >= 4 => pad.axis(self.axis_mapping.move_axis_thumbstick),
            n if n >= 2 => pad.axis(self.axis_mapping.move_axis_touchpad),
            _ => 0.0,
        };
        Some(value)
    }

    /// Left/right thumbstick deflection; touchpad pads have no turn axis.
    pub fn turn_axis(&self) -> Option<f32> {
        let pad = self.gamepad()?;
        let value = if pad.len() >= 4 {
            pad.axis(self.axis_mapping.turn_axis)
        } else {
            0.0
        };
        Some(value)
    }

    pub fn ray_axis(&self) -> f32 {
        self.gamepad()
            .map(|pad| pad.axis(self.axis_mapping.ray_axis))
            .unwrap_or(0.0)
    }
}

/// Controllers currently holding the trigger, in press order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggeredSet {
    hands: Vec<ControllerHand>,
}

impl TriggeredSet {
    /// Returns false when the hand was already held.
    pub fn insert(&mut self, hand: ControllerHand) -> bool {
        if self.hands.contains(&hand) {
            return false;
        }
        self.hands.push(hand);
        true
    }

    pub fn remove(&mut self, hand: ControllerHand) -> bool {
        let before = self.hands.len();
        self.hands.retain(|h| *h != hand);
        self.hands.len() != before
    }

    pub fn contains(&self, hand: ControllerHand) -> bool {
        self.hands.contains(&hand)
    }

    pub fn len(&self) -> usize {
        self.hands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }

    /// Earliest held controller.
    pub fn first(&self) -> Option<ControllerHand> {
        self.hands.first().copied()
    }

    pub fn clear(&mut self) {
        self.hands.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected(axes: &[f32]) -> ControllerState {
        let mut state = ControllerState::new(ControllerHand::Secondary, AxisMapping::default());
        state.input_source = Some(InputSource {
            gamepad: Some(GamepadAxes::new(axes.to_vec())),
        });
        state
    }

    #[test]
    fn triggered_set_never_exceeds_two() {
        let mut set = TriggeredSet::default();
        assert!(set.insert(ControllerHand::Primary));
        assert!(!set.insert(ControllerHand::Primary));
        assert!(set.insert(ControllerHand::Secondary));
        assert_eq!(set.len(), 2);
        assert!(set.remove(ControllerHand::Primary));
        assert!(!set.remove(ControllerHand::Primary));
        assert_eq!(set.first(), Some(ControllerHand::Secondary));
    }

    #[test]
    fn move_axis_depends_on_pad_layout() {
        assert_eq!(connected(&[0.0, 0.3]).move_axis(), Some(0.3));
        assert_eq!(connected(&[0.0, 0.3, 0.0, -0.7]).move_axis(), Some(-0.7));
        assert_eq!(connected(&[]).move_axis(), Some(0.0));
    }

    #[test]
    fn turn_axis_needs_thumbstick() {
        assert_eq!(connected(&[0.9, 0.1]).turn_axis(), Some(0.0));
        assert_eq!(connected(&[0.0, 0.0, 0.4, 0.0]).turn_axis(), Some(0.4));
    }

    #[test]
    fn missing_gamepad_yields_no_axes() {
        let mut state = ControllerState::new(ControllerHand::Primary, AxisMapping::default());
        assert_eq!(state.move_axis(), None);
        state.input_source = Some(InputSource { gamepad: None });
        assert_eq!(state.turn_axis(), None);
        assert_eq!(state.ray_axis(), 0.0);
    }

    #[test]
    fn pose_forward_is_negative_z() {
        let pose = Pose::default();
        assert_eq!(pose.forward(), Vec3::NEG_Z);
    }
}
