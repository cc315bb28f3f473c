use bevy::prelude::*;
use constants::navigation::{MIN_GRAB_SEPARATION, MIN_SCALE_RATIO};

use super::gestures::{compute_move, compute_rotation};
use super::node::NavigationNode;
use crate::input::controller::{ControllerHand, ControllerState, Pose, TriggeredSet};
use crate::settings::VrControlsSettings;
use crate::viewer::ViewerState;

/// Navigation behaviour selected by the number of held triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteractionModeKind {
    #[default]
    Fly,
    Translate,
    RotateScale,
}

impl InteractionModeKind {
    /// Total mapping from held trigger count to mode.
    pub fn from_triggered_count(count: usize) -> Self {
        match count {
            0 => Self::Fly,
            1 => Self::Translate,
            _ => Self::RotateScale,
        }
    }
}

/// Everything a mode may read or mutate during its lifecycle hooks.
pub struct NavigationContext<'a> {
    pub node: &'a mut NavigationNode,
    pub controllers: &'a [ControllerState; 2],
    pub triggered: &'a TriggeredSet,
    pub head: Pose,
    pub viewer: &'a mut ViewerState,
    pub settings: &'a VrControlsSettings,
}

impl NavigationContext<'_> {
    pub fn controller(&self, hand: ControllerHand) -> &ControllerState {
        &self.controllers[hand.index()]
    }

    /// Project the headset's view ray into scene space through `reference`
    /// and hand it to the host view controller.
    fn push_view(&mut self, reference: &NavigationNode) {
        let scale = self.node.uniform_scale();
        let eye = reference.to_scene_calibrated(self.head.position);
        let ahead = reference.to_scene_calibrated(self.head.position + self.head.forward());
        let direction = (ahead - eye).normalize_or_zero() * scale;
        self.viewer.set_view(eye, eye + direction);
    }
}

pub trait InteractionMode {
    fn start(&mut self, ctx: &mut NavigationContext);
    fn update(&mut self, ctx: &mut NavigationContext, delta: f32);
    fn end(&mut self, ctx: &mut NavigationContext);
}

/// Thumbstick flying: secondary stick moves, primary stick turns.
#[derive(Debug, Default)]
pub struct FlyMode;

impl InteractionMode for FlyMode {
    fn start(&mut self, _ctx: &mut NavigationContext) {}

    fn update(&mut self, ctx: &mut NavigationContext, delta: f32) {
        let step = compute_move(
            ctx.node,
            Some(ctx.controller(ControllerHand::Secondary)),
            ctx.viewer,
            ctx.settings,
        )
        .unwrap_or(Vec3::ZERO);
        ctx.node.position += step * (-delta * ctx.settings.move_factor);

        if let Some(rate) = compute_rotation(Some(ctx.controller(ControllerHand::Primary)), ctx.settings)
        {
            ctx.node.yaw_local(-rate * delta);
        }

        let reference = *ctx.node;
        ctx.push_view(&reference);
    }

    fn end(&mut self, _ctx: &mut NavigationContext) {}
}

/// Grab-and-pull: the scene moves opposite to the held controller.
#[derive(Debug, Default)]
pub struct TranslateMode {
    controller: Option<ControllerHand>,
    start_position: Vec3,
}

impl InteractionMode for TranslateMode {
    fn start(&mut self, ctx: &mut NavigationContext) {
        self.controller = ctx.triggered.first();
        self.start_position = ctx.node.position;
    }

    fn update(&mut self, ctx: &mut NavigationContext, _delta: f32) {
        let Some(hand) = self.controller else {
            return;
        };
        let controller = ctx.controller(hand);
        let from = ctx.node.to_scene(controller.start.position);
        let to = ctx.node.to_scene(controller.pose.position);
        ctx.node.position = self.start_position - (to - from);
    }

    fn end(&mut self, _ctx: &mut NavigationContext) {
        self.controller = None;
    }
}

/// Scale ratio readout shown between both controllers while rotating/scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleDebug {
    pub from: Vec3,
    pub to: Vec3,
    pub center: Vec3,
    pub text: String,
}

/// Two-handed rotate and scale about the midpoint of both grips.
#[derive(Debug, Default)]
pub struct RotateScaleMode {
    start_state: NavigationNode,
    debug: Option<ScaleDebug>,
}

impl RotateScaleMode {
    pub fn start_state(&self) -> &NavigationNode {
        &self.start_state
    }

    pub fn debug(&self) -> Option<&ScaleDebug> {
        self.debug.as_ref()
    }
}

/// Bearing of a VR-space vector on the horizontal (x, z) plane.
fn horizontal_bearing(v: Vec3) -> f32 {
    v.z.atan2(v.x)
}

impl InteractionMode for RotateScaleMode {
    fn start(&mut self, ctx: &mut NavigationContext) {
        self.start_state = *ctx.node;
    }

    fn update(&mut self, ctx: &mut NavigationContext, _delta: f32) {
        let primary = ctx.controller(ControllerHand::Primary);
        let secondary = ctx.controller(ControllerHand::Secondary);

        let start_c1 = primary.start.position;
        let start_c2 = secondary.start.position;
        let end_c1 = primary.pose.position;
        let end_c2 = secondary.pose.position;
        let start_center = (start_c1 + start_c2) * 0.5;
        let end_center = (end_c1 + end_c2) * 0.5;

        let start_span = start_c2 - start_c1;
        let end_span = end_c2 - end_c1;
        let start_distance = start_span.length();
        if start_distance < MIN_GRAB_SEPARATION {
            return;
        }
        let ratio = end_span.length() / start_distance;
        if !(ratio >= MIN_SCALE_RATIO) {
            return;
        }
        let angle = horizontal_bearing(end_span) - horizontal_bearing(start_span);

        let pivot = self.start_state.to_scene_calibrated(start_center);
        let transformed = Mat4::from_translation(pivot)
            * Mat4::from_scale(Vec3::splat(1.0 / ratio))
            * Mat4::from_rotation_z(angle)
            * Mat4::from_translation(-pivot)
            * self.start_state.matrix();

        // Keep the grab midpoint pinned to the scene point it started on.
        let drifted = NavigationNode::from_matrix(transformed).to_scene_calibrated(end_center);
        let corrected = Mat4::from_translation(pivot - drifted) * transformed;

        *ctx.node = NavigationNode::from_matrix(corrected);

        let scale = ctx.node.uniform_scale();
        let reference = self.start_state;
        ctx.push_view(&reference);
        ctx.viewer.set_move_speed(scale);

        self.debug = Some(ScaleDebug {
            from: end_c1,
            to: end_c2,
            center: end_center,
            text: format!("scale: 1 : {scale:.2}"),
        });
    }

    fn end(&mut self, _ctx: &mut NavigationContext) {
        self.debug = None;
    }
}

/// One instance of every mode, indexed by `InteractionModeKind`.
#[derive(Debug, Default)]
pub struct ModeTable {
    pub fly: FlyMode,
    pub translate: TranslateMode,
    pub rotate_scale: RotateScaleMode,
}

impl ModeTable {
    pub fn get_mut(&mut self, kind: InteractionModeKind) -> &mut dyn InteractionMode {
        match kind {
            InteractionModeKind::Fly => &mut self.fly,
            InteractionModeKind::Translate => &mut self.translate,
            InteractionModeKind::RotateScale => &mut self.rotate_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::controller::{GamepadAxes, InputSource};
    use crate::settings::AxisMapping;
    use crate::viewer::PointCloudExtent;
    use std::f32::consts::FRAC_PI_2;

    struct Fixture {
        node: NavigationNode,
        controllers: [ControllerState; 2],
        triggered: TriggeredSet,
        viewer: ViewerState,
        settings: VrControlsSettings,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                node: NavigationNode::default(),
                controllers: [
                    ControllerState::new(ControllerHand::Primary, AxisMapping::default()),
                    ControllerState::new(ControllerHand::Secondary, AxisMapping::default()),
                ],
                triggered: TriggeredSet::default(),
                viewer: ViewerState::default(),
                settings: VrControlsSettings::default(),
            }
        }

        fn ctx(&mut self) -> NavigationContext<'_> {
            NavigationContext {
                node: &mut self.node,
                controllers: &self.controllers,
                triggered: &self.triggered,
                head: Pose::default(),
                viewer: &mut self.viewer,
                settings: &self.settings,
            }
        }

        fn grab(&mut self, hand: ControllerHand, start: Vec3, now: Vec3) {
            let c = &mut self.controllers[hand.index()];
            c.start.position = start;
            c.pose.position = now;
        }
    }

    #[test]
    fn triggered_count_selects_mode() {
        assert_eq!(InteractionModeKind::from_triggered_count(0), InteractionModeKind::Fly);
        assert_eq!(InteractionModeKind::from_triggered_count(1), InteractionModeKind::Translate);
        assert_eq!(InteractionModeKind::from_triggered_count(2), InteractionModeKind::RotateScale);
    }

    #[test]
    fn translate_moves_opposite_to_hand() {
        let mut f = Fixture::new();
        f.node.position = Vec3::new(5.0, 5.0, 5.0);
        f.triggered.insert(ControllerHand::Secondary);
        f.grab(ControllerHand::Secondary, Vec3::ZERO, Vec3::new(1.0, 2.0, -1.0));

        let mut mode = TranslateMode::default();
        mode.start(&mut f.ctx());
        mode.update(&mut f.ctx(), 0.016);
        assert!(f.node.position.abs_diff_eq(Vec3::new(4.0, 3.0, 6.0), 1e-5));
    }

    #[test]
    fn rotate_scale_halves_scale_when_hands_spread() {
        let mut f = Fixture::new();
        f.grab(ControllerHand::Primary, Vec3::new(-0.5, 1.0, 0.0), Vec3::new(-1.0, 1.0, 0.0));
        f.grab(ControllerHand::Secondary, Vec3::new(0.5, 1.0, 0.0), Vec3::new(1.0, 1.0, 0.0));

        let mut mode = RotateScaleMode::default();
        mode.start(&mut f.ctx());
        mode.update(&mut f.ctx(), 0.016);

        assert!((f.node.uniform_scale() - 0.5).abs() < 1e-4);
        assert!((f.viewer.move_speed() - 0.5).abs() < 1e-4);
        assert_eq!(mode.debug().map(|d| d.text.as_str()), Some("scale: 1 : 0.50"));
    }

    #[test]
    fn rotate_scale_keeps_grab_center_on_same_scene_point() {
        let mut f = Fixture::new();
        f.node.position = Vec3::new(100.0, 50.0, 3.0);
        f.grab(ControllerHand::Primary, Vec3::new(-0.5, 1.0, 0.0), Vec3::new(0.0, 1.0, -0.5));
        f.grab(ControllerHand::Secondary, Vec3::new(0.5, 1.0, 0.0), Vec3::new(0.0, 1.0, 0.5));

        let mut mode = RotateScaleMode::default();
        mode.start(&mut f.ctx());
        let before = mode.start_state().to_scene_calibrated(Vec3::new(0.0, 1.0, 0.0));
        mode.update(&mut f.ctx(), 0.016);
        let after = f.node.to_scene_calibrated(Vec3::new(0.0, 1.0, 0.0));

        assert!(before.abs_diff_eq(after, 1e-3));
        assert!((f.node.uniform_scale() - 1.0).abs() < 1e-4);
        let (axis, angle) = f.node.rotation.to_axis_angle();
        assert!((angle - FRAC_PI_2).abs() < 1e-3);
        assert!(axis.abs_diff_eq(Vec3::Z, 1e-3));
    }

    #[test]
    fn rotate_scale_ignores_coincident_grips() {
        let mut f = Fixture::new();
        f.grab(ControllerHand::Primary, Vec3::ONE, Vec3::ONE);
        f.grab(ControllerHand::Secondary, Vec3::ONE, Vec3::new(2.0, 1.0, 1.0));
        let mut mode = RotateScaleMode::default();
        mode.start(&mut f.ctx());
        mode.update(&mut f.ctx(), 0.016);
        assert_eq!(f.node, NavigationNode::default());
        assert!(mode.debug().is_none());
    }

    #[test]
    fn rotate_scale_ignores_collapsed_grip() {
        let mut f = Fixture::new();
        f.grab(ControllerHand::Primary, Vec3::new(-0.5, 1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        f.grab(ControllerHand::Secondary, Vec3::new(0.5, 1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let mut mode = RotateScaleMode::default();
        mode.start(&mut f.ctx());
        mode.update(&mut f.ctx(), 0.016);
        assert_eq!(f.node, NavigationNode::default());
    }

    #[test]
    fn fly_moves_against_stick_and_yaws_about_vr_up() {
        let mut f = Fixture::new();
        f.viewer.point_clouds.push(PointCloudExtent::new(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 4.0),
        ));
        f.controllers[ControllerHand::Secondary.index()].input_source = Some(InputSource {
            gamepad: Some(GamepadAxes::new(vec![0.0, 0.0, 0.0, 0.5])),
        });
        f.controllers[ControllerHand::Primary.index()].input_source = Some(InputSource {
            gamepad: Some(GamepadAxes::new(vec![0.0, 0.0, 0.4, 0.0])),
        });

        FlyMode.update(&mut f.ctx(), 0.5);

        // full response (2 * 0.5)^2 = 1, extent sqrt(4) / 2 * 1.5, speed sqrt(1 * 0.005)
        let amount = 1.5 * 0.005f32.sqrt();
        // controller points along -Z, fly moves the node the opposite way
        assert!(f.node.position.abs_diff_eq(Vec3::new(0.0, 0.0, 0.5 * amount), 1e-6));

        // turn 0.4 * 0.5 rad/s over 0.5 s, negated
        assert!(f.node.rotation.abs_diff_eq(Quat::from_rotation_y(-0.1), 1e-6));
        let (axis, angle) = f.node.rotation.to_axis_angle();
        assert!((angle - 0.1).abs() < 1e-5);
        assert!(axis.abs_diff_eq(Vec3::NEG_Y, 1e-5));
    }

    #[test]
    fn fly_without_gamepads_only_updates_view() {
        let mut f = Fixture::new();
        f.node.position = Vec3::new(1.0, 2.0, 3.0);
        FlyMode.update(&mut f.ctx(), 0.5);
        assert_eq!(f.node.position, Vec3::new(1.0, 2.0, 3.0));
        let view = f.viewer.view();
        assert!(view.position.abs_diff_eq(Vec3::new(1.0, 2.0, 2.2), 1e-5));
        assert!(view.target.abs_diff_eq(Vec3::new(1.0, 2.0, 1.2), 1e-5));
    }
}
