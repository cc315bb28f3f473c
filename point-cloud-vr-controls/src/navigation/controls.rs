use bevy::prelude::*;

use super::modes::{
    InteractionMode, InteractionModeKind, ModeTable, NavigationContext, ScaleDebug,
};
use super::node::NavigationNode;
use crate::input::controller::{
    ControllerHand, ControllerState, GamepadAxes, InputSource, Pose, TriggeredSet,
};
use crate::settings::VrControlsSettings;
use crate::tools::measure::MeasurementTool;
use crate::tools::menu::MenuState;
use crate::tools::ray::RayPointer;
use crate::viewer::ViewerState;

/// VR navigation and tool state driven by controller events and the frame update.
#[derive(Resource, Debug)]
pub struct VrControls {
    node: NavigationNode,
    controllers: [ControllerState; 2],
    triggered: TriggeredSet,
    head: Pose,
    mode: InteractionModeKind,
    modes: ModeTable,
    ray: RayPointer,
    measurements: MeasurementTool,
    menu: MenuState,
    settings: VrControlsSettings,
}

impl VrControls {
    pub fn new(settings: &VrControlsSettings) -> Self {
        let controllers = ControllerHand::ALL
            .map(|hand| ControllerState::new(hand, settings.axis_mapping(hand)));
        // Fly has no start work, so it can be the initial mode without a transition.
        Self {
            node: NavigationNode::default(),
            controllers,
            triggered: TriggeredSet::default(),
            head: Pose::default(),
            mode: InteractionModeKind::Fly,
            modes: ModeTable::default(),
            ray: RayPointer::new(settings),
            measurements: MeasurementTool::default(),
            menu: MenuState::new(settings),
            settings: settings.clone(),
        }
    }

    pub fn apply_settings(&mut self, settings: &VrControlsSettings) {
        for controller in &mut self.controllers {
            controller.axis_mapping = settings.axis_mapping(controller.hand);
        }
        self.ray.apply_settings(settings);
        self.menu.apply_settings(settings);
        self.settings = settings.clone();
    }

    pub fn settings(&self) -> &VrControlsSettings {
        &self.settings
    }

    pub fn node(&self) -> &NavigationNode {
        &self.node
    }

    pub fn set_node(&mut self, node: NavigationNode) {
        self.node = node;
    }

    pub fn controller(&self, hand: ControllerHand) -> &ControllerState {
        &self.controllers[hand.index()]
    }

    pub fn head(&self) -> Pose {
        self.head
    }

    pub fn mode(&self) -> InteractionModeKind {
        self.mode
    }

    pub fn triggered(&self) -> &TriggeredSet {
        &self.triggered
    }

    pub fn ray(&self) -> &RayPointer {
        &self.ray
    }

    pub fn measurements(&self) -> &MeasurementTool {
        &self.measurements
    }

    pub fn menu(&self) -> &MenuState {
        &self.menu
    }

    pub fn rotate_scale_debug(&self) -> Option<&ScaleDebug> {
        self.modes.rotate_scale.debug()
    }

    pub fn set_head_pose(&mut self, pose: Pose) {
        self.head = pose;
    }

    pub fn set_controller_pose(&mut self, hand: ControllerHand, pose: Pose) {
        self.controllers[hand.index()].pose = pose;
    }

    /// Refresh gamepad readings; ignored until the controller is connected with a gamepad.
    pub fn set_gamepad_axes(&mut self, hand: ControllerHand, axes: &[f32]) {
        let Some(source) = self.controllers[hand.index()].input_source.as_mut() else {
            return;
        };
        if let Some(gamepad) = source.gamepad.as_mut() {
            gamepad.axes.clear();
            gamepad.axes.extend_from_slice(axes);
        }
    }

    pub fn connect(&mut self, hand: ControllerHand, has_gamepad: bool) {
        info!("{:?} controller connected (gamepad: {})", hand, has_gamepad);
        self.controllers[hand.index()].input_source = Some(InputSource {
            gamepad: has_gamepad.then(GamepadAxes::default),
        });
    }

    pub fn disconnect(&mut self, hand: ControllerHand, viewer: &mut ViewerState) {
        info!("{:?} controller disconnected", hand);
        self.controllers[hand.index()].input_source = None;
        self.on_squeeze_end(hand);
        if self.triggered.remove(hand) {
            self.select_mode(viewer);
        }
    }

    fn with_mode<R>(
        &mut self,
        kind: InteractionModeKind,
        viewer: &mut ViewerState,
        hook: impl FnOnce(&mut dyn InteractionMode, &mut NavigationContext) -> R,
    ) -> R {
        let Self {
            node,
            controllers,
            triggered,
            head,
            modes,
            settings,
            ..
        } = self;
        let mut ctx = NavigationContext {
            node,
            controllers,
            triggered,
            head: *head,
            viewer,
            settings,
        };
        hook(modes.get_mut(kind), &mut ctx)
    }

    /// Switch interaction mode. Returns false when `kind` is already active.
    pub fn set_mode(&mut self, kind: InteractionModeKind, viewer: &mut ViewerState) -> bool {
        if self.mode == kind {
            return false;
        }

        for controller in &mut self.controllers {
            controller.capture_start();
        }

        let previous = self.mode;
        self.with_mode(previous, viewer, |mode, ctx| mode.end(ctx));
        self.mode = kind;
        self.with_mode(kind, viewer, |mode, ctx| mode.start(ctx));

        info!("Interaction mode {:?} -> {:?}", previous, kind);
        true
    }

    /// Pick the mode implied by the number of held triggers.
    pub fn select_mode(&mut self, viewer: &mut ViewerState) -> bool {
        let kind = InteractionModeKind::from_triggered_count(self.triggered.len());
        self.set_mode(kind, viewer)
    }

    pub fn on_trigger_start(&mut self, hand: ControllerHand, viewer: &mut ViewerState) {
        debug!("{:?} trigger pressed", hand);
        self.triggered.insert(hand);

        if self.ray.squeezing_controller() == Some(hand) {
            self.place_measurement_point();
        } else if hand == ControllerHand::Primary {
            self.toggle_menu();
        }

        self.select_mode(viewer);
    }

    pub fn on_trigger_end(&mut self, hand: ControllerHand, viewer: &mut ViewerState) {
        debug!("{:?} trigger released", hand);
        self.triggered.remove(hand);
        self.select_mode(viewer);
    }

    pub fn on_squeeze_start(&mut self, hand: ControllerHand) {
        info!("{:?} squeeze activated", hand);
        self.ray.squeeze_start(hand);
        self.ray.refresh_segment(&self.controllers);
    }

    pub fn on_squeeze_end(&mut self, hand: ControllerHand) {
        if self.ray.squeeze_end(hand) {
            info!("{:?} squeeze released", hand);
        }
    }

    /// Drop a measurement point at the ray endpoint, in scene space.
    pub fn place_measurement_point(&mut self) -> Option<Vec3> {
        let Some(endpoint) = self.ray.endpoint() else {
            warn!("No ray endpoint to place a measurement point at");
            return None;
        };
        let position = self.node.to_scene_calibrated(endpoint);
        info!(
            "Measurement point {} at {:.2}, {:.2}, {:.2}",
            self.measurements.points().len() + 1,
            position.x,
            position.y,
            position.z
        );
        self.measurements.add_point(position);
        Some(position)
    }

    pub fn delete_measurements(&mut self) {
        info!(
            "Deleting {} measurement points",
            self.measurements.points().len()
        );
        self.measurements.clear();
    }

    pub fn toggle_menu(&mut self) -> bool {
        let open = self.menu.toggle();
        info!("VR menu {}", if open { "opened" } else { "closed" });
        open
    }

    /// Place the navigation node at the configured session start pose.
    pub fn on_session_start(&mut self) {
        let start = &self.settings.session_start;
        let mut node = NavigationNode {
            position: Vec3::from_array(start.position),
            ..default()
        };
        if let Some(target) = start.look_at {
            node.look_at(Vec3::from_array(target));
        }
        node.set_uniform_scale(start.scale);
        self.node = node;
        info!("VR session started at {:?}", self.node.position);
    }

    pub fn on_session_end(&mut self, viewer: &mut ViewerState) {
        self.triggered.clear();
        for hand in ControllerHand::ALL {
            self.ray.squeeze_end(hand);
        }
        self.select_mode(viewer);
        info!("VR session ended");
    }

    /// Per-frame entry point: ray first, then the active mode.
    pub fn update(&mut self, delta: f32, viewer: &mut ViewerState) {
        self.ray.update(&self.controllers);
        let mode = self.mode;
        self.with_mode(mode, viewer, |mode, ctx| mode.update(ctx, delta));
    }
}

impl Default for VrControls {
    fn default() -> Self {
        Self::new(&VrControlsSettings::default())
    }
}

pub fn update_vr_controls(
    time: Res<Time>,
    mut controls: ResMut<VrControls>,
    mut viewer: ResMut<ViewerState>,
) {
    controls.update(time.delta_secs(), &mut viewer);
}

/// Push replaced or edited settings into the live controls.
pub fn apply_settings_changes(
    settings: Res<VrControlsSettings>,
    mut controls: ResMut<VrControls>,
) {
    if !settings.is_changed() || *controls.settings() == *settings {
        return;
    }
    if let Err(err) = settings.validate() {
        warn!("{err}; keeping previous VR controls settings");
        return;
    }
    debug!("Applying updated VR controls settings");
    controls.apply_settings(&settings);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(x: f32, y: f32, z: f32) -> Pose {
        Pose::new(Vec3::new(x, y, z), Quat::IDENTITY)
    }

    #[test]
    fn trigger_count_drives_mode() {
        let mut viewer = ViewerState::default();
        let mut controls = VrControls::default();
        assert_eq!(controls.mode(), InteractionModeKind::Fly);

        controls.on_trigger_start(ControllerHand::Secondary, &mut viewer);
        assert_eq!(controls.mode(), InteractionModeKind::Translate);
        controls.on_trigger_start(ControllerHand::Primary, &mut viewer);
        assert_eq!(controls.mode(), InteractionModeKind::RotateScale);
        controls.on_trigger_end(ControllerHand::Secondary, &mut viewer);
        assert_eq!(controls.mode(), InteractionModeKind::Translate);
        controls.on_trigger_end(ControllerHand::Primary, &mut viewer);
        assert_eq!(controls.mode(), InteractionModeKind::Fly);
    }

    #[test]
    fn set_mode_same_kind_is_noop() {
        let mut viewer = ViewerState::default();
        let mut controls = VrControls::default();
        controls.set_controller_pose(ControllerHand::Primary, pose(1.0, 0.0, 0.0));
        assert!(controls.set_mode(InteractionModeKind::RotateScale, &mut viewer));
        let snapshot = *controls.modes.rotate_scale.start_state();

        controls.set_node(NavigationNode {
            position: Vec3::splat(9.0),
            ..default()
        });
        controls.set_controller_pose(ControllerHand::Primary, pose(5.0, 0.0, 0.0));
        assert!(!controls.set_mode(InteractionModeKind::RotateScale, &mut viewer));

        assert_eq!(*controls.modes.rotate_scale.start_state(), snapshot);
        assert_eq!(
            controls.controller(ControllerHand::Primary).start.position,
            Vec3::new(1.0, 0.0, 0.0)
        );
    }

    #[test]
    fn transition_snapshots_both_controllers() {
        let mut viewer = ViewerState::default();
        let mut controls = VrControls::default();
        controls.set_controller_pose(ControllerHand::Primary, pose(1.0, 2.0, 3.0));
        controls.set_controller_pose(ControllerHand::Secondary, pose(-1.0, 2.0, 3.0));

        controls.on_trigger_start(ControllerHand::Secondary, &mut viewer);

        assert_eq!(
            controls.controller(ControllerHand::Primary).start,
            pose(1.0, 2.0, 3.0)
        );
        assert_eq!(
            controls.controller(ControllerHand::Secondary).start,
            pose(-1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn translate_follows_grabbing_hand() {
        let mut viewer = ViewerState::default();
        let mut controls = VrControls::default();
        controls.set_controller_pose(ControllerHand::Secondary, pose(0.0, 1.0, 0.0));
        controls.on_trigger_start(ControllerHand::Secondary, &mut viewer);

        controls.set_controller_pose(ControllerHand::Secondary, pose(0.5, 1.0, 0.0));
        controls.update(0.016, &mut viewer);
        assert!(controls.node().position.abs_diff_eq(Vec3::new(-0.5, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn squeeze_and_trigger_places_points() {
        let mut viewer = ViewerState::default();
        let mut controls = VrControls::default();
        controls.set_controller_pose(ControllerHand::Secondary, pose(0.0, 0.0, 0.0));
        controls.on_squeeze_start(ControllerHand::Secondary);
        assert!(controls.ray().is_squeezing());

        let placed = controls.place_measurement_point().unwrap();
        // endpoint (0, 0, -2) lowered by the 0.8 height offset
        assert!(placed.abs_diff_eq(Vec3::new(0.0, 0.0, -2.8), 1e-5));

        controls.on_trigger_start(ControllerHand::Secondary, &mut viewer);
        assert_eq!(controls.measurements().points().len(), 2);
        assert!(!controls.menu().is_open());
    }

    #[test]
    fn primary_trigger_without_squeeze_toggles_menu() {
        let mut viewer = ViewerState::default();
        let mut controls = VrControls::default();
        controls.on_trigger_start(ControllerHand::Primary, &mut viewer);
        assert!(controls.menu().is_open());
        controls.on_trigger_end(ControllerHand::Primary, &mut viewer);
        controls.on_trigger_start(ControllerHand::Primary, &mut viewer);
        assert!(!controls.menu().is_open());

        controls.on_trigger_start(ControllerHand::Secondary, &mut viewer);
        assert!(!controls.menu().is_open());
        assert!(controls.measurements().is_empty());
    }

    #[test]
    fn no_point_without_ray() {
        let mut controls = VrControls::default();
        assert_eq!(controls.place_measurement_point(), None);
        assert!(controls.measurements().is_empty());
    }

    #[test]
    fn delete_measurements_clears_all() {
        let mut controls = VrControls::default();
        controls.on_squeeze_start(ControllerHand::Primary);
        for i in 0..5 {
            controls.set_controller_pose(ControllerHand::Primary, pose(i as f32, 0.0, 0.0));
            controls.on_squeeze_start(ControllerHand::Primary);
            controls.place_measurement_point();
        }
        assert_eq!(controls.measurements().points().len(), 5);
        controls.delete_measurements();
        assert!(controls.measurements().points().is_empty());
        assert!(controls.measurements().lines().is_empty());
        assert!(controls.measurements().labels().is_empty());
    }

    #[test]
    fn session_start_applies_configured_pose() {
        let mut settings = VrControlsSettings::default();
        settings.session_start.position = [5700.0, 339900.0, 7.0];
        settings.session_start.scale = 2.0;
        let mut controls = VrControls::new(&settings);
        controls.on_session_start();
        assert_eq!(controls.node().position, Vec3::new(5700.0, 339900.0, 7.0));
        assert_eq!(controls.node().scale, Vec3::splat(2.0));
    }

    #[test]
    fn disconnect_releases_held_inputs() {
        let mut viewer = ViewerState::default();
        let mut controls = VrControls::default();
        controls.connect(ControllerHand::Primary, true);
        controls.set_gamepad_axes(ControllerHand::Primary, &[0.0, 0.5]);
        assert_eq!(
            controls.controller(ControllerHand::Primary).move_axis(),
            Some(0.5)
        );

        controls.on_squeeze_start(ControllerHand::Primary);
        controls.on_trigger_start(ControllerHand::Primary, &mut viewer);
        assert_eq!(controls.mode(), InteractionModeKind::Translate);

        controls.disconnect(ControllerHand::Primary, &mut viewer);
        assert_eq!(controls.mode(), InteractionModeKind::Fly);
        assert!(!controls.ray().is_squeezing());
        assert_eq!(controls.controller(ControllerHand::Primary).move_axis(), None);
    }

    #[test]
    fn squeeze_frame_steps_ray_length_once() {
        let mut viewer = ViewerState::default();
        let mut controls = VrControls::default();
        controls.connect(ControllerHand::Primary, true);
        controls.set_gamepad_axes(ControllerHand::Primary, &[0.0, 1.0]);

        controls.on_squeeze_start(ControllerHand::Primary);
        assert_eq!(controls.ray().ray_length(), 2.0);
        assert!(controls.ray().endpoint().is_some());

        controls.update(0.016, &mut viewer);
        assert!((controls.ray().ray_length() - 2.1).abs() < 1e-5);
    }
}
