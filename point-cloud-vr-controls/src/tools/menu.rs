use std::collections::HashMap;

use bevy::ecs::system::SystemId;
use bevy::prelude::*;
use constants::render_settings::{
    MENU_BUTTON_SIZE, MENU_BUTTON_SPACING, MENU_HELP_OFFSET, MENU_HELP_SIZE, MENU_OFFSET,
    MENU_SCALE, MENU_SLIDER_BAR_RADIUS, MENU_SLIDER_HALF_LENGTH, MENU_SLIDER_HANDLE_SIZE,
    MENU_SLIDER_LABEL_HEIGHT, MENU_SLIDER_OFFSET, MENU_SLIDER_RANGE, MENU_TEXT_SCALE, MENU_TILT,
};

use super::LabelSprite;
use crate::input::controller::ControllerHand;
use crate::input::events::XrController;
use crate::navigation::controls::VrControls;
use crate::settings::VrControlsSettings;
use crate::viewer::ViewerState;

/// Whether the controller menu is shown, and what it lists.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuState {
    open: bool,
    title: String,
    buttons: Vec<String>,
    help_image: Option<String>,
}

impl MenuState {
    pub fn new(settings: &VrControlsSettings) -> Self {
        Self {
            open: false,
            title: settings.menu_title.clone(),
            buttons: settings.menu_buttons.clone(),
            help_image: settings.menu_help_image.clone(),
        }
    }

    pub fn apply_settings(&mut self, settings: &VrControlsSettings) {
        self.title = settings.menu_title.clone();
        self.buttons = settings.menu_buttons.clone();
        self.help_image = settings.menu_help_image.clone();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn buttons(&self) -> &[String] {
        &self.buttons
    }

    pub fn help_image(&self) -> Option<&str> {
        self.help_image.as_deref()
    }

    /// Flip between shown and hidden; returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }
}

/// Button label to one-shot system run when that button is pressed.
#[derive(Resource, Default, Debug)]
pub struct MenuActions {
    actions: HashMap<String, SystemId>,
}

impl MenuActions {
    pub fn register(&mut self, label: impl Into<String>, system: SystemId) {
        self.actions.insert(label.into(), system);
    }

    pub fn get(&self, label: &str) -> Option<SystemId> {
        self.actions.get(label).copied()
    }
}

/// Sent by the host's picking when a menu button is hit.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct MenuButtonPressed {
    pub label: String,
}

#[derive(Component)]
pub struct MenuPanel;

#[derive(Component, Debug, Clone)]
pub struct MenuButton {
    pub label: String,
}

/// Move speed slider: label, two end handles, value knob and bar.
#[derive(Component)]
pub struct MenuSlider;

#[derive(Component)]
pub struct MenuSliderLabel;

#[derive(Component)]
pub struct MenuSliderKnob;

/// Controller help image.
#[derive(Component)]
pub struct MenuHelpPanel;

pub fn speed_label(move_speed: f32) -> String {
    format!("speed: {move_speed:.2}")
}

/// Knob height along the slider bar, clamped to the handles.
pub fn slider_knob_height(move_speed: f32) -> f32 {
    let [min, max] = MENU_SLIDER_RANGE;
    let t = ((move_speed - min) / (max - min)).clamp(0.0, 1.0);
    if t.is_nan() {
        return -MENU_SLIDER_HALF_LENGTH;
    }
    MENU_SLIDER_HALF_LENGTH * (2.0 * t - 1.0)
}

pub fn dispatch_menu_actions(
    mut events: EventReader<MenuButtonPressed>,
    actions: Res<MenuActions>,
    mut commands: Commands,
) {
    for event in events.read() {
        match actions.get(&event.label) {
            Some(system) => {
                info!("Menu action: {}", event.label);
                commands.run_system(system);
            }
            None => warn!("No action bound to menu button {:?}", event.label),
        }
    }
}

/// Menu action: remove every measurement. Irreversible.
pub fn delete_measurements(mut controls: ResMut<VrControls>) {
    controls.delete_measurements();
}

/// Spawns the panel under the primary controller when the menu opens and
/// despawns it when it closes.
pub fn update_menu_render(
    mut commands: Commands,
    controls: Res<VrControls>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    viewer: Res<ViewerState>,
    asset_server: Option<Res<AssetServer>>,
    controllers: Query<(Entity, &XrController)>,
    panels: Query<Entity, With<MenuPanel>>,
) {
    let menu = controls.menu();

    if !menu.is_open() {
        for panel in &panels {
            commands.entity(panel).despawn();
        }
        return;
    }
    if !panels.is_empty() {
        return;
    }

    let Some((primary, _)) = controllers
        .iter()
        .find(|(_, controller)| controller.hand == ControllerHand::Primary)
    else {
        warn!("Menu opened but no primary controller entity exists");
        return;
    };

    let button_mesh = meshes.add(Cuboid::new(
        MENU_BUTTON_SIZE[0],
        MENU_BUTTON_SIZE[1],
        MENU_BUTTON_SIZE[2],
    ));
    let button_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.2, 0.2, 0.25),
        unlit: true,
        ..default()
    });
    let label_offset = Vec3::Z * (MENU_BUTTON_SIZE[2] * 0.5 + 0.001);

    let handle_mesh = meshes.add(Sphere::new(MENU_SLIDER_HANDLE_SIZE));
    let handle_material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.0, 0.0),
        unlit: true,
        ..default()
    });
    let knob_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.5, 0.5, 1.0),
        ..default()
    });
    let bar_mesh = meshes.add(Cylinder::new(
        MENU_SLIDER_BAR_RADIUS,
        2.0 * MENU_SLIDER_HALF_LENGTH,
    ));
    let bar_material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.27, 0.27),
        unlit: true,
        ..default()
    });

    let help_mesh = meshes.add(Plane3d::new(Vec3::Z, Vec2::splat(0.5)));
    let help_texture = match (menu.help_image(), asset_server) {
        (Some(path), Some(asset_server)) => Some(asset_server.load(path.to_string())),
        (Some(path), None) => {
            debug!("No asset server; help image {} not loaded", path);
            None
        }
        _ => None,
    };
    let help_material = materials.add(StandardMaterial {
        base_color_texture: help_texture,
        unlit: true,
        cull_mode: None,
        ..default()
    });
    let move_speed = viewer.move_speed();

    commands
        .spawn((
            MenuPanel,
            Transform::from_translation(Vec3::from_array(MENU_OFFSET))
                .with_rotation(Quat::from_rotation_x(MENU_TILT))
                .with_scale(Vec3::splat(MENU_SCALE)),
            Visibility::default(),
            ChildOf(primary),
        ))
        .with_children(|panel| {
            panel.spawn((
                LabelSprite::new(menu.title()),
                Transform::from_xyz(0.0, MENU_BUTTON_SPACING, 0.0)
                    .with_scale(Vec3::splat(MENU_TEXT_SCALE)),
                Visibility::default(),
            ));

            for (i, label) in menu.buttons().iter().enumerate() {
                let y = -(i as f32) * MENU_BUTTON_SPACING;
                panel
                    .spawn((
                        Mesh3d(button_mesh.clone()),
                        MeshMaterial3d(button_material.clone()),
                        Transform::from_xyz(0.0, y, 0.0),
                        MenuButton {
                            label: label.clone(),
                        },
                    ))
                    .with_children(|button| {
                        button.spawn((
                            LabelSprite::new(label.clone()),
                            Transform::from_translation(label_offset)
                                .with_scale(Vec3::splat(MENU_TEXT_SCALE)),
                            Visibility::default(),
                        ));
                    });
            }

            panel
                .spawn((
                    MenuSlider,
                    Transform::from_translation(Vec3::from_array(MENU_SLIDER_OFFSET)),
                    Visibility::default(),
                ))
                .with_children(|slider| {
                    slider.spawn((
                        LabelSprite::new(speed_label(move_speed)),
                        MenuSliderLabel,
                        Transform::from_xyz(0.0, MENU_SLIDER_LABEL_HEIGHT, 0.0)
                            .with_scale(Vec3::splat(MENU_TEXT_SCALE)),
                        Visibility::default(),
                    ));
                    for y in [MENU_SLIDER_HALF_LENGTH, -MENU_SLIDER_HALF_LENGTH] {
                        slider.spawn((
                            Mesh3d(handle_mesh.clone()),
                            MeshMaterial3d(handle_material.clone()),
                            Transform::from_xyz(0.0, y, 0.0),
                        ));
                    }
                    slider.spawn((
                        Mesh3d(handle_mesh.clone()),
                        MeshMaterial3d(knob_material.clone()),
                        Transform::from_xyz(0.0, slider_knob_height(move_speed), 0.0),
                        MenuSliderKnob,
                    ));
                    slider.spawn((
                        Mesh3d(bar_mesh.clone()),
                        MeshMaterial3d(bar_material.clone()),
                        Transform::default(),
                    ));
                });

            panel.spawn((
                Mesh3d(help_mesh),
                MeshMaterial3d(help_material),
                Transform::from_translation(Vec3::from_array(MENU_HELP_OFFSET)).with_scale(
                    Vec3::new(MENU_HELP_SIZE[0], MENU_HELP_SIZE[1], 1.0),
                ),
                MenuHelpPanel,
            ));
        });
}

/// Keep the speed slider in step with the viewer move speed.
pub fn update_menu_slider(
    viewer: Res<ViewerState>,
    mut labels: Query<&mut LabelSprite, With<MenuSliderLabel>>,
    mut knobs: Query<&mut Transform, With<MenuSliderKnob>>,
) {
    let move_speed = viewer.move_speed();
    let text = speed_label(move_speed);
    for mut label in &mut labels {
        if label.text != text {
            label.text.clone_from(&text);
        }
    }
    let y = slider_knob_height(move_speed);
    for mut knob in &mut knobs {
        if knob.translation.y != y {
            knob.translation.y = y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_state() {
        let mut menu = MenuState::new(&VrControlsSettings::default());
        assert!(!menu.is_open());
        assert!(menu.toggle());
        assert!(!menu.toggle());
        assert_eq!(menu.buttons(), ["Delete measurements".to_string()]);
    }

    #[test]
    fn knob_height_follows_speed_within_handles() {
        assert_eq!(slider_knob_height(0.0), -MENU_SLIDER_HALF_LENGTH);
        assert_eq!(slider_knob_height(0.5), 0.0);
        assert_eq!(slider_knob_height(40.0), MENU_SLIDER_HALF_LENGTH);
        assert_eq!(slider_knob_height(f32::NAN), -MENU_SLIDER_HALF_LENGTH);
        assert_eq!(speed_label(0.25), "speed: 0.25");
    }

    fn menu_app(move_speed: f32) -> App {
        let mut app = App::new();
        let mut controls = VrControls::default();
        controls.toggle_menu();
        let mut viewer = ViewerState::default();
        viewer.set_move_speed(move_speed);
        app.insert_resource(controls)
            .insert_resource(viewer)
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .add_systems(Update, (update_menu_render, update_menu_slider).chain());
        app.world_mut().spawn((
            XrController {
                hand: ControllerHand::Primary,
            },
            Transform::default(),
        ));
        app.update();
        app
    }

    #[test]
    fn open_menu_has_slider_and_help_panel() {
        let mut app = menu_app(0.25);
        let world = app.world_mut();

        let panel = world
            .query_filtered::<Entity, With<MenuPanel>>()
            .single(world)
            .unwrap();
        let slider_parent = world
            .query_filtered::<&ChildOf, With<MenuSlider>>()
            .single(world)
            .unwrap()
            .parent();
        let help_parent = world
            .query_filtered::<&ChildOf, With<MenuHelpPanel>>()
            .single(world)
            .unwrap()
            .parent();
        assert_eq!(slider_parent, panel);
        assert_eq!(help_parent, panel);

        let label = world
            .query_filtered::<&LabelSprite, With<MenuSliderLabel>>()
            .single(world)
            .unwrap();
        assert_eq!(label.text, "speed: 0.25");
        let buttons = world.query::<&MenuButton>().iter(world).count();
        assert_eq!(buttons, 1);
    }

    #[test]
    fn slider_tracks_move_speed_changes() {
        let mut app = menu_app(0.25);
        app.world_mut().resource_mut::<ViewerState>().set_move_speed(0.5);
        app.update();

        let world = app.world_mut();
        let label = world
            .query_filtered::<&LabelSprite, With<MenuSliderLabel>>()
            .single(world)
            .unwrap();
        assert_eq!(label.text, "speed: 0.50");
        let knob = world
            .query_filtered::<&Transform, With<MenuSliderKnob>>()
            .single(world)
            .unwrap();
        assert_eq!(knob.translation.y, 0.0);
    }

    #[test]
    fn actions_lookup_by_label() {
        let mut world = World::new();
        let noop = world.register_system(|| {});
        let mut actions = MenuActions::default();
        actions.register("Reset", noop);
        assert_eq!(actions.get("Reset"), Some(noop));
        assert_eq!(actions.get("Missing"), None);
    }
}
