//! VR input handling for the point cloud viewer.
//!
//! Turns XR controller events and poses into navigation through a Z-up point
//! cloud scene, plus a squeeze-armed measuring ray and a controller menu.
//!
//! ## Frame flow
//!
//! ```text
//! XrSessionEvent / XrInputEvent / tracked Transforms
//!   └─> VrControlsSet::Input       (poses, triggers, squeezes, menu actions)
//!       └─> VrControlsSet::Navigation  (ray refresh, active mode update, rig root)
//!           └─> VrControlsSet::Render  (ray, measurements, menu, scale readout)
//! ```
//!
//! `VrControls` holds all state and can be driven without an `App`; the
//! plugin only wires it to ECS events, components and the host's
//! `ViewerState`.

pub mod input;
pub mod navigation;
pub mod scene;
pub mod settings;
pub mod tools;
pub mod viewer;

use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

use input::events::{
    XrInputEvent, XrSessionEvent, process_session_events, process_xr_input_events,
    sync_tracked_poses,
};
use navigation::controls::{VrControls, apply_settings_changes, update_vr_controls};
use scene::ground::{GroundHeightMap, build_ground_index, request_ground_mesh};
use scene::setup::{spawn_rig_visuals, spawn_vr_rig, sync_scene_root, update_scale_debug_render};
use settings::{DELETE_MEASUREMENTS, SettingsLoader, VrControlsSettings, load_settings_system};
use tools::measure::update_measure_render;
use tools::menu::{
    MenuActions, MenuButtonPressed, delete_measurements, dispatch_menu_actions,
    update_menu_render, update_menu_slider,
};
use tools::ray::update_ray_render;
use viewer::ViewerState;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VrControlsSet {
    Input,
    Navigation,
    Render,
}

pub struct VrControlsPlugin {
    /// Optional `*.vrcontrols.json` asset applied once it loads.
    pub settings_path: Option<String>,
    /// Spawn meshes for the ray, measurements, menu and controllers.
    /// Disable for headless apps without render assets.
    pub visuals: bool,
}

impl Default for VrControlsPlugin {
    fn default() -> Self {
        Self {
            settings_path: None,
            visuals: true,
        }
    }
}

impl Plugin for VrControlsPlugin {
    fn build(&self, app: &mut App) {
        let settings = app
            .world()
            .get_resource::<VrControlsSettings>()
            .cloned()
            .unwrap_or_default();
        let settings = match settings.validate() {
            Ok(()) => settings,
            Err(err) => {
                warn!("{err}; VR controls fall back to default settings");
                VrControlsSettings::default()
            }
        };

        let delete_system = app.world_mut().register_system(delete_measurements);
        let mut actions = MenuActions::default();
        actions.register(DELETE_MEASUREMENTS, delete_system);

        app.insert_resource(VrControls::new(&settings))
            .insert_resource(settings)
            .insert_resource(actions)
            .init_resource::<ViewerState>()
            .init_resource::<GroundHeightMap>()
            .add_event::<XrInputEvent>()
            .add_event::<XrSessionEvent>()
            .add_event::<MenuButtonPressed>()
            .configure_sets(
                Update,
                (
                    VrControlsSet::Input,
                    VrControlsSet::Navigation,
                    VrControlsSet::Render,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    apply_settings_changes,
                    process_session_events,
                    sync_tracked_poses,
                    process_xr_input_events,
                    dispatch_menu_actions,
                )
                    .chain()
                    .in_set(VrControlsSet::Input),
            )
            .add_systems(
                Update,
                (update_vr_controls, sync_scene_root)
                    .chain()
                    .in_set(VrControlsSet::Navigation),
            )
            .add_systems(Update, (request_ground_mesh, build_ground_index).chain());

        if let Some(path) = &self.settings_path {
            app.add_plugins(JsonAssetPlugin::<VrControlsSettings>::new(&["vrcontrols.json"]))
                .insert_resource(SettingsLoader::from_path(path.clone()))
                .add_systems(
                    Update,
                    load_settings_system
                        .before(apply_settings_changes)
                        .in_set(VrControlsSet::Input),
                );
        }

        if self.visuals {
            app.add_systems(Startup, (spawn_vr_rig, spawn_rig_visuals).chain())
                .add_systems(
                    Update,
                    (
                        update_ray_render,
                        update_measure_render,
                        (update_menu_render, update_menu_slider).chain(),
                        update_scale_debug_render,
                    )
                        .in_set(VrControlsSet::Render),
                );
        } else {
            app.add_systems(Startup, spawn_vr_rig);
        }
    }
}
