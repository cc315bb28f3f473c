use bevy::prelude::*;
use constants::ground::GROUND_SAMPLE_RADIUS;
use constants::navigation::{
    EXTENT_SIZE_MULTIPLIER, FLY_MOVE_FACTOR, MOVE_SPEED_MULTIPLIER, RAY_LENGTH_AXIS,
    ROTATION_SPEED, THUMBSTICK_MOVE_AXIS, THUMBSTICK_TURN_AXIS, TOUCHPAD_MOVE_AXIS,
};
use constants::pointer::{DEFAULT_RAY_LENGTH, MAX_RAY_LENGTH, RAY_LENGTH_STEP};
use serde::Deserialize;
use thiserror::Error;

use crate::input::controller::ControllerHand;

/// Gamepads never report more axes than this.
const MAX_AXIS_INDEX: usize = 7;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to parse VR controls settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid VR controls settings: {0}")]
    Invalid(String),
}

/// Gamepad axis indices read for each gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AxisMapping {
    pub move_axis_touchpad: usize,
    pub move_axis_thumbstick: usize,
    pub turn_axis: usize,
    pub ray_axis: usize,
}

impl Default for AxisMapping {
    fn default() -> Self {
        Self {
            move_axis_touchpad: TOUCHPAD_MOVE_AXIS,
            move_axis_thumbstick: THUMBSTICK_MOVE_AXIS,
            turn_axis: THUMBSTICK_TURN_AXIS,
            ray_axis: RAY_LENGTH_AXIS,
        }
    }
}

impl AxisMapping {
    fn max_index(&self) -> usize {
        self.move_axis_touchpad
            .max(self.move_axis_thumbstick)
            .max(self.turn_axis)
            .max(self.ray_axis)
    }
}

/// Navigation pose applied when a VR session starts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionStart {
    pub position: [f32; 3],
    /// Scene point the navigation node faces, scene +Z up.
    pub look_at: Option<[f32; 3]>,
    pub scale: f32,
}

impl Default for SessionStart {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            look_at: None,
            scale: 1.0,
        }
    }
}

/// Tunables for navigation, pointer, menu and ground sampling.
#[derive(Resource, Asset, TypePath, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VrControlsSettings {
    pub move_factor: f32,
    pub move_speed_multiplier: f32,
    pub extent_size_multiplier: f32,
    pub rotation_speed: f32,
    pub initial_ray_length: f32,
    pub max_ray_length: f32,
    pub ray_length_step: f32,
    pub ground_sample_radius: f32,
    pub ground_mesh: Option<String>,
    pub primary_axes: AxisMapping,
    pub secondary_axes: AxisMapping,
    pub session_start: SessionStart,
    pub menu_title: String,
    pub menu_buttons: Vec<String>,
    /// Controller help image shown beside the menu; `None` draws a blank panel.
    pub menu_help_image: Option<String>,
}

pub const DELETE_MEASUREMENTS: &str = "Delete measurements";

impl Default for VrControlsSettings {
    fn default() -> Self {
        Self {
            move_factor: FLY_MOVE_FACTOR,
            move_speed_multiplier: MOVE_SPEED_MULTIPLIER,
            extent_size_multiplier: EXTENT_SIZE_MULTIPLIER,
            rotation_speed: ROTATION_SPEED,
            initial_ray_length: DEFAULT_RAY_LENGTH,
            max_ray_length: MAX_RAY_LENGTH,
            ray_length_step: RAY_LENGTH_STEP,
            ground_sample_radius: GROUND_SAMPLE_RADIUS,
            ground_mesh: None,
            primary_axes: AxisMapping::default(),
            secondary_axes: AxisMapping::default(),
            session_start: SessionStart::default(),
            menu_title: "VR Menu".to_string(),
            menu_buttons: vec![DELETE_MEASUREMENTS.to_string()],
            menu_help_image: Some("images/vr_controller_help.jpg".to_string()),
        }
    }
}

impl VrControlsSettings {
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.max_ray_length > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "max_ray_length must be positive, got {}",
                self.max_ray_length
            )));
        }
        if !(0.0..=self.max_ray_length).contains(&self.initial_ray_length) {
            return Err(SettingsError::Invalid(format!(
                "initial_ray_length {} outside [0, {}]",
                self.initial_ray_length, self.max_ray_length
            )));
        }
        if !(self.ground_sample_radius > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "ground_sample_radius must be positive, got {}",
                self.ground_sample_radius
            )));
        }
        if !(self.session_start.scale > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "session_start.scale must be positive, got {}",
                self.session_start.scale
            )));
        }
        for hand in ControllerHand::ALL {
            let index = self.axis_mapping(hand).max_index();
            if index > MAX_AXIS_INDEX {
                return Err(SettingsError::Invalid(format!(
                    "{hand:?} axis index {index} exceeds {MAX_AXIS_INDEX}"
                )));
            }
        }
        Ok(())
    }

    pub fn axis_mapping(&self, hand: ControllerHand) -> AxisMapping {
        match hand {
            ControllerHand::Primary => self.primary_axes,
            ControllerHand::Secondary => self.secondary_axes,
        }
    }
}

/// Tracks an optional settings file loaded through the asset server.
#[derive(Resource, Default)]
pub struct SettingsLoader {
    pub path: Option<String>,
    handle: Option<Handle<VrControlsSettings>>,
    applied: bool,
}

impl SettingsLoader {
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..default()
        }
    }
}

/// Load the settings asset once and apply it when it becomes available.
pub fn load_settings_system(
    mut loader: ResMut<SettingsLoader>,
    asset_server: Res<AssetServer>,
    settings_assets: Res<Assets<VrControlsSettings>>,
    mut commands: Commands,
) {
    if loader.applied {
        return;
    }
    let Some(path) = loader.path.clone() else {
        return;
    };

    let Some(handle) = loader.handle.clone() else {
        info!("Loading VR controls settings from: {}", path);
        loader.handle = Some(asset_server.load(path));
        return;
    };

    let Some(loaded) = settings_assets.get(&handle) else {
        return;
    };
    loader.applied = true;

    match loaded.validate() {
        Ok(()) => {
            info!("Applied VR controls settings from {}", path);
            commands.insert_resource(loaded.clone());
        }
        Err(err) => warn!("{err}; keeping previous settings"),
    }
}
