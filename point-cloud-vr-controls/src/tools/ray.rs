use bevy::prelude::*;
use constants::render_settings::{RAY_ENDPOINT_SIZE, RAY_LINE_WIDTH};

use super::segment_transform;
use crate::input::controller::{ControllerHand, ControllerState};
use crate::navigation::controls::VrControls;
use crate::scene::setup::VrSceneRoot;
use crate::settings::VrControlsSettings;

/// Ray from the squeezing controller, in VR space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySegment {
    pub origin: Vec3,
    pub end: Vec3,
}

/// Squeeze-armed pointer whose length is steered by a joystick.
#[derive(Debug, Clone)]
pub struct RayPointer {
    squeezing: Option<ControllerHand>,
    ray_length: f32,
    max_ray_length: f32,
    length_step: f32,
    segment: Option<RaySegment>,
}

impl RayPointer {
    pub fn new(settings: &VrControlsSettings) -> Self {
        Self {
            squeezing: None,
            ray_length: settings.initial_ray_length,
            max_ray_length: settings.max_ray_length,
            length_step: settings.ray_length_step,
            segment: None,
        }
    }

    pub fn apply_settings(&mut self, settings: &VrControlsSettings) {
        self.max_ray_length = settings.max_ray_length;
        self.length_step = settings.ray_length_step;
        self.ray_length = self.ray_length.clamp(0.0, self.length_limit());
    }

    /// Upper clamp bound; a negative or NaN maximum collapses to zero.
    fn length_limit(&self) -> f32 {
        self.max_ray_length.max(0.0)
    }

    pub fn is_squeezing(&self) -> bool {
        self.squeezing.is_some()
    }

    pub fn squeezing_controller(&self) -> Option<ControllerHand> {
        self.squeezing
    }

    pub fn ray_length(&self) -> f32 {
        self.ray_length
    }

    pub fn max_ray_length(&self) -> f32 {
        self.max_ray_length
    }

    /// Current ray, `None` while not squeezing.
    pub fn segment(&self) -> Option<RaySegment> {
        self.segment
    }

    pub fn endpoint(&self) -> Option<Vec3> {
        self.segment.map(|s| s.end)
    }

    pub fn squeeze_start(&mut self, hand: ControllerHand) {
        self.squeezing = Some(hand);
    }

    /// Only the squeezing controller can release the ray.
    pub fn squeeze_end(&mut self, hand: ControllerHand) -> bool {
        if self.squeezing != Some(hand) {
            return false;
        }
        self.squeezing = None;
        self.segment = None;
        true
    }

    /// Grow or shrink the ray by one joystick step, clamped to `[0, max]`.
    pub fn adjust_length(&mut self, joystick: f32) {
        if !joystick.is_finite() {
            return;
        }
        self.ray_length =
            (self.ray_length + joystick * self.length_step).clamp(0.0, self.length_limit());
    }

    /// Refresh the ray from the squeezing controller's pose and joystick.
    pub fn update(&mut self, controllers: &[ControllerState; 2]) -> Option<RaySegment> {
        let hand = self.squeezing?;
        self.adjust_length(controllers[hand.index()].ray_axis());
        self.refresh_segment(controllers)
    }

    /// Recompute the segment at the current length without reading the joystick.
    pub fn refresh_segment(&mut self, controllers: &[ControllerState; 2]) -> Option<RaySegment> {
        let hand = self.squeezing?;
        let pose = controllers[hand.index()].pose;
        let segment = RaySegment {
            origin: pose.position,
            end: pose.position + pose.forward() * self.ray_length,
        };
        self.segment = Some(segment);
        Some(segment)
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayVisual {
    Line,
    Endpoint,
}

/// Creates the ray line and endpoint marker on first use, then moves them
/// every frame and hides them while nothing is squeezed.
pub fn update_ray_render(
    mut commands: Commands,
    controls: Res<VrControls>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    roots: Query<Entity, With<VrSceneRoot>>,
    mut visuals: Query<(&RayVisual, &mut Transform, &mut Visibility)>,
) {
    let segment = controls.ray().segment();

    if visuals.is_empty() {
        let Some(segment) = segment else {
            return;
        };
        let Ok(root) = roots.single() else {
            return;
        };

        let line = segment_transform(segment.origin, segment.end).unwrap_or_default();
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(1.0, RAY_LINE_WIDTH, RAY_LINE_WIDTH))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(0.0, 1.0, 0.0),
                unlit: true,
                ..default()
            })),
            line,
            RayVisual::Line,
            ChildOf(root),
        ));
        commands.spawn((
            Mesh3d(meshes.add(Sphere::new(RAY_ENDPOINT_SIZE))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(1.0, 0.0, 0.0),
                emissive: LinearRgba::new(1., 0., 0., 1.),
                unlit: true,
                ..default()
            })),
            Transform::from_translation(segment.end),
            RayVisual::Endpoint,
            ChildOf(root),
        ));
        return;
    }

    for (visual, mut transform, mut visibility) in &mut visuals {
        let Some(segment) = segment else {
            *visibility = Visibility::Hidden;
            continue;
        };
        match visual {
            RayVisual::Line => match segment_transform(segment.origin, segment.end) {
                Some(line) => {
                    *transform = line;
                    *visibility = Visibility::Inherited;
                }
                None => *visibility = Visibility::Hidden,
            },
            RayVisual::Endpoint => {
                transform.translation = segment.end;
                *visibility = Visibility::Inherited;
            }
        }
    }
}
