use bevy::prelude::*;
use constants::coordinate_system::lower_by_height_offset;
use constants::render_settings::{
    CONTROLLER_LIGHT_INTENSITY, CONTROLLER_LIGHT_POSITION, CONTROLLER_MARKER_SIZE,
    CONTROLLER_POINTER_END, CONTROLLER_POINTER_START, CONTROLLER_POINTER_WIDTH, DEBUG_LABEL_SCALE,
    MEASURE_LINE_WIDTH,
};

use crate::input::controller::ControllerHand;
use crate::input::events::{XrController, XrControllerGrip};
use crate::navigation::controls::VrControls;
use crate::navigation::node::NavigationNode;
use crate::tools::{LabelSprite, segment_transform};

/// Parent of everything living in VR space. Its `Transform` follows the
/// navigation node, so children given VR coordinates land in the scene.
#[derive(Component, Debug, Default)]
pub struct VrSceneRoot;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDebugVisual {
    Line,
    Label,
}

/// Transform placing VR space into the scene, including the height calibration.
pub fn scene_root_transform(node: &NavigationNode) -> Transform {
    let mut transform = node.to_transform();
    transform.translation = lower_by_height_offset(node.position, node.uniform_scale());
    transform
}

/// Spawn the VR root with both controllers and grips below it.
pub fn spawn_vr_rig(mut commands: Commands) {
    commands
        .spawn((
            VrSceneRoot,
            Name::new("VR scene root"),
            Transform::default(),
            Visibility::default(),
        ))
        .with_children(|root| {
            for hand in ControllerHand::ALL {
                root.spawn((
                    XrController { hand },
                    Name::new(format!("{hand:?} controller")),
                    Transform::default(),
                    Visibility::default(),
                ));
                root.spawn((
                    XrControllerGrip { hand },
                    Name::new(format!("{hand:?} grip")),
                    Transform::default(),
                    Visibility::default(),
                ));
            }
        });
    info!("Spawned VR rig");
}

/// Marker sphere and pointer stub on each controller, plus the rig light.
pub fn spawn_rig_visuals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    roots: Query<Entity, With<VrSceneRoot>>,
    controllers: Query<Entity, With<XrController>>,
) {
    let Ok(root) = roots.single() else {
        warn!("No VR scene root; skipping rig visuals");
        return;
    };

    let marker_mesh = meshes.add(Sphere::new(CONTROLLER_MARKER_SIZE));
    let marker_material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.0, 0.0),
        unlit: true,
        ..default()
    });
    let pointer_mesh = meshes.add(Cuboid::new(
        CONTROLLER_POINTER_WIDTH,
        CONTROLLER_POINTER_WIDTH,
        CONTROLLER_POINTER_END - CONTROLLER_POINTER_START,
    ));
    let pointer_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.0, 1.0, 0.0),
        unlit: true,
        ..default()
    });
    let pointer_center = (CONTROLLER_POINTER_START + CONTROLLER_POINTER_END) * 0.5;

    for controller in &controllers {
        commands.entity(controller).with_children(|parent| {
            parent.spawn((
                Mesh3d(marker_mesh.clone()),
                MeshMaterial3d(marker_material.clone()),
                Transform::default(),
            ));
            parent.spawn((
                Mesh3d(pointer_mesh.clone()),
                MeshMaterial3d(pointer_material.clone()),
                Transform::from_xyz(0.0, 0.0, pointer_center),
            ));
        });
    }

    commands.spawn((
        PointLight {
            intensity: CONTROLLER_LIGHT_INTENSITY,
            ..default()
        },
        Transform::from_translation(Vec3::from_array(CONTROLLER_LIGHT_POSITION)),
        ChildOf(root),
    ));
}

pub fn sync_scene_root(
    controls: Res<VrControls>,
    mut roots: Query<&mut Transform, With<VrSceneRoot>>,
) {
    let target = scene_root_transform(controls.node());
    for mut transform in &mut roots {
        if *transform != target {
            *transform = target;
        }
    }
}

/// Line between both controllers with the current scale ratio while rotating/scaling.
pub fn update_scale_debug_render(
    mut commands: Commands,
    controls: Res<VrControls>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    roots: Query<Entity, With<VrSceneRoot>>,
    mut visuals: Query<(
        &ScaleDebugVisual,
        &mut Transform,
        &mut Visibility,
        Option<&mut LabelSprite>,
    )>,
) {
    let debug = controls.rotate_scale_debug();

    if visuals.is_empty() {
        let Some(debug) = debug else {
            return;
        };
        let Ok(root) = roots.single() else {
            return;
        };
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(1.0, MEASURE_LINE_WIDTH, MEASURE_LINE_WIDTH))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(1.0, 1.0, 1.0),
                unlit: true,
                ..default()
            })),
            segment_transform(debug.from, debug.to).unwrap_or_default(),
            ScaleDebugVisual::Line,
            ChildOf(root),
        ));
        commands.spawn((
            LabelSprite::new(debug.text.clone()),
            Transform::from_translation(debug.center).with_scale(Vec3::splat(DEBUG_LABEL_SCALE)),
            Visibility::default(),
            ScaleDebugVisual::Label,
            ChildOf(root),
        ));
        return;
    }

    for (visual, mut transform, mut visibility, label) in &mut visuals {
        let Some(debug) = debug else {
            *visibility = Visibility::Hidden;
            continue;
        };
        match visual {
            ScaleDebugVisual::Line => match segment_transform(debug.from, debug.to) {
                Some(line) => {
                    *transform = line;
                    *visibility = Visibility::Inherited;
                }
                None => *visibility = Visibility::Hidden,
            },
            ScaleDebugVisual::Label => {
                transform.translation = debug.center;
                *visibility = Visibility::Inherited;
                if let Some(mut label) = label {
                    if label.text != debug.text {
                        label.text.clone_from(&debug.text);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_transform_includes_height_offset() {
        let node = NavigationNode {
            position: Vec3::new(10.0, 20.0, 5.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(2.0),
        };
        let root = scene_root_transform(&node);
        let vr_point = Vec3::new(0.5, 1.0, -2.0);
        assert!(
            root.transform_point(vr_point)
                .abs_diff_eq(node.to_scene_calibrated(vr_point), 1e-4)
        );
    }

    #[test]
    fn rig_has_two_controllers_and_grips() {
        let mut app = App::new();
        app.add_systems(Startup, spawn_vr_rig);
        app.update();

        let world = app.world_mut();
        let roots = world
            .query_filtered::<Entity, With<VrSceneRoot>>()
            .iter(world)
            .count();
        let controllers = world.query::<&XrController>().iter(world).count();
        let grips = world.query::<&XrControllerGrip>().iter(world).count();
        assert_eq!((roots, controllers, grips), (1, 2, 2));
    }
}
