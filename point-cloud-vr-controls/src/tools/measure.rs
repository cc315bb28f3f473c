use bevy::math::DVec3;
use bevy::prelude::*;
use constants::render_settings::{MEASURE_LABEL_SCALE, MEASURE_LINE_WIDTH, MEASURE_POINT_SIZE};

use super::{LabelSprite, segment_transform};
use crate::navigation::controls::VrControls;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementPoint {
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementLine {
    pub start: Vec3,
    pub end: Vec3,
    /// Euclidean length rounded to hundredths.
    pub distance: f32,
}

impl MeasurementLine {
    pub fn midpoint(&self) -> Vec3 {
        (self.start + self.end) * 0.5
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementArea {
    /// Closed outline, first point repeated at the end.
    pub outline: Vec<Vec3>,
    /// Area rounded to hundredths.
    pub area: f32,
    pub centroid: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAnchor {
    Point(usize),
    Line(usize),
    Area,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementLabel {
    pub anchor: LabelAnchor,
    pub position: Vec3,
    pub text: String,
}

pub fn round_hundredths(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Straight line distance rounded to hundredths.
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    round_hundredths(a.distance(b))
}

/// Area of a possibly non-planar polygon from its projections onto the
/// XY, YZ and ZX planes. `None` below three points.
pub fn polygon_area(points: &[Vec3]) -> Option<f32> {
    if points.len() < 3 {
        debug!("Area needs at least 3 points, have {}", points.len());
        return None;
    }

    // Relative to the first vertex so large scene coordinates keep precision.
    let origin = points[0].as_dvec3();
    let (mut xy, mut yz, mut zx) = (0.0f64, 0.0f64, 0.0f64);
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        let a = a.as_dvec3() - origin;
        let b = b.as_dvec3() - origin;
        xy += a.x * b.y - b.x * a.y;
        yz += a.y * b.z - b.y * a.z;
        zx += a.z * b.x - b.z * a.x;
    }
    let (xy, yz, zx) = (xy * 0.5, yz * 0.5, zx * 0.5);
    let area = (xy * xy + yz * yz + zx * zx).sqrt();
    Some(round_hundredths(area as f32))
}

pub fn centroid(points: &[Vec3]) -> Option<Vec3> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(DVec3::ZERO, |acc, p| acc + p.as_dvec3());
    Some((sum / points.len() as f64).as_vec3())
}

/// Ordered measurement points with the lines, area and labels derived from them.
#[derive(Debug, Clone, Default)]
pub struct MeasurementTool {
    points: Vec<MeasurementPoint>,
    lines: Vec<MeasurementLine>,
    area: Option<MeasurementArea>,
    labels: Vec<MeasurementLabel>,
    revision: u64,
}

impl MeasurementTool {
    pub fn points(&self) -> &[MeasurementPoint] {
        &self.points
    }

    pub fn lines(&self) -> &[MeasurementLine] {
        &self.lines
    }

    pub fn area(&self) -> Option<&MeasurementArea> {
        self.area.as_ref()
    }

    pub fn labels(&self) -> &[MeasurementLabel] {
        &self.labels
    }

    /// Bumped on every change so renderers can skip unchanged frames.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Append a scene-space point, connect it to the previous one and
    /// recompute the polygon area once three points exist.
    pub fn add_point(&mut self, position: Vec3) {
        let index = self.points.len();
        self.points.push(MeasurementPoint { position });
        self.labels.push(MeasurementLabel {
            anchor: LabelAnchor::Point(index),
            position,
            text: format!("{:.2}, {:.2}, {:.2}", position.x, position.y, position.z),
        });

        if let [.., previous, last] = self.points.as_slice() {
            let line = MeasurementLine {
                start: previous.position,
                end: last.position,
                distance: distance(previous.position, last.position),
            };
            self.labels.push(MeasurementLabel {
                anchor: LabelAnchor::Line(self.lines.len()),
                position: line.midpoint(),
                text: format!("{:.2} m", line.distance),
            });
            self.lines.push(line);
        }

        self.refresh_area();
        self.revision += 1;
    }

    fn refresh_area(&mut self) {
        self.labels.retain(|label| label.anchor != LabelAnchor::Area);
        self.area = None;

        let positions: Vec<Vec3> = self.points.iter().map(|p| p.position).collect();
        let (Some(area), Some(center)) = (polygon_area(&positions), centroid(&positions)) else {
            return;
        };

        let mut outline = positions;
        outline.push(outline[0]);
        info!("Measured area {:.2} m² over {} points", area, self.points.len());

        self.labels.push(MeasurementLabel {
            anchor: LabelAnchor::Area,
            position: center,
            text: format!("{area:.2} m²"),
        });
        self.area = Some(MeasurementArea {
            outline,
            area,
            centroid: center,
        });
    }

    /// Drop every point, line, area and label.
    pub fn clear(&mut self) {
        self.points.clear();
        self.lines.clear();
        self.area = None;
        self.labels.clear();
        self.revision += 1;
    }
}

#[derive(Component)]
pub struct MeasurementVisual;

/// Rebuilds measurement entities from state whenever the revision changes.
pub fn update_measure_render(
    mut commands: Commands,
    controls: Res<VrControls>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    existing: Query<Entity, With<MeasurementVisual>>,
    mut rendered_revision: Local<Option<u64>>,
) {
    let measurements = controls.measurements();
    if *rendered_revision == Some(measurements.revision()) {
        return;
    }
    *rendered_revision = Some(measurements.revision());

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    let point_material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.0, 0.0),
        emissive: LinearRgba::new(1., 0., 0., 1.),
        unlit: true,
        ..default()
    });
    let line_material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 1.0, 0.2),
        emissive: LinearRgba::new(1., 1., 0.2, 1.),
        unlit: true,
        ..default()
    });
    let area_material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.27, 0.0),
        emissive: LinearRgba::new(1., 0.5, 0., 1.),
        unlit: true,
        ..default()
    });
    let point_mesh = meshes.add(Sphere::new(MEASURE_POINT_SIZE));
    let line_mesh = meshes.add(Cuboid::new(1.0, MEASURE_LINE_WIDTH, MEASURE_LINE_WIDTH));

    for point in measurements.points() {
        commands.spawn((
            Mesh3d(point_mesh.clone()),
            MeshMaterial3d(point_material.clone()),
            Transform::from_translation(point.position),
            MeasurementVisual,
        ));
    }

    for line in measurements.lines() {
        if let Some(transform) = segment_transform(line.start, line.end) {
            commands.spawn((
                Mesh3d(line_mesh.clone()),
                MeshMaterial3d(line_material.clone()),
                transform,
                MeasurementVisual,
            ));
        }
    }

    if let Some(area) = measurements.area() {
        for edge in area.outline.windows(2) {
            if let Some(transform) = segment_transform(edge[0], edge[1]) {
                commands.spawn((
                    Mesh3d(line_mesh.clone()),
                    MeshMaterial3d(area_material.clone()),
                    transform,
                    MeasurementVisual,
                ));
            }
        }
    }

    for label in measurements.labels() {
        commands.spawn((
            LabelSprite::new(label.text.clone()),
            Transform::from_translation(label.position)
                .with_scale(Vec3::splat(MEASURE_LABEL_SCALE)),
            Visibility::default(),
            MeasurementVisual,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_of_3_4_5_triangle() {
        assert_eq!(distance(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0)), 5.00);
    }

    #[test]
    fn unit_square_area() {
        let square = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        assert_eq!(polygon_area(&square), Some(1.00));
    }

    #[test]
    fn tilted_square_area_is_plane_independent() {
        // Unit square standing in the XZ plane, far from the origin.
        let base = Vec3::new(5700.0, 339900.0, 7.0);
        let square = [
            base,
            base + Vec3::new(2.0, 0.0, 0.0),
            base + Vec3::new(2.0, 0.0, 2.0),
            base + Vec3::new(0.0, 0.0, 2.0),
        ];
        assert_eq!(polygon_area(&square), Some(4.00));
    }

    #[test]
    fn area_needs_three_points() {
        assert_eq!(polygon_area(&[Vec3::ZERO, Vec3::X]), None);
    }

    #[test]
    fn lines_and_area_appear_with_enough_points() {
        let mut tool = MeasurementTool::default();
        tool.add_point(Vec3::new(0.0, 0.0, 0.0));
        assert!(tool.lines().is_empty());
        assert!(tool.area().is_none());

        tool.add_point(Vec3::new(3.0, 4.0, 0.0));
        assert_eq!(tool.lines().len(), 1);
        assert_eq!(tool.lines()[0].distance, 5.0);
        assert!(tool.area().is_none());

        tool.add_point(Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(tool.lines().len(), 2);
        let area = tool.area().unwrap();
        assert_eq!(area.area, 6.0);
        assert_eq!(area.outline.len(), 4);
        assert_eq!(area.outline.first(), area.outline.last());
        assert!(area.centroid.abs_diff_eq(Vec3::new(2.0, 4.0 / 3.0, 0.0), 1e-5));
    }

    #[test]
    fn area_label_is_replaced_not_duplicated() {
        let mut tool = MeasurementTool::default();
        for p in [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y] {
            tool.add_point(p);
        }
        let area_labels: Vec<_> = tool
            .labels()
            .iter()
            .filter(|l| l.anchor == LabelAnchor::Area)
            .collect();
        assert_eq!(area_labels.len(), 1);
        assert_eq!(area_labels[0].text, "1.00 m²");
        // 4 point labels, 3 line labels, 1 area label
        assert_eq!(tool.labels().len(), 8);
        assert_eq!(tool.lines()[1].distance, 1.0);
    }

    #[test]
    fn clear_empties_everything() {
        let mut tool = MeasurementTool::default();
        for i in 0..7 {
            tool.add_point(Vec3::new(i as f32, (i * i) as f32, 0.0));
        }
        let before = tool.revision();
        tool.clear();
        assert!(tool.points().is_empty());
        assert!(tool.lines().is_empty());
        assert!(tool.labels().is_empty());
        assert!(tool.area().is_none());
        assert!(tool.revision() > before);
    }
}
