use bevy::prelude::*;

/// Axis aligned extent of a loaded point cloud in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointCloudExtent {
    pub min: Vec3,
    pub max: Vec3,
}

impl PointCloudExtent {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn diagonal(&self) -> f32 {
        self.min.distance(self.max)
    }
}

/// Camera placement pushed to the host view controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SceneView {
    pub position: Vec3,
    pub target: Vec3,
}

/// Host viewer state the controls read from and write to.
#[derive(Resource, Debug, Clone)]
pub struct ViewerState {
    move_speed: f32,
    view: SceneView,
    pub point_clouds: Vec<PointCloudExtent>,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            move_speed: 1.0,
            view: SceneView::default(),
            point_clouds: Vec::new(),
        }
    }
}

impl ViewerState {
    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    pub fn set_move_speed(&mut self, speed: f32) {
        self.move_speed = speed;
    }

    pub fn view(&self) -> SceneView {
        self.view
    }

    pub fn set_view(&mut self, position: Vec3, target: Vec3) {
        self.view = SceneView { position, target };
    }

    /// Longest bounding diagonal among loaded point clouds, zero when none are loaded.
    pub fn max_point_cloud_diagonal(&self) -> f32 {
        self.point_clouds
            .iter()
            .map(PointCloudExtent::diagonal)
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn largest_diagonal_wins() {
        let mut viewer = ViewerState::default();
        assert_eq!(viewer.max_point_cloud_diagonal(), 0.0);
        viewer.point_clouds.push(PointCloudExtent::new(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0)));
        viewer.point_clouds.push(PointCloudExtent::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(viewer.max_point_cloud_diagonal(), 5.0);
    }
}
