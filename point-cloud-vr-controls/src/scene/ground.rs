use std::collections::HashMap;

use bevy::prelude::*;
use bevy::render::mesh::VertexAttributeValues;
use constants::ground::GROUND_FALLBACK_HEIGHT;

use crate::settings::VrControlsSettings;

/// Ground vertices bucketed on a uniform X/Y grid for radius queries.
/// Built once, queried many times.
#[derive(Debug, Clone)]
pub struct GroundHeightIndex {
    radius: f32,
    cells: HashMap<(i64, i64), Vec<Vec3>>,
    vertex_count: usize,
}

impl GroundHeightIndex {
    pub fn build(vertices: impl IntoIterator<Item = Vec3>, radius: f32) -> Self {
        let radius = radius.max(f32::EPSILON);
        let mut cells: HashMap<(i64, i64), Vec<Vec3>> = HashMap::new();
        let mut vertex_count = 0;
        for vertex in vertices {
            if !vertex.is_finite() {
                continue;
            }
            cells
                .entry(Self::cell_of(vertex.x, vertex.y, radius))
                .or_default()
                .push(vertex);
            vertex_count += 1;
        }
        Self {
            radius,
            cells,
            vertex_count,
        }
    }

    /// Float to int casts saturate, so extreme coordinates share the edge cells.
    fn cell_of(x: f32, y: f32, cell_size: f32) -> (i64, i64) {
        (
            (x as f64 / cell_size as f64).floor() as i64,
            (y as f64 / cell_size as f64).floor() as i64,
        )
    }

    pub fn len(&self) -> usize {
        self.vertex_count
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Mean Z of every vertex within the radius of (x, y); 0 when none are close.
    pub fn ground_height(&self, x: f32, y: f32) -> f32 {
        if !x.is_finite() || !y.is_finite() {
            return GROUND_FALLBACK_HEIGHT;
        }
        let (cx, cy) = Self::cell_of(x, y, self.radius);
        let query = Vec2::new(x, y);
        let radius_sq = self.radius * self.radius;

        let mut sum = 0.0f64;
        let mut count = 0usize;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let key = (cx.saturating_add(dx), cy.saturating_add(dy));
                let Some(cell) = self.cells.get(&key) else {
                    continue;
                };
                for vertex in cell {
                    if vertex.truncate().distance_squared(query) <= radius_sq {
                        sum += vertex.z as f64;
                        count += 1;
                    }
                }
            }
        }

        if count == 0 {
            return GROUND_FALLBACK_HEIGHT;
        }
        (sum / count as f64) as f32
    }
}

/// Ground mesh handle and its height index once the mesh has loaded.
#[derive(Resource, Default)]
pub struct GroundHeightMap {
    pub mesh: Option<Handle<Mesh>>,
    index: Option<GroundHeightIndex>,
}

impl GroundHeightMap {
    pub fn from_vertices(vertices: impl IntoIterator<Item = Vec3>, radius: f32) -> Self {
        Self {
            mesh: None,
            index: Some(GroundHeightIndex::build(vertices, radius)),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<&GroundHeightIndex> {
        self.index.as_ref()
    }

    /// Height under (x, y); 0 until the ground mesh has been indexed.
    pub fn ground_height(&self, x: f32, y: f32) -> f32 {
        self.index
            .as_ref()
            .map(|index| index.ground_height(x, y))
            .unwrap_or(GROUND_FALLBACK_HEIGHT)
    }
}

/// Vertex positions of a mesh, if it stores them as `Float32x3`.
pub fn mesh_positions(mesh: &Mesh) -> Option<Vec<Vec3>> {
    match mesh.attribute(Mesh::ATTRIBUTE_POSITION)? {
        VertexAttributeValues::Float32x3(positions) => {
            Some(positions.iter().copied().map(Vec3::from_array).collect())
        }
        _ => None,
    }
}

/// Starts loading the configured ground mesh.
pub fn request_ground_mesh(
    settings: Res<VrControlsSettings>,
    asset_server: Option<Res<AssetServer>>,
    mut ground: ResMut<GroundHeightMap>,
) {
    if ground.mesh.is_some() || ground.is_ready() {
        return;
    }
    let (Some(path), Some(asset_server)) = (settings.ground_mesh.as_ref(), asset_server) else {
        return;
    };
    info!("Loading ground mesh from: {}", path);
    ground.mesh = Some(asset_server.load(path.clone()));
}

/// Builds the height index the first frame the ground mesh is available.
pub fn build_ground_index(
    settings: Res<VrControlsSettings>,
    meshes: Option<Res<Assets<Mesh>>>,
    mut ground: ResMut<GroundHeightMap>,
) {
    if ground.is_ready() {
        return;
    }
    let (Some(handle), Some(meshes)) = (ground.mesh.as_ref(), meshes) else {
        return;
    };
    let Some(mesh) = meshes.get(handle) else {
        return;
    };

    match mesh_positions(mesh) {
        Some(positions) => {
            let index = GroundHeightIndex::build(positions, settings.ground_sample_radius);
            info!("Indexed {} ground vertices", index.len());
            ground.index = Some(index);
        }
        None => {
            warn!("Ground mesh has no Float32x3 positions; ground height stays 0");
            ground.index = Some(GroundHeightIndex::build(Vec::new(), settings.ground_sample_radius));
        }
    }
}
