/// Radius (scene units) used when averaging ground vertex heights.
pub const GROUND_SAMPLE_RADIUS: f32 = 1.0;

/// Height reported when no ground vertex lies inside the sample radius.
pub const GROUND_FALLBACK_HEIGHT: f32 = 0.0;
