/// Fly mode translation factor applied on top of frame time.
pub const FLY_MOVE_FACTOR: f32 = 1.0;

/// Converts the viewer move speed into the fly mode speed domain.
pub const MOVE_SPEED_MULTIPLIER: f32 = 0.005;

/// Scales the square root of the largest point cloud diagonal.
pub const EXTENT_SIZE_MULTIPLIER: f32 = 1.5;

/// Radians per second at full thumbstick deflection.
pub const ROTATION_SPEED: f32 = 0.5;

/// Controller separation below which rotate/scale ignores the gesture.
pub const MIN_GRAB_SEPARATION: f32 = 1e-4;

/// Smallest current/start grip distance ratio rotate/scale will apply.
pub const MIN_SCALE_RATIO: f32 = 1e-3;

// Gamepad axis layout reported by WebXR style controllers.
/// Forward/back axis on touchpad controllers (2 axes).
pub const TOUCHPAD_MOVE_AXIS: usize = 1;
/// Forward/back axis on thumbstick controllers (4 axes).
pub const THUMBSTICK_MOVE_AXIS: usize = 3;
/// Left/right axis of the thumbstick, only present with 4 axes.
pub const THUMBSTICK_TURN_AXIS: usize = 2;
/// Axis read while squeezing to extend or retract the ray.
pub const RAY_LENGTH_AXIS: usize = 1;
