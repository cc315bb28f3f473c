/// Ray length when the controls are created.
pub const DEFAULT_RAY_LENGTH: f32 = 2.0;

/// Upper clamp for the ray length.
pub const MAX_RAY_LENGTH: f32 = 10.0;

/// Ray length change per frame at full joystick deflection.
pub const RAY_LENGTH_STEP: f32 = 0.1;
