//! Moving the user through the point cloud scene.
//!
//! The navigation node places VR space inside the Z-up scene. Which
//! interaction mode drives it depends on how many triggers are held:
//!
//! ```text
//! 0 triggers ──> Fly          (thumbsticks move and turn)
//! 1 trigger  ──> Translate    (grab and pull the scene)
//! 2 triggers ──> RotateScale  (two-handed rotate and zoom)
//! ```

/// `VrControls` resource: controller bookkeeping, mode switching and tool state.
pub mod controls;

/// Thumbstick response curves for flying.
pub mod gestures;

/// The three interaction modes and their shared context.
pub mod modes;

/// VR to scene space transform.
pub mod node;
