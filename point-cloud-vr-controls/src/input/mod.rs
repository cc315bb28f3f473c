//! XR input plumbing.

/// Per-controller pose, gamepad and trigger state.
pub mod controller;

/// Components and events the XR backend uses to feed the controls.
pub mod events;
