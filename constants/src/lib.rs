//! Shared tuning constants for the VR controls workspace.

pub mod coordinate_system;
pub mod ground;
pub mod navigation;
pub mod pointer;
pub mod render_settings;
