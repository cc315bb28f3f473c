//! Scene graph setup and terrain queries.
//!
//! Spawns the VR rig (root, controllers, grips, light) and keeps the rig
//! root aligned with the navigation node. Ground height sampling works off
//! an optional ground mesh.

/// Ground height lookup from mesh vertices.
pub mod ground;

/// VR rig spawning and per-frame transform sync.
pub mod setup;
