//! Rapier adapter for the kart locomotion core.
//!
//! The core only proposes forces and poses. This crate is the glue that lets a
//! Rapier scene answer the core's terrain queries and carry out its commands:
//! - `terrain`: static terrain world + downward ray probe
//! - `body`:    snapshot a `RigidBody` and apply `BodyCommand`s to it
//! - `vehicle`: one kart bound to a body handle, ticked against a terrain world

pub mod body;
pub mod terrain;
pub mod vehicle;

// Re-export Rapier so hosts can build bodies without depending on `rapier3d` directly.
pub use rapier3d;

pub use body::{apply_commands, body_snapshot};
pub use terrain::{ALL_LAYERS, TerrainDef, TerrainShape, TerrainWorld};
pub use vehicle::Vehicle;
