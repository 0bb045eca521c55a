//! Tilt Maze - physics core for a tilt-controlled ball labyrinth
//!
//! Core modules:
//! - `sim`: Deterministic simulation (maze, physics, input, goal, controller)
//! - `session`: Session-scoped input channel and frame pacing
//! - `tuning`: Data-driven game balance
//! - `autopilot`: Demo driver that solves the maze by itself

pub mod autopilot;
pub mod error;
pub mod session;
pub mod sim;
pub mod tuning;

pub use error::{Error, Result};
pub use session::{InputSender, Session};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Longest physics substep (120 Hz keeps the ball from tunnelling walls)
    pub const MAX_SUBSTEP_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per step to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta accepted from the host
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Wall cells are unit cubes
    pub const WALL_SIZE: f32 = 1.0;
    /// Height of wall centres above the floor
    pub const WALL_CENTER_Y: f32 = 0.5;
    /// Height the ball spawns at (it drops onto the floor)
    pub const SPAWN_HEIGHT: f32 = 1.0;
}

/// Planar (X-Z) distance between two world positions
#[inline]
pub fn planar_distance(a: glam::Vec3, b: glam::Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

/// Degrees to radians for sensor angles
#[inline]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}
