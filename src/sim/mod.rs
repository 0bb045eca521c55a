//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `tick`/`step`
//! - Stable iteration order (by body handle)
//! - No rendering or platform dependencies

pub mod collision;
pub mod controller;
pub mod goal;
pub mod input;
pub mod maze;
pub mod physics;
pub mod snapshot;
pub mod state;

pub use collision::{
    CollisionResult, sphere_box_collision, sphere_plane_collision, sphere_sphere_collision,
};
pub use controller::GameController;
pub use goal::GoalMonitor;
pub use input::{ControlMode, InputGains, InputMapper, InputSample, Mapped, map_sample};
pub use maze::{Cell, GoalZone, MazeLayout, REFERENCE_MAZE, WallPositions};
pub use physics::{Ball, BallParams, BodyHandle, Material, PhysicsWorld, Shape, StaticBody};
pub use snapshot::{BodyTransform, Snapshot, StaticView};
pub use state::{GameEvent, GamePhase, RespawnTimer};
