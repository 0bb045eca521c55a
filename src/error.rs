//! Typed error model
//!
//! Layout errors abort session start. Physics errors are programmer errors
//! (stale handles) and never reach the player.

use crate::sim::physics::BodyHandle;

/// Why a grid was rejected as a maze layout
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("invalid layout: grid is empty")]
    Empty,
    #[error("invalid layout: row {row} has {found} cells, expected {expected}")]
    NotRectangular {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid layout: expected exactly one start cell, found {0}")]
    StartCount(usize),
    #[error("invalid layout: expected exactly one goal cell, found {0}")]
    GoalCount(usize),
    #[error("invalid layout: unknown cell {token:?} at row {row}, col {col}")]
    UnknownCell { token: String, row: usize, col: usize },
}

/// Failures of handle-based physics operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PhysicsError {
    #[error("unknown body {0:?}")]
    UnknownBody(BodyHandle),
    #[error("body {0:?} is static")]
    NotDynamic(BodyHandle),
}

/// Failures while loading or validating tuning
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failures at the session boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session has ended")]
    SessionClosed,
}

/// Crate-level error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Physics(#[from] PhysicsError),
    #[error(transparent)]
    Tuning(#[from] TuningError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse layout: {0}")]
    LayoutJson(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
