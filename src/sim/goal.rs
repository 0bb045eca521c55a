//! Goal proximity check
//!
//! Stateless: the game phase is the only debounce. A ball lingering in the
//! zone after a win does not re-signal because the phase is no longer
//! `Playing`.

use glam::Vec3;

use super::maze::GoalZone;
use super::state::GamePhase;
use crate::planar_distance;

pub struct GoalMonitor;

impl GoalMonitor {
    /// True when the ball is inside the goal radius (X-Z plane) while playing
    pub fn check(ball: Vec3, goal_center: Vec3, goal_radius: f32, phase: GamePhase) -> bool {
        phase == GamePhase::Playing && planar_distance(ball, goal_center) < goal_radius
    }

    pub fn check_zone(ball: Vec3, zone: &GoalZone, phase: GamePhase) -> bool {
        Self::check(ball, zone.center, zone.radius, phase)
    }
}
