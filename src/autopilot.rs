//! Idle/demo mode: the maze plays itself
//!
//! Finds the shortest path of cells to the goal and tilts toward the next
//! cell on it, easing off as the ball closes in. A seeded jitter on the
//! tilt keeps repeated demos from looking identical while staying
//! reproducible.

use std::collections::VecDeque;

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::{InputSample, MazeLayout};

/// Shortest 4-connected path of walkable cells from `from` to the goal
///
/// Includes both ends. `None` when the goal is unreachable or `from` is a wall.
pub fn solve_from(layout: &MazeLayout, from: (usize, usize)) -> Option<Vec<(usize, usize)>> {
    if !layout.is_walkable(from.0, from.1) {
        return None;
    }
    let goal = layout.goal_cell();
    let cols = layout.cols();
    let index = |(row, col): (usize, usize)| row * cols + col;

    let mut came_from: Vec<Option<(usize, usize)>> = vec![None; layout.rows() * cols];
    let mut visited = vec![false; layout.rows() * cols];
    let mut queue = VecDeque::from([from]);
    visited[index(from)] = true;

    while let Some(cell) = queue.pop_front() {
        if cell == goal {
            let mut path = vec![cell];
            let mut current = cell;
            while let Some(prev) = came_from[index(current)] {
                path.push(prev);
                current = prev;
            }
            path.reverse();
            return Some(path);
        }
        let (row, col) = cell;
        let neighbours = [
            row.checked_sub(1).map(|r| (r, col)),
            Some((row + 1, col)),
            col.checked_sub(1).map(|c| (row, c)),
            Some((row, col + 1)),
        ];
        for next in neighbours.into_iter().flatten() {
            if layout.is_walkable(next.0, next.1) && !visited[index(next)] {
                visited[index(next)] = true;
                came_from[index(next)] = Some(cell);
                queue.push_back(next);
            }
        }
    }
    None
}

/// Shortest path from the start cell to the goal
pub fn solve(layout: &MazeLayout) -> Option<Vec<(usize, usize)>> {
    solve_from(layout, layout.start_cell())
}

/// Steering tuning for the autopilot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutopilotParams {
    /// Target rolling speed between cells
    pub cruise_speed: f32,
    /// Desired speed per unit of distance to the waypoint
    pub approach_gain: f32,
    /// sin(tilt) per unit of velocity error
    pub steer_gain: f32,
    /// Maximum random tilt offset (degrees)
    pub jitter_deg: f32,
}

impl Default for AutopilotParams {
    fn default() -> Self {
        Self {
            cruise_speed: 1.0,
            approach_gain: 2.0,
            steer_gain: 1.5,
            jitter_deg: 2.0,
        }
    }
}

/// Produces tilt samples that roll the ball to the goal
#[derive(Debug, Clone)]
pub struct Autopilot {
    params: AutopilotParams,
    path: Vec<(usize, usize)>,
    rng: Pcg32,
}

impl Autopilot {
    pub fn new(layout: &MazeLayout, seed: u64) -> Option<Self> {
        Self::with_params(layout, seed, AutopilotParams::default())
    }

    pub fn with_params(layout: &MazeLayout, seed: u64, params: AutopilotParams) -> Option<Self> {
        let path = solve(layout)?;
        Some(Self {
            params,
            path,
            rng: Pcg32::seed_from_u64(seed),
        })
    }

    /// The route currently being followed
    pub fn path(&self) -> &[(usize, usize)] {
        &self.path
    }

    /// Next tilt reading for a ball at `position` moving at `velocity`
    pub fn steer(&mut self, layout: &MazeLayout, position: Vec3, velocity: Vec3) -> InputSample {
        let level = InputSample::Tilt {
            beta: 0.0,
            gamma: 0.0,
        };
        let Some(cell) = layout.world_to_cell(position) else {
            return level;
        };

        // Knocked off the route: plan again from here
        if !self.path.contains(&cell) {
            match solve_from(layout, cell) {
                Some(path) => {
                    log::debug!("Autopilot replanned from {cell:?}");
                    self.path = path;
                }
                None => return level,
            }
        }

        let step = self.path.iter().position(|&c| c == cell).unwrap_or(0);
        let (row, col) = self.path[(step + 1).min(self.path.len() - 1)];
        let target = layout.cell_to_world(row, col);

        let to_target = Vec2::new(target.x - position.x, target.z - position.z);
        let distance = to_target.length();
        let desired = if distance > 1e-4 {
            to_target / distance
                * (distance * self.params.approach_gain).min(self.params.cruise_speed)
        } else {
            Vec2::ZERO
        };
        let error = desired - Vec2::new(velocity.x, velocity.z);

        let mut gamma = (error.x * self.params.steer_gain).clamp(-1.0, 1.0).asin().to_degrees();
        let mut beta = (error.y * self.params.steer_gain).clamp(-1.0, 1.0).asin().to_degrees();
        if self.params.jitter_deg > 0.0 {
            let jitter = self.params.jitter_deg;
            gamma += self.rng.random_range(-jitter..=jitter);
            beta += self.rng.random_range(-jitter..=jitter);
        }
        InputSample::Tilt { beta, gamma }
    }
}
