//! Read-only views handed to the render collaborator

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};

use super::maze::GoalZone;
use super::physics::{BodyHandle, Shape};
use super::state::GamePhase;

/// World transform of a body, laid out for direct upload to an instance buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BodyTransform {
    pub position: [f32; 3],
    /// Rotation quaternion (x, y, z, w)
    pub rotation: [f32; 4],
}

impl BodyTransform {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position: position.to_array(),
            rotation: rotation.to_array(),
        }
    }

    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_array(self.rotation)
    }
}

/// A static collider as the scene builder sees it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticView {
    pub handle: BodyHandle,
    pub shape: Shape,
    pub transform: BodyTransform,
}

/// Per-frame state for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub ball: BodyTransform,
    pub goal: GoalZone,
    pub phase: GamePhase,
    /// Frames ticked since the session started
    pub frame: u64,
    /// Seconds since the ball last spawned
    pub run_time: f32,
}
