//! Game phase, events and the respawn timer

use serde::{Deserialize, Serialize};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball is steerable
    #[default]
    Playing,
    /// Goal reached; waiting for the respawn
    Won,
}

/// One-shot notifications for the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// The ball reached the goal; `elapsed` is seconds since it last spawned
    Won { elapsed: f32 },
    /// The ball was put back at the start after a win
    Respawned,
    /// The ball fell out of the world and was put back at the start
    OutOfBounds,
}

/// Cancellable one-shot countdown driven by simulated time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RespawnTimer {
    remaining: Option<f32>,
}

impl RespawnTimer {
    /// Arm the timer; re-arming replaces a pending countdown
    pub fn start(&mut self, delay: f32) {
        self.remaining = Some(delay.max(0.0));
    }

    pub fn is_pending(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    /// Disarm without firing; returns whether a countdown was pending
    pub fn cancel(&mut self) -> bool {
        self.remaining.take().is_some()
    }

    /// Advance by `dt`; returns true exactly once, when the countdown ends
    pub fn advance(&mut self, dt: f32) -> bool {
        match self.remaining.as_mut() {
            Some(remaining) => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    self.remaining = None;
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }
}
