//! Input-to-impulse mapping
//!
//! Tilt readings push the ball like a tilted board would; drag gestures push
//! it by how far the pointer moved since the previous event, so steering is
//! velocity-like rather than displacement-like.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::deg_to_rad;
use crate::tuning::Tuning;

/// How the player steers for the whole session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    /// Device orientation (motion permission granted)
    Tilt,
    /// Touch drag fallback
    Drag,
}

/// One raw input reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputSample {
    /// Device orientation in degrees: `beta` about the lateral axis, `gamma`
    /// about the longitudinal axis
    Tilt { beta: f32, gamma: f32 },
    /// Pointer went down
    DragStart { x: f32, y: f32 },
    /// Pointer moved while down
    DragMove { x: f32, y: f32 },
    /// Pointer released
    DragEnd,
}

/// Gains applied by the mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputGains {
    /// Impulse at 90° tilt
    pub tilt: f32,
    /// Impulse per unit of pointer travel
    pub drag: f32,
}

impl Default for InputGains {
    fn default() -> Self {
        Self {
            tilt: 0.02,
            drag: 0.1,
        }
    }
}

impl From<&Tuning> for InputGains {
    fn from(tuning: &Tuning) -> Self {
        Self {
            tilt: tuning.tilt_sensitivity,
            drag: tuning.drag_scale,
        }
    }
}

/// Result of mapping one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mapped {
    pub impulse: Vec3,
    /// Drag reference point to use for the next sample
    pub reference: Option<Vec2>,
}

/// Map one sample to an impulse
///
/// Pure: the previous drag reference goes in, the updated one comes out.
/// Samples that do not belong to `mode` produce no impulse.
pub fn map_sample(
    mode: ControlMode,
    sample: InputSample,
    reference: Option<Vec2>,
    gains: InputGains,
) -> Mapped {
    let idle = Mapped {
        impulse: Vec3::ZERO,
        reference,
    };
    match (mode, sample) {
        (ControlMode::Tilt, InputSample::Tilt { beta, gamma }) => {
            if !(beta.is_finite() && gamma.is_finite()) {
                return idle;
            }
            Mapped {
                impulse: Vec3::new(
                    deg_to_rad(gamma).sin() * gains.tilt,
                    0.0,
                    deg_to_rad(beta).sin() * gains.tilt,
                ),
                reference,
            }
        }
        (ControlMode::Drag, InputSample::DragStart { x, y }) => Mapped {
            impulse: Vec3::ZERO,
            reference: Some(Vec2::new(x, y)),
        },
        (ControlMode::Drag, InputSample::DragMove { x, y }) => {
            let current = Vec2::new(x, y);
            match reference {
                Some(origin) => {
                    let delta = (current - origin) * gains.drag;
                    Mapped {
                        impulse: Vec3::new(delta.x, 0.0, delta.y),
                        reference: Some(current),
                    }
                }
                // Missed the start event: anchor here
                None => Mapped {
                    impulse: Vec3::ZERO,
                    reference: Some(current),
                },
            }
        }
        (ControlMode::Drag, InputSample::DragEnd) => Mapped {
            impulse: Vec3::ZERO,
            reference: None,
        },
        _ => idle,
    }
}

/// Stateful wrapper keeping the drag reference between samples
#[derive(Debug, Clone)]
pub struct InputMapper {
    mode: ControlMode,
    gains: InputGains,
    reference: Option<Vec2>,
}

impl InputMapper {
    pub fn new(mode: ControlMode, gains: InputGains) -> Self {
        Self {
            mode,
            gains,
            reference: None,
        }
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Map a sample, remembering the new drag reference
    pub fn map(&mut self, sample: InputSample) -> Vec3 {
        let mapped = map_sample(self.mode, sample, self.reference, self.gains);
        self.reference = mapped.reference;
        mapped.impulse
    }
}
