//! Data-driven game balance
//!
//! Defaults reproduce the reference game. A tuning file only needs the
//! fields it overrides; everything else falls back to the defaults.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::TuningError;
use crate::sim::physics::Material;

/// Game balance constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    /// Gravity acceleration (units/s²)
    pub gravity: Vec3,
    /// Height of the floor plane; walls, start and goal sit on it
    pub floor_y: f32,
    /// Floor surface
    pub floor_material: Material,
    /// Wall surface
    pub wall_material: Material,

    // === Ball ===
    pub ball_radius: f32,
    pub ball_mass: f32,
    pub ball_material: Material,
    /// Fraction of linear velocity lost per second
    pub linear_damping: f32,
    /// Fraction of angular velocity lost per second
    pub angular_damping: f32,
    /// Speed cap applied every substep
    pub max_speed: f32,
    /// Largest impulse accepted by a single `apply_impulse` call
    pub max_impulse: f32,
    /// Falling below this height respawns the ball
    pub out_of_bounds_y: f32,

    // === Input ===
    /// Impulse per tick at full (90°) tilt
    pub tilt_sensitivity: f32,
    /// Impulse per input unit of drag movement
    pub drag_scale: f32,

    // === Goal ===
    /// Win-trigger radius around the goal centre
    pub goal_radius: f32,
    /// Delay between a win and the respawn (seconds)
    pub respawn_delay: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.82, 0.0),
            floor_y: 0.0,
            floor_material: Material::new(0.6, 0.1),
            wall_material: Material::new(0.4, 0.3),

            ball_radius: 0.2,
            ball_mass: 1.0,
            ball_material: Material::new(0.4, 0.6),
            linear_damping: 0.01,
            angular_damping: 0.01,
            max_speed: 12.0,
            max_impulse: 1.0,
            out_of_bounds_y: -10.0,

            tilt_sensitivity: 0.02,
            drag_scale: 0.1,

            goal_radius: 0.7,
            respawn_delay: 0.5,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::debug!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        positive("ball_radius", self.ball_radius)?;
        positive("ball_mass", self.ball_mass)?;
        positive("goal_radius", self.goal_radius)?;
        positive("max_speed", self.max_speed)?;
        positive("max_impulse", self.max_impulse)?;
        non_negative("respawn_delay", self.respawn_delay)?;
        unit_interval("linear_damping", self.linear_damping)?;
        unit_interval("angular_damping", self.angular_damping)?;
        non_negative("tilt_sensitivity", self.tilt_sensitivity)?;
        non_negative("drag_scale", self.drag_scale)?;
        if !self.gravity.is_finite() {
            return Err(invalid("gravity", "must be finite"));
        }
        if !self.floor_y.is_finite() {
            return Err(invalid("floor_y", "must be finite"));
        }
        if self.out_of_bounds_y.is_nan() || self.out_of_bounds_y >= self.floor_y {
            return Err(invalid("out_of_bounds_y", "must lie below the floor"));
        }
        for (field, material) in [
            ("floor_material", &self.floor_material),
            ("wall_material", &self.wall_material),
            ("ball_material", &self.ball_material),
        ] {
            if !(material.friction >= 0.0 && material.friction.is_finite()) {
                return Err(invalid(field, "friction must be >= 0"));
            }
            if !(0.0..=1.0).contains(&material.restitution) {
                return Err(invalid(field, "restitution must be within [0, 1]"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> TuningError {
    TuningError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be positive, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, &format!("must not be negative, got {value}")))
    }
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), TuningError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be within [0, 1], got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "goal_radius": 1.25 }"#).unwrap();
        assert_eq!(tuning.goal_radius, 1.25);
        assert_eq!(tuning.ball_radius, 0.2);
        assert_eq!(tuning.respawn_delay, 0.5);
    }

    #[test]
    fn test_json_round_trip() {
        let tuning = Tuning {
            tilt_sensitivity: 0.05,
            ..Default::default()
        };
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Tuning::from_json(r#"{ "ball_radius": 0.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "ball_radius", .. }));

        let err = Tuning::from_json(r#"{ "respawn_delay": -1.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "respawn_delay", .. }));

        let err = Tuning::from_json(r#"{ "ball_material": { "friction": 0.4, "restitution": 1.5 } }"#)
            .unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "ball_material", .. }));
    }

    #[test]
    fn test_out_of_bounds_follows_floor() {
        let raised = Tuning::from_json(r#"{ "floor_y": 3.0, "out_of_bounds_y": 1.0 }"#).unwrap();
        assert_eq!(raised.floor_y, 3.0);

        let err = Tuning::from_json(r#"{ "floor_y": -20.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "out_of_bounds_y", .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Json(_))
        ));
    }
}
