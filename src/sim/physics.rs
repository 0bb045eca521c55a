//! Impulse-based rigid-body world
//!
//! Holds immovable colliders (floor plane, wall boxes) and a single dynamic
//! ball. The ball carries angular velocity so contact friction turns sliding
//! into rolling, the way a real marble in a tilted maze behaves.
//!
//! Determinism: static bodies are resolved in handle order and the substep
//! count is a pure function of `dt`, so identical inputs give identical
//! states.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::collision::{
    CollisionResult, sphere_box_collision, sphere_plane_collision, sphere_sphere_collision,
};
use super::snapshot::BodyTransform;
use crate::consts::{MAX_SUBSTEP_DT, MAX_SUBSTEPS};
use crate::error::PhysicsError;
use crate::tuning::Tuning;

/// Impacts slower than this do not bounce (keeps resting contacts still)
const RESTING_SPEED: f32 = 0.5;

/// Opaque reference to a body; never reused, so a replaced ball's handle goes stale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(u32);

impl BodyHandle {
    pub fn id(self) -> u32 {
        self.0
    }
}

/// Surface parameters of a collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub friction: f32,
    pub restitution: f32,
}

impl Material {
    pub const fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction,
            restitution,
        }
    }

    /// Coefficients for a contact pair (product of both surfaces)
    pub fn combine(self, other: Material) -> Material {
        Material {
            friction: self.friction * other.friction,
            restitution: self.restitution * other.restitution,
        }
    }
}

/// Collision shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Sphere { radius: f32 },
    /// Axis-aligned box
    Box { half_extents: Vec3 },
    /// Infinite plane through the body position
    Plane { normal: Vec3 },
}

impl Shape {
    /// Unit cube (one maze wall)
    pub fn unit_cube() -> Self {
        Shape::Box {
            half_extents: Vec3::splat(crate::consts::WALL_SIZE / 2.0),
        }
    }

    /// Horizontal plane facing up
    pub fn floor() -> Self {
        Shape::Plane { normal: Vec3::Y }
    }
}

/// An immovable collider
#[derive(Debug, Clone)]
pub struct StaticBody {
    pub handle: BodyHandle,
    pub shape: Shape,
    pub position: Vec3,
    pub material: Material,
}

impl StaticBody {
    fn collide(&self, center: Vec3, radius: f32) -> CollisionResult {
        match self.shape {
            Shape::Plane { normal } => sphere_plane_collision(center, radius, self.position, normal),
            Shape::Box { half_extents } => {
                sphere_box_collision(center, radius, self.position, half_extents)
            }
            Shape::Sphere { radius: other } => {
                sphere_sphere_collision(center, radius, self.position, other)
            }
        }
    }
}

/// Physical parameters of the ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallParams {
    pub radius: f32,
    pub mass: f32,
    pub material: Material,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for BallParams {
    fn default() -> Self {
        Self {
            radius: 0.2,
            mass: 1.0,
            material: Material::new(0.4, 0.6),
            linear_damping: 0.01,
            angular_damping: 0.01,
        }
    }
}

/// The dynamic sphere
#[derive(Debug, Clone)]
pub struct Ball {
    pub handle: BodyHandle,
    pub position: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub rotation: Quat,
    pub params: BallParams,
    /// Impulses accumulated since the last step
    pending_impulse: Vec3,
}

impl Ball {
    fn new(handle: BodyHandle, position: Vec3, params: BallParams) -> Self {
        Self {
            handle,
            position,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            params,
            pending_impulse: Vec3::ZERO,
        }
    }

    /// Moment of inertia of a solid sphere
    fn inertia(&self) -> f32 {
        0.4 * self.params.mass * self.params.radius * self.params.radius
    }

    /// Push out of a contact and apply restitution and friction
    fn resolve_contact(&mut self, contact: &CollisionResult, surface: Material) {
        let n = contact.normal;
        self.position += n * contact.penetration;

        let vn = self.velocity.dot(n);
        if vn >= 0.0 {
            // Already separating
            return;
        }

        let pair = self.params.material.combine(surface);
        let restitution = if -vn < RESTING_SPEED {
            0.0
        } else {
            pair.restitution
        };
        let normal_dv = -(1.0 + restitution) * vn;
        self.velocity += n * normal_dv;

        // Slip of the contact point, including spin
        let r = -n * self.params.radius;
        let contact_vel = self.velocity + self.angular_velocity.cross(r);
        let slip = contact_vel - n * contact_vel.dot(n);
        let slip_speed = slip.length();
        if slip_speed < 1e-6 {
            return;
        }
        let tangent = slip / slip_speed;

        // Velocity change that stops the slip entirely (linear + angular response)
        let mass = self.params.mass;
        let inertia = self.inertia();
        let response = 1.0 / mass + self.params.radius * self.params.radius / inertia;
        let stick = slip_speed / response;
        let impulse = stick.min(pair.friction * normal_dv * mass);

        let j = -tangent * impulse;
        self.velocity += j / mass;
        self.angular_velocity += r.cross(j) / inertia;
    }
}

/// Rigid-body world with constant gravity
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    gravity: Vec3,
    ball_params: BallParams,
    max_speed: f32,
    max_impulse: f32,
    /// Sorted by handle
    statics: Vec<StaticBody>,
    ball: Option<Ball>,
    next_id: u32,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::from_tuning(&Tuning::default())
    }
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3, ball_params: BallParams, max_speed: f32, max_impulse: f32) -> Self {
        Self {
            gravity,
            ball_params,
            max_speed,
            max_impulse,
            statics: Vec::new(),
            ball: None,
            next_id: 1,
        }
    }

    pub fn from_tuning(tuning: &Tuning) -> Self {
        let params = BallParams {
            radius: tuning.ball_radius,
            mass: tuning.ball_mass,
            material: tuning.ball_material,
            linear_damping: tuning.linear_damping,
            angular_damping: tuning.angular_damping,
        };
        Self::new(tuning.gravity, params, tuning.max_speed, tuning.max_impulse)
    }

    fn next_handle(&mut self) -> BodyHandle {
        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        handle
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Register an immovable collider
    pub fn add_static_body(&mut self, shape: Shape, position: Vec3, material: Material) -> BodyHandle {
        let shape = match shape {
            Shape::Plane { normal } => Shape::Plane {
                normal: normal.try_normalize().unwrap_or(Vec3::Y),
            },
            other => other,
        };
        let handle = self.next_handle();
        self.statics.push(StaticBody {
            handle,
            shape,
            position,
            material,
        });
        handle
    }

    /// Create the ball, replacing (and invalidating) any existing one
    pub fn spawn_ball(&mut self, position: Vec3) -> BodyHandle {
        let handle = self.next_handle();
        if let Some(old) = self.ball.replace(Ball::new(handle, position, self.ball_params)) {
            log::debug!("Replaced ball {:?} with {:?}", old.handle, handle);
        }
        handle
    }

    pub fn ball(&self) -> Option<&Ball> {
        self.ball.as_ref()
    }

    pub fn ball_handle(&self) -> Option<BodyHandle> {
        self.ball.as_ref().map(|b| b.handle)
    }

    pub fn static_bodies(&self) -> &[StaticBody] {
        &self.statics
    }

    fn is_static(&self, handle: BodyHandle) -> bool {
        self.statics
            .binary_search_by_key(&handle, |b| b.handle)
            .is_ok()
    }

    fn ball_mut(&mut self, handle: BodyHandle) -> Result<&mut Ball, PhysicsError> {
        if self.is_static(handle) {
            return Err(PhysicsError::NotDynamic(handle));
        }
        match self.ball.as_mut() {
            Some(ball) if ball.handle == handle => Ok(ball),
            _ => Err(PhysicsError::UnknownBody(handle)),
        }
    }

    /// Queue an instantaneous impulse; calls within one step add up
    ///
    /// Each impulse is clamped to the configured maximum magnitude.
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) -> Result<(), PhysicsError> {
        let max_impulse = self.max_impulse;
        let ball = self.ball_mut(handle)?;
        if !impulse.is_finite() {
            log::warn!("Ignoring non-finite impulse {impulse:?}");
            return Ok(());
        }
        ball.pending_impulse += impulse.clamp_length_max(max_impulse);
        Ok(())
    }

    /// Hard-reset the ball's kinematic state
    pub fn set_body_state(
        &mut self,
        handle: BodyHandle,
        position: Vec3,
        velocity: Vec3,
    ) -> Result<(), PhysicsError> {
        let ball = self.ball_mut(handle)?;
        ball.position = position;
        ball.velocity = velocity;
        ball.angular_velocity = Vec3::ZERO;
        ball.rotation = Quat::IDENTITY;
        ball.pending_impulse = Vec3::ZERO;
        Ok(())
    }

    pub fn body_position(&self, handle: BodyHandle) -> Result<Vec3, PhysicsError> {
        if let Some(ball) = self.ball.as_ref().filter(|b| b.handle == handle) {
            return Ok(ball.position);
        }
        self.statics
            .binary_search_by_key(&handle, |b| b.handle)
            .map(|i| self.statics[i].position)
            .map_err(|_| PhysicsError::UnknownBody(handle))
    }

    pub fn body_velocity(&self, handle: BodyHandle) -> Result<Vec3, PhysicsError> {
        if let Some(ball) = self.ball.as_ref().filter(|b| b.handle == handle) {
            return Ok(ball.velocity);
        }
        if self.is_static(handle) {
            return Ok(Vec3::ZERO);
        }
        Err(PhysicsError::UnknownBody(handle))
    }

    /// Current ball transform, if a ball exists
    pub fn ball_transform(&self) -> Option<BodyTransform> {
        self.ball
            .as_ref()
            .map(|b| BodyTransform::new(b.position, b.rotation))
    }

    /// Advance the simulation by `dt` seconds
    ///
    /// `dt` is split into equal substeps no longer than [`MAX_SUBSTEP_DT`];
    /// time beyond [`MAX_SUBSTEPS`] substeps is dropped.
    pub fn step(&mut self, dt: f32) {
        if !(dt > 0.0 && dt.is_finite()) {
            return;
        }
        let Some(ball) = self.ball.as_mut() else {
            return;
        };

        let substeps = ((dt / MAX_SUBSTEP_DT).ceil() as u32).clamp(1, MAX_SUBSTEPS);
        let h = (dt / substeps as f32).min(MAX_SUBSTEP_DT);

        ball.velocity += ball.pending_impulse / ball.params.mass;
        ball.pending_impulse = Vec3::ZERO;

        for _ in 0..substeps {
            ball.velocity += self.gravity * h;
            ball.velocity *= (1.0 - ball.params.linear_damping).powf(h);
            ball.angular_velocity *= (1.0 - ball.params.angular_damping).powf(h);
            ball.velocity = ball.velocity.clamp_length_max(self.max_speed);

            ball.position += ball.velocity * h;

            for body in &self.statics {
                let contact = body.collide(ball.position, ball.params.radius);
                if contact.hit {
                    ball.resolve_contact(&contact, body.material);
                }
            }

            let spin = ball.angular_velocity * h;
            if spin.length_squared() > 0.0 {
                ball.rotation = (Quat::from_scaled_axis(spin) * ball.rotation).normalize();
            }
        }
    }
}
