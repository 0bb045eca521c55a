//! Collision detection for the ball against static shapes
//!
//! Only sphere-vs-{plane, box, sphere} is needed: the ball is the single
//! dynamic body, walls are axis-aligned boxes and the floor is a plane.

use glam::Vec3;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the static surface (if hit)
    pub point: Vec3,
    /// Surface normal at contact, pointing toward the ball centre
    pub normal: Vec3,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
            penetration: 0.0,
        }
    }
}

/// Sphere against an infinite plane through `plane_point` with unit `plane_normal`
///
/// The plane is one-sided: a sphere below it is pushed back to the side
/// the normal points to.
pub fn sphere_plane_collision(
    center: Vec3,
    radius: f32,
    plane_point: Vec3,
    plane_normal: Vec3,
) -> CollisionResult {
    let dist = (center - plane_point).dot(plane_normal);
    if dist >= radius {
        return CollisionResult::miss();
    }
    CollisionResult {
        hit: true,
        point: center - plane_normal * dist,
        normal: plane_normal,
        penetration: radius - dist,
    }
}

/// Sphere against an axis-aligned box
pub fn sphere_box_collision(
    center: Vec3,
    radius: f32,
    box_center: Vec3,
    half_extents: Vec3,
) -> CollisionResult {
    let local = center - box_center;
    let closest = local.clamp(-half_extents, half_extents);
    let delta = local - closest;
    let dist_sq = delta.length_squared();

    if dist_sq > radius * radius {
        return CollisionResult::miss();
    }

    if dist_sq > 1e-12 {
        let dist = dist_sq.sqrt();
        return CollisionResult {
            hit: true,
            point: box_center + closest,
            normal: delta / dist,
            penetration: radius - dist,
        };
    }

    // Centre inside the box (tunnelling case): push out through the nearest face
    let depth = half_extents - local.abs();
    let (axis, face_depth) = if depth.x <= depth.y && depth.x <= depth.z {
        (Vec3::X, depth.x)
    } else if depth.y <= depth.z {
        (Vec3::Y, depth.y)
    } else {
        (Vec3::Z, depth.z)
    };
    let sign = if local.dot(axis) < 0.0 { -1.0 } else { 1.0 };
    let normal = axis * sign;
    CollisionResult {
        hit: true,
        point: center + normal * face_depth,
        normal,
        penetration: face_depth + radius,
    }
}

/// Sphere against a static sphere
pub fn sphere_sphere_collision(
    center: Vec3,
    radius: f32,
    other_center: Vec3,
    other_radius: f32,
) -> CollisionResult {
    let delta = center - other_center;
    let reach = radius + other_radius;
    let dist_sq = delta.length_squared();
    if dist_sq >= reach * reach {
        return CollisionResult::miss();
    }
    let dist = dist_sq.sqrt();
    // Concentric spheres: separate upward
    let normal = if dist > 1e-6 { delta / dist } else { Vec3::Y };
    CollisionResult {
        hit: true,
        point: other_center + normal * other_radius,
        normal,
        penetration: reach - dist,
    }
}
