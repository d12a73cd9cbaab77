//! Collision and geometry helpers for the arena
//!
//! The arena floor is the XZ plane. Obstacles are vertical prisms, so every
//! movement test is a 2D circle-vs-circle check on their footprint; bullets and
//! spawn spacing use full 3D distances.

use glam::{Vec2, Vec3};

use super::state::Obstacle;
use crate::consts::*;

/// Project a world position onto the floor plane (x, z)
#[inline]
pub fn planar(pos: Vec3) -> Vec2 {
    Vec2::new(pos.x, pos.z)
}

/// Whether two spheres (or circles) overlap
#[inline]
pub fn spheres_overlap(a: Vec3, radius_a: f32, b: Vec3, radius_b: f32) -> bool {
    a.distance(b) < radius_a + radius_b
}

/// Whether two circles on the floor plane overlap
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    a.distance_squared(b) < reach * reach
}

/// Whether a body of `radius` standing at `pos` would intersect any obstacle
pub fn blocked_by_obstacles(pos: Vec2, radius: f32, obstacles: &[Obstacle]) -> bool {
    obstacles
        .iter()
        .any(|ob| circles_overlap(pos, radius, ob.pos, ob.radius))
}

/// Whether `pos` stays at least `margin` away from every arena wall
#[inline]
pub fn inside_arena(pos: Vec2, margin: f32) -> bool {
    (margin..=ARENA_SIZE_X - margin).contains(&pos.x)
        && (margin..=ARENA_SIZE_Z - margin).contains(&pos.y)
}

/// Clamp a body of `radius` so it stays within the arena walls
#[inline]
pub fn clamp_to_arena(pos: Vec3, radius: f32) -> Vec3 {
    Vec3::new(
        pos.x.clamp(radius, ARENA_SIZE_X - radius),
        pos.y,
        pos.z.clamp(radius, ARENA_SIZE_Z - radius),
    )
}

/// Bullets live inside the arena box inflated by their own radius
#[inline]
pub fn in_bullet_bounds(pos: Vec3) -> bool {
    let r = BULLET_RADIUS;
    pos.x > -r
        && pos.x < ARENA_SIZE_X + r
        && pos.y > -r
        && pos.y < WALL_HEIGHT + r
        && pos.z > -r
        && pos.z < ARENA_SIZE_Z + r
}

/// Bullet hit test: the target is scaled up by `HIT_RADIUS_SCALE`
#[inline]
pub fn bullet_hits(bullet: Vec3, target: Vec3, target_radius: f32) -> bool {
    spheres_overlap(bullet, 0.0, target, target_radius * HIT_RADIUS_SCALE)
}
