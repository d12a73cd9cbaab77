//! Arena Doom - a wave-based arena shooter
//!
//! Core modules:
//! - `sim`: Simulation (entities, spawning, perks, per-frame physics)
//! - `game`: Screen and level state machine driven by the host frame loop
//! - `highscores`: In-memory top-three hall of fame
//! - `settings`: Player-facing configuration

pub mod error;
pub mod game;
pub mod highscores;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use game::{Game, Hud, Screen, UiAction};
pub use highscores::HighScores;
pub use settings::Settings;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Largest step the frame driver may hand to the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Step used when the measured delta is zero or negative
    pub const FALLBACK_FRAME_DT: f32 = 1.0 / 60.0;

    /// Number of levels; the last one is the final boss level
    pub const MAX_LEVELS: u32 = 10;

    /// Arena footprint (x, z) and wall height
    pub const ARENA_SIZE_X: f32 = 100.0;
    pub const ARENA_SIZE_Z: f32 = 100.0;
    pub const WALL_HEIGHT: f32 = 8.0;

    /// Player body
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const PLAYER_TOTAL_HEIGHT: f32 = 1.8;
    pub const PLAYER_BODY_Y_OFFSET: f32 = PLAYER_TOTAL_HEIGHT / 2.0;
    pub const PLAYER_RADIUS: f32 = 0.5;
    pub const PLAYER_MAX_HEALTH: i32 = 100;
    /// Player may not get closer than this to the arena walls
    pub const PLAYER_WALL_MARGIN: f32 = PLAYER_RADIUS + 0.5;

    /// Player model proportions (used to place the gun tip)
    pub const PLAYER_LEG_LENGTH: f32 = PLAYER_TOTAL_HEIGHT * 0.45;
    pub const PLAYER_TORSO_HEIGHT: f32 = PLAYER_TOTAL_HEIGHT * 0.4;
    pub const PLAYER_GUN_LENGTH: f32 = PLAYER_TOTAL_HEIGHT * 0.3;
    pub const PLAYER_GUN_BASE_OFFSET: f32 = PLAYER_TOTAL_HEIGHT * 0.35;

    /// Shooting
    pub const PLAYER_BASE_SHOOT_COOLDOWN: f32 = 0.3;
    pub const PLAYER_RAPID_FIRE_COOLDOWN: f32 = 0.001;

    /// Bullets
    pub const BULLET_SPEED: f32 = 30.0;
    pub const BULLET_RADIUS: f32 = 0.1;
    pub const BULLET_LIFESPAN: f32 = 2.5;
    /// Lifespans at or below this count as spent (absorbs f32 countdown drift)
    pub const BULLET_EXPIRY_EPSILON: f32 = 1e-4;
    /// Hits register inside this multiple of the target radius
    pub const HIT_RADIUS_SCALE: f32 = 1.5;

    /// Enemies
    pub const ENEMY_MIN_DISTANCE_FROM_PLAYER: f32 = 3.5;
    pub const ENEMY_BASE_COLLISION_RADIUS: f32 = 0.6;
    pub const ENEMY_FIRE_RANGE: f32 = 30.0;

    /// Perks
    pub const PERK_SCORE_MULTIPLIER_DURATION: f32 = 5.0;
    pub const PERK_RAPID_FIRE_DURATION: f32 = 5.0;

    /// Auto-fire assist
    pub const CHEAT_SHOOT_INTERVAL: f32 = 0.18;
    pub const CHEAT_TURN_SPEED_DEG: f32 = 180.0;

    /// Level/death overlay duration (seconds)
    pub const TRANSITION_DURATION: f32 = 1.5;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Horizontal unit vector for a yaw measured from +Z toward +X
#[inline]
pub fn yaw_forward(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Yaw (from +Z toward +X) that faces along the planar offset `(dx, dz)`
#[inline]
pub fn yaw_toward(dx: f32, dz: f32) -> f32 {
    dx.atan2(dz)
}

/// Apply the frame-driver policy to a measured delta: stalls are capped at
/// `MAX_FRAME_DT`, degenerate deltas become `FALLBACK_FRAME_DT`.
#[inline]
pub fn clamp_frame_dt(raw_dt: f32) -> f32 {
    if raw_dt.is_nan() || raw_dt <= 0.0 {
        consts::FALLBACK_FRAME_DT
    } else {
        raw_dt.min(consts::MAX_FRAME_DT)
    }
}
