//! Game settings and preferences
//!
//! Read once at startup from JSON. Missing fields fall back to defaults;
//! nothing is ever written back.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::consts::MAX_LEVELS;
use crate::sim::CameraMode;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for spawn placement and pool draws
    pub seed: u64,

    // === Camera ===
    /// View used when play starts
    pub camera_mode: CameraMode,
    /// Third-person orbit distance
    pub tp_camera_distance: f32,
    /// Third-person starting pitch, degrees (negative looks down)
    pub tp_camera_pitch_deg: f32,

    // === Controls ===
    /// Keyboard turn rate, degrees per second
    pub turn_speed_deg: f32,

    // === Debug ===
    /// Start with auto-fire and invulnerability on
    pub cheat_mode: bool,
    /// Level the headless driver starts on
    pub start_level: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x00A7_E4A0,

            camera_mode: CameraMode::ThirdPerson,
            tp_camera_distance: 8.0,
            tp_camera_pitch_deg: -30.0,

            turn_speed_deg: 30.0,

            cheat_mode: false,
            start_level: 1,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Read and parse a JSON settings file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Third-person pitch in radians, clamped to the allowed range
    pub fn tp_camera_pitch(&self) -> f32 {
        self.tp_camera_pitch_deg.clamp(-89.0, 0.0).to_radians()
    }

    /// Turn rate in radians per second
    pub fn turn_speed(&self) -> f32 {
        self.turn_speed_deg.to_radians()
    }

    /// Pull out-of-range values back to something playable
    fn sanitized(mut self) -> Self {
        if !(1..=MAX_LEVELS).contains(&self.start_level) {
            log::warn!("start_level {} out of range, using 1", self.start_level);
            self.start_level = 1;
        }
        if !(self.tp_camera_distance.is_finite() && self.tp_camera_distance > 0.0) {
            log::warn!("tp_camera_distance {} invalid, using 8", self.tp_camera_distance);
            self.tp_camera_distance = 8.0;
        }
        if !(self.turn_speed_deg.is_finite() && self.turn_speed_deg > 0.0) {
            log::warn!("turn_speed_deg {} invalid, using 30", self.turn_speed_deg);
            self.turn_speed_deg = 30.0;
        }
        self
    }
}
