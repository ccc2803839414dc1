//! Engine settings
//!
//! Lane geometry, life economy and timing knobs. Difficulty-dependent values
//! (speeds, spawn cadence) live in [`crate::sim::difficulty`] instead.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Tunable engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Lane ===
    /// Visible lane width (px)
    pub lane_width: f32,
    /// Visible lane height (px)
    pub lane_height: f32,
    /// Inset from both lane edges for spawning and avatar clamping
    pub margin: f32,
    /// Spawns avoid landing this close to the avatar (px)
    pub safe_radius: f32,

    // === Hit regions ===
    /// Avatar hit box (full width/height)
    pub avatar_hit_size: Vec2,
    /// Obstacle hit box (full width/height)
    pub obstacle_hit_size: Vec2,

    // === Economy ===
    pub starting_lives: u32,
    pub max_lives: u32,
    /// Bonus points granted per pickup
    pub bonus_reward: u64,
    /// Height units gained per elapsed second
    pub height_rate: f64,

    // === Timing ===
    /// No obstacles and no hazard damage for this long after start
    pub grace_ms: f64,
    /// Hazard hits are ignored for this long after a hit
    pub invulnerability_ms: f64,
    /// Run ends once elapsed time reaches this (None = unbounded)
    pub duration_limit_ms: Option<f64>,
    /// Cosmetic delay before the run result is handed off
    pub result_delay_ms: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lane_width: 360.0,
            lane_height: 640.0,
            margin: 40.0,
            safe_radius: 60.0,

            avatar_hit_size: Vec2::new(24.0, 28.0),
            obstacle_hit_size: Vec2::new(12.0, 12.0),

            starting_lives: 3,
            max_lives: 5,
            bonus_reward: 50,
            height_rate: 3.0,

            grace_ms: 1500.0,
            invulnerability_ms: 1000.0,
            duration_limit_ms: None,
            result_delay_ms: 400.0,
        }
    }
}

impl Settings {
    /// Avatar spawn point: just right of the rope, low in the lane
    pub fn avatar_start(&self) -> Vec2 {
        Vec2::new(self.lane_width / 2.0 + 18.0, self.lane_height * 0.78)
    }

    /// Horizontal range usable by the avatar and by spawns
    pub fn lane_bounds(&self) -> (f32, f32) {
        (self.margin, self.lane_width - self.margin)
    }

    /// Parse settings from JSON (missing fields fall back to defaults)
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Serialize settings to JSON
    pub fn to_json(&self) -> String {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Reject geometry or economy values the simulation cannot run with
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.lane_width > 0.0 && self.lane_height > 0.0) {
            return Err(EngineError::InvalidSettings(format!(
                "lane must have positive size, got {}x{}",
                self.lane_width, self.lane_height
            )));
        }
        if self.margin < 0.0 || self.margin * 2.0 > self.lane_width {
            return Err(EngineError::InvalidSettings(format!(
                "margin {} leaves no lane inside width {}",
                self.margin, self.lane_width
            )));
        }
        if self.max_lives == 0 {
            return Err(EngineError::InvalidSettings("max_lives must be at least 1".into()));
        }
        if self.starting_lives == 0 || self.starting_lives > self.max_lives {
            return Err(EngineError::InvalidSettings(format!(
                "starting_lives {} must be within 1..={}",
                self.starting_lives, self.max_lives
            )));
        }
        if self.height_rate < 0.0 {
            return Err(EngineError::InvalidSettings("height_rate must not be negative".into()));
        }
        Ok(())
    }
}
