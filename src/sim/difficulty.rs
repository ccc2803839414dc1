//! Difficulty tiers and time-based ramps
//!
//! Pure lookups: no state, no side effects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::EngineError;

/// Difficulty tier selected before a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    /// Parameter table for this tier
    pub fn config(&self) -> &'static DifficultyConfig {
        match self {
            Difficulty::Easy => &EASY,
            Difficulty::Normal => &NORMAL,
            Difficulty::Hard => &HARD,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(EngineError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Per-tier speed and spawn parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyConfig {
    /// Obstacle fall speed at t=0 (px/s)
    pub base_speed: f32,
    /// Fall speed growth per elapsed second
    pub speed_ramp: f32,
    pub base_spawn_ms: f64,
    /// Spawn interval decay per elapsed second
    pub spawn_ramp_ms: f64,
    pub min_spawn_ms: f64,
    /// Avatar lateral speed (px/s)
    pub lateral_speed: f32,
    /// Probability a spawn is a bonus pickup
    pub bonus_chance: f32,
}

pub const EASY: DifficultyConfig = DifficultyConfig {
    base_speed: 70.0,
    speed_ramp: 1.4,
    base_spawn_ms: 1200.0,
    spawn_ramp_ms: 6.0,
    min_spawn_ms: 550.0,
    lateral_speed: 170.0,
    bonus_chance: 0.12,
};

pub const NORMAL: DifficultyConfig = DifficultyConfig {
    base_speed: 85.0,
    speed_ramp: 1.8,
    base_spawn_ms: 1050.0,
    spawn_ramp_ms: 7.0,
    min_spawn_ms: 470.0,
    lateral_speed: 200.0,
    bonus_chance: 0.11,
};

pub const HARD: DifficultyConfig = DifficultyConfig {
    base_speed: 100.0,
    speed_ramp: 2.2,
    base_spawn_ms: 900.0,
    spawn_ramp_ms: 8.0,
    min_spawn_ms: 380.0,
    lateral_speed: 220.0,
    bonus_chance: 0.1,
};

/// Check the tier table invariants (min interval never above base)
pub fn validate_tables() -> Result<(), EngineError> {
    for difficulty in Difficulty::ALL {
        let cfg = difficulty.config();
        if cfg.min_spawn_ms > cfg.base_spawn_ms {
            return Err(EngineError::InvalidDifficulty(difficulty.as_str()));
        }
    }
    Ok(())
}

/// 20-second epoch index for an elapsed time
#[inline]
pub fn time_tier(elapsed_secs: f64) -> u32 {
    (elapsed_secs.max(0.0) / TIME_TIER_SECS).floor() as u32
}

/// Obstacle fall speed. Grows without bound so a run cannot stall forever.
pub fn speed_at(cfg: &DifficultyConfig, elapsed_secs: f64) -> f32 {
    let t = elapsed_secs.max(0.0) as f32;
    (cfg.base_speed + cfg.speed_ramp * t).max(0.0)
}

/// Milliseconds until the next spawn, never below `min_spawn_ms`
pub fn spawn_interval_at(cfg: &DifficultyConfig, elapsed_secs: f64, tier: u32) -> f64 {
    let t = elapsed_secs.max(0.0);
    let raw = cfg.base_spawn_ms - cfg.spawn_ramp_ms * t - f64::from(tier) * SPAWN_TIER_STEP_MS;
    raw.max(cfg.min_spawn_ms)
}

/// Bonus probability for a time tier, decaying to a fixed floor
pub fn bonus_chance_at(cfg: &DifficultyConfig, tier: u32) -> f32 {
    (cfg.bonus_chance - tier as f32 * BONUS_DECAY_PER_TIER).max(BONUS_FLOOR)
}
