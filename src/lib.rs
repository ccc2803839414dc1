//! Rope Climb - run-simulation engine for a vertical reflex game
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (difficulty, input, spawning, motion, collisions, lifecycle)
//! - `engine`: Host-facing facade (create / tick / destroy, deferred result delivery)
//! - `settings`: Data-driven lane geometry and economy tuning
//! - `error`: Creation-time failures

pub mod engine;
pub mod error;
pub mod settings;
pub mod sim;

pub use engine::{Engine, ResultSink};
pub use error::EngineError;
pub use settings::Settings;
pub use sim::{Difficulty, InputCapabilities, RunPhase, RunResult};

/// Fixed gameplay constants (tunable values live in [`Settings`])
pub mod consts {
    /// Obstacles enter the lane this far above the top edge
    pub const SPAWN_Y: f32 = -20.0;
    /// Obstacles this far below the bottom edge are counted as avoided
    pub const DESPAWN_MARGIN: f32 = 30.0;
    /// Per-instance fall speed jitter range (px/s)
    pub const EXTRA_SPEED_MIN: u32 = 20;
    pub const EXTRA_SPEED_MAX: u32 = 80;
    /// Placement resamples when a candidate lands near the avatar
    pub const SPAWN_ATTEMPTS: u32 = 6;

    /// Burst window length
    pub const BURST_MS: f64 = 220.0;
    /// Extra lateral speed while bursting, as a fraction of lateral speed
    pub const BURST_BOOST: f32 = 0.7;
    /// Velocity smoothing per tick (0 = frozen, 1 = snap)
    pub const VELOCITY_BLEND: f32 = 0.2;
    /// Speed above which the avatar counts as moving (px/s)
    pub const MOVE_THRESHOLD: f32 = 5.0;
    /// How long the avatar keeps "Moving" after it last moved
    pub const MOVE_RECENCY_MS: f64 = 900.0;

    /// Length of a difficulty time tier
    pub const TIME_TIER_SECS: f64 = 20.0;
    /// Spawn interval tightening per time tier
    pub const SPAWN_TIER_STEP_MS: f64 = 40.0;
    /// Bonus chance decay per time tier, and its floor
    pub const BONUS_DECAY_PER_TIER: f32 = 0.02;
    pub const BONUS_FLOOR: f32 = 0.03;

    /// Score weights
    pub const SCORE_HEIGHT_WEIGHT: u64 = 2;
    pub const SCORE_AVOID_WEIGHT: u64 = 15;
}

/// Linear interpolation from `a` toward `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Sign as a unit step in {-1, 0, 1}
#[inline]
pub fn unit_sign(v: f32) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}
