//! Run simulation module
//!
//! All gameplay logic lives here. Rules for code in this module:
//! - Mutated only from `tick`, one call per host frame
//! - Randomness only through the state's injected RNG
//! - Stable iteration order (obstacles by id)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod input;
pub mod motion;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Aabb, HazardOutcome, resolve_collisions};
pub use difficulty::{
    Difficulty, DifficultyConfig, bonus_chance_at, spawn_interval_at, speed_at, time_tier,
};
pub use input::{InputAggregator, InputCapabilities, InputSnapshot, Key};
pub use spawn::SpawnScheduler;
pub use state::{
    Avatar, EndReason, GameEvent, GameState, MotionState, Obstacle, ObstacleKind, RunPhase,
    RunResult, RunState,
};
pub use tick::tick;
