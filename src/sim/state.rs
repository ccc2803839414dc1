//! Run state and core simulation types
//!
//! Everything the tick loop mutates lives in [`GameState`], owned by one engine.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;
use super::spawn::SpawnScheduler;
use crate::consts::*;
use crate::settings::Settings;

/// Lifecycle of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Created, waiting for the first tick
    NotStarted,
    /// Active gameplay
    Running,
    /// Terminal; nothing mutates after this
    Ended,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    LivesDepleted,
    TimeLimit,
}

/// Avatar animation state, derived each frame from timers and velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    Idle,
    Moving,
    Bursting,
    Hit,
}

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Costs a life on contact
    Hazard,
    /// Restores a life and grants bonus points
    Bonus,
}

/// A falling obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub pos: Vec2,
    /// Per-instance jitter added to the global fall speed (sampled once)
    pub extra_speed: f32,
    pub alive: bool,
}

impl Obstacle {
    pub fn new(id: u32, kind: ObstacleKind, pos: Vec2, extra_speed: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            extra_speed,
            alive: true,
        }
    }

    /// Current fall speed given the global speed
    #[inline]
    pub fn fall_speed(&self, global_speed: f32) -> f32 {
        (global_speed + self.extra_speed).max(0.0)
    }

    /// Destroy the obstacle. Returns false if it was already gone.
    pub fn consume(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }
}

/// The player's avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avatar {
    pub pos: Vec2,
    /// Horizontal velocity (px/s)
    pub vel_x: f32,
    /// Run time (ms) at which the current burst window closes
    pub burst_until_ms: f64,
    /// Run time (ms) the avatar last moved faster than the threshold
    pub last_move_at_ms: Option<f64>,
    /// Run time (ms) at which the hit reaction ends
    pub hit_until_ms: f64,
}

impl Avatar {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel_x: 0.0,
            burst_until_ms: 0.0,
            last_move_at_ms: None,
            hit_until_ms: 0.0,
        }
    }
}

/// Counters and timers for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub phase: RunPhase,
    /// Host clock (ms) at the first tick
    pub start_ms: f64,
    /// Run time (ms); never decreases
    pub elapsed_ms: f64,
    pub lives: u32,
    pub score: u64,
    pub height: u64,
    pub obstacles_avoided: u64,
    pub bonus_accumulated: u64,
    /// Hazards are harmless before this run time (ms)
    pub safe_until_ms: f64,
    /// Hazards are harmless before this run time (ms), set by the last hit
    pub invulnerable_until_ms: f64,
    /// Hazard hits that cost a life
    pub hazard_hits: u32,
    pub end_reason: Option<EndReason>,
}

impl RunState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            phase: RunPhase::NotStarted,
            start_ms: 0.0,
            elapsed_ms: 0.0,
            lives: settings.starting_lives.min(settings.max_lives),
            score: 0,
            height: 0,
            obstacles_avoided: 0,
            bonus_accumulated: 0,
            safe_until_ms: 0.0,
            invulnerable_until_ms: 0.0,
            hazard_hits: 0,
            end_reason: None,
        }
    }

    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_ms / 1000.0
    }

    /// Recompute height and score from elapsed time and the counters
    pub fn refresh_progress(&mut self, height_rate: f64) {
        self.height = height_for(self.elapsed_secs(), height_rate);
        self.score = score_for(self.height, self.obstacles_avoided, self.bonus_accumulated);
    }
}

/// Height reached after `elapsed_secs` of climbing
pub fn height_for(elapsed_secs: f64, height_rate: f64) -> u64 {
    (elapsed_secs.max(0.0) * height_rate.max(0.0)).floor() as u64
}

/// Score as a pure function of the three progress counters
pub fn score_for(height: u64, obstacles_avoided: u64, bonus_accumulated: u64) -> u64 {
    height * SCORE_HEIGHT_WEIGHT + obstacles_avoided * SCORE_AVOID_WEIGHT + bonus_accumulated
}

/// Terminal summary handed to the result collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub difficulty: Difficulty,
    pub score: u64,
    pub height: u64,
    pub duration_ms: u64,
    pub obstacles_avoided: u64,
}

impl RunResult {
    /// JSON payload in the shape the results endpoint accepts
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Events emitted during a tick, for the host's visual and audio cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    Spawned { id: u32, kind: ObstacleKind },
    Burst,
    HazardHit { id: u32, lives: u32 },
    HazardIgnored { id: u32 },
    BonusCollected { id: u32, lives: u32 },
    ObstacleAvoided { id: u32 },
    RunEnded { reason: EndReason },
}

/// Complete simulation state for one run
#[derive(Debug, Clone)]
pub struct GameState {
    pub difficulty: Difficulty,
    pub settings: Settings,
    /// Seed the RNG was built from
    pub seed: u64,
    pub rng: Pcg32,
    pub run: RunState,
    pub avatar: Avatar,
    /// Live obstacles (sorted by id)
    pub obstacles: Vec<Obstacle>,
    pub spawner: SpawnScheduler,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(difficulty: Difficulty, settings: Settings, seed: u64) -> Self {
        Self {
            difficulty,
            run: RunState::new(&settings),
            avatar: Avatar::new(settings.avatar_start()),
            settings,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            obstacles: Vec::new(),
            spawner: SpawnScheduler::new(),
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn phase(&self) -> RunPhase {
        self.run.phase
    }

    /// Snapshot the terminal result (duration clamped to the time limit)
    pub fn result(&self) -> RunResult {
        let duration = match self.settings.duration_limit_ms {
            Some(limit) => self.run.elapsed_ms.min(limit),
            None => self.run.elapsed_ms,
        };
        RunResult {
            difficulty: self.difficulty,
            score: self.run.score,
            height: self.run.height,
            duration_ms: duration.max(0.0).round() as u64,
            obstacles_avoided: self.run.obstacles_avoided,
        }
    }
}
