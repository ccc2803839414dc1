//! Obstacle spawning
//!
//! Decides when the next obstacle appears, where it enters the lane and
//! whether it is a hazard or a bonus. Spawning never fails: if no fair
//! position turns up within the attempt budget, the last candidate is used.

use glam::Vec2;
use rand::Rng;

use super::difficulty::{DifficultyConfig, bonus_chance_at, spawn_interval_at, time_tier};
use super::state::{Obstacle, ObstacleKind};
use crate::consts::*;
use crate::settings::Settings;

/// Spawn timing and id allocation for one run
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    /// Run time (ms) of the next spawn
    pub(crate) next_spawn_at_ms: f64,
    next_id: u32,
    spawned: u64,
}

impl Default for SpawnScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self {
            next_spawn_at_ms: f64::INFINITY,
            next_id: 1,
            spawned: 0,
        }
    }

    /// Arm the scheduler; nothing spawns during the grace window
    pub fn start(&mut self, grace_ms: f64) {
        self.next_spawn_at_ms = grace_ms.max(0.0);
    }

    pub fn next_spawn_at_ms(&self) -> f64 {
        self.next_spawn_at_ms
    }

    /// Obstacles spawned so far
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    /// Spawn at most one obstacle if one is due at `elapsed_ms`
    pub fn poll<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        cfg: &DifficultyConfig,
        settings: &Settings,
        elapsed_ms: f64,
        avatar_x: f32,
    ) -> Option<Obstacle> {
        if elapsed_ms < self.next_spawn_at_ms {
            return None;
        }

        let elapsed_secs = elapsed_ms / 1000.0;
        let tier = time_tier(elapsed_secs);
        self.next_spawn_at_ms += spawn_interval_at(cfg, elapsed_secs, tier);

        let (lo, hi) = settings.lane_bounds();
        let x = pick_lane_x(rng, lo, hi, avatar_x, settings.safe_radius);
        let kind = pick_kind(rng, bonus_chance_at(cfg, tier));
        let extra_speed = rng.random_range(EXTRA_SPEED_MIN..=EXTRA_SPEED_MAX) as f32;

        let id = self.next_id;
        self.next_id += 1;
        self.spawned += 1;

        log::debug!(
            "Spawn #{} {:?} at x={:.0} (t={:.1}s, tier {}, next at {:.0}ms)",
            id,
            kind,
            x,
            elapsed_secs,
            tier,
            self.next_spawn_at_ms
        );

        Some(Obstacle::new(id, kind, Vec2::new(x, SPAWN_Y), extra_speed))
    }
}

/// Uniform lane position, resampled while too close to the avatar.
/// After `SPAWN_ATTEMPTS` resamples the last candidate is kept.
pub fn pick_lane_x<R: Rng + ?Sized>(
    rng: &mut R,
    lo: f32,
    hi: f32,
    avatar_x: f32,
    safe_radius: f32,
) -> f32 {
    let mut x = rng.random_range(lo..=hi);
    let mut attempts = 0;
    while (x - avatar_x).abs() < safe_radius && attempts < SPAWN_ATTEMPTS {
        x = rng.random_range(lo..=hi);
        attempts += 1;
    }
    x
}

/// One uniform draw against the bonus chance
pub fn pick_kind<R: Rng + ?Sized>(rng: &mut R, bonus_chance: f32) -> ObstacleKind {
    if rng.random::<f32>() < bonus_chance {
        ObstacleKind::Bonus
    } else {
        ObstacleKind::Hazard
    }
}
