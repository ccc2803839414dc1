//! Avatar lateral motion
//!
//! Velocity eases toward the input target instead of snapping, which gives the
//! avatar a little inertia. Position is clamped to the lane inset.

use super::state::{Avatar, MotionState};
use crate::consts::*;
use crate::lerp;

impl Avatar {
    /// Open a burst window starting at `now_ms`
    pub fn trigger_burst(&mut self, now_ms: f64) {
        self.burst_until_ms = now_ms + BURST_MS;
    }

    #[inline]
    pub fn is_bursting(&self, now_ms: f64) -> bool {
        now_ms < self.burst_until_ms
    }

    /// Start the hit reaction
    pub fn mark_hit(&mut self, now_ms: f64, duration_ms: f64) {
        self.hit_until_ms = now_ms + duration_ms;
    }

    /// Current animation state. Hit beats Bursting beats Moving beats Idle.
    pub fn motion_state(&self, now_ms: f64) -> MotionState {
        if now_ms < self.hit_until_ms {
            return MotionState::Hit;
        }
        if self.is_bursting(now_ms) {
            return MotionState::Bursting;
        }
        let recently_moved = self
            .last_move_at_ms
            .is_some_and(|t| now_ms - t <= MOVE_RECENCY_MS);
        if self.vel_x.abs() > MOVE_THRESHOLD || recently_moved {
            MotionState::Moving
        } else {
            MotionState::Idle
        }
    }
}

/// Target lateral velocity for a direction, boosted while bursting
pub fn target_velocity(direction: i8, lateral_speed: f32, bursting: bool) -> f32 {
    let boost = if bursting { lateral_speed * BURST_BOOST } else { 0.0 };
    f32::from(direction.signum()) * (lateral_speed + boost)
}

/// Advance the avatar by one tick
pub fn step_avatar(
    avatar: &mut Avatar,
    direction: i8,
    lateral_speed: f32,
    bounds: (f32, f32),
    now_ms: f64,
    dt_secs: f32,
) {
    let target = target_velocity(direction, lateral_speed, avatar.is_bursting(now_ms));
    avatar.vel_x = lerp(avatar.vel_x, target, VELOCITY_BLEND);

    let (lo, hi) = bounds;
    avatar.pos.x += avatar.vel_x * dt_secs;
    if avatar.pos.x <= lo {
        avatar.pos.x = lo;
        if avatar.vel_x < 0.0 {
            avatar.vel_x = 0.0;
        }
    } else if avatar.pos.x >= hi {
        avatar.pos.x = hi;
        if avatar.vel_x > 0.0 {
            avatar.vel_x = 0.0;
        }
    }

    if avatar.vel_x.abs() > MOVE_THRESHOLD {
        avatar.last_move_at_ms = Some(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const BOUNDS: (f32, f32) = (40.0, 320.0);
    const DT: f32 = 1.0 / 60.0;

    fn avatar_at(x: f32) -> Avatar {
        Avatar::new(Vec2::new(x, 500.0))
    }

    #[test]
    fn test_velocity_eases_toward_target() {
        let mut avatar = avatar_at(180.0);
        step_avatar(&mut avatar, 1, 200.0, BOUNDS, 0.0, DT);
        assert!((avatar.vel_x - 40.0).abs() < 1e-4);
        step_avatar(&mut avatar, 1, 200.0, BOUNDS, 16.0, DT);
        assert!((avatar.vel_x - 72.0).abs() < 1e-4);
        assert!(avatar.pos.x > 180.0);
    }

    #[test]
    fn test_burst_boosts_target() {
        assert_eq!(target_velocity(-1, 200.0, false), -200.0);
        assert!((target_velocity(1, 200.0, true) - 340.0).abs() < 1e-3);
        assert_eq!(target_velocity(0, 200.0, true), 0.0);
    }

    #[test]
    fn test_clamp_zeroes_outward_velocity() {
        let mut avatar = avatar_at(41.0);
        avatar.vel_x = -300.0;
        step_avatar(&mut avatar, -1, 200.0, BOUNDS, 0.0, DT);
        assert_eq!(avatar.pos.x, 40.0);
        assert_eq!(avatar.vel_x, 0.0);

        // Pushing back inward is allowed immediately
        step_avatar(&mut avatar, 1, 200.0, BOUNDS, 16.0, DT);
        assert!(avatar.vel_x > 0.0);
        assert!(avatar.pos.x > 40.0);
    }

    #[test]
    fn test_clamp_right_edge() {
        let mut avatar = avatar_at(319.0);
        for i in 0..30 {
            step_avatar(&mut avatar, 1, 220.0, BOUNDS, i as f64 * 16.0, DT);
            assert!(avatar.pos.x <= 320.0);
        }
        assert_eq!(avatar.pos.x, 320.0);
    }

    #[test]
    fn test_motion_state_derivation() {
        let mut avatar = avatar_at(180.0);
        assert_eq!(avatar.motion_state(0.0), MotionState::Idle);

        step_avatar(&mut avatar, 1, 200.0, BOUNDS, 1_000.0, DT);
        assert_eq!(avatar.motion_state(1_000.0), MotionState::Moving);

        // Stopped, but moved recently
        avatar.vel_x = 0.0;
        assert_eq!(avatar.motion_state(1_800.0), MotionState::Moving);
        assert_eq!(avatar.motion_state(1_901.0), MotionState::Idle);

        avatar.trigger_burst(2_000.0);
        assert_eq!(avatar.motion_state(2_100.0), MotionState::Bursting);
        assert_eq!(avatar.motion_state(2_221.0), MotionState::Idle);

        avatar.trigger_burst(3_000.0);
        avatar.mark_hit(3_000.0, 1_000.0);
        assert_eq!(avatar.motion_state(3_100.0), MotionState::Hit);
    }
}
