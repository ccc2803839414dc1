//! Collision detection and response
//!
//! Plain axis-aligned overlap between the avatar and each live obstacle,
//! then one dispatch on the obstacle kind to apply the life/bonus effects.

use glam::Vec2;

use super::state::{Avatar, EndReason, GameEvent, Obstacle, ObstacleKind, RunPhase, RunState};
use crate::settings::Settings;

/// Axis-aligned box described by its center and half extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half: size * 0.5,
        }
    }

    /// A box with no area overlaps nothing
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.half.x <= 0.0 || self.half.y <= 0.0
    }

    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let d = (self.center - other.center).abs();
        let reach = self.half + other.half;
        d.x < reach.x && d.y < reach.y
    }
}

/// Outcome of a hazard contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardOutcome {
    /// Safe window or invulnerability; the obstacle keeps falling
    Ignored,
    /// A life was lost
    Hit { lives: u32 },
}

/// Apply a hazard contact at run time `now_ms`
pub fn apply_hazard(
    run: &mut RunState,
    avatar: &mut Avatar,
    obstacle: &mut Obstacle,
    settings: &Settings,
    now_ms: f64,
) -> HazardOutcome {
    if now_ms < run.safe_until_ms || now_ms < run.invulnerable_until_ms {
        return HazardOutcome::Ignored;
    }
    if !obstacle.consume() {
        return HazardOutcome::Ignored;
    }

    run.lives = run.lives.saturating_sub(1);
    run.hazard_hits += 1;
    run.invulnerable_until_ms = now_ms + settings.invulnerability_ms;
    avatar.mark_hit(now_ms, settings.invulnerability_ms);

    HazardOutcome::Hit { lives: run.lives }
}

/// Apply a bonus pickup. Always succeeds for a live obstacle.
pub fn apply_bonus(run: &mut RunState, obstacle: &mut Obstacle, settings: &Settings) -> bool {
    if !obstacle.consume() {
        return false;
    }
    run.lives = (run.lives + 1).min(settings.max_lives);
    run.bonus_accumulated += settings.bonus_reward;
    true
}

/// Test the avatar against every live obstacle and apply effects in id order.
///
/// Ends the run the moment lives reach zero; later obstacles are left untouched.
pub fn resolve_collisions(
    run: &mut RunState,
    avatar: &mut Avatar,
    obstacles: &mut [Obstacle],
    settings: &Settings,
    events: &mut Vec<GameEvent>,
) {
    let now_ms = run.elapsed_ms;
    let avatar_box = Aabb::from_center_size(avatar.pos, settings.avatar_hit_size);

    for obstacle in obstacles.iter_mut() {
        if !obstacle.alive {
            continue;
        }
        let obstacle_box = Aabb::from_center_size(obstacle.pos, settings.obstacle_hit_size);
        if !avatar_box.overlaps(&obstacle_box) {
            continue;
        }

        let id = obstacle.id;
        match obstacle.kind {
            ObstacleKind::Hazard => match apply_hazard(run, avatar, obstacle, settings, now_ms) {
                HazardOutcome::Ignored => events.push(GameEvent::HazardIgnored { id }),
                HazardOutcome::Hit { lives } => {
                    log::debug!("Hazard #{} hit at {:.0}ms, {} lives left", id, now_ms, lives);
                    events.push(GameEvent::HazardHit { id, lives });
                }
            },
            ObstacleKind::Bonus => {
                if apply_bonus(run, obstacle, settings) {
                    log::debug!("Bonus #{} collected, lives {}", id, run.lives);
                    events.push(GameEvent::BonusCollected {
                        id,
                        lives: run.lives,
                    });
                }
            }
        }

        if run.lives == 0 {
            run.phase = RunPhase::Ended;
            run.end_reason = Some(EndReason::LivesDepleted);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(settings: &Settings) -> RunState {
        let mut run = RunState::new(settings);
        run.phase = RunPhase::Running;
        run.safe_until_ms = settings.grace_ms;
        run
    }

    fn obstacle_at(id: u32, kind: ObstacleKind, pos: Vec2) -> Obstacle {
        Obstacle::new(id, kind, pos, 40.0)
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::from_center_size(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = Aabb::from_center_size(Vec2::new(9.0, 0.0), Vec2::new(10.0, 10.0));
        let c = Aabb::from_center_size(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c), "touching edges are not an overlap");
    }

    #[test]
    fn test_empty_box_never_overlaps() {
        let a = Aabb::from_center_size(Vec2::ZERO, Vec2::ZERO);
        let b = Aabb::from_center_size(Vec2::ZERO, Vec2::new(50.0, 50.0));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_hazard_ignored_in_safe_window() {
        let settings = Settings::default();
        let mut run = running(&settings);
        run.elapsed_ms = 800.0;
        let mut avatar = Avatar::new(Vec2::new(180.0, 500.0));
        let mut obstacles = vec![obstacle_at(1, ObstacleKind::Hazard, avatar.pos)];
        let mut events = Vec::new();

        resolve_collisions(&mut run, &mut avatar, &mut obstacles, &settings, &mut events);
        assert_eq!(run.lives, 3);
        assert!(obstacles[0].alive);
        assert_eq!(events, vec![GameEvent::HazardIgnored { id: 1 }]);
    }

    #[test]
    fn test_overlapping_hazards_cost_one_life() {
        let settings = Settings::default();
        let mut run = running(&settings);
        run.elapsed_ms = 5_000.0;
        let mut avatar = Avatar::new(Vec2::new(180.0, 500.0));
        let mut obstacles = vec![
            obstacle_at(1, ObstacleKind::Hazard, avatar.pos),
            obstacle_at(2, ObstacleKind::Hazard, avatar.pos + Vec2::new(4.0, 0.0)),
        ];
        let mut events = Vec::new();

        resolve_collisions(&mut run, &mut avatar, &mut obstacles, &settings, &mut events);
        assert_eq!(run.lives, 2);
        assert!(!obstacles[0].alive);
        assert!(obstacles[1].alive);

        // Still inside the cooldown a few frames later
        run.elapsed_ms = 5_400.0;
        resolve_collisions(&mut run, &mut avatar, &mut obstacles, &settings, &mut events);
        assert_eq!(run.lives, 2);
        assert_eq!(run.hazard_hits, 1);
    }

    #[test]
    fn test_hazard_after_cooldown_hits_again() {
        let settings = Settings::default();
        let mut run = running(&settings);
        let mut avatar = Avatar::new(Vec2::new(180.0, 500.0));
        let mut events = Vec::new();

        run.elapsed_ms = 2_000.0;
        let mut first = vec![obstacle_at(1, ObstacleKind::Hazard, avatar.pos)];
        resolve_collisions(&mut run, &mut avatar, &mut first, &settings, &mut events);

        run.elapsed_ms = 2_000.0 + settings.invulnerability_ms;
        let mut second = vec![obstacle_at(2, ObstacleKind::Hazard, avatar.pos)];
        resolve_collisions(&mut run, &mut avatar, &mut second, &settings, &mut events);
        assert_eq!(run.lives, 1);
    }

    #[test]
    fn test_bonus_always_applies_and_caps_lives() {
        let settings = Settings::default();
        let mut run = running(&settings);
        // Inside both the safe window and a cooldown
        run.elapsed_ms = 100.0;
        run.invulnerable_until_ms = 1_000.0;
        run.lives = settings.max_lives;
        let mut avatar = Avatar::new(Vec2::new(180.0, 500.0));
        let mut obstacles = vec![obstacle_at(1, ObstacleKind::Bonus, avatar.pos)];
        let mut events = Vec::new();

        resolve_collisions(&mut run, &mut avatar, &mut obstacles, &settings, &mut events);
        assert_eq!(run.lives, settings.max_lives);
        assert_eq!(run.bonus_accumulated, settings.bonus_reward);
        assert!(!obstacles[0].alive);

        // Consumed obstacles cannot pay out twice
        resolve_collisions(&mut run, &mut avatar, &mut obstacles, &settings, &mut events);
        assert_eq!(run.bonus_accumulated, settings.bonus_reward);
    }

    #[test]
    fn test_last_life_ends_run_immediately() {
        let settings = Settings::default();
        let mut run = running(&settings);
        run.elapsed_ms = 9_000.0;
        run.lives = 1;
        let mut avatar = Avatar::new(Vec2::new(180.0, 500.0));
        let mut obstacles = vec![
            obstacle_at(1, ObstacleKind::Hazard, avatar.pos),
            obstacle_at(2, ObstacleKind::Bonus, avatar.pos),
        ];
        let mut events = Vec::new();

        resolve_collisions(&mut run, &mut avatar, &mut obstacles, &settings, &mut events);
        assert_eq!(run.lives, 0);
        assert_eq!(run.phase, RunPhase::Ended);
        assert_eq!(run.end_reason, Some(EndReason::LivesDepleted));
        // The bonus behind it is never reached
        assert!(obstacles[1].alive);
        assert_eq!(run.bonus_accumulated, 0);
    }

    #[test]
    fn test_distant_obstacles_ignored() {
        let settings = Settings::default();
        let mut run = running(&settings);
        run.elapsed_ms = 5_000.0;
        let mut avatar = Avatar::new(Vec2::new(180.0, 500.0));
        let mut obstacles = vec![obstacle_at(1, ObstacleKind::Hazard, Vec2::new(60.0, 500.0))];
        let mut events = Vec::new();

        resolve_collisions(&mut run, &mut avatar, &mut obstacles, &settings, &mut events);
        assert!(events.is_empty());
        assert_eq!(run.lives, 3);
    }
}
