//! Frame-driven simulation tick
//!
//! Core loop that advances one run. Order within a tick is fixed:
//! input -> difficulty -> spawn -> motion -> falling/avoidance -> collision -> termination.
//! Termination must observe a life lost in the same tick.

use super::collision::resolve_collisions;
use super::difficulty::speed_at;
use super::input::InputSnapshot;
use super::motion::step_avatar;
use super::state::{EndReason, GameEvent, GameState, RunPhase};
use crate::consts::*;

/// Advance the run to host time `now_ms`, integrating over `dt_ms`
pub fn tick(state: &mut GameState, input: &InputSnapshot, now_ms: f64, dt_ms: f64) {
    state.events.clear();

    match state.run.phase {
        RunPhase::Ended => return,
        RunPhase::NotStarted => start_run(state, now_ms),
        RunPhase::Running => {}
    }

    state.run.elapsed_ms = (now_ms - state.run.start_ms).max(state.run.elapsed_ms);

    // Time limit: clamp to the limit and settle the final numbers
    let limit = state.settings.duration_limit_ms.unwrap_or(f64::INFINITY);
    if state.run.elapsed_ms >= limit {
        state.run.elapsed_ms = limit.max(0.0);
        state.run.refresh_progress(state.settings.height_rate);
        end_run(state, EndReason::TimeLimit);
        return;
    }

    let now = state.run.elapsed_ms;
    let dt = (dt_ms.max(0.0) / 1000.0) as f32;
    let elapsed_secs = state.run.elapsed_secs();
    let cfg = state.difficulty.config();

    // Burst
    if input.burst {
        state.avatar.trigger_burst(now);
        state.events.push(GameEvent::Burst);
    }

    // Difficulty + spawning
    let speed = speed_at(cfg, elapsed_secs);
    if let Some(obstacle) = state.spawner.poll(
        &mut state.rng,
        cfg,
        &state.settings,
        now,
        state.avatar.pos.x,
    ) {
        state.events.push(GameEvent::Spawned {
            id: obstacle.id,
            kind: obstacle.kind,
        });
        state.obstacles.push(obstacle);
    }

    // Avatar
    step_avatar(
        &mut state.avatar,
        input.direction,
        cfg.lateral_speed,
        state.settings.lane_bounds(),
        now,
        dt,
    );

    // Falling obstacles; anything past the bottom edge was avoided
    let floor_y = state.settings.lane_height + DESPAWN_MARGIN;
    for obstacle in state.obstacles.iter_mut().filter(|o| o.alive) {
        obstacle.pos.y += obstacle.fall_speed(speed) * dt;
        if obstacle.pos.y > floor_y && obstacle.consume() {
            state.run.obstacles_avoided += 1;
            state.events.push(GameEvent::ObstacleAvoided { id: obstacle.id });
        }
    }

    resolve_collisions(
        &mut state.run,
        &mut state.avatar,
        &mut state.obstacles,
        &state.settings,
        &mut state.events,
    );
    state.obstacles.retain(|o| o.alive);

    state.run.refresh_progress(state.settings.height_rate);

    if state.run.phase == RunPhase::Ended {
        let reason = state.run.end_reason.unwrap_or(EndReason::LivesDepleted);
        log_end(state, reason);
        state.events.push(GameEvent::RunEnded { reason });
    }
}

/// NotStarted -> Running
fn start_run(state: &mut GameState, now_ms: f64) {
    let grace = state.settings.grace_ms.max(0.0);
    let run = &mut state.run;
    run.phase = RunPhase::Running;
    run.start_ms = now_ms;
    run.elapsed_ms = 0.0;
    run.safe_until_ms = grace;
    state.spawner.start(grace);
    state.events.push(GameEvent::RunStarted);
    log::info!(
        "Run started: difficulty={}, lives={}, seed={}",
        state.difficulty,
        state.run.lives,
        state.seed
    );
}

/// Running -> Ended
fn end_run(state: &mut GameState, reason: EndReason) {
    state.run.phase = RunPhase::Ended;
    state.run.end_reason = Some(reason);
    log_end(state, reason);
    state.events.push(GameEvent::RunEnded { reason });
}

fn log_end(state: &GameState, reason: EndReason) {
    log::info!(
        "Run ended ({:?}) after {:.0}ms: score={}, height={}, avoided={}, bonus={}",
        reason,
        state.run.elapsed_ms,
        state.run.score,
        state.run.height,
        state.run.obstacles_avoided,
        state.run.bonus_accumulated
    );
}
