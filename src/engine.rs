//! Host-facing engine
//!
//! Wraps one run's [`GameState`] together with the input aggregator and the
//! result hand-off. The host drives everything through [`Engine::tick`].
//!
//! The result is delivered once, `result_delay_ms` after the run ends, from a
//! later `tick`. Destroying or dropping the engine first cancels delivery.

use crate::error::EngineError;
use crate::settings::Settings;
use crate::sim::difficulty::validate_tables;
use crate::sim::{
    Avatar, Difficulty, GameEvent, GameState, InputAggregator, InputCapabilities, MotionState,
    Obstacle, RunPhase, RunResult, RunState, tick,
};

/// Largest frame step the simulation will integrate (ms)
pub const MAX_FRAME_MS: f64 = 100.0;

/// Receives the terminal result of a run. Fire-and-forget from the engine's side.
pub trait ResultSink {
    fn submit(&mut self, result: RunResult);
}

impl<F: FnMut(RunResult)> ResultSink for F {
    fn submit(&mut self, result: RunResult) {
        self(result)
    }
}

/// A result waiting out the cosmetic delay
#[derive(Debug, Clone)]
struct PendingDelivery {
    due_ms: f64,
    result: RunResult,
}

pub struct Engine {
    state: GameState,
    input: InputAggregator,
    sink: Option<Box<dyn ResultSink>>,
    pending: Option<PendingDelivery>,
    captured: Option<RunResult>,
    delivered: bool,
    destroyed: bool,
}

impl Engine {
    /// Create an engine with an unseeded RNG
    pub fn create(
        difficulty: Difficulty,
        settings: Settings,
        caps: InputCapabilities,
        sink: impl ResultSink + 'static,
    ) -> Result<Self, EngineError> {
        Self::with_seed(difficulty, settings, caps, sink, rand::random())
    }

    /// Create an engine with a fixed seed (replays are deterministic)
    pub fn with_seed(
        difficulty: Difficulty,
        settings: Settings,
        caps: InputCapabilities,
        sink: impl ResultSink + 'static,
        seed: u64,
    ) -> Result<Self, EngineError> {
        if !caps.keyboard {
            return Err(EngineError::KeyboardUnavailable);
        }
        settings.validate()?;
        validate_tables()?;

        Ok(Self {
            state: GameState::new(difficulty, settings, seed),
            input: InputAggregator::new(caps),
            sink: Some(Box::new(sink)),
            pending: None,
            captured: None,
            delivered: false,
            destroyed: false,
        })
    }

    /// Advance one host frame. Returns the events produced this frame.
    ///
    /// Keep calling after the run ends so the delayed result can be delivered.
    pub fn tick(&mut self, now_ms: f64, delta_ms: f64) -> &[GameEvent] {
        if self.destroyed {
            self.state.events.clear();
            return &self.state.events;
        }

        let snapshot = self.input.snapshot();
        tick(
            &mut self.state,
            &snapshot,
            now_ms,
            delta_ms.clamp(0.0, MAX_FRAME_MS),
        );

        if self.state.phase() == RunPhase::Ended {
            self.capture_result(now_ms);
        }
        self.deliver_due(now_ms);

        &self.state.events
    }

    /// Tear down: pending result delivery is cancelled and the sink released
    pub fn destroy(&mut self) {
        if self.pending.take().is_some() {
            log::info!("Engine destroyed before result delivery; result dropped");
        }
        self.sink = None;
        self.destroyed = true;
    }

    /// Snapshot the terminal result and schedule its delivery. Only the first call counts.
    fn capture_result(&mut self, now_ms: f64) -> bool {
        if self.captured.is_some() {
            return false;
        }
        let result = self.state.result();
        self.pending = Some(PendingDelivery {
            due_ms: now_ms + self.state.settings.result_delay_ms.max(0.0),
            result: result.clone(),
        });
        self.captured = Some(result);
        true
    }

    fn deliver_due(&mut self, now_ms: f64) {
        if self.delivered || self.pending.as_ref().is_none_or(|p| now_ms < p.due_ms) {
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };
        if let Some(sink) = self.sink.as_mut() {
            log::info!("Delivering run result: {}", pending.result.to_json());
            sink.submit(pending.result);
            self.delivered = true;
        }
    }

    // === Input ===

    pub fn input_mut(&mut self) -> &mut InputAggregator {
        &mut self.input
    }

    pub fn pad_thumb_offset(&self) -> f32 {
        self.input.pad_thumb_offset()
    }

    // === Read-only state for the host ===

    pub fn difficulty(&self) -> Difficulty {
        self.state.difficulty
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn phase(&self) -> RunPhase {
        self.state.phase()
    }

    pub fn run(&self) -> &RunState {
        &self.state.run
    }

    pub fn avatar(&self) -> &Avatar {
        &self.state.avatar
    }

    pub fn motion_state(&self) -> MotionState {
        self.state.avatar.motion_state(self.state.run.elapsed_ms)
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.state.obstacles
    }

    /// The captured result, available as soon as the run ends
    pub fn result(&self) -> Option<&RunResult> {
        self.captured.as_ref()
    }

    /// Whether the result has been handed to the sink
    pub fn result_delivered(&self) -> bool {
        self.delivered
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Key, Obstacle, ObstacleKind};
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    const FRAME_MS: f64 = 16.0;

    type Inbox = Rc<RefCell<Vec<RunResult>>>;

    fn engine_with(settings: Settings, seed: u64) -> (Engine, Inbox) {
        let inbox: Inbox = Rc::default();
        let sink_inbox = inbox.clone();
        let engine = Engine::with_seed(
            Difficulty::Normal,
            settings,
            InputCapabilities::default(),
            move |result: RunResult| sink_inbox.borrow_mut().push(result),
            seed,
        )
        .expect("engine");
        (engine, inbox)
    }

    fn timed(limit_ms: f64) -> Settings {
        Settings {
            avatar_hit_size: Vec2::ZERO,
            duration_limit_ms: Some(limit_ms),
            ..Settings::default()
        }
    }

    /// Tick until `until` (inclusive), returning the next frame time
    fn drive(engine: &mut Engine, mut now: f64, until: f64) -> f64 {
        while now <= until {
            engine.tick(now, FRAME_MS);
            now += FRAME_MS;
        }
        now
    }

    #[test]
    fn test_create_requires_keyboard() {
        let caps = InputCapabilities {
            keyboard: false,
            ..Default::default()
        };
        let err = Engine::create(Difficulty::Easy, Settings::default(), caps, |_r: RunResult| {})
            .err()
            .expect("must fail");
        assert!(matches!(err, EngineError::KeyboardUnavailable));
    }

    #[test]
    fn test_create_rejects_invalid_settings() {
        let settings = Settings {
            max_lives: 0,
            ..Settings::default()
        };
        let result = Engine::create(
            Difficulty::Easy,
            settings,
            InputCapabilities::default(),
            |_r: RunResult| {},
        );
        assert!(matches!(result, Err(EngineError::InvalidSettings(_))));
    }

    #[test]
    fn test_result_delivered_once_after_delay() {
        let (mut engine, inbox) = engine_with(timed(2_000.0), 11);

        let now = drive(&mut engine, 0.0, 2_000.0);
        assert_eq!(engine.phase(), RunPhase::Ended);
        assert!(engine.result().is_some());
        assert!(inbox.borrow().is_empty(), "delivery waits for the delay");

        // Ended at t=2000; the 400ms delay elapses at t=2400
        let now = drive(&mut engine, now, 2_384.0);
        assert!(inbox.borrow().is_empty());
        drive(&mut engine, now, 3_000.0);

        let inbox = inbox.borrow();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].duration_ms, 2_000);
        assert_eq!(inbox[0].difficulty, Difficulty::Normal);
        assert_eq!(inbox[0].height, 6);
        assert!(engine.result_delivered());
    }

    #[test]
    fn test_capture_is_guarded() {
        let (mut engine, inbox) = engine_with(timed(500.0), 12);
        drive(&mut engine, 0.0, 600.0);
        assert!(!engine.capture_result(700.0));
        assert!(!engine.capture_result(800.0));
        drive(&mut engine, 616.0, 2_000.0);
        assert_eq!(inbox.borrow().len(), 1);
    }

    #[test]
    fn test_destroy_cancels_pending_delivery() {
        let (mut engine, inbox) = engine_with(timed(1_000.0), 13);
        let now = drive(&mut engine, 0.0, 1_100.0);
        assert_eq!(engine.phase(), RunPhase::Ended);

        engine.destroy();
        drive(&mut engine, now, 5_000.0);
        assert!(inbox.borrow().is_empty());
        assert!(!engine.result_delivered());
    }

    #[test]
    fn test_dropping_engine_never_delivers() {
        let (mut engine, inbox) = engine_with(timed(1_000.0), 14);
        drive(&mut engine, 0.0, 1_100.0);
        drop(engine);
        assert!(inbox.borrow().is_empty());
    }

    #[test]
    fn test_keys_move_avatar() {
        let (mut engine, _inbox) = engine_with(timed(10_000.0), 15);
        let start_x = engine.avatar().pos.x;
        engine.input_mut().set_key(Key::Left, true);
        drive(&mut engine, 0.0, 500.0);
        assert!(engine.avatar().pos.x < start_x);
        assert_eq!(engine.motion_state(), MotionState::Moving);
    }

    #[test]
    fn test_held_burst_key_bursts_once() {
        let (mut engine, _inbox) = engine_with(timed(10_000.0), 16);
        engine.input_mut().set_key(Key::Burst, true);
        let bursts: usize = (0..30)
            .map(|i| {
                engine.input_mut().set_key(Key::Burst, true);
                engine
                    .tick(i as f64 * FRAME_MS, FRAME_MS)
                    .iter()
                    .filter(|e| **e == GameEvent::Burst)
                    .count()
            })
            .sum();
        assert_eq!(bursts, 1);
    }

    #[test]
    fn test_lives_depleted_through_engine() {
        let settings = Settings {
            starting_lives: 1,
            ..Settings::default()
        };
        let (mut engine, inbox) = engine_with(settings, 17);
        let now = drive(&mut engine, 0.0, 2_000.0);

        // Place a hazard on the avatar through the state, as a falling sprite would
        let pos = engine.avatar().pos;
        engine
            .state
            .obstacles
            .insert(0, Obstacle::new(0, ObstacleKind::Hazard, pos, 0.0));
        let events = engine.tick(now, FRAME_MS).to_vec();

        assert!(events.iter().any(|e| matches!(e, GameEvent::HazardHit { lives: 0, .. })));
        assert_eq!(engine.phase(), RunPhase::Ended);
        let elapsed = engine.run().elapsed_ms;
        drive(&mut engine, now + FRAME_MS, now + 1_000.0);
        assert_eq!(inbox.borrow().len(), 1);
        assert_eq!(inbox.borrow()[0].duration_ms, elapsed.round() as u64);
    }
}
