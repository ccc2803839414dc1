//! Input fan-in
//!
//! Keys, the on-screen drag pad and touch gestures all feed one
//! [`InputAggregator`], which the engine samples exactly once per tick.
//!
//! - Direction: keys and pad are merged; an active swipe overrides both.
//! - Burst: edge-triggered from any source, consumed by the next snapshot.

use serde::{Deserialize, Serialize};

use crate::unit_sign;

/// Swipe distance (px) that turns a press into a directional gesture
pub const SWIPE_THRESHOLD: f32 = 18.0;
/// A release faster than this (ms) without swiping is a tap
pub const TAP_MAX_MS: f64 = 240.0;
/// Pad offsets inside this fraction of the pad width are ignored
pub const PAD_DEAD_ZONE: f32 = 0.12;
/// The pad thumb travels at most this fraction of the pad width
pub const PAD_MAX_SHIFT: f32 = 0.28;

/// Which input devices the host can provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputCapabilities {
    pub keyboard: bool,
    pub pointer: bool,
    pub drag_pad: bool,
}

impl Default for InputCapabilities {
    fn default() -> Self {
        Self {
            keyboard: true,
            pointer: true,
            drag_pad: true,
        }
    }
}

impl InputCapabilities {
    /// Keyboard only (desktop without touch)
    pub fn keyboard_only() -> Self {
        Self {
            keyboard: true,
            pointer: false,
            drag_pad: false,
        }
    }
}

/// Bindable keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Burst,
}

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    /// -1 left, 0 none, 1 right
    pub direction: i8,
    /// A burst was requested since the previous snapshot
    pub burst: bool,
}

/// Map a pad offset to a direction. Only the sign matters past the dead zone.
pub fn pad_direction(offset: f32, pad_width: f32) -> i8 {
    let dead_zone = pad_width.max(0.0) * PAD_DEAD_ZONE;
    if offset < -dead_zone {
        -1
    } else if offset > dead_zone {
        1
    } else {
        0
    }
}

/// Pad thumb position, clamped to the pad's travel
pub fn pad_thumb(offset: f32, pad_width: f32) -> f32 {
    let max_shift = pad_width.max(0.0) * PAD_MAX_SHIFT;
    offset.clamp(-max_shift, max_shift)
}

#[derive(Debug, Clone, Copy, Default)]
struct DragPad {
    left: bool,
    right: bool,
    thumb: f32,
}

impl DragPad {
    fn set_left(&mut self, down: bool) {
        self.left = down;
        if down {
            self.right = false;
        }
    }

    fn set_right(&mut self, down: bool) {
        self.right = down;
        if down {
            self.left = false;
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureMode {
    Tap,
    Swipe,
}

#[derive(Debug, Clone, Copy)]
struct Gesture {
    start_x: f32,
    start_ms: f64,
    mode: GestureMode,
    direction: i8,
}

/// Collapses all input sources into one [`InputSnapshot`] per tick
#[derive(Debug, Clone, Default)]
pub struct InputAggregator {
    caps: InputCapabilities,
    left_key: bool,
    right_key: bool,
    burst_key: bool,
    pad: DragPad,
    gesture: Option<Gesture>,
    burst_queued: bool,
}

impl InputAggregator {
    pub fn new(caps: InputCapabilities) -> Self {
        if !caps.pointer {
            log::warn!("Pointer input unavailable, gestures disabled");
        }
        if !caps.drag_pad {
            log::warn!("Drag pad unavailable");
        }
        Self {
            caps,
            ..Default::default()
        }
    }

    pub fn capabilities(&self) -> InputCapabilities {
        self.caps
    }

    /// Key state change. Holding the burst key queues a single burst.
    pub fn set_key(&mut self, key: Key, down: bool) {
        if !self.caps.keyboard {
            return;
        }
        match key {
            Key::Left => self.left_key = down,
            Key::Right => self.right_key = down,
            Key::Burst => {
                if down && !self.burst_key {
                    self.burst_queued = true;
                }
                self.burst_key = down;
            }
        }
    }

    /// Pad press or drag, `offset` measured from the pad center
    pub fn pad_move(&mut self, offset: f32, pad_width: f32) {
        if !self.caps.drag_pad {
            return;
        }
        self.pad.thumb = pad_thumb(offset, pad_width);
        match pad_direction(offset, pad_width) {
            -1 => self.pad.set_left(true),
            1 => self.pad.set_right(true),
            _ => {
                self.pad.set_left(false);
                self.pad.set_right(false);
            }
        }
    }

    /// Pad released, cancelled or left
    pub fn pad_release(&mut self) {
        self.pad.reset();
    }

    /// Current pad thumb offset, for the host to draw
    pub fn pad_thumb_offset(&self) -> f32 {
        self.pad.thumb
    }

    /// On-screen boost button
    pub fn press_boost(&mut self) {
        if self.caps.drag_pad || self.caps.pointer {
            self.burst_queued = true;
        }
    }

    pub fn pointer_down(&mut self, x: f32, now_ms: f64) {
        if !self.caps.pointer {
            return;
        }
        self.gesture = Some(Gesture {
            start_x: x,
            start_ms: now_ms,
            mode: GestureMode::Tap,
            direction: 0,
        });
    }

    pub fn pointer_move(&mut self, x: f32) {
        let Some(gesture) = self.gesture.as_mut() else {
            return;
        };
        let dx = x - gesture.start_x;
        if dx.abs() > SWIPE_THRESHOLD {
            gesture.mode = GestureMode::Swipe;
            gesture.direction = unit_sign(dx);
        }
    }

    pub fn pointer_up(&mut self, now_ms: f64) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        if gesture.mode == GestureMode::Tap && now_ms - gesture.start_ms < TAP_MAX_MS {
            self.burst_queued = true;
        }
    }

    /// Resolve this tick's direction and consume any pending burst
    pub fn snapshot(&mut self) -> InputSnapshot {
        let left = self.left_key || self.pad.left;
        let right = self.right_key || self.pad.right;
        let mut direction = i8::from(right) - i8::from(left);

        if let Some(gesture) = self.gesture.filter(|g| g.direction != 0) {
            direction = gesture.direction;
        }

        InputSnapshot {
            direction,
            burst: std::mem::take(&mut self.burst_queued),
        }
    }
}
