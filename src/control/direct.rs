//! Continuous window control
//!
//! While active, the palm's frame-to-frame displacement in screen pixels is
//! turned into discrete window-move commands. Each frame is compared only to
//! the one before it, so slow drifts never add up to a move.

use std::time::{Duration, Instant};

use crate::actions::{MoveDirection, OsActions};
use crate::gesture::Keypoint;

use super::state::DetectionState;

/// Displacement (pixels) a single frame must exceed to move the window
pub const DEFAULT_MOVE_THRESHOLD_PX: i32 = 30;

/// Minimum time between two issued moves, across both axes
pub const DEFAULT_MOVE_GATE: Duration = Duration::from_secs(1);

/// Blocking pause after each move so the window manager can catch up
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Display resolution in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Map a normalized point to absolute pixels
    pub fn to_pixels(&self, point: Keypoint) -> (i32, i32) {
        (
            (point.x * self.width as f32).round() as i32,
            (point.y * self.height as f32).round() as i32,
        )
    }
}

/// Source of the current display resolution
pub trait ScreenInfo {
    fn screen_size(&self) -> ScreenSize;
}

impl ScreenInfo for ScreenSize {
    fn screen_size(&self) -> ScreenSize {
        *self
    }
}

/// Switch continuous control on or off; returns the new state.
///
/// Either way the tracked position is dropped, so the next active frame only
/// sets a baseline.
pub fn toggle(state: &mut DetectionState) -> bool {
    state.direct_control_active = !state.direct_control_active;
    state.last_hand_screen_position = None;
    log::info!(
        "Direct window control {}",
        if state.direct_control_active { "enabled" } else { "disabled" }
    );
    state.direct_control_active
}

/// Displacement-to-move translator for the active mode
#[derive(Debug, Clone)]
pub struct DirectWindowControl {
    threshold_px: i32,
    gate: Duration,
    settle_delay: Duration,
}

impl Default for DirectWindowControl {
    fn default() -> Self {
        Self::new(DEFAULT_MOVE_THRESHOLD_PX, DEFAULT_MOVE_GATE, DEFAULT_SETTLE_DELAY)
    }
}

impl DirectWindowControl {
    pub fn new(threshold_px: i32, gate: Duration, settle_delay: Duration) -> Self {
        Self {
            threshold_px,
            gate,
            settle_delay,
        }
    }

    /// Process one frame with a visible hand.
    ///
    /// Returns the moves issued this frame. Displacement is always measured
    /// and the position cache always updated; the moves are dropped when the
    /// previous one was less than the gate interval ago.
    pub fn update(
        &self,
        state: &mut DetectionState,
        palm: Keypoint,
        screen: &dyn ScreenInfo,
        now: Instant,
        os: &mut dyn OsActions,
    ) -> Vec<MoveDirection> {
        if !state.direct_control_active {
            return Vec::new();
        }

        let position = screen.screen_size().to_pixels(palm);
        let Some(previous) = state.last_hand_screen_position.replace(position) else {
            return Vec::new();
        };

        let delta_x = position.0 - previous.0;
        let delta_y = position.1 - previous.1;

        let horizontal = (delta_x.abs() > self.threshold_px).then(|| {
            if delta_x > 0 {
                MoveDirection::Right
            } else {
                MoveDirection::Left
            }
        });
        let vertical = (delta_y.abs() > self.threshold_px).then(|| {
            if delta_y > 0 {
                MoveDirection::Down
            } else {
                MoveDirection::Up
            }
        });

        if horizontal.is_none() && vertical.is_none() {
            return Vec::new();
        }

        if let Some(last) = state.last_window_move_time {
            if now.saturating_duration_since(last) < self.gate {
                log::debug!("Window move dropped (dx={}, dy={}), gate closed", delta_x, delta_y);
                return Vec::new();
            }
        }

        let moves: Vec<MoveDirection> = horizontal.into_iter().chain(vertical).collect();
        for &direction in &moves {
            self.issue(direction, os);
        }
        state.last_window_move_time = Some(now);
        moves
    }

    fn issue(&self, direction: MoveDirection, os: &mut dyn OsActions) {
        match os.move_window(direction) {
            Ok(()) => log::info!("Window moved {:?}", direction),
            Err(e) => log::warn!("Window move {:?} failed: {}", direction, e),
        }
        if !self.settle_delay.is_zero() {
            std::thread::sleep(self.settle_delay);
        }
    }
}
