//! Session state threaded through every frame

use std::time::Instant;

use crate::gesture::GestureLabel;

/// Mutable detection state owned by the frame loop.
///
/// Created once per session and passed by `&mut` into each frame's
/// processing, so the dispatch logic itself stays free of hidden state.
#[derive(Debug, Clone, Default)]
pub struct DetectionState {
    /// When the last action actually executed
    pub last_action_time: Option<Instant>,
    /// True while the label that last fired is still held
    pub gesture_sustained: bool,
    /// Label that set `gesture_sustained`
    pub sustained_label: GestureLabel,
    /// Label waiting out the minimum hold time, with the frame it first appeared
    pub pending: Option<(GestureLabel, Instant)>,
    /// Continuous window control is on
    pub direct_control_active: bool,
    /// Palm position on screen during the previous active frame
    pub last_hand_screen_position: Option<(i32, i32)>,
    /// When a window move was last issued
    pub last_window_move_time: Option<Instant>,
}

impl DetectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the edge and hold tracking, as when the hand leaves the frame
    pub fn clear_sustained(&mut self) {
        self.gesture_sustained = false;
        self.sustained_label = GestureLabel::None;
        self.pending = None;
    }
}
