//! Edge-triggered, cooldown-gated action dispatch

use std::time::{Duration, Instant};

use crate::actions::{Action, ActionMap, OsActions};
use crate::gesture::GestureLabel;

use super::direct;
use super::state::DetectionState;

/// Default minimum time between two executed actions
pub const DEFAULT_ACTION_COOLDOWN: Duration = Duration::from_secs(2);

/// What the dispatcher did with one frame's label
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No gesture this frame
    Idle,
    /// Waiting for the minimum hold time before the edge counts
    Pending(GestureLabel),
    /// Same gesture still held after its edge
    Held(GestureLabel),
    /// Rising edge inside the cooldown window
    CoolingDown(GestureLabel),
    /// Rising edge for a label with no action
    Unbound(GestureLabel),
    /// Action executed
    Fired(GestureLabel),
}

/// Turns the per-frame label stream into action executions
#[derive(Debug, Clone)]
pub struct Dispatcher {
    actions: ActionMap,
    cooldown: Duration,
    min_hold: Duration,
}

impl Dispatcher {
    pub fn new(actions: ActionMap, cooldown: Duration) -> Self {
        Self {
            actions,
            cooldown,
            min_hold: Duration::ZERO,
        }
    }

    /// Require a label to be held this long before its edge fires
    pub fn with_min_hold(mut self, min_hold: Duration) -> Self {
        self.min_hold = min_hold;
        self
    }

    pub fn actions(&self) -> &ActionMap {
        &self.actions
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Feed one frame's resolved label.
    ///
    /// Only the rising edge of a label reaches [`Dispatcher::execute`]; the
    /// edge flag drops as soon as the label goes away or changes.
    pub fn observe(
        &self,
        state: &mut DetectionState,
        label: GestureLabel,
        now: Instant,
        os: &mut dyn OsActions,
    ) -> DispatchOutcome {
        if label.is_none() {
            if state.gesture_sustained {
                log::debug!("Gesture {} released", state.sustained_label);
            }
            state.clear_sustained();
            return DispatchOutcome::Idle;
        }

        if state.gesture_sustained {
            if state.sustained_label == label {
                return DispatchOutcome::Held(label);
            }
            log::debug!("Gesture changed {} -> {}", state.sustained_label, label);
            state.clear_sustained();
        }

        let since = match state.pending {
            Some((pending, since)) if pending == label => since,
            _ => {
                state.pending = Some((label, now));
                now
            }
        };
        if now.saturating_duration_since(since) < self.min_hold {
            return DispatchOutcome::Pending(label);
        }

        state.pending = None;
        state.gesture_sustained = true;
        state.sustained_label = label;
        self.execute(state, label, now, os)
    }

    /// Run the action bound to `label` unless the cooldown is still running.
    ///
    /// OS failures are logged and swallowed; the attempt still starts a new
    /// cooldown window.
    pub fn execute(
        &self,
        state: &mut DetectionState,
        label: GestureLabel,
        now: Instant,
        os: &mut dyn OsActions,
    ) -> DispatchOutcome {
        if let Some(last) = state.last_action_time {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.cooldown {
                log::debug!(
                    "Gesture {} ignored, cooldown {:.1}s remaining",
                    label,
                    (self.cooldown - elapsed).as_secs_f32()
                );
                return DispatchOutcome::CoolingDown(label);
            }
        }

        let Some(binding) = self.actions.get(label) else {
            log::warn!("No action defined for gesture {}", label);
            return DispatchOutcome::Unbound(label);
        };

        state.last_action_time = Some(now);
        log::info!("Gesture {} detected: {}", label, binding.description);

        match &binding.action {
            Action::Launch(spec) => {
                if let Err(e) = os.launch(spec) {
                    log::warn!("{}", e);
                }
            }
            Action::Keys(chords) => {
                for chord in chords {
                    if let Err(e) = os.send_keys(chord) {
                        log::warn!("{}", e);
                        break;
                    }
                }
            }
            Action::ToggleDirectControl => {
                direct::toggle(state);
            }
        }

        DispatchOutcome::Fired(label)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(ActionMap::standard(), DEFAULT_ACTION_COOLDOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::recording::{Recorded, RecordingActions};
    use crate::actions::{ChordKey, KeyChord, Modifier};

    fn ms(t0: Instant, millis: u64) -> Instant {
        t0 + Duration::from_millis(millis)
    }

    #[test]
    fn test_sustained_gesture_fires_once() {
        let dispatcher = Dispatcher::default();
        let mut state = DetectionState::new();
        let mut os = RecordingActions::new();
        let t0 = Instant::now();

        let outcomes: Vec<_> = (0..5)
            .map(|i| dispatcher.observe(&mut state, GestureLabel::Ok, ms(t0, i * 33), &mut os))
            .collect();

        assert_eq!(outcomes[0], DispatchOutcome::Fired(GestureLabel::Ok));
        assert!(outcomes[1..].iter().all(|o| *o == DispatchOutcome::Held(GestureLabel::Ok)));
        assert_eq!(os.launches().len(), 1);
    }

    #[test]
    fn test_release_allows_new_edge_after_cooldown() {
        let dispatcher = Dispatcher::default();
        let mut state = DetectionState::new();
        let mut os = RecordingActions::new();
        let t0 = Instant::now();

        dispatcher.observe(&mut state, GestureLabel::Ok, t0, &mut os);
        dispatcher.observe(&mut state, GestureLabel::None, ms(t0, 100), &mut os);
        assert!(!state.gesture_sustained);

        let outcome = dispatcher.observe(&mut state, GestureLabel::Ok, ms(t0, 2500), &mut os);
        assert_eq!(outcome, DispatchOutcome::Fired(GestureLabel::Ok));
        assert_eq!(os.launches().len(), 2);
    }

    #[test]
    fn test_cooldown_blocks_second_edge() {
        let dispatcher = Dispatcher::default();
        let mut state = DetectionState::new();
        let mut os = RecordingActions::new();
        let t0 = Instant::now();

        dispatcher.observe(&mut state, GestureLabel::Ok, t0, &mut os);
        dispatcher.observe(&mut state, GestureLabel::None, ms(t0, 500), &mut os);
        let outcome = dispatcher.observe(&mut state, GestureLabel::ThumbsUp, ms(t0, 1000), &mut os);
        assert_eq!(outcome, DispatchOutcome::CoolingDown(GestureLabel::ThumbsUp));

        // Holding past the cooldown does not produce a late trigger
        let outcome = dispatcher.observe(&mut state, GestureLabel::ThumbsUp, ms(t0, 3000), &mut os);
        assert_eq!(outcome, DispatchOutcome::Held(GestureLabel::ThumbsUp));
        assert_eq!(os.launches().len(), 1);
        assert_eq!(state.last_action_time, Some(t0));
    }

    #[test]
    fn test_label_change_is_a_new_edge() {
        let dispatcher = Dispatcher::default();
        let mut state = DetectionState::new();
        let mut os = RecordingActions::new();
        let t0 = Instant::now();

        dispatcher.observe(&mut state, GestureLabel::Ok, t0, &mut os);
        let outcome = dispatcher.observe(&mut state, GestureLabel::Copy, ms(t0, 2100), &mut os);

        assert_eq!(outcome, DispatchOutcome::Fired(GestureLabel::Copy));
        assert_eq!(state.sustained_label, GestureLabel::Copy);
        assert_eq!(
            os.calls.last(),
            Some(&Recorded::Keys(KeyChord::new(&[Modifier::primary()], ChordKey::Char('c'))))
        );
    }

    #[test]
    fn test_unbound_label_is_a_no_op() {
        let dispatcher = Dispatcher::default();
        let mut state = DetectionState::new();
        let mut os = RecordingActions::new();
        let t0 = Instant::now();

        let outcome = dispatcher.observe(&mut state, GestureLabel::RockOn, t0, &mut os);
        assert_eq!(outcome, DispatchOutcome::Unbound(GestureLabel::RockOn));
        assert!(os.calls.is_empty());
        assert!(state.last_action_time.is_none());
    }

    #[test]
    fn test_launch_failure_keeps_session_going() {
        let dispatcher = Dispatcher::default();
        let mut state = DetectionState::new();
        let mut os = RecordingActions {
            fail_launches: true,
            ..Default::default()
        };
        let t0 = Instant::now();

        let outcome = dispatcher.observe(&mut state, GestureLabel::ThumbsUp, t0, &mut os);
        assert_eq!(outcome, DispatchOutcome::Fired(GestureLabel::ThumbsUp));
        assert_eq!(state.last_action_time, Some(t0));
    }

    #[test]
    fn test_window_menu_sends_all_chords() {
        let dispatcher = Dispatcher::default();
        let mut state = DetectionState::new();
        let mut os = RecordingActions::new();

        dispatcher.observe(&mut state, GestureLabel::ResizeWindow, Instant::now(), &mut os);
        assert_eq!(os.calls.len(), 2);
        assert_eq!(
            os.calls[1],
            Recorded::Keys(KeyChord::key(ChordKey::Char('s')))
        );
    }

    #[test]
    fn test_direct_control_toggles() {
        let dispatcher = Dispatcher::default();
        let mut state = DetectionState::new();
        let mut os = RecordingActions::new();
        let t0 = Instant::now();
        state.last_hand_screen_position = Some((10, 10));

        dispatcher.observe(&mut state, GestureLabel::DirectWindowControl, t0, &mut os);
        assert!(state.direct_control_active);
        assert!(state.last_hand_screen_position.is_none());

        dispatcher.observe(&mut state, GestureLabel::None, ms(t0, 100), &mut os);
        dispatcher.observe(&mut state, GestureLabel::DirectWindowControl, ms(t0, 2200), &mut os);
        assert!(!state.direct_control_active);
        assert!(os.calls.is_empty());
    }

    #[test]
    fn test_min_hold_delays_edge() {
        let dispatcher = Dispatcher::default().with_min_hold(Duration::from_millis(500));
        let mut state = DetectionState::new();
        let mut os = RecordingActions::new();
        let t0 = Instant::now();

        assert_eq!(
            dispatcher.observe(&mut state, GestureLabel::Ok, t0, &mut os),
            DispatchOutcome::Pending(GestureLabel::Ok)
        );
        assert_eq!(
            dispatcher.observe(&mut state, GestureLabel::Ok, ms(t0, 300), &mut os),
            DispatchOutcome::Pending(GestureLabel::Ok)
        );

        // A different label restarts the hold timer
        dispatcher.observe(&mut state, GestureLabel::Copy, ms(t0, 400), &mut os);
        assert_eq!(
            dispatcher.observe(&mut state, GestureLabel::Ok, ms(t0, 600), &mut os),
            DispatchOutcome::Pending(GestureLabel::Ok)
        );

        assert_eq!(
            dispatcher.observe(&mut state, GestureLabel::Ok, ms(t0, 1100), &mut os),
            DispatchOutcome::Fired(GestureLabel::Ok)
        );
        assert_eq!(os.launches().len(), 1);
    }
}
