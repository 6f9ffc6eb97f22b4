//! Per-frame gesture control
//!
//! [`GestureController`] runs one frame through the pipeline:
//! landmarks -> pose -> label -> dispatch, then continuous window control
//! when it is active. All mutable session data lives in [`DetectionState`].

pub mod direct;
pub mod dispatcher;
pub mod state;

use std::time::Instant;

use crate::actions::{ActionMap, MoveDirection, OsActions};
use crate::config::AppConfig;
use crate::gesture::{palm_center, GestureLabel, GestureRegistry, HandPose, Keypoint};

pub use direct::{DirectWindowControl, ScreenInfo, ScreenSize};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use state::DetectionState;

/// What happened during one processed frame
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub label: GestureLabel,
    pub dispatch: DispatchOutcome,
    /// Window moves issued by continuous control
    pub moves: Vec<MoveDirection>,
    /// Extended digits, when a hand is visible
    pub finger_count: Option<u8>,
    /// Palm reference point, when a hand is visible
    pub palm: Option<Keypoint>,
}

impl FrameReport {
    fn no_hand() -> Self {
        Self {
            label: GestureLabel::None,
            dispatch: DispatchOutcome::Idle,
            moves: Vec::new(),
            finger_count: None,
            palm: None,
        }
    }
}

/// Resolver, dispatcher and continuous control wired together
#[derive(Debug, Clone, Default)]
pub struct GestureController {
    registry: GestureRegistry,
    dispatcher: Dispatcher,
    direct: DirectWindowControl,
}

impl GestureController {
    pub fn new(registry: GestureRegistry, dispatcher: Dispatcher, direct: DirectWindowControl) -> Self {
        Self {
            registry,
            dispatcher,
            direct,
        }
    }

    /// Build the controller described by a configuration
    pub fn from_config(config: &AppConfig) -> Self {
        let params = config.gesture.params();
        let registry = if config.gesture.enable_extra_gestures {
            GestureRegistry::extended(params)
        } else {
            GestureRegistry::standard(params)
        };
        let dispatcher = Dispatcher::new(ActionMap::standard(), config.gesture.cooldown())
            .with_min_hold(config.gesture.min_hold());
        let direct = DirectWindowControl::new(
            config.window_control.move_threshold_px,
            config.window_control.gate(),
            config.window_control.settle_delay(),
        );

        log::info!(
            "Gesture controller ready: {} gestures, cooldown {:.1}s",
            registry.entries().len(),
            dispatcher.cooldown().as_secs_f32()
        );
        Self::new(registry, dispatcher, direct)
    }

    pub fn registry(&self) -> &GestureRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Process one frame's detection result.
    ///
    /// `landmarks` is `None` (or too short) when no hand was found; that
    /// resolves to [`GestureLabel::None`] and drops the tracked palm position.
    pub fn process_frame(
        &self,
        state: &mut DetectionState,
        landmarks: Option<&[Keypoint]>,
        now: Instant,
        screen: &dyn ScreenInfo,
        os: &mut dyn OsActions,
    ) -> FrameReport {
        let hand = landmarks.and_then(|points| HandPose::from_landmarks(points).map(|pose| (points, pose)));

        let Some((points, pose)) = hand else {
            state.last_hand_screen_position = None;
            let dispatch = self.dispatcher.observe(state, GestureLabel::None, now, os);
            return FrameReport {
                dispatch,
                ..FrameReport::no_hand()
            };
        };

        let label = self.registry.resolve(&pose);
        let dispatch = self.dispatcher.observe(state, label, now, os);

        // Toggling this frame already reset the position, so activation only
        // records the baseline below
        let palm = palm_center(points);
        let moves = match palm {
            Some(palm) => self.direct.update(state, palm, screen, now, os),
            None => Vec::new(),
        };

        FrameReport {
            label,
            dispatch,
            moves,
            finger_count: Some(pose.extended_count()),
            palm,
        }
    }
}
