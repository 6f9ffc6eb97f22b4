//! Gesture resolution
//!
//! The registry holds an ordered list of (label, predicate, priority) entries.
//! Resolution walks the list and returns the first match, so the tighter
//! gestures must sit ahead of the permissive ones that would shadow them.

use std::fmt;

use super::classifiers::{self, GestureParams, Predicate};
use super::pose::{HandPose, Keypoint};

/// Gesture recognized in a single frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GestureLabel {
    #[default]
    None,
    Ok,
    ThumbsUp,
    Copy,
    Paste,
    MoveWindow,
    ResizeWindow,
    MinimizeWindow,
    DirectWindowControl,
    PeaceSign,
    Fist,
    OpenHand,
    Pointing,
    RockOn,
}

impl GestureLabel {
    /// Identifier used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureLabel::None => "NONE",
            GestureLabel::Ok => "OK",
            GestureLabel::ThumbsUp => "THUMBS_UP",
            GestureLabel::Copy => "COPY",
            GestureLabel::Paste => "PASTE",
            GestureLabel::MoveWindow => "MOVE_WINDOW",
            GestureLabel::ResizeWindow => "RESIZE_WINDOW",
            GestureLabel::MinimizeWindow => "MINIMIZE_WINDOW",
            GestureLabel::DirectWindowControl => "DIRECT_WINDOW_CONTROL",
            GestureLabel::PeaceSign => "PEACE_SIGN",
            GestureLabel::Fist => "FIST",
            GestureLabel::OpenHand => "OPEN_HAND",
            GestureLabel::Pointing => "POINTING",
            GestureLabel::RockOn => "ROCK_ON",
        }
    }

    /// Human readable name for the HUD
    pub fn display_name(&self) -> &'static str {
        match self {
            GestureLabel::None => "No gesture",
            GestureLabel::Ok => "OK",
            GestureLabel::ThumbsUp => "Thumbs up",
            GestureLabel::Copy => "Copy",
            GestureLabel::Paste => "Paste",
            GestureLabel::MoveWindow => "Move window",
            GestureLabel::ResizeWindow => "Resize window",
            GestureLabel::MinimizeWindow => "Minimize window",
            GestureLabel::DirectWindowControl => "Direct window control",
            GestureLabel::PeaceSign => "Peace sign",
            GestureLabel::Fist => "Fist",
            GestureLabel::OpenHand => "Open hand",
            GestureLabel::Pointing => "Pointing",
            GestureLabel::RockOn => "Rock on",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, GestureLabel::None)
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One registered gesture
#[derive(Clone, Copy)]
pub struct GestureEntry {
    pub label: GestureLabel,
    pub predicate: Predicate,
    /// Lower values are evaluated first
    pub priority: u16,
}

impl GestureEntry {
    pub fn matches(&self, pose: &HandPose, params: &GestureParams) -> bool {
        (self.predicate)(pose, params)
    }
}

impl fmt::Debug for GestureEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureEntry")
            .field("label", &self.label)
            .field("priority", &self.priority)
            .finish()
    }
}

/// Ordered set of gesture predicates
#[derive(Debug, Clone)]
pub struct GestureRegistry {
    entries: Vec<GestureEntry>,
    params: GestureParams,
}

impl Default for GestureRegistry {
    fn default() -> Self {
        Self::standard(GestureParams::default())
    }
}

impl GestureRegistry {
    /// Create an empty registry
    pub fn new(params: GestureParams) -> Self {
        Self {
            entries: Vec::new(),
            params,
        }
    }

    /// The eight core gestures in their tie-break order
    pub fn standard(params: GestureParams) -> Self {
        let mut registry = Self::new(params);
        registry.register(GestureLabel::Ok, classifiers::is_ok, 10);
        registry.register(GestureLabel::ThumbsUp, classifiers::is_thumbs_up, 20);
        registry.register(GestureLabel::Copy, classifiers::is_copy, 30);
        registry.register(GestureLabel::Paste, classifiers::is_paste, 40);
        registry.register(GestureLabel::MoveWindow, classifiers::is_move_window, 50);
        registry.register(GestureLabel::ResizeWindow, classifiers::is_resize_window, 60);
        registry.register(GestureLabel::MinimizeWindow, classifiers::is_minimize_window, 70);
        registry.register(
            GestureLabel::DirectWindowControl,
            classifiers::is_direct_window_control,
            80,
        );
        registry
    }

    /// Core gestures followed by the optional ones at the lowest priority
    pub fn extended(params: GestureParams) -> Self {
        let mut registry = Self::standard(params);
        registry.register(GestureLabel::PeaceSign, classifiers::is_peace_sign, 90);
        registry.register(GestureLabel::Fist, classifiers::is_fist, 100);
        registry.register(GestureLabel::OpenHand, classifiers::is_open_hand, 110);
        registry.register(GestureLabel::Pointing, classifiers::is_pointing, 120);
        registry.register(GestureLabel::RockOn, classifiers::is_rock_on, 130);
        registry
    }

    /// Add a gesture. Entries with equal priority keep registration order.
    pub fn register(&mut self, label: GestureLabel, predicate: Predicate, priority: u16) {
        let position = self
            .entries
            .iter()
            .position(|e| e.priority > priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            position,
            GestureEntry {
                label,
                predicate,
                priority,
            },
        );
    }

    /// Entries in evaluation order
    pub fn entries(&self) -> &[GestureEntry] {
        &self.entries
    }

    pub fn params(&self) -> &GestureParams {
        &self.params
    }

    /// First matching label for a pose, or `None`
    pub fn resolve(&self, pose: &HandPose) -> GestureLabel {
        self.entries
            .iter()
            .find(|e| e.matches(pose, &self.params))
            .map(|e| e.label)
            .unwrap_or(GestureLabel::None)
    }

    /// Resolve directly from a raw skeleton; an absent hand yields `None`
    pub fn resolve_landmarks(&self, landmarks: &[Keypoint]) -> GestureLabel {
        HandPose::from_landmarks(landmarks)
            .map(|pose| self.resolve(&pose))
            .unwrap_or(GestureLabel::None)
    }

    /// Whether a specific registered gesture matches, ignoring priority
    pub fn matches(&self, label: GestureLabel, landmarks: &[Keypoint]) -> bool {
        let Some(pose) = HandPose::from_landmarks(landmarks) else {
            return false;
        };
        self.entries
            .iter()
            .filter(|e| e.label == label)
            .any(|e| e.matches(&pose, &self.params))
    }
}
