//! Per-frame gesture predicates
//!
//! Every classifier is a pure function of one [`HandPose`]. Two precision
//! regimes coexist and are kept apart on purpose: OK, THUMBS_UP and
//! MINIMIZE_WINDOW compare tip and joint directly, while the editing and
//! window gestures require a margin before a digit counts as extended.

use super::pose::{Digit, HandPose, Keypoint};

/// How far above its joint a tip must be to count as extended (margined regime)
pub const EXTEND_MARGIN: f32 = 0.02;

/// Tip may sit up to this far above its joint and still count as closed (margined regime)
pub const CLOSE_MARGIN: f32 = 0.01;

/// Default maximum thumb-index distance for the OK pinch
pub const DEFAULT_OK_DISTANCE: f32 = 0.05;

/// Threshold regime for the extended/closed tests
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Precision {
    /// Plain `tip.y < joint.y` / `tip.y > joint.y`
    Strict,
    /// `tip.y < joint.y - 0.02` / `tip.y > joint.y - 0.01`
    Margined,
}

impl Precision {
    pub fn extended(self, tip: Keypoint, joint: Keypoint) -> bool {
        match self {
            Precision::Strict => tip.y < joint.y,
            Precision::Margined => tip.y < joint.y - EXTEND_MARGIN,
        }
    }

    pub fn closed(self, tip: Keypoint, joint: Keypoint) -> bool {
        match self {
            Precision::Strict => tip.y > joint.y,
            Precision::Margined => tip.y > joint.y - CLOSE_MARGIN,
        }
    }
}

/// Numeric parameters shared by the classifiers
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureParams {
    /// Maximum thumb-tip to index-tip distance for OK
    pub ok_distance: f32,
}

impl Default for GestureParams {
    fn default() -> Self {
        Self {
            ok_distance: DEFAULT_OK_DISTANCE,
        }
    }
}

/// Signature shared by every gesture predicate
pub type Predicate = fn(&HandPose, &GestureParams) -> bool;

impl HandPose {
    pub fn is_extended(&self, digit: Digit, precision: Precision) -> bool {
        let (tip, joint) = self.digit(digit);
        precision.extended(tip, joint)
    }

    pub fn is_closed(&self, digit: Digit, precision: Precision) -> bool {
        let (tip, joint) = self.digit(digit);
        precision.closed(tip, joint)
    }

    fn all_extended(&self, digits: &[Digit], precision: Precision) -> bool {
        digits.iter().all(|&d| self.is_extended(d, precision))
    }

    fn all_closed(&self, digits: &[Digit], precision: Precision) -> bool {
        digits.iter().all(|&d| self.is_closed(d, precision))
    }

    /// Thumb pointing up: tip above IP above MCP
    pub fn thumb_up(&self) -> bool {
        self.thumb_tip.y < self.thumb_ip.y && self.thumb_ip.y < self.thumb_mcp.y
    }

    /// Thumb pointing down: tip below IP below MCP
    pub fn thumb_down(&self) -> bool {
        self.thumb_tip.y > self.thumb_ip.y && self.thumb_ip.y > self.thumb_mcp.y
    }

    /// Number of strictly extended digits (0-5)
    pub fn extended_count(&self) -> u8 {
        Digit::ALL
            .iter()
            .filter(|&&d| self.is_extended(d, Precision::Strict))
            .count() as u8
    }
}

use Digit::{Index, Middle, Pinky, Ring, Thumb};
use Precision::{Margined, Strict};

/// Thumb and index tips pinched together, the other three fingers up
pub fn is_ok(pose: &HandPose, params: &GestureParams) -> bool {
    pose.thumb_tip.distance(&pose.index_tip) < params.ok_distance
        && pose.all_extended(&[Middle, Ring, Pinky], Strict)
}

pub fn is_thumbs_up(pose: &HandPose, _params: &GestureParams) -> bool {
    pose.thumb_up() && pose.all_closed(&Digit::FINGERS, Strict)
}

/// Index and middle up
pub fn is_copy(pose: &HandPose, _params: &GestureParams) -> bool {
    pose.all_extended(&[Index, Middle], Margined) && pose.all_closed(&[Thumb, Ring, Pinky], Margined)
}

/// Thumb and index up
pub fn is_paste(pose: &HandPose, _params: &GestureParams) -> bool {
    pose.all_extended(&[Thumb, Index], Margined) && pose.all_closed(&[Middle, Ring, Pinky], Margined)
}

/// Index, middle and ring up
pub fn is_move_window(pose: &HandPose, _params: &GestureParams) -> bool {
    pose.all_extended(&[Index, Middle, Ring], Margined) && pose.all_closed(&[Thumb, Pinky], Margined)
}

/// Thumb, index and middle up
pub fn is_resize_window(pose: &HandPose, _params: &GestureParams) -> bool {
    pose.all_extended(&[Thumb, Index, Middle], Margined) && pose.all_closed(&[Ring, Pinky], Margined)
}

pub fn is_minimize_window(pose: &HandPose, _params: &GestureParams) -> bool {
    pose.thumb_down() && pose.all_closed(&Digit::FINGERS, Strict)
}

/// Open hand
pub fn is_direct_window_control(pose: &HandPose, _params: &GestureParams) -> bool {
    pose.all_extended(&Digit::ALL, Margined)
}

// Optional gestures. These use the strict regime throughout and only take part
// in resolution when explicitly enabled.

pub fn is_peace_sign(pose: &HandPose, _params: &GestureParams) -> bool {
    pose.all_extended(&[Index, Middle], Strict) && pose.all_closed(&[Ring, Pinky, Thumb], Strict)
}

pub fn is_fist(pose: &HandPose, _params: &GestureParams) -> bool {
    pose.all_closed(&Digit::ALL, Strict)
}

pub fn is_open_hand(pose: &HandPose, _params: &GestureParams) -> bool {
    pose.all_extended(&Digit::ALL, Strict)
}

pub fn is_pointing(pose: &HandPose, _params: &GestureParams) -> bool {
    pose.is_extended(Index, Strict) && pose.all_closed(&[Thumb, Middle, Ring, Pinky], Strict)
}

pub fn is_rock_on(pose: &HandPose, _params: &GestureParams) -> bool {
    pose.all_extended(&[Index, Pinky], Strict) && pose.all_closed(&[Thumb, Middle, Ring], Strict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::fixtures::HandBuilder;

    fn params() -> GestureParams {
        GestureParams::default()
    }

    #[test]
    fn test_margined_regime_is_asymmetric() {
        let joint = Keypoint::new(0.5, 0.5);

        // Slightly above the joint: strictly extended, but neither state when margined
        let tip = Keypoint::new(0.5, 0.488);
        assert!(Strict.extended(tip, joint));
        assert!(!Margined.extended(tip, joint));
        assert!(!Margined.closed(tip, joint));

        // A hair above the joint still counts as closed when margined
        let tip = Keypoint::new(0.5, 0.495);
        assert!(Margined.closed(tip, joint));
        assert!(!Strict.closed(tip, joint));

        let tip = Keypoint::new(0.5, 0.47);
        assert!(Margined.extended(tip, joint));
    }

    #[test]
    fn test_ok() {
        let pose = HandBuilder::new().extend(Middle).extend(Ring).extend(Pinky).pinch().pose();
        assert!(is_ok(&pose, &params()));

        // Pinch released
        let pose = HandBuilder::new().extend(Middle).extend(Ring).extend(Pinky).pose();
        assert!(!is_ok(&pose, &params()));

        // Pinky down
        let pose = HandBuilder::new().extend(Middle).extend(Ring).pinch().pose();
        assert!(!is_ok(&pose, &params()));
    }

    #[test]
    fn test_ok_distance_is_configurable() {
        let pose = HandBuilder::new().extend(Middle).extend(Ring).extend(Pinky).pinch().pose();
        let tight = GestureParams { ok_distance: 0.001 };
        assert!(!is_ok(&pose, &tight));
    }

    #[test]
    fn test_thumbs_up_and_minimize() {
        let up = HandBuilder::new().extend(Thumb).pose();
        assert!(is_thumbs_up(&up, &params()));
        assert!(!is_minimize_window(&up, &params()));

        let down = HandBuilder::new().pose();
        assert!(is_minimize_window(&down, &params()));
        assert!(!is_thumbs_up(&down, &params()));

        // Thumb tip above IP but IP below MCP is not a monotonic chain
        let broken = HandBuilder::new().thumb_chain(0.4, 0.6, 0.5).pose();
        assert!(!is_thumbs_up(&broken, &params()));
        assert!(!is_minimize_window(&broken, &params()));
    }

    #[test]
    fn test_editing_gestures() {
        let copy = HandBuilder::new().extend(Index).extend(Middle).pose();
        assert!(is_copy(&copy, &params()));
        assert!(!is_paste(&copy, &params()));

        let paste = HandBuilder::new().extend(Thumb).extend(Index).pose();
        assert!(is_paste(&paste, &params()));
        assert!(!is_copy(&paste, &params()));
    }

    #[test]
    fn test_window_gestures() {
        let mv = HandBuilder::new().extend(Index).extend(Middle).extend(Ring).pose();
        assert!(is_move_window(&mv, &params()));
        assert!(!is_resize_window(&mv, &params()));

        let resize = HandBuilder::new().extend(Thumb).extend(Index).extend(Middle).pose();
        assert!(is_resize_window(&resize, &params()));
        assert!(!is_move_window(&resize, &params()));

        let open = HandBuilder::new().extend_all().pose();
        assert!(is_direct_window_control(&open, &params()));
    }

    #[test]
    fn test_margined_gesture_rejects_borderline_extension() {
        // Middle finger only just above its joint: not extended enough for COPY
        let pose = HandBuilder::new().extend(Index).tip_offset(Middle, -0.01).pose();
        assert!(!is_copy(&pose, &params()));
    }

    #[test]
    fn test_optional_gestures() {
        let peace = HandBuilder::new().extend(Index).extend(Middle).pose();
        assert!(is_peace_sign(&peace, &params()));

        let fist = HandBuilder::new().pose();
        assert!(is_fist(&fist, &params()));

        let open = HandBuilder::new().extend_all().pose();
        assert!(is_open_hand(&open, &params()));
        assert!(!is_fist(&open, &params()));

        let point = HandBuilder::new().extend(Index).pose();
        assert!(is_pointing(&point, &params()));

        let rock = HandBuilder::new().extend(Index).extend(Pinky).pose();
        assert!(is_rock_on(&rock, &params()));
        assert!(!is_pointing(&rock, &params()));
    }

    #[test]
    fn test_extended_count() {
        assert_eq!(HandBuilder::new().pose().extended_count(), 0);
        assert_eq!(HandBuilder::new().extend(Index).extend(Middle).pose().extended_count(), 2);
        assert_eq!(HandBuilder::new().extend_all().pose().extended_count(), 5);
    }
}
