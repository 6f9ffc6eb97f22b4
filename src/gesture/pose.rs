//! Hand keypoints and the named subset the classifiers work on
//!
//! The detector produces 21 keypoints per hand in a fixed anatomical order
//! (MediaPipe hand topology). Coordinates are normalized to the frame, with
//! `y` growing downwards, so a smaller `y` is higher on screen.

/// Number of keypoints in a full hand skeleton
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// Landmarks averaged to get the palm center (wrist + the four finger MCPs)
const PALM_INDICES: [usize; 5] = [WRIST, INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];

/// A single normalized hand landmark
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Relative depth, ignored by the classifiers
    pub z: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Planar distance to another keypoint
    pub fn distance(&self, other: &Keypoint) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// The five digits of a hand
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Digit {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Digit {
    pub const ALL: [Digit; 5] = [Digit::Thumb, Digit::Index, Digit::Middle, Digit::Ring, Digit::Pinky];

    /// The four non-thumb digits
    pub const FINGERS: [Digit; 4] = [Digit::Index, Digit::Middle, Digit::Ring, Digit::Pinky];
}

/// Named keypoints required by the gesture classifiers
///
/// Built fresh every frame from the raw skeleton; it has no identity across frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandPose {
    pub thumb_tip: Keypoint,
    pub thumb_ip: Keypoint,
    pub thumb_mcp: Keypoint,
    pub index_tip: Keypoint,
    pub index_pip: Keypoint,
    pub middle_tip: Keypoint,
    pub middle_pip: Keypoint,
    pub ring_tip: Keypoint,
    pub ring_pip: Keypoint,
    pub pinky_tip: Keypoint,
    pub pinky_pip: Keypoint,
}

impl HandPose {
    /// Extract the named subset from a raw keypoint sequence.
    ///
    /// Returns `None` when fewer than 21 keypoints are given, which is how
    /// "no hand this frame" reaches the classifiers.
    pub fn from_landmarks(landmarks: &[Keypoint]) -> Option<Self> {
        if landmarks.len() < LANDMARK_COUNT {
            return None;
        }

        Some(Self {
            thumb_tip: landmarks[THUMB_TIP],
            thumb_ip: landmarks[THUMB_IP],
            thumb_mcp: landmarks[THUMB_MCP],
            index_tip: landmarks[INDEX_TIP],
            index_pip: landmarks[INDEX_PIP],
            middle_tip: landmarks[MIDDLE_TIP],
            middle_pip: landmarks[MIDDLE_PIP],
            ring_tip: landmarks[RING_TIP],
            ring_pip: landmarks[RING_PIP],
            pinky_tip: landmarks[PINKY_TIP],
            pinky_pip: landmarks[PINKY_PIP],
        })
    }

    /// Tip and reference joint used for the extended/closed test of a digit.
    ///
    /// The thumb is measured against its IP joint, the fingers against their PIP.
    pub fn digit(&self, digit: Digit) -> (Keypoint, Keypoint) {
        match digit {
            Digit::Thumb => (self.thumb_tip, self.thumb_ip),
            Digit::Index => (self.index_tip, self.index_pip),
            Digit::Middle => (self.middle_tip, self.middle_pip),
            Digit::Ring => (self.ring_tip, self.ring_pip),
            Digit::Pinky => (self.pinky_tip, self.pinky_pip),
        }
    }
}

/// Palm center used as the hand's reference point for window control
pub fn palm_center(landmarks: &[Keypoint]) -> Option<Keypoint> {
    if landmarks.len() < LANDMARK_COUNT {
        return None;
    }

    let count = PALM_INDICES.len() as f32;
    let x = PALM_INDICES.iter().map(|&i| landmarks[i].x).sum::<f32>() / count;
    let y = PALM_INDICES.iter().map(|&i| landmarks[i].y).sum::<f32>() / count;
    Some(Keypoint::new(x, y))
}
