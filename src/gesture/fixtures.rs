//! Synthetic hand skeletons for tests

use super::pose::*;

const JOINT_Y: f32 = 0.5;
const EXTENDED_TIP_Y: f32 = 0.4;
const CLOSED_TIP_Y: f32 = 0.6;

/// Builds a 21-point skeleton digit by digit.
///
/// Every digit starts closed; the thumb starts as a downward chain.
pub struct HandBuilder {
    landmarks: Vec<Keypoint>,
}

impl HandBuilder {
    pub fn new() -> Self {
        let mut landmarks = vec![Keypoint::new(0.5, 0.7); LANDMARK_COUNT];
        let columns = [
            (THUMB_MCP, 0.2),
            (THUMB_IP, 0.2),
            (THUMB_TIP, 0.2),
            (INDEX_PIP, 0.35),
            (INDEX_TIP, 0.35),
            (MIDDLE_PIP, 0.5),
            (MIDDLE_TIP, 0.5),
            (RING_PIP, 0.65),
            (RING_TIP, 0.65),
            (PINKY_PIP, 0.8),
            (PINKY_TIP, 0.8),
        ];
        for (idx, x) in columns {
            landmarks[idx].x = x;
        }

        let mut builder = Self { landmarks };
        for digit in Digit::ALL {
            builder = builder.close(digit);
        }
        builder
    }

    fn indices(digit: Digit) -> (usize, usize) {
        match digit {
            Digit::Thumb => (THUMB_TIP, THUMB_IP),
            Digit::Index => (INDEX_TIP, INDEX_PIP),
            Digit::Middle => (MIDDLE_TIP, MIDDLE_PIP),
            Digit::Ring => (RING_TIP, RING_PIP),
            Digit::Pinky => (PINKY_TIP, PINKY_PIP),
        }
    }

    pub fn extend(self, digit: Digit) -> Self {
        match digit {
            Digit::Thumb => self.thumb_chain(EXTENDED_TIP_Y, JOINT_Y, CLOSED_TIP_Y),
            _ => self.tip_offset(digit, EXTENDED_TIP_Y - JOINT_Y),
        }
    }

    pub fn close(self, digit: Digit) -> Self {
        match digit {
            Digit::Thumb => self.thumb_chain(CLOSED_TIP_Y, JOINT_Y, EXTENDED_TIP_Y),
            _ => self.tip_offset(digit, CLOSED_TIP_Y - JOINT_Y),
        }
    }

    pub fn extend_all(mut self) -> Self {
        for digit in Digit::ALL {
            self = self.extend(digit);
        }
        self
    }

    /// Place a tip `dy` away from its joint (negative is up)
    pub fn tip_offset(mut self, digit: Digit, dy: f32) -> Self {
        let (tip, joint) = Self::indices(digit);
        self.landmarks[joint].y = JOINT_Y;
        self.landmarks[tip].y = JOINT_Y + dy;
        self
    }

    pub fn thumb_chain(mut self, tip: f32, ip: f32, mcp: f32) -> Self {
        self.landmarks[THUMB_TIP].y = tip;
        self.landmarks[THUMB_IP].y = ip;
        self.landmarks[THUMB_MCP].y = mcp;
        self
    }

    /// Bring the index tip onto the thumb tip
    pub fn pinch(mut self) -> Self {
        let thumb = self.landmarks[THUMB_TIP];
        self.landmarks[INDEX_TIP].x = thumb.x + 0.01;
        self.landmarks[INDEX_TIP].y = thumb.y + 0.01;
        self
    }

    /// Move the whole hand so that the palm center lands at (x, y)
    pub fn palm_at(mut self, x: f32, y: f32) -> Self {
        if let Some(palm) = palm_center(&self.landmarks) {
            let (dx, dy) = (x - palm.x, y - palm.y);
            for point in &mut self.landmarks {
                point.x += dx;
                point.y += dy;
            }
        }
        self
    }

    pub fn build(self) -> Vec<Keypoint> {
        self.landmarks
    }

    pub fn pose(self) -> HandPose {
        HandPose::from_landmarks(&self.landmarks).expect("builder always yields 21 keypoints")
    }
}
