//! Gesture recognition
//!
//! Turns one frame's hand skeleton into at most one [`GestureLabel`]:
//! landmark adapter ([`pose`]), stateless predicates ([`classifiers`]) and
//! the priority-ordered [`resolver`].

pub mod classifiers;
pub mod pose;
pub mod resolver;

#[cfg(test)]
pub(crate) mod fixtures;

pub use classifiers::{GestureParams, Precision};
pub use pose::{palm_center, Digit, HandPose, Keypoint, LANDMARK_COUNT};
pub use resolver::{GestureEntry, GestureLabel, GestureRegistry};
