//! Hand landmark detection
//!
//! Runs the MediaPipe hand landmark model (PINTO Model Zoo ONNX export)
//! through ONNX Runtime on each processed frame and yields at most one hand
//! as 21 normalized keypoints.

use std::path::{Path, PathBuf};

use ndarray::Array4;
use ort::session::Session;
use thiserror::Error;

use crate::camera::CameraFrame;
use crate::config::DetectorConfig;
use crate::gesture::{Keypoint, LANDMARK_COUNT};

/// Model file looked up inside the models directory
pub const HAND_LANDMARK_MODEL: &str = "hand_landmark.onnx";

/// Square input edge of the landmark model, in pixels
const INPUT_SIZE: u32 = 224;

/// Detector errors
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Models directory not found. Create a 'models' directory containing hand_landmark.onnx")]
    ModelDirMissing,
    #[error("Model not found: {0}")]
    ModelMissing(PathBuf),
    #[error("Failed to load model: {0}")]
    Load(String),
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Unexpected model output: {0}")]
    Output(String),
}

/// A detected hand
#[derive(Clone, Debug)]
pub struct Hand {
    /// 21 keypoints, normalized to the frame
    pub landmarks: Vec<Keypoint>,
    /// Hand presence score in `[0, 1]`
    pub presence: f32,
    pub is_right: bool,
}

/// Anything that can turn a camera frame into a hand skeleton
pub trait LandmarkSource {
    /// `Ok(None)` means no hand this frame, which is not an error
    fn detect(&mut self, frame: &CameraFrame) -> Result<Option<Hand>, DetectorError>;
}

/// Presence thresholds with tracking hysteresis.
///
/// A hand has to clear the detection threshold to be picked up; once it was
/// seen on the previous frame, the lower tracking threshold keeps it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PresenceGate {
    detection: f32,
    tracking: f32,
    tracked: bool,
}

impl PresenceGate {
    pub fn new(detection: f32, tracking: f32) -> Self {
        Self {
            detection,
            tracking,
            tracked: false,
        }
    }

    pub fn threshold(&self) -> f32 {
        if self.tracked {
            self.tracking
        } else {
            self.detection
        }
    }

    /// Decide whether a score counts as a hand and remember the result
    pub fn accept(&mut self, presence: f32) -> bool {
        self.tracked = presence >= self.threshold();
        self.tracked
    }

    pub fn reset(&mut self) {
        self.tracked = false;
    }
}

/// Raw model outputs decoded into a candidate hand
#[derive(Clone, Debug, PartialEq)]
struct RawHand {
    landmarks: Vec<Keypoint>,
    presence: f32,
    handedness: f32,
}

/// MediaPipe hand landmark model backed by ONNX Runtime
pub struct HandLandmarker {
    session: Session,
    gate: PresenceGate,
}

impl HandLandmarker {
    /// Load the model from the first models directory found
    pub fn new(config: &DetectorConfig) -> Result<Self, DetectorError> {
        let model_dir = find_model_dir().ok_or(DetectorError::ModelDirMissing)?;
        log::info!("Model directory: {:?}", model_dir);
        Self::from_file(&model_dir.join(HAND_LANDMARK_MODEL), config)
    }

    pub fn from_file(path: &Path, config: &DetectorConfig) -> Result<Self, DetectorError> {
        if !path.exists() {
            return Err(DetectorError::ModelMissing(path.to_path_buf()));
        }

        ort::init()
            .with_name("GestIQ")
            .commit()
            .map_err(|e| DetectorError::Load(format!("ONNX Runtime init: {}", e)))?;

        let session = Session::builder()
            .and_then(|builder| builder.with_intra_threads(2))
            .and_then(|builder| builder.commit_from_file(path))
            .map_err(|e| DetectorError::Load(format!("{:?}: {}", path, e)))?;

        log::info!("Loaded hand landmark model from {:?}", path);
        if config.max_num_hands > 1 {
            log::warn!("Only one hand is tracked; max_num_hands={} ignored", config.max_num_hands);
        }

        Ok(Self {
            session,
            gate: PresenceGate::new(config.min_detection_confidence, config.min_tracking_confidence),
        })
    }

    fn infer(&mut self, frame: &CameraFrame) -> Result<Vec<Vec<f32>>, DetectorError> {
        let input = frame.to_tensor_hwc(INPUT_SIZE, INPUT_SIZE);
        let array = Array4::from_shape_vec((1, INPUT_SIZE as usize, INPUT_SIZE as usize, 3), input)
            .map_err(|e| DetectorError::Inference(format!("input shape: {}", e)))?;
        let tensor = ort::value::Tensor::from_array(array)
            .map_err(|e| DetectorError::Inference(format!("input tensor: {}", e)))?;

        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .map_err(|e| DetectorError::Inference(e.to_string()))?;

        let mut tensors = Vec::new();
        for (_name, value) in outputs.iter() {
            let (_shape, data) = value
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectorError::Output(e.to_string()))?;
            tensors.push(data.to_vec());
        }
        Ok(tensors)
    }
}

impl LandmarkSource for HandLandmarker {
    fn detect(&mut self, frame: &CameraFrame) -> Result<Option<Hand>, DetectorError> {
        let outputs = self.infer(frame)?;
        let raw = decode_outputs(&outputs)?;

        if !self.gate.accept(raw.presence) {
            return Ok(None);
        }

        Ok(Some(Hand {
            landmarks: raw.landmarks,
            presence: raw.presence,
            is_right: raw.handedness > 0.5,
        }))
    }
}

/// Models ship as logits or as probabilities depending on the export
fn probability(value: f32) -> f32 {
    if (0.0..=1.0).contains(&value) {
        value
    } else {
        1.0 / (1.0 + (-value).exp())
    }
}

/// Pick the landmark, presence and handedness tensors out of the outputs.
///
/// Outputs are told apart by size: the first 63-value tensor holds the image
/// landmarks (the second one, if present, is world coordinates), and the
/// single-value tensors are presence then handedness.
fn decode_outputs(outputs: &[Vec<f32>]) -> Result<RawHand, DetectorError> {
    let coords = outputs
        .iter()
        .find(|t| t.len() == LANDMARK_COUNT * 3)
        .ok_or_else(|| DetectorError::Output(format!("no {}-value landmark tensor", LANDMARK_COUNT * 3)))?;
    let mut scalars = outputs.iter().filter(|t| t.len() == 1).map(|t| t[0]);
    let presence = scalars
        .next()
        .map(probability)
        .ok_or_else(|| DetectorError::Output("no presence score".to_string()))?;
    let handedness = scalars.next().map(probability).unwrap_or(0.5);

    let size = INPUT_SIZE as f32;
    let landmarks = coords
        .chunks_exact(3)
        .map(|xyz| Keypoint {
            x: (xyz[0] / size).clamp(0.0, 1.0),
            y: (xyz[1] / size).clamp(0.0, 1.0),
            z: xyz[2] / size,
        })
        .collect();

    Ok(RawHand {
        landmarks,
        presence,
        handedness,
    })
}

/// Find the models directory next to the executable or in the working directory
fn find_model_dir() -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
        // target/<profile>/gestiq -> ../../models for cargo run
        candidates.extend(exe.ancestors().skip(1).take(3).map(|dir| dir.join("models")));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("models"));
    }
    candidates.into_iter().find(|dir| dir.is_dir())
}
