//! Configuration for GestIQ
//!
//! A single JSON document grouped by concern. Every field has a default, so a
//! partial file (or no file at all) still yields a complete configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::control::direct::ScreenSize;
use crate::gesture::GestureParams;

/// File looked up in the working directory when no path is given
pub const LOCAL_CONFIG_FILE: &str = "gestiq.json";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not find config directory")]
    NoConfigDir,
}

/// Capture device settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Device index as enumerated by the capture backend
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: 1280,
            height: 720,
            fps: 60,
        }
    }
}

/// Hand landmark detector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub max_num_hands: u32,
    /// Presence score needed to pick up a new hand
    pub min_detection_confidence: f32,
    /// Presence score needed to keep a hand seen on the previous frame
    pub min_tracking_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_num_hands: 1,
            min_detection_confidence: 0.9,
            min_tracking_confidence: 0.7,
        }
    }
}

/// Classification and dispatch thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Thumb-index pinch distance for OK (normalized units)
    pub ok_distance: f32,
    /// Seconds between two executed actions
    pub action_cooldown: f32,
    /// Seconds a gesture must be held before it fires
    pub min_gesture_duration: f32,
    /// Register peace sign, fist, open hand, pointing and rock on
    pub enable_extra_gestures: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            ok_distance: 0.05,
            action_cooldown: 2.0,
            min_gesture_duration: 0.0,
            enable_extra_gestures: false,
        }
    }
}

impl GestureConfig {
    pub fn params(&self) -> GestureParams {
        GestureParams {
            ok_distance: self.ok_distance,
        }
    }

    pub fn cooldown(&self) -> Duration {
        seconds(self.action_cooldown)
    }

    pub fn min_hold(&self) -> Duration {
        seconds(self.min_gesture_duration)
    }
}

/// Continuous window control settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowControlConfig {
    /// Per-frame palm displacement that triggers a move
    pub move_threshold_px: i32,
    /// Seconds between two issued moves
    pub move_gate: f32,
    /// Pause after each move
    pub settle_delay_ms: u64,
    /// Resolution used when the display cannot be queried
    pub fallback_screen_width: u32,
    pub fallback_screen_height: u32,
}

impl Default for WindowControlConfig {
    fn default() -> Self {
        Self {
            move_threshold_px: 30,
            move_gate: 1.0,
            settle_delay_ms: 100,
            fallback_screen_width: 1920,
            fallback_screen_height: 1080,
        }
    }
}

impl WindowControlConfig {
    pub fn gate(&self) -> Duration {
        seconds(self.move_gate)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn fallback_screen(&self) -> ScreenSize {
        ScreenSize::new(self.fallback_screen_width, self.fallback_screen_height)
    }
}

/// Overlay toggles and log level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub show_landmarks: bool,
    pub show_fps: bool,
    pub show_gesture_info: bool,
    /// Default filter for the logger; `RUST_LOG` wins when set
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_landmarks: true,
            show_fps: true,
            show_gesture_info: true,
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Frame pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Upper bound on processed frames per second
    pub max_fps: u32,
    /// Run detection on every n-th camera frame
    pub frame_skip: u32,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_fps: 30,
            frame_skip: 1,
        }
    }
}

impl PerformanceConfig {
    /// Minimum time between two redraws
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.max_fps.max(1) as f64)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub camera: CameraConfig,
    pub detector: DetectorConfig,
    pub gesture: GestureConfig,
    pub window_control: WindowControlConfig,
    pub debug: DebugConfig,
    pub performance: PerformanceConfig,
}

impl AppConfig {
    /// User-level config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("GestIQ");
            p.push("config.json");
            p
        })
    }

    /// Load and sanitise a config file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&contents)?;
        config.sanitize();
        Ok(config)
    }

    /// Write the config as pretty JSON, creating parent directories
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Save to the user config directory
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::user_config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to_file(&path)?;
        Ok(path)
    }

    /// Pick the config file for a session.
    ///
    /// An explicit path always wins, even if it does not exist. Otherwise
    /// `gestiq.json` in the working directory, then the user config directory.
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => [Some(PathBuf::from(LOCAL_CONFIG_FILE)), Self::user_config_path()]
                .into_iter()
                .flatten()
                .find(|path| path.exists()),
        }
    }

    /// Locate and load a config, falling back to defaults on any failure
    pub fn load(explicit: Option<&Path>) -> Self {
        let Some(path) = Self::locate(explicit) else {
            return Self::default();
        };
        match Self::load_from_file(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Failed to load config {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Pull out-of-range values back to something usable
    pub fn sanitize(&mut self) {
        self.camera.width = self.camera.width.max(1);
        self.camera.height = self.camera.height.max(1);
        self.camera.fps = self.camera.fps.max(1);

        self.detector.max_num_hands = self.detector.max_num_hands.max(1);
        self.detector.min_detection_confidence = clamp_unit(self.detector.min_detection_confidence);
        self.detector.min_tracking_confidence = clamp_unit(self.detector.min_tracking_confidence);

        self.gesture.ok_distance = non_negative(self.gesture.ok_distance);
        self.gesture.action_cooldown = non_negative(self.gesture.action_cooldown);
        self.gesture.min_gesture_duration = non_negative(self.gesture.min_gesture_duration);

        self.window_control.move_threshold_px = self.window_control.move_threshold_px.max(0);
        self.window_control.move_gate = non_negative(self.window_control.move_gate);
        self.window_control.fallback_screen_width = self.window_control.fallback_screen_width.max(1);
        self.window_control.fallback_screen_height = self.window_control.fallback_screen_height.max(1);

        self.performance.max_fps = self.performance.max_fps.max(1);
        self.performance.frame_skip = self.performance.frame_skip.max(1);
    }
}

/// Seconds as a duration; negative or NaN values count as zero
fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(non_negative(value)).unwrap_or(Duration::MAX)
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn non_negative(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.camera.width, 1280);
        assert_eq!(config.camera.height, 720);
        assert_eq!(config.camera.fps, 60);
        assert_eq!(config.detector.min_detection_confidence, 0.9);
        assert_eq!(config.gesture.ok_distance, 0.05);
        assert_eq!(config.gesture.cooldown(), Duration::from_secs(2));
        assert_eq!(config.window_control.move_threshold_px, 30);
        assert_eq!(config.window_control.gate(), Duration::from_secs(1));
        assert_eq!(config.performance.max_fps, 30);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "gesture": { "action_cooldown": 0.5 }, "performance": { "frame_skip": 3 } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.gesture.action_cooldown, 0.5);
        assert_eq!(config.gesture.ok_distance, 0.05);
        assert_eq!(config.performance.frame_skip, 3);
        assert_eq!(config.performance.max_fps, 30);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_sanitize() {
        let mut config = AppConfig::default();
        config.performance.frame_skip = 0;
        config.performance.max_fps = 0;
        config.detector.min_detection_confidence = 1.5;
        config.detector.min_tracking_confidence = -0.2;
        config.gesture.action_cooldown = -1.0;
        config.window_control.move_threshold_px = -5;
        config.sanitize();

        assert_eq!(config.performance.frame_skip, 1);
        assert_eq!(config.performance.max_fps, 1);
        assert_eq!(config.detector.min_detection_confidence, 1.0);
        assert_eq!(config.detector.min_tracking_confidence, 0.0);
        assert_eq!(config.gesture.action_cooldown, 0.0);
        assert_eq!(config.window_control.move_threshold_px, 0);
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("gestiq-config-{}.json", std::process::id()));
        let mut config = AppConfig::default();
        config.gesture.enable_extra_gestures = true;
        config.camera.index = 2;
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);

        let resolved = AppConfig::load(Some(path.as_path()));
        assert!(resolved.gesture.enable_extra_gestures);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("gestiq-bad-{}.json", std::process::id()));
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(AppConfig::load_from_file(&path), Err(ConfigError::Json(_))));
        assert_eq!(AppConfig::load(Some(path.as_path())), AppConfig::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_explicit_file() {
        let path = Path::new("/definitely/not/here/gestiq.json");
        assert_eq!(AppConfig::locate(Some(path)), Some(path.to_path_buf()));
        assert!(matches!(AppConfig::load_from_file(path), Err(ConfigError::Io(_))));
        assert_eq!(AppConfig::load(Some(path)), AppConfig::default());
    }

    #[test]
    fn test_frame_interval() {
        let perf = PerformanceConfig::default();
        let interval = perf.frame_interval();
        assert!(interval > Duration::from_millis(33) && interval < Duration::from_millis(34));
    }
}
