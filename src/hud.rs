//! Debug overlay
//!
//! The overlay is a single status line shown in the window title. What it
//! contains follows the `debug` section of the configuration.

use std::time::Instant;

use crate::config::DebugConfig;
use crate::control::FrameReport;
use crate::gesture::GestureLabel;

pub const WINDOW_TITLE: &str = "GestIQ";

/// Frames-per-second estimate, refreshed once a second
#[derive(Debug, Clone)]
pub struct FpsCounter {
    fps: f64,
    frames_since_update: u32,
    last_update: Instant,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            fps: 0.0,
            frames_since_update: 0,
            last_update: now,
        }
    }

    /// Count one processed frame
    pub fn tick(&mut self, now: Instant) {
        self.frames_since_update += 1;

        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();
        if elapsed >= 1.0 {
            self.fps = self.frames_since_update as f64 / elapsed;
            self.frames_since_update = 0;
            self.last_update = now;
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }
}

/// Everything the overlay can show for the latest frame
#[derive(Debug, Clone, Default)]
pub struct HudState {
    pub label: GestureLabel,
    pub finger_count: Option<u8>,
    pub direct_control: bool,
    pub hand_visible: bool,
    pub palm: Option<(f32, f32)>,
    pub fps: f64,
}

impl HudState {
    pub fn update(&mut self, report: &FrameReport, direct_control: bool) {
        self.label = report.label;
        self.finger_count = report.finger_count;
        self.hand_visible = report.finger_count.is_some();
        self.palm = report.palm.map(|p| (p.x, p.y));
        self.direct_control = direct_control;
    }

    /// Compose the title line
    pub fn title(&self, debug: &DebugConfig) -> String {
        let mut parts = vec![WINDOW_TITLE.to_string()];

        if debug.show_gesture_info {
            if self.hand_visible {
                parts.push(self.label.display_name().to_string());
            } else {
                parts.push("No hand".to_string());
            }
            if let Some(count) = self.finger_count {
                parts.push(format!("Fingers: {}", count));
            }
            if self.direct_control {
                parts.push("Direct control ON".to_string());
            }
        }

        if debug.show_landmarks {
            if let Some((x, y)) = self.palm {
                parts.push(format!("Palm ({:.2}, {:.2})", x, y));
            }
        }

        if debug.show_fps {
            parts.push(format!("{:.1} fps", self.fps));
        }

        parts.join(" | ")
    }
}
