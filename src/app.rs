//! Main application state
//!
//! Owns the camera, the landmark detector and the gesture controller, and
//! runs one detection + dispatch pass per redraw.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use winit::window::Window;

use crate::actions::SystemActions;
use crate::camera::{CameraCapture, CaptureSettings};
use crate::config::AppConfig;
use crate::control::{DetectionState, GestureController, ScreenInfo, ScreenSize};
use crate::hud::{FpsCounter, HudState};
use crate::ml::{DetectorError, HandLandmarker, LandmarkSource};

/// Runs detection on every n-th new camera frame
#[derive(Debug, Clone)]
pub struct FrameSkipper {
    every: u64,
    seen: u64,
}

impl FrameSkipper {
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1) as u64,
            seen: 0,
        }
    }

    /// Count a new frame and tell whether it should be processed
    pub fn should_process(&mut self) -> bool {
        let process = self.seen % self.every == 0;
        self.seen += 1;
        process
    }
}

/// Display resolution taken from the monitor hosting the window
#[derive(Debug, Clone, Copy)]
pub struct MonitorScreen {
    size: ScreenSize,
}

impl MonitorScreen {
    pub fn new(fallback: ScreenSize) -> Self {
        Self { size: fallback }
    }

    /// Re-query the monitor; keeps the last known size when none is reported
    pub fn refresh(&mut self, window: &Window) {
        if let Some(monitor) = window.current_monitor() {
            let size = monitor.size();
            if size.width > 0 && size.height > 0 {
                self.size = ScreenSize::new(size.width, size.height);
            }
        }
    }
}

impl ScreenInfo for MonitorScreen {
    fn screen_size(&self) -> ScreenSize {
        self.size
    }
}

/// Main application
pub struct App {
    window: Arc<Window>,
    config: AppConfig,

    camera: CameraCapture,
    detector: Box<dyn LandmarkSource>,
    last_camera_frame: Option<u64>,
    frame_skipper: FrameSkipper,

    controller: GestureController,
    state: DetectionState,
    os: SystemActions,
    screen: MonitorScreen,

    hud: HudState,
    fps: FpsCounter,
    last_title: String,
}

impl App {
    /// Open the camera and load the detector; either failing aborts startup
    pub fn new(window: Arc<Window>, config: AppConfig) -> anyhow::Result<Self> {
        let camera = CameraCapture::open(CaptureSettings {
            index: config.camera.index,
            width: config.camera.width,
            height: config.camera.height,
            fps: config.camera.fps,
        })
        .with_context(|| format!("Camera {} unavailable", config.camera.index))?;
        let (width, height) = camera.resolution();
        log::info!("Capturing at {}x{}", width, height);

        let detector = HandLandmarker::new(&config.detector).context("Hand landmark detector unavailable")?;

        let os = SystemActions::new();
        if !os.can_send_keys() {
            log::warn!("Keyboard gestures and window control will only be logged");
        }

        let mut screen = MonitorScreen::new(config.window_control.fallback_screen());
        screen.refresh(&window);
        let size = screen.screen_size();
        log::info!("Screen resolution: {}x{}", size.width, size.height);

        Ok(Self {
            controller: GestureController::from_config(&config),
            frame_skipper: FrameSkipper::new(config.performance.frame_skip),
            fps: FpsCounter::new(Instant::now()),
            window,
            config,
            camera,
            detector: Box::new(detector),
            last_camera_frame: None,
            state: DetectionState::new(),
            os,
            screen,
            hud: HudState::default(),
            last_title: String::new(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> &DetectionState {
        &self.state
    }

    /// Process the newest camera frame, if there is one we have not seen.
    ///
    /// Detector failures are returned to the caller, which ends the session.
    pub fn update(&mut self) -> Result<(), DetectorError> {
        let Some(frame) = self.camera.latest_frame() else {
            return Ok(());
        };
        if self.last_camera_frame.is_some_and(|last| frame.frame_number <= last) {
            return Ok(());
        }
        self.last_camera_frame = Some(frame.frame_number);

        if !self.frame_skipper.should_process() {
            return Ok(());
        }

        let hand = self.detector.detect(&frame)?;
        let now = Instant::now();

        if self.state.direct_control_active {
            self.screen.refresh(&self.window);
        }

        let report = self.controller.process_frame(
            &mut self.state,
            hand.as_ref().map(|h| h.landmarks.as_slice()),
            now,
            &self.screen,
            &mut self.os,
        );

        self.fps.tick(now);
        self.hud.update(&report, self.state.direct_control_active);
        self.hud.fps = self.fps.fps();
        self.refresh_title();
        Ok(())
    }

    fn refresh_title(&mut self) {
        let title = self.hud.title(&self.config.debug);
        if title != self.last_title {
            self.window.set_title(&title);
            self.last_title = title;
        }
    }

    /// Release the camera before the window goes away
    pub fn shutdown(&mut self) {
        self.camera.stop();
        log::info!(
            "Session ended after {} camera frames",
            self.camera.frame_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_skip_every_frame() {
        let mut skipper = FrameSkipper::new(1);
        assert!((0..5).all(|_| skipper.should_process()));
    }

    #[test]
    fn test_frame_skip_every_third() {
        let mut skipper = FrameSkipper::new(3);
        let pattern: Vec<bool> = (0..7).map(|_| skipper.should_process()).collect();
        assert_eq!(pattern, vec![true, false, false, true, false, false, true]);
    }

    #[test]
    fn test_frame_skip_zero_is_one() {
        let mut skipper = FrameSkipper::new(0);
        assert!(skipper.should_process());
        assert!(skipper.should_process());
    }
}
