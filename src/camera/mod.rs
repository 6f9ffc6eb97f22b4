//! Camera capture
//!
//! Frames are pulled by a background thread with nokhwa and published to a
//! single latest-frame slot. The consumer never waits for the camera: it
//! takes whatever frame is newest and skips the ones it missed.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;
use parking_lot::Mutex;
use thiserror::Error;

/// How long startup waits for the device to open
const OPEN_TIMEOUT: Duration = Duration::from_secs(10);

/// Camera errors
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open camera {index}: {reason}")]
    Open { index: u32, reason: String },
    #[error("Camera {0} did not start within the startup timeout")]
    Timeout(u32),
    #[error("Failed to spawn capture thread: {0}")]
    Thread(#[from] std::io::Error),
}

/// One decoded RGB frame
#[derive(Clone)]
pub struct CameraFrame {
    /// Packed RGB8 pixels, row-major
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Increments by one per captured frame
    pub frame_number: u64,
    pub timestamp: Instant,
}

impl CameraFrame {
    /// Nearest-neighbour resize into a normalized `[0, 1]` HWC float buffer
    pub fn to_tensor_hwc(&self, target_width: u32, target_height: u32) -> Vec<f32> {
        let mut output = vec![0.0f32; (target_width * target_height * 3) as usize];
        if self.width == 0 || self.height == 0 {
            return output;
        }

        let x_ratio = self.width as f32 / target_width as f32;
        let y_ratio = self.height as f32 / target_height as f32;

        for y in 0..target_height {
            let src_y = ((y as f32 * y_ratio) as u32).min(self.height - 1);
            for x in 0..target_width {
                let src_x = ((x as f32 * x_ratio) as u32).min(self.width - 1);
                let src = ((src_y * self.width + src_x) * 3) as usize;
                let dst = ((y * target_width + x) * 3) as usize;
                if let Some(pixel) = self.data.get(src..src + 3) {
                    for (out, &channel) in output[dst..dst + 3].iter_mut().zip(pixel) {
                        *out = channel as f32 / 255.0;
                    }
                }
            }
        }

        output
    }
}

/// An enumerated capture device
#[derive(Clone, Debug)]
pub struct CameraInfo {
    pub index: u32,
    pub name: String,
}

/// Requested capture settings
#[derive(Clone, Copy, Debug)]
pub struct CaptureSettings {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

/// Background camera capture with a latest-frame slot
pub struct CameraCapture {
    latest: Arc<Mutex<Option<CameraFrame>>>,
    running: Arc<AtomicBool>,
    frame_count: Arc<AtomicU64>,
    thread_handle: Option<JoinHandle<()>>,
    /// Resolution the device actually delivers
    resolution: (u32, u32),
}

impl CameraCapture {
    /// List available cameras
    pub fn list_cameras() -> Vec<CameraInfo> {
        match nokhwa::query(ApiBackend::Auto) {
            Ok(list) => list
                .iter()
                .enumerate()
                .map(|(idx, info)| CameraInfo {
                    index: idx as u32,
                    name: info.human_name().to_string(),
                })
                .collect(),
            Err(e) => {
                log::warn!("Failed to enumerate cameras: {:?}", e);
                Vec::new()
            }
        }
    }

    /// Open a camera and start capturing.
    ///
    /// Blocks until the device reports its stream open (or fails), so a
    /// missing camera is an error here rather than a silent empty feed.
    pub fn open(settings: CaptureSettings) -> Result<Self, CameraError> {
        let latest = Arc::new(Mutex::new(None));
        let running = Arc::new(AtomicBool::new(true));
        let frame_count = Arc::new(AtomicU64::new(0));
        let (ready_tx, ready_rx) = bounded(1);

        let thread_handle = {
            let latest = latest.clone();
            let running = running.clone();
            let frame_count = frame_count.clone();
            std::thread::Builder::new()
                .name("camera-capture".to_string())
                .spawn(move || capture_thread(settings, latest, running, frame_count, ready_tx))?
        };

        let mut capture = Self {
            latest,
            running,
            frame_count,
            thread_handle: Some(thread_handle),
            resolution: (settings.width, settings.height),
        };

        match ready_rx.recv_timeout(OPEN_TIMEOUT) {
            Ok(Ok(resolution)) => {
                capture.resolution = resolution;
                Ok(capture)
            }
            Ok(Err(reason)) => {
                capture.stop();
                Err(CameraError::Open {
                    index: settings.index,
                    reason,
                })
            }
            Err(RecvTimeoutError::Timeout) => {
                // The thread may still be stuck inside the driver; don't join it
                capture.running.store(false, Ordering::Release);
                capture.thread_handle = None;
                Err(CameraError::Timeout(settings.index))
            }
            Err(RecvTimeoutError::Disconnected) => {
                capture.stop();
                Err(CameraError::Open {
                    index: settings.index,
                    reason: "capture thread exited".to_string(),
                })
            }
        }
    }

    /// Newest frame, if any has arrived yet
    pub fn latest_frame(&self) -> Option<CameraFrame> {
        self.latest.lock().clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count.load(Ordering::Relaxed)
    }

    /// Stop the capture thread and release the device
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Try the requested mode first, then progressively looser requests
fn open_camera(settings: &CaptureSettings) -> Result<Camera, String> {
    let index = CameraIndex::Index(settings.index);
    let wanted = CameraFormat::new(
        Resolution::new(settings.width, settings.height),
        FrameFormat::MJPEG,
        settings.fps,
    );
    let attempts = [
        RequestedFormatType::Closest(wanted),
        RequestedFormatType::HighestResolution(Resolution::new(640, 480)),
        RequestedFormatType::None,
    ];

    let mut last_error = String::from("no format attempted");
    for attempt in attempts {
        match Camera::new(index.clone(), RequestedFormat::new::<RgbFormat>(attempt)) {
            Ok(camera) => return Ok(camera),
            Err(e) => {
                log::warn!("Camera {} rejected {:?}: {}", settings.index, attempt, e);
                last_error = e.to_string();
            }
        }
    }
    Err(last_error)
}

fn capture_thread(
    settings: CaptureSettings,
    latest: Arc<Mutex<Option<CameraFrame>>>,
    running: Arc<AtomicBool>,
    frame_count: Arc<AtomicU64>,
    ready: Sender<Result<(u32, u32), String>>,
) {
    log::info!("Starting camera capture thread (camera {})", settings.index);

    let mut camera = match open_camera(&settings) {
        Ok(camera) => camera,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    if let Err(e) = camera.open_stream() {
        let _ = ready.send(Err(format!("failed to open stream: {}", e)));
        return;
    }

    let resolution = camera.resolution();
    log::info!(
        "Camera opened: {} ({}x{} @ {} fps)",
        camera.info().human_name(),
        resolution.width(),
        resolution.height(),
        camera.frame_rate()
    );
    let _ = ready.send(Ok((resolution.width(), resolution.height())));

    while running.load(Ordering::Acquire) {
        let buffer = match camera.frame() {
            Ok(buffer) => buffer,
            Err(e) => {
                log::warn!("Failed to capture frame: {}", e);
                std::thread::sleep(Duration::from_millis(10));
                continue;
            }
        };

        match buffer.decode_image::<RgbFormat>() {
            Ok(image) => {
                let frame = CameraFrame {
                    width: image.width(),
                    height: image.height(),
                    data: image.into_raw(),
                    frame_number: frame_count.fetch_add(1, Ordering::Relaxed),
                    timestamp: Instant::now(),
                };
                *latest.lock() = Some(frame);
            }
            Err(e) => log::warn!("Failed to decode frame: {}", e),
        }
    }

    if let Err(e) = camera.stop_stream() {
        log::warn!("Failed to stop camera stream: {}", e);
    }
    log::info!("Camera capture thread stopped");
}
