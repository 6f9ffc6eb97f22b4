//! GestIQ - Main Entry Point
//!
//! Opens a small status window, then recognizes hand gestures from the camera
//! and turns them into desktop actions until Q, Escape or the window close
//! button ends the session.

mod args;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use gestiq::camera::CameraCapture;
use gestiq::config::AppConfig;
use gestiq::hud::WINDOW_TITLE;
use gestiq::App;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use args::Args;

const WINDOW_WIDTH: u32 = 640;
const WINDOW_HEIGHT: u32 = 120;

/// Application state machine
enum AppState {
    /// Before the window exists
    Uninitialized { config: AppConfig },
    /// Camera and detector are running
    Running { window: Arc<Window>, app: App },
    /// Startup failed or the session ended
    Stopped,
}

/// winit handler driving one detection pass per redraw
struct GestiqApp {
    state: AppState,
    frame_interval: std::time::Duration,
    next_redraw_at: Instant,
    failed: bool,
}

impl GestiqApp {
    fn new(config: AppConfig) -> Self {
        Self {
            frame_interval: config.performance.frame_interval(),
            state: AppState::Uninitialized { config },
            next_redraw_at: Instant::now(),
            failed: false,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop, config: AppConfig) -> anyhow::Result<()> {
        let attributes = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
        let window = Arc::new(event_loop.create_window(attributes)?);

        let app = App::new(window.clone(), config)?;
        log::info!("GestIQ ready. Press Q or Escape to quit");

        self.state = AppState::Running { window, app };
        Ok(())
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        if let AppState::Running { app, .. } = &mut self.state {
            app.shutdown();
        }
        self.state = AppState::Stopped;
        event_loop.exit();
    }
}

impl ApplicationHandler for GestiqApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let state = std::mem::replace(&mut self.state, AppState::Stopped);
        let AppState::Uninitialized { config } = state else {
            self.state = state;
            return;
        };

        if let Err(e) = self.start(event_loop, config) {
            log::error!("Startup failed: {:#}", e);
            self.failed = true;
            self.stop(event_loop);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let AppState::Running { app, .. } = &mut self.state else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                self.stop(event_loop);
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::KeyQ | KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                log::info!("Quit key pressed, exiting...");
                self.stop(event_loop);
            }

            WindowEvent::RedrawRequested => {
                if let Err(e) = app.update() {
                    log::error!("Frame processing failed: {}", e);
                    self.failed = true;
                    self.stop(event_loop);
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let AppState::Running { window, .. } = &self.state else {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        };

        // Pace redraws to max_fps
        let now = Instant::now();
        if now >= self.next_redraw_at {
            window.request_redraw();
            self.next_redraw_at += self.frame_interval;
            if self.next_redraw_at < now {
                self.next_redraw_at = now + self.frame_interval;
            }
        }

        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_redraw_at));
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // The log level lives in the config, so the file is read before the
    // logger exists and reported right after
    let config_path = AppConfig::locate(args.config.as_deref());
    let loaded = config_path.as_deref().map(|path| (path, AppConfig::load_from_file(path)));
    let mut config = match &loaded {
        Some((_, Ok(config))) => config.clone(),
        _ => AppConfig::default(),
    };
    if let Some(index) = args.camera {
        config.camera.index = index;
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()))
        .init();

    log::info!("GestIQ v{}", env!("CARGO_PKG_VERSION"));
    match &loaded {
        Some((path, Ok(_))) => log::info!("Loaded config from {}", path.display()),
        Some((path, Err(e))) => log::warn!("Failed to load config {}: {}, using defaults", path.display(), e),
        None => log::info!("No config file found, using defaults"),
    }

    if args.list_cameras {
        let cameras = CameraCapture::list_cameras();
        if cameras.is_empty() {
            println!("No cameras found");
        }
        for camera in cameras {
            println!("{}: {}", camera.index, camera.name);
        }
        return ExitCode::SUCCESS;
    }

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            return ExitCode::FAILURE;
        }
    };
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = GestiqApp::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
        return ExitCode::FAILURE;
    }

    if app.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
