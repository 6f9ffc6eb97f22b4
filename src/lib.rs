//! GestIQ - hand gesture desktop control
//!
//! Recognizes static hand poses from a live camera feed and turns them into
//! desktop actions: launching applications, sending shortcuts, and moving the
//! active window by following the open hand.

pub mod actions;
pub mod app;
pub mod camera;
pub mod config;
pub mod control;
pub mod gesture;
pub mod hud;
pub mod ml;

pub use app::App;
pub use config::AppConfig;
pub use control::{DetectionState, GestureController};
