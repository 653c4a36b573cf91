//! Application shell around the race.
//!
//! - [`event_handler`]: the [`App`] struct and its winit [`ApplicationHandler`] impl
//! - [`app_state`]: [`AppState`], the renderers plus the mounted race session
//! - [`update`]: per-redraw frame logic
//!
//! # Event Flow
//!
//! 1. `resumed` creates the window, the GPU state and mounts a [`RaceSession`]
//! 2. key events are routed into the session while it is mounted
//! 3. each redraw advances the session once, draws it and requests the next redraw
//! 4. close, Escape, suspension and Ctrl-C all unmount the session
//!
//! [`ApplicationHandler`]: winit::application::ApplicationHandler
//! [`RaceSession`]: crate::game::session::RaceSession

pub mod app_state;
pub mod event_handler;
pub mod update;

pub use app_state::AppState;
pub use event_handler::App;

/// Events posted to the loop from outside winit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Ctrl-C was received.
    Shutdown,
}
