//! Event handler module.
//!
//! Contains the [`App`] struct and its winit event handling.

use crate::app::AppEvent;
use crate::app::app_state::AppState;
use crate::config::GameConfig;
use crate::error::RenderError;
use crate::game::hud::WINDOW_TITLE;
use crate::game::keys::GameKey;
use crate::game::session::RaceSession;
use crate::game::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
use std::{sync::Arc, time::Instant};
use tracing::{info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

/// Owns the window and, once setup succeeds, the mounted race.
///
/// # Lifecycle
/// 1. Created with [`App::new`], which only builds the wgpu instance
/// 2. `resumed` creates the window and calls [`App::set_window`]
/// 3. Redraws drive the race until a close, Escape or Ctrl-C unmounts it
///
/// If the GPU side cannot be set up, the failure is logged and the window stays empty
/// until it is closed.
pub struct App {
    pub instance: wgpu::Instance,
    pub config: GameConfig,
    pub state: Option<AppState>,
    pub window: Option<Arc<Window>>,
}

impl App {
    pub fn new(config: GameConfig) -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        Self {
            instance,
            config,
            state: None,
            window: None,
        }
    }

    /// Creates the surface and GPU state for `window` and mounts the race.
    pub async fn set_window(&mut self, window: Window) -> Result<(), RenderError> {
        let window = Arc::new(window);
        let size = window.inner_size();
        let window = self.window.get_or_insert(window).clone();

        let surface = self.instance.create_surface(window.clone())?;
        let state = AppState::new(
            &self.instance,
            surface,
            size.width,
            size.height,
            &self.config,
        )
        .await?;

        self.state = Some(state);
        window.request_redraw();
        Ok(())
    }

    pub fn handle_resized(&mut self, width: u32, height: u32) {
        if let Some(state) = self.state.as_mut() {
            state.resize_surface(width, height);
        }
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    /// Routes a key event into the race. Returns true when the player asked to quit.
    fn handle_key(&mut self, event: &KeyEvent) -> bool {
        let PhysicalKey::Code(code) = event.physical_key else {
            return false;
        };

        match event.state {
            ElementState::Pressed => {
                let key = match self.state.as_mut() {
                    Some(state) => state.session.key_down(code, event.repeat),
                    None => GameKey::from_key_code(code),
                };
                key == Some(GameKey::Quit)
            }
            ElementState::Released => {
                if let Some(state) = self.state.as_mut() {
                    state.session.key_up(code);
                }
                false
            }
        }
    }

    /// Unmounts the race and leaves the event loop.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop, reason: &'static str) {
        info!(reason, "shutdown_requested");
        if let Some(state) = self.state.as_mut() {
            state.session.unmount();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            // Coming back from a suspension: start a fresh race.
            if let Some(state) = self.state.as_mut() {
                if !state.session.is_running() {
                    state.session = RaceSession::mount(self.config.tuning, Instant::now());
                }
            }
            window.request_redraw();
            return;
        }

        let scale = f64::from(self.config.window.scale);
        let attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(
                f64::from(PLAYFIELD_WIDTH) * scale,
                f64::from(PLAYFIELD_HEIGHT) * scale,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => window,
            Err(error) => {
                warn!(%error, "failed to create window");
                event_loop.exit();
                return;
            }
        };

        if let Err(error) = pollster::block_on(self.set_window(window)) {
            warn!(%error, "renderer setup failed, the race will not start");
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.as_mut() {
            state.session.unmount();
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::Shutdown => self.shutdown(event_loop, "ctrl_c"),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop, "window_closed"),
            WindowEvent::Resized(size) => self.handle_resized(size.width, size.height),
            WindowEvent::KeyboardInput { event, .. } => {
                if self.handle_key(&event) {
                    self.shutdown(event_loop, "escape");
                }
            }
            WindowEvent::Focused(false) => {
                // Keys released while unfocused never reach us.
                if let Some(state) = self.state.as_mut() {
                    state.session.release_all_keys();
                }
            }
            WindowEvent::RedrawRequested => self.handle_redraw(),
            _ => {}
        }
    }
}
