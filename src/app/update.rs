//! Per-redraw logic for [`App`].

use super::event_handler::App;
use crate::renderer::scene::build_scene;
use std::time::Instant;
use tracing::warn;

impl App {
    /// Advances the race by one frame, draws it and schedules the next redraw.
    ///
    /// Nothing is drawn once the session is unmounted, and no further redraw is
    /// requested, so the loop goes idle.
    pub fn handle_redraw(&mut self) {
        let (Some(window), Some(state)) = (self.window.as_ref(), self.state.as_mut()) else {
            return;
        };
        if window.is_minimized().unwrap_or(false) {
            return;
        }

        let outcome = state.session.frame(Instant::now());
        if !outcome.schedule_next() {
            return;
        }

        let scene = build_scene(state.session.state(), state.session.tuning());
        if let Err(error) = state
            .wgpu_renderer
            .render_frame(&scene, &mut state.text_renderer)
        {
            warn!(%error, "frame render failed");
        }

        window.request_redraw();
    }
}
