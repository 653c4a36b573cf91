//! State for a mounted race: GPU resources plus the game session.

use crate::config::GameConfig;
use crate::error::RenderError;
use crate::game::session::RaceSession;
use crate::renderer::text::TextRenderer;
use crate::renderer::wgpu_lib::WgpuRenderer;
use std::time::Instant;

pub struct AppState {
    pub wgpu_renderer: WgpuRenderer,
    pub text_renderer: TextRenderer,
    pub session: RaceSession,
}

impl AppState {
    /// Initializes the renderers and mounts a fresh race.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
        config: &GameConfig,
    ) -> Result<Self, RenderError> {
        let wgpu_renderer =
            WgpuRenderer::new(instance, surface, width, height, config.window.vsync).await?;
        let text_renderer = TextRenderer::new(
            &wgpu_renderer.device,
            &wgpu_renderer.queue,
            wgpu_renderer.surface_config.format,
        );
        let session = RaceSession::mount(config.tuning, Instant::now());

        Ok(Self {
            wgpu_renderer,
            text_renderer,
            session,
        })
    }

    pub fn resize_surface(&mut self, width: u32, height: u32) {
        self.wgpu_renderer.resize(width, height);
    }
}
