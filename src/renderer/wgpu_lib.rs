//! WGPU-based renderer for the race.
//!
//! [`WgpuRenderer`] owns the surface, device and queue plus the rectangle pipeline. Each
//! call to [`WgpuRenderer::render_frame`] draws one [`Scene`] in a single render pass:
//!
//! 1. clear the whole surface to the letterbox color
//! 2. restrict drawing to the playfield with a scissor rect
//! 3. base rectangles, HUD text, overlay rectangles, overlay text
//!
//! A lost or outdated surface is reconfigured and the frame is skipped; the next redraw
//! picks up the new configuration.

use crate::error::RenderError;
use crate::renderer::rectangle::{RectangleRenderer, surface_color};
use crate::renderer::scene::{LETTERBOX_COLOR, PlayfieldLayout, Scene, TextLayer};
use crate::renderer::text::TextRenderer;
use tracing::{debug, info};

pub struct WgpuRenderer {
    /// The WGPU surface for presenting rendered frames.
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub rectangle_renderer: RectangleRenderer,
}

impl WgpuRenderer {
    /// Initializes the GPU side for `surface`.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<Self, RenderError> {
        let adapter = Self::create_adapter(instance, &surface).await?;
        let (device, queue) = Self::create_device(&adapter).await?;
        let surface_config = Self::create_surface_config(&surface, &adapter, width, height, vsync)?;

        let adapter_info = adapter.get_info();
        info!(
            adapter = %adapter_info.name,
            backend = ?adapter_info.backend,
            format = ?surface_config.format,
            "renderer_ready"
        );

        if width > 0 && height > 0 {
            surface.configure(&device, &surface_config);
        }

        let rectangle_renderer = RectangleRenderer::new(&device, surface_config.format);

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            rectangle_renderer,
        })
    }

    async fn create_adapter(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'static>,
    ) -> Result<wgpu::Adapter, RenderError> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(surface),
            })
            .await
            .ok_or(RenderError::NoAdapter)
    }

    async fn create_device(
        adapter: &wgpu::Adapter,
    ) -> Result<(wgpu::Device, wgpu::Queue), RenderError> {
        let device_and_queue = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;
        Ok(device_and_queue)
    }

    /// Prefers an sRGB format so blending happens in linear space.
    fn create_surface_config(
        surface: &wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<wgpu::SurfaceConfiguration, RenderError> {
        let capabilities = surface.get_capabilities(adapter);
        let format = capabilities
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .or_else(|| capabilities.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;
        let alpha_mode = capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        })
    }

    /// Reconfigures the surface. A zero-sized window is remembered but not configured.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width;
        self.surface_config.height = height;
        if width > 0 && height > 0 {
            self.surface.configure(&self.device, &self.surface_config);
        }
    }

    pub fn layout(&self) -> PlayfieldLayout {
        PlayfieldLayout::new(self.surface_config.width, self.surface_config.height)
    }

    /// Draws `scene` and presents it.
    pub fn render_frame(
        &mut self,
        scene: &Scene,
        text_renderer: &mut TextRenderer,
    ) -> Result<(), RenderError> {
        if self.surface_config.width == 0 || self.surface_config.height == 0 {
            return Ok(());
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(error @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                debug!(%error, "reconfiguring surface");
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                debug!("surface timed out, skipping frame");
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let layout = self.layout();
        text_renderer.sync_labels(&scene.labels);
        text_renderer.prepare(&self.device, &self.queue, &layout)?;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Race Frame Encoder"),
            });

        {
            let [r, g, b, a] = surface_color(LETTERBOX_COLOR, self.surface_config.format.is_srgb());
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Race Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let (x, y, width, height) = layout.scissor();
            render_pass.set_scissor_rect(x, y, width, height);

            self.rectangle_renderer
                .render(&self.device, &mut render_pass, &scene.base, &layout);
            text_renderer.render_layer(TextLayer::Hud, &mut render_pass)?;
            self.rectangle_renderer
                .render(&self.device, &mut render_pass, &scene.overlay, &layout);
            text_renderer.render_layer(TextLayer::Overlay, &mut render_pass)?;
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        text_renderer.trim();
        Ok(())
    }
}
