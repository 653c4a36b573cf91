use crate::renderer::scene::{PlayfieldLayout, TextLabel, TextLayer};
use glyphon::{
    Attrs, Buffer, Cache, Color, Family, FontSystem, Metrics, Resolution, Shaping, SwashCache,
    TextArea, TextAtlas, TextBounds, TextRenderer as GlyphonTextRenderer, Viewport, Weight,
};
use std::collections::HashMap;
use tracing::debug;
use wgpu::{Device, MultisampleState, Queue, RenderPass};

/// A shaped glyphon buffer plus the label it was last shaped from.
#[derive(Debug)]
pub struct TextBuffer {
    pub buffer: Buffer,
    pub label: TextLabel,
    pub visible: bool,
}

/// Glyphon text with two draw layers.
///
/// HUD text is drawn above the track, overlay text above the win overlay. Both layers
/// share one atlas, so both must be prepared before either is rendered.
pub struct TextRenderer {
    pub font_system: FontSystem,
    pub swash_cache: SwashCache,
    pub viewport: Viewport,
    pub atlas: TextAtlas,
    hud_renderer: GlyphonTextRenderer,
    overlay_renderer: GlyphonTextRenderer,
    pub text_buffers: HashMap<&'static str, TextBuffer>,
}

impl TextRenderer {
    pub fn new(device: &Device, queue: &Queue, surface_format: wgpu::TextureFormat) -> Self {
        let font_system = FontSystem::new();
        let swash_cache = SwashCache::new();
        let cache = Cache::new(device);
        let viewport = Viewport::new(device, &cache);
        let mut atlas = TextAtlas::new(device, queue, &cache, surface_format);
        let hud_renderer =
            GlyphonTextRenderer::new(&mut atlas, device, MultisampleState::default(), None);
        let overlay_renderer =
            GlyphonTextRenderer::new(&mut atlas, device, MultisampleState::default(), None);

        Self {
            font_system,
            swash_cache,
            viewport,
            atlas,
            hud_renderer,
            overlay_renderer,
            text_buffers: HashMap::new(),
        }
    }

    /// Makes the buffers match `labels`. Buffers with no matching label are hidden.
    pub fn sync_labels(&mut self, labels: &[TextLabel]) {
        for text_buffer in self.text_buffers.values_mut() {
            text_buffer.visible = false;
        }

        for label in labels {
            match self.text_buffers.get_mut(label.id) {
                Some(text_buffer) => {
                    if text_buffer.label != *label {
                        reshape(&mut self.font_system, &mut text_buffer.buffer, label);
                        text_buffer.label = label.clone();
                    }
                    text_buffer.visible = true;
                }
                None => {
                    debug!(id = label.id, "creating text buffer");
                    let mut buffer = Buffer::new(
                        &mut self.font_system,
                        Metrics::new(label.font_size, label.line_height),
                    );
                    reshape(&mut self.font_system, &mut buffer, label);
                    self.text_buffers.insert(
                        label.id,
                        TextBuffer {
                            buffer,
                            label: label.clone(),
                            visible: true,
                        },
                    );
                }
            }
        }
    }

    /// Uploads glyphs for both layers.
    pub fn prepare(
        &mut self,
        device: &Device,
        queue: &Queue,
        layout: &PlayfieldLayout,
    ) -> Result<(), glyphon::PrepareError> {
        self.viewport.update(
            queue,
            Resolution {
                width: layout.surface_width as u32,
                height: layout.surface_height as u32,
            },
        );

        for layer in [TextLayer::Hud, TextLayer::Overlay] {
            let text_areas: Vec<TextArea> = self
                .text_buffers
                .values()
                .filter(|text_buffer| text_buffer.visible && text_buffer.label.layer == layer)
                .map(|text_buffer| {
                    let placement = LabelPlacement::new(&text_buffer.label, layout);
                    let [r, g, b] = text_buffer.label.color;
                    TextArea {
                        buffer: &text_buffer.buffer,
                        left: placement.left,
                        top: placement.top,
                        scale: layout.scale,
                        bounds: placement.bounds,
                        default_color: Color::rgb(r, g, b),
                        custom_glyphs: &[],
                    }
                })
                .collect();

            let renderer = match layer {
                TextLayer::Hud => &mut self.hud_renderer,
                TextLayer::Overlay => &mut self.overlay_renderer,
            };
            renderer.prepare(
                device,
                queue,
                &mut self.font_system,
                &mut self.atlas,
                &self.viewport,
                text_areas,
                &mut self.swash_cache,
            )?;
        }

        Ok(())
    }

    pub fn render_layer(
        &self,
        layer: TextLayer,
        render_pass: &mut RenderPass,
    ) -> Result<(), glyphon::RenderError> {
        let renderer = match layer {
            TextLayer::Hud => &self.hud_renderer,
            TextLayer::Overlay => &self.overlay_renderer,
        };
        renderer.render(&self.atlas, &self.viewport, render_pass)
    }

    /// Trim the atlas to free up unused space
    pub fn trim(&mut self) {
        self.atlas.trim();
    }
}

fn reshape(font_system: &mut FontSystem, buffer: &mut Buffer, label: &TextLabel) {
    buffer.set_metrics(
        font_system,
        Metrics::new(label.font_size, label.line_height),
    );
    buffer.set_size(font_system, Some(label.max_width), Some(label.max_height));

    let weight = if label.bold { Weight::BOLD } else { Weight::NORMAL };
    let attrs = Attrs::new().family(Family::SansSerif).weight(weight);
    buffer.set_text(font_system, &label.text, attrs, Shaping::Advanced);
    buffer.shape_until_scroll(font_system, false);
}

/// Where a label lands on the surface, in physical pixels.
#[derive(Debug, Clone, Copy)]
struct LabelPlacement {
    left: f32,
    top: f32,
    bounds: TextBounds,
}

impl LabelPlacement {
    fn new(label: &TextLabel, layout: &PlayfieldLayout) -> Self {
        let [left, top] = layout.to_pixels(label.x, label.y);
        let [right, bottom] =
            layout.to_pixels(label.x + label.max_width, label.y + label.max_height);
        Self {
            left,
            top,
            bounds: TextBounds {
                left: left.floor() as i32,
                top: top.floor() as i32,
                right: right.ceil() as i32,
                bottom: bottom.ceil() as i32,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label() -> TextLabel {
        TextLabel {
            id: "stats",
            text: "Speed: 0 mph".to_string(),
            x: 20.0,
            y: 10.0,
            max_width: 100.0,
            max_height: 40.0,
            font_size: 16.0,
            line_height: 20.0,
            color: [255, 255, 255],
            bold: false,
            layer: TextLayer::Hud,
        }
    }

    #[test]
    fn test_placement_at_native_size() {
        let placement = LabelPlacement::new(&label(), &PlayfieldLayout::new(800, 400));
        assert_eq!((placement.left, placement.top), (20.0, 10.0));
        assert_eq!(placement.bounds.right, 120);
        assert_eq!(placement.bounds.bottom, 50);
    }

    /// Doubling the window doubles the label box and shifts it with the letterbox.
    #[test]
    fn test_placement_follows_layout_scale() {
        let layout = PlayfieldLayout::new(1800, 800);
        let placement = LabelPlacement::new(&label(), &layout);
        assert_eq!(layout.scale, 2.0);
        assert_eq!(placement.left, 100.0 + 40.0);
        assert_eq!(placement.top, 20.0);
        assert_eq!(placement.bounds.right, 100 + 240);
        assert_eq!(placement.bounds.bottom, 100);
    }
}
