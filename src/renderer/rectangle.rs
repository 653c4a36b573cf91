//! # Rectangle Renderer
//!
//! Every shape in the race (sky, track, lane marks, the car, HUD panels and the win
//! overlay) is a [`Rectangle`]. This module batches a slice of them into one vertex and
//! index buffer and draws them with a single alpha-blended pipeline.
//!
//! ## Core Components
//!
//! - `Vertex`: per-corner data uploaded to the GPU
//! - [`Rectangle`]: position, size, color, corner radius and rotation in playfield units
//! - [`RectangleRenderer`]: owns the pipeline and issues the batched draw
//!
//! Rotation is applied on the CPU around the rectangle's center, so the shader only ever
//! sees already-placed corners plus the local coordinates it needs for rounded corners.

use crate::renderer::scene::PlayfieldLayout;
use std::mem;
use wgpu::{
    self, BlendState, BufferUsages, ColorTargetState, ColorWrites, Device, FragmentState,
    MultisampleState, PrimitiveState, RenderPass, RenderPipeline, VertexAttribute,
    VertexBufferLayout, VertexFormat, VertexState, util::DeviceExt,
};

/// Vertex data for one rectangle corner.
///
/// `#[repr(C)]` keeps the layout stable for the GPU buffer. 48 bytes per vertex.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    /// Corner position in normalized device coordinates.
    position: [f32; 2],
    /// Linear RGBA color.
    color: [f32; 4],
    /// Corner position in the rectangle's own pixel space, used for the corner mask.
    uv: [f32; 2],
    /// Rectangle size in pixels.
    rect_size: [f32; 2],
    /// Corner radius in pixels.
    corner_radius: f32,
    _padding: f32,
}

impl Vertex {
    /// Shader locations: 0 position, 1 color, 2 uv, 3 rect size, 4 corner radius.
    fn desc<'a>() -> VertexBufferLayout<'a> {
        VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: VertexFormat::Float32x2,
                },
                VertexAttribute {
                    offset: mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: VertexFormat::Float32x4,
                },
                VertexAttribute {
                    offset: (mem::size_of::<[f32; 2]>() + mem::size_of::<[f32; 4]>())
                        as wgpu::BufferAddress,
                    shader_location: 2,
                    format: VertexFormat::Float32x2,
                },
                VertexAttribute {
                    offset: (mem::size_of::<[f32; 2]>()
                        + mem::size_of::<[f32; 4]>()
                        + mem::size_of::<[f32; 2]>())
                        as wgpu::BufferAddress,
                    shader_location: 3,
                    format: VertexFormat::Float32x2,
                },
                VertexAttribute {
                    offset: (mem::size_of::<[f32; 2]>()
                        + mem::size_of::<[f32; 4]>()
                        + mem::size_of::<[f32; 2]>()
                        + mem::size_of::<[f32; 2]>())
                        as wgpu::BufferAddress,
                    shader_location: 4,
                    format: VertexFormat::Float32,
                },
            ],
        }
    }
}

/// A filled rectangle in playfield units.
///
/// `x`/`y` is the top-left corner before rotation; `rotation` turns the rectangle
/// clockwise (y points down) around its center.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// sRGB color with straight alpha.
    pub color: [f32; 4],
    pub corner_radius: f32,
    /// Radians.
    pub rotation: f32,
}

impl Rectangle {
    /// Creates an axis-aligned rectangle with sharp corners.
    pub fn new(x: f32, y: f32, width: f32, height: f32, color: [f32; 4]) -> Self {
        Self {
            x,
            y,
            width,
            height,
            color,
            corner_radius: 0.0,
            rotation: 0.0,
        }
    }

    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }

    pub fn center(&self) -> [f32; 2] {
        [self.x + self.width / 2.0, self.y + self.height / 2.0]
    }

    /// Corners in playfield units, clockwise from the top-left, rotation applied.
    pub fn corners(&self) -> [[f32; 2]; 4] {
        let [cx, cy] = self.center();
        let (sin, cos) = self.rotation.sin_cos();
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        [
            [-half_w, -half_h],
            [half_w, -half_h],
            [half_w, half_h],
            [-half_w, half_h],
        ]
        .map(|[dx, dy]| [cx + dx * cos - dy * sin, cy + dx * sin + dy * cos])
    }
}

fn srgb_to_linear(channel: f32) -> f32 {
    if channel <= 0.04045 {
        channel / 12.92
    } else {
        ((channel + 0.055) / 1.055).powf(2.4)
    }
}

/// Converts an sRGB color to the space the surface expects.
pub fn surface_color(color: [f32; 4], srgb_surface: bool) -> [f32; 4] {
    if srgb_surface {
        [
            srgb_to_linear(color[0]),
            srgb_to_linear(color[1]),
            srgb_to_linear(color[2]),
            color[3],
        ]
    } else {
        color
    }
}

/// Batched rectangle renderer.
///
/// Vertex and index buffers are rebuilt on every call to [`RectangleRenderer::render`];
/// a frame has a few dozen rectangles at most.
pub struct RectangleRenderer {
    render_pipeline: RenderPipeline,
    /// Whether colors must be linearized before upload.
    srgb_surface: bool,
}

impl RectangleRenderer {
    /// Builds the pipeline for `surface_format` from `shaders/rectangle.wgsl`.
    pub fn new(device: &Device, surface_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Rectangle Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/rectangle.wgsl").into()),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Rectangle Pipeline Layout"),
                bind_group_layouts: &[],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Rectangle Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::ALPHA_BLENDING),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Rotated rectangles keep their winding, but nothing here is back-facing.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        Self {
            render_pipeline,
            srgb_surface: surface_format.is_srgb(),
        }
    }

    /// Draws `rectangles` in order with one indexed draw call.
    pub fn render(
        &self,
        device: &Device,
        render_pass: &mut RenderPass,
        rectangles: &[Rectangle],
        layout: &PlayfieldLayout,
    ) {
        if rectangles.is_empty() {
            return;
        }

        let (all_vertices, all_indices) = build_geometry(rectangles, layout, self.srgb_surface);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Rectangle Vertex Buffer"),
            contents: bytemuck::cast_slice(&all_vertices),
            usage: BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Rectangle Index Buffer"),
            contents: bytemuck::cast_slice(&all_indices),
            usage: BufferUsages::INDEX,
        });

        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..all_indices.len() as u32, 0, 0..1);
    }
}

/// Four vertices and six indices per rectangle, in draw order.
fn build_geometry(
    rectangles: &[Rectangle],
    layout: &PlayfieldLayout,
    srgb_surface: bool,
) -> (Vec<Vertex>, Vec<u16>) {
    let mut all_vertices = Vec::with_capacity(rectangles.len() * 4);
    let mut all_indices = Vec::with_capacity(rectangles.len() * 6);

    for (rect_index, rectangle) in rectangles.iter().enumerate() {
        let color = surface_color(rectangle.color, srgb_surface);
        let rect_size = [
            rectangle.width * layout.scale,
            rectangle.height * layout.scale,
        ];
        let corner_radius = rectangle.corner_radius * layout.scale;
        let local = [
            [0.0, 0.0],
            [rect_size[0], 0.0],
            [rect_size[0], rect_size[1]],
            [0.0, rect_size[1]],
        ];

        for (corner, uv) in rectangle.corners().into_iter().zip(local) {
            all_vertices.push(Vertex {
                position: layout.pixels_to_ndc(layout.to_pixels(corner[0], corner[1])),
                color,
                uv,
                rect_size,
                corner_radius,
                _padding: 0.0,
            });
        }

        let base_index = (rect_index * 4) as u16;
        all_indices.extend_from_slice(&[
            base_index,
            base_index + 1,
            base_index + 2,
            base_index,
            base_index + 2,
            base_index + 3,
        ]);
    }

    (all_vertices, all_indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: [f32; 2], b: [f32; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-4 && (a[1] - b[1]).abs() < 1e-4
    }

    #[test]
    fn test_vertex_is_48_bytes() {
        assert_eq!(mem::size_of::<Vertex>(), 48);
    }

    #[test]
    fn test_unrotated_corners() {
        let rect = Rectangle::new(10.0, 20.0, 50.0, 30.0, [1.0; 4]);
        assert_eq!(
            rect.corners(),
            [[10.0, 20.0], [60.0, 20.0], [60.0, 50.0], [10.0, 50.0]]
        );
        assert_eq!(rect.center(), [35.0, 35.0]);
    }

    /// A quarter turn clockwise (y down) moves the top-left corner to the top-right.
    #[test]
    fn test_rotation_is_about_center() {
        let rect = Rectangle::new(0.0, 0.0, 20.0, 20.0, [1.0; 4])
            .with_rotation(std::f32::consts::FRAC_PI_2);
        let corners = rect.corners();
        assert!(approx(corners[0], [20.0, 0.0]), "{corners:?}");
        assert!(approx(corners[2], [0.0, 20.0]), "{corners:?}");
    }

    #[test]
    fn test_geometry_indices() {
        let rects = vec![
            Rectangle::new(0.0, 0.0, 800.0, 400.0, [1.0; 4]),
            Rectangle::new(100.0, 100.0, 10.0, 10.0, [1.0; 4]),
        ];
        let layout = PlayfieldLayout::new(800, 400);
        let (vertices, indices) = build_geometry(&rects, &layout, false);
        assert_eq!(vertices.len(), 8);
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
        assert_eq!(vertices[0].position, [-1.0, 1.0]);
        assert_eq!(vertices[2].position, [1.0, -1.0]);
        assert_eq!(vertices[5].uv, [10.0, 0.0]);
    }

    #[test]
    fn test_surface_color_linearizes_for_srgb() {
        let gray = [0.5, 0.5, 0.5, 0.25];
        assert_eq!(surface_color(gray, false), gray);
        let linear = surface_color(gray, true);
        assert!((linear[0] - 0.214).abs() < 1e-3);
        assert_eq!(linear[3], 0.25);
        assert_eq!(surface_color([1.0, 0.0, 0.0, 1.0], true), [1.0, 0.0, 0.0, 1.0]);
    }
}
