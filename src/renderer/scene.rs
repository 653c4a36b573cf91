//! Scene description for one frame.
//!
//! [`build_scene`] turns a committed [`GameState`] into the rectangles and text labels the
//! GPU backend draws. Everything here is in playfield units (800x400, origin top-left);
//! [`PlayfieldLayout`] maps those units onto the window.
//!
//! # Draw Order
//!
//! 1. `base` rectangles: sky, track, lane marks, car, HUD panels
//! 2. [`TextLayer::Hud`] labels
//! 3. `overlay` rectangles: the win dim and panel
//! 4. [`TextLayer::Overlay`] labels

use crate::game::hud::{CONTROLS_GUIDE, RaceStats, STATS_HEADING, WIN_DETAIL, WIN_HEADLINE};
use crate::game::{GameState, PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH, Tuning};
use crate::renderer::rectangle::Rectangle;

pub const SKY_COLOR: [f32; 4] = rgb(0x87CEEB);
pub const TRACK_COLOR: [f32; 4] = rgb(0x808080);
pub const LANE_MARK_COLOR: [f32; 4] = rgb(0xFFFFFF);
pub const CAR_COLOR: [f32; 4] = rgb(0xFF0000);
pub const CAR_ACCELERATING_COLOR: [f32; 4] = rgb(0xFFAA00);
/// Fill outside the playfield when the window aspect differs.
pub const LETTERBOX_COLOR: [f32; 4] = rgb(0x111827);

pub const TRACK_HEIGHT: f32 = 80.0;
pub const LANE_MARK_COUNT: usize = 10;
pub const LANE_MARK_WIDTH: f32 = 30.0;
pub const LANE_MARK_HEIGHT: f32 = 10.0;
pub const LANE_MARK_Y: f32 = PLAYFIELD_HEIGHT - 45.0;
pub const CAR_BODY_WIDTH: f32 = 50.0;
pub const CAR_BODY_HEIGHT: f32 = 30.0;
/// Tilt in radians while accelerating.
pub const CAR_ACCELERATING_TILT: f32 = 0.1;

const PANEL_MARGIN: f32 = 16.0;
const PANEL_RADIUS: f32 = 8.0;
const STATS_PANEL: (f32, f32) = (190.0, 118.0);
const CONTROLS_PANEL: (f32, f32) = (230.0, 84.0);
const WIN_PANEL: (f32, f32) = (360.0, 140.0);

/// Converts a `0xRRGGBB` literal to an opaque sRGB color.
pub const fn rgb(hex: u32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
        1.0,
    ]
}

const fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], alpha]
}

/// Which text pass a label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextLayer {
    Hud,
    Overlay,
}

/// A block of text placed in playfield units.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub id: &'static str,
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub max_width: f32,
    pub max_height: f32,
    pub font_size: f32,
    pub line_height: f32,
    pub color: [u8; 3],
    pub bold: bool,
    pub layer: TextLayer,
}

/// Everything drawn for one frame.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub base: Vec<Rectangle>,
    pub overlay: Vec<Rectangle>,
    pub labels: Vec<TextLabel>,
}

/// Builds the frame for `state`.
pub fn build_scene(state: &GameState, tuning: &Tuning) -> Scene {
    let mut scene = Scene::default();

    scene.base.push(Rectangle::new(
        0.0,
        0.0,
        PLAYFIELD_WIDTH,
        PLAYFIELD_HEIGHT,
        SKY_COLOR,
    ));
    scene.base.push(Rectangle::new(
        0.0,
        PLAYFIELD_HEIGHT - TRACK_HEIGHT,
        PLAYFIELD_WIDTH,
        TRACK_HEIGHT,
        TRACK_COLOR,
    ));
    for x in lane_mark_positions(state.distance) {
        scene.base.push(Rectangle::new(
            x,
            LANE_MARK_Y,
            LANE_MARK_WIDTH,
            LANE_MARK_HEIGHT,
            LANE_MARK_COLOR,
        ));
    }
    scene.base.push(car_rectangle(state));

    let (stats_w, stats_h) = STATS_PANEL;
    scene.base.push(
        Rectangle::new(PANEL_MARGIN, PANEL_MARGIN, stats_w, stats_h, [0.0, 0.0, 0.0, 0.5])
            .with_corner_radius(PANEL_RADIUS),
    );
    let (controls_w, controls_h) = CONTROLS_PANEL;
    let controls_x = PLAYFIELD_WIDTH - PANEL_MARGIN - controls_w;
    let controls_y = PLAYFIELD_HEIGHT - PANEL_MARGIN - controls_h;
    scene.base.push(
        Rectangle::new(controls_x, controls_y, controls_w, controls_h, [0.0, 0.0, 0.0, 0.5])
            .with_corner_radius(PANEL_RADIUS),
    );

    let stats = RaceStats::from_state(state, tuning);
    scene.labels.push(TextLabel {
        id: "stats_heading",
        text: STATS_HEADING.to_string(),
        x: PANEL_MARGIN * 2.0,
        y: PANEL_MARGIN + 12.0,
        max_width: stats_w - PANEL_MARGIN * 2.0,
        max_height: 28.0,
        font_size: 20.0,
        line_height: 26.0,
        color: [255, 255, 255],
        bold: true,
        layer: TextLayer::Hud,
    });
    scene.labels.push(TextLabel {
        id: "stats",
        text: stats.panel_text(),
        x: PANEL_MARGIN * 2.0,
        y: PANEL_MARGIN + 44.0,
        max_width: stats_w - PANEL_MARGIN * 2.0,
        max_height: 70.0,
        font_size: 16.0,
        line_height: 22.0,
        color: [255, 255, 255],
        bold: false,
        layer: TextLayer::Hud,
    });
    scene.labels.push(TextLabel {
        id: "controls",
        text: CONTROLS_GUIDE.to_string(),
        x: controls_x + PANEL_MARGIN,
        y: controls_y + 12.0,
        max_width: controls_w - PANEL_MARGIN * 2.0,
        max_height: controls_h - 12.0,
        font_size: 14.0,
        line_height: 20.0,
        color: [255, 255, 255],
        bold: false,
        layer: TextLayer::Hud,
    });

    if state.game_won {
        push_win_overlay(&mut scene);
    }

    scene
}

/// Left edges of the lane marks, scrolled by `distance` and wrapped across the playfield.
pub fn lane_mark_positions(distance: f32) -> [f32; LANE_MARK_COUNT] {
    let mut positions = [0.0; LANE_MARK_COUNT];
    for (i, x) in positions.iter_mut().enumerate() {
        *x = (i as f32 * PLAYFIELD_WIDTH / 5.0 + distance * 2.0) % PLAYFIELD_WIDTH;
    }
    positions
}

/// The car body, tilted and recolored while accelerating.
pub fn car_rectangle(state: &GameState) -> Rectangle {
    let (color, tilt) = if state.is_accelerating {
        (CAR_ACCELERATING_COLOR, CAR_ACCELERATING_TILT)
    } else {
        (CAR_COLOR, 0.0)
    };
    Rectangle::new(state.x, state.y, CAR_BODY_WIDTH, CAR_BODY_HEIGHT, color).with_rotation(tilt)
}

fn push_win_overlay(scene: &mut Scene) {
    scene.overlay.push(Rectangle::new(
        0.0,
        0.0,
        PLAYFIELD_WIDTH,
        PLAYFIELD_HEIGHT,
        with_alpha(rgb(0x000000), 0.75),
    ));

    let (panel_w, panel_h) = WIN_PANEL;
    let panel_x = (PLAYFIELD_WIDTH - panel_w) / 2.0;
    let panel_y = (PLAYFIELD_HEIGHT - panel_h) / 2.0;
    scene.overlay.push(
        Rectangle::new(panel_x, panel_y, panel_w, panel_h, rgb(0xFFFFFF))
            .with_corner_radius(PANEL_RADIUS),
    );

    // Rough centering; glyph widths are only known after shaping.
    scene.labels.push(TextLabel {
        id: "win_headline",
        text: WIN_HEADLINE.to_string(),
        x: PLAYFIELD_WIDTH / 2.0 - 80.0,
        y: panel_y + 32.0,
        max_width: panel_w,
        max_height: 48.0,
        font_size: 36.0,
        line_height: 44.0,
        color: [22, 163, 74],
        bold: true,
        layer: TextLayer::Overlay,
    });
    scene.labels.push(TextLabel {
        id: "win_detail",
        text: WIN_DETAIL.to_string(),
        x: PLAYFIELD_WIDTH / 2.0 - 105.0,
        y: panel_y + 88.0,
        max_width: panel_w,
        max_height: 24.0,
        font_size: 16.0,
        line_height: 22.0,
        color: [55, 65, 81],
        bold: false,
        layer: TextLayer::Overlay,
    });
}

/// Placement of the playfield inside a window of arbitrary size.
///
/// The playfield keeps its aspect ratio and is centered; the remaining area is
/// letterboxed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayfieldLayout {
    pub surface_width: f32,
    pub surface_height: f32,
    /// Pixels per playfield unit.
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl PlayfieldLayout {
    pub fn new(surface_width: u32, surface_height: u32) -> Self {
        let surface_width = surface_width.max(1) as f32;
        let surface_height = surface_height.max(1) as f32;
        let scale = (surface_width / PLAYFIELD_WIDTH).min(surface_height / PLAYFIELD_HEIGHT);
        Self {
            surface_width,
            surface_height,
            scale,
            offset_x: (surface_width - PLAYFIELD_WIDTH * scale) / 2.0,
            offset_y: (surface_height - PLAYFIELD_HEIGHT * scale) / 2.0,
        }
    }

    /// Playfield units to surface pixels.
    pub fn to_pixels(&self, x: f32, y: f32) -> [f32; 2] {
        [self.offset_x + x * self.scale, self.offset_y + y * self.scale]
    }

    /// Surface pixels to normalized device coordinates (y up).
    pub fn pixels_to_ndc(&self, [x, y]: [f32; 2]) -> [f32; 2] {
        [
            (x / self.surface_width) * 2.0 - 1.0,
            1.0 - (y / self.surface_height) * 2.0,
        ]
    }

    /// Integer pixel rectangle covering the playfield, clamped to the surface.
    pub fn scissor(&self) -> (u32, u32, u32, u32) {
        let x = self.offset_x.max(0.0).floor() as u32;
        let y = self.offset_y.max(0.0).floor() as u32;
        let max_w = self.surface_width as u32 - x.min(self.surface_width as u32);
        let max_h = self.surface_height as u32 - y.min(self.surface_height as u32);
        let w = ((PLAYFIELD_WIDTH * self.scale).ceil() as u32).min(max_w);
        let h = ((PLAYFIELD_HEIGHT * self.scale).ceil() as u32).min(max_h);
        (x, y, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn won_state() -> GameState {
        GameState {
            lap: 1,
            game_won: true,
            ..GameState::new()
        }
    }

    #[test]
    fn test_lane_marks_at_rest() {
        let positions = lane_mark_positions(0.0);
        assert_eq!(positions.len(), LANE_MARK_COUNT);
        assert_eq!(&positions[..5], &[0.0, 160.0, 320.0, 480.0, 640.0]);
        // The second five land on top of the first five.
        assert_eq!(&positions[5..], &positions[..5]);
    }

    #[test]
    fn test_lane_marks_scroll_and_wrap() {
        let positions = lane_mark_positions(100.0);
        assert_eq!(positions[0], 200.0);
        // 640 + 200 wraps past the right edge.
        assert_eq!(positions[4], 40.0);
        for x in positions {
            assert!((0.0..PLAYFIELD_WIDTH).contains(&x));
        }
    }

    #[test]
    fn test_car_follows_throttle() {
        let idle = car_rectangle(&GameState::new());
        assert_eq!(idle.color, CAR_COLOR);
        assert_eq!(idle.rotation, 0.0);
        assert_eq!((idle.x, idle.y), (100.0, 300.0));
        assert_eq!((idle.width, idle.height), (50.0, 30.0));

        let pushing = car_rectangle(&GameState {
            is_accelerating: true,
            ..GameState::new()
        });
        assert_eq!(pushing.color, CAR_ACCELERATING_COLOR);
        assert_eq!(pushing.rotation, CAR_ACCELERATING_TILT);
    }

    #[test]
    fn test_scene_contents_while_racing() {
        let scene = build_scene(&GameState::new(), &Tuning::default());
        // sky, track, ten marks, car, two panels
        assert_eq!(scene.base.len(), 2 + LANE_MARK_COUNT + 1 + 2);
        assert_eq!(scene.base[0].color, SKY_COLOR);
        assert_eq!(scene.base[1].y, 320.0);
        assert!(scene.overlay.is_empty());
        assert!(scene.labels.iter().all(|label| label.layer == TextLayer::Hud));

        let stats = scene
            .labels
            .iter()
            .find(|label| label.id == "stats")
            .expect("stats label");
        assert_eq!(stats.text, "Speed: 0 mph\nProgress: 0%\nLap: 0");
    }

    #[test]
    fn test_win_overlay_only_after_lap() {
        let scene = build_scene(&won_state(), &Tuning::default());
        assert_eq!(scene.overlay.len(), 2);
        assert_eq!(scene.overlay[0].width, PLAYFIELD_WIDTH);
        assert_eq!(scene.overlay[0].color[3], 0.75);

        let overlay_text: Vec<&str> = scene
            .labels
            .iter()
            .filter(|label| label.layer == TextLayer::Overlay)
            .map(|label| label.text.as_str())
            .collect();
        assert_eq!(overlay_text, vec![WIN_HEADLINE, WIN_DETAIL]);
    }

    #[test]
    fn test_layout_letterboxes_wide_window() {
        let layout = PlayfieldLayout::new(1000, 400);
        assert_eq!(layout.scale, 1.0);
        assert_eq!(layout.offset_x, 100.0);
        assert_eq!(layout.offset_y, 0.0);
        assert_eq!(layout.to_pixels(0.0, 0.0), [100.0, 0.0]);
        assert_eq!(layout.scissor(), (100, 0, 800, 400));
    }

    #[test]
    fn test_layout_scales_and_maps_to_ndc() {
        let layout = PlayfieldLayout::new(1600, 800);
        assert_eq!(layout.scale, 2.0);
        let corner = layout.to_pixels(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT);
        assert_eq!(corner, [1600.0, 800.0]);
        assert_eq!(layout.pixels_to_ndc([0.0, 0.0]), [-1.0, 1.0]);
        assert_eq!(layout.pixels_to_ndc(corner), [1.0, -1.0]);
    }

    #[test]
    fn test_layout_survives_zero_size() {
        let layout = PlayfieldLayout::new(0, 0);
        assert!(layout.scale > 0.0);
        let (_, _, w, h) = layout.scissor();
        assert!(w <= 1 && h <= 1);
    }

    #[test]
    fn test_rgb_literal() {
        assert_eq!(rgb(0xFF0000), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(rgb(0x808080)[1], 128.0 / 255.0);
    }
}
