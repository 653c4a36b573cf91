//! Rendering for the race.
//!
//! [`scene`] turns a game snapshot into shapes and labels without touching the GPU;
//! the other modules draw that description with wgpu and glyphon.

/// Batched rectangle drawing.
pub mod rectangle;
/// Frame description and playfield layout.
pub mod scene;
/// Glyphon text layers.
pub mod text;
/// Surface, device and frame submission.
pub mod wgpu_lib;
