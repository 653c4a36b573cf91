//! Error types for the renderer and the application shell.
//!
//! Game rules never fail; everything here comes from the platform around them.

use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no GPU adapter is compatible with the window surface")]
    NoAdapter,
    #[error("failed to create GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("failed to create window surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("window surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("failed to acquire frame: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("failed to prepare text: {0}")]
    TextPrepare(#[from] glyphon::PrepareError),
    #[error("failed to draw text: {0}")]
    TextRender(#[from] glyphon::RenderError),
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
