//! Kart Dash - a small side-scrolling racing game
//!
//! Hold Space to build speed, steer with the arrow keys and complete one lap of the
//! track to win.
//!
//! # Architecture
//! - `game/`: the rules, key tracking, frame clock and the race session loop
//! - `renderer/`: scene description plus its wgpu and glyphon backends
//! - `app/`: winit application handler tying input, frames and rendering together
//! - `config`: optional TOML tuning and window settings
//!
//! # Usage
//! Run with `cargo run`. Set `RUST_LOG` to change log verbosity and `KART_DASH_CONFIG` to
//! point at a config file other than `kart-dash.toml`.

pub mod app;
pub mod config;
pub mod error;
pub mod game;
pub mod renderer;

use crate::app::{App, AppEvent};
use crate::config::GameConfig;
use crate::error::GameError;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use winit::event_loop::{ControlFlow, EventLoop};

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

fn main() -> ExitCode {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "kart-dash exited with an error");
            eprintln!("kart-dash: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), GameError> {
    let (config, config_path) = match GameConfig::discover() {
        Ok(found) => found,
        Err(err) => {
            init_tracing(config::DEFAULT_LOG_FILTER);
            return Err(err.into());
        }
    };
    init_tracing(config.log_filter());
    match &config_path {
        Some(path) => info!(path = %path.display(), "config_loaded"),
        None => info!("no config file found, using defaults"),
    }

    let event_loop = EventLoop::<AppEvent>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let proxy = event_loop.create_proxy();
    ctrlc::set_handler(move || {
        // The loop is gone if this fails; nothing left to unmount.
        let _ = proxy.send_event(AppEvent::Shutdown);
    })?;

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    info!("event_loop_exited");
    Ok(())
}

/// `RUST_LOG` wins over the configured filter.
fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
