//! Game state management module.
//!
//! This module defines the [`GameState`] snapshot advanced once per frame, the [`Tuning`]
//! constants that drive the kinematics, and the [`Controls`] view of held keys the update
//! step consumes.
//!
//! # Update Model
//!
//! A [`GameState`] is a plain `Copy` value. [`GameState::step`] never mutates in place; it
//! returns the next snapshot, which the owner of the loop commits wholesale. Every field
//! is clamped inside `step`, so no sequence of inputs can move the car off the playfield
//! or push the speed outside `[0, max_speed]`.

pub mod clock;
pub mod hud;
pub mod keys;
pub mod session;

use serde::Deserialize;

/// Width of the playfield in logical units.
pub const PLAYFIELD_WIDTH: f32 = 800.0;
/// Height of the playfield in logical units.
pub const PLAYFIELD_HEIGHT: f32 = 400.0;
/// Width of the box the car is clamped with.
pub const CAR_WIDTH: f32 = 50.0;
/// Height of the box the car is clamped with. The drawn body is shorter.
pub const CAR_HEIGHT: f32 = 50.0;

const START_X: f32 = 100.0;
const START_Y: f32 = PLAYFIELD_HEIGHT - 100.0;

/// Kinematic constants for the race.
///
/// The defaults reproduce the classic feel of the game: a ten-tick run-up to top speed and
/// a 2000-unit lap. All per-tick rates are applied once per frame regardless of elapsed
/// time; only track progress is scaled by elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Half of the vertical and leftward displacement applied per tick.
    pub player_speed: f32,
    /// Upper bound for `speed`.
    pub max_speed: f32,
    /// Half of the speed gained per tick while accelerating.
    pub acceleration: f32,
    /// Speed lost per tick while coasting.
    pub deceleration: f32,
    /// Distance that makes up one lap.
    pub track_length: f32,
    /// Elapsed time cap in milliseconds.
    pub max_frame_ms: f32,
    /// Frame time at which `speed` equals distance travelled per tick.
    pub reference_frame_ms: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_speed: 5.0,
            max_speed: 10.0,
            acceleration: 0.5,
            deceleration: 0.2,
            track_length: 2000.0,
            max_frame_ms: 32.0,
            reference_frame_ms: 16.0,
        }
    }
}

/// Directional and throttle intent for a single tick.
///
/// Built from the key tracker; the update step only ever sees this read-only view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub accelerate: bool,
}

/// Player-facing phase of the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RacePhase {
    /// No lap completed yet.
    Racing,
    /// At least one lap completed. Terminal.
    Won,
}

/// Snapshot of the race at the end of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameState {
    /// Left edge of the car's clamp box.
    pub x: f32,
    /// Top edge of the car's clamp box.
    pub y: f32,
    /// Current speed in `[0, max_speed]`.
    pub speed: f32,
    /// Whether the accelerate key was held for this tick.
    pub is_accelerating: bool,
    /// Progress along the current lap in `[0, track_length)`.
    pub distance: f32,
    /// Completed laps.
    pub lap: u32,
    /// True once `lap >= 1`.
    pub game_won: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Creates the starting grid snapshot.
    pub fn new() -> Self {
        Self {
            x: START_X,
            y: START_Y,
            speed: 0.0,
            is_accelerating: false,
            distance: 0.0,
            lap: 0,
            game_won: false,
        }
    }

    /// Computes the snapshot that follows `self` after `elapsed_ms` of play.
    ///
    /// `elapsed_ms` is expected to be already capped by the frame clock; negative values
    /// are treated as zero.
    pub fn step(&self, controls: Controls, elapsed_ms: f32, tuning: &Tuning) -> GameState {
        let speed = if controls.accelerate {
            (self.speed + tuning.acceleration * 2.0).min(tuning.max_speed)
        } else {
            (self.speed - tuning.deceleration).max(0.0)
        };

        let y = if controls.up {
            (self.y - tuning.player_speed * 2.0).max(0.0)
        } else if controls.down {
            (self.y + tuning.player_speed * 2.0).min(PLAYFIELD_HEIGHT - CAR_HEIGHT)
        } else {
            self.y
        };

        // Rightward drift follows the speed going into the tick, leftward is a fixed rate.
        let x = if controls.left {
            (self.x - tuning.player_speed * 2.0).max(0.0)
        } else if controls.right {
            (self.x + self.speed * 2.0).min(PLAYFIELD_WIDTH - CAR_WIDTH)
        } else {
            self.x
        };

        let travelled = self.distance + speed * (elapsed_ms.max(0.0) / tuning.reference_frame_ms);
        let (lap, distance) = if travelled >= tuning.track_length {
            let wraps = ((travelled / tuning.track_length).floor() as u32).max(1);
            (self.lap + wraps, travelled % tuning.track_length)
        } else {
            (self.lap, travelled)
        };

        GameState {
            x,
            y,
            speed,
            is_accelerating: controls.accelerate,
            distance,
            lap,
            game_won: lap >= 1,
        }
    }

    /// Returns the player-facing phase for this snapshot.
    pub fn phase(&self) -> RacePhase {
        if self.game_won {
            RacePhase::Won
        } else {
            RacePhase::Racing
        }
    }

    /// Fraction of the current lap completed, in `[0, 1)`.
    pub fn lap_progress(&self, tuning: &Tuning) -> f32 {
        self.distance / tuning.track_length
    }
}
