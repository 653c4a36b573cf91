//! Keyboard input tracking for the race.
//!
//! This module defines the [`GameKey`] enum for abstracting race actions from physical keys,
//! and [`KeyState`], the set of held keys plus the accelerate flag. Only the window event
//! handler mutates a [`KeyState`]; the game loop reads it through [`KeyState::controls`].

use crate::game::Controls;
use std::collections::HashSet;
use winit::keyboard::KeyCode;

/// Race actions bound to physical keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKey {
    /// Move the car up (Up Arrow).
    MoveUp,
    /// Move the car down (Down Arrow).
    MoveDown,
    /// Move the car left (Left Arrow).
    MoveLeft,
    /// Drift the car right (Right Arrow).
    MoveRight,
    /// Hold to accelerate (Space).
    Accelerate,
    /// Close the game (Escape).
    Quit,
}

macro_rules! match_key_code {
    ($k:expr, {
        $($key:ident => $variant:expr),* $(,)?
    }) => {{
        match $k {
            $(KeyCode::$key => Some($variant),)*
            _ => None,
        }
    }};
}

impl GameKey {
    /// Maps a physical key code to the action it is bound to, if any.
    pub fn from_key_code(code: KeyCode) -> Option<GameKey> {
        match_key_code!(code, {
            ArrowUp => GameKey::MoveUp,
            ArrowDown => GameKey::MoveDown,
            ArrowLeft => GameKey::MoveLeft,
            ArrowRight => GameKey::MoveRight,
            Space => GameKey::Accelerate,
            Escape => GameKey::Quit,
        })
    }
}

/// The set of currently held keys.
///
/// Unbound keys are tracked too so the set mirrors the keyboard, but only bound keys
/// influence [`KeyState::controls`].
#[derive(Debug, Default)]
pub struct KeyState {
    pressed_keys: HashSet<KeyCode>,
    accelerating: bool,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a key-down. Auto-repeat events are dropped.
    ///
    /// Returns the bound action so the caller can react to one-shot keys such as
    /// [`GameKey::Quit`].
    pub fn press_key(&mut self, code: KeyCode, repeat: bool) -> Option<GameKey> {
        if repeat {
            return None;
        }
        self.pressed_keys.insert(code);
        let game_key = GameKey::from_key_code(code);
        if game_key == Some(GameKey::Accelerate) {
            self.accelerating = true;
        }
        game_key
    }

    /// Records a key-up.
    pub fn release_key(&mut self, code: KeyCode) {
        self.pressed_keys.remove(&code);
        if GameKey::from_key_code(code) == Some(GameKey::Accelerate) {
            self.accelerating = false;
        }
    }

    /// Whether any key bound to `key` is held.
    pub fn is_pressed(&self, key: GameKey) -> bool {
        self.pressed_keys
            .iter()
            .any(|&code| GameKey::from_key_code(code) == Some(key))
    }

    pub fn is_accelerating(&self) -> bool {
        self.accelerating
    }

    pub fn is_code_held(&self, code: KeyCode) -> bool {
        self.pressed_keys.contains(&code)
    }

    pub fn held_count(&self) -> usize {
        self.pressed_keys.len()
    }

    /// Drops every held key, used when input routing is detached.
    pub fn clear(&mut self) {
        self.pressed_keys.clear();
        self.accelerating = false;
    }

    /// Snapshot of the bound keys for one tick.
    pub fn controls(&self) -> Controls {
        Controls {
            up: self.is_pressed(GameKey::MoveUp),
            down: self.is_pressed(GameKey::MoveDown),
            left: self.is_pressed(GameKey::MoveLeft),
            right: self.is_pressed(GameKey::MoveRight),
            accelerate: self.accelerating,
        }
    }
}
