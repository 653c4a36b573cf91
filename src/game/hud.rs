//! Text read-outs shown over the playfield.
//!
//! [`RaceStats`] derives the numbers the status panel shows from a [`GameState`];
//! the string constants cover the controls guide and the win notice.

use crate::game::{GameState, Tuning};

pub const STATS_HEADING: &str = "Race Stats";
pub const CONTROLS_GUIDE: &str = "↑↓ Vertical movement\n← → Horizontal movement\nSpace Accelerate";
pub const WIN_HEADLINE: &str = "You Win!";
pub const WIN_DETAIL: &str = "Lap completed successfully!";
pub const WINDOW_TITLE: &str = "Kart Dash: use arrow keys to move and spacebar to accelerate";

/// Display values for the status panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceStats {
    /// Speed in display units (ten per internal unit).
    pub speed: u32,
    /// Rounded percentage of the current lap.
    pub progress_percent: u32,
    pub lap: u32,
}

impl RaceStats {
    pub fn from_state(state: &GameState, tuning: &Tuning) -> Self {
        Self {
            speed: (state.speed * 10.0).round() as u32,
            progress_percent: (state.lap_progress(tuning) * 100.0).round() as u32,
            lap: state.lap,
        }
    }

    pub fn speed_text(&self) -> String {
        format!("Speed: {} mph", self.speed)
    }

    pub fn progress_text(&self) -> String {
        format!("Progress: {}%", self.progress_percent)
    }

    pub fn lap_text(&self) -> String {
        format!("Lap: {}", self.lap)
    }

    /// All three read-outs, one per line.
    pub fn panel_text(&self) -> String {
        format!(
            "{}\n{}\n{}",
            self.speed_text(),
            self.progress_text(),
            self.lap_text()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_at_start() {
        let stats = RaceStats::from_state(&GameState::new(), &Tuning::default());
        assert_eq!(stats.panel_text(), "Speed: 0 mph\nProgress: 0%\nLap: 0");
    }

    #[test]
    fn test_stats_rounding() {
        let state = GameState {
            speed: 4.96,
            distance: 509.0,
            lap: 0,
            ..GameState::new()
        };
        let stats = RaceStats::from_state(&state, &Tuning::default());
        assert_eq!(stats.speed, 50);
        // 509 / 2000 = 25.45%
        assert_eq!(stats.progress_percent, 25);
        assert_eq!(stats.speed_text(), "Speed: 50 mph");
        assert_eq!(stats.progress_text(), "Progress: 25%");
    }

    #[test]
    fn test_stats_after_lap() {
        let state = GameState {
            speed: 10.0,
            distance: 0.0,
            lap: 1,
            game_won: true,
            ..GameState::new()
        };
        let stats = RaceStats::from_state(&state, &Tuning::default());
        assert_eq!(stats.speed, 100);
        assert_eq!(stats.progress_percent, 0);
        assert_eq!(stats.lap_text(), "Lap: 1");
    }
}
