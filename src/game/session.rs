//! The race loop: one mounted game session.
//!
//! A [`RaceSession`] owns the committed [`GameState`], the [`KeyState`] fed by window
//! events and the [`FrameClock`]. Each call to [`RaceSession::frame`] is one update of the
//! scheduling loop: it computes the next snapshot from the held keys, commits it and tells
//! the caller whether another frame should be scheduled.
//!
//! # Lifecycle
//!
//! 1. **Mount**: [`RaceSession::mount`] creates the starting snapshot and attaches input.
//! 2. **Frames**: [`RaceSession::frame`] runs while the session is mounted.
//! 3. **Unmount**: [`RaceSession::unmount`] detaches input and stops the loop. After that,
//!    frames and key events are ignored and no further frame is requested.

use crate::game::clock::FrameClock;
use crate::game::keys::{GameKey, KeyState};
use crate::game::{GameState, RacePhase, Tuning};
use std::time::Instant;
use tracing::{debug, info};
use winit::keyboard::KeyCode;

/// Result of one scheduled frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// The snapshot was advanced and committed; schedule another frame.
    Advanced(GameState),
    /// The session is unmounted; nothing was updated and nothing should be scheduled.
    Stopped,
}

impl FrameOutcome {
    pub fn schedule_next(&self) -> bool {
        matches!(self, FrameOutcome::Advanced(_))
    }
}

pub struct RaceSession {
    state: GameState,
    key_state: KeyState,
    clock: FrameClock,
    tuning: Tuning,
    running: bool,
    frame_count: u64,
}

impl RaceSession {
    /// Mounts a fresh session at `now`.
    pub fn mount(tuning: Tuning, now: Instant) -> Self {
        info!(track_length = tuning.track_length, "race_mounted");
        Self {
            state: GameState::new(),
            key_state: KeyState::new(),
            clock: FrameClock::with_cap_ms(now, tuning.max_frame_ms),
            tuning,
            running: true,
            frame_count: 0,
        }
    }

    /// Routes a key-down to the tracker. Ignored once unmounted.
    pub fn key_down(&mut self, code: KeyCode, repeat: bool) -> Option<GameKey> {
        if !self.running {
            return None;
        }
        self.key_state.press_key(code, repeat)
    }

    /// Routes a key-up to the tracker. Ignored once unmounted.
    pub fn key_up(&mut self, code: KeyCode) {
        if self.running {
            self.key_state.release_key(code);
        }
    }

    /// Runs one tick of the loop at `now`.
    pub fn frame(&mut self, now: Instant) -> FrameOutcome {
        if !self.running {
            return FrameOutcome::Stopped;
        }

        let elapsed_ms = self.clock.tick(now);
        let next = self
            .state
            .step(self.key_state.controls(), elapsed_ms, &self.tuning);

        if next.lap > self.state.lap {
            info!(lap = next.lap, frame = self.frame_count, "lap_completed");
        }
        if self.state.phase() == RacePhase::Racing && next.phase() == RacePhase::Won {
            info!(frame = self.frame_count, "race_won");
        }

        self.state = next;
        self.frame_count += 1;
        FrameOutcome::Advanced(next)
    }

    /// Drops every held key without unmounting.
    pub fn release_all_keys(&mut self) {
        self.key_state.clear();
    }

    /// Stops the loop and detaches input. Safe to call more than once.
    pub fn unmount(&mut self) {
        if !self.running {
            debug!("race_already_unmounted");
            return;
        }
        self.running = false;
        self.key_state.clear();
        info!(frames = self.frame_count, lap = self.state.lap, "race_unmounted");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The last committed snapshot.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn key_state(&self) -> &KeyState {
        &self.key_state
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const FRAME: Duration = Duration::from_millis(16);

    fn run_frames(session: &mut RaceSession, start: Instant, frames: u32) -> Instant {
        let mut now = start;
        for _ in 0..frames {
            now += FRAME;
            assert!(session.frame(now).schedule_next());
        }
        now
    }

    #[test]
    fn test_mount_starts_at_grid() {
        let session = RaceSession::mount(Tuning::default(), Instant::now());
        assert!(session.is_running());
        assert_eq!(*session.state(), GameState::new());
        assert_eq!(session.frame_count(), 0);
    }

    #[test]
    fn test_holding_space_accelerates() {
        let start = Instant::now();
        let mut session = RaceSession::mount(Tuning::default(), start);
        session.key_down(KeyCode::Space, false);
        run_frames(&mut session, start, 12);

        assert!(session.state().is_accelerating);
        assert_eq!(session.state().speed, 10.0);
        assert!(session.state().distance > 0.0);
    }

    #[test]
    fn test_idle_frames_leave_car_parked() {
        let start = Instant::now();
        let mut session = RaceSession::mount(Tuning::default(), start);
        run_frames(&mut session, start, 30);
        assert_eq!(*session.state(), GameState::new());
        assert_eq!(session.frame_count(), 30);
    }

    /// A stalled frame advances by at most the capped elapsed time.
    #[test]
    fn test_stall_is_capped() {
        let start = Instant::now();
        let mut session = RaceSession::mount(Tuning::default(), start);
        session.key_down(KeyCode::Space, false);
        let now = run_frames(&mut session, start, 10);
        let before = session.state().distance;

        session.frame(now + Duration::from_secs(5));
        // Top speed over a 32 ms cap is two reference frames.
        assert_eq!(session.state().distance - before, 20.0);
    }

    #[test]
    fn test_full_lap_wins() {
        let start = Instant::now();
        let mut session = RaceSession::mount(Tuning::default(), start);
        session.key_down(KeyCode::Space, false);
        run_frames(&mut session, start, 300);

        assert_eq!(session.state().lap, 1);
        assert!(session.state().game_won);
        assert_eq!(session.state().phase(), RacePhase::Won);
        // The loop keeps running after the win.
        assert!(session.is_running());
    }

    #[test]
    fn test_unmount_mid_loop_stops_scheduling() {
        let start = Instant::now();
        let mut session = RaceSession::mount(Tuning::default(), start);
        session.key_down(KeyCode::Space, false);
        let now = run_frames(&mut session, start, 5);
        let frozen = *session.state();

        session.unmount();
        assert!(!session.is_running());
        assert_eq!(session.frame(now + FRAME), FrameOutcome::Stopped);
        assert!(!session.frame(now + FRAME * 2).schedule_next());
        assert_eq!(*session.state(), frozen);
        assert_eq!(session.frame_count(), 5);

        session.unmount();
    }

    #[test]
    fn test_input_detached_after_unmount() {
        let mut session = RaceSession::mount(Tuning::default(), Instant::now());
        session.key_down(KeyCode::ArrowUp, false);
        session.unmount();

        assert_eq!(session.key_state().held_count(), 0);
        assert_eq!(session.key_down(KeyCode::Space, false), None);
        assert!(!session.key_state().is_accelerating());
    }

    #[test]
    fn test_release_all_keys_keeps_session_mounted() {
        let start = Instant::now();
        let mut session = RaceSession::mount(Tuning::default(), start);
        session.key_down(KeyCode::Space, false);
        session.key_down(KeyCode::ArrowLeft, false);
        session.release_all_keys();

        assert!(session.is_running());
        assert_eq!(session.key_state().held_count(), 0);
        run_frames(&mut session, start, 3);
        assert_eq!(session.state().speed, 0.0);
    }

    #[test]
    fn test_quit_key_is_reported() {
        let mut session = RaceSession::mount(Tuning::default(), Instant::now());
        assert_eq!(
            session.key_down(KeyCode::Escape, false),
            Some(GameKey::Quit)
        );
    }
}
