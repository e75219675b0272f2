//! Time-lapse playback state machine.
//!
//! Pure state: no timers live here. The driver in `orchestrator` owns the ticker and
//! calls [`PlaybackController::tick`] on each period.

use crate::model::{PlaybackState, YearRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Year moved forward by one.
    Advanced(i32),
    /// The tick would have passed the last year; playback stopped.
    Finished,
    /// Not playing; nothing changed.
    Idle,
}

#[derive(Debug, Clone)]
pub struct PlaybackController {
    range: YearRange,
    state: PlaybackState,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(YearRange::default())
    }
}

impl PlaybackController {
    pub fn new(range: YearRange) -> Self {
        Self {
            range,
            state: PlaybackState {
                year: range.first,
                playing: false,
            },
        }
    }

    pub fn with_year(range: YearRange, year: i32) -> Self {
        let mut c = Self::new(range);
        c.state.year = range.clamp(year);
        c
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn year(&self) -> i32 {
        self.state.year
    }

    pub fn is_playing(&self) -> bool {
        self.state.playing
    }

    /// Start playing. At the last year, replay restarts from the first.
    pub fn play(&mut self) {
        if self.state.year >= self.range.last {
            self.state.year = self.range.first;
        }
        self.state.playing = true;
    }

    pub fn pause(&mut self) {
        self.state.playing = false;
    }

    pub fn toggle(&mut self) {
        if self.state.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Manual scrub: always pauses.
    pub fn set_year(&mut self, year: i32) {
        self.state.playing = false;
        self.state.year = self.range.clamp(year);
    }

    pub fn step(&mut self, delta: i32) {
        self.set_year(self.state.year.saturating_add(delta));
    }

    pub fn jump_to_start(&mut self) {
        self.set_year(self.range.first);
    }

    pub fn jump_to_end(&mut self) {
        self.set_year(self.range.last);
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.playing {
            return TickOutcome::Idle;
        }
        if self.state.year < self.range.last {
            self.state.year += 1;
            TickOutcome::Advanced(self.state.year)
        } else {
            self.state.playing = false;
            TickOutcome::Finished
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(year: i32, playing: bool) -> PlaybackState {
        PlaybackState { year, playing }
    }

    #[test]
    fn starts_paused_at_first_year() {
        let c = PlaybackController::default();
        assert_eq!(c.state(), state(1950, false));
    }

    #[test]
    fn play_at_last_year_restarts() {
        let mut c = PlaybackController::with_year(YearRange::default(), 2021);
        c.play();
        assert_eq!(c.state(), state(1950, true));
    }

    #[test]
    fn tick_at_last_year_stops_without_overshoot() {
        let mut c = PlaybackController::with_year(YearRange::default(), 2020);
        c.play();
        assert_eq!(c.tick(), TickOutcome::Advanced(2021));
        assert!(c.is_playing());
        assert_eq!(c.tick(), TickOutcome::Finished);
        assert_eq!(c.state(), state(2021, false));
        assert_eq!(c.tick(), TickOutcome::Idle);
        assert_eq!(c.year(), 2021);
    }

    #[test]
    fn full_replay_visits_every_year_once() {
        let mut c = PlaybackController::default();
        c.play();
        let mut seen = vec![c.year()];
        while let TickOutcome::Advanced(y) = c.tick() {
            seen.push(y);
        }
        assert_eq!(seen, (1950..=2021).collect::<Vec<_>>());
        assert!(!c.is_playing());
    }

    #[test]
    fn scrub_pauses_and_clamps() {
        let mut c = PlaybackController::default();
        c.play();
        c.set_year(1999);
        assert_eq!(c.state(), state(1999, false));
        c.set_year(3000);
        assert_eq!(c.year(), 2021);
        c.step(-100);
        assert_eq!(c.year(), 1950);
        c.step(1);
        assert_eq!(c.state(), state(1951, false));
    }

    #[test]
    fn jumps_force_pause() {
        let mut c = PlaybackController::default();
        c.play();
        c.tick();
        c.jump_to_end();
        assert_eq!(c.state(), state(2021, false));
        c.play();
        c.jump_to_start();
        assert_eq!(c.state(), state(1950, false));
    }

    #[test]
    fn toggle_alternates() {
        let mut c = PlaybackController::with_year(YearRange::default(), 1980);
        c.toggle();
        assert_eq!(c.state(), state(1980, true));
        c.toggle();
        assert_eq!(c.state(), state(1980, false));
    }

    #[test]
    fn pause_keeps_year() {
        let mut c = PlaybackController::default();
        c.play();
        c.tick();
        c.pause();
        assert_eq!(c.state(), state(1951, false));
        assert_eq!(c.tick(), TickOutcome::Idle);
    }
}
