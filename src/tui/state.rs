use crate::color::ColorAssigner;
use crate::dataset::Dataset;
use crate::model::{AppEvent, ChartConfig, Frame, PlaybackState, YearRange};
use crate::snapshot;
use std::sync::Arc;
use tracing::debug;

pub struct UiState {
    pub tab: usize,
    pub info: String,
    pub source: String,

    // Dataset is write-once; `None` until the loader finishes.
    pub dataset: Option<Arc<Dataset>>,
    pub load_error: Option<String>,

    pub playback: PlaybackState,
    pub years: YearRange,

    // One cache for the whole session keeps every entity's color stable.
    pub colors: ColorAssigner,
    pub frame: Frame,
    pub total_readout: String,

    // Digits typed so far for a direct year jump.
    pub year_input: String,
}

impl UiState {
    pub fn new(cfg: &ChartConfig) -> Self {
        Self {
            tab: 0,
            info: format!("Loading {}…", cfg.source),
            source: cfg.source.clone(),
            dataset: None,
            load_error: None,
            playback: PlaybackState {
                year: cfg.start_year,
                playing: false,
            },
            years: cfg.years,
            colors: ColorAssigner::new(),
            frame: Frame::empty(cfg.start_year),
            total_readout: "0".into(),
            year_input: String::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.dataset.is_none() && self.load_error.is_none()
    }

    /// Recompute the frame and total readout for the current year.
    pub fn rebuild_frame(&mut self) {
        let year = self.playback.year;
        let ds = self.dataset.clone();
        let records = ds.as_deref().map(Dataset::records).unwrap_or(&[]);
        self.frame = snapshot::build_frame(records, year, &mut self.colors);
        self.total_readout = snapshot::total_readout(records, year);
        debug!(year, colors = self.colors.len(), "frame rebuilt");
    }

    /// Apply a controller event. Returns true when the frame was rebuilt.
    pub fn apply_event(&mut self, ev: AppEvent) -> bool {
        match ev {
            AppEvent::DatasetLoaded(ds) => {
                self.info = format!("Loaded {} records from {}", ds.len(), self.source);
                self.dataset = Some(ds);
                self.load_error = None;
                self.rebuild_frame();
                true
            }
            AppEvent::LoadFailed(msg) => {
                self.info = format!("Load failed: {msg}");
                self.load_error = Some(msg);
                false
            }
            AppEvent::Playback(state) => {
                let year_changed = state.year != self.playback.year;
                self.playback = state;
                if year_changed {
                    self.rebuild_frame();
                }
                year_changed
            }
            AppEvent::Info(msg) => {
                self.info = msg;
                false
            }
        }
    }

    /// Append a typed digit; input longer than a year is ignored.
    pub fn push_year_digit(&mut self, c: char) {
        if c.is_ascii_digit() && self.year_input.len() < 4 {
            self.year_input.push(c);
        }
    }

    /// Consume the typed digits as a year, clamped to the playable range.
    pub fn take_year_input(&mut self) -> Option<i32> {
        let typed = std::mem::take(&mut self.year_input);
        typed.parse::<i32>().ok().map(|y| self.years.clamp(y))
    }

    /// Position of the current year within the range, 0.0..=1.0.
    pub fn progress(&self) -> f64 {
        let span = (self.years.last - self.years.first).max(1) as f64;
        ((self.playback.year - self.years.first) as f64 / span).clamp(0.0, 1.0)
    }
}
