use crate::dataset::Dataset;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Aggregate pseudo-entity carrying the global total; never ranked.
pub const WORLD_LABEL: &str = "World";
/// Maximum number of bars in one frame.
pub const MAX_ENTRIES: usize = 12;
/// Scale headroom applied to the largest value of the displayed year.
pub const HEADROOM: f64 = 1.15;
pub const FIRST_YEAR: i32 = 1950;
pub const LAST_YEAR: i32 = 2021;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    pub source: String,
    #[serde(with = "humantime_serde")]
    pub tick: Duration,
    #[serde(with = "humantime_serde")]
    pub transition: Duration,
    pub start_year: i32,
    pub autoplay: bool,
    pub years: YearRange,
}

/// One typed row of the source dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub year: i32,
    pub population: u64,
}

impl Record {
    pub fn new(name: impl Into<String>, year: i32, population: u64) -> Self {
        Self {
            name: name.into(),
            year,
            population,
        }
    }

    pub fn is_world(&self) -> bool {
        self.name == WORLD_LABEL
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub value: u64,
    /// `#rrggbb`, lowercase.
    pub color: String,
}

/// Linear scale domain of the value axis; `min` is always 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub min: u64,
    pub max: u64,
}

impl Domain {
    pub fn upto(max: u64) -> Self {
        Self { min: 0, max }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub year: i32,
    pub entries: Vec<Entry>,
    pub domain: Domain,
}

impl Frame {
    pub fn empty(year: i32) -> Self {
        Self {
            year,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Inclusive range of playable years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub first: i32,
    pub last: i32,
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            first: FIRST_YEAR,
            last: LAST_YEAR,
        }
    }
}

impl YearRange {
    pub fn clamp(self, year: i32) -> i32 {
        year.clamp(self.first, self.last)
    }

    pub fn contains(self, year: i32) -> bool {
        (self.first..=self.last).contains(&year)
    }

    pub fn iter(self) -> impl Iterator<Item = i32> {
        self.first..=self.last
    }

    pub fn len(self) -> usize {
        (self.last - self.first + 1).max(0) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub year: i32,
    pub playing: bool,
}

/// Events emitted by the playback driver and consumed by presentation layers.
#[derive(Debug, Clone)]
pub enum AppEvent {
    DatasetLoaded(Arc<Dataset>),
    LoadFailed(String),
    Playback(PlaybackState),
    Info(String),
}
