use crate::text_summary::{self, FrameReport};
use anyhow::{Context, Result};
use std::path::PathBuf;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::info;

use super::state::UiState;

/// Default file name for a saved frame: `population-race-<year>-<utc timestamp>.json`.
pub fn default_file_name(year: i32, at: OffsetDateTime) -> String {
    let stamp = at
        .format(format_description!(
            "[year][month][day]T[hour][minute][second]Z"
        ))
        .unwrap_or_else(|_| at.unix_timestamp().to_string());
    format!("population-race-{year}-{stamp}.json")
}

/// Save the frame on screen to the current directory.
/// Returns the absolute path of the written file.
pub fn save_current_frame(state: &UiState) -> Result<PathBuf> {
    let year = state.frame.year;
    if state.frame.is_empty() {
        anyhow::bail!("no data for {year}");
    }
    let total = state
        .dataset
        .as_deref()
        .and_then(|ds| crate::snapshot::world_total(ds.records(), year));
    let report = FrameReport::new(state.frame.clone(), total);

    let current_dir = std::env::current_dir().context("get current directory")?;
    let path = current_dir.join(default_file_name(year, OffsetDateTime::now_utc()));
    text_summary::export_json(&path, std::slice::from_ref(&report))?;
    info!(path = %path.display(), year, "saved frame");
    Ok(path)
}

/// Save and update `state.info` with the outcome.
pub fn save_and_show_path(state: &mut UiState) {
    match save_current_frame(state) {
        Ok(path) => {
            state.info = format!("Saved: {}", path.display());
        }
        Err(e) => {
            state.info = format!("Save failed: {e:#}");
        }
    }
}
