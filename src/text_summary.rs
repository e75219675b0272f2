//! Text and JSON output for non-interactive modes.
//!
//! This module builds one report per year and formats it as plain text bars.

use crate::color::ColorAssigner;
use crate::dataset::Dataset;
use crate::model::{Domain, Entry, Frame, YearRange};
use crate::render::RenderAdapter;
use crate::snapshot::{self, group_digits};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Total line width of text output.
pub(crate) const TEXT_WIDTH: usize = 100;
const MAX_LABEL: usize = 24;

/// A frame plus the aggregate readout, as printed and exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct FrameReport {
    pub year: i32,
    /// `None` when the dataset has no `World` row for the year.
    pub total: Option<u64>,
    pub total_readout: String,
    pub entries: Vec<Entry>,
    pub domain: Domain,
}

impl FrameReport {
    pub fn new(frame: Frame, total: Option<u64>) -> Self {
        Self {
            year: frame.year,
            total,
            total_readout: group_digits(total.unwrap_or(0)),
            entries: frame.entries,
            domain: frame.domain,
        }
    }
}

/// Build a report for every year in `years`, sharing one color cache.
pub(crate) fn build_reports(ds: &Dataset, years: YearRange) -> Vec<FrameReport> {
    let mut colors = ColorAssigner::new();
    years
        .iter()
        .map(|year| {
            let frame = snapshot::build_frame(ds.records(), year, &mut colors);
            FrameReport::new(frame, snapshot::world_total(ds.records(), year))
        })
        .collect()
}

/// Static renderer producing one `#` bar per entry.
pub(crate) struct TextBars {
    width: usize,
    pub lines: Vec<String>,
}

impl TextBars {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
        }
    }
}

fn truncate_label(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let mut s: String = name.chars().take(max.saturating_sub(1)).collect();
    s.push('…');
    s
}

impl RenderAdapter for TextBars {
    fn render(&mut self, entries: &[Entry], domain: Domain) {
        self.lines.clear();
        let label_w = entries
            .iter()
            .map(|e| e.name.chars().count())
            .max()
            .unwrap_or(0)
            .min(MAX_LABEL);
        let value_w = entries
            .iter()
            .map(|e| group_digits(e.value).len())
            .max()
            .unwrap_or(0);
        let bar_w = self.width.saturating_sub(label_w + value_w + 2).max(1);

        for e in entries {
            let filled = if domain.max == 0 {
                0
            } else {
                ((e.value as f64 / domain.max as f64) * bar_w as f64).round() as usize
            };
            let label = truncate_label(&e.name, label_w);
            self.lines.push(format!(
                "{label:>label_w$} {bar} {value}",
                bar = "#".repeat(filled.min(bar_w)),
                value = group_digits(e.value),
            ));
        }
    }
}

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Format one report as a header line followed by its bars.
pub(crate) fn build_text_summary(report: &FrameReport, width: usize) -> TextSummary {
    let mut lines = vec![format!(
        "Year: {}  Total: {}",
        report.year, report.total_readout
    )];
    let mut bars = TextBars::new(width);
    bars.render(&report.entries, report.domain);
    if bars.lines.is_empty() {
        lines.push("  (no data)".into());
    }
    lines.extend(bars.lines);
    lines.push(String::new());
    TextSummary { lines }
}

/// Write reports as pretty JSON.
pub(crate) fn export_json(path: &Path, reports: &[FrameReport]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(reports).context("serialize frames")?;
    std::fs::write(path, body).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
