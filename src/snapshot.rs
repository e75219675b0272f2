//! Per-year frame construction: filter, rank, cap, scale, color.

use crate::color::ColorAssigner;
use crate::model::{Domain, Entry, Frame, Record, HEADROOM, MAX_ENTRIES};

/// Build the ranked frame for `year`.
///
/// The aggregate `World` row is excluded, the remaining rows of `year` are sorted by
/// population (descending, stable on dataset order) and capped at [`MAX_ENTRIES`].
/// The domain is scaled from the largest value of the year, before the cap.
pub fn build_frame(records: &[Record], year: i32, colors: &mut ColorAssigner) -> Frame {
    let mut max = 0u64;
    let mut matching: Vec<&Record> = records
        .iter()
        .filter(|r| !r.is_world())
        .filter(|r| r.year == year)
        .inspect(|r| max = max.max(r.population))
        .collect();

    matching.sort_by(|a, b| b.population.cmp(&a.population));
    matching.truncate(MAX_ENTRIES);

    let entries = matching
        .into_iter()
        .map(|r| Entry {
            name: r.name.clone(),
            value: r.population,
            color: colors.color_for(&r.name),
        })
        .collect();

    Frame {
        year,
        entries,
        domain: Domain::upto(scaled_max(max)),
    }
}

fn scaled_max(max: u64) -> u64 {
    (max as f64 * HEADROOM).round() as u64
}

/// Population of the aggregate `World` row for `year`.
pub fn world_total(records: &[Record], year: i32) -> Option<u64> {
    records
        .iter()
        .find(|r| r.is_world() && r.year == year)
        .map(|r| r.population)
}

/// Digit-grouped total for display; `"0"` when no aggregate row exists.
pub fn total_readout(records: &[Record], year: i32) -> String {
    group_digits(world_total(records, year).unwrap_or(0))
}

/// `2500000000` → `"2,500,000,000"`.
pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Short axis label: `632500000` → `"632.5M"`.
///
/// The unit is settled after rounding, so `999_999` reads `"1M"` rather than `"1000k"`.
pub fn compact(n: u64) -> String {
    const UNITS: [(u64, &str); 3] = [(1_000, "k"), (1_000_000, "M"), (1_000_000_000, "B")];
    let Some(mut idx) = UNITS.iter().rposition(|(scale, _)| n >= *scale) else {
        return n.to_string();
    };
    loop {
        let (scale, suffix) = UNITS[idx];
        let v = (n as f64 / scale as f64 * 10.0).round() / 10.0;
        if v >= 1_000.0 && idx + 1 < UNITS.len() {
            idx += 1;
            continue;
        }
        let s = format!("{v:.1}");
        let s = s.strip_suffix(".0").unwrap_or(&s);
        return format!("{s}{suffix}");
    }
}
