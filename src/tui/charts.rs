use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};

use crate::color::parse_hex_color;
use crate::model::{Domain, Entry, MAX_ENTRIES};
use crate::render::RenderAdapter;
use crate::snapshot::{compact, group_digits};

const MAX_LABEL: usize = 24;
const PARTIAL_BLOCKS: [&str; 8] = ["", "▏", "▎", "▍", "▌", "▋", "▊", "▉"];

/// One bar tweening between two frames.
#[derive(Debug, Clone)]
struct Tween {
    name: String,
    color: Color,
    from_value: f64,
    to_value: f64,
    from_rank: f64,
    to_rank: f64,
}

/// Interpolated bar at a given instant.
#[derive(Debug, Clone, PartialEq)]
pub struct BarPosition {
    pub name: String,
    pub color: Color,
    pub value: f64,
    pub rank: f64,
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Cubic in-out easing on 0.0..=1.0.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

pub fn to_color(hex: &str) -> Color {
    parse_hex_color(hex)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(Color::Gray)
}

/// Animated racing bar chart. Bars are keyed by entity name across frames.
pub struct RaceView {
    tweens: Vec<Tween>,
    from_domain: f64,
    to_domain: f64,
    started: Instant,
    duration: Duration,
}

impl RaceView {
    pub fn new(duration: Duration) -> Self {
        Self {
            tweens: Vec::new(),
            from_domain: 0.0,
            to_domain: 0.0,
            started: Instant::now(),
            duration,
        }
    }

    fn eased(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let t = now.saturating_duration_since(self.started).as_secs_f64()
            / self.duration.as_secs_f64();
        ease_cubic_in_out(t)
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) < self.duration
    }

    pub fn domain_at(&self, now: Instant) -> f64 {
        lerp(self.from_domain, self.to_domain, self.eased(now))
    }

    pub fn positions_at(&self, now: Instant) -> Vec<BarPosition> {
        let t = self.eased(now);
        let mut out: Vec<BarPosition> = self
            .tweens
            .iter()
            .map(|tw| BarPosition {
                name: tw.name.clone(),
                color: tw.color,
                value: lerp(tw.from_value, tw.to_value, t),
                rank: lerp(tw.from_rank, tw.to_rank, t),
            })
            .collect();
        out.sort_by(|a, b| a.rank.total_cmp(&b.rank));
        out
    }

    /// Start a new transition from wherever the bars are at `now`.
    pub fn retarget(&mut self, entries: &[Entry], domain: Domain, now: Instant) {
        let current = self.positions_at(now);
        let current_domain = self.domain_at(now);

        self.tweens = entries
            .iter()
            .enumerate()
            .map(|(rank, e)| {
                let rank = rank as f64;
                let (from_value, from_rank) = current
                    .iter()
                    .find(|p| p.name == e.name)
                    .map(|p| (p.value, p.rank))
                    // Entering bars grow from zero at their own rank.
                    .unwrap_or((0.0, rank));
                Tween {
                    name: e.name.clone(),
                    color: to_color(&e.color),
                    from_value,
                    to_value: e.value as f64,
                    from_rank,
                    to_rank: rank,
                }
            })
            .collect();

        self.from_domain = if current_domain > 0.0 {
            current_domain
        } else {
            domain.max as f64
        };
        self.to_domain = domain.max as f64;
        self.started = now;
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, title: Line, now: Instant) {
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let positions = self.positions_at(now);
        if positions.is_empty() {
            f.render_widget(Paragraph::new("Waiting for data..."), inner);
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(2)].as_ref())
            .split(inner);
        let (bars_area, axis_area) = (rows[0], rows[1]);

        let label_w = positions
            .iter()
            .map(|p| p.name.chars().count())
            .max()
            .unwrap_or(0)
            .min(MAX_LABEL) as u16;
        // Room for the widest value label (e.g. "1,425,893,465").
        let value_w: u16 = 15;
        let bar_x = bars_area.x + label_w + 1;
        let bar_w = bars_area.width.saturating_sub(label_w + 1 + value_w);
        let domain = self.domain_at(now);

        let row_h = (bars_area.height / MAX_ENTRIES as u16).max(1);
        let thickness = if row_h >= 3 { row_h - 1 } else { row_h };

        for p in &positions {
            let offset = (p.rank * row_h as f64).round() as u16;
            let y = bars_area.y + offset;
            if offset + thickness > bars_area.height {
                continue;
            }
            let cells = if domain > 0.0 {
                (p.value / domain * bar_w as f64).clamp(0.0, bar_w as f64)
            } else {
                0.0
            };
            let bar = bar_string(cells);
            let mid = y + thickness / 2;

            for row in 0..thickness {
                let line_y = y + row;
                let mut spans = vec![Span::styled(bar.clone(), Style::default().fg(p.color))];
                if line_y == mid {
                    spans.push(Span::styled(
                        format!(" {}", group_digits(p.value.round() as u64)),
                        Style::default().fg(Color::Gray),
                    ));
                    let label = truncate(&p.name, label_w as usize);
                    f.render_widget(
                        Paragraph::new(Line::from(Span::styled(
                            format!("{label:>w$}", w = label_w as usize),
                            Style::default().fg(Color::Gray),
                        ))),
                        Rect::new(bars_area.x, line_y, label_w, 1).intersection(bars_area),
                    );
                }
                f.render_widget(
                    Paragraph::new(Line::from(spans)),
                    Rect::new(
                        bar_x,
                        line_y,
                        bars_area.width.saturating_sub(label_w + 1),
                        1,
                    )
                    .intersection(bars_area),
                );
            }
        }

        draw_axis(f, axis_area, bar_x, bar_w, domain);
    }
}

impl RenderAdapter for RaceView {
    fn render(&mut self, entries: &[Entry], domain: Domain) {
        self.retarget(entries, domain, Instant::now());
    }
}

/// Bar of `cells` columns using eighth blocks for the fractional part.
pub fn bar_string(cells: f64) -> String {
    let cells = cells.max(0.0);
    let full = cells.floor() as usize;
    let eighths = ((cells - full as f64) * 8.0).round() as usize;
    let mut s = "█".repeat(full);
    if eighths >= 8 {
        s.push('█');
    } else {
        s.push_str(PARTIAL_BLOCKS[eighths]);
    }
    s
}

fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let mut s: String = name.chars().take(max.saturating_sub(1)).collect();
    s.push('…');
    s
}

/// Bottom axis with ticks at 0, half and full domain.
fn draw_axis(f: &mut Frame, area: Rect, x: u16, width: u16, domain: f64) {
    if area.height == 0 || width < 3 {
        return;
    }
    let rule = Rect::new(x, area.y, width, 1).intersection(area);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "─".repeat(width as usize),
            Style::default().fg(Color::DarkGray),
        ))),
        rule,
    );
    if area.height < 2 {
        return;
    }
    let max = domain.round().max(0.0) as u64;
    let labels = [
        (0u16, "0".to_string()),
        (width / 2, compact(max / 2)),
        (width, compact(max)),
    ];
    for (pos, text) in labels {
        let len = text.chars().count() as u16;
        // Center on the tick, but keep inside the axis span.
        let start = (x + pos)
            .saturating_sub(len / 2)
            .max(x)
            .min((x + width).saturating_sub(len));
        f.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray))),
            Rect::new(start, area.y + 1, len.min(width), 1).intersection(area),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(name: &str, value: u64) -> Entry {
        Entry {
            name: name.into(),
            value,
            color: "#e10537".into(),
        }
    }

    #[test]
    fn easing_hits_endpoints() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(0.5), 0.5);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert_eq!(ease_cubic_in_out(2.0), 1.0);
    }

    #[test]
    fn new_bars_grow_from_zero_at_their_rank() {
        let mut view = RaceView::new(Duration::from_millis(200));
        let t0 = Instant::now();
        view.retarget(&[entry("China", 100), entry("India", 50)], Domain::upto(115), t0);

        let start = view.positions_at(t0);
        assert_eq!(start[0].value, 0.0);
        assert_eq!(start[1].rank, 1.0);
        assert_eq!(start[0].color, Color::Rgb(0xe1, 0x05, 0x37));

        let end = view.positions_at(t0 + Duration::from_millis(200));
        assert_eq!(end[0].value, 100.0);
        assert_eq!(end[1].value, 50.0);
        assert_eq!(view.domain_at(t0), 115.0);
        assert!(!view.is_animating(t0 + Duration::from_millis(250)));
    }

    #[test]
    fn persisting_bars_swap_ranks_smoothly() {
        let mut view = RaceView::new(Duration::from_millis(100));
        let t0 = Instant::now();
        view.retarget(&[entry("A", 100), entry("B", 90)], Domain::upto(115), t0);
        let t1 = t0 + Duration::from_millis(100);
        view.retarget(&[entry("B", 120), entry("A", 110)], Domain::upto(138), t1);

        let start = view.positions_at(t1);
        let a = start.iter().find(|p| p.name == "A").unwrap();
        assert_eq!((a.rank, a.value), (0.0, 100.0));

        let mid = view.positions_at(t1 + Duration::from_millis(50));
        let a = mid.iter().find(|p| p.name == "A").unwrap();
        let b = mid.iter().find(|p| p.name == "B").unwrap();
        assert_eq!(a.rank, 0.5);
        assert_eq!(b.rank, 0.5);

        let end = view.positions_at(t1 + Duration::from_millis(100));
        let names: Vec<_> = end.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn departed_bars_are_removed() {
        let mut view = RaceView::new(Duration::from_millis(100));
        let t0 = Instant::now();
        view.retarget(&[entry("A", 10), entry("B", 5)], Domain::upto(12), t0);
        view.retarget(&[entry("A", 11)], Domain::upto(13), t0 + Duration::from_millis(100));
        assert_eq!(view.positions_at(t0 + Duration::from_secs(1)).len(), 1);
    }

    #[test]
    fn zero_duration_jumps_to_target() {
        let mut view = RaceView::new(Duration::ZERO);
        let t0 = Instant::now();
        view.retarget(&[entry("A", 10)], Domain::upto(12), t0);
        assert_eq!(view.positions_at(t0)[0].value, 10.0);
    }

    #[test]
    fn bar_string_uses_eighths() {
        assert_eq!(bar_string(0.0), "");
        assert_eq!(bar_string(2.0), "██");
        assert_eq!(bar_string(1.5), "█▌");
        assert_eq!(bar_string(0.99), "█");
    }
}
