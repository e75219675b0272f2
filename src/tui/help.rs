use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: usize, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(desc),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("space", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("p", Style::default().fg(Color::Magenta)),
            Span::raw("   Play/Pause time-lapse"),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("←/→", Style::default().fg(Color::Magenta)),
            Span::raw(" or "),
            Span::styled("h/l", Style::default().fg(Color::Magenta)),
            Span::raw("  Previous/next year (pauses)"),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("Home", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("b", Style::default().fg(Color::Magenta)),
            Span::raw("    Jump to 1950"),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("End", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("e", Style::default().fg(Color::Magenta)),
            Span::raw("     Jump to 2021"),
        ]),
        key_line("0-9", 9, "Type a year, enter to jump (pauses), esc to cancel"),
        key_line("media keys", 2, "Play / Pause"),
        key_line("s", 11, "Save current frame as JSON"),
        key_line("tab", 9, "Switch tabs"),
        key_line("?", 11, "Show this help"),
        Line::from(""),
        Line::from("Scrubbing or jumping always pauses playback."),
        Line::from("Playing from 2021 restarts the time-lapse at 1950."),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
