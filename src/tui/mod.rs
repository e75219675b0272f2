mod charts;
mod export;
mod help;
mod state;

use crate::cli::{build_config, Cli};
use crate::dataset::{self, Source};
use crate::model::{AppEvent, ChartConfig};
use crate::orchestrator::{self, ControllerSettings, UiCommand};
use crate::render::RenderAdapter;
use anyhow::{Context, Result};
use charts::RaceView;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MediaKeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Block, Borders, LineGauge, Paragraph, Tabs},
    Terminal,
};
use state::UiState;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::debug;

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);

    // Unbounded channels avoid backpressure and task switching in the hot path.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<AppEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_cfg = cfg.clone();
    let ui_handle = std::thread::spawn(move || run_threaded(ui_cfg, event_rx, cmd_tx));

    let source = Source::parse(&cfg.source);
    let loader = async move { dataset::load(&source).await.map_err(anyhow::Error::from) };
    let res = orchestrator::run_controller(
        ControllerSettings::from(&cfg),
        loader,
        event_tx,
        cmd_rx,
    )
    .await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Map a key press to a playback command, if it is one.
fn key_command(modifiers: KeyModifiers, code: KeyCode) -> Option<UiCommand> {
    match (modifiers, code) {
        (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
            Some(UiCommand::Quit)
        }
        (_, KeyCode::Char(' '))
        | (_, KeyCode::Char('p'))
        | (_, KeyCode::Media(MediaKeyCode::PlayPause)) => Some(UiCommand::TogglePlay),
        (_, KeyCode::Media(MediaKeyCode::Play)) => Some(UiCommand::Play),
        (_, KeyCode::Media(MediaKeyCode::Pause)) | (_, KeyCode::Media(MediaKeyCode::Stop)) => {
            Some(UiCommand::Pause)
        }
        (_, KeyCode::Left) | (_, KeyCode::Char('h')) => Some(UiCommand::Step(-1)),
        (_, KeyCode::Right) | (_, KeyCode::Char('l')) => Some(UiCommand::Step(1)),
        (_, KeyCode::Home) | (_, KeyCode::Char('b')) => Some(UiCommand::JumpToStart),
        (_, KeyCode::End) | (_, KeyCode::Char('e')) => Some(UiCommand::JumpToEnd),
        _ => None,
    }
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(
    cfg: ChartConfig,
    mut event_rx: UnboundedReceiver<AppEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState and the view are owned by the UI thread only; no cross-thread mutation.
    let mut state = UiState::new(&cfg);
    let mut view = RaceView::new(cfg.transition);

    let idle_rate = Duration::from_millis(100);
    let anim_rate = Duration::from_millis(33);
    let mut last_draw = Instant::now()
        .checked_sub(idle_rate)
        .unwrap_or_else(Instant::now);

    let res = loop {
        // Drain events without blocking to keep UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            if state.apply_event(ev) {
                view.render_frame(&state.frame);
            }
        }

        let now = Instant::now();
        let rate = if view.is_animating(now) {
            anim_rate
        } else {
            idle_rate
        };
        if now.duration_since(last_draw) >= rate {
            terminal.draw(|f| draw(f.area(), f, &state, &view)).ok();
            last_draw = now;
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(cmd) = key_command(k.modifiers, k.code) {
                    debug!(?cmd, "key command");
                    let quit = cmd == UiCommand::Quit;
                    let _ = cmd_tx.send(cmd);
                    if quit {
                        break Ok(());
                    }
                    continue;
                }
                match k.code {
                    KeyCode::Char(c) if c.is_ascii_digit() => {
                        state.push_year_digit(c);
                    }
                    KeyCode::Enter => {
                        if let Some(year) = state.take_year_input() {
                            debug!(year, "year entered");
                            let _ = cmd_tx.send(UiCommand::SetYear(year));
                        }
                    }
                    KeyCode::Esc => {
                        state.year_input.clear();
                    }
                    KeyCode::Char('s') => {
                        if state.tab == 0 {
                            export::save_and_show_path(&mut state);
                        }
                    }
                    KeyCode::Tab => {
                        state.tab = (state.tab + 1) % 2;
                    }
                    KeyCode::Char('?') => {
                        state.tab = 1;
                    }
                    _ => {}
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState, view: &RaceView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![Line::from("Race"), Line::from("Help")])
        .select(state.tab)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("population-race"),
        )
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        0 => draw_race(chunks[1], f, state, view),
        _ => help::draw_help(chunks[1], f),
    }
}

fn draw_race(area: Rect, f: &mut ratatui::Frame, state: &UiState, view: &RaceView) {
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(4), // Title + year/total readout
                Constraint::Min(6),    // Bars
                Constraint::Length(3), // Timeline
                Constraint::Length(3), // Status
            ]
            .as_ref(),
        )
        .split(area);

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            format!(
                "Population growth per country, {} to {}",
                state.years.first, state.years.last
            ),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Year: ", Style::default().fg(Color::Gray)),
            Span::styled(
                state.playback.year.to_string(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled("Total: ", Style::default().fg(Color::Gray)),
            Span::styled(state.total_readout.clone(), Style::default().fg(Color::Cyan)),
        ]),
    ])
    .block(Block::default().borders(Borders::LEFT | Borders::RIGHT | Borders::TOP));
    f.render_widget(header, main[0]);

    let chart_title = if state.is_loading() {
        Line::from(vec![
            Span::raw("Top by population "),
            Span::styled("(loading…)", Style::default().fg(Color::DarkGray)),
        ])
    } else {
        Line::from("Top by population")
    };
    view.draw(f, main[1], chart_title, Instant::now());

    let (status_label, status_color) = if state.playback.playing {
        ("▶ Playing", Color::Green)
    } else {
        ("⏸ Paused", Color::Yellow)
    };
    let timeline = LineGauge::default()
        .block(
            Block::default().borders(Borders::ALL).title(Line::from(vec![
                Span::styled(status_label, Style::default().fg(status_color)),
                Span::raw(" ("),
                Span::styled("space", Style::default().fg(Color::Magenta)),
                Span::raw(" play/pause, "),
                Span::styled("←/→", Style::default().fg(Color::Magenta)),
                Span::raw(" scrub, "),
                Span::styled("b/e", Style::default().fg(Color::Magenta)),
                Span::raw(format!(
                    " {}/{})",
                    state.years.first, state.years.last
                )),
            ])),
        )
        .filled_style(Style::default().fg(status_color))
        .unfilled_style(Style::default().fg(Color::DarkGray))
        .line_set(symbols::line::THICK)
        .label(format!(
            "{} ◀ {} ▶ {}",
            state.years.first, state.playback.year, state.years.last
        ))
        .ratio(state.progress());
    f.render_widget(timeline, main[2]);

    let info_style = if state.load_error.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Gray)
    };
    let status_line = if state.year_input.is_empty() {
        Line::from(Span::styled(state.info.clone(), info_style))
    } else {
        Line::from(vec![
            Span::styled("Go to year: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}_", state.year_input),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled("  (enter to jump, esc to cancel)", Style::default().fg(Color::DarkGray)),
        ])
    };
    let status = Paragraph::new(status_line)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, main[3]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playback_keys_map_to_commands() {
        let none = KeyModifiers::NONE;
        assert_eq!(key_command(none, KeyCode::Char(' ')), Some(UiCommand::TogglePlay));
        assert_eq!(key_command(none, KeyCode::Left), Some(UiCommand::Step(-1)));
        assert_eq!(key_command(none, KeyCode::Char('l')), Some(UiCommand::Step(1)));
        assert_eq!(key_command(none, KeyCode::Home), Some(UiCommand::JumpToStart));
        assert_eq!(key_command(none, KeyCode::Char('e')), Some(UiCommand::JumpToEnd));
        assert_eq!(
            key_command(KeyModifiers::CONTROL, KeyCode::Char('c')),
            Some(UiCommand::Quit)
        );
        assert_eq!(
            key_command(none, KeyCode::Media(MediaKeyCode::Play)),
            Some(UiCommand::Play)
        );
        assert_eq!(
            key_command(none, KeyCode::Media(MediaKeyCode::Pause)),
            Some(UiCommand::Pause)
        );
        assert_eq!(key_command(none, KeyCode::Char('7')), None);
        assert_eq!(key_command(none, KeyCode::Char('s')), None);
        assert_eq!(key_command(none, KeyCode::Tab), None);
    }
}
