//! Playback lifecycle controller.
//!
//! Owns the playback state machine, the single ticker and the dataset load, and emits
//! events for presentation layers.

use crate::dataset::Dataset;
use crate::model::{AppEvent, ChartConfig, PlaybackState, YearRange};
use crate::playback::{PlaybackController, TickOutcome};
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::{Duration, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Commands emitted by UI layers to control playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UiCommand {
    TogglePlay,
    Play,
    Pause,
    SetYear(i32),
    Step(i32),
    JumpToStart,
    JumpToEnd,
    Quit,
}

/// Settings the controller needs from `ChartConfig`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ControllerSettings {
    pub tick: Duration,
    pub years: YearRange,
    pub start_year: i32,
    pub autoplay: bool,
}

impl From<&ChartConfig> for ControllerSettings {
    fn from(cfg: &ChartConfig) -> Self {
        Self {
            tick: cfg.tick,
            years: cfg.years,
            start_year: cfg.start_year,
            autoplay: cfg.autoplay,
        }
    }
}

/// The one periodic timer driving playback. Re-arming always drops the previous interval.
pub(crate) struct Ticker {
    interval: Option<Interval>,
}

impl Ticker {
    pub fn new() -> Self {
        Self { interval: None }
    }

    pub fn arm(&mut self, period: Duration) {
        self.disarm();
        let mut iv = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        iv.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(iv);
    }

    pub fn disarm(&mut self) {
        self.interval = None;
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Resolves on the next period; never resolves while disarmed.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(iv) => {
                iv.tick().await;
            }
            None => futures::future::pending().await,
        }
    }
}

fn apply_command(playback: &mut PlaybackController, cmd: &UiCommand) {
    match *cmd {
        UiCommand::TogglePlay => playback.toggle(),
        UiCommand::Play => playback.play(),
        UiCommand::Pause => playback.pause(),
        UiCommand::SetYear(y) => playback.set_year(y),
        UiCommand::Step(d) => playback.step(d),
        UiCommand::JumpToStart => playback.jump_to_start(),
        UiCommand::JumpToEnd => playback.jump_to_end(),
        UiCommand::Quit => {}
    }
}

/// Bring the ticker in line with the playback state: fresh timer while playing, none otherwise.
fn sync_ticker(ticker: &mut Ticker, playback: &PlaybackController, period: Duration) {
    if playback.is_playing() {
        ticker.arm(period);
    } else {
        ticker.disarm();
    }
}

fn emit(event_tx: &UnboundedSender<AppEvent>, state: PlaybackState) {
    let _ = event_tx.send(AppEvent::Playback(state));
}

/// Drive playback from UI commands and emit events back to presentation layers.
///
/// `loader` resolves to the dataset; it runs concurrently with playback so commands
/// issued before it completes are still honored.
pub(crate) async fn run_controller<L>(
    settings: ControllerSettings,
    loader: L,
    event_tx: UnboundedSender<AppEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()>
where
    L: Future<Output = Result<Dataset>> + Send + 'static,
{
    let mut playback = PlaybackController::with_year(settings.years, settings.start_year);
    let mut ticker = Ticker::new();
    let mut load_handle = Some(tokio::spawn(loader));

    if settings.autoplay {
        playback.play();
    }
    sync_ticker(&mut ticker, &playback, settings.tick);
    emit(&event_tx, playback.state());

    loop {
        tokio::select! {
            // Commands win over a tick that became ready at the same time, so a scrub
            // always tears the timer down before it can fire again.
            biased;

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Quit) | None => {
                        debug!("controller shutting down");
                        break;
                    }
                    Some(cmd) => {
                        apply_command(&mut playback, &cmd);
                        sync_ticker(&mut ticker, &playback, settings.tick);
                        debug!(?cmd, state = ?playback.state(), armed = ticker.is_armed(), "command applied");
                        emit(&event_tx, playback.state());
                    }
                }
            }
            // Do not take the JoinHandle before this branch wins; otherwise it can be dropped
            // if another select branch is chosen, and we'll never observe completion.
            join_res = async {
                match load_handle.as_mut() {
                    Some(h) => h.await,
                    None => futures::future::pending().await,
                }
            } => {
                load_handle = None;
                match join_res {
                    Ok(Ok(ds)) => {
                        info!(records = ds.len(), "dataset ready");
                        let _ = event_tx.send(AppEvent::DatasetLoaded(Arc::new(ds)));
                    }
                    Ok(Err(e)) => {
                        warn!(error = %format!("{e:#}"), "dataset load failed");
                        let _ = event_tx.send(AppEvent::LoadFailed(format!("{e:#}")));
                    }
                    Err(e) => {
                        let _ = event_tx.send(AppEvent::LoadFailed(format!("load task failed: {e}")));
                    }
                }
            }
            _ = ticker.tick() => {
                match playback.tick() {
                    TickOutcome::Advanced(_) => emit(&event_tx, playback.state()),
                    TickOutcome::Finished => {
                        ticker.disarm();
                        info!(year = playback.year(), "playback reached the last year");
                        emit(&event_tx, playback.state());
                        let _ = event_tx.send(AppEvent::Info("Reached the last year".into()));
                    }
                    TickOutcome::Idle => ticker.disarm(),
                }
            }
        }
    }

    if let Some(h) = load_handle.take() {
        h.abort();
    }
    Ok(())
}
