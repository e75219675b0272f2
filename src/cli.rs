use crate::dataset::{self, Dataset, Source};
use crate::model::{ChartConfig, YearRange};
use crate::text_summary::{self, FrameReport};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "population-race",
    version,
    about = "Racing bar chart of population per country, 1950 to 2021"
)]
pub struct Cli {
    /// CSV file path or http(s) URL with `Country name`, `Year` and `Population` columns
    #[arg(long, default_value = "data/population-and-demography.csv")]
    pub source: String,

    /// Time between two years during playback
    #[arg(long, default_value = "200ms")]
    pub tick: humantime::Duration,

    /// Bar animation duration (defaults to the tick interval)
    #[arg(long)]
    pub transition: Option<humantime::Duration>,

    /// Year shown when the TUI opens
    #[arg(long, default_value_t = crate::model::FIRST_YEAR)]
    pub start_year: i32,

    /// Start playing as soon as the TUI opens
    #[arg(long)]
    pub autoplay: bool,

    /// Print frames as text and exit (no TUI)
    #[arg(long, conflicts_with = "json")]
    pub text: bool,

    /// Print frames as JSON and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Only output this year in text/JSON modes (default: every year)
    #[arg(long)]
    pub year: Option<i32>,

    /// Also write the printed frames to this JSON file
    #[arg(long)]
    pub export_json: Option<PathBuf>,

    /// Log file used while the TUI owns the terminal
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

pub async fn run(args: Cli) -> Result<()> {
    if !args.json && !args.text {
        init_tui_logging(args.log_file.as_deref());
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_text(args).await;
        }
    }

    init_stderr_logging();
    if args.json {
        return run_json(args).await;
    }
    run_text(args).await
}

/// Build a `ChartConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> ChartConfig {
    let years = YearRange::default();
    let tick = Duration::from(args.tick);
    ChartConfig {
        source: args.source.clone(),
        tick,
        transition: args.transition.map(Duration::from).unwrap_or(tick),
        start_year: years.clamp(args.start_year),
        autoplay: args.autoplay,
        years,
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Default TUI log location: `<cache dir>/population-race/population-race.log`.
fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("population-race").join("population-race.log"))
}

/// Route logs to a file so they never draw over the alternate screen.
fn init_tui_logging(path: Option<&Path>) {
    let path = path.map(Path::to_path_buf).or_else(default_log_path);
    let file = path.and_then(|p| {
        if let Some(parent) = p.parent() {
            std::fs::create_dir_all(parent).ok()?;
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(p)
            .ok()
    });
    match file {
        Some(f) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(f))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::sink)
                .try_init();
        }
    }
}

/// Years printed by text/JSON modes.
fn selected_years(args: &Cli, cfg: &ChartConfig) -> Result<YearRange> {
    match args.year {
        Some(y) if cfg.years.contains(y) => Ok(YearRange { first: y, last: y }),
        Some(y) => Err(anyhow::anyhow!(
            "--year {y} is outside {}..={}",
            cfg.years.first,
            cfg.years.last
        )),
        None => Ok(cfg.years),
    }
}

async fn load_dataset(cfg: &ChartConfig) -> Result<Dataset> {
    let source = Source::parse(&cfg.source);
    let ds = dataset::load(&source)
        .await
        .with_context(|| format!("failed to load dataset from {source}"))?;
    if ds.is_empty() {
        warn!(%source, "dataset is empty; every frame will be blank");
    }
    Ok(ds)
}

/// Handle the `--export-json` flag for both text and JSON modes.
fn handle_exports(args: &Cli, reports: &[FrameReport]) -> Result<Option<PathBuf>> {
    let Some(p) = args.export_json.as_deref() else {
        return Ok(None);
    };
    text_summary::export_json(p, reports)?;
    info!(path = %p.display(), frames = reports.len(), "exported frames");
    Ok(Some(p.to_path_buf()))
}

async fn run_json(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let years = selected_years(&args, &cfg)?;
    let ds = load_dataset(&cfg).await?;
    debug!(frames = years.len(), "building frames");
    let reports = text_summary::build_reports(&ds, years);

    let (out_tx, out_handle) = spawn_output_writer();
    let out = serde_json::to_string_pretty(&reports)?;
    let _ = out_tx.send(OutputLine::Stdout(out));
    if let Some(p) = handle_exports(&args, &reports)? {
        let _ = out_tx.send(OutputLine::Stderr(format!("Exported: {}", p.display())));
    }
    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

async fn run_text(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let years = selected_years(&args, &cfg)?;
    let (out_tx, out_handle) = spawn_output_writer();
    let _ = out_tx.send(OutputLine::Stderr(format!("Loading {}…", cfg.source)));
    let ds = load_dataset(&cfg).await?;

    debug!(frames = years.len(), "building frames");
    let reports = text_summary::build_reports(&ds, years);
    for report in &reports {
        let summary = text_summary::build_text_summary(report, text_summary::TEXT_WIDTH);
        for line in summary.lines {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    }
    if let Some(p) = handle_exports(&args, &reports)? {
        let _ = out_tx.send(OutputLine::Stderr(format!("Exported: {}", p.display())));
    }
    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}
