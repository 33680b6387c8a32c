//! ASCII Donut - a spinning torus, sphere-traced into the terminal
//!
//! Usage:
//!   ascii_donut                    - Animate forever (Ctrl-C to stop)
//!   ascii_donut --once             - Print a single frame and exit
//!   ascii_donut -c donut.yaml      - Load settings from a YAML file
//!   ascii_donut --check-config     - Show the effective configuration

use anyhow::Context;
use ascii_donut::config::AppConfig;
use ascii_donut::renderer::Renderer;
use ascii_donut::scene::Scene;
use ascii_donut::terminal::{self, TerminalDisplay};
use clap::{Parser, ValueEnum};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Parser)]
#[command(name = "ascii_donut")]
#[command(version = "0.1.0")]
#[command(about = "Rotating torus rendered to the terminal with SDF ray marching")]
struct Cli {
    /// Path to a YAML config file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Set logging level (trace, debug, info, warn, error); logs go to stderr
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// Stop after this many frames
    #[arg(short = 'n', long)]
    frames: Option<u64>,

    /// Pause between frames in milliseconds
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Render a single frame and exit
    #[arg(long, conflicts_with = "frames")]
    once: bool,

    /// Render rows on a single thread
    #[arg(long)]
    sequential: bool,

    /// Validate and print the effective configuration, then exit
    #[arg(long)]
    check_config: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level_filter = if let Some(level) = cli.log_level {
        level.to_string()
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
            .to_string()
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&level_filter))
        .with_writer(std::io::stderr)
        .init();

    let config = effective_config(&cli)?;

    if cli.check_config {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    let renderer = Renderer::new(config.render.shading).with_parallel(config.render.parallel);
    terminal::check_size((renderer.width() * 2, renderer.height()));

    let mut screen = TerminalDisplay::new();
    run(&config, &renderer, &mut screen)
}

/// Config file (or defaults) with command-line overrides applied
fn effective_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load_or_default(cli.config.as_deref()).with_context(|| {
        match &cli.config {
            Some(path) => format!("loading configuration from {}", path.display()),
            None => "building default configuration".to_string(),
        }
    })?;

    if let Some(frames) = cli.frames {
        config.animation.frames = Some(frames);
    }
    if cli.once {
        config.animation.frames = Some(1);
    }
    if let Some(ms) = cli.interval_ms {
        config.animation.frame_interval_ms = ms;
    }
    if cli.sequential {
        config.render.parallel = false;
    }

    config.validate().context("invalid command-line override")?;
    Ok(config)
}

/// Frame loop: draw, advance the rotation, pause
fn run<W: Write>(
    config: &AppConfig,
    renderer: &Renderer,
    screen: &mut TerminalDisplay<W>,
) -> anyhow::Result<()> {
    let mut scene = Scene::donut();
    let interval = config.animation.frame_interval();

    tracing::info!(
        frames = ?config.animation.frames,
        interval_ms = config.animation.frame_interval_ms,
        parallel = config.render.parallel,
        shading = ?config.render.shading,
        "starting animation"
    );

    loop {
        if let Some(limit) = config.animation.frames {
            if screen.frames_written() >= limit {
                break;
            }
        }

        let frame = renderer.render(&scene);

        if let Err(e) = screen.present(&frame) {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                tracing::debug!("stdout closed, stopping");
                break;
            }
            return Err(e).context("writing frame to stdout");
        }

        scene.advance();
        terminal::pause(interval);
    }

    let written = screen.frames_written();
    tracing::info!(frames = written, "animation finished");
    Ok(())
}
