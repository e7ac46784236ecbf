mod app;
mod config;
mod fortune;
mod lotto;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Popup};
use config::AppConfig;
use fortune::{top_prediction, FrameSource, JsonModelLoader, ModelLoader, PpmCamera};
use lotto::sampler::Sampler;
use lotto::PickedNumbers;
use theme::ThemeMode;

#[derive(Parser, Debug)]
#[command(name = "lotto")]
#[command(version = "0.1.0")]
#[command(about = "A terminal lottery number picker with a webcam fortune reader")]
struct Args {
    /// Print draws to stdout and exit
    #[arg(short, long)]
    pick: bool,

    /// Number of draws to print with --pick
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    draws: u32,

    /// Print draws as JSON
    #[arg(long)]
    json: bool,

    /// Seed the number generator for repeatable draws
    #[arg(long)]
    seed: Option<u64>,

    /// Your own ticket, e.g. "3,11,17,24,38,45"; draws show how many numbers match
    #[arg(short, long)]
    ticket: Option<PickedNumbers>,

    /// Send a desktop notification with the first draw (with --pick)
    #[arg(long)]
    notify: bool,

    /// Classify one camera frame, print the predictions as JSON and exit
    #[arg(long)]
    classify: bool,

    /// Fortune model file (overrides config)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Directory of PPM camera frames (overrides config)
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Start in the light theme
    #[arg(long)]
    light: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr, silent unless RUST_LOG is set)
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load().unwrap_or_default();
    if let Some(model) = args.model.clone() {
        config.model_path = Some(model);
    }
    if let Some(frames) = args.frames.clone() {
        config.frames_dir = Some(frames);
    }

    let sampler = match args.seed {
        Some(seed) => Sampler::from_seed(seed),
        None => Sampler::from_entropy(),
    };

    // Handle CLI-only commands
    if args.pick {
        return print_draws(&args, &config, sampler);
    }

    if args.classify {
        return classify(&config).await;
    }

    let mode = if args.light {
        ThemeMode::Light
    } else {
        ThemeMode::Dark
    };

    // Run TUI
    let mut app = App::new(&config, sampler, mode);
    app.ticket = args.ticket;
    run_tui(app).await
}

fn print_draws(args: &Args, config: &AppConfig, mut sampler: Sampler) -> Result<()> {
    let draws: Vec<_> = (0..args.draws).map(|_| sampler.pick()).collect();
    println!("{}", format_draws(&draws, args.ticket.as_ref(), args.json)?);

    let Some(first) = draws.first() else {
        return Ok(());
    };
    let body = format!("Your numbers: {}", first);
    if args.notify {
        notify("lotto", &body)?;
    } else if config.notifications {
        // Configured notifications are best effort; the draws are already printed
        if let Err(e) = notify("lotto", &body) {
            tracing::warn!("Desktop notification failed: {}", e);
        }
    }
    Ok(())
}

/// One draw per line ("03 11 17 24 38 45", plus hits against a ticket),
/// or a JSON array of arrays
fn format_draws(
    draws: &[PickedNumbers],
    ticket: Option<&PickedNumbers>,
    json: bool,
) -> Result<String> {
    if json {
        return Ok(serde_json::to_string(draws)?);
    }

    let lines: Vec<String> = draws
        .iter()
        .map(|picked| match ticket {
            Some(ticket) => format!("{}  ({} hits)", picked, picked.hits(ticket)),
            None => picked.to_string(),
        })
        .collect();
    Ok(lines.join("\n"))
}

async fn classify(config: &AppConfig) -> Result<()> {
    let model_path = config
        .model_path
        .as_ref()
        .context("No fortune model configured (set model_path or use --model)")?;
    let frames_dir = config
        .frames_dir
        .as_ref()
        .context("No camera configured (set frames_dir or use --frames)")?;

    let model = JsonModelLoader.load(&model_path.to_string_lossy()).await?;
    let frame = PpmCamera::open(frames_dir)?.grab()?;
    let predictions = model.predict(&frame)?;

    let output = serde_json::json!({
        "top": top_prediction(&predictions).map(|p| p.label.clone()),
        "classes": model.total_classes(),
        "predictions": predictions,
    });

    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

async fn run_tui(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        // Short poll keeps the staggered reveal smooth
        if event::poll(std::time::Duration::from_millis(30))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None => return Ok(()),
                        KeyCode::Char('c')
                            if key.modifiers.contains(event::KeyModifiers::CONTROL) =>
                        {
                            return Ok(())
                        }
                        _ => app.handle_key(key),
                    }
                }
            }
        }

        // Let spawned model loads make progress
        tokio::task::yield_now().await;
        app.tick();
    }
}

fn notify(summary: &str, body: &str) -> Result<()> {
    notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .icon("applications-games")
        .show()?;
    Ok(())
}
