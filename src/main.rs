use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use std::fs::File;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use pacman_game::audio::{self, SoundKind};
use pacman_game::config::Config;
use pacman_game::events::GameEvent;
use pacman_game::game::{GameState, Session};
use pacman_game::highscore::{HighScoreFile, HighScoreStore};
use pacman_game::input::{command_for, Command};
use pacman_game::render::Renderer;

/// Simulation steps allowed per frame before the backlog is dropped.
const MAX_CATCH_UP_STEPS: u32 = 8;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for ghost decisions, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Where the best score is kept between sessions
    #[arg(long)]
    high_score_file: Option<PathBuf>,

    /// Write logs to this file (the terminal itself is busy with the maze)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// End the session after this many seconds
    #[arg(long)]
    time_limit: Option<f32>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    config.apply_env_overrides();
    if args.seed.is_some() {
        config.game.seed = args.seed;
    }
    if args.time_limit.is_some() {
        config.game.time_limit = args.time_limit;
    }
    if let Some(path) = args.log_file.or_else(|| config.log_file.clone()) {
        init_logging(&path)?;
    }
    match &args.config {
        Some(path) => tracing::info!(path = %path.display(), "configuration loaded"),
        None => tracing::info!("no config file given, using defaults"),
    }

    let high_score_path = args
        .high_score_file
        .or_else(|| config.high_score_file.clone())
        .or_else(HighScoreFile::get_default_path);
    let mut store = HighScoreStore::open(high_score_path);
    let mut session = Session::new(config.game.clone(), store.high_score());
    tracing::info!(
        tick_hz = session.tuning().tick_hz,
        high_score = store.high_score(),
        "starting"
    );

    let mut stdout = io::stdout();
    terminal::enable_raw_mode().context("Failed to enable raw mode")?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &mut session, &mut store, &config);
    persist(&mut store, session.high_score());

    let restored = restore_terminal(&mut stdout);
    if let Err(e) = &result {
        tracing::error!(error = %e, "session aborted");
    }
    result.and(restored)
}

/// Undoes raw mode and the alternate screen, attempting every step.
fn restore_terminal(stdout: &mut Stdout) -> Result<()> {
    let shown = stdout.execute(Show).map(drop);
    let left = stdout.execute(LeaveAlternateScreen).map(drop);
    let raw = terminal::disable_raw_mode();
    shown.and(left).and(raw).context("Failed to restore the terminal")
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(
    stdout: &mut Stdout,
    session: &mut Session,
    store: &mut HighScoreStore,
    config: &Config,
) -> Result<()> {
    let maze = session.maze();
    let mut renderer = Renderer::new(
        maze.width() as usize,
        maze.height() as usize,
        config.display.cell_width,
    );
    let mut sink = audio::sink_for(config.audio.enabled);
    let step = Duration::from_secs_f32(session.tuning().dt());
    let frame_time = Duration::from_micros(1_000_000 / config.display.render_fps.max(1));
    let mut accumulator = Duration::ZERO;
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(command) = command_for(&key) {
                        if !dispatch(session, command) {
                            return Ok(());
                        }
                    }
                }
                Event::Resize(..) => renderer.invalidate(),
                _ => {}
            }
        }

        accumulator += frame_start - last;
        last = frame_start;
        let mut steps = 0;
        while accumulator >= step {
            if steps == MAX_CATCH_UP_STEPS {
                tracing::debug!(behind = ?accumulator, "dropping simulation backlog");
                accumulator = Duration::ZERO;
                break;
            }
            session.tick();
            accumulator -= step;
            steps += 1;
        }

        let events: Vec<GameEvent> = session.drain_events().collect();
        for event in &events {
            if let Err(e) = sink.play(SoundKind::for_event(event)) {
                tracing::warn!(error = %e, "audio cue failed");
            }
            match event {
                GameEvent::GameOver { score } => persist(store, *score),
                GameEvent::LevelCleared { .. } | GameEvent::NewHighScore { .. } => {
                    persist(store, session.high_score())
                }
                _ => {}
            }
        }

        let size = terminal::size()?;
        renderer.draw(stdout, session.maze(), &session.snapshot(), size)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

/// Applies one command; returns false when the player asked to quit.
fn dispatch(session: &mut Session, command: Command) -> bool {
    match command {
        Command::Turn(dir) => {
            session.start();
            session.request_turn(dir);
        }
        Command::TogglePause if session.state() == GameState::Menu => session.start(),
        Command::TogglePause => session.toggle_pause(),
        Command::Start => session.start(),
        Command::Restart => session.restart(),
        Command::NextLevel => session.next_level(),
        Command::Quit => return false,
    }
    true
}

fn persist(store: &mut HighScoreStore, score: u32) {
    if let Err(e) = store.save_if_higher(score) {
        tracing::warn!(error = %e, "could not save high score");
    }
}
