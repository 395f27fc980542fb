/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod timing;
mod ui;

use std::fs::File;
use std::io;
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use domain::input::Input;
use sim::event::GameEvent;
use sim::step;
use sim::world::GameState;
use timing::{FpsMeter, FramePacer, SystemClock, TickSource};
use ui::input::KeyboardAdapter;
use ui::renderer::{HudStats, Renderer};
use ui::terminal::TerminalSink;

/// Names a log file; without it nothing is logged (stdout is the screen).
const LOG_ENV_VAR: &str = "BURROW_LOG";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal error: {0}")]
    Terminal(#[source] io::Error),
    #[error("could not present frame: {0}")]
    Present(#[source] io::Error),
}

fn main() {
    init_tracing();

    match run() {
        Ok(high_score) => {
            println!();
            println!("Thanks for playing Burrow!");
            println!("High Score: {high_score}");
        }
        Err(e) => {
            error!(error = %e, "game_aborted");
            eprintln!("Game error: {e}");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let Some(path) = std::env::var_os(LOG_ENV_VAR) else { return };
    let file = match File::create(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("could not open log file {}: {e}", path.to_string_lossy());
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
}

/// Set up the terminal, play until the player quits, restore the terminal.
/// Returns the session high score.
fn run() -> Result<u32, AppError> {
    let config = GameConfig::load();
    let mut state = GameState::new(config.tuning.clone());
    let input = Input::new();
    let mut renderer = Renderer::new();
    let mut sink = TerminalSink::new();

    let enhanced = sink.init().map_err(AppError::Terminal)?;
    info!(enhanced_keys = enhanced, fps = config.tuning.target_fps, "terminal_ready");

    let result = game_loop(&mut state, &input, &mut renderer, &mut sink, enhanced);

    if let Err(e) = sink.cleanup() {
        error!(error = %e, "terminal_cleanup_failed");
        if result.is_ok() {
            return Err(AppError::Terminal(e));
        }
    }

    result.map(|()| state.high_score)
}

fn game_loop(
    state: &mut GameState,
    input: &Input,
    renderer: &mut Renderer,
    sink: &mut TerminalSink,
    enhanced_keys: bool,
) -> Result<(), AppError> {
    let clock = SystemClock::new();
    let mut keyboard = KeyboardAdapter::new(enhanced_keys);
    let mut pacer = FramePacer::new(state.tuning.target_fps);
    let mut fps = FpsMeter::new();

    loop {
        keyboard.drain_events(input);
        if keyboard.interrupted() {
            info!("interrupted");
            return Ok(());
        }

        let now = clock.now_ticks();
        if !pacer.frame_due(now) {
            clock.wait_for_tick();
            continue;
        }

        step::update(state, input);
        log_events(&state.events);
        if state.exit_requested {
            info!(score = state.score, high_score = state.high_score, "exit_requested");
            return Ok(());
        }

        fps.frame(now);
        renderer.compose(state, &HudStats { fps: fps.fps() });
        renderer.present(sink).map_err(AppError::Present)?;
    }
}

fn log_events(events: &[GameEvent]) {
    for event in events {
        match *event {
            GameEvent::SceneChanged { from, to } => info!(?from, ?to, "scene_changed"),
            GameEvent::RoundCleared { round } => info!(round, "round_cleared"),
            GameEvent::PlayerKilled { x, y, cause, lives_left } => {
                debug!(x, y, ?cause, lives_left, "player_killed")
            }
            GameEvent::EnemyKilled { id, x, y, points, cause } => {
                debug!(id, x, y, points, ?cause, "enemy_killed")
            }
            GameEvent::EnemiesCleared { tick } => debug!(tick, "enemies_cleared"),
            GameEvent::PlayerRespawned => debug!("player_respawned"),
            GameEvent::EnemyGhosted { id } => debug!(id, "enemy_ghosted"),
            GameEvent::EnemyRecovered { id } => debug!(id, "enemy_recovered"),
            GameEvent::FireStarted { id, dir } => debug!(id, ?dir, "fire_started"),
            GameEvent::RockFalling { id } => debug!(id, "rock_falling"),
            GameEvent::RockLanded { id, x, y } => debug!(id, x, y, "rock_landed"),
            // per-step chatter stays at trace
            other => tracing::trace!(event = ?other, "game_event"),
        }
    }
}
