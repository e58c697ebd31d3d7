/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::sync::Mutex;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, trace};

use config::{GameConfig, LogConfig};
use sim::level::load_levels;
use sim::step;
use sim::world::{Phase, WorldState};
use ui::input::{InputState, KEYS_CONFIRM, KEYS_PAUSE, KEYS_QUIT};
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();
    init_logging(&config.log);

    let levels = match load_levels(&config) {
        Ok(levels) => levels,
        Err(e) => {
            eprintln!("Level load failed: {e}");
            return;
        }
    };

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut world = match WorldState::new(levels, config.speed.clone(), config.scoring.clone(), rng) {
        Ok(world) => world,
        Err(e) => {
            eprintln!("Game setup failed: {e}");
            return;
        }
    };
    info!(levels = world.level_count(), seed = ?config.seed, "game start");

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    info!(score = world.score, level = world.level + 1, "game end");
    println!();
    println!("Final Score: {}", world.score);
}

/// File logging when `[log] file` is set. Stdout belongs to the UI.
fn init_logging(log: &LogConfig) {
    let Some(path) = &log.file else { return };

    let file = match std::fs::OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: could not open log file {}: {e}", path.display());
            return;
        }
    };
    let level = log.level.parse::<tracing::Level>().unwrap_or_else(|_| {
        eprintln!("Warning: unknown log level '{}', using info", log.level);
        tracing::Level::INFO
    });

    let result = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .try_init();
    if let Err(e) = result {
        eprintln!("Warning: logging disabled: {e}");
    }
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(world, &kb) {
            break;
        }

        // Held arrows keep asking until a junction lets the turn through
        let dir = kb.steering();
        if !dir.is_none() {
            let events = step::request_direction(world, dir);
            trace_events(world, &events);
        }

        if last_tick.elapsed() >= tick_rate {
            let events = step::step(world);
            trace_events(world, &events);
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn trace_events(world: &WorldState, events: &[sim::event::GameEvent]) {
    for event in events {
        trace!(tick = world.tick, ?event, "event");
    }
}

/// Quit, pause and restart keys. Returns true to leave the game loop.
fn handle_meta(world: &mut WorldState, kb: &InputState) -> bool {
    if kb.any_pressed(KEYS_QUIT) {
        return true;
    }

    match world.phase {
        Phase::GameOver => {
            if kb.any_pressed(KEYS_CONFIRM) {
                world.new_game();
                info!("new game");
            }
        }
        _ => {
            if kb.any_pressed(KEYS_PAUSE) {
                world.paused = !world.paused;
                info!(paused = world.paused, "pause toggled");
            }
        }
    }

    false
}
