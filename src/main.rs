/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use config::GameConfig;
use sim::event::GameEvent;
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::{Command, InputState};
use ui::renderer::Renderer;
use ui::sound::{self, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();
    init_logging(&config);
    for w in &config.warnings {
        log::warn!("config: {w}");
    }

    let seed = config.seed.unwrap_or_else(rand::random);
    log::info!("new game, seed {seed}");
    let mut world = WorldState::new(config.sim.clone(), seed);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game loop failed: {e}");
        eprintln!("Game error: {e}");
    }

    let p = &world.snapshot.player;
    println!();
    println!("Thanks for playing Kosooni's Sweet Potato Kingdom!");
    println!("Depth {}  Level {}  Minerals {}  (seed {})", p.y, p.level, p.minerals_mined, world.seed);
}

/// The terminal is in raw mode while playing, so logs go to a file or nowhere.
/// `RUST_LOG` overrides the default `warn` filter.
fn init_logging(config: &GameConfig) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    builder.format_timestamp_millis();
    match config.log_file.as_ref().map(File::create) {
        Some(Ok(file)) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Some(Err(e)) => {
            eprintln!("could not open log file: {e}; logging disabled");
            builder.filter_level(log::LevelFilter::Off);
        }
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    let _ = builder.try_init();
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        log::info!("gamepad detected");
    }

    let tick_rate = Duration::from_millis(config.timing.tick_rate_ms);
    let hop_delay = Duration::from_millis(config.timing.hop_ms);
    let blink_rate = Duration::from_millis(config.timing.blink_ms);

    let mut last_tick = Instant::now();
    let mut last_blink = Instant::now();
    let mut hop_started: Option<Instant> = None;

    loop {
        kb.drain_events()?;
        gp.update();

        let commands: Vec<Command> = kb.commands().iter().copied().chain(gp.commands()).collect();
        for cmd in commands {
            if handle_command(world, sound, cmd, config) {
                return Ok(());
            }
        }

        // ── Tick: hop first, commit after hop_delay ──
        if hop_started.is_none() && last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
            if world.begin_hop() {
                hop_started = Some(Instant::now());
            }
        }
        if let Some(started) = hop_started {
            if !world.hop_pending {
                // Cancelled by pause / restart.
                hop_started = None;
            } else if started.elapsed() >= hop_delay {
                hop_started = None;
                let events = world.advance();
                play_sounds(sound, &events);
            }
        }

        // ── Blink ──
        if last_blink.elapsed() >= blink_rate {
            world.toggle_blink();
            last_blink = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }
}

/// Apply one command. Returns true when the player asked to quit.
fn handle_command(
    world: &mut WorldState,
    sound: Option<&SoundEngine>,
    cmd: Command,
    config: &GameConfig,
) -> bool {
    match cmd {
        Command::Quit => return true,
        Command::Move(dir) => {
            let events = world.move_player(dir);
            play_sounds(sound, &events);
        }
        Command::Pause => world.toggle_pause(),
        Command::Restart => restart(world, config),
        Command::Confirm => {
            if world.phase == Phase::GameOver {
                restart(world, config);
            }
        }
    }
    false
}

/// A fixed seed from config replays the same map; otherwise draw a new one.
fn restart(world: &mut WorldState, config: &GameConfig) {
    let seed = config.seed.unwrap_or_else(rand::random);
    world.restart(seed);
}

fn play_sounds(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let Some(sfx) = sound else { return };
    for event in events {
        if let Some(effect) = sound::sfx_for(event) {
            sfx.play(effect);
        }
    }
}
