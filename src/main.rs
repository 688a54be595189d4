//! Arkanoid - headless demo runner
//!
//! Plays the game with a simple autopilot for a fixed amount of simulated
//! time, logging flow changes, effects and saves. Pass a seed as the first
//! argument; set `RUST_LOG=debug` for per-event detail.

use glam::Vec2;

use arkanoid::audio::{AudioSink, Bus, EffectKind};
use arkanoid::consts::*;
use arkanoid::flow::{SceneHandle, SceneHost, StateKind};
use arkanoid::persistence::FileStore;
use arkanoid::sim::TickInput;
use arkanoid::{Game, Settings};

/// Simulated frame rate of the demo loop
const FRAME_DT: f32 = 1.0 / 60.0;
/// How long the demo plays (simulated seconds)
const DEMO_SECONDS: f32 = 180.0;
/// Quick save interval (simulated seconds)
const SAVE_INTERVAL: f32 = 30.0;

/// Scene host that only logs
struct LogScenes;

impl SceneHost for LogScenes {
    fn load(&mut self, handle: SceneHandle, resource: &'static str) {
        log::info!("scene load #{} '{resource}'", handle.0);
    }

    fn unload(&mut self, handle: SceneHandle) {
        log::info!("scene unload #{}", handle.0);
    }

    fn show(&mut self, handle: SceneHandle) {
        log::info!("scene show #{}", handle.0);
    }
}

/// Audio sink that only logs
struct LogAudio;

impl AudioSink for LogAudio {
    fn play_music(&mut self, track: &str) {
        log::info!("music '{track}'");
    }

    fn stop_music(&mut self) {
        log::info!("music stopped");
    }

    fn play_effect(&mut self, kind: EffectKind, position: Vec2) {
        log::debug!("effect {kind:?} at {position}");
    }

    fn set_bus_volume(&mut self, bus: Bus, db: f32) {
        log::debug!("bus {} at {db:.1} dB", bus.name());
    }
}

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let data_dir = std::env::temp_dir().join("arkanoid");

    let settings = Settings::load_from(&data_dir.join("settings.json"));
    let mut game = Game::new(seed, LogScenes, LogAudio, FileStore::new(&data_dir));
    game.apply_settings(&settings);

    if let Err(e) = game.start().and_then(|_| game.new_game()) {
        log::error!("Could not start a game: {e}");
        return;
    }

    let mut elapsed = 0.0;
    let mut next_save = SAVE_INTERVAL;
    let mut runs = 1;

    while elapsed < DEMO_SECONDS {
        match game.active_state() {
            Some(StateKind::GameOver) => {
                log::info!("Game over with score {}", game.state().player.score());
                runs += 1;
                if let Err(e) = game.new_game() {
                    log::error!("Restart failed: {e}");
                    break;
                }
            }
            Some(StateKind::Win) => {
                if let Err(e) = game.next_level() {
                    log::error!("Next level failed: {e}");
                    break;
                }
            }
            _ => {}
        }

        let input = autopilot(&game, elapsed >= next_save);
        if input.quick_save {
            next_save += SAVE_INTERVAL;
        }

        game.update(FRAME_DT, &input);
        elapsed += FRAME_DT;
    }

    let state = game.state();
    log::info!(
        "Demo finished: {runs} run(s), level {}, score {}, lives {}",
        state.player.level_index,
        state.player.score(),
        state.player.lives()
    );

    if let Err(e) = settings.save_to(&data_dir.join("settings.json")) {
        log::warn!("Could not save settings: {e}");
    }
}

/// Chase the ball (or the nearest pickup while the ball climbs)
fn autopilot<S, A>(game: &Game<S, A, FileStore>, quick_save: bool) -> TickInput
where
    S: SceneHost,
    A: AudioSink,
{
    let state = game.state();
    let ball = state.ball.position();
    let falling = state.ball.velocity().y > 0.0;

    let target_x = if falling {
        ball.x
    } else {
        state.pickups.first().map_or(ball.x, |p| p.position.x)
    };

    let dx = target_x - state.paddle.position().x;
    let move_axis = (dx / (PADDLE_HALF_WIDTH / 2.0)).clamp(-1.0, 1.0);

    TickInput {
        move_axis,
        launch: !state.ball.is_launched(),
        quick_save,
        ..Default::default()
    }
}
