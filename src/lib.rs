//! Arkanoid - a brick breaker game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (collision, bodies, power-ups, level)
//! - `flow`: Stack-based game flow state machine (menus, pause, game over)
//! - `game`: The context object that wires simulation, flow, audio and saves
//! - `persistence`: Save documents and save stores
//! - `audio`: Audio collaborator contract and mixer buses
//! - `settings`: Player preferences

pub mod audio;
pub mod flow;
pub mod game;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use game::{Game, GameError};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the accumulator accepts (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Arena dimensions (the playfield is the whole window)
    pub const ARENA_WIDTH: f32 = 640.0;
    pub const ARENA_HEIGHT: f32 = 360.0;
    pub const WALL_THICKNESS: f32 = 16.0;

    /// Paddle defaults
    pub const PADDLE_HALF_WIDTH: f32 = 32.0;
    pub const PADDLE_HALF_HEIGHT: f32 = 6.0;
    pub const PADDLE_Y: f32 = 330.0;
    pub const PADDLE_SPEED: f32 = 320.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 6.0;
    pub const BALL_SPEED: f32 = 100.0;
    /// Launch direction before normalization (up and to the right)
    pub const LAUNCH_DIRECTION: Vec2 = Vec2::new(1.0, -1.0);
    /// Gap between the paddle top and a resting ball
    pub const BALL_REST_GAP: f32 = 1.0;

    /// Player data
    pub const INITIAL_LIVES: u32 = 3;
    pub const MAX_LIVES: u32 = 100;
    pub const INITIAL_SCORE: u64 = 0;
    pub const FIRST_LEVEL: u32 = 1;
    pub const MAX_LEVEL: u32 = 999;

    /// Block grid
    pub const BLOCK_WIDTH: f32 = 48.0;
    pub const BLOCK_HEIGHT: f32 = 16.0;
    pub const BLOCK_GAP: f32 = 4.0;
    pub const BLOCK_TOP: f32 = 48.0;
    pub const BLOCK_SCORE: u32 = 10;
    pub const MAX_BLOCK_ROWS: u32 = 8;

    /// Power-ups
    pub const EXTEND_PADDLE_DURATION: f32 = 10.0;
    pub const EXTEND_PADDLE_MULTIPLIER: f32 = 2.0;
    pub const GHOST_BALL_DURATION: f32 = 8.0;
    /// Chance that a block without a guaranteed power-up drops one
    pub const POWERUP_DROP_CHANCE: f64 = 0.1;

    /// Falling pickups
    pub const PICKUP_FALL_SPEED: f32 = 100.0;
    pub const PICKUP_DESPAWN_TIME: f32 = 5.0;
    pub const PICKUP_HALF_SIZE: f32 = 8.0;

    /// Save slot written by the quick-save input
    pub const QUICK_SAVE_SLOT: &str = "quicksave";
    /// Save document format version
    pub const SAVE_VERSION: u64 = 1;
}
