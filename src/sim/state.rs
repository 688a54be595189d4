//! Game state and core simulation types
//!
//! All state the simulation mutates lives here. Side effects that leave the
//! simulation (sounds, flow transitions, UI updates) are queued as
//! [`GameEvent`]s and drained once per tick by the owner.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::body::{Body, Collider, Contact, MotionWorld};
use super::collision::{Rect, Shape};
use super::level::Level;
use super::pickup::{Pickup, PickupStatus};
use super::powerup::{PowerUpEvent, PowerUpHost, PowerUpKind, PowerUpRegistry};
use crate::audio::EffectKind;
use crate::consts::*;

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    BallLaunched,
    /// One-shot visual/audio effect
    Effect { kind: EffectKind, position: Vec2 },
    BlockDestroyed { guid: Uuid, score: u32 },
    ScoreChanged(u64),
    LivesChanged(u32),
    PickupSpawned(PowerUpKind),
    PickupCollected(PowerUpKind),
    PickupExpired(PowerUpKind),
    PowerUpActivated(PowerUpKind),
    PowerUpDeactivated(PowerUpKind),
    /// Every block in the level is gone
    LevelCleared,
    /// The last life was lost
    OutOfLives,
}

/// The ball
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub body: Body,
    /// Ghost mode (passes through blocks without reflecting)
    pub ghost: bool,
}

impl Default for Ball {
    fn default() -> Self {
        Self::new()
    }
}

impl Ball {
    pub fn new() -> Self {
        Self {
            body: Body::new(Vec2::ZERO, Shape::Circle { radius: BALL_RADIUS }),
            ghost: false,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.body.velocity()
    }

    /// A ball with zero direction is resting on the paddle
    #[inline]
    pub fn is_launched(&self) -> bool {
        self.body.is_moving()
    }

    /// Launch the ball. `direction` must be normalized.
    pub fn launch(&mut self, speed: f32, direction: Vec2) {
        self.body.launch(speed, direction);
    }

    pub fn reset(&mut self) {
        self.body.reset();
    }

    /// Follow the paddle's launch point while at rest
    pub fn attach_to(&mut self, paddle: &Paddle) {
        if !self.is_launched() {
            self.body.position = paddle.launch_point();
        }
    }

    /// Move one tick and resolve the bounce
    pub fn advance(&mut self, dt: f32, world: &impl MotionWorld) -> Option<Contact> {
        let contact = self.body.step(dt, world)?;

        let passes_through = self.ghost && matches!(contact.collider, Collider::Block(_));
        if !passes_through {
            self.body.bounce(&contact.hit);
        }

        Some(contact)
    }
}

/// The player's paddle
#[derive(Debug, Clone, PartialEq)]
pub struct Paddle {
    pub body: Body,
    /// Horizontal speed (pixels/second)
    pub speed: f32,
    base_half_extents: Vec2,
    /// Width multiplier (1.0 = base width)
    width: f32,
    min_x: f32,
    max_x: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self::new()
    }
}

impl Paddle {
    pub fn new() -> Self {
        let base_half_extents = Vec2::new(PADDLE_HALF_WIDTH, PADDLE_HALF_HEIGHT);
        Self {
            body: Body::new(
                Vec2::new(ARENA_WIDTH / 2.0, PADDLE_Y),
                Shape::Box {
                    half_extents: base_half_extents,
                },
            ),
            speed: PADDLE_SPEED,
            base_half_extents,
            width: 1.0,
            min_x: WALL_THICKNESS,
            max_x: ARENA_WIDTH - WALL_THICKNESS,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    /// Width multiplier
    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.base_half_extents.x * self.width, self.base_half_extents.y)
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = width;
        self.body.shape = Shape::Box {
            half_extents: self.half_extents(),
        };
        self.clamp_to_bounds();
    }

    pub fn expand(&mut self, multiplier: f32) {
        self.set_width(self.width * multiplier);
    }

    pub fn shrink(&mut self, multiplier: f32) {
        self.set_width(self.width / multiplier);
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.body.position, self.half_extents())
    }

    /// Where a resting ball sits
    pub fn launch_point(&self) -> Vec2 {
        self.body.position - Vec2::new(0.0, self.half_extents().y + BALL_RADIUS + BALL_REST_GAP)
    }

    /// Move horizontally by an input axis in [-1, 1]
    pub fn move_by_axis(&mut self, axis: f32, dt: f32) {
        let axis = axis.clamp(-1.0, 1.0);
        if axis == 0.0 {
            return;
        }
        self.body.position.x += axis * self.speed * dt;
        self.clamp_to_bounds();
    }

    /// Apply saved speed and position, keeping the paddle inside the walls
    pub fn restore(&mut self, speed: f32, position: Vec2) {
        self.speed = speed;
        self.body.position = position;
        self.clamp_to_bounds();
    }

    fn clamp_to_bounds(&mut self) {
        let half = self.half_extents().x;
        let lo = self.min_x + half;
        let hi = self.max_x - half;
        self.body.position.x = if lo > hi {
            (self.min_x + self.max_x) / 2.0
        } else {
            self.body.position.x.clamp(lo, hi)
        };
    }
}

/// Persistent player progress and tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlayerData {
    lives: u32,
    score: u64,
    pub ball_speed: f32,
    pub launch_direction: Vec2,
    pub paddle_width: f32,
    pub paddle_speed: f32,
    pub level_index: u32,
}

impl Default for PlayerData {
    fn default() -> Self {
        Self {
            lives: INITIAL_LIVES,
            score: INITIAL_SCORE,
            ball_speed: BALL_SPEED,
            launch_direction: LAUNCH_DIRECTION,
            paddle_width: 1.0,
            paddle_speed: PADDLE_SPEED,
            level_index: FIRST_LEVEL,
        }
    }
}

impl PlayerData {
    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    /// Set lives, clamped to `[0, MAX_LIVES]`
    pub fn set_lives(&mut self, lives: i64) {
        self.lives = lives.clamp(0, i64::from(MAX_LIVES)) as u32;
    }

    pub fn increase_lives(&mut self) {
        self.set_lives(i64::from(self.lives) + 1);
    }

    pub fn decrease_lives(&mut self) {
        self.set_lives(i64::from(self.lives) - 1);
    }

    /// Add points. Negative amounts are rejected.
    pub fn add_score(&mut self, points: i64) -> bool {
        if points < 0 {
            log::error!("Added score can't be negative ({points})");
            return false;
        }
        self.score = self.score.saturating_add(points as u64);
        true
    }

    /// Remove points, never going below zero. Negative amounts are rejected.
    pub fn subtract_score(&mut self, points: i64) -> bool {
        if points < 0 {
            log::error!("Subtracted score can't be negative ({points})");
            return false;
        }
        self.score = self.score.saturating_sub(points as u64);
        true
    }

    /// Back to a fresh run (tuning values are kept)
    pub fn reset(&mut self) {
        self.lives = INITIAL_LIVES;
        self.score = INITIAL_SCORE;
        self.level_index = FIRST_LEVEL;
    }

    /// Apply values loaded from a save, re-establishing the clamps
    pub(crate) fn restore_from(&mut self, loaded: PlayerData) {
        let lives = i64::from(loaded.lives);
        *self = loaded;
        self.set_lives(lives);
        self.level_index = self.level_index.max(FIRST_LEVEL);
    }
}

/// Power-up side effects land on the paddle, ball and player
struct PowerUpTarget<'a> {
    paddle: &'a mut Paddle,
    ball: &'a mut Ball,
    player: &'a mut PlayerData,
    events: &'a mut Vec<GameEvent>,
}

impl PowerUpHost for PowerUpTarget<'_> {
    fn expand_paddle(&mut self, multiplier: f32) {
        self.paddle.expand(multiplier);
    }

    fn shrink_paddle(&mut self, multiplier: f32) {
        self.paddle.shrink(multiplier);
    }

    fn set_ghost_ball(&mut self, ghost: bool) {
        self.ball.ghost = ghost;
    }

    fn add_life(&mut self) {
        self.player.increase_lives();
        self.events.push(GameEvent::LivesChanged(self.player.lives()));
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducible power-up drops
    pub seed: u64,
    pub player: PlayerData,
    pub level: Level,
    pub paddle: Paddle,
    pub ball: Ball,
    pub powerups: PowerUpRegistry,
    pub pickups: Vec<Pickup>,
    /// Simulation tick counter
    pub time_ticks: u64,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        let player = PlayerData::default();
        let mut state = Self {
            seed,
            level: Level::build(player.level_index),
            player,
            paddle: Paddle::new(),
            ball: Ball::new(),
            powerups: PowerUpRegistry::new(),
            pickups: Vec::new(),
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        };
        state.start_level();
        state
    }

    /// Start over from the first level with fresh lives and score
    pub fn reset_run(&mut self) {
        self.player.reset();
        self.start_level();
        self.events.push(GameEvent::LivesChanged(self.player.lives()));
        self.events.push(GameEvent::ScoreChanged(self.player.score()));
    }

    /// Continue with the next level, keeping lives and score.
    /// The last level repeats once `MAX_LEVEL` is reached.
    pub fn advance_level(&mut self) {
        self.player.level_index = self.player.level_index.saturating_add(1).min(MAX_LEVEL);
        self.start_level();
    }

    /// Rebuild the current level with the ball resting on the paddle
    pub fn start_level(&mut self) {
        let (registry, mut target) = self.split_powerups();
        registry.clear(&mut target);
        self.forward_powerup_events();

        self.level = Level::build(self.player.level_index);
        self.paddle = Paddle::new();
        self.paddle.speed = self.player.paddle_speed;
        self.paddle.set_width(self.player.paddle_width);
        self.ball = Ball::new();
        self.ball.attach_to(&self.paddle);
        self.pickups.clear();

        log::info!(
            "Level {} started ({} blocks)",
            self.player.level_index,
            self.level.remaining_blocks()
        );
    }

    fn split_powerups(&mut self) -> (&mut PowerUpRegistry, PowerUpTarget<'_>) {
        let GameState {
            powerups,
            paddle,
            ball,
            player,
            events,
            ..
        } = self;
        (
            powerups,
            PowerUpTarget {
                paddle,
                ball,
                player,
                events,
            },
        )
    }

    fn forward_powerup_events(&mut self) {
        for event in self.powerups.drain_events() {
            self.events.push(match event {
                PowerUpEvent::Activated(kind) => GameEvent::PowerUpActivated(kind),
                PowerUpEvent::Deactivated(kind) => GameEvent::PowerUpDeactivated(kind),
            });
        }
    }

    pub fn activate_powerup(&mut self, kind: PowerUpKind) {
        let (registry, mut target) = self.split_powerups();
        registry.activate(kind, &mut target);
        self.forward_powerup_events();
    }

    pub fn deactivate_powerup(&mut self, kind: PowerUpKind) -> bool {
        let (registry, mut target) = self.split_powerups();
        let was_active = registry.deactivate(kind, &mut target);
        self.forward_powerup_events();
        was_active
    }

    pub fn tick_powerups(&mut self, dt: f32) {
        let (registry, mut target) = self.split_powerups();
        registry.tick(dt, &mut target);
        self.forward_powerup_events();
    }

    /// Launch a resting ball using the player's speed and launch direction
    pub fn launch_ball(&mut self) -> bool {
        if self.ball.is_launched() {
            return false;
        }

        let direction = self.player.launch_direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            log::error!("Launch direction is zero, ball not launched");
            return false;
        }

        self.ball.launch(self.player.ball_speed, direction);
        self.events.push(GameEvent::BallLaunched);
        true
    }

    /// Respond to whatever the ball hit
    pub fn resolve_contact(&mut self, contact: Contact) {
        let position = self.ball.position();
        match contact.collider {
            Collider::Block(guid) => {
                self.emit_effect(EffectKind::Hit, position);
                self.destroy_block(guid);
            }
            Collider::HazardWall => {
                self.emit_effect(EffectKind::Death, position);
                self.lose_life();
            }
            Collider::PlainWall => self.emit_effect(EffectKind::Bounce, position),
        }
    }

    fn emit_effect(&mut self, kind: EffectKind, position: Vec2) {
        self.events.push(GameEvent::Effect { kind, position });
    }

    /// Disable a block, award its score and maybe drop a pickup
    pub fn destroy_block(&mut self, guid: Uuid) -> bool {
        let index = self.level.index;
        let Some(block) = self.level.block_mut(guid) else {
            log::warn!("Block {guid} does not exist in level {index}");
            return false;
        };
        if !block.is_enabled() {
            return false;
        }

        block.set_enabled(false);
        let score = block.score;
        let guaranteed = block.guaranteed_powerup;
        let center = block.rect.center();

        self.events.push(GameEvent::BlockDestroyed { guid, score });
        self.add_score(score);

        if let Some(kind) = guaranteed.or_else(|| self.roll_drop()) {
            self.pickups.push(Pickup::new(kind, center));
            self.events.push(GameEvent::PickupSpawned(kind));
        }

        if self.level.is_cleared() {
            log::info!("Level {} cleared", self.level.index);
            self.events.push(GameEvent::LevelCleared);
        }
        true
    }

    fn roll_drop(&mut self) -> Option<PowerUpKind> {
        if self.rng.random_bool(POWERUP_DROP_CHANCE) {
            let pick = self.rng.random_range(0..PowerUpKind::ALL.len());
            Some(PowerUpKind::ALL[pick])
        } else {
            None
        }
    }

    pub fn add_score(&mut self, points: u32) {
        if self.player.add_score(i64::from(points)) {
            self.events.push(GameEvent::ScoreChanged(self.player.score()));
        }
    }

    /// Lose a life; the ball returns to the paddle if any lives remain
    pub fn lose_life(&mut self) {
        self.player.decrease_lives();
        self.events.push(GameEvent::LivesChanged(self.player.lives()));

        self.ball.reset();
        if self.player.is_alive() {
            self.ball.attach_to(&self.paddle);
        } else {
            log::info!("Out of lives (score {})", self.player.score());
            self.events.push(GameEvent::OutOfLives);
        }
    }

    /// Move pickups; collected ones activate their power-up
    pub fn update_pickups(&mut self, dt: f32) {
        let paddle = self.paddle.rect();
        let mut collected = Vec::new();
        let events = &mut self.events;

        self.pickups.retain_mut(|pickup| match pickup.update(dt, &paddle) {
            PickupStatus::Falling => true,
            PickupStatus::Collected => {
                events.push(GameEvent::PickupCollected(pickup.kind));
                collected.push(pickup.kind);
                false
            }
            PickupStatus::Expired => {
                events.push(GameEvent::PickupExpired(pickup.kind));
                false
            }
        });

        for kind in collected {
            self.activate_powerup(kind);
        }
    }

    /// Queue an event from outside the tick (e.g. after a load)
    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
