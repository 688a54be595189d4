//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (layout order for blocks)
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod level;
pub mod pickup;
pub mod powerup;
pub mod state;
pub mod tick;

pub use body::{Body, BodyState, Collider, Contact, MotionWorld};
pub use collision::{
    Hit, Rect, Shape, intersect_circle_rect, intersect_point_rect, intersect_shape_rect, reflect,
};
pub use level::{Block, Level, Surfaces, Wall};
pub use pickup::{Pickup, PickupStatus};
pub use powerup::{PowerUpEffect, PowerUpEvent, PowerUpHost, PowerUpKind, PowerUpRegistry};
pub use state::{Ball, GameEvent, GameState, Paddle, PlayerData};
pub use tick::{TickInput, tick};
