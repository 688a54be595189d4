//! Falling power-up pickups
//!
//! A destroyed block may drop a pickup. It falls straight down, despawns
//! after a timeout, and activates its power-up when it touches the paddle.

use glam::Vec2;

use super::collision::{Rect, Shape, intersect_shape_rect};
use super::powerup::PowerUpKind;
use crate::consts::{PICKUP_DESPAWN_TIME, PICKUP_FALL_SPEED, PICKUP_HALF_SIZE};

/// Outcome of a pickup update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupStatus {
    Falling,
    Collected,
    Expired,
}

/// A pickup entity
#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    pub kind: PowerUpKind,
    pub position: Vec2,
    pub fall_speed: f32,
    /// Seconds until the pickup disappears uncollected
    pub despawn_in: f32,
}

impl Pickup {
    pub fn new(kind: PowerUpKind, position: Vec2) -> Self {
        Self {
            kind,
            position,
            fall_speed: PICKUP_FALL_SPEED,
            despawn_in: PICKUP_DESPAWN_TIME,
        }
    }

    pub fn shape() -> Shape {
        Shape::Box {
            half_extents: Vec2::splat(PICKUP_HALF_SIZE),
        }
    }

    pub fn update(&mut self, dt: f32, paddle: &Rect) -> PickupStatus {
        self.position.y += self.fall_speed * dt;
        self.despawn_in -= dt;

        if intersect_shape_rect(&Self::shape(), self.position, paddle).is_some() {
            PickupStatus::Collected
        } else if self.despawn_in <= 0.0 {
            PickupStatus::Expired
        } else {
            PickupStatus::Falling
        }
    }
}
