//! Moving bodies
//!
//! A body integrates its velocity once per tick and asks a [`MotionWorld`]
//! for at most one contact. Bounce response (position correction plus
//! reflection) is applied by [`Body::bounce`]; what the contact *means* is
//! decided by the caller via [`Collider`].

use glam::Vec2;
use uuid::Uuid;

use super::collision::{Hit, Shape, reflect};

/// Tolerance used to check the "direction is unit or zero" contract
const UNIT_TOLERANCE: f32 = 1e-3;

/// What a body ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collider {
    /// A breakable block, identified by its GUID
    Block(Uuid),
    /// A wall that costs a life (the bottom of the arena)
    HazardWall,
    /// Any other solid surface, including the paddle
    PlainWall,
}

/// A single contact reported by the move-with-collision primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub hit: Hit,
    pub collider: Collider,
}

/// Move-with-collision primitive
///
/// Implementations test `shape` at `from + motion` against their surfaces
/// and return the first contact found in scan order. Only one contact per
/// call is reported; a body squeezed between two surfaces resolves the
/// first one this tick and the other one on the next.
pub trait MotionWorld {
    fn move_and_collide(&self, shape: &Shape, from: Vec2, motion: Vec2) -> Option<Contact>;
}

/// Motion state of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    /// Direction is zero
    AtRest,
    /// Direction is a unit vector
    Moving,
}

/// A moving entity: position, direction, speed and shape
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub shape: Shape,
    direction: Vec2,
    speed: f32,
}

impl Body {
    pub fn new(position: Vec2, shape: Shape) -> Self {
        Self {
            position,
            shape,
            direction: Vec2::ZERO,
            speed: 0.0,
        }
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.direction * self.speed
    }

    pub fn state(&self) -> BodyState {
        if self.direction == Vec2::ZERO {
            BodyState::AtRest
        } else {
            BodyState::Moving
        }
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.state() == BodyState::Moving
    }

    /// Start moving.
    ///
    /// `direction` must already be normalized; it is stored as given.
    pub fn launch(&mut self, speed: f32, direction: Vec2) {
        if direction != Vec2::ZERO && (direction.length() - 1.0).abs() > UNIT_TOLERANCE {
            log::warn!("Launch direction {direction} is not normalized");
        }
        self.speed = speed;
        self.direction = direction;
    }

    /// Restore motion from saved data, normalizing the direction
    pub fn restore(&mut self, speed: f32, direction: Vec2) {
        self.speed = speed;
        self.direction = direction.normalize_or_zero();
    }

    /// Back to rest with zero velocity
    pub fn reset(&mut self) {
        self.speed = 0.0;
        self.direction = Vec2::ZERO;
    }

    /// Integrate one tick of motion and report the contact (if any)
    ///
    /// The body ends up at the unobstructed destination; call
    /// [`Body::bounce`] to resolve the overlap.
    pub fn step(&mut self, dt: f32, world: &impl MotionWorld) -> Option<Contact> {
        if !self.is_moving() {
            return None;
        }

        let motion = self.velocity() * dt;
        let contact = world.move_and_collide(&self.shape, self.position, motion);
        self.position += motion;
        contact
    }

    /// Push out of the surface and reflect off it
    ///
    /// A body already moving away from the surface keeps its direction, so a
    /// lingering overlap cannot flip it back and forth.
    pub fn bounce(&mut self, hit: &Hit) {
        self.position += hit.penetration;

        if self.direction.dot(hit.normal) < 0.0 {
            let reflected = reflect(self.direction, hit.normal);
            self.direction = reflected.try_normalize().unwrap_or(self.direction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::{Rect, intersect_shape_rect};

    /// A single solid rectangle
    struct OneWall(Rect, Collider);

    impl MotionWorld for OneWall {
        fn move_and_collide(&self, shape: &Shape, from: Vec2, motion: Vec2) -> Option<Contact> {
            intersect_shape_rect(shape, from + motion, &self.0).map(|hit| Contact {
                hit,
                collider: self.1,
            })
        }
    }

    fn ball_at(position: Vec2) -> Body {
        Body::new(position, Shape::Circle { radius: 4.0 })
    }

    #[test]
    fn test_launch_sets_velocity() {
        let mut body = ball_at(Vec2::ZERO);
        assert_eq!(body.state(), BodyState::AtRest);

        body.launch(100.0, Vec2::new(0.707, -0.707));
        assert!(body.is_moving());
        let velocity = body.velocity();
        assert!((velocity.x - 70.7).abs() < 0.01);
        assert!((velocity.y + 70.7).abs() < 0.01);
    }

    #[test]
    fn test_reset_stops_body() {
        let mut body = ball_at(Vec2::ZERO);
        body.launch(50.0, Vec2::X);
        body.reset();
        assert_eq!(body.state(), BodyState::AtRest);
        assert_eq!(body.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_body_at_rest_does_not_move() {
        let wall = OneWall(Rect::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0)), Collider::PlainWall);
        let mut body = ball_at(Vec2::new(50.0, 50.0));
        assert!(body.step(1.0, &wall).is_none());
        assert_eq!(body.position, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_step_and_bounce_off_wall() {
        let wall = OneWall(
            Rect::new(Vec2::new(10.0, -50.0), Vec2::new(20.0, 50.0)),
            Collider::PlainWall,
        );
        let mut body = ball_at(Vec2::new(0.0, 0.0));
        body.launch(100.0, Vec2::X);

        // 0.08 s at 100 px/s puts the circle edge 2 px into the wall
        let contact = body.step(0.08, &wall).expect("should hit the wall");
        assert_eq!(contact.collider, Collider::PlainWall);
        body.bounce(&contact.hit);

        assert!(body.position.x <= 6.0 + 1e-4, "pushed back out of the wall");
        assert!((body.direction() - Vec2::NEG_X).length() < 1e-6);
        assert!((body.direction().length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_bounce_when_moving_away_only_corrects_position() {
        let mut body = ball_at(Vec2::ZERO);
        body.launch(10.0, Vec2::X);
        let hit = Hit {
            point: Vec2::ZERO,
            normal: Vec2::X,
            penetration: Vec2::new(1.0, 0.0),
        };
        body.bounce(&hit);
        assert_eq!(body.direction(), Vec2::X);
        assert_eq!(body.position, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_restore_normalizes_direction() {
        let mut body = ball_at(Vec2::ZERO);
        body.restore(80.0, Vec2::new(3.0, 4.0));
        assert!((body.direction().length() - 1.0).abs() < 1e-6);
        assert_eq!(body.speed(), 80.0);

        body.restore(80.0, Vec2::ZERO);
        assert_eq!(body.state(), BodyState::AtRest);
    }
}
