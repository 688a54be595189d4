//! Collision detection and response for axis-aligned geometry
//!
//! Everything the ball, paddle and pickups need: point and circle tests
//! against rectangles, and the reflection used for bounces. All functions
//! here are pure.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Build from two opposite corners (in any order)
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Half-size along each axis
    #[inline]
    pub fn extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Grow by `amount` on every side (Minkowski sum with a box)
    pub fn grow(&self, amount: Vec2) -> Self {
        Self {
            min: self.min - amount,
            max: self.max + amount,
        }
    }

    /// Strict containment (points on the boundary are outside)
    pub fn contains(&self, point: Vec2) -> bool {
        point.x > self.min.x && point.x < self.max.x && point.y > self.min.y && point.y < self.max.y
    }
}

/// Collision shape of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Box { half_extents: Vec2 },
}

/// Result of a successful intersection test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Contact point on the rectangle surface
    pub point: Vec2,
    /// Outward surface normal (unit length)
    pub normal: Vec2,
    /// Translation that separates the shapes (normal * depth)
    pub penetration: Vec2,
}

impl Hit {
    /// Penetration depth
    #[inline]
    pub fn depth(&self) -> f32 {
        self.penetration.length()
    }
}

/// Sign where zero counts as positive, so a centered point still gets a normal
#[inline]
fn sign_or_positive(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}

/// Separation along the axis of least penetration.
///
/// Returns the hit without rejecting non-overlapping points; callers decide
/// what counts as a collision. X wins ties.
fn least_penetration(rect: &Rect, point: Vec2) -> (Hit, f32) {
    let center = rect.center();
    let extents = rect.extents();
    let delta = point - center;

    let penetration_x = extents.x - delta.x.abs();
    let penetration_y = extents.y - delta.y.abs();

    if penetration_x <= penetration_y {
        let sign = sign_or_positive(delta.x);
        let edge = if sign > 0.0 { rect.max.x } else { rect.min.x };
        let normal = Vec2::new(sign, 0.0);
        let hit = Hit {
            point: Vec2::new(edge, point.y),
            normal,
            penetration: normal * penetration_x,
        };
        (hit, penetration_x)
    } else {
        let sign = sign_or_positive(delta.y);
        let edge = if sign > 0.0 { rect.max.y } else { rect.min.y };
        let normal = Vec2::new(0.0, sign);
        let hit = Hit {
            point: Vec2::new(point.x, edge),
            normal,
            penetration: normal * penetration_y,
        };
        (hit, penetration_y)
    }
}

/// Check whether a point lies inside a rectangle
///
/// The separation axis is the one with the smaller penetration; the contact
/// point is the point projected onto that edge. Zero penetration on either
/// axis (a point on the boundary) is not a hit.
pub fn intersect_point_rect(rect: &Rect, point: Vec2) -> Option<Hit> {
    let extents = rect.extents();
    let delta = point - rect.center();
    if extents.x - delta.x.abs() <= 0.0 || extents.y - delta.y.abs() <= 0.0 {
        return None;
    }

    Some(least_penetration(rect, point).0)
}

/// Check collision between a circle and a rectangle
///
/// The normal points from the closest point on the rectangle toward the
/// circle center. Exactly tangent circles do not collide.
///
/// When the center is inside the rectangle the closest point coincides with
/// it and the distance is zero; the normal then falls back to the
/// least-penetration axis and the depth covers the whole circle.
pub fn intersect_circle_rect(rect: &Rect, center: Vec2, radius: f32) -> Option<Hit> {
    let closest = center.clamp(rect.min, rect.max);
    let delta = center - closest;
    let distance_sq = delta.length_squared();

    if distance_sq >= radius * radius {
        return None;
    }

    if distance_sq > 0.0 {
        let distance = distance_sq.sqrt();
        let normal = delta / distance;
        return Some(Hit {
            point: closest,
            normal,
            penetration: normal * (radius - distance),
        });
    }

    let (edge_hit, axis_depth) = least_penetration(rect, center);
    Some(Hit {
        point: edge_hit.point,
        normal: edge_hit.normal,
        penetration: edge_hit.normal * (radius + axis_depth.max(0.0)),
    })
}

/// Test any body shape centered at `center` against a rectangle
pub fn intersect_shape_rect(shape: &Shape, center: Vec2, rect: &Rect) -> Option<Hit> {
    match *shape {
        Shape::Circle { radius } => intersect_circle_rect(rect, center, radius),
        Shape::Box { half_extents } => intersect_point_rect(&rect.grow(half_extents.abs()), center),
    }
}

/// Reflect a direction off a surface
///
/// Standard reflection: d' = d - 2(d·n)n
#[inline]
pub fn reflect(direction: Vec2, normal: Vec2) -> Vec2 {
    direction - 2.0 * direction.dot(normal) * normal
}
