//! Arena boundary response
//!
//! Each physics step a body's circle is tested against the four arena
//! bounds in a fixed order: left, right, floor, ceiling. Only the first
//! violated bound is resolved, so a body pushed into a corner settles over
//! two steps.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Body;

/// Which arena bound was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Floor,
    Ceiling,
}

impl Side {
    /// Normal pointing back into the arena
    pub fn normal(self) -> Vec2 {
        match self {
            Side::Left => Vec2::X,
            Side::Right => Vec2::NEG_X,
            Side::Floor => Vec2::Y,
            Side::Ceiling => Vec2::NEG_Y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryHit {
    pub side: Side,
    /// Velocity before the bounce
    pub incoming: Vec2,
}

impl BoundaryHit {
    /// Whether the body was moving into the wall (as opposed to resting on it)
    pub fn approaching(&self) -> bool {
        self.incoming.dot(self.side.normal()) < 0.0
    }
}

/// Axis-aligned arena with a restitution/friction wall model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaReflector {
    pub min: Vec2,
    pub max: Vec2,
    /// Fraction of normal speed kept (e)
    pub restitution: f32,
    /// Fraction of tangential speed removed (μ)
    pub friction: f32,
}

impl ArenaReflector {
    pub fn new(min: Vec2, max: Vec2, restitution: f32, friction: f32) -> Self {
        Self {
            min,
            max,
            restitution,
            friction,
        }
    }

    /// First violated bound in priority order, with the clamped position
    pub fn check(&self, pos: Vec2, radius: f32) -> Option<(Side, Vec2)> {
        let mut clamped = pos;
        let side = if pos.x - radius <= self.min.x {
            clamped.x = self.min.x + radius;
            Side::Left
        } else if pos.x + radius >= self.max.x {
            clamped.x = self.max.x - radius;
            Side::Right
        } else if pos.y - radius <= self.min.y {
            clamped.y = self.min.y + radius;
            Side::Floor
        } else if pos.y + radius >= self.max.y {
            clamped.y = self.max.y - radius;
            Side::Ceiling
        } else {
            return None;
        };
        Some((side, clamped))
    }

    /// Reflect `v` off a wall with normal `n`: v' = v - (1+e)(v·n)n, minus μ of the tangent
    pub fn reflect(&self, v: Vec2, n: Vec2) -> Vec2 {
        let vn = v.dot(n);
        let tangent = v - vn * n;
        v - (1.0 + self.restitution) * vn * n - tangent * self.friction
    }

    /// Clamp and bounce `body` if it crossed a bound
    pub fn resolve(&self, body: &mut Body) -> Option<BoundaryHit> {
        let (side, clamped) = self.check(body.pos, body.radius)?;
        let n = side.normal();
        let incoming = body.vel;

        body.pos = clamped;
        body.vel = self.reflect(incoming, n);

        // Tangential friction loss turns into spin
        let tangent = incoming - incoming.dot(n) * n;
        body.angular_vel += n.perp_dot(tangent) * self.friction / body.radius;

        Some(BoundaryHit { side, incoming })
    }
}

/// Symmetric bounce: normal scaled by -e, tangent by (1 - μ)
pub fn compute_bounce(velocity: Vec2, normal: Vec2, restitution: f32, friction: f32) -> Vec2 {
    let n = normal.normalize_or_zero();
    let v_normal = velocity.dot(n) * n;
    let v_tangent = velocity - v_normal;
    -restitution * v_normal + v_tangent * (1.0 - friction)
}
