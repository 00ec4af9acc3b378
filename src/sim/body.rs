//! Kinematic body for a single hamster
//!
//! Semi-implicit Euler with linear damping: drag is applied as
//! `v *= 1 / (1 + drag * dt)` before moving.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Radians per second
    pub angular_vel: f32,
    /// Radians
    pub rotation: f32,
    pub radius: f32,
    /// Linear damping, rewritten every frame by the launch controller
    pub linear_drag: f32,
    pub angular_drag: f32,
    /// Sleeping bodies are skipped by integration until woken
    pub asleep: bool,
}

impl Body {
    /// A sleeping body at rest
    pub fn new(pos: Vec2, radius: f32, angular_drag: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            angular_vel: 0.0,
            rotation: 0.0,
            radius,
            linear_drag: 0.0,
            angular_drag,
            asleep: true,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Set velocity, waking the body if it will move
    pub fn set_velocity(&mut self, vel: Vec2) {
        self.vel = vel;
        if vel != Vec2::ZERO {
            self.asleep = false;
        }
    }

    /// Add an impulse-like velocity change, waking the body
    pub fn add_velocity(&mut self, delta: Vec2) {
        self.set_velocity(self.vel + delta);
    }

    /// Zero all motion and sleep
    pub fn put_to_rest(&mut self) {
        self.vel = Vec2::ZERO;
        self.angular_vel = 0.0;
        self.asleep = true;
    }

    /// Teleport to `pos` with identity rotation and no motion
    pub fn reset_at(&mut self, pos: Vec2) {
        self.pos = pos;
        self.rotation = 0.0;
        self.linear_drag = 0.0;
        self.put_to_rest();
    }

    /// Advance one fixed step
    pub fn integrate(&mut self, dt: f32) {
        if self.asleep {
            return;
        }
        self.vel *= 1.0 / (1.0 + self.linear_drag * dt);
        self.angular_vel *= 1.0 / (1.0 + self.angular_drag * dt);
        self.pos += self.vel * dt;
        self.rotation += self.angular_vel * dt;
    }
}
