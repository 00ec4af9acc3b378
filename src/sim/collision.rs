//! Contact detection and combat response
//!
//! Static colliders are tagged as borders or obstacles; hamster-vs-hamster
//! contacts additionally carry damage and knockback. Every response keeps
//! the incoming speed, scales it by the surface reduction and sends the
//! body along the mirror direction of its approach.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::hamster::{Hamster, HamsterId, PlayerId};
use crate::consts::*;

/// Surface tag of a static collider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Surface {
    Border,
    Obstacle,
}

/// Collider geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Circle { center: Vec2, radius: f32 },
    Aabb { min: Vec2, max: Vec2 },
}

/// A static, tagged collider inside the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub id: u32,
    pub shape: Shape,
    pub surface: Surface,
}

impl Collider {
    pub fn contact(&self, center: Vec2, radius: f32) -> Option<Contact> {
        match self.shape {
            Shape::Circle {
                center: c,
                radius: r,
            } => circle_circle(center, radius, c, r),
            Shape::Aabb { min, max } => circle_aabb(center, radius, min, max),
        }
    }
}

/// What a hamster is touching, for contact-enter tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKey {
    Collider(u32),
    Hamster(HamsterId),
}

/// Result of an overlap test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub point: Vec2,
    /// Unit normal pointing from the other shape toward the tested circle
    pub normal: Vec2,
    pub penetration: f32,
}

/// Overlap between circle `a` and circle `b`
pub fn circle_circle(a: Vec2, ra: f32, b: Vec2, rb: f32) -> Option<Contact> {
    let delta = a - b;
    let dist = delta.length();
    if dist >= ra + rb {
        return None;
    }
    // Coincident centers: pick an arbitrary but stable axis
    let normal = if dist > 1e-6 { delta / dist } else { Vec2::X };
    Some(Contact {
        point: b + normal * rb,
        normal,
        penetration: ra + rb - dist,
    })
}

/// Overlap between a circle and an axis-aligned box
pub fn circle_aabb(center: Vec2, radius: f32, min: Vec2, max: Vec2) -> Option<Contact> {
    let closest = center.clamp(min, max);
    let delta = center - closest;
    let dist = delta.length();

    if dist > 1e-6 {
        if dist >= radius {
            return None;
        }
        return Some(Contact {
            point: closest,
            normal: delta / dist,
            penetration: radius - dist,
        });
    }

    // Center inside the box: leave through the nearest face
    let faces = [
        (center.x - min.x, Vec2::NEG_X),
        (max.x - center.x, Vec2::X),
        (center.y - min.y, Vec2::NEG_Y),
        (max.y - center.y, Vec2::Y),
    ];
    let (depth, normal) = faces
        .into_iter()
        .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or((0.0, Vec2::X));
    Some(Contact {
        point: center + normal * depth,
        normal,
        penetration: radius + depth,
    })
}

/// Mirror reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Reflected direction carrying the incoming speed scaled by `reduction`
#[inline]
pub fn attenuated_reflection(velocity: Vec2, normal: Vec2, reduction: f32) -> Vec2 {
    reflect_velocity(velocity, normal).normalize_or_zero() * velocity.length() * reduction
}

/// Push a hamster out of a static collider
pub fn depenetrate(hamster: &mut Hamster, contact: &Contact) {
    hamster.body.pos += contact.normal * contact.penetration;
}

/// Push two overlapping hamsters apart, half each. `contact.normal` points toward `a`.
pub fn separate_pair(a: &mut Hamster, b: &mut Hamster, contact: &Contact) {
    let half = contact.normal * contact.penetration * 0.5;
    a.body.pos += half;
    b.body.pos -= half;
}

fn rest_if_slow(hamster: &mut Hamster) {
    if hamster.body.speed() < COLLISION_REST_EPSILON {
        hamster.body.vel = Vec2::ZERO;
        hamster.body.angular_vel = 0.0;
    }
}

/// Response to entering contact with a static collider
pub fn resolve_surface_contact(hamster: &mut Hamster, surface: Surface, contact: &Contact) {
    let n = contact.normal;
    let incoming = hamster.body.vel;

    match surface {
        Surface::Border => {
            let reflected =
                attenuated_reflection(incoming, n, hamster.tuning.border_collide_reduction);
            hamster.body.set_velocity(reflected + n * BORDER_SEPARATION_BIAS);
            hamster.body.pos += n * BORDER_NUDGE;
        }
        Surface::Obstacle => {
            let reflected =
                attenuated_reflection(incoming, n, hamster.tuning.obstacle_collide_reduction);
            hamster.body.set_velocity(reflected);
        }
    }

    rest_if_slow(hamster);
    hamster.absorb_collision_speed();
}

/// A damaging hit between two hamsters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    pub attacker: HamsterId,
    pub victim: HamsterId,
    pub amount: f32,
    /// The victim's HP reached zero on this hit
    pub killed: bool,
}

/// Response to two hamsters entering contact. `contact.normal` points toward `a`.
///
/// Each side reflects its own incoming velocity. A side deals damage only if
/// it belongs to `current_player`, and it knocks the other side away along
/// the contact normal.
pub fn resolve_hamster_contact(
    a: &mut Hamster,
    b: &mut Hamster,
    contact: &Contact,
    current_player: PlayerId,
) -> Vec<Strike> {
    let n_a = contact.normal;
    let n_b = -n_a;
    let (va, vb) = (a.body.vel, b.body.vel);

    let speed_a = va.length() * a.tuning.hamster_collide_reduction;
    let speed_b = vb.length() * b.tuning.hamster_collide_reduction;
    a.body.vel = reflect_velocity(va, n_a).normalize_or_zero() * speed_a;
    b.body.vel = reflect_velocity(vb, n_b).normalize_or_zero() * speed_b;

    let mut strikes = Vec::new();
    if a.player == current_player {
        strikes.push(strike(a, b));
    }
    if b.player == current_player {
        strikes.push(strike(b, a));
    }

    if b.is_active() {
        b.body.add_velocity(-n_a * speed_a * KNOCKBACK_FACTOR);
    }
    if a.is_active() {
        a.body.add_velocity(-n_b * speed_b * KNOCKBACK_FACTOR);
    }
    rest_if_slow(a);
    rest_if_slow(b);

    a.absorb_collision_speed();
    b.absorb_collision_speed();
    strikes
}

fn strike(attacker: &Hamster, victim: &mut Hamster) -> Strike {
    let amount = attacker.damage;
    let killed = victim.take_damage(amount);
    log::info!(
        "{} hamster {} hit {} hamster {} (-{} HP, {} left)",
        attacker.player,
        attacker.id,
        victim.player,
        victim.id,
        amount,
        victim.hp
    );
    Strike {
        attacker: attacker.id,
        victim: victim.id,
        amount,
        killed,
    }
}
