//! Frame update and fixed timestep physics
//!
//! Physics runs at `SIM_DT` through an accumulator; input handling, speed
//! decay and turn polling run once per rendered frame.

use glam::Vec2;

use super::collision::{
    Collider, ContactKey, Surface, circle_circle, depenetrate, resolve_hamster_contact,
    resolve_surface_contact, separate_pair,
};
use super::events::GameEvent;
use super::hamster::{Hamster, HamsterId};
use super::launch::Release;
use super::state::MatchState;
use crate::audio::SoundEffect;
use crate::consts::*;

/// Pointer and selection input for one frame, in world coordinates
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Pointer pressed this frame
    pub pointer_down: Option<Vec2>,
    /// Pointer position while held
    pub pointer_held: Option<Vec2>,
    /// Pointer released this frame
    pub pointer_up: Option<Vec2>,
    /// Switch the current player's active hamster
    pub select: Option<HamsterId>,
}

/// Variable-rate update: input, speed decay, stop detection, turn polling
pub fn frame_update(state: &mut MatchState, input: &FrameInput, dt: f32) {
    if state.time_scale <= 0.0 {
        return;
    }
    let dt = dt * state.time_scale;
    state.clock += dt as f64;
    state.frame_count += 1;

    if let Some(id) = input.select {
        state.select_hamster(id);
    }
    handle_pointer(state, input);

    for h in state.hamsters.iter_mut().filter(|h| h.is_active()) {
        h.apply_speed_decay(dt);
        let threshold = h.tuning.stop_threshold;
        h.hard_stop_if_too_slow(threshold);
    }

    state
        .turn
        .poll(state.clock, &mut state.hamsters, &mut state.events);
}

/// Route the pointer gesture to the active hamster
fn handle_pointer(state: &mut MatchState, input: &FrameInput) {
    let Some(id) = state.turn.active_hamster_id() else {
        return;
    };
    let Some(h) = state.hamsters.iter_mut().find(|h| h.id == id) else {
        return;
    };
    let events = &mut state.events;

    if let Some(pos) = input.pointer_down {
        h.begin_drag(pos);
    }
    if let Some(pos) = input.pointer_held {
        if let Some(preview) = h.update_drag(pos) {
            events.push(GameEvent::AimPreview {
                hamster: id,
                preview,
            });
        }
    }
    if let Some(pos) = input.pointer_up {
        match h.release_drag(pos) {
            Release::Ignored => {}
            Release::Cancelled => events.push(GameEvent::AimCleared { hamster: id }),
            Release::Launched { velocity } => {
                events.push(GameEvent::AimCleared { hamster: id });
                events.push(GameEvent::Launched {
                    hamster: id,
                    velocity,
                });
                state.turn.on_launch(id);
            }
        }
    }
}

/// Advance physics by one fixed step
pub fn physics_step(state: &mut MatchState, dt: f32) {
    let reflector = state.reflector;

    for h in state.hamsters.iter_mut().filter(|h| h.is_active()) {
        h.body.integrate(dt);

        if let Some(hit) = reflector.resolve(&mut h.body) {
            h.absorb_collision_speed();
            if hit.approaching() {
                log::debug!("Hamster {} bounced off the {:?} wall", h.id, hit.side);
                state.events.push(GameEvent::Sfx(SoundEffect::CollideBorder));
            }
        }

        static_contacts(h, &state.colliders, &mut state.events);
    }

    let deaths = hamster_contacts(state);
    for id in deaths {
        state.handle_death(id);
        if state.is_game_over() {
            break;
        }
    }
}

/// Collide one hamster against the static colliders
fn static_contacts(h: &mut Hamster, colliders: &[Collider], events: &mut Vec<GameEvent>) {
    for collider in colliders {
        let key = ContactKey::Collider(collider.id);
        let Some(contact) = collider.contact(h.body.pos, h.body.radius) else {
            h.touching.retain(|k| *k != key);
            continue;
        };

        depenetrate(h, &contact);
        if h.touching.contains(&key) {
            continue;
        }
        h.touching.push(key);
        log::debug!(
            "Hamster {} hit {:?} collider {}",
            h.id,
            collider.surface,
            collider.id
        );
        resolve_surface_contact(h, collider.surface, &contact);
        if collider.surface == Surface::Border {
            events.push(GameEvent::Sfx(SoundEffect::CollideBorder));
        }
    }
}

/// Collide every pair of living hamsters; returns the ids killed this step
fn hamster_contacts(state: &mut MatchState) -> Vec<HamsterId> {
    let current = state.turn.current_player();
    let events = &mut state.events;
    let hamsters = &mut state.hamsters;
    let mut deaths = Vec::new();

    for j in 1..hamsters.len() {
        let (head, tail) = hamsters.split_at_mut(j);
        let b = &mut tail[0];
        for a in head.iter_mut() {
            let key_a = ContactKey::Hamster(b.id);
            let key_b = ContactKey::Hamster(a.id);

            let contact = if a.is_active() && b.is_active() {
                circle_circle(a.body.pos, a.body.radius, b.body.pos, b.body.radius)
            } else {
                None
            };
            let Some(contact) = contact else {
                a.touching.retain(|k| *k != key_a);
                b.touching.retain(|k| *k != key_b);
                continue;
            };

            separate_pair(a, b, &contact);
            if a.touching.contains(&key_a) {
                continue;
            }
            a.touching.push(key_a);
            b.touching.push(key_b);

            let strikes = resolve_hamster_contact(a, b, &contact, current);
            events.push(GameEvent::Sfx(SoundEffect::CollideHamster));
            for strike in strikes {
                let hp = if strike.victim == a.id { a.hp } else { b.hp };
                events.push(GameEvent::Damaged {
                    attacker: strike.attacker,
                    victim: strike.victim,
                    amount: strike.amount,
                    hp,
                });
                if strike.killed {
                    deaths.push(strike.victim);
                }
            }
        }
    }

    deaths
}

/// Fixed timestep accumulator
#[derive(Debug, Clone, Default)]
pub struct Stepper {
    accumulator: f32,
}

impl Stepper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the physics substeps owed for `frame_dt`, then the frame update.
    /// Returns the number of substeps run.
    pub fn advance(&mut self, state: &mut MatchState, input: &FrameInput, frame_dt: f32) -> u32 {
        if state.time_scale <= 0.0 {
            self.accumulator = 0.0;
            return 0;
        }
        let frame_dt = frame_dt.clamp(0.0, MAX_FRAME_DT);
        self.accumulator += frame_dt * state.time_scale;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            physics_step(state, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            if state.is_game_over() {
                self.accumulator = 0.0;
                return substeps;
            }
        }
        // Drop any backlog the substep cap left behind
        self.accumulator = self.accumulator.min(SIM_DT);

        frame_update(state, input, frame_dt);
        substeps
    }
}
