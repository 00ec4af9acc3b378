//! Hamster entity: identity, body, combat stats and control flags

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::collision::ContactKey;
use crate::tuning::HamsterTuning;

pub type HamsterId = u32;

/// One of the two players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    pub fn opponent(self) -> Self {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    /// Player number as shown to humans (1 or 2)
    pub fn number(self) -> u8 {
        match self {
            PlayerId::One => 1,
            PlayerId::Two => 2,
        }
    }

    /// Index into per-player arrays
    pub fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hamster {
    pub id: HamsterId,
    pub player: PlayerId,
    pub body: Body,
    pub hp: f32,
    pub max_hp: f32,
    /// Damage dealt to hamsters this one strikes
    pub damage: f32,
    pub is_launched: bool,
    pub is_dragging: bool,
    /// Written only by the turn machine
    pub can_control: bool,
    pub is_dead: bool,
    /// Scalar speed carried by a launched hamster
    pub current_speed: f32,
    pub tuning: HamsterTuning,
    /// World position where the current drag started
    #[serde(skip)]
    pub drag_origin: Option<Vec2>,
    /// Colliders and hamsters overlapped during the last physics step
    #[serde(skip)]
    pub touching: Vec<ContactKey>,
}

impl Hamster {
    pub fn new(
        id: HamsterId,
        player: PlayerId,
        pos: Vec2,
        max_hp: f32,
        damage: f32,
        tuning: HamsterTuning,
    ) -> Self {
        Self {
            id,
            player,
            body: Body::new(pos, tuning.radius, tuning.angular_drag),
            hp: max_hp,
            max_hp,
            damage,
            is_launched: false,
            is_dragging: false,
            can_control: false,
            is_dead: false,
            current_speed: 0.0,
            tuning,
            drag_origin: None,
            touching: Vec::new(),
        }
    }

    /// Whether this hamster takes part in physics and collisions
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.is_dead
    }

    /// Apply damage. Returns true only for the hit that kills.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.is_dead {
            return false;
        }
        self.hp = (self.hp - amount).clamp(0.0, self.max_hp);
        if self.hp > 0.0 {
            return false;
        }

        log::info!("{} hamster {} died", self.player, self.id);
        self.is_dead = true;
        self.can_control = false;
        self.is_launched = false;
        self.cancel_drag();
        self.body.put_to_rest();
        self.touching.clear();
        true
    }

    /// Revive at `spawn` with full health. Control stays off until the turn
    /// machine grants it.
    pub fn respawn(&mut self, spawn: Vec2) {
        self.body.reset_at(spawn);
        self.hp = self.max_hp;
        self.is_dead = false;
        self.is_launched = false;
        self.can_control = false;
        self.current_speed = 0.0;
        self.cancel_drag();
        self.touching.clear();
        log::info!(
            "{} hamster {} respawned with {}/{} HP",
            self.player,
            self.id,
            self.hp,
            self.max_hp
        );
    }
}
