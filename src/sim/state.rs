//! Match state
//!
//! Everything the simulation mutates lives in `MatchState`, so a match can
//! be rebuilt from its tuning at any time.

use serde::{Deserialize, Serialize};

use super::collision::Collider;
use super::events::GameEvent;
use super::hamster::{Hamster, HamsterId, PlayerId};
use super::reflector::ArenaReflector;
use super::turn::TurnMachine;
use crate::error::ConfigError;
use crate::tuning::Tuning;

/// Complete match state (serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    pub tuning: Tuning,
    /// All hamsters, sorted by id
    pub hamsters: Vec<Hamster>,
    pub colliders: Vec<Collider>,
    pub reflector: ArenaReflector,
    pub turn: TurnMachine,
    /// Scaled simulation clock in seconds
    pub clock: f64,
    /// Global simulation speed; 0 freezes the match
    pub time_scale: f32,
    /// Frames advanced so far
    pub frame_count: u64,
    /// Pending notifications, oldest first
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl MatchState {
    /// Validate `tuning`, spawn both rosters and hand the first turn to player one
    pub fn new(tuning: Tuning) -> Result<Self, ConfigError> {
        tuning.validate()?;

        let rules = &tuning.rules;
        let mut hamsters = Vec::new();
        let mut rosters: [Vec<HamsterId>; 2] = [Vec::new(), Vec::new()];
        let mut next_id: HamsterId = 1;
        for player in PlayerId::ALL {
            for slot in 0..rules.hamsters_per_player {
                let id = next_id;
                next_id += 1;
                hamsters.push(Hamster::new(
                    id,
                    player,
                    rules.slot_position(player, slot),
                    rules.hamster_hp,
                    rules.hamster_damage,
                    tuning.hamster,
                ));
                rosters[player.index()].push(id);
            }
        }

        let mut turn = TurnMachine::new(rosters, rules)?;
        let mut events = Vec::new();
        turn.start(&mut hamsters, &mut events);

        let arena = &tuning.arena;
        let reflector =
            ArenaReflector::new(arena.min, arena.max, arena.restitution, arena.friction);
        let colliders = arena.colliders.clone();

        log::info!(
            "New match: {} hamster(s) per player, first to {}",
            rules.hamsters_per_player,
            rules.max_score
        );

        Ok(Self {
            tuning,
            hamsters,
            colliders,
            reflector,
            turn,
            clock: 0.0,
            time_scale: 1.0,
            frame_count: 0,
            events,
        })
    }

    pub fn hamster(&self, id: HamsterId) -> Option<&Hamster> {
        self.hamsters.iter().find(|h| h.id == id)
    }

    pub fn hamster_mut(&mut self, id: HamsterId) -> Option<&mut Hamster> {
        self.hamsters.iter_mut().find(|h| h.id == id)
    }

    /// The current player's selected hamster
    pub fn active_hamster(&self) -> Option<&Hamster> {
        self.turn.active_hamster_id().and_then(|id| self.hamster(id))
    }

    pub fn is_game_over(&self) -> bool {
        self.turn.is_game_over()
    }

    pub fn select_hamster(&mut self, id: HamsterId) -> bool {
        self.turn
            .select_hamster(id, &mut self.hamsters, &mut self.events)
    }

    /// Score and resolve a death reported by the combat resolver
    pub fn handle_death(&mut self, id: HamsterId) {
        self.turn
            .on_hamster_death(id, self.clock, &mut self.hamsters, &mut self.events);
        if self.turn.is_game_over() {
            self.time_scale = 0.0;
        }
    }

    /// Take all pending events, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
