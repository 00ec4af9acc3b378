//! Outbound notifications
//!
//! The simulation never calls presentation or audio code directly. It
//! appends events in the order state changed, and the host drains them once
//! per frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::hamster::{HamsterId, PlayerId};
use super::launch::AimPreview;
use crate::audio::SoundEffect;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A turn switch started; show the banner for the incoming player
    TurnIndicator { player: PlayerId },
    /// `current_player` changed (emitted before control is re-enabled)
    TurnChanged { player: PlayerId },
    ScoreChanged { player1: u32, player2: u32 },
    /// Hearts left for `player` (opponent kills still needed to lose)
    PlayerHearts { player: PlayerId, remaining: u32 },
    AimPreview { hamster: HamsterId, preview: AimPreview },
    AimCleared { hamster: HamsterId },
    Launched { hamster: HamsterId, velocity: Vec2 },
    Damaged {
        attacker: HamsterId,
        victim: HamsterId,
        amount: f32,
        hp: f32,
    },
    HamsterDied { hamster: HamsterId },
    HamsterRespawned { hamster: HamsterId, pos: Vec2 },
    Sfx(SoundEffect),
    GameOver { winner: PlayerId },
    /// Global simulation speed (0 freezes the match)
    TimeScaleChanged(f32),
}
