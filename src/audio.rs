//! Sound effect routing
//!
//! The simulation only names the effect; playback belongs to whatever sink
//! the host injects. `AudioManager` applies the player's volume and mute
//! preferences before forwarding.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// A hamster's HP reached zero
    HamsterDeath,
    /// A dead hamster came back at its spawn point
    HamsterRespawn,
    /// Hit a border-tagged collider or the arena wall
    CollideBorder,
    /// Two hamsters bumped
    CollideHamster,
    /// Match won
    Victory,
}

/// Playback backend supplied by the host
pub trait AudioSink {
    /// Fire-and-forget one-shot playback at `volume` (0.0 - 1.0)
    fn play_sfx(&mut self, effect: SoundEffect, volume: f32);
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Box<dyn AudioSink>,
    master_volume: f32,
    sfx_volume: f32,
    sfx_enabled: bool,
    muted: bool,
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>, settings: &Settings) -> Self {
        let mut manager = Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            sfx_enabled: true,
            muted: false,
        };
        manager.apply_settings(settings);
        manager
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.sfx_enabled = settings.sfx_enabled;
        self.muted = settings.muted;
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_sfx_enabled(&mut self, enabled: bool) {
        self.sfx_enabled = enabled;
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted || !self.sfx_enabled {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.sink.play_sfx(effect, vol);
    }
}
