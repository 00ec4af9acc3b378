//! Host-side frame driver
//!
//! `Match` owns the simulation and the collaborators the embedding
//! application injects (HUD, audio playback, scene control). Each frame it
//! advances the simulation and forwards the queued events in order.

use crate::audio::{AudioManager, AudioSink};
use crate::error::ConfigError;
use crate::settings::Settings;
use crate::sim::{AimPreview, FrameInput, GameEvent, HamsterId, MatchState, PlayerId, Stepper};
use crate::tuning::Tuning;

/// HUD and overlay callbacks
pub trait Presentation {
    fn on_turn_changed(&mut self, player: PlayerId);
    fn on_score_changed(&mut self, player1: u32, player2: u32);
    /// Banner shown during the end-of-turn pause, e.g. "Player 2's Turn"
    fn show_turn_indicator(&mut self, text: &str);
    fn update_player_hearts(&mut self, player: PlayerId, remaining: u32);
    fn show_win_screen(&mut self, winner: PlayerId);

    fn show_aim(&mut self, _hamster: HamsterId, _preview: &AimPreview) {}
    fn hide_aim(&mut self, _hamster: HamsterId) {}
}

/// Scene-level control owned by the embedding application
pub trait SceneHost {
    fn reload_scene(&mut self);
    /// 0 freezes the game, 1 is normal speed
    fn set_time_scale(&mut self, scale: f32);
}

pub struct Match {
    state: MatchState,
    stepper: Stepper,
    settings: Settings,
    presentation: Box<dyn Presentation>,
    audio: AudioManager,
    scene: Box<dyn SceneHost>,
}

impl Match {
    pub fn new(
        tuning: Tuning,
        settings: Settings,
        presentation: Box<dyn Presentation>,
        audio_sink: Box<dyn AudioSink>,
        scene: Box<dyn SceneHost>,
    ) -> Result<Self, ConfigError> {
        let state = MatchState::new(tuning)?;
        let audio = AudioManager::new(audio_sink, &settings);
        let mut game = Self {
            state,
            stepper: Stepper::new(),
            settings,
            presentation,
            audio,
            scene,
        };
        game.dispatch_events();
        Ok(game)
    }

    /// Advance one rendered frame of `dt` real seconds
    pub fn frame(&mut self, input: &FrameInput, dt: f32) {
        self.stepper.advance(&mut self.state, input, dt);
        self.dispatch_events();
    }

    /// Reload the scene and start a fresh match with the same tuning
    pub fn restart(&mut self) -> Result<(), ConfigError> {
        log::info!("Restarting match");
        self.scene.reload_scene();
        self.state = MatchState::new(self.state.tuning.clone())?;
        self.stepper = Stepper::new();
        self.scene.set_time_scale(self.state.time_scale);
        self.dispatch_events();
        Ok(())
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn apply_settings(&mut self, settings: Settings) {
        self.audio.apply_settings(&settings);
        self.settings = settings;
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::TurnIndicator { player } => {
                    self.presentation
                        .show_turn_indicator(&format!("{}'s Turn", player));
                }
                GameEvent::TurnChanged { player } => self.presentation.on_turn_changed(player),
                GameEvent::ScoreChanged { player1, player2 } => {
                    self.presentation.on_score_changed(player1, player2);
                }
                GameEvent::PlayerHearts { player, remaining } => {
                    self.presentation.update_player_hearts(player, remaining);
                }
                GameEvent::AimPreview { hamster, preview } => {
                    if self.settings.show_aim_preview {
                        self.presentation.show_aim(hamster, &preview);
                    }
                }
                GameEvent::AimCleared { hamster } => self.presentation.hide_aim(hamster),
                GameEvent::Sfx(effect) => self.audio.play(effect),
                GameEvent::GameOver { winner } => self.presentation.show_win_screen(winner),
                GameEvent::TimeScaleChanged(scale) => self.scene.set_time_scale(scale),
                GameEvent::Launched { hamster, velocity } => {
                    log::debug!("Hamster {} launched with velocity {}", hamster, velocity);
                }
                GameEvent::Damaged {
                    attacker,
                    victim,
                    amount,
                    hp,
                } => {
                    log::debug!(
                        "Hamster {} dealt {} to hamster {} ({} HP left)",
                        attacker,
                        amount,
                        victim,
                        hp
                    );
                }
                GameEvent::HamsterDied { hamster } => {
                    log::debug!("Hamster {} is down", hamster);
                }
                GameEvent::HamsterRespawned { hamster, pos } => {
                    log::debug!("Hamster {} back at {}", hamster, pos);
                }
            }
        }
    }
}
