//! Hamster Brawl entry point
//!
//! Runs a headless match between two seeded bots and logs everything the
//! HUD, audio and scene collaborators would receive.
//!
//! Usage: `hamster-brawl [tuning.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::collections::VecDeque;

    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use hamster_brawl::audio::{AudioSink, SoundEffect};
    use hamster_brawl::sim::{AimPreview, FrameInput, HamsterId, MatchState, PlayerId, TurnPhase};
    use hamster_brawl::{ConfigError, Match, Presentation, SceneHost, Settings, Tuning};

    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Ten minutes of play
    const MAX_FRAMES: u64 = 60 * 60 * 10;
    const SETTINGS_PATH: &str = "hamster_brawl_settings.json";

    struct LogPresentation;

    impl Presentation for LogPresentation {
        fn on_turn_changed(&mut self, player: PlayerId) {
            log::info!("[hud] {} to move", player);
        }

        fn on_score_changed(&mut self, player1: u32, player2: u32) {
            log::info!("[hud] score {} - {}", player1, player2);
        }

        fn show_turn_indicator(&mut self, text: &str) {
            log::info!("[hud] {}", text);
        }

        fn update_player_hearts(&mut self, player: PlayerId, remaining: u32) {
            log::info!("[hud] {} hearts: {}", player, remaining);
        }

        fn show_win_screen(&mut self, winner: PlayerId) {
            log::info!("[hud] {} WINS!", winner);
        }

        fn show_aim(&mut self, hamster: HamsterId, preview: &AimPreview) {
            log::debug!(
                "[hud] hamster {} aiming {} at strength {:.2}",
                hamster,
                preview.direction,
                preview.strength
            );
        }
    }

    struct LogAudio;

    impl AudioSink for LogAudio {
        fn play_sfx(&mut self, effect: SoundEffect, volume: f32) {
            log::info!("[sfx] {:?} at {:.2}", effect, volume);
        }
    }

    struct LogScene;

    impl SceneHost for LogScene {
        fn reload_scene(&mut self) {
            log::info!("[scene] reload");
        }

        fn set_time_scale(&mut self, scale: f32) {
            log::info!("[scene] time scale {}", scale);
        }
    }

    /// Plays both sides: flings the active hamster at the nearest opponent
    struct Bot {
        rng: Pcg32,
        pending: VecDeque<FrameInput>,
    }

    impl Bot {
        fn new(seed: u64) -> Self {
            Self {
                rng: Pcg32::seed_from_u64(seed),
                pending: VecDeque::new(),
            }
        }

        fn next_input(&mut self, state: &MatchState) -> FrameInput {
            if let Some(input) = self.pending.pop_front() {
                return input;
            }
            if state.turn.phase() != TurnPhase::WaitingForInput {
                return FrameInput::default();
            }
            let Some(shooter) = state.active_hamster() else {
                return FrameInput::default();
            };
            if !shooter.accepts_input() {
                return FrameInput::default();
            }

            let roster = state.turn.roster(shooter.player);
            if roster.len() > 1 && self.rng.random_bool(0.3) {
                let pick = roster[self.rng.random_range(0..roster.len())];
                if pick != shooter.id {
                    return FrameInput {
                        select: Some(pick),
                        ..Default::default()
                    };
                }
            }

            let from = shooter.body.pos;
            let target = state
                .hamsters
                .iter()
                .filter(|h| h.player != shooter.player && h.is_active())
                .map(|h| h.body.pos)
                .min_by(|a, b| {
                    a.distance_squared(from)
                        .partial_cmp(&b.distance_squared(from))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .unwrap_or(Vec2::ZERO);

            let jitter = self.rng.random_range(-0.25f32..0.25);
            let aim = Vec2::from_angle(jitter).rotate((target - from).normalize_or(Vec2::X));
            let strength = self.rng.random_range(1.5f32..3.0);
            // Drag away from the target to launch toward it
            let to = from - aim * strength;

            self.pending.extend([
                FrameInput {
                    pointer_held: Some(to),
                    ..Default::default()
                },
                FrameInput {
                    pointer_up: Some(to),
                    ..Default::default()
                },
            ]);
            FrameInput {
                pointer_down: Some(from),
                ..Default::default()
            }
        }
    }

    pub fn run() -> Result<(), ConfigError> {
        let args: Vec<String> = std::env::args().collect();
        let tuning = match args.get(1) {
            Some(path) => Tuning::load(path)?,
            None => Tuning::default(),
        };
        let seed = args
            .get(2)
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0x4841_4d53);
        log::info!("Hamster Brawl starting with seed: {}", seed);

        let settings = Settings::load(SETTINGS_PATH);
        let mut game = Match::new(
            tuning,
            settings,
            Box::new(LogPresentation),
            Box::new(LogAudio),
            Box::new(LogScene),
        )?;
        let mut bot = Bot::new(seed);

        let mut frame = 0;
        while !game.is_game_over() && frame < MAX_FRAMES {
            let input = bot.next_input(game.state());
            game.frame(&input, FRAME_DT);
            frame += 1;
        }

        let state = game.state();
        match state.turn.winner() {
            Some(winner) => log::info!(
                "{} won {}-{} after {} frames",
                winner,
                state.turn.score(PlayerId::One),
                state.turn.score(PlayerId::Two),
                frame
            ),
            None => log::warn!("No winner after {} frames", frame),
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = demo::run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is embedded through the library on this target
}
