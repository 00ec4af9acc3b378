//! Turn and score state machine
//!
//! Phases advance `WaitingForInput -> Launched -> Resolving -> SwitchingTurn
//! -> WaitingForInput` until a score reaches the limit, which freezes the
//! match in `GameOver`. The machine is the only writer of `current_player`,
//! the per-player selections and every hamster's `can_control` flag.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::hamster::{Hamster, HamsterId, PlayerId};
use crate::audio::SoundEffect;
use crate::error::ConfigError;
use crate::tuning::MatchRules;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// The current player's selected hamster may be dragged
    WaitingForInput,
    /// A launch happened this frame
    Launched,
    /// Waiting for the active hamster to settle
    Resolving,
    /// End-of-turn pause; `deadline` is on the scaled match clock
    SwitchingTurn { next: PlayerId, deadline: f64 },
    GameOver { winner: PlayerId },
}

fn find(hamsters: &[Hamster], id: HamsterId) -> Option<&Hamster> {
    hamsters.iter().find(|h| h.id == id)
}

fn find_mut(hamsters: &mut [Hamster], id: HamsterId) -> Option<&mut Hamster> {
    hamsters.iter_mut().find(|h| h.id == id)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnMachine {
    rosters: [Vec<HamsterId>; 2],
    /// Roster slot of each player's active hamster
    selected: [usize; 2],
    spawns: [Vec2; 2],
    current_player: PlayerId,
    scores: [u32; 2],
    max_score: u32,
    end_turn_delay: f32,
    min_velocity_to_switch: f32,
    phase: TurnPhase,
    /// Single-flight guard for the end-of-turn pause
    switching_turn: bool,
}

impl TurnMachine {
    pub fn new(rosters: [Vec<HamsterId>; 2], rules: &MatchRules) -> Result<Self, ConfigError> {
        for player in PlayerId::ALL {
            if rosters[player.index()].is_empty() {
                return Err(ConfigError::EmptyRoster {
                    player: player.number(),
                });
            }
        }
        if rules.max_score == 0 {
            return Err(ConfigError::ZeroMaxScore);
        }

        Ok(Self {
            rosters,
            selected: [0, 0],
            spawns: [rules.player1_spawn, rules.player2_spawn],
            current_player: PlayerId::One,
            scores: [0, 0],
            max_score: rules.max_score,
            end_turn_delay: rules.end_turn_delay,
            min_velocity_to_switch: rules.min_velocity_to_switch,
            phase: TurnPhase::WaitingForInput,
            switching_turn: false,
        })
    }

    /// Hand the first turn to player one
    pub fn start(&mut self, hamsters: &mut [Hamster], events: &mut Vec<GameEvent>) {
        self.phase = TurnPhase::WaitingForInput;
        events.push(GameEvent::ScoreChanged {
            player1: 0,
            player2: 0,
        });
        for player in PlayerId::ALL {
            events.push(GameEvent::PlayerHearts {
                player,
                remaining: self.max_score,
            });
        }
        events.push(GameEvent::TurnChanged {
            player: self.current_player,
        });
        self.activate_control(hamsters);
        log::info!("Match started, {} to move", self.current_player);
    }

    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn score(&self, player: PlayerId) -> u32 {
        self.scores[player.index()]
    }

    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    pub fn roster(&self, player: PlayerId) -> &[HamsterId] {
        &self.rosters[player.index()]
    }

    pub fn selected_slot(&self, player: PlayerId) -> usize {
        self.selected[player.index()]
    }

    pub fn spawn_point(&self, player: PlayerId) -> Vec2 {
        self.spawns[player.index()]
    }

    pub fn is_switching(&self) -> bool {
        self.switching_turn
    }

    pub fn winner(&self) -> Option<PlayerId> {
        match self.phase {
            TurnPhase::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.winner().is_some()
    }

    /// The current player's selected hamster; `None` if the slot is out of range
    pub fn active_hamster_id(&self) -> Option<HamsterId> {
        let idx = self.current_player.index();
        self.rosters[idx].get(self.selected[idx]).copied()
    }

    /// A hamster was launched; only the active one advances the turn
    pub fn on_launch(&mut self, id: HamsterId) -> bool {
        if self.phase != TurnPhase::WaitingForInput || self.active_hamster_id() != Some(id) {
            return false;
        }
        self.phase = TurnPhase::Launched;
        true
    }

    /// Per-frame check: finish a pending switch or detect the end of a shot
    pub fn poll(&mut self, now: f64, hamsters: &mut [Hamster], events: &mut Vec<GameEvent>) {
        match self.phase {
            TurnPhase::GameOver { .. } | TurnPhase::WaitingForInput => {}
            TurnPhase::SwitchingTurn { next, deadline } => {
                if now >= deadline {
                    self.complete_switch(next, hamsters, events);
                }
            }
            TurnPhase::Launched | TurnPhase::Resolving => {
                self.phase = TurnPhase::Resolving;
                if self.switching_turn {
                    return;
                }
                let Some(id) = self.active_hamster_id() else {
                    return;
                };
                let stopped = find_mut(hamsters, id)
                    .map(|h| h.is_completely_stopped(self.min_velocity_to_switch))
                    .unwrap_or(false);
                if stopped {
                    self.begin_switch(now, hamsters, events);
                }
            }
        }
    }

    /// Start the end-of-turn pause. Refused while one is already pending.
    fn begin_switch(
        &mut self,
        now: f64,
        hamsters: &mut [Hamster],
        events: &mut Vec<GameEvent>,
    ) -> bool {
        if self.switching_turn {
            log::debug!("Turn switch already pending");
            return false;
        }
        self.switching_turn = true;

        for h in hamsters.iter_mut() {
            h.can_control = false;
            if h.is_dragging {
                h.cancel_drag();
                events.push(GameEvent::AimCleared { hamster: h.id });
            }
        }

        let next = self.current_player.opponent();
        self.phase = TurnPhase::SwitchingTurn {
            next,
            deadline: now + self.end_turn_delay as f64,
        };
        log::info!("{} finished, switching to {}...", self.current_player, next);
        events.push(GameEvent::TurnIndicator { player: next });
        true
    }

    fn complete_switch(
        &mut self,
        next: PlayerId,
        hamsters: &mut [Hamster],
        events: &mut Vec<GameEvent>,
    ) {
        self.current_player = next;
        self.phase = TurnPhase::WaitingForInput;
        events.push(GameEvent::TurnChanged { player: next });
        self.switching_turn = false;
        self.activate_control(hamsters);
        log::info!("Now it's {}'s turn", next);
    }

    /// Grant control to the current player's selected hamster only
    pub fn activate_control(&self, hamsters: &mut [Hamster]) {
        let live = !self.is_game_over();
        for player in PlayerId::ALL {
            let idx = player.index();
            for (slot, &id) in self.rosters[idx].iter().enumerate() {
                if let Some(h) = find_mut(hamsters, id) {
                    h.can_control = live
                        && player == self.current_player
                        && slot == self.selected[idx]
                        && !h.is_dead;
                }
            }
        }
    }

    /// Make `id` the current player's active hamster
    pub fn select_hamster(
        &mut self,
        id: HamsterId,
        hamsters: &mut [Hamster],
        events: &mut Vec<GameEvent>,
    ) -> bool {
        if self.phase != TurnPhase::WaitingForInput {
            log::debug!("Selection of hamster {} rejected: turn in progress", id);
            return false;
        }
        let idx = self.current_player.index();
        let Some(slot) = self.rosters[idx].iter().position(|&h| h == id) else {
            log::debug!(
                "Selection of hamster {} rejected: not owned by {}",
                id,
                self.current_player
            );
            return false;
        };
        if find(hamsters, id).is_none_or(|h| h.is_dead) {
            log::debug!("Selection of hamster {} rejected: dead", id);
            return false;
        }
        if slot == self.selected[idx] {
            return true;
        }

        if let Some(prev) = self
            .active_hamster_id()
            .and_then(|prev| find_mut(hamsters, prev))
        {
            if prev.is_dragging {
                prev.cancel_drag();
                events.push(GameEvent::AimCleared { hamster: prev.id });
            }
        }

        self.selected[idx] = slot;
        self.activate_control(hamsters);
        log::info!("{} selected hamster {}", self.current_player, id);
        true
    }

    /// Score a kill, then either end the match or revive the victim
    pub fn on_hamster_death(
        &mut self,
        id: HamsterId,
        now: f64,
        hamsters: &mut [Hamster],
        events: &mut Vec<GameEvent>,
    ) {
        if self.is_game_over() {
            return;
        }
        let Some(victim) = find(hamsters, id) else {
            return;
        };
        if !victim.is_dead {
            return;
        }

        let victim_player = victim.player;
        let scorer = victim_player.opponent();
        let was_active_shot = victim_player == self.current_player
            && self.active_hamster_id() == Some(id)
            && matches!(self.phase, TurnPhase::Launched | TurnPhase::Resolving);

        self.scores[scorer.index()] += 1;
        let scorer_score = self.scores[scorer.index()];
        log::info!(
            "{} hamster {} died! Score: P1={} P2={}",
            victim_player,
            id,
            self.scores[0],
            self.scores[1]
        );
        events.push(GameEvent::HamsterDied { hamster: id });
        events.push(GameEvent::Sfx(SoundEffect::HamsterDeath));
        events.push(GameEvent::ScoreChanged {
            player1: self.scores[0],
            player2: self.scores[1],
        });
        events.push(GameEvent::PlayerHearts {
            player: victim_player,
            remaining: self.max_score.saturating_sub(scorer_score),
        });

        if scorer_score >= self.max_score {
            self.end_game(scorer, hamsters, events);
            return;
        }

        let spawn = self.spawn_point(victim_player);
        if let Some(victim) = find_mut(hamsters, id) {
            victim.respawn(spawn);
        }
        events.push(GameEvent::HamsterRespawned {
            hamster: id,
            pos: spawn,
        });
        events.push(GameEvent::Sfx(SoundEffect::HamsterRespawn));

        if was_active_shot {
            // The shot can never settle now; the turn ends here
            self.begin_switch(now, hamsters, events);
        } else if self.phase == TurnPhase::WaitingForInput {
            self.activate_control(hamsters);
        }
    }

    fn end_game(&mut self, winner: PlayerId, hamsters: &mut [Hamster], events: &mut Vec<GameEvent>) {
        self.phase = TurnPhase::GameOver { winner };
        self.switching_turn = false;
        for h in hamsters.iter_mut() {
            h.can_control = false;
            if h.is_dragging {
                h.cancel_drag();
                events.push(GameEvent::AimCleared { hamster: h.id });
            }
        }
        log::info!("Game over! {} wins", winner);
        events.push(GameEvent::GameOver { winner });
        events.push(GameEvent::Sfx(SoundEffect::Victory));
        events.push(GameEvent::TimeScaleChanged(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::HamsterTuning;

    /// Two hamsters per side: ids 1, 2 for player one and 3, 4 for player two
    fn setup(max_score: u32) -> (TurnMachine, Vec<Hamster>, Vec<GameEvent>) {
        let rules = MatchRules {
            max_score,
            hamsters_per_player: 2,
            ..Default::default()
        };
        let mut hamsters = Vec::new();
        for (id, player) in [
            (1, PlayerId::One),
            (2, PlayerId::One),
            (3, PlayerId::Two),
            (4, PlayerId::Two),
        ] {
            hamsters.push(Hamster::new(
                id,
                player,
                Vec2::ZERO,
                10.0,
                5.0,
                HamsterTuning::default(),
            ));
        }
        let mut machine = TurnMachine::new([vec![1, 2], vec![3, 4]], &rules).unwrap();
        let mut events = Vec::new();
        machine.start(&mut hamsters, &mut events);
        (machine, hamsters, events)
    }

    fn launch(hamsters: &mut [Hamster], id: HamsterId, machine: &mut TurnMachine) {
        let h = find_mut(hamsters, id).unwrap();
        h.begin_drag(Vec2::ZERO);
        h.release_drag(Vec2::new(-3.0, 0.0));
        assert!(machine.on_launch(id));
    }

    fn controllable(hamsters: &[Hamster]) -> Vec<HamsterId> {
        hamsters.iter().filter(|h| h.can_control).map(|h| h.id).collect()
    }

    #[test]
    fn test_empty_roster_rejected() {
        let err = TurnMachine::new([vec![1], vec![]], &MatchRules::default()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyRoster { player: 2 }));
    }

    #[test]
    fn test_start_activates_player_one() {
        let (machine, hamsters, events) = setup(4);
        assert_eq!(machine.current_player(), PlayerId::One);
        assert_eq!(machine.phase(), TurnPhase::WaitingForInput);
        assert_eq!(controllable(&hamsters), vec![1]);
        assert!(events.contains(&GameEvent::TurnChanged {
            player: PlayerId::One
        }));
    }

    #[test]
    fn test_full_turn_cycle() {
        let (mut machine, mut hamsters, mut events) = setup(4);
        launch(&mut hamsters, 1, &mut machine);
        assert_eq!(machine.phase(), TurnPhase::Launched);

        // Still moving: no switch
        machine.poll(0.5, &mut hamsters, &mut events);
        assert_eq!(machine.phase(), TurnPhase::Resolving);

        // Settled
        find_mut(&mut hamsters, 1).unwrap().body.vel = Vec2::new(0.05, 0.0);
        events.clear();
        machine.poll(1.0, &mut hamsters, &mut events);
        assert_eq!(
            machine.phase(),
            TurnPhase::SwitchingTurn {
                next: PlayerId::Two,
                deadline: 2.0
            }
        );
        assert!(machine.is_switching());
        assert!(controllable(&hamsters).is_empty());
        assert_eq!(
            events,
            vec![GameEvent::TurnIndicator {
                player: PlayerId::Two
            }]
        );

        // Delay not elapsed
        machine.poll(1.5, &mut hamsters, &mut events);
        assert_eq!(machine.current_player(), PlayerId::One);

        events.clear();
        machine.poll(2.0, &mut hamsters, &mut events);
        assert_eq!(machine.current_player(), PlayerId::Two);
        assert_eq!(machine.phase(), TurnPhase::WaitingForInput);
        assert!(!machine.is_switching());
        assert_eq!(controllable(&hamsters), vec![3]);
        assert_eq!(
            events,
            vec![GameEvent::TurnChanged {
                player: PlayerId::Two
            }]
        );
    }

    #[test]
    fn test_spinning_shot_keeps_resolving() {
        let (mut machine, mut hamsters, mut events) = setup(4);
        launch(&mut hamsters, 1, &mut machine);
        {
            let h = find_mut(&mut hamsters, 1).unwrap();
            h.body.vel = Vec2::ZERO;
            h.body.angular_vel = 1.0;
        }
        events.clear();
        machine.poll(1.0, &mut hamsters, &mut events);
        assert_eq!(machine.phase(), TurnPhase::Resolving);
        assert!(!machine.is_switching());
        assert!(events.is_empty());
        assert!(find(&hamsters, 1).unwrap().is_launched);

        find_mut(&mut hamsters, 1).unwrap().body.angular_vel = 0.05;
        machine.poll(1.1, &mut hamsters, &mut events);
        assert!(matches!(
            machine.phase(),
            TurnPhase::SwitchingTurn {
                next: PlayerId::Two,
                ..
            }
        ));
    }

    #[test]
    fn test_single_settle_switches_once() {
        let (mut machine, mut hamsters, mut events) = setup(4);
        launch(&mut hamsters, 1, &mut machine);
        find_mut(&mut hamsters, 1).unwrap().body.vel = Vec2::ZERO;
        events.clear();
        for i in 0..10 {
            machine.poll(0.1 * i as f64, &mut hamsters, &mut events);
        }
        let indicators = events
            .iter()
            .filter(|e| matches!(e, GameEvent::TurnIndicator { .. }))
            .count();
        assert_eq!(indicators, 1);
        assert_eq!(machine.current_player(), PlayerId::One);
    }

    #[test]
    fn test_select_hamster_rules() {
        let (mut machine, mut hamsters, mut events) = setup(4);
        // Opponent's hamster
        assert!(!machine.select_hamster(3, &mut hamsters, &mut events));
        // Unknown hamster
        assert!(!machine.select_hamster(99, &mut hamsters, &mut events));
        // Dead hamster
        find_mut(&mut hamsters, 2).unwrap().is_dead = true;
        assert!(!machine.select_hamster(2, &mut hamsters, &mut events));
        assert_eq!(machine.selected_slot(PlayerId::One), 0);

        find_mut(&mut hamsters, 2).unwrap().is_dead = false;
        assert!(machine.select_hamster(2, &mut hamsters, &mut events));
        assert_eq!(machine.selected_slot(PlayerId::One), 1);
        assert_eq!(machine.active_hamster_id(), Some(2));
        assert_eq!(controllable(&hamsters), vec![2]);
    }

    #[test]
    fn test_select_rejected_mid_shot() {
        let (mut machine, mut hamsters, mut events) = setup(4);
        launch(&mut hamsters, 1, &mut machine);
        assert!(!machine.select_hamster(2, &mut hamsters, &mut events));
        assert_eq!(machine.active_hamster_id(), Some(1));
    }

    #[test]
    fn test_death_scores_and_respawns() {
        let (mut machine, mut hamsters, mut events) = setup(4);
        let victim = find_mut(&mut hamsters, 3).unwrap();
        victim.body.pos = Vec2::new(1.0, 1.0);
        assert!(victim.take_damage(10.0));
        events.clear();

        machine.on_hamster_death(3, 0.0, &mut hamsters, &mut events);
        assert_eq!(machine.score(PlayerId::One), 1);
        assert_eq!(machine.score(PlayerId::Two), 0);
        let victim = find(&hamsters, 3).unwrap();
        assert!(!victim.is_dead);
        assert_eq!(victim.hp, victim.max_hp);
        assert_eq!(victim.body.pos, machine.spawn_point(PlayerId::Two));
        assert!(!victim.can_control);
        assert!(events.contains(&GameEvent::ScoreChanged {
            player1: 1,
            player2: 0
        }));
        assert!(events.contains(&GameEvent::PlayerHearts {
            player: PlayerId::Two,
            remaining: 3
        }));

        // A second notification for the same (now living) hamster is ignored
        machine.on_hamster_death(3, 0.0, &mut hamsters, &mut events);
        assert_eq!(machine.score(PlayerId::One), 1);
    }

    #[test]
    fn test_active_shooter_death_ends_turn() {
        let (mut machine, mut hamsters, mut events) = setup(4);
        launch(&mut hamsters, 1, &mut machine);
        machine.poll(0.1, &mut hamsters, &mut events);
        find_mut(&mut hamsters, 1).unwrap().take_damage(100.0);
        machine.on_hamster_death(1, 0.2, &mut hamsters, &mut events);
        assert_eq!(machine.score(PlayerId::Two), 1);
        assert!(matches!(
            machine.phase(),
            TurnPhase::SwitchingTurn {
                next: PlayerId::Two,
                ..
            }
        ));
    }

    #[test]
    fn test_reaching_max_score_ends_game() {
        let (mut machine, mut hamsters, mut events) = setup(1);
        find_mut(&mut hamsters, 4).unwrap().take_damage(100.0);
        events.clear();
        machine.on_hamster_death(4, 0.0, &mut hamsters, &mut events);

        assert_eq!(machine.winner(), Some(PlayerId::One));
        assert!(controllable(&hamsters).is_empty());
        assert!(events.contains(&GameEvent::GameOver {
            winner: PlayerId::One
        }));
        assert!(events.contains(&GameEvent::TimeScaleChanged(0.0)));
        // Dead at game over: no respawn
        assert!(find(&hamsters, 4).unwrap().is_dead);

        // Frozen: nothing else changes
        assert!(!machine.select_hamster(2, &mut hamsters, &mut events));
        machine.poll(100.0, &mut hamsters, &mut events);
        machine.activate_control(&mut hamsters);
        assert!(controllable(&hamsters).is_empty());
        assert_eq!(machine.winner(), Some(PlayerId::One));
        find_mut(&mut hamsters, 3).unwrap().take_damage(100.0);
        machine.on_hamster_death(3, 0.0, &mut hamsters, &mut events);
        assert_eq!(machine.score(PlayerId::One), 1);
    }

    #[test]
    fn test_out_of_range_selection_degrades_to_none() {
        let (mut machine, _, _) = setup(4);
        machine.selected[0] = 7;
        assert_eq!(machine.active_hamster_id(), None);
    }
}
