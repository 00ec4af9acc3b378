//! Slingshot launch controller
//!
//! Turns a pointer drag into a launch velocity (drag back, release forward),
//! decays the carried speed of a launched hamster every frame and decides
//! when the shot has come to rest.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::hamster::Hamster;
use crate::consts::*;
use crate::lerp_clamped;
use crate::tuning::{HamsterTuning, TrajectoryTuning};

/// What the player sees while aiming
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AimPreview {
    pub start: Vec2,
    /// Unit launch direction (opposite to the drag)
    pub direction: Vec2,
    /// Drag distance clamped to the maximum
    pub strength: f32,
    pub points: Vec<Vec2>,
}

/// Result of releasing the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    /// No drag was in progress
    Ignored,
    /// Released inside the cancel radius
    Cancelled,
    Launched { velocity: Vec2 },
}

/// Launch velocity for a drag vector (pointer position minus drag origin)
pub fn launch_velocity(drag: Vec2, tuning: &HamsterTuning) -> Vec2 {
    let percent = (drag.length() / tuning.max_drag_distance)
        .clamp(0.0, 1.0)
        .max(tuning.min_drag_percent);
    -drag.normalize_or_zero() * tuning.initial_speed * percent
}

/// Straight preview line from `start`, bowed slightly upward in the middle
pub fn trajectory_points(
    start: Vec2,
    direction: Vec2,
    strength: f32,
    tuning: &TrajectoryTuning,
) -> Vec<Vec2> {
    let dir = direction.normalize_or_zero();
    let length = strength.clamp(0.0, tuning.max_length);
    let count = tuning.segment_count;

    (0..count)
        .map(|i| {
            let t = i as f32 / (count - 1).max(1) as f32;
            let mut p = start + dir * length * t;
            p.y += (t * std::f32::consts::PI).sin() * tuning.curvature * length * 0.3;
            p
        })
        .collect()
}

/// Auxiliary damping: strong when slow, gone at the reference speed
#[inline]
pub fn auxiliary_drag(speed: f32) -> f32 {
    lerp_clamped(0.0, MAX_AUX_DRAG, 1.0 - speed / AUX_DRAG_REFERENCE_SPEED)
}

impl Hamster {
    /// Whether pointer input should currently reach this hamster
    #[inline]
    pub fn accepts_input(&self) -> bool {
        self.can_control && !self.is_launched && !self.is_dead
    }

    /// Pointer pressed: remember where the drag started
    pub fn begin_drag(&mut self, pos: Vec2) -> bool {
        if !self.accepts_input() {
            log::debug!("Hamster {} ignored drag start (not controllable)", self.id);
            return false;
        }
        self.drag_origin = Some(pos);
        self.is_dragging = true;
        true
    }

    /// Pointer moved while held: aim preview for the current drag
    pub fn update_drag(&self, pos: Vec2) -> Option<AimPreview> {
        let origin = self.drag_origin.filter(|_| self.is_dragging)?;
        let drag = pos - origin;
        let strength = drag.length().clamp(0.0, self.tuning.max_drag_distance);
        let direction = -drag.normalize_or_zero();
        Some(AimPreview {
            start: self.body.pos,
            direction,
            strength,
            points: trajectory_points(self.body.pos, direction, strength, &self.tuning.trajectory),
        })
    }

    /// Pointer released: launch or cancel
    pub fn release_drag(&mut self, pos: Vec2) -> Release {
        let Some(origin) = self.drag_origin.filter(|_| self.is_dragging) else {
            return Release::Ignored;
        };
        self.cancel_drag();

        let drag = pos - origin;
        if drag.length() < self.tuning.cancel_radius {
            log::debug!("Hamster {} drag cancelled", self.id);
            return Release::Cancelled;
        }

        let velocity = launch_velocity(drag, &self.tuning);
        self.current_speed = velocity.length();
        self.body.set_velocity(velocity);
        self.is_launched = true;
        log::info!(
            "{} launched hamster {} at speed {:.2}",
            self.player,
            self.id,
            self.current_speed
        );
        Release::Launched { velocity }
    }

    /// Drop any drag in progress
    pub fn cancel_drag(&mut self) {
        self.is_dragging = false;
        self.drag_origin = None;
    }

    /// Per-frame speed decay for a launched hamster; drag upkeep for the rest
    pub fn apply_speed_decay(&mut self, dt: f32) {
        self.body.linear_drag = auxiliary_drag(self.body.speed());
        let decay = self.tuning.speed_decay_rate * dt * DECAY_RATE_SCALE;
        if !self.is_launched {
            // No carried speed to follow: spin loses the same amount per frame
            let spin = self.body.angular_vel;
            self.body.angular_vel = spin.signum() * (spin.abs() - decay).max(0.0);
            return;
        }

        let before = self.current_speed;
        self.current_speed = (self.current_speed - decay).max(0.0);
        if self.current_speed < MIN_CARRY_SPEED {
            self.current_speed = 0.0;
        }

        // Spin winds down with the carried speed
        if before > 0.0 {
            self.body.angular_vel *= self.current_speed / before;
        }
        self.body.vel = self.body.vel.normalize_or_zero() * self.current_speed;
    }

    /// Put the body to sleep once both linear and angular speed are negligible
    pub fn hard_stop_if_too_slow(&mut self, threshold: f32) -> bool {
        if self.body.asleep {
            return false;
        }
        if self.body.speed() < threshold && self.body.angular_vel.abs() < threshold {
            self.body.put_to_rest();
            return true;
        }
        false
    }

    /// Reports a finished shot exactly once per launch
    pub fn is_completely_stopped(&mut self, min_velocity: f32) -> bool {
        if self.is_launched
            && self.body.speed() <= min_velocity
            && self.body.angular_vel.abs() <= min_velocity
        {
            self.body.put_to_rest();
            self.current_speed = 0.0;
            self.is_launched = false;
            return true;
        }
        false
    }

    /// Cap the carried speed after a collision so the attenuation sticks
    pub fn absorb_collision_speed(&mut self) {
        if self.is_launched {
            self.current_speed = self.current_speed.min(self.body.speed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hamster::PlayerId;
    use proptest::prelude::*;

    fn controllable() -> Hamster {
        let mut h = Hamster::new(1, PlayerId::One, Vec2::ZERO, 40.0, 5.0, HamsterTuning::default());
        h.can_control = true;
        h
    }

    #[test]
    fn test_launch_scenario_partial_drag() {
        // Drag 2 units left out of a 3 unit maximum: 2/3 of full speed, to the right
        let v = launch_velocity(Vec2::new(-2.0, 0.0), &HamsterTuning::default());
        assert!((v.x - 7.0 * 2.0 / 3.0).abs() < 1e-5);
        assert!(v.y.abs() < 1e-6);
    }

    #[test]
    fn test_launch_full_and_min_power() {
        let tuning = HamsterTuning::default();
        let full = launch_velocity(Vec2::new(0.0, -10.0), &tuning);
        assert!((full - Vec2::new(0.0, 7.0)).length() < 1e-5);
        let weak = launch_velocity(Vec2::new(0.1, 0.0), &tuning);
        assert!((weak - Vec2::new(-0.7, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_release_inside_cancel_radius() {
        let mut h = controllable();
        assert!(h.begin_drag(Vec2::new(1.0, 1.0)));
        assert!(h.is_dragging);
        assert_eq!(h.release_drag(Vec2::new(1.1, 1.1)), Release::Cancelled);
        assert!(!h.is_dragging);
        assert!(h.drag_origin.is_none());
        assert!(!h.is_launched);
        assert_eq!(h.body.vel, Vec2::ZERO);
        assert_eq!(h.body.pos, Vec2::ZERO);
    }

    #[test]
    fn test_release_launches() {
        let mut h = controllable();
        h.begin_drag(Vec2::ZERO);
        let release = h.release_drag(Vec2::new(-3.0, 0.0));
        assert_eq!(
            release,
            Release::Launched {
                velocity: Vec2::new(7.0, 0.0)
            }
        );
        assert!(h.is_launched);
        assert_eq!(h.current_speed, 7.0);
        assert!(!h.body.asleep);
        // A launched hamster no longer takes input
        assert!(!h.begin_drag(Vec2::ZERO));
    }

    #[test]
    fn test_drag_rejected_without_control() {
        let mut h = controllable();
        h.can_control = false;
        assert!(!h.begin_drag(Vec2::ZERO));
        assert_eq!(h.release_drag(Vec2::new(-3.0, 0.0)), Release::Ignored);
    }

    #[test]
    fn test_aim_preview_points_opposite_drag() {
        let mut h = controllable();
        h.begin_drag(Vec2::ZERO);
        let preview = h.update_drag(Vec2::new(-5.0, 0.0)).unwrap();
        assert_eq!(preview.direction, Vec2::new(1.0, 0.0));
        assert_eq!(preview.strength, 3.0);
        assert_eq!(preview.points.len(), 30);
        let last = *preview.points.last().unwrap();
        assert!((last.x - 3.0).abs() < 1e-5);
        assert!(last.y.abs() < 1e-5);
        // Bowed in the middle
        assert!(preview.points[15].y > 0.0);
    }

    #[test]
    fn test_speed_decay_keeps_direction() {
        let mut h = controllable();
        h.begin_drag(Vec2::ZERO);
        h.release_drag(Vec2::new(-3.0, 0.0));
        // A collision turned the body around
        h.body.vel = Vec2::new(0.0, -7.0);
        h.apply_speed_decay(0.1);
        assert!((h.current_speed - 6.9).abs() < 1e-5);
        assert!((h.body.vel - Vec2::new(0.0, -6.9)).length() < 1e-5);
    }

    #[test]
    fn test_speed_decay_snaps_to_zero() {
        let mut h = controllable();
        h.is_launched = true;
        h.current_speed = 0.31;
        h.body.set_velocity(Vec2::new(0.31, 0.0));
        h.apply_speed_decay(0.02);
        assert_eq!(h.current_speed, 0.0);
        assert_eq!(h.body.vel, Vec2::ZERO);
    }

    #[test]
    fn test_auxiliary_drag() {
        assert_eq!(auxiliary_drag(0.0), 2.0);
        assert_eq!(auxiliary_drag(10.0), 0.0);
        assert_eq!(auxiliary_drag(25.0), 0.0);
        assert!((auxiliary_drag(5.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_hard_stop_requires_both_speeds() {
        let mut h = controllable();
        h.body.set_velocity(Vec2::new(0.01, 0.0));
        h.body.angular_vel = 1.0;
        assert!(!h.hard_stop_if_too_slow(0.05));
        h.body.angular_vel = 0.01;
        assert!(h.hard_stop_if_too_slow(0.05));
        assert!(h.body.asleep);
        assert_eq!(h.body.vel, Vec2::ZERO);
    }

    #[test]
    fn test_completely_stopped_reports_once() {
        let mut h = controllable();
        h.is_launched = true;
        h.body.set_velocity(Vec2::new(0.05, 0.0));
        assert!(h.is_completely_stopped(0.1));
        assert!(!h.is_launched);
        assert!(!h.is_completely_stopped(0.1));
    }

    #[test]
    fn test_spinning_hamster_is_not_stopped() {
        let mut h = controllable();
        h.is_launched = true;
        h.body.vel = Vec2::ZERO;
        h.body.angular_vel = 1.0;
        h.body.asleep = false;
        assert!(!h.is_completely_stopped(0.1));
        assert!(h.is_launched);

        h.body.angular_vel = 0.05;
        assert!(h.is_completely_stopped(0.1));
        assert!(!h.is_launched);
        assert_eq!(h.body.angular_vel, 0.0);
        assert!(!h.is_completely_stopped(0.1));
    }

    #[test]
    fn test_spin_winds_down_with_carried_speed() {
        let mut h = controllable();
        h.is_launched = true;
        h.current_speed = 4.0;
        h.body.set_velocity(Vec2::new(4.0, 0.0));
        h.body.angular_vel = 2.0;
        // 4.0 -> 3.0 carried speed: spin keeps the same ratio
        h.apply_speed_decay(1.0);
        assert!((h.current_speed - 3.0).abs() < 1e-5);
        assert!((h.body.angular_vel - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_spin_decays_when_not_launched() {
        let mut h = controllable();
        h.body.angular_vel = -1.0;
        h.body.asleep = false;
        h.apply_speed_decay(0.5);
        assert!((h.body.angular_vel + 0.5).abs() < 1e-5);
        h.apply_speed_decay(0.5);
        assert_eq!(h.body.angular_vel, 0.0);
        assert!(h.hard_stop_if_too_slow(0.05));
    }

    #[test]
    fn test_not_stopped_while_fast() {
        let mut h = controllable();
        h.is_launched = true;
        h.body.set_velocity(Vec2::new(2.0, 0.0));
        assert!(!h.is_completely_stopped(0.1));
        assert!(h.is_launched);
    }

    proptest! {
        #[test]
        fn prop_launch_formula(x in -10.0f32..10.0, y in -10.0f32..10.0) {
            let tuning = HamsterTuning::default();
            let drag = Vec2::new(x, y);
            prop_assume!(drag.length() >= tuning.cancel_radius);
            let v = launch_velocity(drag, &tuning);
            let expected = tuning.initial_speed
                * (drag.length() / tuning.max_drag_distance).clamp(0.0, 1.0).max(tuning.min_drag_percent);
            prop_assert!((v.length() - expected).abs() < 1e-4);
            prop_assert!((v.normalize() + drag.normalize()).length() < 1e-4);
        }

        #[test]
        fn prop_short_drags_never_launch(x in -0.2f32..0.2, y in -0.2f32..0.2) {
            let mut h = controllable();
            h.begin_drag(Vec2::ZERO);
            prop_assert_eq!(h.release_drag(Vec2::new(x, y)), Release::Cancelled);
            prop_assert!(!h.is_launched);
            prop_assert_eq!(h.body.vel, Vec2::ZERO);
        }
    }
}
