//! Data-driven game balance
//!
//! Defaults are the shipped balance values. A tuning file is a
//! JSON document with any subset of these fields; missing fields keep their
//! defaults.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::collision::{Collider, Shape, Surface};
use crate::sim::hamster::PlayerId;

/// Aim preview polyline shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryTuning {
    /// Number of points in the preview line
    pub segment_count: usize,
    /// Longest preview line, in world units
    pub max_length: f32,
    /// How much the line bows sideways
    pub curvature: f32,
}

impl Default for TrajectoryTuning {
    fn default() -> Self {
        Self {
            segment_count: 30,
            max_length: 3.0,
            curvature: 0.2,
        }
    }
}

/// Per-hamster movement and collision coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HamsterTuning {
    /// Launch speed at a full-length drag
    pub initial_speed: f32,
    /// Weakest launch, as a fraction of `initial_speed`
    pub min_drag_percent: f32,
    /// Drag length that yields a full-power launch
    pub max_drag_distance: f32,
    /// Releases closer than this to the drag origin are cancelled
    pub cancel_radius: f32,

    /// Speed kept after hitting another hamster
    pub hamster_collide_reduction: f32,
    /// Speed kept after hitting a border-tagged collider
    pub border_collide_reduction: f32,
    /// Speed kept after hitting an obstacle
    pub obstacle_collide_reduction: f32,

    /// Linear loss of carried speed (units per tenth of a second)
    pub speed_decay_rate: f32,
    /// Linear and angular speed under which the body is put to rest
    pub stop_threshold: f32,

    /// Collision circle radius
    pub radius: f32,
    /// Angular velocity damping
    pub angular_drag: f32,

    pub trajectory: TrajectoryTuning,
}

impl Default for HamsterTuning {
    fn default() -> Self {
        Self {
            initial_speed: 7.0,
            min_drag_percent: 0.1,
            max_drag_distance: 3.0,
            cancel_radius: 0.3,
            hamster_collide_reduction: 0.5,
            border_collide_reduction: 0.8,
            obstacle_collide_reduction: 0.95,
            speed_decay_rate: 0.1,
            stop_threshold: 0.05,
            radius: 0.5,
            angular_drag: 0.05,
            trajectory: TrajectoryTuning::default(),
        }
    }
}

/// Arena bounds, wall response and static colliders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    /// Bottom-left corner
    pub min: Vec2,
    /// Top-right corner
    pub max: Vec2,
    /// Fraction of normal speed kept on a wall bounce
    pub restitution: f32,
    /// Fraction of tangential speed lost on a wall bounce
    pub friction: f32,
    /// Static colliders inside the arena
    pub colliders: Vec<Collider>,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            min: Vec2::new(-8.0, -4.5),
            max: Vec2::new(8.0, 4.5),
            restitution: 0.8,
            friction: 0.1,
            colliders: vec![
                Collider {
                    id: 1,
                    shape: Shape::Circle {
                        center: Vec2::ZERO,
                        radius: 0.75,
                    },
                    surface: Surface::Obstacle,
                },
                Collider {
                    id: 2,
                    shape: Shape::Aabb {
                        min: Vec2::new(-0.2, 2.5),
                        max: Vec2::new(0.2, 4.5),
                    },
                    surface: Surface::Border,
                },
                Collider {
                    id: 3,
                    shape: Shape::Aabb {
                        min: Vec2::new(-0.2, -4.5),
                        max: Vec2::new(0.2, -2.5),
                    },
                    surface: Surface::Border,
                },
            ],
        }
    }
}

/// Match rules and roster layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    /// Kills needed to win
    pub max_score: u32,
    /// Pause between a shot settling and the next turn (scaled seconds)
    pub end_turn_delay: f32,
    /// Speed at or under which the active shot counts as finished
    pub min_velocity_to_switch: f32,
    /// Roster size per player
    pub hamsters_per_player: usize,
    pub player1_spawn: Vec2,
    pub player2_spawn: Vec2,
    /// Vertical spacing between roster slots around the spawn point
    pub roster_spacing: f32,
    pub hamster_hp: f32,
    pub hamster_damage: f32,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            max_score: 4,
            end_turn_delay: 1.0,
            min_velocity_to_switch: 0.1,
            hamsters_per_player: 1,
            player1_spawn: Vec2::new(-5.0, 0.0),
            player2_spawn: Vec2::new(5.0, 0.0),
            roster_spacing: 1.5,
            hamster_hp: 40.0,
            hamster_damage: 5.0,
        }
    }
}

impl MatchRules {
    pub fn spawn_point(&self, player: PlayerId) -> Vec2 {
        match player {
            PlayerId::One => self.player1_spawn,
            PlayerId::Two => self.player2_spawn,
        }
    }

    /// Starting position of roster slot `slot`, centered on the spawn point
    pub fn slot_position(&self, player: PlayerId, slot: usize) -> Vec2 {
        let centered = slot as f32 - (self.hamsters_per_player.max(1) - 1) as f32 / 2.0;
        self.spawn_point(player) + Vec2::new(0.0, centered * self.roster_spacing)
    }
}

/// Complete tuning set for a match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub hamster: HamsterTuning,
    pub arena: ArenaTuning,
    pub rules: MatchRules,
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn in_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let h = &self.hamster;
        positive("initial_speed", h.initial_speed)?;
        positive("max_drag_distance", h.max_drag_distance)?;
        positive("radius", h.radius)?;
        positive("stop_threshold", h.stop_threshold)?;
        in_range("min_drag_percent", h.min_drag_percent, 0.0, 1.0)?;
        in_range("cancel_radius", h.cancel_radius, 0.0, f32::MAX)?;
        in_range("speed_decay_rate", h.speed_decay_rate, 0.0, f32::MAX)?;
        in_range("angular_drag", h.angular_drag, 0.0, f32::MAX)?;
        in_range("hamster_collide_reduction", h.hamster_collide_reduction, 0.0, 1.0)?;
        in_range("border_collide_reduction", h.border_collide_reduction, 0.0, 1.0)?;
        in_range("obstacle_collide_reduction", h.obstacle_collide_reduction, 0.0, 1.0)?;

        let a = &self.arena;
        in_range("restitution", a.restitution, 0.0, 1.0)?;
        in_range("friction", a.friction, 0.0, 1.0)?;
        let span = a.max - a.min;
        if span.x <= 2.0 * h.radius || span.y <= 2.0 * h.radius {
            return Err(ConfigError::ArenaTooSmall {
                min_x: a.min.x,
                min_y: a.min.y,
                max_x: a.max.x,
                max_y: a.max.y,
                radius: h.radius,
            });
        }

        let mut seen = Vec::with_capacity(a.colliders.len());
        for collider in &a.colliders {
            if seen.contains(&collider.id) {
                return Err(ConfigError::DuplicateCollider { id: collider.id });
            }
            seen.push(collider.id);
            match collider.shape {
                Shape::Circle { radius, .. } => positive("collider radius", radius)?,
                Shape::Aabb { min, max } => {
                    positive("collider width", max.x - min.x)?;
                    positive("collider height", max.y - min.y)?;
                }
            }
        }

        let r = &self.rules;
        if r.max_score == 0 {
            return Err(ConfigError::ZeroMaxScore);
        }
        if r.hamsters_per_player == 0 {
            return Err(ConfigError::EmptyRoster { player: 1 });
        }
        positive("hamster_hp", r.hamster_hp)?;
        in_range("hamster_damage", r.hamster_damage, 0.0, f32::MAX)?;
        in_range("end_turn_delay", r.end_turn_delay, 0.0, f32::MAX)?;
        positive("min_velocity_to_switch", r.min_velocity_to_switch)?;
        Ok(())
    }
}
