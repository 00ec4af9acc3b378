//! Hamster Brawl - a turn-based 2D slingshot battle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, launches, collisions, turn machine)
//! - `tuning`: Data-driven game balance loaded from JSON
//! - `settings`: Player preferences (audio gating, aim preview)
//! - `audio`: Sound effect routing to an injected sink
//! - `host`: Frame driver wiring the simulation to presentation/audio/scene collaborators

pub mod audio;
pub mod error;
pub mod host;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use host::{Match, Presentation, SceneHost};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed physics timestep (50 Hz)
    pub const SIM_DT: f32 = 1.0 / 50.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the driver will account for
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Speed decay is expressed per tenth of a second
    pub const DECAY_RATE_SCALE: f32 = 10.0;
    /// Carried speed below this is snapped to zero
    pub const MIN_CARRY_SPEED: f32 = 0.3;
    /// Auxiliary drag reaches this value at rest
    pub const MAX_AUX_DRAG: f32 = 2.0;
    /// Speed at which the auxiliary drag vanishes
    pub const AUX_DRAG_REFERENCE_SPEED: f32 = 10.0;

    /// Post-collision speed below this is zeroed (anti-jitter)
    pub const COLLISION_REST_EPSILON: f32 = 0.05;
    /// Knockback strength relative to the attacker's post-collision speed
    pub const KNOCKBACK_FACTOR: f32 = 0.4;
    /// Velocity bias along the normal after a border hit
    pub const BORDER_SEPARATION_BIAS: f32 = 0.25;
    /// Positional nudge along the normal after a border hit
    pub const BORDER_NUDGE: f32 = 0.02;
}

/// Linear interpolation with `t` clamped to [0, 1]
#[inline]
pub fn lerp_clamped(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}
