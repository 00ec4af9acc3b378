//! Startup error types
//!
//! Configuration problems are reported once, when a match is built. Gameplay
//! rule violations are never errors; they are logged and ignored.

use thiserror::Error;

/// Invalid or unreadable configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A player has no hamsters to play with
    #[error("player {player} roster is empty")]
    EmptyRoster {
        /// Player number (1 or 2)
        player: u8,
    },

    /// A quantity that must be strictly positive was not
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    /// A coefficient fell outside its allowed range
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("max_score must be at least 1")]
    ZeroMaxScore,

    /// Arena bounds are inverted or cannot hold a hamster
    #[error("arena [{min_x}, {min_y}]..[{max_x}, {max_y}] cannot fit a hamster of radius {radius}")]
    ArenaTooSmall {
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
        radius: f32,
    },

    /// Two static colliders share an id
    #[error("collider id {id} is used more than once")]
    DuplicateCollider { id: u32 },

    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
