//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep physics
//! - Stable iteration order (by hamster ID)
//! - No presentation, audio or platform dependencies; those are reached
//!   through the `GameEvent` queue

pub mod body;
pub mod collision;
pub mod events;
pub mod hamster;
pub mod launch;
pub mod reflector;
pub mod state;
pub mod tick;
pub mod turn;

pub use body::Body;
pub use collision::{Collider, Contact, ContactKey, Shape, Strike, Surface};
pub use events::GameEvent;
pub use hamster::{Hamster, HamsterId, PlayerId};
pub use launch::{AimPreview, Release, launch_velocity, trajectory_points};
pub use reflector::{ArenaReflector, BoundaryHit, Side, compute_bounce};
pub use state::MatchState;
pub use tick::{FrameInput, Stepper, frame_update, physics_step};
pub use turn::{TurnMachine, TurnPhase};
