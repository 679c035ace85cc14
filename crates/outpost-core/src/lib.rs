//! Outpost behavior engine.
//!
//! Drives autonomous colonist behavior in a real-time survival
//! simulation: a priority-based intent scheduler (FSM) decides what
//! each actor does every tick, and a tactical combat engine decides
//! how it fights — danger hysteresis, cover positions, retreat
//! destinations, and focus-fire target selection.
//!
//! Pathfinding, rendering, and the detailed body simulation are
//! external collaborators; this crate consumes a movement primitive
//! and per-actor capability scalars.

pub mod components;
pub mod engine;
pub mod reservations;
pub mod systems;

pub use engine::Engine;
