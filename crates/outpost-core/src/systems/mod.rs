//! Per-tick systems, run in a fixed order by the engine:
//! capabilities → stuck rescue → needs → scheduler → hostiles →
//! tactical cleanup.

pub mod combat;
pub mod hostiles;
pub mod movement;
pub mod needs;
pub mod rescue;
pub mod scheduler;

pub use combat::TacticalEngine;
