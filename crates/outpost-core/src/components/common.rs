//! Common components used across actor and world entities.

use outpost_logic::geometry::Vec2;
use serde::{Deserialize, Serialize};

/// Spatial position component.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position {
    pub pos: Vec2,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
        }
    }
}

/// Cached route of the movement primitive — present only while the
/// actor has an active destination. Removing it is `clear_route`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Route {
    pub dest: Vec2,
    pub arrival_radius: f32,
}
