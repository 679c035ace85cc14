//! World-object components: buildings, resource nodes, cover objects,
//! obstacles, and the engine configuration.

use outpost_logic::constants::cover;
use outpost_logic::geometry::{Bounds, Vec2};
use serde::{Deserialize, Serialize};

/// Building categories relevant to behavior decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    /// The colony's home/base marker and last-resort rescue point.
    Home,
    /// Sleeping spot; occupancy-limited.
    Bed,
    /// Food storage; eating happens here.
    Storage,
    /// Medical building with a healing aura.
    Medical,
    /// Defense turret; its protection radius makes a retreat preferred.
    Turret,
    /// High cover, blocks movement.
    Wall,
}

/// A placed building.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    pub capacity: u32,
    pub occupancy: u32,
    pub radius: f32,
    /// False while under construction.
    pub built: bool,
    /// Remaining build effort (seconds of work at full throughput).
    pub build_remaining: f32,
}

impl Building {
    pub fn new(kind: BuildingKind) -> Self {
        let (capacity, radius) = match kind {
            BuildingKind::Home => (8, 24.0),
            BuildingKind::Bed => (1, 12.0),
            BuildingKind::Storage => (4, 16.0),
            BuildingKind::Medical => (2, 16.0),
            BuildingKind::Turret => (0, 10.0),
            BuildingKind::Wall => (0, 16.0),
        };
        Self {
            kind,
            capacity,
            occupancy: 0,
            radius,
            built: true,
            build_remaining: 0.0,
        }
    }

    pub fn under_construction(kind: BuildingKind, effort: f32) -> Self {
        Self {
            built: false,
            build_remaining: effort,
            ..Self::new(kind)
        }
    }

    pub fn has_free_capacity(&self) -> bool {
        self.built && self.occupancy < self.capacity
    }

    /// Radius within which a turret protects retreating colonists.
    pub fn protection_radius(&self) -> Option<f32> {
        match self.kind {
            BuildingKind::Turret if self.built => Some(160.0),
            _ => None,
        }
    }
}

/// Harvestable resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Tree,
    Rock,
    Crop,
}

/// A harvestable world resource, worn down by work.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResourceNode {
    pub kind: ResourceKind,
    pub hp: f32,
}

impl ResourceNode {
    pub fn new(kind: ResourceKind) -> Self {
        let hp = match kind {
            ResourceKind::Tree => 30.0,
            ResourceKind::Rock => 45.0,
            ResourceKind::Crop => 10.0,
        };
        Self { kind, hp }
    }

    pub fn depleted(&self) -> bool {
        self.hp <= 0.0
    }
}

/// Something an actor can duck behind. Base value depends on what it
/// is; walls are high cover, rocks and trees low cover.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoverObject {
    pub base_value: f32,
    pub radius: f32,
    /// High cover cannot be stacked with; low cover can.
    pub high: bool,
}

impl CoverObject {
    pub fn wall() -> Self {
        Self {
            base_value: cover::WALL_BASE,
            radius: 16.0,
            high: true,
        }
    }

    pub fn rock() -> Self {
        Self {
            base_value: cover::ROCK_BASE,
            radius: 12.0,
            high: false,
        }
    }

    pub fn tree() -> Self {
        Self {
            base_value: cover::TREE_BASE,
            radius: 10.0,
            high: false,
        }
    }
}

/// Non-passable geometry for the stuck detector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Obstacle {
    pub radius: f32,
}

/// Engine-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub home_base: Vec2,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 1200.0,
            home_base: Vec2::new(800.0, 600.0),
        }
    }
}

impl WorldConfig {
    pub fn bounds(&self) -> Bounds {
        Bounds::from_size(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_capacity() {
        let mut bed = Building::new(BuildingKind::Bed);
        assert!(bed.has_free_capacity());
        bed.occupancy = 1;
        assert!(!bed.has_free_capacity());
    }

    #[test]
    fn test_unbuilt_has_no_capacity() {
        let site = Building::under_construction(BuildingKind::Bed, 10.0);
        assert!(!site.has_free_capacity());
        assert!(site.build_remaining > 0.0);
    }

    #[test]
    fn test_turret_protection() {
        assert!(Building::new(BuildingKind::Turret).protection_radius().is_some());
        assert!(Building::new(BuildingKind::Bed).protection_radius().is_none());
        let site = Building::under_construction(BuildingKind::Turret, 5.0);
        assert!(site.protection_radius().is_none());
    }

    #[test]
    fn test_resource_depletion() {
        let mut node = ResourceNode::new(ResourceKind::Crop);
        assert!(!node.depleted());
        node.hp = 0.0;
        assert!(node.depleted());
    }
}
