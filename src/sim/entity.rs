//! Entity types
//!
//! Entities are a tagged variant over kinds. Behavior hooks that only some
//! kinds have (steering, touch reactions, physics) are optional capabilities
//! looked up explicitly instead of being always-present methods.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::behavior::{Steering, Touch};
use super::path::Path;
use super::spawn::EntitySpec;

/// Stable entity identifier (unique within one simulation)
pub type EntityId = u32;

/// Category lists partition every entity. Membership decides which
/// collision rules apply to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Moving ground (one-way platforms)
    Platforms,
    /// Static walls
    Terrain,
    /// AI-controlled entities
    Mobs,
    /// The player
    Players,
    /// Trigger volumes
    Interactive,
}

impl Category {
    /// Update order used by the simulation loop
    pub const ALL: [Category; 5] = [
        Category::Platforms,
        Category::Terrain,
        Category::Mobs,
        Category::Players,
        Category::Interactive,
    ];

    pub fn index(self) -> usize {
        match self {
            Category::Platforms => 0,
            Category::Terrain => 1,
            Category::Mobs => 2,
            Category::Players => 3,
            Category::Interactive => 4,
        }
    }
}

/// Axis-aligned box with velocity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Body {
    /// Top-left corner
    pub pos: Vec2,
    /// Width and height
    pub size: Vec2,
    /// Absolute velocity (units per frame)
    pub vel: Vec2,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            vel: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Inclusive point test (used by editor picking)
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.pos.x
            && point.x <= self.right()
            && point.y >= self.pos.y
            && point.y <= self.bottom()
    }
}

/// Weak handle to the entity an entity stands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundRef {
    pub category: Category,
    pub id: EntityId,
}

/// State carried only by physics-driven entities
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhysicsState {
    /// Velocity relative to the current ground (absolute while airborne)
    pub rvel: Vec2,
    /// What this entity currently stands on
    pub ground: Option<GroundRef>,
    /// Velocity at the start of the last physics step
    pub prev_vel: Vec2,
}

impl PhysicsState {
    pub fn is_grounded(&self) -> bool {
        self.ground.is_some()
    }
}

/// Player-local steering state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Player {
    /// Inside the hold-to-jump-higher window
    pub jumping: bool,
    /// Remaining hold window, in frames
    pub jump_timer: f32,
    /// Last horizontal input direction (-1, 0, 1)
    pub facing: f32,
}

/// Enemy follower state
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub health: u32,
    /// Frames until the next forced jump
    pub jump_cooldown: f32,
    /// Frames of remaining invincibility after a hit
    pub invincible: f32,
}

impl Enemy {
    pub fn is_invincible(&self) -> bool {
        self.invincible > 0.0
    }
}

/// Victory zone
#[derive(Debug, Clone, PartialEq)]
pub struct Victory {
    pub path: Option<Path>,
}

/// Kind-specific data
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Platform { path: Option<Path> },
    Wall,
    Victory(Victory),
    Player(Player),
    Enemy(Enemy),
}

impl EntityKind {
    pub fn category(&self) -> Category {
        match self {
            EntityKind::Platform { .. } => Category::Platforms,
            EntityKind::Wall => Category::Terrain,
            EntityKind::Victory(_) => Category::Interactive,
            EntityKind::Player(_) => Category::Players,
            EntityKind::Enemy(_) => Category::Mobs,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self, EntityKind::Player(_))
    }

    /// Steering capability (`update_rv`), if this kind has one
    pub fn steering_mut(&mut self) -> Option<&mut dyn Steering> {
        match self {
            EntityKind::Player(player) => Some(player as &mut dyn Steering),
            EntityKind::Enemy(enemy) => Some(enemy as &mut dyn Steering),
            _ => None,
        }
    }

    /// Touch capability (`on_touch`), if this kind has one
    pub fn touch_mut(&mut self) -> Option<&mut dyn Touch> {
        match self {
            EntityKind::Victory(victory) => Some(victory as &mut dyn Touch),
            EntityKind::Enemy(enemy) => Some(enemy as &mut dyn Touch),
            _ => None,
        }
    }

    pub fn has_touch(&self) -> bool {
        matches!(self, EntityKind::Victory(_) | EntityKind::Enemy(_))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            EntityKind::Platform { path } => path.as_ref(),
            EntityKind::Victory(victory) => victory.path.as_ref(),
            _ => None,
        }
    }

    pub fn path_mut(&mut self) -> Option<&mut Path> {
        match self {
            EntityKind::Platform { path } => path.as_mut(),
            EntityKind::Victory(victory) => victory.path.as_mut(),
            _ => None,
        }
    }
}

/// A live entity
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub body: Body,
    /// Spawn position; path waypoints are relative to it
    pub origin: Vec2,
    /// Set to remove the entity at the start of the next tick
    pub dead: bool,
    pub physics: Option<PhysicsState>,
    pub kind: EntityKind,
    /// The record this entity was spawned from (level round-trips)
    pub spec: EntitySpec,
}

impl Entity {
    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn ground(&self) -> Option<GroundRef> {
        self.physics.as_ref().and_then(|p| p.ground)
    }

    pub fn handle(&self) -> GroundRef {
        GroundRef {
            category: self.category(),
            id: self.id,
        }
    }
}
