//! Frame-driven simulation module
//!
//! All gameplay logic lives here:
//! - One tick per display refresh, `dt` measured in frames
//! - Seeded RNG only
//! - Stable iteration order (category order, then list order)
//! - Rendering only through the `render::Surface` boundary

pub mod behavior;
pub mod collision;
pub mod entity;
pub mod particles;
pub mod path;
pub mod physics;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Side, collide, collision_side};
pub use entity::{Body, Category, Entity, EntityId, EntityKind, GroundRef, PhysicsState};
pub use particles::{Burst, ParticleGroup};
pub use path::{Path, PathError, PathMode, Waypoint};
pub use spawn::{EntitySpec, SpawnError, SpawnKind, spawn, spawn_checked};
pub use state::{Camera, EntityLists, GameEvent, SessionPhase, SimError, Simulation};
pub use tick::{TickInput, TickStatus, tick};
