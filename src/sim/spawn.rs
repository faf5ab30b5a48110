//! Spawning: kind name + property set → concrete entity
//!
//! Each kind declares its property schema as a serde struct. Unknown keys
//! and wrong types are rejected, never coerced. A path `type` naming no
//! known mode still spawns; its path reports the fault on the first tick
//! and freezes. `spawn_checked` rejects it up front for authoring tools.

use glam::Vec2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::entity::{Body, Enemy, Entity, EntityId, EntityKind, PhysicsState, Player, Victory};
use super::path::{Path, PathMode, Waypoint};
use crate::consts::{ENEMY_SIZE, PLAYER_SIZE, VICTORY_SIZE};
use crate::settings::Settings;

/// Entity kinds that can appear in a level description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnKind {
    Platform,
    Wall,
    Victory,
    Player,
    Enemy,
}

impl SpawnKind {
    pub const ALL: [SpawnKind; 5] = [
        SpawnKind::Platform,
        SpawnKind::Wall,
        SpawnKind::Victory,
        SpawnKind::Player,
        SpawnKind::Enemy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpawnKind::Platform => "platform",
            SpawnKind::Wall => "wall",
            SpawnKind::Victory => "victory",
            SpawnKind::Player => "player",
            SpawnKind::Enemy => "enemy",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Property values a freshly placed editor entity starts with
    pub fn defaults(&self) -> Map<String, Value> {
        let value = match self {
            SpawnKind::Platform | SpawnKind::Wall => {
                serde_json::json!({ "x": 100, "y": 100, "w": 100, "h": 20 })
            }
            SpawnKind::Victory | SpawnKind::Player | SpawnKind::Enemy => {
                serde_json::json!({ "x": 100, "y": 100 })
            }
        };
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

/// One level record: a kind plus its raw property object
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySpec {
    pub kind: SpawnKind,
    pub props: Map<String, Value>,
}

impl EntitySpec {
    pub fn new(kind: SpawnKind, props: Map<String, Value>) -> Self {
        Self { kind, props }
    }

    /// Spec with the kind's default properties
    pub fn with_defaults(kind: SpawnKind) -> Self {
        Self::new(kind, kind.defaults())
    }

    pub fn number(&self, name: &str) -> Option<f32> {
        self.props.get(name).and_then(Value::as_f64).map(|v| v as f32)
    }
}

/// Why a spec could not become an entity
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("invalid {kind} properties: {source}")]
    InvalidProperties {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {kind} property `{name}`: {reason}")]
    OutOfRange {
        kind: &'static str,
        name: &'static str,
        reason: &'static str,
    },
    #[error("invalid {kind} property `type`: unknown path mode `{mode}`")]
    UnknownMode { kind: &'static str, mode: String },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BoxProps {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlatformProps {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    #[serde(rename = "type", default)]
    mode: Option<String>,
    #[serde(default)]
    frames: Option<f32>,
    #[serde(default)]
    path: Option<Vec<Waypoint>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct VictoryProps {
    x: f32,
    y: f32,
    #[serde(rename = "type", default)]
    mode: Option<String>,
    #[serde(default)]
    frames: Option<f32>,
    #[serde(default)]
    path: Option<Vec<Waypoint>>,
    #[serde(default)]
    physics: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PointProps {
    x: f32,
    y: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnemyProps {
    x: f32,
    y: f32,
    #[serde(default)]
    health: Option<f32>,
}

fn decode<T: DeserializeOwned>(spec: &EntitySpec) -> Result<T, SpawnError> {
    serde_json::from_value(Value::Object(spec.props.clone())).map_err(|source| {
        SpawnError::InvalidProperties {
            kind: spec.kind.as_str(),
            source,
        }
    })
}

fn build_path(mode: Option<&str>, frames: Option<f32>, points: Option<Vec<Waypoint>>) -> Option<Path> {
    let points = points.filter(|points| !points.is_empty())?;
    Some(match mode.map(|name| PathMode::from_name(name).ok_or(name)) {
        None => Path::new(PathMode::default(), frames, points),
        Some(Ok(mode)) => Path::new(mode, frames, points),
        Some(Err(name)) => Path::with_unknown_mode(name, frames, points),
    })
}

fn check_mode(kind: SpawnKind, mode: Option<&str>) -> Result<(), SpawnError> {
    match mode {
        Some(name) if PathMode::from_name(name).is_none() => Err(SpawnError::UnknownMode {
            kind: kind.as_str(),
            mode: name.to_string(),
        }),
        _ => Ok(()),
    }
}

fn check_size(kind: SpawnKind, w: f32, h: f32) -> Result<Vec2, SpawnError> {
    if !(w.is_finite() && h.is_finite()) || w < 0.0 || h < 0.0 {
        return Err(SpawnError::OutOfRange {
            kind: kind.as_str(),
            name: "w/h",
            reason: "size must be finite and non-negative",
        });
    }
    Ok(Vec2::new(w, h))
}

/// Create an entity from a spec
pub fn spawn(spec: &EntitySpec, id: EntityId, settings: &Settings) -> Result<Entity, SpawnError> {
    let (body, physics, kind) = match spec.kind {
        SpawnKind::Platform => {
            let p: PlatformProps = decode(spec)?;
            let size = check_size(spec.kind, p.w, p.h)?;
            let path = build_path(p.mode.as_deref(), p.frames, p.path);
            (
                Body::new(Vec2::new(p.x, p.y), size),
                None,
                EntityKind::Platform { path },
            )
        }
        SpawnKind::Wall => {
            let p: BoxProps = decode(spec)?;
            let size = check_size(spec.kind, p.w, p.h)?;
            (Body::new(Vec2::new(p.x, p.y), size), None, EntityKind::Wall)
        }
        SpawnKind::Victory => {
            let p: VictoryProps = decode(spec)?;
            let path = build_path(p.mode.as_deref(), p.frames, p.path);
            let physics = (path.is_none() && p.physics.unwrap_or(false)).then(PhysicsState::default);
            (
                Body::new(Vec2::new(p.x, p.y), Vec2::splat(VICTORY_SIZE)),
                physics,
                EntityKind::Victory(Victory { path }),
            )
        }
        SpawnKind::Player => {
            let p: PointProps = decode(spec)?;
            (
                Body::new(Vec2::new(p.x, p.y), Vec2::splat(PLAYER_SIZE)),
                Some(PhysicsState::default()),
                EntityKind::Player(Player::default()),
            )
        }
        SpawnKind::Enemy => {
            let p: EnemyProps = decode(spec)?;
            let health = p.health.unwrap_or(settings.enemy.health as f32);
            if !(health >= 1.0 && health.fract() == 0.0) {
                return Err(SpawnError::OutOfRange {
                    kind: spec.kind.as_str(),
                    name: "health",
                    reason: "health must be a positive whole number",
                });
            }
            (
                Body::new(Vec2::new(p.x, p.y), Vec2::splat(ENEMY_SIZE)),
                Some(PhysicsState::default()),
                EntityKind::Enemy(Enemy {
                    health: health as u32,
                    jump_cooldown: settings.enemy.jump_cooldown_max,
                    invincible: 0.0,
                }),
            )
        }
    };

    Ok(Entity {
        id,
        origin: body.pos,
        body,
        dead: false,
        physics,
        kind,
        spec: spec.clone(),
    })
}

/// `spawn`, but an unknown path mode is an error instead of a frozen path
pub fn spawn_checked(spec: &EntitySpec, id: EntityId, settings: &Settings) -> Result<Entity, SpawnError> {
    let entity = spawn(spec, id, settings)?;
    let mode = spec.props.get("type").and_then(Value::as_str);
    check_mode(spec.kind, mode)?;
    Ok(entity)
}
