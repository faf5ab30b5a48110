//! Engine tuning and preferences
//!
//! Every constant the simulation reads lives here as a named field rather
//! than inline. All fields have defaults, so a settings file only needs the
//! values it overrides. Units: distances in world units, time in frames
//! (one frame = 1/60 s).

use serde::{Deserialize, Serialize};

/// World physics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Downward acceleration applied to airborne entities
    pub gravity: f32,
    /// Horizontal friction coefficient while grounded
    pub ground_friction: f32,
    /// Horizontal friction coefficient while airborne
    pub air_friction: f32,
    /// Multiplier applied to vertical relative velocity on ceiling hits
    pub bounce: f32,
    /// Landing impacts below this speed make no dust or shake
    pub impact_threshold: f32,
    /// Dust particles per unit of landing impact
    pub dust_per_impact: f32,
    /// Upper bound on particles in one landing burst
    pub max_dust: usize,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            ground_friction: 0.3,
            air_friction: 0.03,
            bounce: -0.3,
            impact_threshold: 4.0,
            dust_per_impact: 1.5,
            max_dust: 30,
        }
    }
}

/// Camera follow and shake
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Fraction of the remaining distance covered per frame
    pub smoothing: f32,
    /// Shake added per unit of landing impact
    pub shake_per_impact: f32,
    /// Shake multiplier per frame
    pub shake_decay: f32,
    /// Largest shake offset, in pixels
    pub max_shake: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            smoothing: 0.05,
            shake_per_impact: 0.6,
            shake_decay: 0.9,
            max_shake: 12.0,
        }
    }
}

/// Drawing options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderTuning {
    /// Pixels per world unit
    pub scale: f32,
    /// Draw the waypoint polyline of path-driven entities
    pub show_paths: bool,
    /// Viewport size in pixels
    pub viewport: (f32, f32),
}

impl Default for RenderTuning {
    fn default() -> Self {
        Self {
            scale: 1.0,
            show_paths: true,
            viewport: (800.0, 600.0),
        }
    }
}

/// Player movement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Horizontal acceleration while grounded
    pub ground_accel: f32,
    /// Horizontal acceleration while airborne
    pub air_accel: f32,
    /// Airborne input never pushes horizontal speed past this
    pub air_speed_limit: f32,
    /// Upward velocity at the start of a jump
    pub jump_impulse: f32,
    /// Extra upward acceleration while jump is held, at the start of the window
    pub jump_hold_boost: f32,
    /// Length of the hold-to-jump-higher window
    pub jump_hold_frames: f32,
    /// Grounded reversals above this speed kick up dirt
    pub skid_threshold: f32,
    /// Upward velocity after stomping an enemy
    pub stomp_bounce: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            ground_accel: 1.5,
            air_accel: 0.3,
            air_speed_limit: 5.0,
            jump_impulse: 9.0,
            jump_hold_boost: 0.6,
            jump_hold_frames: 12.0,
            skid_threshold: 2.5,
            stomp_bounce: 7.0,
        }
    }
}

/// Enemy follower AI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub accel: f32,
    pub max_speed: f32,
    pub jump_impulse: f32,
    /// Forced jumps happen after a random cooldown in this range
    pub jump_cooldown_min: f32,
    pub jump_cooldown_max: f32,
    /// Horizontal distance under which the enemy stops steering
    pub dead_zone: f32,
    /// Health for enemies that do not set their own
    pub health: u32,
    /// Invincibility after being stomped
    pub invincible_frames: f32,
    /// Size multiplier applied on every hit
    pub shrink: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            accel: 0.5,
            max_speed: 3.0,
            jump_impulse: 8.0,
            jump_cooldown_min: 60.0,
            jump_cooldown_max: 180.0,
            dead_zone: 4.0,
            health: 3,
            invincible_frames: 30.0,
            shrink: 0.85,
        }
    }
}

/// Complete engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed (particles, enemy jump timing)
    pub seed: u64,

    pub physics: PhysicsTuning,
    pub camera: CameraTuning,
    pub render: RenderTuning,
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,

    // === Visual Effects ===
    /// Screen shake on hard landings
    pub screen_shake: bool,
    /// Particle effects (dust, dirt)
    pub particles: bool,
    /// Cap on live particle groups
    pub max_particle_groups: usize,

    // === Accessibility ===
    /// Reduced motion (no shake)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x1ed6e,
            physics: PhysicsTuning::default(),
            camera: CameraTuning::default(),
            render: RenderTuning::default(),
            player: PlayerTuning::default(),
            enemy: EnemyTuning::default(),
            screen_shake: true,
            particles: true,
            max_particle_groups: 64,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective particle group cap
    pub fn max_particle_groups(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.max_particle_groups
        }
    }
}
