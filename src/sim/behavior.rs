//! Per-kind behavior
//!
//! `update` dispatches on the entity kind. Player and enemy movement plug
//! into the physics step through `Steering`; victory zones and enemies react
//! to contact through `Touch`.

use glam::Vec2;
use rand::Rng;

use super::collision::{Side, collide, collision_side};
use super::entity::{Body, Category, Enemy, Entity, EntityId, EntityKind, PhysicsState, Player, Victory};
use super::particles::Burst;
use super::physics;
use super::state::{GameEvent, Simulation};
use crate::render::Color;
use crate::settings::Settings;

/// Movement input applied to relative velocity inside the physics step
pub trait Steering {
    fn update_rv(&mut self, body: &Body, phys: &mut PhysicsState, sim: &mut Simulation, dt: f32);
}

/// The entity touching a trigger
pub struct Contact<'a> {
    pub id: EntityId,
    pub body: &'a Body,
    pub physics: &'a mut PhysicsState,
    pub is_player: bool,
}

/// What a touch did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchOutcome {
    Ignored,
    /// The session ends in success
    Won,
    /// The session ends in failure
    Lost,
    /// Enemy took a hit; zero health means it died
    Stomped { health: u32 },
}

/// Reaction when a physics entity overlaps this one
pub trait Touch {
    fn on_touch(&mut self, me: &mut Body, contact: Contact<'_>, settings: &Settings, dt: f32) -> TouchOutcome;
}

/// Advance one entity by one tick
pub fn update(entity: &mut Entity, sim: &mut Simulation, dt: f32) {
    let has_path = entity.kind.path().is_some();
    match entity.kind {
        EntityKind::Wall => {}
        EntityKind::Platform { .. } | EntityKind::Victory(_) if has_path => {
            follow_path(entity, sim, dt);
        }
        _ if entity.physics.is_some() => physics::step(entity, sim, dt),
        _ => {}
    }
}

fn follow_path(entity: &mut Entity, sim: &mut Simulation, dt: f32) {
    let Entity {
        id, body, origin, kind, ..
    } = entity;
    let Some(path) = kind.path_mut() else {
        return;
    };
    if let Err(err) = path.advance(body, *origin, dt) {
        log::error!("Freezing path of entity {}: {}", id, err);
        path.freeze();
        body.vel = Vec2::ZERO;
        sim.events.push(GameEvent::PathFrozen { id: *id });
    }
}

impl Steering for Player {
    fn update_rv(&mut self, body: &Body, phys: &mut PhysicsState, sim: &mut Simulation, dt: f32) {
        let tuning = &sim.settings.player;
        let input = sim.input;
        let grounded = phys.is_grounded();

        let dir = (input.right as i32 - input.left as i32) as f32;
        if dir != 0.0 {
            self.facing = dir;
        }

        if grounded {
            // Landing closes the hold window
            if self.jumping {
                self.jumping = false;
                self.jump_timer = 0.0;
            }

            let skid = dir != 0.0 && dir * phys.rvel.x < -tuning.skid_threshold;
            let skid_burst = skid.then(|| Burst {
                origin: Vec2::new(body.center().x, body.bottom()),
                velocity: Vec2::new(phys.rvel.x * 0.5, -2.0),
                count: 6,
                spread: 0.6,
                color: Color::DIRT,
                max_age: 30.0,
                size: 2.0,
                acceleration: Vec2::new(0.0, sim.settings.physics.gravity * 0.5),
            });

            phys.rvel.x += dir * tuning.ground_accel * dt;

            if input.up && phys.rvel.y >= -1.0 {
                phys.rvel.y = -tuning.jump_impulse;
                self.jumping = true;
                self.jump_timer = tuning.jump_hold_frames;
            }

            if let Some(burst) = skid_burst {
                sim.emit(burst);
            }
        } else {
            if dir * phys.rvel.x < tuning.air_speed_limit {
                phys.rvel.x += dir * tuning.air_accel * dt;
            }

            if self.jumping {
                if input.up && self.jump_timer > 0.0 {
                    let window = tuning.jump_hold_frames.max(f32::EPSILON);
                    phys.rvel.y -= tuning.jump_hold_boost * (self.jump_timer / window) * dt;
                    self.jump_timer = (self.jump_timer - dt).max(0.0);
                } else {
                    self.jumping = false;
                    self.jump_timer = 0.0;
                }
            }
        }
    }
}

impl Enemy {
    fn jump(&mut self, phys: &mut PhysicsState, sim: &mut Simulation) {
        let tuning = &sim.settings.enemy;
        let (lo, hi) = (
            tuning.jump_cooldown_min.min(tuning.jump_cooldown_max),
            tuning.jump_cooldown_min.max(tuning.jump_cooldown_max),
        );
        phys.rvel.y = -tuning.jump_impulse;
        self.jump_cooldown = sim.rng.random_range(lo..=hi);
    }
}

/// Would the body still stand on something after moving `dx`?
fn supported_ahead(body: &Body, dx: f32, ground: Option<Body>, sim: &Simulation) -> bool {
    let mut ahead = *body;
    ahead.pos += Vec2::new(dx, 1.0);

    ground.is_some_and(|g| collide(&ahead, &g))
        || [Category::Terrain, Category::Platforms]
            .into_iter()
            .flat_map(|c| sim.entities.get(c))
            .any(|e| !e.dead && collide(&ahead, &e.body))
}

impl Steering for Enemy {
    fn update_rv(&mut self, body: &Body, phys: &mut PhysicsState, sim: &mut Simulation, dt: f32) {
        let tuning = sim.settings.enemy.clone();
        self.invincible = (self.invincible - dt).max(0.0);

        if let Some(player) = sim.entities.player() {
            let dx = player.body.center().x - body.center().x;
            if dx.abs() > tuning.dead_zone {
                phys.rvel.x += dx.signum() * tuning.accel * dt;
                phys.rvel.x = phys.rvel.x.clamp(-tuning.max_speed, tuning.max_speed);
            }
        }

        if !phys.is_grounded() {
            return;
        }

        self.jump_cooldown -= dt;
        if self.jump_cooldown <= 0.0 {
            self.jump(phys, sim);
            return;
        }

        let ground = sim.entities.ground_body(phys.ground);
        let ground_vx = ground.map_or(0.0, |g| g.vel.x);
        let dx = (phys.rvel.x + ground_vx) * dt;
        if dx != 0.0 && !supported_ahead(body, dx, ground, sim) {
            self.jump(phys, sim);
        }
    }
}

impl Touch for Victory {
    fn on_touch(&mut self, _me: &mut Body, contact: Contact<'_>, _settings: &Settings, _dt: f32) -> TouchOutcome {
        if contact.is_player {
            TouchOutcome::Won
        } else {
            TouchOutcome::Ignored
        }
    }
}

impl Touch for Enemy {
    fn on_touch(&mut self, me: &mut Body, contact: Contact<'_>, settings: &Settings, dt: f32) -> TouchOutcome {
        if !contact.is_player || self.is_invincible() {
            return TouchOutcome::Ignored;
        }

        if collision_side(contact.body, me, dt) != Side::Top {
            return TouchOutcome::Lost;
        }

        self.health = self.health.saturating_sub(1);
        self.invincible = settings.enemy.invincible_frames;

        // Shrink about the bottom-center so the enemy stays on its ground
        let old = me.size;
        me.size *= settings.enemy.shrink;
        me.pos.x += (old.x - me.size.x) / 2.0;
        me.pos.y += old.y - me.size.y;

        contact.physics.rvel.y = -settings.player.stomp_bounce;

        TouchOutcome::Stomped { health: self.health }
    }
}
