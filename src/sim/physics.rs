//! Ground-relative physics step
//!
//! A physics entity keeps its velocity relative to whatever it stands on
//! (`rvel`). Standing on a moving platform therefore carries the entity
//! along, and leaving the platform converts the relative velocity back into
//! an absolute one so momentum is kept.

use glam::Vec2;

use super::behavior::{Contact, TouchOutcome};
use super::collision::{Side, collide, collision_side};
use super::entity::{Body, Category, Entity, EntityId, GroundRef, PhysicsState};
use super::particles::Burst;
use super::state::{GameEvent, SessionPhase, Simulation};
use crate::render::Color;

/// Does horizontal velocity `vx` (relative to the wall) push into `side`?
fn drives_into(side: Side, vx: f32) -> bool {
    match side {
        Side::Left => vx > 0.0,
        Side::Right => vx < 0.0,
        Side::Top | Side::Bottom => false,
    }
}

/// Run one physics step for an entity taken out of its list
///
/// Entities without a `PhysicsState` are left alone.
pub fn step(entity: &mut Entity, sim: &mut Simulation, dt: f32) {
    let id = entity.id;
    let is_player = entity.kind.is_player();
    let Entity {
        body, physics, kind, ..
    } = entity;
    let Some(phys) = physics.as_mut() else {
        return;
    };
    let tuning = sim.settings.physics.clone();

    let prev_vel = body.vel;
    phys.prev_vel = prev_vel;

    // Velocity of the previous ground, recovered from vel = rvel + ground.vel
    let old_ground = phys.ground;
    let old_ground_vel = body.vel - phys.rvel;

    // Keep the previous ground only while it is alive and still touching
    let mut ground: Option<(GroundRef, Body)> = old_ground
        .and_then(|handle| sim.entities.resolve(handle).map(|e| (handle, e.body)))
        .filter(|(_, g)| collide(body, g));

    let mut bounced = false;
    let mut side_contacts: Vec<(Side, Body)> = Vec::new();
    let mut terrain_ground = false;

    for wall in sim.entities.get(Category::Terrain) {
        if wall.dead || !collide(body, &wall.body) {
            continue;
        }
        match collision_side(body, &wall.body, dt) {
            Side::Top => {
                if !terrain_ground && body.vel.y >= wall.body.vel.y {
                    ground = Some((wall.handle(), wall.body));
                    terrain_ground = true;
                }
            }
            Side::Bottom => {
                if phys.rvel.y < 0.0 {
                    body.pos.y = wall.body.bottom();
                    phys.rvel.y *= tuning.bounce;
                    bounced = true;
                }
            }
            side => {
                if drives_into(side, phys.rvel.x) {
                    bounced = true;
                }
                side_contacts.push((side, wall.body));
            }
        }
    }

    // One-way platforms: only caught while not moving up relative to them
    if ground.is_none() {
        ground = sim
            .entities
            .get(Category::Platforms)
            .iter()
            .find(|p| !p.dead && collide(body, &p.body) && body.vel.y >= p.body.vel.y)
            .map(|p| (p.handle(), p.body));
    }

    touch_scan(id, body, phys, is_player, sim, dt);

    match (old_ground, ground) {
        (None, Some((_, g))) => {
            body.vel.y = g.vel.y;
            phys.rvel.x -= g.vel.x;
            phys.rvel.y = 0.0;

            let impact = (prev_vel - g.vel).length();
            if impact > tuning.impact_threshold {
                land(body, impact, sim);
                sim.events.push(GameEvent::Landed { id, impact });
            }
        }
        (Some(_), None) => {
            phys.rvel += old_ground_vel;
        }
        (Some(a), Some((b, g))) if a != b => {
            phys.rvel += old_ground_vel - g.vel;
        }
        _ => {}
    }
    phys.ground = ground.map(|(handle, _)| handle);

    if !bounced && let Some(steering) = kind.steering_mut() {
        steering.update_rv(body, phys, sim, dt);
    }

    if ground.is_none() {
        phys.rvel.y += tuning.gravity * dt;
    }

    let friction = if ground.is_some() {
        tuning.ground_friction
    } else {
        tuning.air_friction
    };
    phys.rvel.x *= 1.0 / (1.0 + dt * friction);

    body.vel = phys.rvel;
    if let Some((_, g)) = ground {
        body.vel += g.vel;
        body.pos.y = g.pos.y - body.size.y + 1.0;
    }

    for (side, wall) in side_contacts {
        if !drives_into(side, body.vel.x - wall.vel.x) {
            continue;
        }
        body.pos.x = match side {
            Side::Left => wall.pos.x - body.size.x,
            _ => wall.right(),
        };
        phys.rvel.x = 0.0;
        body.vel.x = 0.0;
    }
}

/// Fire `on_touch` on every trigger the entity overlaps
fn touch_scan(
    id: EntityId,
    body: &Body,
    phys: &mut PhysicsState,
    is_player: bool,
    sim: &mut Simulation,
    dt: f32,
) {
    let mut outcomes = Vec::new();

    for category in [Category::Interactive, Category::Mobs] {
        for target in sim.entities.get_mut(category) {
            if target.dead || !target.kind.has_touch() || !collide(body, &target.body) {
                continue;
            }
            let Some(touch) = target.kind.touch_mut() else {
                continue;
            };
            let contact = Contact {
                id,
                body,
                physics: &mut *phys,
                is_player,
            };
            let outcome = touch.on_touch(&mut target.body, contact, &sim.settings, dt);
            if let TouchOutcome::Stomped { health: 0 } = outcome {
                target.dead = true;
            }
            outcomes.push((target.id, outcome));
        }
    }

    for (target, outcome) in outcomes {
        match outcome {
            TouchOutcome::Ignored => {}
            TouchOutcome::Won => sim.finish(SessionPhase::Won),
            TouchOutcome::Lost => sim.finish(SessionPhase::Lost),
            TouchOutcome::Stomped { health } => {
                sim.events.push(GameEvent::EnemyHit { id: target, health });
                if health == 0 {
                    log::debug!("Enemy {} killed", target);
                    sim.events.push(GameEvent::EnemyKilled { id: target });
                }
            }
        }
    }
}

/// Dust and shake for a hard landing
fn land(body: &Body, impact: f32, sim: &mut Simulation) {
    let tuning = &sim.settings.physics;
    let count = ((impact * tuning.dust_per_impact) as usize).min(tuning.max_dust);
    let burst = Burst {
        origin: Vec2::new(body.center().x, body.bottom()),
        velocity: Vec2::new(0.0, -impact * 0.25),
        count,
        spread: 1.2,
        color: Color::DUST,
        max_age: 25.0,
        size: 3.0,
        acceleration: Vec2::new(0.0, 0.1),
    };
    let shake = impact * sim.settings.camera.shake_per_impact;

    sim.emit(burst);
    sim.add_shake(shake);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingSurface;
    use crate::settings::Settings;
    use crate::sim::spawn::{EntitySpec, SpawnKind};
    use crate::sim::tick::{TickInput, tick};
    use proptest::prelude::*;

    fn run(sim: &mut Simulation, ticks: usize) {
        let mut surface = RecordingSurface::new();
        for _ in 0..ticks {
            tick(sim, &TickInput::default(), &mut surface, 1.0);
        }
    }

    fn player(sim: &Simulation) -> &Entity {
        sim.entities.player().unwrap()
    }

    fn player_mut(sim: &mut Simulation) -> &mut Entity {
        &mut sim.entities.get_mut(Category::Players)[0]
    }

    fn grounded(sim: &Simulation) -> bool {
        player(sim).physics.as_ref().unwrap().is_grounded()
    }

    fn rvel(sim: &Simulation) -> Vec2 {
        player(sim).physics.as_ref().unwrap().rvel
    }

    const FLOOR: &str = r#"
        wall {"x": -50, "y": 100, "w": 200, "h": 20};
        player {"x": 0, "y": 70};
    "#;

    #[test]
    fn test_falls_lands_and_rests() {
        let mut sim = Simulation::from_level_str(FLOOR, Settings::default()).unwrap();
        for _ in 0..60 {
            run(&mut sim, 1);
            if grounded(&sim) {
                break;
            }
        }
        assert!(grounded(&sim));

        for _ in 0..1000 {
            run(&mut sim, 1);
            assert!(grounded(&sim));
            assert_eq!(player(&sim).body.pos.y, 81.0);
            assert_eq!(rvel(&sim).y, 0.0);
        }
    }

    #[test]
    fn test_ground_friction_divides_relative_velocity() {
        let mut sim = Simulation::from_level_str(FLOOR, Settings::default()).unwrap();
        player_mut(&mut sim).body.pos.y = 81.0;
        player_mut(&mut sim).physics.as_mut().unwrap().rvel.x = 4.0;
        run(&mut sim, 1);
        assert!(grounded(&sim));
        assert!((rvel(&sim).x - 4.0 / 1.3).abs() < 1e-5);
    }

    #[test]
    fn test_ceiling_bounce() {
        let level = r#"
            wall {"x": -50, "y": 0, "w": 200, "h": 20};
            player {"x": 0, "y": 19};
        "#;
        let mut sim = Simulation::from_level_str(level, Settings::default()).unwrap();
        let p = player_mut(&mut sim);
        p.body.vel.y = -5.0;
        p.physics.as_mut().unwrap().rvel.y = -5.0;

        run(&mut sim, 1);
        let p = player(&sim);
        // Flush under the ceiling, rebounded at 0.3x, then gravity
        assert!((p.body.vel.y - 2.0).abs() < 1e-5);
        assert!((p.body.pos.y - 22.0).abs() < 1e-5);
    }

    #[test]
    fn test_side_wall_clamps_flush() {
        let level = r#"
            wall {"x": 100, "y": 0, "w": 20, "h": 100};
            player {"x": 85, "y": 40};
        "#;
        let mut sim = Simulation::from_level_str(level, Settings::default()).unwrap();
        let p = player_mut(&mut sim);
        p.body.vel.x = 5.0;
        p.physics.as_mut().unwrap().rvel.x = 5.0;

        run(&mut sim, 1);
        let p = player(&sim);
        assert_eq!(p.body.pos.x, 80.0);
        assert_eq!(p.body.vel.x, 0.0);
        assert_eq!(rvel(&sim).x, 0.0);

        // Still flush after more ticks of falling along the wall
        run(&mut sim, 5);
        assert_eq!(player(&sim).body.pos.x, 80.0);
    }

    #[test]
    fn test_rides_moving_platform() {
        let level = r#"
            platform {"x": 0, "y": 100, "w": 100, "h": 20, "frames": 100, "path": [[0, 0], [100, 0]]};
            player {"x": 40, "y": 81};
        "#;
        let mut sim = Simulation::from_level_str(level, Settings::default()).unwrap();
        run(&mut sim, 60);

        let platform = sim.entities.get(Category::Platforms)[0].body;
        let p = player(&sim);
        assert_eq!(p.ground().map(|g| g.category), Some(Category::Platforms));
        assert_eq!(p.body.pos.y, 81.0);
        assert!((p.body.vel.x - platform.vel.x).abs() < 1e-3);
        assert!((platform.vel.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_handoff_from_platform_to_flush_wall() {
        let level = r#"
            platform {"x": 0, "y": 100, "w": 100, "h": 20, "frames": 100, "path": [[0, 0], [100, 0]]};
            player {"x": 40, "y": 81};
        "#;
        let mut sim = Simulation::from_level_str(level, Settings::default()).unwrap();
        run(&mut sim, 60);
        assert_eq!(player(&sim).ground().map(|g| g.category), Some(Category::Platforms));

        // Static wall at the platform's height, touching the player's right edge
        let edge = player(&sim).body.right();
        let wall = match serde_json::json!({ "x": edge, "y": 100, "w": 200, "h": 20 }) {
            serde_json::Value::Object(props) => EntitySpec::new(SpawnKind::Wall, props),
            _ => unreachable!(),
        };
        sim.spawn(&wall).unwrap();

        let platform_vx = sim.entities.get(Category::Platforms)[0].body.vel.x;
        let before = player(&sim).body.vel.x;
        let rvel_before = rvel(&sim).x;
        assert!((platform_vx - 1.0).abs() < 1e-6);
        assert!((before - (rvel_before + platform_vx)).abs() < 1e-5);

        run(&mut sim, 1);

        // Terrain wins over the retained platform in the same tick
        let p = player(&sim);
        assert_eq!(p.ground().map(|g| g.category), Some(Category::Terrain));
        assert_eq!(p.body.pos.y, 81.0);
        // rvel gained the platform speed, then ground friction applied once
        let friction = 1.0 + sim.settings.physics.ground_friction;
        assert!((rvel(&sim).x * friction - (rvel_before + platform_vx)).abs() < 1e-4);
        assert!((p.body.vel.x * friction - before).abs() < 1e-4);
    }

    #[test]
    fn test_platform_is_one_way() {
        let level = r#"
            platform {"x": 0, "y": 100, "w": 100, "h": 10};
            player {"x": 40, "y": 95};
        "#;
        let mut sim = Simulation::from_level_str(level, Settings::default()).unwrap();
        let p = player_mut(&mut sim);
        p.body.vel.y = -6.0;
        p.physics.as_mut().unwrap().rvel.y = -6.0;
        run(&mut sim, 1);
        assert!(!grounded(&sim));
        assert!(player(&sim).body.vel.y < 0.0);
    }

    #[test]
    fn test_leaving_ground_keeps_platform_momentum() {
        let level = r#"
            platform {"x": 0, "y": 100, "w": 100, "h": 20, "frames": 50, "path": [[0, 0], [100, 0]]};
            player {"x": 40, "y": 81};
        "#;
        let mut sim = Simulation::from_level_str(level, Settings::default()).unwrap();
        run(&mut sim, 40);
        assert!(grounded(&sim));

        let up = TickInput {
            up: true,
            ..TickInput::default()
        };
        let mut surface = RecordingSurface::new();
        tick(&mut sim, &up, &mut surface, 1.0);
        tick(&mut sim, &TickInput::default(), &mut surface, 1.0);
        assert!(!grounded(&sim));
        // Airborne rvel is absolute again and still carries the platform speed
        assert!(rvel(&sim).x > 1.5);
    }

    #[test]
    fn test_stale_ground_means_airborne() {
        let level = r#"
            platform {"x": 0, "y": 100, "w": 100, "h": 20};
            player {"x": 40, "y": 81};
        "#;
        let mut sim = Simulation::from_level_str(level, Settings::default()).unwrap();
        run(&mut sim, 2);
        assert!(grounded(&sim));

        sim.entities.get_mut(Category::Platforms)[0].dead = true;
        run(&mut sim, 1);
        assert!(!grounded(&sim));
        assert!(player(&sim).body.vel.y > 0.0);
    }

    #[test]
    fn test_hard_landing_emits_dust_and_event() {
        let level = r#"
            wall {"x": -50, "y": 400, "w": 200, "h": 20};
            player {"x": 0, "y": 0};
        "#;
        let mut sim = Simulation::from_level_str(level, Settings::default()).unwrap();
        let mut landed = None;
        for _ in 0..120 {
            run(&mut sim, 1);
            if let Some(GameEvent::Landed { impact, .. }) =
                sim.drain_events().into_iter().find(|e| matches!(e, GameEvent::Landed { .. }))
            {
                landed = Some(impact);
                break;
            }
        }
        let impact = landed.unwrap();
        assert!(impact > sim.settings.physics.impact_threshold);
        assert_eq!(sim.particles.len(), 1);
        assert!(sim.camera.shake > 0.0);
    }

    proptest! {
        #[test]
        fn friction_decays_monotonically(start in 0.1f32..20.0, friction in 0.01f32..1.0) {
            let mut settings = Settings::default();
            settings.physics.ground_friction = friction;
            let level = r#"
                wall {"x": -5000, "y": 100, "w": 10000, "h": 20};
                player {"x": 0, "y": 81};
            "#;
            let mut sim = Simulation::from_level_str(level, settings).unwrap();
            player_mut(&mut sim).physics.as_mut().unwrap().rvel.x = start;

            let mut prev = start;
            for _ in 0..50 {
                run(&mut sim, 1);
                let now = rvel(&sim).x;
                prop_assert!(now >= 0.0);
                prop_assert!(now <= prev);
                prev = now;
            }
        }
    }
}
