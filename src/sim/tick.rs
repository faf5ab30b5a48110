//! Per-frame simulation tick
//!
//! One tick per display refresh. `dt` is the frame delta in frame units, so
//! a steady 60 Hz display ticks with `dt = 1.0`.

use super::behavior;
use super::entity::Category;
use super::state::Simulation;
use crate::consts::MAX_FRAME_DT;
use crate::render::{Surface, View, draw_entity, draw_particles};

/// Actions held during a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// What a call to `tick` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    Advanced,
    /// Pathological frame delta; nothing changed
    Skipped,
    /// The session is not running
    Stopped,
}

/// Is this frame delta too degenerate to simulate?
pub fn is_pathological(dt: f32) -> bool {
    !dt.is_finite() || dt <= 0.0 || dt >= MAX_FRAME_DT
}

/// Advance the simulation by one frame and draw it
pub fn tick(sim: &mut Simulation, input: &TickInput, surface: &mut dyn Surface, dt: f32) -> TickStatus {
    if !sim.is_running() {
        return TickStatus::Stopped;
    }
    if is_pathological(dt) {
        log::debug!("Skipping frame with dt = {}", dt);
        return TickStatus::Skipped;
    }

    sim.input = *input;
    sim.entities.purge_dead();

    // Each entity is taken out of its list while it updates so it can
    // read and mutate all the others
    for category in Category::ALL {
        for i in 0..sim.entities.get(category).len() {
            let mut entity = sim.entities.take(category, i);
            if !entity.dead {
                behavior::update(&mut entity, sim, dt);
            }
            sim.entities.put_back(category, i, entity);
        }
    }

    let view = View::new(sim.camera.pos + sim.camera.jitter, sim.settings.render.scale);
    let show_paths = sim.settings.render.show_paths;
    for entity in sim.entities.iter_mut() {
        if entity.dead {
            continue;
        }
        entity.body.pos += entity.body.vel * dt;
        draw_entity(surface, entity, &view, show_paths);
    }

    // Draw first so a group's first frame is visible
    sim.particles.retain_mut(|group| {
        draw_particles(surface, group, &view);
        group.step(dt)
    });

    if let Some(player) = sim.entities.player() {
        let body = player.body;
        let viewport = sim.viewport();
        let smoothing = sim.settings.camera.smoothing;
        sim.camera.follow(&body, viewport, smoothing, false, dt);
    }
    let decay = sim.settings.camera.shake_decay;
    sim.camera.update_shake(&mut sim.rng, decay, dt);

    sim.time_ticks += 1;
    TickStatus::Advanced
}
