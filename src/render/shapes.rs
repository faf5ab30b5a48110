//! Per-kind drawing
//!
//! Entities are drawn in local coordinates: the surface is translated to the
//! entity's screen position and scaled to pixels first.

use std::f32::consts::TAU;

use glam::Vec2;

use super::{Color, Surface, View};
use crate::sim::entity::{Body, Entity, EntityKind};
use crate::sim::particles::ParticleGroup;
use crate::sim::path::Path;

/// Enemies blink at this alpha while invincible
const INVINCIBLE_ALPHA: f32 = 0.4;

fn outline<S: Surface + ?Sized>(surface: &mut S, size: Vec2) {
    surface.begin_path();
    surface.move_to(0.0, 0.0);
    surface.line_to(size.x, 0.0);
    surface.line_to(size.x, size.y);
    surface.line_to(0.0, size.y);
    surface.close_path();
}

/// Outline whose top edge trails behind the velocity
fn outline_skewed<S: Surface + ?Sized>(surface: &mut S, body: &Body, skew: Vec2) {
    let offs = body.vel * skew;
    surface.begin_path();
    surface.move_to(-offs.x, -offs.y);
    surface.line_to(body.size.x - offs.x, -offs.y);
    surface.line_to(body.size.x, body.size.y);
    surface.line_to(0.0, body.size.y);
    surface.close_path();
}

/// Stroke a waypoint polyline in the current local space
pub fn draw_path<S: Surface + ?Sized>(surface: &mut S, path: &Path) {
    let Some((first, rest)) = path.points().split_first() else {
        return;
    };
    surface.begin_path();
    surface.move_to(first.offset.x, first.offset.y);
    for point in rest {
        surface.line_to(point.offset.x, point.offset.y);
    }
    surface.close_path();
    surface.set_stroke_color(Color::BLACK);
    surface.stroke();
}

/// Draw one entity at its camera-relative position
pub fn draw_entity<S: Surface + ?Sized>(surface: &mut S, entity: &Entity, view: &View, show_paths: bool) {
    let body = &entity.body;
    let screen = view.to_screen(body.pos);

    surface.reset_transform();
    surface.translate(screen.x, screen.y);
    surface.scale(view.scale, view.scale);

    match &entity.kind {
        EntityKind::Platform { .. } => {
            outline(surface, body.size);
            surface.set_fill_color(Color::BLACK);
            surface.set_stroke_color(Color::GREY);
            surface.fill();
            surface.stroke();
        }
        EntityKind::Wall => {
            outline(surface, body.size);
            surface.set_stroke_color(Color::BLACK);
            surface.stroke();
        }
        EntityKind::Victory(_) => {
            let r = body.size.x / 2.0;
            surface.begin_path();
            surface.arc(r, body.size.y / 2.0, r, 0.0, TAU);
            surface.set_fill_color(Color::GREEN);
            surface.set_stroke_color(Color::BLUE);
            surface.fill();
            surface.stroke();
        }
        EntityKind::Player(_) => {
            outline_skewed(surface, body, Vec2::new(2.0, 1.0));
            surface.set_fill_color(Color::BLACK);
            surface.set_stroke_color(Color::GREY);
            surface.fill();
            surface.stroke();
        }
        EntityKind::Enemy(enemy) => {
            if enemy.is_invincible() {
                surface.set_global_alpha(INVINCIBLE_ALPHA);
            }
            outline_skewed(surface, body, Vec2::new(2.0, 1.0));
            surface.set_fill_color(Color::RED);
            surface.set_stroke_color(Color::DARK_RED);
            surface.fill();
            surface.stroke();
            surface.set_global_alpha(1.0);
        }
    }

    if show_paths && let Some(path) = entity.kind.path() {
        // Waypoints are relative to the spawn origin; draw through the box center
        let local = entity.origin - body.pos + body.size / 2.0;
        surface.translate(local.x, local.y);
        draw_path(surface, path);
    }

    surface.reset_transform();
}

/// Draw a particle group in its current state
pub fn draw_particles<S: Surface + ?Sized>(surface: &mut S, group: &ParticleGroup, view: &View) {
    let origin = view.to_screen(Vec2::ZERO);

    surface.reset_transform();
    surface.translate(origin.x, origin.y);
    surface.scale(view.scale, view.scale);
    surface.begin_path();
    surface.set_fill_color(group.color);
    surface.set_global_alpha(group.alpha());
    for p in &group.particles {
        surface.rect(p.pos.x, p.pos.y, group.size, group.size);
    }
    surface.fill();
    surface.set_global_alpha(1.0);
    surface.reset_transform();
}

/// Highlight box around an editor selection
pub fn draw_selection<S: Surface + ?Sized>(surface: &mut S, body: &Body, view: &View) {
    let screen = view.to_screen(body.pos);

    surface.reset_transform();
    surface.translate(screen.x, screen.y);
    surface.scale(view.scale, view.scale);
    surface.begin_path();
    surface.rect(-2.0, -2.0, body.size.x + 4.0, body.size.y + 4.0);
    surface.set_stroke_color(Color::ORANGE);
    surface.stroke();
    surface.reset_transform();
}
