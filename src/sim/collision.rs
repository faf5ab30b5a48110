//! Collision detection for axis-aligned boxes
//!
//! Overlap is inclusive (touching boxes collide), which is what keeps a
//! grounded entity attached: it is snapped one unit into its ground.

use serde::{Deserialize, Serialize};

use super::entity::Body;

/// Which face of the other box an entity is hitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// Do two boxes overlap or touch?
#[inline]
pub fn collide(a: &Body, b: &Body) -> bool {
    a.pos.x + a.size.x >= b.pos.x
        && a.pos.x <= b.pos.x + b.size.x
        && a.pos.y + a.size.y >= b.pos.y
        && a.pos.y <= b.pos.y + b.size.y
}

/// Classify which face of `b` the box `a` is hitting
///
/// Heuristic, not continuous collision detection: `a`'s vertical center is
/// compared against `b`'s top and bottom edges displaced by the combined
/// vertical velocity over `dt`. Vertical classification is tried first, so a
/// corner overlap resolves to `Top`/`Bottom` whenever either test passes;
/// only then are horizontal centers compared, with an exact tie going to
/// `Right`.
pub fn collision_side(a: &Body, b: &Body, dt: f32) -> Side {
    let center = a.center();
    let drift = (a.vel.y + b.vel.y) * dt;

    if center.y <= b.pos.y + drift {
        Side::Top
    } else if center.y >= b.pos.y + b.size.y + drift {
        Side::Bottom
    } else if center.x < b.center().x {
        Side::Left
    } else {
        Side::Right
    }
}
