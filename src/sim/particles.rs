//! Short-lived particle bursts (landing dust, dirt kicked up on turns)
//!
//! A group is independent of whatever spawned it. The simulation loop owns
//! the list of groups and drops a group as soon as `step` reports it expired.

use glam::Vec2;
use rand::Rng;

use crate::render::Color;

/// Parameters for one burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    pub origin: Vec2,
    /// Velocity of a particle emitted straight down the cone's axis
    pub velocity: Vec2,
    pub count: usize,
    /// Half-angle of the cone, radians
    pub spread: f32,
    pub color: Color,
    /// Lifetime in frames
    pub max_age: f32,
    /// Edge length of each particle square
    pub size: f32,
    /// Shared acceleration, units per frame²
    pub acceleration: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
}

/// A batch of particles sharing acceleration, color and lifespan
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleGroup {
    pub particles: Vec<Particle>,
    pub acceleration: Vec2,
    pub max_age: f32,
    pub age: f32,
    pub size: f32,
    pub color: Color,
}

impl ParticleGroup {
    /// Emit a cone-shaped burst
    ///
    /// Each velocity is the burst velocity rotated by a random angle within
    /// `±spread`, with its sideways component scaled by a random factor of
    /// up to 1.5.
    pub fn emit<R: Rng + ?Sized>(rng: &mut R, burst: Burst) -> Self {
        let axis = burst.velocity.normalize_or_zero();
        let side = axis.perp();

        let particles = (0..burst.count)
            .map(|_| {
                let angle = if burst.spread > 0.0 {
                    rng.random_range(-burst.spread..=burst.spread)
                } else {
                    0.0
                };
                let rotated = Vec2::from_angle(angle).rotate(burst.velocity);
                let along = rotated.dot(axis);
                let across = rotated.dot(side) * rng.random_range(0.0..=1.5);
                Particle {
                    pos: burst.origin,
                    vel: axis * along + side * across,
                }
            })
            .collect();

        Self {
            particles,
            acceleration: burst.acceleration,
            max_age: burst.max_age,
            age: 0.0,
            size: burst.size,
            color: burst.color,
        }
    }

    /// Fraction of life remaining, used as draw alpha
    pub fn alpha(&self) -> f32 {
        if self.max_age <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age / self.max_age).clamp(0.0, 1.0)
    }

    /// Integrate one tick; returns false once the group has expired
    pub fn step(&mut self, dt: f32) -> bool {
        for p in &mut self.particles {
            p.pos += p.vel * dt;
            p.vel += self.acceleration * dt;
        }
        self.age += dt;
        self.age < self.max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn burst(count: usize) -> Burst {
        Burst {
            origin: Vec2::new(10.0, 20.0),
            velocity: Vec2::new(0.0, -2.0),
            count,
            spread: 0.5,
            color: Color::rgb(120, 100, 80),
            max_age: 1000.0,
            size: 2.0,
            acceleration: Vec2::new(0.0, 0.1),
        }
    }

    #[test]
    fn test_group_expires_exactly_at_max_age() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut group = ParticleGroup::emit(&mut rng, burst(4));
        assert!(group.step(500.0));
        assert!(!group.step(500.0));
    }

    #[test]
    fn test_emit_count_and_origin() {
        let mut rng = Pcg32::seed_from_u64(1);
        let group = ParticleGroup::emit(&mut rng, burst(12));
        assert_eq!(group.particles.len(), 12);
        assert!(group.particles.iter().all(|p| p.pos == Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn test_emit_stays_inside_cone() {
        let mut rng = Pcg32::seed_from_u64(3);
        let group = ParticleGroup::emit(&mut rng, burst(64));
        for p in &group.particles {
            // Along the axis the speed never exceeds the base speed, and it
            // never points backwards for a half-angle under 90 degrees
            let along = -p.vel.y;
            assert!(along > 0.0 && along <= 2.0 + 1e-5);
            // Sideways: at most 1.5x the rotated component
            assert!(p.vel.x.abs() <= 2.0 * 0.5_f32.sin() * 1.5 + 1e-5);
        }
    }

    #[test]
    fn test_step_integrates_velocity_then_acceleration() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut group = ParticleGroup::emit(
            &mut rng,
            Burst {
                spread: 0.0,
                ..burst(1)
            },
        );
        group.step(2.0);
        let p = group.particles[0];
        assert_eq!(p.pos, Vec2::new(10.0, 16.0));
        assert!((p.vel.y - (-1.8)).abs() < 1e-6);
        assert!((group.alpha() - 0.998).abs() < 1e-6);
    }

    #[test]
    fn test_same_seed_same_burst() {
        let a = ParticleGroup::emit(&mut Pcg32::seed_from_u64(42), burst(8));
        let b = ParticleGroup::emit(&mut Pcg32::seed_from_u64(42), burst(8));
        assert_eq!(a, b);
    }
}
