/// Transient game objects and the per-tick filtering they share.
use rand::Rng;
use ratatui::style::Color;

use crate::core::geometry::Vec2;

/// Remaining ticks out of a fixed total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifetime {
    remaining: u32,
    total: u32,
}

impl Lifetime {
    pub fn new(ticks: u32) -> Self {
        Self { remaining: ticks, total: ticks }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// 1.0 when fresh, 0.0 when expired.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.remaining as f32 / self.total as f32
        }
    }
}

/// Anything the engine steps once per tick and drops once it is done.
pub trait Entity {
    /// Advances one tick.
    fn update(&mut self);

    /// False once the entity should leave the collection.
    fn alive(&self) -> bool;
}

/// Drops entities that were already dead, then steps the rest.
///
/// An entity whose lifetime hits zero during a tick is still present after it,
/// and is removed on the tick that follows.
pub fn update_all<E: Entity>(entities: &mut Vec<E>) {
    entities.retain_mut(|e| {
        if !e.alive() {
            return false;
        }
        e.update();
        true
    });
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub gravity: f32,
    pub size: f32,
    pub color: Color,
    pub life: Lifetime,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, life_ticks: u32, color: Color) -> Self {
        Self { pos, vel, gravity: 0.0, size: 4.0, color, life: Lifetime::new(life_ticks) }
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// Current size, shrinking with the remaining life.
    pub fn current_size(&self) -> f32 {
        self.size * self.life.fraction()
    }
}

impl Entity for Particle {
    fn update(&mut self) {
        self.pos += self.vel;
        self.vel.y += self.gravity;
        self.life.tick();
    }

    fn alive(&self) -> bool {
        !self.life.is_expired()
    }
}

/// A radial burst of `count` particles with random speed in `speed`.
pub fn burst<R: Rng>(
    rng: &mut R,
    at: Vec2,
    count: usize,
    speed: std::ops::Range<f32>,
    life_ticks: u32,
    color: Color,
) -> Vec<Particle> {
    (0..count)
        .map(|_| {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let s = rng.random_range(speed.clone());
            Particle::new(at, Vec2::new(angle.cos() * s, angle.sin() * s), life_ticks, color)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn lifetime_reaches_zero_then_entity_is_removed() {
        let mut particles = vec![Particle::new(Vec2::ZERO, Vec2::new(1.0, 0.0), 3, Color::White)];
        for _ in 0..3 {
            update_all(&mut particles);
        }
        assert_eq!(particles.len(), 1);
        assert_eq!(particles[0].life.remaining(), 0);
        update_all(&mut particles);
        assert!(particles.is_empty());
    }

    #[test]
    fn gravity_accumulates_into_velocity() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::ZERO, 10, Color::White).with_gravity(0.5);
        p.update();
        p.update();
        assert_eq!(p.pos, Vec2::new(0.0, 0.5));
        assert_eq!(p.vel, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn burst_spawns_requested_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let parts = burst(&mut rng, Vec2::new(5.0, 5.0), 12, 1.0..3.0, 20, Color::Red);
        assert_eq!(parts.len(), 12);
        assert!(parts.iter().all(|p| p.pos == Vec2::new(5.0, 5.0)));
    }
}
