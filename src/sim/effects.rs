//! Decorative effects: pointer trail particles and connection lines

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Trail life lost per second
const TRAIL_DECAY: f32 = 2.0;
/// Downward drift applied to trail particles (units/s^2)
const TRAIL_GRAVITY: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailParticle {
    pub pos: Vec3,
    pub vel: Vec3,
    /// 1.0 when emitted, dead at 0.0
    pub life: f32,
}

/// Fixed-capacity ring of trail particles (oldest overwritten first)
#[derive(Debug, Clone)]
pub struct PointerTrail {
    particles: Vec<TrailParticle>,
    capacity: usize,
    next: usize,
}

impl PointerTrail {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
            next: 0,
        }
    }

    pub fn emit(&mut self, pos: Vec3, vel: Vec3) {
        if self.capacity == 0 {
            return;
        }
        let particle = TrailParticle { pos, vel, life: 1.0 };
        if self.particles.len() < self.capacity {
            self.particles.push(particle);
        } else {
            self.particles[self.next] = particle;
        }
        self.next = (self.next + 1) % self.capacity;
    }

    pub fn update(&mut self, dt: f32) {
        for p in self.particles.iter_mut().filter(|p| p.life > 0.0) {
            p.pos += p.vel * dt;
            p.vel.y -= TRAIL_GRAVITY * dt;
            p.life = (p.life - TRAIL_DECAY * dt).max(0.0);
        }
    }

    /// Live particles, in storage order
    pub fn alive(&self) -> impl Iterator<Item = &TrailParticle> {
        self.particles.iter().filter(|p| p.life > 0.0)
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.next = 0;
    }
}

/// Pairs of points closer than `max_distance`, nearest pairs first, capped at
/// `max_lines`
pub fn connection_lines(positions: &[Vec3], max_distance: f32, max_lines: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let d = positions[i].distance(positions[j]);
            if d <= max_distance {
                pairs.push((d, i, j));
            }
        }
    }
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    pairs.into_iter().take(max_lines).map(|(_, i, j)| (i, j)).collect()
}
