//! Inter-tile forces
//!
//! All forces read a snapshot of tile positions taken before any are applied,
//! so results do not depend on tile order. Magnetic attraction and pointer
//! repulsion add to tile velocity; flocking moves each tile's target by a
//! bounded offset from its base so layouts stay recognisable. Magnetic and
//! repulsion impulses feed the per-frame tile springs. Flock velocities are in
//! units per second and are integrated over `dt`, so the swarm drifts at the
//! same pace whatever the frame rate.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{PointerState, TileState};
use crate::consts::SIM_DT;
use crate::settings::ForceSettings;

/// Flocking state for one tile
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlockAgent {
    pub velocity: Vec3,
    pub offset: Vec3,
}

#[derive(Debug)]
pub struct InteractionForces {
    enabled: bool,
    agents: Vec<FlockAgent>,
    rng: Pcg32,
}

impl InteractionForces {
    pub fn new(seed: u64, enabled: bool) -> Self {
        Self {
            enabled,
            agents: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Toggle all forces; disabling drops any flocking offsets
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            log::info!("Interaction forces {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
        if !enabled {
            self.reset();
        }
    }

    /// Zero every agent (on load or layout change)
    pub fn reset(&mut self) {
        self.agents.iter_mut().for_each(|a| *a = FlockAgent::default());
    }

    pub fn agents(&self) -> &[FlockAgent] {
        &self.agents
    }

    /// Apply one frame of forces. Targets must already equal bases.
    pub fn apply(&mut self, tiles: &mut [TileState], pointer: &PointerState, settings: &ForceSettings, dt: f32) {
        if self.agents.len() != tiles.len() {
            self.agents.resize(tiles.len(), FlockAgent::default());
        }

        let positions: Vec<Vec3> = tiles.iter().map(|t| t.visible.position).collect();
        let mut impulses = vec![Vec3::ZERO; tiles.len()];

        if settings.magnetic {
            magnetic_impulses(&positions, settings, &mut impulses);
        }
        if settings.repulsion && pointer.present {
            let radius = if pointer.is_down {
                settings.repulsion_radius_held
            } else {
                settings.repulsion_radius
            };
            let strength = if pointer.is_down {
                settings.repulsion_strength_held
            } else {
                settings.repulsion_strength
            };
            for (i, tile) in tiles.iter().enumerate() {
                if tile.is_dragged {
                    continue;
                }
                let away = positions[i] - pointer.world;
                let d = away.length();
                if d < radius && d > 0.0 {
                    impulses[i] += away / d * strength / d.max(settings.repulsion_min_distance);
                }
            }
        }
        if settings.flocking {
            self.flock(&positions, settings, dt);
        }

        for ((tile, impulse), agent) in tiles.iter_mut().zip(impulses).zip(&self.agents) {
            if !tile.is_dragged {
                tile.velocity += impulse;
            }
            if settings.flocking {
                tile.target.position = tile.base.position + agent.offset;
            }
        }
    }

    fn flock(&mut self, positions: &[Vec3], settings: &ForceSettings, dt: f32) {
        // Steering gains and damping are calibrated per 60 Hz frame
        let frames = dt / SIM_DT;
        let damping = settings.flock_damping.powf(frames);
        let velocities: Vec<Vec3> = self.agents.iter().map(|a| a.velocity).collect();

        for (i, agent) in self.agents.iter_mut().enumerate() {
            let mut separation = Vec3::ZERO;
            let mut center = Vec3::ZERO;
            let mut heading = Vec3::ZERO;
            let mut neighbors = 0;

            for (j, &other) in positions.iter().enumerate() {
                if i == j {
                    continue;
                }
                let d = positions[i].distance(other);
                if d < settings.neighbor_radius && d > 0.0 {
                    // Closer neighbours push harder
                    let weight = (settings.neighbor_radius - d) / settings.neighbor_radius;
                    separation += (positions[i] - other) / d * weight;
                    center += other;
                    heading += velocities[j];
                    neighbors += 1;
                }
            }

            let mut steer = Vec3::ZERO;
            if neighbors > 0 {
                let n = neighbors as f32;
                steer += separation * settings.separation_strength;
                steer += (center / n - positions[i]) * settings.cohesion_strength;
                steer += (heading / n - agent.velocity) * settings.alignment_strength;
            }
            let jitter = Vec3::new(
                self.rng.random_range(-1.0..1.0),
                self.rng.random_range(-1.0..1.0),
                self.rng.random_range(-1.0..1.0),
            ) * settings.jitter;

            agent.velocity = ((agent.velocity + (steer + jitter) * frames) * damping)
                .clamp_length_max(settings.max_flock_speed);
            agent.offset = (agent.offset + agent.velocity * dt).clamp_length_max(settings.max_offset);
        }
    }
}

fn magnetic_impulses(positions: &[Vec3], settings: &ForceSettings, impulses: &mut [Vec3]) {
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let delta = positions[j] - positions[i];
            let d = delta.length();
            if d < settings.magnetic_min_distance || d > settings.magnetic_range {
                continue;
            }
            let pull = delta / d * settings.magnetic_strength / d;
            impulses[i] += pull;
            impulses[j] -= pull;
        }
    }
}
