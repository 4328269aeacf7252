//! Drag tracking and throw velocity

use std::collections::VecDeque;

use glam::Vec3;

use super::state::TileId;

/// An in-progress drag of one tile on a plane of constant z
#[derive(Debug, Clone)]
pub struct DragTracker {
    pub tile: TileId,
    /// Tile position minus the grab point
    offset: Vec3,
    /// z of the drag plane (the tile's depth at grab time)
    pub plane_z: f32,
    /// Recent tile positions, oldest first
    history: VecDeque<Vec3>,
    capacity: usize,
}

impl DragTracker {
    /// Begin a drag; `grab_point` is where the pointer ray met the drag plane
    pub fn begin(tile: TileId, tile_position: Vec3, grab_point: Vec3, capacity: usize) -> Self {
        let capacity = capacity.max(2);
        let mut history = VecDeque::with_capacity(capacity);
        history.push_back(tile_position);
        Self {
            tile,
            offset: tile_position - grab_point,
            plane_z: tile_position.z,
            history,
            capacity,
        }
    }

    /// Record a pointer position on the drag plane; returns the new tile position
    pub fn update(&mut self, pointer_on_plane: Vec3) -> Vec3 {
        let position = pointer_on_plane + self.offset;
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(position);
        position
    }

    pub fn current(&self) -> Option<Vec3> {
        self.history.back().copied()
    }

    /// Throw velocity: (newest - oldest) sample scaled by `multiplier`
    pub fn throw_velocity(&self, multiplier: f32) -> Vec3 {
        match (self.history.front(), self.history.back()) {
            (Some(oldest), Some(newest)) if self.history.len() >= 2 => (*newest - *oldest) * multiplier,
            _ => Vec3::ZERO,
        }
    }
}
