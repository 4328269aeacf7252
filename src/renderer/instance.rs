//! Per-tile GPU instance records

use bytemuck::{Pod, Zeroable};

use crate::sim::TileState;

/// One tile as uploaded to an instance buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TileInstance {
    /// Column-major model matrix
    pub model: [[f32; 4]; 4],
    pub glow: f32,
    /// 1.0 when selected
    pub selected: f32,
    /// 1.0 when hovered
    pub hovered: f32,
    pub _pad: f32,
}

impl TileInstance {
    pub fn from_tile(tile: &TileState) -> Self {
        Self {
            model: tile.render_transform().matrix().to_cols_array_2d(),
            glow: tile.glow_intensity,
            selected: if tile.is_selected { 1.0 } else { 0.0 },
            hovered: if tile.is_hovered { 1.0 } else { 0.0 },
            _pad: 0.0,
        }
    }

    /// Raw bytes for a buffer upload
    pub fn as_bytes(instances: &[TileInstance]) -> &[u8] {
        bytemuck::cast_slice(instances)
    }
}
