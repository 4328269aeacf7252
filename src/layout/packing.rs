//! Multi-cell tile packing
//!
//! Places tiles with varying footprints (in grid cells) into a fixed number of
//! columns. Large tiles are placed first so they get the best spots; each tile
//! takes the first free slot scanning rows top-down, columns left-to-right.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// A tile's footprint in grid cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileFootprint {
    pub id: String,
    /// Width in columns
    pub w: u32,
    /// Height in rows
    pub h: u32,
}

impl TileFootprint {
    pub fn new(id: impl Into<String>, w: u32, h: u32) -> Self {
        Self {
            id: id.into(),
            w: w.max(1),
            h: h.max(1),
        }
    }

    fn area(&self) -> u32 {
        self.w * self.h
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackingParams {
    pub columns: u32,
    /// World units for one grid cell
    pub cell_size: f32,
    /// Space between cells in world units
    pub gutter: f32,
}

impl Default for PackingParams {
    fn default() -> Self {
        Self {
            columns: 4,
            cell_size: 2.0,
            gutter: 0.5,
        }
    }
}

/// A packed tile with its grid cell and world-space centre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackedTile {
    pub footprint: TileFootprint,
    pub col: u32,
    pub row: u32,
    pub center: Vec2,
}

/// Occupancy grid that grows downward as rows are needed
struct Occupancy {
    columns: u32,
    rows: Vec<Vec<bool>>,
}

impl Occupancy {
    fn new(columns: u32) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    fn ensure_row(&mut self, row: u32) {
        while self.rows.len() <= row as usize {
            self.rows.push(vec![false; self.columns as usize]);
        }
    }

    fn can_place(&mut self, col: u32, row: u32, w: u32, h: u32) -> bool {
        if col + w > self.columns {
            return false;
        }
        self.ensure_row(row + h - 1);
        (row..row + h).all(|r| (col..col + w).all(|c| !self.rows[r as usize][c as usize]))
    }

    fn occupy(&mut self, col: u32, row: u32, w: u32, h: u32) {
        self.ensure_row(row + h - 1);
        for r in row..row + h {
            for c in col..col + w {
                self.rows[r as usize][c as usize] = true;
            }
        }
    }
}

/// Pack tiles into `params.columns` columns.
///
/// Output is in placement order (largest area first, ties keep input order).
/// Rows go downward (negative y); x is centred on the grid's width.
pub fn pack_tiles(tiles: &[TileFootprint], params: &PackingParams) -> Result<Vec<PackedTile>, LayoutError> {
    // Deserialized footprints skip `new`, so re-apply its 1x1 floor
    let tiles: Vec<TileFootprint> = tiles
        .iter()
        .map(|t| TileFootprint::new(t.id.clone(), t.w, t.h))
        .collect();
    if let Some(tile) = tiles.iter().find(|t| t.w > params.columns) {
        return Err(LayoutError::TileTooWide {
            id: tile.id.clone(),
            width: tile.w,
            columns: params.columns,
        });
    }

    let mut sorted: Vec<&TileFootprint> = tiles.iter().collect();
    sorted.sort_by_key(|t| std::cmp::Reverse(t.area()));

    let pitch = params.cell_size + params.gutter;
    let half_width = params.columns as f32 * pitch / 2.0;
    let mut grid = Occupancy::new(params.columns);
    let mut packed = Vec::with_capacity(tiles.len());

    for tile in sorted {
        let mut row = 0;
        let (col, row) = loop {
            if let Some(col) = (0..=params.columns - tile.w).find(|&c| grid.can_place(c, row, tile.w, tile.h)) {
                break (col, row);
            }
            row += 1;
        };
        grid.occupy(col, row, tile.w, tile.h);

        let x = (col as f32 + tile.w as f32 / 2.0) * pitch - half_width;
        let y = -(row as f32 + tile.h as f32 / 2.0) * pitch;
        packed.push(PackedTile {
            footprint: tile.clone(),
            col,
            row,
            center: Vec2::new(x, y),
        });
    }

    Ok(packed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_tiles_placed_first() {
        let tiles = vec![
            TileFootprint::new("a", 1, 1),
            TileFootprint::new("b", 2, 2),
            TileFootprint::new("c", 1, 1),
        ];
        let params = PackingParams {
            columns: 3,
            cell_size: 1.0,
            gutter: 0.0,
        };
        let packed = pack_tiles(&tiles, &params).unwrap();

        assert_eq!(packed[0].footprint.id, "b");
        assert_eq!((packed[0].col, packed[0].row), (0, 0));
        // Small tiles fill the column beside the big one
        assert_eq!((packed[1].col, packed[1].row), (2, 0));
        assert_eq!((packed[2].col, packed[2].row), (2, 1));
    }

    #[test]
    fn test_no_overlap() {
        let tiles: Vec<TileFootprint> = (0..12)
            .map(|i| TileFootprint::new(format!("t{i}"), 1 + i % 2, 1 + (i / 3) % 2))
            .collect();
        let packed = pack_tiles(&tiles, &PackingParams::default()).unwrap();

        let mut cells = std::collections::HashSet::new();
        for tile in &packed {
            for r in tile.row..tile.row + tile.footprint.h {
                for c in tile.col..tile.col + tile.footprint.w {
                    assert!(cells.insert((c, r)), "cell ({c}, {r}) used twice");
                }
            }
        }
    }

    #[test]
    fn test_world_coordinates_centred() {
        let params = PackingParams {
            columns: 2,
            cell_size: 2.0,
            gutter: 0.0,
        };
        let packed = pack_tiles(&[TileFootprint::new("wide", 2, 1)], &params).unwrap();
        assert!((packed[0].center - Vec2::new(0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn test_too_wide_is_rejected() {
        let err = pack_tiles(&[TileFootprint::new("x", 5, 1)], &PackingParams::default()).unwrap_err();
        assert!(matches!(err, LayoutError::TileTooWide { width: 5, columns: 4, .. }));
    }

    #[test]
    fn test_zero_sized_footprint_packs_as_one_cell() {
        let tile: TileFootprint = serde_json::from_str(r#"{"id":"z","w":0,"h":0}"#).unwrap();
        assert_eq!(tile.w, 0);
        let packed = pack_tiles(&[tile], &PackingParams::default()).unwrap();
        assert_eq!(packed.len(), 1);
        assert_eq!((packed[0].col, packed[0].row), (0, 0));
        assert_eq!((packed[0].footprint.w, packed[0].footprint.h), (1, 1));
    }
}
