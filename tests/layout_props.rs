//! Property-based tests for layout calculators
//!
//! Validates layout invariants:
//! - One finite transform per item for every mode
//! - Constellation output depends only on its seed
//! - Sphere tiles sit on the requested radius
//! - Packed tiles never share a cell

use std::collections::HashSet;

use proptest::prelude::*;
use tilescape::layout::{PackingParams, TileFootprint, pack_tiles};
use tilescape::{LayoutMode, LayoutParams, LayoutRegistry};

fn any_mode() -> impl Strategy<Value = LayoutMode> {
    prop_oneof![
        Just(LayoutMode::Grid),
        Just(LayoutMode::Spiral),
        Just(LayoutMode::Sphere),
        Just(LayoutMode::Wave),
        Just(LayoutMode::Constellation),
        Just(LayoutMode::Carousel),
        Just(LayoutMode::Timeline),
    ]
}

proptest! {
    /// Property: transform count equals item count and every value is finite
    #[test]
    fn every_mode_yields_finite_transforms(mode in any_mode(), count in 0usize..80) {
        let registry = LayoutRegistry::new();
        let result = registry.calculate(mode.as_str(), count, &LayoutParams::new()).unwrap();

        prop_assert_eq!(result.transforms.len(), count);
        prop_assert_eq!(result.mode, mode);
        for transform in &result.transforms {
            prop_assert!(transform.is_finite(), "{:?} produced {:?}", mode, transform);
        }
        prop_assert!(result.camera.position.is_finite());
    }

    /// Property: constellation is a pure function of (count, params)
    #[test]
    fn constellation_is_deterministic(seed in 0u64..10_000, count in 1usize..40) {
        let registry = LayoutRegistry::new();
        let params = LayoutParams::new().with("seed", seed);
        let a = registry.calculate("constellation", count, &params).unwrap();
        let b = registry.calculate("constellation", count, &params).unwrap();
        prop_assert_eq!(a.transforms, b.transforms);
    }

    /// Property: sphere tiles lie on the sphere surface
    #[test]
    fn sphere_tiles_on_radius(radius in 1.0f32..30.0, count in 1usize..60) {
        let registry = LayoutRegistry::new();
        let params = LayoutParams::new().with("radius", radius);
        let result = registry.calculate("sphere", count, &params).unwrap();
        for transform in &result.transforms {
            let r = transform.position.length();
            prop_assert!((r - radius).abs() < 1e-3 * radius, "r = {} for radius {}", r, radius);
        }
    }

    /// Property: grid has room for every item
    #[test]
    fn grid_fits_all_items(count in 1usize..100, aspect in 0.5f32..4.0) {
        let registry = LayoutRegistry::new();
        let params = LayoutParams::new().with("aspectRatio", aspect);
        let result = registry.calculate("grid", count, &params).unwrap();
        let columns = result.params.number("columns", 0.0).unwrap() as usize;
        let rows = result.params.number("rows", 0.0).unwrap() as usize;
        prop_assert!(columns * rows >= count);
        prop_assert!(columns >= 1 && columns <= count);
    }

    /// Property: packing never overlaps and stays inside the columns
    #[test]
    fn packing_has_no_overlap(
        sizes in prop::collection::vec((1u32..4, 1u32..4), 0..30),
        columns in 3u32..8,
    ) {
        let tiles: Vec<TileFootprint> = sizes
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| TileFootprint::new(format!("t{i}"), w, h))
            .collect();
        let params = PackingParams { columns, ..PackingParams::default() };
        let packed = pack_tiles(&tiles, &params).unwrap();

        prop_assert_eq!(packed.len(), tiles.len());
        let mut cells = HashSet::new();
        for tile in &packed {
            prop_assert!(tile.col + tile.footprint.w <= columns);
            for r in tile.row..tile.row + tile.footprint.h {
                for c in tile.col..tile.col + tile.footprint.w {
                    prop_assert!(cells.insert((c, r)));
                }
            }
        }
    }
}
