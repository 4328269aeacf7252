//! Name → calculator lookup over the closed set of layout modes

use super::calculators::{
    CarouselLayout, ConstellationLayout, GridLayout, SphereLayout, SpiralLayout, TimelineLayout,
    WaveLayout,
};
use super::{LayoutCalculator, LayoutMode, LayoutParams, LayoutResult};
use crate::error::LayoutError;

static GRID: GridLayout = GridLayout;
static SPIRAL: SpiralLayout = SpiralLayout;
static SPHERE: SphereLayout = SphereLayout;
static WAVE: WaveLayout = WaveLayout;
static CONSTELLATION: ConstellationLayout = ConstellationLayout;
static CAROUSEL: CarouselLayout = CarouselLayout;
static TIMELINE: TimelineLayout = TimelineLayout;

/// Static registry of every supported layout. There is no plugin mechanism:
/// the set of modes is exactly `LayoutMode::ALL`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutRegistry;

impl LayoutRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Calculator for a mode
    pub fn calculator(&self, mode: LayoutMode) -> &'static dyn LayoutCalculator {
        match mode {
            LayoutMode::Grid => &GRID,
            LayoutMode::Spiral => &SPIRAL,
            LayoutMode::Sphere => &SPHERE,
            LayoutMode::Wave => &WAVE,
            LayoutMode::Constellation => &CONSTELLATION,
            LayoutMode::Carousel => &CAROUSEL,
            LayoutMode::Timeline => &TIMELINE,
        }
    }

    /// Resolve a mode by name; unknown names are an error, never a fallback
    pub fn lookup(&self, name: &str) -> Result<&'static dyn LayoutCalculator, LayoutError> {
        let mode: LayoutMode = name.parse()?;
        Ok(self.calculator(mode))
    }

    /// Calculate a layout by mode name
    pub fn calculate(
        &self,
        name: &str,
        item_count: usize,
        params: &LayoutParams,
    ) -> Result<LayoutResult, LayoutError> {
        self.lookup(name)?.calculate(item_count, params)
    }

    /// Names of all registered layouts
    pub fn available(&self) -> Vec<&'static str> {
        LayoutMode::ALL.iter().map(LayoutMode::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mode_resolves_to_its_calculator() {
        let registry = LayoutRegistry::new();
        for name in registry.available() {
            let calculator = registry.lookup(name).unwrap();
            assert_eq!(calculator.mode().as_str(), name);
        }
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let registry = LayoutRegistry::new();
        let err = registry
            .calculate("exploded", 4, &LayoutParams::new())
            .unwrap_err();
        assert_eq!(err, LayoutError::UnknownMode("exploded".to_string()));
    }

    #[test]
    fn test_transform_count_matches_item_count() {
        let registry = LayoutRegistry::new();
        for name in registry.available() {
            for count in [0, 1, 2, 50] {
                let result = registry.calculate(name, count, &LayoutParams::new()).unwrap();
                assert_eq!(result.transforms.len(), count, "{name} with {count} items");
                assert_eq!(result.item_count, count);
            }
        }
    }
}
