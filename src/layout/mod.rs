//! Layout calculators
//!
//! Every arrangement is a pure function of `(mode, item_count, params)`:
//! - No scene or renderer access
//! - Seeded RNG only (constellation)
//! - `transforms.len() == item_count`, including zero

pub mod calculators;
pub mod packing;
pub mod registry;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::LayoutError;
use crate::transform::Transform;

pub use calculators::{
    CarouselLayout, ConstellationLayout, GridLayout, SphereLayout, SpiralLayout, TimelineLayout,
    WaveLayout,
};
pub use packing::{PackedTile, PackingParams, TileFootprint, pack_tiles};
pub use registry::LayoutRegistry;

/// Named arrangement (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Grid,
    Spiral,
    Sphere,
    Wave,
    Constellation,
    Carousel,
    Timeline,
}

impl LayoutMode {
    pub const ALL: [LayoutMode; 7] = [
        LayoutMode::Grid,
        LayoutMode::Spiral,
        LayoutMode::Sphere,
        LayoutMode::Wave,
        LayoutMode::Constellation,
        LayoutMode::Carousel,
        LayoutMode::Timeline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Grid => "grid",
            LayoutMode::Spiral => "spiral",
            LayoutMode::Sphere => "sphere",
            LayoutMode::Wave => "wave",
            LayoutMode::Constellation => "constellation",
            LayoutMode::Carousel => "carousel",
            LayoutMode::Timeline => "timeline",
        }
    }
}

impl FromStr for LayoutMode {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayoutMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| LayoutError::UnknownMode(s.to_string()))
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pointer interaction a layout recommends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    #[default]
    Hover,
    Drag,
    Click,
    None,
}

/// Where the camera should sit for a layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPlacement {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view (degrees)
    pub fov: f32,
}

impl CameraPlacement {
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }
}

/// A single layout parameter value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
    Points(Vec<Vec3>),
    List(Vec<ParamValue>),
}

/// JSON shape of a parameter before arrays are classified
#[derive(Deserialize)]
#[serde(untagged)]
enum RawParam {
    Number(f64),
    Text(String),
    List(Vec<RawParam>),
}

impl From<RawParam> for ParamValue {
    fn from(raw: RawParam) -> Self {
        match raw {
            RawParam::Number(v) => ParamValue::Number(v),
            RawParam::Text(s) => ParamValue::Text(s),
            RawParam::List(items) => match as_points(&items) {
                Some(points) => ParamValue::Points(points),
                None => ParamValue::List(items.into_iter().map(ParamValue::from).collect()),
            },
        }
    }
}

/// A non-empty array made only of `[x, y, z]` number triples
fn as_points(items: &[RawParam]) -> Option<Vec<Vec3>> {
    if items.is_empty() {
        return None;
    }
    items
        .iter()
        .map(|item| match item {
            RawParam::List(xyz) => match xyz.as_slice() {
                [RawParam::Number(x), RawParam::Number(y), RawParam::Number(z)] => {
                    Some(Vec3::new(*x as f32, *y as f32, *z as f32))
                }
                _ => None,
            },
            _ => None,
        })
        .collect()
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawParam::deserialize(deserializer).map(ParamValue::from)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Number(v as f64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Number(v as f64)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Number(v as f64)
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::Number(v as f64)
    }
}

impl From<u64> for ParamValue {
    fn from(v: u64) -> Self {
        ParamValue::Number(v as f64)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl From<Vec<Vec3>> for ParamValue {
    fn from(v: Vec<Vec3>) -> Self {
        ParamValue::Points(v)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(v: Vec<ParamValue>) -> Self {
        ParamValue::List(v)
    }
}

/// String-keyed layout parameters; missing keys fall back to per-mode defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutParams(BTreeMap<String, ParamValue>);

impl LayoutParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<ParamValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Numeric parameter, or `default` when absent
    pub fn number(&self, key: &str, default: f32) -> Result<f32, LayoutError> {
        match self.0.get(key) {
            None => Ok(default),
            Some(ParamValue::Number(v)) => Ok(*v as f32),
            Some(_) => Err(LayoutError::InvalidParam {
                key: key.to_string(),
                expected: "number",
            }),
        }
    }

    /// Integer seed parameter, or `default` when absent
    pub fn seed(&self, key: &str, default: u64) -> Result<u64, LayoutError> {
        match self.0.get(key) {
            None => Ok(default),
            Some(ParamValue::Number(v)) if *v >= 0.0 => Ok(*v as u64),
            Some(_) => Err(LayoutError::InvalidParam {
                key: key.to_string(),
                expected: "non-negative number",
            }),
        }
    }

    /// List parameter, empty when absent
    pub fn list(&self, key: &str) -> Result<&[ParamValue], LayoutError> {
        match self.0.get(key) {
            None => Ok(&[]),
            Some(ParamValue::List(items)) => Ok(items),
            Some(ParamValue::Points(points)) if points.is_empty() => Ok(&[]),
            Some(_) => Err(LayoutError::InvalidParam {
                key: key.to_string(),
                expected: "list",
            }),
        }
    }

    /// Point list parameter (e.g. constellation positions)
    pub fn points(&self, key: &str) -> Option<&[Vec3]> {
        match self.0.get(key) {
            Some(ParamValue::Points(points)) => Some(points),
            Some(ParamValue::List(items)) if items.is_empty() => Some(&[]),
            _ => None,
        }
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for LayoutParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Output of a layout calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub mode: LayoutMode,
    pub item_count: usize,
    /// One transform per item, index-aligned to tile order
    pub transforms: Vec<Transform>,
    pub camera: CameraPlacement,
    /// Parameters actually used (defaults filled in)
    pub params: LayoutParams,
    pub interaction_mode: InteractionMode,
    /// Whether spring/force physics should stay active in this mode
    pub physics_enabled: bool,
}

/// A pure layout function for one mode
pub trait LayoutCalculator: Send + Sync {
    fn mode(&self) -> LayoutMode;

    fn calculate(&self, item_count: usize, params: &LayoutParams)
    -> Result<LayoutResult, LayoutError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trips_through_name() {
        for mode in LayoutMode::ALL {
            assert_eq!(mode.as_str().parse::<LayoutMode>(), Ok(mode));
        }
    }

    #[test]
    fn test_unknown_mode_name() {
        let err = "stack".parse::<LayoutMode>().unwrap_err();
        assert_eq!(err, LayoutError::UnknownMode("stack".into()));
        assert_eq!(err.to_string(), "layout calculator not found: stack");
    }

    #[test]
    fn test_params_defaults_and_type_errors() {
        let params = LayoutParams::new().with("spacing", 3).with("label", "wide");
        assert_eq!(params.number("spacing", 1.0), Ok(3.0));
        assert_eq!(params.number("radius", 8.0), Ok(8.0));
        assert!(matches!(
            params.number("label", 1.0),
            Err(LayoutError::InvalidParam { .. })
        ));
        assert!(params.list("dates").unwrap().is_empty());

        let result = LayoutRegistry::new().calculate("timeline", 3, &params).unwrap();
        assert_eq!(result.transforms.len(), 3);
    }

    #[test]
    fn test_params_from_json() {
        let params: LayoutParams =
            serde_json::from_str(r#"{"spacing": 3, "dates": ["2024-01-01", 5]}"#).unwrap();
        assert_eq!(params.number("spacing", 0.0), Ok(3.0));
        assert_eq!(params.list("dates").unwrap().len(), 2);
    }

    #[test]
    fn test_empty_array_is_an_empty_list() {
        let params: LayoutParams = serde_json::from_str(r#"{"dates": []}"#).unwrap();
        assert_eq!(params.get("dates"), Some(&ParamValue::List(Vec::new())));
        assert!(params.list("dates").unwrap().is_empty());
    }

    #[test]
    fn test_point_arrays_from_json() {
        let params: LayoutParams =
            serde_json::from_str(r#"{"positions": [[1, 2, 3], [4.5, 5, 6]], "mixed": [[1, 2, 3], 4]}"#)
                .unwrap();
        assert_eq!(
            params.points("positions"),
            Some(&[Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.5, 5.0, 6.0)][..])
        );
        assert_eq!(params.list("mixed").unwrap().len(), 2);
    }

    #[test]
    fn test_resolved_params_survive_json() {
        let registry = LayoutRegistry::new();
        for name in ["timeline", "constellation", "grid"] {
            let result = registry.calculate(name, 5, &LayoutParams::new()).unwrap();
            let json = serde_json::to_string(&result.params).unwrap();
            let back: LayoutParams = serde_json::from_str(&json).unwrap();
            assert_eq!(back, result.params, "{name}: {json}");
        }
    }
}
