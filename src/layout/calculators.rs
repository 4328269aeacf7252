//! The seven built-in arrangements
//!
//! Defaults match the values the scene was tuned with. Each calculator reports
//! the parameters it actually used so callers can see which defaults applied.

use std::cmp::Ordering;
use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{
    CameraPlacement, InteractionMode, LayoutCalculator, LayoutMode, LayoutParams, LayoutResult,
    ParamValue,
};
use crate::consts::{CONSTELLATION_MAX_ATTEMPTS, GOLDEN_RATIO, MIN_CAMERA_DISTANCE};
use crate::error::LayoutError;
use crate::transform::Transform;
use crate::{look_rotation, normalized_index, yaw_toward};

/// Column/row count for `count` items at the given aspect ratio
pub fn grid_dimensions(count: usize, aspect_ratio: f32) -> (usize, usize) {
    if count == 0 {
        return (0, 0);
    }
    let cols = ((count as f32 * aspect_ratio).sqrt().ceil() as usize).clamp(1, count);
    (cols, count.div_ceil(cols))
}

/// Rows of columns, centred on the origin
pub struct GridLayout;

impl LayoutCalculator for GridLayout {
    fn mode(&self) -> LayoutMode {
        LayoutMode::Grid
    }

    fn calculate(&self, item_count: usize, params: &LayoutParams) -> Result<LayoutResult, LayoutError> {
        let spacing = params.number("spacing", 3.0)?;
        let aspect_ratio = params.number("aspectRatio", 1.5)?;

        let (cols, rows) = grid_dimensions(item_count, aspect_ratio);
        let total_width = cols.saturating_sub(1) as f32 * spacing;
        let total_height = rows.saturating_sub(1) as f32 * spacing;

        let transforms = (0..item_count)
            .map(|i| {
                let col = i % cols;
                let row = i / cols;
                let x = col as f32 * spacing - total_width / 2.0;
                let y = -(row as f32 * spacing - total_height / 2.0);
                Transform::at(Vec3::new(x, y, 0.0))
            })
            .collect();

        let distance = (total_width.max(total_height) * 0.8).max(MIN_CAMERA_DISTANCE);

        Ok(LayoutResult {
            mode: LayoutMode::Grid,
            item_count,
            transforms,
            camera: CameraPlacement {
                position: Vec3::new(0.0, 0.0, distance),
                target: Vec3::ZERO,
                fov: 50.0,
            },
            params: LayoutParams::new()
                .with("spacing", spacing)
                .with("aspectRatio", aspect_ratio)
                .with("columns", cols)
                .with("rows", rows),
            interaction_mode: InteractionMode::Hover,
            physics_enabled: true,
        })
    }
}

/// Rising spiral around the vertical axis
pub struct SpiralLayout;

impl LayoutCalculator for SpiralLayout {
    fn mode(&self) -> LayoutMode {
        LayoutMode::Spiral
    }

    fn calculate(&self, item_count: usize, params: &LayoutParams) -> Result<LayoutResult, LayoutError> {
        let radius_start = params.number("radiusStart", 2.0)?;
        let radius_growth = params.number("radiusGrowth", 0.5)?;
        let height_growth = params.number("heightGrowth", 0.3)?;
        let rotations = params.number("rotations", 3.0)?;

        let n = item_count as f32;
        let angle_step = if item_count == 0 {
            0.0
        } else {
            TAU * rotations / n
        };

        let transforms = (0..item_count)
            .map(|i| {
                let t = normalized_index(i, item_count);
                let angle = i as f32 * angle_step;
                let radius = radius_start + t * radius_growth * n;
                let x = angle.cos() * radius;
                let y = t * height_growth * n - (height_growth * n) / 2.0;
                let z = angle.sin() * radius;
                let position = Vec3::new(x, y, z);
                let yaw = yaw_toward(position, Vec3::new(0.0, y, 0.0));
                Transform::at(position).with_rotation(Vec3::new(0.0, yaw, 0.0))
            })
            .collect();

        Ok(LayoutResult {
            mode: LayoutMode::Spiral,
            item_count,
            transforms,
            camera: CameraPlacement {
                position: Vec3::new(radius_start * 3.0, height_growth * n * 0.3, radius_start * 3.0),
                target: Vec3::ZERO,
                fov: 60.0,
            },
            params: LayoutParams::new()
                .with("radiusStart", radius_start)
                .with("radiusGrowth", radius_growth)
                .with("heightGrowth", height_growth)
                .with("rotations", rotations),
            interaction_mode: InteractionMode::Drag,
            physics_enabled: true,
        })
    }
}

/// Fibonacci sphere: near-uniform points on a sphere surface
pub struct SphereLayout;

impl LayoutCalculator for SphereLayout {
    fn mode(&self) -> LayoutMode {
        LayoutMode::Sphere
    }

    fn calculate(&self, item_count: usize, params: &LayoutParams) -> Result<LayoutResult, LayoutError> {
        let radius = params.number("radius", 8.0)?;
        let angle_increment = TAU * GOLDEN_RATIO;

        let transforms = (0..item_count)
            .map(|i| {
                let t = normalized_index(i, item_count);
                let inclination = (1.0 - 2.0 * t).clamp(-1.0, 1.0).acos();
                let azimuth = angle_increment * i as f32;

                let position = Vec3::new(
                    radius * inclination.sin() * azimuth.cos(),
                    radius * inclination.sin() * azimuth.sin(),
                    radius * inclination.cos(),
                );
                Transform::at(position)
                    .with_rotation(look_rotation(position, Vec3::ZERO))
                    .with_uniform_scale(0.8)
            })
            .collect();

        Ok(LayoutResult {
            mode: LayoutMode::Sphere,
            item_count,
            transforms,
            camera: CameraPlacement {
                position: Vec3::new(0.0, 0.0, radius * 2.0),
                target: Vec3::ZERO,
                fov: 50.0,
            },
            params: LayoutParams::new().with("radius", radius),
            interaction_mode: InteractionMode::Drag,
            physics_enabled: false,
        })
    }
}

/// Grid receding in depth with a sinusoidal height per column
pub struct WaveLayout;

impl LayoutCalculator for WaveLayout {
    fn mode(&self) -> LayoutMode {
        LayoutMode::Wave
    }

    fn calculate(&self, item_count: usize, params: &LayoutParams) -> Result<LayoutResult, LayoutError> {
        let spacing = params.number("spacing", 2.5)?;
        let amplitude = params.number("amplitude", 3.0)?;
        let frequency = params.number("frequency", 0.5)?;
        let phase = params.number("phase", 0.0)?;

        let (cols, rows) = grid_dimensions(item_count, 1.5);
        let total_width = cols.saturating_sub(1) as f32 * spacing;

        let transforms = (0..item_count)
            .map(|i| {
                let col = i % cols;
                let row = i / cols;
                let wave = (col as f32 * frequency + phase).sin();
                let x = col as f32 * spacing - total_width / 2.0;
                let z = -(row as f32 * spacing);
                Transform::at(Vec3::new(x, wave * amplitude, z))
                    .with_rotation(Vec3::new(0.0, 0.0, wave * 0.2))
            })
            .collect();

        Ok(LayoutResult {
            mode: LayoutMode::Wave,
            item_count,
            transforms,
            camera: CameraPlacement {
                position: Vec3::new(
                    0.0,
                    amplitude * 2.0,
                    (total_width * 0.8).max(MIN_CAMERA_DISTANCE),
                ),
                target: Vec3::new(0.0, 0.0, -(rows as f32 * spacing) / 2.0),
                fov: 50.0,
            },
            params: LayoutParams::new()
                .with("spacing", spacing)
                .with("amplitude", amplitude)
                .with("frequency", frequency)
                .with("phase", phase),
            interaction_mode: InteractionMode::Hover,
            physics_enabled: true,
        })
    }
}

/// Seeded scatter with a minimum spacing between points
pub struct ConstellationLayout;

impl LayoutCalculator for ConstellationLayout {
    fn mode(&self) -> LayoutMode {
        LayoutMode::Constellation
    }

    fn calculate(&self, item_count: usize, params: &LayoutParams) -> Result<LayoutResult, LayoutError> {
        let spread = params.number("spread", 15.0)?;
        let min_distance = params.number("minDistance", 2.0)?;
        let seed = params.seed("seed", 42)?;

        let mut rng = Pcg32::seed_from_u64(seed);
        let mut positions: Vec<Vec3> = Vec::with_capacity(item_count);
        let mut transforms = Vec::with_capacity(item_count);

        for _ in 0..item_count {
            // When every attempt is too close, the last candidate stands
            let mut position = Vec3::ZERO;
            for _ in 0..CONSTELLATION_MAX_ATTEMPTS {
                position = Vec3::new(
                    (rng.random::<f32>() - 0.5) * spread,
                    (rng.random::<f32>() - 0.5) * spread,
                    (rng.random::<f32>() - 0.5) * spread * 0.5,
                );
                let clearance = positions
                    .iter()
                    .map(|p| p.distance(position))
                    .fold(f32::INFINITY, f32::min);
                if clearance >= min_distance {
                    break;
                }
            }
            positions.push(position);

            let rotation = Vec3::new(
                (rng.random::<f32>() - 0.5) * 0.3,
                (rng.random::<f32>() - 0.5) * 0.3,
                (rng.random::<f32>() - 0.5) * 0.2,
            );
            transforms.push(Transform::at(position).with_rotation(rotation));
        }

        Ok(LayoutResult {
            mode: LayoutMode::Constellation,
            item_count,
            transforms,
            camera: CameraPlacement {
                position: Vec3::new(spread * 0.8, spread * 0.3, spread * 1.2),
                target: Vec3::ZERO,
                fov: 50.0,
            },
            params: LayoutParams::new()
                .with("spread", spread)
                .with("minDistance", min_distance)
                .with("seed", seed)
                .with("positions", positions),
            interaction_mode: InteractionMode::Drag,
            physics_enabled: true,
        })
    }
}

/// Ring of tiles; the current one is full size, others shrink with distance
pub struct CarouselLayout;

impl LayoutCalculator for CarouselLayout {
    fn mode(&self) -> LayoutMode {
        LayoutMode::Carousel
    }

    fn calculate(&self, item_count: usize, params: &LayoutParams) -> Result<LayoutResult, LayoutError> {
        let radius = params.number("radius", 12.0)?;
        let tilt = params.number("tilt", 0.2)?;
        let current_index = params.seed("currentIndex", 0)? as usize;

        let n = item_count.max(1);
        let current = current_index % n;
        let angle_step = TAU / n as f32;

        let transforms = (0..item_count)
            .map(|i| {
                let angle = i as f32 * angle_step;
                let position = Vec3::new(
                    angle.sin() * radius,
                    angle.sin() * tilt * 2.0,
                    angle.cos() * radius,
                );
                let offset = i.abs_diff(current);
                let circular_distance = offset.min(item_count - offset);
                let scale = 1.0 - (circular_distance as f32 / item_count as f32) * 0.3;
                Transform::at(position)
                    .with_rotation(Vec3::new(0.0, -angle + PI, 0.0))
                    .with_uniform_scale(scale)
            })
            .collect();

        Ok(LayoutResult {
            mode: LayoutMode::Carousel,
            item_count,
            transforms,
            camera: CameraPlacement {
                position: Vec3::new(0.0, 3.0, radius * 1.8),
                target: Vec3::ZERO,
                fov: 50.0,
            },
            params: LayoutParams::new()
                .with("radius", radius)
                .with("tilt", tilt)
                .with("currentIndex", current),
            interaction_mode: InteractionMode::Click,
            physics_enabled: false,
        })
    }
}

/// Gently bowed line with tiles alternating left and right
pub struct TimelineLayout;

impl LayoutCalculator for TimelineLayout {
    fn mode(&self) -> LayoutMode {
        LayoutMode::Timeline
    }

    fn calculate(&self, item_count: usize, params: &LayoutParams) -> Result<LayoutResult, LayoutError> {
        let spacing = params.number("spacing", 4.0)?;
        let curve = params.number("curve", 0.5)?;
        let dates = params.list("dates")?;

        let slots = timeline_slots(item_count, dates);
        let span = item_count.saturating_sub(1) as f32 * spacing;

        let transforms = slots
            .iter()
            .map(|&slot| {
                let t = normalized_index(slot, item_count);
                let side = if slot % 2 == 0 { 1.0 } else { -1.0 };
                let x = slot as f32 * spacing - span / 2.0 + side * 1.5;
                let y = (t * PI).sin() * curve;
                let z = -t * 2.0;
                Transform::at(Vec3::new(x, y, z))
                    .with_rotation(Vec3::new(0.0, side * 0.3, 0.0))
                    .with_uniform_scale(0.9)
            })
            .collect();

        let n = item_count as f32;
        Ok(LayoutResult {
            mode: LayoutMode::Timeline,
            item_count,
            transforms,
            camera: CameraPlacement {
                position: Vec3::new(
                    0.0,
                    curve * 3.0,
                    (n * spacing * 0.4).max(MIN_CAMERA_DISTANCE),
                ),
                target: Vec3::new(0.0, 0.0, -n),
                fov: 60.0,
            },
            params: LayoutParams::new()
                .with("spacing", spacing)
                .with("curve", curve)
                .with("dates", dates.to_vec()),
            interaction_mode: InteractionMode::Hover,
            physics_enabled: true,
        })
    }
}

/// Slot along the timeline for each item index.
///
/// Items are ordered by their date (numbers before strings, ISO strings sort
/// chronologically); items without a date keep index order after dated ones.
pub fn timeline_slots(item_count: usize, dates: &[ParamValue]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..item_count).collect();
    if !dates.is_empty() {
        order.sort_by(|&a, &b| compare_dates(dates.get(a), dates.get(b)));
    }

    let mut slots = vec![0; item_count];
    for (slot, &index) in order.iter().enumerate() {
        slots[index] = slot;
    }
    slots
}

fn compare_dates(a: Option<&ParamValue>, b: Option<&ParamValue>) -> Ordering {
    fn rank(value: Option<&ParamValue>) -> u8 {
        match value {
            Some(ParamValue::Number(_)) => 0,
            Some(ParamValue::Text(_)) => 1,
            _ => 2,
        }
    }
    match (a, b) {
        (Some(ParamValue::Number(x)), Some(ParamValue::Number(y))) => x.total_cmp(y),
        (Some(ParamValue::Text(x)), Some(ParamValue::Text(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
