//! Staggered layout transitions
//!
//! A transition tweens every tile's base transform from where it was when the
//! transition began to its layout slot. Tile `i` starts `i * stagger` seconds
//! late and morphs its geometry at that moment. The camera tweens over the
//! base duration.

use serde::{Deserialize, Serialize};

use super::state::{GeometryShape, TileState};
use crate::layout::{CameraPlacement, LayoutMode, LayoutResult};
use crate::renderer::Camera;
use crate::transform::Transform;

/// Easing curves (power2 is cubic, matching common tween libraries)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ease {
    Linear,
    Power2Out,
    Power2InOut,
}

impl Ease {
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power2Out => 1.0 - (1.0 - t).powi(3),
            Ease::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Eased progress of a tween that started `elapsed` seconds ago
fn progress(elapsed: f32, duration: f32, ease: Ease) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    ease.apply(elapsed / duration)
}

#[derive(Debug, Clone)]
struct TileTween {
    from: Transform,
    to: Transform,
    delay: f32,
    morphed: bool,
}

/// Outcome of asking for a new layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionRequest {
    Started { mode: LayoutMode, duration: f32 },
    /// Another transition was in flight (first one wins)
    Dropped,
}

/// Result of advancing a transition by one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionStep {
    /// Tiles whose geometry changed this frame
    pub morphed: Vec<usize>,
    pub finished: bool,
}

/// An in-flight transition to a layout
#[derive(Debug, Clone)]
pub struct Transition {
    pub layout: LayoutResult,
    pub duration: f32,
    pub stagger: f32,
    pub elapsed: f32,
    shape: GeometryShape,
    tweens: Vec<TileTween>,
    camera_from: CameraPlacement,
}

impl Transition {
    pub fn new(
        layout: LayoutResult,
        tiles: &[TileState],
        camera: &Camera,
        duration: f32,
        stagger: f32,
    ) -> Self {
        let tweens = tiles
            .iter()
            .zip(&layout.transforms)
            .enumerate()
            .map(|(i, (tile, to))| TileTween {
                from: tile.base,
                to: *to,
                delay: i as f32 * stagger,
                morphed: false,
            })
            .collect();

        Self {
            shape: GeometryShape::for_mode(layout.mode),
            layout,
            duration: duration.max(0.0),
            stagger,
            elapsed: 0.0,
            tweens,
            camera_from: camera.placement(),
        }
    }

    pub fn mode(&self) -> LayoutMode {
        self.layout.mode
    }

    /// Base duration plus the last tile's stagger delay
    pub fn total_duration(&self) -> f32 {
        self.duration + self.stagger * self.tweens.len().saturating_sub(1) as f32
    }

    /// Advance by `dt`, writing tile base transforms and the camera
    pub fn advance(&mut self, dt: f32, tiles: &mut [TileState], camera: &mut Camera) -> TransitionStep {
        self.elapsed += dt.max(0.0);
        let finished = self.elapsed >= self.total_duration();
        let mut step = TransitionStep {
            morphed: Vec::new(),
            finished,
        };

        for (i, (tween, tile)) in self.tweens.iter_mut().zip(tiles.iter_mut()).enumerate() {
            let local = self.elapsed - tween.delay;
            if local < 0.0 {
                continue;
            }
            if !tween.morphed {
                tween.morphed = true;
                if tile.morph_to_shape(self.shape) {
                    step.morphed.push(i);
                }
            }
            tile.base = if finished {
                tween.to
            } else {
                tween.from.lerp(&tween.to, progress(local, self.duration, Ease::Power2Out))
            };
        }

        let p = progress(self.elapsed, self.duration, Ease::Power2InOut);
        let to = self.layout.camera;
        camera.position = self.camera_from.position.lerp(to.position, p);
        camera.target = self.camera_from.target.lerp(to.target, p);
        camera.fov = self.camera_from.fov + (to.fov - self.camera_from.fov) * p;

        step
    }
}
