//! Renderer binding
//!
//! The scene drives any renderer through `RenderBinding`: it creates one
//! object per tile, pushes transforms and geometry changes, and positions the
//! camera. `HeadlessRenderer` records those calls for the demo and tests.

pub mod camera;
pub mod instance;

use std::collections::BTreeMap;

use glam::Vec3;

pub use camera::{Camera, pixel_to_ndc};
pub use instance::TileInstance;

use crate::content::ContentItem;
use crate::sim::effects::TrailParticle;
use crate::sim::{GeometryShape, TileId};
use crate::transform::Transform;

/// Operations the scene needs from a renderer
pub trait RenderBinding {
    fn create_tile(&mut self, id: &TileId, item: &ContentItem, shape: GeometryShape);

    fn destroy_tile(&mut self, id: &TileId);

    fn set_transform(&mut self, id: &TileId, transform: &Transform);

    /// Replace a tile's geometry (`extents` at unit scale)
    fn set_shape(&mut self, id: &TileId, shape: GeometryShape, extents: Vec3);

    fn set_camera(&mut self, camera: &Camera);

    /// Per-frame instance data, index-aligned with tile order
    fn upload_instances(&mut self, _instances: &[TileInstance]) {}

    fn draw_effects(&mut self, _trail: &[TrailParticle], _lines: &[(Vec3, Vec3)]) {}
}

/// What the headless renderer knows about one tile
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessObject {
    pub title: String,
    pub shape: GeometryShape,
    pub transform: Transform,
}

/// Renderer that only records state
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    pub objects: BTreeMap<TileId, HeadlessObject>,
    pub camera: Option<Camera>,
    pub instances: Vec<TileInstance>,
    pub trail_len: usize,
    pub line_count: usize,
    pub shape_changes: usize,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(&self, id: &TileId) -> Option<&HeadlessObject> {
        self.objects.get(id)
    }
}

impl RenderBinding for HeadlessRenderer {
    fn create_tile(&mut self, id: &TileId, item: &ContentItem, shape: GeometryShape) {
        self.objects.insert(
            id.clone(),
            HeadlessObject {
                title: item.title.clone(),
                shape,
                transform: Transform::IDENTITY,
            },
        );
    }

    fn destroy_tile(&mut self, id: &TileId) {
        self.objects.remove(id);
    }

    fn set_transform(&mut self, id: &TileId, transform: &Transform) {
        if let Some(object) = self.objects.get_mut(id) {
            object.transform = *transform;
        }
    }

    fn set_shape(&mut self, id: &TileId, shape: GeometryShape, _extents: Vec3) {
        if let Some(object) = self.objects.get_mut(id) {
            object.shape = shape;
            self.shape_changes += 1;
        }
    }

    fn set_camera(&mut self, camera: &Camera) {
        self.camera = Some(*camera);
    }

    fn upload_instances(&mut self, instances: &[TileInstance]) {
        self.instances.clear();
        self.instances.extend_from_slice(instances);
    }

    fn draw_effects(&mut self, trail: &[TrailParticle], lines: &[(Vec3, Vec3)]) {
        self.trail_len = trail.len();
        self.line_count = lines.len();
    }
}
