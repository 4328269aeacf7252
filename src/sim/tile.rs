//! Per-tile motion and interaction
//!
//! Springs are integrated per frame: the coefficients are tuned for a 60 Hz
//! loop and are not scaled by `dt`. Hover easing uses `dt` so glow timing is
//! frame-rate independent.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::state::{DisplayMode, GeometryShape, ScenePhase, TileId, TileState};
use crate::content::{ContentItem, ContentKind, ContentRequest, ContentStatus};
use crate::error::ContentError;
use crate::settings::{HoverSettings, SceneSettings};
use crate::transform::Transform;

/// Share of the throw velocity that becomes tumble
const THROW_TUMBLE: f32 = 0.1;

/// Wrap an angle into (-PI, PI]
fn wrap_angle(a: f32) -> f32 {
    let wrapped = (a + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

impl TileState {
    pub fn new(item: ContentItem, position: Vec3, settings: &SceneSettings) -> Self {
        let transform = Transform::at(position);
        Self {
            id: TileId(item.id.clone()),
            item,
            base: transform,
            target: transform,
            visible: transform,
            last_good: transform,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            lifecycle: ScenePhase::Idle,
            is_hovered: false,
            is_dragged: false,
            is_selected: false,
            shape: GeometryShape::Cube,
            spring: settings.idle_spring,
            glow_intensity: 0.0,
            hover_scale: 1.0,
            spin: Vec3::ZERO,
            display_mode: DisplayMode::Thumbnail,
            thumbnail: ContentStatus::NotRequested,
            full_content: ContentStatus::NotRequested,
        }
    }

    /// Advance one frame
    pub fn update(&mut self, dt: f32, hover: &HoverSettings, idle_spin: Vec3) {
        if !self.target.is_finite() {
            self.target = if self.base.is_finite() { self.base } else { self.last_good };
        }

        // Dragged tiles follow the pointer exactly
        if !self.is_dragged {
            let spring = self.spring;
            self.velocity += (self.target.position - self.visible.position) * spring.strength;
            self.velocity *= spring.damping;
            self.visible.position += self.velocity;

            self.angular_velocity +=
                (self.target.rotation - self.visible.rotation) * spring.rotation_strength;
            self.angular_velocity *= spring.damping;
            self.visible.rotation += self.angular_velocity;

            self.visible.scale += (self.target.scale - self.visible.scale) * (spring.strength * 2.0);
        }

        if self.lifecycle == ScenePhase::Idle {
            self.spin = (self.spin + idle_spin).map(wrap_angle);
        }

        self.ease_hover(dt, hover);
        self.guard_non_finite();
    }

    fn ease_hover(&mut self, dt: f32, hover: &HoverSettings) {
        if self.is_hovered {
            self.glow_intensity = (self.glow_intensity + hover.glow_rise * dt).min(1.0);
            self.hover_scale = (self.hover_scale + hover.scale_rise * dt).min(hover.max_scale);
        } else {
            self.glow_intensity = (self.glow_intensity - hover.glow_fall * dt).max(0.0);
            self.hover_scale = (self.hover_scale - hover.scale_fall * dt).max(1.0);
        }
    }

    /// Restore the last finite state when integration blew up
    fn guard_non_finite(&mut self) {
        if self.visible.is_finite() && self.velocity.is_finite() && self.angular_velocity.is_finite()
        {
            self.last_good = self.visible;
        } else {
            log::warn!("Tile {} produced a non-finite transform, restoring", self.id);
            self.visible = self.last_good;
            self.velocity = Vec3::ZERO;
            self.angular_velocity = Vec3::ZERO;
        }
    }

    /// Switch lifecycle and spring coefficients
    pub fn set_lifecycle(&mut self, lifecycle: ScenePhase, settings: &SceneSettings) {
        if self.lifecycle == ScenePhase::Idle && lifecycle != ScenePhase::Idle {
            // Fold the idle spin into the rotation so the spring unwinds it
            self.visible.rotation = (self.visible.rotation + self.spin).map(wrap_angle);
            self.spin = Vec3::ZERO;
        }
        self.lifecycle = lifecycle;
        self.spring = match lifecycle {
            ScenePhase::Idle => settings.idle_spring,
            ScenePhase::Transitioning | ScenePhase::Active => settings.active_spring,
        };
    }

    /// Swap geometry; returns false when the shape is unchanged
    pub fn morph_to_shape(&mut self, shape: GeometryShape) -> bool {
        if self.shape == shape {
            return false;
        }
        log::debug!("Tile {} morphs {} -> {}", self.id, self.shape.as_str(), shape.as_str());
        self.shape = shape;
        true
    }

    pub fn on_hover_start(&mut self) {
        self.is_hovered = true;
    }

    pub fn on_hover_end(&mut self) {
        self.is_hovered = false;
    }

    pub fn on_drag_start(&mut self) {
        self.is_dragged = true;
        self.velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }

    pub fn on_drag_move(&mut self, position: Vec3) {
        if self.is_dragged && position.is_finite() {
            self.visible.position = position;
        }
    }

    /// Release with a throw velocity (world units per frame)
    pub fn on_drag_end(&mut self, throw: Vec3) {
        self.is_dragged = false;
        self.velocity = throw;
        self.angular_velocity = Vec3::new(-throw.y, throw.x, 0.0) * THROW_TUMBLE;
    }

    /// Toggle selection; returns the new selection state
    pub fn on_click(&mut self) -> bool {
        self.is_selected = !self.is_selected;
        self.is_selected
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) -> bool {
        if self.display_mode == mode {
            return false;
        }
        self.display_mode = mode;
        true
    }

    /// Start a background load of `kind` content.
    ///
    /// Returns `None` when that content is already pending or loaded. A
    /// failed load may be retried.
    pub fn request_content(&mut self, kind: ContentKind) -> Option<Result<ContentRequest, ContentError>> {
        let status = match kind {
            ContentKind::Thumbnail => &mut self.thumbnail,
            ContentKind::Full => &mut self.full_content,
        };
        if matches!(status, ContentStatus::Pending | ContentStatus::Loaded) {
            return None;
        }

        let asset = match kind {
            ContentKind::Thumbnail => match self.item.thumbnail_source() {
                Some(asset) => Some(asset.to_string()),
                None => {
                    *status = ContentStatus::Failed;
                    return Some(Err(ContentError::MissingAsset(self.id.to_string())));
                }
            },
            // Full content always loads title/excerpt, the cover is optional
            ContentKind::Full => self.item.full_source().map(str::to_string),
        };

        *status = ContentStatus::Pending;
        Some(Ok(ContentRequest {
            tile: self.id.clone(),
            kind,
            asset,
        }))
    }

    /// Record the outcome of a background load
    pub fn apply_content_result(&mut self, kind: ContentKind, result: &Result<(), ContentError>) {
        let status = match kind {
            ContentKind::Thumbnail => &mut self.thumbnail,
            ContentKind::Full => &mut self.full_content,
        };
        *status = if result.is_ok() {
            ContentStatus::Loaded
        } else {
            ContentStatus::Failed
        };
    }

    /// Transform handed to the renderer (spin and hover scale applied)
    pub fn render_transform(&self) -> Transform {
        Transform {
            position: self.visible.position,
            rotation: self.visible.rotation + self.spin,
            scale: self.visible.scale * self.hover_scale,
        }
    }

    /// Bounding sphere radius for hit-testing
    pub fn bounding_radius(&self) -> f32 {
        0.5 * (self.shape.extents() * self.visible.scale.abs() * self.hover_scale).length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile() -> TileState {
        TileState::new(ContentItem::new("t", "Tile"), Vec3::ZERO, &SceneSettings::default())
    }

    fn active_tile() -> TileState {
        let settings = SceneSettings::default();
        let mut tile = TileState::new(ContentItem::new("t", "Tile"), Vec3::ZERO, &settings);
        tile.set_lifecycle(ScenePhase::Active, &settings);
        tile
    }

    #[test]
    fn test_spring_converges() {
        let mut tile = active_tile();
        tile.target = Transform::at(Vec3::new(10.0, 0.0, 0.0));
        let hover = HoverSettings::default();

        let mut frames = 0;
        while tile.visible.position.distance(tile.target.position) > 1e-3 {
            tile.update(1.0 / 60.0, &hover, Vec3::ZERO);
            frames += 1;
            assert!(frames < 500, "spring did not settle");
        }
    }

    #[test]
    fn test_idle_spring_is_looser() {
        let settings = SceneSettings::default();
        let idle = tile();
        let active = active_tile();
        assert!(idle.spring.strength < active.spring.strength);
        assert!(idle.spring.damping > active.spring.damping);
        assert_eq!(active.spring, settings.active_spring);
    }

    #[test]
    fn test_non_finite_target_falls_back_to_base() {
        let mut tile = active_tile();
        tile.base = Transform::at(Vec3::new(4.0, 0.0, 0.0));
        tile.visible = Transform::at(Vec3::new(1.0, 2.0, 3.0));
        tile.last_good = tile.visible;
        tile.target = Transform::at(Vec3::new(f32::NAN, 0.0, 0.0));
        tile.update(1.0 / 60.0, &HoverSettings::default(), Vec3::ZERO);
        assert_eq!(tile.target, tile.base);
        assert!(tile.visible.is_finite());
    }

    #[test]
    fn test_non_finite_velocity_restores_last_good() {
        let mut tile = active_tile();
        tile.visible = Transform::at(Vec3::new(1.0, 2.0, 3.0));
        tile.target = tile.visible;
        tile.update(1.0 / 60.0, &HoverSettings::default(), Vec3::ZERO);
        tile.velocity = Vec3::new(f32::INFINITY, 0.0, 0.0);
        tile.update(1.0 / 60.0, &HoverSettings::default(), Vec3::ZERO);
        assert!(tile.visible.is_finite());
        assert!((tile.visible.position - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-4);
        assert_eq!(tile.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_hover_easing_is_bounded() {
        let mut tile = active_tile();
        let hover = HoverSettings::default();
        tile.on_hover_start();
        for _ in 0..120 {
            tile.update(1.0 / 60.0, &hover, Vec3::ZERO);
        }
        assert_eq!(tile.glow_intensity, 1.0);
        assert!((tile.hover_scale - hover.max_scale).abs() < 1e-6);

        tile.on_hover_end();
        for _ in 0..120 {
            tile.update(1.0 / 60.0, &hover, Vec3::ZERO);
        }
        assert_eq!(tile.glow_intensity, 0.0);
        assert_eq!(tile.hover_scale, 1.0);
    }

    #[test]
    fn test_dragged_tile_ignores_spring() {
        let mut tile = active_tile();
        tile.target = Transform::at(Vec3::new(5.0, 0.0, 0.0));
        tile.on_drag_start();
        tile.on_drag_move(Vec3::new(-2.0, 1.0, 0.0));
        tile.update(1.0 / 60.0, &HoverSettings::default(), Vec3::ZERO);
        assert_eq!(tile.visible.position, Vec3::new(-2.0, 1.0, 0.0));

        tile.on_drag_end(Vec3::new(0.6, 0.0, 0.0));
        assert!(!tile.is_dragged);
        assert_eq!(tile.velocity.x, 0.6);
    }

    #[test]
    fn test_idle_spin_only_while_idle() {
        let settings = SceneSettings::default();
        let mut idle = tile();
        idle.update(1.0 / 60.0, &settings.hover, settings.idle_spin);
        assert_ne!(idle.spin, Vec3::ZERO);

        let mut active = active_tile();
        active.update(1.0 / 60.0, &settings.hover, settings.idle_spin);
        assert_eq!(active.spin, Vec3::ZERO);
    }

    #[test]
    fn test_morph_to_same_shape_is_noop() {
        let mut tile = tile();
        assert!(!tile.morph_to_shape(GeometryShape::Cube));
        assert!(tile.morph_to_shape(GeometryShape::Card));
        assert_eq!(tile.shape, GeometryShape::Card);
    }

    #[test]
    fn test_click_toggles_selection() {
        let mut tile = tile();
        assert!(tile.on_click());
        assert!(!tile.on_click());
    }

    #[test]
    fn test_missing_thumbnail_fails_without_request() {
        let mut tile = tile();
        let result = tile.request_content(ContentKind::Thumbnail);
        assert!(matches!(result, Some(Err(ContentError::MissingAsset(_)))));
        assert_eq!(tile.thumbnail, ContentStatus::Failed);
    }

    #[test]
    fn test_content_requested_once() {
        let mut tile = tile();
        let request = tile.request_content(ContentKind::Full).unwrap().unwrap();
        assert_eq!(request.kind, ContentKind::Full);
        assert!(tile.request_content(ContentKind::Full).is_none());

        tile.apply_content_result(ContentKind::Full, &Ok(()));
        assert_eq!(tile.full_content, ContentStatus::Loaded);
        assert!(tile.request_content(ContentKind::Full).is_none());
    }

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(2.5 * PI) - 0.5 * PI).abs() < 1e-5);
        assert!((wrap_angle(-0.5) + 0.5).abs() < 1e-6);
    }
}
