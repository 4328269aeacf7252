//! Scene controller
//!
//! Owns the simulation state, the layout registry and a renderer binding.
//! Hosts push input, call `update` once per rendered frame and drain events
//! and content requests afterwards.

use std::mem;
use std::sync::mpsc::{self, Receiver, Sender};

use glam::Vec3;

use crate::content::{ContentEvent, ContentItem, ContentRequest};
use crate::error::LayoutError;
use crate::layout::{LayoutMode, LayoutParams, LayoutRegistry};
use crate::renderer::{RenderBinding, TileInstance};
use crate::settings::SceneSettings;
use crate::sim::effects::TrailParticle;
use crate::sim::{
    self, DisplayMode, InputEvent, SceneEvent, ScenePhase, SceneState, TileId, TransitionRequest,
};

pub struct Scene<R: RenderBinding> {
    state: SceneState,
    registry: LayoutRegistry,
    renderer: R,
    input: Vec<InputEvent>,
    content_tx: Sender<ContentEvent>,
    content_rx: Receiver<ContentEvent>,
    disposed: bool,
}

impl<R: RenderBinding> Scene<R> {
    /// Mount a scene on a renderer
    pub fn new(renderer: R, settings: SceneSettings) -> Self {
        let (content_tx, content_rx) = mpsc::channel();
        let mut scene = Self {
            state: SceneState::new(settings),
            registry: LayoutRegistry::new(),
            renderer,
            input: Vec::new(),
            content_tx,
            content_rx,
            disposed: false,
        };
        scene.renderer.set_camera(&scene.state.camera);
        log::info!("Scene mounted");
        scene
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn phase(&self) -> ScenePhase {
        self.state.phase
    }

    pub fn mode(&self) -> Option<LayoutMode> {
        self.state.mode
    }

    pub fn is_transitioning(&self) -> bool {
        self.state.is_transitioning
    }

    pub fn available_layouts(&self) -> Vec<&'static str> {
        self.registry.available()
    }

    /// Replace all tiles with one per item; the scene returns to idle
    pub fn load_items(&mut self, items: Vec<ContentItem>) {
        if self.disposed {
            log::warn!("load_items on a disposed scene");
            return;
        }
        for tile in &self.state.tiles {
            self.renderer.destroy_tile(&tile.id);
        }
        sim::load_tiles(&mut self.state, items);
        for tile in &self.state.tiles {
            self.renderer.create_tile(&tile.id, &tile.item, tile.shape);
            self.renderer.set_transform(&tile.id, &tile.render_transform());
        }
    }

    /// Transition to a named layout.
    ///
    /// Unknown names and bad parameters are errors. While a transition is in
    /// flight, or when there are no tiles, the request is dropped
    /// (`TransitionRequest::Dropped`).
    pub fn set_layout_mode(
        &mut self,
        name: &str,
        params: LayoutParams,
        duration: Option<f32>,
    ) -> Result<TransitionRequest, LayoutError> {
        if self.disposed {
            return Ok(TransitionRequest::Dropped);
        }
        if self.state.is_transitioning {
            log::debug!("Ignoring layout {name}: already transitioning");
            return Ok(TransitionRequest::Dropped);
        }
        let layout = self
            .registry
            .calculate(name, self.state.tiles.len(), &params)?;
        let duration = duration.unwrap_or(self.state.settings.transition.default_duration);
        Ok(sim::begin_transition(&mut self.state, layout, duration))
    }

    /// Queue input for the next frame
    pub fn push_input(&mut self, event: InputEvent) {
        if !self.disposed {
            self.input.push(event);
        }
    }

    /// Advance one frame and push the result to the renderer
    pub fn update(&mut self, dt: f32) {
        if self.disposed {
            return;
        }
        while let Ok(event) = self.content_rx.try_recv() {
            sim::apply_content_event(&mut self.state, event);
        }

        let mut input = mem::take(&mut self.input);
        let report = sim::tick(&mut self.state, &self.registry, &input, dt);
        input.clear();
        self.input = input;

        for index in report.morphed {
            if let Some(tile) = self.state.tiles.get(index) {
                self.renderer.set_shape(&tile.id, tile.shape, tile.shape.extents());
            }
        }
        self.write_renderer();
    }

    fn write_renderer(&mut self) {
        self.renderer.set_camera(&self.state.camera);

        let tiles = &self.state.tiles;
        for tile in tiles {
            self.renderer.set_transform(&tile.id, &tile.render_transform());
        }
        let instances: Vec<TileInstance> = tiles.iter().map(TileInstance::from_tile).collect();
        self.renderer.upload_instances(&instances);

        let trail: Vec<TrailParticle> = self.state.trail.alive().copied().collect();
        let lines: Vec<(Vec3, Vec3)> = self
            .state
            .connections
            .iter()
            .filter_map(|&(a, b)| Some((tiles.get(a)?.visible.position, tiles.get(b)?.visible.position)))
            .collect();
        self.renderer.draw_effects(&trail, &lines);
    }

    pub fn set_forces_enabled(&mut self, enabled: bool) {
        self.state.forces.set_enabled(enabled);
    }

    pub fn forces_enabled(&self) -> bool {
        self.state.forces.is_enabled()
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.state.settings.reduced_motion = reduced;
    }

    /// Switch a tile between thumbnail and fullscreen
    pub fn set_display_mode(&mut self, id: &TileId, mode: DisplayMode) -> bool {
        sim::set_display_mode(&mut self.state, id, mode)
    }

    /// Events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        mem::take(&mut self.state.events)
    }

    /// Content loads the host should start
    pub fn take_content_requests(&mut self) -> Vec<ContentRequest> {
        mem::take(&mut self.state.content_requests)
    }

    /// Channel for reporting finished loads (may be used from other threads)
    pub fn content_sender(&self) -> Sender<ContentEvent> {
        self.content_tx.clone()
    }

    /// Tear down: destroy every renderer object and stop responding.
    /// Late content completions are discarded.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        for tile in &self.state.tiles {
            self.renderer.destroy_tile(&tile.id);
        }
        self.state.tiles.clear();
        self.state.transition = None;
        self.state.is_transitioning = false;
        self.state.drag = None;
        self.state.pointer.hovered = None;
        self.state.pointer.dragged = None;
        self.state.trail.clear();
        self.state.connections.clear();
        self.state.events.clear();
        self.state.content_requests.clear();
        self.input.clear();
        while self.content_rx.try_recv().is_ok() {}
        self.disposed = true;
        log::info!("Scene disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::HeadlessRenderer;
    use crate::sim::GeometryShape;

    fn scene(n: usize) -> Scene<HeadlessRenderer> {
        let mut scene = Scene::new(HeadlessRenderer::new(), SceneSettings::default());
        scene.load_items((0..n).map(|i| ContentItem::new(format!("i{i}"), format!("Item {i}"))).collect());
        scene
    }

    #[test]
    fn test_load_creates_renderer_objects() {
        let mut scene = scene(4);
        assert_eq!(scene.renderer().objects.len(), 4);

        scene.load_items(vec![ContentItem::new("solo", "Solo")]);
        assert_eq!(scene.renderer().objects.len(), 1);
        assert!(scene.renderer().object(&TileId::from("solo")).is_some());
    }

    #[test]
    fn test_unknown_layout_is_error() {
        let mut scene = scene(3);
        let err = scene
            .set_layout_mode("hexagon", LayoutParams::new(), None)
            .unwrap_err();
        assert_eq!(err, LayoutError::UnknownMode("hexagon".into()));
        assert_eq!(scene.phase(), ScenePhase::Idle);
    }

    #[test]
    fn test_empty_scene_ignores_layout_requests() {
        let mut scene = scene(0);
        let request = scene.set_layout_mode("grid", LayoutParams::new(), Some(0.1));
        assert_eq!(request, Ok(TransitionRequest::Dropped));
        for _ in 0..30 {
            scene.update(1.0 / 60.0);
        }
        assert_eq!(scene.phase(), ScenePhase::Idle);
        assert_eq!(scene.mode(), None);
        assert!(scene.drain_events().is_empty());

        // Bad names are still reported
        assert!(scene.set_layout_mode("hexagon", LayoutParams::new(), None).is_err());
    }

    #[test]
    fn test_morph_reaches_renderer() {
        let mut scene = scene(3);
        scene
            .set_layout_mode("timeline", LayoutParams::new(), Some(0.2))
            .unwrap();
        for _ in 0..30 {
            scene.update(1.0 / 60.0);
        }
        assert_eq!(scene.renderer().shape_changes, 3);
        assert!(scene.renderer().objects.values().all(|o| o.shape == GeometryShape::Card));
        assert_eq!(scene.renderer().instances.len(), 3);
    }

    #[test]
    fn test_content_events_arrive_through_channel() {
        let mut scene = scene(2);
        let requests = scene.take_content_requests();
        // No thumbnail refs: both fail immediately without a request
        assert!(requests.is_empty());
        let events = scene.drain_events();
        assert_eq!(events.len(), 2);

        let id = TileId::from("i0");
        scene.set_display_mode(&id, DisplayMode::Fullscreen);
        let request = scene.take_content_requests().pop().unwrap();
        scene.content_sender().send(ContentEvent::loaded(&request)).unwrap();
        scene.update(1.0 / 60.0);
        assert_eq!(
            scene.state().tile(&id).unwrap().full_content,
            crate::content::ContentStatus::Loaded
        );
    }

    #[test]
    fn test_dispose_destroys_everything() {
        let mut scene = scene(5);
        for i in 0..5 {
            scene.push_input(InputEvent::PointerMove(glam::Vec2::new(i as f32 * 0.1, 0.0)));
            scene.update(1.0 / 60.0);
        }
        assert!(scene.state().trail.alive().count() > 0);
        scene.state.connections.push((0, 1));

        scene.dispose();
        assert!(scene.renderer().objects.is_empty());
        assert!(scene.is_disposed());
        assert_eq!(scene.state().trail.alive().count(), 0);
        assert!(scene.state().connections.is_empty());

        scene.push_input(InputEvent::Click(glam::Vec2::ZERO));
        scene.update(1.0 / 60.0);
        assert!(scene.drain_events().is_empty());
        assert_eq!(
            scene.set_layout_mode("grid", LayoutParams::new(), None),
            Ok(TransitionRequest::Dropped)
        );
    }
}
