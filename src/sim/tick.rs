//! Frame pipeline
//!
//! Order within one frame:
//! 1. Consume queued input (pointer, clicks, resize)
//! 2. Resolve targets (idle orbit or transition tweens)
//! 3. Apply inter-tile forces
//! 4. Integrate tiles
//! 5. Hit-test hover (active scenes only)
//! 6. Effects

use std::collections::HashSet;
use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::{pick_tile, ray_plane_z};
use super::drag::DragTracker;
use super::effects::connection_lines;
use super::state::{DisplayMode, InputEvent, SceneEvent, ScenePhase, SceneState, TileId, TileState};
use super::transition::{Transition, TransitionRequest};
use crate::content::{ContentEvent, ContentItem, ContentKind};
use crate::layout::{LayoutMode, LayoutParams, LayoutRegistry, LayoutResult};
use crate::transform::Transform;
use crate::yaw_toward;

/// Longest frame the simulation will integrate (stalls are clamped)
const MAX_FRAME_DT: f32 = 0.1;
/// Trail particle speed per unit of pointer movement
const TRAIL_VELOCITY_SCALE: f32 = 2.0;

/// Side effects of a frame the renderer needs to know about
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Tiles whose geometry changed
    pub morphed: Vec<usize>,
}

/// Advance the scene by one frame
pub fn tick(
    state: &mut SceneState,
    registry: &LayoutRegistry,
    input: &[InputEvent],
    dt: f32,
) -> FrameReport {
    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    };
    state.time += dt;
    state.frame += 1;
    let mut report = FrameReport::default();

    for event in input {
        handle_input(state, registry, *event);
    }

    // === Targets ===
    if state.phase == ScenePhase::Idle {
        update_idle_orbit(state, dt);
    }
    let step = state
        .transition
        .as_mut()
        .map(|t| t.advance(dt, &mut state.tiles, &mut state.camera));
    if let Some(step) = step {
        report.morphed = step.morphed;
        if step.finished {
            complete_transition(state);
        }
    }
    for tile in state.tiles.iter_mut() {
        tile.target = tile.base;
    }

    // === Forces ===
    if state.forces_active() {
        let forces = state.settings.effective_forces();
        state.forces.apply(&mut state.tiles, &state.pointer, &forces, dt);
    }

    // === Tiles ===
    let spin = state.settings.effective_idle_spin();
    let hover = state.settings.hover;
    for tile in state.tiles.iter_mut() {
        tile.update(dt, &hover, spin);
    }

    if state.phase == ScenePhase::Active && state.pointer.present {
        update_hover(state);
    }

    update_effects(state, dt);
    report
}

/// Replace the scene's tiles with one per item and return to idle.
///
/// Tiles start scattered around the orbit and spring into the ring.
/// Duplicate ids are skipped.
pub fn load_tiles(state: &mut SceneState, items: Vec<ContentItem>) {
    state.tiles.clear();
    state.transition = None;
    state.is_transitioning = false;
    state.phase = ScenePhase::Idle;
    state.mode = None;
    state.layout = None;
    state.drag = None;
    state.pointer.hovered = None;
    state.pointer.dragged = None;
    state.connections.clear();
    state.forces.reset();

    let mut rng = Pcg32::seed_from_u64(state.settings.seed);
    let spread = (state.settings.orbit.radius * 1.5).max(0.1);
    let focal = state.settings.orbit.focal_point;
    let mut seen = HashSet::new();

    for item in items {
        if !seen.insert(item.id.clone()) {
            log::warn!("Skipping duplicate content id {}", item.id);
            continue;
        }
        let position = focal
            + Vec3::new(
                rng.random_range(-spread..spread),
                rng.random_range(-spread..spread) * 0.5,
                rng.random_range(-spread..spread),
            );
        state.tiles.push(TileState::new(item, position, &state.settings));
    }

    for index in 0..state.tiles.len() {
        queue_content(state, index, ContentKind::Thumbnail);
    }
    log::info!("Loaded {} tiles", state.tiles.len());
}

/// Start a transition to `layout`. While another transition is in flight, or
/// when the scene has no tiles, the request is dropped and nothing changes.
pub fn begin_transition(state: &mut SceneState, layout: LayoutResult, duration: f32) -> TransitionRequest {
    if state.is_transitioning {
        log::debug!("Ignoring transition to {}: already transitioning", layout.mode);
        return TransitionRequest::Dropped;
    }
    if state.tiles.is_empty() {
        log::debug!("Ignoring transition to {}: no tiles", layout.mode);
        return TransitionRequest::Dropped;
    }

    let mode = layout.mode;
    let was_idle = state.phase == ScenePhase::Idle;
    for tile in state.tiles.iter_mut() {
        tile.set_lifecycle(ScenePhase::Transitioning, &state.settings);
    }
    if was_idle {
        for index in 0..state.tiles.len() {
            queue_content(state, index, ContentKind::Full);
        }
    }
    state.forces.reset();

    let stagger = state.settings.transition.stagger_step;
    state.transition = Some(Transition::new(layout, &state.tiles, &state.camera, duration, stagger));
    state.phase = ScenePhase::Transitioning;
    state.is_transitioning = true;
    state.mode = Some(mode);

    log::info!("Transition to {mode} started ({duration:.2}s, {} tiles)", state.tiles.len());
    state.events.push(SceneEvent::TransitionStarted { mode });
    TransitionRequest::Started { mode, duration }
}

/// First interaction: move from the idle orbit into the activation layout
pub fn activate(state: &mut SceneState, registry: &LayoutRegistry) -> Option<TransitionRequest> {
    if state.phase != ScenePhase::Idle || state.tiles.is_empty() {
        return None;
    }
    let mode = state.settings.transition.activation_mode;
    let duration = state.settings.transition.activation_duration;
    match registry.calculator(mode).calculate(state.tiles.len(), &LayoutParams::new()) {
        Ok(layout) => Some(begin_transition(state, layout, duration)),
        Err(e) => {
            log::error!("Activation layout {mode} failed: {e}");
            None
        }
    }
}

fn complete_transition(state: &mut SceneState) {
    let Some(transition) = state.transition.take() else {
        return;
    };
    let mode = transition.mode();
    state.phase = ScenePhase::Active;
    state.is_transitioning = false;
    state.mode = Some(mode);
    state.camera.apply_placement(&transition.layout.camera);
    for tile in state.tiles.iter_mut() {
        tile.set_lifecycle(ScenePhase::Active, &state.settings);
    }
    state.layout = Some(transition.layout);

    log::info!("Transition to {mode} complete");
    state.events.push(SceneEvent::TransitionCompleted { mode });
}

/// Ring of tiles circling the focal point, each facing it
fn update_idle_orbit(state: &mut SceneState, dt: f32) {
    state.orbit_offset = (state.orbit_offset + state.settings.effective_orbit_speed() * dt).rem_euclid(TAU);
    let count = state.tiles.len();
    if count == 0 {
        return;
    }

    let orbit = state.settings.orbit;
    let offset = state.orbit_offset;
    let step = TAU / count as f32;
    for (i, tile) in state.tiles.iter_mut().enumerate() {
        let angle = i as f32 * step + offset;
        let position = orbit.focal_point
            + Vec3::new(
                angle.cos() * orbit.radius,
                (angle * 2.0).sin() * orbit.bob,
                angle.sin() * orbit.radius,
            );
        tile.base = Transform::new(
            position,
            Vec3::new(0.0, yaw_toward(position, orbit.focal_point), 0.0),
            Vec3::ONE,
        );
    }
}

fn handle_input(state: &mut SceneState, registry: &LayoutRegistry, event: InputEvent) {
    match event {
        InputEvent::PointerMove(ndc) => pointer_move(state, ndc),
        InputEvent::PointerDown(ndc) => pointer_down(state, ndc),
        InputEvent::PointerUp(ndc) => {
            pointer_move(state, ndc);
            pointer_up(state);
        }
        InputEvent::Click(ndc) => click(state, registry, ndc),
        InputEvent::Resize { width, height } => state.camera.set_viewport(width, height),
    }
}

fn pointer_move(state: &mut SceneState, ndc: Vec2) {
    if !ndc.is_finite() {
        return;
    }
    let ray = state.camera.ray_from_ndc(ndc);
    let previous = state.pointer.world;
    state.pointer.ndc = ndc;
    state.pointer.present = true;

    if let Some(drag) = state.drag.as_mut() {
        if let Some(point) = ray_plane_z(&ray, drag.plane_z) {
            let position = drag.update(point);
            state.pointer.world = point;
            if let Some(tile) = state.tiles.iter_mut().find(|t| t.id == drag.tile) {
                tile.on_drag_move(position);
            }
        }
    } else if let Some(point) = ray_plane_z(&ray, 0.0) {
        state.pointer.world = point;
    }

    if state.settings.effective_pointer_trail() && state.pointer.world != previous {
        let velocity = (state.pointer.world - previous) * TRAIL_VELOCITY_SCALE;
        state.trail.emit(state.pointer.world, velocity);
    }
}

fn pointer_down(state: &mut SceneState, ndc: Vec2) {
    pointer_move(state, ndc);
    state.pointer.is_down = true;
    if state.phase == ScenePhase::Idle || state.drag.is_some() {
        return;
    }

    let ray = state.camera.ray_from_ndc(ndc);
    let Some((index, _)) = pick_tile(&ray, &state.tiles, None) else {
        return;
    };
    let tile = &mut state.tiles[index];
    let Some(grab) = ray_plane_z(&ray, tile.visible.position.z) else {
        return;
    };

    log::debug!("Drag start on {}", tile.id);
    state.drag = Some(DragTracker::begin(
        tile.id.clone(),
        tile.visible.position,
        grab,
        state.settings.drag.history_len,
    ));
    state.pointer.dragged = Some(tile.id.clone());
    tile.on_drag_start();
}

fn pointer_up(state: &mut SceneState) {
    state.pointer.is_down = false;
    let Some(drag) = state.drag.take() else {
        return;
    };
    state.pointer.dragged = None;
    let throw = drag.throw_velocity(state.settings.drag.throw_multiplier);
    if let Some(tile) = state.tile_mut(&drag.tile) {
        tile.on_drag_end(throw);
        log::debug!("Drag end on {} (throw {:.3})", tile.id, throw.length());
    }
}

fn click(state: &mut SceneState, registry: &LayoutRegistry, ndc: Vec2) {
    if !ndc.is_finite() {
        return;
    }
    let ray = state.camera.ray_from_ndc(ndc);
    if let Some((index, _)) = pick_tile(&ray, &state.tiles, None) {
        let tile = &mut state.tiles[index];
        let selected = tile.on_click();
        log::debug!("Tile {} clicked (selected: {selected})", tile.id);
        state.events.push(SceneEvent::TileActivated {
            id: tile.id.clone(),
            item: tile.item.clone(),
        });
    }

    // Any click wakes an idle scene
    if state.phase == ScenePhase::Idle {
        activate(state, registry);
    }
}

fn update_hover(state: &mut SceneState) {
    let ray = state.camera.ray_from_ndc(state.pointer.ndc);
    let hit = pick_tile(&ray, &state.tiles, state.pointer.dragged.as_ref()).map(|(i, _)| i);

    for (i, tile) in state.tiles.iter_mut().enumerate() {
        if tile.is_dragged {
            continue;
        }
        let hovered = Some(i) == hit;
        if hovered && !tile.is_hovered {
            tile.on_hover_start();
        } else if !hovered && tile.is_hovered {
            tile.on_hover_end();
        }
    }
    state.pointer.hovered = hit.map(|i| state.tiles[i].id.clone());
}

fn update_effects(state: &mut SceneState, dt: f32) {
    state.trail.update(dt);

    state.connections.clear();
    let effects = state.settings.effects;
    if effects.connection_lines
        && state.phase == ScenePhase::Active
        && state.mode == Some(LayoutMode::Constellation)
    {
        let positions: Vec<Vec3> = state.tiles.iter().map(|t| t.visible.position).collect();
        state.connections = connection_lines(&positions, effects.connection_distance, effects.max_connections);
    }
}

/// Ask the host to load content for one tile (no-op when already requested)
pub fn queue_content(state: &mut SceneState, index: usize, kind: ContentKind) {
    let Some(tile) = state.tiles.get_mut(index) else {
        return;
    };
    match tile.request_content(kind) {
        Some(Ok(request)) => state.content_requests.push(request),
        Some(Err(error)) => {
            log::warn!("Tile {}: {error}", tile.id);
            state.events.push(SceneEvent::ContentFailed {
                id: tile.id.clone(),
                error,
            });
        }
        None => {}
    }
}

/// Record a finished background load
pub fn apply_content_event(state: &mut SceneState, event: ContentEvent) {
    let Some(tile) = state.tile_mut(&event.tile) else {
        log::debug!("Content for unknown tile {}", event.tile);
        return;
    };
    tile.apply_content_result(event.kind, &event.result);
    if let Err(error) = event.result {
        log::warn!("Content load failed for {}: {error}", event.tile);
        state.events.push(SceneEvent::ContentFailed { id: event.tile, error });
    }
}

/// Switch a tile between thumbnail and fullscreen; fullscreen loads full content
pub fn set_display_mode(state: &mut SceneState, id: &TileId, mode: DisplayMode) -> bool {
    let Some(index) = state.tile_index(id) else {
        return false;
    };
    if !state.tiles[index].set_display_mode(mode) {
        return false;
    }
    if mode == DisplayMode::Fullscreen {
        queue_content(state, index, ContentKind::Full);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SceneSettings;

    const DT: f32 = 1.0 / 60.0;

    fn items(n: usize) -> Vec<ContentItem> {
        (0..n)
            .map(|i| {
                let mut item = ContentItem::new(format!("item-{i}"), format!("Item {i}"));
                item.thumbnail_ref = Some(format!("thumb-{i}.jpg"));
                item
            })
            .collect()
    }

    fn loaded(n: usize) -> SceneState {
        let mut state = SceneState::new(SceneSettings::default());
        load_tiles(&mut state, items(n));
        state
    }

    fn run(state: &mut SceneState, frames: usize) {
        let registry = LayoutRegistry::new();
        for _ in 0..frames {
            tick(state, &registry, &[], DT);
        }
    }

    #[test]
    fn test_idle_orbit_ring() {
        let mut state = loaded(8);
        run(&mut state, 1);
        let radius = state.settings.orbit.radius;
        for tile in &state.tiles {
            let p = tile.base.position;
            assert!((p.x.hypot(p.z) - radius).abs() < 1e-3);
            assert!(p.y.abs() <= state.settings.orbit.bob + 1e-6);
        }
    }

    #[test]
    fn test_load_requests_thumbnails_and_skips_duplicates() {
        let mut state = SceneState::new(SceneSettings::default());
        let mut list = items(3);
        list.push(list[0].clone());
        load_tiles(&mut state, list);
        assert_eq!(state.tiles.len(), 3);
        assert_eq!(state.content_requests.len(), 3);
        assert!(state.content_requests.iter().all(|r| r.kind == ContentKind::Thumbnail));
    }

    #[test]
    fn test_click_in_idle_starts_activation() {
        let mut state = loaded(6);
        let registry = LayoutRegistry::new();
        tick(&mut state, &registry, &[InputEvent::Click(Vec2::new(0.9, 0.9))], DT);

        assert_eq!(state.phase, ScenePhase::Transitioning);
        assert!(state.is_transitioning);
        assert_eq!(state.mode, Some(LayoutMode::Grid));
        assert!(state.events.contains(&SceneEvent::TransitionStarted { mode: LayoutMode::Grid }));
        // Full content requested on activation
        assert!(state.content_requests.iter().any(|r| r.kind == ContentKind::Full));

        run(&mut state, 200);
        assert_eq!(state.phase, ScenePhase::Active);
        assert!(!state.is_transitioning);
        assert!(state.tiles.iter().all(|t| t.lifecycle == ScenePhase::Active));
    }

    #[test]
    fn test_transition_request_dropped_while_in_flight() {
        let mut state = loaded(4);
        let registry = LayoutRegistry::new();
        let grid = registry.calculate("grid", 4, &LayoutParams::new()).unwrap();
        let sphere = registry.calculate("sphere", 4, &LayoutParams::new()).unwrap();

        assert!(matches!(begin_transition(&mut state, grid, 1.0), TransitionRequest::Started { .. }));
        assert_eq!(begin_transition(&mut state, sphere, 1.0), TransitionRequest::Dropped);
        assert_eq!(state.transition.as_ref().map(|t| t.mode()), Some(LayoutMode::Grid));
    }

    #[test]
    fn test_zero_tiles_stay_inert() {
        let mut state = loaded(0);
        let registry = LayoutRegistry::new();
        tick(&mut state, &registry, &[InputEvent::Click(Vec2::ZERO)], DT);
        run(&mut state, 10);
        assert_eq!(state.phase, ScenePhase::Idle);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_transition_without_tiles_is_dropped() {
        let mut state = loaded(0);
        let registry = LayoutRegistry::new();
        let grid = registry.calculate("grid", 0, &LayoutParams::new()).unwrap();
        assert_eq!(begin_transition(&mut state, grid, 0.1), TransitionRequest::Dropped);
        run(&mut state, 30);
        assert_eq!(state.phase, ScenePhase::Idle);
        assert!(state.transition.is_none());
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_huge_dt_is_clamped() {
        let mut state = loaded(3);
        let registry = LayoutRegistry::new();
        tick(&mut state, &registry, &[], 1000.0);
        tick(&mut state, &registry, &[], f32::NAN);
        assert!(state.tiles.iter().all(|t| t.visible.is_finite()));
        assert!(state.time <= MAX_FRAME_DT + 1e-6);
    }

    #[test]
    fn test_content_failure_is_recorded() {
        let mut state = loaded(2);
        let request = state.content_requests[0].clone();
        apply_content_event(&mut state, ContentEvent::failed(&request, "404"));

        let tile = state.tile(&request.tile).unwrap();
        assert_eq!(tile.thumbnail, crate::content::ContentStatus::Failed);
        assert!(matches!(state.events.last(), Some(SceneEvent::ContentFailed { .. })));
    }

    #[test]
    fn test_fullscreen_requests_full_content() {
        let mut state = loaded(1);
        state.content_requests.clear();
        let id = state.tiles[0].id.clone();
        assert!(set_display_mode(&mut state, &id, DisplayMode::Fullscreen));
        assert!(!set_display_mode(&mut state, &id, DisplayMode::Fullscreen));
        assert_eq!(state.content_requests.len(), 1);
        assert_eq!(state.content_requests[0].kind, ContentKind::Full);
    }

    #[test]
    fn test_connection_lines_only_in_constellation() {
        let mut state = loaded(5);
        let registry = LayoutRegistry::new();
        let layout = registry
            .calculate("constellation", 5, &LayoutParams::new().with("minDistance", 1.0))
            .unwrap();
        begin_transition(&mut state, layout, 0.1);
        run(&mut state, 60);
        assert_eq!(state.mode, Some(LayoutMode::Constellation));
        assert_eq!(state.phase, ScenePhase::Active);
        assert!(state.connections.len() <= state.settings.effects.max_connections);

        let grid = registry.calculate("grid", 5, &LayoutParams::new()).unwrap();
        begin_transition(&mut state, grid, 0.1);
        run(&mut state, 60);
        assert!(state.connections.is_empty());
    }
}
