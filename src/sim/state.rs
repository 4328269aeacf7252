//! Scene state and core simulation types
//!
//! Everything the frame pipeline reads or writes lives in `SceneState`.

use std::fmt;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::drag::DragTracker;
use super::effects::PointerTrail;
use super::forces::InteractionForces;
use super::transition::Transition;
use crate::consts::TILE_BASE_SIZE;
use crate::content::{ContentItem, ContentRequest, ContentStatus};
use crate::error::ContentError;
use crate::layout::{LayoutMode, LayoutResult};
use crate::renderer::Camera;
use crate::settings::{SceneSettings, SpringSettings};
use crate::transform::Transform;

/// Stable tile identifier (the content item's id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub String);

impl TileId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TileId {
    fn from(s: &str) -> Self {
        TileId(s.to_string())
    }
}

impl From<String> for TileId {
    fn from(s: String) -> Self {
        TileId(s)
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Lifecycle shared by the scene and its tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScenePhase {
    /// Orbiting ring, waiting for the first interaction
    #[default]
    Idle,
    /// Tweening toward a layout
    Transitioning,
    /// Settled in a layout, hit-testing enabled
    Active,
}

/// Geometry a tile can morph into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GeometryShape {
    #[default]
    Cube,
    /// Pie slice for the carousel ring
    Wedge,
    /// Thin card for the timeline
    Card,
    /// Curved patch of a sphere shell
    SphereSegment,
    /// Rippled panel for the wave
    WaveSegment,
}

impl GeometryShape {
    /// Shape tiles take on in a layout (modes without one use a cube)
    pub fn for_mode(mode: LayoutMode) -> Self {
        match mode {
            LayoutMode::Grid => GeometryShape::Cube,
            LayoutMode::Carousel => GeometryShape::Wedge,
            LayoutMode::Sphere => GeometryShape::SphereSegment,
            LayoutMode::Wave => GeometryShape::WaveSegment,
            LayoutMode::Timeline => GeometryShape::Card,
            LayoutMode::Spiral | LayoutMode::Constellation => GeometryShape::Cube,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryShape::Cube => "cube",
            GeometryShape::Wedge => "wedge",
            GeometryShape::Card => "card",
            GeometryShape::SphereSegment => "sphere-segment",
            GeometryShape::WaveSegment => "wave-segment",
        }
    }

    /// Axis-aligned extents at unit scale
    pub fn extents(&self) -> Vec3 {
        let b = TILE_BASE_SIZE;
        match self {
            GeometryShape::Cube => Vec3::splat(b),
            GeometryShape::Wedge => Vec3::new(b, b * 2.0, b),
            GeometryShape::Card => Vec3::new(b * 1.5, b, b * 0.05),
            GeometryShape::SphereSegment => Vec3::new(b, b, b * 0.4),
            GeometryShape::WaveSegment => Vec3::new(b, b * 0.6, b * 0.2),
        }
    }
}

/// How much content a tile shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    #[default]
    Thumbnail,
    Fullscreen,
}

/// One content tile: motion state, interaction flags and content status
#[derive(Debug, Clone)]
pub struct TileState {
    pub id: TileId,
    pub item: ContentItem,
    /// Layout/orbit target before force offsets
    pub base: Transform,
    /// Where the springs pull the tile this frame
    pub target: Transform,
    /// Rendered transform
    pub visible: Transform,
    /// Last finite transform (restored when a frame produces NaN/inf)
    pub last_good: Transform,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub lifecycle: ScenePhase,
    pub is_hovered: bool,
    pub is_dragged: bool,
    pub is_selected: bool,
    pub shape: GeometryShape,
    pub spring: SpringSettings,
    /// 0..=1 hover glow
    pub glow_intensity: f32,
    /// Hover scale multiplier
    pub hover_scale: f32,
    /// Accumulated idle self-spin added on top of the visible rotation
    pub spin: Vec3,
    pub display_mode: DisplayMode,
    pub thumbnail: ContentStatus,
    pub full_content: ContentStatus,
}

/// Pointer state sampled from input events
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    /// Set once any pointer event has arrived
    pub present: bool,
    /// Normalized device coordinates (-1..1, +y up)
    pub ndc: Vec2,
    /// Pointer projected onto the z=0 plane (or the drag plane while dragging)
    pub world: Vec3,
    pub is_down: bool,
    pub hovered: Option<TileId>,
    pub dragged: Option<TileId>,
}

/// Host-facing input, queued and consumed at the start of a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove(Vec2),
    PointerDown(Vec2),
    PointerUp(Vec2),
    Click(Vec2),
    Resize { width: f32, height: f32 },
}

/// Notifications for the surrounding application
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// A tile was clicked; carries its content item
    TileActivated { id: TileId, item: ContentItem },
    TransitionStarted { mode: LayoutMode },
    TransitionCompleted { mode: LayoutMode },
    /// Background load failed; the tile keeps its placeholder
    ContentFailed { id: TileId, error: ContentError },
}

/// Complete scene state
#[derive(Debug)]
pub struct SceneState {
    pub settings: SceneSettings,
    pub phase: ScenePhase,
    /// Mode of the current (or in-flight) layout
    pub mode: Option<LayoutMode>,
    /// Last completed layout
    pub layout: Option<LayoutResult>,
    pub is_transitioning: bool,
    pub transition: Option<Transition>,
    pub pointer: PointerState,
    pub drag: Option<DragTracker>,
    /// Accumulated idle orbit angle (radians)
    pub orbit_offset: f32,
    pub camera: Camera,
    pub tiles: Vec<TileState>,
    pub forces: InteractionForces,
    pub trail: PointerTrail,
    /// Tile index pairs to draw as connection lines
    pub connections: Vec<(usize, usize)>,
    pub events: Vec<SceneEvent>,
    pub content_requests: Vec<ContentRequest>,
    /// Seconds since the scene was created
    pub time: f32,
    pub frame: u64,
}

impl SceneState {
    pub fn new(settings: SceneSettings) -> Self {
        let forces = InteractionForces::new(settings.seed, settings.forces.enabled);
        let trail = PointerTrail::new(settings.effects.trail_capacity);
        Self {
            settings,
            phase: ScenePhase::Idle,
            mode: None,
            layout: None,
            is_transitioning: false,
            transition: None,
            pointer: PointerState::default(),
            drag: None,
            orbit_offset: 0.0,
            camera: Camera::default(),
            tiles: Vec::new(),
            forces,
            trail,
            connections: Vec::new(),
            events: Vec::new(),
            content_requests: Vec::new(),
            time: 0.0,
            frame: 0,
        }
    }

    pub fn tile_index(&self, id: &TileId) -> Option<usize> {
        self.tiles.iter().position(|t| &t.id == id)
    }

    pub fn tile(&self, id: &TileId) -> Option<&TileState> {
        self.tiles.iter().find(|t| &t.id == id)
    }

    pub fn tile_mut(&mut self, id: &TileId) -> Option<&mut TileState> {
        self.tiles.iter_mut().find(|t| &t.id == id)
    }

    /// Whether spring/force physics runs in the current layout
    pub fn physics_enabled(&self) -> bool {
        if let Some(transition) = &self.transition {
            return transition.layout.physics_enabled;
        }
        match (&self.layout, self.phase) {
            (_, ScenePhase::Idle) => true,
            (Some(layout), _) => layout.physics_enabled,
            (None, _) => true,
        }
    }

    /// Whether inter-tile forces apply this frame
    pub fn forces_active(&self) -> bool {
        self.forces.is_enabled() && !self.settings.reduced_motion && self.physics_enabled()
    }
}
