//! Frame-driven scene simulation
//!
//! All motion logic lives here. This module is renderer-agnostic:
//! - Seeded RNG only (idle scatter, flocking jitter)
//! - Stable iteration order (tile load order)
//! - No rendering or platform dependencies beyond the camera model

pub mod collision;
pub mod drag;
pub mod effects;
pub mod forces;
pub mod state;
pub mod tick;
pub mod tile;
pub mod transition;

pub use collision::{Ray, pick_tile, ray_plane, ray_plane_z, ray_sphere};
pub use drag::DragTracker;
pub use effects::{PointerTrail, TrailParticle, connection_lines};
pub use forces::{FlockAgent, InteractionForces};
pub use state::{
    DisplayMode, GeometryShape, InputEvent, PointerState, SceneEvent, ScenePhase, SceneState,
    TileId, TileState,
};
pub use tick::{
    FrameReport, activate, apply_content_event, begin_transition, load_tiles, queue_content,
    set_display_mode, tick,
};
pub use transition::{Ease, Transition, TransitionRequest, TransitionStep};
