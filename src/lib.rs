//! Tilescape - animated 3D arrangements of content tiles
//!
//! Core modules:
//! - `layout`: Pure layout calculators and the closed mode registry
//! - `sim`: Frame-driven simulation (springs, forces, transitions, hit-testing)
//! - `scene`: Scene controller wiring input, layouts and the renderer binding
//! - `renderer`: Renderer binding trait, camera projection, instance records
//! - `content`: Content records and background load plumbing
//! - `settings`: Data-driven tunables

pub mod content;
pub mod error;
pub mod layout;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod sim;
pub mod transform;

pub use content::ContentItem;
pub use error::{ContentError, LayoutError, SettingsError};
pub use layout::{LayoutMode, LayoutParams, LayoutRegistry, LayoutResult, ParamValue};
pub use scene::Scene;
pub use settings::{MotionPreset, SceneSettings};
pub use sim::{
    DisplayMode, GeometryShape, InputEvent, SceneEvent, ScenePhase, TileId, TransitionRequest,
};
pub use transform::Transform;

use glam::{EulerRot, Quat, Vec3};

/// Scene configuration constants (defaults for `SceneSettings`)
pub mod consts {
    /// Fixed timestep used by the headless demo (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Spring coefficients while tiles orbit idle (looser)
    pub const IDLE_SPRING_STRENGTH: f32 = 0.02;
    pub const IDLE_DAMPING: f32 = 0.92;
    /// Spring coefficients once the scene is active (tighter)
    pub const ACTIVE_SPRING_STRENGTH: f32 = 0.05;
    pub const ACTIVE_DAMPING: f32 = 0.85;
    pub const ROTATION_SPRING_STRENGTH: f32 = 0.03;

    /// Per-frame self-spin applied to idle tiles (radians)
    pub const IDLE_SPIN: [f32; 3] = [0.002, 0.003, 0.0];

    /// Idle orbit around the focal point
    pub const ORBIT_RADIUS: f32 = 8.0;
    pub const ORBIT_SPEED: f32 = 0.3;
    pub const ORBIT_BOB: f32 = 0.5;

    /// Transition timing (seconds)
    pub const STAGGER_STEP: f32 = 0.03;
    pub const DEFAULT_TRANSITION_DURATION: f32 = 1.5;
    pub const ACTIVATION_DURATION: f32 = 2.0;

    /// Drag/throw
    pub const DRAG_HISTORY_LEN: usize = 5;
    pub const THROW_VELOCITY_MULTIPLIER: f32 = 0.3;

    /// Edge length of the default cube geometry
    pub const TILE_BASE_SIZE: f32 = 2.0;

    /// Closest a layout camera may sit to its target
    pub const MIN_CAMERA_DISTANCE: f32 = 6.0;

    /// Constellation rejection sampling budget per item
    pub const CONSTELLATION_MAX_ATTEMPTS: u32 = 50;

    /// Golden ratio (Fibonacci sphere)
    pub const GOLDEN_RATIO: f32 = 1.618_034;
}

/// Yaw (rotation about +Y) that turns an object at `from` to face `to`
#[inline]
pub fn yaw_toward(from: Vec3, to: Vec3) -> f32 {
    let dir = to - from;
    dir.x.atan2(dir.z)
}

/// Euler XYZ rotation that points an object's local +Z from `from` toward `to`
pub fn look_rotation(from: Vec3, to: Vec3) -> Vec3 {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec3::ZERO {
        return Vec3::ZERO;
    }
    let (x, y, z) = Quat::from_rotation_arc(Vec3::Z, dir).to_euler(EulerRot::XYZ);
    Vec3::new(x, y, z)
}

/// Normalized index `i / (count - 1)`, 0 for a single item
#[inline]
pub fn normalized_index(i: usize, count: usize) -> f32 {
    if count <= 1 {
        0.0
    } else {
        i as f32 / (count - 1) as f32
    }
}
