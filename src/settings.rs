//! Scene settings and tunables
//!
//! Every magic number the simulation uses lives here so hosts can retune the
//! scene from a JSON file. Missing fields fall back to the defaults in
//! `crate::consts`.

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;
use crate::layout::LayoutMode;

/// Motion intensity presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MotionPreset {
    Calm,
    #[default]
    Standard,
    Lively,
}

impl MotionPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotionPreset::Calm => "Calm",
            MotionPreset::Standard => "Standard",
            MotionPreset::Lively => "Lively",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "calm" => Some(MotionPreset::Calm),
            "standard" | "std" => Some(MotionPreset::Standard),
            "lively" => Some(MotionPreset::Lively),
            _ => None,
        }
    }

    /// Multiplier on force strengths
    pub fn force_scale(&self) -> f32 {
        match self {
            MotionPreset::Calm => 0.5,
            MotionPreset::Standard => 1.0,
            MotionPreset::Lively => 1.5,
        }
    }

    /// Multiplier on idle orbit speed
    pub fn orbit_scale(&self) -> f32 {
        match self {
            MotionPreset::Calm => 0.5,
            MotionPreset::Standard => 1.0,
            MotionPreset::Lively => 1.4,
        }
    }
}

/// Damped spring coefficients (per-frame units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringSettings {
    pub strength: f32,
    pub damping: f32,
    pub rotation_strength: f32,
}

impl SpringSettings {
    pub fn idle() -> Self {
        Self {
            strength: IDLE_SPRING_STRENGTH,
            damping: IDLE_DAMPING,
            rotation_strength: ROTATION_SPRING_STRENGTH,
        }
    }

    pub fn active() -> Self {
        Self {
            strength: ACTIVE_SPRING_STRENGTH,
            damping: ACTIVE_DAMPING,
            rotation_strength: ROTATION_SPRING_STRENGTH,
        }
    }
}

impl Default for SpringSettings {
    fn default() -> Self {
        Self::active()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    pub radius: f32,
    /// Radians per second
    pub speed: f32,
    /// Vertical bob amplitude
    pub bob: f32,
    /// Point the ring orbits and faces
    pub focal_point: Vec3,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            radius: ORBIT_RADIUS,
            speed: ORBIT_SPEED,
            bob: ORBIT_BOB,
            focal_point: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionSettings {
    pub default_duration: f32,
    /// Per-item delay between tile tweens
    pub stagger_step: f32,
    /// Layout entered on the first click while idle
    pub activation_mode: LayoutMode,
    pub activation_duration: f32,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            default_duration: DEFAULT_TRANSITION_DURATION,
            stagger_step: STAGGER_STEP,
            activation_mode: LayoutMode::Grid,
            activation_duration: ACTIVATION_DURATION,
        }
    }
}

/// Hover easing rates (per second)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverSettings {
    pub glow_rise: f32,
    pub glow_fall: f32,
    pub scale_rise: f32,
    pub scale_fall: f32,
    pub max_scale: f32,
}

impl Default for HoverSettings {
    fn default() -> Self {
        Self {
            glow_rise: 3.0,
            glow_fall: 4.0,
            scale_rise: 2.0,
            scale_fall: 3.0,
            max_scale: 1.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragSettings {
    /// Pointer samples kept for the throw estimate
    pub history_len: usize,
    pub throw_multiplier: f32,
}

impl Default for DragSettings {
    fn default() -> Self {
        Self {
            history_len: DRAG_HISTORY_LEN,
            throw_multiplier: THROW_VELOCITY_MULTIPLIER,
        }
    }
}

/// Inter-tile forces. Off by default; each force also has its own switch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceSettings {
    pub enabled: bool,
    pub magnetic: bool,
    pub repulsion: bool,
    pub flocking: bool,

    // === Magnetic ===
    pub magnetic_strength: f32,
    pub magnetic_range: f32,
    /// Pairs closer than this are ignored
    pub magnetic_min_distance: f32,

    // === Pointer repulsion ===
    pub repulsion_radius: f32,
    pub repulsion_strength: f32,
    /// Radius/strength while the pointer button is held
    pub repulsion_radius_held: f32,
    pub repulsion_strength_held: f32,
    /// Distance floor for the 1/d falloff
    pub repulsion_min_distance: f32,

    // === Flocking ===
    pub neighbor_radius: f32,
    /// Steering gains, as velocity change (units/s) per 60 Hz frame
    pub separation_strength: f32,
    pub cohesion_strength: f32,
    /// Fraction of the heading difference matched per 60 Hz frame
    pub alignment_strength: f32,
    pub jitter: f32,
    /// Velocity retained per 60 Hz frame
    pub flock_damping: f32,
    /// Flock velocity cap (units per second)
    pub max_flock_speed: f32,
    /// Largest distance a flocking offset may pull a target from its base
    pub max_offset: f32,
}

impl Default for ForceSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            magnetic: true,
            repulsion: true,
            flocking: true,

            magnetic_strength: 0.001,
            magnetic_range: 4.0,
            magnetic_min_distance: 0.1,

            repulsion_radius: 3.0,
            repulsion_strength: 0.05,
            repulsion_radius_held: 5.0,
            repulsion_strength_held: 0.1,
            repulsion_min_distance: 0.5,

            neighbor_radius: 5.0,
            separation_strength: 1.2,
            cohesion_strength: 0.06,
            alignment_strength: 0.005,
            jitter: 0.12,
            flock_damping: 0.98,
            max_flock_speed: 3.0,
            max_offset: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    pub pointer_trail: bool,
    pub trail_capacity: usize,
    pub connection_lines: bool,
    /// Tiles farther apart than this are never connected
    pub connection_distance: f32,
    pub max_connections: usize,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            pointer_trail: true,
            trail_capacity: 100,
            connection_lines: true,
            connection_distance: 6.0,
            max_connections: 64,
        }
    }
}

/// All scene tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub preset: MotionPreset,

    // === Springs ===
    pub idle_spring: SpringSettings,
    pub active_spring: SpringSettings,
    /// Per-frame spin applied to idle tiles (radians)
    pub idle_spin: Vec3,

    pub orbit: OrbitSettings,
    pub transition: TransitionSettings,
    pub hover: HoverSettings,
    pub drag: DragSettings,
    pub forces: ForceSettings,
    pub effects: EffectSettings,

    /// Seed for idle placement and flocking jitter
    pub seed: u64,

    // === Accessibility ===
    /// Disables idle spin, forces and pointer effects
    pub reduced_motion: bool,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            preset: MotionPreset::Standard,

            idle_spring: SpringSettings::idle(),
            active_spring: SpringSettings::active(),
            idle_spin: Vec3::from_array(IDLE_SPIN),

            orbit: OrbitSettings::default(),
            transition: TransitionSettings::default(),
            hover: HoverSettings::default(),
            drag: DragSettings::default(),
            forces: ForceSettings::default(),
            effects: EffectSettings::default(),

            seed: 42,

            reduced_motion: false,
        }
    }
}

impl SceneSettings {
    /// Create settings from a motion preset
    pub fn from_preset(preset: MotionPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a motion preset
    pub fn apply_preset(&mut self, preset: MotionPreset) {
        self.preset = preset;

        // Calm scenes skip the flocking wander entirely
        if preset == MotionPreset::Calm {
            self.forces.flocking = false;
        }
    }

    /// Force settings with the preset's scale applied
    pub fn effective_forces(&self) -> ForceSettings {
        let scale = self.preset.force_scale();
        let mut forces = self.forces;
        forces.magnetic_strength *= scale;
        forces.repulsion_strength *= scale;
        forces.repulsion_strength_held *= scale;
        forces.separation_strength *= scale;
        forces.cohesion_strength *= scale;
        forces.alignment_strength *= scale;
        forces.jitter *= scale;
        forces
    }

    /// Effective idle spin (respects reduced_motion)
    pub fn effective_idle_spin(&self) -> Vec3 {
        if self.reduced_motion {
            Vec3::ZERO
        } else {
            self.idle_spin
        }
    }

    /// Effective orbit speed (respects preset and reduced_motion)
    pub fn effective_orbit_speed(&self) -> f32 {
        if self.reduced_motion {
            0.0
        } else {
            self.orbit.speed * self.preset.orbit_scale()
        }
    }

    /// Effective pointer trail (respects reduced_motion)
    pub fn effective_pointer_trail(&self) -> bool {
        self.effects.pointer_trail && !self.reduced_motion
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings ({e})");
                Self::default()
            }
        }
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            SceneSettings::from_json(r#"{"reduced_motion": true, "orbit": {"radius": 10.0}}"#)
                .unwrap();
        assert!(settings.reduced_motion);
        assert_eq!(settings.orbit.radius, 10.0);
        assert_eq!(settings.orbit.speed, ORBIT_SPEED);
        assert_eq!(settings.active_spring, SpringSettings::active());
    }

    #[test]
    fn test_reduced_motion_disables_motion() {
        let mut settings = SceneSettings::default();
        assert_ne!(settings.effective_idle_spin(), Vec3::ZERO);
        settings.reduced_motion = true;
        assert_eq!(settings.effective_idle_spin(), Vec3::ZERO);
        assert_eq!(settings.effective_orbit_speed(), 0.0);
        assert!(!settings.effective_pointer_trail());
    }

    #[test]
    fn test_preset_scales_forces() {
        let calm = SceneSettings::from_preset(MotionPreset::Calm);
        let standard = SceneSettings::default();
        assert!(
            calm.effective_forces().repulsion_strength
                < standard.effective_forces().repulsion_strength
        );
        assert!(!calm.forces.flocking);
        assert_eq!(MotionPreset::from_str("LIVELY"), Some(MotionPreset::Lively));
        assert_eq!(MotionPreset::from_str("wild"), None);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("tilescape-settings-{}.json", std::process::id()));
        let mut settings = SceneSettings::default();
        settings.seed = 7;
        settings.forces.enabled = true;
        settings.save(&path).unwrap();

        let loaded = SceneSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SceneSettings::load("/nonexistent/tilescape.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }
}
