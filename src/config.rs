//! Simulation tuning
//!
//! Every constant the engine reads lives here. Serialized as JSON; on the web
//! it is persisted in LocalStorage next to the host's own preferences.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Sub-steps per frame for this preset
    pub fn sub_steps(&self) -> u32 {
        match self {
            QualityPreset::Low => 4,
            QualityPreset::Medium => SUB_STEPS,
            QualityPreset::High => 12,
        }
    }

    /// Collision events kept per update (effects budget)
    pub fn max_events(&self) -> usize {
        match self {
            QualityPreset::Low => 16,
            QualityPreset::Medium => MAX_EVENTS_PER_UPDATE,
            QualityPreset::High => 256,
        }
    }
}

/// Physics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Integration ===
    /// Downward acceleration (pixels/s²)
    pub gravity: f32,
    /// Velocity retained per sub-step, in (0, 1]
    pub friction: f32,
    /// Equal sub-steps per `update` call
    pub sub_steps: u32,

    // === Balls ===
    /// Random spawn radius range; `max_radius` also sizes the grid cells
    pub min_radius: f32,
    pub max_radius: f32,
    /// Max random initial speed (pixels/s)
    pub spawn_jitter: f32,

    // === Response ===
    /// Wall/floor restitution, in [0, 1]
    pub restitution: f32,
    /// Floor blend of previous x toward current x, in [0, 1]
    pub floor_friction: f32,
    /// Ball-ball impulse scale, in [0, 1]
    pub collision_bounce: f32,
    /// Ball-obstacle normal reflection scale, in [0, 1]
    pub obstacle_bounce: f32,

    // === Attraction point ===
    pub attraction_radius: f32,
    /// Max positional nudge per sub-step (pixels)
    pub attraction_strength: f32,

    // === Collision events ===
    /// Relative speed (pixels/s) below which no event is reported
    pub event_speed_threshold: f32,
    /// Chance an eligible contact is reported, in [0, 1]
    pub event_probability: f32,
    pub max_events_per_update: usize,

    /// RNG seed for spawns and event throttling
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            friction: FRICTION,
            sub_steps: SUB_STEPS,

            min_radius: MIN_BALL_RADIUS,
            max_radius: MAX_BALL_RADIUS,
            spawn_jitter: SPAWN_JITTER,

            restitution: RESTITUTION,
            floor_friction: FLOOR_FRICTION,
            collision_bounce: COLLISION_BOUNCE,
            obstacle_bounce: OBSTACLE_BOUNCE,

            attraction_radius: ATTRACTION_RADIUS,
            attraction_strength: ATTRACTION_STRENGTH,

            event_speed_threshold: EVENT_SPEED_THRESHOLD,
            event_probability: EVENT_PROBABILITY,
            max_events_per_update: MAX_EVENTS_PER_UPDATE,

            seed: 0x5EED,
        }
    }
}

impl SimConfig {
    /// Create a config from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut config = Self::default();
        config.apply_preset(preset);
        config
    }

    /// Apply a quality preset (updates quality-dependent fields)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.sub_steps = preset.sub_steps();
        self.max_events_per_update = preset.max_events();
    }

    /// Grid cell edge: one max-size ball diameter
    pub fn cell_size(&self) -> f32 {
        self.max_radius * 2.0
    }

    /// Check every field is in range
    pub fn validate(&self) -> Result<()> {
        fn unit(name: &str, v: f32) -> Result<()> {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(SimError::InvalidConfig(format!("{name} must be in [0, 1], got {v}")))
            }
        }

        if !self.gravity.is_finite() {
            return Err(SimError::InvalidConfig("gravity must be finite".into()));
        }
        if !(self.friction > 0.0 && self.friction <= 1.0) {
            return Err(SimError::InvalidConfig(format!(
                "friction must be in (0, 1], got {}",
                self.friction
            )));
        }
        if self.sub_steps == 0 {
            return Err(SimError::InvalidConfig("sub_steps must be at least 1".into()));
        }
        if !(self.min_radius.is_finite() && self.min_radius > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "min_radius must be positive, got {}",
                self.min_radius
            )));
        }
        if !(self.max_radius.is_finite() && self.max_radius >= self.min_radius) {
            return Err(SimError::InvalidConfig(format!(
                "max_radius {} must be >= min_radius {}",
                self.max_radius, self.min_radius
            )));
        }
        if !(self.spawn_jitter.is_finite() && self.spawn_jitter >= 0.0) {
            return Err(SimError::InvalidConfig("spawn_jitter must be >= 0".into()));
        }
        unit("restitution", self.restitution)?;
        unit("floor_friction", self.floor_friction)?;
        unit("collision_bounce", self.collision_bounce)?;
        unit("obstacle_bounce", self.obstacle_bounce)?;
        unit("event_probability", self.event_probability)?;
        if !(self.attraction_radius.is_finite() && self.attraction_radius >= 0.0) {
            return Err(SimError::InvalidConfig("attraction_radius must be >= 0".into()));
        }
        if !self.attraction_strength.is_finite() {
            return Err(SimError::InvalidConfig("attraction_strength must be finite".into()));
        }
        if !(self.event_speed_threshold.is_finite() && self.event_speed_threshold >= 0.0) {
            return Err(SimError::InvalidConfig("event_speed_threshold must be >= 0".into()));
        }
        Ok(())
    }

    /// Parse and validate a JSON config; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "verlet_pit_config";

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded sim config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored sim config: {e}"),
                }
            }
        }

        log::info!("Using default sim config");
        Self::default()
    }

    /// Save config to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Sim config saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
