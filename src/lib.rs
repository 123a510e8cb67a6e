//! Verlet Pit - A real-time 2D ball pit physics core
//!
//! Core modules:
//! - `sim`: Simulation (entities, broad phase, collision response, engine)
//! - `config`: Data-driven tuning constants
//! - `snapshot`: Flat per-ball instance records for a renderer
//! - `platform`: Browser bindings (wasm32 only)

pub mod config;
pub mod error;
pub mod platform;
pub mod sim;
pub mod snapshot;

pub use config::{QualityPreset, SimConfig};
pub use error::{Result, SimError};
pub use sim::{Ball, BallId, CollisionEvent, Obstacle, PhysicsEngine, SpawnRequest, StepStats};

/// Simulation defaults (screen units are pixels, y grows downward)
pub mod consts {
    /// Downward acceleration (pixels/s²)
    pub const GRAVITY: f32 = 1800.0;
    /// Velocity retained per sub-step (1.0 = frictionless)
    pub const FRICTION: f32 = 0.999;
    /// Sub-steps per `update` call
    pub const SUB_STEPS: u32 = 8;

    /// Ball radius range for random spawns
    pub const MIN_BALL_RADIUS: f32 = 6.0;
    pub const MAX_BALL_RADIUS: f32 = 16.0;

    /// Wall/floor restitution
    pub const RESTITUTION: f32 = 0.6;
    /// Horizontal velocity bled on floor contact (0 = none, 1 = full stop)
    pub const FLOOR_FRICTION: f32 = 0.08;
    /// Ball-ball impulse scale (1.0 = perfectly elastic)
    pub const COLLISION_BOUNCE: f32 = 0.9;
    /// Ball-obstacle bounce; obstacles feel harder than balls
    pub const OBSTACLE_BOUNCE: f32 = 0.95;

    /// Pointer "gravity well"
    pub const ATTRACTION_RADIUS: f32 = 260.0;
    pub const ATTRACTION_STRENGTH: f32 = 0.35;

    /// Collision events: minimum relative speed (pixels/s) and emit chance
    pub const EVENT_SPEED_THRESHOLD: f32 = 240.0;
    pub const EVENT_PROBABILITY: f32 = 0.3;
    pub const MAX_EVENTS_PER_UPDATE: usize = 64;

    /// Max random initial speed for spawned balls (pixels/s)
    pub const SPAWN_JITTER: f32 = 180.0;

    /// Substitute distance for coincident centres
    pub const CONTACT_EPSILON: f32 = 1.0e-4;

    /// Spawn palette (0xRRGGBB)
    pub const PALETTE: [u32; 8] = [
        0xFF_5E_5B, 0xFF_B3_47, 0xF9_F7_5F, 0x7B_E0_7B, 0x4F_C3_F7, 0x7C_6C_FF, 0xE0_6C_FF,
        0xF5_F5_F5,
    ];
}
