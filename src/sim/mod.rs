//! Simulation module
//!
//! All physics lives here. This module is pure and platform-free:
//! - Variable frame time, split into fixed-count sub-steps
//! - Seeded RNG only
//! - Stable iteration order (insertion order)
//! - No rendering or platform dependencies

pub mod bounds;
pub mod collision;
pub mod engine;
pub mod grid;
pub mod scenario;
pub mod state;

pub use bounds::{Bounds, WallHits, constrain_to_bounds};
pub use collision::{Contact, resolve_ball_obstacle, resolve_ball_pair};
pub use engine::{PhysicsEngine, SpawnRequest, StepStats};
pub use grid::SpatialGrid;
pub use state::{Attractor, Ball, BallId, CollisionEvent, Color, ContactKind, Motion, Obstacle};
