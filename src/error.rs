//! Error types
//!
//! Only construction and configuration calls can fail. A running step is
//! total over every state those calls admit.

use thiserror::Error;

use crate::sim::BallId;

/// Errors reported at the API boundary.
#[derive(Debug, Error)]
pub enum SimError {
    /// Ball or obstacle radius was zero, negative or not finite.
    #[error("invalid radius: {radius}")]
    InvalidRadius {
        /// The rejected radius.
        radius: f32,
    },

    /// Radius is larger than the grid was sized for.
    ///
    /// Cells are `2 * max_radius` wide; a bigger ball could overlap another
    /// one without sharing or neighbouring its cell.
    #[error("radius {radius} exceeds configured max radius {max}")]
    RadiusExceedsGrid {
        /// The rejected radius.
        radius: f32,
        /// Configured `max_radius`.
        max: f32,
    },

    /// Spawn position was not finite or not fully inside the world, or a
    /// drag position was not finite.
    #[error("invalid position: ({x}, {y})")]
    InvalidPosition { x: f32, y: f32 },

    /// Spawn velocity was not finite.
    #[error("invalid velocity: ({x}, {y})")]
    InvalidVelocity { x: f32, y: f32 },

    /// World bounds are not finite or too small to hold a ball.
    #[error("invalid bounds: {width}x{height}")]
    InvalidBounds { width: f32, height: f32 },

    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// No ball with this handle exists.
    #[error("unknown ball: {0:?}")]
    UnknownBall(BallId),

    /// Configuration JSON could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
