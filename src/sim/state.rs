//! Simulation entities
//!
//! Balls carry Verlet state: current and previous position. Velocity is never
//! stored; it is always `position - prev_position`, in pixels per sub-step.
//! Anything that moves a ball without meaning to change its velocity must move
//! both positions together (see [`Ball::translate`]).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::CONTACT_EPSILON;
use crate::error::{Result, SimError};

/// Stable handle to a ball. Never reused within an engine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BallId(pub u32);

/// Opaque colour tag (0xRRGGBB). Physics passes it through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }
}

/// Whether the engine owns a ball's motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Motion {
    /// Integrated, constrained and pushed around by contacts
    #[default]
    Dynamic,
    /// Held by an external owner (pointer drag). Still collides, as an
    /// immovable body with zero velocity.
    Pinned,
}

/// A dynamic disk
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub id: BallId,
    pub position: Vec2,
    pub prev_position: Vec2,
    pub color: Color,
    motion: Motion,
    radius: f32,
    mass: f32,
    inverse_mass: f32,
}

impl Ball {
    /// Create a resting ball. Mass is area-proportional (`π·r²`).
    pub fn new(id: BallId, position: Vec2, radius: f32, color: Color) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(SimError::InvalidRadius { radius });
        }
        if !position.is_finite() {
            return Err(SimError::InvalidPosition {
                x: position.x,
                y: position.y,
            });
        }
        let mass = std::f32::consts::PI * radius * radius;
        Ok(Self {
            id,
            position,
            prev_position: position,
            color,
            motion: Motion::Dynamic,
            radius,
            mass,
            inverse_mass: 1.0 / mass,
        })
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    #[inline]
    pub fn motion(&self) -> Motion {
        self.motion
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.motion == Motion::Pinned
    }

    /// Implicit velocity (pixels per sub-step)
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.position - self.prev_position
    }

    /// Set the implicit velocity by rewriting the previous position
    #[inline]
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.prev_position = self.position - velocity;
    }

    /// Move without changing velocity
    #[inline]
    pub fn translate(&mut self, offset: Vec2) {
        self.position += offset;
        self.prev_position += offset;
    }

    /// Change velocity by `impulse / mass`
    #[inline]
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.prev_position -= impulse * self.inverse_mass;
    }

    /// `½·m·|v|²` from the implicit velocity. For effect intensity only.
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity().length_squared()
    }

    /// Check if a point lies inside the ball
    pub fn contains(&self, point: Vec2) -> bool {
        self.position.distance_squared(point) <= self.radius * self.radius
    }

    /// Hand the ball to an external owner; it presents zero velocity
    pub fn pin(&mut self) {
        self.motion = Motion::Pinned;
        self.prev_position = self.position;
    }

    /// Return the ball to the engine with the given velocity
    pub fn unpin(&mut self, velocity: Vec2) {
        self.motion = Motion::Dynamic;
        self.set_velocity(velocity);
    }

    /// One Verlet step: `V = (P - P₀)·friction; P₀ = P; P += V + (0, g·dt²)`
    ///
    /// Friction scales the carried velocity before advancing, so values just
    /// under 1.0 bleed a little energy every sub-step.
    pub fn integrate(&mut self, gravity_step: f32, friction: f32) {
        if self.is_pinned() {
            self.prev_position = self.position;
            return;
        }
        let velocity = self.velocity() * friction;
        self.prev_position = self.position;
        self.position += velocity + Vec2::new(0.0, gravity_step);
    }

    /// Positional pull toward an active attraction point.
    ///
    /// Falls off as `(1 - d/R)²` and moves position only, so it shows up as
    /// velocity on the next step.
    pub fn attract(&mut self, attractor: &Attractor) {
        if self.is_pinned() || !attractor.active {
            return;
        }
        let to_point = attractor.position - self.position;
        let dist = to_point.length();
        if dist >= attractor.radius || dist < CONTACT_EPSILON {
            return;
        }
        let falloff = 1.0 - dist / attractor.radius;
        self.position += to_point / dist * falloff * falloff * attractor.strength;
    }
}

/// A static circular peg. Infinite mass; never moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: Vec2,
    radius: f32,
}

impl Obstacle {
    pub fn new(position: Vec2, radius: f32) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(SimError::InvalidRadius { radius });
        }
        if !position.is_finite() {
            return Err(SimError::InvalidPosition {
                x: position.x,
                y: position.y,
            });
        }
        Ok(Self { position, radius })
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }
}

/// External pointer influence ("gravity well")
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attractor {
    pub position: Vec2,
    pub active: bool,
    /// Range of influence (pixels)
    pub radius: f32,
    /// Nudge at the centre (pixels per sub-step)
    pub strength: f32,
}

impl Attractor {
    pub fn inactive(radius: f32, strength: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            active: false,
            radius,
            strength,
        }
    }
}

/// What a collision event was between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Ball,
    Obstacle,
}

/// A contact worth showing or hearing. Best-effort and throttled; the host
/// drains these after `update` and forwards them to effects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub kind: ContactKind,
    /// Midpoint between the two centres
    pub point: Vec2,
    /// Relative speed along the contact (pixels/s)
    pub speed: f32,
    /// Colour of the first ball in the pair
    pub color: Color,
}
