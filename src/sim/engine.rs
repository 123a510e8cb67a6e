//! Physics engine: owns the world and drives the sub-step loop
//!
//! Per `update(dt)`, for each of `sub_steps` equal slices of `dt`:
//! 1. integrate, attract and constrain every ball
//! 2. clear and rebuild the spatial grid
//! 3. for each ball in order: resolve against grid neighbours, then against
//!    every obstacle
//!
//! Balls live in one `Vec` addressed by index during a step and by [`BallId`]
//! from outside. Resolution order is insertion order, so outcomes in dense
//! clusters depend on it. That order only changes on spawn or removal.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::bounds::{Bounds, constrain_to_bounds};
use super::collision::{resolve_ball_obstacle, resolve_ball_pair};
use super::grid::SpatialGrid;
use super::state::{Attractor, Ball, BallId, CollisionEvent, Color, ContactKind, Obstacle};
use crate::config::SimConfig;
use crate::consts::PALETTE;
use crate::error::{Result, SimError};

/// Stream offset so event throttling never perturbs the spawn sequence
const EVENT_STREAM: u64 = 0x00E7_E175;

/// Assumed frame time before the first `update`
const NOMINAL_FRAME_DT: f32 = 1.0 / 60.0;

/// Spawn parameters; `None` fields are randomized from the config
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpawnRequest {
    pub position: Option<Vec2>,
    pub radius: Option<f32>,
    pub color: Option<Color>,
    /// Initial velocity (pixels/s)
    pub velocity: Option<Vec2>,
}

impl SpawnRequest {
    pub fn at(position: Vec2) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = Some(velocity);
        self
    }
}

/// Telemetry for one `update` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Ball-ball contacts resolved, summed over sub-steps
    pub collisions: u32,
    /// Ball-obstacle contacts resolved, summed over sub-steps
    pub obstacle_hits: u32,
    /// Collision events queued
    pub events: u32,
    pub sub_steps: u32,
}

/// The simulation world
#[derive(Debug, Clone)]
pub struct PhysicsEngine {
    config: SimConfig,
    bounds: Bounds,
    balls: Vec<Ball>,
    obstacles: Vec<Obstacle>,
    attractor: Attractor,
    grid: SpatialGrid,
    /// Scratch for grid queries
    nearby: Vec<usize>,
    events: Vec<CollisionEvent>,
    stats: StepStats,
    rng: Pcg32,
    event_rng: Pcg32,
    /// Sub-step length of the last update; converts pixels/s to pixels/step
    sub_dt: f32,
    next_id: u32,
}

impl PhysicsEngine {
    /// Create an empty world of `width x height` pixels
    pub fn new(config: SimConfig, width: f32, height: f32) -> Result<Self> {
        config.validate()?;
        let bounds = Bounds::new(width, height)?;
        if !bounds.fits(config.max_radius) {
            return Err(SimError::InvalidBounds { width, height });
        }

        log::info!(
            "Physics engine: {}x{} bounds, {} sub-steps, cell size {}",
            width,
            height,
            config.sub_steps,
            config.cell_size()
        );

        Ok(Self {
            grid: SpatialGrid::new(config.cell_size(), &bounds),
            attractor: Attractor::inactive(config.attraction_radius, config.attraction_strength),
            rng: Pcg32::seed_from_u64(config.seed),
            event_rng: Pcg32::seed_from_u64(config.seed ^ EVENT_STREAM),
            sub_dt: NOMINAL_FRAME_DT / config.sub_steps as f32,
            bounds,
            balls: Vec::new(),
            obstacles: Vec::new(),
            nearby: Vec::new(),
            events: Vec::new(),
            stats: StepStats::default(),
            next_id: 1,
            config,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Resize the world (viewport change). Balls outside are pulled back in
    /// by the next boundary pass.
    pub fn set_bounds(&mut self, width: f32, height: f32) -> Result<()> {
        let bounds = Bounds::new(width, height)?;
        if !bounds.fits(self.config.max_radius) {
            return Err(SimError::InvalidBounds { width, height });
        }
        self.bounds = bounds;
        self.grid.resize(&bounds);
        log::info!("Bounds resized to {width}x{height}");
        Ok(())
    }

    // === Population ===

    /// Replace all balls with `count` random ones
    pub fn init(&mut self, count: usize) -> Result<()> {
        self.balls.clear();
        self.events.clear();
        self.stats = StepStats::default();
        self.balls.reserve(count);
        for _ in 0..count {
            self.spawn_one(SpawnRequest::default())?;
        }
        log::info!(
            "Initialized {} balls in {}x{}",
            count,
            self.bounds.width,
            self.bounds.height
        );
        Ok(())
    }

    /// Append one ball
    pub fn spawn_one(&mut self, request: SpawnRequest) -> Result<BallId> {
        let radius = match request.radius {
            Some(radius) => radius,
            None => self
                .rng
                .random_range(self.config.min_radius..=self.config.max_radius),
        };
        if !(radius.is_finite() && radius > 0.0) {
            log::warn!("Rejected spawn: radius {radius}");
            return Err(SimError::InvalidRadius { radius });
        }
        if radius > self.config.max_radius {
            log::warn!("Rejected spawn: radius {radius} over grid limit");
            return Err(SimError::RadiusExceedsGrid {
                radius,
                max: self.config.max_radius,
            });
        }
        if !self.bounds.fits(radius) {
            return Err(SimError::InvalidBounds {
                width: self.bounds.width,
                height: self.bounds.height,
            });
        }

        let position = match request.position {
            Some(position) => position,
            None => Vec2::new(
                self.rng.random_range(radius..=self.bounds.width - radius),
                self.rng.random_range(radius..=self.bounds.height - radius),
            ),
        };
        let color = match request.color {
            Some(color) => color,
            None => Color(PALETTE[self.rng.random_range(0..PALETTE.len())]),
        };
        let velocity = match request.velocity {
            Some(velocity) => velocity,
            None => {
                let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
                let speed = self.rng.random_range(0.0..=self.config.spawn_jitter);
                Vec2::from_angle(angle) * speed
            }
        };
        if !velocity.is_finite() {
            return Err(SimError::InvalidVelocity {
                x: velocity.x,
                y: velocity.y,
            });
        }

        let id = BallId(self.next_id);
        let mut ball = Ball::new(id, position, radius, color)?;
        // Explicit positions must already sit fully inside the world
        if !self.bounds.contains_ball(&ball, 0.0) {
            log::warn!("Rejected spawn: ({}, {}) outside bounds", position.x, position.y);
            return Err(SimError::InvalidPosition {
                x: position.x,
                y: position.y,
            });
        }
        ball.set_velocity(velocity * self.sub_dt);
        self.next_id += 1;
        self.balls.push(ball);
        Ok(id)
    }

    /// Remove a ball, keeping the order of the rest
    pub fn remove_ball(&mut self, id: BallId) -> Result<Ball> {
        let index = self.index_of(id)?;
        Ok(self.balls.remove(index))
    }

    /// Remove every ball
    pub fn clear(&mut self) {
        self.balls.clear();
        self.grid.clear();
        self.events.clear();
        self.stats = StepStats::default();
    }

    /// Install the static obstacles
    pub fn set_obstacles(&mut self, obstacles: Vec<Obstacle>) {
        log::info!("Installed {} obstacles", obstacles.len());
        self.obstacles = obstacles;
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    // === Read access ===

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn ball(&self, id: BallId) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    /// Direct access for hosts that overwrite state between frames
    pub fn ball_mut(&mut self, id: BallId) -> Option<&mut Ball> {
        self.balls.iter_mut().find(|b| b.id == id)
    }

    /// Topmost (most recently spawned) ball under a point
    pub fn ball_at(&self, point: Vec2) -> Option<BallId> {
        self.balls.iter().rev().find(|b| b.contains(point)).map(|b| b.id)
    }

    fn index_of(&self, id: BallId) -> Result<usize> {
        self.balls
            .iter()
            .position(|b| b.id == id)
            .ok_or(SimError::UnknownBall(id))
    }

    // === External input ===

    /// Point the attraction well at `position`
    pub fn set_attractor(&mut self, position: Vec2, active: bool) {
        self.attractor.position = position;
        self.attractor.active = active && position.is_finite();
    }

    pub fn clear_attractor(&mut self) {
        self.attractor.active = false;
    }

    pub fn attractor(&self) -> &Attractor {
        &self.attractor
    }

    /// Pin a ball for pointer dragging
    pub fn grab(&mut self, id: BallId) -> Result<()> {
        let index = self.index_of(id)?;
        self.balls[index].pin();
        Ok(())
    }

    /// Move a grabbed ball (grabbing it if needed)
    pub fn drag_to(&mut self, id: BallId, position: Vec2) -> Result<()> {
        if !position.is_finite() {
            return Err(SimError::InvalidPosition {
                x: position.x,
                y: position.y,
            });
        }
        let index = self.index_of(id)?;
        let ball = &mut self.balls[index];
        ball.position = position;
        ball.pin();
        Ok(())
    }

    /// Hand a ball back to the simulation, optionally flung (pixels/s)
    pub fn release(&mut self, id: BallId, velocity: Vec2) -> Result<()> {
        let index = self.index_of(id)?;
        let velocity = if velocity.is_finite() {
            velocity
        } else {
            Vec2::ZERO
        };
        self.balls[index].unpin(velocity * self.sub_dt);
        Ok(())
    }

    // === Output ===

    /// Telemetry from the last `update`
    pub fn stats(&self) -> StepStats {
        self.stats
    }

    /// Events queued by the last `update`
    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    /// Take the queued events for dispatch
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, CollisionEvent> {
        self.events.drain(..)
    }

    // === Stepping ===

    /// Advance the world by `dt` seconds.
    ///
    /// Telemetry and the event queue restart at each call; drain events
    /// before the next one. A non-positive or non-finite `dt` does nothing.
    pub fn update(&mut self, dt: f32) -> StepStats {
        self.stats = StepStats::default();
        self.events.clear();
        if !(dt.is_finite() && dt > 0.0) {
            return self.stats;
        }

        let sub_steps = self.config.sub_steps.max(1);
        let sub_dt = dt / sub_steps as f32;
        self.sub_dt = sub_dt;
        let gravity_step = self.config.gravity * sub_dt * sub_dt;

        for _ in 0..sub_steps {
            self.integrate(gravity_step);
            if self.balls.is_empty() {
                continue;
            }
            self.rebuild_grid();
            self.resolve_contacts(sub_dt);
        }

        self.stats.sub_steps = sub_steps;
        if self.events.len() >= self.config.max_events_per_update {
            log::debug!("Event budget exhausted ({})", self.config.max_events_per_update);
        }
        log::debug!(
            "update: {} balls, {} collisions, {} obstacle hits, {} events",
            self.balls.len(),
            self.stats.collisions,
            self.stats.obstacle_hits,
            self.stats.events
        );
        self.stats
    }

    fn integrate(&mut self, gravity_step: f32) {
        let friction = self.config.friction;
        let restitution = self.config.restitution;
        let floor_friction = self.config.floor_friction;
        for ball in &mut self.balls {
            ball.integrate(gravity_step, friction);
            ball.attract(&self.attractor);
            constrain_to_bounds(ball, &self.bounds, restitution, floor_friction);
        }
    }

    fn rebuild_grid(&mut self) {
        self.grid.clear();
        for (index, ball) in self.balls.iter().enumerate() {
            self.grid.insert(index, ball.position);
        }
    }

    fn resolve_contacts(&mut self, sub_dt: f32) {
        let ball_bounce = self.config.collision_bounce;
        let obstacle_bounce = self.config.obstacle_bounce;

        for i in 0..self.balls.len() {
            self.grid.query_nearby(self.balls[i].position, &mut self.nearby);
            for &j in &self.nearby {
                // Each pair once, from its lower index
                if j <= i {
                    continue;
                }
                let (a, b) = pair_mut(&mut self.balls, i, j);
                if let Some(contact) = resolve_ball_pair(a, b, ball_bounce) {
                    self.stats.collisions += 1;
                    let event = CollisionEvent {
                        kind: ContactKind::Ball,
                        point: contact.point,
                        speed: contact.relative_velocity.length() / sub_dt,
                        color: a.color,
                    };
                    if offer_event(&mut self.events, &mut self.event_rng, &self.config, event) {
                        self.stats.events += 1;
                    }
                }
            }

            let ball = &mut self.balls[i];
            for obstacle in &self.obstacles {
                if let Some(contact) = resolve_ball_obstacle(ball, obstacle, obstacle_bounce) {
                    self.stats.obstacle_hits += 1;
                    let event = CollisionEvent {
                        kind: ContactKind::Obstacle,
                        point: contact.point,
                        speed: contact.relative_velocity.dot(contact.normal).abs() / sub_dt,
                        color: ball.color,
                    };
                    if offer_event(&mut self.events, &mut self.event_rng, &self.config, event) {
                        self.stats.events += 1;
                    }
                }
            }
        }
    }
}

/// Two distinct mutable balls, `i < j`
fn pair_mut(balls: &mut [Ball], i: usize, j: usize) -> (&mut Ball, &mut Ball) {
    debug_assert!(i < j);
    let (head, tail) = balls.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

/// Queue an event if it is fast enough, under budget and wins the roll
fn offer_event(
    events: &mut Vec<CollisionEvent>,
    rng: &mut Pcg32,
    config: &SimConfig,
    event: CollisionEvent,
) -> bool {
    if event.speed < config.event_speed_threshold
        || events.len() >= config.max_events_per_update
        || rng.random::<f32>() >= config.event_probability
    {
        return false;
    }
    events.push(event);
    true
}
