//! Screen-rectangle boundary
//!
//! The world spans `[0, width] x [0, height]` with y growing downward, so the
//! floor is the `y = height` edge.

use glam::Vec2;

use super::state::Ball;
use crate::error::{Result, SimError};

/// World rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(SimError::InvalidBounds { width, height });
        }
        Ok(Self { width, height })
    }

    /// Check a ball of this radius has somewhere to sit
    #[inline]
    pub fn fits(&self, radius: f32) -> bool {
        self.width >= radius * 2.0 && self.height >= radius * 2.0
    }

    /// Check a ball's full extent is inside, within `tolerance`
    pub fn contains_ball(&self, ball: &Ball, tolerance: f32) -> bool {
        let r = ball.radius() - tolerance;
        let p = ball.position;
        p.x >= r && p.x <= self.width - r && p.y >= r && p.y <= self.height - r
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width, self.height) * 0.5
    }
}

/// Which edges a ball was clamped against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallHits {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub floor: bool,
}

impl WallHits {
    pub fn any(&self) -> bool {
        self.left || self.right || self.top || self.floor
    }
}

/// Keep a ball inside the bounds, bouncing off the edges.
///
/// A clamped axis gets its implicit velocity reflected inward and scaled by
/// `restitution` (`P₀ = P + V·e` with the sign forced toward the interior).
/// Floor contact also blends previous x toward current x by
/// `floor_friction`. Pinned balls are left alone.
pub fn constrain_to_bounds(
    ball: &mut Ball,
    bounds: &Bounds,
    restitution: f32,
    floor_friction: f32,
) -> WallHits {
    let mut hits = WallHits::default();
    if ball.is_pinned() {
        return hits;
    }

    let r = ball.radius();
    let velocity = ball.velocity();
    let max = Vec2::new(bounds.width - r, bounds.height - r);

    if ball.position.x < r {
        ball.position.x = r;
        ball.prev_position.x = r - velocity.x.abs() * restitution;
        hits.left = true;
    } else if ball.position.x > max.x {
        ball.position.x = max.x;
        ball.prev_position.x = max.x + velocity.x.abs() * restitution;
        hits.right = true;
    }

    if ball.position.y < r {
        ball.position.y = r;
        ball.prev_position.y = r - velocity.y.abs() * restitution;
        hits.top = true;
    } else if ball.position.y > max.y {
        ball.position.y = max.y;
        ball.prev_position.y = max.y + velocity.y.abs() * restitution;
        ball.prev_position.x += (ball.position.x - ball.prev_position.x) * floor_friction;
        hits.floor = true;
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{BallId, Color};

    fn ball_at(x: f32, y: f32, vel: Vec2) -> Ball {
        let mut b = Ball::new(BallId(1), Vec2::new(x, y), 10.0, Color::default()).unwrap();
        b.set_velocity(vel);
        b
    }

    #[test]
    fn test_rejects_degenerate_bounds() {
        assert!(Bounds::new(0.0, 100.0).is_err());
        assert!(Bounds::new(100.0, f32::NAN).is_err());
        assert!(Bounds::new(100.0, 100.0).is_ok());
    }

    #[test]
    fn test_floor_bounce_reflects_and_scales() {
        let bounds = Bounds::new(200.0, 100.0).unwrap();
        let mut b = ball_at(50.0, 95.0, Vec2::new(0.0, 4.0));
        let hits = constrain_to_bounds(&mut b, &bounds, 0.5, 0.0);
        assert!(hits.floor);
        assert_eq!(b.position.y, 90.0);
        assert!((b.velocity().y - -2.0).abs() < 1e-5);
    }

    #[test]
    fn test_floor_friction_damps_horizontal() {
        let bounds = Bounds::new(200.0, 100.0).unwrap();
        let mut b = ball_at(50.0, 95.0, Vec2::new(4.0, 4.0));
        constrain_to_bounds(&mut b, &bounds, 0.5, 0.25);
        assert!((b.velocity().x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_side_walls_point_inward() {
        let bounds = Bounds::new(200.0, 100.0).unwrap();

        let mut left = ball_at(5.0, 50.0, Vec2::new(-3.0, 0.0));
        assert!(constrain_to_bounds(&mut left, &bounds, 1.0, 0.0).left);
        assert_eq!(left.position.x, 10.0);
        assert!(left.velocity().x > 0.0);

        let mut right = ball_at(195.0, 50.0, Vec2::new(3.0, 0.0));
        assert!(constrain_to_bounds(&mut right, &bounds, 1.0, 0.0).right);
        assert_eq!(right.position.x, 190.0);
        assert!(right.velocity().x < 0.0);

        let mut top = ball_at(50.0, 2.0, Vec2::new(0.0, -6.0));
        assert!(constrain_to_bounds(&mut top, &bounds, 1.0, 0.0).top);
        assert!((top.velocity().y - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_inside_untouched() {
        let bounds = Bounds::new(200.0, 100.0).unwrap();
        let mut b = ball_at(50.0, 50.0, Vec2::new(1.0, 1.0));
        let before = b.clone();
        assert!(!constrain_to_bounds(&mut b, &bounds, 0.5, 0.5).any());
        assert_eq!(b, before);
    }

    #[test]
    fn test_pinned_not_clamped() {
        let bounds = Bounds::new(200.0, 100.0).unwrap();
        let mut b = ball_at(-50.0, 50.0, Vec2::ZERO);
        b.pin();
        constrain_to_bounds(&mut b, &bounds, 0.5, 0.5);
        assert_eq!(b.position.x, -50.0);
    }
}
