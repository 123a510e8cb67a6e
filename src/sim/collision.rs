//! Narrow-phase contact resolution
//!
//! Pure functions over one candidate pair. Each corrects overlap along the
//! contact normal, then applies a velocity response through the Verlet
//! previous position.
//!
//! Positional correction moves position and previous position together so it
//! does not itself add velocity; all velocity change comes from the impulse.
//!
//! Pairs are resolved one at a time in collection order. In a dense cluster a
//! single pass can leave mild interpenetration; it shrinks over later
//! sub-steps.

use glam::Vec2;

use super::state::{Ball, Obstacle};
use crate::consts::CONTACT_EPSILON;

/// A resolved contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Midpoint between the centres, after correction
    pub point: Vec2,
    /// Unit normal from the first body toward the second (ball-ball), or from
    /// the obstacle toward the ball
    pub normal: Vec2,
    /// Overlap before correction
    pub penetration: f32,
    /// First velocity minus second, before the impulse (pixels per sub-step)
    pub relative_velocity: Vec2,
}

/// Unit normal and distance for a centre delta.
///
/// Coincident centres have no direction; fall back to +X at epsilon distance.
#[inline]
fn contact_normal(delta: Vec2, dist_sq: f32) -> (Vec2, f32) {
    let dist = dist_sq.sqrt();
    if dist < CONTACT_EPSILON {
        (Vec2::X, CONTACT_EPSILON)
    } else {
        (delta / dist, dist)
    }
}

/// Resolve an overlapping ball pair.
///
/// Overlap is split by mass: each ball moves `penetration · m_other / (m1+m2)`,
/// so the heavier one moves less. A pinned ball still counts its mass in that
/// split but never moves. If the balls approach along the normal, an impulse
/// `2·dot / (im1 + im2) · bounce` is applied to whichever of them is dynamic.
///
/// Returns `None` when the circles do not overlap.
pub fn resolve_ball_pair(a: &mut Ball, b: &mut Ball, bounce: f32) -> Option<Contact> {
    let delta = b.position - a.position;
    let min_dist = a.radius() + b.radius();
    let dist_sq = delta.length_squared();
    if dist_sq >= min_dist * min_dist {
        return None;
    }

    let (normal, dist) = contact_normal(delta, dist_sq);
    let penetration = min_dist - dist;
    let relative_velocity = a.velocity() - b.velocity();

    let total_mass = a.mass() + b.mass();
    if !a.is_pinned() {
        a.translate(-normal * penetration * (b.mass() / total_mass));
    }
    if !b.is_pinned() {
        b.translate(normal * penetration * (a.mass() / total_mass));
    }

    let approach = relative_velocity.dot(normal);
    if approach > 0.0 {
        let impulse = 2.0 * approach / (a.inverse_mass() + b.inverse_mass()) * bounce;
        if !a.is_pinned() {
            a.apply_impulse(-normal * impulse);
        }
        if !b.is_pinned() {
            b.apply_impulse(normal * impulse);
        }
    }

    Some(Contact {
        point: (a.position + b.position) * 0.5,
        normal,
        penetration,
        relative_velocity,
    })
}

/// Resolve a ball against a static obstacle.
///
/// The ball takes the full overlap. If it is moving into the obstacle, the
/// normal part of its velocity is reflected and scaled by `bounce`. Pinned
/// balls are skipped.
pub fn resolve_ball_obstacle(ball: &mut Ball, obstacle: &Obstacle, bounce: f32) -> Option<Contact> {
    if ball.is_pinned() {
        return None;
    }

    let delta = ball.position - obstacle.position;
    let min_dist = ball.radius() + obstacle.radius();
    let dist_sq = delta.length_squared();
    if dist_sq >= min_dist * min_dist {
        return None;
    }

    let (normal, dist) = contact_normal(delta, dist_sq);
    let penetration = min_dist - dist;
    let velocity = ball.velocity();

    ball.translate(normal * penetration);

    let normal_speed = velocity.dot(normal);
    if normal_speed < 0.0 {
        ball.set_velocity(velocity - normal * normal_speed * (1.0 + bounce));
    }

    Some(Contact {
        point: (ball.position + obstacle.position) * 0.5,
        normal,
        penetration,
        relative_velocity: velocity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{BallId, Color};

    fn ball(id: u32, x: f32, y: f32, r: f32) -> Ball {
        Ball::new(BallId(id), Vec2::new(x, y), r, Color(id)).unwrap()
    }

    #[test]
    fn test_separated_pair_untouched() {
        let mut a = ball(1, 0.0, 0.0, 5.0);
        let mut b = ball(2, 10.0, 0.0, 5.0);
        assert!(resolve_ball_pair(&mut a, &mut b, 1.0).is_none());
        assert_eq!(a.position, Vec2::ZERO);
        assert_eq!(b.position, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_equal_masses_split_overlap() {
        let mut a = ball(1, 0.0, 0.0, 5.0);
        let mut b = ball(2, 6.0, 0.0, 5.0);
        let contact = resolve_ball_pair(&mut a, &mut b, 1.0).unwrap();
        assert!((contact.penetration - 4.0).abs() < 1e-5);
        assert!((a.position.x - -2.0).abs() < 1e-5);
        assert!((b.position.x - 8.0).abs() < 1e-5);
        // Resting pair gains no velocity from correction
        assert_eq!(a.velocity(), Vec2::ZERO);
        assert_eq!(b.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_mass_weighted_displacement() {
        // r 2:1 -> mass 4:1; heavy moves 1/5, light 4/5
        let mut heavy = ball(1, 0.0, 0.0, 10.0);
        let mut light = ball(2, 10.0, 0.0, 5.0);
        resolve_ball_pair(&mut heavy, &mut light, 1.0).unwrap();

        let heavy_moved = -heavy.position.x;
        let light_moved = light.position.x - 10.0;
        let total = heavy_moved + light_moved;
        assert!((total - 5.0).abs() < 1e-4);
        assert!((heavy_moved / total - 0.2).abs() < 1e-4);
        assert!((light_moved / total - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_head_on_exchange() {
        let mut a = ball(1, 115.0, 100.0, 10.0);
        let mut b = ball(2, 125.0, 100.0, 10.0);
        a.set_velocity(Vec2::new(5.0, 0.0));
        b.set_velocity(Vec2::new(-5.0, 0.0));

        let contact = resolve_ball_pair(&mut a, &mut b, 1.0).unwrap();
        assert_eq!(contact.relative_velocity, Vec2::new(10.0, 0.0));
        assert!(a.position.distance(b.position) >= 20.0 - 1e-4);
        assert!((a.velocity().x - -5.0).abs() < 1e-4);
        assert!((b.velocity().x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_separating_pair_gets_no_impulse() {
        let mut a = ball(1, 0.0, 0.0, 5.0);
        let mut b = ball(2, 8.0, 0.0, 5.0);
        a.set_velocity(Vec2::new(-1.0, 0.0));
        b.set_velocity(Vec2::new(1.0, 0.0));
        resolve_ball_pair(&mut a, &mut b, 1.0).unwrap();
        assert!((a.velocity().x - -1.0).abs() < 1e-5);
        assert!((b.velocity().x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_coincident_centres_use_fixed_axis() {
        let mut a = ball(1, 50.0, 50.0, 5.0);
        let mut b = ball(2, 50.0, 50.0, 5.0);
        let contact = resolve_ball_pair(&mut a, &mut b, 1.0).unwrap();
        assert_eq!(contact.normal, Vec2::X);
        assert!(a.position.is_finite() && b.position.is_finite());
        assert!(b.position.x > a.position.x);
        assert_eq!(a.position.y, 50.0);
    }

    #[test]
    fn test_pinned_ball_never_moves() {
        let mut pinned = ball(1, 0.0, 0.0, 5.0);
        pinned.pin();
        let mut other = ball(2, 6.0, 0.0, 5.0);
        other.set_velocity(Vec2::new(-2.0, 0.0));

        resolve_ball_pair(&mut pinned, &mut other, 1.0).unwrap();
        assert_eq!(pinned.position, Vec2::ZERO);
        assert_eq!(pinned.velocity(), Vec2::ZERO);
        // Other takes its mass share of the overlap. Equal masses: its normal
        // velocity goes into the pin, which absorbs it.
        assert!((other.position.x - 8.0).abs() < 1e-5);
        assert!(other.velocity().x.abs() < 1e-4);
    }

    #[test]
    fn test_obstacle_takes_full_overlap() {
        let obstacle = Obstacle::new(Vec2::new(0.0, 0.0), 10.0).unwrap();
        let mut b = ball(1, 0.0, -12.0, 5.0);
        b.set_velocity(Vec2::new(0.0, 4.0));
        let before = b.position;

        let contact = resolve_ball_obstacle(&mut b, &obstacle, 1.0).unwrap();
        assert!((contact.penetration - 3.0).abs() < 1e-5);
        let outward = (b.position - before).dot(contact.normal);
        assert!((outward - contact.penetration).abs() < 1e-5);
        assert_eq!(obstacle.position, Vec2::ZERO);
        // Reflected: now moving up, away from the peg
        assert!((b.velocity().y - -4.0).abs() < 1e-4);
    }

    #[test]
    fn test_obstacle_bounce_scales_reflection() {
        let obstacle = Obstacle::new(Vec2::ZERO, 10.0).unwrap();
        let mut b = ball(1, 14.0, 0.0, 5.0);
        b.set_velocity(Vec2::new(-2.0, 1.0));
        resolve_ball_obstacle(&mut b, &obstacle, 0.5).unwrap();
        assert!((b.velocity().x - 1.0).abs() < 1e-5);
        assert!((b.velocity().y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_obstacle_ignores_pinned() {
        let obstacle = Obstacle::new(Vec2::ZERO, 10.0).unwrap();
        let mut b = ball(1, 3.0, 0.0, 5.0);
        b.pin();
        assert!(resolve_ball_obstacle(&mut b, &obstacle, 1.0).is_none());
        assert_eq!(b.position, Vec2::new(3.0, 0.0));
    }
}
