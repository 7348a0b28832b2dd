//! Collision detection and response for the peg field
//!
//! Pegs are points with a fixed contact distance, lines are segments between
//! two pegs, and the side walls are vertical planes at the board margins.

use glam::Vec2;
use rand::Rng;

use super::board::{MultiplierLine, Peg};
use crate::centered;
use crate::consts::*;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Surface normal at contact, pointing back into the playfield
    pub normal: Vec2,
    /// Depth past the surface; moving `normal * penetration` resolves it
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Squared distance from `p` to the segment `a`-`b`
pub fn dist_to_segment_squared(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance_squared(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance_squared(a + ab * t)
}

/// Index of the first peg the ball touches, in board order
pub fn first_peg_contact(ball_pos: Vec2, pegs: &[Peg]) -> Option<usize> {
    pegs.iter()
        .position(|peg| ball_pos.distance_squared(peg.pos) < PEG_HIT_DIST_SQ)
}

/// Whether the ball touches a multiplier line
pub fn touches_line(ball_pos: Vec2, line: &MultiplierLine) -> bool {
    line.active && dist_to_segment_squared(ball_pos, line.start, line.end) < LINE_HIT_DIST_SQ
}

/// Velocity after bouncing off a peg.
///
/// The direction is the peg-to-ball angle plus a random offset, the
/// magnitude a base force plus a random share, both scaled by the ball's
/// chaos factor horizontally. Vertical speed always points down the board.
pub fn peg_bounce<R: Rng + ?Sized>(ball_pos: Vec2, peg_pos: Vec2, chaos: f32, rng: &mut R) -> Vec2 {
    let d = ball_pos - peg_pos;
    let angle = d.y.atan2(d.x);
    let force = BOUNCE_FORCE_BASE + rng.random::<f32>() * BOUNCE_FORCE_RANDOM;
    let angle = angle + centered(rng, BOUNCE_ANGLE_SPREAD);

    Vec2::new(
        angle.cos() * force * chaos,
        (angle.sin() * force).abs() + rng.random::<f32>() * BOUNCE_EXTRA_DOWNWARD,
    )
}

/// Check the ball against the side walls
pub fn side_wall_collision(ball_pos: Vec2) -> CollisionResult {
    let min_x = WALL_MARGIN;
    let max_x = BOARD_WIDTH - WALL_MARGIN;

    if ball_pos.x < min_x {
        CollisionResult {
            hit: true,
            normal: Vec2::X,
            penetration: min_x - ball_pos.x,
        }
    } else if ball_pos.x > max_x {
        CollisionResult {
            hit: true,
            normal: Vec2::NEG_X,
            penetration: ball_pos.x - max_x,
        }
    } else {
        CollisionResult::miss()
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::board::LineId;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn line(start: Vec2, end: Vec2) -> MultiplierLine {
        MultiplierLine {
            id: LineId { row: 3, start: 0 },
            start,
            end,
            multiplier: 2,
            active: true,
        }
    }

    #[test]
    fn test_dist_to_segment() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        // Above the middle
        assert!((dist_to_segment_squared(Vec2::new(5.0, 3.0), a, b) - 9.0).abs() < 1e-4);
        // Beyond the end clamps to the endpoint
        assert!((dist_to_segment_squared(Vec2::new(13.0, 4.0), a, b) - 25.0).abs() < 1e-4);
        // Degenerate segment
        assert!((dist_to_segment_squared(Vec2::new(3.0, 4.0), a, a) - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_first_peg_contact() {
        let pegs = vec![
            Peg::new(Vec2::new(100.0, 100.0), 0),
            Peg::new(Vec2::new(110.0, 100.0), 0),
        ];
        // Touches both; the first in order wins
        assert_eq!(first_peg_contact(Vec2::new(105.0, 100.0), &pegs), Some(0));
        assert_eq!(first_peg_contact(Vec2::new(125.0, 100.0), &pegs), Some(1));
        assert_eq!(first_peg_contact(Vec2::new(300.0, 300.0), &pegs), None);
    }

    #[test]
    fn test_touches_line() {
        let l = line(Vec2::new(100.0, 200.0), Vec2::new(142.0, 200.0));
        assert!(touches_line(Vec2::new(120.0, 210.0), &l));
        assert!(!touches_line(Vec2::new(120.0, 216.0), &l));

        let mut inactive = l.clone();
        inactive.active = false;
        assert!(!touches_line(Vec2::new(120.0, 200.0), &inactive));
    }

    #[test]
    fn test_peg_bounce_goes_down() {
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..100 {
            let vel = peg_bounce(Vec2::new(95.0, 98.0), Vec2::new(100.0, 100.0), 1.0, &mut rng);
            assert!(vel.y >= 0.0);
            // |vx| <= max force * chaos
            assert!(vel.x.abs() <= BOUNCE_FORCE_BASE + BOUNCE_FORCE_RANDOM);
        }
    }

    #[test]
    fn test_side_walls() {
        assert!(!side_wall_collision(Vec2::new(300.0, 100.0)).hit);

        let left = side_wall_collision(Vec2::new(15.0, 100.0));
        assert!(left.hit);
        assert_eq!(left.normal, Vec2::X);
        assert!((left.penetration - 5.0).abs() < 1e-4);

        let right = side_wall_collision(Vec2::new(590.0, 100.0));
        assert!(right.hit);
        assert_eq!(right.normal, Vec2::NEG_X);
        // Pushing out along the normal lands exactly on the margin
        let resolved = 590.0 + right.normal.x * right.penetration;
        assert!((resolved - (BOARD_WIDTH - WALL_MARGIN)).abs() < 1e-4);
    }

    #[test]
    fn test_reflect_velocity() {
        // Ball moving right, hits vertical wall (normal pointing left)
        let velocity = Vec2::new(100.0, 0.0);
        let normal = Vec2::new(-1.0, 0.0);

        let reflected = reflect_velocity(velocity, normal);
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }
}
