//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically: spawn due
//! balls, move and collide every active ball, score landings, then let the
//! drop cycle react once everything has settled.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::board::Board;
use super::collision::{
    first_peg_contact, peg_bounce, reflect_velocity, side_wall_collision, touches_line,
};
use super::events::{GameEvent, ParticleKind};
use super::state::{Ball, GameState};
use crate::centered;
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Drop request (button/space)
    pub drop: bool,
    /// Dismiss the pending award or summary
    pub acknowledge: bool,
    /// Pause toggle
    pub pause: bool,
    /// Regular/turbo toggle
    pub toggle_turbo: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    if input.pause {
        state.set_paused(!state.paused);
    }
    if input.toggle_turbo {
        state.toggle_turbo();
    }
    if input.acknowledge {
        state.acknowledge();
    }
    if input.drop {
        state.request_drop();
    }

    // Positions are held while paused; nothing advances
    if state.is_paused() {
        return;
    }

    state.time_ticks += 1;
    state.board.decay_pegs();

    spawn_due_balls(state);

    let speed = state.speed_mode.speed_factor();
    let mut balls = std::mem::take(&mut state.balls);
    for ball in balls.iter_mut().filter(|b| b.active) {
        let landed = advance_ball(
            ball,
            &mut state.board,
            &mut state.rng,
            speed,
            &mut state.events,
        );
        if let Some(slot_x) = landed {
            state.resolve_landing(ball, slot_x);
        }
    }
    balls.retain(|b| b.active);
    state.balls = balls;

    state.update_drop_cycle();

    // Ensure deterministic ordering
    state.normalize_order();
}

/// Spawn every queued ball whose time has come
fn spawn_due_balls(state: &mut GameState) {
    while state
        .spawn_queue
        .front()
        .is_some_and(|s| s.due <= state.time_ticks)
    {
        let Some(spawn) = state.spawn_queue.pop_front() else {
            break;
        };
        let id = state.next_entity_id();
        let ball = Ball::spawn(id, &spawn, &mut state.rng);
        log::debug!(
            "Ball {}/{} spawned at x:{:.1}, chaos:{:.2}",
            spawn.index + 1,
            spawn.of,
            ball.pos.x,
            ball.chaos
        );
        state.emit(GameEvent::BallSpawned {
            ball_id: id,
            pos: ball.pos,
        });
        state.balls.push(ball);
    }
}

/// Move one ball and resolve its collisions.
///
/// Pegs and walls are tested at the moved position; lines, slot repulsion
/// and the landing slot use the position the ball started the tick at.
/// Returns the x to score at once the ball lands.
fn advance_ball(
    ball: &mut Ball,
    board: &mut Board,
    rng: &mut Pcg32,
    speed: f32,
    events: &mut Vec<GameEvent>,
) -> Option<f32> {
    ball.record_trail();

    let prev = ball.pos;
    let mut pos = prev + ball.vel * speed;
    let mut vel = ball.vel + Vec2::new(0.0, GRAVITY);

    // Turbulence
    vel.x += centered(rng, TURBULENCE_X) * ball.chaos;
    vel.y += centered(rng, TURBULENCE_Y) * ball.chaos;

    // Pegs: at most one per tick
    if let Some(index) = first_peg_contact(pos, &board.pegs) {
        let boosted = ball.is_boosted();
        let peg = &mut board.pegs[index];
        peg.strike(boosted);
        vel = peg_bounce(pos, peg.pos, ball.chaos, rng);
        events.push(GameEvent::PegHit {
            peg: index,
            pos: peg.pos,
            boosted,
        });
    }

    // Multiplier lines: every unconsumed line in reach
    for line in &board.lines {
        if ball.hit_lines.contains(&line.id) || !touches_line(prev, line) {
            continue;
        }
        let new_multiplier = ball.apply_line(line.id, line.multiplier);
        log::debug!(
            "Ball {} hit {}x line on row {}, now {:.2}x",
            ball.id,
            line.multiplier,
            line.id.row,
            new_multiplier
        );
        events.push(GameEvent::LineHit {
            line: line.id,
            ball_id: ball.id,
            line_multiplier: line.multiplier,
            new_multiplier,
        });
        events.push(GameEvent::particles(prev, ParticleKind::Line));
    }

    // Side walls
    let wall = side_wall_collision(pos);
    if wall.hit {
        vel = reflect_velocity(vel, wall.normal);
        vel.x *= WALL_DAMPING_BASE + rng.random::<f32>() * WALL_DAMPING_RANDOM;
        vel.y += centered(rng, WALL_VERTICAL_KICK);
        pos.x += wall.normal.x * wall.penetration;
    }

    // Near-miss nudge away from high-value slots
    if prev.y > BOARD_HEIGHT - REPULSION_ZONE {
        if let Some((index, slot)) = ball.layout.slot_at(prev.x) {
            if slot.is_high_value() {
                let center = ball.layout.slot_center(index);
                vel.x += if prev.x < center {
                    -REPULSION_FORCE
                } else {
                    REPULSION_FORCE
                };
                vel.y -= REPULSION_LIFT;
            }
        }
    }

    if !pos.is_finite() || !vel.is_finite() {
        log::warn!("Ball {} left the numeric range, recentering", ball.id);
        pos = Vec2::new(BOARD_WIDTH / 2.0, SPAWN_Y);
        vel = Vec2::ZERO;
    }

    ball.pos = pos;
    if pos.y > LANDING_Y {
        ball.vel = vel;
        let slot_x = if prev.x.is_finite() { prev.x } else { pos.x };
        return Some(slot_x);
    }
    ball.vel = Vec2::new(vel.x * HORIZONTAL_DAMPING, vel.y);
    None
}
