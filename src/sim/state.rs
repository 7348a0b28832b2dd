//! Game state and core simulation types
//!
//! One `GameState` holds everything the tick and the user entry points touch:
//! board, slots, balls in flight, wallet, and the free-drop session.

use std::collections::{BTreeSet, VecDeque};
use std::rc::Rc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::board::{Board, LineId};
use super::events::GameEvent;
use super::slots::SlotLayout;
use crate::centered;
use crate::consts::*;
use crate::recent_hits::RecentHits;
use crate::tuning::{SpeedMode, Tuning};

/// Where the balls of a drop came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropKind {
    /// Paid for by the player (bet x ball count)
    Manual,
    /// Spent from the pending free drops, costs nothing
    Free,
}

/// Current phase of the drop cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ready for a drop
    Idle,
    /// Drop accepted, some balls not yet spawned
    Dropping,
    /// All balls spawned, at least one still falling
    Settling,
    /// Free drops waiting to be played (or awarded this spin)
    FreeDropsPending,
    /// Free-drop session running
    AutoDropping,
    /// Waiting for the player to acknowledge an award or a session summary
    AwaitingAcknowledgement,
    /// Paused by the player or front end
    Paused,
}

/// Something the player has to acknowledge before play resumes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Acknowledgement {
    FreeDropsAwarded {
        total: u32,
    },
    SessionSummary {
        total_win: f64,
        total_multiplier: f64,
        drops_played: u32,
    },
}

/// A ball entity
#[derive(Debug, Clone)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Per-ball physics variance, fixed at spawn
    pub chaos: f32,
    /// 1 until the first line hit; multiplied by the first line, then added to
    pub current_multiplier: f64,
    /// Number of lines crossed (drives the glow tier)
    pub line_hits: u32,
    /// Lines already consumed by this ball
    pub hit_lines: BTreeSet<LineId>,
    /// Bet captured at spawn
    pub bet: f64,
    pub kind: DropKind,
    /// Slot layout of the drop this ball belongs to
    pub layout: Rc<SlotLayout>,
    pub active: bool,
    /// Recent positions for rendering (newest first)
    pub trail: Vec<Vec2>,
}

impl Ball {
    /// Spawn ball `index` of a drop of `of` balls near the top center
    pub fn spawn<R: Rng + ?Sized>(id: u32, spawn: &PendingSpawn, rng: &mut R) -> Self {
        let offset = (spawn.index as f32 - spawn.of as f32 / 2.0) * SPAWN_STEP;
        let x = BOARD_WIDTH / 2.0 + centered(rng, SPAWN_SPREAD_X) + offset;
        let y = SPAWN_Y + spawn.index as f32 * SPAWN_STEP;
        let vel = Vec2::new(centered(rng, 2.0), rng.random::<f32>() * 0.5);
        let chaos = CHAOS_MIN + rng.random::<f32>() * CHAOS_RANGE;

        Self {
            id,
            pos: Vec2::new(x, y),
            vel,
            chaos,
            current_multiplier: 1.0,
            line_hits: 0,
            hit_lines: BTreeSet::new(),
            bet: spawn.bet,
            kind: spawn.kind,
            layout: Rc::clone(&spawn.layout),
            active: true,
            trail: Vec::with_capacity(TRAIL_LENGTH + 1),
        }
    }

    /// Whether the ball has crossed at least one multiplier line
    pub fn is_boosted(&self) -> bool {
        self.line_hits > 0
    }

    /// Apply a line hit. Returns the new multiplier; a line already
    /// consumed by this ball leaves it unchanged.
    pub fn apply_line(&mut self, line: LineId, multiplier: u32) -> f64 {
        if !self.hit_lines.insert(line) {
            return self.current_multiplier;
        }
        if self.line_hits == 0 {
            self.current_multiplier *= f64::from(multiplier);
        } else {
            self.current_multiplier += f64::from(multiplier);
        }
        self.line_hits += 1;
        self.current_multiplier
    }

    /// Record current position to trail (call before moving)
    pub fn record_trail(&mut self) {
        self.trail.insert(0, self.pos);
        self.trail.truncate(TRAIL_LENGTH);
    }
}

/// A ball scheduled to appear later in the current drop
#[derive(Debug, Clone)]
pub struct PendingSpawn {
    /// Tick at which the ball appears
    pub due: u64,
    pub index: u32,
    pub of: u32,
    pub bet: f64,
    pub kind: DropKind,
    pub layout: Rc<SlotLayout>,
}

/// Free-drop session bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FreeDropSession {
    pub active: bool,
    pub total_win: f64,
    /// Sum of ball x slot multipliers over the session's numeric landings
    pub total_multiplier: f64,
    pub drops_played: u32,
    /// Tick at which the next free drop may start (None while one is in flight)
    pub resume_at: Option<u64>,
}

/// Invalid user input
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("Bet amount {0} is not offered")]
    InvalidBet(f64),

    #[error("Ball count {count} is outside 1..={max}")]
    InvalidBallCount { count: u32, max: u32 },
}

/// Why a drop was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DropRejection {
    #[error("GAME PAUSED")]
    Paused,

    #[error("BALLS IN PLAY")]
    BallsInFlight,

    #[error("COOLDOWN")]
    Cooldown,

    #[error("AUTO DROPPING")]
    AutoDropping,

    #[error("INSUFFICIENT BALANCE")]
    InsufficientBalance,
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(super) rng: Pcg32,
    pub tuning: Tuning,
    /// Logical clock, advanced once per unpaused tick
    pub time_ticks: u64,

    pub balance: f64,
    pub bet_amount: f64,
    pub ball_count: u32,
    pub last_win: f64,

    /// Free drops waiting to be played
    pub free_drops: u32,
    /// Free drops won by the current drop, credited once it settles
    pub awarded_this_spin: u32,
    pub session: FreeDropSession,
    pub pending_ack: Option<Acknowledgement>,

    pub speed_mode: SpeedMode,
    /// Paused by the player or front end (modal open, tab hidden)
    pub paused: bool,

    pub board: Board,
    /// Layout of the most recent drop (what the front end shows)
    pub layout: Rc<SlotLayout>,
    /// Balls in flight (sorted by id)
    pub balls: Vec<Ball>,
    pub spawn_queue: VecDeque<PendingSpawn>,
    pub last_drop_tick: Option<u64>,
    pub recent_hits: RecentHits,

    pub(super) events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed and default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let board = Board::generate(&mut rng);

        Self {
            seed,
            rng,
            time_ticks: 0,
            balance: tuning.starting_balance,
            bet_amount: tuning.default_bet,
            ball_count: tuning.default_ball_count,
            last_win: 0.0,
            free_drops: 0,
            awarded_this_spin: 0,
            session: FreeDropSession::default(),
            pending_ack: None,
            speed_mode: tuning.speed_mode,
            paused: false,
            board,
            layout: Rc::new(SlotLayout::base()),
            balls: Vec::new(),
            spawn_queue: VecDeque::new(),
            last_drop_tick: None,
            recent_hits: RecentHits::new(),
            events: Vec::new(),
            next_id: 1,
            tuning,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Restore defaults: wallet, selections, session, board jitter
    pub fn reset(&mut self) {
        self.time_ticks = 0;
        self.balance = self.tuning.starting_balance;
        self.bet_amount = self.tuning.default_bet;
        self.ball_count = self.tuning.default_ball_count;
        self.last_win = 0.0;
        self.free_drops = 0;
        self.awarded_this_spin = 0;
        self.session = FreeDropSession::default();
        self.pending_ack = None;
        self.speed_mode = self.tuning.speed_mode;
        self.paused = false;
        self.board = Board::generate(&mut self.rng);
        self.layout = Rc::new(SlotLayout::base());
        self.balls.clear();
        self.spawn_queue.clear();
        self.last_drop_tick = None;
        self.recent_hits.clear();
        self.events.clear();
        self.events.push(GameEvent::Reset);
        log::info!("Game reset (balance {:.2})", self.balance);
    }

    pub fn set_bet_amount(&mut self, amount: f64) -> Result<(), InputError> {
        if !self.tuning.offers_bet(amount) {
            return Err(InputError::InvalidBet(amount));
        }
        self.bet_amount = amount;
        Ok(())
    }

    pub fn set_ball_count(&mut self, count: u32) -> Result<(), InputError> {
        let max = self.tuning.max_ball_count;
        if count == 0 || count > max {
            return Err(InputError::InvalidBallCount { count, max });
        }
        self.ball_count = count;
        Ok(())
    }

    /// Flip between regular and turbo speed
    pub fn toggle_turbo(&mut self) -> SpeedMode {
        self.speed_mode = self.speed_mode.toggled();
        log::info!("Speed mode: {}", self.speed_mode.as_str());
        self.speed_mode
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Paused by the player or waiting on an acknowledgement
    pub fn is_paused(&self) -> bool {
        self.paused || self.pending_ack.is_some()
    }

    /// Cost of a manual drop
    pub fn total_bet(&self) -> f64 {
        self.bet_amount * f64::from(self.ball_count)
    }

    pub fn active_ball_count(&self) -> usize {
        self.balls.iter().filter(|b| b.active).count()
    }

    /// Any ball falling or still waiting to spawn
    pub fn balls_in_flight(&self) -> bool {
        !self.spawn_queue.is_empty() || self.balls.iter().any(|b| b.active)
    }

    pub fn phase(&self) -> GamePhase {
        if self.pending_ack.is_some() {
            GamePhase::AwaitingAcknowledgement
        } else if self.paused {
            GamePhase::Paused
        } else if self.session.active {
            GamePhase::AutoDropping
        } else if !self.spawn_queue.is_empty() {
            GamePhase::Dropping
        } else if self.balls.iter().any(|b| b.active) {
            GamePhase::Settling
        } else if self.free_drops > 0 || self.awarded_this_spin > 0 {
            GamePhase::FreeDropsPending
        } else {
            GamePhase::Idle
        }
    }

    /// Take all events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(super) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Ensure balls are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.balls.sort_by_key(|b| b.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_spawn() -> PendingSpawn {
        PendingSpawn {
            due: 0,
            index: 0,
            of: 1,
            bet: 2.0,
            kind: DropKind::Manual,
            layout: Rc::new(SlotLayout::base()),
        }
    }

    #[test]
    fn test_new_state_defaults() {
        let state = GameState::new(42);
        assert_eq!(state.balance, 100.0);
        assert_eq!(state.bet_amount, 1.0);
        assert_eq!(state.ball_count, 1);
        assert_eq!(state.phase(), GamePhase::Idle);
        assert_eq!(state.layout.len(), 15);
        assert!(state.layout.free_drops_slot().is_none());
    }

    #[test]
    fn test_line_multiplier_accumulates() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ball = Ball::spawn(1, &test_spawn(), &mut rng);
        assert_eq!(ball.current_multiplier, 1.0);
        assert!(!ball.is_boosted());

        let a = LineId { row: 3, start: 0 };
        let b = LineId { row: 6, start: 2 };
        let c = LineId { row: 9, start: 4 };
        assert_eq!(ball.apply_line(a, 3), 3.0);
        assert_eq!(ball.apply_line(b, 2), 5.0);
        assert_eq!(ball.apply_line(c, 5), 10.0);
        assert!(ball.is_boosted());
        assert_eq!(ball.line_hits, 3);
    }

    #[test]
    fn test_line_consumed_once_per_ball() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut ball = Ball::spawn(1, &test_spawn(), &mut rng);
        let line = LineId { row: 3, start: 1 };
        assert_eq!(ball.apply_line(line, 4), 4.0);
        assert_eq!(ball.apply_line(line, 4), 4.0);
        assert_eq!(ball.line_hits, 1);

        // A different ball can still use the same line
        let mut other = Ball::spawn(2, &test_spawn(), &mut rng);
        assert_eq!(other.apply_line(line, 4), 4.0);
    }

    #[test]
    fn test_spawn_ranges() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..100 {
            let ball = Ball::spawn(1, &test_spawn(), &mut rng);
            assert!(ball.chaos >= 0.8 && ball.chaos <= 1.2);
            assert!((ball.pos.x - 297.5).abs() <= 15.0);
            assert_eq!(ball.pos.y, SPAWN_Y);
            assert!(ball.vel.x.abs() <= 1.0);
            assert!(ball.vel.y >= 0.0 && ball.vel.y <= 0.5);
            assert_eq!(ball.bet, 2.0);
        }
    }

    #[test]
    fn test_trail_keeps_last_four() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut ball = Ball::spawn(1, &test_spawn(), &mut rng);
        for i in 0..10 {
            ball.pos = Vec2::new(i as f32, 0.0);
            ball.record_trail();
        }
        assert_eq!(ball.trail.len(), TRAIL_LENGTH);
        assert_eq!(ball.trail[0].x, 9.0);
        assert_eq!(ball.trail[3].x, 6.0);
    }

    #[test]
    fn test_input_validation() {
        let mut state = GameState::new(5);
        assert!(state.set_bet_amount(2.0).is_ok());
        assert_eq!(state.bet_amount, 2.0);
        assert_eq!(state.set_bet_amount(7.0), Err(InputError::InvalidBet(7.0)));
        assert_eq!(state.bet_amount, 2.0);

        assert!(state.set_ball_count(10).is_ok());
        assert!(state.set_ball_count(0).is_err());
        assert!(state.set_ball_count(11).is_err());
        assert_eq!(state.ball_count, 10);
        assert_eq!(state.total_bet(), 20.0);
    }

    #[test]
    fn test_toggle_turbo() {
        let mut state = GameState::new(6);
        assert_eq!(state.toggle_turbo(), SpeedMode::Turbo);
        assert_eq!(state.toggle_turbo(), SpeedMode::Regular);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut state = GameState::new(7);
        state.balance = 3.0;
        state.free_drops = 4;
        state.paused = true;
        state.speed_mode = SpeedMode::Turbo;
        state.set_bet_amount(5.0).unwrap();
        state.reset();
        assert_eq!(state.balance, 100.0);
        assert_eq!(state.free_drops, 0);
        assert_eq!(state.bet_amount, 1.0);
        assert_eq!(state.speed_mode, SpeedMode::Regular);
        assert!(!state.paused);
        assert_eq!(state.phase(), GamePhase::Idle);
        assert!(matches!(state.drain_events().as_slice(), [GameEvent::Reset]));
    }
}
