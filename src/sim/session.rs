//! Scoring, drop admission, and the free-drop session
//!
//! Drop cycle: Idle -> Dropping -> Settling -> Idle, followed by
//! FreeDropsPending -> AutoDropping -> Idle whenever free drops accrue.

use std::rc::Rc;

use super::events::{GameEvent, ParticleKind};
use super::slots::{Slot, SlotLayout};
use super::state::{Acknowledgement, Ball, DropKind, DropRejection, GameState, PendingSpawn};
use crate::recent_hits::{HitOutcome, RecentHit};

/// Amount credited for a numeric landing
#[inline]
pub fn win_amount(bet: f64, ball_multiplier: f64, slot_multiplier: f64) -> f64 {
    bet * ball_multiplier * slot_multiplier
}

/// Free drops awarded for landing on a free-drops slot
#[inline]
pub fn free_drops_award(base: u32, ball_multiplier: f64) -> u32 {
    (f64::from(base) * ball_multiplier).round().max(0.0) as u32
}

impl GameState {
    /// Check whether a drop of the given kind may start now
    pub fn admission(&self, kind: DropKind) -> Result<(), DropRejection> {
        if self.is_paused() {
            return Err(DropRejection::Paused);
        }
        if self.balls_in_flight() {
            return Err(DropRejection::BallsInFlight);
        }
        if let Some(last) = self.last_drop_tick {
            if self.time_ticks.saturating_sub(last) < self.tuning.cooldown_ticks() {
                return Err(DropRejection::Cooldown);
            }
        }
        if kind == DropKind::Manual {
            if self.session.active {
                return Err(DropRejection::AutoDropping);
            }
            if self.free_drops == 0 && self.balance < self.total_bet() {
                return Err(DropRejection::InsufficientBalance);
            }
        }
        Ok(())
    }

    pub fn can_drop_ball(&self) -> bool {
        self.admission(DropKind::Manual).is_ok()
    }

    /// Player drop request. Pending free drops are spent first (one free
    /// ball), otherwise the full bet is taken. Returns false when refused.
    pub fn request_drop(&mut self) -> bool {
        if let Err(reason) = self.admission(DropKind::Manual) {
            log::debug!("Drop rejected: {reason}");
            return false;
        }

        if self.free_drops > 0 {
            if !self.session.active {
                self.begin_session();
            }
            self.play_free_drop();
        } else {
            self.awarded_this_spin = 0;
            self.start_drop(DropKind::Manual);
        }
        true
    }

    /// Regenerate lines and slots, pay for the drop and queue its balls
    pub(super) fn start_drop(&mut self, kind: DropKind) {
        self.board.regenerate_lines(&mut self.rng);
        self.layout = Rc::new(SlotLayout::generate(self.free_drops, &mut self.rng));
        self.last_drop_tick = Some(self.time_ticks);

        let (balls, cost) = match kind {
            DropKind::Manual => (self.ball_count, self.total_bet()),
            DropKind::Free => (1, 0.0),
        };
        self.balance -= cost;

        // Stagger follows the selected ball count, even for single free balls
        let stagger = self.tuning.stagger_ticks(self.ball_count);
        for index in 0..balls {
            self.spawn_queue.push_back(PendingSpawn {
                due: self.time_ticks + u64::from(index) * stagger,
                index,
                of: balls,
                bet: self.bet_amount,
                kind,
                layout: Rc::clone(&self.layout),
            });
        }

        log::info!(
            "Drop started ({kind:?}): {balls} ball(s), {} lines, {} slots",
            self.board.lines.len(),
            self.layout.len()
        );
        self.emit(GameEvent::DropStarted {
            kind,
            balls,
            cost,
            free_drops_remaining: self.free_drops,
        });
    }

    /// Open a free-drop session, clearing the aggregates of any previous one
    pub(super) fn begin_session(&mut self) {
        self.session.active = true;
        self.session.total_win = 0.0;
        self.session.total_multiplier = 0.0;
        self.session.drops_played = 0;
        self.session.resume_at = Some(self.time_ticks);
        self.last_win = 0.0;
        log::info!("Free drop session started ({} pending)", self.free_drops);
        self.emit(GameEvent::FreeDropsSessionStarted {
            free_drops: self.free_drops,
        });
    }

    /// Spend one pending free drop on a single zero-cost ball
    fn play_free_drop(&mut self) {
        self.free_drops = self.free_drops.saturating_sub(1);
        self.session.drops_played += 1;
        self.session.resume_at = None;
        self.start_drop(DropKind::Free);
    }

    fn end_session(&mut self) {
        self.session.active = false;
        self.session.resume_at = None;
        self.last_win = self.session.total_win;
        let summary = Acknowledgement::SessionSummary {
            total_win: self.session.total_win,
            total_multiplier: self.session.total_multiplier,
            drops_played: self.session.drops_played,
        };
        log::info!(
            "Free drop session finished: {} drop(s), ${:.2}",
            self.session.drops_played,
            self.session.total_win
        );
        self.emit(GameEvent::FreeDropsSessionSummary {
            total_win: self.session.total_win,
            total_multiplier: self.session.total_multiplier,
            drops_played: self.session.drops_played,
        });
        self.pending_ack = Some(summary);
    }

    /// Dismiss the pending award or summary. Returns false if nothing was pending.
    pub fn acknowledge(&mut self) -> bool {
        match self.pending_ack.take() {
            Some(Acknowledgement::FreeDropsAwarded { total }) => {
                self.free_drops += total;
                self.awarded_this_spin = 0;
                if !self.session.active && self.free_drops > 0 {
                    self.begin_session();
                }
                true
            }
            Some(Acknowledgement::SessionSummary { .. }) => {
                self.session = Default::default();
                true
            }
            None => false,
        }
    }

    /// Credit a landed ball against the slot under `slot_x` and deactivate it
    pub(super) fn resolve_landing(&mut self, ball: &mut Ball, slot_x: f32) {
        ball.active = false;

        let Some((slot_index, slot)) = ball.layout.slot_at(slot_x) else {
            log::warn!("Ball {} landed on an empty slot layout", ball.id);
            return;
        };

        let outcome = match slot {
            Slot::Multiplier(slot_multiplier) => {
                let amount = win_amount(ball.bet, ball.current_multiplier, slot_multiplier);
                let multiplier = ball.current_multiplier * slot_multiplier;
                self.balance += amount;
                if self.session.active {
                    self.session.total_win += amount;
                    self.session.total_multiplier += multiplier;
                } else {
                    self.last_win = amount;
                }
                self.emit(GameEvent::particles(ball.pos, ParticleKind::Win));
                HitOutcome::Win { multiplier, amount }
            }
            Slot::FreeDrops { base } => {
                let awarded = free_drops_award(base, ball.current_multiplier);
                self.awarded_this_spin += awarded;
                self.emit(GameEvent::particles(ball.pos, ParticleKind::FreeDrops));
                HitOutcome::FreeDrops { awarded }
            }
        };

        self.recent_hits.push(RecentHit {
            outcome,
            tick: self.time_ticks,
        });
        self.emit(GameEvent::BallLanded {
            ball_id: ball.id,
            slot_index,
            slot,
            outcome,
        });
    }

    /// Advance the drop cycle once every ball has settled
    pub(super) fn update_drop_cycle(&mut self) {
        if self.is_paused() || self.balls_in_flight() {
            return;
        }

        if self.session.active {
            if self.free_drops == 0 {
                self.end_session();
                return;
            }
            let delay = self.tuning.free_drop_delay_ticks();
            let now = self.time_ticks;
            let resume_at = *self.session.resume_at.get_or_insert(now + delay);
            if now >= resume_at && self.admission(DropKind::Free).is_ok() {
                self.play_free_drop();
            }
            return;
        }

        if self.awarded_this_spin > 0 {
            let total = self.awarded_this_spin;
            log::info!("{total} free drops awarded");
            self.emit(GameEvent::FreeDropsAwarded { total });
            self.pending_ack = Some(Acknowledgement::FreeDropsAwarded { total });
        } else if self.free_drops > 0 {
            self.begin_session();
        }
    }
}
