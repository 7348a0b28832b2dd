//! Simulation events for presentation layers
//!
//! The core pushes events while it ticks; sinks only observe them. Nothing a
//! sink does feeds back into the simulation.

use glam::Vec2;
use serde::Serialize;

use super::board::LineId;
use super::slots::Slot;
use super::state::DropKind;
use crate::recent_hits::HitOutcome;

/// Particle burst flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParticleKind {
    /// Sinks burst this on `PegHit`; it has no `Particles` event of its own
    Peg,
    Line,
    Win,
    FreeDrops,
}

impl ParticleKind {
    /// Burst size
    pub fn count(&self) -> u32 {
        match self {
            ParticleKind::Peg => 6,
            ParticleKind::Line => 20,
            ParticleKind::Win => 6,
            ParticleKind::FreeDrops => 30,
        }
    }
}

/// Discrete things that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    DropStarted {
        kind: DropKind,
        balls: u32,
        cost: f64,
        /// Pending free drops after this drop was paid for
        free_drops_remaining: u32,
    },
    BallSpawned {
        ball_id: u32,
        pos: Vec2,
    },
    PegHit {
        peg: usize,
        pos: Vec2,
        boosted: bool,
    },
    LineHit {
        line: LineId,
        ball_id: u32,
        line_multiplier: u32,
        new_multiplier: f64,
    },
    BallLanded {
        ball_id: u32,
        slot_index: usize,
        slot: Slot,
        outcome: HitOutcome,
    },
    /// Free drops won by the last drop, awaiting acknowledgement
    FreeDropsAwarded {
        total: u32,
    },
    FreeDropsSessionStarted {
        free_drops: u32,
    },
    FreeDropsSessionSummary {
        total_win: f64,
        total_multiplier: f64,
        drops_played: u32,
    },
    Particles {
        pos: Vec2,
        kind: ParticleKind,
        count: u32,
    },
    Reset,
}

impl GameEvent {
    pub fn particles(pos: Vec2, kind: ParticleKind) -> Self {
        GameEvent::Particles {
            pos,
            kind,
            count: kind.count(),
        }
    }
}

/// Consumer of simulation events (audio, visuals, logging)
pub trait EventSink {
    fn handle(&mut self, event: &GameEvent);

    fn handle_all(&mut self, events: &[GameEvent]) {
        for event in events {
            self.handle(event);
        }
    }
}

/// Sink that writes the interesting events to the log
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn handle(&mut self, event: &GameEvent) {
        match event {
            GameEvent::DropStarted {
                kind,
                balls,
                cost,
                free_drops_remaining,
            } => log::info!(
                "{kind:?} drop: {balls} ball(s), cost ${cost:.2}, {free_drops_remaining} free drop(s) left"
            ),
            GameEvent::LineHit {
                ball_id,
                line_multiplier,
                new_multiplier,
                ..
            } => log::debug!(
                "Ball {ball_id} crossed a {line_multiplier}x line, now {new_multiplier:.2}x"
            ),
            GameEvent::BallLanded {
                ball_id,
                slot_index,
                outcome,
                ..
            } => match outcome {
                HitOutcome::Win { multiplier, amount } => log::info!(
                    "Ball {ball_id} landed in slot {slot_index}: {multiplier:.2}x, won ${amount:.2}"
                ),
                HitOutcome::FreeDrops { awarded } => log::info!(
                    "Ball {ball_id} landed on FREE DROPS: {awarded} awarded"
                ),
            },
            GameEvent::FreeDropsAwarded { total } => log::info!("{total} free drops awarded"),
            GameEvent::FreeDropsSessionStarted { free_drops } => {
                log::info!("Free drop session started with {free_drops} drop(s)")
            }
            GameEvent::FreeDropsSessionSummary {
                total_win,
                total_multiplier,
                drops_played,
            } => log::info!(
                "Free drop session over: won ${total_win:.2} from {drops_played} drop(s), {total_multiplier:.2}x total"
            ),
            GameEvent::Reset => log::info!("Reset"),
            GameEvent::BallSpawned { .. }
            | GameEvent::PegHit { .. }
            | GameEvent::Particles { .. } => {}
        }
    }
}
