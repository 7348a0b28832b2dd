//! Read-only view of the game for renderers and the browser shell

use glam::Vec2;
use serde::Serialize;

use super::board::MultiplierLine;
use super::slots::Slot;
use super::state::{Acknowledgement, FreeDropSession, GamePhase, GameState};
use crate::recent_hits::RecentHit;
use crate::tuning::SpeedMode;

/// Highest glow tier a ball reaches
pub const MAX_GLOW_TIER: u32 = 4;

#[derive(Debug, Clone, Serialize)]
pub struct BallView {
    pub id: u32,
    pub pos: Vec2,
    pub multiplier: f64,
    /// Lines crossed, clamped to `MAX_GLOW_TIER`
    pub glow_tier: u32,
    pub trail: Vec<Vec2>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PegView {
    pub pos: Vec2,
    pub hit: bool,
    pub boosted: bool,
}

/// Everything a frame needs to draw the board and the side panel
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub balance: f64,
    pub bet_amount: f64,
    pub ball_count: u32,
    pub total_bet: f64,
    pub total_bet_text: String,
    pub last_win: f64,
    pub free_drops: u32,
    pub speed_mode: SpeedMode,
    pub can_drop: bool,
    pub drop_status: String,
    pub balls: Vec<BallView>,
    pub pegs: Vec<PegView>,
    pub lines: Vec<MultiplierLine>,
    pub slots: Vec<Slot>,
    pub recent_hits: Vec<RecentHit>,
    pub session: FreeDropSession,
    pub pending_ack: Option<Acknowledgement>,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            time_ticks: state.time_ticks,
            phase: state.phase(),
            balance: state.balance,
            bet_amount: state.bet_amount,
            ball_count: state.ball_count,
            total_bet: state.total_bet(),
            total_bet_text: total_bet_text(state),
            last_win: state.last_win,
            free_drops: state.free_drops,
            speed_mode: state.speed_mode,
            can_drop: state.can_drop_ball(),
            drop_status: drop_status(state),
            balls: state
                .balls
                .iter()
                .filter(|b| b.active)
                .map(|b| BallView {
                    id: b.id,
                    pos: b.pos,
                    multiplier: b.current_multiplier,
                    glow_tier: b.line_hits.min(MAX_GLOW_TIER),
                    trail: b.trail.clone(),
                })
                .collect(),
            pegs: state
                .board
                .pegs
                .iter()
                .map(|p| PegView {
                    pos: p.pos,
                    hit: p.is_hit(),
                    boosted: p.is_boosted_hit(),
                })
                .collect(),
            lines: state.board.lines.clone(),
            slots: state.layout.slots().to_vec(),
            recent_hits: state.recent_hits.entries().to_vec(),
            session: state.session.clone(),
            pending_ack: state.pending_ack,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 { "" } else { "S" }
}

/// Drop button label for the current state
pub fn drop_status(state: &GameState) -> String {
    if state.is_paused() {
        return "GAME PAUSED".to_string();
    }
    if state.session.active {
        return "AUTO DROPPING...".to_string();
    }
    let active = state.active_ball_count();
    if active > 0 {
        let active = u32::try_from(active).unwrap_or(u32::MAX);
        return format!("{active} BALL{} IN PLAY...", plural(active));
    }
    if state.free_drops > 0 {
        return format!("DROP FREE BALL{}", plural(state.free_drops));
    }
    if state.balance < state.total_bet() {
        return "INSUFFICIENT BALANCE".to_string();
    }
    format!("DROP {} BALL{}", state.ball_count, plural(state.ball_count))
}

/// "$2.00 × 3 balls = $6.00"
pub fn total_bet_text(state: &GameState) -> String {
    let noun = if state.ball_count == 1 { "ball" } else { "balls" };
    format!(
        "${:.2} × {} {noun} = ${:.2}",
        state.bet_amount,
        state.ball_count,
        state.total_bet()
    )
}
