//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (logical ticks, never wall-clock time)
//! - Seeded RNG only
//! - Stable iteration order (balls by ID, pegs and lines in board order)
//! - No rendering, audio or platform dependencies

pub mod board;
pub mod collision;
pub mod events;
pub mod session;
pub mod slots;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use board::{Board, LineId, MultiplierLine, Peg};
pub use collision::{CollisionResult, dist_to_segment_squared};
pub use events::{EventSink, GameEvent, LogSink, ParticleKind};
pub use session::{free_drops_award, win_amount};
pub use slots::{BASE_MULTIPLIERS, Slot, SlotLayout};
pub use snapshot::Snapshot;
pub use state::{
    Acknowledgement, Ball, DropKind, DropRejection, FreeDropSession, GamePhase, GameState,
    InputError, PendingSpawn,
};
pub use tick::{TickInput, tick};
