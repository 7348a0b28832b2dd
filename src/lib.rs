//! Cosmic Plinko - balls fall through a peg field into scoring slots
//!
//! Core modules:
//! - `sim`: Deterministic simulation (board, slots, physics, scoring, free-drop sessions)
//! - `platform`: Fixed-step frame clock shared by the native and web front ends
//! - `tuning`: Data-driven game balance
//! - `recent_hits`: Bounded log of the latest landings
//! - `cues`: Event to sound-cue mapping for presentation layers

pub mod cues;
pub mod platform;
pub mod recent_hits;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use recent_hits::{RecentHit, RecentHits};
pub use tuning::{SpeedMode, Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Simulation rate (ticks per second)
    pub const SIM_HZ: u32 = 120;
    /// Fixed frame interval in milliseconds
    pub const SIM_DT_MS: f64 = 1000.0 / SIM_HZ as f64;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Board dimensions
    pub const BOARD_WIDTH: f32 = 600.0;
    pub const BOARD_HEIGHT: f32 = 500.0;

    /// Peg field
    pub const PEG_ROWS: usize = 13;
    /// Row `r` holds `r + PEGS_IN_FIRST_ROW` pegs
    pub const PEGS_IN_FIRST_ROW: usize = 4;
    pub const PEG_SPACING: f32 = 42.0;
    pub const ROW_SPACING: f32 = 30.0;
    pub const FIRST_ROW_Y: f32 = 100.0;
    /// Full width of the uniform jitter band (±2px)
    pub const PEG_JITTER_X: f32 = 4.0;
    /// Full height of the uniform jitter band (±1.5px)
    pub const PEG_JITTER_Y: f32 = 3.0;
    /// Squared distance under which a ball touches a peg
    pub const PEG_HIT_DIST_SQ: f32 = 300.0;
    /// Peg glow duration in ticks
    pub const PEG_GLOW_TICKS: u32 = 25;

    /// Multiplier lines
    pub const LINE_ROWS: [usize; 4] = [3, 6, 9, 12];
    pub const LINE_MULTIPLIERS: [u32; 4] = [2, 3, 4, 5];
    /// Ball radius + line thickness, squared
    pub const LINE_HIT_DIST_SQ: f32 = (10.0 + 5.0) * (10.0 + 5.0);

    /// Ball motion
    pub const GRAVITY: f32 = 0.2;
    pub const TURBULENCE_X: f32 = 0.1;
    pub const TURBULENCE_Y: f32 = 0.05;
    pub const HORIZONTAL_DAMPING: f32 = 0.96;
    pub const TRAIL_LENGTH: usize = 4;

    /// Peg bounce
    pub const BOUNCE_FORCE_BASE: f32 = 2.5;
    pub const BOUNCE_FORCE_RANDOM: f32 = 2.0;
    /// Full width of the bounce angle perturbation (radians)
    pub const BOUNCE_ANGLE_SPREAD: f32 = 1.2;
    pub const BOUNCE_EXTRA_DOWNWARD: f32 = 1.5;

    /// Side walls
    pub const WALL_MARGIN: f32 = 20.0;
    pub const WALL_DAMPING_BASE: f32 = 0.5;
    pub const WALL_DAMPING_RANDOM: f32 = 0.3;
    /// Full width of the vertical kick applied on wall bounce
    pub const WALL_VERTICAL_KICK: f32 = 0.5;

    /// High-value slot repulsion
    pub const REPULSION_ZONE: f32 = 120.0;
    pub const REPULSION_FORCE: f32 = 0.05;
    pub const REPULSION_LIFT: f32 = 0.01;
    pub const REPULSION_MIN_MULTIPLIER: f64 = 10.0;

    /// Balls land once they pass this depth
    pub const LANDING_Y: f32 = BOARD_HEIGHT - 40.0;

    /// Spawn area
    pub const SPAWN_Y: f32 = 50.0;
    pub const SPAWN_SPREAD_X: f32 = 30.0;
    pub const SPAWN_STEP: f32 = 5.0;
    pub const CHAOS_MIN: f32 = 0.8;
    pub const CHAOS_RANGE: f32 = 0.4;

    /// Recent-hits log capacity
    pub const MAX_RECENT_HITS: usize = 20;
}

/// Convert a millisecond duration to logical ticks (rounded up)
#[inline]
pub fn ms_to_ticks(ms: u32) -> u64 {
    (u64::from(ms) * u64::from(consts::SIM_HZ)).div_ceil(1000)
}

/// Uniform sample in `[-0.5, 0.5) * span`
#[inline]
pub fn centered<R: rand::Rng + ?Sized>(rng: &mut R, span: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * span
}
