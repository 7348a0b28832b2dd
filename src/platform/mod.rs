//! Platform abstraction layer
//!
//! Turns the host's frame timestamps (requestAnimationFrame on web, a loop
//! on native) into a whole number of fixed simulation ticks.

use crate::consts::{MAX_SUBSTEPS, SIM_DT_MS};

/// Longest frame gap we try to catch up on (ms)
const MAX_FRAME_MS: f64 = 100.0;

/// Fixed-step accumulator
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f64,
    last_time: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a frame timestamp in milliseconds; returns how many ticks to run.
    ///
    /// The first frame runs a single tick. Long gaps (tab hidden, debugger)
    /// are clamped and at most `MAX_SUBSTEPS` ticks run per frame.
    pub fn advance(&mut self, time_ms: f64) -> u32 {
        let dt = match self.last_time {
            Some(last) if time_ms.is_finite() => (time_ms - last).clamp(0.0, MAX_FRAME_MS),
            Some(_) => 0.0,
            None => SIM_DT_MS,
        };
        if time_ms.is_finite() {
            self.last_time = Some(time_ms);
        }
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT_MS;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog instead of spiralling
            self.accumulator = self.accumulator.min(SIM_DT_MS);
        }
        substeps
    }

    /// Forget the backlog (after unpausing or a visibility change)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time = None;
    }
}
