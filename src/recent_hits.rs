//! Recent landings log
//!
//! Newest first, bounded to the last 20 landings.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_RECENT_HITS;

/// What a landing produced
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HitOutcome {
    /// Numeric slot: combined multiplier (ball x slot) and amount credited
    Win { multiplier: f64, amount: f64 },
    /// Free-drops slot: number of free drops awarded
    FreeDrops { awarded: u32 },
}

/// A single log entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecentHit {
    pub outcome: HitOutcome,
    /// Simulation tick of the landing
    pub tick: u64,
}

/// Bounded newest-first log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecentHits {
    entries: Vec<RecentHit>,
}

impl RecentHits {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(MAX_RECENT_HITS + 1),
        }
    }

    /// Record a landing, evicting the oldest entry once full
    pub fn push(&mut self, hit: RecentHit) {
        self.entries.insert(0, hit);
        self.entries.truncate(MAX_RECENT_HITS);
    }

    /// Entries, newest first
    pub fn entries(&self) -> &[RecentHit] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&RecentHit> {
        self.entries.first()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
