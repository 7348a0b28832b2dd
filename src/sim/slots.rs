//! Bottom scoring slots

use std::sync::LazyLock;

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};

use crate::consts::BOARD_WIDTH;

/// Symmetric base multipliers, left to right
pub const BASE_MULTIPLIERS: [f64; 15] = [
    1000.0, 100.0, 50.0, 10.0, 5.0, 2.0, 1.0, 0.5, 1.0, 2.0, 5.0, 10.0, 50.0, 100.0, 1000.0,
];

/// Free-drop base values and their weights (in 1/1200ths).
/// Bands: 50% on 1-2, 30% on 3-5, 15% on 6-7, 5% on 8-10.
const FREE_DROP_WEIGHTS: [(u32, u32); 10] = [
    (1, 300),
    (2, 300),
    (3, 120),
    (4, 120),
    (5, 120),
    (6, 90),
    (7, 90),
    (8, 20),
    (9, 20),
    (10, 20),
];

static FREE_DROP_DIST: LazyLock<WeightedIndex<u32>> = LazyLock::new(|| {
    WeightedIndex::new(FREE_DROP_WEIGHTS.iter().map(|&(_, w)| w))
        .expect("free-drop weights are non-zero")
});

/// A scoring slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Slot {
    Multiplier(f64),
    FreeDrops { base: u32 },
}

impl Slot {
    pub fn multiplier(&self) -> Option<f64> {
        match self {
            Slot::Multiplier(m) => Some(*m),
            Slot::FreeDrops { .. } => None,
        }
    }

    pub fn is_free_drops(&self) -> bool {
        matches!(self, Slot::FreeDrops { .. })
    }

    /// Whether balls are nudged away from this slot near the bottom
    pub fn is_high_value(&self) -> bool {
        self.multiplier()
            .is_some_and(|m| m >= crate::consts::REPULSION_MIN_MULTIPLIER)
    }
}

/// Ordered slots spanning the board width
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotLayout {
    slots: Vec<Slot>,
}

impl Default for SlotLayout {
    fn default() -> Self {
        Self::base()
    }
}

impl SlotLayout {
    /// Base multipliers only
    pub fn base() -> Self {
        Self {
            slots: BASE_MULTIPLIERS.iter().map(|&m| Slot::Multiplier(m)).collect(),
        }
    }

    pub fn from_slots(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    /// Generate the layout for a new drop. A free-drops slot is inserted at
    /// a uniform position (ends included) only when none are pending.
    pub fn generate<R: Rng + ?Sized>(pending_free_drops: u32, rng: &mut R) -> Self {
        let mut layout = Self::base();
        if pending_free_drops == 0 {
            let index = rng.random_range(0..=layout.slots.len());
            let base = random_free_drops(rng);
            layout.slots.insert(index, Slot::FreeDrops { base });
            log::debug!("Free drops slot ({base}) placed at index {index}");
        }
        layout
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot_width(&self) -> f32 {
        BOARD_WIDTH / self.slots.len().max(1) as f32
    }

    /// Slot index under horizontal position `x`, clamped to the layout
    pub fn index_at(&self, x: f32) -> usize {
        let last = self.slots.len().saturating_sub(1);
        let raw = (x / self.slot_width()).floor();
        if !raw.is_finite() || raw < 0.0 {
            return 0;
        }
        (raw as usize).min(last)
    }

    pub fn slot_at(&self, x: f32) -> Option<(usize, Slot)> {
        let index = self.index_at(x);
        self.slots.get(index).map(|slot| (index, *slot))
    }

    pub fn slot_center(&self, index: usize) -> f32 {
        self.slot_width() * (index as f32 + 0.5)
    }

    pub fn free_drops_slot(&self) -> Option<(usize, u32)> {
        self.slots.iter().enumerate().find_map(|(i, s)| match s {
            Slot::FreeDrops { base } => Some((i, *base)),
            Slot::Multiplier(_) => None,
        })
    }
}

/// Draw a free-drop base value from the weighted table
pub fn random_free_drops<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    FREE_DROP_WEIGHTS[FREE_DROP_DIST.sample(rng)].0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_free_slot_only_without_pending() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..200 {
            let layout = SlotLayout::generate(0, &mut rng);
            assert_eq!(layout.len(), BASE_MULTIPLIERS.len() + 1);
            let free = layout.slots().iter().filter(|s| s.is_free_drops()).count();
            assert_eq!(free, 1);

            let layout = SlotLayout::generate(3, &mut rng);
            assert_eq!(layout, SlotLayout::base());
        }
    }

    #[test]
    fn test_free_slot_keeps_base_order() {
        let mut rng = Pcg32::seed_from_u64(2);
        let layout = SlotLayout::generate(0, &mut rng);
        let numeric: Vec<f64> = layout.slots().iter().filter_map(Slot::multiplier).collect();
        assert_eq!(numeric, BASE_MULTIPLIERS.to_vec());
    }

    #[test]
    fn test_free_slot_reaches_both_ends() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut seen_first = false;
        let mut seen_last = false;
        for _ in 0..2_000 {
            let layout = SlotLayout::generate(0, &mut rng);
            match layout.free_drops_slot() {
                Some((0, _)) => seen_first = true,
                Some((i, _)) if i == BASE_MULTIPLIERS.len() => seen_last = true,
                _ => {}
            }
        }
        assert!(seen_first && seen_last);
    }

    #[test]
    fn test_free_drop_bands() {
        let mut rng = Pcg32::seed_from_u64(4);
        let trials = 40_000;
        let mut bands = [0u32; 4];
        for _ in 0..trials {
            let v = random_free_drops(&mut rng);
            let band = match v {
                1..=2 => 0,
                3..=5 => 1,
                6..=7 => 2,
                8..=10 => 3,
                _ => panic!("value {v} out of range"),
            };
            bands[band] += 1;
        }
        let share = |b: usize| bands[b] as f64 / trials as f64;
        assert!((share(0) - 0.50).abs() < 0.02);
        assert!((share(1) - 0.30).abs() < 0.02);
        assert!((share(2) - 0.15).abs() < 0.02);
        assert!((share(3) - 0.05).abs() < 0.01);
    }

    #[test]
    fn test_index_at_clamps() {
        let layout = SlotLayout::base();
        assert_eq!(layout.index_at(-50.0), 0);
        assert_eq!(layout.index_at(0.0), 0);
        assert_eq!(layout.index_at(BOARD_WIDTH * 2.0), layout.len() - 1);
        assert_eq!(layout.index_at(f32::NAN), 0);
        assert_eq!(layout.index_at(BOARD_WIDTH / 2.0), 7);
        assert_eq!(layout.slot_at(BOARD_WIDTH / 2.0), Some((7, Slot::Multiplier(0.5))));
    }

    #[test]
    fn test_empty_layout_has_no_slot() {
        let layout = SlotLayout::from_slots(Vec::new());
        assert_eq!(layout.slot_at(100.0), None);
    }

    #[test]
    fn test_high_value() {
        assert!(Slot::Multiplier(10.0).is_high_value());
        assert!(Slot::Multiplier(1000.0).is_high_value());
        assert!(!Slot::Multiplier(5.0).is_high_value());
        assert!(!Slot::FreeDrops { base: 10 }.is_high_value());
    }
}
