//! Peg field and per-drop multiplier lines

use std::ops::Range;
use std::sync::LazyLock;

use glam::Vec2;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::centered;
use crate::consts::*;

/// Line count weights (0..=4 lines), in percent
const LINE_COUNT_WEIGHTS: [u32; 5] = [16, 50, 25, 8, 1];

static LINE_COUNT_DIST: LazyLock<WeightedIndex<u32>> = LazyLock::new(|| {
    WeightedIndex::new(LINE_COUNT_WEIGHTS).expect("line count weights are non-zero")
});

/// A peg in the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Peg {
    pub pos: Vec2,
    pub row: usize,
    /// Ticks of hit glow remaining
    pub hit_timer: u32,
    /// Ticks of boosted glow remaining (hit by a ball that crossed a line)
    pub boosted_timer: u32,
}

impl Peg {
    pub fn new(pos: Vec2, row: usize) -> Self {
        Self {
            pos,
            row,
            hit_timer: 0,
            boosted_timer: 0,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.hit_timer > 0
    }

    pub fn is_boosted_hit(&self) -> bool {
        self.boosted_timer > 0
    }

    /// Mark the peg struck by a ball
    pub fn strike(&mut self, boosted: bool) {
        self.hit_timer = PEG_GLOW_TICKS;
        if boosted {
            self.boosted_timer = PEG_GLOW_TICKS;
        }
    }

    /// Count glow timers down by one tick
    pub fn decay(&mut self) {
        self.hit_timer = self.hit_timer.saturating_sub(1);
        self.boosted_timer = self.boosted_timer.saturating_sub(1);
    }
}

/// Identity of a multiplier line: its row and the index of its left peg.
/// Rows are never reused within one drop, so this is unique per drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineId {
    pub row: usize,
    pub start: usize,
}

/// A multiplier line stretched between two adjacent pegs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiplierLine {
    pub id: LineId,
    pub start: Vec2,
    pub end: Vec2,
    pub multiplier: u32,
    pub active: bool,
}

/// Peg layout plus the current drop's lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub pegs: Vec<Peg>,
    /// Index range into `pegs` for each row
    rows: Vec<Range<usize>>,
    pub lines: Vec<MultiplierLine>,
}

impl Board {
    /// Build the 13-row peg field with per-peg jitter
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut pegs = Vec::new();
        let mut rows = Vec::with_capacity(PEG_ROWS);

        for row in 0..PEG_ROWS {
            let pegs_in_row = row + PEGS_IN_FIRST_ROW;
            let total_width = (pegs_in_row - 1) as f32 * PEG_SPACING;
            let start_x = (BOARD_WIDTH - total_width) / 2.0;
            let y = FIRST_ROW_Y + row as f32 * ROW_SPACING;

            let first = pegs.len();
            for col in 0..pegs_in_row {
                let x = start_x + col as f32 * PEG_SPACING + centered(rng, PEG_JITTER_X);
                let y = y + centered(rng, PEG_JITTER_Y);
                pegs.push(Peg::new(Vec2::new(x, y), row));
            }
            rows.push(first..pegs.len());
        }

        Self {
            pegs,
            rows,
            lines: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Pegs of a single row, left to right
    pub fn row(&self, row: usize) -> &[Peg] {
        match self.rows.get(row) {
            Some(range) => &self.pegs[range.clone()],
            None => &[],
        }
    }

    /// Replace the lines with a fresh random set for the next drop
    pub fn regenerate_lines<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.lines = generate_lines(self, rng);
        for line in &self.lines {
            log::debug!(
                "Multiplier line on row {} with {}x",
                line.id.row,
                line.multiplier
            );
        }
    }

    pub fn decay_pegs(&mut self) {
        for peg in &mut self.pegs {
            peg.decay();
        }
    }
}

/// Roll how many lines to place this drop
pub fn roll_line_count<R: Rng + ?Sized>(rng: &mut R) -> usize {
    LINE_COUNT_DIST.sample(rng)
}

/// Place lines on distinct candidate rows, each between two adjacent pegs
pub fn generate_lines<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Vec<MultiplierLine> {
    let count = roll_line_count(rng);
    if count == 0 {
        return Vec::new();
    }

    let mut rows = LINE_ROWS;
    rows.shuffle(rng);

    rows.iter()
        .take(count)
        .filter_map(|&row| {
            let pegs = board.row(row);
            if pegs.len() < 2 {
                return None;
            }
            let start = rng.random_range(0..pegs.len() - 1);
            let multiplier = LINE_MULTIPLIERS[rng.random_range(0..LINE_MULTIPLIERS.len())];
            Some(MultiplierLine {
                id: LineId { row, start },
                start: pegs[start].pos,
                end: pegs[start + 1].pos,
                multiplier,
                active: true,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashSet;

    #[test]
    fn test_row_sizes() {
        let mut rng = Pcg32::seed_from_u64(7);
        let board = Board::generate(&mut rng);
        assert_eq!(board.row_count(), PEG_ROWS);
        for r in 0..PEG_ROWS {
            assert_eq!(board.row(r).len(), r + 4);
            assert!(board.row(r).iter().all(|p| p.row == r));
        }
        assert!(board.row(PEG_ROWS).is_empty());
    }

    #[test]
    fn test_jitter_bounds() {
        let mut rng = Pcg32::seed_from_u64(8);
        let board = Board::generate(&mut rng);
        for r in 0..PEG_ROWS {
            let n = r + 4;
            let start_x = (BOARD_WIDTH - (n - 1) as f32 * PEG_SPACING) / 2.0;
            for (col, peg) in board.row(r).iter().enumerate() {
                let ideal = Vec2::new(
                    start_x + col as f32 * PEG_SPACING,
                    FIRST_ROW_Y + r as f32 * ROW_SPACING,
                );
                assert!((peg.pos.x - ideal.x).abs() <= 2.0);
                assert!((peg.pos.y - ideal.y).abs() <= 1.5);
            }
        }
    }

    #[test]
    fn test_lines_on_distinct_candidate_rows() {
        let mut rng = Pcg32::seed_from_u64(9);
        let board = Board::generate(&mut rng);
        for _ in 0..500 {
            let lines = generate_lines(&board, &mut rng);
            assert!(lines.len() <= 4);
            let rows: HashSet<_> = lines.iter().map(|l| l.id.row).collect();
            assert_eq!(rows.len(), lines.len());
            for line in &lines {
                assert!(LINE_ROWS.contains(&line.id.row));
                assert!(LINE_MULTIPLIERS.contains(&line.multiplier));
                let pegs = board.row(line.id.row);
                assert_eq!(line.start, pegs[line.id.start].pos);
                assert_eq!(line.end, pegs[line.id.start + 1].pos);
                assert!(line.active);
            }
        }
    }

    #[test]
    fn test_line_count_distribution() {
        let mut rng = Pcg32::seed_from_u64(10);
        let mut counts = [0u32; 5];
        let trials = 20_000;
        for _ in 0..trials {
            counts[roll_line_count(&mut rng)] += 1;
        }
        let share = |n: usize| counts[n] as f64 / trials as f64;
        assert!((share(0) - 0.16).abs() < 0.02);
        assert!((share(1) - 0.50).abs() < 0.02);
        assert!((share(2) - 0.25).abs() < 0.02);
        assert!((share(3) - 0.08).abs() < 0.02);
        assert!(share(4) < 0.02);
    }

    #[test]
    fn test_peg_glow() {
        let mut peg = Peg::new(Vec2::ZERO, 0);
        peg.strike(false);
        assert!(peg.is_hit());
        assert!(!peg.is_boosted_hit());
        peg.strike(true);
        assert!(peg.is_boosted_hit());
        for _ in 0..PEG_GLOW_TICKS {
            peg.decay();
        }
        assert!(!peg.is_hit());
        assert!(!peg.is_boosted_hit());
    }
}
