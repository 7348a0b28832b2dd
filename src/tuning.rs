//! Game balance and session defaults
//!
//! Loaded from JSON when a front end wants to override the defaults; every
//! field falls back to its default when omitted.

use serde::{Deserialize, Serialize};

use crate::ms_to_ticks;

/// Ball speed mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeedMode {
    #[default]
    Regular,
    Turbo,
}

impl SpeedMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedMode::Regular => "Regular",
            SpeedMode::Turbo => "Turbo",
        }
    }

    /// Position step scale applied to velocity each tick
    pub fn speed_factor(&self) -> f32 {
        match self {
            SpeedMode::Regular => 0.45,
            SpeedMode::Turbo => 0.9,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SpeedMode::Regular => SpeedMode::Turbo,
            SpeedMode::Turbo => SpeedMode::Regular,
        }
    }
}

impl std::str::FromStr for SpeedMode {
    type Err = TuningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "regular" | "normal" => Ok(SpeedMode::Regular),
            "turbo" | "fast" => Ok(SpeedMode::Turbo),
            other => Err(TuningError::UnknownSpeedMode(other.to_string())),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("Serialization error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown speed mode: {0}")]
    UnknownSpeedMode(String),

    #[error("Bet table is empty")]
    EmptyBetTable,

    #[error("Bet amount {0} must be positive and finite")]
    InvalidBet(f64),

    #[error("Default bet {0} is not in the bet table")]
    DefaultBetNotOffered(f64),

    #[error("Default ball count {count} is outside 1..={max}")]
    InvalidBallCount { count: u32, max: u32 },

    #[error("Starting balance {0} must be non-negative and finite")]
    InvalidBalance(f64),
}

/// Data-driven game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Balance after a reset
    pub starting_balance: f64,
    /// Selectable bet amounts per ball
    pub bet_amounts: Vec<f64>,
    pub default_bet: f64,
    pub default_ball_count: u32,
    pub max_ball_count: u32,

    // === Timing (milliseconds, converted to ticks) ===
    /// Minimum time between drop starts
    pub drop_cooldown_ms: u32,
    /// Spawn stagger for drops of up to `stagger_threshold` balls
    pub stagger_short_ms: u32,
    /// Spawn stagger for larger drops
    pub stagger_long_ms: u32,
    pub stagger_threshold: u32,
    /// Pause between settled free drops
    pub free_drop_delay_ms: u32,

    pub speed_mode: SpeedMode,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            starting_balance: 100.0,
            bet_amounts: vec![0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 10.0],
            default_bet: 1.0,
            default_ball_count: 1,
            max_ball_count: 10,

            drop_cooldown_ms: 300,
            stagger_short_ms: 100,
            stagger_long_ms: 400,
            stagger_threshold: 2,
            free_drop_delay_ms: 500,

            speed_mode: SpeedMode::Regular,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning ({} bet levels)", tuning.bet_amounts.len());
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if self.bet_amounts.is_empty() {
            return Err(TuningError::EmptyBetTable);
        }
        if let Some(&bad) = self
            .bet_amounts
            .iter()
            .find(|b| !b.is_finite() || **b <= 0.0)
        {
            return Err(TuningError::InvalidBet(bad));
        }
        if !self.offers_bet(self.default_bet) {
            return Err(TuningError::DefaultBetNotOffered(self.default_bet));
        }
        if self.default_ball_count == 0 || self.default_ball_count > self.max_ball_count {
            return Err(TuningError::InvalidBallCount {
                count: self.default_ball_count,
                max: self.max_ball_count,
            });
        }
        if !self.starting_balance.is_finite() || self.starting_balance < 0.0 {
            return Err(TuningError::InvalidBalance(self.starting_balance));
        }
        Ok(())
    }

    /// Whether `amount` is one of the selectable bets
    pub fn offers_bet(&self, amount: f64) -> bool {
        self.bet_amounts.iter().any(|b| (b - amount).abs() < 1e-9)
    }

    pub fn cooldown_ticks(&self) -> u64 {
        ms_to_ticks(self.drop_cooldown_ms)
    }

    /// Delay between consecutive spawns of a drop of `ball_count` balls
    pub fn stagger_ticks(&self, ball_count: u32) -> u64 {
        if ball_count > self.stagger_threshold {
            ms_to_ticks(self.stagger_long_ms)
        } else {
            ms_to_ticks(self.stagger_short_ms)
        }
    }

    pub fn free_drop_delay_ticks(&self) -> u64 {
        ms_to_ticks(self.free_drop_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.cooldown_ticks(), 36);
        assert_eq!(tuning.stagger_ticks(2), 12);
        assert_eq!(tuning.stagger_ticks(3), 48);
        assert_eq!(tuning.free_drop_delay_ticks(), 60);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "starting_balance": 250.0, "speed_mode": "Turbo" }"#)
            .unwrap();
        assert_eq!(tuning.starting_balance, 250.0);
        assert_eq!(tuning.speed_mode, SpeedMode::Turbo);
        assert_eq!(tuning.bet_amounts, Tuning::default().bet_amounts);
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_default_bet_outside_table() {
        let err = Tuning::from_json(r#"{ "bet_amounts": [1.0, 2.0], "default_bet": 3.0 }"#)
            .unwrap_err();
        assert!(matches!(err, TuningError::DefaultBetNotOffered(_)));
    }

    #[test]
    fn test_rejects_zero_ball_count() {
        let err = Tuning::from_json(r#"{ "default_ball_count": 0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::InvalidBallCount { .. }));
    }

    #[test]
    fn test_speed_mode() {
        assert_eq!("turbo".parse::<SpeedMode>().unwrap(), SpeedMode::Turbo);
        assert_eq!("Regular".parse::<SpeedMode>().unwrap(), SpeedMode::Regular);
        assert!("warp".parse::<SpeedMode>().is_err());
        assert_eq!(
            SpeedMode::Turbo.speed_factor(),
            SpeedMode::Regular.speed_factor() * 2.0
        );
        assert_eq!(SpeedMode::Regular.toggled(), SpeedMode::Turbo);
    }
}
