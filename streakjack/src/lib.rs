pub mod simulation;
pub mod statistics;
pub mod strategy;

use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use strum_macros::{Display, EnumIter};
use thiserror::Error;

pub use simulation::SimulationPhase;
pub use statistics::{SimulationSummary, StreakFrequency, StreakTable};
pub use strategy::{BettingStrategy, Flat, Martingale};

pub const DEFAULT_STARTING_BANKROLL: i64 = 100;
pub const DEFAULT_BASE_BET: i64 = 1;
pub const DEFAULT_RESHUFFLE_THRESHOLD: usize = 15;
pub const DEFAULT_STAND_ON: u32 = 17;
pub const DEFAULT_MAX_LOSS_STREAK: u32 = 5;

/// Fewest cards a round can possibly need: two for each party.
const MIN_RESHUFFLE_THRESHOLD: usize = 4;

/// Parameters of one simulation run. `Rule::default()` is the classic table:
/// 100 units, base bet 1, reshuffle below 15 cards, both parties stand on 17,
/// stop after 5 straight losses, Martingale betting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub starting_bankroll: i64,
    pub base_bet: i64,
    pub reshuffle_threshold: usize,
    pub player_stand_on: u32,
    pub dealer_stand_on: u32,
    pub max_loss_streak: u32,
    pub betting_strategy: BettingStrategyKind,
}

impl Default for Rule {
    fn default() -> Self {
        Rule {
            starting_bankroll: DEFAULT_STARTING_BANKROLL,
            base_bet: DEFAULT_BASE_BET,
            reshuffle_threshold: DEFAULT_RESHUFFLE_THRESHOLD,
            player_stand_on: DEFAULT_STAND_ON,
            dealer_stand_on: DEFAULT_STAND_ON,
            max_loss_streak: DEFAULT_MAX_LOSS_STREAK,
            betting_strategy: BettingStrategyKind::Martingale,
        }
    }
}

impl Rule {
    /// Checks the parameters a `Simulator` relies on.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.base_bet <= 0 {
            return Err(SimulationError::InvalidRule(format!(
                "base_bet must be positive, got {}",
                self.base_bet
            )));
        }
        if self.max_loss_streak == 0 {
            return Err(SimulationError::InvalidRule(String::from(
                "max_loss_streak must be at least 1",
            )));
        }
        if self.reshuffle_threshold < MIN_RESHUFFLE_THRESHOLD {
            return Err(SimulationError::InvalidRule(format!(
                "reshuffle_threshold must be at least {}, got {}",
                MIN_RESHUFFLE_THRESHOLD, self.reshuffle_threshold
            )));
        }
        for (name, stand_on) in [
            ("player_stand_on", self.player_stand_on),
            ("dealer_stand_on", self.dealer_stand_on),
        ] {
            if !(2..=21).contains(&stand_on) {
                return Err(SimulationError::InvalidRule(format!(
                    "{} must be in [2, 21], got {}",
                    name, stand_on
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_enum_str, Deserialize_enum_str)]
pub enum BettingStrategyKind {
    Martingale,
    Flat,
}

impl BettingStrategyKind {
    /// Maps the console menu entry (1 = Martingale, 2 = Flat).
    pub fn from_choice(choice: u8) -> Option<Self> {
        match choice {
            1 => Some(BettingStrategyKind::Martingale),
            2 => Some(BettingStrategyKind::Flat),
            _ => None,
        }
    }

    /// The bet for the next round after `outcome` was resolved at `current_bet`.
    pub fn next_bet(&self, base_bet: i64, current_bet: i64, outcome: Outcome) -> i64 {
        match self {
            BettingStrategyKind::Martingale => Martingale::new(base_bet).next_bet(current_bet, outcome),
            BettingStrategyKind::Flat => Flat::new(base_bet).next_bet(current_bet, outcome),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BettingStrategyKind::Martingale => {
                "double your bet after a loss, repeat bet on push, reset to base bet on win"
            }
            BettingStrategyKind::Flat => "always bet the base bet",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Outcome {
    #[strum(serialize = "WIN")]
    Win,
    #[strum(serialize = "LOSE")]
    Lose,
    #[strum(serialize = "PUSH")]
    Push,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Decision {
    Hit,
    Stand,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("{operation} is only allowed in Running phase, current phase is {phase}")]
    PhaseNotAllowed {
        operation: &'static str,
        phase: SimulationPhase,
    },
    #[error("the shoe ran out of cards during round {round}")]
    ShoeExhausted { round: u64 },
    #[error("invalid rule: {0}")]
    InvalidRule(String),
}
