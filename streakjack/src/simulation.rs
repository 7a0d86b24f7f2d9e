pub mod hand;
pub mod shoe;

use crate::{
    statistics::Statistics,
    strategy::{DealerStrategy, PlayerStrategy, Strategy},
    Decision, Outcome, Rule, SimulationError, SimulationSummary,
};
use rand::Rng;
use streakjack_macros::allowed_phase;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, info};

use self::{hand::Hand, shoe::Shoe};

/// A card rank. Suits play no part in valuation, so they are not modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum Card {
    #[strum(serialize = "2")]
    Two,
    #[strum(serialize = "3")]
    Three,
    #[strum(serialize = "4")]
    Four,
    #[strum(serialize = "5")]
    Five,
    #[strum(serialize = "6")]
    Six,
    #[strum(serialize = "7")]
    Seven,
    #[strum(serialize = "8")]
    Eight,
    #[strum(serialize = "9")]
    Nine,
    #[strum(serialize = "10")]
    Ten,
    #[strum(serialize = "J")]
    Jack,
    #[strum(serialize = "Q")]
    Queen,
    #[strum(serialize = "K")]
    King,
    #[strum(serialize = "A")]
    Ace,
}

impl Card {
    /// Nominal value, with the Ace counted as 11.
    pub fn blackjack_value(&self) -> u32 {
        match self {
            Card::Two => 2,
            Card::Three => 3,
            Card::Four => 4,
            Card::Five => 5,
            Card::Six => 6,
            Card::Seven => 7,
            Card::Eight => 8,
            Card::Nine => 9,
            Card::Ten | Card::Jack | Card::Queen | Card::King => 10,
            Card::Ace => 11,
        }
    }

    pub fn is_ace(&self) -> bool {
        *self == Card::Ace
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SimulationPhase {
    Running,
    StoppedByLossStreak,
    StoppedByBankroll,
}

/// Bankroll, bet, and streak counters threaded through every round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    pub bankroll: i64,
    pub bet: i64,
    pub loss_streak: u32,
    pub win_streak: u32,
    /// Number of the next round to be played, starting at 1.
    pub round: u64,
}

impl SimulationState {
    pub fn new(rule: &Rule) -> SimulationState {
        SimulationState {
            bankroll: rule.starting_bankroll,
            bet: rule.base_bet,
            loss_streak: 0,
            win_streak: 0,
            round: 1,
        }
    }
}

/// What happened in a single round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    pub round: u64,
    pub bet: i64,
    pub player_hand: Hand,
    pub dealer_hand: Hand,
    pub outcome: Outcome,
    pub bankroll: i64,
    pub loss_streak: u32,
    pub win_streak: u32,
}

impl RoundReport {
    pub fn player_value(&self) -> u32 {
        self.player_hand.value()
    }

    pub fn dealer_value(&self) -> u32 {
        self.dealer_hand.value()
    }
}

/// Money returned to the player for a finished round, stake included.
pub fn payout(outcome: Outcome, bet: i64) -> i64 {
    match outcome {
        Outcome::Win => bet.saturating_mul(2),
        Outcome::Push => bet,
        Outcome::Lose => 0,
    }
}

/// Simulates one player at a single-deck table until a stop condition is met.
pub struct Simulator<R: Rng> {
    rule: Rule,
    phase: SimulationPhase,
    shoe: Shoe<R>,
    state: SimulationState,
    statistics: Statistics,
    player_strategy: PlayerStrategy,
    dealer_strategy: DealerStrategy,
}

impl<R: Rng> Simulator<R> {
    pub fn new(rule: &Rule, rng: R) -> Result<Self, SimulationError> {
        Self::with_shoe(rule, Shoe::new(rng))
    }

    /// Uses the given shoe instead of a freshly shuffled one.
    pub fn with_shoe(rule: &Rule, shoe: Shoe<R>) -> Result<Self, SimulationError> {
        rule.validate()?;
        let state = SimulationState::new(rule);
        let mut simulator = Self {
            rule: *rule,
            phase: SimulationPhase::Running,
            shoe,
            state,
            statistics: Statistics::new(rule.starting_bankroll),
            player_strategy: PlayerStrategy::new(rule),
            dealer_strategy: DealerStrategy::new(rule),
        };
        simulator.phase = simulator.evaluate_phase();
        Ok(simulator)
    }

    /// Plays rounds until a stop condition is reached and returns the summary.
    pub fn run<U: SimulatorEventHandler>(
        &mut self,
        handler: &mut U,
    ) -> Result<SimulationSummary, SimulationError> {
        handler.on_simulation_begin(&self.rule);
        while self.phase == SimulationPhase::Running {
            self.play_round(handler)?;
        }

        let summary = self.summary();
        info!(
            rounds = summary.rounds_played,
            final_bankroll = summary.final_bankroll,
            phase = %summary.phase,
            "simulation stopped"
        );
        handler.on_simulation_end(&summary);
        Ok(summary)
    }

    /// Plays a single round and advances the state. Can be called at Running phase.
    #[allowed_phase(Running)]
    pub fn play_round<U: SimulatorEventHandler>(
        &mut self,
        handler: &mut U,
    ) -> Result<RoundReport, SimulationError> {
        if self.shoe.needs_reshuffle(self.rule.reshuffle_threshold) {
            debug!(
                round = self.state.round,
                remaining = self.shoe.remaining(),
                "reshuffling shoe"
            );
            self.shoe.reshuffle();
            handler.on_reshuffle(self.state.round);
        }

        let bet = self.state.bet;
        self.state.bankroll = self.state.bankroll.saturating_sub(bet);

        let (player_hand, dealer_hand) = match self.deal_and_play() {
            Ok(hands) => hands,
            Err(err) => {
                // The round never resolved, so the stake goes back.
                self.state.bankroll = self.state.bankroll.saturating_add(bet);
                return Err(err);
            }
        };

        let outcome = player_hand.outcome_against(&dealer_hand);
        self.state.bankroll = self.state.bankroll.saturating_add(payout(outcome, bet));
        self.update_streaks(outcome);
        self.statistics
            .record_round(outcome, bet, self.state.bankroll);

        let report = RoundReport {
            round: self.state.round,
            bet,
            player_hand,
            dealer_hand,
            outcome,
            bankroll: self.state.bankroll,
            loss_streak: self.state.loss_streak,
            win_streak: self.state.win_streak,
        };
        debug!(
            round = report.round,
            bet,
            player = report.player_value(),
            dealer = report.dealer_value(),
            outcome = %outcome,
            bankroll = report.bankroll,
            "round resolved"
        );

        self.state.bet = self
            .rule
            .betting_strategy
            .next_bet(self.rule.base_bet, bet, outcome);
        self.state.round += 1;
        self.phase = self.evaluate_phase();

        handler.on_round_end(&report);
        Ok(report)
    }

    /// Summarizes the run so far. Streaks still open are counted as closed in
    /// the summary, the simulator itself is left untouched.
    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary::new(
            &self.statistics,
            self.rule.betting_strategy,
            self.phase,
            self.rule.starting_bankroll,
            self.state.bankroll,
            self.state.loss_streak,
            self.state.win_streak,
        )
    }

    pub fn get_phase(&self) -> SimulationPhase {
        self.phase
    }

    pub fn get_state(&self) -> &SimulationState {
        &self.state
    }

    pub fn get_rule(&self) -> &Rule {
        &self.rule
    }

    pub fn get_statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn remaining_cards(&self) -> usize {
        self.shoe.remaining()
    }

    fn deal_card(&mut self) -> Result<Card, SimulationError> {
        self.shoe
            .deal_card()
            .ok_or(SimulationError::ShoeExhausted {
                round: self.state.round,
            })
    }

    /// Deals player, player, dealer, dealer, then plays both hands. The dealer
    /// does not draw once the player has busted.
    fn deal_and_play(&mut self) -> Result<(Hand, Hand), SimulationError> {
        let mut player_hand = Hand::new();
        let mut dealer_hand = Hand::new();
        for _ in 0..2 {
            player_hand.receive_card(self.deal_card()?);
        }
        for _ in 0..2 {
            dealer_hand.receive_card(self.deal_card()?);
        }

        let player_strategy = self.player_strategy;
        self.play_hand(&player_strategy, &mut player_hand)?;
        if !player_hand.is_busted() {
            let dealer_strategy = self.dealer_strategy;
            self.play_hand(&dealer_strategy, &mut dealer_hand)?;
        }
        Ok((player_hand, dealer_hand))
    }

    fn play_hand<T: Strategy>(&mut self, strategy: &T, hand: &mut Hand) -> Result<(), SimulationError> {
        while strategy.make_decision(hand) == Decision::Hit {
            hand.receive_card(self.deal_card()?);
        }
        Ok(())
    }

    fn update_streaks(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => {
                self.statistics.close_loss_streak(self.state.loss_streak);
                self.state.loss_streak = 0;
                self.state.win_streak += 1;
            }
            Outcome::Lose => {
                self.statistics.close_win_streak(self.state.win_streak);
                self.state.win_streak = 0;
                self.state.loss_streak += 1;
            }
            Outcome::Push => {}
        }
    }

    /// Bankroll exhaustion is checked before the loss streak.
    fn evaluate_phase(&self) -> SimulationPhase {
        if self.state.bankroll <= 0 {
            SimulationPhase::StoppedByBankroll
        } else if self.state.loss_streak >= self.rule.max_loss_streak {
            SimulationPhase::StoppedByLossStreak
        } else {
            SimulationPhase::Running
        }
    }
}

pub trait SimulatorEventHandler {
    fn on_simulation_begin(&mut self, rule: &Rule);
    fn on_reshuffle(&mut self, round: u64);
    fn on_round_end(&mut self, report: &RoundReport);
    fn on_simulation_end(&mut self, summary: &SimulationSummary);
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl SimulatorEventHandler for NoopHandler {
    fn on_simulation_begin(&mut self, _: &Rule) {}
    fn on_reshuffle(&mut self, _: u64) {}
    fn on_round_end(&mut self, _: &RoundReport) {}
    fn on_simulation_end(&mut self, _: &SimulationSummary) {}
}
