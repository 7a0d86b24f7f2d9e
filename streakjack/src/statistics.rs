//! Outcome counts and streak-length frequency tables accumulated over a run.

use std::collections::BTreeMap;

use crate::{BettingStrategyKind, Outcome, SimulationPhase};

/// How many times each streak length occurred.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreakTable {
    counts: BTreeMap<u32, u64>,
}

/// One row of a streak breakdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreakFrequency {
    pub length: u32,
    pub count: u64,
    /// Share of all closed streaks of this kind, in percent.
    pub percentage: f64,
}

impl StreakTable {
    pub fn new() -> StreakTable {
        StreakTable {
            counts: BTreeMap::new(),
        }
    }

    /// Records a closed streak. Zero-length streaks are ignored.
    pub fn record(&mut self, length: u32) {
        if length > 0 {
            *self.counts.entry(length).or_insert(0) += 1;
        }
    }

    pub fn count(&self, length: u32) -> u64 {
        self.counts.get(&length).copied().unwrap_or(0)
    }

    pub fn total_streaks(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn longest(&self) -> u32 {
        self.counts.keys().next_back().copied().unwrap_or(0)
    }

    /// Sum of `length * count` over every bucket, i.e. rounds covered by streaks.
    pub fn rounds_covered(&self) -> u64 {
        self.counts
            .iter()
            .map(|(length, count)| *length as u64 * count)
            .sum()
    }

    /// Every length from 1 to the longest observed, including lengths that never occurred.
    pub fn breakdown(&self) -> Vec<StreakFrequency> {
        let total = self.total_streaks();
        (1..=self.longest())
            .map(|length| {
                let count = self.count(length);
                StreakFrequency {
                    length,
                    count,
                    percentage: percentage(count, total),
                }
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

/// Running totals kept by the simulator while rounds are played.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    wins: u64,
    losses: u64,
    pushes: u64,
    largest_bet: i64,
    lowest_bankroll: i64,
    loss_streaks: StreakTable,
    win_streaks: StreakTable,
}

impl Statistics {
    pub fn new(starting_bankroll: i64) -> Statistics {
        Statistics {
            lowest_bankroll: starting_bankroll,
            ..Default::default()
        }
    }

    pub fn record_round(&mut self, outcome: Outcome, bet: i64, bankroll_after: i64) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Lose => self.losses += 1,
            Outcome::Push => self.pushes += 1,
        }
        self.largest_bet = self.largest_bet.max(bet);
        self.lowest_bankroll = self.lowest_bankroll.min(bankroll_after);
    }

    pub fn close_loss_streak(&mut self, length: u32) {
        self.loss_streaks.record(length);
    }

    pub fn close_win_streak(&mut self, length: u32) {
        self.win_streaks.record(length);
    }

    pub fn get_rounds_played(&self) -> u64 {
        self.wins + self.losses + self.pushes
    }

    pub fn get_loss_streaks(&self) -> &StreakTable {
        &self.loss_streaks
    }

    pub fn get_win_streaks(&self) -> &StreakTable {
        &self.win_streaks
    }
}

/// Everything reported once a run is over.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub betting_strategy: BettingStrategyKind,
    pub phase: SimulationPhase,
    pub starting_bankroll: i64,
    pub final_bankroll: i64,
    pub rounds_played: u64,
    pub wins: u64,
    pub losses: u64,
    pub pushes: u64,
    pub largest_bet: i64,
    pub lowest_bankroll: i64,
    pub loss_streaks: StreakTable,
    pub win_streaks: StreakTable,
}

impl SimulationSummary {
    /// Builds the summary from the running totals, flushing the streaks that
    /// are still open into their tables.
    pub(crate) fn new(
        statistics: &Statistics,
        betting_strategy: BettingStrategyKind,
        phase: SimulationPhase,
        starting_bankroll: i64,
        final_bankroll: i64,
        open_loss_streak: u32,
        open_win_streak: u32,
    ) -> SimulationSummary {
        let mut loss_streaks = statistics.loss_streaks.clone();
        let mut win_streaks = statistics.win_streaks.clone();
        loss_streaks.record(open_loss_streak);
        win_streaks.record(open_win_streak);

        SimulationSummary {
            betting_strategy,
            phase,
            starting_bankroll,
            final_bankroll,
            rounds_played: statistics.get_rounds_played(),
            wins: statistics.wins,
            losses: statistics.losses,
            pushes: statistics.pushes,
            largest_bet: statistics.largest_bet,
            lowest_bankroll: statistics.lowest_bankroll,
            loss_streaks,
            win_streaks,
        }
    }

    pub fn net_result(&self) -> i64 {
        self.final_bankroll.saturating_sub(self.starting_bankroll)
    }

    pub fn win_percentage(&self) -> f64 {
        percentage(self.wins, self.rounds_played)
    }

    pub fn loss_percentage(&self) -> f64 {
        percentage(self.losses, self.rounds_played)
    }

    pub fn push_percentage(&self) -> f64 {
        percentage(self.pushes, self.rounds_played)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streak_table_counts_lengths() {
        let mut table = StreakTable::new();
        table.record(1);
        table.record(3);
        table.record(1);
        table.record(0);
        assert_eq!(table.count(1), 2);
        assert_eq!(table.count(2), 0);
        assert_eq!(table.count(3), 1);
        assert_eq!(table.total_streaks(), 3);
        assert_eq!(table.longest(), 3);
        assert_eq!(table.rounds_covered(), 5);
    }

    #[test]
    fn breakdown_fills_gaps_up_to_longest() {
        let mut table = StreakTable::new();
        table.record(1);
        table.record(1);
        table.record(1);
        table.record(4);
        let breakdown = table.breakdown();
        assert_eq!(breakdown.len(), 4);
        assert_eq!(breakdown[0].length, 1);
        assert_eq!(breakdown[0].count, 3);
        assert!((breakdown[0].percentage - 75.0).abs() < 1e-9);
        assert_eq!(breakdown[1].count, 0);
        assert_eq!(breakdown[1].percentage, 0.0);
        assert_eq!(breakdown[3].length, 4);
        assert!((breakdown[3].percentage - 25.0).abs() < 1e-9);
    }

    #[test]
    fn empty_table_has_empty_breakdown() {
        let table = StreakTable::new();
        assert!(table.is_empty());
        assert_eq!(table.longest(), 0);
        assert!(table.breakdown().is_empty());
    }

    #[test]
    fn statistics_track_extremes() {
        let mut statistics = Statistics::new(100);
        statistics.record_round(Outcome::Lose, 1, 99);
        statistics.record_round(Outcome::Lose, 2, 97);
        statistics.record_round(Outcome::Win, 4, 101);
        statistics.record_round(Outcome::Push, 1, 101);
        assert_eq!(statistics.get_rounds_played(), 4);
        assert_eq!(statistics.largest_bet, 4);
        assert_eq!(statistics.lowest_bankroll, 97);
    }

    #[test]
    fn summary_flushes_open_streaks() {
        let mut statistics = Statistics::new(100);
        statistics.record_round(Outcome::Win, 1, 101);
        statistics.record_round(Outcome::Lose, 1, 100);
        statistics.record_round(Outcome::Lose, 2, 98);
        statistics.close_win_streak(1);

        let summary = SimulationSummary::new(
            &statistics,
            BettingStrategyKind::Martingale,
            SimulationPhase::StoppedByLossStreak,
            100,
            98,
            2,
            0,
        );
        assert_eq!(summary.loss_streaks.count(2), 1);
        assert_eq!(summary.win_streaks.count(1), 1);
        assert_eq!(summary.win_streaks.total_streaks(), 1);
        assert_eq!(statistics.get_loss_streaks().total_streaks(), 0);
        assert_eq!(summary.net_result(), -2);
    }

    #[test]
    fn percentages_of_rounds() {
        let mut statistics = Statistics::new(100);
        statistics.record_round(Outcome::Win, 1, 101);
        statistics.record_round(Outcome::Lose, 1, 100);
        statistics.record_round(Outcome::Lose, 2, 98);
        statistics.record_round(Outcome::Push, 4, 98);
        let summary = SimulationSummary::new(
            &statistics,
            BettingStrategyKind::Flat,
            SimulationPhase::Running,
            100,
            98,
            0,
            0,
        );
        assert!((summary.win_percentage() - 25.0).abs() < 1e-9);
        assert!((summary.loss_percentage() - 50.0).abs() < 1e-9);
        assert!((summary.push_percentage() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn percentage_of_nothing_is_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(3, 0), 0.0);
    }
}
