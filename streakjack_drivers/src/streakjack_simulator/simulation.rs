use std::fmt;

use anyhow::{Context, Result};
use rand::Rng;
use streakjack::simulation::{RoundReport, Simulator, SimulatorEventHandler};
use streakjack::{Rule, SimulationPhase, SimulationSummary, StreakTable};
use tracing::info;

const SEPARATOR: &str = "----------------------------------------------------";

/// Prints the run to stdout as it happens.
#[derive(Debug, Clone, Default)]
pub struct ConsoleReporter {
    quiet: bool,
    reshuffles: u64,
}

impl ConsoleReporter {
    pub fn new(quiet: bool) -> ConsoleReporter {
        ConsoleReporter {
            quiet,
            reshuffles: 0,
        }
    }
}

impl SimulatorEventHandler for ConsoleReporter {
    fn on_simulation_begin(&mut self, rule: &Rule) {
        println!("{}", format_rules(rule));
    }

    fn on_reshuffle(&mut self, round: u64) {
        self.reshuffles += 1;
        if !self.quiet {
            println!("-- Shoe reshuffled before round {} --", round);
        }
    }

    fn on_round_end(&mut self, report: &RoundReport) {
        if !self.quiet {
            println!("{}", format_round(report));
        }
    }

    fn on_simulation_end(&mut self, summary: &SimulationSummary) {
        info!(reshuffles = self.reshuffles, "report finished");
        println!("{}", format_summary(summary));
    }
}

pub fn simulate_until_stopped<R: Rng>(rule: &Rule, rng: R, quiet: bool) -> Result<SimulationSummary> {
    let mut handler = ConsoleReporter::new(quiet);
    let mut simulator = Simulator::new(rule, rng)?;
    let summary = simulator
        .run(&mut handler)
        .context("Simulation aborted")?;
    Ok(summary)
}

/// The banner printed before the first round.
pub struct RulesBanner<'a>(pub &'a Rule);

impl fmt::Display for RulesBanner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = self.0;
        writeln!(f, "Simulation Rules:")?;
        writeln!(
            f,
            "- Player hits when hand value is {} or less; stands on {} and above.",
            rule.player_stand_on - 1,
            rule.player_stand_on
        )?;
        writeln!(
            f,
            "- Dealer hits until reaching at least {} (soft {} stands).",
            rule.dealer_stand_on, rule.dealer_stand_on
        )?;
        writeln!(
            f,
            "- {} betting: {} (base bet {}).",
            rule.betting_strategy,
            rule.betting_strategy.description(),
            rule.base_bet
        )?;
        writeln!(
            f,
            "- Simulation stops after {} consecutive losses or when bankroll hits zero.",
            rule.max_loss_streak
        )?;
        writeln!(f)?;
        writeln!(f, "Recommended Range for meaningful simulation results: 1 to 10 consecutive losses")?;
        writeln!(f, "  * 1-5: Shows normal risk scenarios")?;
        writeln!(f, "  * 6-8: Shows high-risk scenarios (likely bankroll exhaustion)")?;
        writeln!(f, "  * 9-10: Extreme scenarios (virtually impossible to reach)")?;
        writeln!(f)?;
        writeln!(f, "Starting bankroll: {} units", rule.starting_bankroll)
    }
}

pub fn format_rules(rule: &Rule) -> String {
    RulesBanner(rule).to_string()
}

pub fn format_round(report: &RoundReport) -> String {
    format!(
        "Round {:2} | Bet = {:3} | Player = {} ({}) | Dealer = {} ({}) | Outcome = {:4} | Bankroll = {:4} | Loss Streak = {}",
        report.round,
        report.bet,
        report.player_hand,
        report.player_value(),
        report.dealer_hand,
        report.dealer_value(),
        report.outcome.to_string(),
        report.bankroll,
        report.loss_streak
    )
}

/// A run stopped by its loss streak always ends on its longest loss streak.
pub fn stop_reason(summary: &SimulationSummary) -> String {
    match summary.phase {
        SimulationPhase::StoppedByLossStreak => format!(
            "reached {} consecutive losses",
            summary.loss_streaks.longest()
        ),
        SimulationPhase::StoppedByBankroll => String::from("bankroll exhausted"),
        SimulationPhase::Running => String::from("still running"),
    }
}

/// The report printed once the run is over.
pub struct SummaryReport<'a>(pub &'a SimulationSummary);

impl fmt::Display for SummaryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.0;
        writeln!(f, "{}", SEPARATOR)?;
        writeln!(f, "Simulation ended.")?;
        writeln!(f, "Stop reason: {}", stop_reason(summary))?;
        writeln!(f, "Betting strategy: {}", summary.betting_strategy)?;
        writeln!(f, "Final bankroll: {} units", summary.final_bankroll)?;
        writeln!(f, "Net result: {:+} units", summary.net_result())?;
        writeln!(f, "Total rounds played: {}", summary.rounds_played)?;
        writeln!(
            f,
            "Wins: {} ({:.2}%)  Losses: {} ({:.2}%)  Pushes: {} ({:.2}%)",
            summary.wins,
            summary.win_percentage(),
            summary.losses,
            summary.loss_percentage(),
            summary.pushes,
            summary.push_percentage()
        )?;
        writeln!(f, "Largest bet: {} units", summary.largest_bet)?;
        writeln!(f, "Lowest bankroll: {} units", summary.lowest_bankroll)?;
        writeln!(f)?;
        write!(f, "{}", StreakBreakdown("Loss", &summary.loss_streaks))?;
        writeln!(f)?;
        write!(f, "{}", StreakBreakdown("Win", &summary.win_streaks))
    }
}

pub fn format_summary(summary: &SimulationSummary) -> String {
    SummaryReport(summary).to_string()
}

struct StreakBreakdown<'a>(&'a str, &'a StreakTable);

impl fmt::Display for StreakBreakdown<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let StreakBreakdown(kind, table) = *self;
        writeln!(f, "{} streak breakdown:", kind)?;
        if table.is_empty() {
            return writeln!(f, "  No {} streaks recorded.", kind.to_lowercase());
        }
        writeln!(f, "  {:>6} | {:>6} | {:>8}", "Length", "Count", "Percent")?;
        for row in table.breakdown() {
            writeln!(
                f,
                "  {:>6} | {:>6} | {:>7.2}%",
                row.length, row.count, row.percentage
            )?;
        }
        Ok(())
    }
}
