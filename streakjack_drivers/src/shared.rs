use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use streakjack::{BettingStrategyKind, Rule, SimulationError, DEFAULT_MAX_LOSS_STREAK};
use tracing::warn;

pub const CONFIG_FILE_NAME: &str = ".streakjack.yml";
pub const DEFAULT_BETTING_STRATEGY: BettingStrategyKind = BettingStrategyKind::Martingale;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rule: ConfigRule,
    pub streakjack_simulator: ConfigStreakjackSimulator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigRule {
    pub starting_bankroll: i64,
    pub base_bet: i64,
    pub reshuffle_threshold: usize,
    pub player_stand_on: u32,
    pub dealer_stand_on: u32,
}

impl Default for ConfigRule {
    fn default() -> Self {
        let rule = Rule::default();
        ConfigRule {
            starting_bankroll: rule.starting_bankroll,
            base_bet: rule.base_bet,
            reshuffle_threshold: rule.reshuffle_threshold,
            player_stand_on: rule.player_stand_on,
            dealer_stand_on: rule.dealer_stand_on,
        }
    }
}

impl TryInto<Rule> for ConfigRule {
    type Error = SimulationError;

    /// The stop threshold and betting strategy keep their defaults here, they
    /// are resolved separately from user input.
    fn try_into(self) -> Result<Rule, Self::Error> {
        let rule = Rule {
            starting_bankroll: self.starting_bankroll,
            base_bet: self.base_bet,
            reshuffle_threshold: self.reshuffle_threshold,
            player_stand_on: self.player_stand_on,
            dealer_stand_on: self.dealer_stand_on,
            ..Rule::default()
        };
        rule.validate()?;
        Ok(rule)
    }
}

/// Values that may also come from the command line or a prompt. Kept as raw
/// YAML scalars so that bad entries fall back to defaults instead of failing
/// the whole file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigStreakjackSimulator {
    pub max_loss_streak: Option<Value>,
    pub betting_strategy: Option<Value>,
    pub seed: Option<u64>,
}

impl ConfigStreakjackSimulator {
    pub fn max_loss_streak_input(&self) -> Option<String> {
        self.max_loss_streak.as_ref().map(scalar_text)
    }

    pub fn betting_strategy_input(&self) -> Option<String> {
        self.betting_strategy.as_ref().map(scalar_text)
    }
}

/// The text a user would have typed for `value`.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        other => serde_yaml::to_string(other)
            .map(|text| text.trim().to_string())
            .unwrap_or_default(),
    }
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file<P: AsRef<Path>>(filename: P) -> Result<Config> {
    let filename = filename.as_ref();
    let file_content = fs::read_to_string(filename)
        .with_context(|| format!("Failed to read config file: {}", filename.display()))?;
    parse_config(&file_content)
        .with_context(|| format!("Failed to parse config file: {}", filename.display()))
}

pub fn parse_config(content: &str) -> Result<Config> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

/// `~/.streakjack.yml`, if a home directory can be found.
pub fn default_config_path() -> Option<PathBuf> {
    home::home_dir().map(|home_dir| home_dir.join(CONFIG_FILE_NAME))
}

/// Strictly parses the number of consecutive losses that stops a run.
pub fn parse_max_loss_streak(input: &str) -> Result<u32> {
    let input = input.trim();
    let value: i64 = input
        .parse()
        .with_context(|| format!("'{}' is not an integer", input))?;
    if value < 1 {
        bail!("max loss streak must be at least 1, got {}", value);
    }
    u32::try_from(value).with_context(|| format!("max loss streak {} is too large", value))
}

/// Strictly parses a strategy selector: `1`/`2` or the strategy name.
pub fn parse_strategy_choice(input: &str) -> Result<BettingStrategyKind> {
    let input = input.trim();
    if let Ok(choice) = input.parse::<u8>() {
        return BettingStrategyKind::from_choice(choice)
            .with_context(|| format!("strategy choice must be 1 or 2, got {}", choice));
    }
    for kind in [BettingStrategyKind::Martingale, BettingStrategyKind::Flat] {
        if kind.to_string().eq_ignore_ascii_case(input) {
            return Ok(kind);
        }
    }
    bail!("'{}' is not a betting strategy", input)
}

/// Like `parse_max_loss_streak`, but invalid input falls back to the default.
/// The returned notice, if any, should be shown to the user.
pub fn max_loss_streak_or_default(input: &str) -> (u32, Option<String>) {
    match parse_max_loss_streak(input) {
        Ok(value) => (value, None),
        Err(err) => {
            warn!(input, error = %err, "invalid max loss streak, using default");
            (
                DEFAULT_MAX_LOSS_STREAK,
                Some(format!(
                    "Invalid input. Defaulting to {} consecutive losses.",
                    DEFAULT_MAX_LOSS_STREAK
                )),
            )
        }
    }
}

/// Like `parse_strategy_choice`, but invalid input falls back to Martingale.
pub fn strategy_or_default(input: &str) -> (BettingStrategyKind, Option<String>) {
    match parse_strategy_choice(input) {
        Ok(kind) => (kind, None),
        Err(err) => {
            warn!(input, error = %err, "invalid betting strategy, using default");
            (
                DEFAULT_BETTING_STRATEGY,
                Some(format!(
                    "Invalid input. Defaulting to {} betting.",
                    DEFAULT_BETTING_STRATEGY
                )),
            )
        }
    }
}

/// Writes `prompt` and reads one line of input. End of input gives an empty string.
pub fn prompt_line<R: BufRead, W: Write>(prompt: &str, reader: &mut R, writer: &mut W) -> Result<String> {
    write!(writer, "{}", prompt)?;
    writer.flush()?;
    let mut line = String::new();
    reader.read_line(&mut line).context("Failed to read input")?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn get_typical_config_rule() -> ConfigRule {
        ConfigRule {
            starting_bankroll: 200,
            base_bet: 2,
            reshuffle_threshold: 20,
            player_stand_on: 16,
            dealer_stand_on: 17,
        }
    }

    #[test]
    fn can_convert_rule() {
        let config_rule = get_typical_config_rule();
        let converted_rule: Rule = config_rule.try_into().unwrap();
        assert_eq!(converted_rule.starting_bankroll, 200);
        assert_eq!(converted_rule.base_bet, 2);
        assert_eq!(converted_rule.reshuffle_threshold, 20);
        assert_eq!(converted_rule.player_stand_on, 16);
        assert_eq!(converted_rule.max_loss_streak, DEFAULT_MAX_LOSS_STREAK);
        assert_eq!(converted_rule.betting_strategy, BettingStrategyKind::Martingale);
    }

    #[test]
    fn should_return_error_when_converting_rule() {
        let mut config_rule = get_typical_config_rule();
        config_rule.base_bet = 0;
        let convert_result: Result<Rule, SimulationError> = config_rule.try_into();
        assert!(convert_result.is_err());
    }

    #[test]
    fn default_config_rule_matches_default_rule() {
        let converted_rule: Rule = ConfigRule::default().try_into().unwrap();
        assert_eq!(converted_rule, Rule::default());
    }

    #[test]
    fn parses_partial_yaml() {
        let config = parse_config(
            "rule:\n  starting_bankroll: 500\nstreakjack_simulator:\n  max_loss_streak: 7\n  betting_strategy: Flat\n  seed: 42\n",
        )
        .unwrap();
        assert_eq!(config.rule.starting_bankroll, 500);
        assert_eq!(config.rule.base_bet, 1);
        assert_eq!(
            config.streakjack_simulator.max_loss_streak_input().as_deref(),
            Some("7")
        );
        assert_eq!(
            config.streakjack_simulator.betting_strategy_input().as_deref(),
            Some("Flat")
        );
        assert_eq!(config.streakjack_simulator.seed, Some(42));
    }

    #[test]
    fn empty_yaml_is_default_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config.rule.starting_bankroll, 100);
        assert!(config.streakjack_simulator.max_loss_streak.is_none());
    }

    #[test]
    fn bad_loss_streak_in_config_falls_back_to_default() {
        for entry in ["five", "2.5", "-3", "[4]"] {
            let content = format!("streakjack_simulator:\n  max_loss_streak: {}\n", entry);
            let config = parse_config(&content).unwrap();
            let input = config.streakjack_simulator.max_loss_streak_input().unwrap();
            let (value, notice) = max_loss_streak_or_default(&input);
            assert_eq!(value, DEFAULT_MAX_LOSS_STREAK);
            assert_eq!(
                notice.as_deref(),
                Some("Invalid input. Defaulting to 5 consecutive losses.")
            );
        }
    }

    #[test]
    fn numeric_strategy_in_config_is_a_menu_choice() {
        let config = parse_config("streakjack_simulator:\n  betting_strategy: 2\n").unwrap();
        let input = config.streakjack_simulator.betting_strategy_input().unwrap();
        assert_eq!(strategy_or_default(&input), (BettingStrategyKind::Flat, None));
    }

    #[test]
    fn null_config_entries_are_absent() {
        let config = parse_config("streakjack_simulator:\n  max_loss_streak: ~\n").unwrap();
        assert!(config.streakjack_simulator.max_loss_streak_input().is_none());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(parse_config("rule: [1, 2").is_err());
        assert!(parse_config("rule:\n  base_bet: lots\n").is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(parse_config_from_file("/nonexistent/streakjack.yml").is_err());
    }

    #[test]
    fn max_loss_streak_parsing() {
        assert_eq!(parse_max_loss_streak("3").unwrap(), 3);
        assert_eq!(parse_max_loss_streak(" 10 \n").unwrap(), 10);
        assert!(parse_max_loss_streak("0").is_err());
        assert!(parse_max_loss_streak("-2").is_err());
        assert!(parse_max_loss_streak("five").is_err());
        assert!(parse_max_loss_streak("").is_err());
        assert!(parse_max_loss_streak("99999999999").is_err());
    }

    #[test]
    fn max_loss_streak_falls_back_to_default() {
        assert_eq!(max_loss_streak_or_default("4"), (4, None));
        let (value, notice) = max_loss_streak_or_default("abc");
        assert_eq!(value, 5);
        assert_eq!(
            notice.as_deref(),
            Some("Invalid input. Defaulting to 5 consecutive losses.")
        );
        assert_eq!(max_loss_streak_or_default("0").0, 5);
    }

    #[test]
    fn strategy_choice_parsing() {
        assert_eq!(
            parse_strategy_choice("1").unwrap(),
            BettingStrategyKind::Martingale
        );
        assert_eq!(parse_strategy_choice("2").unwrap(), BettingStrategyKind::Flat);
        assert_eq!(parse_strategy_choice("flat").unwrap(), BettingStrategyKind::Flat);
        assert_eq!(
            parse_strategy_choice("Martingale").unwrap(),
            BettingStrategyKind::Martingale
        );
        assert!(parse_strategy_choice("3").is_err());
        assert!(parse_strategy_choice("0").is_err());
        assert!(parse_strategy_choice("kelly").is_err());
    }

    #[test]
    fn strategy_falls_back_to_martingale() {
        assert_eq!(strategy_or_default("2"), (BettingStrategyKind::Flat, None));
        let (kind, notice) = strategy_or_default("9");
        assert_eq!(kind, BettingStrategyKind::Martingale);
        assert!(notice.is_some());
    }

    #[test]
    fn prompt_reads_one_trimmed_line() {
        let mut reader = Cursor::new("  7\nrest\n");
        let mut output: Vec<u8> = Vec::new();
        let line = prompt_line("Losses: ", &mut reader, &mut output).unwrap();
        assert_eq!(line, "7");
        assert_eq!(String::from_utf8(output).unwrap(), "Losses: ");
    }

    #[test]
    fn prompt_at_end_of_input_is_empty() {
        let mut reader = Cursor::new("");
        let mut output: Vec<u8> = Vec::new();
        assert_eq!(prompt_line("? ", &mut reader, &mut output).unwrap(), "");
    }
}
