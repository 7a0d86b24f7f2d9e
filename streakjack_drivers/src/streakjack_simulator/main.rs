mod simulation;

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufRead, Write};
use streakjack::{BettingStrategyKind, Rule, DEFAULT_MAX_LOSS_STREAK};
use streakjack_drivers::{
    default_config_path, max_loss_streak_or_default, parse_config_from_file, prompt_line,
    strategy_or_default, Config, ConfigStreakjackSimulator, DEFAULT_BETTING_STRATEGY,
};
use tracing::{debug, info};

const DEFAULT_CONFIG_PATH: &str = "~/.streakjack.yml";

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    /// Stop after this many consecutive losses
    #[arg(short, long)]
    max_loss_streak: Option<String>,

    /// Betting strategy: 1 = Martingale, 2 = Flat
    #[arg(short, long)]
    strategy: Option<String>,

    /// Seed the shuffles for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Only print the rules and the final report
    #[arg(short, long)]
    quiet: bool,

    /// Use the defaults instead of asking for missing values
    #[arg(long)]
    no_prompt: bool,
}

fn main() -> Result<()> {
    init_logging();

    let args = CommandLineArgs::parse();
    let config = load_config(&args.config)?;
    let rule: Rule = config.rule.clone().try_into()?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let rule = Rule {
        max_loss_streak: resolve_max_loss_streak(
            &args,
            &config.streakjack_simulator,
            &mut input,
            &mut output,
        )?,
        betting_strategy: resolve_betting_strategy(
            &args,
            &config.streakjack_simulator,
            &mut input,
            &mut output,
        )?,
        ..rule
    };

    let rng = match args.seed.or(config.streakjack_simulator.seed) {
        Some(seed) => {
            info!(seed, "using seeded shuffles");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    simulation::simulate_until_stopped(&rule, rng, args.quiet)?;
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

/// A missing file at the default location is not an error, an explicit path must exist.
fn load_config(path: &str) -> Result<Config> {
    if path != DEFAULT_CONFIG_PATH {
        return parse_config_from_file(path);
    }
    match default_config_path() {
        Some(config_file_path) if config_file_path.is_file() => {
            parse_config_from_file(&config_file_path)
        }
        _ => {
            debug!("no config file at {}, using defaults", DEFAULT_CONFIG_PATH);
            Ok(Config::default())
        }
    }
}

/// Command line first, then the config file, then the prompt.
fn resolve_max_loss_streak<R: BufRead, W: Write>(
    args: &CommandLineArgs,
    config: &ConfigStreakjackSimulator,
    input: &mut R,
    output: &mut W,
) -> Result<u32> {
    let supplied = args
        .max_loss_streak
        .clone()
        .or_else(|| config.max_loss_streak_input());
    let raw = match supplied {
        Some(raw) => raw,
        None if args.no_prompt => return Ok(DEFAULT_MAX_LOSS_STREAK),
        None => prompt_line(
            "Enter the number of consecutive losses to stop on: ",
            input,
            output,
        )?,
    };

    let (max_loss_streak, notice) = max_loss_streak_or_default(&raw);
    if let Some(notice) = notice {
        writeln!(output, "{}\n", notice)?;
    }
    Ok(max_loss_streak)
}

fn resolve_betting_strategy<R: BufRead, W: Write>(
    args: &CommandLineArgs,
    config: &ConfigStreakjackSimulator,
    input: &mut R,
    output: &mut W,
) -> Result<BettingStrategyKind> {
    let supplied = args
        .strategy
        .clone()
        .or_else(|| config.betting_strategy_input());
    let raw = match supplied {
        Some(raw) => raw,
        None if args.no_prompt => return Ok(DEFAULT_BETTING_STRATEGY),
        None => prompt_line(
            "Choose a betting strategy (1 = Martingale, 2 = Flat): ",
            input,
            output,
        )?,
    };

    let (betting_strategy, notice) = strategy_or_default(&raw);
    if let Some(notice) = notice {
        writeln!(output, "{}\n", notice)?;
    }
    Ok(betting_strategy)
}
