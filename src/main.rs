//! Forex Position-Size Calculator
//!
//! Computes a recommended trade size in lots and micro-lots from account
//! balance, risk tolerance, and stop-loss distance, and keeps a short
//! history of recent calculations.

mod calculator;
mod db;
mod display;
mod history;
mod models;
mod session;
mod theme;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::calculator::{parse_field, CalculatorConfig, Field, FormEvent};
use crate::db::Database;
use crate::models::{Instrument, RiskMode};
use crate::session::Session;
use crate::theme::Theme;

/// Forex position-size calculator CLI.
#[derive(Parser)]
#[command(name = "forex-calc")]
#[command(about = "Size forex positions from balance, risk, and stop-loss", long_about = None)]
struct Cli {
    /// Database file path
    #[arg(
        short,
        long,
        env = "FOREX_CALC_DATABASE",
        default_value = "sqlite:./forex-calc.db?mode=rwc"
    )]
    database: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FOREX_CALC_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Use the dark theme when no preference has been saved
    #[arg(long, env = "FOREX_CALC_PREFERS_DARK")]
    prefers_dark: bool,

    /// Number of calculations kept in history (1-10)
    #[arg(
        long,
        env = "FOREX_CALC_HISTORY_LIMIT",
        default_value_t = 10,
        value_parser = clap::value_parser!(u8).range(1..=10)
    )]
    history_limit: u8,

    /// Debounce window for storage writes in milliseconds
    #[arg(long, env = "FOREX_CALC_DEBOUNCE_MS", default_value_t = 300)]
    debounce_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported instruments
    Pairs,

    /// Calculate a position size and record it in history
    Calc {
        /// Instrument symbol (e.g. XAUUSD, EURUSD)
        #[arg(short, long)]
        pair: Option<Instrument>,

        /// Account balance
        #[arg(short, long)]
        balance: Option<String>,

        /// Risk mode (percent or usd)
        #[arg(short, long)]
        mode: Option<RiskMode>,

        /// Risk value: percent of balance or amount in USD
        #[arg(short, long)]
        risk: Option<String>,

        /// Stop-loss distance in pips
        #[arg(short, long)]
        stop_loss: Option<String>,
    },

    /// Show recent calculations
    History {
        /// Remove all saved calculations
        #[arg(long)]
        clear: bool,
    },

    /// Show or change the theme
    Theme {
        #[arg(value_enum)]
        action: Option<ThemeAction>,
    },

    /// Show current configuration
    Config,

    /// Start an interactive calculator session
    Interactive,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeAction {
    Toggle,
    Dark,
    Light,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = CalculatorConfig {
        history_limit: usize::from(cli.history_limit),
        persist_debounce_ms: cli.debounce_ms,
        ..Default::default()
    };

    if let Commands::Pairs = cli.command {
        print!("{}", display::pairs_table());
        return Ok(());
    }
    if let Commands::Config = cli.command {
        print_config(&cli, &config);
        return Ok(());
    }

    let db = Database::new(&cli.database).await?;
    let mut session = Session::open(&db, config, cli.prefers_dark).await;

    match cli.command {
        Commands::Calc {
            pair,
            balance,
            mode,
            risk,
            stop_loss,
        } => {
            if let Some(pair) = pair {
                session.apply(FormEvent::SelectPair(pair));
            }
            // Mode first: switching mode may substitute a default risk value.
            if let Some(mode) = mode {
                session.apply(FormEvent::SetRiskMode(mode));
            }
            let inputs = [
                (Field::Balance, balance),
                (Field::RiskValue, risk),
                (Field::StopLossPips, stop_loss),
            ];
            for (field, raw) in inputs {
                if let Some(raw) = raw {
                    session.apply(FormEvent::Input(field, parse_field(&raw)));
                }
            }

            let calculated = session.calculate();
            print!("{}", display::form_summary(session.form()));
            session.flush().await;

            if calculated.is_none() {
                bail!("calculation skipped: invalid input");
            }
        }

        Commands::History { clear } => {
            if clear {
                session.clear_history();
                session.flush().await;
                println!("History cleared.");
                return Ok(());
            }

            let history = session.history();
            println!(
                "\n=== Recent Calculations ({}/{}) ===",
                history.len(),
                history.limit()
            );
            print!("{}", display::history_table(history.entries()));
        }

        Commands::Theme { action } => {
            let theme = session.theme();
            match action {
                Some(ThemeAction::Toggle) => {
                    theme.toggle();
                }
                Some(ThemeAction::Dark) => theme.set(Theme::Dark),
                Some(ThemeAction::Light) => theme.set(Theme::Light),
                None => {}
            }
            info!(theme = %theme.current(), "Theme resolved");
            println!("Theme: {}", theme.current());
            session.flush().await;
        }

        Commands::Interactive => {
            println!("\n=== Forex Position-Size Calculator ===");
            println!("Theme: {}\n", session.theme().current());

            let mut theme_rx = session.theme().subscribe();
            tokio::spawn(async move {
                while theme_rx.changed().await.is_ok() {
                    let theme = *theme_rx.borrow_and_update();
                    info!(theme = %theme, "Applying theme");
                }
            });

            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let stdout = tokio::io::stdout();

            tokio::select! {
                res = session.run_interactive(stdin, stdout) => res?,
                _ = tokio::signal::ctrl_c() => {
                    println!("\n\nStopping...");
                }
            }
            session.flush().await;
        }

        Commands::Pairs | Commands::Config => {}
    }

    Ok(())
}

/// Print the effective configuration.
fn print_config(cli: &Cli, config: &CalculatorConfig) {
    println!("\n=== Storage ===\n");
    println!("  Database:             {}", cli.database);
    println!("  Write Debounce:       {}ms", config.persist_debounce_ms);
    println!("  History Limit:        {}", config.history_limit);
    println!("  Prefers Dark:         {}", cli.prefers_dark);

    println!("\n=== Form Defaults ===\n");
    println!("  Pair:                 {}", config.default_pair);
    println!("  Balance:              {}", config.default_balance);
    println!("  Risk Mode:            {}", config.default_risk_mode);
    println!("  Risk Value:           {}", config.default_risk_value);
    println!("  Stop-Loss:            {} pips", config.default_stop_loss_pips);

    println!("\n=== Steppers (step / floor) ===\n");
    let steppers = [
        ("Balance", config.balance_stepper),
        ("Risk (percent)", config.risk_percent_stepper),
        ("Risk (usd)", config.risk_usd_stepper),
        ("Stop-Loss", config.stop_loss_stepper),
    ];
    for (name, stepper) in steppers {
        println!("  {:<21} {} / {}", format!("{}:", name), stepper.step, stepper.min);
    }
}
