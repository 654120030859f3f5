//! Calculator session: form, history, and theme for one user.
//!
//! Also drives the line-oriented interactive mode, where each input line is
//! translated into the same form events the one-shot commands use.

use std::time::Duration;

use anyhow::Result;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::calculator::{
    parse_field, CalculatorConfig, Field, FormEvent, FormState, StepDirection, UnknownField,
};
use crate::db::Database;
use crate::display;
use crate::history::HistoryStore;
use crate::models::{CalculationResult, HistoryEntry, UnknownInstrument, UnknownRiskMode};
use crate::theme::ThemeState;

const HELP: &str = "\
Commands:
  pair <SYMBOL>          select instrument (e.g. EURUSD)
  mode <percent|usd>     set risk mode
  balance <value>        set account balance
  risk <value>           set risk value
  sl <value>             set stop-loss in pips
  up|down <field>        step balance, risk, or sl
  calc                   calculate position size
  show                   show form and result
  history                list recent calculations
  clear                  clear history
  theme                  toggle light/dark theme
  pairs                  list instruments
  help                   show this help
  quit                   leave
";

/// One interactive command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Event(FormEvent),
    Calculate,
    Show,
    History,
    ClearHistory,
    ToggleTheme,
    Pairs,
    Help,
    Quit,
}

/// Why an interactive line could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command: {0} (try 'help')")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error(transparent)]
    Instrument(#[from] UnknownInstrument),

    #[error(transparent)]
    RiskMode(#[from] UnknownRiskMode),

    #[error(transparent)]
    Field(#[from] UnknownField),
}

impl Command {
    /// Parse one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return Ok(None);
        };
        let arg = parts.next();

        let command = match name.to_lowercase().as_str() {
            "pair" => {
                let symbol = arg.ok_or(CommandError::MissingArgument("pair"))?;
                Command::Event(FormEvent::SelectPair(symbol.parse()?))
            }
            "mode" => {
                let mode = arg.ok_or(CommandError::MissingArgument("mode"))?;
                Command::Event(FormEvent::SetRiskMode(mode.parse()?))
            }
            "balance" | "risk" | "sl" => {
                let field: Field = name.parse()?;
                Command::Event(FormEvent::Input(field, arg.and_then(parse_field)))
            }
            "up" | "down" => {
                let field = arg.ok_or(CommandError::MissingArgument("up/down"))?;
                let direction = if name.eq_ignore_ascii_case("up") {
                    StepDirection::Up
                } else {
                    StepDirection::Down
                };
                Command::Event(FormEvent::Step(field.parse()?, direction))
            }
            "calc" | "calculate" => Command::Calculate,
            "show" => Command::Show,
            "history" => Command::History,
            "clear" => Command::ClearHistory,
            "theme" => Command::ToggleTheme,
            "pairs" => Command::Pairs,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(Some(command))
    }
}

/// State owned by one calculator session.
#[derive(Debug)]
pub struct Session {
    form: FormState,
    history: HistoryStore,
    theme: ThemeState,
}

impl Session {
    /// Build the form and load persisted history and theme.
    pub async fn open(db: &Database, config: CalculatorConfig, prefers_dark: bool) -> Self {
        let debounce = Duration::from_millis(config.persist_debounce_ms);
        let history = HistoryStore::load(db, config.history_limit, debounce).await;
        let theme = ThemeState::init(db, prefers_dark, debounce).await;

        Self {
            form: FormState::new(config),
            history,
            theme,
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn theme(&self) -> &ThemeState {
        &self.theme
    }

    pub fn apply(&mut self, event: FormEvent) {
        self.form.apply(event);
    }

    /// Calculate and record the result in history. No-op on an invalid form.
    pub fn calculate(&mut self) -> Option<CalculationResult> {
        let (input, result) = self.form.calculate()?;
        info!(
            pair = %input.symbol,
            lots = %result.lots,
            risk_usd = %result.risk_usd,
            "Position size calculated"
        );
        self.history.record(HistoryEntry::new(&input, result));
        Some(result)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Push pending writes to storage. Failures are logged, not returned.
    pub async fn flush(&self) {
        if let Err(e) = self.history.flush().await {
            warn!(error = %e, "Failed to flush history");
        }
        if let Err(e) = self.theme.flush().await {
            warn!(error = %e, "Failed to flush theme");
        }
    }

    /// Run the interactive loop until `quit` or end of input.
    pub async fn run_interactive<R, W>(&mut self, input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        output.write_all(HELP.as_bytes()).await?;
        output
            .write_all(display::form_summary(&self.form).as_bytes())
            .await?;

        loop {
            output.write_all(b"> ").await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    output.write_all(format!("{}\n", e).as_bytes()).await?;
                    continue;
                }
            };

            if command == Command::Quit {
                break;
            }
            let text = self.execute(command);
            output.write_all(text.as_bytes()).await?;
        }

        self.flush().await;
        Ok(())
    }

    /// Apply a command and return the text to show.
    fn execute(&mut self, command: Command) -> String {
        match command {
            Command::Event(event) => {
                self.apply(event);
                display::form_summary(&self.form)
            }
            Command::Calculate => {
                self.calculate();
                display::form_summary(&self.form)
            }
            Command::Show => display::form_summary(&self.form),
            Command::History => display::history_table(self.history.entries()),
            Command::ClearHistory => {
                self.clear_history();
                "History cleared.\n".to_string()
            }
            Command::ToggleTheme => format!("Theme: {}\n", self.theme.toggle()),
            Command::Pairs => display::pairs_table(),
            Command::Help => HELP.to_string(),
            Command::Quit => String::new(),
        }
    }
}
