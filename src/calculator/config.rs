//! Calculator configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::models::{Instrument, RiskMode};

/// Increment and floor for one stepper control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepperConfig {
    /// Amount added or removed per click
    pub step: Decimal,

    /// Value the stepper never goes below
    pub min: Decimal,
}

impl StepperConfig {
    pub const fn new(step: Decimal, min: Decimal) -> Self {
        Self { step, min }
    }
}

/// Configuration for the calculator form and its history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Instrument selected when the form opens
    pub default_pair: Instrument,

    /// Initial account balance
    pub default_balance: Decimal,

    /// Initial risk mode
    pub default_risk_mode: RiskMode,

    /// Initial risk value (interpreted per `default_risk_mode`)
    pub default_risk_value: Decimal,

    /// Initial stop-loss distance in pips
    pub default_stop_loss_pips: Decimal,

    /// Risk value set when switching to percent mode with an unusable value
    pub percent_mode_fallback: Decimal,

    /// Risk value set when switching to usd mode with no value
    pub usd_mode_fallback: Decimal,

    pub balance_stepper: StepperConfig,
    pub risk_percent_stepper: StepperConfig,
    pub risk_usd_stepper: StepperConfig,
    pub stop_loss_stepper: StepperConfig,

    /// Maximum number of history entries kept
    pub history_limit: usize,

    /// Debounce window for persistence writes, in milliseconds
    pub persist_debounce_ms: u64,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            default_pair: Instrument::XauUsd,
            default_balance: dec!(10000),
            default_risk_mode: RiskMode::Percent,
            default_risk_value: dec!(1),
            default_stop_loss_pips: dec!(20),
            percent_mode_fallback: dec!(1),  // 1% of balance
            usd_mode_fallback: dec!(100),    // $100 at risk
            balance_stepper: StepperConfig::new(dec!(100), dec!(100)),  // $100 steps, $100 floor
            risk_percent_stepper: StepperConfig::new(dec!(0.1), dec!(0.1)), // 0.1% steps and floor
            risk_usd_stepper: StepperConfig::new(dec!(10), dec!(1)),  // $10 steps, $1 floor
            stop_loss_stepper: StepperConfig::new(dec!(1), dec!(1)),  // 1 pip steps and floor
            history_limit: 10,               // Hard cap, see MAX_HISTORY
            persist_debounce_ms: 300,        // Trailing-edge write delay
        }
    }
}
