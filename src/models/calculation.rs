//! Calculation inputs and results.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Instrument, InstrumentInfo};

/// How the risk value is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskMode {
    /// Percentage of account balance
    #[default]
    Percent,
    /// Absolute amount in account currency
    Usd,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown risk mode: {0} (expected percent or usd)")]
pub struct UnknownRiskMode(pub String);

impl RiskMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskMode::Percent => "percent",
            RiskMode::Usd => "usd",
        }
    }
}

impl fmt::Display for RiskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskMode {
    type Err = UnknownRiskMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percent" | "pct" | "%" => Ok(RiskMode::Percent),
            "usd" | "$" => Ok(RiskMode::Usd),
            _ => Err(UnknownRiskMode(s.to_string())),
        }
    }
}

/// A fully validated set of inputs for one position-size calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationInput {
    /// Selected instrument symbol
    pub symbol: Instrument,

    /// Contract constants used for the calculation
    pub instrument: InstrumentInfo,

    /// Account balance in account currency
    pub balance: Decimal,

    pub risk_mode: RiskMode,

    /// Percent of balance or absolute amount, depending on `risk_mode`
    pub risk_value: Decimal,

    /// Stop-loss distance in pips
    pub stop_loss_pips: Decimal,
}

impl CalculationInput {
    /// Build an input for a symbol using its table constants.
    pub fn new(
        symbol: Instrument,
        balance: Decimal,
        risk_mode: RiskMode,
        risk_value: Decimal,
        stop_loss_pips: Decimal,
    ) -> Self {
        Self {
            symbol,
            instrument: symbol.info(),
            balance,
            risk_mode,
            risk_value,
            stop_loss_pips,
        }
    }
}

/// Recommended trade size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    /// Standard lots, rounded to 4 decimal places
    pub lots: Decimal,

    /// floor(lots * 100)
    pub micro_lots: u64,

    /// Amount of account currency at risk if the stop is hit
    pub risk_usd: Decimal,
}

impl fmt::Display for CalculationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Risk Amount:  ${:.2}", self.risk_usd)?;
        writeln!(f, "Lot Size:     {:.4} lots", self.lots)?;
        write!(f, "Micro Lots:   {}", self.micro_lots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_risk_mode_parse() {
        assert_eq!("Percent".parse::<RiskMode>(), Ok(RiskMode::Percent));
        assert_eq!("usd".parse::<RiskMode>(), Ok(RiskMode::Usd));
        assert!("lots".parse::<RiskMode>().is_err());
    }

    #[test]
    fn test_input_takes_table_constants() {
        let input = CalculationInput::new(
            Instrument::EurUsd,
            dec!(5000),
            RiskMode::Usd,
            dec!(50),
            dec!(10),
        );
        assert_eq!(input.instrument, Instrument::EurUsd.info());
    }
}
