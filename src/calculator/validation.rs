//! Field-level validation for the calculator form.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

/// Numeric input fields on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Balance,
    RiskValue,
    StopLossPips,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Balance, Field::RiskValue, Field::StopLossPips];

    /// Label used at the start of error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Field::Balance => "Account balance",
            Field::RiskValue => "Risk value",
            Field::StopLossPips => "Stop-loss",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Balance => "balance",
            Field::RiskValue => "risk",
            Field::StopLossPips => "sl",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field: {0} (expected balance, risk or sl)")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "balance" | "bal" => Ok(Field::Balance),
            "risk" | "risk_value" | "riskvalue" => Ok(Field::RiskValue),
            "sl" | "stop" | "stop_loss" | "stoploss" | "stop-loss" => Ok(Field::StopLossPips),
            _ => Err(UnknownField(s.to_string())),
        }
    }
}

/// Why a field value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{} is required.", .0.label())]
    Required(Field),

    #[error("{} must be a positive number.", .0.label())]
    NotPositive(Field),
}

/// Check a single field value.
pub fn validate_field(field: Field, value: Option<Decimal>) -> Result<Decimal, ValidationError> {
    match value {
        None => Err(ValidationError::Required(field)),
        Some(v) if v <= Decimal::ZERO => Err(ValidationError::NotPositive(field)),
        Some(v) => Ok(v),
    }
}

/// Parse raw field text; anything that is not a decimal counts as absent.
pub fn parse_field(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Current error message per field; `None` means the field is clean.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub balance: Option<ValidationError>,
    pub risk_value: Option<ValidationError>,
    pub stop_loss_pips: Option<ValidationError>,
}

impl FormErrors {
    pub fn get(&self, field: Field) -> Option<ValidationError> {
        match field {
            Field::Balance => self.balance,
            Field::RiskValue => self.risk_value,
            Field::StopLossPips => self.stop_loss_pips,
        }
    }

    pub fn set(&mut self, field: Field, error: Option<ValidationError>) {
        match field {
            Field::Balance => self.balance = error,
            Field::RiskValue => self.risk_value = error,
            Field::StopLossPips => self.stop_loss_pips = error,
        }
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// Errors in field order.
    pub fn iter(&self) -> impl Iterator<Item = ValidationError> + '_ {
        Field::ALL.iter().filter_map(|f| self.get(*f))
    }
}
