//! Instrument model: the supported currency pairs and their contract constants.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Contract constants for a tradable instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentInfo {
    /// Units of base currency in one standard lot
    pub contract_size: u64,

    /// Account-currency value of a one pip move on one lot
    pub pip_value_per_lot: Decimal,

    /// Typical spread in pips
    pub default_spread: Decimal,
}

/// Supported instrument symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Instrument {
    #[default]
    XauUsd,
    EurUsd,
    GbpUsd,
    UsdJpy,
    UsdChf,
    AudUsd,
    UsdCad,
    NzdUsd,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown instrument symbol: {0}")]
pub struct UnknownInstrument(pub String);

impl Instrument {
    /// Every supported instrument, in display order.
    pub const ALL: [Instrument; 8] = [
        Instrument::XauUsd,
        Instrument::EurUsd,
        Instrument::GbpUsd,
        Instrument::UsdJpy,
        Instrument::UsdChf,
        Instrument::AudUsd,
        Instrument::UsdCad,
        Instrument::NzdUsd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Instrument::XauUsd => "XAUUSD",
            Instrument::EurUsd => "EURUSD",
            Instrument::GbpUsd => "GBPUSD",
            Instrument::UsdJpy => "USDJPY",
            Instrument::UsdChf => "USDCHF",
            Instrument::AudUsd => "AUDUSD",
            Instrument::UsdCad => "USDCAD",
            Instrument::NzdUsd => "NZDUSD",
        }
    }

    /// Static contract constants for this instrument.
    pub fn info(&self) -> InstrumentInfo {
        match self {
            Instrument::XauUsd => InstrumentInfo {
                contract_size: 100,
                pip_value_per_lot: dec!(10.0),
                default_spread: dec!(18),
            },
            Instrument::EurUsd => fx_major(dec!(1)),
            Instrument::GbpUsd
            | Instrument::UsdJpy
            | Instrument::UsdChf
            | Instrument::AudUsd
            | Instrument::UsdCad
            | Instrument::NzdUsd => fx_major(dec!(2)),
        }
    }
}

fn fx_major(default_spread: Decimal) -> InstrumentInfo {
    InstrumentInfo {
        contract_size: 100_000,
        pip_value_per_lot: dec!(10.0),
        default_spread,
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Instrument {
    type Err = UnknownInstrument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Instrument::ALL
            .into_iter()
            .find(|i| i.as_str() == wanted)
            .ok_or_else(|| UnknownInstrument(s.to_string()))
    }
}
