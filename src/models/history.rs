//! History entry: a snapshot of one successful calculation.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CalculationInput, CalculationResult, Instrument, RiskMode};

/// One past calculation, as stored in the history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Unique, time-ordered identifier
    pub id: String,

    /// When the calculation ran (epoch millis)
    pub timestamp: i64,

    pub symbol: Instrument,
    pub balance: Decimal,
    pub risk_mode: RiskMode,
    pub risk_value: Decimal,
    pub stop_loss_pips: Decimal,

    pub result: CalculationResult,
}

impl HistoryEntry {
    /// Snapshot an input and its result, stamped with the current time.
    pub fn new(input: &CalculationInput, result: CalculationResult) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            symbol: input.symbol,
            balance: input.balance,
            risk_mode: input.risk_mode,
            risk_value: input.risk_value,
            stop_loss_pips: input.stop_loss_pips,
            result,
        }
    }

    /// Human-readable risk, e.g. "1%" or "$50".
    pub fn risk_label(&self) -> String {
        match self.risk_mode {
            RiskMode::Percent => format!("{}%", self.risk_value.normalize()),
            RiskMode::Usd => format!("${}", self.risk_value.normalize()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_input() -> CalculationInput {
        CalculationInput::new(
            Instrument::XauUsd,
            dec!(10000),
            RiskMode::Percent,
            dec!(1),
            dec!(20),
        )
    }

    fn sample_result() -> CalculationResult {
        CalculationResult {
            lots: dec!(0.5),
            micro_lots: 50,
            risk_usd: dec!(100),
        }
    }

    #[test]
    fn test_entry_ids_are_unique() {
        let a = HistoryEntry::new(&sample_input(), sample_result());
        let b = HistoryEntry::new(&sample_input(), sample_result());
        assert_ne!(a.id, b.id);
        assert!(b.timestamp >= a.timestamp);
    }

    #[test]
    fn test_json_field_names() {
        let entry = HistoryEntry::new(&sample_input(), sample_result());
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["symbol"], "XAUUSD");
        assert_eq!(value["riskMode"], "percent");
        assert_eq!(value["stopLossPips"], "20");
        assert_eq!(value["result"]["microLots"], 50);
        assert_eq!(value["result"]["riskUsd"], "100");
    }

    #[test]
    fn test_risk_label() {
        let mut entry = HistoryEntry::new(&sample_input(), sample_result());
        assert_eq!(entry.risk_label(), "1%");

        entry.risk_mode = RiskMode::Usd;
        entry.risk_value = dec!(50.00);
        assert_eq!(entry.risk_label(), "$50");
    }
}
