//! Position sizing: dollar risk to lots and micro-lots.
//!
//! lots = risk / (pip value per lot * stop-loss pips)

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use thiserror::Error;

use crate::models::{CalculationInput, CalculationResult, RiskMode};

/// Decimal places kept on the lot size.
pub const LOT_DECIMALS: u32 = 4;

/// Arithmetic failure while sizing a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CalculationError {
    #[error("{0} is outside the representable decimal range")]
    Overflow(&'static str),
}

/// Calculator for recommended position sizes.
pub struct PositionSizer;

impl PositionSizer {
    /// Amount of account currency put at risk by the input.
    pub fn risk_amount(input: &CalculationInput) -> Result<Decimal, CalculationError> {
        match input.risk_mode {
            RiskMode::Percent => input
                .balance
                .checked_mul(input.risk_value)
                .and_then(|scaled| scaled.checked_div(dec!(100)))
                .ok_or(CalculationError::Overflow("risk amount")),
            RiskMode::Usd => Ok(input.risk_value),
        }
    }

    /// Calculate the recommended trade size.
    ///
    /// A non-positive pip value or stop-loss yields a zero-sized result that
    /// still reports the dollar risk.
    pub fn calculate(input: &CalculationInput) -> Result<CalculationResult, CalculationError> {
        let risk_usd = Self::risk_amount(input)?;

        let pip_value = input.instrument.pip_value_per_lot;
        if pip_value <= Decimal::ZERO || input.stop_loss_pips <= Decimal::ZERO {
            return Ok(CalculationResult {
                lots: Decimal::ZERO,
                micro_lots: 0,
                risk_usd,
            });
        }

        let lots = pip_value
            .checked_mul(input.stop_loss_pips)
            .and_then(|risk_per_lot| risk_usd.checked_div(risk_per_lot))
            .ok_or(CalculationError::Overflow("lot size"))?;
        let lots = round_lots(lots);

        let micro_lots = lots
            .checked_mul(dec!(100))
            .map(|micro| micro.floor())
            .and_then(|micro| micro.to_u64())
            .ok_or(CalculationError::Overflow("micro-lot count"))?;

        Ok(CalculationResult {
            lots,
            micro_lots,
            risk_usd,
        })
    }
}

/// Round to `LOT_DECIMALS` places, midpoints away from zero.
pub fn round_lots(lots: Decimal) -> Decimal {
    lots.round_dp_with_strategy(LOT_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}
