//! Calculator form state.
//!
//! Every user action is an explicit `FormEvent` applied to `FormState`; the
//! form revalidates and drops the stale result as each event requires.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use crate::models::{CalculationInput, CalculationResult, Instrument, RiskMode};

use super::validation::{validate_field, Field, FormErrors};
use super::{CalculatorConfig, PositionSizer, StepperConfig};

/// Stepper button direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

/// A user action on the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    SelectPair(Instrument),
    SetRiskMode(RiskMode),
    /// New field value; `None` when the input is empty or not a number
    Input(Field, Option<Decimal>),
    Step(Field, StepDirection),
}

/// Current values, errors, and result of the calculator form.
#[derive(Debug, Clone)]
pub struct FormState {
    config: CalculatorConfig,
    pair: Instrument,
    balance: Option<Decimal>,
    risk_mode: RiskMode,
    risk_value: Option<Decimal>,
    stop_loss_pips: Option<Decimal>,
    errors: FormErrors,
    result: Option<CalculationResult>,
}

impl FormState {
    /// Create a form populated with the configured defaults.
    pub fn new(config: CalculatorConfig) -> Self {
        Self {
            pair: config.default_pair,
            balance: Some(config.default_balance),
            risk_mode: config.default_risk_mode,
            risk_value: Some(config.default_risk_value),
            stop_loss_pips: Some(config.default_stop_loss_pips),
            errors: FormErrors::default(),
            result: None,
            config,
        }
    }

    pub fn pair(&self) -> Instrument {
        self.pair
    }

    pub fn risk_mode(&self) -> RiskMode {
        self.risk_mode
    }

    pub fn value(&self, field: Field) -> Option<Decimal> {
        match field {
            Field::Balance => self.balance,
            Field::RiskValue => self.risk_value,
            Field::StopLossPips => self.stop_loss_pips,
        }
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn result(&self) -> Option<&CalculationResult> {
        self.result.as_ref()
    }

    /// Apply one user action.
    pub fn apply(&mut self, event: FormEvent) {
        debug!(event = ?event, "Applying form event");

        match event {
            FormEvent::SelectPair(pair) => {
                self.pair = pair;
                self.result = None;
            }
            FormEvent::SetRiskMode(mode) => {
                self.risk_mode = mode;
                match mode {
                    RiskMode::Percent
                        if self.risk_value.map_or(true, |v| v > Decimal::ONE_HUNDRED) =>
                    {
                        self.risk_value = Some(self.config.percent_mode_fallback);
                    }
                    RiskMode::Usd if self.risk_value.is_none() => {
                        self.risk_value = Some(self.config.usd_mode_fallback);
                    }
                    _ => {}
                }
                self.result = None;
                self.validate();
            }
            FormEvent::Input(field, value) => {
                self.set_value(field, value);
                self.result = None;
                self.validate();
            }
            FormEvent::Step(field, direction) => {
                let stepper = self.stepper(field);
                let current = self.value(field).unwrap_or(Decimal::ZERO);
                self.set_value(field, Some(step_value(current, stepper, direction)));
                self.result = None;
                self.validate();
            }
        }
    }

    /// Stepper settings for a field; the risk stepper follows the risk mode.
    pub fn stepper(&self, field: Field) -> StepperConfig {
        match field {
            Field::Balance => self.config.balance_stepper,
            Field::RiskValue => match self.risk_mode {
                RiskMode::Percent => self.config.risk_percent_stepper,
                RiskMode::Usd => self.config.risk_usd_stepper,
            },
            Field::StopLossPips => self.config.stop_loss_stepper,
        }
    }

    /// Refresh the error for every field.
    pub fn validate(&mut self) {
        for field in Field::ALL {
            let error = validate_field(field, self.value(field)).err();
            self.errors.set(field, error);
        }
    }

    /// All values present and positive, and no outstanding error.
    pub fn is_valid(&self) -> bool {
        Field::ALL
            .iter()
            .all(|f| self.value(*f).is_some_and(|v| v > Decimal::ZERO))
            && self.errors.is_empty()
    }

    /// Validated inputs, or `None` while the form is invalid.
    pub fn input(&self) -> Option<CalculationInput> {
        if !self.is_valid() {
            return None;
        }
        Some(CalculationInput::new(
            self.pair,
            self.balance?,
            self.risk_mode,
            self.risk_value?,
            self.stop_loss_pips?,
        ))
    }

    /// Validate and, when valid, compute and store a new result.
    ///
    /// An invalid form leaves the previous result untouched.
    pub fn calculate(&mut self) -> Option<(CalculationInput, CalculationResult)> {
        self.validate();
        let input = self.input()?;

        match PositionSizer::calculate(&input) {
            Ok(result) => {
                self.result = Some(result);
                Some((input, result))
            }
            Err(e) => {
                warn!(error = %e, pair = %input.symbol, "Position size calculation failed");
                None
            }
        }
    }

    fn set_value(&mut self, field: Field, value: Option<Decimal>) {
        match field {
            Field::Balance => self.balance = value,
            Field::RiskValue => self.risk_value = value,
            Field::StopLossPips => self.stop_loss_pips = value,
        }
    }
}

/// Move a value one step, clamped to the stepper floor.
///
/// Fractional steps round the result to the step's own precision.
pub fn step_value(current: Decimal, stepper: StepperConfig, direction: StepDirection) -> Decimal {
    let moved = match direction {
        StepDirection::Up => current.saturating_add(stepper.step),
        StepDirection::Down => current.saturating_sub(stepper.step),
    };
    let clamped = moved.max(stepper.min);

    let places = stepper.step.normalize().scale();
    if places > 0 {
        clamped.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
    } else {
        clamped
    }
}
