//! Calculator logic: validation, position sizing, form state.

mod config;
mod form;
mod position_sizer;
mod validation;

pub use config::{CalculatorConfig, StepperConfig};
pub use form::{FormEvent, FormState, StepDirection};
pub use position_sizer::PositionSizer;
pub use validation::{parse_field, Field, UnknownField};
