//! Data models for instruments, calculations, and history entries.

mod calculation;
mod history;
mod instrument;

pub use calculation::{CalculationInput, CalculationResult, RiskMode, UnknownRiskMode};
pub use history::HistoryEntry;
pub use instrument::{Instrument, InstrumentInfo, UnknownInstrument};
