//! Plain-text rendering of instruments, form state, and history.

use std::fmt::Write;

use chrono::{Local, TimeZone};

use crate::calculator::{Field, FormState};
use crate::models::{HistoryEntry, Instrument};

/// Table of supported instruments.
pub fn pairs_table() -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n{:<8} {:>14} {:>12} {:>8}",
        "SYMBOL", "CONTRACT SIZE", "PIP VALUE", "SPREAD"
    );
    let _ = writeln!(out, "{}", "-".repeat(45));
    for inst in Instrument::ALL {
        let info = inst.info();
        let _ = writeln!(
            out,
            "{:<8} {:>14} {:>11.2}$ {:>8}",
            inst.as_str(),
            info.contract_size,
            info.pip_value_per_lot,
            info.default_spread
        );
    }
    out
}

/// Current form values, errors, and result.
pub fn form_summary(form: &FormState) -> String {
    let mut out = String::new();
    let value = |field: Field| {
        form.value(field)
            .map(|v| v.normalize().to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    let _ = writeln!(out, "\n=== Position Size Calculator ===");
    let _ = writeln!(out, "Pair:         {}", form.pair());
    let _ = writeln!(out, "Balance:      {}", value(Field::Balance));
    let _ = writeln!(out, "Risk Mode:    {}", form.risk_mode());
    let _ = writeln!(out, "Risk Value:   {}", value(Field::RiskValue));
    let _ = writeln!(out, "Stop-Loss:    {} pips", value(Field::StopLossPips));

    for error in form.errors().iter() {
        let _ = writeln!(out, "  ! {}", error);
    }

    match form.result() {
        Some(result) => {
            let _ = writeln!(out, "\n--- Result ---\n{}", result);
        }
        None => {
            let _ = writeln!(out, "\n(no result; run 'calc')");
        }
    }
    out
}

/// History list, newest first.
pub fn history_table(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No calculations yet.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n{:<19} {:<8} {:>12} {:>8} {:>6} {:>10} {:>9} {:>6}",
        "TIME", "PAIR", "BALANCE", "RISK", "SL", "RISK $", "LOTS", "MICRO"
    );
    let _ = writeln!(out, "{}", "-".repeat(86));
    for entry in entries {
        let time = Local
            .timestamp_millis_opt(entry.timestamp)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| entry.timestamp.to_string());
        let _ = writeln!(
            out,
            "{:<19} {:<8} {:>12.2} {:>8} {:>6} {:>10.2} {:>9.4} {:>6}",
            time,
            entry.symbol.as_str(),
            entry.balance,
            entry.risk_label(),
            entry.stop_loss_pips.normalize(),
            entry.result.risk_usd,
            entry.result.lots,
            entry.result.micro_lots
        );
    }
    out
}
