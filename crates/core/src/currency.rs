//! Currency Converter
//!
//! Static exchange rates and unit alias normalization for the currency
//! skill. Rates are fixed at build time; there is no live rate lookup.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::error::SkillError;

/// Multiplicative factors keyed by (from, to) currency code
const RATES: &[(&str, &str, f64)] = &[
    ("USD", "RUB", 95.0),
    ("USD", "EUR", 0.85),
    ("USD", "CNY", 6.5),
    ("EUR", "RUB", 112.0),
    ("EUR", "USD", 1.18),
    ("EUR", "CNY", 7.65),
    ("RUB", "USD", 0.0105),
    ("RUB", "EUR", 0.0089),
    ("RUB", "CNY", 0.068),
    ("CNY", "USD", 0.154),
    ("CNY", "EUR", 0.131),
    ("CNY", "RUB", 14.7),
];

static BUILTIN: LazyLock<RateTable> = LazyLock::new(|| RateTable::from_entries(RATES));

/// Read-only table of conversion factors
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: HashMap<(String, String), f64>,
}

impl RateTable {
    /// The process-wide built-in table
    pub fn builtin() -> &'static RateTable {
        &BUILTIN
    }

    pub fn from_entries(entries: &[(&str, &str, f64)]) -> Self {
        let rates = entries
            .iter()
            .map(|(from, to, rate)| ((from.to_string(), to.to_string()), *rate))
            .collect();
        Self { rates }
    }

    /// Factor for an exact (from, to) code pair
    pub fn rate(&self, from: &str, to: &str) -> Option<f64> {
        self.rates.get(&(from.to_string(), to.to_string())).copied()
    }

    /// Convert `amount` from one code to another, rounded to two decimals
    ///
    /// Identical codes convert to the amount itself, even for codes the
    /// table does not know.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, SkillError> {
        if from == to {
            return Ok(amount);
        }

        let rate = self
            .rate(from, to)
            .ok_or_else(|| SkillError::UnsupportedConversion {
                from: from.to_string(),
                to: to.to_string(),
            })?;

        Ok(round_cents(amount * rate))
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Map a recognised unit alias to its currency code
///
/// Only rouble and dollar aliases are normalized; every other alias is
/// returned unchanged.
pub fn normalize_unit(alias: &str) -> String {
    match alias {
        "руб" | "рублей" | "rub" => "RUB".to_string(),
        "доллар" | "долларов" | "usd" => "USD".to_string(),
        other => other.to_string(),
    }
}
