//! Settlement currencies. Amounts are signed 64-bit minor units; the
//! storefront passes the chosen code (e.g. "IRR") and the exchange rate it
//! already resolved, this crate never fetches rates.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    IRR,
    USD,
    EUR,
    AED,
    TRY,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::IRR => "IRR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::AED => "AED",
            Currency::TRY => "TRY",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "IRR" => Some(Currency::IRR),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "AED" => Some(Currency::AED),
            "TRY" => Some(Currency::TRY),
            _ => None,
        }
    }

    /// Minor units per major unit. IRR has no subunit in practice.
    pub fn minor_per_major(&self) -> i64 {
        match self {
            Currency::IRR => 1,
            _ => 100,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format a minor-unit amount for human-readable descriptions,
/// e.g. `42,750,000 IRR`.
pub fn format_amount(amount: i64, currency: Currency) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if negative {
        format!("-{} {}", grouped, currency.as_str())
    } else {
        format!("{} {}", grouped, currency.as_str())
    }
}
