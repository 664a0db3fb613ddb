//! Currency conversion and formatting
//!
//! All amounts in the portal are stored in USD. The selected display currency
//! only changes how amounts are converted and rendered, never the stored
//! values.
//!
//! # Example
//!
//! ```rust
//! use app_core::currency::{CurrencyCode, CurrencyState};
//!
//! let mut currency = CurrencyState::default();
//! assert_eq!(currency.format_amount(450.0), "Rs 1,25,325");
//!
//! currency.set_currency(CurrencyCode::Usd);
//! assert_eq!(currency.format_amount(450.0), "$450.00");
//! assert_eq!(currency.format_amount_short(1250.0), "$1.3K");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while selecting a currency
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    /// The code is not in the rate table
    #[error("Unknown currency code: {0}")]
    UnknownCode(String),
}

/// Supported display currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    /// Pakistani Rupee
    #[default]
    Pkr,
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// British Pound
    Gbp,
    /// UAE Dirham
    Aed,
    /// Saudi Riyal
    Sar,
    /// Indian Rupee
    Inr,
}

impl CurrencyCode {
    /// Every supported code, in display order
    pub const ALL: [CurrencyCode; 7] = [
        CurrencyCode::Pkr,
        CurrencyCode::Usd,
        CurrencyCode::Eur,
        CurrencyCode::Gbp,
        CurrencyCode::Aed,
        CurrencyCode::Sar,
        CurrencyCode::Inr,
    ];

    /// ISO 4217 code
    pub fn as_str(&self) -> &'static str {
        self.currency().code
    }

    /// Rate table entry for this code
    pub fn currency(&self) -> &'static Currency {
        match self {
            CurrencyCode::Pkr => &CURRENCIES[0],
            CurrencyCode::Usd => &CURRENCIES[1],
            CurrencyCode::Eur => &CURRENCIES[2],
            CurrencyCode::Gbp => &CURRENCIES[3],
            CurrencyCode::Aed => &CURRENCIES[4],
            CurrencyCode::Sar => &CURRENCIES[5],
            CurrencyCode::Inr => &CURRENCIES[6],
        }
    }

    /// Whether amounts are shown rounded with lakh/crore grouping
    pub fn uses_south_asian_format(&self) -> bool {
        matches!(self, CurrencyCode::Pkr | CurrencyCode::Inr)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        CurrencyCode::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(code))
            .ok_or_else(|| CurrencyError::UnknownCode(s.to_string()))
    }
}

/// A rate table entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Currency {
    /// ISO 4217 code
    pub code: &'static str,
    /// Symbol placed before amounts
    pub symbol: &'static str,
    /// Display name
    pub name: &'static str,
    /// Units of this currency per USD
    pub rate: f64,
}

/// Static rate table, rates relative to USD
pub static CURRENCIES: [Currency; 7] = [
    Currency { code: "PKR", symbol: "Rs", name: "Pakistani Rupee", rate: 278.50 },
    Currency { code: "USD", symbol: "$", name: "US Dollar", rate: 1.0 },
    Currency { code: "EUR", symbol: "€", name: "Euro", rate: 0.92 },
    Currency { code: "GBP", symbol: "£", name: "British Pound", rate: 0.79 },
    Currency { code: "AED", symbol: "AED", name: "UAE Dirham", rate: 3.67 },
    Currency { code: "SAR", symbol: "SAR", name: "Saudi Riyal", rate: 3.75 },
    Currency { code: "INR", symbol: "₹", name: "Indian Rupee", rate: 83.12 },
];

/// Selected display currency and the formatting built on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CurrencyState {
    code: CurrencyCode,
}

impl CurrencyState {
    /// Create a state with a selected currency
    pub fn new(code: CurrencyCode) -> Self {
        Self { code }
    }

    /// Selected code
    pub fn code(&self) -> CurrencyCode {
        self.code
    }

    /// Selected rate table entry
    pub fn currency(&self) -> &'static Currency {
        self.code.currency()
    }

    /// Select another currency
    pub fn set_currency(&mut self, code: CurrencyCode) {
        self.code = code;
    }

    /// All selectable currencies
    pub fn available_currencies(&self) -> &'static [Currency] {
        &CURRENCIES
    }

    /// Convert a USD amount into the selected currency
    pub fn convert_from_usd(&self, amount_usd: f64) -> f64 {
        amount_usd * self.currency().rate
    }

    /// Full amount, e.g. `Rs 1,25,325` or `$1,234.50`
    pub fn format_amount(&self, amount_usd: f64) -> String {
        let converted = self.convert_from_usd(amount_usd);
        let symbol = self.currency().symbol;

        if self.code.uses_south_asian_format() {
            format!("{} {}", symbol, format_rounded(converted, group_lakh))
        } else {
            format!("{}{}", symbol, format_cents(converted, group_thousands))
        }
    }

    /// Compact amount, e.g. `Rs1.3M`, `$2.5K` or `$12.00`
    pub fn format_amount_short(&self, amount_usd: f64) -> String {
        let converted = self.convert_from_usd(amount_usd);
        let symbol = self.currency().symbol;

        if converted >= 1_000_000.0 {
            return format!("{}{}M", symbol, one_decimal(converted / 1_000_000.0));
        }
        if converted >= 1_000.0 {
            return format!("{}{}K", symbol, one_decimal(converted / 1_000.0));
        }

        if self.code.uses_south_asian_format() {
            format!("{} {}", symbol, format_rounded(converted, group_thousands))
        } else {
            format!("{}{:.2}", symbol, converted)
        }
    }
}

/// One decimal place, ties rounded away from zero
fn one_decimal(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0)
}

fn sign(value: f64) -> &'static str {
    if value < 0.0 {
        "-"
    } else {
        ""
    }
}

fn format_rounded(value: f64, group: fn(u64) -> String) -> String {
    let whole = value.abs().round() as u64;
    if whole == 0 {
        return "0".to_string();
    }
    format!("{}{}", sign(value), group(whole))
}

fn format_cents(value: f64, group: fn(u64) -> String) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    if cents == 0 {
        return "0.00".to_string();
    }
    format!("{}{}.{:02}", sign(value), group(cents / 100), cents % 100)
}

/// `1234567` -> `1,234,567`
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `1234567` -> `12,34,567`
fn group_lakh(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    for (i, ch) in head.chars().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push(',');
    out.push_str(tail);
    out
}
