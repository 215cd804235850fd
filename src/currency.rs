use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "kr")]
    Sek,
    #[serde(rename = "$")]
    Usd,
    #[serde(rename = "€")]
    Eur,
    #[serde(rename = "C$")]
    Cad,
    #[serde(rename = "A$")]
    Aud,
    #[serde(rename = "₹")]
    Inr,
    #[serde(rename = "¥")]
    Jpy,
    #[serde(rename = "£")]
    Gbp,
}

impl Currency {
    pub const ALL: [Currency; 8] = [
        Currency::Sek,
        Currency::Usd,
        Currency::Eur,
        Currency::Cad,
        Currency::Aud,
        Currency::Inr,
        Currency::Jpy,
        Currency::Gbp,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Sek => "kr",
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Cad => "C$",
            Currency::Aud => "A$",
            Currency::Inr => "₹",
            Currency::Jpy => "¥",
            Currency::Gbp => "£",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Currency::Sek => "SEK",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Inr => "INR",
            Currency::Jpy => "JPY",
            Currency::Gbp => "GBP",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Currency::Sek => "Swedish Krona (SEK)",
            Currency::Usd => "US Dollar (USD)",
            Currency::Eur => "Euro (EUR)",
            Currency::Cad => "Canadian Dollar (CAD)",
            Currency::Aud => "Australian Dollar (AUD)",
            Currency::Inr => "Indian Rupee (INR)",
            Currency::Jpy => "Japanese Yen (JPY)",
            Currency::Gbp => "British Pound (GBP)",
        }
    }

    fn position(self) -> usize {
        Currency::ALL
            .iter()
            .position(|c| *c == self)
            .unwrap_or_default()
    }

    pub fn next(self) -> Currency {
        Currency::ALL[(self.position() + 1) % Currency::ALL.len()]
    }

    pub fn previous(self) -> Currency {
        let len = Currency::ALL.len();
        Currency::ALL[(self.position() + len - 1) % len]
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Currency::ALL
            .into_iter()
            .find(|c| c.symbol() == s || c.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Config(format!("unsupported currency '{}'", s)))
    }
}
