use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::FormError;

/// A currency the wallet keeps balances in.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    USDT,
    RUB,
    UZS,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Currency::USDT => write!(f, "USDT"),
            Currency::RUB => write!(f, "RUB"),
            Currency::UZS => write!(f, "UZS"),
        }
    }
}

impl Currency {
    /// List supported currencies at the moment
    pub fn supported() -> Vec<Currency> {
        vec![Currency::USDT, Currency::RUB, Currency::UZS]
    }

    /// Form that backend expects in paths and query strings
    pub fn ticker_lowercase(&self) -> &'static str {
        match self {
            Currency::USDT => "usdt",
            Currency::RUB => "rub",
            Currency::UZS => "uzs",
        }
    }
}

impl FromStr for Currency {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Currency::supported()
            .into_iter()
            .find(|c| c.ticker_lowercase() == normalized)
            .ok_or(FormError::UnknownCurrency(normalized))
    }
}
