//! Money type with decimal precision and currency.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` for arbitrary precision.
//! All monetary results are rounded half-up to 2 decimal places.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Rounds a decimal half-up to 2 decimal places.
#[must_use]
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Represents a monetary amount with currency.
///
/// Uses `Decimal` internally to avoid floating-point precision errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount.
    pub amount: Decimal,
    /// ISO 4217 currency code (e.g., "KES", "USD").
    pub currency: Currency,
}

/// ISO 4217 currency codes supported by the system.
///
/// The currency is a label only; no FX conversion takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Kenyan Shilling
    Kes,
    /// Tanzanian Shilling
    Tzs,
    /// Ugandan Shilling
    Ugx,
    /// US Dollar
    Usd,
    /// Euro
    Eur,
}

impl Default for Currency {
    fn default() -> Self {
        Self::Kes
    }
}

impl Money {
    /// Creates a new Money instance.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative()
    }

    /// Returns the amount rounded half-up to 2 decimal places.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            amount: round2(self.amount),
            currency: self.currency,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kes => write!(f, "KES"),
            Self::Tzs => write!(f, "TZS"),
            Self::Ugx => write!(f, "UGX"),
            Self::Usd => write!(f, "USD"),
            Self::Eur => write!(f, "EUR"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "KES" => Ok(Self::Kes),
            "TZS" => Ok(Self::Tzs),
            "UGX" => Ok(Self::Ugx),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}
