//! Common value types shared across the ledger model.

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Factor for converting shares (shares are stored * 10^8)
pub const SHARES_FACTOR: i64 = 100_000_000;

/// Factor for converting amounts (amounts are stored in cents)
pub const AMOUNT_FACTOR: i64 = 100;

/// Currency used when nothing else is configured
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Monetary amount with currency
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Amount in smallest currency units (e.g., cents for EUR)
    pub amount: i64,
    /// ISO 4217 currency code (e.g., "EUR", "USD")
    pub currency: String,
}

impl Money {
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Create a zero-value Money in the given currency
    pub fn zero(currency: impl Into<String>) -> Self {
        Self::new(0, currency)
    }

    /// Create from major units, e.g. `Money::of("EUR", 10)` is 10.00 EUR
    pub fn of(currency: impl Into<String>, major_units: i64) -> Self {
        Self::new(major_units * AMOUNT_FACTOR, currency)
    }

    /// Convert to decimal representation (e.g., cents to euros)
    pub fn to_decimal(&self) -> f64 {
        self.amount as f64 / AMOUNT_FACTOR as f64
    }

    /// Create from decimal representation
    pub fn from_decimal(value: f64, currency: impl Into<String>) -> Self {
        Self::new((value * AMOUNT_FACTOR as f64).round() as i64, currency)
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Sum of two amounts, `None` if the currencies differ or the sum overflows
    pub fn add(&self, other: &Money) -> Option<Money> {
        self.checked_add(other).ok()
    }

    /// Add another Money; both must share the currency.
    pub fn checked_add(&self, other: &Money) -> Result<Money, ValidationError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or_else(|| ValidationError::AmountOverflow(format!("{} + {}", self, other)))?;
        Ok(Money::new(amount, self.currency.clone()))
    }

    /// Subtract another Money; both must share the currency.
    pub fn checked_sub(&self, other: &Money) -> Result<Money, ValidationError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or_else(|| ValidationError::AmountOverflow(format!("{} - {}", self, other)))?;
        Ok(Money::new(amount, self.currency.clone()))
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), ValidationError> {
        if self.currency != other.currency {
            return Err(ValidationError::CurrencyMismatch {
                expected: self.currency.clone(),
                actual: other.currency.clone(),
            });
        }
        Ok(())
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero(DEFAULT_CURRENCY)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:.2}", self.currency, self.to_decimal())
    }
}

/// Forex conversion information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForexInfo {
    /// Amount in foreign currency (smallest units)
    pub amount: Money,
    /// Exchange rate used for conversion
    pub exchange_rate: f64,
}

impl ForexInfo {
    pub fn new(amount: Money, exchange_rate: f64) -> Self {
        Self {
            amount,
            exchange_rate,
        }
    }

    /// Whether a usable rate is present
    pub fn has_rate(&self) -> bool {
        self.exchange_rate.is_finite() && self.exchange_rate > 0.0
    }
}

/// Helper functions for share conversions
pub mod shares {
    use super::SHARES_FACTOR;

    /// Convert from internal format (shares * 10^8) to decimal
    pub fn to_decimal(shares: i64) -> f64 {
        shares as f64 / SHARES_FACTOR as f64
    }

    /// Convert from decimal to internal format (shares * 10^8)
    pub fn from_decimal(shares: f64) -> i64 {
        (shares * SHARES_FACTOR as f64).round() as i64
    }
}
