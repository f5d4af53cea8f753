//! Price parsing and currency display.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`] from form input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not a decimal number.
    #[error("price must be a number")]
    NotANumber,
    /// The input is below zero.
    #[error("price cannot be negative")]
    Negative,
}

/// A non-negative monetary amount with currency display.
///
/// Prices use decimal arithmetic throughout; float parsing of form input was
/// a defect of the original dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Parse a price from user-entered text.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, not a decimal number,
    /// or negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PriceError::Empty);
        }
        let amount = Decimal::from_str(s).map_err(|_| PriceError::NotANumber)?;
        if amount.is_sign_negative() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// Returns the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

/// Currency display, e.g. `$19.99`.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

/// Format a raw decimal amount for display.
#[must_use]
pub fn format_currency(amount: Decimal) -> String {
    Price::new(amount).to_string()
}
