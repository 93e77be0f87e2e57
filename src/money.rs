//! Money Parsing Module
//!
//! Converts client-facing decimal strings into the fixed-precision [`Amount`]
//! used for every balance comparison and every debit/credit. All amount text
//! MUST go through [`parse_amount`]; balances never touch binary floating point.
//!
//! ## Design Principles
//! 1. Fixed scale: every amount and balance carries exactly [`AMOUNT_SCALE`] fractional digits
//! 2. Explicit Error Handling: No silent truncation
//! 3. Type Safety: a parsed [`Amount`] is known to be non-negative
//!
//! ## Usage
//! ```rust
//! use ledger_transfer::money::parse_amount;
//!
//! let amount = parse_amount("100.12345").unwrap();
//! assert_eq!(amount.to_string(), "100.12345");
//!
//! let amount = parse_amount("7").unwrap();
//! assert_eq!(amount.to_string(), "7.00000");
//! ```

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of fractional digits carried by amounts and balances.
pub const AMOUNT_SCALE: u32 = 5;

// ============================================================================
// Error Types
// ============================================================================

/// Amount parsing errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Amount cannot be negative")]
    Negative,

    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount too large, would overflow")]
    Overflow,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

// ============================================================================
// Amount
// ============================================================================

/// Non-negative fixed-precision amount (scale [`AMOUNT_SCALE`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::from_parts(0, 0, 0, false, AMOUNT_SCALE));

    /// Underlying decimal value
    #[inline]
    pub fn value(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_amount(s)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

// ============================================================================
// Parse: Client → Internal
// ============================================================================

/// Parse a client-provided decimal string into an [`Amount`]
///
/// Zero is accepted. The result always carries exactly [`AMOUNT_SCALE`]
/// fractional digits.
///
/// # Errors
/// * `Negative` - leading minus sign on a non-zero value (`-0` is zero)
/// * `PrecisionOverflow` - more than [`AMOUNT_SCALE`] fractional digits
/// * `Overflow` - value outside the decimal range
/// * `InvalidFormat` - anything that is not `digits[.digits]`
pub fn parse_amount(amount_str: &str) -> Result<Amount, MoneyError> {
    let amount_str = amount_str.trim();
    if amount_str.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }

    if let Some(rest) = amount_str.strip_prefix('-') {
        // The magnitude must itself be well formed: "-abc" and "--1" are malformed
        if !rest.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(MoneyError::InvalidFormat(amount_str.to_string()));
        }
        let magnitude = parse_amount(rest)?;
        if magnitude.is_zero() {
            return Ok(Amount::ZERO);
        }
        return Err(MoneyError::Negative);
    }

    let (whole, frac) = match amount_str.split_once('.') {
        None => (amount_str, ""),
        Some((whole, frac)) => {
            // Require both sides of the dot: "0.5" not ".5", "5.0" not "5."
            if whole.is_empty() {
                return Err(MoneyError::InvalidFormat(
                    "missing leading zero (e.g., use 0.5 instead of .5)".into(),
                ));
            }
            if frac.is_empty() {
                return Err(MoneyError::InvalidFormat(
                    "missing fractional part (e.g., use 5.0 instead of 5.)".into(),
                ));
            }
            (whole, frac)
        }
    };

    if !whole.chars().all(|c| c.is_ascii_digit()) {
        return Err(MoneyError::InvalidFormat(format!(
            "invalid character in whole part: {}",
            whole
        )));
    }
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(MoneyError::InvalidFormat(format!(
            "invalid character in fractional part: {}",
            frac
        )));
    }

    if frac.len() > AMOUNT_SCALE as usize {
        return Err(MoneyError::PrecisionOverflow {
            provided: frac.len() as u32,
            max: AMOUNT_SCALE,
        });
    }

    let value = Decimal::from_str(amount_str).map_err(|_| MoneyError::Overflow)?;
    // from_str rounds away fractional digits that do not fit the mantissa
    if value.scale() != frac.len() as u32 {
        return Err(MoneyError::Overflow);
    }
    Ok(Amount(normalize(value)?))
}

/// Rescale a balance to exactly [`AMOUNT_SCALE`] fractional digits.
///
/// Used by every store write so that `300.1` and `300.10000` are stored and
/// displayed identically. Fails with `Overflow` if the value cannot carry
/// five fractional digits, and with `PrecisionOverflow` if rescaling would
/// round.
pub fn normalize(value: Decimal) -> Result<Decimal, MoneyError> {
    let mut scaled = value;
    scaled.rescale(AMOUNT_SCALE);
    if scaled.scale() != AMOUNT_SCALE {
        return Err(MoneyError::Overflow);
    }
    if scaled != value {
        return Err(MoneyError::PrecisionOverflow {
            provided: value.normalize().scale(),
            max: AMOUNT_SCALE,
        });
    }
    Ok(scaled)
}

/// `balance - amount` at full [`AMOUNT_SCALE`] precision
pub fn checked_debit(balance: Decimal, amount: Amount) -> Result<Decimal, MoneyError> {
    exact(normalize(balance)?.checked_sub(amount.value()))
}

/// `balance + amount` at full [`AMOUNT_SCALE`] precision
///
/// Near the top of the decimal range an addition still "succeeds" by
/// dropping fractional digits; that is reported as `Overflow`.
pub fn checked_credit(balance: Decimal, amount: Amount) -> Result<Decimal, MoneyError> {
    exact(normalize(balance)?.checked_add(amount.value()))
}

fn exact(result: Option<Decimal>) -> Result<Decimal, MoneyError> {
    match result {
        Some(value) if value.scale() == AMOUNT_SCALE => Ok(value),
        _ => Err(MoneyError::Overflow),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
