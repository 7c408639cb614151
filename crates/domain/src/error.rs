//! Domain error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by money arithmetic and currency conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Two amounts in different currencies were combined.
    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    /// The currency code is not present in the rate table.
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    /// The result does not fit the 64-bit units field.
    #[error("Money amount overflow")]
    Overflow,

    /// A value received from outside violates the normalized form.
    #[error("Money is not normalized: units={units}, nanos={nanos}")]
    NotNormalized { units: i64, nanos: i32 },
}

/// Errors that can occur while loading a conversion rate table.
#[derive(Debug, Error)]
pub enum RateTableError {
    /// The rate table document could not be parsed.
    #[error("Invalid rate table: {0}")]
    Parse(#[from] serde_json::Error),

    /// The rate table file could not be read.
    #[error("Failed to read rate table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The table holds no currencies.
    #[error("Rate table is empty")]
    Empty,

    /// A rate is zero or negative.
    #[error("Invalid conversion rate for {code}: {rate}")]
    InvalidRate { code: String, rate: Decimal },
}

/// Convenience type alias for money results.
pub type Result<T> = std::result::Result<T, MoneyError>;
