//! Currency conversion through a shared base currency.
//!
//! Every rate is a multiplier relative to one implicit base currency (EUR
//! in the reference table). A conversion first divides by the source rate
//! to reach the base currency, rounding to the nearest nano, then
//! multiplies by the target rate and truncates toward zero. The truncation
//! bias is sub-nano and intentional.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{MoneyError, RateTableError, Result};
use crate::money::{Money, NANOS_PER_UNIT};

/// The reference conversion table shipped with the storefront sample.
pub const REFERENCE_RATES_JSON: &str = include_str!("../data/currency_conversion.json");

const NANO_SCALE: u32 = 9;

/// Read-only table of currency code → multiplier relative to the base currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTable {
    rates: BTreeMap<String, Decimal>,
}

impl RateTable {
    /// Builds a table, rejecting empty input and non-positive rates.
    pub fn new(
        rates: impl IntoIterator<Item = (String, Decimal)>,
    ) -> std::result::Result<Self, RateTableError> {
        let rates: BTreeMap<String, Decimal> = rates.into_iter().collect();
        if rates.is_empty() {
            return Err(RateTableError::Empty);
        }
        if let Some((code, rate)) = rates.iter().find(|(_, rate)| !rate.is_sign_positive() || rate.is_zero()) {
            return Err(RateTableError::InvalidRate {
                code: code.clone(),
                rate: *rate,
            });
        }
        Ok(Self { rates })
    }

    /// Parses a `{"USD": "1.1305", ...}` document.
    pub fn from_json(json: &str) -> std::result::Result<Self, RateTableError> {
        let rates: BTreeMap<String, Decimal> = serde_json::from_str(json)?;
        Self::new(rates)
    }

    /// Reads and parses a rate table file.
    pub fn from_path(path: impl AsRef<Path>) -> std::result::Result<Self, RateTableError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RateTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The embedded reference table (EUR base).
    pub fn reference() -> std::result::Result<Self, RateTableError> {
        Self::from_json(REFERENCE_RATES_JSON)
    }

    pub fn rate(&self, currency_code: &str) -> Option<Decimal> {
        self.rates.get(currency_code).copied()
    }

    /// Currency codes in lexicographic order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }

    /// The currency whose rate is exactly one, if the table has one.
    pub fn base_currency(&self) -> Option<&str> {
        self.rates
            .iter()
            .find(|(_, rate)| **rate == Decimal::ONE)
            .map(|(code, _)| code.as_str())
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Converts money between currencies using an injected rate table.
#[derive(Debug, Clone)]
pub struct CurrencyConverter {
    rates: Arc<RateTable>,
}

impl CurrencyConverter {
    pub fn new(rates: RateTable) -> Self {
        Self {
            rates: Arc::new(rates),
        }
    }

    /// Creates a converter sharing an already loaded table.
    pub fn from_shared(rates: Arc<RateTable>) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn supported_currencies(&self) -> Vec<String> {
        self.rates.codes().map(str::to_string).collect()
    }

    pub fn is_supported(&self, currency_code: &str) -> bool {
        self.rates.rate(currency_code).is_some()
    }

    pub fn base_currency(&self) -> Option<&str> {
        self.rates.base_currency()
    }

    /// Converts `amount` into `to_code`.
    ///
    /// Both codes must be in the table. Converting into the amount's own
    /// currency returns it unchanged.
    pub fn convert(&self, amount: &Money, to_code: &str) -> Result<Money> {
        let from_rate = self.lookup(amount.currency_code())?;
        let to_rate = self.lookup(to_code)?;

        if amount.currency_code() == to_code {
            return Ok(amount.clone());
        }

        let value = Decimal::try_from_i128_with_scale(amount.total_nanos(), NANO_SCALE)
            .map_err(|_| MoneyError::Overflow)?;

        let base = value
            .checked_div(from_rate)
            .ok_or(MoneyError::Overflow)?
            .round_dp_with_strategy(NANO_SCALE, RoundingStrategy::MidpointAwayFromZero);

        let target = base
            .checked_mul(to_rate)
            .ok_or(MoneyError::Overflow)?
            .round_dp_with_strategy(NANO_SCALE, RoundingStrategy::ToZero);

        let total_nanos = target
            .checked_mul(Decimal::from(NANOS_PER_UNIT))
            .and_then(|nanos| nanos.trunc().to_i128())
            .ok_or(MoneyError::Overflow)?;

        Money::from_total_nanos(to_code, total_nanos)
    }

    fn lookup(&self, currency_code: &str) -> Result<Decimal> {
        self.rates
            .rate(currency_code)
            .ok_or_else(|| MoneyError::UnsupportedCurrency(currency_code.to_string()))
    }
}
