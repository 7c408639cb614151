//! Fixed-point money: whole units plus a remainder in billionths.

use serde::{Deserialize, Serialize};

use crate::error::{MoneyError, Result};

/// Number of nanos in one whole unit.
pub const NANOS_PER_UNIT: i64 = 1_000_000_000;

const NANOS_MOD: i128 = NANOS_PER_UNIT as i128;

/// An amount of money in a single currency.
///
/// The value is always normalized: `|nanos| < 10^9` and, when both fields
/// are non-zero, `nanos` carries the same sign as `units`. Every operation
/// returns a new value; nothing mutates in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MoneyWire")]
pub struct Money {
    currency_code: String,
    units: i64,
    nanos: i32,
}

/// Unchecked wire representation, validated on the way in.
#[derive(Deserialize)]
struct MoneyWire {
    currency_code: String,
    units: i64,
    nanos: i32,
}

impl TryFrom<MoneyWire> for Money {
    type Error = MoneyError;

    fn try_from(wire: MoneyWire) -> Result<Self> {
        Money::new(wire.currency_code, wire.units, wire.nanos)
    }
}

impl Money {
    /// Creates a money value from fields that must already be normalized.
    pub fn new(currency_code: impl Into<String>, units: i64, nanos: i32) -> Result<Self> {
        if !is_normalized(units, nanos) {
            return Err(MoneyError::NotNormalized { units, nanos });
        }
        Ok(Self {
            currency_code: currency_code.into(),
            units,
            nanos,
        })
    }

    /// Builds a normalized value from arbitrary units and nanos.
    ///
    /// Excess nanos are carried into units, then the remainder takes the
    /// sign of the net amount.
    pub fn normalize(currency_code: impl Into<String>, units: i64, nanos: i64) -> Result<Self> {
        let total = i128::from(units) * NANOS_MOD + i128::from(nanos);
        Self::from_total_nanos(currency_code, total)
    }

    /// Builds a normalized value from a signed count of nanos.
    pub fn from_total_nanos(currency_code: impl Into<String>, total_nanos: i128) -> Result<Self> {
        // Truncating division keeps the remainder's sign equal to the total's.
        let units = i64::try_from(total_nanos / NANOS_MOD).map_err(|_| MoneyError::Overflow)?;
        let nanos = (total_nanos % NANOS_MOD) as i32;
        Ok(Self {
            currency_code: currency_code.into(),
            units,
            nanos,
        })
    }

    /// A whole amount with no fractional part.
    pub fn from_units(currency_code: impl Into<String>, units: i64) -> Self {
        Self {
            currency_code: currency_code.into(),
            units,
            nanos: 0,
        }
    }

    /// Zero in the given currency.
    pub fn zero(currency_code: impl Into<String>) -> Self {
        Self::from_units(currency_code, 0)
    }

    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    pub fn units(&self) -> i64 {
        self.units
    }

    pub fn nanos(&self) -> i32 {
        self.nanos
    }

    /// The whole amount expressed in nanos.
    pub fn total_nanos(&self) -> i128 {
        i128::from(self.units) * NANOS_MOD + i128::from(self.nanos)
    }

    pub fn is_zero(&self) -> bool {
        self.units == 0 && self.nanos == 0
    }

    pub fn is_positive(&self) -> bool {
        self.units > 0 || (self.units == 0 && self.nanos > 0)
    }

    pub fn is_negative(&self) -> bool {
        self.units < 0 || (self.units == 0 && self.nanos < 0)
    }

    /// Adds two amounts of the same currency.
    pub fn add(&self, other: &Money) -> Result<Money> {
        if self.currency_code != other.currency_code {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency_code.clone(),
                right: other.currency_code.clone(),
            });
        }
        Self::from_total_nanos(
            self.currency_code.clone(),
            self.total_nanos() + other.total_nanos(),
        )
    }

    /// Multiplies by a non-negative scalar, typically a line quantity.
    pub fn multiply(&self, factor: u32) -> Result<Money> {
        let total = self
            .total_nanos()
            .checked_mul(i128::from(factor))
            .ok_or(MoneyError::Overflow)?;
        Self::from_total_nanos(self.currency_code.clone(), total)
    }

    /// Sums amounts, starting from zero in `currency_code`.
    pub fn sum<'a>(
        currency_code: impl Into<String>,
        amounts: impl IntoIterator<Item = &'a Money>,
    ) -> Result<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency_code), |acc, m| acc.add(m))
    }
}

/// Returns true if the pair satisfies the normalized-form invariant.
pub fn is_normalized(units: i64, nanos: i32) -> bool {
    if i64::from(nanos).abs() >= NANOS_PER_UNIT {
        return false;
    }
    !((units > 0 && nanos < 0) || (units < 0 && nanos > 0))
}

fn currency_symbol(code: &str) -> &'static str {
    match code {
        "USD" | "CAD" => "$",
        "JPY" => "¥",
        "EUR" => "€",
        "TRY" => "₺",
        "GBP" => "£",
        _ => "$",
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(
            f,
            "{}{}{}.{:02}",
            sign,
            currency_symbol(&self.currency_code),
            self.units.unsigned_abs(),
            self.nanos.unsigned_abs() / 10_000_000
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(units: i64, nanos: i32) -> Money {
        Money::new("USD", units, nanos).unwrap()
    }

    fn assert_normalized(m: &Money) {
        assert!(
            is_normalized(m.units(), m.nanos()),
            "not normalized: {m:?}"
        );
    }

    #[test]
    fn test_new_rejects_out_of_range_nanos() {
        assert!(matches!(
            Money::new("USD", 1, 1_000_000_000),
            Err(MoneyError::NotNormalized { .. })
        ));
        assert!(Money::new("USD", 0, -999_999_999).is_ok());
    }

    #[test]
    fn test_new_rejects_sign_mismatch() {
        assert!(Money::new("USD", 1, -1).is_err());
        assert!(Money::new("USD", -1, 1).is_err());
    }

    #[test]
    fn test_normalize_carries_excess_nanos() {
        let m = Money::normalize("USD", 1, 2_500_000_000).unwrap();
        assert_eq!((m.units(), m.nanos()), (3, 500_000_000));

        let m = Money::normalize("USD", -1, -1_500_000_000).unwrap();
        assert_eq!((m.units(), m.nanos()), (-2, -500_000_000));
    }

    #[test]
    fn test_normalize_fixes_sign() {
        let m = Money::normalize("USD", 1, -250_000_000).unwrap();
        assert_eq!((m.units(), m.nanos()), (0, 750_000_000));

        let m = Money::normalize("USD", -3, 250_000_000).unwrap();
        assert_eq!((m.units(), m.nanos()), (-2, -750_000_000));

        let m = Money::normalize("USD", 0, -250_000_000).unwrap();
        assert_eq!((m.units(), m.nanos()), (0, -250_000_000));
    }

    #[test]
    fn test_normalize_overflow() {
        assert_eq!(
            Money::normalize("USD", i64::MAX, NANOS_PER_UNIT),
            Err(MoneyError::Overflow)
        );
    }

    #[test]
    fn test_add_carries() {
        let sum = usd(1, 600_000_000).add(&usd(2, 700_000_000)).unwrap();
        assert_eq!(sum, usd(4, 300_000_000));
    }

    #[test]
    fn test_add_mixed_signs() {
        let sum = usd(5, 0).add(&usd(-7, -250_000_000)).unwrap();
        assert_eq!(sum, usd(-2, -250_000_000));
        assert_normalized(&sum);
    }

    #[test]
    fn test_add_is_commutative_and_associative() {
        let samples = [
            usd(0, 0),
            usd(10, 990_000_000),
            usd(-3, -500_000_000),
            usd(0, 999_999_999),
            usd(-0, -1),
            usd(1_000_000, 1),
        ];
        for a in &samples {
            for b in &samples {
                let ab = a.add(b).unwrap();
                assert_eq!(ab, b.add(a).unwrap());
                assert_normalized(&ab);
                for c in &samples {
                    let left = ab.add(c).unwrap();
                    let right = a.add(&b.add(c).unwrap()).unwrap();
                    assert_eq!(left, right);
                }
            }
        }
    }

    #[test]
    fn test_add_currency_mismatch() {
        let err = usd(1, 0).add(&Money::from_units("EUR", 1)).unwrap_err();
        assert_eq!(
            err,
            MoneyError::CurrencyMismatch {
                left: "USD".to_string(),
                right: "EUR".to_string()
            }
        );
    }

    #[test]
    fn test_multiply_by_one_is_identity() {
        for m in [usd(19, 990_000_000), usd(-4, -10), usd(0, 5)] {
            assert_eq!(m.multiply(1).unwrap(), m);
        }
    }

    #[test]
    fn test_multiply_carries_into_units() {
        let m = usd(18, 990_000_000).multiply(3).unwrap();
        assert_eq!(m, usd(56, 970_000_000));

        let m = usd(-0, -400_000_000).multiply(5).unwrap();
        assert_eq!(m, usd(-2, 0));
    }

    #[test]
    fn test_multiply_uses_wide_intermediates() {
        // units * 10^9 alone overflows i64 here, the product still fits.
        let m = usd(10_000_000_000, 500_000_000).multiply(4).unwrap();
        assert_eq!(m, usd(40_000_000_002, 0));

        assert_eq!(usd(i64::MAX, 0).multiply(2), Err(MoneyError::Overflow));
        assert_eq!(usd(7, 0).multiply(0).unwrap(), usd(0, 0));
    }

    #[test]
    fn test_sum() {
        let items = [usd(10, 0), usd(5, 500_000_000), usd(0, 500_000_000)];
        assert_eq!(Money::sum("USD", &items).unwrap(), usd(16, 0));
        assert_eq!(Money::sum("USD", []).unwrap(), Money::zero("USD"));
    }

    #[test]
    fn test_display() {
        assert_eq!(usd(10, 0).to_string(), "$10.00");
        assert_eq!(usd(19, 999_999_999).to_string(), "$19.99");
        assert_eq!(usd(-0, -500_000_000).to_string(), "-$0.50");
        assert_eq!(Money::from_units("EUR", 3).to_string(), "€3.00");
        assert_eq!(Money::from_units("JPY", 120).to_string(), "¥120.00");
        assert_eq!(Money::from_units("XYZ", 1).to_string(), "$1.00");
    }

    #[test]
    fn test_sign_predicates() {
        assert!(usd(0, 1).is_positive());
        assert!(usd(0, -1).is_negative());
        assert!(usd(0, 0).is_zero());
        assert!(!usd(0, 0).is_positive());
    }

    #[test]
    fn test_wire_form() {
        let json = serde_json::to_value(usd(15, 250_000_000)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"currency_code": "USD", "units": 15, "nanos": 250_000_000})
        );

        let parsed: Money = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, usd(15, 250_000_000));
    }

    #[test]
    fn test_wire_form_rejects_unnormalized() {
        let bad = serde_json::json!({"currency_code": "USD", "units": 1, "nanos": -5});
        assert!(serde_json::from_value::<Money>(bad).is_err());
    }
}
