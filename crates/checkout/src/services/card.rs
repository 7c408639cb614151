//! Card number validation used by the in-memory payment service.

use domain::CreditCardInfo;

use crate::error::ServiceError;

/// Card networks recognised from the number prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardBrand {
    Visa,
    MasterCard,
    Amex,
    Discover,
    DinersClub,
    Jcb,
}

impl CardBrand {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardBrand::Visa => "visa",
            CardBrand::MasterCard => "mastercard",
            CardBrand::Amex => "amex",
            CardBrand::Discover => "discover",
            CardBrand::DinersClub => "dinersclub",
            CardBrand::Jcb => "jcb",
        }
    }

    /// Only VISA and MasterCard are charged.
    pub fn is_accepted(&self) -> bool {
        matches!(self, CardBrand::Visa | CardBrand::MasterCard)
    }

    fn valid_length(&self, len: usize) -> bool {
        match self {
            CardBrand::Visa => matches!(len, 13 | 16 | 19),
            CardBrand::MasterCard => len == 16,
            CardBrand::Amex => len == 15,
            CardBrand::Discover => matches!(len, 16 | 19),
            CardBrand::DinersClub => (14..=19).contains(&len),
            CardBrand::Jcb => (16..=19).contains(&len),
        }
    }
}

impl std::fmt::Display for CardBrand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strips spaces and dashes; `None` if anything else is not a digit.
fn digits_of(number: &str) -> Option<Vec<u32>> {
    number
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .map(|c| c.to_digit(10))
        .collect()
}

fn prefix(digits: &[u32], len: usize) -> u32 {
    digits.iter().take(len).fold(0, |acc, d| acc * 10 + d)
}

/// Identifies the card network from the leading digits.
pub fn detect_brand(digits: &[u32]) -> Option<CardBrand> {
    if digits.len() < 4 {
        return None;
    }
    let p1 = prefix(digits, 1);
    let p2 = prefix(digits, 2);
    let p3 = prefix(digits, 3);
    let p4 = prefix(digits, 4);

    if p1 == 4 {
        Some(CardBrand::Visa)
    } else if (51..=55).contains(&p2) || (2221..=2720).contains(&p4) {
        Some(CardBrand::MasterCard)
    } else if p2 == 34 || p2 == 37 {
        Some(CardBrand::Amex)
    } else if p4 == 6011 || (644..=649).contains(&p3) || p2 == 65 {
        Some(CardBrand::Discover)
    } else if (3528..=3589).contains(&p4) {
        Some(CardBrand::Jcb)
    } else if (300..=305).contains(&p3) || matches!(p2, 36 | 38 | 39) {
        Some(CardBrand::DinersClub)
    } else {
        None
    }
}

/// Luhn mod-10 checksum.
pub fn luhn_valid(digits: &[u32]) -> bool {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Checks a card as of `(current_year, current_month)`.
///
/// Checks run in order: number well-formed, brand accepted, not expired.
pub fn validate_card(
    card: &CreditCardInfo,
    current_year: i32,
    current_month: u32,
) -> Result<CardBrand, ServiceError> {
    let digits = digits_of(&card.credit_card_number).ok_or(ServiceError::InvalidCreditCard)?;
    let brand = detect_brand(&digits).ok_or(ServiceError::InvalidCreditCard)?;
    if !brand.valid_length(digits.len()) || !luhn_valid(&digits) {
        return Err(ServiceError::InvalidCreditCard);
    }

    if !brand.is_accepted() {
        return Err(ServiceError::UnacceptedCardBrand(brand.to_string()));
    }

    let month = card.credit_card_expiration_month;
    let year = card.credit_card_expiration_year;
    let expires = i64::from(year) * 12 + i64::from(month);
    let now = i64::from(current_year) * 12 + i64::from(current_month);
    if !(1..=12).contains(&month) || expires < now {
        return Err(ServiceError::ExpiredCreditCard {
            last_four: card.last_four(),
            month,
            year,
        });
    }

    Ok(brand)
}
