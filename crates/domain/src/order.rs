//! Request-scoped checkout inputs and the order receipt.

use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::money::Money;

/// Shipping destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: i32,
}

/// Payment card details. Never persisted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCardInfo {
    pub credit_card_number: String,
    pub credit_card_cvv: i32,
    pub credit_card_expiration_year: i32,
    pub credit_card_expiration_month: i32,
}

impl CreditCardInfo {
    /// The last four digits of the card number.
    pub fn last_four(&self) -> String {
        let digits: Vec<char> = self
            .credit_card_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        digits[digits.len().saturating_sub(4)..].iter().collect()
    }
}

impl std::fmt::Debug for CreditCardInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreditCardInfo")
            .field("credit_card_number", &format_args!("****{}", self.last_four()))
            .field("credit_card_cvv", &"***")
            .field("credit_card_expiration_year", &self.credit_card_expiration_year)
            .field(
                "credit_card_expiration_month",
                &self.credit_card_expiration_month,
            )
            .finish()
    }
}

/// A cart line priced in the user's currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item: CartItem,
    /// Unit price in the user's currency.
    pub cost: Money,
}

impl OrderItem {
    /// `cost * quantity`.
    pub fn line_total(&self) -> crate::Result<Money> {
        self.cost.multiply(self.item.quantity)
    }
}

/// Receipt of a successfully placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResult {
    pub order_id: OrderId,
    pub shipping_tracking_id: String,
    pub shipping_cost: Money,
    pub shipping_address: Address,
    pub items: Vec<OrderItem>,
}

impl OrderResult {
    /// Shipping plus every line total, in the user's currency.
    pub fn total(&self) -> crate::Result<Money> {
        self.items.iter().try_fold(self.shipping_cost.clone(), |acc, item| {
            acc.add(&item.line_total()?)
        })
    }
}

/// Input of a single checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub user_id: UserId,
    pub user_currency: String,
    pub address: Address,
    pub email: String,
    pub credit_card: CreditCardInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(number: &str) -> CreditCardInfo {
        CreditCardInfo {
            credit_card_number: number.to_string(),
            credit_card_cvv: 672,
            credit_card_expiration_year: 2039,
            credit_card_expiration_month: 1,
        }
    }

    #[test]
    fn test_card_debug_is_masked() {
        let debug = format!("{:?}", card("4432-8015-6152-0454"));
        assert!(debug.contains("****0454"));
        assert!(!debug.contains("4432"));
        assert!(!debug.contains("672"));
    }

    #[test]
    fn test_last_four_short_number() {
        assert_eq!(card("12").last_four(), "12");
    }

    #[test]
    fn test_order_total_includes_quantities_and_shipping() {
        let order = OrderResult {
            order_id: OrderId::new(),
            shipping_tracking_id: "TRACK-0001".to_string(),
            shipping_cost: Money::new("USD", 8, 990_000_000).unwrap(),
            shipping_address: Address {
                street_address: "1600 Amphitheatre Parkway".to_string(),
                city: "Mountain View".to_string(),
                state: "CA".to_string(),
                country: "United States".to_string(),
                zip_code: 94043,
            },
            items: vec![
                OrderItem {
                    item: CartItem::new("A", 2),
                    cost: Money::new("USD", 10, 500_000_000).unwrap(),
                },
                OrderItem {
                    item: CartItem::new("B", 1),
                    cost: Money::from_units("USD", 5),
                },
            ],
        };
        assert_eq!(
            order.total().unwrap(),
            Money::new("USD", 34, 990_000_000).unwrap()
        );
    }
}
