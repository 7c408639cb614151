//! Checkout stages, in execution order.

use serde::{Deserialize, Serialize};

/// The saga type identifier for checkout.
pub const SAGA_TYPE: &str = "PlaceOrder";

/// One step of a checkout.
///
/// Stages 1–6 abort the checkout on failure. `EmptyCart` and `Notify` are
/// best effort: their failures become warnings on a placed order. `Notify`
/// counts as completed once the confirmation is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    FetchCart,
    PriceItems,
    QuoteShipping,
    ConvertCurrency,
    ChargeCard,
    ShipOrder,
    EmptyCart,
    Notify,
}

impl Stage {
    /// All stages in the order they run.
    pub const ALL: [Stage; 8] = [
        Stage::FetchCart,
        Stage::PriceItems,
        Stage::QuoteShipping,
        Stage::ConvertCurrency,
        Stage::ChargeCard,
        Stage::ShipOrder,
        Stage::EmptyCart,
        Stage::Notify,
    ];

    /// 1-based position in the saga.
    pub fn number(&self) -> usize {
        *self as usize + 1
    }

    /// Failures here are logged and suppressed.
    pub fn is_best_effort(&self) -> bool {
        matches!(self, Stage::EmptyCart | Stage::Notify)
    }

    /// True for stages that run after the card has been charged.
    pub fn follows_charge(&self) -> bool {
        *self > Stage::ChargeCard
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::FetchCart => "fetch_cart",
            Stage::PriceItems => "price_items",
            Stage::QuoteShipping => "quote_shipping",
            Stage::ConvertCurrency => "convert_currency",
            Stage::ChargeCard => "charge_card",
            Stage::ShipOrder => "ship_order",
            Stage::EmptyCart => "empty_cart",
            Stage::Notify => "notify",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_follow_execution_order() {
        let numbers: Vec<usize> = Stage::ALL.iter().map(Stage::number).collect();
        assert_eq!(numbers, [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_best_effort_stages() {
        let best_effort: Vec<Stage> = Stage::ALL
            .into_iter()
            .filter(Stage::is_best_effort)
            .collect();
        assert_eq!(best_effort, [Stage::EmptyCart, Stage::Notify]);
    }

    #[test]
    fn test_follows_charge() {
        assert!(!Stage::ChargeCard.follows_charge());
        assert!(Stage::ShipOrder.follows_charge());
        assert!(!Stage::ConvertCurrency.follows_charge());
    }

    #[test]
    fn test_serialization_matches_display() {
        for stage in Stage::ALL {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{stage}\""));
        }
    }
}
