//! Payment service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use domain::{CreditCardInfo, Money};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::services::card::validate_card;

/// Result of a successful charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentResult {
    /// The transaction id assigned by the payment service.
    pub transaction_id: String,
}

/// Trait for payment processing. A committed charge is final; there is
/// no refund operation.
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Charges `amount` to `card`.
    async fn charge(
        &self,
        amount: &Money,
        card: &CreditCardInfo,
    ) -> Result<PaymentResult, ServiceError>;
}

#[async_trait]
impl<T: PaymentService + ?Sized> PaymentService for Arc<T> {
    async fn charge(
        &self,
        amount: &Money,
        card: &CreditCardInfo,
    ) -> Result<PaymentResult, ServiceError> {
        (**self).charge(amount, card).await
    }
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    charges: HashMap<String, Money>,
    fail_on_charge: bool,
    /// Fixed `(year, month)` used for expiry checks instead of the clock.
    today: Option<(i32, u32)>,
}

/// In-memory payment service that validates cards and records charges.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentService {
    state: Arc<Mutex<InMemoryPaymentState>>,
}

impl InMemoryPaymentService {
    /// Creates a new in-memory payment service.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, InMemoryPaymentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configures the service to fail charge calls as unavailable.
    pub fn set_fail_on_charge(&self, fail: bool) {
        self.state().fail_on_charge = fail;
    }

    /// Pins the date used for expiry checks.
    pub fn set_today(&self, year: i32, month: u32) {
        self.state().today = Some((year, month));
    }

    /// Returns the number of accepted charges.
    pub fn charge_count(&self) -> usize {
        self.state().charges.len()
    }

    /// Amount charged under `transaction_id`, if any.
    pub fn charged_amount(&self, transaction_id: &str) -> Option<Money> {
        self.state().charges.get(transaction_id).cloned()
    }
}

#[async_trait]
impl PaymentService for InMemoryPaymentService {
    #[tracing::instrument(skip_all, fields(amount = %amount))]
    async fn charge(
        &self,
        amount: &Money,
        card: &CreditCardInfo,
    ) -> Result<PaymentResult, ServiceError> {
        let mut state = self.state();

        if state.fail_on_charge {
            return Err(ServiceError::unavailable("payment", "payment gateway offline"));
        }

        let (year, month) = state.today.unwrap_or_else(|| {
            let now = Utc::now();
            (now.year(), now.month())
        });
        let brand = validate_card(card, year, month)?;

        let transaction_id = Uuid::new_v4().to_string();
        state.charges.insert(transaction_id.clone(), amount.clone());
        tracing::info!(
            %transaction_id,
            card_brand = %brand,
            last_four = %card.last_four(),
            "charge accepted"
        );

        Ok(PaymentResult { transaction_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(number: &str, year: i32, month: i32) -> CreditCardInfo {
        CreditCardInfo {
            credit_card_number: number.to_string(),
            credit_card_cvv: 672,
            credit_card_expiration_year: year,
            credit_card_expiration_month: month,
        }
    }

    #[tokio::test]
    async fn test_charge_records_amount() {
        let service = InMemoryPaymentService::new();
        service.set_today(2026, 10);
        let amount = Money::from_units("EUR", 42);

        let result = service
            .charge(&amount, &card("4111111111111111", 2030, 1))
            .await
            .unwrap();

        assert!(Uuid::parse_str(&result.transaction_id).is_ok());
        assert_eq!(service.charge_count(), 1);
        assert_eq!(service.charged_amount(&result.transaction_id), Some(amount));
    }

    #[tokio::test]
    async fn test_expired_card_is_rejected() {
        let service = InMemoryPaymentService::new();
        service.set_today(2026, 10);

        let result = service
            .charge(&Money::from_units("USD", 1), &card("4111111111111111", 2020, 1))
            .await;

        assert!(matches!(result, Err(ServiceError::ExpiredCreditCard { .. })));
        assert_eq!(service.charge_count(), 0);
    }

    #[tokio::test]
    async fn test_fail_on_charge() {
        let service = InMemoryPaymentService::new();
        service.set_fail_on_charge(true);

        let result = service
            .charge(&Money::from_units("USD", 1), &card("4111111111111111", 2099, 1))
            .await;

        assert!(matches!(result, Err(ServiceError::Unavailable { .. })));
        assert_eq!(service.charge_count(), 0);
    }

    #[tokio::test]
    async fn test_transaction_ids_are_unique() {
        let service = InMemoryPaymentService::new();
        let amount = Money::from_units("USD", 1);
        let card = card("5555555555554444", 2099, 12);

        let r1 = service.charge(&amount, &card).await.unwrap();
        let r2 = service.charge(&amount, &card).await.unwrap();

        assert_ne!(r1.transaction_id, r2.transaction_id);
    }
}
