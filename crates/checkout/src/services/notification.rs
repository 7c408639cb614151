//! Order confirmation delivery.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use common::OrderId;
use domain::OrderResult;

use crate::error::ServiceError;

/// Sends the order confirmation to the customer.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_order_confirmation(
        &self,
        email: &str,
        order: &OrderResult,
    ) -> Result<(), ServiceError>;
}

#[async_trait]
impl<T: NotificationService + ?Sized> NotificationService for Arc<T> {
    async fn send_order_confirmation(
        &self,
        email: &str,
        order: &OrderResult,
    ) -> Result<(), ServiceError> {
        (**self).send_order_confirmation(email, order).await
    }
}

/// Writes confirmations to the log instead of sending mail.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotificationService;

#[async_trait]
impl NotificationService for LoggingNotificationService {
    async fn send_order_confirmation(
        &self,
        email: &str,
        order: &OrderResult,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            email,
            order_id = %order.order_id,
            tracking_id = %order.shipping_tracking_id,
            items = order.items.len(),
            "order confirmation sent"
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
struct InMemoryNotificationState {
    sent: Vec<(String, OrderId)>,
    fail_on_send: bool,
}

/// Records confirmations in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationService {
    state: Arc<Mutex<InMemoryNotificationState>>,
}

impl InMemoryNotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, InMemoryNotificationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configures the service to fail every send.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.state().fail_on_send = fail;
    }

    /// `(email, order id)` of every confirmation sent, oldest first.
    pub fn sent(&self) -> Vec<(String, OrderId)> {
        self.state().sent.clone()
    }
}

#[async_trait]
impl NotificationService for InMemoryNotificationService {
    async fn send_order_confirmation(
        &self,
        email: &str,
        order: &OrderResult,
    ) -> Result<(), ServiceError> {
        let mut state = self.state();
        if state.fail_on_send {
            return Err(ServiceError::unavailable("notification", "mail relay refused"));
        }
        state.sent.push((email.to_string(), order.order_id));
        Ok(())
    }
}
