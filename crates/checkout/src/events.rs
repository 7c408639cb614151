//! Checkout progress events.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use domain::Money;
use serde::{Deserialize, Serialize};

use crate::stages::{SAGA_TYPE, Stage};

/// Facts recorded while a checkout runs. Folding them in order over a
/// [`CheckoutRecord`](crate::CheckoutRecord) yields its current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CheckoutEvent {
    /// Checkout accepted and an order id assigned.
    CheckoutStarted(CheckoutStartedData),

    /// A stage finished successfully.
    StageCompleted(StageData),

    /// Payment accepted the charge.
    CardCharged(CardChargedData),

    /// Shipping issued a tracking id.
    OrderShipped(OrderShippedData),

    /// A best-effort stage failed; the order still completes.
    StageWarning(StageFailedData),

    /// The order was placed.
    CheckoutCompleted(CheckoutCompletedData),

    /// A mandatory stage failed; the order was not placed.
    CheckoutFailed(CheckoutFailedData),
}

impl CheckoutEvent {
    pub fn checkout_started(order_id: OrderId, user_id: UserId, user_currency: &str) -> Self {
        CheckoutEvent::CheckoutStarted(CheckoutStartedData {
            order_id,
            user_id,
            user_currency: user_currency.to_string(),
            saga_type: SAGA_TYPE.to_string(),
            started_at: Utc::now(),
        })
    }

    pub fn stage_completed(stage: Stage) -> Self {
        CheckoutEvent::StageCompleted(StageData { stage })
    }

    pub fn card_charged(transaction_id: &str, amount: Money) -> Self {
        CheckoutEvent::CardCharged(CardChargedData {
            transaction_id: transaction_id.to_string(),
            amount,
        })
    }

    pub fn order_shipped(tracking_id: &str) -> Self {
        CheckoutEvent::OrderShipped(OrderShippedData {
            tracking_id: tracking_id.to_string(),
        })
    }

    pub fn stage_warning(stage: Stage, error: impl ToString) -> Self {
        CheckoutEvent::StageWarning(StageFailedData {
            stage,
            error: error.to_string(),
        })
    }

    pub fn checkout_completed() -> Self {
        CheckoutEvent::CheckoutCompleted(CheckoutCompletedData {
            completed_at: Utc::now(),
        })
    }

    pub fn checkout_failed(stage: Stage, reason: impl ToString) -> Self {
        CheckoutEvent::CheckoutFailed(CheckoutFailedData {
            stage,
            reason: reason.to_string(),
            failed_at: Utc::now(),
        })
    }

    /// Event name, as used in logs.
    pub fn event_type(&self) -> &'static str {
        match self {
            CheckoutEvent::CheckoutStarted(_) => "CheckoutStarted",
            CheckoutEvent::StageCompleted(_) => "StageCompleted",
            CheckoutEvent::CardCharged(_) => "CardCharged",
            CheckoutEvent::OrderShipped(_) => "OrderShipped",
            CheckoutEvent::StageWarning(_) => "StageWarning",
            CheckoutEvent::CheckoutCompleted(_) => "CheckoutCompleted",
            CheckoutEvent::CheckoutFailed(_) => "CheckoutFailed",
        }
    }
}

/// Data for CheckoutStarted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutStartedData {
    pub order_id: OrderId,
    pub user_id: UserId,
    /// Currency the user pays in.
    pub user_currency: String,
    pub saga_type: String,
    pub started_at: DateTime<Utc>,
}

/// Data for StageCompleted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageData {
    pub stage: Stage,
}

/// Data for CardCharged event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardChargedData {
    pub transaction_id: String,
    /// Grand total in the user's currency.
    pub amount: Money,
}

/// Data for OrderShipped event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderShippedData {
    pub tracking_id: String,
}

/// Data for StageWarning event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageFailedData {
    pub stage: Stage,
    pub error: String,
}

/// Data for CheckoutCompleted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutCompletedData {
    pub completed_at: DateTime<Utc>,
}

/// Data for CheckoutFailed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutFailedData {
    pub stage: Stage,
    pub reason: String,
    pub failed_at: DateTime<Utc>,
}
