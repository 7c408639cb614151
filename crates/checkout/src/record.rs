//! Per-order checkout record, folded from checkout events.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use domain::Money;
use serde::Serialize;

use crate::events::CheckoutEvent;
use crate::stages::Stage;
use crate::state::OrderState;

/// What is known about one checkout attempt.
///
/// Built only by applying [`CheckoutEvent`]s, so the event history and the
/// derived fields never disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutRecord {
    order_id: OrderId,
    user_id: UserId,
    user_currency: String,
    state: OrderState,
    completed_stages: Vec<Stage>,
    /// Payment transaction, once the card is charged.
    transaction_id: Option<String>,
    amount_charged: Option<Money>,
    tracking_id: Option<String>,
    failed_stage: Option<Stage>,
    failure_reason: Option<String>,
    warnings: Vec<String>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    history: Vec<CheckoutEvent>,
}

impl CheckoutRecord {
    /// Opens a record for a new checkout.
    pub fn start(order_id: OrderId, user_id: UserId, user_currency: &str) -> Self {
        let started = CheckoutEvent::checkout_started(order_id, user_id.clone(), user_currency);
        let mut record = Self {
            order_id,
            user_id,
            user_currency: user_currency.to_string(),
            state: OrderState::Pending,
            completed_stages: Vec::new(),
            transaction_id: None,
            amount_charged: None,
            tracking_id: None,
            failed_stage: None,
            failure_reason: None,
            warnings: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
            history: Vec::new(),
        };
        record.apply(started);
        record
    }

    /// Folds one event into the record.
    pub fn apply(&mut self, event: CheckoutEvent) {
        match &event {
            CheckoutEvent::CheckoutStarted(data) => {
                self.order_id = data.order_id;
                self.user_id = data.user_id.clone();
                self.user_currency = data.user_currency.clone();
                self.started_at = data.started_at;
                self.state = OrderState::Pending;
            }
            CheckoutEvent::StageCompleted(data) => {
                self.completed_stages.push(data.stage);
            }
            CheckoutEvent::CardCharged(data) => {
                self.transaction_id = Some(data.transaction_id.clone());
                self.amount_charged = Some(data.amount.clone());
                self.state = OrderState::Charged;
            }
            CheckoutEvent::OrderShipped(data) => {
                self.tracking_id = Some(data.tracking_id.clone());
                self.state = OrderState::Shipped;
            }
            CheckoutEvent::StageWarning(data) => {
                self.warnings.push(format!("{}: {}", data.stage, data.error));
            }
            CheckoutEvent::CheckoutCompleted(data) => {
                self.state = OrderState::Completed;
                self.finished_at = Some(data.completed_at);
            }
            CheckoutEvent::CheckoutFailed(data) => {
                self.failed_stage = Some(data.stage);
                self.failure_reason = Some(data.reason.clone());
                self.state = OrderState::Failed;
                self.finished_at = Some(data.failed_at);
            }
        }
        self.history.push(event);
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn user_currency(&self) -> &str {
        &self.user_currency
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn completed_stages(&self) -> &[Stage] {
        &self.completed_stages
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn amount_charged(&self) -> Option<&Money> {
        self.amount_charged.as_ref()
    }

    pub fn tracking_id(&self) -> Option<&str> {
        self.tracking_id.as_deref()
    }

    pub fn failed_stage(&self) -> Option<Stage> {
        self.failed_stage
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Every event applied so far, oldest first.
    pub fn history(&self) -> &[CheckoutEvent] {
        &self.history
    }

    /// True if the order failed after money was taken.
    pub fn is_charged_without_shipment(&self) -> bool {
        self.state == OrderState::Failed && self.transaction_id.is_some()
    }
}
