//! Checkout error types.

use common::{OrderId, ProductId};
use domain::MoneyError;
use thiserror::Error;

use crate::stages::Stage;

/// Errors reported by remote collaborators (catalog, shipping, payment,
/// notification, cart storage).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Transport failure, timeout or unexpected response. The reason never
    /// carries the collaborator's address.
    #[error("{service} service unavailable: {reason}")]
    Unavailable {
        service: &'static str,
        reason: String,
    },

    /// The catalog has no product with this id.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Card number is malformed or fails the checksum.
    #[error("Credit card info is invalid")]
    InvalidCreditCard,

    /// Card brand is recognised but not accepted.
    #[error("Sorry, we cannot process {0} credit cards. Only VISA or MasterCard is accepted.")]
    UnacceptedCardBrand(String),

    /// Card expiry is in the past.
    #[error("Your credit card (ending {last_four}) expired on {month}/{year}")]
    ExpiredCreditCard {
        last_four: String,
        month: i32,
        year: i32,
    },
}

impl ServiceError {
    pub fn unavailable(service: &'static str, reason: impl Into<String>) -> Self {
        ServiceError::Unavailable {
            service,
            reason: reason.into(),
        }
    }

    /// Returns true for transport-level failures.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ServiceError::Unavailable { .. })
    }

    /// Returns true for rejections of the card itself.
    pub fn is_card_rejection(&self) -> bool {
        matches!(
            self,
            ServiceError::InvalidCreditCard
                | ServiceError::UnacceptedCardBrand(_)
                | ServiceError::ExpiredCreditCard { .. }
        )
    }
}

/// What went wrong inside a single stage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Errors returned by [`OrderOrchestrator::place_order`](crate::OrderOrchestrator::place_order).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckoutError {
    /// A mandatory stage failed and the order was not placed.
    ///
    /// `transaction_id` is set when the failure happened after the card was
    /// charged. That charge stands; nothing refunds it.
    #[error("order {order_id} failed at {stage}: {source}")]
    OrderFailed {
        order_id: OrderId,
        stage: Stage,
        transaction_id: Option<String>,
        #[source]
        source: StageError,
    },
}

impl CheckoutError {
    pub fn order_id(&self) -> OrderId {
        match self {
            CheckoutError::OrderFailed { order_id, .. } => *order_id,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            CheckoutError::OrderFailed { stage, .. } => *stage,
        }
    }

    /// The underlying stage failure.
    pub fn cause(&self) -> &StageError {
        match self {
            CheckoutError::OrderFailed { source, .. } => source,
        }
    }

    /// Transaction id of a charge that was committed before the failure.
    pub fn committed_charge(&self) -> Option<&str> {
        match self {
            CheckoutError::OrderFailed { transaction_id, .. } => transaction_id.as_deref(),
        }
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
