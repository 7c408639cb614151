//! Per-order state machine.

use serde::{Deserialize, Serialize};

/// Where a single checkout stands.
///
/// State transitions:
/// ```text
/// Pending ──► Charged ──► Shipped ──► Completed
///    │           │
///    └───────────┴──► Failed
/// ```
///
/// `Failed` reached from `Charged` means money was taken with no
/// shipment. No compensation runs; the state exists so one can be added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderState {
    /// Stages before the charge are running.
    #[default]
    Pending,

    /// The card was charged; shipment not yet dispatched.
    Charged,

    /// A tracking id was issued; cleanup stages remain.
    Shipped,

    /// The order was placed (terminal state).
    Completed,

    /// A stage before the order was placed failed (terminal state).
    Failed,
}

impl OrderState {
    /// Returns true if `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: OrderState) -> bool {
        matches!(
            (self, next),
            (OrderState::Pending, OrderState::Charged)
                | (OrderState::Pending, OrderState::Failed)
                | (OrderState::Charged, OrderState::Shipped)
                | (OrderState::Charged, OrderState::Failed)
                | (OrderState::Shipped, OrderState::Completed)
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Completed | OrderState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Pending => "Pending",
            OrderState::Charged => "Charged",
            OrderState::Shipped => "Shipped",
            OrderState::Completed => "Completed",
            OrderState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_pending() {
        assert_eq!(OrderState::default(), OrderState::Pending);
    }

    #[test]
    fn test_happy_path_transitions() {
        assert!(OrderState::Pending.can_transition_to(OrderState::Charged));
        assert!(OrderState::Charged.can_transition_to(OrderState::Shipped));
        assert!(OrderState::Shipped.can_transition_to(OrderState::Completed));
    }

    #[test]
    fn test_failure_transitions() {
        assert!(OrderState::Pending.can_transition_to(OrderState::Failed));
        assert!(OrderState::Charged.can_transition_to(OrderState::Failed));
        assert!(!OrderState::Shipped.can_transition_to(OrderState::Failed));
        assert!(!OrderState::Completed.can_transition_to(OrderState::Failed));
    }

    #[test]
    fn test_no_skipping_or_leaving_terminal_states() {
        assert!(!OrderState::Pending.can_transition_to(OrderState::Shipped));
        assert!(!OrderState::Pending.can_transition_to(OrderState::Completed));
        assert!(!OrderState::Failed.can_transition_to(OrderState::Pending));
        assert!(!OrderState::Completed.can_transition_to(OrderState::Charged));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!OrderState::Pending.is_terminal());
        assert!(!OrderState::Charged.is_terminal());
        assert!(!OrderState::Shipped.is_terminal());
        assert!(OrderState::Completed.is_terminal());
        assert!(OrderState::Failed.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(OrderState::Pending.to_string(), "Pending");
        assert_eq!(OrderState::Charged.to_string(), "Charged");
        assert_eq!(OrderState::Failed.to_string(), "Failed");
    }
}
