//! Shipping service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use domain::{Address, CartItem, Money};

use crate::error::ServiceError;

/// Result of a successful shipment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentResult {
    /// The tracking id assigned by the shipping service.
    pub tracking_id: String,
}

/// Trait for shipping operations.
#[async_trait]
pub trait ShippingService: Send + Sync {
    /// Quotes the cost of shipping `items` to `address`.
    async fn get_quote(&self, address: &Address, items: &[CartItem])
    -> Result<Money, ServiceError>;

    /// Dispatches a shipment.
    async fn ship_order(
        &self,
        address: &Address,
        items: &[CartItem],
    ) -> Result<ShipmentResult, ServiceError>;
}

#[async_trait]
impl<T: ShippingService + ?Sized> ShippingService for Arc<T> {
    async fn get_quote(
        &self,
        address: &Address,
        items: &[CartItem],
    ) -> Result<Money, ServiceError> {
        (**self).get_quote(address, items).await
    }

    async fn ship_order(
        &self,
        address: &Address,
        items: &[CartItem],
    ) -> Result<ShipmentResult, ServiceError> {
        (**self).ship_order(address, items).await
    }
}

/// Flat fee charged for any non-empty shipment: $8.99.
pub fn default_flat_rate() -> Money {
    Money::from_total_nanos("USD", 8_990_000_000).unwrap_or_else(|_| Money::zero("USD"))
}

#[derive(Debug)]
struct InMemoryShippingState {
    shipments: HashMap<String, (Address, Vec<CartItem>)>,
    next_id: u64,
    flat_rate: Money,
    fail_on_quote: bool,
    fail_on_ship: bool,
}

/// In-memory shipping service with a flat-rate quote.
#[derive(Debug, Clone)]
pub struct InMemoryShippingService {
    state: Arc<Mutex<InMemoryShippingState>>,
}

impl Default for InMemoryShippingService {
    fn default() -> Self {
        Self::with_flat_rate(default_flat_rate())
    }
}

impl InMemoryShippingService {
    /// Creates a service quoting the default $8.99 flat rate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service quoting `flat_rate` for non-empty shipments.
    pub fn with_flat_rate(flat_rate: Money) -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryShippingState {
                shipments: HashMap::new(),
                next_id: 0,
                flat_rate,
                fail_on_quote: false,
                fail_on_ship: false,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, InMemoryShippingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configures the service to fail quote calls.
    pub fn set_fail_on_quote(&self, fail: bool) {
        self.state().fail_on_quote = fail;
    }

    /// Configures the service to fail ship calls.
    pub fn set_fail_on_ship(&self, fail: bool) {
        self.state().fail_on_ship = fail;
    }

    /// Returns the number of dispatched shipments.
    pub fn shipment_count(&self) -> usize {
        self.state().shipments.len()
    }

    /// Returns true if a shipment exists with the given tracking id.
    pub fn has_shipment(&self, tracking_id: &str) -> bool {
        self.state().shipments.contains_key(tracking_id)
    }
}

#[async_trait]
impl ShippingService for InMemoryShippingService {
    async fn get_quote(
        &self,
        _address: &Address,
        items: &[CartItem],
    ) -> Result<Money, ServiceError> {
        let state = self.state();

        if state.fail_on_quote {
            return Err(ServiceError::unavailable("shipping", "quote rejected"));
        }

        let count: u64 = items.iter().map(|i| u64::from(i.quantity)).sum();
        if count == 0 {
            return Ok(Money::zero(state.flat_rate.currency_code()));
        }
        Ok(state.flat_rate.clone())
    }

    async fn ship_order(
        &self,
        address: &Address,
        items: &[CartItem],
    ) -> Result<ShipmentResult, ServiceError> {
        let mut state = self.state();

        if state.fail_on_ship {
            return Err(ServiceError::unavailable("shipping", "carrier unreachable"));
        }

        state.next_id = state.next_id.wrapping_add(1);
        let tracking_id = format!("TRACK-{:04}", state.next_id);
        state
            .shipments
            .insert(tracking_id.clone(), (address.clone(), items.to_vec()));

        Ok(ShipmentResult { tracking_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> Address {
        Address {
            street_address: "1600 Amphitheatre Parkway".into(),
            city: "Mountain View".into(),
            state: "CA".into(),
            country: "United States".into(),
            zip_code: 94043,
        }
    }

    #[tokio::test]
    async fn test_flat_rate_quote() {
        let service = InMemoryShippingService::new();
        let quote = service
            .get_quote(&address(), &[CartItem::new("A", 3)])
            .await
            .unwrap();
        assert_eq!(quote, Money::new("USD", 8, 990_000_000).unwrap());
    }

    #[tokio::test]
    async fn test_empty_shipment_is_free() {
        let service = InMemoryShippingService::new();
        let quote = service.get_quote(&address(), &[]).await.unwrap();
        assert!(quote.is_zero());
        assert_eq!(quote.currency_code(), "USD");
    }

    #[tokio::test]
    async fn test_sequential_tracking_ids() {
        let service = InMemoryShippingService::new();
        let items = [CartItem::new("A", 1)];

        let r1 = service.ship_order(&address(), &items).await.unwrap();
        let r2 = service.ship_order(&address(), &items).await.unwrap();

        assert_eq!(r1.tracking_id, "TRACK-0001");
        assert_eq!(r2.tracking_id, "TRACK-0002");
        assert_eq!(service.shipment_count(), 2);
        assert!(service.has_shipment("TRACK-0002"));
    }

    #[tokio::test]
    async fn test_tracking_counter_wraps_instead_of_panicking() {
        let service = InMemoryShippingService::new();
        service.state().next_id = u64::MAX;
        let items = [CartItem::new("A", 1)];

        let result = service.ship_order(&address(), &items).await.unwrap();

        assert_eq!(result.tracking_id, "TRACK-0000");
    }

    #[tokio::test]
    async fn test_fail_switches() {
        let service = InMemoryShippingService::new();
        service.set_fail_on_quote(true);
        service.set_fail_on_ship(true);

        assert!(service.get_quote(&address(), &[]).await.is_err());
        assert!(service.ship_order(&address(), &[]).await.is_err());
        assert_eq!(service.shipment_count(), 0);
    }
}
