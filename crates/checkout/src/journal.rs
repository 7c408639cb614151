//! In-process journal of checkout records.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use common::OrderId;
use tokio::sync::RwLock;

use crate::record::CheckoutRecord;

/// Records kept by [`OrderJournal::new`].
pub const DEFAULT_JOURNAL_CAPACITY: usize = 10_000;

#[derive(Debug, Default)]
struct Entries {
    records: HashMap<OrderId, CheckoutRecord>,
    /// Order ids, oldest first.
    order: VecDeque<OrderId>,
}

/// Latest known record per order. Cheap to clone; clones share storage.
///
/// Holds at most `capacity` orders; saving a new order beyond that evicts
/// the oldest one. Records live only as long as the process.
#[derive(Debug, Clone)]
pub struct OrderJournal {
    entries: Arc<RwLock<Entries>>,
    capacity: usize,
}

impl Default for OrderJournal {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_JOURNAL_CAPACITY)
    }
}

impl OrderJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A journal holding at most `capacity` orders (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Entries::default())),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stores (or replaces) the record for its order.
    pub async fn save(&self, record: &CheckoutRecord) {
        let mut entries = self.entries.write().await;
        let order_id = record.order_id();
        if entries.records.insert(order_id, record.clone()).is_none() {
            entries.order.push_back(order_id);
            while entries.order.len() > self.capacity {
                if let Some(oldest) = entries.order.pop_front() {
                    entries.records.remove(&oldest);
                    tracing::debug!(order_id = %oldest, "evicted checkout record");
                }
            }
        }
    }

    /// Applies `change` to the stored record, if it is still held.
    pub async fn update(&self, order_id: OrderId, change: impl FnOnce(&mut CheckoutRecord)) -> bool {
        let mut entries = self.entries.write().await;
        match entries.records.get_mut(&order_id) {
            Some(record) => {
                change(record);
                true
            }
            None => false,
        }
    }

    pub async fn get(&self, order_id: OrderId) -> Option<CheckoutRecord> {
        let entries = self.entries.read().await;
        entries.records.get(&order_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.records.is_empty()
    }
}
