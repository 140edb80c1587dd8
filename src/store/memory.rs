use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::{OrderStore, StoreError};
use crate::models::order::{AssignmentOutcome, Coordinate, Order, OrderId, OrderStatus};

const UNASSIGNED: u8 = OrderStatus::Unassigned.code();
const TAKEN: u8 = OrderStatus::Taken.code();

struct StoredOrder {
    start: Coordinate,
    end: Coordinate,
    distance_meters: u64,
    status: AtomicU8,
    created_at: DateTime<Utc>,
}

impl StoredOrder {
    fn snapshot(&self, id: OrderId) -> Result<Order, StoreError> {
        let code = self.status.load(Ordering::Acquire);
        let status = OrderStatus::from_code(code)
            .ok_or_else(|| StoreError::Corrupt(format!("order {id} has status code {code}")))?;

        Ok(Order {
            id,
            start: self.start,
            end: self.end,
            distance_meters: self.distance_meters,
            status,
            created_at: self.created_at,
        })
    }
}

/// Process-local store. Ids are dense and increasing, so id order is
/// creation order.
pub struct InMemoryOrderStore {
    orders: DashMap<OrderId, StoredOrder>,
    next_id: AtomicU64,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create_order(
        &self,
        start: Coordinate,
        end: Coordinate,
        distance_meters: u64,
    ) -> Result<Order, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let stored = StoredOrder {
            start,
            end,
            distance_meters,
            status: AtomicU8::new(UNASSIGNED),
            created_at: Utc::now(),
        };

        let order = stored.snapshot(id)?;
        self.orders.insert(id, stored);
        Ok(order)
    }

    async fn try_assign(&self, id: OrderId) -> Result<AssignmentOutcome, StoreError> {
        let Some(stored) = self.orders.get(&id) else {
            return Ok(AssignmentOutcome::NotFound);
        };

        let outcome = match stored.status.compare_exchange(
            UNASSIGNED,
            TAKEN,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => AssignmentOutcome::Assigned,
            Err(TAKEN) => AssignmentOutcome::AlreadyTaken,
            Err(code) => {
                return Err(StoreError::Corrupt(format!(
                    "order {id} has status code {code}"
                )));
            }
        };

        Ok(outcome)
    }

    async fn list_range(&self, offset: u64, limit: u64) -> Result<Vec<Order>, StoreError> {
        let first = offset.saturating_add(1);
        let newest = self.next_id.load(Ordering::Relaxed).saturating_sub(1);
        let last = offset.saturating_add(limit).min(newest);

        (first..=last)
            .filter_map(|id| self.orders.get(&id).map(|entry| entry.snapshot(id)))
            .collect()
    }

    async fn count_orders(&self) -> Result<u64, StoreError> {
        Ok(self.orders.len() as u64)
    }
}
