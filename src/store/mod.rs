pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::order::{AssignmentOutcome, Coordinate, Order, OrderId};

pub use memory::InMemoryOrderStore;
pub use sqlite::SqlOrderStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("corrupt order record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new `UNASSIGNED` order and returns it with its fresh id.
    async fn create_order(
        &self,
        start: Coordinate,
        end: Coordinate,
        distance_meters: u64,
    ) -> Result<Order, StoreError>;

    /// Atomically moves `id` from `UNASSIGNED` to `TAKEN`.
    ///
    /// Of any number of concurrent calls for the same id, exactly one
    /// observes [`AssignmentOutcome::Assigned`].
    async fn try_assign(&self, id: OrderId) -> Result<AssignmentOutcome, StoreError>;

    /// Orders in creation order, skipping `offset` and returning at most `limit`.
    async fn list_range(&self, offset: u64, limit: u64) -> Result<Vec<Order>, StoreError>;

    async fn count_orders(&self) -> Result<u64, StoreError>;
}
