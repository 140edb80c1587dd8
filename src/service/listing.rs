use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::order::OrderSummary;
use crate::observability::metrics::Metrics;
use crate::store::OrderStore;

#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn OrderStore>,
    metrics: Metrics,
}

impl ListingService {
    pub fn new(store: Arc<dyn OrderStore>, metrics: Metrics) -> Self {
        Self { store, metrics }
    }

    /// One page of orders in creation order. A page past the end is empty, not an error.
    pub async fn list_orders(
        &self,
        page: NonZeroU32,
        limit: NonZeroU32,
    ) -> Result<Vec<OrderSummary>, AppError> {
        let limit = u64::from(limit.get());
        let offset = u64::from(page.get() - 1) * limit;

        let orders = self.store.list_range(offset, limit).await?;

        let outcome = if orders.is_empty() { "empty" } else { "hit" };
        self.metrics
            .order_listings_total
            .with_label_values(&[outcome])
            .inc();

        Ok(orders.iter().map(|order| order.summary()).collect())
    }
}
