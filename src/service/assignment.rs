use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::distance::{DistanceError, DistanceResolver};
use crate::error::AppError;
use crate::models::order::{AssignmentOutcome, Coordinate, Order, OrderId};
use crate::observability::metrics::Metrics;
use crate::store::OrderStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimResult {
    Claimed,
    NotFound,
    AlreadyTaken,
}

impl From<AssignmentOutcome> for ClaimResult {
    fn from(outcome: AssignmentOutcome) -> Self {
        match outcome {
            AssignmentOutcome::Assigned => ClaimResult::Claimed,
            AssignmentOutcome::NotFound => ClaimResult::NotFound,
            AssignmentOutcome::AlreadyTaken => ClaimResult::AlreadyTaken,
        }
    }
}

impl ClaimResult {
    fn label(self) -> &'static str {
        match self {
            ClaimResult::Claimed => "assigned",
            ClaimResult::NotFound => "not_found",
            ClaimResult::AlreadyTaken => "already_taken",
        }
    }
}

/// Creates and claims orders. Holds no order state; every claim decision
/// is made by the store's conditional write.
#[derive(Clone)]
pub struct AssignmentService {
    store: Arc<dyn OrderStore>,
    resolver: Arc<dyn DistanceResolver>,
    lookup_timeout: Duration,
    metrics: Metrics,
}

impl AssignmentService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        resolver: Arc<dyn DistanceResolver>,
        lookup_timeout: Duration,
        metrics: Metrics,
    ) -> Self {
        Self {
            store,
            resolver,
            lookup_timeout,
            metrics,
        }
    }

    pub async fn submit_order(&self, start: Coordinate, end: Coordinate) -> Result<Order, AppError> {
        if start == end {
            return Err(AppError::SameCoordinates);
        }

        let distance_meters = self.lookup_distance(&start, &end).await?;

        let order = self
            .store
            .create_order(start, end, distance_meters)
            .await
            .inspect_err(|err| error!(error = %err, "failed to persist order"))?;

        self.metrics.orders_created_total.inc();
        info!(order_id = order.id, distance_meters, "order created");

        Ok(order)
    }

    pub async fn claim_order(&self, id: OrderId) -> Result<ClaimResult, AppError> {
        let result = match self.store.try_assign(id).await {
            Ok(outcome) => ClaimResult::from(outcome),
            Err(err) => {
                self.metrics
                    .order_claims_total
                    .with_label_values(&["error"])
                    .inc();
                error!(order_id = id, error = %err, "claim failed");
                return Err(err.into());
            }
        };

        self.metrics
            .order_claims_total
            .with_label_values(&[result.label()])
            .inc();

        match result {
            ClaimResult::Claimed => info!(order_id = id, "order taken"),
            _ => debug!(order_id = id, outcome = result.label(), "claim rejected"),
        }

        Ok(result)
    }

    async fn lookup_distance(&self, start: &Coordinate, end: &Coordinate) -> Result<u64, AppError> {
        let started = Instant::now();

        let result = match tokio::time::timeout(self.lookup_timeout, self.resolver.resolve(start, end)).await {
            Ok(result) => result,
            Err(_) => Err(DistanceError::Timeout(self.lookup_timeout.as_millis())),
        };

        let outcome = if result.is_ok() { "ok" } else { "error" };
        self.metrics
            .distance_lookup_seconds
            .with_label_values(&[outcome])
            .observe(started.elapsed().as_secs_f64());

        result.map_err(|err| {
            warn!(error = %err, "distance lookup failed");
            AppError::from(err)
        })
    }
}
