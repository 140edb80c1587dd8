use std::sync::Arc;
use std::time::Duration;

use crate::distance::DistanceResolver;
use crate::observability::metrics::Metrics;
use crate::service::{AssignmentService, ListingService};
use crate::store::OrderStore;

pub struct AppState {
    pub store: Arc<dyn OrderStore>,
    pub assignment: AssignmentService,
    pub listing: ListingService,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        store: Arc<dyn OrderStore>,
        resolver: Arc<dyn DistanceResolver>,
        lookup_timeout: Duration,
    ) -> Self {
        let metrics = Metrics::new();

        Self {
            assignment: AssignmentService::new(
                store.clone(),
                resolver,
                lookup_timeout,
                metrics.clone(),
            ),
            listing: ListingService::new(store.clone(), metrics.clone()),
            store,
            metrics,
        }
    }
}
