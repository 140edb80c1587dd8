use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub orders_created_total: IntCounter,
    pub order_claims_total: IntCounterVec,
    pub distance_lookup_seconds: HistogramVec,
    pub order_listings_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let orders_created_total =
            IntCounter::new("orders_created_total", "Total orders persisted")
                .expect("valid orders_created_total metric");

        let order_claims_total = IntCounterVec::new(
            Opts::new("order_claims_total", "Claim attempts by outcome"),
            &["outcome"],
        )
        .expect("valid order_claims_total metric");

        let distance_lookup_seconds = HistogramVec::new(
            HistogramOpts::new(
                "distance_lookup_seconds",
                "Latency of distance lookups in seconds",
            ),
            &["outcome"],
        )
        .expect("valid distance_lookup_seconds metric");

        let order_listings_total = IntCounterVec::new(
            Opts::new("order_listings_total", "Order page reads by outcome"),
            &["outcome"],
        )
        .expect("valid order_listings_total metric");

        registry
            .register(Box::new(orders_created_total.clone()))
            .expect("register orders_created_total");
        registry
            .register(Box::new(order_claims_total.clone()))
            .expect("register order_claims_total");
        registry
            .register(Box::new(distance_lookup_seconds.clone()))
            .expect("register distance_lookup_seconds");
        registry
            .register(Box::new(order_listings_total.clone()))
            .expect("register order_listings_total");

        Self {
            registry,
            orders_created_total,
            order_claims_total,
            distance_lookup_seconds,
            order_listings_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
