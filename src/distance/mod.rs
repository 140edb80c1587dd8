pub mod google;

use async_trait::async_trait;
use thiserror::Error;

use crate::geo::haversine_meters;
use crate::models::order::Coordinate;

pub use google::GoogleDistanceResolver;

/// Failures reported by a distance lookup. All of them abort order creation.
#[derive(Debug, Error)]
pub enum DistanceError {
    #[error("{0}")]
    Upstream(String),

    #[error("no route between origin and destination ({0})")]
    NoRoute(String),

    #[error("distance lookup timed out after {0} ms")]
    Timeout(u128),

    #[error("distance service unreachable: {0}")]
    Transport(String),

    #[error("unexpected distance service response: {0}")]
    Decode(String),
}

/// Travel distance between two points, in meters.
#[async_trait]
pub trait DistanceResolver: Send + Sync {
    async fn resolve(&self, origin: &Coordinate, destination: &Coordinate)
        -> Result<u64, DistanceError>;
}

/// Straight-line resolver used when no routing service is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct HaversineResolver;

#[async_trait]
impl DistanceResolver for HaversineResolver {
    async fn resolve(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
    ) -> Result<u64, DistanceError> {
        Ok(haversine_meters(origin, destination).round() as u64)
    }
}
