use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{DistanceError, DistanceResolver};
use crate::models::order::Coordinate;

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<MatrixValue>,
}

#[derive(Debug, Deserialize)]
struct MatrixValue {
    value: u64,
}

#[derive(Debug, Clone)]
pub struct GoogleDistanceResolver {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GoogleDistanceResolver {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DistanceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| DistanceError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl DistanceResolver for GoogleDistanceResolver {
    async fn resolve(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
    ) -> Result<u64, DistanceError> {
        let origins = format!("{},{}", origin.lat, origin.lng);
        let destinations = format!("{},{}", destination.lat, destination.lng);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("origins", origins.as_str()),
                ("destinations", destinations.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|err| DistanceError::Transport(err.to_string()))?;

        let body: MatrixResponse = response
            .json()
            .await
            .map_err(|err| DistanceError::Decode(err.to_string()))?;

        distance_from_response(body)
    }
}

fn distance_from_response(body: MatrixResponse) -> Result<u64, DistanceError> {
    if let Some(message) = body.error_message {
        return Err(DistanceError::Upstream(message));
    }

    if let Some(status) = body.status.filter(|status| status != "OK") {
        return Err(DistanceError::Upstream(status));
    }

    let element = body
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.elements.into_iter().next())
        .ok_or_else(|| DistanceError::Decode("response has no matrix elements".to_string()))?;

    if element.status != "OK" {
        return Err(DistanceError::NoRoute(element.status));
    }

    element
        .distance
        .map(|distance| distance.value)
        .ok_or_else(|| DistanceError::Decode("element has no distance".to_string()))
}
