use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::distance::DistanceError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Origin and destination coordinates are same.")]
    SameCoordinates,

    #[error("{0}")]
    DistanceLookup(String),

    #[error("Order not found")]
    OrderNotFound,

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) | AppError::SameCoordinates => "validation",
            AppError::DistanceLookup(_) => "distance_lookup",
            AppError::OrderNotFound => "not_found",
            AppError::Persistence(_) => "persistence",
            AppError::Internal(_) => "internal",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::SameCoordinates | AppError::DistanceLookup(_) | AppError::OrderNotFound => {
                StatusCode::BAD_REQUEST
            }
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Persistence(err.to_string())
    }
}

impl From<DistanceError> for AppError {
    fn from(err: DistanceError) -> Self {
        AppError::DistanceLookup(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (self.status_code(), body).into_response()
    }
}
