use std::num::NonZeroU32;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{patch, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::models::order::{Coordinate, OrderId, OrderSummary};
use crate::service::ClaimResult;
use crate::state::AppState;

const TAKEN_LITERAL: &str = "TAKEN";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/:id", patch(take_order))
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub origin: Option<Value>,
    #[serde(default)]
    pub destination: Option<Value>,
}

#[derive(Deserialize)]
pub struct TakeOrderRequest {
    #[serde(default)]
    pub status: Option<Value>,
}

#[derive(Deserialize)]
pub struct ListOrdersQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedOrderResponse {
    pub id: OrderId,
    pub distance: String,
    pub status: &'static str,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Json<CreatedOrderResponse>, AppError> {
    let Json(payload) = payload.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;

    let origin = parse_coordinate(payload.origin.as_ref(), "Origin", "origin")?;
    let destination = parse_coordinate(payload.destination.as_ref(), "Destination", "destination")?;

    let order = state.assignment.submit_order(origin, destination).await?;

    Ok(Json(CreatedOrderResponse {
        id: order.id,
        distance: order.display_distance(),
        status: order.status.label(),
    }))
}

async fn take_order(
    State(state): State<Arc<AppState>>,
    id: Result<Path<OrderId>, PathRejection>,
    payload: Result<Json<TakeOrderRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(payload) = payload.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;

    match payload.status {
        None | Some(Value::Null) => {
            return Err(AppError::InvalidInput("Status values is required".to_string()));
        }
        Some(Value::String(status)) if status == TAKEN_LITERAL => {}
        Some(_) => return Err(AppError::InvalidInput("Please enter a valid input.".to_string())),
    }

    // A non-numeric id can never name an order.
    let Ok(Path(id)) = id else {
        return Err(AppError::OrderNotFound);
    };

    match state.assignment.claim_order(id).await? {
        ClaimResult::Claimed => Ok(Json(json!({ "status": "SUCCESS" }))),
        ClaimResult::AlreadyTaken => Ok(Json(json!({ "error": "Order is already taken." }))),
        ClaimResult::NotFound => Err(AppError::OrderNotFound),
    }
}

/// Empty pages answer 400 with `[]` to stay compatible with existing clients.
async fn list_orders(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListOrdersQuery>, QueryRejection>,
) -> Result<(StatusCode, Json<Vec<OrderSummary>>), AppError> {
    let Query(query) = query.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;

    let page = parse_positive(query.page.as_deref(), "page", "Page number is required", "Page number")?;
    let limit = parse_positive(query.limit.as_deref(), "limit", "Limit values is required", "Limit number")?;

    let orders = state.listing.list_orders(page, limit).await?;

    let status = if orders.is_empty() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };

    Ok((status, Json(orders)))
}

fn parse_coordinate(value: Option<&Value>, label: &str, noun: &str) -> Result<Coordinate, AppError> {
    let items = match value {
        None | Some(Value::Null) => {
            return Err(AppError::InvalidInput(format!("{label} values are required")));
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(AppError::InvalidInput(format!("{label} values must be in array form")));
        }
    };

    match items.len() {
        0 | 1 => return Err(AppError::InvalidInput(format!("{label} must have two elements"))),
        2 => {}
        _ => return Err(AppError::InvalidInput(format!("{label} must have only two elements"))),
    }

    let invalid = || AppError::InvalidInput(format!("Please enter correct {noun} values."));

    let lat = decimal(&items[0]).filter(|lat| (-90.0..=90.0).contains(lat)).ok_or_else(invalid)?;
    let lng = decimal(&items[1]).filter(|lng| (-180.0..=180.0).contains(lng)).ok_or_else(invalid)?;

    Ok(Coordinate::new(lat, lng))
}

fn decimal(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|value| value.is_finite())
}

fn parse_positive(
    raw: Option<&str>,
    name: &str,
    missing: &str,
    label: &str,
) -> Result<NonZeroU32, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| AppError::InvalidInput(missing.to_string()))?;

    let value: i64 = raw
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("{label} must be a numeric value")))?;

    if value < 1 {
        return Err(AppError::InvalidInput(format!("{name} must be greater than 0.")));
    }

    u32::try_from(value)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| AppError::InvalidInput(format!("{name} is too large")))
}
