use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use order_dispatch::api::rest::router;
use order_dispatch::distance::{DistanceError, DistanceResolver};
use order_dispatch::models::order::Coordinate;
use order_dispatch::state::AppState;
use order_dispatch::store::InMemoryOrderStore;
use serde_json::{json, Value};
use tower::ServiceExt;

struct FixedDistance(u64);

#[async_trait]
impl DistanceResolver for FixedDistance {
    async fn resolve(&self, _: &Coordinate, _: &Coordinate) -> Result<u64, DistanceError> {
        Ok(self.0)
    }
}

struct RejectingDistance;

#[async_trait]
impl DistanceResolver for RejectingDistance {
    async fn resolve(&self, _: &Coordinate, _: &Coordinate) -> Result<u64, DistanceError> {
        Err(DistanceError::Upstream("The provided API key is invalid.".to_string()))
    }
}

fn setup_with(resolver: Arc<dyn DistanceResolver>) -> axum::Router {
    let state = AppState::new(
        Arc::new(InMemoryOrderStore::new()),
        resolver,
        Duration::from_secs(1),
    );
    router(Arc::new(state))
}

fn setup() -> axum::Router {
    setup_with(Arc::new(FixedDistance(467_560)))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn sample_order() -> Value {
    json!({
        "origin": ["32.9697", "-96.80322"],
        "destination": ["29.46786", "-98.53506"]
    })
}

async fn create(app: &axum::Router) -> u64 {
    let res = app
        .clone()
        .oneshot(json_request("POST", "/orders", sample_order()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    body_json(res).await["id"].as_u64().unwrap()
}

async fn take(app: &axum::Router, id: u64) -> (StatusCode, Value) {
    let res = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/orders/{id}"),
            json!({ "status": "TAKEN" }),
        ))
        .await
        .unwrap();
    let status = res.status();
    (status, body_json(res).await)
}

#[tokio::test]
async fn health_returns_ok() {
    let app = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["orders"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let app = setup();
    create(&app).await;

    let response = app.oneshot(get_request("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("orders_created_total 1"));
}

#[tokio::test]
async fn create_order_returns_formatted_distance() {
    let app = setup();
    let response = app
        .oneshot(json_request("POST", "/orders", sample_order()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["distance"], "467560.00");
    assert_eq!(body["status"], "UNASSIGNED");
    assert!(body["id"].as_u64().is_some());
}

#[tokio::test]
async fn create_order_with_same_coordinates_returns_400() {
    let app = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/orders",
            json!({
                "origin": ["32.9697", "-96.80322"],
                "destination": ["32.9697", "-96.80322"]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["kind"], "validation");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn create_order_with_malformed_coordinates_returns_422() {
    let app = setup();

    for payload in [
        json!({ "origin": ["32.9697"], "destination": ["29.46786", "-98.53506"] }),
        json!({ "origin": ["32.9697", "-96.80322"] }),
        json!({ "origin": ["32asdasd.9697", "-96.80322"], "destination": ["29.46786", "-98.53506"] }),
        json!({ "origin": ["32.9697", "-96.80322"], "destination": ["73dfd.2343", "-98.53506"] }),
    ] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/orders", payload.clone()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "payload {payload}");
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn resolver_error_is_reported_and_nothing_is_stored() {
    let app = setup_with(Arc::new(RejectingDistance));

    let response = app
        .clone()
        .oneshot(json_request("POST", "/orders", sample_order()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "The provided API key is invalid.");
    assert_eq!(body["kind"], "distance_lookup");

    let health = body_json(app.oneshot(get_request("/health")).await.unwrap()).await;
    assert_eq!(health["orders"], 0);
}

#[tokio::test]
async fn take_order_once_then_already_taken() {
    let app = setup();
    let id = create(&app).await;

    let (status, body) = take(&app, id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "SUCCESS" }));

    let (status, body) = take(&app, id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "error": "Order is already taken." }));
}

#[tokio::test]
async fn take_unknown_order_returns_400() {
    let app = setup();

    let (status, body) = take(&app, 9999).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Order not found");

    let response = app
        .oneshot(json_request(
            "PATCH",
            "/orders/abc",
            json!({ "status": "TAKEN" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn take_order_with_other_status_returns_422() {
    let app = setup();
    let id = create(&app).await;

    for payload in [json!({ "status": "UNASSIGNED" }), json!({ "status": "taken" }), json!({})] {
        let response = app
            .clone()
            .oneshot(json_request("PATCH", &format!("/orders/{id}"), payload.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "payload {payload}");
    }

    let (_, body) = take(&app, id).await;
    assert_eq!(body["status"], "SUCCESS");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_takes_have_exactly_one_winner() {
    let app = setup();
    let id = create(&app).await;

    let handles: Vec<_> = (0..100)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { take(&app, id).await })
        })
        .collect();

    let mut successes = 0;
    let mut already_taken = 0;
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        if body["status"] == "SUCCESS" {
            successes += 1;
        } else if body["error"] == "Order is already taken." {
            already_taken += 1;
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(already_taken, 99);
}

#[tokio::test]
async fn list_orders_returns_page_in_creation_order() {
    let app = setup();
    let mut ids = Vec::new();
    for _ in 0..5 {
        ids.push(create(&app).await);
    }
    take(&app, ids[1]).await;

    let response = app
        .oneshot(get_request("/orders?page=1&limit=5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 5);

    let listed: Vec<u64> = list.iter().map(|o| o["id"].as_u64().unwrap()).collect();
    assert_eq!(listed, ids);
    assert_eq!(list[0]["distance"], 467_560);
    assert_eq!(list[0]["status"], "UNASSIGNED");
    assert_eq!(list[1]["status"], "TAKEN");
    assert_eq!(list[1]["distance"], 467_560);
}

#[tokio::test]
async fn list_orders_past_the_end_returns_400_with_empty_array() {
    let app = setup();
    create(&app).await;

    let response = app
        .oneshot(get_request("/orders?page=5433&limit=5"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn list_orders_with_invalid_params_returns_422() {
    let app = setup();

    for uri in [
        "/orders?page=one&limit=5",
        "/orders?page=0&limit=5",
        "/orders?page=1&limit=-2",
        "/orders?limit=5",
        "/orders?page=1",
    ] {
        let response = app.clone().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "uri {uri}");
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn unknown_route_returns_404_message() {
    let app = setup();
    let response = app.oneshot(get_request("/unknown")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Page Not Found");
}
