//! HTTP surface tests driven through the router

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use zentara_stake::{
    config::StakingConfig,
    scheduler::ImmediateScheduler,
    seed_positions::create_seed_positions,
    staking_handlers::{router, AppState},
    PositionStore, StakingService,
};

fn app() -> Router {
    let store = PositionStore::with_positions(create_seed_positions().unwrap()).unwrap();
    let staking = StakingService::new(store, Arc::new(ImmediateScheduler), &StakingConfig::default());
    router(AppState { staking }, &["*".to_string()])
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn decimal(value: &Value) -> Decimal {
    serde_json::from_value(value.clone()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn test_list_positions() {
    let app = app();
    let (status, body) = send(&app, get("/api/staking/positions")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 3);
    assert_eq!(body["data"][0]["id"], "altcoin");
    assert_eq!(body["data"][1]["lockDays"], 7);
}

#[tokio::test]
async fn test_stake_then_read_back() {
    let app = app();
    let (status, body) = send(&app, post("/api/staking/positions/btc/stake", json!({ "amount": 500 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "confirmed");
    assert_eq!(body["data"]["kind"], "stake");

    let (_, body) = send(&app, get("/api/staking/positions/btc")).await;
    assert_eq!(decimal(&body["data"]["totalDeposited"]), Decimal::from(4000));
}

#[tokio::test]
async fn test_invalid_amount() {
    let app = app();
    let (status, body) = send(&app, post("/api/staking/positions/btc/unstake", json!({ "amount": 0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INVALID_AMOUNT");
}

#[tokio::test]
async fn test_unknown_position() {
    let app = app();
    let (status, body) = send(&app, post("/api/staking/positions/doge/claim", json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "POSITION_NOT_FOUND");
}

#[tokio::test]
async fn test_claim_twice() {
    let app = app();
    let (status, _) = send(&app, post("/api/staking/positions/meme/claim", json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, post("/api/staking/positions/meme/claim", json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "NOTHING_TO_CLAIM");
}

#[tokio::test]
async fn test_claim_all_and_summary() {
    let app = app();
    let (status, body) = send(&app, post("/api/staking/claim-all", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(decimal(&body["meta"]["totalClaimed"]), Decimal::new(1325752, 2));

    let (_, body) = send(&app, get("/api/staking/summary")).await;
    assert_eq!(decimal(&body["data"]["totalPendingRewards"]), Decimal::ZERO);

    let (status, _) = send(&app, post("/api/staking/claim-all", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_estimate_and_quote() {
    let app = app();
    let (status, body) = send(&app, get("/api/staking/positions/btc/estimate?amount=365")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&body["data"]["estimatedRewards"]), Decimal::new(1092, 3));

    let (status, body) = send(&app, get("/api/staking/positions/btc/claim-quote")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&body["data"]["netRewards"]), Decimal::new(419750, 2));
}

#[tokio::test]
async fn test_transaction_history() {
    let app = app();
    send(&app, post("/api/staking/positions/btc/stake", json!({ "amount": "25.5" }))).await;
    send(&app, post("/api/staking/positions/btc/unstake", json!({ "amount": 5 }))).await;

    let (status, body) = send(&app, get("/api/staking/transactions?limit=1")).await;
    assert_eq!(status, StatusCode::OK);
    let history = body["data"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["kind"], "unstake");
}
