//! HTTP handlers for the staking ledger

use axum::{
    extract::{Path, Query, State},
    http::HeaderValue,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::debug;

use crate::{response::responses, staking_service::StakingService};

#[derive(Clone)]
pub struct AppState {
    pub staking: StakingService,
}

/// Body of stake and unstake requests
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct EstimateQuery {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

fn default_history_limit() -> usize {
    20
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    pub position_id: String,
    pub amount: Decimal,
    pub estimated_rewards: Decimal,
}

pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/staking/positions", get(list_positions))
        .route("/api/staking/positions/:id", get(get_position))
        .route("/api/staking/positions/:id/stake", post(add_stake))
        .route("/api/staking/positions/:id/unstake", post(remove_stake))
        .route("/api/staking/positions/:id/claim", post(claim_rewards))
        .route("/api/staking/positions/:id/claim-quote", get(claim_quote))
        .route("/api/staking/positions/:id/estimate", get(estimate_rewards))
        .route("/api/staking/claim-all", post(claim_all))
        .route("/api/staking/summary", get(summary))
        .route("/api/staking/transactions", get(transactions))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

async fn health(State(state): State<AppState>) -> Response {
    responses::ok(json!({
        "status": "healthy",
        "busy": state.staking.is_busy(),
    }))
    .into_response()
}

async fn list_positions(State(state): State<AppState>) -> Response {
    let positions = state.staking.list().await;
    let count = positions.len();
    responses::ok_with_meta(positions, json!({ "count": count })).into_response()
}

async fn get_position(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.staking.get(&id).await {
        Ok(position) => responses::ok(position).into_response(),
        Err(err) => responses::staking_error(err).into_response(),
    }
}

async fn add_stake(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AmountRequest>,
) -> Response {
    debug!("Stake request for {}: {:?}", id, payload);
    match state.staking.add_stake(&id, payload.amount).await {
        Ok(tx) => responses::ok(tx).into_response(),
        Err(err) => responses::staking_error(err).into_response(),
    }
}

async fn remove_stake(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AmountRequest>,
) -> Response {
    debug!("Unstake request for {}: {:?}", id, payload);
    match state.staking.remove_stake(&id, payload.amount).await {
        Ok(tx) => responses::ok(tx).into_response(),
        Err(err) => responses::staking_error(err).into_response(),
    }
}

async fn claim_rewards(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.staking.claim_rewards(&id).await {
        Ok(tx) => responses::ok(tx).into_response(),
        Err(err) => responses::staking_error(err).into_response(),
    }
}

async fn claim_all(State(state): State<AppState>) -> Response {
    match state.staking.claim_all().await {
        Ok(claimed) if claimed.is_empty() => {
            responses::bad_request("No rewards to claim").into_response()
        }
        Ok(claimed) => {
            let total: Decimal = claimed.iter().map(|tx| tx.amount).sum();
            responses::ok_with_meta(claimed, json!({ "totalClaimed": total })).into_response()
        }
        Err(err) => responses::staking_error(err).into_response(),
    }
}

async fn claim_quote(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.staking.claim_quote(&id).await {
        Ok(quote) => responses::ok(quote).into_response(),
        Err(err) => responses::staking_error(err).into_response(),
    }
}

async fn estimate_rewards(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<EstimateQuery>,
) -> Response {
    match state.staking.estimate_rewards(&id, params.amount).await {
        Ok(estimated_rewards) => responses::ok(EstimateResponse {
            position_id: id,
            amount: params.amount,
            estimated_rewards,
        })
        .into_response(),
        Err(err) => responses::staking_error(err).into_response(),
    }
}

async fn summary(State(state): State<AppState>) -> Response {
    responses::ok(state.staking.summary().await).into_response()
}

async fn transactions(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Response {
    let history = state.staking.transactions().recent(params.limit).await;
    responses::ok(history).into_response()
}
