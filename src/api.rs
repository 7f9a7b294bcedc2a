// 🌐 REST API - card catalog, search, summaries and comparisons over HTTP
// Built as a library router so `bin/server.rs` stays thin and tests can
// drive it without opening a socket.

use crate::advisor::{CardAdvisor, SearchQuery, Source};
use crate::card::CardRecord;
use crate::catalog::CatalogStats;
use crate::rules::SAMPLE_QUERIES;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub advisor: Arc<CardAdvisor>,
}

// ============================================================================
// Wire types
// ============================================================================

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::<()>::err(message))).into_response()
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    mode: &'static str,
    version: &'static str,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
}

#[derive(Serialize)]
struct SearchResponse<'a> {
    cards: Vec<&'a CardRecord>,
    explanation: String,
    source: Source,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompareRequest {
    card_ids: Vec<String>,
}

#[derive(Serialize)]
struct CompareResponse {
    comparison: String,
    source: Source,
}

#[derive(Serialize)]
struct SummaryResponse {
    summary: String,
    source: Source,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let mode = if state.advisor.is_delegating() { "ai" } else { "fallback" };
    Json(ApiResponse::ok(HealthResponse {
        status: "OK",
        mode,
        version: crate::VERSION,
    }))
}

/// GET /api/cards
async fn list_cards(State(state): State<AppState>) -> Response {
    let cards: Vec<&CardRecord> = state.advisor.catalog().iter().collect();
    Json(ApiResponse::ok(cards)).into_response()
}

/// GET /api/cards/:id
async fn get_card(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.advisor.catalog().get(&id) {
        Some(card) => Json(ApiResponse::ok(card)).into_response(),
        None => failure(StatusCode::NOT_FOUND, format!("Unknown card: {}", id)),
    }
}

/// GET /api/cards/:id/summary
async fn card_summary(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(card) = state.advisor.catalog().get(&id) else {
        return failure(StatusCode::NOT_FOUND, format!("Unknown card: {}", id));
    };

    let resolution = state.advisor.summarize(card).await;
    let source = resolution.source();
    Json(ApiResponse::ok(SummaryResponse {
        summary: resolution.into_inner(),
        source,
    }))
    .into_response()
}

/// GET /api/stats
async fn get_stats(State(state): State<AppState>) -> Json<ApiResponse<CatalogStats>> {
    Json(ApiResponse::ok(state.advisor.catalog().stats()))
}

/// GET /api/samples
async fn get_samples() -> Json<ApiResponse<[&'static str; 5]>> {
    Json(ApiResponse::ok(SAMPLE_QUERIES))
}

/// POST /api/search
async fn search(State(state): State<AppState>, Json(request): Json<SearchRequest>) -> Response {
    let query = match SearchQuery::new(request.query) {
        Ok(query) => query,
        Err(e) => return failure(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let resolution = state.advisor.search(&query).await;
    let source = resolution.source();
    let result = resolution.into_inner();
    Json(ApiResponse::ok(SearchResponse {
        cards: result.cards,
        explanation: result.explanation,
        source,
    }))
    .into_response()
}

/// POST /api/compare
async fn compare(State(state): State<AppState>, Json(request): Json<CompareRequest>) -> Response {
    let resolution = state.advisor.compare(&request.card_ids).await;
    let source = resolution.source();
    Json(ApiResponse::ok(CompareResponse {
        comparison: resolution.into_inner(),
        source,
    }))
    .into_response()
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    info!(
        cards = state.advisor.catalog().len(),
        delegating = state.advisor.is_delegating(),
        "building API router"
    );

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/cards", get(list_cards))
        .route("/cards/:id", get(get_card))
        .route("/cards/:id/summary", get(card_summary))
        .route("/stats", get(get_stats))
        .route("/samples", get(get_samples))
        .route("/search", post(search))
        .route("/compare", post(compare))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}

// ============================================================================
// TESTS
// ============================================================================
