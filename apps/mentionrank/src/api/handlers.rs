//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! The engine is synchronous and its locks are short-lived, so handlers call
//! it directly.

use super::{
    AppState,
    types::{
        EventRequest, ExportResponse, HealthResponse, IngestResponse, KindsResponse,
        OrderQuery, OrderResponse, RankEntry, RecomputeResponse, RecordJson, RecordResponse,
        StatusResponse,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use mentionrank_core::EventId;

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Get engine status.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let metrics = state.engine.metrics();
    let ordered = state.engine.current_order().len();

    (StatusCode::OK, Json(StatusResponse::new(metrics, ordered)))
}

// =============================================================================
// INGEST HANDLER
// =============================================================================

/// Ingest an event.
pub async fn ingest_handler(
    State(state): State<AppState>,
    Json(request): Json<EventRequest>,
) -> impl IntoResponse {
    let event = match request.to_event() {
        Ok(e) => e,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(IngestResponse::error(e.to_string())),
            );
        }
    };

    let receipt = state.engine.ingest(event);
    (
        StatusCode::OK,
        Json(IngestResponse::success(&receipt.event_id, receipt.outcome)),
    )
}

// =============================================================================
// RECOMPUTE HANDLER
// =============================================================================

/// Run a recomputation pass now.
pub async fn recompute_handler(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.engine.recompute();
    (StatusCode::OK, Json(RecomputeResponse::from(stats)))
}

// =============================================================================
// ORDER HANDLER
// =============================================================================

/// Get the published leaderboard.
pub async fn order_handler(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> impl IntoResponse {
    let snapshot = state.engine.current_order();
    let entries = RankEntry::from_ordering(snapshot.top(query.effective_limit()));

    (
        StatusCode::OK,
        Json(OrderResponse {
            total: snapshot.len(),
            entries,
        }),
    )
}

// =============================================================================
// RECORD HANDLER
// =============================================================================

/// Look up one record by event id.
pub async fn record_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.engine.get(&EventId::new(id)) {
        Some(record) => (
            StatusCode::OK,
            Json(RecordResponse {
                found: true,
                record: Some(RecordJson::from(record)),
            }),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(RecordResponse {
                found: false,
                record: None,
            }),
        ),
    }
}

// =============================================================================
// KINDS HANDLER
// =============================================================================

/// Occurrences per event kind.
pub async fn kinds_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(KindsResponse::from(state.engine.count_by_kind())),
    )
}

// =============================================================================
// EXPORT HANDLER
// =============================================================================

/// Export the store in the persisted blob format.
pub async fn export_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.engine.snapshot_counted() {
        Ok((data, records)) => (
            StatusCode::OK,
            Json(ExportResponse::success(&data, records)),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ExportResponse::error(format!("Export failed: {}", e))),
        ),
    }
}
