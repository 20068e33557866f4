//! # mentionrank HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Engine counters
//! - `POST /event` - Ingest an event
//! - `POST /recompute` - Run a recomputation pass now
//! - `GET /order?limit=N` - Published leaderboard
//! - `GET /records/{id}` - One ranking record
//! - `GET /kinds` - Occurrences per event kind
//! - `POST /export` - Persisted blob, base64 encoded
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `MENTIONRANK_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `MENTIONRANK_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `MENTIONRANK_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::{API_KEY_ENV, get_api_key_from_env};
pub use middleware::{RATE_LIMIT_ENV, create_rate_limiter, get_rate_limit_from_env};
pub use types::{
    DEFAULT_ORDER_LIMIT, EventRequest, ExportResponse, HealthResponse, IngestResponse, KindCount,
    KindsResponse, MAX_ORDER_LIMIT, OrderQuery, OrderResponse, RankEntry, RecomputeResponse,
    RecordJson, RecordResponse, StatusResponse,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use mentionrank_core::{RankError, RankingEngine};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Environment variable holding the allowed CORS origins.
pub const CORS_ORIGINS_ENV: &str = "MENTIONRANK_CORS_ORIGINS";

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the engine.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RankingEngine>,
}

impl AppState {
    /// Create app state around a running engine.
    #[must_use]
    pub fn new(engine: Arc<RankingEngine>) -> Self {
        Self { engine }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from `MENTIONRANK_CORS_ORIGINS`.
///
/// - "*": allows all origins
/// - unset: localhost only
/// - otherwise: comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var(CORS_ORIGINS_ENV).ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins ({}=*). This is insecure for production!",
                CORS_ORIGINS_ENV
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in {}, defaulting to localhost only",
                    CORS_ORIGINS_ENV
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!(
                "CORS: No {} set, defaulting to localhost only",
                CORS_ORIGINS_ENV
            );
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|origin| origin.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing
/// 2. CORS
/// 3. Rate Limiting (if enabled)
/// 4. Authentication (if configured)
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    let rate_limit = get_rate_limit_from_env();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set {} to enable authentication.",
            API_KEY_ENV
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/event", post(handlers::ingest_handler))
        .route("/recompute", post(handlers::recompute_handler))
        .route("/order", get(handlers::order_handler))
        .route("/records/{id}", get(handlers::record_handler))
        .route("/kinds", get(handlers::kinds_handler))
        .route("/export", post(handlers::export_handler));

    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Serve the API until `shutdown` is cancelled.
pub async fn run_server(
    addr: &str,
    engine: Arc<RankingEngine>,
    shutdown: CancellationToken,
) -> Result<(), RankError> {
    let router = create_router(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| RankError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("mentionrank HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| RankError::IoError(format!("Server error: {}", e)))
}
