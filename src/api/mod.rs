//! urltally REST API
//!
//! HTTP API layer over a populated [`TemporalIndex`](crate::index::TemporalIndex),
//! built with Axum.
//!
//! # Endpoints
//!
//! ## Queries
//! - `GET /1/queries/count/:date_prefix` - Total accesses, `{"count": n}`
//! - `GET /1/queries/popular/:date_prefix?size=N` - Top N URLs,
//!   `{"queries": [{"query": url, "count": n}, ...]}`
//! - `GET /1/queries/count?from=..&to=..` - Total accesses over a range
//!
//! Date prefixes: `2015`, `2015-08`, `2015-08-01`, `2015-08-01 00`,
//! `2015-08-01 00:04`, `2015-08-01 00:04:59` (space URL-encoded as `%20`).
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use urltally::api::{serve, AppState};
//! use urltally::config::ApiConfig;
//! use urltally::index::TemporalIndex;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApiConfig::default();
//!     let state = AppState::new(TemporalIndex::new(), config.clone());
//!     serve(state, &config).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let query_routes = Router::new()
        .route("/count", get(routes::queries::count_range))
        .route("/count/:date_prefix", get(routes::queries::count_queries))
        .route("/popular/:date_prefix", get(routes::queries::popular_queries));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/1/queries", query_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("urltally API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("urltally API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::TemporalIndex;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use chrono::NaiveDateTime;
    use serde_json::Value;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let mut index = TemporalIndex::new();
        let records = [
            ("2015-08-01 00:03:43", "http://a"),
            ("2015-08-01 00:03:50", "http://a"),
            ("2015-08-01 00:04:01", "http://b"),
            ("2015-08-02 12:00:00", "http://c"),
        ];
        for (t, url) in records {
            let t = NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S").unwrap();
            index.add(&t, url).unwrap();
        }

        build_router(AppState::new(index, ApiConfig::default()))
    }

    async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let response = get(create_test_app(), "/health/live").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let response = get(create_test_app(), "/health/ready").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let response = get(create_test_app(), "/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["index"]["records"], 4);
        assert_eq!(body["index"]["distinct_urls"], 3);
    }

    #[tokio::test]
    async fn test_count_year() {
        let response = get(create_test_app(), "/1/queries/count/2015").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["count"], 4);
    }

    #[tokio::test]
    async fn test_count_minute_with_encoded_space() {
        let response = get(create_test_app(), "/1/queries/count/2015-08-01%2000:03").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["count"], 2);
    }

    #[tokio::test]
    async fn test_count_without_data() {
        let response = get(create_test_app(), "/1/queries/count/1999-01").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["count"], 0);
    }

    #[tokio::test]
    async fn test_count_unrecognized_prefix() {
        let response = get(create_test_app(), "/1/queries/count/yesterday").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"]["code"],
            "INVALID_DATE_PREFIX"
        );
    }

    #[tokio::test]
    async fn test_count_invalid_month() {
        let response = get(create_test_app(), "/1/queries/count/2015-13").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_popular() {
        let response = get(create_test_app(), "/1/queries/popular/2015-08-01?size=1").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let queries = body["queries"].as_array().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0]["query"], "http://a");
        assert_eq!(queries[0]["count"], 2);
    }

    #[tokio::test]
    async fn test_popular_default_size() {
        let response = get(create_test_app(), "/1/queries/popular/2015").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["queries"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_popular_invalid_size() {
        let response = get(create_test_app(), "/1/queries/popular/2015?size=foo").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "INVALID_SIZE");
    }

    #[tokio::test]
    async fn test_count_range() {
        let response = get(
            create_test_app(),
            "/1/queries/count?from=2015-08-01&to=2015-08-31",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["count"], 4);
    }

    #[tokio::test]
    async fn test_count_range_mismatch() {
        let response = get(create_test_app(), "/1/queries/count?from=2015&to=2015-08").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_past_deadline_is_unavailable() {
        let config = ApiConfig {
            request_timeout_secs: 0,
            ..ApiConfig::default()
        };
        let state = AppState::new(TemporalIndex::new(), config);
        let index = Arc::clone(&state.index);
        let _writer = index.write().await;

        let response = get(build_router(state), "/1/queries/count/2015").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["error"]["code"], "QUERY_TIMEOUT");
    }

    #[tokio::test]
    async fn test_health_stats_respect_deadline() {
        let config = ApiConfig {
            request_timeout_secs: 0,
            ..ApiConfig::default()
        };
        let state = AppState::new(TemporalIndex::new(), config);
        let index = Arc::clone(&state.index);
        let _writer = index.write().await;

        let response = get(build_router(state), "/health").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
