//! Query Routes
//!
//! Endpoints answering count and popularity queries for a date prefix.
//!
//! - GET /1/queries/count/:date_prefix - Total accesses
//! - GET /1/queries/popular/:date_prefix?size=N - Most accessed URLs
//! - GET /1/queries/count?from=..&to=.. - Total accesses over a range

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{CountResponse, PopularParams, PopularResponse, RangeParams};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::query::{count_between, count_urls, find_top_n, identify_granularity, parse_size};

/// GET /1/queries/count/:date_prefix
///
/// Count every access recorded under the prefix.
pub async fn count_queries(
    State(state): State<Arc<AppState>>,
    Path(date_prefix): Path<String>,
) -> ApiResult<Json<CountResponse>> {
    let granularity = identify_granularity(&date_prefix)?;

    let count = state
        .read_index(move |index| count_urls(index, &date_prefix, granularity))
        .await??;

    Ok(Json(CountResponse { count }))
}

/// GET /1/queries/popular/:date_prefix?size=N
///
/// Most accessed URLs under the prefix, most accessed first.
/// Without `size`, the configured default is used.
pub async fn popular_queries(
    State(state): State<Arc<AppState>>,
    Path(date_prefix): Path<String>,
    Query(params): Query<PopularParams>,
) -> ApiResult<Json<PopularResponse>> {
    let granularity = identify_granularity(&date_prefix)?;
    let size = match params.size.as_deref() {
        Some(raw) => parse_size(raw)?,
        None => state.config.default_top_size,
    };

    let queries = state
        .read_index(move |index| find_top_n(index, &date_prefix, granularity, size))
        .await??;

    Ok(Json(PopularResponse { queries }))
}

/// GET /1/queries/count?from=..&to=..
///
/// Count every access between two prefixes of the same granularity.
pub async fn count_range(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeParams>,
) -> ApiResult<Json<CountResponse>> {
    let count = state
        .read_index(move |index| count_between(index, &params.from, &params.to))
        .await??;

    Ok(Json(CountResponse { count }))
}
