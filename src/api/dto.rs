//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::index::IndexStats;
use crate::query::QueryCount;

// ============================================
// QUERY DTOs
// ============================================

/// Query parameters of the popular endpoint
#[derive(Debug, Deserialize)]
pub struct PopularParams {
    /// Number of URLs to return, kept raw so a bad value gets a proper error
    #[serde(default)]
    pub size: Option<String>,
}

/// Query parameters of the range count endpoint
#[derive(Debug, Deserialize)]
pub struct RangeParams {
    /// First date prefix, inclusive
    pub from: String,
    /// Last date prefix, inclusive
    pub to: String,
}

/// Access count response
#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Ranked URLs response
#[derive(Debug, Serialize, Deserialize)]
pub struct PopularResponse {
    pub queries: Vec<QueryCount>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, empty
    pub status: String,
    /// Index statistics
    pub index: IndexStats,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
