//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::api::error::{ApiError, ApiResult};
use crate::config::ApiConfig;
use crate::index::TemporalIndex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// The index, behind one coarse lock; the index itself is not synchronized
    pub index: Arc<RwLock<TemporalIndex>>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state around an already populated index
    pub fn new(index: TemporalIndex, config: ApiConfig) -> Self {
        Self {
            index: Arc::new(RwLock::new(index)),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Run a read-only query against the index under the request deadline
    ///
    /// The query runs on the blocking pool holding an owned read guard, so the
    /// deadline covers both waiting for the lock and the query itself.
    pub async fn read_index<T, F>(&self, query: F) -> ApiResult<T>
    where
        F: FnOnce(&TemporalIndex) -> T + Send + 'static,
        T: Send + 'static,
    {
        let deadline = Duration::from_secs(self.config.request_timeout_secs);
        let index = Arc::clone(&self.index);

        let task = async move {
            let guard = index.read_owned().await;
            tokio::task::spawn_blocking(move || query(&*guard)).await
        };

        match tokio::time::timeout(deadline, task).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(ApiError::Internal(format!("Query task failed: {}", e))),
            Err(_) => Err(ApiError::Timeout(format!("query exceeded {:?}", deadline))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_timeout(secs: u64) -> AppState {
        let config = ApiConfig {
            request_timeout_secs: secs,
            ..ApiConfig::default()
        };
        AppState::new(TemporalIndex::new(), config)
    }

    #[tokio::test]
    async fn test_read_index_returns_query_result() {
        let state = state_with_timeout(30);
        let records = state.read_index(|index| index.records()).await.unwrap();
        assert_eq!(records, 0);
    }

    #[tokio::test]
    async fn test_slow_query_hits_deadline() {
        let state = state_with_timeout(0);
        let err = state
            .read_index(|_| std::thread::sleep(Duration::from_millis(300)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_deadline_covers_lock_wait() {
        let state = state_with_timeout(0);
        let _writer = state.index.write().await;

        let err = state.read_index(|index| index.records()).await.unwrap_err();
        assert!(matches!(err, ApiError::Timeout(_)));
    }
}
