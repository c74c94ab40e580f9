/// Shared application state
use cadence_core::ordering::RebalancePolicy;
use cadence_storage::OrderingService;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub ordering: Arc<OrderingService>,
}

impl AppState {
    pub fn new(pool: SqlitePool, policy: RebalancePolicy, max_attempts: u32) -> Self {
        let ordering = OrderingService::new(pool.clone(), policy).with_max_attempts(max_attempts);

        Self {
            pool,
            ordering: Arc::new(ordering),
        }
    }
}
