// =============================================================================
// Application State
// =============================================================================
//
// Shared across all handlers via `Arc<AppState>`. The bar store is loaded once
// at startup and only ever read afterwards, so no locking is needed.
// =============================================================================

use std::sync::Arc;
use std::time::Instant;

use crate::config::{RequestLimits, ServiceConfig};
use crate::store::BarStore;

pub struct AppState {
    pub config: ServiceConfig,
    pub store: Arc<dyn BarStore>,
    start_time: Instant,
}

impl AppState {
    pub fn new(config: ServiceConfig, store: Arc<dyn BarStore>) -> Self {
        Self {
            config,
            store,
            start_time: Instant::now(),
        }
    }

    pub fn limits(&self) -> RequestLimits {
        self.config.limits()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
