use std::sync::Arc;

use crate::dashboards::d500_kpi_overview::sessions::{SessionLimits, SessionStore};
use crate::shared::config::Config;
use crate::shared::kpi::MetricCatalog;

/// Shared by every handler through `State`.
#[derive(Clone)]
pub struct AppState {
    pub catalog: &'static MetricCatalog,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_limits(seed, SessionLimits::default())
    }

    pub fn with_limits(seed: Option<u64>, limits: SessionLimits) -> Self {
        Self {
            catalog: MetricCatalog::global(),
            sessions: Arc::new(SessionStore::with_limits(seed, limits)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let limits = SessionLimits {
            max_sessions: config.server.max_sessions,
            idle_timeout: chrono::Duration::minutes(config.server.session_idle_minutes),
        };
        Self::with_limits(config.dataset.seed, limits)
    }
}
