use chrono::{DateTime, Duration, Utc};
use contracts::dashboards::d500_kpi_overview::{
    DashboardEvent, DashboardView, SessionId, SessionResponse,
};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;

use super::dataset::SyntheticDataset;
use super::session::SessionController;
use crate::shared::kpi::KpiError;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),
    #[error(transparent)]
    Kpi(#[from] KpiError),
}

/// Bounds on how many sessions are kept and for how long.
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub max_sessions: usize,
    pub idle_timeout: Duration,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_sessions: 1000,
            idle_timeout: Duration::minutes(30),
        }
    }
}

struct SessionEntry {
    controller: SessionController,
    last_seen: DateTime<Utc>,
}

/// Open dashboard sessions, one controller each.
///
/// Idle and surplus sessions are evicted whenever a new one is created.
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, SessionEntry>>,
    seed: Option<u64>,
    limits: SessionLimits,
}

impl SessionStore {
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_limits(seed, SessionLimits::default())
    }

    pub fn with_limits(seed: Option<u64>, limits: SessionLimits) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            seed,
            limits,
        }
    }

    pub async fn create(&self) -> SessionResponse {
        let mut controller = SessionController::new(Box::new(SyntheticDataset::new(self.seed)));
        let view = controller.render();
        let session_id = SessionId::new_v4();
        let now = Utc::now();

        let mut sessions = self.sessions.lock().await;
        evict(&mut sessions, &self.limits, now);
        sessions.insert(
            session_id,
            SessionEntry {
                controller,
                last_seen: now,
            },
        );
        tracing::info!("session {session_id} opened ({} open)", sessions.len());

        SessionResponse { session_id, view }
    }

    pub async fn view(&self, id: SessionId) -> Result<DashboardView, DispatchError> {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions
            .get_mut(&id)
            .ok_or(DispatchError::SessionNotFound(id))?;
        entry.last_seen = Utc::now();
        Ok(entry.controller.render())
    }

    pub async fn dispatch(
        &self,
        id: SessionId,
        event: DashboardEvent,
    ) -> Result<DashboardView, DispatchError> {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions
            .get_mut(&id)
            .ok_or(DispatchError::SessionNotFound(id))?;
        entry.last_seen = Utc::now();
        Ok(entry.controller.handle(event)?)
    }

    /// Returns false when the session did not exist.
    pub async fn remove(&self, id: SessionId) -> bool {
        let removed = self.sessions.lock().await.remove(&id).is_some();
        if removed {
            tracing::info!("session {id} closed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// Drop idle sessions, then the least recently used ones until one more fits.
fn evict(sessions: &mut HashMap<SessionId, SessionEntry>, limits: &SessionLimits, now: DateTime<Utc>) {
    let before = sessions.len();
    sessions.retain(|_, e| now - e.last_seen <= limits.idle_timeout);

    let cap = limits.max_sessions.max(1);
    while sessions.len() >= cap {
        let oldest = sessions
            .iter()
            .min_by_key(|(_, e)| e.last_seen)
            .map(|(id, _)| *id);
        match oldest {
            Some(id) => {
                sessions.remove(&id);
            }
            None => break,
        }
    }

    let evicted = before - sessions.len();
    if evicted > 0 {
        tracing::info!("evicted {evicted} dashboard session(s)");
    }
}
