use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use contracts::dashboards::d500_kpi_overview::{
    DashboardEvent, DashboardView, ErrorResponse, SessionId, SessionResponse,
};
use contracts::shared::kpi::KpiCatalogResponse;

use crate::dashboards::d500_kpi_overview::sessions::DispatchError;
use crate::shared::kpi::KpiError;
use crate::state::AppState;

/// JSON error body with the status derived from the failure.
pub struct ApiError(DispatchError);

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            DispatchError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            DispatchError::Kpi(KpiError::UnknownKpi(_)) => StatusCode::NOT_FOUND,
            DispatchError::Kpi(KpiError::InvalidSelection(_)) => StatusCode::BAD_REQUEST,
            DispatchError::Kpi(KpiError::NoData(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("d500 request failed: {}", self.0);
        } else {
            tracing::warn!("d500 request rejected: {}", self.0);
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// GET /api/d500/kpi/catalog
pub async fn catalog(State(state): State<AppState>) -> Json<KpiCatalogResponse> {
    Json(state.catalog.to_response())
}

/// POST /api/d500/sessions
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let created = state.sessions.create().await;
    (StatusCode::CREATED, Json(created))
}

/// GET /api/d500/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<DashboardView>, ApiError> {
    Ok(Json(state.sessions.view(id).await?))
}

/// POST /api/d500/sessions/:id/events
pub async fn post_event(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(event): Json<DashboardEvent>,
) -> Result<Json<DashboardView>, ApiError> {
    Ok(Json(state.sessions.dispatch(id, event).await?))
}

/// DELETE /api/d500/sessions/:id
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> StatusCode {
    if state.sessions.remove(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::kpi::metadata::ids;
    use contracts::shared::kpi::{KpiId, Perspective};

    fn state() -> AppState {
        AppState::new(Some(5))
    }

    #[tokio::test]
    async fn test_catalog_lists_all_kpis() {
        let Json(resp) = catalog(State(state())).await;
        assert_eq!(resp.kpis.len(), 13);
        assert_eq!(resp.perspectives.len(), 4);
    }

    #[tokio::test]
    async fn test_session_roundtrip() {
        let state = state();
        let (status, Json(created)) = create_session(State(state.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created.session_id;

        let event = DashboardEvent::SelectKpi {
            perspective: Perspective::Financial,
            kpi_id: ids::revenue_vs_target(),
        };
        let Json(view) = post_event(State(state.clone()), Path(id), Json(event))
            .await
            .ok()
            .unwrap();
        assert!(view.groups[0].expanded.is_some());

        let Json(view) = get_session(State(state.clone()), Path(id)).await.ok().unwrap();
        assert!(view.groups[0].expanded.is_some());

        assert_eq!(
            delete_session(State(state.clone()), Path(id)).await,
            StatusCode::NO_CONTENT
        );
        assert_eq!(
            delete_session(State(state), Path(id)).await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_unknown_kpi_maps_to_404() {
        let state = state();
        let (_, Json(created)) = create_session(State(state.clone())).await;
        let event = DashboardEvent::SelectKpi {
            perspective: Perspective::Financial,
            kpi_id: KpiId::new("nonexistent_kpi"),
        };
        let Err(err) = post_event(State(state), Path(created.session_id), Json(event)).await
        else {
            panic!("expected an error");
        };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.0.to_string(), "metric not found: nonexistent_kpi");
    }

    #[tokio::test]
    async fn test_invalid_selection_maps_to_400() {
        let state = state();
        let (_, Json(created)) = create_session(State(state.clone())).await;
        let event = DashboardEvent::ChooseSubdivision {
            perspective: Perspective::Quality,
            subdivision: "ITS".to_string(),
        };
        let Err(err) = post_event(State(state), Path(created.session_id), Json(event)).await
        else {
            panic!("expected an error");
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_session_maps_to_404() {
        let Err(err) = get_session(State(state()), Path(SessionId::new_v4())).await else {
            panic!("expected an error");
        };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
