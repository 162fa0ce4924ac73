use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::handlers;
use crate::state::AppState;
use crate::system::middleware::request_logger;

/// All HTTP routes plus the static fallback.
pub fn configure_routes(state: AppState, static_dir: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // D500 KPI OVERVIEW
        // ========================================
        .route(
            "/api/d500/kpi/catalog",
            get(handlers::d500_kpi_overview::catalog),
        )
        .route(
            "/api/d500/sessions",
            post(handlers::d500_kpi_overview::create_session),
        )
        .route(
            "/api/d500/sessions/:id",
            get(handlers::d500_kpi_overview::get_session)
                .delete(handlers::d500_kpi_overview::delete_session),
        )
        .route(
            "/api/d500/sessions/:id/events",
            post(handlers::d500_kpi_overview::post_event),
        )
        .fallback_service(ServeDir::new(static_dir))
        .layer(middleware::from_fn(request_logger))
        .layer(cors)
        .with_state(state)
}
