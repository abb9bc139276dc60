// Route table for the analysis API
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    compare_models, compare_sessions, get_session, health_check, list_sessions, list_variables,
    parallel_chart, radar_chart, scatter_chart,
};
use axum::{routing::get, Router};
use std::sync::Arc;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/variables", get(list_variables))
        .route("/sessions", get(list_sessions))
        .route("/sessions/:id", get(get_session))
        .route("/sessions/:id/scatter", get(scatter_chart))
        .route("/sessions/:id/radar", get(radar_chart))
        .route("/sessions/:id/parallel", get(parallel_chart))
        .route("/sessions/:id/compare", get(compare_models))
        .route("/compare", get(compare_sessions))
        .with_state(state)
}
