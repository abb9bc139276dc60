// HTTP request handlers
use crate::application::chart_service::{ParallelRequest, RadarRequest, ScatterRequest};
use crate::application::error::AnalysisError;
use crate::domain::chart::{ComparisonChart, ParallelChart, RadarChart, ScatterChart};
use crate::domain::session::SessionOverview;
use crate::domain::transform::AggregationMethod;
use crate::domain::variable::{parse_variable_list, registry, Variable, VariableDescriptor};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

type ApiResult<T> = Result<Json<T>, AnalysisError>;

#[derive(Debug, Default, Deserialize)]
pub struct ScatterQuery {
    pub x: Option<String>,
    pub y: Option<String>,
    pub z: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub max_points: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RadarQuery {
    #[serde(default)]
    pub variables: String,
    pub method: Option<AggregationMethod>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ParallelQuery {
    #[serde(default)]
    pub variables: String,
    pub max_points: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct VariableQuery {
    pub variable: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionPairQuery {
    pub a: String,
    pub b: String,
    pub variable: String,
}

fn optional_variable(key: Option<&str>) -> Result<Option<Variable>, AnalysisError> {
    match key.map(str::trim).filter(|k| !k.is_empty()) {
        Some(key) => Ok(Some(key.parse()?)),
        None => Ok(None),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Every chartable variable with its label, unit and color
pub async fn list_variables() -> Json<Vec<&'static VariableDescriptor>> {
    Json(registry().collect())
}

/// List recorded sessions, newest first
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> ApiResult<Vec<SessionOverview>> {
    let sessions = state.session_service.list_sessions().await?;
    Ok(Json(sessions))
}

pub async fn get_session(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<SessionOverview> {
    Ok(Json(state.session_service.get_session(&id).await?))
}

pub async fn scatter_chart(
    Path(id): Path<String>,
    Query(query): Query<ScatterQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<ScatterChart> {
    let request = ScatterRequest {
        x: optional_variable(query.x.as_deref())?,
        y: optional_variable(query.y.as_deref())?,
        z: optional_variable(query.z.as_deref())?,
        size: optional_variable(query.size.as_deref())?,
        color: optional_variable(query.color.as_deref())?,
        max_points: query.max_points,
    };
    Ok(Json(state.chart_service.scatter(&id, &request).await?))
}

pub async fn radar_chart(
    Path(id): Path<String>,
    Query(query): Query<RadarQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<RadarChart> {
    let request = RadarRequest {
        variables: parse_variable_list(&query.variables)?,
        method: query.method,
    };
    Ok(Json(state.chart_service.radar(&id, &request).await?))
}

pub async fn parallel_chart(
    Path(id): Path<String>,
    Query(query): Query<ParallelQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<ParallelChart> {
    let request = ParallelRequest {
        variables: parse_variable_list(&query.variables)?,
        max_points: query.max_points,
    };
    Ok(Json(state.chart_service.parallel(&id, &request).await?))
}

/// Model A against model B within one session
pub async fn compare_models(
    Path(id): Path<String>,
    Query(query): Query<VariableQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<ComparisonChart> {
    let variable: Variable = query.variable.trim().parse()?;
    Ok(Json(state.chart_service.compare_models(&id, variable).await?))
}

/// One variable across two whole sessions
pub async fn compare_sessions(
    Query(query): Query<SessionPairQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<ComparisonChart> {
    let variable: Variable = query.variable.trim().parse()?;
    let chart = state
        .chart_service
        .compare_sessions(&query.a, &query.b, variable)
        .await?;
    Ok(Json(chart))
}
