// Chart service - Use case for building chart descriptors over sessions
use crate::application::error::AnalysisError;
use crate::application::session_repository::SessionRepository;
use crate::domain::chart::{
    hover_text, AxisInfo, ChartPoint, ComparisonChart, Dimension, ParallelChart, RadarChart,
    RadarSeries, ScatterChart, Trace,
};
use crate::domain::session::{sampled_series, TelemetrySession};
use crate::domain::telemetry::ModelTag;
use crate::domain::transform::{
    aggregate, align_within, filter_valid, grid_len, normalize, subsample, AggregationMethod,
    AlignedSeries, SampledSeries,
};
use crate::domain::variable::{Variable, VariableDescriptor};
use crate::infrastructure::config::ChartSettings;
use std::sync::Arc;

pub const RADAR_MIN_VARIABLES: usize = 3;
pub const PARALLEL_MIN_VARIABLES: usize = 2;
pub const SCATTER_MIN_VARIABLES: usize = 2;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScatterRequest {
    pub x: Option<Variable>,
    pub y: Option<Variable>,
    pub z: Option<Variable>,
    pub size: Option<Variable>,
    pub color: Option<Variable>,
    pub max_points: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadarRequest {
    pub variables: Vec<Variable>,
    pub method: Option<AggregationMethod>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParallelRequest {
    pub variables: Vec<Variable>,
    pub max_points: Option<usize>,
}

#[derive(Clone)]
pub struct ChartService {
    repository: Arc<dyn SessionRepository>,
    settings: ChartSettings,
}

impl ChartService {
    pub fn new(repository: Arc<dyn SessionRepository>, settings: ChartSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    pub async fn scatter(
        &self,
        session_id: &str,
        request: &ScatterRequest,
    ) -> Result<ScatterChart, AnalysisError> {
        let session = self.load(session_id).await?;
        let max_points = request.max_points.unwrap_or(self.settings.max_points);
        build_scatter(&session, request, max_points)
    }

    pub async fn radar(
        &self,
        session_id: &str,
        request: &RadarRequest,
    ) -> Result<RadarChart, AnalysisError> {
        let session = self.load(session_id).await?;
        let method = request.method.unwrap_or(self.settings.aggregation);
        build_radar(&session, &request.variables, method)
    }

    pub async fn parallel(
        &self,
        session_id: &str,
        request: &ParallelRequest,
    ) -> Result<ParallelChart, AnalysisError> {
        let session = self.load(session_id).await?;
        let max_points = request.max_points.unwrap_or(self.settings.max_points);
        build_parallel(&session, &request.variables, max_points)
    }

    pub async fn compare_models(
        &self,
        session_id: &str,
        variable: Variable,
    ) -> Result<ComparisonChart, AnalysisError> {
        let session = self.load(session_id).await?;
        build_model_comparison(&session, variable, self.settings.max_align_points)
    }

    pub async fn compare_sessions(
        &self,
        session_a: &str,
        session_b: &str,
        variable: Variable,
    ) -> Result<ComparisonChart, AnalysisError> {
        let a = self.load(session_a).await?;
        let b = self.load(session_b).await?;
        build_session_comparison(&a, &b, variable, self.settings.max_align_points)
    }

    async fn load(&self, session_id: &str) -> Result<TelemetrySession, AnalysisError> {
        let session = self
            .repository
            .get_session(session_id)
            .await?
            .ok_or_else(|| AnalysisError::SessionNotFound(session_id.to_string()))?;

        tracing::debug!(
            "Loaded session {} ({} points) for charting",
            session.id,
            session.points.len()
        );
        Ok(session)
    }
}

fn require(chart: &'static str, required: usize, provided: usize) -> Result<(), AnalysisError> {
    if provided < required {
        return Err(AnalysisError::InsufficientVariables {
            chart,
            required,
            provided,
        });
    }
    Ok(())
}

/// Selected variables without repeats, first occurrence wins.
fn distinct(variables: impl IntoIterator<Item = Variable>) -> Vec<Variable> {
    let mut seen = Vec::new();
    for variable in variables {
        if !seen.contains(&variable) {
            seen.push(variable);
        }
    }
    seen
}

fn trace_key(model: Option<ModelTag>) -> (String, String) {
    match model {
        Some(tag) => (format!("model-{}", tag.as_str().to_lowercase()), tag.color().to_string()),
        None => ("untagged".to_string(), "#9ca3af".to_string()),
    }
}

pub fn build_scatter(
    session: &TelemetrySession,
    request: &ScatterRequest,
    max_points: usize,
) -> Result<ScatterChart, AnalysisError> {
    let (x, y) = match (request.x, request.y) {
        (Some(x), Some(y)) => (x, y),
        (x, y) => {
            let provided = usize::from(x.is_some()) + usize::from(y.is_some());
            return Err(AnalysisError::InsufficientVariables {
                chart: "scatter",
                required: SCATTER_MIN_VARIABLES,
                provided,
            });
        }
    };

    let selected = distinct(
        [Some(x), Some(y), request.z, request.size, request.color]
            .into_iter()
            .flatten(),
    );
    let valid = filter_valid(&session.points, &selected);
    let rows: Vec<usize> = (0..valid.len()).collect();
    let shown = subsample(&rows, max_points);

    tracing::debug!(
        "Scatter {} vs {} on {}: {} valid, {} shown",
        y,
        x,
        session.id,
        valid.len(),
        shown.len()
    );

    let axis = |variable: Variable| AxisInfo::new(variable).with_range_of(valid.values(&variable));
    let mut traces: Vec<Trace> = [Some(ModelTag::A), Some(ModelTag::B), None]
        .into_iter()
        .map(|model| {
            let (id, color) = trace_key(model);
            let name = model
                .map(|tag| session.models.display_name(tag))
                .unwrap_or_else(|| "Untagged".to_string());
            Trace {
                id,
                name,
                model,
                color,
                points: Vec::new(),
            }
        })
        .collect();

    for &row in &shown {
        let index = valid.indices[row];
        let point = &session.points[index];
        let value = |variable: Variable| valid.value_at(&variable, row);
        let hover_values: Vec<(Variable, f64)> = selected
            .iter()
            .filter_map(|&v| value(v).map(|val| (v, val)))
            .collect();
        let model_name = point.model.map(|tag| session.models.display_name(tag));

        let chart_point = ChartPoint {
            index,
            timestamp_ms: point.timestamp_ms,
            x: value(x).unwrap_or_default(),
            y: value(y).unwrap_or_default(),
            z: request.z.and_then(value),
            size: request.size.and_then(value),
            color: request.color.and_then(value),
            hover: hover_text(point, &hover_values, model_name.as_deref()),
        };

        let slot = match point.model {
            Some(ModelTag::A) => 0,
            Some(ModelTag::B) => 1,
            None => 2,
        };
        traces[slot].points.push(chart_point);
    }
    traces.retain(|t| !t.points.is_empty());

    Ok(ScatterChart {
        title: format!("{} vs {}", y.descriptor().label, x.descriptor().label),
        x: axis(x),
        y: axis(y),
        z: request.z.map(axis),
        size: request.size.map(axis),
        color: request.color.map(axis),
        traces,
        valid_points: valid.len(),
        shown_points: shown.len(),
    })
}

/// Radar over the jointly valid points: each variable is normalized across
/// the whole session, then reduced per model.
pub fn build_radar(
    session: &TelemetrySession,
    variables: &[Variable],
    method: AggregationMethod,
) -> Result<RadarChart, AnalysisError> {
    let variables = distinct(variables.iter().copied());
    require("radar", RADAR_MIN_VARIABLES, variables.len())?;

    let valid = filter_valid(&session.points, &variables);
    let normalized: Vec<Vec<f64>> = variables.iter().map(|v| normalize(valid.values(v))).collect();

    let mut series = Vec::new();
    for model in ModelTag::ALL {
        let rows: Vec<usize> = valid
            .indices
            .iter()
            .enumerate()
            .filter(|(_, index)| session.points[**index].model == Some(model))
            .map(|(row, _)| row)
            .collect();
        if rows.is_empty() {
            continue;
        }

        let pick = |column: &[f64]| -> Vec<f64> { rows.iter().map(|&row| column[row]).collect() };
        let values: Vec<f64> = normalized
            .iter()
            .map(|column| aggregate(&pick(column.as_slice()), method))
            .collect();
        let raw_values: Vec<f64> = variables
            .iter()
            .map(|v| aggregate(&pick(valid.values(v)), method))
            .collect();
        let hover = variables
            .iter()
            .zip(&raw_values)
            .map(|(v, raw)| radar_hover(v.descriptor(), *raw, method))
            .collect();

        series.push(RadarSeries {
            model,
            name: session.models.display_name(model),
            color: model.color(),
            values,
            raw_values,
            hover,
        });
    }

    if series.is_empty() {
        tracing::warn!("Session {} has no model-tagged points valid for radar", session.id);
    }

    Ok(RadarChart {
        title: format!("Model comparison ({})", method),
        method,
        axes: variables
            .iter()
            .map(|&v| AxisInfo::new(v).with_range_of(valid.values(&v)))
            .collect(),
        series,
        valid_points: valid.len(),
    })
}

fn radar_hover(descriptor: &VariableDescriptor, raw: f64, method: AggregationMethod) -> String {
    format!("{} ({}): {}", descriptor.label, method, descriptor.format_value(raw))
}

pub fn build_parallel(
    session: &TelemetrySession,
    variables: &[Variable],
    max_points: usize,
) -> Result<ParallelChart, AnalysisError> {
    let variables = distinct(variables.iter().copied());
    require("parallel coordinates", PARALLEL_MIN_VARIABLES, variables.len())?;

    let valid = filter_valid(&session.points, &variables);
    let rows: Vec<usize> = (0..valid.len()).collect();
    let shown = subsample(&rows, max_points);

    let dimensions = variables
        .iter()
        .map(|&variable| {
            let column = valid.values(&variable);
            Dimension {
                axis: AxisInfo::new(variable).with_range_of(column),
                values: shown.iter().map(|&row| column[row]).collect(),
            }
        })
        .collect();
    let indices: Vec<usize> = shown.iter().map(|&row| valid.indices[row]).collect();
    let models = indices.iter().map(|&index| session.points[index].model).collect();

    Ok(ParallelChart {
        title: format!("{} variables across {}", variables.len(), session.name),
        dimensions,
        indices,
        models,
        valid_points: valid.len(),
        shown_points: shown.len(),
    })
}

/// Model A against model B of one session, each timed from its own first
/// sample.
pub fn build_model_comparison(
    session: &TelemetrySession,
    variable: Variable,
    max_align_points: usize,
) -> Result<ComparisonChart, AnalysisError> {
    let a = sampled_series(&session.points_for(ModelTag::A), variable);
    let b = sampled_series(&session.points_for(ModelTag::B), variable);

    Ok(ComparisonChart {
        title: format!("{}: model A vs model B", variable.descriptor().label),
        variable: AxisInfo::new(variable),
        series_a_name: session.models.display_name(ModelTag::A),
        series_b_name: session.models.display_name(ModelTag::B),
        aligned: bounded_align(&a, &b, max_align_points)?,
    })
}

pub fn build_session_comparison(
    a: &TelemetrySession,
    b: &TelemetrySession,
    variable: Variable,
    max_align_points: usize,
) -> Result<ComparisonChart, AnalysisError> {
    let series_a = a.sampled_series(variable);
    let series_b = b.sampled_series(variable);

    Ok(ComparisonChart {
        title: format!("{}: {} vs {}", variable.descriptor().label, a.name, b.name),
        variable: AxisInfo::new(variable),
        series_a_name: a.name.clone(),
        series_b_name: b.name.clone(),
        aligned: bounded_align(&series_a, &series_b, max_align_points)?,
    })
}

fn bounded_align(
    a: &SampledSeries,
    b: &SampledSeries,
    limit: usize,
) -> Result<AlignedSeries, AnalysisError> {
    let points = grid_len(a, b);
    if points > limit {
        return Err(AnalysisError::AlignmentTooLong { points, limit });
    }
    Ok(align_within(a, b, limit))
}
