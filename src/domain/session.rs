// Session domain model - one recorded comparison run
use super::energy::{EnergyIntegrator, EnergySummary};
use super::telemetry::{ModelTag, TelemetryPoint};
use super::transform::align::{SampledSeries, TimedSample};
use super::variable::Variable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: Option<String>,
    pub output_tokens: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    #[serde(default)]
    pub model_a: ModelInfo,
    #[serde(default)]
    pub model_b: ModelInfo,
}

impl ModelMetadata {
    pub fn get(&self, model: ModelTag) -> &ModelInfo {
        match model {
            ModelTag::A => &self.model_a,
            ModelTag::B => &self.model_b,
        }
    }

    /// Display name, e.g. "Llama 3 8B" or "Model A" when unnamed.
    pub fn display_name(&self, model: ModelTag) -> String {
        self.get(model)
            .name
            .clone()
            .unwrap_or_else(|| format!("Model {}", model))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelPerformance {
    pub sample_count: usize,
    pub average_tps: Option<f64>,
    pub peak_tps: Option<f64>,
    pub ttft_ms: Option<f64>,
    pub generation_time_ms: Option<f64>,
    pub energy: EnergySummary,
}

/// Stored summaries may come from older recorders; missing fields default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSummary {
    pub duration_secs: f64,
    pub average_tps: Option<f64>,
    pub peak_temperature: Option<f64>,
    pub model_a: Option<ModelPerformance>,
    pub model_b: Option<ModelPerformance>,
}

impl SessionSummary {
    pub fn from_points(points: &[TelemetryPoint], models: &ModelMetadata) -> Self {
        let average_tps = mean(points.iter().filter_map(|p| Variable::TokensPerSecond.extract(p)));
        let peak_temperature = points
            .iter()
            .flat_map(|p| {
                [Variable::CpuTemp, Variable::CpuTempMax, Variable::GpuTemp, Variable::GpuTempMax]
                    .map(|v| v.extract(p))
            })
            .flatten()
            .reduce(f64::max);

        Self {
            duration_secs: span_secs(points),
            average_tps,
            peak_temperature,
            model_a: ModelPerformance::from_points(points, ModelTag::A, models),
            model_b: ModelPerformance::from_points(points, ModelTag::B, models),
        }
    }

    pub fn model(&self, model: ModelTag) -> Option<&ModelPerformance> {
        match model {
            ModelTag::A => self.model_a.as_ref(),
            ModelTag::B => self.model_b.as_ref(),
        }
    }
}

impl ModelPerformance {
    /// Performance of the points tagged `model`; `None` when it never ran.
    pub fn from_points(
        points: &[TelemetryPoint],
        model: ModelTag,
        models: &ModelMetadata,
    ) -> Option<Self> {
        let tagged: Vec<&TelemetryPoint> =
            points.iter().filter(|p| p.model == Some(model)).collect();
        if tagged.is_empty() {
            return None;
        }

        let tps: Vec<f64> = tagged
            .iter()
            .filter_map(|p| Variable::TokensPerSecond.extract(p))
            .collect();
        let energy = EnergyIntegrator::from_points(tagged.iter().copied())
            .summary(models.get(model).output_tokens);

        Some(Self {
            sample_count: tagged.len(),
            average_tps: mean(tps.iter().copied()),
            peak_tps: tps.iter().copied().reduce(f64::max),
            ttft_ms: last_present(&tagged, |p| p.ttft_ms),
            generation_time_ms: last_present(&tagged, |p| p.generation_time_ms),
            energy,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySession {
    pub id: String,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub points: Vec<TelemetryPoint>,
    pub summary: SessionSummary,
    pub models: ModelMetadata,
}

impl TelemetrySession {
    /// Build a session, computing the summary when the recording has none.
    pub fn new(
        id: String,
        name: String,
        created_at: Option<DateTime<Utc>>,
        points: Vec<TelemetryPoint>,
        summary: Option<SessionSummary>,
        models: ModelMetadata,
    ) -> Self {
        let summary = summary.unwrap_or_else(|| SessionSummary::from_points(&points, &models));
        Self {
            id,
            name,
            created_at,
            points,
            summary,
            models,
        }
    }

    pub fn points_for(&self, model: ModelTag) -> Vec<TelemetryPoint> {
        self.points
            .iter()
            .filter(|p| p.model == Some(model))
            .cloned()
            .collect()
    }

    /// The whole session as one series of `variable`, timed from its first
    /// sample and spanning the session duration. A stored duration that is
    /// missing or unusable falls back to the span of the points.
    pub fn sampled_series(&self, variable: Variable) -> SampledSeries {
        let mut series = sampled_series(&self.points, variable);
        let stored = self.summary.duration_secs;
        if stored.is_finite() && stored > 0.0 {
            series.duration_secs = stored;
        }
        series
    }
}

/// What a session listing shows without shipping every point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOverview {
    pub id: String,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub point_count: usize,
    pub models: ModelMetadata,
    pub summary: SessionSummary,
}

impl From<&TelemetrySession> for SessionOverview {
    fn from(session: &TelemetrySession) -> Self {
        Self {
            id: session.id.clone(),
            name: session.name.clone(),
            created_at: session.created_at,
            point_count: session.points.len(),
            models: session.models.clone(),
            summary: session.summary.clone(),
        }
    }
}

/// `variable` over `points`, timed from the first point. Absent readings are
/// kept as absent samples.
pub fn sampled_series(points: &[TelemetryPoint], variable: Variable) -> SampledSeries {
    let Some(start) = points.first().map(|p| p.timestamp_ms) else {
        return SampledSeries::default();
    };

    let samples = points
        .iter()
        .map(|p| {
            let time_secs = (p.timestamp_ms as f64 - start as f64) / 1000.0;
            TimedSample::new(time_secs, variable.extract(p))
        })
        .collect();

    SampledSeries::new(span_secs(points), samples)
}

fn span_secs(points: &[TelemetryPoint]) -> f64 {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) => {
            last.timestamp_ms.saturating_sub(first.timestamp_ms) as f64 / 1000.0
        }
        _ => 0.0,
    }
}

/// Latest finite reading of a field, scanning back from the end.
fn last_present(
    points: &[&TelemetryPoint],
    field: impl Fn(&TelemetryPoint) -> Option<f64>,
) -> Option<f64> {
    points.iter().rev().find_map(|p| field(p).filter(|v| v.is_finite()))
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(
        timestamp_ms: u64,
        model: Option<ModelTag>,
        tps: Option<f64>,
        cpu_temp: Option<f64>,
    ) -> TelemetryPoint {
        let mut point = TelemetryPoint::new(timestamp_ms);
        point.model = model;
        point.current_tps = tps;
        point.cpu_temp_avg = cpu_temp;
        point.cpu_power_watts = Some(10.0);
        point
    }

    fn points() -> Vec<TelemetryPoint> {
        vec![
            point(1_000, None, None, Some(40.0)),
            point(2_000, Some(ModelTag::A), Some(20.0), Some(55.0)),
            point(3_000, Some(ModelTag::A), Some(30.0), Some(60.0)),
            point(4_000, Some(ModelTag::B), Some(10.0), Some(72.5)),
            point(6_000, Some(ModelTag::B), None, Some(65.0)),
        ]
    }

    #[test]
    fn test_summary_from_points() {
        let summary = SessionSummary::from_points(&points(), &ModelMetadata::default());

        assert_eq!(summary.duration_secs, 5.0);
        assert_eq!(summary.average_tps, Some(20.0));
        assert_eq!(summary.peak_temperature, Some(72.5));

        let a = summary.model(ModelTag::A).unwrap();
        assert_eq!(a.sample_count, 2);
        assert_eq!(a.average_tps, Some(25.0));
        assert_eq!(a.peak_tps, Some(30.0));
        assert_eq!(a.energy.duration_seconds, 1.0);

        let b = summary.model(ModelTag::B).unwrap();
        assert_eq!(b.sample_count, 2);
        assert_eq!(b.average_tps, Some(10.0));
    }

    #[test]
    fn test_model_without_samples_has_no_performance() {
        let only_a: Vec<TelemetryPoint> = points()
            .into_iter()
            .filter(|p| p.model != Some(ModelTag::B))
            .collect();
        let summary = SessionSummary::from_points(&only_a, &ModelMetadata::default());
        assert!(summary.model_b.is_none());
    }

    #[test]
    fn test_energy_per_token_uses_output_tokens() {
        let models = ModelMetadata {
            model_a: ModelInfo {
                name: Some("Qwen".to_string()),
                output_tokens: Some(10),
            },
            model_b: ModelInfo::default(),
        };
        let summary = SessionSummary::from_points(&points(), &models);

        let a = summary.model_a.unwrap();
        assert!(a.energy.energy_per_token_wh.is_some());
        assert_eq!(summary.model_b.unwrap().energy.energy_per_token_wh, None);
        assert_eq!(models.display_name(ModelTag::A), "Qwen");
        assert_eq!(models.display_name(ModelTag::B), "Model B");
    }

    #[test]
    fn test_stored_summary_is_kept() {
        let stored = SessionSummary {
            duration_secs: 99.0,
            ..Default::default()
        };
        let session = TelemetrySession::new(
            "s1".to_string(),
            "Run".to_string(),
            None,
            points(),
            Some(stored.clone()),
            ModelMetadata::default(),
        );
        assert_eq!(session.summary, stored);
        assert_eq!(session.sampled_series(Variable::CpuTemp).duration_secs, 99.0);
    }

    #[test]
    fn test_unusable_stored_duration_falls_back_to_point_span() {
        for duration in [0.0, -4.0, f64::NAN] {
            let stored = SessionSummary {
                duration_secs: duration,
                ..Default::default()
            };
            let session = TelemetrySession::new(
                "s1".to_string(),
                "Run".to_string(),
                None,
                points(),
                Some(stored),
                ModelMetadata::default(),
            );
            assert_eq!(session.sampled_series(Variable::CpuTemp).duration_secs, 5.0);
        }
    }

    #[test]
    fn test_partial_stored_summary_deserializes() {
        let summary: SessionSummary = serde_json::from_str(
            r#"{"duration": 5.0, "averageTps": 3.0, "modelA": {"sampleCount": 4, "energy": {}}}"#,
        )
        .unwrap();
        assert_eq!(summary.duration_secs, 0.0);
        assert_eq!(summary.average_tps, Some(3.0));
        let a = summary.model_a.unwrap();
        assert_eq!(a.sample_count, 4);
        assert_eq!(a.energy, EnergySummary::default());
    }

    #[test]
    fn test_sampled_series_relative_times() {
        let series = sampled_series(&points(), Variable::TokensPerSecond);
        assert_eq!(series.duration_secs, 5.0);
        let times: Vec<f64> = series.samples.iter().map(|s| s.time_secs).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0, 3.0, 5.0]);
        assert_eq!(series.samples[0].value, None);
        assert_eq!(series.samples[1].value, Some(20.0));

        assert_eq!(sampled_series(&[], Variable::CpuPower), SampledSeries::default());
    }
}
