// Chart descriptor domain models handed to the plotting front end
use super::telemetry::{ModelTag, TelemetryPoint};
use super::transform::{min_max, AggregationMethod, AlignedSeries};
use super::variable::Variable;
use chrono::DateTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub title: String,
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
}

impl AxisInfo {
    pub fn new(variable: Variable) -> Self {
        let descriptor = variable.descriptor();
        Self {
            key: descriptor.key,
            label: descriptor.label,
            unit: descriptor.unit,
            title: descriptor.axis_title(),
            color: descriptor.color,
            range: None,
        }
    }

    pub fn with_range_of(mut self, values: &[f64]) -> Self {
        self.range = min_max(values).map(|(lo, hi)| [lo, hi]);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    /// Position of the source point within its session
    pub index: usize,
    pub timestamp_ms: u64,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<f64>,
    pub hover: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub id: String,
    pub name: String,
    pub model: Option<ModelTag>,
    pub color: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterChart {
    pub title: String,
    pub x: AxisInfo,
    pub y: AxisInfo,
    pub z: Option<AxisInfo>,
    pub size: Option<AxisInfo>,
    pub color: Option<AxisInfo>,
    pub traces: Vec<Trace>,
    pub valid_points: usize,
    pub shown_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarSeries {
    pub model: ModelTag,
    pub name: String,
    pub color: &'static str,
    /// Aggregated normalized values, one per axis
    pub values: Vec<f64>,
    /// Aggregated raw values, one per axis, for tooltips
    pub raw_values: Vec<f64>,
    pub hover: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarChart {
    pub title: String,
    pub method: AggregationMethod,
    pub axes: Vec<AxisInfo>,
    pub series: Vec<RadarSeries>,
    pub valid_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    #[serde(flatten)]
    pub axis: AxisInfo,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallelChart {
    pub title: String,
    pub dimensions: Vec<Dimension>,
    /// Source point index of each line
    pub indices: Vec<usize>,
    /// Model of each line, for line colouring
    pub models: Vec<Option<ModelTag>>,
    pub valid_points: usize,
    pub shown_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonChart {
    pub title: String,
    pub variable: AxisInfo,
    pub series_a_name: String,
    pub series_b_name: String,
    #[serde(flatten)]
    pub aligned: AlignedSeries,
}

/// Tooltip for one plotted point: a `Label: value unit` line per variable,
/// the model name when tagged, then the wall-clock time of the sample.
pub fn hover_text(
    point: &TelemetryPoint,
    values: &[(Variable, f64)],
    model_name: Option<&str>,
) -> String {
    let mut lines: Vec<String> = values
        .iter()
        .map(|(variable, value)| {
            let descriptor = variable.descriptor();
            format!("{}: {}", descriptor.label, descriptor.format_value(*value))
        })
        .collect();

    if let Some(name) = model_name {
        lines.push(format!("Model: {}", name));
    }
    lines.push(format!("Time: {}", format_time(point.timestamp_ms)));

    lines.join("<br>")
}

fn format_time(timestamp_ms: u64) -> String {
    i64::try_from(timestamp_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hover_text() {
        // 2023-11-14T22:13:20Z
        let point = TelemetryPoint::new(1_700_000_000_000);
        let text = hover_text(
            &point,
            &[(Variable::CpuPower, 12.346), (Variable::GpuTemp, 61.04)],
            Some("Model A"),
        );
        assert_eq!(
            text,
            "CPU Power: 12.35 W<br>GPU Temp: 61.0 °C<br>Model: Model A<br>Time: 22:13:20"
        );
    }

    #[test]
    fn test_hover_text_untagged() {
        let text = hover_text(&TelemetryPoint::new(0), &[(Variable::TokensPerSecond, 40.0)], None);
        assert_eq!(text, "Tokens/s: 40.00 tok/s<br>Time: 00:00:00");
    }

    #[test]
    fn test_axis_range() {
        let axis = AxisInfo::new(Variable::RamUsage).with_range_of(&[3.0, 1.5, 8.25]);
        assert_eq!(axis.range, Some([1.5, 8.25]));
        assert_eq!(axis.title, "RAM Usage (GB)");
        assert_eq!(AxisInfo::new(Variable::RamUsage).with_range_of(&[]).range, None);
    }
}
