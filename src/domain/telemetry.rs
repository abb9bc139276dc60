// Telemetry data domain models
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Which of the two compared models produced a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelTag {
    A,
    B,
}

impl ModelTag {
    pub const ALL: [ModelTag; 2] = [ModelTag::A, ModelTag::B];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTag::A => "A",
            ModelTag::B => "B",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ModelTag::A => "#3b82f6",
            ModelTag::B => "#ef4444",
        }
    }
}

impl fmt::Display for ModelTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timestamped telemetry sample as written by the recorder.
///
/// Every metric is optional: samplers come and go during a run and older
/// recordings lack the per-core fields entirely. The timestamp is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPoint {
    pub timestamp_ms: u64,
    #[serde(default, deserialize_with = "lenient_model_tag")]
    pub model: Option<ModelTag>,

    pub cpu_power_watts: Option<f64>,
    pub gpu_power_watts: Option<f64>,
    pub ane_power_watts: Option<f64>,

    // Legacy single-sensor readings, superseded by the *_avg fields
    pub cpu_temp_celsius: Option<f64>,
    pub gpu_temp_celsius: Option<f64>,
    pub cpu_temp_avg: Option<f64>,
    pub cpu_temp_max: Option<f64>,
    pub gpu_temp_avg: Option<f64>,
    pub gpu_temp_max: Option<f64>,
    pub battery_temp_avg: Option<f64>,
    pub cpu_p_core_temps: Option<Vec<f64>>,
    pub cpu_e_core_temps: Option<Vec<f64>>,
    pub gpu_cluster_temps: Option<Vec<f64>>,

    pub cpu_freq_mhz: Option<f64>,
    pub gpu_freq_mhz: Option<f64>,
    pub ram_usage_gb: Option<f64>,

    pub cpu_overall_utilization: Option<f64>,
    pub cpu_p_core_utilization: Option<Vec<f64>>,
    pub cpu_e_core_utilization: Option<Vec<f64>>,

    pub ttft_ms: Option<f64>,
    pub current_tps: Option<f64>,
    pub instantaneous_tps: Option<f64>,
    pub generation_time_ms: Option<f64>,

    pub total_energy_wh: Option<f64>,
    pub cpu_energy_wh: Option<f64>,
    pub gpu_energy_wh: Option<f64>,
    pub ane_energy_wh: Option<f64>,
    pub energy_rate_wh_per_token: Option<f64>,
}

impl TelemetryPoint {
    pub fn new(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            ..Default::default()
        }
    }

    /// Sum of the instantaneous power readings that are present.
    pub fn total_power_watts(&self) -> Option<f64> {
        let readings = [self.cpu_power_watts, self.gpu_power_watts, self.ane_power_watts];
        let present: Vec<f64> = readings.into_iter().flatten().filter(|v| v.is_finite()).collect();
        if present.is_empty() {
            None
        } else {
            Some(present.iter().sum())
        }
    }
}

/// Recorders tag samples with free-form strings; anything other than the two
/// compared models is treated as untagged instead of failing the session.
fn lenient_model_tag<'de, D>(deserializer: D) -> Result<Option<ModelTag>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.trim() {
        "A" | "a" => Some(ModelTag::A),
        "B" | "b" => Some(ModelTag::B),
        _ => None,
    }))
}

/// Mean of a per-core array; absent when the array is missing or empty.
pub(crate) fn core_mean(values: Option<&[f64]>) -> Option<f64> {
    let values = values?;
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
