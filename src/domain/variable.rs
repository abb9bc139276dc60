// Variable registry - the metrics a chart axis can be bound to
use super::telemetry::{core_mean, TelemetryPoint};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Static display metadata for a variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VariableDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub color: &'static str,
    /// Fraction digits used when a value is rendered as text
    #[serde(skip)]
    pub precision: usize,
}

impl VariableDescriptor {
    pub fn format_value(&self, value: f64) -> String {
        if self.unit.is_empty() {
            format!("{:.*}", self.precision, value)
        } else {
            format!("{:.*} {}", self.precision, value, self.unit)
        }
    }

    /// Axis title, e.g. "CPU Power (W)"
    pub fn axis_title(&self) -> String {
        if self.unit.is_empty() {
            self.label.to_string()
        } else {
            format!("{} ({})", self.label, self.unit)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variable {
    CpuPower,
    GpuPower,
    AnePower,
    TotalPower,
    CpuTemp,
    CpuTempMax,
    GpuTemp,
    GpuTempMax,
    BatteryTemp,
    CpuFrequency,
    GpuFrequency,
    RamUsage,
    CpuUtilization,
    PCoreUtilization,
    ECoreUtilization,
    TokensPerSecond,
    InstantaneousTps,
    Ttft,
    TotalEnergy,
    EnergyPerToken,
}

const fn descriptor(
    key: &'static str,
    label: &'static str,
    unit: &'static str,
    color: &'static str,
    precision: usize,
) -> VariableDescriptor {
    VariableDescriptor {
        key,
        label,
        unit,
        color,
        precision,
    }
}

const CPU_POWER: VariableDescriptor = descriptor("cpu_power", "CPU Power", "W", "#f97316", 2);
const GPU_POWER: VariableDescriptor = descriptor("gpu_power", "GPU Power", "W", "#a855f7", 2);
const ANE_POWER: VariableDescriptor = descriptor("ane_power", "ANE Power", "W", "#14b8a6", 2);
const TOTAL_POWER: VariableDescriptor = descriptor("total_power", "Total Power", "W", "#eab308", 2);
const CPU_TEMP: VariableDescriptor = descriptor("cpu_temp", "CPU Temp", "°C", "#ef4444", 1);
const CPU_TEMP_MAX: VariableDescriptor =
    descriptor("cpu_temp_max", "CPU Temp Max", "°C", "#dc2626", 1);
const GPU_TEMP: VariableDescriptor = descriptor("gpu_temp", "GPU Temp", "°C", "#ec4899", 1);
const GPU_TEMP_MAX: VariableDescriptor =
    descriptor("gpu_temp_max", "GPU Temp Max", "°C", "#db2777", 1);
const BATTERY_TEMP: VariableDescriptor =
    descriptor("battery_temp", "Battery Temp", "°C", "#84cc16", 1);
const CPU_FREQ: VariableDescriptor = descriptor("cpu_freq", "CPU Frequency", "MHz", "#0ea5e9", 0);
const GPU_FREQ: VariableDescriptor = descriptor("gpu_freq", "GPU Frequency", "MHz", "#6366f1", 0);
const RAM_USAGE: VariableDescriptor = descriptor("ram_usage", "RAM Usage", "GB", "#64748b", 2);
const CPU_UTIL: VariableDescriptor =
    descriptor("cpu_utilization", "CPU Utilization", "%", "#22c55e", 1);
const P_CORE_UTIL: VariableDescriptor =
    descriptor("p_core_utilization", "P-Core Utilization", "%", "#16a34a", 1);
const E_CORE_UTIL: VariableDescriptor =
    descriptor("e_core_utilization", "E-Core Utilization", "%", "#4ade80", 1);
const TPS: VariableDescriptor = descriptor("tps", "Tokens/s", "tok/s", "#3b82f6", 2);
const INSTANT_TPS: VariableDescriptor =
    descriptor("instantaneous_tps", "Instantaneous Tokens/s", "tok/s", "#60a5fa", 2);
const TTFT: VariableDescriptor = descriptor("ttft", "Time to First Token", "ms", "#f59e0b", 0);
const TOTAL_ENERGY: VariableDescriptor =
    descriptor("total_energy", "Total Energy", "Wh", "#78716c", 4);
const ENERGY_PER_TOKEN: VariableDescriptor =
    descriptor("energy_per_token", "Energy per Token", "Wh", "#a8a29e", 6);

impl Variable {
    pub const ALL: [Variable; 20] = [
        Variable::CpuPower,
        Variable::GpuPower,
        Variable::AnePower,
        Variable::TotalPower,
        Variable::CpuTemp,
        Variable::CpuTempMax,
        Variable::GpuTemp,
        Variable::GpuTempMax,
        Variable::BatteryTemp,
        Variable::CpuFrequency,
        Variable::GpuFrequency,
        Variable::RamUsage,
        Variable::CpuUtilization,
        Variable::PCoreUtilization,
        Variable::ECoreUtilization,
        Variable::TokensPerSecond,
        Variable::InstantaneousTps,
        Variable::Ttft,
        Variable::TotalEnergy,
        Variable::EnergyPerToken,
    ];

    pub fn descriptor(&self) -> &'static VariableDescriptor {
        match self {
            Variable::CpuPower => &CPU_POWER,
            Variable::GpuPower => &GPU_POWER,
            Variable::AnePower => &ANE_POWER,
            Variable::TotalPower => &TOTAL_POWER,
            Variable::CpuTemp => &CPU_TEMP,
            Variable::CpuTempMax => &CPU_TEMP_MAX,
            Variable::GpuTemp => &GPU_TEMP,
            Variable::GpuTempMax => &GPU_TEMP_MAX,
            Variable::BatteryTemp => &BATTERY_TEMP,
            Variable::CpuFrequency => &CPU_FREQ,
            Variable::GpuFrequency => &GPU_FREQ,
            Variable::RamUsage => &RAM_USAGE,
            Variable::CpuUtilization => &CPU_UTIL,
            Variable::PCoreUtilization => &P_CORE_UTIL,
            Variable::ECoreUtilization => &E_CORE_UTIL,
            Variable::TokensPerSecond => &TPS,
            Variable::InstantaneousTps => &INSTANT_TPS,
            Variable::Ttft => &TTFT,
            Variable::TotalEnergy => &TOTAL_ENERGY,
            Variable::EnergyPerToken => &ENERGY_PER_TOKEN,
        }
    }

    pub fn key(&self) -> &'static str {
        self.descriptor().key
    }

    /// Read this variable from a point. Missing and non-finite readings are
    /// both reported as absent.
    pub fn extract(&self, point: &TelemetryPoint) -> Option<f64> {
        let raw = match self {
            Variable::CpuPower => point.cpu_power_watts,
            Variable::GpuPower => point.gpu_power_watts,
            Variable::AnePower => point.ane_power_watts,
            Variable::TotalPower => point.total_power_watts(),
            Variable::CpuTemp => point.cpu_temp_avg.or(point.cpu_temp_celsius),
            Variable::CpuTempMax => point.cpu_temp_max,
            Variable::GpuTemp => point.gpu_temp_avg.or(point.gpu_temp_celsius),
            Variable::GpuTempMax => point.gpu_temp_max,
            Variable::BatteryTemp => point.battery_temp_avg,
            Variable::CpuFrequency => point.cpu_freq_mhz,
            Variable::GpuFrequency => point.gpu_freq_mhz,
            Variable::RamUsage => point.ram_usage_gb,
            Variable::CpuUtilization => point.cpu_overall_utilization,
            Variable::PCoreUtilization => core_mean(point.cpu_p_core_utilization.as_deref()),
            Variable::ECoreUtilization => core_mean(point.cpu_e_core_utilization.as_deref()),
            Variable::TokensPerSecond => point.current_tps,
            Variable::InstantaneousTps => point.instantaneous_tps,
            Variable::Ttft => point.ttft_ms,
            Variable::TotalEnergy => point.total_energy_wh,
            Variable::EnergyPerToken => point.energy_rate_wh_per_token,
        };
        raw.filter(|v| v.is_finite())
    }
}

/// Extract by untyped key, as supplied by configuration or a query string.
/// Unknown keys read as absent.
pub fn extract_by_key(point: &TelemetryPoint, key: &str) -> Option<f64> {
    key.parse::<Variable>().ok()?.extract(point)
}

/// The full registry, in display order.
pub fn registry() -> impl Iterator<Item = &'static VariableDescriptor> {
    Variable::ALL.iter().map(|v| v.descriptor())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variable: {0}")]
pub struct UnknownVariable(pub String);

impl FromStr for Variable {
    type Err = UnknownVariable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variable::ALL
            .into_iter()
            .find(|v| v.key() == s)
            .ok_or_else(|| UnknownVariable(s.to_string()))
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for Variable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for Variable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse a comma-separated key list such as `cpu_power,gpu_temp,tps`.
pub fn parse_variable_list(list: &str) -> Result<Vec<Variable>, UnknownVariable> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
