// Energy consumption - trapezoidal integration of power readings
use super::telemetry::TelemetryPoint;
use serde::{Deserialize, Serialize};

const MS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnergySummary {
    pub total_energy_wh: f64,
    pub cpu_energy_wh: f64,
    pub gpu_energy_wh: f64,
    pub ane_energy_wh: f64,
    pub average_power_watts: f64,
    pub peak_power_watts: f64,
    pub duration_seconds: f64,
    pub energy_per_token_wh: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct EnergyIntegrator {
    previous: Option<PowerReading>,
    cpu_energy_wh: f64,
    gpu_energy_wh: f64,
    ane_energy_wh: f64,
    peak_power_watts: f64,
    first_timestamp_ms: Option<u64>,
    last_timestamp_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
struct PowerReading {
    timestamp_ms: u64,
    cpu: Option<f64>,
    gpu: Option<f64>,
    ane: Option<f64>,
}

impl EnergyIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Integrate every point of a chronological sequence.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a TelemetryPoint>) -> Self {
        let mut integrator = Self::new();
        for point in points {
            integrator.update(point);
        }
        integrator
    }

    /// Add one reading. A component contributes `(P1 + P2) * dt / 2` only
    /// when both the previous and the current reading carry it.
    pub fn update(&mut self, point: &TelemetryPoint) {
        let finite = |v: Option<f64>| v.filter(|w| w.is_finite());
        let reading = PowerReading {
            timestamp_ms: point.timestamp_ms,
            cpu: finite(point.cpu_power_watts),
            gpu: finite(point.gpu_power_watts),
            ane: finite(point.ane_power_watts),
        };

        self.first_timestamp_ms.get_or_insert(reading.timestamp_ms);
        self.last_timestamp_ms = Some(reading.timestamp_ms);

        if let Some(total) = point.total_power_watts() {
            self.peak_power_watts = self.peak_power_watts.max(total);
        }

        if let Some(prev) = self.previous {
            // Out-of-order samples contribute nothing rather than negative energy
            let elapsed_ms = reading.timestamp_ms.saturating_sub(prev.timestamp_ms);
            let dt_hours = elapsed_ms as f64 / MS_PER_HOUR;
            self.cpu_energy_wh += trapezoid(prev.cpu, reading.cpu, dt_hours);
            self.gpu_energy_wh += trapezoid(prev.gpu, reading.gpu, dt_hours);
            self.ane_energy_wh += trapezoid(prev.ane, reading.ane, dt_hours);
        }

        self.previous = Some(reading);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn total_energy_wh(&self) -> f64 {
        self.cpu_energy_wh + self.gpu_energy_wh + self.ane_energy_wh
    }

    pub fn duration_seconds(&self) -> f64 {
        match (self.first_timestamp_ms, self.last_timestamp_ms) {
            (Some(first), Some(last)) => last.saturating_sub(first) as f64 / 1000.0,
            _ => 0.0,
        }
    }

    pub fn summary(&self, total_tokens: Option<u64>) -> EnergySummary {
        let total_energy_wh = self.total_energy_wh();
        let duration_seconds = self.duration_seconds();
        let average_power_watts = if duration_seconds > 0.0 {
            total_energy_wh * 3600.0 / duration_seconds
        } else {
            0.0
        };
        let energy_per_token_wh = total_tokens.map(|tokens| {
            if tokens > 0 {
                total_energy_wh / tokens as f64
            } else {
                0.0
            }
        });

        EnergySummary {
            total_energy_wh,
            cpu_energy_wh: self.cpu_energy_wh,
            gpu_energy_wh: self.gpu_energy_wh,
            ane_energy_wh: self.ane_energy_wh,
            average_power_watts,
            peak_power_watts: self.peak_power_watts,
            duration_seconds,
            energy_per_token_wh,
        }
    }
}

fn trapezoid(p1: Option<f64>, p2: Option<f64>, dt_hours: f64) -> f64 {
    match (p1, p2) {
        (Some(p1), Some(p2)) => (p1 + p2) * dt_hours / 2.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(
        timestamp_ms: u64,
        cpu: Option<f64>,
        gpu: Option<f64>,
        ane: Option<f64>,
    ) -> TelemetryPoint {
        let mut point = TelemetryPoint::new(timestamp_ms);
        point.cpu_power_watts = cpu;
        point.gpu_power_watts = gpu;
        point.ane_power_watts = ane;
        point
    }

    #[test]
    fn test_first_reading_has_no_energy() {
        let mut integrator = EnergyIntegrator::new();
        integrator.update(&reading(1000, Some(10.0), Some(5.0), Some(2.0)));

        let summary = integrator.summary(None);
        assert_eq!(summary.total_energy_wh, 0.0);
        assert_eq!(summary.duration_seconds, 0.0);
        assert_eq!(summary.average_power_watts, 0.0);
        assert_eq!(summary.peak_power_watts, 17.0);
    }

    #[test]
    fn test_trapezoidal_rule() {
        let points = [
            reading(0, Some(10.0), Some(5.0), Some(2.0)),
            reading(3_600_000, Some(20.0), Some(10.0), Some(4.0)),
        ];
        let summary = EnergyIntegrator::from_points(&points).summary(None);

        assert_eq!(summary.cpu_energy_wh, 15.0);
        assert_eq!(summary.gpu_energy_wh, 7.5);
        assert_eq!(summary.ane_energy_wh, 3.0);
        assert_eq!(summary.total_energy_wh, 25.5);
        assert_eq!(summary.duration_seconds, 3600.0);
        assert_eq!(summary.average_power_watts, 25.5);
        assert_eq!(summary.peak_power_watts, 34.0);
    }

    #[test]
    fn test_cumulative_and_missing_components() {
        let points = [
            reading(0, Some(10.0), None, None),
            reading(3_600_000, Some(10.0), Some(4.0), None),
            reading(7_200_000, Some(20.0), None, None),
        ];
        let summary = EnergyIntegrator::from_points(&points).summary(None);

        assert_eq!(summary.cpu_energy_wh, 25.0);
        assert_eq!(summary.gpu_energy_wh, 0.0);
        assert_eq!(summary.total_energy_wh, 25.0);
    }

    #[test]
    fn test_short_interval_accuracy() {
        let points = [reading(0, Some(10.0), None, None), reading(1000, Some(20.0), None, None)];
        let summary = EnergyIntegrator::from_points(&points).summary(None);

        let expected = (10.0 + 20.0) * (1.0 / 3600.0) / 2.0;
        assert!((summary.cpu_energy_wh - expected).abs() < 1e-10);
        assert!((summary.average_power_watts - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_energy_per_token() {
        let points = [
            reading(0, Some(10.0), None, None),
            reading(3_600_000, Some(10.0), None, None),
        ];
        let integrator = EnergyIntegrator::from_points(&points);

        assert_eq!(integrator.summary(Some(100)).energy_per_token_wh, Some(0.1));
        assert_eq!(integrator.summary(Some(0)).energy_per_token_wh, Some(0.0));
        assert_eq!(integrator.summary(None).energy_per_token_wh, None);
    }

    #[test]
    fn test_reset() {
        let mut integrator = EnergyIntegrator::from_points(&[
            reading(0, Some(10.0), None, None),
            reading(3_600_000, Some(20.0), None, None),
        ]);
        integrator.reset();

        assert_eq!(integrator.total_energy_wh(), 0.0);
        assert_eq!(integrator.summary(None), EnergySummary::default());
    }
}
