use crate::domain::transform::{AggregationMethod, MAX_ALIGN_POINTS};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub sessions: SessionSettings,
    pub charts: ChartSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("invalid listen address {}: {}", addr, e))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    pub directory: PathBuf,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ChartSettings {
    /// Point budget applied when a request does not name one
    pub max_points: usize,
    /// Reduction used by radar charts when a request does not name one
    pub aggregation: AggregationMethod,
    /// Longest shared timeline a comparison may build, in grid points
    pub max_align_points: usize,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            max_points: 1000,
            aggregation: AggregationMethod::Mean,
            max_align_points: MAX_ALIGN_POINTS,
        }
    }
}

/// Load `config/analysis.{toml,yaml,json}` when present, overridden by
/// `ANALYSIS__SECTION__KEY` environment variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_app_config_from("config/analysis")
}

pub fn load_app_config_from(path: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("sessions.directory", "sessions")?
        .set_default("charts.max_points", 1000)?
        .set_default("charts.aggregation", "mean")?
        .set_default("charts.max_align_points", MAX_ALIGN_POINTS as u64)?
        .add_source(config::File::with_name(path).required(false))
        .add_source(config::Environment::with_prefix("ANALYSIS").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = load_app_config_from("does/not/exist").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.sessions.directory, PathBuf::from("sessions"));
        assert_eq!(config.charts, ChartSettings::default());
        assert_eq!(
            config.server.socket_addr().unwrap().to_string(),
            "0.0.0.0:8080"
        );
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\n\n[charts]\nmax_points = 250\naggregation = \"median\"\n\
             max_align_points = 600"
        )
        .unwrap();

        let base = dir.path().join("analysis");
        let config = load_app_config_from(base.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.charts.max_points, 250);
        assert_eq!(config.charts.aggregation, AggregationMethod::Median);
        assert_eq!(config.charts.max_align_points, 600);
    }
}
