// Telemetry session analysis - data shaping for model comparison charts
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
