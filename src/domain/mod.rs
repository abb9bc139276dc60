// Domain layer - telemetry types and the pure analysis logic over them
pub mod chart;
pub mod energy;
pub mod session;
pub mod telemetry;
pub mod transform;
pub mod variable;
