// Errors surfaced by the analysis use cases
use crate::domain::variable::UnknownVariable;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The selection is too small for the chart; the caller should ask for
    /// more input rather than render.
    #[error("{chart} chart needs at least {required} variables, got {provided}")]
    InsufficientVariables {
        chart: &'static str,
        required: usize,
        provided: usize,
    },

    #[error("comparison needs {points} timeline points, more than the limit of {limit}")]
    AlignmentTooLong { points: usize, limit: usize },

    #[error(transparent)]
    UnknownVariable(#[from] UnknownVariable),

    #[error("repository error: {0:#}")]
    Repository(#[from] anyhow::Error),
}
