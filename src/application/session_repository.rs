// Repository trait for recorded session access
use crate::domain::session::TelemetrySession;
use async_trait::async_trait;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// All readable sessions, newest first
    async fn list_sessions(&self) -> anyhow::Result<Vec<TelemetrySession>>;

    /// A single session by id, `None` when no such session exists
    async fn get_session(&self, id: &str) -> anyhow::Result<Option<TelemetrySession>>;
}

/// Fixed in-memory sessions for exercising services and handlers.
#[cfg(test)]
pub(crate) struct StaticRepository {
    sessions: Vec<TelemetrySession>,
}

#[cfg(test)]
impl StaticRepository {
    pub(crate) fn new(sessions: Vec<TelemetrySession>) -> Self {
        Self { sessions }
    }
}

#[cfg(test)]
#[async_trait]
impl SessionRepository for StaticRepository {
    async fn list_sessions(&self) -> anyhow::Result<Vec<TelemetrySession>> {
        Ok(self.sessions.clone())
    }

    async fn get_session(&self, id: &str) -> anyhow::Result<Option<TelemetrySession>> {
        Ok(self.sessions.iter().find(|s| s.id == id).cloned())
    }
}
