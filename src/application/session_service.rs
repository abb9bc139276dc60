// Session service - Use case for listing and inspecting recorded sessions
use crate::application::error::AnalysisError;
use crate::application::session_repository::SessionRepository;
use crate::domain::session::SessionOverview;
use std::sync::Arc;

#[derive(Clone)]
pub struct SessionService {
    repository: Arc<dyn SessionRepository>,
}

impl SessionService {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_sessions(&self) -> anyhow::Result<Vec<SessionOverview>> {
        let sessions = self.repository.list_sessions().await?;
        Ok(sessions.iter().map(SessionOverview::from).collect())
    }

    pub async fn get_session(&self, id: &str) -> Result<SessionOverview, AnalysisError> {
        self.repository
            .get_session(id)
            .await?
            .as_ref()
            .map(SessionOverview::from)
            .ok_or_else(|| AnalysisError::SessionNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::session_repository::StaticRepository;
    use crate::domain::session::{ModelMetadata, TelemetrySession};
    use crate::domain::telemetry::{ModelTag, TelemetryPoint};

    fn session(id: &str, points: u64) -> TelemetrySession {
        let points = (0..points)
            .map(|i| {
                let mut point = TelemetryPoint::new(i * 500);
                point.model = Some(ModelTag::A);
                point.current_tps = Some(10.0 + i as f64);
                point
            })
            .collect();
        TelemetrySession::new(
            id.to_string(),
            format!("Session {id}"),
            None,
            points,
            None,
            ModelMetadata::default(),
        )
    }

    fn service() -> SessionService {
        let repository = StaticRepository::new(vec![session("a", 3), session("b", 5)]);
        SessionService::new(Arc::new(repository))
    }

    #[tokio::test]
    async fn test_list_sessions_projects_overviews() {
        let overviews = service().list_sessions().await.unwrap();

        let ids: Vec<&str> = overviews.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(overviews[1].point_count, 5);
        assert_eq!(overviews[1].summary.duration_secs, 2.0);
        assert_eq!(overviews[1].summary.average_tps, Some(12.0));
    }

    #[tokio::test]
    async fn test_get_session() {
        let overview = service().get_session("a").await.unwrap();
        assert_eq!(overview.name, "Session a");
        assert_eq!(overview.point_count, 3);

        let err = service().get_session("zzz").await.unwrap_err();
        assert!(matches!(err, AnalysisError::SessionNotFound(id) if id == "zzz"));
    }
}
