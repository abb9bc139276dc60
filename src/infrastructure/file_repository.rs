// JSON file repository - One recorded session per file in a directory
use crate::application::session_repository::SessionRepository;
use crate::domain::session::{ModelMetadata, SessionSummary, TelemetrySession};
use crate::domain::telemetry::TelemetryPoint;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct JsonSessionRepository {
    directory: PathBuf,
}

/// On-disk layout. Older recordings are a bare array of points.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SessionFile {
    Recorded(RecordedSession),
    Legacy(Vec<TelemetryPoint>),
}

#[derive(Debug, Deserialize)]
struct RecordedSession {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    telemetry_data: Vec<TelemetryPoint>,
    #[serde(default)]
    summary: Option<SessionSummary>,
    #[serde(default)]
    model_info: ModelMetadata,
}

impl JsonSessionRepository {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    async fn session_files(&self) -> Result<Vec<PathBuf>> {
        let mut entries = match tokio::fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Session directory {} does not exist", self.directory.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read session directory {}", self.directory.display())
                });
            }
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        Ok(files)
    }

    async fn read_session(path: &Path) -> Result<TelemetrySession> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        let raw = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: SessionFile = serde_json::from_slice(&raw)
            .with_context(|| format!("Failed to parse session file {}", path.display()))?;

        let modified = tokio::fs::metadata(path)
            .await
            .ok()
            .and_then(|m| m.modified().ok())
            .map(DateTime::<Utc>::from);

        let session = match file {
            SessionFile::Recorded(recorded) => TelemetrySession::new(
                recorded.id.unwrap_or_else(|| stem.clone()),
                recorded.name.unwrap_or(stem),
                recorded.created_at.or(modified),
                recorded.telemetry_data,
                recorded.summary,
                recorded.model_info,
            ),
            SessionFile::Legacy(points) => TelemetrySession::new(
                stem.clone(),
                stem,
                modified,
                points,
                None,
                ModelMetadata::default(),
            ),
        };
        Ok(session)
    }
}

/// Ids name files inside the session directory and never a path.
fn is_plain_id(id: &str) -> bool {
    !id.is_empty() && !id.contains(['/', '\\']) && !id.contains("..")
}

#[async_trait]
impl SessionRepository for JsonSessionRepository {
    async fn list_sessions(&self) -> Result<Vec<TelemetrySession>> {
        let mut sessions = Vec::new();
        for path in self.session_files().await? {
            match Self::read_session(&path).await {
                Ok(session) => sessions.push(session),
                Err(e) => tracing::warn!("Skipping session file: {:#}", e),
            }
        }

        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        tracing::debug!(
            "Loaded {} sessions from {}",
            sessions.len(),
            self.directory.display()
        );
        Ok(sessions)
    }

    async fn get_session(&self, id: &str) -> Result<Option<TelemetrySession>> {
        if !is_plain_id(id) {
            tracing::debug!("Rejecting session id {:?}", id);
            return Ok(None);
        }

        // Ids usually match the file stem; fall back to a scan for renamed files.
        let direct = self.directory.join(format!("{id}.json"));
        if let Ok(session) = Self::read_session(&direct).await {
            if session.id == id {
                return Ok(Some(session));
            }
        }

        for path in self.session_files().await? {
            match Self::read_session(&path).await {
                Ok(session) if session.id == id => return Ok(Some(session)),
                Ok(_) => {}
                Err(e) => tracing::warn!("Skipping session file: {:#}", e),
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::ModelTag;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    const RECORDED: &str = r#"{
        "id": "bench-1",
        "name": "Bench run",
        "created_at": "2026-03-01T10:00:00Z",
        "telemetry_data": [
            {"timestamp_ms": 1000, "model": "A", "cpu_power_watts": 5.0, "current_tps": 20.0},
            {"timestamp_ms": 3000, "model": "B", "cpu_power_watts": 7.0, "current_tps": 30.0}
        ],
        "model_info": {"modelA": {"name": "llama"}, "modelB": {"name": "qwen"}}
    }"#;

    #[tokio::test]
    async fn test_reads_recorded_session() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bench-1.json", RECORDED);

        let repo = JsonSessionRepository::new(dir.path());
        let session = repo.get_session("bench-1").await.unwrap().unwrap();

        assert_eq!(session.name, "Bench run");
        assert_eq!(session.points.len(), 2);
        assert_eq!(session.points[0].model, Some(ModelTag::A));
        assert_eq!(session.models.display_name(ModelTag::B), "qwen");
        assert_eq!(session.summary.duration_secs, 2.0);
        assert_eq!(session.summary.average_tps, Some(25.0));
    }

    #[tokio::test]
    async fn test_legacy_array_named_after_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "old-run.json", r#"[{"timestamp_ms": 0, "gpu_power_watts": 3.0}]"#);

        let repo = JsonSessionRepository::new(dir.path());
        let session = repo.get_session("old-run").await.unwrap().unwrap();

        assert_eq!(session.id, "old-run");
        assert_eq!(session.name, "old-run");
        assert_eq!(session.points[0].gpu_power_watts, Some(3.0));
        assert!(session.created_at.is_some());
    }

    #[tokio::test]
    async fn test_list_skips_unreadable_and_sorts_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bench-1.json", RECORDED);
        write(
            dir.path(),
            "later.json",
            r#"{"name": "Later", "created_at": "2026-04-01T00:00:00Z", "telemetry_data": []}"#,
        );
        write(dir.path(), "broken.json", "{not json");
        write(dir.path(), "notes.txt", "ignored");

        let repo = JsonSessionRepository::new(dir.path());
        let sessions = repo.list_sessions().await.unwrap();

        let ids: Vec<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["later", "bench-1"]);
    }

    #[tokio::test]
    async fn test_finds_session_whose_id_differs_from_file_name() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "renamed.json", RECORDED);

        let repo = JsonSessionRepository::new(dir.path());
        assert!(repo.get_session("bench-1").await.unwrap().is_some());
        assert!(repo.get_session("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_directory_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonSessionRepository::new(dir.path().join("nope"));
        assert!(repo.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_stored_summary_keeps_session() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "partial.json",
            r#"{
                "name": "Partial",
                "telemetry_data": [
                    {"timestamp_ms": 1000, "current_tps": 2.0},
                    {"timestamp_ms": 4000, "current_tps": 4.0}
                ],
                "summary": {"duration": 5.0, "averageTps": 3.0}
            }"#,
        );

        let repo = JsonSessionRepository::new(dir.path());
        assert_eq!(repo.list_sessions().await.unwrap().len(), 1);

        let session = repo.get_session("partial").await.unwrap().unwrap();
        assert_eq!(session.summary.average_tps, Some(3.0));
        assert_eq!(session.summary.duration_secs, 0.0);
    }

    #[tokio::test]
    async fn test_point_without_timestamp_skips_file() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "untimed.json",
            r#"[
                {"cpu_power_watts": 5.0},
                {"timestamp_ms": 1759320000000, "cpu_power_watts": 6.0}
            ]"#,
        );
        write(dir.path(), "bench-1.json", RECORDED);

        let repo = JsonSessionRepository::new(dir.path());
        let sessions = repo.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "bench-1");
        assert!(repo.get_session("untimed").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_path_like_ids_are_not_read() {
        let root = tempfile::tempdir().unwrap();
        let sessions = root.path().join("sessions");
        std::fs::create_dir(&sessions).unwrap();
        write(root.path(), "outside.json", r#"{"id": "../outside", "telemetry_data": []}"#);

        let repo = JsonSessionRepository::new(&sessions);
        for id in ["../outside", "..\\outside", "a/b", "", ".."] {
            assert!(repo.get_session(id).await.unwrap().is_none(), "{id:?}");
        }
        assert!(is_plain_id("bench-1"));
        assert!(is_plain_id("run.2026-03-01"));
    }
}
