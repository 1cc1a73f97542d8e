use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::app::ports::TrackingPort;
use crate::error::Result;
use crate::gateway::artifact_store::{ArtifactManifest, FsArtifactStore, NewArtifact};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Running,
    Finished,
    Failed,
}

/// What gets persisted for every stage execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: String,
    pub job_type: String,
    pub state: RunState,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub used_artifacts: Vec<String>,
    pub logged_artifacts: Vec<String>,
    pub summary: Map<String, Value>,
}

/// A single stage execution against the artifact store.
pub struct Run {
    store: FsArtifactStore,
    download_dir: PathBuf,
    record: RunRecord,
}

impl Run {
    pub fn init(store: FsArtifactStore, job_type: &str, download_dir: &Path) -> Self {
        let record = RunRecord {
            id: Uuid::new_v4().to_string(),
            job_type: job_type.to_string(),
            state: RunState::Running,
            started_at: Utc::now(),
            finished_at: None,
            used_artifacts: Vec::new(),
            logged_artifacts: Vec::new(),
            summary: Map::new(),
        };
        info!(run_id = %record.id, job_type, "Run started");
        Self {
            store,
            download_dir: download_dir.to_path_buf(),
            record,
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Persist the run record with its final state.
    pub fn finish(mut self, state: RunState) -> Result<RunRecord> {
        self.record.state = state;
        self.record.finished_at = Some(Utc::now());
        self.store.write_run(&self.record)?;
        info!(run_id = %self.record.id, state = ?state, "Run finished");
        Ok(self.record)
    }

    fn use_artifact(&mut self, reference: &str) -> Result<ArtifactManifest> {
        let manifest = self.store.resolve(reference)?;
        self.record.used_artifacts.push(manifest.reference());
        Ok(manifest)
    }
}

impl TrackingPort for Run {
    fn download(&mut self, reference: &str, dest: &Path) -> Result<PathBuf> {
        let manifest = self.use_artifact(reference)?;
        self.store.download(&manifest, dest)
    }

    fn file(&mut self, reference: &str) -> Result<PathBuf> {
        let manifest = self.use_artifact(reference)?;
        let dest = self
            .download_dir
            .join(format!("{}-v{}", manifest.name, manifest.version));
        self.store.file(&manifest, &dest)
    }

    fn log_artifact(&mut self, artifact: &NewArtifact) -> Result<ArtifactManifest> {
        let manifest = self.store.log(artifact, Some(&self.record.id))?;
        self.record.logged_artifacts.push(manifest.reference());
        Ok(manifest)
    }

    fn set_summary(&mut self, key: &str, value: Value) {
        self.record.summary.insert(key.to_string(), value);
    }
}
