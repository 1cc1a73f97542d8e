use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::app::ports::TrackingPort;
use crate::error::PipelineError;
use crate::gateway::artifact_store::{ArtifactManifest, NewArtifact};

#[derive(Debug, Clone)]
pub struct UploadParams {
    pub file_path: PathBuf,
    pub artifact_name: String,
    pub artifact_type: String,
    pub aliases: Vec<String>,
}

/// Log a local file as a new artifact.
pub fn upload_file(tracker: &mut dyn TrackingPort, params: &UploadParams) -> Result<ArtifactManifest> {
    if !params.file_path.exists() {
        return Err(PipelineError::FileNotFound(format!(
            "File not found at: {}",
            params.file_path.display()
        ))
        .into());
    }

    info!(artifact = %params.artifact_name, "Creating artifact");
    let mut artifact = NewArtifact::new(&params.artifact_name, &params.artifact_type, "");
    info!(file = %params.file_path.display(), "Adding file to artifact");
    artifact.add_file(&params.file_path);
    for alias in &params.aliases {
        artifact.add_alias(alias);
    }

    let manifest = tracker.log_artifact(&artifact)?;
    info!(artifact = %manifest.reference(), "Done");
    Ok(manifest)
}
