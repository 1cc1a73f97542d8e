use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::gateway::artifact_store::{ArtifactManifest, NewArtifact};

/// Artifact and metric access a stage needs from the tracking service.
pub trait TrackingPort {
    /// Download every file of `reference` into `dest`; returns the directory.
    fn download(&mut self, reference: &str, dest: &Path) -> Result<PathBuf>;

    /// Download a single-file artifact and return the file path.
    fn file(&mut self, reference: &str) -> Result<PathBuf>;

    fn log_artifact(&mut self, artifact: &NewArtifact) -> Result<ArtifactManifest>;

    fn set_summary(&mut self, key: &str, value: Value);
}

/// Fetches raw bytes from an external location.
pub trait HttpClientPort {
    fn get(&self, url: &str) -> Result<HttpGetResult>;
}

#[derive(Clone, Debug)]
pub struct HttpGetResult {
    pub status: u16,
    pub bytes: Vec<u8>,
    pub content_type: String,
}
