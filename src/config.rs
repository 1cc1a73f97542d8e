use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

const DEFAULT_CONFIG_PATH: &str = "pipeline.toml";

/// Where artifacts, logs and scratch downloads live for a pipeline run.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub artifact_root: PathBuf,
    pub project: String,
    pub log_dir: PathBuf,
    pub download_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            artifact_root: PathBuf::from("artifacts"),
            project: "nyc_airbnb".to_string(),
            log_dir: PathBuf::from("logs"),
            download_dir: PathBuf::from("artifact_download"),
        }
    }
}

impl PipelineConfig {
    /// Load `.env`, then `pipeline.toml` (or `$PIPELINE_CONFIG`) if present,
    /// then apply `PIPELINE_*` environment overrides.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let config_path = std::env::var("PIPELINE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = if config_path.exists() {
            Self::from_file(&config_path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        if config.project.trim().is_empty() {
            return Err(PipelineError::Config("project must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Apply `PIPELINE_*` overrides found through `lookup`.
    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("PIPELINE_ARTIFACT_ROOT") {
            self.artifact_root = PathBuf::from(root);
        }
        if let Some(project) = lookup("PIPELINE_PROJECT") {
            if !project.trim().is_empty() {
                self.project = project;
            }
        }
        if let Some(log_dir) = lookup("PIPELINE_LOG_DIR") {
            self.log_dir = PathBuf::from(log_dir);
        }
    }

    /// Same configuration pointed at another project namespace.
    pub fn with_project(mut self, project: &str) -> Self {
        self.project = project.to_string();
        self
    }
}
