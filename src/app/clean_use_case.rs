use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::app::ports::TrackingPort;
use crate::constants::CLEAN_OUTPUT_FILE;
use crate::gateway::artifact_store::{ArtifactManifest, NewArtifact};
use crate::pipeline::frame::{load_csv, write_csv};
use crate::pipeline::processing::cleaning::{clean, CleaningRules};

#[derive(Debug, Clone)]
pub struct CleanParams {
    pub input_artifact: String,
    pub output_artifact: String,
    pub output_type: String,
    pub output_description: String,
    pub rules: CleaningRules,
    /// Where the cleaned CSV is written before it is logged
    pub output_dir: PathBuf,
}

/// Outcome of a cleaning run.
#[derive(Debug, Clone)]
pub struct CleanReport {
    pub input_rows: usize,
    pub output_rows: usize,
    pub artifact: ArtifactManifest,
}

/// Download a raw CSV artifact, clean it, and log the result.
pub fn run_basic_cleaning(tracker: &mut dyn TrackingPort, params: &CleanParams) -> Result<CleanReport> {
    info!(artifact = %params.input_artifact, "Downloading artifact");
    let input_path = tracker.file(&params.input_artifact)?;

    info!("Loading artifact into a dataframe");
    let raw = load_csv(&input_path)
        .with_context(|| format!("Failed to load {}", input_path.display()))?;

    let mut cleaned = clean(&raw, &params.rules)?;

    fs::create_dir_all(&params.output_dir)?;
    let output_path = params.output_dir.join(CLEAN_OUTPUT_FILE);
    write_csv(&mut cleaned, &output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    info!(artifact = %params.output_artifact, "Logging cleaned data artifact");
    let mut artifact = NewArtifact::new(
        &params.output_artifact,
        &params.output_type,
        &params.output_description,
    );
    artifact.add_file(&output_path);
    let manifest = tracker.log_artifact(&artifact)?;

    info!("Basic cleaning step finished");
    Ok(CleanReport {
        input_rows: raw.height(),
        output_rows: cleaned.height(),
        artifact: manifest,
    })
}
