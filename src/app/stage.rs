use anyhow::Result;
use tracing::{error, warn};

use crate::config::PipelineConfig;
use crate::gateway::artifact_store::FsArtifactStore;
use crate::gateway::run::{Run, RunState};

/// Open a run of `job_type`, execute `stage` against it, and record the outcome.
/// The stage's own error wins over a failure to persist the run record.
pub fn run_stage<T, F>(config: &PipelineConfig, job_type: &str, stage: F) -> Result<T>
where
    F: FnOnce(&mut Run) -> Result<T>,
{
    let store = FsArtifactStore::from_config(config)?;
    let mut run = Run::init(store, job_type, &config.download_dir);

    match stage(&mut run) {
        Ok(value) => {
            run.finish(RunState::Finished)?;
            Ok(value)
        }
        Err(e) => {
            error!(job_type, error = %e, "Stage failed");
            if let Err(finish_err) = run.finish(RunState::Failed) {
                warn!(error = %finish_err, "Could not record failed run");
            }
            Err(e)
        }
    }
}
