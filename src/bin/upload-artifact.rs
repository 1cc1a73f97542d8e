use airbnb_pipeline::cli::{run_upload, UploadArgs};
use airbnb_pipeline::config::PipelineConfig;
use airbnb_pipeline::constants::JOB_UPLOAD_ARTIFACT;
use airbnb_pipeline::logging::init_logging;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = UploadArgs::parse();
    let config = PipelineConfig::load()?;
    init_logging(&config.log_dir, JOB_UPLOAD_ARTIFACT);
    run_upload(args, &config)
}
