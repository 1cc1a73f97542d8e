use airbnb_pipeline::cli::{run_fetch, FetchArgs};
use airbnb_pipeline::config::PipelineConfig;
use airbnb_pipeline::constants::JOB_DOWNLOAD;
use airbnb_pipeline::logging::init_logging;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = FetchArgs::parse();
    let config = PipelineConfig::load()?;
    init_logging(&config.log_dir, JOB_DOWNLOAD);
    run_fetch(args, &config)
}
