use airbnb_pipeline::cli::{run_check, DataCheckArgs};
use airbnb_pipeline::config::PipelineConfig;
use airbnb_pipeline::constants::JOB_DATA_CHECK;
use airbnb_pipeline::logging::init_logging;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = DataCheckArgs::parse();
    let config = PipelineConfig::load()?;
    init_logging(&config.log_dir, JOB_DATA_CHECK);
    run_check(args, &config)
}
