use airbnb_pipeline::cli::{run_clean, CleanArgs};
use airbnb_pipeline::config::PipelineConfig;
use airbnb_pipeline::constants::JOB_BASIC_CLEANING;
use airbnb_pipeline::logging::init_logging;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = CleanArgs::parse();
    let config = PipelineConfig::load()?;
    init_logging(&config.log_dir, JOB_BASIC_CLEANING);
    run_clean(args, &config)
}
