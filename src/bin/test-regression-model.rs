use airbnb_pipeline::cli::{run_evaluate, EvaluateArgs};
use airbnb_pipeline::config::PipelineConfig;
use airbnb_pipeline::constants::JOB_TEST_MODEL;
use airbnb_pipeline::logging::init_logging;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = EvaluateArgs::parse();
    let config = PipelineConfig::load()?;
    init_logging(&config.log_dir, JOB_TEST_MODEL);
    run_evaluate(args, &config)
}
