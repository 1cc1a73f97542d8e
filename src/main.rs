use airbnb_pipeline::cli::{self, CleanArgs, DataCheckArgs, EvaluateArgs, FetchArgs, UploadArgs};
use airbnb_pipeline::config::PipelineConfig;
use airbnb_pipeline::constants;
use airbnb_pipeline::logging;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "airbnb_pipeline")]
#[command(about = "NYC Airbnb price model pipeline stages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download an artifact and republish it under a new name
    #[command(name = "fetch")]
    Fetch(FetchArgs),
    /// Drop incomplete rows and price outliers
    #[command(name = "clean")]
    Clean(CleanArgs),
    /// Run the data checks against a reference dataset
    #[command(name = "check")]
    Check(DataCheckArgs),
    /// Score an exported model on the test set
    #[command(name = "evaluate")]
    Evaluate(EvaluateArgs),
    /// Log a local file as an artifact
    #[command(name = "upload")]
    Upload(UploadArgs),
}

fn main() -> anyhow::Result<()> {
    let parsed = Cli::parse();
    let config = PipelineConfig::load()?;

    match parsed.command {
        Commands::Fetch(args) => {
            logging::init_logging(&config.log_dir, constants::JOB_DOWNLOAD);
            cli::run_fetch(args, &config)
        }
        Commands::Clean(args) => {
            logging::init_logging(&config.log_dir, constants::JOB_BASIC_CLEANING);
            cli::run_clean(args, &config)
        }
        Commands::Check(args) => {
            logging::init_logging(&config.log_dir, constants::JOB_DATA_CHECK);
            cli::run_check(args, &config)
        }
        Commands::Evaluate(args) => {
            logging::init_logging(&config.log_dir, constants::JOB_TEST_MODEL);
            cli::run_evaluate(args, &config)
        }
        Commands::Upload(args) => {
            logging::init_logging(&config.log_dir, constants::JOB_UPLOAD_ARTIFACT);
            cli::run_upload(args, &config)
        }
    }
}
