//! Command-line arguments for each stage, shared by the standalone stage
//! binaries and the `airbnb_pipeline` umbrella command.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use crate::app::clean_use_case::{run_basic_cleaning, CleanParams};
use crate::app::data_check_use_case::{run_data_check, DataCheckParams};
use crate::app::evaluate_use_case::{run_test_regression_model, EvaluateParams};
use crate::app::fetch_use_case::{FetchParams, FetchUseCase};
use crate::app::stage::run_stage;
use crate::app::upload_use_case::{upload_file, UploadParams};
use crate::config::PipelineConfig;
use crate::constants::{
    JOB_BASIC_CLEANING, JOB_DATA_CHECK, JOB_DOWNLOAD, JOB_TEST_MODEL, JOB_UPLOAD_ARTIFACT,
};
use crate::infra::http_client::ReqwestHttp;
use crate::pipeline::processing::cleaning::CleaningRules;

/// Download an artifact and republish it under a pipeline-local name.
#[derive(Parser, Debug, Clone)]
#[command(name = "get-data", version)]
pub struct FetchArgs {
    /// Artifact reference (name[:version]) or http(s) URL of the sample
    #[arg(long)]
    pub sample: String,

    /// Name of the output artifact
    #[arg(long = "artifact_name")]
    pub artifact_name: String,

    /// Type of the output artifact
    #[arg(long = "artifact_type")]
    pub artifact_type: String,

    /// Description of the output artifact
    #[arg(long = "artifact_description")]
    pub artifact_description: String,
}

/// Perform basic cleaning on the raw data.
#[derive(Parser, Debug, Clone)]
#[command(name = "basic-cleaning", version)]
pub struct CleanArgs {
    /// Name of the input artifact (raw data)
    #[arg(long = "input_artifact")]
    pub input_artifact: String,

    /// Name for the output artifact (cleaned data)
    #[arg(long = "output_artifact")]
    pub output_artifact: String,

    /// Type of the output artifact
    #[arg(long = "output_type")]
    pub output_type: String,

    /// Description for the output artifact
    #[arg(long = "output_description")]
    pub output_description: String,

    /// First column to drop nulls from
    #[arg(long = "col_to_clean1")]
    pub col_to_clean1: String,

    /// Second column to drop nulls from
    #[arg(long = "col_to_clean2")]
    pub col_to_clean2: String,

    /// Minimum price to keep
    #[arg(long = "min_price", allow_negative_numbers = true)]
    pub min_price: f64,

    /// Maximum price to keep
    #[arg(long = "max_price", allow_negative_numbers = true)]
    pub max_price: f64,

    /// Also drop listings outside the NYC bounding box
    #[arg(long = "filter_boundaries")]
    pub filter_boundaries: bool,
}

/// Run data checks on the cleaned data.
#[derive(Parser, Debug, Clone)]
#[command(name = "data-check", version)]
pub struct DataCheckArgs {
    /// Name of the input artifact (cleaned data)
    #[arg(long)]
    pub csv: String,

    /// Name of the reference artifact
    #[arg(long = "ref")]
    pub reference: String,

    /// KL divergence threshold
    #[arg(long = "kl_threshold")]
    pub kl_threshold: f64,

    /// Minimum expected price
    #[arg(long = "min_price", allow_negative_numbers = true)]
    pub min_price: f64,

    /// Maximum expected price
    #[arg(long = "max_price", allow_negative_numbers = true)]
    pub max_price: f64,
}

/// Test the exported model against the held-out test set.
#[derive(Parser, Debug, Clone)]
#[command(name = "test-regression-model", version)]
pub struct EvaluateArgs {
    /// Model artifact to test
    #[arg(long = "mlflow_model")]
    pub mlflow_model: String,

    /// Test dataset artifact
    #[arg(long = "test_dataset")]
    pub test_dataset: String,
}

/// Log a local file as a new artifact.
#[derive(Parser, Debug, Clone)]
#[command(name = "upload-artifact", version)]
pub struct UploadArgs {
    #[arg(long = "file_path", default_value = "sample2.csv")]
    pub file_path: PathBuf,

    /// Project namespace in the artifact store (defaults to the configured project)
    #[arg(long = "project")]
    pub project: Option<String>,

    #[arg(long = "artifact_name", default_value = "sample2.csv")]
    pub artifact_name: String,

    #[arg(long = "artifact_type", default_value = "raw_data")]
    pub artifact_type: String,

    /// Alias to point at the logged version (repeatable)
    #[arg(long = "alias")]
    pub aliases: Vec<String>,
}

pub fn run_fetch(args: FetchArgs, config: &PipelineConfig) -> Result<()> {
    let params = FetchParams {
        sample: args.sample,
        artifact_name: args.artifact_name,
        artifact_type: args.artifact_type,
        artifact_description: args.artifact_description,
        download_dir: config.download_dir.clone(),
        output_dir: PathBuf::from("."),
    };
    run_stage(config, JOB_DOWNLOAD, |run| {
        FetchUseCase::new(run, &ReqwestHttp).execute(&params)
    })?;
    Ok(())
}

pub fn run_clean(args: CleanArgs, config: &PipelineConfig) -> Result<()> {
    let rules = CleaningRules::new(
        vec![args.col_to_clean1, args.col_to_clean2],
        args.min_price,
        args.max_price,
    )
    .with_boundary_filter(args.filter_boundaries);
    let params = CleanParams {
        input_artifact: args.input_artifact,
        output_artifact: args.output_artifact,
        output_type: args.output_type,
        output_description: args.output_description,
        rules,
        output_dir: PathBuf::from("."),
    };
    let report = run_stage(config, JOB_BASIC_CLEANING, |run| {
        run_basic_cleaning(run, &params)
    })?;
    info!(
        input_rows = report.input_rows,
        output_rows = report.output_rows,
        artifact = %report.artifact.reference(),
        "Cleaned data published"
    );
    Ok(())
}

pub fn run_check(args: DataCheckArgs, config: &PipelineConfig) -> Result<()> {
    let params = DataCheckParams {
        csv: args.csv,
        reference: args.reference,
        kl_threshold: args.kl_threshold,
        min_price: args.min_price,
        max_price: args.max_price,
    };
    run_stage(config, JOB_DATA_CHECK, |run| run_data_check(run, &params))
}

pub fn run_evaluate(args: EvaluateArgs, config: &PipelineConfig) -> Result<()> {
    let params = EvaluateParams {
        model_artifact: args.mlflow_model,
        test_dataset: args.test_dataset,
        download_dir: config.download_dir.clone(),
    };
    run_stage(config, JOB_TEST_MODEL, |run| {
        run_test_regression_model(run, &params)
    })?;
    Ok(())
}

pub fn run_upload(args: UploadArgs, config: &PipelineConfig) -> Result<()> {
    let config = match &args.project {
        Some(project) => config.clone().with_project(project),
        None => config.clone(),
    };
    let params = UploadParams {
        file_path: args.file_path,
        artifact_name: args.artifact_name,
        artifact_type: args.artifact_type,
        aliases: args.aliases,
    };
    run_stage(&config, JOB_UPLOAD_ARTIFACT, |run| upload_file(run, &params))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_args_keep_snake_case_flags() {
        let args = CleanArgs::try_parse_from([
            "basic-cleaning",
            "--input_artifact",
            "sample.csv:latest",
            "--output_artifact",
            "clean_sample.csv",
            "--output_type",
            "clean_sample",
            "--output_description",
            "Data with outliers and null values removed",
            "--col_to_clean1",
            "last_review",
            "--col_to_clean2",
            "reviews_per_month",
            "--min_price",
            "10",
            "--max_price",
            "350",
        ])
        .unwrap();
        assert_eq!(args.input_artifact, "sample.csv:latest");
        assert_eq!(args.max_price, 350.0);
        assert!(!args.filter_boundaries);
    }

    #[test]
    fn data_check_requires_every_argument() {
        assert!(DataCheckArgs::try_parse_from(["data-check", "--csv", "clean_sample.csv"]).is_err());
        let args = DataCheckArgs::try_parse_from([
            "data-check",
            "--csv",
            "clean_sample.csv:latest",
            "--ref",
            "clean_sample.csv:reference",
            "--kl_threshold",
            "0.2",
            "--min_price",
            "10",
            "--max_price",
            "350",
        ])
        .unwrap();
        assert_eq!(args.reference, "clean_sample.csv:reference");
        assert_eq!(args.kl_threshold, 0.2);
    }

    #[test]
    fn upload_defaults_match_the_seed_sample() {
        let args = UploadArgs::try_parse_from(["upload-artifact"]).unwrap();
        assert_eq!(args.file_path, PathBuf::from("sample2.csv"));
        assert_eq!(args.project, None);
        assert_eq!(args.artifact_type, "raw_data");
        assert!(args.aliases.is_empty());

        let tagged = UploadArgs::try_parse_from([
            "upload-artifact",
            "--alias",
            "reference",
            "--alias",
            "baseline",
        ])
        .unwrap();
        assert_eq!(tagged.aliases, vec!["reference", "baseline"]);
    }
}
