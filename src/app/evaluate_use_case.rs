use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::app::ports::TrackingPort;
use crate::constants::{PRICE_COLUMN, TEST_MAE_KEY};
use crate::pipeline::frame::load_csv;
use crate::pipeline::processing::regression::{load_model, mean_absolute_error, split_features_and_target};

#[derive(Debug, Clone)]
pub struct EvaluateParams {
    pub model_artifact: String,
    pub test_dataset: String,
    /// Directory the model artifact is downloaded into
    pub download_dir: PathBuf,
}

/// Score the exported model on the held-out set and record `test_mae`.
pub fn run_test_regression_model(tracker: &mut dyn TrackingPort, params: &EvaluateParams) -> Result<f64> {
    info!(artifact = %params.model_artifact, "Downloading artifact");
    let model_dir = tracker.download(&params.model_artifact, &params.download_dir.join("model"))?;

    info!(artifact = %params.test_dataset, "Downloading artifact");
    let test_path = tracker.file(&params.test_dataset)?;

    info!("Loading model and test data");
    let model = load_model(&model_dir)?;
    let df = load_csv(&test_path)
        .with_context(|| format!("Failed to load {}", test_path.display()))?;
    let (x_test, y_test) = split_features_and_target(&df, PRICE_COLUMN)?;

    info!("Running inference");
    let y_pred = model.predict(&x_test)?;
    let mae = mean_absolute_error(&y_test, &y_pred)?;

    info!(mae, "Test MAE");
    tracker.set_summary(TEST_MAE_KEY, serde_json::json!(mae));
    Ok(mae)
}
