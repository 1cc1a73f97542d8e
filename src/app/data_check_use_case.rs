use anyhow::Result;
use tracing::info;

use crate::app::ports::TrackingPort;
use crate::pipeline::frame::load_csv;
use crate::pipeline::processing::quality_gate::DataCheckGate;

#[derive(Debug, Clone)]
pub struct DataCheckParams {
    /// Cleaned dataset under test
    pub csv: String,
    /// Baseline dataset for the drift check
    pub reference: String,
    pub kl_threshold: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// Run the standard data checks; any failure is returned as the error.
pub fn run_data_check(tracker: &mut dyn TrackingPort, params: &DataCheckParams) -> Result<()> {
    info!(artifact = %params.csv, "Downloading artifact");
    let data = load_csv(&tracker.file(&params.csv)?)?;

    info!(artifact = %params.reference, "Downloading reference artifact");
    let reference = load_csv(&tracker.file(&params.reference)?)?;

    info!("Running data tests");
    DataCheckGate::standard(params.kl_threshold, params.min_price, params.max_price)
        .run(&data, &reference)?;
    Ok(())
}
