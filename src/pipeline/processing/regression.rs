use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::constants::MODEL_FILE;
use crate::error::{PipelineError, Result};
use crate::pipeline::frame::{float_values, string_values};

/// A fitted model that maps feature rows to predicted prices.
pub trait Regressor {
    fn predict(&self, features: &DataFrame) -> Result<Vec<f64>>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NumericTerm {
    pub column: String,
    pub weight: f64,
    /// Substituted for nulls before weighting
    #[serde(default)]
    pub impute: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoricalTerm {
    pub column: String,
    /// One-hot weight per level; unseen levels and nulls contribute nothing
    pub levels: BTreeMap<String, f64>,
}

/// Linear model over numeric columns and one-hot encoded categorical columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearModel {
    pub intercept: f64,
    #[serde(default)]
    pub numeric: Vec<NumericTerm>,
    #[serde(default)]
    pub categorical: Vec<CategoricalTerm>,
}

impl Regressor for LinearModel {
    fn predict(&self, features: &DataFrame) -> Result<Vec<f64>> {
        let mut predictions = vec![self.intercept; features.height()];

        for term in &self.numeric {
            let values = float_values(features, &term.column)?;
            for (pred, value) in predictions.iter_mut().zip(values) {
                *pred += term.weight * value.unwrap_or(term.impute);
            }
        }

        for term in &self.categorical {
            let values = string_values(features, &term.column)?;
            for (pred, value) in predictions.iter_mut().zip(values) {
                if let Some(weight) = value.and_then(|v| term.levels.get(&v).copied()) {
                    *pred += weight;
                }
            }
        }

        Ok(predictions)
    }
}

/// On-disk model formats, tagged by `flavor`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "flavor", rename_all = "snake_case")]
pub enum ModelSpec {
    Linear(LinearModel),
}

impl ModelSpec {
    pub fn into_regressor(self) -> Box<dyn Regressor> {
        match self {
            ModelSpec::Linear(model) => Box::new(model),
        }
    }
}

/// Load the model stored in a downloaded model artifact directory.
pub fn load_model(model_dir: &Path) -> Result<Box<dyn Regressor>> {
    let path = model_dir.join(MODEL_FILE);
    if !path.is_file() {
        return Err(PipelineError::FileNotFound(path.display().to_string()));
    }
    let spec: ModelSpec = serde_json::from_str(&fs::read_to_string(&path)?)
        .map_err(|e| PipelineError::Model(format!("{}: {}", path.display(), e)))?;
    info!(path = %path.display(), "Loaded model");
    Ok(spec.into_regressor())
}

/// Serialize a model into `model_dir` so `load_model` can read it back.
pub fn save_model(spec: &ModelSpec, model_dir: &Path) -> Result<()> {
    fs::create_dir_all(model_dir)?;
    fs::write(model_dir.join(MODEL_FILE), serde_json::to_string_pretty(spec)?)?;
    Ok(())
}

/// Split a labeled frame into features and the non-null target values.
pub fn split_features_and_target(df: &DataFrame, target: &str) -> Result<(DataFrame, Vec<f64>)> {
    let labels = float_values(df, target)?;
    let nulls = labels.iter().filter(|v| v.is_none()).count();
    if nulls > 0 {
        return Err(PipelineError::Model(format!(
            "target column '{}' has {} null values",
            target, nulls
        )));
    }
    let features = df.drop(target)?;
    Ok((features, labels.into_iter().flatten().collect()))
}

pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::Model(format!(
            "{} labels but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(PipelineError::Model(
            "mean absolute error of an empty set is undefined".to_string(),
        ));
    }
    let total: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).abs())
        .sum();
    Ok(total / y_true.len() as f64)
}
