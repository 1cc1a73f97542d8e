use polars::prelude::DataFrame;
use tracing::info;

use crate::constants::{
    LATITUDE_COLUMN, LONGITUDE_COLUMN, MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE,
    PRICE_COLUMN,
};
use crate::error::Result;
use crate::pipeline::frame::{filter_rows, range_mask};

/// Rules applied by the basic cleaning stage.
#[derive(Debug, Clone)]
pub struct CleaningRules {
    /// Rows with a null in any of these columns are dropped
    pub drop_null_columns: Vec<String>,
    pub min_price: f64,
    pub max_price: f64,
    /// Also keep only listings inside the NYC bounding box
    pub filter_boundaries: bool,
}

impl CleaningRules {
    pub fn new(drop_null_columns: Vec<String>, min_price: f64, max_price: f64) -> Self {
        Self {
            drop_null_columns,
            min_price,
            max_price,
            filter_boundaries: false,
        }
    }

    pub fn with_boundary_filter(mut self, enabled: bool) -> Self {
        self.filter_boundaries = enabled;
        self
    }
}

/// Drop rows with nulls in the designated columns, then keep rows whose price
/// lies in `[min_price, max_price]`.
pub fn clean(df: &DataFrame, rules: &CleaningRules) -> Result<DataFrame> {
    let input_rows = df.height();

    let df = if rules.drop_null_columns.is_empty() {
        df.clone()
    } else {
        info!(columns = ?rules.drop_null_columns, "Dropping rows with missing values");
        df.drop_nulls(Some(rules.drop_null_columns.as_slice()))?
    };

    info!(min = rules.min_price, max = rules.max_price, "Filtering by price range");
    let mut keep = range_mask(&df, PRICE_COLUMN, rules.min_price, rules.max_price)?;

    if rules.filter_boundaries {
        info!("Filtering by geographic boundaries");
        keep = &keep & &range_mask(&df, LONGITUDE_COLUMN, MIN_LONGITUDE, MAX_LONGITUDE)?;
        keep = &keep & &range_mask(&df, LATITUDE_COLUMN, MIN_LATITUDE, MAX_LATITUDE)?;
    }

    let cleaned = filter_rows(&df, &keep)?;
    info!(
        input_rows,
        output_rows = cleaned.height(),
        "Basic cleaning applied"
    );
    Ok(cleaned)
}
