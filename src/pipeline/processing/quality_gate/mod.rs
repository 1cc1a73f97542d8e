use polars::prelude::DataFrame;
use std::collections::BTreeSet;
use tracing::{error, info};

use crate::constants::{
    EXPECTED_COLUMNS, KNOWN_NEIGHBOURHOOD_GROUPS, LATITUDE_COLUMN, LONGITUDE_COLUMN, MAX_LATITUDE,
    MAX_LONGITUDE, MAX_ROW_COUNT, MIN_LATITUDE, MIN_LONGITUDE, MIN_ROW_COUNT,
    NEIGHBOURHOOD_GROUP_COLUMN, PRICE_COLUMN,
};
use crate::error::{PipelineError, Result};
use crate::pipeline::frame::{range_mask, rejected_rows, string_values};

pub mod drift;

use drift::{category_distribution, is_close, kl_divergence_bits};

/// The dataset under test and the baseline it is compared against.
pub struct CheckContext<'a> {
    pub data: &'a DataFrame,
    pub reference: &'a DataFrame,
}

/// A single pass/fail assertion over a dataset.
pub trait DataCheck {
    fn name(&self) -> &'static str;

    /// `Ok(())` on pass; a `CheckFailed` error describing the violation otherwise.
    fn run(&self, ctx: &CheckContext<'_>) -> Result<()>;
}

fn failure(check: &dyn DataCheck, message: String) -> PipelineError {
    PipelineError::CheckFailed {
        check: check.name().to_string(),
        message,
    }
}

/// Exact column names in exact order.
pub struct ColumnNamesCheck;

impl DataCheck for ColumnNamesCheck {
    fn name(&self) -> &'static str {
        "column_names"
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<()> {
        let actual = ctx.data.get_column_names();
        if actual.as_slice() != EXPECTED_COLUMNS.as_slice() {
            return Err(failure(
                self,
                format!("expected columns {:?}, found {:?}", EXPECTED_COLUMNS, actual),
            ));
        }
        Ok(())
    }
}

/// neighbourhood_group takes exactly the five borough values.
pub struct NeighbourhoodNamesCheck;

impl DataCheck for NeighbourhoodNamesCheck {
    fn name(&self) -> &'static str {
        "neighbourhood_names"
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<()> {
        let values = string_values(ctx.data, NEIGHBOURHOOD_GROUP_COLUMN)?;
        if values.iter().any(Option::is_none) {
            return Err(failure(self, "neighbourhood_group contains nulls".to_string()));
        }
        let found: BTreeSet<String> = values.into_iter().flatten().collect();
        let known: BTreeSet<String> = KNOWN_NEIGHBOURHOOD_GROUPS
            .iter()
            .map(|s| s.to_string())
            .collect();
        if found != known {
            return Err(failure(
                self,
                format!("expected {:?}, found {:?}", known, found),
            ));
        }
        Ok(())
    }
}

/// Every listing lies inside the NYC bounding box.
pub struct ProperBoundariesCheck;

impl DataCheck for ProperBoundariesCheck {
    fn name(&self) -> &'static str {
        "proper_boundaries"
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<()> {
        let inside = &range_mask(ctx.data, LONGITUDE_COLUMN, MIN_LONGITUDE, MAX_LONGITUDE)?
            & &range_mask(ctx.data, LATITUDE_COLUMN, MIN_LATITUDE, MAX_LATITUDE)?;
        let outside = rejected_rows(&inside);
        if outside > 0 {
            return Err(failure(
                self,
                format!("{} rows fall outside the NYC bounding box", outside),
            ));
        }
        Ok(())
    }
}

/// neighbourhood_group frequencies stay within `kl_threshold` bits of the reference.
pub struct NeighbourhoodDistributionCheck {
    pub kl_threshold: f64,
}

impl DataCheck for NeighbourhoodDistributionCheck {
    fn name(&self) -> &'static str {
        "similar_neigh_distrib"
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<()> {
        let current = category_distribution(ctx.data, NEIGHBOURHOOD_GROUP_COLUMN)?;
        let reference = category_distribution(ctx.reference, NEIGHBOURHOOD_GROUP_COLUMN)?;

        for (label, dist) in [("current", &current), ("reference", &reference)] {
            let total: f64 = dist.values().sum();
            if !is_close(total, 1.0) {
                return Err(failure(
                    self,
                    format!("{} distribution sums to {}", label, total),
                ));
            }
        }
        if !current.keys().eq(reference.keys()) {
            return Err(failure(
                self,
                format!(
                    "category sets differ: {:?} vs {:?}",
                    current.keys().collect::<Vec<_>>(),
                    reference.keys().collect::<Vec<_>>()
                ),
            ));
        }

        let p: Vec<f64> = current.values().copied().collect();
        let q: Vec<f64> = reference.values().copied().collect();
        let kl = kl_divergence_bits(&p, &q);
        info!(kl_divergence = kl, threshold = self.kl_threshold, "Computed KL divergence");
        if !kl.is_finite() || kl >= self.kl_threshold {
            return Err(failure(
                self,
                format!("KL divergence {} is not below {}", kl, self.kl_threshold),
            ));
        }
        Ok(())
    }
}

/// Row count in the open interval `(min, max)`.
pub struct RowCountCheck {
    pub min: usize,
    pub max: usize,
}

impl Default for RowCountCheck {
    fn default() -> Self {
        Self {
            min: MIN_ROW_COUNT,
            max: MAX_ROW_COUNT,
        }
    }
}

impl DataCheck for RowCountCheck {
    fn name(&self) -> &'static str {
        "row_count"
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<()> {
        let rows = ctx.data.height();
        if rows <= self.min || rows >= self.max {
            return Err(failure(
                self,
                format!("{} rows, expected strictly between {} and {}", rows, self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// Every price within `[min_price, max_price]`.
pub struct PriceRangeCheck {
    pub min_price: f64,
    pub max_price: f64,
}

impl DataCheck for PriceRangeCheck {
    fn name(&self) -> &'static str {
        "price_range"
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<()> {
        let violations = rejected_rows(&range_mask(
            ctx.data,
            PRICE_COLUMN,
            self.min_price,
            self.max_price,
        )?);
        if violations > 0 {
            return Err(failure(
                self,
                format!(
                    "{} prices outside [{}, {}]",
                    violations, self.min_price, self.max_price
                ),
            ));
        }
        Ok(())
    }
}

/// Ordered battery of checks; the first failure stops the gate.
pub struct DataCheckGate {
    checks: Vec<Box<dyn DataCheck>>,
}

impl DataCheckGate {
    pub fn new(checks: Vec<Box<dyn DataCheck>>) -> Self {
        Self { checks }
    }

    /// The standard airbnb battery, in its fixed order.
    pub fn standard(kl_threshold: f64, min_price: f64, max_price: f64) -> Self {
        Self::new(vec![
            Box::new(ColumnNamesCheck),
            Box::new(NeighbourhoodNamesCheck),
            Box::new(ProperBoundariesCheck),
            Box::new(NeighbourhoodDistributionCheck { kl_threshold }),
            Box::new(RowCountCheck::default()),
            Box::new(PriceRangeCheck {
                min_price,
                max_price,
            }),
        ])
    }

    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    pub fn run(&self, data: &DataFrame, reference: &DataFrame) -> Result<()> {
        let ctx = CheckContext { data, reference };
        for check in &self.checks {
            info!(check = check.name(), "Running data check");
            if let Err(e) = check.run(&ctx) {
                error!(check = check.name(), error = %e, "Data check failed");
                return Err(e);
            }
            info!(check = check.name(), "Data check passed");
        }
        info!("All data checks passed");
        Ok(())
    }
}
