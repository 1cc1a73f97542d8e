use polars::prelude::*;
use std::collections::BTreeMap;

use crate::error::Result;

/// Normalized frequency of each non-null value in `column`, ordered by value.
pub fn category_distribution(df: &DataFrame, column: &str) -> Result<BTreeMap<String, f64>> {
    let series = df.column(column)?.cast(&DataType::Utf8)?;
    let values = series.utf8()?;
    let total = values.len() - values.null_count();

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in values.into_iter().flatten() {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    Ok(counts
        .into_iter()
        .map(|(k, n)| (k, n as f64 / total as f64))
        .collect())
}

/// `|a - b| <= atol + rtol * |b|` with atol 1e-8 and rtol 1e-5.
pub fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-8 + 1e-5 * b.abs()
}

/// Kullback-Leibler divergence D(p || q) in bits.
///
/// Both inputs are renormalized first. Terms with `p == 0` contribute nothing;
/// a positive `p` against a zero `q` makes the divergence infinite.
pub fn kl_divergence_bits(p: &[f64], q: &[f64]) -> f64 {
    let p_total: f64 = p.iter().sum();
    let q_total: f64 = q.iter().sum();
    p.iter()
        .zip(q)
        .map(|(&pi, &qi)| {
            let pi = pi / p_total;
            let qi = qi / q_total;
            if pi == 0.0 {
                0.0
            } else if qi > 0.0 {
                pi * (pi / qi).log2()
            } else {
                f64::INFINITY
            }
        })
        .sum()
}
