use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::info;

use crate::error::Result;

/// Read a CSV with a header row; empty fields become nulls.
///
/// Column types are inferred from every row, so a decimal far down an
/// otherwise integral column still loads as a float.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReader::from_path(path)?
        .has_header(true)
        .infer_schema(None)
        .finish()?;

    info!(path = %path.display(), rows = df.height(), columns = df.width(), "Loaded CSV");
    Ok(df)
}

/// Write `df` as CSV with a header row and no index column.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).finish(df)?;
    info!(path = %path.display(), rows = df.height(), "Wrote CSV");
    Ok(())
}

/// Column values as floats; nulls and unparseable values come back as `None`.
pub fn float_values(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
    let series = df.column(column)?.cast(&DataType::Float64)?;
    let values = series.f64()?.into_iter().collect();
    Ok(values)
}

/// Column values as strings; nulls come back as `None`.
pub fn string_values(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    let series = df.column(column)?.cast(&DataType::Utf8)?;
    let values = series
        .utf8()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// True where `column` lies in `[min, max]`; nulls and unparseable values are false.
pub fn range_mask(df: &DataFrame, column: &str, min: f64, max: f64) -> Result<BooleanChunked> {
    let series = df.column(column)?.cast(&DataType::Float64)?;
    let values = series.f64()?;
    let mask = &values.gt_eq(min) & &values.lt_eq(max);
    Ok(nulls_as_false(&mask))
}

fn nulls_as_false(mask: &BooleanChunked) -> BooleanChunked {
    mask.into_iter().map(|flag| flag == Some(true)).collect()
}

/// Number of rows the mask rejects.
pub fn rejected_rows(mask: &BooleanChunked) -> usize {
    mask.into_iter().filter(|flag| *flag != Some(true)).count()
}

/// Keep the rows whose flag is set.
pub fn filter_rows(df: &DataFrame, keep: &BooleanChunked) -> Result<DataFrame> {
    Ok(df.filter(keep)?)
}
