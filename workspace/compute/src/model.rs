use chrono::NaiveDate;
use common::ModelInfo;
use polars::prelude::*;
use std::collections::BTreeMap;

use crate::error::{ComputeError, Result};

pub mod additive;
pub mod loader;

pub use additive::AdditiveModel;
pub use loader::{load_model, shared_model};

/// Name of the point forecast column in a model's output table.
pub const YHAT: &str = "yhat";

/// A trained forecasting model.
///
/// `predict` takes a feature table (one row per date, `ds` plus feature
/// columns) and returns a table with one row per input row that contains at
/// least `ds` and [`YHAT`].
pub trait ForecastModel: Send + Sync {
    fn predict(&self, features: &DataFrame) -> Result<DataFrame>;

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> &str;

    /// Describe the model for display
    fn info(&self) -> ModelInfo {
        ModelInfo {
            name: self.name().to_string(),
            version: self.version().to_string(),
            regressors: Vec::new(),
            seasonalities: BTreeMap::new(),
            interval_width: 0.0,
        }
    }
}

/// Reads the expected value (first row of [`YHAT`]) from a forecast table.
pub fn expected_value(forecast: &DataFrame) -> Result<f64> {
    let column = forecast
        .column(YHAT)
        .map_err(|_| ComputeError::MissingColumn(YHAT.to_string()))?;

    if forecast.height() == 0 {
        return Err(ComputeError::EmptyPrediction);
    }

    let value = column.get(0)?.try_extract::<f64>()?;
    if !value.is_finite() {
        return Err(ComputeError::Prediction(format!(
            "Model returned a non-finite {}: {}",
            YHAT, value
        )));
    }
    Ok(value)
}

/// Reads a date column as `NaiveDate` values.
pub(crate) fn date_values(df: &DataFrame, name: &str) -> Result<Vec<NaiveDate>> {
    let column = df
        .column(name)
        .map_err(|_| ComputeError::MissingColumn(name.to_string()))?;
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
        .ok_or_else(|| ComputeError::Date("Invalid epoch".to_string()))?;

    let mut dates = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let date = match column.get(i)? {
            AnyValue::Date(days) => epoch
                .checked_add_signed(chrono::Duration::days(days as i64))
                .ok_or_else(|| ComputeError::Date(format!("Date out of range at row {}: {}", i, days)))?,
            other => {
                return Err(ComputeError::Date(format!(
                    "Expected a date in column {} at row {}, got {}",
                    name, i, other
                )));
            }
        };
        dates.push(date);
    }
    Ok(dates)
}

/// Reads a numeric column as `f64` values, nulls are rejected.
pub(crate) fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| ComputeError::MissingColumn(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;

    series
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.ok_or_else(|| ComputeError::DataFrame(format!("Null value in column {} at row {}", name, i)))
        })
        .collect()
}
