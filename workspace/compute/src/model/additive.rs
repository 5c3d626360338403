//! Additive time-series model with the same output contract as Prophet.
//!
//! `yhat(t) = trend(t) + Σ seasonality(t) + Σ coefficient · regressor`
//!
//! The trend is piecewise linear in days since `trend.origin`, each
//! seasonality is a Fourier series over days since the Unix epoch, and
//! regressors are linear terms on the feature columns.

use chrono::NaiveDate;
use common::ModelInfo;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use tracing::{debug, instrument, trace};

use super::{date_values, f64_values, ForecastModel, YHAT};
use crate::error::{ComputeError, Result};
use crate::features::DS;

pub const TREND: &str = "trend";
pub const ADDITIVE_TERMS: &str = "additive_terms";
pub const YHAT_LOWER: &str = "yhat_lower";
pub const YHAT_UPPER: &str = "yhat_upper";

/// Output columns no seasonality or regressor may be named after.
const RESERVED_COLUMNS: [&str; 6] = [DS, TREND, ADDITIVE_TERMS, YHAT_LOWER, YHAT_UPPER, YHAT];

/// A change of growth rate at a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Changepoint {
    pub date: NaiveDate,
    /// Added to the growth rate from this date on
    pub delta: f64,
}

/// Piecewise linear trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub origin: NaiveDate,
    /// Growth per day at the origin
    pub k: f64,
    /// Level at the origin
    pub m: f64,
    #[serde(default)]
    pub changepoints: Vec<Changepoint>,
}

impl Trend {
    fn value_at(&self, date: NaiveDate) -> f64 {
        let t = (date - self.origin).num_days() as f64;
        let mut rate = self.k;
        let mut offset = self.m;
        for cp in &self.changepoints {
            let s = (cp.date - self.origin).num_days() as f64;
            if t >= s {
                rate += cp.delta;
                // keeps the trend continuous at the changepoint
                offset -= s * cp.delta;
            }
        }
        rate * t + offset
    }
}

/// Fourier seasonal component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    /// Period in days (7 for weekly, 365.25 for yearly)
    pub period: f64,
    /// `(a_n, b_n)` for n = 1..=order
    pub coefficients: Vec<(f64, f64)>,
}

impl Seasonality {
    fn value_at(&self, date: NaiveDate) -> f64 {
        let t = days_since_epoch(date);
        self.coefficients
            .iter()
            .enumerate()
            .map(|(i, (a, b))| {
                let x = 2.0 * PI * (i as f64 + 1.0) * t / self.period;
                a * x.cos() + b * x.sin()
            })
            .sum()
    }
}

fn days_since_epoch(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - epoch).num_days() as f64
}

fn default_interval_width() -> f64 {
    0.8
}

/// Serializable additive forecasting model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditiveModel {
    pub name: String,
    pub version: String,
    pub trend: Trend,
    #[serde(default)]
    pub seasonalities: BTreeMap<String, Seasonality>,
    /// Coefficient per feature column
    #[serde(default)]
    pub regressors: BTreeMap<String, f64>,
    /// Width of the uncertainty interval, in (0, 1)
    #[serde(default = "default_interval_width")]
    pub interval_width: f64,
    /// Residual standard deviation
    #[serde(default)]
    pub sigma: f64,
}

impl AdditiveModel {
    /// Checks that the parameters describe a usable model.
    pub fn validate(&self) -> Result<()> {
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ComputeError::InvalidModel(format!(
                "interval_width must be in (0, 1), got {}",
                self.interval_width
            )));
        }
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(ComputeError::InvalidModel(format!(
                "sigma must be a non-negative number, got {}",
                self.sigma
            )));
        }
        for (name, seasonality) in &self.seasonalities {
            if !(seasonality.period.is_finite() && seasonality.period > 0.0) {
                return Err(ComputeError::InvalidModel(format!(
                    "seasonality {} must have a positive period, got {}",
                    name, seasonality.period
                )));
            }
        }
        for (name, coefficient) in &self.regressors {
            if !coefficient.is_finite() {
                return Err(ComputeError::InvalidModel(format!(
                    "regressor {} has a non-finite coefficient",
                    name
                )));
            }
            if self.seasonalities.contains_key(name) {
                return Err(ComputeError::InvalidModel(format!(
                    "{} is both a seasonality and a regressor",
                    name
                )));
            }
        }
        // Each component becomes an output column of its own.
        if let Some(name) = self
            .seasonalities
            .keys()
            .chain(self.regressors.keys())
            .find(|name| RESERVED_COLUMNS.contains(&name.as_str()))
        {
            return Err(ComputeError::InvalidModel(format!(
                "component name {} is reserved for forecast output",
                name
            )));
        }
        Ok(())
    }

    /// Z-score for the configured interval width.
    fn z_score(&self) -> f64 {
        match self.interval_width {
            x if x >= 0.99 => 2.576,
            x if x >= 0.95 => 1.96,
            x if x >= 0.90 => 1.645,
            x if x >= 0.80 => 1.282,
            _ => 0.674,
        }
    }
}

impl ForecastModel for AdditiveModel {
    #[instrument(skip(self, features), fields(model = %self.name, rows = features.height()))]
    fn predict(&self, features: &DataFrame) -> Result<DataFrame> {
        let dates = date_values(features, DS)?;

        let trend: Vec<f64> = dates.iter().map(|d| self.trend.value_at(*d)).collect();
        let mut additive = vec![0.0; dates.len()];
        let mut columns: Vec<Column> = vec![
            Series::new(DS.into(), dates.clone()).into(),
            Series::new(TREND.into(), trend.clone()).into(),
        ];

        for (name, seasonality) in &self.seasonalities {
            let values: Vec<f64> = dates.iter().map(|d| seasonality.value_at(*d)).collect();
            for (acc, v) in additive.iter_mut().zip(&values) {
                *acc += v;
            }
            trace!("Seasonality {} computed", name);
            columns.push(Series::new(name.as_str().into(), values).into());
        }

        for (name, coefficient) in &self.regressors {
            let inputs = f64_values(features, name)?;
            let values: Vec<f64> = inputs.iter().map(|x| x * coefficient).collect();
            for (acc, v) in additive.iter_mut().zip(&values) {
                *acc += v;
            }
            columns.push(Series::new(name.as_str().into(), values).into());
        }

        let yhat: Vec<f64> = trend.iter().zip(&additive).map(|(t, a)| t + a).collect();
        let spread = self.z_score() * self.sigma;
        let lower: Vec<f64> = yhat.iter().map(|y| y - spread).collect();
        let upper: Vec<f64> = yhat.iter().map(|y| y + spread).collect();

        columns.push(Series::new(ADDITIVE_TERMS.into(), additive).into());
        columns.push(Series::new(YHAT_LOWER.into(), lower).into());
        columns.push(Series::new(YHAT_UPPER.into(), upper).into());
        columns.push(Series::new(YHAT.into(), yhat).into());

        let forecast = DataFrame::new(columns)?;
        debug!("Predicted {} rows", forecast.height());
        Ok(forecast)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            name: self.name.clone(),
            version: self.version.clone(),
            regressors: self.regressors.keys().cloned().collect(),
            seasonalities: self
                .seasonalities
                .iter()
                .map(|(name, s)| (name.clone(), s.period))
                .collect(),
            interval_width: self.interval_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureRow, Scenario};
    use crate::model::expected_value;
    use common::StoreType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn flat_model() -> AdditiveModel {
        AdditiveModel {
            name: "flat".to_string(),
            version: "test".to_string(),
            trend: Trend {
                origin: date(2013, 1, 1),
                k: 0.0,
                m: 5000.0,
                changepoints: vec![],
            },
            seasonalities: BTreeMap::new(),
            regressors: BTreeMap::from([
                ("Promo".to_string(), 2000.0),
                ("SchoolHoliday".to_string(), 300.0),
                ("StoreType_c".to_string(), 150.0),
            ]),
            interval_width: 0.95,
            sigma: 100.0,
        }
    }

    fn features(promo: bool) -> DataFrame {
        let scenario = Scenario::new(date(2015, 8, 1), promo, false, StoreType::C);
        FeatureRow::from_scenario(&scenario).to_dataframe().unwrap()
    }

    #[test]
    fn test_regressors_are_added_to_trend() {
        let model = flat_model();

        let with_promo = expected_value(&model.predict(&features(true)).unwrap()).unwrap();
        let without_promo = expected_value(&model.predict(&features(false)).unwrap()).unwrap();

        assert!((with_promo - 7150.0).abs() < 1e-9);
        assert!((without_promo - 5150.0).abs() < 1e-9);
    }

    #[test]
    fn test_uncertainty_interval() {
        let forecast = flat_model().predict(&features(true)).unwrap();
        let lower = f64_values(&forecast, YHAT_LOWER).unwrap()[0];
        let upper = f64_values(&forecast, YHAT_UPPER).unwrap()[0];
        let yhat = f64_values(&forecast, YHAT).unwrap()[0];

        assert!((upper - yhat - 196.0).abs() < 1e-9);
        assert!((yhat - lower - 196.0).abs() < 1e-9);
    }

    #[test]
    fn test_trend_is_continuous_at_changepoint() {
        let trend = Trend {
            origin: date(2013, 1, 1),
            k: 2.0,
            m: 100.0,
            changepoints: vec![Changepoint {
                date: date(2013, 1, 11),
                delta: -1.0,
            }],
        };

        assert_eq!(trend.value_at(date(2013, 1, 1)), 100.0);
        assert_eq!(trend.value_at(date(2013, 1, 11)), 120.0);
        // slope drops to 1.0 after the changepoint
        assert_eq!(trend.value_at(date(2013, 1, 21)), 130.0);
    }

    #[test]
    fn test_weekly_seasonality_repeats() {
        let seasonality = Seasonality {
            period: 7.0,
            coefficients: vec![(120.0, -40.0), (15.0, 5.0)],
        };
        let a = seasonality.value_at(date(2015, 8, 1));
        let b = seasonality.value_at(date(2015, 8, 8));
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn test_output_contains_components() {
        let mut model = flat_model();
        model.seasonalities.insert(
            "weekly".to_string(),
            Seasonality {
                period: 7.0,
                coefficients: vec![(10.0, 0.0)],
            },
        );
        let forecast = model.predict(&features(true)).unwrap();

        for column in [DS, TREND, "weekly", "Promo", ADDITIVE_TERMS, YHAT_LOWER, YHAT_UPPER, YHAT] {
            assert!(forecast.column(column).is_ok(), "missing {}", column);
        }
        assert_eq!(forecast.height(), 1);
    }

    #[test]
    fn test_info_lists_components() {
        let info = flat_model().info();
        assert_eq!(info.name, "flat");
        assert_eq!(info.regressors, vec!["Promo", "SchoolHoliday", "StoreType_c"]);
        assert!(info.seasonalities.is_empty());
        assert_eq!(info.interval_width, 0.95);
    }

    #[test]
    fn test_missing_regressor_column() {
        let mut model = flat_model();
        model.regressors.insert("Assortment_a".to_string(), 10.0);

        let result = model.predict(&features(true));
        assert!(matches!(result, Err(ComputeError::MissingColumn(c)) if c == "Assortment_a"));
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let mut model = flat_model();
        assert!(model.validate().is_ok());

        model.interval_width = 1.5;
        assert!(matches!(model.validate(), Err(ComputeError::InvalidModel(_))));

        let mut model = flat_model();
        model.seasonalities.insert(
            "broken".to_string(),
            Seasonality {
                period: 0.0,
                coefficients: vec![],
            },
        );
        assert!(matches!(model.validate(), Err(ComputeError::InvalidModel(_))));

        let mut model = flat_model();
        model.sigma = -1.0;
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_clashing_component_names() {
        let mut model = flat_model();
        model.seasonalities.insert(
            "Promo".to_string(),
            Seasonality {
                period: 7.0,
                coefficients: vec![(1.0, 0.0)],
            },
        );
        assert!(matches!(model.validate(), Err(ComputeError::InvalidModel(_))));

        for reserved in ["ds", "trend", "additive_terms", "yhat", "yhat_lower", "yhat_upper"] {
            let mut model = flat_model();
            model.regressors.insert(reserved.to_string(), 1.0);
            assert!(
                matches!(model.validate(), Err(ComputeError::InvalidModel(_))),
                "{} accepted",
                reserved
            );
        }
    }
}
