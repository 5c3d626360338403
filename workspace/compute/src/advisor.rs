//! Promotion advisor.
//!
//! Runs the forecasting model on a scenario and on the same scenario with the
//! promotion switched off, then turns the difference into a lift percentage
//! and a recommendation.

use common::Recommendation;
use polars::prelude::DataFrame;
use tracing::{debug, info, instrument};

use crate::error::{ComputeError, Result};
use crate::features::{FeatureRow, Scenario};
use crate::model::{expected_value, ForecastModel};

/// Lift (in percent) a promotion has to exceed to be recommended.
pub const DEFAULT_LIFT_THRESHOLD: f64 = 15.0;

/// Runs the model on one feature row.
///
/// Any failure inside the model surfaces as a prediction error.
fn predict_row(model: &dyn ForecastModel, row: &FeatureRow) -> Result<DataFrame> {
    model.predict(&row.to_dataframe()?).map_err(|e| match e {
        ComputeError::Prediction(_) | ComputeError::EmptyPrediction => e,
        other => ComputeError::Prediction(other.to_string()),
    })
}

/// Result of advising on a single scenario.
#[derive(Debug, Clone)]
pub struct AdvisorOutput {
    pub predicted_sales: f64,
    pub sales_no_promo: f64,
    /// `None` when the no-promo baseline is zero
    pub lift_percentage: Option<f64>,
    pub recommendation: Recommendation,
    /// Full model output for the scenario as requested
    pub forecast: DataFrame,
}

impl PartialEq for AdvisorOutput {
    fn eq(&self, other: &Self) -> bool {
        self.predicted_sales == other.predicted_sales
            && self.sales_no_promo == other.sales_no_promo
            && self.lift_percentage == other.lift_percentage
            && self.recommendation == other.recommendation
            && self.forecast.equals_missing(&other.forecast)
    }
}

/// Relative change of `value` over `baseline` in percent.
///
/// Returns `None` for a zero baseline instead of dividing by it.
pub fn lift_percentage(value: f64, baseline: f64) -> Option<f64> {
    if baseline == 0.0 {
        return None;
    }
    let lift = (value - baseline) / baseline * 100.0;
    lift.is_finite().then_some(lift)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastAdvisor {
    threshold: f64,
}

impl Default for ForecastAdvisor {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_LIFT_THRESHOLD,
        }
    }
}

impl ForecastAdvisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// STRONG only when the lift is strictly above the threshold.
    pub fn recommend(&self, lift: Option<f64>) -> Recommendation {
        match lift {
            Some(lift) if lift > self.threshold => Recommendation::Strong,
            _ => Recommendation::Weak,
        }
    }

    /// Forecasts `scenario` and rates the promotion.
    ///
    /// The model is always called twice: once with the scenario's own promo
    /// flag and once with `Promo = 0`, even if the scenario has no promotion.
    #[instrument(skip(self, model), fields(model = model.name()))]
    pub fn advise(&self, model: &dyn ForecastModel, scenario: &Scenario) -> Result<AdvisorOutput> {
        let row = FeatureRow::from_scenario(scenario);
        let counterfactual = row.without_promo();

        let forecast = predict_row(model, &row)?;
        let predicted_sales = expected_value(&forecast)?;

        let forecast_no_promo = predict_row(model, &counterfactual)?;
        let sales_no_promo = expected_value(&forecast_no_promo)?;
        debug!(predicted_sales, sales_no_promo, "Predictions computed");

        let lift = lift_percentage(predicted_sales, sales_no_promo);
        if lift.is_none() {
            info!(sales_no_promo, "Lift unavailable for this baseline");
        }
        let recommendation = self.recommend(lift);
        debug!(?lift, %recommendation, threshold = self.threshold, "Recommendation computed");

        Ok(AdvisorOutput {
            predicted_sales,
            sales_no_promo,
            lift_percentage: lift,
            recommendation,
            forecast,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{DS, PROMO};
    use crate::model::YHAT;
    use chrono::NaiveDate;
    use common::StoreType;
    use polars::prelude::*;
    use std::sync::Mutex;

    /// Returns a fixed yhat depending on the Promo flag and records calls.
    struct StubModel {
        with_promo: f64,
        without_promo: f64,
        calls: Mutex<Vec<i32>>,
    }

    impl StubModel {
        fn new(with_promo: f64, without_promo: f64) -> Self {
            Self {
                with_promo,
                without_promo,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<i32> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ForecastModel for StubModel {
        fn predict(&self, features: &DataFrame) -> crate::error::Result<DataFrame> {
            let promo = features.column(PROMO)?.get(0)?.try_extract::<i32>()?;
            self.calls.lock().unwrap().push(promo);
            let yhat = if promo == 1 { self.with_promo } else { self.without_promo };
            Ok(DataFrame::new(vec![
                features.column(DS)?.clone(),
                Series::new(YHAT.into(), vec![yhat]).into(),
            ])?)
        }

        fn name(&self) -> &str {
            "stub"
        }

        fn version(&self) -> &str {
            "test"
        }
    }

    enum Failure {
        Prediction,
        Empty,
        Internal,
    }

    /// Fails in the configured way on every call.
    struct BrokenModel {
        failure: Failure,
    }

    impl ForecastModel for BrokenModel {
        fn predict(&self, features: &DataFrame) -> crate::error::Result<DataFrame> {
            match self.failure {
                Failure::Prediction => Err(ComputeError::Prediction("model exploded".to_string())),
                Failure::Empty => {
                    Ok(DataFrame::new(vec![Series::new(YHAT.into(), Vec::<f64>::new()).into()])?)
                }
                // Duplicate column names, as a model with clashing components produces
                Failure::Internal => Ok(DataFrame::new(vec![
                    features.column(PROMO)?.clone(),
                    features.column(PROMO)?.clone(),
                ])?),
            }
        }

        fn name(&self) -> &str {
            "broken"
        }

        fn version(&self) -> &str {
            "test"
        }
    }

    fn scenario(promo: bool) -> Scenario {
        Scenario::new(
            NaiveDate::from_ymd_opt(2015, 8, 1).unwrap(),
            promo,
            false,
            StoreType::C,
        )
    }

    #[test]
    fn test_strong_recommendation_example() {
        let model = StubModel::new(1000.0, 800.0);
        let output = ForecastAdvisor::new().advise(&model, &scenario(true)).unwrap();

        assert_eq!(output.predicted_sales, 1000.0);
        assert_eq!(output.sales_no_promo, 800.0);
        assert_eq!(output.lift_percentage, Some(25.0));
        assert_eq!(output.recommendation, Recommendation::Strong);
    }

    #[test]
    fn test_lift_at_threshold_is_weak() {
        let model = StubModel::new(920.0, 800.0);
        let output = ForecastAdvisor::new().advise(&model, &scenario(true)).unwrap();

        let lift = output.lift_percentage.unwrap();
        assert!((lift - 15.0).abs() < 1e-9);
        assert_eq!(output.recommendation, Recommendation::Weak);
    }

    #[test]
    fn test_threshold_is_strict() {
        let advisor = ForecastAdvisor::new();
        assert_eq!(advisor.recommend(Some(15.0)), Recommendation::Weak);
        assert_eq!(advisor.recommend(Some(15.000001)), Recommendation::Strong);
        assert_eq!(advisor.recommend(None), Recommendation::Weak);

        let lenient = ForecastAdvisor::with_threshold(5.0);
        assert_eq!(lenient.recommend(Some(10.0)), Recommendation::Strong);
    }

    #[test]
    fn test_zero_baseline_does_not_crash() {
        let model = StubModel::new(500.0, 0.0);
        let output = ForecastAdvisor::new().advise(&model, &scenario(true)).unwrap();

        assert_eq!(output.lift_percentage, None);
        assert_eq!(output.recommendation, Recommendation::Weak);
        assert_eq!(output.predicted_sales, 500.0);
    }

    #[test]
    fn test_counterfactual_call_without_promo() {
        let model = StubModel::new(1000.0, 800.0);
        let output = ForecastAdvisor::new().advise(&model, &scenario(false)).unwrap();

        assert_eq!(model.calls(), vec![0, 0]);
        assert_eq!(output.predicted_sales, 800.0);
        assert_eq!(output.lift_percentage, Some(0.0));
        assert_eq!(output.recommendation, Recommendation::Weak);
    }

    #[test]
    fn test_counterfactual_call_with_promo() {
        let model = StubModel::new(1000.0, 800.0);
        ForecastAdvisor::new().advise(&model, &scenario(true)).unwrap();

        assert_eq!(model.calls(), vec![1, 0]);
    }

    #[test]
    fn test_advise_is_idempotent() {
        let model = StubModel::new(1234.5, 1000.0);
        let advisor = ForecastAdvisor::new();

        let first = advisor.advise(&model, &scenario(true)).unwrap();
        let second = advisor.advise(&model, &scenario(true)).unwrap();

        assert_eq!(first, second);
        assert_eq!(model.calls().len(), 4);
    }

    #[test]
    fn test_prediction_failure_propagates() {
        let advisor = ForecastAdvisor::new();

        let model = BrokenModel { failure: Failure::Prediction };
        let err = advisor.advise(&model, &scenario(true)).unwrap_err();
        assert!(matches!(err, ComputeError::Prediction(_)));

        let model = BrokenModel { failure: Failure::Empty };
        let err = advisor.advise(&model, &scenario(true)).unwrap_err();
        assert!(matches!(err, ComputeError::EmptyPrediction));
    }

    #[test]
    fn test_internal_model_failure_is_prediction_error() {
        let model = BrokenModel { failure: Failure::Internal };
        let err = ForecastAdvisor::new().advise(&model, &scenario(true)).unwrap_err();

        match err {
            ComputeError::Prediction(message) => assert!(message.contains("Promo"), "{}", message),
            other => panic!("Expected prediction error, got {:?}", other),
        }
    }

    #[test]
    fn test_lift_percentage_helper() {
        assert_eq!(lift_percentage(1000.0, 800.0), Some(25.0));
        assert_eq!(lift_percentage(600.0, 800.0), Some(-25.0));
        assert_eq!(lift_percentage(1.0, 0.0), None);
        assert_eq!(lift_percentage(0.0, 0.0), None);
    }
}
