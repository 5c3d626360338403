use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

use crate::scenario::{Assortment, StoreType};

/// Qualitative verdict on whether running a promotion pays off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    /// Lift is above the threshold
    Strong,
    /// Lift is at or below the threshold, or unavailable
    Weak,
}

impl Recommendation {
    /// Human readable message shown next to the lift.
    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::Strong => {
                "Recommendation: A promotion is highly effective and recommended."
            }
            Recommendation::Weak => "Recommendation: A promotion has a minor impact on sales.",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Strong => f.write_str("STRONG"),
            Recommendation::Weak => f.write_str("WEAK"),
        }
    }
}

/// One row of the raw forecast table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastRow {
    /// Forecast date
    pub ds: NaiveDate,
    /// Every numeric output column keyed by column name (yhat, trend, ...)
    pub values: BTreeMap<String, f64>,
}

/// Forecast and promotion analysis for a single scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastAdvice {
    pub date: NaiveDate,
    pub promo: bool,
    pub school_holiday: bool,
    pub store_type: StoreType,
    /// Echo of the requested assortment; it does not influence the forecast
    pub assortment: Option<Assortment>,
    /// Predicted sales for the scenario as requested
    pub predicted_sales: f64,
    /// Predicted sales for the same scenario without a promotion
    pub sales_no_promo: f64,
    /// Sales lift from the promotion in percent, absent when the no-promo
    /// baseline is zero
    pub lift_percentage: Option<f64>,
    pub recommendation: Recommendation,
    pub recommendation_message: String,
    /// Predicted sales formatted for display (e.g. "€1,234.56")
    pub predicted_sales_display: String,
    /// Lift formatted for display (e.g. "25.00%" or "n/a")
    pub lift_display: String,
    /// Notes about inputs that were accepted but ignored
    pub notes: Vec<String>,
    /// Raw forecast table of the requested scenario, when asked for
    pub raw_forecast: Option<Vec<ForecastRow>>,
}

/// Description of the loaded forecasting model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ModelInfo {
    pub name: String,
    pub version: String,
    /// Feature columns the model reads as linear regressors
    pub regressors: Vec<String>,
    /// Named seasonal components with their period in days
    pub seasonalities: BTreeMap<String, f64>,
    pub interval_width: f64,
}
