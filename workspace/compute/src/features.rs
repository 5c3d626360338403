//! Scenario description and its one-hot encoded feature row.
//!
//! A [`FeatureRow`] is the exact input contract of the forecasting model: a
//! date column `ds` followed by integer flag columns. Only the fields listed
//! here reach the model, everything else on a [`Scenario`] is informational.

use chrono::NaiveDate;
use common::{Assortment, ScenarioRequest, StoreType};
use polars::prelude::*;

use crate::error::Result;

pub const DS: &str = "ds";
pub const PROMO: &str = "Promo";
pub const SCHOOL_HOLIDAY: &str = "SchoolHoliday";
pub const STORE_TYPE_A: &str = "StoreType_a";
pub const STORE_TYPE_B: &str = "StoreType_b";
pub const STORE_TYPE_C: &str = "StoreType_c";
pub const STORE_TYPE_D: &str = "StoreType_d";

/// Feature columns in the order the model expects them, after `ds`.
pub const FEATURE_COLUMNS: [&str; 6] = [
    PROMO,
    SCHOOL_HOLIDAY,
    STORE_TYPE_A,
    STORE_TYPE_B,
    STORE_TYPE_C,
    STORE_TYPE_D,
];

/// What the user asked to forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scenario {
    pub date: NaiveDate,
    pub promo_active: bool,
    pub school_holiday: bool,
    pub store_type: StoreType,
    /// Not a model feature, kept so callers can echo it back.
    pub assortment: Option<Assortment>,
}

impl Scenario {
    pub fn new(date: NaiveDate, promo_active: bool, school_holiday: bool, store_type: StoreType) -> Self {
        Self {
            date,
            promo_active,
            school_holiday,
            store_type,
            assortment: None,
        }
    }

    pub fn with_assortment(mut self, assortment: Option<Assortment>) -> Self {
        self.assortment = assortment;
        self
    }
}

impl From<&ScenarioRequest> for Scenario {
    fn from(request: &ScenarioRequest) -> Self {
        Scenario::new(
            request.date,
            request.promo,
            request.school_holiday,
            request.store_type,
        )
        .with_assortment(request.assortment)
    }
}

/// Flattened model input for one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureRow {
    pub ds: NaiveDate,
    pub promo: i32,
    pub school_holiday: i32,
    pub store_type_a: i32,
    pub store_type_b: i32,
    pub store_type_c: i32,
    pub store_type_d: i32,
}

impl FeatureRow {
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let flag = |on: bool| if on { 1 } else { 0 };
        Self {
            ds: scenario.date,
            promo: flag(scenario.promo_active),
            school_holiday: flag(scenario.school_holiday),
            store_type_a: flag(scenario.store_type == StoreType::A),
            store_type_b: flag(scenario.store_type == StoreType::B),
            store_type_c: flag(scenario.store_type == StoreType::C),
            store_type_d: flag(scenario.store_type == StoreType::D),
        }
    }

    /// Counterfactual copy of this row with the promotion switched off.
    pub fn without_promo(&self) -> Self {
        Self { promo: 0, ..*self }
    }

    /// Single-row DataFrame with columns `ds` then [`FEATURE_COLUMNS`].
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let df = DataFrame::new(vec![
            Series::new(DS.into(), vec![self.ds]).into(),
            Series::new(PROMO.into(), vec![self.promo]).into(),
            Series::new(SCHOOL_HOLIDAY.into(), vec![self.school_holiday]).into(),
            Series::new(STORE_TYPE_A.into(), vec![self.store_type_a]).into(),
            Series::new(STORE_TYPE_B.into(), vec![self.store_type_b]).into(),
            Series::new(STORE_TYPE_C.into(), vec![self.store_type_c]).into(),
            Series::new(STORE_TYPE_D.into(), vec![self.store_type_d]).into(),
        ])?;
        Ok(df)
    }
}
