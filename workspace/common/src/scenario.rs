use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Store format of a Rossmann-style store.
///
/// Encoded one-hot into the `StoreType_a..StoreType_d` feature columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    A,
    B,
    C,
    D,
}

impl StoreType {
    /// All store types in feature column order.
    pub const ALL: [StoreType; 4] = [StoreType::A, StoreType::B, StoreType::C, StoreType::D];

    /// Single letter code used in feature column names.
    pub fn code(&self) -> &'static str {
        match self {
            StoreType::A => "a",
            StoreType::B => "b",
            StoreType::C => "c",
            StoreType::D => "d",
        }
    }
}

impl fmt::Display for StoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for StoreType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(StoreType::A),
            "b" => Ok(StoreType::B),
            "c" => Ok(StoreType::C),
            "d" => Ok(StoreType::D),
            other => Err(format!("Unknown store type '{}', expected one of a, b, c, d", other)),
        }
    }
}

/// Assortment level of a store.
///
/// Collected from the user but not a model feature: the trained model never
/// saw it, so it is echoed back and otherwise ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Assortment {
    A,
    B,
    C,
}

impl Assortment {
    pub const ALL: [Assortment; 3] = [Assortment::A, Assortment::B, Assortment::C];

    pub fn code(&self) -> &'static str {
        match self {
            Assortment::A => "a",
            Assortment::B => "b",
            Assortment::C => "c",
        }
    }
}

impl fmt::Display for Assortment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Assortment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(Assortment::A),
            "b" => Ok(Assortment::B),
            "c" => Ok(Assortment::C),
            other => Err(format!("Unknown assortment '{}', expected one of a, b, c", other)),
        }
    }
}

/// Request body for generating a forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct ScenarioRequest {
    /// Date to forecast (YYYY-MM-DD), between 1900 and 2100
    #[validate(custom(function = "validate_forecast_date"))]
    pub date: NaiveDate,
    /// Whether a promotion runs on that date
    pub promo: bool,
    /// Whether the date is a school holiday
    #[serde(default)]
    pub school_holiday: bool,
    /// Store type (a, b, c or d)
    pub store_type: StoreType,
    /// Assortment level (a, b or c). Accepted but not used by the model.
    #[serde(default)]
    pub assortment: Option<Assortment>,
    /// Include the raw forecast table in the response
    #[serde(default)]
    pub include_raw: bool,
}

fn validate_forecast_date(date: &NaiveDate) -> Result<(), ValidationError> {
    use chrono::Datelike;

    if (1900..=2100).contains(&date.year()) {
        Ok(())
    } else {
        Err(ValidationError::new("date_out_of_range"))
    }
}

/// Initial values and option lists for the dashboard form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardDefaults {
    pub date: NaiveDate,
    pub promo: bool,
    pub school_holiday: bool,
    pub store_type: StoreType,
    pub assortment: Assortment,
    pub store_types: Vec<StoreType>,
    pub assortments: Vec<Assortment>,
}

impl Default for DashboardDefaults {
    fn default() -> Self {
        Self {
            date: NaiveDate::from_ymd_opt(2015, 8, 1).expect("valid default date"),
            promo: true,
            school_holiday: false,
            store_type: StoreType::C,
            assortment: Assortment::A,
            store_types: StoreType::ALL.to_vec(),
            assortments: Assortment::ALL.to_vec(),
        }
    }
}
