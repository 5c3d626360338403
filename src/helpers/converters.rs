use chrono::NaiveDate;
use common::display::{format_currency, format_percentage};
use common::{ForecastAdvice, ForecastRow, ScenarioRequest};
use compute::AdvisorOutput;
use polars::prelude::{AnyValue, DataFrame};
use std::collections::BTreeMap;

/// Helper function to convert a forecast DataFrame to transport rows
///
/// Every column other than `ds` is read as a float and keyed by its name.
pub fn convert_dataframe_to_rows(df: &DataFrame) -> Result<Vec<ForecastRow>, String> {
    let ds_col = df
        .column("ds")
        .map_err(|e| format!("Missing ds column: {}", e))?;
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).ok_or("Invalid epoch")?;

    let mut rows = Vec::with_capacity(df.height());

    // Iterate through rows and create ForecastRow objects
    for i in 0..df.height() {
        let ds = match ds_col
            .get(i)
            .map_err(|e| format!("Error getting ds at row {}: {}", i, e))?
        {
            AnyValue::Date(days) => epoch
                .checked_add_signed(chrono::Duration::days(days as i64))
                .ok_or_else(|| format!("Date out of range at row {}: {}", i, days))?,
            other => return Err(format!("Invalid ds value at row {}: {}", i, other)),
        };

        let mut values = BTreeMap::new();
        for column in df.get_columns() {
            let name = column.name().as_str();
            if name == "ds" {
                continue;
            }
            let value = column
                .get(i)
                .map_err(|e| format!("Error getting {} at row {}: {}", name, i, e))?
                .try_extract::<f64>()
                .map_err(|e| format!("Error extracting {} as f64 at row {}: {}", name, i, e))?;
            values.insert(name.to_string(), value);
        }

        rows.push(ForecastRow { ds, values });
    }

    Ok(rows)
}

/// Helper function to build the API payload from an advisor result
pub fn advice_from_output(
    request: &ScenarioRequest,
    output: &AdvisorOutput,
) -> Result<ForecastAdvice, String> {
    let raw_forecast = if request.include_raw {
        Some(convert_dataframe_to_rows(&output.forecast)?)
    } else {
        None
    };

    let mut notes = Vec::new();
    if let Some(assortment) = request.assortment {
        notes.push(format!(
            "Assortment '{}' is not a model feature and does not affect the forecast",
            assortment
        ));
    }
    if output.sales_no_promo == 0.0 {
        notes.push("Sales without promotion are zero, lift is unavailable".to_string());
    }

    Ok(ForecastAdvice {
        date: request.date,
        promo: request.promo,
        school_holiday: request.school_holiday,
        store_type: request.store_type,
        assortment: request.assortment,
        predicted_sales: output.predicted_sales,
        sales_no_promo: output.sales_no_promo,
        lift_percentage: output.lift_percentage,
        recommendation: output.recommendation,
        recommendation_message: output.recommendation.message().to_string(),
        predicted_sales_display: format_currency(output.predicted_sales),
        lift_display: format_percentage(output.lift_percentage),
        notes,
        raw_forecast,
    })
}
