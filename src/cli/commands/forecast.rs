use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use common::{Assortment, ForecastAdvice, ScenarioRequest, StoreType};
use compute::{Scenario, default_advisor, model::shared_model};
use std::path::PathBuf;
use tracing::{debug, info};
use validator::Validate;

use crate::config::load_settings;
use crate::helpers::converters::advice_from_output;

/// Arguments of the `forecast` command
#[derive(Debug, Clone)]
pub struct ForecastArgs {
    pub model_path: Option<PathBuf>,
    pub date: NaiveDate,
    pub promo: bool,
    pub school_holiday: bool,
    pub store_type: StoreType,
    pub assortment: Option<Assortment>,
    pub raw: bool,
    pub json: bool,
}

pub fn forecast(args: ForecastArgs) -> Result<()> {
    let settings = load_settings()?;
    let model_path = args.model_path.clone().unwrap_or(settings.model_path);
    debug!("Forecasting with model at {}", model_path.display());

    let request = scenario_request(&args)?;
    let model = shared_model(&model_path)?;

    let output = default_advisor(Some(settings.lift_threshold))
        .advise(model.as_ref(), &Scenario::from(&request))?;
    let advice = advice_from_output(&request, &output).map_err(|e| anyhow!(e))?;
    info!("Forecast generated for {}", advice.date);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&advice)?);
    } else {
        print!("{}", render_text(&advice));
    }
    Ok(())
}

/// Builds the request and applies the same checks as the HTTP API
fn scenario_request(args: &ForecastArgs) -> Result<ScenarioRequest> {
    let request = ScenarioRequest {
        date: args.date,
        promo: args.promo,
        school_holiday: args.school_holiday,
        store_type: args.store_type,
        assortment: args.assortment,
        include_raw: args.raw,
    };
    request
        .validate()
        .map_err(|e| anyhow!("Invalid forecast scenario: {}", e))?;
    Ok(request)
}

/// Plain text rendering of a forecast, one fact per line
pub fn render_text(advice: &ForecastAdvice) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Predicted Sales for {}: {}\n",
        advice.date, advice.predicted_sales_display
    ));
    out.push_str(&format!(
        "Predicted Sales Lift from Promotion: {}\n",
        advice.lift_display
    ));
    out.push_str(&format!("{}\n", advice.recommendation_message));
    for note in &advice.notes {
        out.push_str(&format!("Note: {}\n", note));
    }

    if let Some(rows) = &advice.raw_forecast {
        out.push_str("\nRaw forecast data:\n");
        for row in rows {
            let values: Vec<String> = row
                .values
                .iter()
                .map(|(name, value)| format!("{}={:.2}", name, value))
                .collect();
            out.push_str(&format!("{}  {}\n", row.ds, values.join("  ")));
        }
    }
    out
}
