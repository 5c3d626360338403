use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use common::{DashboardDefaults, ForecastAdvice, ScenarioRequest};
use compute::{Scenario, error::ComputeError};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::helpers::converters::advice_from_output;
use crate::schemas::{ApiResponse, AppState, CachedData, ErrorResponse};

fn error_response(status: StatusCode, error: String, code: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error,
            code: code.to_string(),
            success: false,
        }),
    )
}

/// Generate a sales forecast and promotion analysis
///
/// Predicts sales for the scenario and for the same scenario without a
/// promotion, then rates the promotion by its lift.
#[utoipa::path(
    post,
    path = "/api/v1/forecast",
    tag = "forecast",
    request_body = ScenarioRequest,
    responses(
        (status = 200, description = "Forecast generated successfully", body = ApiResponse<ForecastAdvice>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 422, description = "The model could not produce a forecast", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_forecast(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<ScenarioRequest>>,
) -> Result<Json<ApiResponse<ForecastAdvice>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_forecast function");

    let cache_key = format!("advice_{:?}", request);
    if let Some(CachedData::Advice(advice)) = state.cache.get(&cache_key).await {
        debug!("Serving forecast from cache");
        return Ok(Json(ApiResponse {
            data: advice,
            message: "Forecast retrieved from cache".to_string(),
            success: true,
        }));
    }

    let scenario = Scenario::from(&request);
    if let Some(assortment) = request.assortment {
        debug!("Ignoring assortment {} which is not a model feature", assortment);
    }

    let output = state
        .advisor
        .advise(state.model.as_ref(), &scenario)
        .map_err(|e| {
            error!("Failed to generate forecast: {}", e);
            match &e {
                ComputeError::Prediction(_)
                | ComputeError::EmptyPrediction
                | ComputeError::MissingColumn(_) => error_response(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    format!("Failed to generate forecast: {}", e),
                    "PREDICTION_ERROR",
                ),
                _ => error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to generate forecast: {}", e),
                    "COMPUTE_ERROR",
                ),
            }
        })?;

    let advice = advice_from_output(&request, &output).map_err(|e| {
        warn!("Failed to convert forecast: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, e, "CONVERSION_ERROR")
    })?;

    state
        .cache
        .insert(cache_key, CachedData::Advice(advice.clone()))
        .await;

    info!(
        "Forecast generated: predicted_sales={:.2}, lift={:?}, recommendation={}",
        advice.predicted_sales, advice.lift_percentage, advice.recommendation
    );
    Ok(Json(ApiResponse {
        data: advice,
        message: "Forecast generated successfully".to_string(),
        success: true,
    }))
}

/// Initial values and options for the dashboard form
#[utoipa::path(
    get,
    path = "/api/v1/forecast/defaults",
    tag = "forecast",
    responses(
        (status = 200, description = "Dashboard defaults retrieved successfully", body = ApiResponse<DashboardDefaults>)
    )
)]
#[instrument]
pub async fn get_dashboard_defaults() -> Json<ApiResponse<DashboardDefaults>> {
    Json(ApiResponse {
        data: DashboardDefaults::default(),
        message: "Dashboard defaults retrieved successfully".to_string(),
        success: true,
    })
}
