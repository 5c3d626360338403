use axum::{extract::State, response::Json};
use common::ModelInfo;
use compute::ForecastModel;
use tracing::{debug, instrument};

use crate::schemas::{ApiResponse, AppState};

/// Describe the loaded forecasting model
#[utoipa::path(
    get,
    path = "/api/v1/model",
    tag = "model",
    responses(
        (status = 200, description = "Model description retrieved successfully", body = ApiResponse<ModelInfo>)
    )
)]
#[instrument(skip(state))]
pub async fn get_model_info(State(state): State<AppState>) -> Json<ApiResponse<ModelInfo>> {
    let info = state.model.info();
    debug!("Model info: {:?}", info);

    Json(ApiResponse {
        data: info,
        message: "Model info retrieved successfully".to_string(),
        success: true,
    })
}
