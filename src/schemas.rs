use common::{
    Assortment, DashboardDefaults, ForecastAdvice, ForecastRow, ModelInfo, Recommendation,
    ScenarioRequest, StoreType,
};
use compute::{ForecastAdvisor, ForecastModel};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded forecasting model, read-only for the process lifetime
    pub model: Arc<dyn ForecastModel>,
    /// Promotion advisor with the configured lift threshold
    pub advisor: ForecastAdvisor,
    /// Cache for computed advice
    pub cache: Cache<String, CachedData>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("model", &self.model.name())
            .field("advisor", &self.advisor)
            .field("cache_entries", &self.cache.entry_count())
            .finish()
    }
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    Advice(ForecastAdvice),
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Name and version of the loaded model
    pub model: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::forecast::create_forecast,
        crate::handlers::forecast::get_dashboard_defaults,
        crate::handlers::model::get_model_info,
    ),
    components(
        schemas(
            ApiResponse<ForecastAdvice>,
            ApiResponse<DashboardDefaults>,
            ApiResponse<ModelInfo>,
            ErrorResponse,
            HealthResponse,
            ScenarioRequest,
            ForecastAdvice,
            ForecastRow,
            DashboardDefaults,
            ModelInfo,
            Recommendation,
            StoreType,
            Assortment,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "forecast", description = "Sales forecast and promotion analysis endpoints"),
        (name = "model", description = "Forecasting model endpoints"),
    ),
    info(
        title = "Salescast API",
        description = "Sales forecast dashboard API - predicted sales and promotion lift for a store scenario",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
