use anyhow::Result;
use compute::{ForecastModel, default_advisor, model::shared_model};
use moka::future::Cache;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::schemas::AppState;

/// Runtime settings.
///
/// Layered from built-in defaults, an optional `salescast.toml` in the
/// working directory, then `SALESCAST_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Path to the model artifact (JSON or YAML)
    pub model_path: PathBuf,
    /// Bind address for the web server
    pub bind_address: String,
    /// Lift (percent) above which a promotion is recommended
    pub lift_threshold: f64,
    /// Maximum number of cached forecasts
    pub cache_capacity: u64,
    /// Seconds a cached forecast stays valid
    pub cache_ttl_secs: u64,
}

/// Load settings from defaults, config file and environment
pub fn load_settings() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = config::Config::builder()
        .set_default("model_path", "models/rossmann_additive.json")?
        .set_default("bind_address", "0.0.0.0:3000")?
        .set_default("lift_threshold", compute::DEFAULT_LIFT_THRESHOLD)?
        .set_default("cache_capacity", 1000_i64)?
        .set_default("cache_ttl_secs", 300_i64)?
        .add_source(config::File::with_name("salescast").required(false))
        .add_source(config::Environment::with_prefix("SALESCAST"))
        .build()?;

    let settings: Settings = settings.try_deserialize()?;
    tracing::debug!("Loaded settings: {:?}", settings);
    Ok(settings)
}

/// Build application state around an already loaded model
pub fn build_app_state(model: Arc<dyn ForecastModel>, settings: &Settings) -> AppState {
    let cache = Cache::builder()
        .max_capacity(settings.cache_capacity)
        .time_to_live(Duration::from_secs(settings.cache_ttl_secs))
        .build();

    AppState {
        model,
        advisor: default_advisor(Some(settings.lift_threshold)),
        cache,
    }
}

/// Initialize application state, loading the model once for the process
pub fn initialize_app_state(settings: &Settings) -> Result<AppState> {
    tracing::info!("Loading model from {}", settings.model_path.display());
    let model = shared_model(&settings.model_path)?;

    Ok(build_app_state(model, settings))
}
