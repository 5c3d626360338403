use anyhow::Result;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{info, debug, trace, error};

use crate::config::{initialize_app_state, load_settings};
use crate::router::create_router;

pub async fn serve(model_path: Option<PathBuf>, bind_address: Option<String>) -> Result<()> {
    trace!("Entering serve function");
    info!("Salescast application starting up");

    let mut settings = load_settings()?;
    if let Some(model_path) = model_path {
        settings.model_path = model_path;
    }
    if let Some(bind_address) = bind_address {
        settings.bind_address = bind_address;
    }
    debug!("Model path: {}", settings.model_path.display());
    debug!("Bind address: {}", settings.bind_address);

    // A model that cannot be loaded is fatal
    trace!("Initializing application state");
    let state = match initialize_app_state(&settings) {
        Ok(state) => {
            debug!("Application state initialized successfully");
            state
        }
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            return Err(e);
        }
    };

    trace!("Creating application router");
    let app = create_router(state);
    debug!("Router created successfully");

    info!("Starting server on {}", settings.bind_address);
    let listener = match TcpListener::bind(&settings.bind_address).await {
        Ok(listener) => {
            debug!("Successfully bound to address: {}", settings.bind_address);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", settings.bind_address, e);
            return Err(e.into());
        }
    };

    info!("Salescast API server running on http://{}", settings.bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", settings.bind_address);

    trace!("Starting axum server");
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown gracefully");
    Ok(())
}
