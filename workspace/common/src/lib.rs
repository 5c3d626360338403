//! Common transport-layer types shared between the compute crate, the HTTP
//! handlers and the CLI.
//! Request and response payloads live here so every surface serializes the
//! same shapes.

mod advice;
pub mod display;
mod scenario;

pub use advice::{ForecastAdvice, ForecastRow, ModelInfo, Recommendation};
pub use scenario::{Assortment, DashboardDefaults, ScenarioRequest, StoreType};
