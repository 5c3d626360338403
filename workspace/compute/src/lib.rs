pub mod advisor;
pub mod error;
pub mod features;
pub mod model;

pub use advisor::{AdvisorOutput, ForecastAdvisor, DEFAULT_LIFT_THRESHOLD};
pub use features::{FeatureRow, Scenario};
pub use model::{AdditiveModel, ForecastModel};

/// Returns the advisor used most of the time.
///
/// Uses the given lift threshold, or [`DEFAULT_LIFT_THRESHOLD`] if none is
/// provided.
pub fn default_advisor(threshold: Option<f64>) -> ForecastAdvisor {
    ForecastAdvisor::with_threshold(threshold.unwrap_or(DEFAULT_LIFT_THRESHOLD))
}
