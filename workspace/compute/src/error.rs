use thiserror::Error;
use tracing::error;

/// Error types for the compute module
#[derive(Error, Debug)]
pub enum ComputeError {
    /// Error from Polars DataFrame operations
    #[error("DataFrame error: {0}")]
    DataFrame(String),

    /// Error from Polars Series operations
    #[error("Series error: {0}")]
    Series(String),

    /// A column the computation depends on is absent
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// The model produced no rows for the given features
    #[error("Model returned no predictions")]
    EmptyPrediction,

    /// The model call failed or produced an unusable value
    #[error("Prediction error: {0}")]
    Prediction(String),

    /// The model artifact could not be read or parsed
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// The model artifact was parsed but its parameters are inconsistent
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// Error from date operations
    #[error("Date error: {0}")]
    Date(String),
}

impl From<polars::error::PolarsError> for ComputeError {
    fn from(error: polars::error::PolarsError) -> Self {
        let compute_error = match error {
            polars::error::PolarsError::ColumnNotFound(_) => {
                let err = ComputeError::MissingColumn(format!("{}", error));
                error!(?err, "DataFrame error: Column not found");
                err
            }
            polars::error::PolarsError::NoData(_) => {
                let err = ComputeError::DataFrame(format!("No data: {}", error));
                error!(?err, "DataFrame error: No data");
                err
            }
            polars::error::PolarsError::ShapeMismatch(_) => {
                let err = ComputeError::DataFrame(format!("Shape mismatch: {}", error));
                error!(?err, "DataFrame error: Shape mismatch");
                err
            }
            polars::error::PolarsError::SchemaMismatch(_) => {
                let err = ComputeError::DataFrame(format!("Schema mismatch: {}", error));
                error!(?err, "DataFrame error: Schema mismatch");
                err
            }
            polars::error::PolarsError::OutOfBounds(_) => {
                let err = ComputeError::DataFrame(format!("Out of bounds: {}", error));
                error!(?err, "DataFrame error: Out of bounds");
                err
            }
            _ => {
                let err = ComputeError::Series(format!("Series error: {}", error));
                error!(?err, "Series error");
                err
            }
        };
        compute_error
    }
}

impl From<std::io::Error> for ComputeError {
    fn from(error: std::io::Error) -> Self {
        ComputeError::ModelLoad(format!("I/O error: {}", error))
    }
}

impl From<serde_json::Error> for ComputeError {
    fn from(error: serde_json::Error) -> Self {
        ComputeError::ModelLoad(format!("JSON error: {}", error))
    }
}

impl From<serde_yaml::Error> for ComputeError {
    fn from(error: serde_yaml::Error) -> Self {
        ComputeError::ModelLoad(format!("YAML error: {}", error))
    }
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
