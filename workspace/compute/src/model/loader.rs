use cached::proc_macro::once;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use super::AdditiveModel;
use crate::error::{ComputeError, Result};

/// Reads and validates a model artifact.
///
/// `.yaml` and `.yml` files are parsed as YAML, anything else as JSON.
#[instrument]
pub fn load_model(path: &Path) -> Result<AdditiveModel> {
    if !path.exists() {
        error!("Model file not found at {:?}", path);
        return Err(ComputeError::ModelLoad(format!(
            "Model file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path)?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    debug!("Parsing model artifact as {}", if is_yaml { "YAML" } else { "JSON" });

    let model: AdditiveModel = if is_yaml {
        serde_yaml::from_str(&contents)?
    } else {
        serde_json::from_str(&contents)?
    };
    model.validate()?;

    info!(
        "Successfully loaded model {} ({}) from {:?}",
        model.name, model.version, path
    );
    Ok(model)
}

/// Process-wide model, loaded on first use and kept until exit.
///
/// Only the first successful load is kept: later calls return the same
/// instance whatever path they pass. Failed loads are not cached.
#[once(result = true)]
pub fn shared_model(path: &Path) -> Result<Arc<AdditiveModel>> {
    info!("Loading shared model from {:?}", path);
    load_model(path).map(Arc::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const MODEL_JSON: &str = r#"{
        "name": "test-additive",
        "version": "1",
        "trend": {"origin": "2013-01-01", "k": 0.5, "m": 5000.0},
        "seasonalities": {"weekly": {"period": 7.0, "coefficients": [[100.0, -50.0]]}},
        "regressors": {"Promo": 2000.0},
        "sigma": 250.0
    }"#;

    const MODEL_YAML: &str = "
name: test-additive-yaml
version: '2'
trend:
  origin: 2013-01-01
  k: 0.0
  m: 4000.0
regressors:
  Promo: 1000.0
";

    /// Writes an artifact into a fresh directory, removed when the handle drops.
    fn write_artifact(file_name: &str, contents: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(file_name);
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_json_model() {
        let (_dir, path) = write_artifact("model.json", MODEL_JSON);
        let model = load_model(&path).unwrap();

        assert_eq!(model.name, "test-additive");
        assert_eq!(model.interval_width, 0.8);
        assert_eq!(model.regressors.get("Promo"), Some(&2000.0));
        assert_eq!(model.seasonalities["weekly"].coefficients, vec![(100.0, -50.0)]);
    }

    #[test]
    fn test_load_yaml_model() {
        let (_dir, path) = write_artifact("model.yaml", MODEL_YAML);
        let model = load_model(&path).unwrap();

        assert_eq!(model.name, "test-additive-yaml");
        assert_eq!(model.version, "2");
        assert!(model.seasonalities.is_empty());
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("does-not-exist.json");
        assert!(matches!(load_model(&path), Err(ComputeError::ModelLoad(_))));
    }

    #[test]
    fn test_malformed_artifact_is_load_error() {
        let (_dir, path) = write_artifact("broken.json", "{\"name\": ");
        assert!(matches!(load_model(&path), Err(ComputeError::ModelLoad(_))));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let (_dir, path) = write_artifact(
            "invalid.json",
            r#"{"name": "x", "version": "1", "trend": {"origin": "2013-01-01", "k": 0.0, "m": 1.0}, "interval_width": 2.0}"#,
        );
        assert!(matches!(load_model(&path), Err(ComputeError::InvalidModel(_))));
    }

    #[test]
    fn test_clashing_component_names_rejected() {
        let (_dir, path) = write_artifact(
            "clash.json",
            r#"{
                "name": "clash",
                "version": "1",
                "trend": {"origin": "2013-01-01", "k": 0.0, "m": 1.0},
                "seasonalities": {"Promo": {"period": 7.0, "coefficients": [[1.0, 0.0]]}},
                "regressors": {"Promo": 2000.0}
            }"#,
        );
        assert!(matches!(load_model(&path), Err(ComputeError::InvalidModel(_))));
    }

    // The only test touching the process-wide model.
    #[test]
    fn test_shared_model_loads_once() {
        let empty_dir = TempDir::new().unwrap();
        let missing = empty_dir.path().join("missing.json");
        assert!(shared_model(&missing).is_err());

        let (_dir, path) = write_artifact("shared.json", MODEL_JSON);
        let first = shared_model(&path).unwrap();

        let (_other_dir, other) = write_artifact("shared-other.yaml", MODEL_YAML);
        let second = shared_model(&other).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.name, "test-additive");
    }
}
