use anyhow::Result;
use compute::{ForecastModel, model::load_model};
use std::path::PathBuf;
use tracing::debug;

use crate::config::load_settings;

pub fn model_info(model_path: Option<PathBuf>) -> Result<()> {
    let model_path = match model_path {
        Some(path) => path,
        None => load_settings()?.model_path,
    };
    debug!("Describing model at {}", model_path.display());

    let info = load_model(&model_path)?.info();

    println!("Model:          {} ({})", info.name, info.version);
    println!("Interval width: {:.0}%", info.interval_width * 100.0);
    println!("Regressors:     {}", info.regressors.join(", "));
    for (name, period) in &info.seasonalities {
        println!("Seasonality:    {} (period {} days)", name, period);
    }
    Ok(())
}
