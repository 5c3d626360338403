use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use common::{Assortment, StoreType};
use std::path::PathBuf;

pub mod commands;

use commands::{ForecastArgs, forecast, model_info, serve};

#[derive(Parser)]
#[command(name = "salescast")]
#[command(about = "Sales forecast dashboard with promotion analysis")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Path to the model artifact (JSON or YAML)
        ///
        /// Defaults to the `model_path` setting
        /// (SALESCAST_MODEL_PATH or salescast.toml).
        #[arg(short, long)]
        model_path: Option<PathBuf>,

        /// Bind address for the web server
        ///
        /// Format: IP:PORT (e.g., 0.0.0.0:3000, 127.0.0.1:8080)
        #[arg(short, long)]
        bind_address: Option<String>,
    },
    /// Forecast sales for one scenario and rate the promotion
    ///
    /// Examples:
    ///   salescast forecast --date 2015-08-01 --store-type c
    ///   salescast forecast --date 2015-08-01 --no-promo --store-type a --school-holiday --json
    Forecast {
        /// Path to the model artifact (JSON or YAML)
        #[arg(short, long)]
        model_path: Option<PathBuf>,

        /// Date to forecast (YYYY-MM-DD)
        #[arg(short, long, default_value = "2015-08-01")]
        date: NaiveDate,

        /// A promotion runs on that date (the default)
        #[arg(long, overrides_with = "no_promo")]
        promo: bool,

        /// No promotion runs on that date
        #[arg(long, overrides_with = "promo")]
        no_promo: bool,

        /// The date is a school holiday
        #[arg(long)]
        school_holiday: bool,

        /// Store type (a, b, c or d)
        #[arg(short, long, default_value = "c")]
        store_type: StoreType,

        /// Assortment (a, b or c). Not a model feature, shown for reference only.
        #[arg(short, long)]
        assortment: Option<Assortment>,

        /// Print the raw forecast table
        #[arg(long)]
        raw: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Describe a model artifact
    ModelInfo {
        /// Path to the model artifact (JSON or YAML)
        #[arg(short, long)]
        model_path: Option<PathBuf>,
    },
}

/// Promotion is on unless `--no-promo` was the last promo flag given.
fn promo_enabled(promo: bool, no_promo: bool) -> bool {
    promo || !no_promo
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve {
                model_path,
                bind_address,
            } => {
                serve(model_path, bind_address).await?;
            }
            Commands::Forecast {
                model_path,
                date,
                promo,
                no_promo,
                school_holiday,
                store_type,
                assortment,
                raw,
                json,
            } => {
                forecast(ForecastArgs {
                    model_path,
                    date,
                    promo: promo_enabled(promo, no_promo),
                    school_holiday,
                    store_type,
                    assortment,
                    raw,
                    json,
                })?;
            }
            Commands::ModelInfo { model_path } => {
                model_info(model_path)?;
            }
        }
        Ok(())
    }
}
