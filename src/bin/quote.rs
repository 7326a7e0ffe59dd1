//! Batch fare auditing: prices every ride in a CSV and writes fair vs model
//! figures side by side.
//!
//! Input columns match the `/predict` body; artifact and pricing settings
//! come from the same environment variables as the server.

use anyhow::{Context, Result};
use clap::Parser;
use fairfare::config::Config;
use fairfare::domain::ride::RideRequest;
use fairfare::infrastructure::load_estimator;
use fairfare::interfaces::response::QuoteResponse;
use fairfare::interfaces::validation::validate_request;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV of ride requests
    #[arg(long, default_value = "data/rides.csv")]
    input: PathBuf,

    /// Where to write the quotes
    #[arg(long, default_value = "data/quotes.csv")]
    output: PathBuf,

    /// Abort on the first row that cannot be priced instead of skipping it
    #[arg(long)]
    strict: bool,
}

/// One audited ride; prices rounded the same way as the HTTP response.
#[derive(Debug, Serialize)]
struct QuoteRow {
    row: usize,
    distance_km: f64,
    traffic_level: f64,
    weather: String,
    car_type: String,
    hour: u8,
    day_of_week: u8,
    fair_taxi_price: f64,
    model_base_price: f64,
    hidden_fee_vs_fair: f64,
    surge_multiplier: f64,
    surge_fee: f64,
    final_ai_fare: f64,
    models: String,
}

impl QuoteRow {
    fn new(row: usize, response: QuoteResponse) -> Self {
        let models = response
            .model_component_prices
            .keys()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join("+");
        let inputs = response.inputs;

        Self {
            row,
            distance_km: inputs.distance_km,
            traffic_level: inputs.traffic_level,
            weather: inputs.weather,
            car_type: inputs.car_type,
            hour: inputs.hour,
            day_of_week: inputs.day_of_week,
            fair_taxi_price: response.fair_taxi_price,
            model_base_price: response.model_base_price,
            hidden_fee_vs_fair: response.hidden_fee_vs_fair,
            surge_multiplier: response.surge_multiplier,
            surge_fee: response.surge_fee,
            final_ai_fare: response.final_ai_fare,
            models,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    let estimator = load_estimator(&config.artifacts, &config.pricing)
        .context("Failed to load preprocessing artifacts")?;

    info!("Loading rides from {:?}", args.input);
    let file = File::open(&args.input).context(format!("Failed to open {:?}", args.input))?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let mut writer =
        csv::Writer::from_path(&args.output).context(format!("Failed to create {:?}", args.output))?;

    let mut priced = 0usize;
    let mut skipped = 0usize;
    let mut total_hidden_fee = 0.0;

    for (index, record) in reader.deserialize::<RideRequest>().enumerate() {
        // Header is line 1
        let row = index + 2;
        let outcome = record
            .map_err(anyhow::Error::from)
            .and_then(|request| {
                validate_request(&request)?;
                let estimate = estimator.estimate(&request)?;
                Ok(QuoteResponse::compose(&request, &estimate))
            });

        match outcome {
            Ok(response) => {
                total_hidden_fee += response.hidden_fee_vs_fair;
                writer.serialize(QuoteRow::new(row, response))?;
                priced += 1;
            }
            Err(e) if args.strict => {
                return Err(e.context(format!("Row {} could not be priced", row)));
            }
            Err(e) => {
                warn!("Skipping row {}: {:#}", row, e);
                skipped += 1;
            }
        }
    }
    writer.flush()?;

    let mean_hidden_fee = if priced > 0 {
        total_hidden_fee / priced as f64
    } else {
        0.0
    };
    info!(
        "Wrote {} quotes to {:?} ({} skipped), mean hidden fee vs fair {:.2}",
        priced, args.output, skipped, mean_hidden_fee
    );
    Ok(())
}
