mod charts;
mod config;
mod errors;
mod estimator;
mod fetch;
mod fusion;
mod locations;
mod models;
mod pipeline;
mod services;
mod synthesizer;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::models::Query;
use crate::pipeline::Pipeline;

/// Runs the estimation-and-fusion pipeline over a batch of queries.
///
/// Usage: `staymarket <queries.json> [output.json]`
///
/// The input file is a JSON array of query objects; results and charts are
/// written as JSON to the output path, or stdout when none is given.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "staymarket=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let mut args = std::env::args().skip(1);
    let input_path = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: staymarket <queries.json> [output.json]"))?;
    let output_path = args.next();

    let raw = tokio::fs::read_to_string(&input_path).await?;
    let queries: Vec<Query> = serde_json::from_str(&raw)?;
    tracing::info!("Loaded {} queries from {}", queries.len(), input_path);

    let pipeline = Pipeline::new(&config)?;
    let report = pipeline.run_batch(&queries).await?;

    let rendered = serde_json::to_string_pretty(&report)?;
    match output_path {
        Some(path) => {
            tokio::fs::write(&path, rendered).await?;
            tracing::info!("Report written to {}", path);
        }
        None => println!("{}", rendered),
    }

    if report.failed > 0 {
        tracing::warn!("{} queries failed and were skipped", report.failed);
    }

    Ok(())
}
