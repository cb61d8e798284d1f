//! Short-Term-Rental Market Estimation & Fusion Library
//!
//! This library estimates nightly pricing and market characteristics for
//! location/guest/property queries, reconciles the estimate against
//! best-effort live listing data and generative analysis, and derives
//! chart-ready aggregates from a batch of fused results.
//!
//! # Modules
//!
//! - `charts`: Chart aggregation (comparison, distribution, scatter, seasonal, dashboard).
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `estimator`: Deterministic price/value/competition estimation.
//! - `fetch`: Retry policy and degrading fetch client.
//! - `fusion`: Field-precedence fusion of the per-query analyses.
//! - `locations`: City normalization and static lookup tables.
//! - `models`: Core data models.
//! - `pipeline`: Per-query workflow and batch runner.
//! - `services`: External service clients (scrape source, generative analysis).
//! - `synthesizer`: Listing synthesis and free-text extraction.

pub mod charts;
pub mod config;
pub mod errors;
pub mod estimator;
pub mod fetch;
pub mod fusion;
pub mod locations;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod synthesizer;
