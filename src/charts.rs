//! Chart-ready aggregates over a batch of fused results: comparison bar,
//! value-rating pie, price/guests scatter, seasonal line series and a
//! dashboard summary.

use crate::locations;
use crate::models::{parse_price, FusedResult, ValueRating};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shared palette of color tokens, applied in order.
const PALETTE: [&str; 5] = ["#2a9d8f", "#e9c46a", "#f4a261", "#e76f51", "#264653"];

/// Fixed rating-to-color mapping for scatter points.
fn rating_color(rating: ValueRating) -> &'static str {
    match rating {
        ValueRating::Excellent => "#2ecc71",
        ValueRating::Good => "#3498db",
        ValueRating::Fair => "#f39c12",
        ValueRating::Poor => "#e74c3c",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Bar,
    Pie,
    Scatter,
    Line,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartMetadata {
    pub generated_at: DateTime<Utc>,
    pub point_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarPoint {
    pub label: String,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub value: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: u32,
    pub y: i64,
    pub color: String,
    pub label: String,
}

/// One location's 12-point monthly series of relative price change (%).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalSeries {
    pub name: String,
    pub points: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    Bar { points: Vec<BarPoint> },
    Pie { slices: Vec<PieSlice> },
    Scatter { points: Vec<ScatterPoint> },
    Line { months: Vec<String>, series: Vec<SeasonalSeries> },
}

/// One ready-to-render chart. Produced fresh per aggregation call and not
/// mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    pub chart_type: ChartType,
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub data: ChartData,
    pub palette: Vec<String>,
    pub metadata: ChartMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_results: usize,
    /// Mean of numeric averages, truncating integer division.
    pub average_price: i64,
    pub min_price: i64,
    pub max_price: i64,
    pub excellent_count: usize,
    pub most_expensive_location: String,
    pub first_excellent_location: Option<String>,
}

/// The full aggregation output for one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSet {
    pub comparison: ChartSpec,
    pub distribution: ChartSpec,
    pub scatter: ChartSpec,
    pub seasonal: ChartSpec,
    pub dashboard: DashboardSummary,
}

/// Number of results (in input order) included in the seasonal chart.
const SEASONAL_RESULT_CAP: usize = 5;

/// Aggregates a batch of fused results into the four charts plus the
/// dashboard summary. `None` only when the batch is empty; any non-empty
/// batch produces every chart.
pub fn aggregate(results: &[FusedResult]) -> Option<ChartSet> {
    if results.is_empty() {
        tracing::debug!("No fused results, skipping chart aggregation");
        return None;
    }
    let generated_at = Utc::now();

    Some(ChartSet {
        comparison: comparison_chart(results, generated_at),
        distribution: distribution_chart(results, generated_at),
        scatter: scatter_chart(results, generated_at),
        seasonal: seasonal_chart(results, generated_at),
        dashboard: dashboard_summary(results),
    })
}

fn palette() -> Vec<String> {
    PALETTE.iter().map(|c| c.to_string()).collect()
}

/// Bar chart of average price per location. Results whose display price has
/// no parseable digits are dropped from this chart only.
fn comparison_chart(results: &[FusedResult], generated_at: DateTime<Utc>) -> ChartSpec {
    let points: Vec<BarPoint> = results
        .iter()
        .filter_map(|r| {
            parse_price(&r.average).map(|value| BarPoint {
                label: r.location.clone(),
                value,
            })
        })
        .collect();

    ChartSpec {
        chart_type: ChartType::Bar,
        title: "Average Nightly Price by Location".to_string(),
        x_label: Some("Location".to_string()),
        y_label: Some("Price (USD)".to_string()),
        metadata: ChartMetadata {
            generated_at,
            point_count: points.len(),
        },
        data: ChartData::Bar { points },
        palette: palette(),
    }
}

/// Pie chart of result counts per value rating. Zero-count buckets are
/// omitted, not emitted as zero-valued slices.
fn distribution_chart(results: &[FusedResult], generated_at: DateTime<Utc>) -> ChartSpec {
    let buckets = [
        ValueRating::Excellent,
        ValueRating::Good,
        ValueRating::Fair,
        ValueRating::Poor,
    ];
    let slices: Vec<PieSlice> = buckets
        .iter()
        .filter_map(|rating| {
            let count = results.iter().filter(|r| r.value_rating == *rating).count();
            (count > 0).then(|| PieSlice {
                label: rating.to_string(),
                value: count,
            })
        })
        .collect();

    ChartSpec {
        chart_type: ChartType::Pie,
        title: "Value Rating Distribution".to_string(),
        x_label: None,
        y_label: None,
        metadata: ChartMetadata {
            generated_at,
            point_count: slices.len(),
        },
        data: ChartData::Pie { slices },
        palette: palette(),
    }
}

fn scatter_chart(results: &[FusedResult], generated_at: DateTime<Utc>) -> ChartSpec {
    let points: Vec<ScatterPoint> = results
        .iter()
        .map(|r| ScatterPoint {
            x: r.guests,
            y: r.average_numeric,
            color: rating_color(r.value_rating).to_string(),
            label: r.location.clone(),
        })
        .collect();

    ChartSpec {
        chart_type: ChartType::Scatter,
        title: "Price vs Guest Count".to_string(),
        x_label: Some("Guests".to_string()),
        y_label: Some("Price (USD)".to_string()),
        metadata: ChartMetadata {
            generated_at,
            point_count: points.len(),
        },
        data: ChartData::Scatter { points },
        palette: palette(),
    }
}

/// Line chart of monthly relative price change for the first results in
/// input order (capped, no ranking).
fn seasonal_chart(results: &[FusedResult], generated_at: DateTime<Utc>) -> ChartSpec {
    let series: Vec<SeasonalSeries> = results
        .iter()
        .take(SEASONAL_RESULT_CAP)
        .map(|r| {
            let city_key = locations::normalize_city(&r.location);
            let points = locations::monthly_multipliers(&city_key)
                .iter()
                .map(|m| ((m - 1.0) * 1000.0).round() / 10.0)
                .collect();
            SeasonalSeries {
                name: r.location.clone(),
                points,
            }
        })
        .collect();

    ChartSpec {
        chart_type: ChartType::Line,
        title: "Seasonal Price Variation".to_string(),
        x_label: Some("Month".to_string()),
        y_label: Some("Price change (%)".to_string()),
        metadata: ChartMetadata {
            generated_at,
            point_count: series.len(),
        },
        data: ChartData::Line {
            months: locations::MONTH_LABELS.iter().map(|m| m.to_string()).collect(),
            series,
        },
        palette: palette(),
    }
}

fn dashboard_summary(results: &[FusedResult]) -> DashboardSummary {
    let prices: Vec<i64> = results.iter().map(|r| r.average_numeric).collect();
    let total: i64 = prices.iter().sum();
    // Truncating integer mean, deliberately not rounded
    let average_price = total / prices.len() as i64;

    let most_expensive = results
        .iter()
        .max_by_key(|r| r.average_numeric)
        .map(|r| r.location.clone())
        .unwrap_or_default();

    DashboardSummary {
        total_results: results.len(),
        average_price,
        min_price: prices.iter().copied().min().unwrap_or(0),
        max_price: prices.iter().copied().max().unwrap_or(0),
        excellent_count: results
            .iter()
            .filter(|r| r.value_rating == ValueRating::Excellent)
            .count(),
        most_expensive_location: most_expensive,
        first_excellent_location: results
            .iter()
            .find(|r| r.value_rating == ValueRating::Excellent)
            .map(|r| r.location.clone()),
    }
}
