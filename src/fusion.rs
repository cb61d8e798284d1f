//! Fusion of the three per-query analyses (deterministic estimate,
//! listing batch, optional structured analysis) into one canonical record.
//!
//! The precedence rule is one-directional and field-level: a structured
//! value wins iff it is present and non-empty, otherwise the estimate's
//! value is used, otherwise (narrative fields with no estimate equivalent)
//! a generated default interpolating the location. Every `FusedResult`
//! field ends up populated.

use crate::models::{FusedResult, ListingBatch, PriceEstimate, Query, StructuredAnalysis};
use chrono::{DateTime, Utc};

/// First present candidate wins; the exhaustive fallback comes last.
///
/// Callers turn "present but empty" into `None` before building the list,
/// so the precedence rule stays auditable in one place.
fn first_present<T>(candidates: Vec<Option<T>>, fallback: T) -> T {
    candidates.into_iter().flatten().next().unwrap_or(fallback)
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty()).cloned()
}

fn non_empty_vec(value: Option<&Vec<String>>) -> Option<Vec<String>> {
    value.filter(|v| !v.is_empty()).cloned()
}

/// Fuses one query's analyses into the canonical result, stamped now.
pub fn fuse(
    query: &Query,
    listing_batch: &ListingBatch,
    estimate: &PriceEstimate,
    structured: Option<&StructuredAnalysis>,
) -> FusedResult {
    fuse_at(query, listing_batch, estimate, structured, Utc::now())
}

/// Fusion with an explicit timestamp. Deterministic: identical inputs give
/// an identical result.
pub fn fuse_at(
    query: &Query,
    listing_batch: &ListingBatch,
    estimate: &PriceEstimate,
    structured: Option<&StructuredAnalysis>,
    analyzed_at: DateTime<Utc>,
) -> FusedResult {
    let s = structured;

    let average = first_present(
        vec![s.and_then(|a| non_empty(a.average.as_ref()))],
        estimate.average.clone(),
    );
    // Numeric average tracks whichever display string won
    let average_numeric =
        crate::models::parse_price(&average).unwrap_or(estimate.average_numeric);

    let booking_tips = first_present(
        vec![s.and_then(|a| non_empty_vec(a.booking_tips.as_ref()))],
        estimate.booking_tips.clone(),
    )
    .join(" | ");

    let result = FusedResult {
        location: query.location.clone(),
        guests: query.guests,
        property_type: query.property_type_or_default().to_string(),
        average,
        average_numeric,
        range_low: first_present(vec![s.and_then(|a| a.range_low)], estimate.range_low),
        range_high: first_present(vec![s.and_then(|a| a.range_high)], estimate.range_high),
        peak: first_present(
            vec![s.and_then(|a| non_empty(a.peak.as_ref()))],
            estimate.peak.clone(),
        ),
        value_rating: first_present(vec![s.and_then(|a| a.value_rating)], estimate.value_rating),
        competition_level: first_present(
            vec![s.and_then(|a| a.competition_level)],
            estimate.competition_level,
        ),
        neighborhoods: first_present(
            vec![s.and_then(|a| non_empty_vec(a.neighborhoods.as_ref()))],
            estimate.neighborhoods.clone(),
        ),
        booking_tips,
        market_trend: first_present(
            vec![s.and_then(|a| non_empty(a.market_trend.as_ref()))],
            estimate.market_trend.clone(),
        ),
        seasonal_trends: first_present(
            vec![s.and_then(|a| non_empty(a.seasonal_trends.as_ref()))],
            estimate.seasonal_trends.clone(),
        ),
        // No estimate equivalent: generated default interpolates the location
        market_insights: first_present(
            vec![s.and_then(|a| non_empty(a.market_insights.as_ref()))],
            format!(
                "Deterministic market model for {}; no generative insights available",
                query.location
            ),
        ),
        scraped_listings_count: listing_batch.count,
        scraped_data_source: listing_batch.source,
        schema_validated: s.map(|a| a.schema_validated).unwrap_or(true),
        analyzed_at,
    };

    tracing::debug!(
        "Fused result for {} ({} listings from {}, structured: {})",
        result.location,
        result.scraped_listings_count,
        result.scraped_data_source,
        structured.is_some()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_present_prefers_earlier_candidates() {
        assert_eq!(first_present(vec![Some(1), Some(2)], 3), 1);
        assert_eq!(first_present(vec![None, Some(2)], 3), 2);
        assert_eq!(first_present::<i64>(vec![None, None], 3), 3);
    }

    #[test]
    fn empty_strings_do_not_win() {
        let empty = String::from("   ");
        assert_eq!(non_empty(Some(&empty)), None);
        assert_eq!(non_empty_vec(Some(&Vec::new())), None);
    }
}
