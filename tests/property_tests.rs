/// Property-based tests using proptest
/// Tests invariants that should hold for all inputs
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use staymarket::estimator::estimate;
use staymarket::fusion::fuse_at;
use staymarket::locations::normalize_city;
use staymarket::models::{BatchSource, ListingBatch, Query};

// Property: estimation never panics, whatever the location text
proptest! {
    #[test]
    fn estimation_never_panics(location in "\\PC*", guests in 0u32..=64) {
        let _ = estimate(&location, "apartment", guests);
    }

    #[test]
    fn normalization_never_panics_and_lowercases(location in "\\PC*") {
        let key = normalize_city(&location);
        prop_assert!(!key.chars().any(|c| c.is_uppercase()));
        prop_assert!(!key.contains(','));
    }
}

// Property: the price range always brackets the average
proptest! {
    #[test]
    fn range_brackets_average(
        location in "[a-zA-Z ]{0,30}(, [a-zA-Z ]{0,20})?",
        property_type in prop::sample::select(vec!["apartment", "house", "villa", "studio", "yurt"]),
        guests in 1u32..=12
    ) {
        let e = estimate(&location, property_type, guests);
        prop_assert!(e.range_low <= e.average_numeric);
        prop_assert!(e.average_numeric <= e.range_high);
    }
}

// Property: average scales monotonically with guest count
proptest! {
    #[test]
    fn average_monotone_in_guests(
        location in prop::sample::select(vec![
            "Paris, France", "London, UK", "New York, USA",
            "Tokyo, Japan", "Bali, Indonesia", "Elsewhere",
        ]),
        guests in 2u32..=20
    ) {
        let now = estimate(location, "apartment", guests);
        let more = estimate(location, "apartment", guests + 1);
        prop_assert!(more.average_numeric >= now.average_numeric);
        prop_assert!(more.range_high >= now.range_high);
    }
}

// Property: display strings always agree with the numeric fields
proptest! {
    #[test]
    fn display_price_matches_numeric(
        location in "[a-zA-Z ]{1,30}",
        guests in 1u32..=10
    ) {
        let e = estimate(&location, "apartment", guests);
        prop_assert_eq!(e.average, format!("${}", e.average_numeric));
        prop_assert!(e.peak.starts_with('$'));
    }
}

// Property: fusing identical inputs twice gives identical results
proptest! {
    #[test]
    fn fusion_idempotent(
        location in "[a-zA-Z ]{1,30}",
        guests in 1u32..=10
    ) {
        let query = Query::new(location.clone(), guests);
        let estimate = estimate(&location, "apartment", guests);
        let batch = ListingBatch::empty(BatchSource::Simulated);
        let at = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();

        let first = fuse_at(&query, &batch, &estimate, None, at);
        let second = fuse_at(&query, &batch, &estimate, None, at);
        prop_assert_eq!(first, second);
    }
}

// Property: with no structured analysis, fusion reproduces the estimate
proptest! {
    #[test]
    fn absent_analysis_mirrors_estimate(
        location in "[a-zA-Z ]{1,30}",
        guests in 1u32..=10
    ) {
        let query = Query::new(location.clone(), guests);
        let estimate = estimate(&location, "apartment", guests);
        let batch = ListingBatch::empty(BatchSource::Simulated);
        let at = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();

        let fused = fuse_at(&query, &batch, &estimate, None, at);
        prop_assert_eq!(fused.average_numeric, estimate.average_numeric);
        prop_assert_eq!(fused.range_low, estimate.range_low);
        prop_assert_eq!(fused.range_high, estimate.range_high);
        prop_assert_eq!(fused.value_rating, estimate.value_rating);
        prop_assert_eq!(fused.booking_tips, estimate.tips_joined());
        prop_assert!(fused.schema_validated);
    }
}
