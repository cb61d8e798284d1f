/// Unit tests for chart aggregation and the dashboard summary
use staymarket::charts::{aggregate, ChartData, ChartType};
use staymarket::estimator;
use staymarket::fusion;
use staymarket::models::{BatchSource, FusedResult, ListingBatch, Query};

/// Builds a fused result offline: estimate + empty batch, no analysis.
fn fused(location: &str, guests: u32) -> FusedResult {
    let query = Query::new(location, guests);
    let estimate = estimator::estimate(location, "apartment", guests);
    fusion::fuse(
        &query,
        &ListingBatch::empty(BatchSource::Simulated),
        &estimate,
        None,
    )
}

#[test]
fn empty_input_produces_no_charts() {
    assert!(aggregate(&[]).is_none());
}

#[test]
fn single_result_produces_all_four_charts() {
    let set = aggregate(&[fused("Paris, France", 2)]).expect("charts for non-empty input");

    assert_eq!(set.comparison.chart_type, ChartType::Bar);
    assert_eq!(set.distribution.chart_type, ChartType::Pie);
    assert_eq!(set.scatter.chart_type, ChartType::Scatter);
    assert_eq!(set.seasonal.chart_type, ChartType::Line);
    assert_eq!(set.dashboard.total_results, 1);
}

#[test]
fn comparison_parses_prices_and_drops_unparseable() {
    let mut odd = fused("Oslo, Norway", 2);
    odd.average = "price on request".to_string();
    let results = vec![fused("Paris, France", 2), odd];

    let set = aggregate(&results).unwrap();
    let ChartData::Bar { points } = &set.comparison.data else {
        panic!("comparison must be a bar chart");
    };
    // The unparseable result is dropped from this chart only
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].label, "Paris, France");
    assert_eq!(points[0].value, 120);

    // ...but still participates in the others
    let ChartData::Scatter { points: scatter } = &set.scatter.data else {
        panic!("scatter expected");
    };
    assert_eq!(scatter.len(), 2);
    assert_eq!(set.dashboard.total_results, 2);
}

#[test]
fn distribution_counts_sum_to_results_and_omit_zero_buckets() {
    // Paris 2 guests -> Excellent; Paris 5 guests -> Good; unknown 4 -> Good
    let results = vec![
        fused("Paris, France", 2),
        fused("Paris, France", 5),
        fused("Unknown City", 4),
    ];
    let set = aggregate(&results).unwrap();
    let ChartData::Pie { slices } = &set.distribution.data else {
        panic!("distribution must be a pie chart");
    };

    let total: usize = slices.iter().map(|s| s.value).sum();
    assert_eq!(total, results.len());
    assert!(slices.iter().any(|s| s.label == "Excellent" && s.value == 1));
    assert!(slices.iter().any(|s| s.label == "Good" && s.value == 2));
    // No zero-valued slices emitted
    assert!(slices.iter().all(|s| s.value > 0));
    assert!(!slices.iter().any(|s| s.label == "Poor"));
}

#[test]
fn scatter_colors_follow_the_rating_map() {
    let results = vec![fused("Paris, France", 2), fused("Paris, France", 5)];
    let set = aggregate(&results).unwrap();
    let ChartData::Scatter { points } = &set.scatter.data else {
        panic!("scatter expected");
    };

    assert_eq!(points[0].x, 2);
    assert_eq!(points[0].color, "#2ecc71"); // Excellent
    assert_eq!(points[1].x, 5);
    assert_eq!(points[1].color, "#3498db"); // Good
}

#[test]
fn seasonal_takes_first_five_in_input_order() {
    let locations = [
        "Paris, France",
        "London, UK",
        "Tokyo, Japan",
        "Bali, Indonesia",
        "Barcelona, Spain",
        "New York, USA",
        "Unknown City",
    ];
    let results: Vec<FusedResult> = locations.iter().map(|l| fused(l, 2)).collect();

    let set = aggregate(&results).unwrap();
    let ChartData::Line { months, series } = &set.seasonal.data else {
        panic!("seasonal must be a line chart");
    };

    assert_eq!(months.len(), 12);
    assert_eq!(series.len(), 5);
    for (series, location) in series.iter().zip(locations.iter().take(5)) {
        assert_eq!(&series.name, location);
        assert_eq!(series.points.len(), 12);
    }
    // Curated Paris curve: January multiplier 0.85 -> -15.0%
    assert_eq!(series[0].points[0], -15.0);
    // July peak is positive
    assert!(series[0].points[6] > 0.0);
}

#[test]
fn dashboard_mean_truncates() {
    // 120 + 95 = 215, 215 / 2 = 107 truncated (not 108)
    let results = vec![fused("Paris, France", 2), fused("Tokyo, Japan", 2)];
    let set = aggregate(&results).unwrap();

    assert_eq!(set.dashboard.average_price, 107);
    assert_eq!(set.dashboard.min_price, 95);
    assert_eq!(set.dashboard.max_price, 120);
    assert_eq!(set.dashboard.most_expensive_location, "Paris, France");
}

#[test]
fn dashboard_tracks_first_excellent_in_input_order() {
    // Good first, then two Excellent results
    let results = vec![
        fused("Unknown City", 4),
        fused("Paris, France", 2),
        fused("Tokyo, Japan", 2),
    ];
    let set = aggregate(&results).unwrap();

    assert_eq!(set.dashboard.excellent_count, 2);
    assert_eq!(
        set.dashboard.first_excellent_location.as_deref(),
        Some("Paris, France")
    );
}

#[test]
fn dashboard_handles_no_excellent_results() {
    let results = vec![fused("Unknown City", 4)];
    let set = aggregate(&results).unwrap();
    assert_eq!(set.dashboard.excellent_count, 0);
    assert!(set.dashboard.first_excellent_location.is_none());
}
