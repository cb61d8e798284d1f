use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============ Query Input ============

/// A single market query: where, for how many guests, what kind of place.
///
/// Immutable once constructed; one `FusedResult` is produced per query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Free-text location, "City, Region" (e.g. "Paris, France").
    pub location: String,
    /// Number of guests. Defaults to 2 when absent from input.
    #[serde(default = "default_guests")]
    pub guests: u32,
    /// Optional check-in date.
    #[serde(default)]
    pub check_in: Option<NaiveDate>,
    /// Optional check-out date.
    #[serde(default)]
    pub check_out: Option<NaiveDate>,
    /// Optional nightly budget ceiling.
    #[serde(default)]
    pub budget_max: Option<f64>,
    /// Optional property type (e.g. "apartment", "house", "villa").
    #[serde(default)]
    pub property_type: Option<String>,
}

fn default_guests() -> u32 {
    2
}

impl Query {
    pub fn new(location: impl Into<String>, guests: u32) -> Self {
        Self {
            location: location.into(),
            guests,
            check_in: None,
            check_out: None,
            budget_max: None,
            property_type: None,
        }
    }

    /// Property type with the pipeline-wide default applied.
    pub fn property_type_or_default(&self) -> &str {
        self.property_type.as_deref().unwrap_or("apartment")
    }
}

// ============ Ratings & Classifications ============

/// Four-level assessment of price relative to the location tier's cutoffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl fmt::Display for ValueRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueRating::Excellent => "Excellent",
            ValueRating::Good => "Good",
            ValueRating::Fair => "Fair",
            ValueRating::Poor => "Poor",
        };
        write!(f, "{}", s)
    }
}

/// Static per-city market competition classification. Not price-dependent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompetitionLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for CompetitionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompetitionLevel::Low => "Low",
            CompetitionLevel::Medium => "Medium",
            CompetitionLevel::High => "High",
        };
        write!(f, "{}", s)
    }
}

// ============ Price Estimate ============

/// Deterministic nightly-price estimate for a query.
///
/// Invariant: `range_low <= average_numeric <= range_high`, and the peak
/// price is `average_numeric` scaled by a multiplier greater than 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    /// Display form of the average, e.g. "$120".
    pub average: String,
    /// Numeric average nightly price.
    pub average_numeric: i64,
    /// Lower bound of the typical nightly range.
    pub range_low: i64,
    /// Upper bound of the typical nightly range.
    pub range_high: i64,
    /// Display form of the peak-season price, e.g. "$168".
    pub peak: String,
    pub value_rating: ValueRating,
    pub competition_level: CompetitionLevel,
    /// Recommended neighborhoods, best first.
    pub neighborhoods: Vec<String>,
    /// Ordered booking tips: three baseline tips plus two price-dependent ones.
    pub booking_tips: Vec<String>,
    pub market_trend: String,
    /// Narrative description of seasonal price behavior.
    pub seasonal_trends: String,
}

impl PriceEstimate {
    /// Tips joined into the single delimited string carried by `FusedResult`.
    pub fn tips_joined(&self) -> String {
        self.booking_tips.join(" | ")
    }
}

// ============ Listings ============

/// Where an individual listing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingSource {
    Live,
    Simulated,
}

/// One short-term-rental listing, live-extracted or synthesized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    /// Display price, e.g. "$134".
    pub price: String,
    /// Guest rating in [0.0, 5.0].
    pub rating: f64,
    pub review_count: u32,
    pub amenities: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub source: ListingSource,
}

/// Provenance of a whole listing batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchSource {
    /// Extracted from a live scrape response.
    Firecrawl,
    /// Synthesized with no live attempt (scraping disabled).
    Simulated,
    /// Synthesized after a live attempt came back empty.
    EnhancedSimulation,
}

impl fmt::Display for BatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchSource::Firecrawl => "firecrawl",
            BatchSource::Simulated => "simulated",
            BatchSource::EnhancedSimulation => "enhanced_simulation",
        };
        write!(f, "{}", s)
    }
}

/// A market sample for one query. An empty batch is valid and means
/// "no market sample available", not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingBatch {
    pub source: BatchSource,
    pub listings: Vec<Listing>,
    /// Always equal to `listings.len()`; kept explicit for exported records.
    pub count: usize,
}

impl ListingBatch {
    pub fn new(source: BatchSource, listings: Vec<Listing>) -> Self {
        let count = listings.len();
        Self {
            source,
            listings,
            count,
        }
    }

    pub fn empty(source: BatchSource) -> Self {
        Self::new(source, Vec::new())
    }
}

// ============ Structured Analysis ============

/// Externally-generated structured market analysis.
///
/// Every estimate-shaped field is optional: the generator may return a
/// partial object, and fusion falls back field-by-field. Overall absence
/// (generation disabled or failed) is `Option<StructuredAnalysis>` = `None`
/// at the call site, never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredAnalysis {
    #[serde(default)]
    pub average: Option<String>,
    #[serde(default)]
    pub range_low: Option<i64>,
    #[serde(default)]
    pub range_high: Option<i64>,
    #[serde(default)]
    pub peak: Option<String>,
    #[serde(default)]
    pub value_rating: Option<ValueRating>,
    #[serde(default)]
    pub competition_level: Option<CompetitionLevel>,
    #[serde(default)]
    pub neighborhoods: Option<Vec<String>>,
    #[serde(default)]
    pub booking_tips: Option<Vec<String>>,
    #[serde(default)]
    pub market_trend: Option<String>,
    #[serde(default)]
    pub seasonal_trends: Option<String>,
    #[serde(default)]
    pub market_insights: Option<String>,
    /// False when the generator's output failed schema validation but was
    /// still usable field-by-field.
    #[serde(default = "default_true")]
    pub schema_validated: bool,
}

fn default_true() -> bool {
    true
}

/// Parses a display price ("$1,120") by stripping every non-digit
/// character. `None` when no digits remain.
pub fn parse_price(display: &str) -> Option<i64> {
    let digits: String = display.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

// ============ Fused Result ============

/// The canonical per-query output: the estimate reconciled with listings
/// and the structured analysis. Created once by fusion, immutable after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedResult {
    pub location: String,
    pub guests: u32,
    pub property_type: String,
    pub average: String,
    pub average_numeric: i64,
    pub range_low: i64,
    pub range_high: i64,
    pub peak: String,
    pub value_rating: ValueRating,
    pub competition_level: CompetitionLevel,
    pub neighborhoods: Vec<String>,
    /// Booking tips joined into one " | "-delimited string.
    pub booking_tips: String,
    pub market_trend: String,
    pub seasonal_trends: String,
    pub market_insights: String,
    pub scraped_listings_count: usize,
    pub scraped_data_source: BatchSource,
    pub schema_validated: bool,
    pub analyzed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_count_tracks_listings() {
        let batch = ListingBatch::new(
            BatchSource::Simulated,
            vec![Listing {
                title: "Test".into(),
                price: "$100".into(),
                rating: 4.5,
                review_count: 10,
                amenities: vec!["WiFi".into()],
                url: None,
                source: ListingSource::Simulated,
            }],
        );
        assert_eq!(batch.count, 1);
        assert_eq!(batch.count, batch.listings.len());

        let empty = ListingBatch::empty(BatchSource::Firecrawl);
        assert_eq!(empty.count, 0);
    }

    #[test]
    fn price_parsing_strips_non_digits() {
        assert_eq!(parse_price("$120"), Some(120));
        assert_eq!(parse_price("$1,250 / night"), Some(1250));
        assert_eq!(parse_price("n/a"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn query_defaults_apply_on_deserialize() {
        let q: Query = serde_json::from_str(r#"{"location": "Lyon, France"}"#).unwrap();
        assert_eq!(q.guests, 2);
        assert_eq!(q.property_type_or_default(), "apartment");
        assert!(q.budget_max.is_none());
    }
}
