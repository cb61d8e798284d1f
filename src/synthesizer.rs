//! Listing synthesis and free-text extraction.
//!
//! Synthesized listings are anchored to the deterministic estimate: prices
//! are drawn around `PriceEstimate::average_numeric`, so a simulated market
//! sample stays centered on the estimator's view rather than being
//! independently random. Extraction never fails: every pattern miss
//! degrades to a plausible randomized value.

use crate::models::{BatchSource, Listing, ListingBatch, ListingSource, PriceEstimate};
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use serde_json::Value;

/// Fixed amenity vocabulary sampled for synthesized listings.
const AMENITY_VOCAB: [&str; 10] = [
    "WiFi",
    "Kitchen",
    "Parking",
    "Air Conditioning",
    "Washer",
    "Heating",
    "Pool",
    "Workspace",
    "Balcony",
    "Elevator",
];

const TITLE_ADJECTIVES: [&str; 6] = ["Cozy", "Modern", "Charming", "Spacious", "Sunny", "Stylish"];

/// Default bounds for the synthesized listing count, inclusive.
pub const DEFAULT_COUNT_RANGE: (usize, usize) = (15, 28);

/// Synthesizes a plausible market sample anchored to the price estimate.
///
/// `enhanced` marks a batch produced after a live scrape attempt came back
/// empty (`EnhancedSimulation`) as opposed to scraping being disabled
/// outright (`Simulated`).
pub fn synthesize(
    location: &str,
    guests: u32,
    property_type: &str,
    anchor: &PriceEstimate,
    count_range: (usize, usize),
    enhanced: bool,
) -> ListingBatch {
    let mut rng = rand::thread_rng();
    let count = rng.gen_range(count_range.0..=count_range.1);
    let city_display = location.split(',').next().unwrap_or(location).trim();

    let listings = (0..count)
        .map(|_| {
            let adjective = TITLE_ADJECTIVES.choose(&mut rng).copied().unwrap_or("Cozy");
            Listing {
                title: format!(
                    "{} {} in {} (sleeps {})",
                    adjective,
                    property_type,
                    city_display,
                    guests.max(1)
                ),
                price: format!("${}", random_price(&mut rng, anchor)),
                rating: random_rating(&mut rng),
                review_count: random_reviews(&mut rng),
                amenities: random_amenities(&mut rng),
                url: None,
                source: ListingSource::Simulated,
            }
        })
        .collect();

    let source = if enhanced {
        BatchSource::EnhancedSimulation
    } else {
        BatchSource::Simulated
    };
    tracing::debug!("Synthesized {} listings for {} ({})", count, location, source);
    ListingBatch::new(source, listings)
}

/// Extracts listings from semi-structured live-scrape records.
///
/// Patterns: price = first "$"+digits token; rating = decimal followed by a
/// star token; reviews = digits followed by "review(s)"; amenities by
/// keyword presence. Any field whose pattern misses is filled with a
/// randomized plausible value anchored to the estimate.
pub fn extract(raw_records: &[Value], anchor: &PriceEstimate) -> ListingBatch {
    let mut rng = rand::thread_rng();
    let price_re = Regex::new(r"\$(\d+)").unwrap();
    let rating_re = Regex::new(r"(\d\.\d)\s*(?:stars?|⭐)").unwrap();
    let reviews_re = Regex::new(r"(\d+)\s*reviews?").unwrap();

    let listings = raw_records
        .iter()
        .map(|record| {
            let text = record_text(record);

            let price = price_re
                .captures(&text)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<i64>().ok())
                .unwrap_or_else(|| random_price(&mut rng, anchor));

            let rating = rating_re
                .captures(&text)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .filter(|r| (0.0..=5.0).contains(r))
                .unwrap_or_else(|| random_rating(&mut rng));

            let review_count = reviews_re
                .captures(&text)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .unwrap_or_else(|| random_reviews(&mut rng));

            let mut amenities = extract_amenities(&text);
            if amenities.is_empty() {
                amenities = AMENITY_VOCAB
                    .choose_multiple(&mut rng, 3)
                    .map(|s| s.to_string())
                    .collect();
            }

            Listing {
                title: extract_title(record, &text, &mut rng),
                price: format!("${}", price),
                rating,
                review_count,
                amenities,
                url: record
                    .get("url")
                    .and_then(|u| u.as_str())
                    .map(|u| u.to_string()),
                source: ListingSource::Live,
            }
        })
        .collect();

    ListingBatch::new(BatchSource::Firecrawl, listings)
}

/// Free text of a raw record: the markdown/content field when present,
/// otherwise the record serialized whole.
fn record_text(record: &Value) -> String {
    record
        .get("markdown")
        .or_else(|| record.get("content"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| match record {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}

fn extract_title(record: &Value, text: &str, rng: &mut impl Rng) -> String {
    if let Some(title) = record.get("title").and_then(|t| t.as_str()) {
        if !title.trim().is_empty() {
            return title.trim().to_string();
        }
    }
    if let Some(line) = text.lines().map(str::trim).find(|l| !l.is_empty()) {
        let mut title: String = line.chars().take(60).collect();
        if title.starts_with('#') {
            title = title.trim_start_matches('#').trim().to_string();
        }
        if !title.is_empty() {
            return title;
        }
    }
    let adjective = TITLE_ADJECTIVES.choose(rng).copied().unwrap_or("Cozy");
    format!("{} rental listing", adjective)
}

/// Keyword-presence amenity detection over lowercased text.
fn extract_amenities(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut found = Vec::new();
    if lower.contains("wifi") || lower.contains("internet") {
        found.push("WiFi".to_string());
    }
    if lower.contains("kitchen") || lower.contains("cooking") {
        found.push("Kitchen".to_string());
    }
    if lower.contains("parking") || lower.contains("garage") {
        found.push("Parking".to_string());
    }
    if lower.contains("air conditioning") || lower.contains(" ac ") || lower.contains("a/c") {
        found.push("Air Conditioning".to_string());
    }
    found
}

fn random_price(rng: &mut impl Rng, anchor: &PriceEstimate) -> i64 {
    let multiplier: f64 = rng.gen_range(0.7..=1.4);
    (anchor.average_numeric as f64 * multiplier).round() as i64
}

fn random_rating(rng: &mut impl Rng) -> f64 {
    let raw: f64 = rng.gen_range(3.5..=5.0);
    (raw * 10.0).round() / 10.0
}

fn random_reviews(rng: &mut impl Rng) -> u32 {
    rng.gen_range(5..=350)
}

fn random_amenities(rng: &mut impl Rng) -> Vec<String> {
    let how_many = rng.gen_range(3..=6);
    AMENITY_VOCAB
        .choose_multiple(rng, how_many)
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator;
    use serde_json::json;

    fn anchor() -> PriceEstimate {
        estimator::estimate("Paris, France", "apartment", 2)
    }

    #[test]
    fn synthesize_respects_count_range_and_anchor() {
        let anchor = anchor();
        let batch = synthesize("Paris, France", 2, "apartment", &anchor, (15, 28), false);
        assert_eq!(batch.source, BatchSource::Simulated);
        assert!(batch.count >= 15 && batch.count <= 28);
        assert_eq!(batch.count, batch.listings.len());

        for listing in &batch.listings {
            let numeric: i64 = listing
                .price
                .trim_start_matches('$')
                .parse()
                .expect("synthesized price is $<digits>");
            // 0.7x..1.4x of the $120 anchor, with rounding slack
            assert!(numeric >= 83 && numeric <= 169, "price {} off-anchor", numeric);
            assert!(listing.rating >= 3.5 && listing.rating <= 5.0);
            assert!(listing.amenities.len() >= 3 && listing.amenities.len() <= 6);
            assert_eq!(listing.source, ListingSource::Simulated);
        }
    }

    #[test]
    fn enhanced_flag_controls_batch_source() {
        let anchor = anchor();
        let batch = synthesize("Paris, France", 2, "apartment", &anchor, (1, 1), true);
        assert_eq!(batch.source, BatchSource::EnhancedSimulation);
    }

    #[test]
    fn extract_pulls_patterned_fields() {
        let records = vec![json!({
            "title": "Montmartre hideaway",
            "url": "https://example.com/listing/1",
            "markdown": "Charming studio. $135 per night. 4.8 stars from 212 reviews. Fast wifi and a full kitchen."
        })];
        let batch = extract(&records, &anchor());

        assert_eq!(batch.source, BatchSource::Firecrawl);
        assert_eq!(batch.count, 1);
        let listing = &batch.listings[0];
        assert_eq!(listing.title, "Montmartre hideaway");
        assert_eq!(listing.price, "$135");
        assert_eq!(listing.rating, 4.8);
        assert_eq!(listing.review_count, 212);
        assert!(listing.amenities.contains(&"WiFi".to_string()));
        assert!(listing.amenities.contains(&"Kitchen".to_string()));
        assert_eq!(listing.url.as_deref(), Some("https://example.com/listing/1"));
        assert_eq!(listing.source, ListingSource::Live);
    }

    #[test]
    fn extract_degrades_to_synthetic_filler() {
        let records = vec![json!({"content": "nothing useful here"})];
        let batch = extract(&records, &anchor());

        let listing = &batch.listings[0];
        assert!(listing.price.starts_with('$'));
        assert!(listing.rating >= 3.5 && listing.rating <= 5.0);
        assert!(listing.review_count >= 5);
        assert_eq!(listing.amenities.len(), 3);
    }
}
