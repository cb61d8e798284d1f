//! Central owner of free-text city parsing and every static per-city table:
//! pricing profiles, value-rating tiers, competition sets, narrative strings
//! and monthly seasonal multipliers. All consumers (estimator, charts) go
//! through `normalize_city` so the parsing rule lives in exactly one place.

use crate::models::{CompetitionLevel, ValueRating};

/// Normalizes a free-text "City, Region" location to a lookup key:
/// lowercase, substring before the first comma, trimmed.
pub fn normalize_city(location: &str) -> String {
    location
        .split(',')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// Pricing parameters for one (city, property type) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingProfile {
    pub base: i64,
    pub range_low: i64,
    pub range_high: i64,
    pub peak_multiplier: f64,
}

/// Generic profile for unknown cities and unmatched property types:
/// base 110, range [0.7x, 1.4x] of base, peak multiplier 1.5.
pub const GENERIC_PROFILE: PricingProfile = PricingProfile {
    base: 110,
    range_low: 77,
    range_high: 154,
    peak_multiplier: 1.5,
};

/// Looks up the pricing profile for a normalized city key and property type.
///
/// A property type not in the table falls back to the generic profile even
/// when the city is known: property-type granularity is not guaranteed and
/// a partial city match is not trusted.
pub fn pricing_profile(city_key: &str, property_type: &str) -> PricingProfile {
    let p = |base, range_low, range_high, peak_multiplier| PricingProfile {
        base,
        range_low,
        range_high,
        peak_multiplier,
    };

    match (city_key, property_type) {
        ("paris", "apartment") => p(120, 80, 180, 1.4),
        ("paris", "house") => p(210, 150, 320, 1.4),
        ("london", "apartment") => p(150, 100, 230, 1.5),
        ("london", "house") => p(240, 170, 360, 1.5),
        ("new york", "apartment") => p(180, 120, 280, 1.6),
        ("new york", "studio") => p(140, 95, 210, 1.6),
        ("tokyo", "apartment") => p(95, 60, 140, 1.5),
        ("barcelona", "apartment") => p(90, 60, 140, 1.4),
        ("barcelona", "villa") => p(160, 110, 240, 1.5),
        ("bali", "villa") => p(70, 40, 120, 1.6),
        ("bali", "apartment") => p(45, 30, 75, 1.5),
        _ => GENERIC_PROFILE,
    }
}

/// (threshold_excellent, threshold_good) cutoffs for the city's tier.
///
/// Cities share three curated tiers; everything else uses the default tier.
pub fn tier_thresholds(city_key: &str) -> (i64, i64) {
    match city_key {
        // Premium markets: high absolute prices still rate well
        "new york" | "london" => (200, 300),
        // Mid-tier European/Asian city markets
        "paris" | "tokyo" | "barcelona" => (150, 220),
        // Budget destinations
        "bali" => (90, 140),
        _ => (130, 180),
    }
}

/// Rates an adjusted average price against the city tier's cutoffs.
pub fn value_rating(city_key: &str, adjusted_average: i64) -> ValueRating {
    let (excellent, good) = tier_thresholds(city_key);
    if adjusted_average < excellent {
        ValueRating::Excellent
    } else if adjusted_average < good {
        ValueRating::Good
    } else if adjusted_average < (good as f64 * 1.5).round() as i64 {
        ValueRating::Fair
    } else {
        ValueRating::Poor
    }
}

/// Static market-competition classification. Independent of current pricing.
pub fn competition_level(city_key: &str) -> CompetitionLevel {
    match city_key {
        "paris" | "london" | "new york" | "tokyo" => CompetitionLevel::High,
        "barcelona" | "bali" => CompetitionLevel::Medium,
        _ => CompetitionLevel::Low,
    }
}

/// Recommended neighborhoods for the city, best first.
pub fn neighborhoods(city_key: &str) -> Vec<String> {
    let names: &[&str] = match city_key {
        "paris" => &["Le Marais", "Montmartre", "Latin Quarter"],
        "london" => &["Shoreditch", "Notting Hill", "Camden"],
        "new york" => &["Williamsburg", "East Village", "Harlem"],
        "tokyo" => &["Shibuya", "Shinjuku", "Asakusa"],
        "barcelona" => &["Gothic Quarter", "El Born", "Gracia"],
        "bali" => &["Ubud", "Seminyak", "Canggu"],
        _ => &["City Center", "Old Town", "Near Transit Hub"],
    };
    names.iter().map(|s| s.to_string()).collect()
}

pub fn market_trend(city_key: &str) -> String {
    let trend = match city_key {
        "paris" => "Stable with strong year-round demand",
        "london" => "Rising, driven by business and weekend travel",
        "new york" => "Rising, supply-constrained market",
        "tokyo" => "Stable with event-driven spikes",
        "barcelona" => "Seasonal, summer-heavy demand",
        "bali" => "Growing long-stay and remote-work demand",
        _ => "Stable demand with moderate seasonal variation",
    };
    trend.to_string()
}

pub fn seasonal_trends(city_key: &str) -> String {
    let narrative = match city_key {
        "paris" => "Peaks in June-August and during fashion weeks; quietest in January-February",
        "london" => "Summer and December holidays peak; January is the low season",
        "new york" => "Strong autumn and December peaks; winter dip after the holidays",
        "bali" => "Dry-season peak July-September; monsoon lull January-February",
        _ => "Higher prices in summer months, lower in late winter",
    };
    narrative.to_string()
}

/// Month labels for seasonal series, January first.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Monthly price multipliers (January first). Four cities carry curated
/// curves; every other city shares the generic curve.
pub fn monthly_multipliers(city_key: &str) -> [f64; 12] {
    match city_key {
        "paris" => [
            0.85, 0.85, 0.95, 1.05, 1.10, 1.25, 1.30, 1.25, 1.10, 1.00, 0.90, 1.05,
        ],
        "london" => [
            0.80, 0.85, 0.95, 1.00, 1.10, 1.20, 1.25, 1.25, 1.05, 1.00, 0.95, 1.15,
        ],
        "new york" => [
            0.85, 0.85, 0.90, 1.00, 1.10, 1.15, 1.15, 1.10, 1.20, 1.25, 1.10, 1.30,
        ],
        "bali" => [
            0.90, 0.85, 0.95, 1.00, 1.05, 1.15, 1.30, 1.30, 1.20, 1.05, 0.95, 1.10,
        ],
        _ => [
            0.90, 0.90, 0.95, 1.00, 1.05, 1.15, 1.20, 1.20, 1.05, 1.00, 0.90, 1.00,
        ],
    }
}
