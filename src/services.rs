use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::fetch::{FetchResult, RetryPolicy, RetryingFetchClient};
use crate::models::{PriceEstimate, Query, StructuredAnalysis};
use serde_json::{json, Value};
use std::time::Duration;

// ============ Scrape Source ============

/// Client for the firecrawl-style scraping API.
///
/// All transport concerns (retry, backoff, degradation to an empty result)
/// live in `RetryingFetchClient`; this service only shapes the request.
pub struct ScrapeService {
    fetch: RetryingFetchClient,
    base_url: String,
    listing_limit: u32,
}

impl ScrapeService {
    /// Builds the service when scraping is configured, `None` otherwise.
    pub fn from_config(config: &Config) -> Result<Option<Self>, AppError> {
        let Some(base_url) = config.scrape_base_url.clone() else {
            return Ok(None);
        };

        let policy = RetryPolicy::new(4, Duration::from_millis(config.retry_base_delay_ms));
        let fetch = RetryingFetchClient::new(policy, config.scrape_api_key.clone())?;

        Ok(Some(Self {
            fetch,
            base_url,
            listing_limit: config.scrape_listing_limit,
        }))
    }

    /// Searches for live listings matching the query.
    ///
    /// Absence of data (or exhausted retries, already degraded by the fetch
    /// client) comes back as an empty `FetchResult`, which the pipeline
    /// treats as "no live data", not an error.
    pub async fn search(&self, query: &Query) -> FetchResult {
        let url = format!("{}/v1/search", self.base_url);
        let payload = json!({
            "query": format!("short term rentals in {}", query.location),
            "options": {
                "guests": query.guests,
                "property_type": query.property_type_or_default(),
                "budget_max": query.budget_max,
                "limit": self.listing_limit,
            }
        });

        tracing::info!("Searching live listings for {}", query.location);
        self.fetch.fetch(&url, &payload).await
    }
}

// ============ Generative Analysis Source ============

/// Client for the generative-analysis API.
///
/// One structured-mode attempt; on schema/parse failure, one unstructured
/// fallback attempt whose text is scanned for an embedded JSON object. No
/// retries at this layer: any residual failure is an `Err` the pipeline
/// maps to "analysis absent".
pub struct InsightService {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl InsightService {
    /// Builds the service when analysis is configured, `None` otherwise.
    pub fn from_config(config: &Config) -> Result<Option<Self>, AppError> {
        let Some(base_url) = config.insight_base_url.clone() else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create insight client: {}", e))
            })?;

        Ok(Some(Self {
            client,
            base_url,
            api_key: config.insight_api_key.clone(),
        }))
    }

    /// Generates a structured market analysis for the query.
    pub async fn analyze(
        &self,
        query: &Query,
        estimate: &PriceEstimate,
    ) -> Result<StructuredAnalysis, AppError> {
        let prompt = build_prompt(query, estimate);

        match self.request(&prompt, true).await {
            Ok(body) => {
                let candidate = body.get("analysis").cloned().unwrap_or(body);
                match parse_structured(candidate) {
                    Ok(analysis) => {
                        tracing::info!("Structured analysis generated for {}", query.location);
                        return Ok(analysis);
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Structured analysis failed validation for {}: {}",
                            query.location,
                            e
                        );
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Structured analysis call failed: {}", e);
            }
        }

        // Single unstructured fallback: the free text may still carry a
        // usable JSON object.
        let body = self
            .request(&prompt, false)
            .await
            .context("unstructured fallback call failed")?;
        let text = body
            .get("text")
            .and_then(|t| t.as_str())
            .map(|t| t.to_string())
            .unwrap_or_else(|| body.to_string());

        let embedded = extract_json_object(&text).ok_or_else(|| {
            AppError::SchemaValidation("no JSON object in unstructured response".to_string())
        })?;
        let mut analysis = parse_structured(embedded)?;
        // Recovered from free text, so the schema contract was not honored
        analysis.schema_validated = false;
        tracing::info!(
            "Recovered analysis from unstructured fallback for {}",
            query.location
        );
        Ok(analysis)
    }

    async fn request(&self, prompt: &str, structured: bool) -> Result<Value, AppError> {
        let url = format!("{}/v1/analyze", self.base_url);
        let payload = if structured {
            json!({
                "prompt": prompt,
                "format": "json",
                "schema": expected_schema(),
            })
        } else {
            json!({ "prompt": prompt, "format": "text" })
        };

        let mut request = self.client.post(&url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Insight request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Insight API returned {}: {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse insight response: {}", e))
        })
    }
}

fn build_prompt(query: &Query, estimate: &PriceEstimate) -> String {
    format!(
        "Analyze the short-term-rental market in {} for {} guests staying in \
         a {}. A deterministic model estimates {} per night (range ${}-{}). \
         Return average, range_low, range_high, peak, value_rating, \
         competition_level, neighborhoods, booking_tips, market_trend, \
         seasonal_trends and market_insights.",
        query.location,
        query.guests,
        query.property_type_or_default(),
        estimate.average,
        estimate.range_low,
        estimate.range_high,
    )
}

/// JSON schema handed to the generator in structured mode.
fn expected_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "average": { "type": "string" },
            "range_low": { "type": "integer" },
            "range_high": { "type": "integer" },
            "peak": { "type": "string" },
            "value_rating": { "enum": ["Excellent", "Good", "Fair", "Poor"] },
            "competition_level": { "enum": ["Low", "Medium", "High"] },
            "neighborhoods": { "type": "array", "items": { "type": "string" } },
            "booking_tips": { "type": "array", "items": { "type": "string" } },
            "market_trend": { "type": "string" },
            "seasonal_trends": { "type": "string" },
            "market_insights": { "type": "string" }
        }
    })
}

/// Parses a candidate value into a `StructuredAnalysis`, rejecting payloads
/// that carry none of the expected fields.
fn parse_structured(candidate: Value) -> Result<StructuredAnalysis, AppError> {
    if !candidate.is_object() {
        return Err(AppError::SchemaValidation(
            "analysis payload is not an object".to_string(),
        ));
    }
    let analysis: StructuredAnalysis = serde_json::from_value(candidate)?;
    let empty = analysis.average.is_none()
        && analysis.range_low.is_none()
        && analysis.range_high.is_none()
        && analysis.peak.is_none()
        && analysis.value_rating.is_none()
        && analysis.competition_level.is_none()
        && analysis.neighborhoods.is_none()
        && analysis.booking_tips.is_none()
        && analysis.market_trend.is_none()
        && analysis.seasonal_trends.is_none()
        && analysis.market_insights.is_none();
    if empty {
        return Err(AppError::SchemaValidation(
            "analysis payload carries no recognized fields".to_string(),
        ));
    }
    Ok(analysis)
}

/// First balanced `{...}` block in free text, parsed as JSON if possible.
fn extract_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let block = &text[start..start + offset + ch.len_utf8()];
                    return serde_json::from_str(block).ok();
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_block_extracted_from_prose() {
        let text = "Here is my analysis:\n```json\n{\"average\": \"$130\", \"market_insights\": \"busy\"}\n```\nHope that helps.";
        let value = extract_json_object(text).expect("block found");
        assert_eq!(value["average"], "$130");
    }

    #[test]
    fn fieldless_payload_rejected() {
        assert!(parse_structured(json!({"unrelated": 1})).is_err());
        assert!(parse_structured(json!("just a string")).is_err());
        assert!(parse_structured(json!({"average": "$90"})).is_ok());
    }
}
