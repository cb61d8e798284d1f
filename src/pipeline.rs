/// Batch estimation-and-fusion workflow.
///
/// Per query, three analyses are produced and reconciled:
/// 1. Deterministic price estimate (always runs, never fails)
/// 2. Live listing search with synthesis fallback (best-effort)
/// 3. Generative structured analysis (best-effort)
///
/// Queries are processed sequentially in input order. A failure inside one
/// query's processing is logged and skipped; it never aborts the batch.
use crate::charts::{self, ChartSet};
use crate::config::Config;
use crate::errors::AppError;
use crate::estimator;
use crate::fusion;
use crate::models::{FusedResult, ListingBatch, Query, StructuredAnalysis};
use crate::services::{InsightService, ScrapeService};
use crate::synthesizer;
use serde::Serialize;

/// Output of one batch run: fused results in query order, derived charts
/// (absent when nothing was produced) and the count of isolated failures.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub results: Vec<FusedResult>,
    pub charts: Option<ChartSet>,
    pub failed: usize,
}

pub struct Pipeline {
    scrape: Option<ScrapeService>,
    insight: Option<InsightService>,
}

impl Pipeline {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            scrape: ScrapeService::from_config(config)?,
            insight: InsightService::from_config(config)?,
        })
    }

    /// Runs the full pipeline for a batch of queries.
    ///
    /// An empty batch is a terminal condition for the run, distinct from
    /// any per-query failure.
    pub async fn run_batch(&self, queries: &[Query]) -> Result<BatchReport, AppError> {
        if queries.is_empty() {
            return Err(AppError::EmptyBatch);
        }

        let mut results = Vec::with_capacity(queries.len());
        let mut failed = 0usize;

        for (index, query) in queries.iter().enumerate() {
            tracing::info!(
                "Processing query {}/{}: {}",
                index + 1,
                queries.len(),
                query.location
            );
            match self.analyze_query(query).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    // Isolated: report and continue with the rest
                    tracing::error!("Query '{}' failed: {}", query.location, e);
                    failed += 1;
                }
            }
        }

        let charts = charts::aggregate(&results);
        tracing::info!(
            "Batch complete: {} fused, {} failed, charts: {}",
            results.len(),
            failed,
            charts.is_some()
        );

        Ok(BatchReport {
            results,
            charts,
            failed,
        })
    }

    /// Produces the fused result for one query.
    pub async fn analyze_query(&self, query: &Query) -> Result<FusedResult, AppError> {
        if query.guests == 0 {
            return Err(AppError::BadRequest(
                "guest count must be a positive integer".to_string(),
            ));
        }

        // Step 1: deterministic estimate, always available
        let estimate =
            estimator::estimate(&query.location, query.property_type_or_default(), query.guests);

        // Step 2: market sample, live when possible, synthesized otherwise
        let listing_batch = self.gather_listings(query, &estimate).await;

        // Step 3: generative analysis, absent on any failure
        let structured = self.gather_analysis(query, &estimate).await;

        Ok(fusion::fuse(
            query,
            &listing_batch,
            &estimate,
            structured.as_ref(),
        ))
    }

    async fn gather_listings(
        &self,
        query: &Query,
        estimate: &crate::models::PriceEstimate,
    ) -> ListingBatch {
        let Some(scrape) = &self.scrape else {
            return synthesizer::synthesize(
                &query.location,
                query.guests,
                query.property_type_or_default(),
                estimate,
                synthesizer::DEFAULT_COUNT_RANGE,
                false,
            );
        };

        let fetched = scrape.search(query).await;
        if let Some(error) = &fetched.error {
            tracing::warn!(
                "Live search degraded for {}: {}. Synthesizing listings",
                query.location,
                error
            );
        }

        if fetched.data.is_empty() {
            // Live attempt made but no sample came back
            return synthesizer::synthesize(
                &query.location,
                query.guests,
                query.property_type_or_default(),
                estimate,
                synthesizer::DEFAULT_COUNT_RANGE,
                true,
            );
        }

        synthesizer::extract(&fetched.data, estimate)
    }

    async fn gather_analysis(
        &self,
        query: &Query,
        estimate: &crate::models::PriceEstimate,
    ) -> Option<StructuredAnalysis> {
        let insight = self.insight.as_ref()?;
        match insight.analyze(query, estimate).await {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                tracing::warn!(
                    "Generative analysis unavailable for {}: {}",
                    query.location,
                    e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BatchSource;

    fn offline_pipeline() -> Pipeline {
        Pipeline::new(&Config::offline()).unwrap()
    }

    #[tokio::test]
    async fn offline_pipeline_fuses_from_estimate_and_synthesis() {
        let pipeline = offline_pipeline();
        let query = Query::new("Paris, France", 2);
        let result = pipeline.analyze_query(&query).await.unwrap();

        assert_eq!(result.average, "$120");
        assert_eq!(result.scraped_data_source, BatchSource::Simulated);
        assert!(result.scraped_listings_count >= 15);
        assert!(result.schema_validated);
    }

    #[tokio::test]
    async fn zero_guest_query_is_isolated_not_fatal() {
        let pipeline = offline_pipeline();
        let queries = vec![Query::new("Paris, France", 0), Query::new("Tokyo, Japan", 2)];
        let report = pipeline.run_batch(&queries).await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].location, "Tokyo, Japan");
        assert!(report.charts.is_some());
    }

    #[tokio::test]
    async fn empty_batch_is_terminal() {
        let pipeline = offline_pipeline();
        let err = pipeline.run_batch(&[]).await.unwrap_err();
        assert!(matches!(err, AppError::EmptyBatch));
    }
}
