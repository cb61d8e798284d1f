use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the scraping API. Optional: absent disables live scraping
    /// and the pipeline synthesizes listings instead.
    pub scrape_base_url: Option<String>,
    /// API key for the scraping API.
    pub scrape_api_key: Option<String>,
    /// Base URL of the generative-analysis API. Optional: absent disables
    /// structured analysis and fusion runs on the estimate alone.
    pub insight_base_url: Option<String>,
    /// API key for the generative-analysis API.
    pub insight_api_key: Option<String>,
    /// Base unit for linear retry backoff, in milliseconds.
    pub retry_base_delay_ms: u64,
    /// Maximum listings requested per live search.
    pub scrape_listing_limit: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            scrape_base_url: std::env::var("SCRAPE_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("SCRAPE_BASE_URL must start with http:// or https://");
                    }
                    Ok(url)
                })
                .transpose()?,
            scrape_api_key: std::env::var("SCRAPE_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            insight_base_url: std::env::var("INSIGHT_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("INSIGHT_BASE_URL must start with http:// or https://");
                    }
                    Ok(url)
                })
                .transpose()?,
            insight_api_key: std::env::var("INSIGHT_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            retry_base_delay_ms: std::env::var("RETRY_BASE_DELAY_MS")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .map_err(|_| {
                    anyhow::anyhow!("RETRY_BASE_DELAY_MS must be a non-negative integer")
                })?,
            scrape_listing_limit: std::env::var("SCRAPE_LISTING_LIMIT")
                .unwrap_or_else(|_| "25".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SCRAPE_LISTING_LIMIT must be a positive integer"))
                .and_then(|limit: u32| {
                    if limit == 0 {
                        anyhow::bail!("SCRAPE_LISTING_LIMIT must be a positive integer");
                    }
                    Ok(limit)
                })?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        match &config.scrape_base_url {
            Some(url) => tracing::info!("Live scraping enabled: {}", url),
            None => tracing::info!("Live scraping disabled, listings will be simulated"),
        }
        match &config.insight_base_url {
            Some(url) => tracing::info!("Generative analysis enabled: {}", url),
            None => tracing::info!("Generative analysis disabled"),
        }
        tracing::debug!("Retry base delay: {}ms", config.retry_base_delay_ms);
        tracing::debug!("Scrape listing limit: {}", config.scrape_listing_limit);

        Ok(config)
    }

    /// Configuration with both external stages disabled and fast retries.
    /// Useful for offline runs and tests.
    pub fn offline() -> Self {
        Self {
            scrape_base_url: None,
            scrape_api_key: None,
            insight_base_url: None,
            insight_api_key: None,
            retry_base_delay_ms: 0,
            scrape_listing_limit: 25,
        }
    }
}
