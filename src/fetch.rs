use crate::errors::AppError;
use serde_json::Value;
use std::time::Duration;

/// Pure retry schedule, separated from I/O so it is testable without
/// timing or network access.
///
/// Backoff is linear despite the exponential-sounding name this pattern
/// usually carries: attempt n waits n x `base_delay` before the next try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts: 1 initial + retries.
    pub max_attempts: u32,
    /// Base unit for the linear backoff schedule.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay to wait after failed attempt `attempt` (1-based): 1x, 2x, 3x...
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Whether another attempt remains after failed attempt `attempt`.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    /// 1 initial attempt + 3 retries with a 500ms base unit.
    fn default() -> Self {
        Self::new(4, Duration::from_millis(500))
    }
}

/// Outcome of a fetch. `data` empty with `error` set means the retry budget
/// was exhausted; `data` empty with no error is a valid empty payload.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub data: Vec<Value>,
    pub error: Option<String>,
}

impl FetchResult {
    pub fn empty_with_error(message: impl Into<String>) -> Self {
        Self {
            data: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// HTTP client wrapper that retries per `RetryPolicy` and converts
/// exhausted retries into an empty `FetchResult` instead of an error.
///
/// A non-success status is treated identically to a transport failure for
/// retry purposes.
pub struct RetryingFetchClient {
    client: reqwest::Client,
    policy: RetryPolicy,
    api_key: Option<String>,
}

impl RetryingFetchClient {
    pub fn new(policy: RetryPolicy, api_key: Option<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create fetch client: {}", e))
            })?;

        Ok(Self {
            client,
            policy,
            api_key,
        })
    }

    /// POSTs `payload` to `url`, retrying on any failure. Never returns an
    /// error to the caller; the degraded form is `{data: [], error: msg}`.
    pub async fn fetch(&self, url: &str, payload: &Value) -> FetchResult {
        let mut last_error = String::from("no attempts made");

        for attempt in 1..=self.policy.max_attempts {
            match self.attempt(url, payload).await {
                Ok(data) => {
                    tracing::debug!("Fetch succeeded on attempt {}: {}", attempt, url);
                    return FetchResult { data, error: None };
                }
                Err(e) => {
                    last_error = e.to_string();
                    tracing::warn!("Fetch attempt {} failed for {}: {}", attempt, url, last_error);
                    if self.policy.should_retry(attempt) {
                        tokio::time::sleep(self.policy.delay(attempt)).await;
                    }
                }
            }
        }

        tracing::warn!(
            "Fetch exhausted {} attempts for {}, degrading to empty result",
            self.policy.max_attempts,
            url
        );
        FetchResult::empty_with_error(last_error)
    }

    async fn attempt(&self, url: &str, payload: &Value) -> Result<Vec<Value>, AppError> {
        let mut request = self.client.post(url).json(payload);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Endpoint returned {}: {}",
                status, error_text
            )));
        }

        // Any successful status counts regardless of payload shape; an
        // unparseable or shapeless body is an empty (valid) payload.
        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(_) => return Ok(Vec::new()),
        };

        let data = match body {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        Ok(data)
    }
}
