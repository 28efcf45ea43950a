use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{FailureClass, FetchError, FetchFailure};

/// Attempts per request, first try included
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

const SNIPPET_LEN: usize = 200;

/// Raw response as seen by the retry loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One GET request, no retries
///
/// Implementations only report transport problems as errors; every answer
/// from the server, whatever its status, comes back as an `HttpResponse`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchFailure>;
}

/// Politeness pacing for one class of requests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    pub base_delay: Duration,
    pub jitter: Duration,
}

impl Pacing {
    pub fn from_secs(base_delay: f64, jitter: f64) -> Self {
        Self {
            base_delay: Duration::from_secs_f64(base_delay),
            jitter: Duration::from_secs_f64(jitter),
        }
    }

    /// No waiting at all
    pub fn none() -> Self {
        Self {
            base_delay: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    /// Wait before every attempt: `base + U(0, jitter)`
    pub fn before_attempt(&self) -> Duration {
        self.base_delay.saturating_add(random_up_to(self.jitter))
    }

    /// Extra wait after a transient failure on the given 1-based attempt
    pub fn backoff(&self, attempt: u32) -> Duration {
        let scale = attempt.saturating_add(1);
        self.base_delay
            .saturating_mul(scale)
            .saturating_add(random_up_to(self.jitter.saturating_mul(scale)))
    }

    /// Upper bound of `backoff` for the given attempt
    pub fn max_backoff(&self, attempt: u32) -> Duration {
        let scale = attempt.saturating_add(1);
        self.base_delay
            .saturating_add(self.jitter)
            .saturating_mul(scale)
    }
}

fn random_up_to(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }
    let secs = rand::rng().random_range(0.0..=max.as_secs_f64());
    Duration::try_from_secs_f64(secs).map_or(max, |d| d.min(max))
}

/// reqwest-backed transport used for real runs
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build the HTTP client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let mut builder = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers);

        if let Some(path) = &config.ca_bundle {
            let pem = std::fs::read(path)
                .with_context(|| format!("Failed to read CA bundle {}", path.display()))?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .with_context(|| format!("Invalid PEM certificate in {}", path.display()))?;
            builder = builder.add_root_certificate(cert);
            debug!("Added root certificate from {}", path.display());
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchFailure> {
        let response = self.client.get(url).send().await.map_err(classify_reqwest)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify_reqwest)?;

        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchFailure> {
        (**self).get(url).await
    }
}

fn classify_reqwest(err: reqwest::Error) -> FetchFailure {
    if err.is_builder() || err.is_redirect() {
        FetchFailure::Request(err.to_string())
    } else {
        FetchFailure::Transport(err.to_string())
    }
}

/// GET with pacing and bounded retry on transient failures
pub struct Fetcher<T> {
    transport: T,
    max_attempts: u32,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, max_attempts: u32) -> Self {
        Self {
            transport,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Fetch `url` and return its full body text
    pub async fn fetch(&self, url: &str, pacing: Pacing) -> Result<String, FetchError> {
        let mut attempt = 1;

        loop {
            sleep(pacing.before_attempt()).await;
            debug!("GET {} (attempt {}/{})", url, attempt, self.max_attempts);

            let failure = match self.transport.get(url).await {
                Ok(response) if response.is_success() => return Ok(response.body),
                Ok(response) => FetchFailure::Status {
                    status: response.status,
                    snippet: body_snippet(&response.body),
                },
                Err(failure) => failure,
            };

            if failure.class() == FailureClass::Transient && attempt < self.max_attempts {
                let wait = pacing.backoff(attempt);
                warn!(
                    "GET {} failed ({}), retrying in {:.2}s",
                    url,
                    failure,
                    wait.as_secs_f64()
                );
                sleep(wait).await;
                attempt += 1;
                continue;
            }

            return Err(FetchError {
                url: url.to_string(),
                attempts: attempt,
                cause: failure,
            });
        }
    }
}

/// Whitespace-collapsed head of a response body for log lines
pub fn body_snippet(body: &str) -> String {
    body.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(SNIPPET_LEN)
        .collect()
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::testing::ScriptedTransport;
    use super::*;

    const URL: &str = "https://hawk.live/matches/recent/2022-01-01";

    #[tokio::test]
    async fn test_retries_until_max_attempts_on_503() {
        let transport = Arc::new(ScriptedTransport::new().status(URL, 503));
        let fetcher = Fetcher::new(Arc::clone(&transport), DEFAULT_MAX_ATTEMPTS);

        let err = fetcher.fetch(URL, Pacing::none()).await.unwrap_err();

        assert_eq!(err.attempts, 4);
        assert_eq!(err.url, URL);
        assert_eq!(err.cause.status(), Some(503));
        assert_eq!(transport.calls_to(URL), 4);
    }

    #[tokio::test]
    async fn test_permanent_status_is_not_retried() {
        let transport = Arc::new(ScriptedTransport::new().status(URL, 404));
        let fetcher = Fetcher::new(Arc::clone(&transport), DEFAULT_MAX_ATTEMPTS);

        let err = fetcher.fetch(URL, Pacing::none()).await.unwrap_err();

        assert_eq!(err.attempts, 1);
        assert_eq!(err.cause.status(), Some(404));
        assert_eq!(transport.calls_to(URL), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(URL, Err(FetchFailure::Transport("timed out".into())))
                .status(URL, 429)
                .ok(URL, "<html>ok</html>"),
        );
        let fetcher = Fetcher::new(Arc::clone(&transport), DEFAULT_MAX_ATTEMPTS);

        let body = fetcher.fetch(URL, Pacing::none()).await.unwrap();

        assert_eq!(body, "<html>ok</html>");
        assert_eq!(transport.calls_to(URL), 3);
    }

    #[tokio::test]
    async fn test_request_errors_fail_immediately() {
        let transport = Arc::new(
            ScriptedTransport::new().respond(URL, Err(FetchFailure::Request("bad url".into()))),
        );
        let fetcher = Fetcher::new(Arc::clone(&transport), DEFAULT_MAX_ATTEMPTS);

        let err = fetcher.fetch(URL, Pacing::none()).await.unwrap_err();

        assert_eq!(err.attempts, 1);
        assert!(matches!(err.cause, FetchFailure::Request(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_waits_are_applied() {
        let transport = Arc::new(ScriptedTransport::new().status(URL, 500).ok(URL, "done"));
        let fetcher = Fetcher::new(Arc::clone(&transport), DEFAULT_MAX_ATTEMPTS);
        let pacing = Pacing::from_secs(1.0, 0.0);

        let started = tokio::time::Instant::now();
        fetcher.fetch(URL, pacing).await.unwrap();

        // 1s before attempt 1, 2s backoff, 1s before attempt 2
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(4));
        assert!(elapsed < Duration::from_millis(4100));
    }

    #[test]
    fn test_backoff_scales_with_attempt() {
        let pacing = Pacing::from_secs(0.5, 0.25);
        for attempt in 1..DEFAULT_MAX_ATTEMPTS {
            let wait = pacing.backoff(attempt);
            assert!(wait >= pacing.base_delay * (attempt + 1));
            assert!(wait <= pacing.max_backoff(attempt));
        }

        let before = pacing.before_attempt();
        assert!(before >= pacing.base_delay);
        assert!(before <= pacing.base_delay + pacing.jitter);
    }

    #[test]
    fn test_backoff_saturates_instead_of_overflowing() {
        let pacing = Pacing {
            base_delay: Duration::MAX / 2,
            jitter: Duration::MAX / 2,
        };

        assert_eq!(pacing.max_backoff(u32::MAX), Duration::MAX);
        assert!(pacing.backoff(u32::MAX) >= Duration::MAX / 2);
        assert!(pacing.before_attempt() >= pacing.base_delay);
    }

    #[test]
    fn test_body_snippet_collapses_whitespace() {
        assert_eq!(body_snippet("  <h1>Too\n\n many</h1>\trequests "), "<h1>Too many</h1> requests");
        assert_eq!(body_snippet(&"x".repeat(500)).len(), SNIPPET_LEN);
    }
}
