//! Shared transport plumbing for collectors: paced, retried page fetches
//! with transport faults mapped into source errors.

use std::sync::Arc;

use crate::collector::SourceError;
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::pacing::{PacingGate, PacingPolicy};
use crate::retry::{execute_with_retry, RetryConfig};
use crate::SourceId;

/// One collector's exclusively-owned network session: transport, pacing
/// gate, and retry policy. Every fetch goes through the gate, retries
/// included. Sessions are never shared between collector instances.
pub(crate) struct WebSession {
    source: SourceId,
    http: Arc<dyn HttpClient>,
    pacing: PacingGate,
    retry: RetryConfig,
}

impl WebSession {
    /// Offline session: no-op transport, no pacing, no retries.
    pub(crate) fn mock(source: SourceId) -> Self {
        Self {
            source,
            http: Arc::new(NoopHttpClient),
            pacing: PacingGate::new(PacingPolicy::unthrottled()),
            retry: RetryConfig::no_retry(),
        }
    }

    /// Live session over the given transport with the source's default
    /// pacing policy.
    pub(crate) fn real(source: SourceId, http: Arc<dyn HttpClient>) -> Self {
        Self {
            source,
            http,
            pacing: PacingGate::for_source(source),
            retry: RetryConfig::default(),
        }
    }

    pub(crate) fn is_mock(&self) -> bool {
        self.http.is_mock()
    }

    /// Fetch one page, honoring the pacing quota and retry policy.
    pub(crate) async fn fetch(&self, url: &str) -> Result<String, SourceError> {
        self.pacing.acquire().await;

        let request = HttpRequest::get(url).with_header("accept-language", "en-US,en;q=0.9");
        let response = execute_with_retry(&self.http, &request, &self.retry)
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    SourceError::timeout(format!(
                        "{} request timed out: {}",
                        self.source,
                        error.message()
                    ))
                } else {
                    SourceError::unavailable(format!(
                        "{} transport error: {}",
                        self.source,
                        error.message()
                    ))
                }
            })?;

        if response.status == 429 {
            return Err(SourceError::rate_limited(format!(
                "{} refused traffic with status 429",
                self.source
            )));
        }

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "{} upstream returned status {}",
                self.source, response.status
            )));
        }

        Ok(response.body)
    }

    /// Randomized pause between consecutive queries against this source.
    pub(crate) async fn courtesy_delay(&self) {
        self.pacing.courtesy_delay().await;
    }
}

/// DuckDuckGo's plain-HTML endpoint; no script execution needed to read
/// result snippets and links.
pub(crate) fn search_url(query: &str) -> String {
    format!(
        "https://duckduckgo.com/html/?q={}",
        urlencoding::encode(query)
    )
}

/// Snippet selectors for the HTML search results page.
pub(crate) const SEARCH_SNIPPET_SELECTORS: [&str; 3] =
    [".result__snippet", ".result__body", ".result__title"];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpError, HttpResponse};
    use std::future::Future;
    use std::pin::Pin;

    struct FixedClient {
        status: u16,
    }

    impl HttpClient for FixedClient {
        fn execute<'a>(
            &'a self,
            _request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            let status = self.status;
            Box::pin(async move {
                Ok(HttpResponse {
                    status,
                    body: String::new(),
                })
            })
        }
    }

    fn session_with_status(status: u16) -> WebSession {
        WebSession {
            source: SourceId::Directweb,
            http: Arc::new(FixedClient { status }),
            pacing: PacingGate::new(PacingPolicy::unthrottled()),
            retry: RetryConfig::no_retry(),
        }
    }

    #[tokio::test]
    async fn status_429_maps_to_rate_limited() {
        let err = session_with_status(429)
            .fetch("https://example.test")
            .await
            .expect_err("429 must fail");
        assert_eq!(err.code(), "source.rate_limited");
    }

    #[tokio::test]
    async fn server_errors_map_to_unavailable() {
        let err = session_with_status(503)
            .fetch("https://example.test")
            .await
            .expect_err("503 must fail");
        assert_eq!(err.code(), "source.unavailable");
    }

    #[test]
    fn search_url_encodes_the_query() {
        assert_eq!(
            search_url("crunchbase Acme Corp"),
            "https://duckduckgo.com/html/?q=crunchbase%20Acme%20Corp"
        );
    }
}
