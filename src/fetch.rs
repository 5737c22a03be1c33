//! Page retrieval with fixed-delay retries.
//!
//! Same decorator layout as an API client with backoff:
//! - [`PageSource`]: one attempt at getting a page body
//! - [`HttpSource`]: `reqwest` implementation with a fixed `User-Agent`
//! - [`RetryFetch`]: wraps any `PageSource` and retries failed attempts
//!
//! # Retry Strategy
//!
//! - At most `max_attempts` attempts in total
//! - The same `delay` between every pair of consecutive attempts (no growth, no jitter)
//! - Any non-2xx status or transport error counts as a failed attempt
//! - When every attempt fails, the last error is returned inside
//!   [`DigestError::FetchExhausted`]

use crate::error::{DigestError, FetchError};
use crate::utils::truncate_for_log;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// One attempt at retrieving a page body.
pub trait PageSource {
    async fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// Waiting between attempts. Split out so tests can count pauses instead of sleeping.
pub trait Pause {
    async fn pause(&self, delay: Duration);
}

/// Real pause backed by `tokio::time::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioPause;

impl Pause for TokioPause {
    async fn pause(&self, delay: Duration) {
        sleep(delay).await;
    }
}

/// HTTP GET through a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// Build a client that sends `user_agent` with every request.
    pub fn new(user_agent: &str) -> Result<Self, DigestError> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(user_agent)
            .map_err(|e| DigestError::InvalidConfig(format!("user_agent: {}", e)))?;
        headers.insert(USER_AGENT, value);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| DigestError::InvalidConfig(format!("http client: {}", e)))?;
        Ok(Self { client })
    }
}

impl PageSource for HttpSource {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.text().await?)
    }
}

/// Retries a [`PageSource`] with a fixed pause between attempts.
pub struct RetryFetch<S, P = TokioPause> {
    inner: S,
    pause: P,
    /// Total attempts, never below 1.
    max_attempts: u32,
    delay: Duration,
}

impl<S: PageSource> RetryFetch<S, TokioPause> {
    /// # Example
    ///
    /// ```ignore
    /// let source = HttpSource::new("Mozilla/5.0")?;
    /// let fetcher = RetryFetch::new(source, 3, Duration::from_secs(5));
    /// let html = fetcher.fetch("https://www.maxima.lt/pasiulymai").await?;
    /// ```
    pub fn new(inner: S, max_attempts: u32, delay: Duration) -> Self {
        Self::with_pause(inner, TokioPause, max_attempts, delay)
    }
}

impl<S: PageSource, P: Pause> RetryFetch<S, P> {
    pub fn with_pause(inner: S, pause: P, max_attempts: u32, delay: Duration) -> Self {
        Self {
            inner,
            pause,
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &S {
        &self.inner
    }

    /// Fetch `url`, returning the body of the first successful attempt.
    ///
    /// # Arguments
    ///
    /// * `url` - Page to retrieve
    ///
    /// # Returns
    ///
    /// The response body as text.
    ///
    /// # Errors
    ///
    /// [`DigestError::FetchExhausted`] once `max_attempts` attempts have all
    /// failed, carrying the last attempt's [`FetchError`]. There is no pause
    /// after the final attempt.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<String, DigestError> {
        let total_t0 = Instant::now();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let attempt_t0 = Instant::now();
            match self.inner.get(url).await {
                Ok(body) => {
                    info!(
                        attempt,
                        bytes = body.len(),
                        elapsed_ms_total = total_t0.elapsed().as_millis(),
                        "Fetched page"
                    );
                    debug!(preview = %truncate_for_log(&body, 200), "Page body");
                    return Ok(body);
                }
                Err(e) => {
                    let elapsed_ms_attempt = attempt_t0.elapsed().as_millis();
                    if attempt >= self.max_attempts {
                        error!(
                            attempt,
                            max = self.max_attempts,
                            elapsed_ms_attempt,
                            elapsed_ms_total = total_t0.elapsed().as_millis(),
                            error = %e,
                            "fetch exhausted retries"
                        );
                        return Err(DigestError::FetchExhausted {
                            attempts: attempt,
                            last: e,
                        });
                    }

                    warn!(
                        attempt,
                        max = self.max_attempts,
                        elapsed_ms_attempt,
                        delay = ?self.delay,
                        error = %e,
                        "fetch attempt failed; retrying"
                    );
                    self.pause.pause(self.delay).await;
                }
            }
        }
    }
}

impl<S, P> fmt::Debug for RetryFetch<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// Replays canned outcomes in order and counts calls.
    pub(crate) struct ScriptedSource {
        outcomes: RefCell<VecDeque<Result<String, FetchError>>>,
        pub(crate) calls: Cell<usize>,
    }

    impl ScriptedSource {
        pub(crate) fn new(outcomes: Vec<Result<String, FetchError>>) -> Self {
            Self {
                outcomes: RefCell::new(outcomes.into()),
                calls: Cell::new(0),
            }
        }
    }

    impl PageSource for ScriptedSource {
        async fn get(&self, url: &str) -> Result<String, FetchError> {
            self.calls.set(self.calls.get() + 1);
            self.outcomes
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(unavailable(url)))
        }
    }

    /// Records every pause instead of sleeping.
    #[derive(Default)]
    pub(crate) struct CountingPause {
        pub(crate) pauses: RefCell<Vec<Duration>>,
    }

    impl Pause for CountingPause {
        async fn pause(&self, delay: Duration) {
            self.pauses.borrow_mut().push(delay);
        }
    }

    pub(crate) fn unavailable(url: &str) -> FetchError {
        FetchError::Status {
            status: 503,
            url: url.to_string(),
        }
    }

    const URL: &str = "https://example.com/offers";

    #[tokio::test]
    async fn test_first_attempt_succeeds_without_pausing() {
        let fetcher = RetryFetch::with_pause(
            ScriptedSource::new(vec![Ok("<html/>".to_string())]),
            CountingPause::default(),
            3,
            Duration::from_secs(5),
        );

        assert_eq!(fetcher.fetch(URL).await.unwrap(), "<html/>");
        assert_eq!(fetcher.inner.calls.get(), 1);
        assert!(fetcher.pause.pauses.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_third_attempt_succeeds_after_two_pauses() {
        let fetcher = RetryFetch::with_pause(
            ScriptedSource::new(vec![
                Err(unavailable(URL)),
                Err(unavailable(URL)),
                Ok("third".to_string()),
            ]),
            CountingPause::default(),
            3,
            Duration::from_millis(250),
        );

        assert_eq!(fetcher.fetch(URL).await.unwrap(), "third");
        assert_eq!(fetcher.inner.calls.get(), 3);
        assert_eq!(
            *fetcher.pause.pauses.borrow(),
            vec![Duration::from_millis(250); 2]
        );
    }

    #[tokio::test]
    async fn test_exhaustion_surfaces_last_error() {
        let fetcher = RetryFetch::with_pause(
            ScriptedSource::new(vec![
                Err(FetchError::Status {
                    status: 500,
                    url: URL.to_string(),
                }),
                Err(FetchError::Status {
                    status: 404,
                    url: URL.to_string(),
                }),
            ]),
            CountingPause::default(),
            2,
            Duration::from_secs(1),
        );

        match fetcher.fetch(URL).await {
            Err(DigestError::FetchExhausted {
                attempts,
                last: FetchError::Status { status, .. },
            }) => {
                assert_eq!(attempts, 2);
                assert_eq!(status, 404);
            }
            other => panic!("expected FetchExhausted, got {:?}", other),
        }
        // no pause after the final attempt
        assert_eq!(fetcher.pause.pauses.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let fetcher = RetryFetch::with_pause(
            ScriptedSource::new(vec![Err(unavailable(URL))]),
            CountingPause::default(),
            0,
            Duration::ZERO,
        );

        assert!(matches!(
            fetcher.fetch(URL).await,
            Err(DigestError::FetchExhausted { attempts: 1, .. })
        ));
        assert_eq!(fetcher.inner.calls.get(), 1);
    }

    mod http {
        use super::*;
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        async fn server_with(status: u16, body: &str) -> MockServer {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/pasiulymai"))
                .respond_with(ResponseTemplate::new(status).set_body_string(body))
                .mount(&server)
                .await;
            server
        }

        #[tokio::test]
        async fn test_ok_returns_body() {
            let server = server_with(200, "<html>offers</html>").await;
            let source = HttpSource::new("Mozilla/5.0").unwrap();

            let body = source
                .get(&format!("{}/pasiulymai", server.uri()))
                .await
                .unwrap();
            assert_eq!(body, "<html>offers</html>");
        }

        #[tokio::test]
        async fn test_non_success_status_is_status_error() {
            let server = server_with(503, "busy").await;
            let source = HttpSource::new("Mozilla/5.0").unwrap();
            let url = format!("{}/pasiulymai", server.uri());

            match source.get(&url).await {
                Err(FetchError::Status { status, url: got }) => {
                    assert_eq!(status, 503);
                    assert_eq!(got, url);
                }
                other => panic!("expected Status error, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_sends_user_agent() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(header("user-agent", "Mozilla/5.0"))
                .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
                .expect(1)
                .mount(&server)
                .await;
            let source = HttpSource::new("Mozilla/5.0").unwrap();

            // Without the header the server answers 404 and this fails.
            assert_eq!(source.get(&server.uri()).await.unwrap(), "ok");
        }

        #[tokio::test]
        async fn test_retry_over_http_recovers_after_two_failures() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(503))
                .up_to_n_times(2)
                .expect(2)
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_string("third time"))
                .expect(1)
                .mount(&server)
                .await;

            let fetcher = RetryFetch::with_pause(
                HttpSource::new("Mozilla/5.0").unwrap(),
                CountingPause::default(),
                3,
                Duration::from_secs(5),
            );

            assert_eq!(fetcher.fetch(&server.uri()).await.unwrap(), "third time");
            assert_eq!(
                *fetcher.pause.pauses.borrow(),
                vec![Duration::from_secs(5); 2]
            );
        }
    }

    #[test]
    fn test_http_source_rejects_bad_user_agent() {
        assert!(matches!(
            HttpSource::new("bad\nagent"),
            Err(DigestError::InvalidConfig(_))
        ));
    }
}
