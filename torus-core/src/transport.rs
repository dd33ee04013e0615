//! How requests reach the nodes.

#[cfg(feature = "http")]
use core::time::Duration;

/// Posts a JSON body to a node and returns the raw response body.
///
/// Implementations bound the latency of each call themselves and report any
/// failure (connection error, timeout, non-success status) as `None`. The
/// pipeline treats `None` and an empty body identically.
pub trait Transport {
    /// Posts `body` to `endpoint`.
    #[allow(async_fn_in_trait)]
    async fn post(&self, endpoint: &str, body: &str) -> Option<String>;
}

impl<T: Transport + ?Sized> Transport for &T {
    async fn post(&self, endpoint: &str, body: &str) -> Option<String> {
        (**self).post(endpoint, body).await
    }
}

/// A [`Transport`] over HTTP(S) using `reqwest`.
#[cfg(feature = "http")]
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpTransport {
    /// The per-request timeout used by [`HttpTransport::with_default_timeout`].
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a transport whose requests time out after `timeout`.
    ///
    /// Fails if the HTTP client cannot be built, e.g. when the TLS backend
    /// cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, crate::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| crate::Error::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }

    /// Creates a transport with [`HttpTransport::DEFAULT_TIMEOUT`].
    pub fn with_default_timeout() -> Result<Self, crate::Error> {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

#[cfg(feature = "http")]
impl Transport for HttpTransport {
    async fn post(&self, endpoint: &str, body: &str) -> Option<String> {
        let response = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/json; charset=utf-8")
            .body(body.to_string())
            .send()
            .await;
        let response = match response {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!(endpoint, status = %response.status(), "node returned an error status");
                return None;
            }
            Err(e) => {
                tracing::warn!(endpoint, error = %e, "request to node failed");
                return None;
            }
        };
        response.text().await.ok()
    }
}
