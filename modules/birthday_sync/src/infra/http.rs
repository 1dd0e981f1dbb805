//! Thin tracing wrapper around `reqwest::Client` shared by the People
//! directory client and the photo cache.

use std::time::Duration;

use tracing::{field, Instrument, Level};

/// A reqwest client that opens an `outgoing_http` span per request and
/// records the response status on it.
#[derive(Clone)]
pub struct TracedClient {
    inner: reqwest::Client,
}

impl TracedClient {
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Client with a per-request timeout covering connect and body.
    pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
        let inner = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new(inner))
    }

    pub async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let span = tracing::span!(
            Level::INFO, "outgoing_http",
            http.method = %req.method(),
            http.url = %redacted(req.url()),
            http.status_code = field::Empty,
            error = field::Empty,
        );

        let response = self.inner.execute(req).instrument(span.clone()).await?;

        let status = response.status();
        span.record("http.status_code", status.as_u16());
        if status.is_client_error() || status.is_server_error() {
            span.record("error", true);
        }
        Ok(response)
    }

    /// GET with an `Authorization: Bearer` header and optional query pairs.
    pub async fn get_bearer(
        &self,
        url: &str,
        token: &str,
        query: &[(&str, &str)],
    ) -> reqwest::Result<reqwest::Response> {
        let req = self
            .inner
            .get(url)
            .bearer_auth(token)
            .query(query)
            .build()?;
        self.execute(req).await
    }
}

impl From<reqwest::Client> for TracedClient {
    fn from(c: reqwest::Client) -> Self {
        Self::new(c)
    }
}

impl Default for TracedClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

/// Query strings are dropped from span fields.
fn redacted(url: &reqwest::Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}
