// Deichwave REST client
//
// Wraps `reqwest::Client` with host-aware URL construction and JSON
// decoding. Every call first obtains the resolved base URL from the
// shared `HostResolver`, suspending until discovery has settled. Endpoint
// helpers live in `endpoints.rs` as inherent methods.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::Error;
use crate::host::{BaseUrl, HostResolver};

/// HTTP client for the `api/v0` surface of a Deichwave box.
///
/// Cheap to share behind an `Arc`; the underlying `reqwest::Client` pools
/// connections. Failures are always returned as [`Error`] values, never
/// panics, so one failed refresh cannot take its caller down.
pub struct ApiClient {
    http: reqwest::Client,
    resolver: Arc<HostResolver>,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, resolver: Arc<HostResolver>, timeout: Duration) -> Self {
        Self {
            http,
            resolver,
            timeout,
        }
    }

    /// The resolver this client waits on.
    pub fn resolver(&self) -> &Arc<HostResolver> {
        &self.resolver
    }

    /// The underlying HTTP client (shared with the event stream).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The resolved base URL, waiting for discovery if necessary.
    pub async fn base_url(&self) -> Result<BaseUrl, Error> {
        if let Some(base) = self.resolver.current() {
            return Ok(base);
        }
        debug!("waiting for API host resolution");
        self.resolver.resolved().await
    }

    /// Issue `method {base}api/v0/{endpoint}` and decode the JSON reply.
    ///
    /// `endpoint` is split on `/`; use the typed helpers for item names
    /// that may contain a slash.
    pub async fn call(
        &self,
        endpoint: &str,
        method: Method,
        payload: Option<&Value>,
    ) -> Result<Value, Error> {
        let segments: Vec<&str> = endpoint.split('/').filter(|s| !s.is_empty()).collect();
        self.send(method, &segments, payload).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, Error> {
        self.send(Method::GET, segments, None).await
    }

    /// Send a POST request with an optional JSON body and decode the reply.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: Option<&Value>,
    ) -> Result<T, Error> {
        self.send(Method::POST, segments, body).await
    }

    /// Fire a POST whose reply is only an acknowledgement (`"OK"`).
    pub(crate) async fn post_action(&self, segments: &[&str]) -> Result<(), Error> {
        let _: Value = self.post(segments, None).await?;
        Ok(())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
    ) -> Result<T, Error> {
        let base = self.base_url().await?;
        let url = base.api_url_segments(segments);
        debug!(%method, %url, "api request");

        let mut builder = self.http.request(method, url).timeout(self.timeout);
        if let Some(body) = body {
            // `.json()` also sets `Content-Type: application/json`.
            builder = builder.json(body);
        }
        let resp = builder.send().await.map_err(Error::Transport)?;

        parse_response(&segments.join("/"), resp).await
    }
}

/// Turn a response into either the decoded body or a descriptive error.
async fn parse_response<T: DeserializeOwned>(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;
    trace!(endpoint, %status, len = body.len(), "api response");

    if !status.is_success() {
        return Err(Error::Status {
            endpoint: endpoint.to_owned(),
            status: status.as_u16(),
            body: preview(&body).to_owned(),
        });
    }

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (endpoint {endpoint}, body preview: {:?})", preview(&body)),
        body,
    })
}

/// First 200 bytes of a body, cut on a char boundary.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
