//! Host discovery with failover.
//!
//! The Deichwave box lives at one of a handful of well-known addresses
//! depending on which network the client happens to share with it. The
//! [`HostResolver`] walks an ordered candidate list, probes each with
//! `GET api/v0/ping`, and settles on the first one answering `"Pong"`.
//! Resolution never times out: a box that is out of reach simply keeps
//! every API caller waiting until the network changes.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::Error;

/// Canonical liveness reply of the ping endpoint.
pub const PONG: &str = "Pong";

// ── BaseUrl ──────────────────────────────────────────────────────────

/// An absolute `http(s)` URL that API paths are appended to.
///
/// Always ends in `/` and never carries a query or fragment, so
/// `{base}api/v0/{endpoint}` is well-formed for every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseUrl(Url);

impl BaseUrl {
    pub fn parse(input: &str) -> Result<Self, Error> {
        let url = Url::parse(input).map_err(|e| Error::InvalidHost {
            candidate: input.to_owned(),
            reason: e.to_string(),
        })?;
        Self::from_url(url)
    }

    pub fn from_url(mut url: Url) -> Result<Self, Error> {
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(Error::InvalidHost {
                candidate: url.to_string(),
                reason: "expected an absolute http(s) URL".into(),
            });
        }
        url.set_query(None);
        url.set_fragment(None);
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self(url))
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// `{base}api/v0/{endpoint}`, splitting `endpoint` on `/`.
    pub fn api_url(&self, endpoint: &str) -> Url {
        let segments: Vec<&str> = endpoint.split('/').filter(|s| !s.is_empty()).collect();
        self.api_url_segments(&segments)
    }

    /// `{base}api/v0/{segments...}` with every segment percent-encoded.
    ///
    /// Used for item-scoped endpoints where a name may itself contain
    /// characters that are significant in a path.
    pub fn api_url_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.0.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").push("v0").extend(segments);
        }
        url
    }

    /// `{base}sse?stream=events`
    pub fn events_url(&self) -> Url {
        let mut url = self.0.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("sse");
        }
        url.set_query(Some("stream=events"));
        url
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

// ── HostCandidate ────────────────────────────────────────────────────

/// One entry of the ordered candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCandidate {
    /// The empty string: whatever origin the client itself was served from.
    SameOrigin,
    /// A fixed base URL.
    Url(BaseUrl),
}

impl FromStr for HostCandidate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            Ok(Self::SameOrigin)
        } else {
            BaseUrl::parse(trimmed).map(Self::Url)
        }
    }
}

impl fmt::Display for HostCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SameOrigin => f.write_str(""),
            Self::Url(base) => base.fmt(f),
        }
    }
}

// ── ConnectionState ──────────────────────────────────────────────────

/// Discovery progress. Moves strictly forward:
/// `Unresolved → Probing → Resolved`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Unresolved,
    /// Walking the candidate list; `pass` counts full passes, starting at 1.
    Probing { pass: u32 },
    Resolved(BaseUrl),
}

impl ConnectionState {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn base_url(&self) -> Option<&BaseUrl> {
        match self {
            Self::Resolved(base) => Some(base),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved => f.write_str("unresolved"),
            Self::Probing { pass } => write!(f, "probing (pass {pass})"),
            Self::Resolved(base) => write!(f, "resolved ({base})"),
        }
    }
}

// ── HostResolver ─────────────────────────────────────────────────────

/// Static discovery settings.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Candidates in priority order.
    pub candidates: Vec<HostCandidate>,
    /// What [`HostCandidate::SameOrigin`] stands for. `None` skips it.
    pub origin: Option<BaseUrl>,
    /// Per-probe request timeout.
    pub probe_timeout: Duration,
    /// Pause between two full passes over the candidate list.
    pub retry_delay: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            candidates: Vec::new(),
            origin: None,
            probe_timeout: Duration::from_secs(2),
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Determines which candidate host to address and publishes the outcome.
///
/// The state lives on a `watch` channel: [`resolved()`](Self::resolved)
/// is a one-shot wait on the `Resolved` transition, and
/// [`current()`](Self::current) is the non-blocking read used on every
/// API call. Probing runs in a task owned by the resolver, so a caller
/// that stops waiting never strands discovery; the task is aborted when
/// the resolver is dropped.
pub struct HostResolver {
    shared: Arc<Shared>,
    discovery: Mutex<Option<JoinHandle<()>>>,
}

struct Shared {
    http: reqwest::Client,
    config: ResolverConfig,
    state: watch::Sender<ConnectionState>,
}

impl HostResolver {
    pub fn new(http: reqwest::Client, config: ResolverConfig) -> Self {
        let (state, _) = watch::channel(ConnectionState::Unresolved);
        Self {
            shared: Arc::new(Shared {
                http,
                config,
                state,
            }),
            discovery: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.shared.config
    }

    /// Snapshot of the discovery state.
    pub fn state(&self) -> ConnectionState {
        self.shared.state.borrow().clone()
    }

    /// The resolved base URL, or `None` while discovery is still running.
    pub fn current(&self) -> Option<BaseUrl> {
        self.shared.state.borrow().base_url().cloned()
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    /// Wait until discovery has settled.
    pub async fn resolved(&self) -> Result<BaseUrl, Error> {
        let mut rx = self.shared.state.subscribe();
        let state = rx
            .wait_for(ConnectionState::is_resolved)
            .await
            .map_err(|_| Error::DiscoveryAbandoned)?;
        state.base_url().cloned().ok_or(Error::DiscoveryAbandoned)
    }

    /// Start discovery if nobody has yet, then wait for its outcome.
    ///
    /// Only the first caller spawns the probing task; every caller (and
    /// every caller arriving after resolution) waits on the shared
    /// outcome. Never returns while no candidate answers.
    pub async fn resolve(&self) -> Result<BaseUrl, Error> {
        let claimed = self.shared.state.send_if_modified(|state| {
            if *state == ConnectionState::Unresolved {
                *state = ConnectionState::Probing { pass: 1 };
                true
            } else {
                false
            }
        });
        if claimed {
            let shared = Arc::clone(&self.shared);
            let handle = tokio::spawn(async move { shared.discover().await });
            *self.discovery.lock().await = Some(handle);
        }
        self.resolved().await
    }

    /// Check a single base URL. Any failure counts as "unavailable".
    pub async fn probe(&self, base: &BaseUrl) -> bool {
        self.shared.probe(base).await
    }
}

impl Drop for HostResolver {
    fn drop(&mut self) {
        if let Some(handle) = self.discovery.get_mut().take() {
            handle.abort();
        }
    }
}

impl Shared {
    async fn discover(&self) {
        if self.config.candidates.is_empty() {
            warn!("no host candidates configured, discovery will never settle");
        }

        let mut pass: u32 = 1;
        loop {
            for candidate in &self.config.candidates {
                let Some(base) = self.base_for(candidate) else {
                    continue;
                };
                if self.probe(&base).await {
                    info!(host = %base, pass, "connected to host");
                    self.state.send_replace(ConnectionState::Resolved(base));
                    return;
                }
            }

            debug!(
                pass,
                delay_ms = u64::try_from(self.config.retry_delay.as_millis()).unwrap_or(u64::MAX),
                "no host answered, retrying"
            );
            tokio::time::sleep(self.config.retry_delay).await;
            pass = pass.saturating_add(1);
            self.state.send_replace(ConnectionState::Probing { pass });
        }
    }

    async fn probe(&self, base: &BaseUrl) -> bool {
        let url = base.api_url("ping");
        debug!(%url, "trying API host");

        let resp = match self
            .http
            .get(url)
            .timeout(self.config.probe_timeout)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                debug!(host = %base, error = %e, "probe failed");
                return false;
            }
        };

        if !resp.status().is_success() {
            debug!(host = %base, status = %resp.status(), "probe rejected");
            return false;
        }

        match resp.json::<serde_json::Value>().await {
            Ok(serde_json::Value::String(reply)) if reply == PONG => true,
            Ok(other) => {
                debug!(host = %base, reply = %other, "unexpected probe reply");
                false
            }
            Err(e) => {
                debug!(host = %base, error = %e, "unreadable probe reply");
                false
            }
        }
    }

    fn base_for(&self, candidate: &HostCandidate) -> Option<BaseUrl> {
        match candidate {
            HostCandidate::Url(base) => Some(base.clone()),
            HostCandidate::SameOrigin => {
                if self.config.origin.is_none() {
                    debug!("no origin configured, skipping same-origin candidate");
                }
                self.config.origin.clone()
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
