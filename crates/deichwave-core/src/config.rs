// ── Runtime session configuration ──
//
// These types describe *where* to look for the box and how patient to be.
// They never touch disk: the CLI (or any other embedder) builds a
// `RemoteConfig` and hands it to `Remote`.

use std::time::Duration;

use deichwave_api::{BaseUrl, HostCandidate, ResolverConfig, TransportConfig};

/// Candidate hosts probed when nothing else is configured, in priority order.
/// The empty entry stands for the origin the client was served from.
pub const DEFAULT_HOSTS: &[&str] = &[
    "",
    "http://localhost:3000/",
    "http://192.168.188.10:3000/",
    "http://192.168.188.20:3000/",
    "http://192.168.42.1:3000/",
];

/// Configuration of one client session.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Ordered host candidates.
    pub hosts: Vec<HostCandidate>,
    /// What the same-origin candidate resolves to, if anything.
    pub origin: Option<BaseUrl>,
    /// Timeout of a single liveness probe.
    pub probe_timeout: Duration,
    /// Pause between two passes over the candidate list.
    pub retry_delay: Duration,
    /// Timeout of a regular API request.
    pub request_timeout: Duration,
    /// Pause before a reloaded session starts discovery again.
    pub reload_delay: Duration,
    /// Subscribe to the push channel. Without it stores are only
    /// refreshed on demand.
    pub events_enabled: bool,
    pub battery: BatteryPollConfig,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            hosts: default_hosts(),
            origin: None,
            probe_timeout: Duration::from_secs(2),
            retry_delay: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
            reload_delay: Duration::from_secs(2),
            events_enabled: true,
            battery: BatteryPollConfig::default(),
        }
    }
}

impl RemoteConfig {
    /// Settings for the session's `HostResolver`.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            candidates: self.hosts.clone(),
            origin: self.origin.clone(),
            probe_timeout: self.probe_timeout,
            retry_delay: self.retry_delay,
        }
    }

    /// Settings for the session's HTTP client.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.request_timeout,
            connect_timeout: self.probe_timeout,
        }
    }
}

/// Parse [`DEFAULT_HOSTS`].
pub fn default_hosts() -> Vec<HostCandidate> {
    DEFAULT_HOSTS
        .iter()
        .filter_map(|host| host.parse().ok())
        .collect()
}

/// Battery telemetry polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatteryPollConfig {
    pub enabled: bool,
    /// Pause between the end of one read and the start of the next.
    pub interval: Duration,
    /// `GET` endpoint answering `"none"` when the box has no battery.
    pub probe_endpoint: String,
    /// `POST` endpoint whose string output carries the charge level.
    pub read_endpoint: String,
}

impl Default for BatteryPollConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(60),
            probe_endpoint: "info/hardware.battery".into(),
            read_endpoint: "shell/battery".into(),
        }
    }
}
