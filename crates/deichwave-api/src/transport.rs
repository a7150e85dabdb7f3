// Shared transport configuration for building reqwest::Client instances.
//
// The resolver's probes and the API client share one connection pool per
// session; probes narrow the timeout per request instead of using a
// second client.

use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("deichwave/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Upper bound for a regular API request.
    pub timeout: Duration,
    /// Upper bound for establishing a TCP connection.
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// No overall timeout is set on the client itself: the event stream is
    /// a long-lived response and must not be cut off. Regular calls apply
    /// [`timeout`](Self::timeout) per request instead.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }
}
