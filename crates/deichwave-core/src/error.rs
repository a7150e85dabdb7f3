// ── Core error types ──
//
// Errors surfaced by the synchronization core. Consumers see refresh,
// discovery and stream failures in domain terms; raw transport details
// are folded into the message. The `From<deichwave_api::Error>` impl does
// the translation.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach Deichwave host {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Host discovery was abandoned before a host answered")]
    DiscoveryAbandoned,

    #[error("Event stream failed: {reason}")]
    EventStream { reason: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Unexpected response: {message}")]
    InvalidResponse { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` if retrying later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout | Self::EventStream { .. } => true,
            Self::Api { status, .. } => status.is_some_and(|s| s >= 500),
            _ => false,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<deichwave_api::Error> for CoreError {
    fn from(err: deichwave_api::Error) -> Self {
        use deichwave_api::Error as Api;

        match err {
            Api::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::InvalidHost { candidate, reason } => CoreError::Config {
                message: format!("Invalid host '{candidate}': {reason}"),
            },
            Api::ClientBuild(message) => CoreError::Config { message },
            Api::Status {
                endpoint,
                status: 404,
                ..
            } => CoreError::NotFound { resource: endpoint },
            Api::Status {
                endpoint,
                status,
                body,
            } => CoreError::Api {
                message: format!("{endpoint}: {body}"),
                status: Some(status),
            },
            Api::Deserialization { message, .. } => CoreError::InvalidResponse { message },
            Api::DiscoveryAbandoned => CoreError::DiscoveryAbandoned,
            Api::StreamConnect(reason) | Api::StreamClosed { reason } => {
                CoreError::EventStream { reason }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_status_maps_to_not_found() {
        let err: CoreError = deichwave_api::Error::Status {
            endpoint: "sounds/horn".into(),
            status: 404,
            body: String::new(),
        }
        .into();
        assert!(matches!(err, CoreError::NotFound { ref resource } if resource == "sounds/horn"));
        assert!(!err.is_transient());
    }

    #[test]
    fn server_errors_are_transient() {
        let err: CoreError = deichwave_api::Error::Status {
            endpoint: "music".into(),
            status: 502,
            body: "bad gateway".into(),
        }
        .into();
        assert!(err.is_transient());
    }

    #[test]
    fn stream_errors_map_to_event_stream() {
        let err: CoreError = deichwave_api::Error::StreamClosed {
            reason: "eof".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Event stream failed: eof");
    }
}
