use thiserror::Error;

/// Top-level error type for the `deichwave-api` crate.
///
/// Every failure an individual call can produce is represented here and
/// returned as a value. `deichwave-core` maps these into its own
/// `CoreError` and decides which of them are worth surfacing.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A host candidate that cannot act as a base for API paths.
    #[error("Invalid host candidate '{candidate}': {reason}")]
    InvalidHost { candidate: String, reason: String },

    /// Building the underlying HTTP client failed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Responses ───────────────────────────────────────────────────
    /// The server answered with a non-success status code.
    #[error("HTTP {status} from {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Discovery ───────────────────────────────────────────────────
    /// The resolver went away before any candidate answered.
    #[error("Host discovery was abandoned before a host answered")]
    DiscoveryAbandoned,

    // ── Event stream ────────────────────────────────────────────────
    /// The event stream could not be opened.
    #[error("Event stream connection failed: {0}")]
    StreamConnect(String),

    /// The event stream broke or ended.
    #[error("Event stream closed: {reason}")]
    StreamClosed { reason: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status >= 500,
            Self::StreamConnect(_) | Self::StreamClosed { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the server reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Status { status: 404, .. } => true,
            _ => false,
        }
    }
}
