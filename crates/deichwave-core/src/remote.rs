// ── Remote session ──
//
// Root context of one client session. Owns the resolver, API client,
// store registry and battery poller, and runs discovery, store init,
// polling and event routing for as long as the session lives. A reload
// discards the whole `Remote` and starts over with a fresh one.

use std::sync::Arc;
use std::time::Duration;

use deichwave_api::{ApiClient, BaseUrl, ConnectionState, HostResolver};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::RemoteConfig;
use crate::error::CoreError;
use crate::poll::{BatteryPoller, PollState};
use crate::router::{EventRouter, RouterExit};
use crate::store::{RegistrySnapshot, StoreRegistry, StoreResults};

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The push channel failed; a fresh session should take over.
    ReloadRequested { reason: String },
    /// The session's cancellation token fired.
    Cancelled,
}

/// One client session.
///
/// Cheaply cloneable via `Arc<RemoteInner>`. Nothing happens until
/// [`run()`](Self::run) or [`discover()`](Self::discover) is called.
#[derive(Clone)]
pub struct Remote {
    inner: Arc<RemoteInner>,
}

struct RemoteInner {
    config: RemoteConfig,
    resolver: Arc<HostResolver>,
    api: Arc<ApiClient>,
    stores: Arc<StoreRegistry>,
    battery: Arc<BatteryPoller>,
    cancel: CancellationToken,
}

impl Remote {
    pub fn new(config: RemoteConfig) -> Result<Self, CoreError> {
        Self::with_cancel(config, CancellationToken::new())
    }

    /// Create a session whose lifetime is bound to `cancel`.
    pub fn with_cancel(config: RemoteConfig, cancel: CancellationToken) -> Result<Self, CoreError> {
        let http = config.transport().build_client()?;
        let resolver = Arc::new(HostResolver::new(http.clone(), config.resolver_config()));
        let api = Arc::new(ApiClient::new(
            http,
            Arc::clone(&resolver),
            config.request_timeout,
        ));
        let stores = Arc::new(StoreRegistry::new(&api));
        let battery = Arc::new(BatteryPoller::new(Arc::clone(&api), config.battery.clone()));

        Ok(Self {
            inner: Arc::new(RemoteInner {
                config,
                resolver,
                api,
                stores,
                battery,
                cancel,
            }),
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &RemoteConfig {
        &self.inner.config
    }

    pub fn resolver(&self) -> &Arc<HostResolver> {
        &self.inner.resolver
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.inner.api
    }

    pub fn stores(&self) -> &Arc<StoreRegistry> {
        &self.inner.stores
    }

    pub fn battery(&self) -> &Arc<BatteryPoller> {
        &self.inner.battery
    }

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.resolver.subscribe()
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.inner.cancel
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Run host discovery (or join one in progress) and return the host.
    pub async fn discover(&self) -> Result<BaseUrl, CoreError> {
        Ok(self.inner.resolver.resolve().await?)
    }

    /// Initialize every store concurrently.
    pub async fn init_stores(&self) -> StoreResults {
        self.inner.stores.init_all().await
    }

    /// Drive the session until it is cancelled or needs a reload.
    ///
    /// Battery polling starts right away; its calls wait for discovery
    /// like every other call. Store init and event routing start once a
    /// host answered. Background tasks are stopped before returning.
    pub async fn run(&self) -> SessionEnd {
        let cancel = self.inner.cancel.clone();
        let mut tasks = JoinSet::new();

        let poller = Arc::clone(&self.inner.battery);
        let token = cancel.child_token();
        tasks.spawn(async move { poller.run(token).await });

        let end = tokio::select! {
            biased;
            () = cancel.cancelled() => SessionEnd::Cancelled,
            end = self.session(&mut tasks) => end,
        };

        tasks.shutdown().await;
        debug!(?end, "session ended");
        end
    }

    /// Cancel the session and everything it spawned.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    /// Serializable view of the whole session.
    pub fn snapshot(&self) -> RemoteSnapshot {
        let connection = self.inner.resolver.state();
        RemoteSnapshot {
            host: connection.base_url().map(ToString::to_string),
            connection: connection.to_string(),
            stores: self.inner.stores.snapshot(),
            battery: self.inner.battery.state(),
        }
    }

    async fn session(&self, tasks: &mut JoinSet<()>) -> SessionEnd {
        if let Err(e) = self.discover().await {
            return SessionEnd::ReloadRequested {
                reason: e.to_string(),
            };
        }

        let remote = self.clone();
        tasks.spawn(async move {
            remote.init_stores().await;
        });

        if !self.inner.config.events_enabled {
            debug!("push events disabled, idling until cancelled");
            self.inner.cancel.cancelled().await;
            return SessionEnd::Cancelled;
        }

        let events = match self.inner.api.events().await {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "cannot open event stream, reload required");
                return SessionEnd::ReloadRequested {
                    reason: e.to_string(),
                };
            }
        };

        let router = EventRouter::new(Arc::clone(&self.inner.stores));
        match router.run(events, self.inner.cancel.child_token()).await {
            RouterExit::Cancelled => SessionEnd::Cancelled,
            RouterExit::StreamFailed(e) => {
                warn!(error = %e, "event stream failed, reload required");
                SessionEnd::ReloadRequested {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Point-in-time copy of a session's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteSnapshot {
    pub host: Option<String>,
    pub connection: String,
    pub stores: RegistrySnapshot,
    pub battery: PollState,
}

// ── Supervision ──────────────────────────────────────────────────────

/// Run sessions back to back until `cancel` fires.
///
/// Each session gets a fresh `Remote` (and so a fresh discovery).
/// `on_session` sees every new session before it starts, e.g. to
/// subscribe to its stores.
pub async fn run_supervised<F>(
    config: RemoteConfig,
    cancel: CancellationToken,
    mut on_session: F,
) -> Result<(), CoreError>
where
    F: FnMut(&Remote),
{
    let mut generation: u64 = 0;
    loop {
        generation += 1;
        let remote = Remote::with_cancel(config.clone(), cancel.child_token())?;
        on_session(&remote);
        info!(generation, "session started");

        match remote.run().await {
            SessionEnd::Cancelled => return Ok(()),
            SessionEnd::ReloadRequested { reason } => {
                info!(
                    generation,
                    %reason,
                    delay_ms = duration_ms(config.reload_delay),
                    "reloading session"
                );
            }
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            () = tokio::time::sleep(config.reload_delay) => {}
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
