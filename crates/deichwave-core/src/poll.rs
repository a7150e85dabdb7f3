// ── Battery telemetry polling ──
//
// Independent of push events: probe once whether the box has a battery,
// then read the charge level forever, sleeping a fixed interval after
// each read settles. A box without a battery disables the poller for the
// rest of the session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use deichwave_api::{ApiClient, Method};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::BatteryPollConfig;
use crate::error::CoreError;

/// Probe reply meaning "no battery fitted".
const ABSENT: &str = "none";

/// One charge reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryReading {
    /// Charge in percent, if the output contained a number.
    pub percent: Option<f64>,
    /// The command output as received.
    pub raw: String,
    pub read_at: DateTime<Utc>,
}

/// Published poller state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollState {
    /// Cleared for good once the probe finds no battery.
    pub enabled: bool,
    pub last_result: Option<BatteryReading>,
}

pub struct BatteryPoller {
    api: Arc<ApiClient>,
    config: BatteryPollConfig,
    state: watch::Sender<PollState>,
}

impl BatteryPoller {
    pub fn new(api: Arc<ApiClient>, config: BatteryPollConfig) -> Self {
        let (state, _) = watch::channel(PollState {
            enabled: config.enabled,
            last_result: None,
        });
        Self { api, config, state }
    }

    pub fn state(&self) -> PollState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.subscribe()
    }

    /// Probe, then poll until cancelled. Returns early if polling is
    /// disabled or the probe finds no battery.
    pub async fn run(&self, cancel: CancellationToken) {
        tokio::select! {
            biased;
            () = cancel.cancelled() => debug!("battery poller cancelled"),
            () = self.poll_loop() => {}
        }
    }

    /// Ask the box whether it has a battery. Any failure counts as "no".
    pub async fn probe(&self) -> bool {
        match self
            .api
            .call(&self.config.probe_endpoint, Method::GET, None)
            .await
        {
            Ok(reply) => capability_present(&reply),
            Err(e) => {
                debug!(error = %e, "battery probe failed");
                false
            }
        }
    }

    /// Take one reading. Does not touch the published state.
    pub async fn read(&self) -> Result<BatteryReading, CoreError> {
        let reply = self
            .api
            .call(&self.config.read_endpoint, Method::POST, None)
            .await?;
        let raw = match reply {
            Value::String(s) => s,
            other => other.to_string(),
        };
        Ok(BatteryReading {
            percent: parse_percent(&raw),
            raw,
            read_at: Utc::now(),
        })
    }

    /// Probe and take a single reading, publishing the outcome.
    ///
    /// Used by one-shot consumers that do not keep a poller running.
    pub async fn poll_once(&self) -> Result<PollState, CoreError> {
        if self.check_capability().await {
            self.read_and_publish().await?;
        }
        Ok(self.state())
    }

    async fn poll_loop(&self) {
        if !self.check_capability().await {
            return;
        }
        loop {
            if let Err(e) = self.read_and_publish().await {
                warn!(error = %e, "battery read failed");
            }
            tokio::time::sleep(self.config.interval).await;
        }
    }

    /// `false` (and disabled for good) if polling is off or there is no
    /// battery.
    async fn check_capability(&self) -> bool {
        if !self.config.enabled {
            self.disable();
            return false;
        }
        if !self.probe().await {
            info!("no battery reported, polling disabled");
            self.disable();
            return false;
        }
        true
    }

    /// A failed read keeps the previous result.
    async fn read_and_publish(&self) -> Result<(), CoreError> {
        let reading = self.read().await?;
        debug!(percent = ?reading.percent, "battery read");
        self.state.send_modify(|s| s.last_result = Some(reading));
        Ok(())
    }

    fn disable(&self) {
        self.state.send_if_modified(|s| {
            let was = s.enabled;
            s.enabled = false;
            was
        });
    }
}

fn capability_present(reply: &Value) -> bool {
    match reply {
        Value::Null => false,
        Value::String(s) => !s.trim().eq_ignore_ascii_case(ABSENT),
        _ => true,
    }
}

/// Leading number of a command output such as `"87%\n"` or `"42.5"`.
fn parse_percent(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    trimmed[..end]
        .parse::<f64>()
        .ok()
        .map(|p| p.clamp(0.0, 100.0))
}
