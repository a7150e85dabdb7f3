//! Configuration for Deichwave clients.
//!
//! A TOML file in the platform config directory, overridable through
//! `DEICHWAVE_` environment variables, translated into a
//! `deichwave_core::RemoteConfig`. The core never reads files itself.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use deichwave_core::{BaseUrl, BatteryPollConfig, DEFAULT_HOSTS, HostCandidate, RemoteConfig};

/// Prefix of environment overrides. Nested keys use `__`, e.g.
/// `DEICHWAVE_BATTERY__ENABLED=false`.
pub const ENV_PREFIX: &str = "DEICHWAVE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Host candidates in priority order; `""` is the same-origin host.
    #[serde(default = "default_hosts")]
    pub hosts: Vec<String>,

    /// URL the same-origin candidate stands for. Unset skips it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_reload_delay_ms")]
    pub reload_delay_ms: u64,

    /// Subscribe to server push events.
    #[serde(default = "default_true")]
    pub events: bool,

    #[serde(default)]
    pub battery: BatteryConfig,

    /// CLI presentation defaults.
    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hosts: default_hosts(),
            origin: None,
            probe_timeout_ms: default_probe_timeout_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            reload_delay_ms: default_reload_delay_ms(),
            events: true,
            battery: BatteryConfig::default(),
            defaults: Defaults::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BatteryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_battery_interval_secs")]
    pub interval_secs: u64,

    #[serde(default = "default_probe_endpoint")]
    pub probe_endpoint: String,

    #[serde(default = "default_read_endpoint")]
    pub read_endpoint: String,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_battery_interval_secs(),
            probe_endpoint: default_probe_endpoint(),
            read_endpoint: default_read_endpoint(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Seconds the CLI waits for a host to answer.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
        }
    }
}

fn default_hosts() -> Vec<String> {
    DEFAULT_HOSTS.iter().map(|h| (*h).to_owned()).collect()
}
fn default_probe_timeout_ms() -> u64 {
    2000
}
fn default_retry_delay_ms() -> u64 {
    1000
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_reload_delay_ms() -> u64 {
    2000
}
fn default_true() -> bool {
    true
}
fn default_battery_interval_secs() -> u64 {
    60
}
fn default_probe_endpoint() -> String {
    "info/hardware.battery".into()
}
fn default_read_endpoint() -> String {
    "shell/battery".into()
}
fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    10
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "deichwave", "deichwave").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("deichwave");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` + environment. A missing file is not an
/// error; defaults apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parent
/// directories as needed.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Build the runtime session configuration.
    pub fn to_remote_config(&self) -> Result<RemoteConfig, ConfigError> {
        let hosts = parse_hosts(&self.hosts)?;

        let origin = self
            .origin
            .as_deref()
            .map(|o| {
                BaseUrl::parse(o).map_err(|e| ConfigError::Validation {
                    field: "origin".into(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        if self.battery.interval_secs == 0 {
            return Err(ConfigError::Validation {
                field: "battery.interval_secs".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(RemoteConfig {
            hosts,
            origin,
            probe_timeout: Duration::from_millis(self.probe_timeout_ms),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            reload_delay: Duration::from_millis(self.reload_delay_ms),
            events_enabled: self.events,
            battery: BatteryPollConfig {
                enabled: self.battery.enabled,
                interval: Duration::from_secs(self.battery.interval_secs),
                probe_endpoint: self.battery.probe_endpoint.clone(),
                read_endpoint: self.battery.read_endpoint.clone(),
            },
        })
    }
}

/// Parse host candidate strings, keeping their order.
pub fn parse_hosts(hosts: &[String]) -> Result<Vec<HostCandidate>, ConfigError> {
    if hosts.is_empty() {
        return Err(ConfigError::Validation {
            field: "hosts".into(),
            reason: "at least one host candidate is required".into(),
        });
    }
    hosts
        .iter()
        .map(|h| {
            h.parse::<HostCandidate>()
                .map_err(|e| ConfigError::Validation {
                    field: "hosts".into(),
                    reason: e.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.hosts, default_hosts());
        assert_eq!(config.defaults.output, "table");
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
hosts = ["http://10.0.0.5:3000/", ""]
origin = "http://box.local:3000"
retry_delay_ms = 250

[battery]
enabled = false
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.hosts, vec!["http://10.0.0.5:3000/", ""]);
        assert_eq!(config.retry_delay_ms, 250);
        assert!(!config.battery.enabled);
        assert_eq!(config.battery.interval_secs, 60);

        let remote = config.to_remote_config().unwrap();
        assert_eq!(remote.hosts[1], HostCandidate::SameOrigin);
        assert_eq!(
            remote.origin.unwrap().as_str(),
            "http://box.local:3000/"
        );
        assert_eq!(remote.retry_delay, Duration::from_millis(250));
        assert!(!remote.battery.enabled);
    }

    #[test]
    fn invalid_host_is_rejected() {
        let config = Config {
            hosts: vec!["ftp://nope".into()],
            ..Config::default()
        };
        let err = config.to_remote_config().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "hosts"));
    }

    #[test]
    fn empty_host_list_is_rejected() {
        assert!(parse_hosts(&[]).is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            events: false,
            ..Config::default()
        };
        save_config_to(&config, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), config);
    }
}
