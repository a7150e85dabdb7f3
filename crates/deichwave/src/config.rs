//! CLI configuration: a thin wrapper around `deichwave_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (`--config`, `--host`, `--output`, `--timeout`).

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use deichwave_core::RemoteConfig;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use deichwave_config::{Config, config_path, load_config_from, save_config_to};

/// Config file in effect: `--config` if given, else the platform path.
pub fn effective_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load the config file (defaults if missing) plus environment overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(load_config_from(&effective_path(global))?)
}

/// Apply `--host` on top of the file and translate.
///
/// Hosts given on the command line replace the configured list.
pub fn remote_config(global: &GlobalOpts, cfg: &Config) -> Result<RemoteConfig, CliError> {
    let mut cfg = cfg.clone();
    if !global.host.is_empty() {
        cfg.hosts.clone_from(&global.host);
    }
    Ok(cfg.to_remote_config()?)
}

/// Output format: flag > config default > table.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> Result<OutputFormat, CliError> {
    if let Some(format) = global.output {
        return Ok(format);
    }
    <OutputFormat as ValueEnum>::from_str(&cfg.defaults.output, true).map_err(|_| CliError::Validation {
        field: "defaults.output".into(),
        reason: format!("unknown output format '{}'", cfg.defaults.output),
    })
}

/// How long to wait for discovery: flag > config default.
pub fn discovery_wait(global: &GlobalOpts, cfg: &Config) -> Duration {
    Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout))
}
