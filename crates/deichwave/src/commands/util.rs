//! Shared helpers for command handlers.

use deichwave_core::{BaseUrl, CoreError, HostCandidate, NameListStore};

use super::Context;
use crate::error::CliError;

/// Find the box, giving up after `ctx.wait`.
///
/// Discovery itself never gives up; the CLI puts the bound on it.
pub async fn connect(ctx: &Context) -> Result<BaseUrl, CliError> {
    match tokio::time::timeout(ctx.wait, ctx.remote.discover()).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(CliError::NoHost {
            hosts: ctx.hosts.clone(),
            seconds: ctx.wait.as_secs(),
        }),
    }
}

/// Comma-separated candidate list, same-origin spelled out.
pub fn describe_hosts(hosts: &[HostCandidate]) -> String {
    hosts
        .iter()
        .map(|h| match h {
            HostCandidate::SameOrigin => "(same origin)".to_owned(),
            HostCandidate::Url(base) => base.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Refresh a name store and make sure `name` is in it.
pub async fn require_name(
    store: &NameListStore,
    name: &str,
    resource_type: &str,
    list_command: &str,
) -> Result<(), CliError> {
    store.update().await?;
    if store.contains(name) {
        Ok(())
    } else {
        Err(CliError::NotFound {
            resource_type: resource_type.into(),
            identifier: name.into(),
            list_command: list_command.into(),
        })
    }
}

/// Turn a core 404 into a `NotFound` pointing at the right list command.
pub fn not_found_as(
    err: impl Into<CoreError>,
    resource_type: &str,
    identifier: &str,
    list_command: &str,
) -> CliError {
    match err.into() {
        CoreError::NotFound { .. } => CliError::NotFound {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
            list_command: list_command.into(),
        },
        other => other.into(),
    }
}

/// Print a confirmation to stderr unless `--quiet`.
pub fn done(ctx: &Context, message: &str) {
    if !ctx.quiet {
        eprintln!("{message}");
    }
}
