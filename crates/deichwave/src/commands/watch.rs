//! `watch`: follow live store changes across session reloads.

use std::pin::Pin;

use futures_util::stream::{self, Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinSet;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use deichwave_core::{Remote, run_supervised};

use super::Context;
use crate::error::CliError;
use crate::output;

type Changes = Pin<Box<dyn Stream<Item = (&'static str, Value)> + Send>>;

pub async fn handle(ctx: &Context) -> Result<(), CliError> {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let format = ctx.output;
    let quiet = ctx.quiet;
    let mut printers = JoinSet::new();

    let result = run_supervised(ctx.remote.config().clone(), cancel, |remote| {
        let mut changes = session_changes(remote);
        printers.spawn(async move {
            while let Some((label, value)) = changes.next().await {
                output::print_output(&output::render_change(format, label, &value), quiet);
            }
            debug!("session dropped, change printer done");
        });
    })
    .await;

    printers.shutdown().await;
    Ok(result?)
}

/// Every observable of one session merged into a single change feed.
///
/// Each source yields its current value first. The feed ends once the
/// session is dropped.
fn session_changes(remote: &Remote) -> Changes {
    let stores = remote.stores();
    let connection = WatchStream::new(remote.connection_state()).map(|s| s.to_string());

    Box::pin(stream::select_all(vec![
        labelled("connection", connection),
        labelled("volume", stores.volume().subscribe().into_stream()),
        labelled("intensity", stores.intensity().subscribe().into_stream()),
        labelled("lights", stores.lights().subscribe().into_stream()),
        labelled("sounds", stores.sounds().subscribe().into_stream()),
        labelled("profiles", stores.profiles().subscribe().into_stream()),
        labelled("playlists", stores.playlists().subscribe().into_stream()),
        labelled("playing", stores.playing().subscribe().into_stream()),
        labelled("battery", WatchStream::new(remote.battery().subscribe())),
    ]))
}

fn labelled<S, T>(label: &'static str, source: S) -> Changes
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + 'static,
{
    Box::pin(source.map(move |value| {
        (
            label,
            serde_json::to_value(&value).unwrap_or(Value::Null),
        )
    }))
}
