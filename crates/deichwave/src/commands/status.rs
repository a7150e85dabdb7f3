//! `status` and `ping` handlers.

use std::fmt::Write as _;
use std::time::Instant;

use serde::Serialize;

use deichwave_core::{PollState, RemoteSnapshot};

use super::{Context, util};
use crate::error::CliError;
use crate::output;

pub async fn status(ctx: &Context) -> Result<(), CliError> {
    util::connect(ctx).await?;

    let (results, battery) = tokio::join!(
        ctx.remote.init_stores(),
        ctx.remote.battery().poll_once()
    );
    for (kind, result) in &results {
        if let Err(e) = result {
            tracing::warn!(store = %kind, error = %e, "store could not be loaded");
        }
    }
    if let Err(e) = battery {
        tracing::warn!(error = %e, "battery could not be read");
    }

    let snapshot = ctx.remote.snapshot();
    let out = output::render_single(
        ctx.output,
        &snapshot,
        status_detail,
        |s| s.host.clone().unwrap_or_default(),
    );
    output::print_output(&out, ctx.quiet);
    Ok(())
}

fn status_detail(s: &RemoteSnapshot) -> String {
    let stores = &s.stores;
    let mut out = String::new();
    let _ = writeln!(out, "Host:       {}", s.host.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "Volume:     {}", stores.volume);
    let _ = writeln!(out, "Intensity:  {}", stores.intensity);

    let playing = &stores.playing;
    if playing.title.is_empty() {
        let _ = writeln!(out, "Playing:    -");
    } else {
        let _ = writeln!(
            out,
            "Playing:    {} - {} ({})",
            playing.artist, playing.title, playing.playlist
        );
    }

    let playlists: Vec<&str> = stores.playlists.iter().map(|p| p.name.as_str()).collect();
    let _ = writeln!(out, "Playlists:  {}", names_or_dash(&playlists));
    let _ = writeln!(out, "Lights:     {}", names_or_dash(&stores.lights));
    let _ = writeln!(out, "Sounds:     {}", names_or_dash(&stores.sounds));
    let _ = writeln!(out, "Profiles:   {}", names_or_dash(&stores.profiles));
    let _ = write!(out, "Battery:    {}", battery_text(&s.battery));
    out
}

fn names_or_dash<S: AsRef<str>>(names: &[S]) -> String {
    if names.is_empty() {
        return "-".into();
    }
    names.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ")
}

pub(super) fn battery_text(state: &PollState) -> String {
    if !state.enabled {
        return "not fitted".into();
    }
    match &state.last_result {
        Some(reading) => match reading.percent {
            Some(p) => format!("{p:.0}%"),
            None => reading.raw.trim().to_owned(),
        },
        None => "-".into(),
    }
}

// ── Ping ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct PingResult {
    host: String,
    reply: String,
    latency_ms: u64,
}

pub async fn ping(ctx: &Context) -> Result<(), CliError> {
    let host = util::connect(ctx).await?;

    let started = Instant::now();
    let reply = ctx.remote.api().ping().await?;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let result = PingResult {
        host: host.to_string(),
        reply,
        latency_ms,
    };
    let out = output::render_single(
        ctx.output,
        &result,
        |r| format!("{}: {} in {} ms", r.host, r.reply, r.latency_ms),
        |r| r.host.clone(),
    );
    output::print_output(&out, ctx.quiet);
    Ok(())
}
