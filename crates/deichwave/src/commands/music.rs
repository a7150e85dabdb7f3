//! Music command handlers.

use serde::Serialize;
use tabled::Tabled;

use deichwave_core::{Playlist, SongInfo};

use super::{Context, util};
use crate::cli::{MusicArgs, MusicCommand};
use crate::error::CliError;
use crate::output;

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PlaylistRow {
    #[tabled(rename = "Playlist")]
    name: String,
    #[tabled(rename = "Songs")]
    songs: usize,
    #[tabled(rename = "Position")]
    position: i64,
    #[tabled(rename = "Chance")]
    chance: i64,
}

fn playlist_row(p: &Playlist) -> PlaylistRow {
    PlaylistRow {
        name: p.name.clone(),
        songs: p.songs.len(),
        position: p.position,
        chance: p.chance,
    }
}

#[derive(Serialize)]
struct SongEntry {
    index: usize,
    title: String,
}

#[derive(Tabled)]
struct SongRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Song")]
    title: String,
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: MusicArgs) -> Result<(), CliError> {
    util::connect(ctx).await?;
    let api = ctx.remote.api();

    match args.command {
        MusicCommand::Play => {
            api.play().await?;
            util::done(ctx, "Playback started");
        }
        MusicCommand::Pause => {
            api.pause().await?;
            util::done(ctx, "Playback paused");
        }
        MusicCommand::Stop => {
            api.stop().await?;
            util::done(ctx, "Playback stopped");
        }
        MusicCommand::Next => {
            api.next_song().await?;
            util::done(ctx, "Skipped to the next song");
        }
        MusicCommand::Skip { playlist } => {
            api.skip(&playlist)
                .await
                .map_err(|e| util::not_found_as(e, "playlist", &playlist, "music list"))?;
            util::done(ctx, &format!("Dropped the upcoming song of '{playlist}'"));
        }
        MusicCommand::List => {
            let store = ctx.remote.stores().playlists();
            store.init().await?;
            let lists = store.lists();
            let out = output::render_list(ctx.output, &lists, playlist_row, |p| {
                p.name.clone()
            });
            output::print_output(&out, ctx.quiet);
        }
        MusicCommand::Songs { playlist } => songs(ctx, &playlist).await?,
        MusicCommand::Playing => {
            let store = ctx.remote.stores().playing();
            store.update().await?;
            let info = store.info();
            let out = output::render_single(ctx.output, &info, playing_detail, |i| {
                i.title.clone()
            });
            output::print_output(&out, ctx.quiet);
        }
    }
    Ok(())
}

/// Upcoming songs of one playlist, loaded through the playlist store.
async fn songs(ctx: &Context, playlist: &str) -> Result<(), CliError> {
    let store = ctx.remote.stores().playlists();
    store.update().await?;
    if store.get(playlist).is_none() {
        return Err(CliError::NotFound {
            resource_type: "playlist".into(),
            identifier: playlist.into(),
            list_command: "music list".into(),
        });
    }
    store.update_songs(Some(playlist)).await?;

    let entries: Vec<SongEntry> = store
        .get(playlist)
        .map(|p| p.songs)
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, title)| SongEntry {
            index: i + 1,
            title,
        })
        .collect();

    let out = output::render_list(
        ctx.output,
        &entries,
        |e| SongRow {
            index: e.index,
            title: e.title.clone(),
        },
        |e| e.title.clone(),
    );
    output::print_output(&out, ctx.quiet);
    Ok(())
}

fn playing_detail(info: &SongInfo) -> String {
    if info.title.is_empty() {
        return "Nothing playing".into();
    }
    let mut lines = vec![
        format!("Title:     {}", info.title),
        format!("Artist:    {}", info.artist),
        format!("Playlist:  {}", info.playlist),
    ];
    if !info.image.is_empty() {
        lines.push(format!("Image:     {}", info.image));
    }
    lines.join("\n")
}
