// ── Playlists ──
//
// The playlist store holds the list of playlists plus three per-playlist
// sub-resources: song order, playback position and selection chance.
// Each sub-resource refreshes for one named playlist or, given no name,
// for every known playlist.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use deichwave_api::ApiClient;
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use super::cell::StoreCell;
use super::stream::StoreStream;
use crate::error::CoreError;

/// One playlist and its sub-state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Playlist {
    pub name: String,
    /// Upcoming songs in playback order.
    pub songs: Vec<String>,
    pub position: i64,
    /// Selection weight at the current intensity.
    pub chance: i64,
}

impl Playlist {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }
}

pub struct PlaylistStore {
    api: Arc<ApiClient>,
    lists: StoreCell<Vec<Playlist>>,
}

impl PlaylistStore {
    pub(crate) fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            lists: StoreCell::new(Vec::new()),
        }
    }

    pub fn lists(&self) -> Vec<Playlist> {
        self.lists.get()
    }

    pub fn get(&self, name: &str) -> Option<Playlist> {
        self.lists
            .read(|lists| lists.iter().find(|p| p.name == name).cloned())
    }

    pub fn subscribe(&self) -> StoreStream<Vec<Playlist>> {
        self.lists.subscribe()
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.lists.refreshed_at()
    }

    /// Load the playlist names, then songs, positions and chances of
    /// every playlist, in that order.
    ///
    /// A failed name refresh skips the sub-resources: they would be
    /// fetched for a list that is known to be stale.
    pub async fn init(&self) -> Result<(), CoreError> {
        self.update().await?;

        let songs = self.update_songs(None).await;
        let positions = self.update_positions(None).await;
        let chances = self.update_chances(None).await;
        songs.and(positions).and(chances)
    }

    /// Refresh the playlist names.
    ///
    /// Surviving playlists keep their sub-state, new ones start with
    /// defaults, vanished ones are dropped. Order follows the server.
    pub async fn update(&self) -> Result<(), CoreError> {
        let names = self.api.playlists().await?;
        if self.lists.modify(|lists| upsert_and_prune(lists, &names)) {
            debug!(count = names.len(), "playlists updated");
        }
        self.lists.mark_refreshed();
        Ok(())
    }

    pub async fn update_songs(&self, name: Option<&str>) -> Result<(), CoreError> {
        let api = &*self.api;
        self.refresh_items(
            name,
            "songs",
            move |n: String| async move { api.playlist_songs(&n).await },
            |p, songs| assign(&mut p.songs, songs),
        )
        .await
    }

    pub async fn update_positions(&self, name: Option<&str>) -> Result<(), CoreError> {
        let api = &*self.api;
        self.refresh_items(
            name,
            "position",
            move |n: String| async move { api.playlist_position(&n).await },
            |p, position| assign(&mut p.position, position),
        )
        .await
    }

    pub async fn update_chances(&self, name: Option<&str>) -> Result<(), CoreError> {
        let api = &*self.api;
        self.refresh_items(
            name,
            "chance",
            move |n: String| async move { api.playlist_chance(&n).await },
            |p, chance| assign(&mut p.chance, chance),
        )
        .await
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Names a sub-refresh applies to.
    fn targets(&self, name: Option<&str>) -> Vec<String> {
        self.lists.read(|lists| {
            lists
                .iter()
                .filter(|p| name.is_none_or(|n| p.name == n))
                .map(|p| p.name.clone())
                .collect()
        })
    }

    /// Fetch one sub-resource for every target concurrently and apply the
    /// results one by one. Every target is attempted; the first failure
    /// is returned afterwards.
    async fn refresh_items<V, F, Fut>(
        &self,
        name: Option<&str>,
        resource: &'static str,
        fetch: F,
        apply: impl Fn(&mut Playlist, V) -> bool,
    ) -> Result<(), CoreError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<V, deichwave_api::Error>>,
    {
        let targets = self.targets(name);
        if targets.is_empty() {
            debug!(playlist = ?name, resource, "no matching playlist to refresh");
            return Ok(());
        }

        let results = join_all(targets.into_iter().map(|target| {
            let pending = fetch(target.clone());
            async move { (target, pending.await) }
        }))
        .await;

        let mut first_err = None;
        for (target, result) in results {
            match result {
                Ok(value) => {
                    self.lists.modify(|lists| {
                        lists
                            .iter_mut()
                            .find(|p| p.name == target)
                            .is_some_and(|p| apply(p, value))
                    });
                }
                Err(e) => {
                    warn!(playlist = %target, resource, error = %e, "playlist refresh failed");
                    first_err.get_or_insert(CoreError::from(e));
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

fn assign<V: PartialEq>(slot: &mut V, value: V) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// Rebuild `lists` in the order of `names`, keeping the sub-state of
/// playlists that already existed. Returns `true` if anything changed.
fn upsert_and_prune(lists: &mut Vec<Playlist>, names: &[String]) -> bool {
    let next: Vec<Playlist> = names
        .iter()
        .map(|name| {
            lists
                .iter()
                .find(|p| p.name == *name)
                .cloned()
                .unwrap_or_else(|| Playlist::named(name))
        })
        .collect();
    assign(lists, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn upsert_and_prune_keeps_surviving_sub_state() {
        let mut lists = vec![
            Playlist {
                name: "party".into(),
                songs: names(&["a", "b"]),
                position: 4,
                chance: 70,
            },
            Playlist::named("chill"),
        ];

        assert!(upsert_and_prune(&mut lists, &names(&["rock", "party"])));
        assert_eq!(
            lists,
            vec![
                Playlist::named("rock"),
                Playlist {
                    name: "party".into(),
                    songs: names(&["a", "b"]),
                    position: 4,
                    chance: 70,
                },
            ]
        );
    }

    #[test]
    fn upsert_and_prune_is_idempotent() {
        let mut lists = Vec::new();
        assert!(upsert_and_prune(&mut lists, &names(&["party", "chill"])));
        let first = lists.clone();
        assert!(!upsert_and_prune(&mut lists, &names(&["party", "chill"])));
        assert_eq!(lists, first);
    }

    #[test]
    fn assign_reports_change() {
        let mut slot = 3;
        assert!(!assign(&mut slot, 3));
        assert!(assign(&mut slot, 5));
        assert_eq!(slot, 5);
    }
}
