// ── Store registry ──
//
// Every piece of synchronized state the client keeps, one store per
// server resource. Stores are independent: each owns its own cell and
// only its own operations mutate it, so a slow or failing store never
// holds up another.

mod cell;
mod level;
mod names;
mod playing;
mod playlists;
mod stream;

use std::sync::Arc;

use deichwave_api::{ApiClient, SongInfo};
use futures_util::future::join_all;
use serde::Serialize;
use strum::IntoEnumIterator;
use tracing::{debug, warn};

use crate::error::CoreError;

pub use level::{LevelKind, LevelStore};
pub use names::{NameListKind, NameListStore};
pub use playing::PlayingStore;
pub use playlists::{Playlist, PlaylistStore};
pub use stream::{StoreStream, StoreWatchStream};

/// Names of the registered stores.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Volume,
    Intensity,
    Lights,
    Sounds,
    Profiles,
    Playlists,
    Playing,
}

/// Outcome of initializing or refreshing a set of stores.
pub type StoreResults = Vec<(StoreKind, Result<(), CoreError>)>;

/// The named collection of stores of one session.
pub struct StoreRegistry {
    volume: LevelStore,
    intensity: LevelStore,
    lights: NameListStore,
    sounds: NameListStore,
    profiles: NameListStore,
    playlists: PlaylistStore,
    playing: PlayingStore,
}

impl StoreRegistry {
    pub fn new(api: &Arc<ApiClient>) -> Self {
        Self {
            volume: LevelStore::new(LevelKind::Volume, Arc::clone(api)),
            intensity: LevelStore::new(LevelKind::Intensity, Arc::clone(api)),
            lights: NameListStore::new(NameListKind::Lights, Arc::clone(api)),
            sounds: NameListStore::new(NameListKind::Sounds, Arc::clone(api)),
            profiles: NameListStore::new(NameListKind::Profiles, Arc::clone(api)),
            playlists: PlaylistStore::new(Arc::clone(api)),
            playing: PlayingStore::new(Arc::clone(api)),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn volume(&self) -> &LevelStore {
        &self.volume
    }

    pub fn intensity(&self) -> &LevelStore {
        &self.intensity
    }

    pub fn lights(&self) -> &NameListStore {
        &self.lights
    }

    pub fn sounds(&self) -> &NameListStore {
        &self.sounds
    }

    pub fn profiles(&self) -> &NameListStore {
        &self.profiles
    }

    pub fn playlists(&self) -> &PlaylistStore {
        &self.playlists
    }

    pub fn playing(&self) -> &PlayingStore {
        &self.playing
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Populate one store completely.
    pub async fn init(&self, kind: StoreKind) -> Result<(), CoreError> {
        match kind {
            StoreKind::Volume => self.volume.init().await,
            StoreKind::Intensity => self.intensity.init().await,
            StoreKind::Lights => self.lights.init().await,
            StoreKind::Sounds => self.sounds.init().await,
            StoreKind::Profiles => self.profiles.init().await,
            StoreKind::Playlists => self.playlists.init().await,
            StoreKind::Playing => self.playing.init().await,
        }
    }

    /// Refresh one store's primary fields.
    pub async fn refresh(&self, kind: StoreKind) -> Result<(), CoreError> {
        match kind {
            StoreKind::Volume => self.volume.update().await,
            StoreKind::Intensity => self.intensity.update().await,
            StoreKind::Lights => self.lights.update().await,
            StoreKind::Sounds => self.sounds.update().await,
            StoreKind::Profiles => self.profiles.update().await,
            StoreKind::Playlists => self.playlists.update().await,
            StoreKind::Playing => self.playing.update().await,
        }
    }

    /// Initialize every store concurrently.
    ///
    /// Failures are logged and returned per store; they never stop the
    /// other stores.
    pub async fn init_all(&self) -> StoreResults {
        let results = join_all(StoreKind::iter().map(|kind| async move {
            let result = self.init(kind).await;
            if let Err(ref e) = result {
                warn!(store = %kind, error = %e, "store init failed");
            }
            (kind, result)
        }))
        .await;
        debug!(
            ok = results.iter().filter(|(_, r)| r.is_ok()).count(),
            total = results.len(),
            "stores initialized"
        );
        results
    }

    /// Fully reload every store once, concurrently.
    ///
    /// Playlists get the same treatment as on init, so playlists that
    /// appeared meanwhile come with songs, position and chance.
    pub async fn refresh_all(&self) -> StoreResults {
        self.init_all().await
    }

    /// Serializable view of every store.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            volume: self.volume.level(),
            intensity: self.intensity.level(),
            lights: self.lights.names(),
            sounds: self.sounds.names(),
            profiles: self.profiles.names(),
            playlists: self.playlists.lists(),
            playing: self.playing.info(),
        }
    }
}

/// Point-in-time copy of all store contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrySnapshot {
    pub volume: i64,
    pub intensity: i64,
    pub lights: Vec<String>,
    pub sounds: Vec<String>,
    pub profiles: Vec<String>,
    pub playlists: Vec<Playlist>,
    pub playing: SongInfo,
}
