// Writable audio levels: master volume and music intensity.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use deichwave_api::ApiClient;
use tracing::debug;

use super::cell::StoreCell;
use super::stream::StoreStream;
use crate::error::CoreError;

/// Which level a [`LevelStore`] tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LevelKind {
    Volume,
    Intensity,
}

/// A single integer level with write-through `set`.
pub struct LevelStore {
    kind: LevelKind,
    api: Arc<ApiClient>,
    level: StoreCell<i64>,
}

impl LevelStore {
    pub(crate) fn new(kind: LevelKind, api: Arc<ApiClient>) -> Self {
        Self {
            kind,
            api,
            level: StoreCell::new(0),
        }
    }

    pub fn kind(&self) -> LevelKind {
        self.kind
    }

    pub fn level(&self) -> i64 {
        self.level.get()
    }

    pub fn subscribe(&self) -> StoreStream<i64> {
        self.level.subscribe()
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.level.refreshed_at()
    }

    pub async fn init(&self) -> Result<(), CoreError> {
        self.update().await
    }

    /// Re-read the level from the server.
    pub async fn update(&self) -> Result<(), CoreError> {
        let level = match self.kind {
            LevelKind::Volume => self.api.volume().await?,
            LevelKind::Intensity => self.api.intensity().await?,
        };
        if self.level.replace(level) {
            debug!(store = %self.kind, level, "level updated");
        }
        self.level.mark_refreshed();
        Ok(())
    }

    /// Set a new level.
    ///
    /// Assigns locally first, then writes through. Returns `Ok(false)`
    /// without any request if the level is already `level`. A failed
    /// write leaves the local value in place until the next refresh.
    pub async fn set(&self, level: i64) -> Result<bool, CoreError> {
        if !self.level.replace(level) {
            return Ok(false);
        }
        debug!(store = %self.kind, level, "writing level");
        match self.kind {
            LevelKind::Volume => self.api.set_volume(level).await?,
            LevelKind::Intensity => self.api.set_intensity(level).await?,
        }
        Ok(true)
    }
}
