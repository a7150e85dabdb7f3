// Read-only name lists: light effects, sound effects and profiles.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use deichwave_api::ApiClient;
use tracing::debug;

use super::cell::StoreCell;
use super::stream::StoreStream;
use crate::error::CoreError;

/// Which list a [`NameListStore`] tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NameListKind {
    Lights,
    Sounds,
    Profiles,
}

pub struct NameListStore {
    kind: NameListKind,
    api: Arc<ApiClient>,
    names: StoreCell<Vec<String>>,
}

impl NameListStore {
    pub(crate) fn new(kind: NameListKind, api: Arc<ApiClient>) -> Self {
        Self {
            kind,
            api,
            names: StoreCell::new(Vec::new()),
        }
    }

    pub fn kind(&self) -> NameListKind {
        self.kind
    }

    pub fn names(&self) -> Vec<String> {
        self.names.get()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.read(|names| names.iter().any(|n| n == name))
    }

    pub fn subscribe(&self) -> StoreStream<Vec<String>> {
        self.names.subscribe()
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.names.refreshed_at()
    }

    pub async fn init(&self) -> Result<(), CoreError> {
        self.update().await
    }

    pub async fn update(&self) -> Result<(), CoreError> {
        let names = match self.kind {
            NameListKind::Lights => self.api.lights().await?,
            NameListKind::Sounds => self.api.sounds().await?,
            NameListKind::Profiles => self.api.profiles().await?,
        };
        let count = names.len();
        if self.names.replace(names) {
            debug!(store = %self.kind, count, "names updated");
        }
        self.names.mark_refreshed();
        Ok(())
    }
}
