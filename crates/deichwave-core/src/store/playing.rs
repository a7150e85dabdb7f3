// Now-playing information.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use deichwave_api::{ApiClient, SongInfo};
use tracing::debug;

use super::cell::StoreCell;
use super::stream::StoreStream;
use crate::error::CoreError;

pub struct PlayingStore {
    api: Arc<ApiClient>,
    info: StoreCell<SongInfo>,
}

impl PlayingStore {
    pub(crate) fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            info: StoreCell::new(SongInfo::default()),
        }
    }

    pub fn info(&self) -> SongInfo {
        self.info.get()
    }

    pub fn subscribe(&self) -> StoreStream<SongInfo> {
        self.info.subscribe()
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.info.refreshed_at()
    }

    pub async fn init(&self) -> Result<(), CoreError> {
        self.update().await
    }

    pub async fn update(&self) -> Result<(), CoreError> {
        let info = self.api.now_playing().await?;
        let title = info.title.clone();
        if self.info.replace(info) {
            debug!(%title, "now playing updated");
        }
        self.info.mark_refreshed();
        Ok(())
    }
}
