// ── Push event routing ──
//
// Maps each server push event onto the store refreshes it implies.
// Dispatches run concurrently so a slow refresh never stalls the stream.
// The router itself ends on the first stream failure: recovery is a full
// session reload, not a reconnect.

use std::sync::Arc;

use deichwave_api::{EventStream, PushEvent};
use futures_util::StreamExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::CoreError;
use crate::store::{StoreKind, StoreRegistry};

/// A push event decoded into the action it calls for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutedEvent {
    /// `config/changed`: everything may have changed.
    ConfigChanged,
    /// `music/playing`
    MusicPlaying,
    /// `music/position`; `None` means every playlist.
    MusicPosition { name: Option<String> },
    /// `music/shuffle`; `None` means every playlist.
    MusicShuffle { name: Option<String> },
    /// `audio/volume`
    AudioVolume,
    /// `audio/intensity`: chances depend on intensity, so both refresh.
    AudioIntensity,
    /// Anything else. Ignored.
    Unmatched { origin: String, kind: String },
}

impl RoutedEvent {
    pub fn decode(event: &PushEvent) -> Self {
        match (event.origin.as_str(), event.kind.as_str()) {
            ("config", "changed") => Self::ConfigChanged,
            ("music", "playing") => Self::MusicPlaying,
            ("music", "position") => Self::MusicPosition {
                name: event.name.clone(),
            },
            ("music", "shuffle") => Self::MusicShuffle {
                name: event.name.clone(),
            },
            ("audio", "volume") => Self::AudioVolume,
            ("audio", "intensity") => Self::AudioIntensity,
            (origin, kind) => Self::Unmatched {
                origin: origin.to_owned(),
                kind: kind.to_owned(),
            },
        }
    }
}

/// Why [`EventRouter::run`] returned.
#[derive(Debug)]
pub enum RouterExit {
    /// The session was cancelled.
    Cancelled,
    /// The stream broke or ended; the session must be reloaded.
    StreamFailed(CoreError),
}

/// Applies the routing table to a store registry.
#[derive(Clone)]
pub struct EventRouter {
    stores: Arc<StoreRegistry>,
}

impl EventRouter {
    pub fn new(stores: Arc<StoreRegistry>) -> Self {
        Self { stores }
    }

    /// Run the refreshes `event` calls for and wait for them.
    ///
    /// Every refresh is attempted even if an earlier one fails; the
    /// first failure is returned.
    pub async fn dispatch(&self, event: &PushEvent) -> Result<RoutedEvent, CoreError> {
        let routed = RoutedEvent::decode(event);
        trace!(%event, ?routed, "routing push event");

        let stores = &self.stores;
        match &routed {
            RoutedEvent::ConfigChanged => {
                let results = stores.refresh_all().await;
                first_error(results.into_iter().map(|(_, r)| r))?;
            }
            RoutedEvent::MusicPlaying => stores.refresh(StoreKind::Playing).await?,
            RoutedEvent::MusicPosition { name } => {
                stores.playlists().update_positions(name.as_deref()).await?;
            }
            RoutedEvent::MusicShuffle { name } => {
                stores.playlists().update_songs(name.as_deref()).await?;
            }
            RoutedEvent::AudioVolume => stores.refresh(StoreKind::Volume).await?,
            RoutedEvent::AudioIntensity => {
                let chances = stores.playlists().update_chances(None).await;
                let intensity = stores.refresh(StoreKind::Intensity).await;
                chances.and(intensity)?;
            }
            RoutedEvent::Unmatched { origin, kind } => {
                debug!(origin, kind, "ignoring unmatched push event");
            }
        }
        Ok(routed)
    }

    /// Consume `events` until the stream fails or `cancel` fires.
    ///
    /// Refreshes still in flight when the router returns are aborted.
    pub async fn run(&self, mut events: EventStream, cancel: CancellationToken) -> RouterExit {
        let mut inflight: JoinSet<()> = JoinSet::new();

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return RouterExit::Cancelled,
                Some(done) = inflight.join_next(), if !inflight.is_empty() => {
                    if let Err(e) = done {
                        warn!(error = %e, "event dispatch task failed");
                    }
                }
                next = events.next() => match next {
                    Some(Ok(event)) => {
                        let router = self.clone();
                        inflight.spawn(async move {
                            if let Err(e) = router.dispatch(&event).await {
                                warn!(%event, error = %e, "refresh after push event failed");
                            }
                        });
                    }
                    Some(Err(e)) => return RouterExit::StreamFailed(e.into()),
                    None => {
                        return RouterExit::StreamFailed(CoreError::EventStream {
                            reason: "stream ended".into(),
                        });
                    }
                },
            }
        }
    }
}

fn first_error(results: impl IntoIterator<Item = Result<(), CoreError>>) -> Result<(), CoreError> {
    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode(origin: &str, kind: &str, name: Option<&str>) -> RoutedEvent {
        RoutedEvent::decode(&PushEvent::new(origin, kind, name))
    }

    #[test]
    fn routing_table() {
        assert_eq!(decode("config", "changed", None), RoutedEvent::ConfigChanged);
        assert_eq!(decode("music", "playing", None), RoutedEvent::MusicPlaying);
        assert_eq!(
            decode("music", "position", Some("party")),
            RoutedEvent::MusicPosition {
                name: Some("party".into())
            }
        );
        assert_eq!(
            decode("music", "shuffle", None),
            RoutedEvent::MusicShuffle { name: None }
        );
        assert_eq!(decode("audio", "volume", None), RoutedEvent::AudioVolume);
        assert_eq!(decode("audio", "intensity", None), RoutedEvent::AudioIntensity);
    }

    #[test]
    fn unknown_pairs_are_unmatched() {
        assert_eq!(
            decode("lights", "set", Some("strobe")),
            RoutedEvent::Unmatched {
                origin: "lights".into(),
                kind: "set".into()
            }
        );
        // Origin and type must both match.
        assert!(matches!(
            decode("audio", "playing", None),
            RoutedEvent::Unmatched { .. }
        ));
    }

    #[test]
    fn first_error_keeps_earliest_failure() {
        let result = first_error(vec![
            Ok(()),
            Err(CoreError::Timeout),
            Err(CoreError::Internal("later".into())),
        ]);
        assert!(matches!(result, Err(CoreError::Timeout)));
    }
}
