// deichwave-core: Host discovery, reactive stores and push-event routing for Deichwave clients.

pub mod config;
pub mod error;
pub mod poll;
pub mod remote;
pub mod router;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{BatteryPollConfig, DEFAULT_HOSTS, RemoteConfig, default_hosts};
pub use error::CoreError;
pub use poll::{BatteryPoller, BatteryReading, PollState};
pub use remote::{Remote, RemoteSnapshot, SessionEnd, run_supervised};
pub use router::{EventRouter, RoutedEvent, RouterExit};
pub use store::{
    LevelKind, LevelStore, NameListKind, NameListStore, PlayingStore, Playlist, PlaylistStore,
    RegistrySnapshot, StoreKind, StoreRegistry, StoreResults, StoreStream, StoreWatchStream,
};

// Transport types consumers need alongside the core.
pub use deichwave_api::{
    ApiClient, BaseUrl, ConnectionState, Error as ApiError, HostCandidate, HostResolver,
    PushEvent, SongInfo, SoundDetails,
};
