// deichwave-api: Async Rust client for the Deichwave party-box REST API and event stream

pub mod client;
pub mod endpoints;
pub mod error;
pub mod events;
pub mod host;
pub mod models;
pub mod transport;

pub use client::ApiClient;
pub use error::Error;
pub use events::{EventStream, MAX_EVENT_BYTES, PushEvent, SseDecoder, decode_events};
pub use host::{BaseUrl, ConnectionState, HostCandidate, HostResolver, PONG, ResolverConfig};
pub use models::{
    AudioLevel, EntityList, PlaylistChance, PlaylistPosition, SongInfo, SoundDetails,
};
pub use reqwest::Method;
pub use transport::TransportConfig;
