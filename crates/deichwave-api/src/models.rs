// Wire types of the `api/v0` surface.
//
// The server marks most fields optional and may emit `null` for them;
// these types normalise that to defaults so callers never juggle
// `Option<Option<_>>`.

use serde::{Deserialize, Deserializer, Serialize};

/// Treat a JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `{ "entity": [...] }`: every list endpoint (music, sounds, lights, profiles).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub entity: Vec<String>,
}

/// `{ "level": n }`: volume and intensity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioLevel {
    pub level: i64,
}

/// `{ "position": n }`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistPosition {
    pub position: i64,
}

/// `{ "chance": n }`: selection weight of a playlist at the current intensity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistChance {
    pub chance: i64,
}

/// Now-playing information. `image` is a `data:` URL or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artist: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub playlist: String,
}

/// Details of a single sound effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoundDetails {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(
        default,
        rename = "buffer_count",
        alias = "bufferCount",
        alias = "BufferCount"
    )]
    pub buffer_count: Option<i64>,
    /// Action links and anything else the server adds.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
