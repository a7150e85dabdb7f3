// Typed endpoint helpers
//
// One inherent method per server route. Reads return decoded payloads;
// actions return `()` once the server acknowledged them. State changes
// caused by actions come back through the event stream, not here.

use serde_json::{Value, json};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{
    AudioLevel, EntityList, PlaylistChance, PlaylistPosition, SongInfo, SoundDetails,
};

impl ApiClient {
    /// `GET ping`: the liveness reply, normally `"Pong"`.
    pub async fn ping(&self) -> Result<String, Error> {
        self.get(&["ping"]).await
    }

    // ── System levels ────────────────────────────────────────────────

    /// `GET system/volume`
    pub async fn volume(&self) -> Result<i64, Error> {
        let level: AudioLevel = self.get(&["system", "volume"]).await?;
        Ok(level.level)
    }

    /// `POST system/volume` with `{"level": n}`
    pub async fn set_volume(&self, level: i64) -> Result<(), Error> {
        debug!(level, "setting volume");
        let _: Value = self
            .post(&["system", "volume"], Some(&json!({ "level": level })))
            .await?;
        Ok(())
    }

    /// `POST system/volume/{delta}`
    pub async fn change_volume(&self, delta: i64) -> Result<(), Error> {
        self.post_action(&["system", "volume", &delta.to_string()]).await
    }

    /// `GET system/intensity`
    pub async fn intensity(&self) -> Result<i64, Error> {
        let level: AudioLevel = self.get(&["system", "intensity"]).await?;
        Ok(level.level)
    }

    /// `POST system/intensity` with `{"level": n}`
    pub async fn set_intensity(&self, level: i64) -> Result<(), Error> {
        debug!(level, "setting intensity");
        let _: Value = self
            .post(&["system", "intensity"], Some(&json!({ "level": level })))
            .await?;
        Ok(())
    }

    /// `POST system/intensity/{delta}`
    pub async fn change_intensity(&self, delta: i64) -> Result<(), Error> {
        self.post_action(&["system", "intensity", &delta.to_string()])
            .await
    }

    // ── Music ────────────────────────────────────────────────────────

    /// `GET music`: playlist names.
    pub async fn playlists(&self) -> Result<Vec<String>, Error> {
        let list: EntityList = self.get(&["music"]).await?;
        Ok(list.entity)
    }

    /// `GET music/{playlist}`: song names in playback order.
    pub async fn playlist_songs(&self, playlist: &str) -> Result<Vec<String>, Error> {
        let list: EntityList = self.get(&["music", playlist]).await?;
        Ok(list.entity)
    }

    /// `GET music/{playlist}/position`
    pub async fn playlist_position(&self, playlist: &str) -> Result<i64, Error> {
        let pos: PlaylistPosition = self.get(&["music", playlist, "position"]).await?;
        Ok(pos.position)
    }

    /// `GET music/{playlist}/chance`
    pub async fn playlist_chance(&self, playlist: &str) -> Result<i64, Error> {
        let chance: PlaylistChance = self.get(&["music", playlist, "chance"]).await?;
        Ok(chance.chance)
    }

    /// `GET music/playing`
    pub async fn now_playing(&self) -> Result<SongInfo, Error> {
        self.get(&["music", "playing"]).await
    }

    /// `POST music/play`
    pub async fn play(&self) -> Result<(), Error> {
        self.post_action(&["music", "play"]).await
    }

    /// `POST music/pause`
    pub async fn pause(&self) -> Result<(), Error> {
        self.post_action(&["music", "pause"]).await
    }

    /// `POST music/stop`
    pub async fn stop(&self) -> Result<(), Error> {
        self.post_action(&["music", "stop"]).await
    }

    /// `POST music/next`
    pub async fn next_song(&self) -> Result<(), Error> {
        self.post_action(&["music", "next"]).await
    }

    /// `POST music/{playlist}/skip`: drop the upcoming song of a playlist.
    pub async fn skip(&self, playlist: &str) -> Result<(), Error> {
        self.post_action(&["music", playlist, "skip"]).await
    }

    // ── Sounds ───────────────────────────────────────────────────────

    /// `GET sounds`
    pub async fn sounds(&self) -> Result<Vec<String>, Error> {
        let list: EntityList = self.get(&["sounds"]).await?;
        Ok(list.entity)
    }

    /// `GET sounds/{sound}`
    pub async fn sound(&self, sound: &str) -> Result<SoundDetails, Error> {
        self.get(&["sounds", sound]).await
    }

    /// `POST sounds/{sound}/play`
    pub async fn play_sound(&self, sound: &str) -> Result<(), Error> {
        self.post_action(&["sounds", sound, "play"]).await
    }

    /// `POST sounds/{sound}/loop`
    pub async fn loop_sound(&self, sound: &str) -> Result<(), Error> {
        self.post_action(&["sounds", sound, "loop"]).await
    }

    /// `POST sounds/{sound}/unloop`
    pub async fn unloop_sound(&self, sound: &str) -> Result<(), Error> {
        self.post_action(&["sounds", sound, "unloop"]).await
    }

    // ── Lights ───────────────────────────────────────────────────────

    /// `GET lights`: light effect names.
    pub async fn lights(&self) -> Result<Vec<String>, Error> {
        let list: EntityList = self.get(&["lights"]).await?;
        Ok(list.entity)
    }

    /// `POST lights/clear`: stop every running effect.
    ///
    /// Boxes without support answer `501 Not Implemented`, which surfaces
    /// as [`Error::Status`].
    pub async fn clear_lights(&self) -> Result<(), Error> {
        self.post_action(&["lights", "clear"]).await
    }

    /// `POST lights/{effect}/set`
    pub async fn set_light_effect(&self, effect: &str) -> Result<(), Error> {
        self.post_action(&["lights", effect, "set"]).await
    }

    /// `POST lights/{effect}/stop`
    pub async fn stop_light_effect(&self, effect: &str) -> Result<(), Error> {
        self.post_action(&["lights", effect, "stop"]).await
    }

    // ── Profiles ─────────────────────────────────────────────────────

    /// `GET profiles`
    pub async fn profiles(&self) -> Result<Vec<String>, Error> {
        let list: EntityList = self.get(&["profiles"]).await?;
        Ok(list.entity)
    }

    /// `POST profiles/{profile}/set`
    pub async fn set_profile(&self, profile: &str) -> Result<(), Error> {
        self.post_action(&["profiles", profile, "set"]).await
    }

    // ── Misc ─────────────────────────────────────────────────────────

    /// `POST shell/{command}`: run a server-side configured command and
    /// return its standard output.
    pub async fn run_shell(&self, command: &str) -> Result<String, Error> {
        self.post(&["shell", command], None).await
    }

    /// `GET info/{path}`: look up a server configuration value by dotted path.
    pub async fn info(&self, path: &str) -> Result<Value, Error> {
        self.get(&["info", path]).await
    }
}
