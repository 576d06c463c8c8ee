use log::debug;
use serde_json::{Value, json};

use crate::{
    error::{Error, Result},
    spotify::ApiClient,
    types::{NewPlaylist, Playlist, Snapshot},
};

/// Spotify accepts at most this many items per "add items" call.
pub const MAX_ITEMS_PER_REQUEST: usize = 100;

/// Fields callers may put in a playlist payload that belong to the URL path
/// or to the separate "add items" call.
const NON_BODY_FIELDS: &[&str] = &["user_id", "track_uris"];

/// Turns a caller supplied payload into a playlist creation body by dropping
/// `user_id` and `track_uris`.
pub fn playlist_body(mut payload: Value) -> Value {
    if let Some(fields) = payload.as_object_mut() {
        for field in NON_BODY_FIELDS {
            fields.remove(*field);
        }
    }
    payload
}

/// Pulls the `track_uris` array out of a playlist payload.
pub fn payload_track_uris(payload: &Value) -> Vec<String> {
    payload
        .get("track_uris")
        .and_then(Value::as_array)
        .map(|uris| {
            uris.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl ApiClient {
    /// Creates a playlist owned by `user_id`.
    ///
    /// `payload` is any JSON object with the playlist fields (`name`,
    /// `description`, `public`, `collaborative`); `user_id` and `track_uris`
    /// are stripped before sending.
    pub async fn create_playlist(&self, user_id: &str, payload: Value) -> Result<Playlist> {
        if !payload.is_object() {
            return Err(Error::InvalidPayload(
                "playlist payload must be a JSON object".to_string(),
            ));
        }

        self.post(&["users", user_id, "playlists"], playlist_body(payload))
            .await
    }

    pub async fn create_new_playlist(&self, user_id: &str, playlist: &NewPlaylist) -> Result<Playlist> {
        let payload = serde_json::to_value(playlist).map_err(Error::Decode)?;
        self.create_playlist(user_id, payload).await
    }

    /// Appends items to a playlist, in batches of [`MAX_ITEMS_PER_REQUEST`].
    /// Returns the snapshot id of the last batch, or `None` if `uris` is empty.
    pub async fn add_items_to_playlist<S: AsRef<str>>(
        &self,
        playlist_id: &str,
        uris: &[S],
    ) -> Result<Option<Snapshot>> {
        let path = ["playlists", playlist_id, "tracks"];
        let mut snapshot = None;

        for chunk in uris.chunks(MAX_ITEMS_PER_REQUEST) {
            let uris: Vec<&str> = chunk.iter().map(AsRef::as_ref).collect();
            debug!("Adding {} items to playlist {}", uris.len(), playlist_id);
            snapshot = Some(self.post(&path, json!({ "uris": uris })).await?);
        }

        Ok(snapshot)
    }

    /// Creates a playlist from `payload` and adds the payload's `track_uris`
    /// to it with a follow-up call.
    pub async fn create_playlist_with_tracks(
        &self,
        user_id: &str,
        payload: Value,
    ) -> Result<Playlist> {
        let uris = payload_track_uris(&payload);
        let playlist = self.create_playlist(user_id, payload).await?;
        self.add_items_to_playlist(&playlist.id, &uris).await?;
        Ok(playlist)
    }
}
