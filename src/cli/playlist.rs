use serde_json::json;

use crate::{config, info, success};

pub async fn create_playlist(
    name: String,
    description: Option<String>,
    public: bool,
    collaborative: bool,
    tracks: Vec<String>,
) {
    let api = super::api_client().await;

    let user_id = match config::spotify_user() {
        Some(id) => id,
        None => super::fetch("Fetching profile...", api.me()).await.id,
    };

    let mut payload = json!({
        "name": name,
        "public": public,
        "collaborative": collaborative,
        "user_id": user_id,
        "track_uris": &tracks,
    });
    if let Some(description) = description {
        payload["description"] = json!(description);
    }

    let playlist = super::fetch(
        "Creating playlist...",
        api.create_playlist_with_tracks(&user_id, payload),
    )
    .await;

    success!("Playlist {} created.", playlist.name);
    info!("Id: {}", playlist.id);
    if !tracks.is_empty() {
        success!("Added {} tracks to playlist.", tracks.len());
    }
}

pub async fn add_to_playlist(playlist_id: String, uris: Vec<String>) {
    let api = super::api_client().await;
    let snapshot = super::fetch(
        "Adding tracks...",
        api.add_items_to_playlist(&playlist_id, &uris),
    )
    .await;

    match snapshot {
        Some(s) => success!("Added {} tracks, snapshot {}", uris.len(), s.snapshot_id),
        None => info!("Nothing to add."),
    }
}
