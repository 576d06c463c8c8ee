use tabled::Table;

use crate::{
    info,
    types::{Playlist, PlaylistTableRow, RecommendationSeeds},
    warning,
};

use super::catalog::{album_rows, artist_rows, track_rows};

fn playlist_rows(playlists: Vec<Option<Playlist>>) -> Vec<PlaylistTableRow> {
    playlists
        .into_iter()
        .flatten()
        .map(|p| PlaylistTableRow {
            name: p.name,
            owner: p
                .owner
                .and_then(|o| o.display_name.or(Some(o.id)))
                .unwrap_or_default(),
            id: p.id,
        })
        .collect()
}

pub async fn search(query: String, types: Vec<String>) {
    let api = super::api_client().await;
    let res = super::fetch("Searching...", api.search(&query, &types)).await;

    if let Some(tracks) = res.tracks {
        info!("Tracks ({} total)", tracks.total);
        println!("{}", Table::new(track_rows(tracks.items)));
    }
    if let Some(artists) = res.artists {
        info!("Artists ({} total)", artists.total);
        println!("{}", Table::new(artist_rows(artists.items)));
    }
    if let Some(albums) = res.albums {
        info!("Albums ({} total)", albums.total);
        println!("{}", Table::new(album_rows(albums.items)));
    }
    if let Some(playlists) = res.playlists {
        info!("Playlists ({} total)", playlists.total);
        println!("{}", Table::new(playlist_rows(playlists.items)));
    }
}

pub async fn recommendations(artists: Vec<String>, genres: Vec<String>, tracks: Vec<String>) {
    if artists.is_empty() && genres.is_empty() && tracks.is_empty() {
        warning!("Give at least one --artist, --genre or --track seed.");
        return;
    }

    let api = super::api_client().await;
    let seeds = RecommendationSeeds {
        artists,
        genres,
        tracks,
    };
    let res = super::fetch("Fetching recommendations...", api.recommendations(&seeds)).await;

    println!("{}", Table::new(track_rows(res.tracks)));
}

pub async fn featured() {
    let api = super::api_client().await;
    let res = super::fetch("Fetching featured playlists...", api.featured_playlists()).await;

    if let Some(message) = res.message {
        info!("{}", message);
    }
    println!("{}", Table::new(playlist_rows(res.playlists.items)));
}
