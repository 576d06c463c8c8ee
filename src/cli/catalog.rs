use tabled::Table;

use crate::{
    info,
    types::{Album, AlbumTableRow, Artist, ArtistTableRow, Track, TrackTableRow},
    utils, warning,
};

pub(super) fn artist_rows(artists: Vec<Artist>) -> Vec<ArtistTableRow> {
    artists
        .into_iter()
        .map(|a| ArtistTableRow {
            name: a.name,
            genres: a.genres.into_iter().take(3).collect::<Vec<_>>().join(","),
            popularity: a.popularity.map(|p| p.to_string()).unwrap_or_default(),
        })
        .collect()
}

pub(super) fn album_rows(albums: Vec<Album>) -> Vec<AlbumTableRow> {
    albums
        .into_iter()
        .map(|a| AlbumTableRow {
            date: a.release_date,
            artists: utils::join_artists(&a.artists),
            name: a.name,
        })
        .collect()
}

pub(super) fn track_rows(tracks: Vec<Track>) -> Vec<TrackTableRow> {
    tracks
        .into_iter()
        .map(|t| TrackTableRow {
            artists: utils::join_artists(&t.artists),
            album: t.album.map(|a| a.name).unwrap_or_default(),
            name: t.name,
            uri: t.uri,
        })
        .collect()
}

pub async fn artists(ids: Vec<String>) {
    let api = super::api_client().await;
    let artists = super::fetch("Fetching artists...", api.artists(&ids)).await;

    if artists.len() < ids.len() {
        warning!("{} of {} ids are unknown", ids.len() - artists.len(), ids.len());
    }
    println!("{}", Table::new(artist_rows(artists)));
}

pub async fn albums(ids: Vec<String>) {
    let api = super::api_client().await;
    let albums = super::fetch("Fetching albums...", api.albums(&ids)).await;

    if albums.len() < ids.len() {
        warning!("{} of {} ids are unknown", ids.len() - albums.len(), ids.len());
    }
    println!("{}", Table::new(album_rows(albums)));
}

pub async fn track(id: String) {
    let api = super::api_client().await;
    let track = super::fetch("Fetching track...", api.track(&id)).await;

    let seconds = track.duration_ms / 1000;
    info!("{} ({}:{:02})", track.name, seconds / 60, seconds % 60);
    println!("{}", Table::new(track_rows(vec![track])));
}
