use chrono::Utc;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Seconds before `expires_at` from which a token counts as expired.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

fn default_expiry_margin() -> i64 {
    EXPIRY_MARGIN_SECS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub expires_at: i64,
    /// Never more than half the lifetime the token was issued with, so a
    /// short-lived token is usable on arrival.
    #[serde(default = "default_expiry_margin")]
    pub expiry_margin: i64,
}

impl Token {
    pub fn from_response(res: TokenResponse, now: i64) -> Self {
        let lifetime = i64::try_from(res.expires_in).unwrap_or(i64::MAX);

        Token {
            access_token: res.access_token,
            token_type: res.token_type,
            refresh_token: res.refresh_token.filter(|t| !t.is_empty()),
            scope: res.scope,
            expires_at: now.saturating_add(lifetime),
            expiry_margin: EXPIRY_MARGIN_SECS.min(lifetime / 2),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at.saturating_sub(self.expiry_margin)
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }

    pub fn expires_in(&self) -> i64 {
        self.expires_at.saturating_sub(Utc::now().timestamp()).max(0)
    }
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

fn default_expires_in() -> u64 {
    3600
}

/// Body of a successful answer from the accounts token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

/// Query parameters Spotify appends to the redirect URI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub product: Option<String>,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub popularity: Option<u32>,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub album_type: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub total_tracks: Option<u32>,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: Option<Album>,
}

/// Spotify answers unknown ids in batch lookups with `null` entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistsResponse {
    pub artists: Vec<Option<Artist>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumsResponse {
    pub albums: Vec<Option<Album>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<Paging<Track>>,
    pub artists: Option<Paging<Artist>>,
    pub albums: Option<Paging<Album>>,
    pub playlists: Option<Paging<Option<Playlist>>>,
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationSeeds {
    pub artists: Vec<String>,
    pub genres: Vec<String>,
    pub tracks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationSeed {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendations {
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub seeds: Vec<RecommendationSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturedPlaylists {
    pub message: Option<String>,
    pub playlists: Paging<Option<Playlist>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistOwner {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub public: Option<bool>,
    #[serde(default)]
    pub collaborative: bool,
    #[serde(default)]
    pub snapshot_id: String,
    #[serde(default)]
    pub uri: String,
    pub owner: Option<PlaylistOwner>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlaylist {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub snapshot_id: String,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub name: String,
    pub artists: String,
    pub album: String,
    pub uri: String,
}

#[derive(Tabled)]
pub struct ArtistTableRow {
    pub name: String,
    pub genres: String,
    pub popularity: String,
}

#[derive(Tabled)]
pub struct AlbumTableRow {
    pub date: String,
    pub name: String,
    pub artists: String,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub name: String,
    pub owner: String,
    pub id: String,
}
