use crate::{
    error::Result,
    spotify::{ApiClient, Query},
    types::{Album, Artist, ArtistsResponse, AlbumsResponse, Track},
};

impl ApiClient {
    /// Looks up several artists at once. Ids Spotify does not know are
    /// dropped from the result.
    pub async fn artists<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Artist>> {
        let res: ArtistsResponse = self.get(&["artists"], &Query::new().param("ids", ids)).await?;
        Ok(res.artists.into_iter().flatten().collect())
    }

    pub async fn albums<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Album>> {
        let res: AlbumsResponse = self.get(&["albums"], &Query::new().param("ids", ids)).await?;
        Ok(res.albums.into_iter().flatten().collect())
    }

    pub async fn track(&self, id: &str) -> Result<Track> {
        self.get(&["tracks", id], &Query::new()).await
    }
}
