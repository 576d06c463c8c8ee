use crate::{
    error::Result,
    spotify::{ApiClient, Query},
    types::{FeaturedPlaylists, RecommendationSeeds, Recommendations, SearchResponse},
};

/// Search category used when the caller names none.
pub const DEFAULT_SEARCH_TYPES: &[&str] = &["track"];

impl ApiClient {
    /// Searches the catalog. `categories` maps to the `type` parameter, e.g.
    /// `["track", "artist"]`; an empty list searches tracks.
    pub async fn search<S: AsRef<str>>(
        &self,
        query: &str,
        categories: &[S],
    ) -> Result<SearchResponse> {
        let params = Query::new().single("q", query);
        let params = if categories.is_empty() {
            params.param("type", DEFAULT_SEARCH_TYPES)
        } else {
            params.param("type", categories)
        };

        self.get(&["search"], &params).await
    }

    /// Track recommendations for the given seeds. Empty seed lists are left
    /// out of the query.
    pub async fn recommendations(&self, seeds: &RecommendationSeeds) -> Result<Recommendations> {
        let params = Query::new()
            .param("seed_artists", &seeds.artists)
            .param("seed_genres", &seeds.genres)
            .param("seed_tracks", &seeds.tracks);

        self.get(&["recommendations"], &params).await
    }

    pub async fn featured_playlists(&self) -> Result<FeaturedPlaylists> {
        self.get(&["browse", "featured-playlists"], &Query::new()).await
    }
}
