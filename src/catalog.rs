use crate::http::FetchError;
use crate::models::Genre;
use crate::tmdb::TmdbApi;
use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::info;

/// Number of genres shown in the browse section.
pub const BROWSE_GENRES: usize = 12;

/// Session-wide genre list, fetched once and shared read-only.
#[derive(Debug, Default)]
pub struct GenreCatalog {
    genres: ArcSwap<Vec<Genre>>,
}

impl GenreCatalog {
    pub fn new(genres: Vec<Genre>) -> Self {
        Self {
            genres: ArcSwap::from_pointee(genres),
        }
    }

    /// Fetches the genre list and replaces the cached copy. On failure the
    /// previous contents stay in place.
    pub async fn load(&self, api: &dyn TmdbApi) -> Result<usize, FetchError> {
        let genres = api.genres().await?;
        let count = genres.len();
        self.genres.store(Arc::new(genres));
        info!("Genre catalog loaded ({} genres)", count);
        Ok(count)
    }

    pub fn is_empty(&self) -> bool {
        self.genres.load().is_empty()
    }

    pub fn browse(&self) -> Vec<Genre> {
        self.genres.load().iter().take(BROWSE_GENRES).cloned().collect()
    }

    pub fn find(&self, id: i64) -> Option<Genre> {
        self.genres.load().iter().find(|g| g.id == id).cloned()
    }

    /// Genres whose name starts with `query`, case-insensitively, in catalog order.
    pub fn prefix_matches(&self, query: &str, limit: usize) -> Vec<Genre> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.genres
            .load()
            .iter()
            .filter(|g| g.name.to_lowercase().starts_with(&needle))
            .take(limit)
            .cloned()
            .collect()
    }
}
