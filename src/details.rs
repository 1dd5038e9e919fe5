//! Movie detail page data: one mandatory core fetch followed by four
//! satellites that each fall back to an empty value on failure.

use crate::http::FetchError;
use crate::models::{CastMember, Keyword, MovieDetail, MovieId, MovieSummary, Video};
use crate::tmdb::TmdbApi;
use serde::Serialize;
use std::future::Future;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

pub const CAST_LIMIT: usize = 12;
pub const SIMILAR_LIMIT: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieDetails {
    pub movie: MovieDetail,
    pub keywords: Vec<Keyword>,
    pub videos: Vec<Video>,
    pub cast: Vec<CastMember>,
    pub similar: Vec<MovieSummary>,
    pub trailer: Option<Video>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DetailState {
    Loading,
    Loaded { details: Box<MovieDetails> },
    Errored { error: String },
}

impl DetailState {
    pub fn from_result(result: Result<MovieDetails, FetchError>) -> Self {
        match result {
            Ok(details) => DetailState::Loaded {
                details: Box::new(details),
            },
            Err(FetchError::Timeout(_)) => DetailState::Errored {
                error: "Request timeout. Please check your internet connection and try again."
                    .to_string(),
            },
            Err(_) => DetailState::Errored {
                error: "Failed to load movie details. Please try again later.".to_string(),
            },
        }
    }
}

/// Loads the core record, then the satellites concurrently.
///
/// Only a core failure is returned as an error; in that case no satellite
/// request is made.
pub async fn load_details(api: &dyn TmdbApi, id: MovieId) -> Result<MovieDetails, FetchError> {
    let movie = match api.movie_detail(id).await {
        Ok(movie) => movie,
        Err(e) => {
            error!(movie_id = id, "Error fetching movie details: {}", e);
            return Err(e);
        }
    };

    let (keywords, videos, mut cast, mut similar) = tokio::join!(
        or_empty("keywords", id, api.movie_keywords(id)),
        or_empty("videos", id, api.movie_videos(id)),
        or_empty("cast", id, api.movie_credits(id)),
        or_empty("similar", id, similar_or_recommended(api, id)),
    );
    cast.truncate(CAST_LIMIT);
    similar.truncate(SIMILAR_LIMIT);
    let trailer = select_trailer(&videos).cloned();

    info!(
        movie_id = id,
        keywords = keywords.len(),
        videos = videos.len(),
        cast = cast.len(),
        similar = similar.len(),
        "Loaded details for '{}'",
        movie.title
    );

    Ok(MovieDetails {
        movie,
        keywords,
        videos,
        cast,
        similar,
        trailer,
    })
}

async fn or_empty<T, F>(satellite: &'static str, id: MovieId, fut: F) -> Vec<T>
where
    F: Future<Output = Result<Vec<T>, FetchError>>,
{
    match fut.await {
        Ok(items) => items,
        Err(e) => {
            warn!(movie_id = id, satellite, "{} not available: {}", satellite, e);
            Vec::new()
        }
    }
}

async fn similar_or_recommended(
    api: &dyn TmdbApi,
    id: MovieId,
) -> Result<Vec<MovieSummary>, FetchError> {
    match api.similar_movies(id).await {
        Ok(similar) if !similar.is_empty() => return Ok(similar),
        Ok(_) => debug!(movie_id = id, "No similar movies, trying recommendations"),
        // An error status still counts as "no similar movies".
        Err(FetchError::Status { status, .. }) => {
            debug!(movie_id = id, status, "Similar movies unavailable, trying recommendations")
        }
        Err(e) => return Err(e),
    }
    api.recommended_movies(id).await
}

fn is_youtube_trailer(v: &&Video) -> bool {
    v.site.eq_ignore_ascii_case("YouTube") && v.video_type == "Trailer"
}

/// Official YouTube trailer, then any YouTube trailer, then the first video.
pub fn select_trailer(videos: &[Video]) -> Option<&Video> {
    videos
        .iter()
        .filter(is_youtube_trailer)
        .find(|v| v.official)
        .or_else(|| videos.iter().find(is_youtube_trailer))
        .or_else(|| videos.first())
}

/// Per-movie state machine: `Loading` then `Loaded` or `Errored`.
///
/// Each call to `load` restarts from `Loading`; there is no automatic retry.
#[derive(Debug)]
pub struct DetailLoader {
    state: watch::Sender<DetailState>,
}

impl Default for DetailLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DetailLoader {
    pub fn new() -> Self {
        let (state, _) = watch::channel(DetailState::Loading);
        Self { state }
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    pub async fn load(&self, api: &dyn TmdbApi, id: MovieId) -> DetailState {
        self.state.send_replace(DetailState::Loading);
        let next = DetailState::from_result(load_details(api, id).await);
        self.state.send_replace(next.clone());
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(key: &str, site: &str, kind: &str, official: bool) -> Video {
        Video {
            key: key.to_string(),
            name: key.to_string(),
            site: site.to_string(),
            video_type: kind.to_string(),
            official,
        }
    }

    #[test]
    fn prefers_official_youtube_trailer() {
        let videos = vec![
            video("teaser", "YouTube", "Teaser", true),
            video("fan", "YouTube", "Trailer", false),
            video("official", "YouTube", "Trailer", true),
        ];
        assert_eq!(select_trailer(&videos).map(|v| v.key.as_str()), Some("official"));
    }

    #[test]
    fn falls_back_to_any_trailer_then_first_video() {
        let videos = vec![
            video("vimeo", "Vimeo", "Trailer", true),
            video("fan", "YouTube", "Trailer", false),
        ];
        assert_eq!(select_trailer(&videos).map(|v| v.key.as_str()), Some("fan"));

        let videos = vec![
            video("clip", "YouTube", "Clip", false),
            video("bts", "YouTube", "Behind the Scenes", true),
        ];
        assert_eq!(select_trailer(&videos).map(|v| v.key.as_str()), Some("clip"));

        assert!(select_trailer(&[]).is_none());
    }

    #[test]
    fn error_state_messages() {
        let state = DetailState::from_result(Err(FetchError::Status {
            status: 404,
            body: String::new(),
        }));
        assert_eq!(
            state,
            DetailState::Errored {
                error: "Failed to load movie details. Please try again later.".to_string()
            }
        );
    }
}
