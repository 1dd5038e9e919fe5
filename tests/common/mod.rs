#![allow(dead_code)]

use cinescout::http::FetchError;
use cinescout::models::{
    CastMember, Genre, Keyword, MovieDetail, MovieId, MovieSummary, Video,
};
use cinescout::tmdb::TmdbApi;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

type Listing = Result<Vec<MovieSummary>, FetchError>;

/// Scripted TMDB stand-in that records every call it receives.
pub struct FakeTmdb {
    pub calls: Mutex<Vec<String>>,
    pub search_tokens: Mutex<Vec<(String, CancellationToken)>>,
    /// Per-query delay and result for `search_movies`.
    pub search: HashMap<String, (Duration, Listing)>,
    /// Whether `search_movies` stops early when its token fires.
    pub honor_cancel: bool,
    pub popular: Listing,
    pub genres: Result<Vec<Genre>, FetchError>,
    pub discover: Listing,
    pub keyword: Result<Keyword, FetchError>,
    pub detail: Result<MovieDetail, FetchError>,
    pub keywords: Result<Vec<Keyword>, FetchError>,
    pub videos: Result<Vec<Video>, FetchError>,
    pub credits: Result<Vec<CastMember>, FetchError>,
    pub similar: Listing,
    pub recommendations: Listing,
}

impl Default for FakeTmdb {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            search_tokens: Mutex::new(Vec::new()),
            search: HashMap::new(),
            honor_cancel: true,
            popular: Ok(Vec::new()),
            genres: Ok(Vec::new()),
            discover: Ok(Vec::new()),
            keyword: Err(not_found()),
            detail: Err(not_found()),
            keywords: Ok(Vec::new()),
            videos: Ok(Vec::new()),
            credits: Ok(Vec::new()),
            similar: Ok(Vec::new()),
            recommendations: Ok(Vec::new()),
        }
    }
}

impl FakeTmdb {
    pub fn with_search(mut self, query: &str, delay_ms: u64, result: Listing) -> Self {
        self.search
            .insert(query.to_string(), (Duration::from_millis(delay_ms), result));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn token_for(&self, query: &str) -> Option<CancellationToken> {
        self.search_tokens
            .lock()
            .unwrap()
            .iter()
            .find(|(q, _)| q == query)
            .map(|(_, t)| t.clone())
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl TmdbApi for FakeTmdb {
    async fn popular_movies(&self) -> Listing {
        self.record("popular".to_string());
        self.popular.clone()
    }

    async fn genres(&self) -> Result<Vec<Genre>, FetchError> {
        self.record("genres".to_string());
        self.genres.clone()
    }

    async fn search_movies(&self, query: &str, cancel: Option<&CancellationToken>) -> Listing {
        self.record(format!("search:{query}"));
        if let Some(token) = cancel {
            self.search_tokens
                .lock()
                .unwrap()
                .push((query.to_string(), token.clone()));
        }
        let (delay, result) = self
            .search
            .get(query)
            .cloned()
            .unwrap_or((Duration::ZERO, Ok(Vec::new())));
        match cancel {
            Some(token) if self.honor_cancel => {
                tokio::select! {
                    _ = token.cancelled() => return Err(FetchError::Canceled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            _ => tokio::time::sleep(delay).await,
        }
        result
    }

    async fn discover_by_genre(&self, genre_id: i64) -> Listing {
        self.record(format!("discover_genre:{genre_id}"));
        self.discover.clone()
    }

    async fn discover_by_keyword(&self, keyword_id: i64) -> Listing {
        self.record(format!("discover_keyword:{keyword_id}"));
        self.discover.clone()
    }

    async fn keyword(&self, keyword_id: i64) -> Result<Keyword, FetchError> {
        self.record(format!("keyword:{keyword_id}"));
        self.keyword.clone()
    }

    async fn movie_detail(&self, id: MovieId) -> Result<MovieDetail, FetchError> {
        self.record(format!("detail:{id}"));
        self.detail.clone()
    }

    async fn movie_keywords(&self, id: MovieId) -> Result<Vec<Keyword>, FetchError> {
        self.record(format!("keywords:{id}"));
        self.keywords.clone()
    }

    async fn movie_videos(&self, id: MovieId) -> Result<Vec<Video>, FetchError> {
        self.record(format!("videos:{id}"));
        self.videos.clone()
    }

    async fn movie_credits(&self, id: MovieId) -> Result<Vec<CastMember>, FetchError> {
        self.record(format!("credits:{id}"));
        self.credits.clone()
    }

    async fn similar_movies(&self, id: MovieId) -> Listing {
        self.record(format!("similar:{id}"));
        self.similar.clone()
    }

    async fn recommended_movies(&self, id: MovieId) -> Listing {
        self.record(format!("recommendations:{id}"));
        self.recommendations.clone()
    }
}

pub fn not_found() -> FetchError {
    FetchError::Status {
        status: 404,
        body: r#"{"status_message":"The resource you requested could not be found."}"#
            .to_string(),
    }
}

pub fn server_error() -> FetchError {
    FetchError::Status {
        status: 500,
        body: String::new(),
    }
}

pub fn movie(id: MovieId, title: &str) -> MovieSummary {
    MovieSummary {
        id,
        title: title.to_string(),
        poster_path: Some(format!("/{id}.jpg")),
        release_date: Some("2010-07-16".to_string()),
        vote_average: Some(8.4),
    }
}

pub fn movies(prefix: &str, count: i64) -> Vec<MovieSummary> {
    (1..=count).map(|i| movie(i, &format!("{prefix} {i}"))).collect()
}

pub fn genre(id: i64, name: &str) -> Genre {
    Genre {
        id,
        name: name.to_string(),
    }
}

pub fn detail(id: MovieId, title: &str) -> MovieDetail {
    MovieDetail {
        id,
        title: title.to_string(),
        overview: "A thief who steals corporate secrets.".to_string(),
        tagline: Some("Your mind is the scene of the crime.".to_string()),
        poster_path: Some("/poster.jpg".to_string()),
        backdrop_path: None,
        release_date: Some("2010-07-15".to_string()),
        runtime: Some(148),
        genres: vec![genre(28, "Action"), genre(878, "Science Fiction")],
        budget: Some(160_000_000),
        revenue: Some(825_532_764),
        status: Some("Released".to_string()),
        production_companies: Vec::new(),
        production_countries: Vec::new(),
        spoken_languages: Vec::new(),
        vote_average: Some(8.4),
        vote_count: Some(35_000),
        popularity: Some(90.5),
    }
}

pub fn keyword(id: i64, name: &str) -> Keyword {
    Keyword {
        id,
        name: name.to_string(),
    }
}

pub fn cast(count: i64) -> Vec<CastMember> {
    (1..=count)
        .map(|i| CastMember {
            id: i,
            name: format!("Actor {i}"),
            character: Some(format!("Role {i}")),
            profile_path: None,
        })
        .collect()
}

pub fn trailer(key: &str) -> Video {
    Video {
        key: key.to_string(),
        name: "Official Trailer".to_string(),
        site: "YouTube".to_string(),
        video_type: "Trailer".to_string(),
        official: true,
    }
}
