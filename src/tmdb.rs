use crate::http::{FetchError, HttpClient};
use crate::models::{CastMember, Genre, Keyword, MovieDetail, MovieId, MovieSummary, Video};
use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

/// Endpoints of the TMDB v3 API the application consumes.
///
/// Listing endpoints only ever read page 1.
#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn popular_movies(&self) -> Result<Vec<MovieSummary>, FetchError>;
    async fn genres(&self) -> Result<Vec<Genre>, FetchError>;
    async fn search_movies(
        &self,
        query: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<MovieSummary>, FetchError>;
    async fn discover_by_genre(&self, genre_id: i64) -> Result<Vec<MovieSummary>, FetchError>;
    async fn discover_by_keyword(&self, keyword_id: i64)
        -> Result<Vec<MovieSummary>, FetchError>;
    async fn keyword(&self, keyword_id: i64) -> Result<Keyword, FetchError>;
    async fn movie_detail(&self, id: MovieId) -> Result<MovieDetail, FetchError>;
    async fn movie_keywords(&self, id: MovieId) -> Result<Vec<Keyword>, FetchError>;
    async fn movie_videos(&self, id: MovieId) -> Result<Vec<Video>, FetchError>;
    async fn movie_credits(&self, id: MovieId) -> Result<Vec<CastMember>, FetchError>;
    async fn similar_movies(&self, id: MovieId) -> Result<Vec<MovieSummary>, FetchError>;
    async fn recommended_movies(&self, id: MovieId) -> Result<Vec<MovieSummary>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    http: HttpClient,
    api_key: String,
    base: String,
}

impl TmdbClient {
    pub fn new(http: HttpClient, api_key: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base: base.into(),
        }
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}{}?api_key={}", self.base, path, self.api_key);
        for (key, value) in params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    async fn get_page(&self, path: &str, params: &[(&str, &str)]) -> Result<Vec<MovieSummary>, FetchError> {
        let page: MoviePage = self.http.get_json(&self.url(path, params), None).await?;
        Ok(page.results)
    }
}

#[derive(Debug, Deserialize)]
struct MoviePage {
    #[serde(default)]
    results: Vec<MovieSummary>,
}

#[derive(Debug, Deserialize)]
struct GenreList {
    #[serde(default)]
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct KeywordList {
    #[serde(default)]
    keywords: Vec<Keyword>,
}

#[derive(Debug, Deserialize)]
struct VideoList {
    #[serde(default)]
    results: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct Credits {
    #[serde(default)]
    cast: Vec<CastMember>,
}

const EN_US: (&str, &str) = ("language", "en-US");
const PAGE_ONE: (&str, &str) = ("page", "1");

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn popular_movies(&self) -> Result<Vec<MovieSummary>, FetchError> {
        self.get_page("/movie/popular", &[EN_US, PAGE_ONE]).await
    }

    async fn genres(&self) -> Result<Vec<Genre>, FetchError> {
        let url = self.url("/genre/movie/list", &[EN_US]);
        let data: GenreList = self.http.get_json(&url, None).await?;
        Ok(data.genres)
    }

    async fn search_movies(
        &self,
        query: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<MovieSummary>, FetchError> {
        let url = self.url("/search/movie", &[EN_US, ("query", query), PAGE_ONE]);
        let page: MoviePage = self.http.get_json(&url, cancel).await?;
        Ok(page.results)
    }

    async fn discover_by_genre(&self, genre_id: i64) -> Result<Vec<MovieSummary>, FetchError> {
        let id = genre_id.to_string();
        self.get_page("/discover/movie", &[EN_US, ("with_genres", &id), PAGE_ONE])
            .await
    }

    async fn discover_by_keyword(
        &self,
        keyword_id: i64,
    ) -> Result<Vec<MovieSummary>, FetchError> {
        let id = keyword_id.to_string();
        self.get_page("/discover/movie", &[EN_US, ("with_keywords", &id), PAGE_ONE])
            .await
    }

    async fn keyword(&self, keyword_id: i64) -> Result<Keyword, FetchError> {
        let url = self.url(&format!("/keyword/{keyword_id}"), &[]);
        self.http.get_json(&url, None).await
    }

    async fn movie_detail(&self, id: MovieId) -> Result<MovieDetail, FetchError> {
        let url = self.url(&format!("/movie/{id}"), &[EN_US]);
        self.http.get_json(&url, None).await
    }

    async fn movie_keywords(&self, id: MovieId) -> Result<Vec<Keyword>, FetchError> {
        let url = self.url(&format!("/movie/{id}/keywords"), &[]);
        let data: KeywordList = self.http.get_json(&url, None).await?;
        Ok(data.keywords)
    }

    async fn movie_videos(&self, id: MovieId) -> Result<Vec<Video>, FetchError> {
        let url = self.url(&format!("/movie/{id}/videos"), &[EN_US]);
        let data: VideoList = self.http.get_json(&url, None).await?;
        Ok(data.results)
    }

    async fn movie_credits(&self, id: MovieId) -> Result<Vec<CastMember>, FetchError> {
        let url = self.url(&format!("/movie/{id}/credits"), &[]);
        let data: Credits = self.http.get_json(&url, None).await?;
        Ok(data.cast)
    }

    async fn similar_movies(&self, id: MovieId) -> Result<Vec<MovieSummary>, FetchError> {
        self.get_page(&format!("/movie/{id}/similar"), &[EN_US, PAGE_ONE])
            .await
    }

    async fn recommended_movies(&self, id: MovieId) -> Result<Vec<MovieSummary>, FetchError> {
        self.get_page(&format!("/movie/{id}/recommendations"), &[EN_US, PAGE_ONE])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client() -> TmdbClient {
        let http = HttpClient::new(Duration::from_secs(1)).unwrap();
        TmdbClient::new(http, "k3y", "https://api.example.test/3")
    }

    #[test]
    fn url_encodes_parameters() {
        let url = client().url("/search/movie", &[EN_US, ("query", "amélie & co"), PAGE_ONE]);
        assert_eq!(
            url,
            "https://api.example.test/3/search/movie?api_key=k3y&language=en-US&query=am%C3%A9lie%20%26%20co&page=1"
        );
    }

    #[test]
    fn url_without_params() {
        assert_eq!(
            client().url("/keyword/9715", &[]),
            "https://api.example.test/3/keyword/9715?api_key=k3y"
        );
    }

    #[test]
    fn satellite_payloads_default_to_empty() {
        let kw: KeywordList = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert!(kw.keywords.is_empty());
        let credits: Credits = serde_json::from_str(r#"{"id": 1, "crew": []}"#).unwrap();
        assert!(credits.cast.is_empty());
        let videos: VideoList = serde_json::from_str(
            r#"{"results": [{"key": "abc", "site": "YouTube", "type": "Trailer"}]}"#,
        )
        .unwrap();
        assert_eq!(videos.results.len(), 1);
        assert!(!videos.results[0].official);
    }
}
