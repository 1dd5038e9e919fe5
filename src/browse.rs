use crate::catalog::GenreCatalog;
use crate::http::FetchError;
use crate::models::{Genre, MovieSummary};
use crate::routes::HomeFilter;
use crate::tmdb::TmdbApi;
use serde::Serialize;
use tracing::{error, warn};

/// Cap on every result grid (popular, search, discover).
pub const RESULTS_LIMIT: usize = 12;

/// Everything the home view shows. Sections load independently; `error`
/// holds the first primary-load failure while the sections that did load are
/// still returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HomePage {
    pub error: Option<String>,
    pub genres: Vec<Genre>,
    pub popular: Vec<MovieSummary>,
    pub results: Vec<MovieSummary>,
    pub filter_label: Option<String>,
}

pub async fn load_home(api: &dyn TmdbApi, catalog: &GenreCatalog, filter: &HomeFilter) -> HomePage {
    // The label is resolved after the catalog load so a cold catalog is
    // fetched once.
    let genres_and_label = async {
        let genres = ensure_genres(api, catalog).await;
        let label = filter_label(api, catalog, filter).await;
        (genres, label)
    };
    let (popular, (genres, filter_label), results) = tokio::join!(
        api.popular_movies(),
        genres_and_label,
        filtered_results(api, filter),
    );

    let mut page = HomePage {
        filter_label,
        ..HomePage::default()
    };
    let mut errors = Vec::new();

    match popular {
        Ok(mut movies) => {
            movies.truncate(RESULTS_LIMIT);
            page.popular = movies;
        }
        Err(e) => {
            error!("Error fetching popular movies: {}", e);
            errors.push(e.user_message("movies"));
        }
    }
    match genres {
        Ok(genres) => page.genres = genres,
        Err(e) => {
            error!("Error fetching genres: {}", e);
            errors.push(e.user_message("genres"));
        }
    }
    match results {
        Ok(movies) => page.results = movies,
        Err(message) => errors.push(message),
    }

    page.error = errors.into_iter().next();
    page
}

async fn ensure_genres(api: &dyn TmdbApi, catalog: &GenreCatalog) -> Result<Vec<Genre>, FetchError> {
    if catalog.is_empty() {
        catalog.load(api).await?;
    }
    Ok(catalog.browse())
}

async fn filtered_results(api: &dyn TmdbApi, filter: &HomeFilter) -> Result<Vec<MovieSummary>, String> {
    let (result, kind) = match filter {
        HomeFilter::None => return Ok(Vec::new()),
        HomeFilter::Genre(id) => (api.discover_by_genre(*id).await, "genre"),
        HomeFilter::Keyword { id, .. } => (api.discover_by_keyword(*id).await, "keyword"),
    };
    match result {
        Ok(mut movies) => {
            movies.truncate(RESULTS_LIMIT);
            Ok(movies)
        }
        Err(e) => {
            error!("Error fetching movies by {}: {}", kind, e);
            Err(format!("Failed to load movies for this {kind}."))
        }
    }
}

/// Human label for the active filter. Label lookups are best-effort and fall
/// back to whatever the route carried.
pub async fn filter_label(api: &dyn TmdbApi, catalog: &GenreCatalog, filter: &HomeFilter) -> Option<String> {
    match filter {
        HomeFilter::None => None,
        HomeFilter::Genre(id) => {
            if let Some(genre) = catalog.find(*id) {
                return Some(genre.name);
            }
            match api.genres().await {
                Ok(genres) => genres.into_iter().find(|g| g.id == *id).map(|g| g.name),
                Err(e) => {
                    warn!("Error fetching genre name: {}", e);
                    None
                }
            }
        }
        HomeFilter::Keyword { id, name } => match api.keyword(*id).await {
            Ok(keyword) if !keyword.name.is_empty() => Some(keyword.name),
            Ok(_) => Some(name.clone().unwrap_or_else(|| id.to_string())),
            Err(e) => {
                warn!("Error fetching keyword name: {}", e);
                Some(name.clone().unwrap_or_else(|| id.to_string()))
            }
        },
    }
}

/// Submitted (non-suggestion) search. A blank query makes no request.
pub async fn search(api: &dyn TmdbApi, query: &str) -> Result<Vec<MovieSummary>, FetchError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let mut movies = api.search_movies(query, None).await.map_err(|e| {
        error!("Error searching movies: {}", e);
        e
    })?;
    movies.truncate(RESULTS_LIMIT);
    Ok(movies)
}
