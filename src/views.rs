//! JSON response shapes served by the API, with CDN image URLs filled in.

use crate::browse::HomePage;
use crate::details::{DetailState, MovieDetails};
use crate::images::{image_url, youtube_embed_url, ImageKind};
use crate::models::{CastMember, Genre, Keyword, MovieDetail, MovieId, MovieSummary, Video};
use serde::Serialize;
use std::collections::BTreeSet;

/// A movie in a results grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieCard {
    #[serde(flatten)]
    pub movie: MovieSummary,
    pub poster_url: String,
}

impl From<MovieSummary> for MovieCard {
    fn from(movie: MovieSummary) -> Self {
        let poster_url = image_url(movie.poster_path.as_deref(), ImageKind::GridPoster);
        Self { movie, poster_url }
    }
}

pub fn cards(movies: Vec<MovieSummary>) -> Vec<MovieCard> {
    movies.into_iter().map(MovieCard::from).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastCard {
    #[serde(flatten)]
    pub member: CastMember,
    pub profile_url: String,
}

impl From<CastMember> for CastCard {
    fn from(member: CastMember) -> Self {
        let profile_url = image_url(member.profile_path.as_deref(), ImageKind::Profile);
        Self {
            member,
            profile_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeView {
    pub error: Option<String>,
    pub genres: Vec<Genre>,
    pub popular: Vec<MovieCard>,
    pub results: Vec<MovieCard>,
    pub filter_label: Option<String>,
    pub favorites: BTreeSet<MovieId>,
}

impl HomeView {
    pub fn new(page: HomePage, favorites: BTreeSet<MovieId>) -> Self {
        Self {
            error: page.error,
            genres: page.genres,
            popular: cards(page.popular),
            results: cards(page.results),
            filter_label: page.filter_label,
            favorites,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailsView {
    pub movie: MovieDetail,
    pub poster_url: String,
    pub backdrop_url: String,
    pub year: Option<String>,
    pub runtime: Option<String>,
    pub keywords: Vec<Keyword>,
    pub videos: Vec<Video>,
    pub cast: Vec<CastCard>,
    pub similar: Vec<MovieCard>,
    pub trailer: Option<Video>,
    pub trailer_url: Option<String>,
}

impl From<MovieDetails> for DetailsView {
    fn from(details: MovieDetails) -> Self {
        let movie = details.movie;
        Self {
            poster_url: image_url(movie.poster_path.as_deref(), ImageKind::DetailPoster),
            backdrop_url: image_url(movie.backdrop_path.as_deref(), ImageKind::Backdrop),
            year: movie.year(),
            runtime: movie.runtime_label(),
            movie,
            keywords: details.keywords,
            videos: details.videos,
            cast: details.cast.into_iter().map(CastCard::from).collect(),
            similar: cards(details.similar),
            trailer_url: details.trailer.as_ref().map(|v| youtube_embed_url(&v.key)),
            trailer: details.trailer,
        }
    }
}

/// Detail page payload, tagged by `state` like `DetailState`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DetailView {
    Loading,
    Loaded { details: Box<DetailsView> },
    Errored { error: String },
}

impl From<DetailState> for DetailView {
    fn from(state: DetailState) -> Self {
        match state {
            DetailState::Loading => DetailView::Loading,
            DetailState::Loaded { details } => DetailView::Loaded {
                details: Box::new(DetailsView::from(*details)),
            },
            DetailState::Errored { error } => DetailView::Errored { error },
        }
    }
}
