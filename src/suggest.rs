//! Debounced autosuggest for the search box.
//!
//! Each client session owns one `SuggestionPipeline`. Input changes update the
//! query immediately; the remote search only runs once the input has been
//! quiet for the debounce window. At most one search is in flight per
//! pipeline: starting a new one cancels the previous request and bumps the
//! generation, and results are applied only while their generation is still
//! current.

use crate::catalog::GenreCatalog;
use crate::models::{MovieSummary, Suggestion};
use crate::routes::{HomeFilter, Route};
use crate::tmdb::TmdbApi;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub const DEBOUNCE: Duration = Duration::from_millis(300);
pub const DISMISS_GRACE: Duration = Duration::from_millis(200);
pub const MAX_MOVIE_SUGGESTIONS: usize = 5;
pub const MAX_GENRE_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestSettings {
    pub debounce: Duration,
    /// How long the list stays up after focus leaves the input, so a pointer
    /// selection on the list lands before it is hidden.
    pub dismiss_grace: Duration,
    pub max_movies: usize,
    pub max_genres: usize,
}

impl Default for SuggestSettings {
    fn default() -> Self {
        Self {
            debounce: DEBOUNCE,
            dismiss_grace: DISMISS_GRACE,
            max_movies: MAX_MOVIE_SUGGESTIONS,
            max_genres: MAX_GENRE_SUGGESTIONS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuggestionState {
    pub query: String,
    pub suggestions: Vec<Suggestion>,
    pub visible: bool,
}

/// Movie matches in API order, then genre prefix matches in catalog order.
pub fn compose_suggestions(
    movies: Vec<MovieSummary>,
    catalog: &GenreCatalog,
    query: &str,
    settings: &SuggestSettings,
) -> Vec<Suggestion> {
    let movie_items = movies.into_iter().take(settings.max_movies).map(|m| {
        let year = m.year();
        Suggestion::Movie {
            id: m.id,
            name: m.title,
            year,
        }
    });
    let genre_items = catalog
        .prefix_matches(query, settings.max_genres)
        .into_iter()
        .map(|g| Suggestion::Genre {
            id: g.id,
            name: g.name,
        });
    movie_items.chain(genre_items).collect()
}

#[derive(Debug, Default)]
struct InFlight {
    generation: u64,
    token: Option<CancellationToken>,
}

#[derive(Debug)]
struct Shared {
    state: watch::Sender<SuggestionState>,
    in_flight: Mutex<InFlight>,
    session: CancellationToken,
}

impl Shared {
    fn in_flight(&self) -> std::sync::MutexGuard<'_, InFlight> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cancels the outstanding request, if any, and opens a new generation.
    fn begin_request(&self) -> (u64, CancellationToken) {
        let mut guard = self.in_flight();
        if let Some(previous) = guard.token.take() {
            previous.cancel();
        }
        guard.generation += 1;
        let token = self.session.child_token();
        guard.token = Some(token.clone());
        (guard.generation, token)
    }

    fn supersede(&self) {
        let mut guard = self.in_flight();
        if let Some(previous) = guard.token.take() {
            previous.cancel();
        }
        guard.generation += 1;
    }

    /// Publishes `items` if `generation` is still current.
    fn apply(&self, generation: u64, items: Vec<Suggestion>) -> bool {
        let mut guard = self.in_flight();
        if guard.generation != generation || self.session.is_cancelled() {
            return false;
        }
        guard.token = None;
        self.state.send_modify(|s| s.suggestions = items);
        true
    }

    async fn run_search(
        &self,
        api: &dyn TmdbApi,
        catalog: &GenreCatalog,
        text: &str,
        settings: &SuggestSettings,
    ) {
        if text.trim().is_empty() {
            self.supersede();
            self.state.send_modify(|s| s.suggestions.clear());
            return;
        }

        let (generation, token) = self.begin_request();
        match api.search_movies(text, Some(&token)).await {
            Ok(movies) => {
                let items = compose_suggestions(movies, catalog, text, settings);
                if !self.apply(generation, items) {
                    debug!("Discarding stale suggestions for '{}'", text);
                }
            }
            Err(e) if e.is_canceled() => {
                debug!("Suggestion request for '{}' superseded", text);
            }
            Err(e) => {
                warn!("Error fetching suggestions for '{}': {}", text, e);
                self.apply(generation, Vec::new());
            }
        }
    }
}

pub struct SuggestionPipeline {
    api: Arc<dyn TmdbApi>,
    catalog: Arc<GenreCatalog>,
    settings: SuggestSettings,
    shared: Arc<Shared>,
    debounce: Option<CancellationToken>,
    dismiss: Option<CancellationToken>,
}

impl SuggestionPipeline {
    pub fn new(api: Arc<dyn TmdbApi>, catalog: Arc<GenreCatalog>, settings: SuggestSettings) -> Self {
        let (state, _) = watch::channel(SuggestionState::default());
        Self {
            api,
            catalog,
            settings,
            shared: Arc::new(Shared {
                state,
                in_flight: Mutex::new(InFlight::default()),
                session: CancellationToken::new(),
            }),
            debounce: None,
            dismiss: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SuggestionState> {
        self.shared.state.subscribe()
    }

    pub fn state(&self) -> SuggestionState {
        self.shared.state.borrow().clone()
    }

    /// Records `text` as the query right away and (re)starts the debounce
    /// timer; only a timer that runs out uninterrupted triggers a search.
    pub fn on_input_change(&mut self, text: &str) {
        self.shared.state.send_modify(|s| {
            s.query = text.to_string();
            s.visible = true;
        });

        cancel(&mut self.debounce);
        let timer = self.shared.session.child_token();
        self.debounce = Some(timer.clone());

        let shared = self.shared.clone();
        let api = self.api.clone();
        let catalog = self.catalog.clone();
        let settings = self.settings;
        let text = text.to_string();
        tokio::spawn(async move {
            tokio::select! {
                _ = timer.cancelled() => return,
                _ = tokio::time::sleep(settings.debounce) => {}
            }
            shared
                .run_search(api.as_ref(), &catalog, &text, &settings)
                .await;
        });
    }

    pub fn on_focus(&mut self) {
        cancel(&mut self.dismiss);
        self.shared.state.send_modify(|s| s.visible = true);
    }

    /// Hides the list once the grace delay has passed, unless focus returns
    /// or a selection closes it first.
    pub fn on_blur(&mut self) {
        cancel(&mut self.dismiss);
        let timer = self.shared.session.child_token();
        self.dismiss = Some(timer.clone());

        let shared = self.shared.clone();
        let grace = self.settings.dismiss_grace;
        tokio::spawn(async move {
            tokio::select! {
                _ = timer.cancelled() => {}
                _ = tokio::time::sleep(grace) => {
                    shared.state.send_modify(|s| s.visible = false);
                }
            }
        });
    }

    /// Picks the suggestion at `index`, closes the list and returns where to
    /// navigate. Movie picks also replace the query with the movie's name.
    pub fn select(&mut self, index: usize) -> Option<Route> {
        let picked = self.shared.state.borrow().suggestions.get(index).cloned()?;
        debug!("Selected suggestion '{}'", picked.name());
        cancel(&mut self.dismiss);
        cancel(&mut self.debounce);
        self.shared.supersede();

        let route = match &picked {
            Suggestion::Movie { id, .. } => Route::Movie(*id),
            Suggestion::Genre { id, .. } => Route::Home(HomeFilter::Genre(*id)),
        };
        self.shared.state.send_modify(|s| {
            s.visible = false;
            if let Suggestion::Movie { name, .. } = &picked {
                s.query = name.clone();
            }
        });
        Some(route)
    }

    /// Empties the query and the list, dropping any pending work.
    pub fn clear(&mut self) {
        cancel(&mut self.debounce);
        self.shared.supersede();
        self.shared.state.send_modify(|s| {
            s.query.clear();
            s.suggestions.clear();
        });
    }

    /// Cancels timers and the in-flight request. Nothing is applied afterwards.
    pub fn shutdown(&mut self) {
        self.debounce = None;
        self.dismiss = None;
        self.shared.session.cancel();
    }
}

impl Drop for SuggestionPipeline {
    fn drop(&mut self) {
        self.shared.session.cancel();
    }
}

fn cancel(slot: &mut Option<CancellationToken>) {
    if let Some(token) = slot.take() {
        token.cancel();
    }
}
