use crate::browse::{self, HomePage};
use crate::catalog::GenreCatalog;
use crate::config::{ConfigError, Settings};
use crate::details::{DetailLoader, DetailState};
use crate::http::HttpClient;
use crate::models::MovieId;
use crate::prefs::{PreferenceList, PreferenceStore};
use crate::routes::HomeQuery;
use crate::socket;
use crate::suggest::SuggestSettings;
use crate::tmdb::{TmdbApi, TmdbClient};
use crate::views::{cards, DetailView, HomeView};
use anyhow::Result;
use axum::{
    extract::{ws::WebSocketUpgrade, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    /// The TMDB client, or the configuration problem that prevents building one.
    pub tmdb: Result<Arc<dyn TmdbApi>, ConfigError>,
    pub catalog: Arc<GenreCatalog>,
    pub prefs: Arc<PreferenceStore>,
    pub suggest: SuggestSettings,
}

impl AppState {
    fn api(&self) -> Result<Arc<dyn TmdbApi>, ApiError> {
        self.tmdb.clone().map_err(ApiError::Config)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub async fn run_server(settings: Settings) -> Result<()> {
    let tmdb: Result<Arc<dyn TmdbApi>, ConfigError> = match settings.api_key.clone() {
        Ok(key) => {
            let http = HttpClient::new(settings.http_timeout)?;
            Ok(Arc::new(TmdbClient::new(http, key, settings.tmdb_base.clone())))
        }
        Err(e) => {
            error!("API key not configured properly: {}", e);
            Err(e)
        }
    };

    let catalog = Arc::new(GenreCatalog::default());
    if let Ok(api) = &tmdb {
        if let Err(e) = catalog.load(api.as_ref()).await {
            warn!("Failed to load genre catalog at startup, will retry on demand: {}", e);
        }
    }

    let prefs = Arc::new(PreferenceStore::open(&settings.prefs_path));
    info!("Preferences stored at {:?}", prefs.path());

    let state = AppState {
        tmdb,
        catalog,
        prefs,
        suggest: SuggestSettings::default(),
    };
    let app = build_router(state);

    info!("Listening on {}", settings.bind);
    let listener = tokio::net::TcpListener::bind(settings.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/home", get(home))
        .route("/api/genres", get(genres))
        .route("/api/search", get(search))
        .route("/api/movies/:id", get(movie))
        .route("/api/preferences/:list", get(preference_set))
        .route("/api/preferences/:list/:id", post(toggle_preference))
        .route("/ws/suggest", get(suggest_socket))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn home(State(state): State<AppState>, Query(query): Query<HomeQuery>) -> Response {
    let favorites = state.prefs.get_set(PreferenceList::Favorites);
    let page = match state.api() {
        Ok(api) => browse::load_home(api.as_ref(), &state.catalog, &query.filter()).await,
        Err(e) => HomePage {
            error: Some(e.to_string()),
            ..HomePage::default()
        },
    };
    let status = if state.tmdb.is_err() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (status, Json(HomeView::new(page, favorites))).into_response()
}

async fn genres(State(state): State<AppState>) -> Result<Response, ApiError> {
    let api = state.api()?;
    if state.catalog.is_empty() {
        state.catalog.load(api.as_ref()).await.map_err(|e| {
            error!("Error fetching genres: {}", e);
            ApiError::Upstream(e.user_message("genres"))
        })?;
    }
    Ok(Json(json!({ "genres": state.catalog.browse() })).into_response())
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    let api = state.api()?;
    let results = browse::search(api.as_ref(), &query.q)
        .await
        .map_err(|_| ApiError::Upstream("Search failed. Please try again.".to_string()))?;
    Ok(Json(json!({ "results": cards(results) })).into_response())
}

async fn movie(State(state): State<AppState>, Path(id): Path<MovieId>) -> Result<Response, ApiError> {
    let api = state.api()?;
    // Membership comes from the local store and never waits on the network.
    let favorite = state.prefs.contains(PreferenceList::Favorites, id);
    let watchlist = state.prefs.contains(PreferenceList::Watchlist, id);

    let detail = DetailLoader::new().load(api.as_ref(), id).await;
    let status = match detail {
        DetailState::Errored { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };
    let mut body = json!(DetailView::from(detail));
    body["favorite"] = json!(favorite);
    body["watchlist"] = json!(watchlist);
    Ok((status, Json(body)).into_response())
}

fn parse_list(raw: &str) -> Result<PreferenceList, ApiError> {
    raw.parse()
        .map_err(|e: anyhow::Error| ApiError::BadRequest(e.to_string()))
}

async fn preference_set(
    State(state): State<AppState>,
    Path(list): Path<String>,
) -> Result<Response, ApiError> {
    let list = parse_list(&list)?;
    let ids = state.prefs.get_set(list);
    Ok(Json(json!({ "list": list.as_str(), "ids": ids })).into_response())
}

async fn toggle_preference(
    State(state): State<AppState>,
    Path((list, id)): Path<(String, MovieId)>,
) -> Result<Response, ApiError> {
    let list = parse_list(&list)?;
    let ids = state.prefs.toggle(list, id).map_err(|e| {
        error!("Failed to persist {}: {:?}", list, e);
        ApiError::Internal(format!("Failed to save {list}"))
    })?;
    info!("Toggled movie {} in {}", id, list);
    Ok(Json(json!({
        "list": list.as_str(),
        "id": id,
        "member": ids.contains(&id),
        "ids": ids,
    }))
    .into_response())
}

async fn suggest_socket(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let api = state.api()?;
    let catalog = state.catalog.clone();
    let settings = state.suggest;
    Ok(ws.on_upgrade(move |ws_stream| {
        socket::handle_socket(ws_stream, api, catalog, settings)
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
