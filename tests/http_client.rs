use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use cinescout::http::{FetchError, HttpClient};
use cinescout::tmdb::{TmdbApi, TmdbClient};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

async fn search(Query(params): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    if params.get("api_key").map(String::as_str) != Some("k3y") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "status_message": "Invalid API key" })),
        );
    }
    let query = params.get("query").cloned().unwrap_or_default();
    (
        StatusCode::OK,
        Json(json!({
            "page": 1,
            "results": [
                { "id": 1, "title": format!("{query} one"), "release_date": "1999-03-31", "poster_path": null },
                { "id": 2, "title": format!("{query} two"), "release_date": "" }
            ],
            "total_pages": 1
        })),
    )
}

async fn keywords(Path(id): Path<i64>) -> Json<Value> {
    Json(json!({ "id": id, "keywords": [{ "id": 310, "name": "artificial intelligence" }] }))
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!({ "results": [] }))
}

async fn spawn_server() -> SocketAddr {
    let app = Router::new()
        .route("/3/search/movie", get(search))
        .route("/3/movie/:id/keywords", get(keywords))
        .route("/3/broken", get(|| async { "not json" }))
        .route(
            "/3/missing",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "status_message": "The resource you requested could not be found." })),
                )
            }),
        )
        .route("/3/slow", get(slow));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn tmdb_client_decodes_search_results() {
    let addr = spawn_server().await;
    let http = HttpClient::new(Duration::from_secs(5)).unwrap();
    let client = TmdbClient::new(http, "k3y", format!("http://{addr}/3"));

    let movies = client.search_movies("blade runner", None).await.unwrap();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0].title, "blade runner one");
    assert_eq!(movies[0].year().as_deref(), Some("1999"));
    assert_eq!(movies[1].year(), None);

    let keywords = client.movie_keywords(603).await.unwrap();
    assert_eq!(keywords[0].name, "artificial intelligence");
}

#[tokio::test]
async fn bad_key_surfaces_status() {
    let addr = spawn_server().await;
    let http = HttpClient::new(Duration::from_secs(5)).unwrap();
    let client = TmdbClient::new(http, "wrong", format!("http://{addr}/3"));

    match client.search_movies("x", None).await {
        Err(FetchError::Status { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API key"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn classifies_failures() {
    let addr = spawn_server().await;
    let http = HttpClient::new(Duration::from_secs(5)).unwrap();

    let err = http
        .get_json::<Value>(&format!("http://{addr}/3/missing"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, .. }));
    assert_eq!(err.to_string(), "HTTP error! status: 404");

    let err = http
        .get_json::<Value>(&format!("http://{addr}/3/broken"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Parse(_)));
}

#[tokio::test]
async fn slow_response_times_out() {
    let addr = spawn_server().await;
    let http = HttpClient::new(Duration::from_millis(200)).unwrap();

    let err = http
        .get_json::<Value>(&format!("http://{addr}/3/slow"), None)
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::Timeout(Duration::from_millis(200)));
}

#[tokio::test]
async fn cancellation_wins_over_pending_response() {
    let addr = spawn_server().await;
    let http = HttpClient::new(Duration::from_secs(5)).unwrap();
    let token = CancellationToken::new();

    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let err = http
        .get_json::<Value>(&format!("http://{addr}/3/slow"), Some(&token))
        .await
        .unwrap_err();
    assert!(err.is_canceled());
    assert!(started.elapsed() < Duration::from_secs(1));
}
