//! Exercise the TMDB flows from the command line and print what the front end
//! would receive.
//! Usage:
//!   cargo run --bin tmdb_probe -- movie <tmdb_id>
//!   cargo run --bin tmdb_probe -- suggest <query>
//!   cargo run --bin tmdb_probe -- genres
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{Context, Result};
use cinescout::catalog::GenreCatalog;
use cinescout::config::Settings;
use cinescout::details::load_details;
use cinescout::http::HttpClient;
use cinescout::images::{image_url, youtube_embed_url, ImageKind};
use cinescout::suggest::{compose_suggestions, SuggestSettings};
use cinescout::tmdb::{TmdbApi, TmdbClient};
use dotenvy::dotenv;
use serde_json::json;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Movie,
    Suggest,
    Genres,
}

impl FromStr for Command {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "movie" => Ok(Command::Movie),
            "suggest" => Ok(Command::Suggest),
            "genres" => Ok(Command::Genres),
            _ => Err(anyhow::anyhow!(
                "command must be 'movie', 'suggest' or 'genres'"
            )),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cargo run --bin tmdb_probe -- movie <tmdb_id>");
        eprintln!("       cargo run --bin tmdb_probe -- suggest <query>");
        eprintln!("       cargo run --bin tmdb_probe -- genres");
        std::process::exit(1);
    }

    let command = Command::from_str(&args[1])?;
    let settings = Settings::from_env()?;
    let api_key = settings.api_key.clone()?;
    let http = HttpClient::new(settings.http_timeout)?;
    let client = TmdbClient::new(http, api_key, settings.tmdb_base.clone());

    match command {
        Command::Movie => {
            let id: i64 = args
                .get(2)
                .context("missing tmdb_id")?
                .parse()
                .context("tmdb_id must be an integer")?;
            probe_movie(&client, id).await?
        }
        Command::Suggest => {
            let query = args[2..].join(" ");
            probe_suggest(&client, &query).await?
        }
        Command::Genres => {
            for genre in client.genres().await? {
                println!("{:>6}  {}", genre.id, genre.name);
            }
        }
    }

    Ok(())
}

async fn probe_movie(client: &TmdbClient, id: i64) -> Result<()> {
    let details = load_details(client, id)
        .await
        .context("core movie fetch failed")?;
    let movie = &details.movie;
    let out = json!({
        "title": movie.title,
        "year": movie.year(),
        "runtime": movie.runtime_label(),
        "genres": movie.genres.iter().map(|g| &g.name).collect::<Vec<_>>(),
        "poster": image_url(movie.poster_path.as_deref(), ImageKind::DetailPoster),
        "backdrop": image_url(movie.backdrop_path.as_deref(), ImageKind::Backdrop),
        "keywords": details.keywords.iter().map(|k| &k.name).collect::<Vec<_>>(),
        "cast": details.cast.iter().map(|c| &c.name).collect::<Vec<_>>(),
        "similar": details.similar.iter().map(|m| &m.title).collect::<Vec<_>>(),
        "trailer": details.trailer.as_ref().map(|v| youtube_embed_url(&v.key)),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

async fn probe_suggest(client: &TmdbClient, query: &str) -> Result<()> {
    let catalog = GenreCatalog::default();
    catalog
        .load(client)
        .await
        .context("failed to load genre catalog")?;
    let movies = client.search_movies(query, None).await?;
    let items = compose_suggestions(movies, &catalog, query, &SuggestSettings::default());
    for item in items {
        println!("{}", serde_json::to_string(&item)?);
    }
    Ok(())
}
