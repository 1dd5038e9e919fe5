//! WebSocket session driving one suggestion pipeline per connected client.

use crate::catalog::GenreCatalog;
use crate::models::Suggestion;
use crate::routes::Route;
use crate::suggest::{SuggestSettings, SuggestionPipeline, SuggestionState};
use crate::tmdb::TmdbApi;
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Messages sent by the search box.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientEvent {
    Input { text: String },
    Focus,
    Blur,
    Select { index: usize },
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerEvent {
    Suggestions {
        query: String,
        visible: bool,
        items: Vec<Suggestion>,
    },
    Navigate {
        path: String,
    },
    Error {
        message: String,
    },
}

impl From<SuggestionState> for ServerEvent {
    fn from(state: SuggestionState) -> Self {
        ServerEvent::Suggestions {
            query: state.query,
            visible: state.visible,
            items: state.suggestions,
        }
    }
}

pub fn dispatch(pipeline: &mut SuggestionPipeline, event: ClientEvent) -> Option<Route> {
    match event {
        ClientEvent::Input { text } => pipeline.on_input_change(&text),
        ClientEvent::Focus => pipeline.on_focus(),
        ClientEvent::Blur => pipeline.on_blur(),
        ClientEvent::Select { index } => return pipeline.select(index),
        ClientEvent::Clear => pipeline.clear(),
    }
    None
}

pub async fn handle_socket(
    socket: WebSocket,
    api: Arc<dyn TmdbApi>,
    catalog: Arc<GenreCatalog>,
    settings: SuggestSettings,
) {
    info!("Suggestion session opened");
    let mut pipeline = SuggestionPipeline::new(api, catalog, settings);
    let mut updates = pipeline.subscribe();
    let (mut sink, mut stream) = socket.split();

    loop {
        let outgoing = tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                vec![ServerEvent::from(snapshot)]
            }
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => dispatch(&mut pipeline, event)
                        .map(|route| vec![ServerEvent::Navigate { path: route.path() }])
                        .unwrap_or_default(),
                    Err(e) => {
                        debug!("Ignoring malformed suggestion event: {}", e);
                        vec![ServerEvent::Error {
                            message: format!("invalid event: {e}"),
                        }]
                    }
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => Vec::new(),
                Some(Err(e)) => {
                    debug!("WebSocket receive error: {}", e);
                    break;
                }
            },
        };

        for event in outgoing {
            let Ok(body) = serde_json::to_string(&event) else {
                continue;
            };
            if sink.send(Message::Text(body)).await.is_err() {
                debug!("WebSocket sink closed");
                pipeline.shutdown();
                return;
            }
        }
    }

    pipeline.shutdown();
    info!("Suggestion session closed");
}
