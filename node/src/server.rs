//! Health and status HTTP endpoints.
//!
//! Handlers read the latest snapshot published by the engine and never touch the store.

use axum::{extract::State, response::Html, routing::get, Json, Router};
use std::net::SocketAddr;
use suitwatch_execution::StatusSnapshot;
use tokio::{net::TcpListener, sync::watch};
use tracing::info;

type Status = watch::Receiver<StatusSnapshot>;

pub fn router(status: Status) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/status", get(status_json))
        .with_state(status)
}

pub async fn serve(addr: SocketAddr, status: Status) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "http server listening");
    axum::serve(listener, router(status).into_make_service()).await
}

async fn index(State(status): State<Status>) -> Html<String> {
    let current_game = status.borrow().current_game;
    Html(format!(
        "<!DOCTYPE html><html><head><title>suitwatch</title></head><body>\
         <h1>🎯 Bot de Prédiction</h1>\
         <p>Le bot est en ligne et surveille les canaux.</p>\
         <p><strong>Jeu actuel:</strong> #{current_game}</p>\
         </body></html>"
    ))
}

async fn health() -> &'static str {
    "OK"
}

async fn status_json(State(status): State<Status>) -> Json<StatusSnapshot> {
    Json(status.borrow().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(current_game: u64) -> StatusSnapshot {
        StatusSnapshot {
            current_game,
            active: Vec::new(),
            queued: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_index_shows_current_game() {
        let (sender, receiver) = watch::channel(snapshot(0));
        sender.send_replace(snapshot(1234));
        let Html(body) = index(State(receiver)).await;
        assert!(body.contains("#1234"));
    }

    #[tokio::test]
    async fn test_health_and_status() {
        assert_eq!(health().await, "OK");
        let (_sender, receiver) = watch::channel(snapshot(7));
        let Json(body) = status_json(State(receiver)).await;
        assert_eq!(body.current_game, 7);
        let json = serde_json::to_value(&body).expect("serializable");
        assert_eq!(json["current_game"], 7);
        assert!(json["active"].as_array().is_some_and(Vec::is_empty));
    }
}
