//! # HTTP Playlist Service
//!
//! `POST /playlist` with a body of `{"emotion": "Happy", "tracks": [...]}`
//! answers with the ranked playlist as a JSON array, exactly what
//! `moodtune playlist` prints. A missing `emotion` uses the configured
//! default; missing or `null` `tracks` is an empty list.
//!
//! A track list that fails validation is answered with
//! `500 {"error": "..."}`. Bodies that are not a JSON object are rejected by
//! the extractor with a 4xx status before reaching the handler.

use crate::playlist::{generate_playlist_with, Playlist, PlaylistConfig};
use crate::track::{tracks_from_value, TrackError};
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

/// State shared by the handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Emotion used when a request omits one.
    pub default_emotion: String,
    pub playlist: PlaylistConfig,
}

impl AppState {
    pub fn new(default_emotion: impl Into<String>, playlist: PlaylistConfig) -> Self {
        Self {
            default_emotion: default_emotion.into(),
            playlist,
        }
    }
}

/// Body of `POST /playlist`.
#[derive(Debug, Deserialize)]
pub struct PlaylistRequest {
    pub emotion: Option<String>,
    #[serde(default)]
    pub tracks: Value,
}

/// Failures reported to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid track list: {0}")]
    InvalidTracks(#[from] TrackError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidTracks(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// POST /playlist
pub async fn playlist(
    State(state): State<AppState>,
    Json(request): Json<PlaylistRequest>,
) -> Result<Json<Playlist>, ApiError> {
    let emotion = request.emotion.unwrap_or_else(|| state.default_emotion.clone());
    let tracks = match request.tracks {
        Value::Null => Vec::new(),
        value => tracks_from_value(value).inspect_err(|e| warn!("Rejected track list: {e}"))?,
    };

    debug!("Ranking {} tracks for `{emotion}'", tracks.len());
    Ok(Json(generate_playlist_with(&emotion, &tracks, &state.playlist)))
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/playlist", post(playlist))
        .with_state(state)
}

/// Listens on `addr` and serves requests until the process is stopped.
///
/// # Errors
///
/// Fails when the address cannot be bound or the server stops with an I/O
/// error.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("moodtune listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state)).await?;

    Ok(())
}
