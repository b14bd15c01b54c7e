//! Participant endpoints.

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use crate::config::AppState;
use crate::error::Result;
use crate::models::{JoinInput, Participant};

/// GET /participants
///
/// Snapshot of everyone currently registered.
pub async fn list_participants(State(state): State<AppState>) -> Json<Vec<Participant>> {
    info!("GET /participants");
    Json(state.presence.list().await)
}

/// POST /participants
///
/// Registers a new participant; 409 on a duplicate name, 422 on an invalid
/// one.
pub async fn join(
    State(state): State<AppState>,
    Json(input): Json<JoinInput>,
) -> Result<(StatusCode, Json<Participant>)> {
    info!("POST /participants - {}", input.name);

    let participant = state.presence.register(&input.name).await?;
    Ok((StatusCode::CREATED, Json(participant)))
}
