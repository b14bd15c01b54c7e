//! Heartbeat endpoint.

use axum::{extract::State, http::{HeaderMap, StatusCode}};
use tracing::info;

use super::identity;
use crate::config::AppState;
use crate::error::Result;

/// POST /status
///
/// Liveness ping from the identity on the `user` header; 404 if that name
/// is not registered.
pub async fn heartbeat(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode> {
    let user = identity(&headers)?;
    info!("POST /status - {}", user);

    state.presence.heartbeat(&user).await?;
    Ok(StatusCode::OK)
}
