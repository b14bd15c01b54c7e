//! Message endpoints.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::identity;
use crate::config::AppState;
use crate::error::Result;
use crate::models::{Message, MessageInput};
use crate::validate::validate_limit;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Kept as a raw string so a non-integer value is a 422, not a
    /// query-parse reject.
    limit: Option<String>,
}

/// GET /messages?limit=N
///
/// Messages the requesting identity may see, oldest first.
pub async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Message>>> {
    let user = identity(&headers)?;
    info!("GET /messages - {}", user);

    let limit = validate_limit(query.limit.as_deref())?;
    Ok(Json(state.messages.list_visible(&user, limit).await))
}

/// POST /messages
pub async fn post_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<MessageInput>,
) -> Result<(StatusCode, Json<Message>)> {
    let user = identity(&headers)?;
    info!("POST /messages - {}", user);

    let message = state.messages.post(&user, &input).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// PUT /messages/{id}
pub async fn edit_message(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<MessageInput>,
) -> Result<Json<Message>> {
    let user = identity(&headers)?;
    info!("PUT /messages/{} - {}", id, user);

    Ok(Json(state.messages.edit(&id, &user, &input).await?))
}

/// DELETE /messages/{id}
pub async fn delete_message(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode> {
    let user = identity(&headers)?;
    info!("DELETE /messages/{} - {}", id, user);

    state.messages.delete(&id, &user).await?;
    Ok(StatusCode::OK)
}
