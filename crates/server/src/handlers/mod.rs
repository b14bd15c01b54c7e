//! Handlers for server
//!
//! Thin wrappers over the presence and message stores; identity comes from
//! the trusted `user` header.

pub mod messages;
pub mod participants;
pub mod status;

// Re-export AppState from config
pub use crate::config::AppState;

pub use messages::{delete_message, edit_message, list_messages, post_message};
pub use participants::{join, list_participants};
pub use status::heartbeat;

use axum::http::HeaderMap;

use crate::error::{Error, Result};

/// The identity claim carried on the `user` header.
pub(crate) fn identity(headers: &HeaderMap) -> Result<String> {
    headers
        .get("user")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| Error::InvalidInput("missing user header".into()))
}
