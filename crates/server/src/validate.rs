//! Schema checks for participant names and message payloads.

use crate::error::{Error, Result};
use crate::models::{MessageKind, BROADCAST};

/// Checks a participant name after sanitization: non-empty, not the
/// broadcast sentinel, and limited to alphanumerics plus space, `_`, `-`.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidInput("name must not be empty".into()));
    }
    if name == BROADCAST {
        return Err(Error::InvalidInput(format!("name {BROADCAST:?} is reserved")));
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
    {
        return Err(Error::InvalidInput(format!(
            "name {name:?} contains invalid characters"
        )));
    }
    Ok(())
}

/// Checks a message payload (text already sanitized) and resolves the kind.
/// Clients may only post `message` and `private_message`.
pub fn validate_message(to: &str, text: &str, kind: &str) -> Result<MessageKind> {
    let kind = match kind {
        "message" => MessageKind::Message,
        "private_message" => MessageKind::PrivateMessage,
        other => {
            return Err(Error::InvalidInput(format!(
                "unknown message type {other:?}"
            )))
        }
    };
    if to.trim().is_empty() {
        return Err(Error::InvalidInput("to must not be empty".into()));
    }
    if text.is_empty() {
        return Err(Error::InvalidInput("text must not be empty".into()));
    }
    Ok(kind)
}

/// Parses the `limit` query parameter. Absent means no cap; a supplied value
/// must be a positive integer.
pub fn validate_limit(raw: Option<&str>) -> Result<usize> {
    let Some(raw) = raw else {
        return Ok(0);
    };
    match raw.parse::<i64>() {
        Ok(n) if n > 0 => Ok(n as usize),
        Ok(_) => Err(Error::InvalidInput("limit must be positive".into())),
        Err(_) => Err(Error::InvalidInput(format!(
            "limit {raw:?} is not an integer"
        ))),
    }
}
