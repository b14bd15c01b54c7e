use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reserved recipient meaning "visible to all participants".
pub const BROADCAST: &str = "Todos";

/// A registered chat participant, addressed by display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub last_heartbeat: DateTime<Utc>,
}

impl Participant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            last_heartbeat: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Message,
    PrivateMessage,
    Status,
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub time: String,
}

impl Message {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        text: impl Into<String>,
        kind: MessageKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            from: from.into(),
            to: to.into(),
            text: text.into(),
            kind,
            time: Utc::now().format("%H:%M:%S").to_string(),
        }
    }

    /// System-authored join/leave notice. Always broadcast.
    pub fn system(from: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(from, BROADCAST, text, MessageKind::Status)
    }
}

/// Body of `POST /participants`.
#[derive(Debug, Deserialize)]
pub struct JoinInput {
    pub name: String,
}

/// Body of `POST /messages` and `PUT /messages/{id}`.
///
/// `type` stays a raw string so an unknown kind is a validation failure
/// rather than a body-parse reject.
#[derive(Debug, Deserialize)]
pub struct MessageInput {
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
}
