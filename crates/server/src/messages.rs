//! Append-ordered chat log with ownership-checked mutation.
//!
//! Owns the `messages` collection. Reads go through the visibility filter;
//! writes sanitize and validate their payloads first.

use std::sync::Arc;

use tracing::info;

use crate::error::{Error, Result};
use crate::models::{Message, MessageInput, MessageKind};
use crate::sanitize::strip_markup;
use crate::store::JsonDocStore;
use crate::validate::validate_message;
use crate::visibility;

pub struct MessageStore {
    store: Arc<JsonDocStore>,
}

impl MessageStore {
    pub fn new(store: Arc<JsonDocStore>) -> Self {
        Self { store }
    }

    /// Appends a message from a currently registered participant.
    pub async fn post(&self, from: &str, input: &MessageInput) -> Result<Message> {
        let from = strip_markup(from);
        if !self.store.participant_exists(&from).await {
            return Err(Error::InvalidInput(format!("unknown sender {from:?}")));
        }

        let text = strip_markup(&input.text);
        let kind = validate_message(&input.to, &text, &input.kind)?;

        let message = Message::new(from.as_str(), input.to.as_str(), text, kind);
        self.store.append_message(message.clone()).await?;
        info!("message {} posted by {}", message.id, from);
        Ok(message)
    }

    /// In-place update of an owned message. `from` is re-set to the
    /// requester, which the ownership check makes a no-op.
    pub async fn edit(&self, id: &str, requester: &str, input: &MessageInput) -> Result<Message> {
        let current = self
            .store
            .get_message(id)
            .await
            .ok_or_else(|| Error::NotFound(format!("no message {id:?}")))?;

        if current.kind == MessageKind::Status {
            return Err(Error::Forbidden("status notices cannot be edited".into()));
        }
        if current.from != requester {
            return Err(Error::Forbidden(format!(
                "message {id:?} belongs to {:?}",
                current.from
            )));
        }

        let text = strip_markup(&input.text);
        let kind = validate_message(&input.to, &text, &input.kind)?;

        let updated = Message {
            id: current.id.clone(),
            from: requester.to_string(),
            to: input.to.clone(),
            text,
            kind,
            time: current.time.clone(),
        };
        if !self.store.update_message(id, updated.clone()).await? {
            return Err(Error::NotFound(format!("no message {id:?}")));
        }
        info!("message {} edited by {}", id, requester);
        Ok(updated)
    }

    /// Removes an owned message.
    pub async fn delete(&self, id: &str, requester: &str) -> Result<()> {
        let current = self
            .store
            .get_message(id)
            .await
            .ok_or_else(|| Error::NotFound(format!("no message {id:?}")))?;

        if current.kind == MessageKind::Status {
            return Err(Error::Forbidden("status notices cannot be deleted".into()));
        }
        if current.from != requester {
            return Err(Error::Forbidden(format!(
                "message {id:?} belongs to {:?}",
                current.from
            )));
        }

        if !self.store.remove_message(id).await? {
            return Err(Error::NotFound(format!("no message {id:?}")));
        }
        info!("message {} deleted by {}", id, requester);
        Ok(())
    }

    /// Join/leave notices. The participant is being created or was just
    /// removed, so there is no sender-registration check.
    pub async fn post_system(&self, from: &str, text: &str) -> Result<Message> {
        let message = Message::system(from, text);
        self.store.append_message(message.clone()).await?;
        Ok(message)
    }

    /// Messages `requester` may see, oldest first; `limit > 0` caps the
    /// result to the most recent visible messages.
    pub async fn list_visible(&self, requester: &str, limit: usize) -> Vec<Message> {
        visibility::select_visible(self.store.list_messages().await, requester, limit)
    }
}
