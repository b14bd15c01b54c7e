//! Participant registry keyed by display name.
//!
//! Owns the `participants` collection: joins, heartbeats, snapshots, and the
//! evictions driven by the sweeper.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;

use crate::error::{Error, Result};
use crate::messages::MessageStore;
use crate::models::Participant;
use crate::sanitize::strip_markup;
use crate::store::JsonDocStore;
use crate::validate::validate_name;

pub struct PresenceStore {
    store: Arc<JsonDocStore>,
    messages: Arc<MessageStore>,
}

impl PresenceStore {
    pub fn new(store: Arc<JsonDocStore>, messages: Arc<MessageStore>) -> Self {
        Self { store, messages }
    }

    /// Registers a new participant and announces the arrival with a
    /// broadcast status notice. The two writes are separate; a failed
    /// announcement surfaces but leaves the registration in place.
    pub async fn register(&self, name: &str) -> Result<Participant> {
        let name = strip_markup(name);
        validate_name(&name)?;

        let participant = Participant::new(name.clone());
        if !self.store.insert_participant(participant.clone()).await? {
            return Err(Error::Conflict(format!(
                "participant {name:?} already exists"
            )));
        }
        info!("participant {} joined", name);

        self.messages.post_system(&name, "joined the room").await?;
        Ok(participant)
    }

    /// Refreshes a participant's liveness signal.
    pub async fn heartbeat(&self, name: &str) -> Result<()> {
        if !self.store.touch_participant(name, Utc::now()).await? {
            return Err(Error::NotFound(format!("unknown participant {name:?}")));
        }
        Ok(())
    }

    /// Snapshot of everyone currently registered.
    pub async fn list(&self) -> Vec<Participant> {
        self.store.list_participants().await
    }

    /// Removes a participant. Evicting an already-evicted name is a no-op.
    pub async fn evict(&self, name: &str) -> Result<()> {
        if self.store.remove_participant(name).await? {
            info!("participant {} evicted", name);
        }
        Ok(())
    }

    /// Participants whose last heartbeat is older than `threshold`.
    pub async fn stale(&self, threshold: Duration) -> Vec<Participant> {
        let cutoff = Utc::now() - threshold;
        self.store
            .list_participants()
            .await
            .into_iter()
            .filter(|p| p.last_heartbeat < cutoff)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MessageKind, BROADCAST};
    use tempfile::TempDir;

    async fn stores(dir: &TempDir) -> (Arc<JsonDocStore>, Arc<MessageStore>, PresenceStore) {
        let store = Arc::new(JsonDocStore::open(dir.path()).await.unwrap());
        let messages = Arc::new(MessageStore::new(store.clone()));
        let presence = PresenceStore::new(store.clone(), messages.clone());
        (store, messages, presence)
    }

    #[tokio::test]
    async fn register_announces_the_arrival() {
        let dir = TempDir::new().unwrap();
        let (store, _messages, presence) = stores(&dir).await;

        let alice = presence.register("Alice").await.unwrap();
        assert_eq!(alice.name, "Alice");

        let notices = store.list_messages().await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].from, "Alice");
        assert_eq!(notices[0].to, BROADCAST);
        assert_eq!(notices[0].kind, MessageKind::Status);
        assert_eq!(notices[0].text, "joined the room");
    }

    #[tokio::test]
    async fn second_register_with_same_name_conflicts() {
        let dir = TempDir::new().unwrap();
        let (_store, _messages, presence) = stores(&dir).await;

        presence.register("Alice").await.unwrap();
        let err = presence.register("Alice").await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(presence.list().await.len(), 1);
    }

    #[tokio::test]
    async fn names_are_sanitized_then_validated() {
        let dir = TempDir::new().unwrap();
        let (_store, _messages, presence) = stores(&dir).await;

        let cleaned = presence.register("<b>Alice</b>").await.unwrap();
        assert_eq!(cleaned.name, "Alice");

        assert!(matches!(
            presence.register("<i></i>").await.unwrap_err(),
            Error::InvalidInput(_)
        ));
        assert!(matches!(
            presence.register(BROADCAST).await.unwrap_err(),
            Error::InvalidInput(_)
        ));
    }

    #[tokio::test]
    async fn heartbeat_requires_registration() {
        let dir = TempDir::new().unwrap();
        let (_store, _messages, presence) = stores(&dir).await;

        assert!(matches!(
            presence.heartbeat("Nobody").await.unwrap_err(),
            Error::NotFound(_)
        ));

        presence.register("Alice").await.unwrap();
        presence.heartbeat("Alice").await.unwrap();
    }

    #[tokio::test]
    async fn heartbeat_moves_a_participant_out_of_the_stale_set() {
        let dir = TempDir::new().unwrap();
        let (store, _messages, presence) = stores(&dir).await;

        presence.register("Alice").await.unwrap();
        store
            .touch_participant("Alice", Utc::now() - Duration::seconds(11))
            .await
            .unwrap();
        assert_eq!(presence.stale(Duration::seconds(10)).await.len(), 1);

        presence.heartbeat("Alice").await.unwrap();
        assert!(presence.stale(Duration::seconds(10)).await.is_empty());
    }

    #[tokio::test]
    async fn evict_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let (_store, _messages, presence) = stores(&dir).await;

        presence.register("Alice").await.unwrap();
        presence.evict("Alice").await.unwrap();
        presence.evict("Alice").await.unwrap();
        assert!(presence.list().await.is_empty());
    }
}
