//! JSON-based document store for the `participants` and `messages`
//! collections.
//!
//! Both collections live in memory behind an `RwLock` and are written back
//! to disk on every mutation, using a temp-file-then-rename for atomicity.
//! Mutations hold the collection's write lock across the disk write, so each
//! single-document operation is atomic at store granularity.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::models::{Message, Participant};

const PARTICIPANTS_FILE: &str = "participants.json";
const MESSAGES_FILE: &str = "messages.json";

/// Store client over the two chat collections. Constructed once with
/// [`JsonDocStore::open`] and injected into the presence and message layers.
pub struct JsonDocStore {
    storage_dir: PathBuf,
    /// Participants keyed by display name; the key is the uniqueness rule.
    participants: RwLock<HashMap<String, Participant>>,
    /// Messages in insertion order.
    messages: RwLock<Vec<Message>>,
}

impl JsonDocStore {
    /// Opens the store, loading both collections from disk. Request serving
    /// must wait for this to return.
    pub async fn open(storage_dir: impl Into<PathBuf>) -> Result<Self> {
        let storage_dir = storage_dir.into();
        fs::create_dir_all(&storage_dir)
            .await
            .with_context(|| format!("creating storage dir {:?}", storage_dir))?;

        let loaded: Vec<Participant> =
            load_collection(&storage_dir.join(PARTICIPANTS_FILE)).await;
        let participants: HashMap<String, Participant> = loaded
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();
        let messages: Vec<Message> = load_collection(&storage_dir.join(MESSAGES_FILE)).await;

        info!(
            "document store ready ({} participants, {} messages)",
            participants.len(),
            messages.len()
        );

        Ok(Self {
            storage_dir,
            participants: RwLock::new(participants),
            messages: RwLock::new(messages),
        })
    }

    /// Final flush of both collections.
    pub async fn close(&self) -> Result<()> {
        let participants = self.participants.read().await;
        self.save_participants(&participants).await?;
        let messages = self.messages.read().await;
        self.save_messages(&messages).await?;
        info!("document store closed");
        Ok(())
    }

    // --- participants ---

    /// Inserts a participant unless the name is already taken. Returns
    /// `false` on a duplicate name; nothing is written in that case.
    pub async fn insert_participant(&self, participant: Participant) -> Result<bool> {
        let mut participants = self.participants.write().await;
        if participants.contains_key(&participant.name) {
            return Ok(false);
        }
        participants.insert(participant.name.clone(), participant);
        self.save_participants(&participants).await?;
        Ok(true)
    }

    /// Sets a participant's heartbeat to `at`. Returns `false` if the name
    /// is not registered.
    pub async fn touch_participant(&self, name: &str, at: DateTime<Utc>) -> Result<bool> {
        let mut participants = self.participants.write().await;
        let Some(participant) = participants.get_mut(name) else {
            return Ok(false);
        };
        participant.last_heartbeat = at;
        self.save_participants(&participants).await?;
        Ok(true)
    }

    pub async fn participant_exists(&self, name: &str) -> bool {
        self.participants.read().await.contains_key(name)
    }

    /// Snapshot of the participants collection.
    pub async fn list_participants(&self) -> Vec<Participant> {
        self.participants.read().await.values().cloned().collect()
    }

    /// Removes a participant. Returns `false` if already gone.
    pub async fn remove_participant(&self, name: &str) -> Result<bool> {
        let mut participants = self.participants.write().await;
        if participants.remove(name).is_none() {
            return Ok(false);
        }
        self.save_participants(&participants).await?;
        Ok(true)
    }

    // --- messages ---

    pub async fn append_message(&self, message: Message) -> Result<()> {
        let mut messages = self.messages.write().await;
        messages.push(message);
        self.save_messages(&messages).await?;
        Ok(())
    }

    pub async fn get_message(&self, id: &str) -> Option<Message> {
        self.messages
            .read()
            .await
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }

    /// Replaces the identified message in place, keeping its position.
    /// Returns `false` if no message has `id`.
    pub async fn update_message(&self, id: &str, updated: Message) -> Result<bool> {
        let mut messages = self.messages.write().await;
        let Some(slot) = messages.iter_mut().find(|m| m.id == id) else {
            return Ok(false);
        };
        *slot = updated;
        self.save_messages(&messages).await?;
        Ok(true)
    }

    /// Removes the identified message. Returns `false` if no message has `id`.
    pub async fn remove_message(&self, id: &str) -> Result<bool> {
        let mut messages = self.messages.write().await;
        let Some(index) = messages.iter().position(|m| m.id == id) else {
            return Ok(false);
        };
        messages.remove(index);
        self.save_messages(&messages).await?;
        Ok(true)
    }

    /// Snapshot of the messages collection, insertion order.
    pub async fn list_messages(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    // --- persistence ---

    async fn save_participants(&self, participants: &HashMap<String, Participant>) -> Result<()> {
        let list: Vec<&Participant> = participants.values().collect();
        save_collection(&self.storage_dir.join(PARTICIPANTS_FILE), &list).await
    }

    async fn save_messages(&self, messages: &[Message]) -> Result<()> {
        save_collection(&self.storage_dir.join(MESSAGES_FILE), &messages).await
    }
}

/// Loads a collection file; a missing file is an empty collection, an
/// unparsable one is logged and treated as empty.
async fn load_collection<T: DeserializeOwned + Default>(path: &Path) -> T {
    match fs::read_to_string(path).await {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!("failed to parse {:?}, starting empty: {}", path, e);
                T::default()
            }
        },
        Err(_) => T::default(),
    }
}

/// Serializes to a temp file, then renames over the target.
async fn save_collection<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let temp_path = path.with_extension("tmp");

    fs::write(&temp_path, json)
        .await
        .with_context(|| format!("writing {:?}", temp_path))?;
    fs::rename(&temp_path, path)
        .await
        .with_context(|| format!("replacing {:?}", path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageKind;
    use tempfile::TempDir;

    #[tokio::test]
    async fn participants_persist_across_reopen() {
        let temp_dir = TempDir::new().unwrap();

        {
            let store = JsonDocStore::open(temp_dir.path()).await.unwrap();
            assert!(store
                .insert_participant(Participant::new("Alice"))
                .await
                .unwrap());
        }

        let store = JsonDocStore::open(temp_dir.path()).await.unwrap();
        assert!(store.participant_exists("Alice").await);
        assert_eq!(store.list_participants().await.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_without_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonDocStore::open(temp_dir.path()).await.unwrap();

        let first = Participant::new("Alice");
        let first_id = first.id.clone();
        assert!(store.insert_participant(first).await.unwrap());
        assert!(!store
            .insert_participant(Participant::new("Alice"))
            .await
            .unwrap());

        let listed = store.list_participants().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, first_id);
    }

    #[tokio::test]
    async fn messages_keep_insertion_order() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonDocStore::open(temp_dir.path()).await.unwrap();

        for text in ["one", "two", "three"] {
            store
                .append_message(Message::new("Alice", "Todos", text, MessageKind::Message))
                .await
                .unwrap();
        }

        let texts: Vec<String> = store
            .list_messages()
            .await
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn update_keeps_position_and_remove_deletes() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonDocStore::open(temp_dir.path()).await.unwrap();

        let a = Message::new("Alice", "Todos", "a", MessageKind::Message);
        let b = Message::new("Alice", "Todos", "b", MessageKind::Message);
        let b_id = b.id.clone();
        store.append_message(a).await.unwrap();
        store.append_message(b.clone()).await.unwrap();

        let edited = Message { text: "b2".into(), ..b };
        assert!(store.update_message(&b_id, edited).await.unwrap());
        assert_eq!(store.list_messages().await[1].text, "b2");

        assert!(store.remove_message(&b_id).await.unwrap());
        assert!(!store.remove_message(&b_id).await.unwrap());
        assert_eq!(store.list_messages().await.len(), 1);
    }

    #[tokio::test]
    async fn corrupt_collection_file_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(MESSAGES_FILE), "{ malformed json ...").unwrap();

        let store = JsonDocStore::open(temp_dir.path()).await.unwrap();
        assert!(store.list_messages().await.is_empty());
    }
}
