//! Chat server configuration

use std::path::PathBuf;
use std::sync::Arc;

use crate::messages::MessageStore;
use crate::presence::PresenceStore;

/// Configuration for the chat server
#[derive(Clone, Debug)]
pub struct ChatServerConfig {
    /// Directory holding the JSON collections
    pub storage_dir: PathBuf,
    /// HTTP listen port
    pub port: u16,
    /// Seconds between eviction sweeps
    pub sweep_interval_secs: u64,
    /// Heartbeat age in seconds beyond which a participant is stale
    pub staleness_secs: u64,
}

impl Default for ChatServerConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("chat_data"),
            port: 5001,
            sweep_interval_secs: 15,
            staleness_secs: 10,
        }
    }
}

impl ChatServerConfig {
    /// Reads `CHAT_ROOT` and `PORT` from the environment, keeping defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(root) = std::env::var("CHAT_ROOT") {
            config.storage_dir = PathBuf::from(root);
        }
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            config.port = port;
        }
        config
    }

    /// Create config rooted at a custom base directory
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Ensure the storage directory exists
    pub async fn ensure_dirs(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.storage_dir).await?;
        Ok(())
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub presence: Arc<PresenceStore>,
    pub messages: Arc<MessageStore>,
}
