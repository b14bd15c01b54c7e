//! Recurring eviction of participants with stale heartbeats.
//!
//! One background task, ticking on a fixed period. Each tick announces the
//! departure of every stale participant and removes them; a failed cleanup
//! is logged and skipped so it never stalls the loop or the other evictions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::ChatServerConfig;
use crate::messages::MessageStore;
use crate::presence::PresenceStore;

/// Spawns the sweep loop. Sending `true` on the watch channel stops it.
pub fn spawn(
    presence: Arc<PresenceStore>,
    messages: Arc<MessageStore>,
    config: &ChatServerConfig,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let period = Duration::from_secs(config.sweep_interval_secs);
    let threshold = chrono::Duration::seconds(config.staleness_secs as i64);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // an interval's first tick completes immediately; a fresh start
        // should not sweep before anyone had a chance to ping
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    sweep_once(&presence, &messages, threshold).await;
                }
                _ = shutdown.changed() => {
                    info!("eviction sweeper stopping");
                    break;
                }
            }
        }
    })
}

/// One sweep pass; returns how many participants were evicted.
pub async fn sweep_once(
    presence: &PresenceStore,
    messages: &MessageStore,
    threshold: chrono::Duration,
) -> usize {
    let stale = presence.stale(threshold).await;
    let mut evicted = 0;

    for participant in stale {
        if let Err(e) = messages
            .post_system(&participant.name, "left the room")
            .await
        {
            warn!(
                "failed to announce departure of {}: {}",
                participant.name, e
            );
        }
        match presence.evict(&participant.name).await {
            Ok(()) => evicted += 1,
            Err(e) => warn!("failed to evict {}: {}", participant.name, e),
        }
    }

    if evicted > 0 {
        info!("evicted {} stale participant(s)", evicted);
    }
    evicted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MessageKind, BROADCAST};
    use crate::store::JsonDocStore;
    use chrono::Utc;
    use tempfile::TempDir;

    async fn stores(dir: &TempDir) -> (Arc<JsonDocStore>, Arc<MessageStore>, Arc<PresenceStore>) {
        let store = Arc::new(JsonDocStore::open(dir.path()).await.unwrap());
        let messages = Arc::new(MessageStore::new(store.clone()));
        let presence = Arc::new(PresenceStore::new(store.clone(), messages.clone()));
        (store, messages, presence)
    }

    #[tokio::test]
    async fn stale_participants_are_evicted_with_a_leave_notice() {
        let dir = TempDir::new().unwrap();
        let (store, messages, presence) = stores(&dir).await;

        presence.register("Alice").await.unwrap();
        store
            .touch_participant("Alice", Utc::now() - chrono::Duration::seconds(11))
            .await
            .unwrap();

        let evicted = sweep_once(&presence, &messages, chrono::Duration::seconds(10)).await;
        assert_eq!(evicted, 1);
        assert!(presence.list().await.is_empty());

        let log = store.list_messages().await;
        let leave = log.last().unwrap();
        assert_eq!(leave.from, "Alice");
        assert_eq!(leave.to, BROADCAST);
        assert_eq!(leave.kind, MessageKind::Status);
        assert_eq!(leave.text, "left the room");
    }

    #[tokio::test]
    async fn fresh_participants_survive_the_sweep() {
        let dir = TempDir::new().unwrap();
        let (_store, messages, presence) = stores(&dir).await;

        presence.register("Alice").await.unwrap();
        presence.heartbeat("Alice").await.unwrap();

        let evicted = sweep_once(&presence, &messages, chrono::Duration::seconds(10)).await;
        assert_eq!(evicted, 0);
        assert_eq!(presence.list().await.len(), 1);
    }

    #[tokio::test]
    async fn each_stale_participant_is_handled_independently() {
        let dir = TempDir::new().unwrap();
        let (store, messages, presence) = stores(&dir).await;

        for name in ["Alice", "Bob", "Carol"] {
            presence.register(name).await.unwrap();
        }
        let backdated = Utc::now() - chrono::Duration::seconds(30);
        store.touch_participant("Alice", backdated).await.unwrap();
        store.touch_participant("Carol", backdated).await.unwrap();

        let evicted = sweep_once(&presence, &messages, chrono::Duration::seconds(10)).await;
        assert_eq!(evicted, 2);

        let remaining = presence.list().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Bob");
    }

    #[tokio::test]
    async fn sweeping_an_empty_room_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let (store, messages, presence) = stores(&dir).await;

        let evicted = sweep_once(&presence, &messages, chrono::Duration::seconds(10)).await;
        assert_eq!(evicted, 0);
        assert!(store.list_messages().await.is_empty());
    }

    #[tokio::test]
    async fn spawned_sweeper_stops_on_shutdown_signal() {
        let dir = TempDir::new().unwrap();
        let (_store, messages, presence) = stores(&dir).await;

        let config = ChatServerConfig::with_base_dir(dir.path());
        let (tx, rx) = watch::channel(false);
        let handle = spawn(presence, messages, &config, rx);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
