//! Broadcast channels keyed by topic name.
//!
//! A dashboard tab subscribes to `attendance:session:{id}`; the check-in path
//! publishes into the same topic. Channels are created on first subscription
//! and dropped once a publish finds nobody listening.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

const CHANNEL_CAPACITY: usize = 100;

#[derive(Clone, Default)]
pub struct WebSocketManager {
    topics: Arc<RwLock<HashMap<String, broadcast::Sender<String>>>>,
}

impl WebSocketManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to the given topic, creating it if necessary.
    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<String> {
        let mut map = self.topics.write().await;
        map.entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publishes `msg` to every subscriber of `topic`. No-op for unknown topics.
    pub async fn broadcast<T: Into<String>>(&self, topic: &str, msg: T) {
        let mut map = self.topics.write().await;
        if let Some(sender) = map.get(topic) {
            let _ = sender.send(msg.into());
            if sender.receiver_count() == 0 {
                tracing::debug!(topic, "Dropping topic without subscribers");
                map.remove(topic);
            }
        }
    }

    /// Removes `topic` if nobody is subscribed any more. Called when a socket closes.
    pub async fn prune(&self, topic: &str) {
        let mut map = self.topics.write().await;
        if map.get(topic).is_some_and(|s| s.receiver_count() == 0) {
            tracing::debug!(topic, "Dropping topic after last subscriber left");
            map.remove(topic);
        }
    }

    /// Number of live subscribers on `topic`.
    pub async fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .await
            .get(topic)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }
}
