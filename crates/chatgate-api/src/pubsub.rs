//! In-process publish/subscribe hub handed to downstream resolvers

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 256;

/// A published event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub topic: String,
    pub payload: serde_json::Value,
}

/// Cloneable handle to a shared broadcast channel
///
/// Subscribers that fall more than the channel capacity behind lose the
/// oldest events (`RecvError::Lagged`).
#[derive(Debug, Clone)]
pub struct PubSub {
    sender: broadcast::Sender<Event>,
}

impl Default for PubSub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PubSub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to every current subscriber; returns how many received it
    pub fn publish(&self, topic: impl Into<String>, payload: serde_json::Value) -> usize {
        let event = Event {
            topic: topic.into(),
            payload,
        };
        // Sending with no subscribers is not an error here
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
