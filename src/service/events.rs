//! Index Events
//!
//! Every state transition in the engine is reported to an `EventSink` handed
//! in at construction. Sinks are plain collaborators, so a test can install a
//! `MemorySink` and assert on exactly what happened, while the CLI tees the
//! same events into `tracing` and a bounded buffer.
//!
//! Sinks are called while the engine holds its lock and must not call back
//! into the engine.

use crate::index::PriorityContainer;
use crate::storage::{PostHandle, Timestamp, Topic, UserId};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};

/// A state transition inside the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndexEvent {
    /// `add_user` ran; `created` is false when the user already existed
    UserRegistered { user: UserId, created: bool },
    /// A post was stored and indexed
    PostAdded {
        user: UserId,
        handle: PostHandle,
        timestamp: Timestamp,
        topics: Vec<Topic>,
        truncated: bool,
    },
    /// A post was bound to a timestamp that already had a post
    TimestampCollision {
        timestamp: Timestamp,
        previous: PostHandle,
        current: PostHandle,
    },
    /// A user was removed and its posts tombstoned
    UserDeleted { user: UserId, posts: usize },
    /// An operation was rejected because the user is not registered
    UnknownUser { operation: String, user: UserId },
}

/// Receiver of index events
pub trait EventSink: Send + Sync {
    fn record(&self, event: &IndexEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &IndexEvent) {
        match event {
            IndexEvent::UserRegistered { user, created } => {
                tracing::info!(user = %user, created, "User registered");
            }
            IndexEvent::PostAdded {
                user,
                handle,
                timestamp,
                topics,
                truncated,
            } => {
                tracing::info!(
                    user = %user,
                    handle = %handle,
                    timestamp,
                    topics = ?topics,
                    truncated,
                    "Post added"
                );
            }
            IndexEvent::TimestampCollision {
                timestamp,
                previous,
                current,
            } => {
                tracing::warn!(
                    timestamp,
                    previous = %previous,
                    current = %current,
                    "Timestamp already bound to another post"
                );
            }
            IndexEvent::UserDeleted { user, posts } => {
                tracing::info!(user = %user, posts, "User deleted");
            }
            IndexEvent::UnknownUser { operation, user } => {
                tracing::warn!(operation = %operation, user = %user, "Unknown user");
            }
        }
    }
}

/// Keeps the most recent events in arrival order
///
/// Once `capacity` events are buffered the oldest one is evicted.
#[derive(Debug)]
pub struct MemorySink {
    events: Mutex<PriorityContainer<IndexEvent>>,
    capacity: usize,
}

impl MemorySink {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Mutex::new(PriorityContainer::queue_with_capacity(capacity)),
            capacity,
        }
    }

    /// Buffered events, oldest first
    pub fn events(&self) -> Vec<IndexEvent> {
        let events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        events.iter().cloned().collect()
    }

    /// Remove and return buffered events, oldest first
    pub fn drain(&self) -> Vec<IndexEvent> {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        let mut drained = Vec::with_capacity(events.len());
        while let Some(event) = events.extract_top() {
            drained.push(event);
        }
        drained
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: &IndexEvent) {
        if self.capacity == 0 {
            return;
        }

        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        while events.len() >= self.capacity {
            events.extract_top();
        }
        events.insert(event.clone());
    }
}

/// Forwards every event to each inner sink, in order
#[derive(Default, Clone)]
pub struct TeeSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl TeeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: add a sink
    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl EventSink for TeeSink {
    fn record(&self, event: &IndexEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered(user: &str) -> IndexEvent {
        IndexEvent::UserRegistered {
            user: user.to_string(),
            created: true,
        }
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new(8);
        sink.record(&registered("a"));
        sink.record(&registered("b"));

        assert_eq!(sink.events(), vec![registered("a"), registered("b")]);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_memory_sink_evicts_oldest() {
        let sink = MemorySink::new(2);
        for user in ["a", "b", "c"] {
            sink.record(&registered(user));
        }

        assert_eq!(sink.events(), vec![registered("b"), registered("c")]);
        assert_eq!(sink.capacity(), 2);
    }

    #[test]
    fn test_memory_sink_drain() {
        let sink = MemorySink::new(4);
        sink.record(&registered("a"));

        assert_eq!(sink.drain(), vec![registered("a")]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_zero_capacity_records_nothing() {
        let sink = MemorySink::new(0);
        sink.record(&registered("a"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_tee_sink() {
        let first = Arc::new(MemorySink::new(4));
        let second = Arc::new(MemorySink::new(4));
        let tee = TeeSink::new()
            .with(first.clone())
            .with(second.clone())
            .with(Arc::new(TracingSink));

        tee.record(&registered("a"));

        assert_eq!(first.events(), vec![registered("a")]);
        assert_eq!(second.events(), vec![registered("a")]);
    }

    #[test]
    fn test_event_serialization() {
        let event = IndexEvent::UserDeleted {
            user: "u1".to_string(),
            posts: 3,
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "user_deleted");
        assert_eq!(json["user"], "u1");
        assert_eq!(json["posts"], 3);
    }
}
