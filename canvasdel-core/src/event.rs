// canvasdel-core/src/event.rs
use crate::notifier::Notification;
use crossbeam::channel::{Receiver, Sender, unbounded};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Topics published by the editor. Subscribers may use `*` wildcards.
pub mod topics {
    pub const UNDO_TOAST: &str = "editor.toast";
    pub const OPERATION_ERROR: &str = "editor.operation_error";
    pub const ANALYTICS: &str = "analytics.widget_delete";
    pub const ENTITY_DELETED: &str = "console.entity_deleted";
    pub const FOCUS_HISTORY: &str = "focus_history.remove";
    pub const PROPERTY_PANE: &str = "pane.property.close";
    pub const FILTER_PANE: &str = "pane.filter.close";
    pub const SELECTION: &str = "selection.request";
}

/// One notification as seen by a subscriber. Every receiver shares the same allocation.
#[derive(Debug, Clone)]
pub struct BusEvent {
    pub topic: &'static str,
    pub notification: Arc<Notification>,
}

impl From<Notification> for BusEvent {
    fn from(notification: Notification) -> Self {
        Self {
            topic: notification.topic(),
            notification: Arc::new(notification),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Exact(String),
    Any,
}

/// Dot-separated topic filter, split once at subscribe time.
///
/// `*` matches exactly one segment, except in last position where it matches
/// the rest of the topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPattern {
    segments: Vec<Segment>,
}

impl TopicPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('.')
            .map(|part| match part {
                "*" => Segment::Any,
                exact => Segment::Exact(exact.to_string()),
            })
            .collect();
        Self { segments }
    }

    pub fn matches(&self, topic: &str) -> bool {
        let mut parts = topic.split('.');
        let last = self.segments.len().saturating_sub(1);

        for (i, segment) in self.segments.iter().enumerate() {
            let Some(part) = parts.next() else {
                return false;
            };
            match segment {
                Segment::Any if i == last => return true,
                Segment::Any => {}
                Segment::Exact(expected) if expected == part => {}
                Segment::Exact(_) => return false,
            }
        }

        parts.next().is_none()
    }
}

struct Subscriber {
    id: usize,
    pattern: TopicPattern,
    tx: Sender<BusEvent>,
}

#[derive(Default)]
struct Registry {
    subscribers: RwLock<Vec<Subscriber>>,
    next_id: AtomicUsize,
}

impl Registry {
    fn remove(&self, id: usize) {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|s| s.id != id);
    }
}

/// Dropping the handle unsubscribes
pub struct Subscription {
    id: usize,
    registry: Arc<Registry>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}

/// Fans editor notifications out to the panes, consoles and tools listening for them
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Registry>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver to every matching subscriber; returns how many received it
    pub fn publish(&self, notification: Notification) -> usize {
        let event = BusEvent::from(notification);
        let subscribers = self
            .registry
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        subscribers
            .iter()
            .filter(|s| s.pattern.matches(event.topic))
            // A dropped receiver just misses the event
            .filter(|s| s.tx.send(event.clone()).is_ok())
            .count()
    }

    pub fn subscribe(&self, pattern: &str) -> (Subscription, Receiver<BusEvent>) {
        let (tx, rx) = unbounded();
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);

        self.registry
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscriber {
                id,
                pattern: TopicPattern::parse(pattern),
                tx,
            });

        let subscription = Subscription {
            id,
            registry: Arc::clone(&self.registry),
        };
        (subscription, rx)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
