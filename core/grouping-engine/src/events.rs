//! FILENAME: core/grouping-engine/src/events.rs
//! PURPOSE: Notifications emitted by the grouping coordinator.
//! CONTEXT: Single-threaded publish/subscribe. Listeners run synchronously, in
//! subscription order, on the thread that handled the triggering call.

use serde::{Deserialize, Serialize};

/// Events the host can react to (re-render, recount, persist).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GroupingEvent {
    /// A trimmed namespace of the row store changed.
    TrimmedChanged { namespace: String },
    /// The grouping depth changed.
    DepthChanged { depth: usize },
}

/// Handle returned by `EventBus::subscribe`.
pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&GroupingEvent)>;

#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: SubscriptionId,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GroupingEvent) + 'static) -> SubscriptionId {
        self.next_id += 1;
        self.listeners.push((self.next_id, Box::new(listener)));
        self.next_id
    }

    /// Returns false if the subscription was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn publish(&mut self, event: &GroupingEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_publish_reaches_listeners_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        let first = Rc::clone(&seen);
        bus.subscribe(move |e| first.borrow_mut().push(("first", e.clone())));
        let second = Rc::clone(&seen);
        bus.subscribe(move |e| second.borrow_mut().push(("second", e.clone())));

        bus.publish(&GroupingEvent::DepthChanged { depth: 2 });

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "first");
        assert_eq!(seen[1].1, GroupingEvent::DepthChanged { depth: 2 });
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let counter = Rc::clone(&count);
        let id = bus.subscribe(move |_| *counter.borrow_mut() += 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&GroupingEvent::DepthChanged { depth: 1 });
        assert_eq!(*count.borrow(), 0);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_events_serialize_for_the_host() {
        let json = serde_json::to_string(&GroupingEvent::TrimmedChanged {
            namespace: "grouping".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"trimmedChanged","namespace":"grouping"}"#);
    }
}
